//! Collecting chunked strings while streaming.
//!
//! This is a private module. Its public content is being re-exported by the
//! parent module.

use std::ops::ControlFlow;
use crate::ctx::Ctx;
use crate::encode::{write, Target};
use crate::error::{Error, Result};
use crate::length::EOC_LEN;
use crate::obj::{Asn1, Obj};
use crate::path::DecodePath;


//------------ OctetStringAggregator -----------------------------------------

/// An event visitor writing the payload of one OCTET STRING to a target.
///
/// In event mode, an OCTET STRING does not keep its content. Its primitive
/// chunks are reported as separate events, though, and they all point into
/// the input data. The aggregator picks the chunks below a given decode
/// path and writes their content to the target in order. It stops the
/// decode run once the string at the path is complete.
///
/// The string at the path may be of any of the string types that use the
/// OCTET STRING machinery, i.e., OCTET STRING itself and the character
/// string types.
pub struct OctetStringAggregator<'r, T> {
    path: DecodePath,
    raw: &'r [u8],
    target: T,
    done: bool,
    error: Option<Error>,
}

impl<'r, T: Target> OctetStringAggregator<'r, T> {
    /// Creates an aggregator for the string at `path`.
    ///
    /// The `raw` data must be the same data given to the decoder.
    pub fn new(path: DecodePath, raw: &'r [u8], target: T) -> Self {
        OctetStringAggregator {
            path, raw, target,
            done: false,
            error: None,
        }
    }

    /// Processes an event.
    pub fn visit(&mut self, path: &DecodePath, obj: &Obj) -> ControlFlow<()> {
        if self.done || !path.starts_with(&self.path) {
            return ControlFlow::Continue(())
        }
        let base = obj.base();
        if !base.ber_encoded() {
            let start = base.offset() + base.tlen() + base.llen();
            let mut end = start + base.vlen();
            if base.expl_lenindef() {
                end -= EOC_LEN;
            }
            let res = match self.raw.get(start..end) {
                Some(content) => write(&mut self.target, content),
                None => Err(Error::invalid("event outside of the input data")),
            };
            if let Err(err) = res {
                self.error = Some(err);
                return ControlFlow::Break(())
            }
        }
        if path.len() == self.path.len() {
            self.done = true;
            return ControlFlow::Break(())
        }
        ControlFlow::Continue(())
    }

    /// Returns whether the string was complete.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Returns the target or the error that happened while writing.
    pub fn finish(self) -> Result<T> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.target),
        }
    }
}


//------------ agg_octet_string ----------------------------------------------

/// Decodes `data` in event mode writing the string at `path` to `target`.
///
/// Decoding stops as soon as the string is complete. Returns an error if
/// the data is malformed before that point or if the string was not found.
pub fn agg_octet_string<A: Asn1, T: Target>(
    spec: &A, data: &[u8], ctx: &Ctx, path: DecodePath, target: T,
) -> Result<T> {
    let mut agg = OctetStringAggregator::new(path, data, target);
    spec.decode_evgen(data, ctx, |path, obj, _| agg.visit(path, obj))?;
    if !agg.is_done() && agg.error.is_none() {
        return Err(Error::ObjUnknown(agg.path.to_string()))
    }
    agg.finish()
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::PathElem;
    use crate::sequence::Sequence;
    use crate::string::OctetString;
    use crate::int::Integer;

    #[test]
    fn aggregate_chunked() {
        let spec = Sequence::new([
            ("num", Obj::from(Integer::new())),
            ("data", Obj::from(OctetString::new())),
        ]);
        let data = b"\x30\x80\
            \x02\x01\x01\
            \x24\x80\x04\x02ab\x24\x80\x04\x01c\x00\x00\x04\x01d\x00\x00\
            \x00\x00";
        let res = agg_octet_string(
            &spec, data, &Ctx::ber(),
            DecodePath::new().join(PathElem::from("data")), Vec::new()
        ).unwrap();
        assert_eq!(res, b"abcd");
    }

    #[test]
    fn aggregate_primitive() {
        let spec = OctetString::new();
        let res = agg_octet_string(
            &spec, b"\x04\x03xyz", &Ctx::new(), DecodePath::new(), Vec::new()
        ).unwrap();
        assert_eq!(res, b"xyz");
    }
}
