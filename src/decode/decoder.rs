//! The decode driver.

use std::borrow::Cow;
use std::ops::ControlFlow;
use crate::ctx::Ctx;
use crate::error::{DecodeError, DecodeErrorKind, Error, Result};
use crate::ident::Ident;
use crate::length::{starts_with_eoc, Length, EOC_LEN};
use crate::obj::{Asn1, Base, Codec, Decoded, Obj};
use crate::oid::Oid;
use crate::path::{DecodePath, PathElem, PathPattern};


//------------ Visitor -------------------------------------------------------

/// The callback receiving the events of an event mode decode run.
pub(crate) type Visitor<'a> =
    dyn FnMut(&DecodePath, &Obj, &[u8]) -> ControlFlow<()> + 'a;


//------------ Decoder -------------------------------------------------------

/// The state of a decode run.
pub struct Decoder<'a> {
    /// The options of the run.
    pub(super) ctx: &'a Ctx,

    /// The path of the value currently being decoded.
    pub(super) path: DecodePath,

    /// The DEFINED BY schemas found so far.
    ///
    /// Each entry holds the pattern of paths of the values to decode and
    /// the object identifier and schema to decode them with.
    pub(super) defined: Vec<(PathPattern, (Oid, Obj))>,

    /// The event visitor if decoding in event mode.
    pub(super) visitor: Option<&'a mut Visitor<'a>>,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(
        ctx: &'a Ctx, visitor: Option<&'a mut Visitor<'a>>
    ) -> Self {
        Decoder {
            ctx,
            path: DecodePath::new(),
            defined: Vec::new(),
            visitor,
        }
    }

    pub(crate) fn ctx(&self) -> &'a Ctx {
        self.ctx
    }

    pub(crate) fn path(&self) -> &DecodePath {
        &self.path
    }

    pub(crate) fn bered(&self) -> bool {
        self.ctx.is_bered()
    }

    //--- Errors

    /// Locates a low-level error at the value described by `base`.
    pub(crate) fn at(
        &self, base: &Base, offset: usize, err: DecodeError
    ) -> Error {
        err.located(base.class_name, &self.path, offset).into()
    }

    /// Creates a located error of the given kind.
    pub(crate) fn err(
        &self, base: &Base, offset: usize, kind: DecodeErrorKind,
        msg: impl Into<Cow<'static, str>>,
    ) -> Error {
        self.at(base, offset, DecodeError::new(kind, msg))
    }

    /// Creates a located error for malformed data.
    pub(crate) fn malformed(
        &self, base: &Base, offset: usize,
        msg: impl Into<Cow<'static, str>>,
    ) -> Error {
        self.err(base, offset, DecodeErrorKind::Decode, msg)
    }

    pub(crate) fn mismatch(&self, base: &Base, offset: usize) -> Error {
        self.err(base, offset, DecodeErrorKind::TagMismatch, "")
    }

    /// Creates the error for data ending before the announced length.
    pub(crate) fn short(&self, base: &Base, offset: usize) -> Error {
        self.err(
            base, offset, DecodeErrorKind::NotEnoughData,
            "encoded length is longer than data"
        )
    }

    //--- Paths and events

    /// Runs `op` with `elem` appended to the decode path.
    pub(crate) fn child<T>(
        &mut self, elem: PathElem,
        op: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.path.push(elem);
        let res = op(self);
        self.path.pop();
        res
    }

    /// Hands a completed value to the visitor.
    pub(crate) fn emit(&mut self, obj: &Obj, tail: &[u8]) -> Result<()> {
        if let Some(visitor) = self.visitor.as_mut() {
            if visitor(&self.path, obj, tail).is_break() {
                return Err(Error::Interrupted)
            }
        }
        Ok(())
    }

    //--- Decoding values

    /// Decodes the outermost value of a run.
    pub(crate) fn decode_top<'d>(
        &mut self, spec: &Obj, data: &'d [u8], offset: usize, evgen: bool,
    ) -> Result<(Obj, &'d [u8])> {
        self.decode(spec, data, offset, evgen)
    }

    /// Decodes a value at the current path.
    ///
    /// In event mode, the value and all its components are reported to
    /// the visitor.
    pub(crate) fn decode<'d>(
        &mut self, spec: &Obj, data: &'d [u8], offset: usize, evgen: bool,
    ) -> Result<(Obj, &'d [u8])> {
        self.node(spec, data, offset, false, evgen, evgen)?.into_value()
    }

    /// Decodes a value in one piece.
    ///
    /// Components are never reported. The value itself is reported if
    /// `emit` is true.
    pub(crate) fn decode_atomic<'d>(
        &mut self, spec: &Obj, data: &'d [u8], offset: usize, emit: bool,
    ) -> Result<(Obj, &'d [u8])> {
        self.node(spec, data, offset, false, false, emit)?.into_value()
    }

    /// Checks whether the data starts with the tag of `spec`.
    ///
    /// Only a tag mismatch results in `false`. Other errors, such as
    /// malformed identifier octets, are returned.
    pub(crate) fn probe(
        &mut self, spec: &Obj, data: &[u8], offset: usize
    ) -> Result<bool> {
        match self.node(spec, data, offset, true, false, false) {
            Ok(_) => Ok(true),
            Err(err) if err.is_decode_kind(DecodeErrorKind::TagMismatch) => {
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    fn node<'d>(
        &mut self, spec: &Obj, data: &'d [u8], offset: usize,
        tag_only: bool, evgen: bool, emit: bool,
    ) -> Result<Decoded<'d, Obj>> {
        let evgen = if evgen && self.ctx.evgen_stops_at(&self.path) {
            log::trace!("decoding {} in memory", self.path);
            false
        }
        else {
            evgen
        };
        let res = match spec.base().expl {
            None => spec.decode_value(self, data, offset, tag_only, evgen)?,
            Some(expl) => {
                self.explicit(spec, expl, data, offset, tag_only, evgen)?
            }
        };
        if emit {
            if let Decoded::Value(ref obj, tail) = res {
                self.emit(obj, tail)?;
            }
        }
        Ok(res)
    }

    /// Decodes a value wrapped in an EXPLICIT tag.
    fn explicit<'d>(
        &mut self, spec: &Obj, expl: Ident, data: &'d [u8], offset: usize,
        tag_only: bool, evgen: bool,
    ) -> Result<Decoded<'d, Obj>> {
        let base = spec.base();
        let tlen = self.strip_tag(base, data, offset, expl)?;
        let lv = &data[tlen..];
        let (len, llen) = Length::decode_any(lv).map_err(|err| {
            self.at(base, offset, err)
        })?;
        let v = &lv[llen..];
        let inner_offset = offset + tlen + llen;
        match len {
            Length::Indefinite => {
                if !self.bered() {
                    return Err(
                        self.err(base, offset, DecodeErrorKind::LenIndefForm, "")
                    )
                }
                let (mut obj, tail) = match spec.decode_value(
                    self, v, inner_offset, tag_only, evgen
                )? {
                    Decoded::TagMatched => return Ok(Decoded::TagMatched),
                    Decoded::Value(obj, tail) => (obj, tail)
                };
                if !starts_with_eoc(tail) {
                    return Err(self.malformed(base, inner_offset, "no EOC"))
                }
                let obj_base = obj.base_mut();
                obj_base.vlen += EOC_LEN;
                obj_base.expl_lenindef = true;
                Ok(Decoded::Value(obj, &tail[EOC_LEN..]))
            }
            Length::Definite(len) => {
                if len > v.len() {
                    return Err(self.short(base, offset))
                }
                let (obj, tail) = match spec.decode_value(
                    self, v, inner_offset, tag_only, evgen
                )? {
                    Decoded::TagMatched => return Ok(Decoded::TagMatched),
                    Decoded::Value(obj, tail) => (obj, tail)
                };
                if obj.base().tlvlen() != len && !self.ctx.is_allow_expl_oob()
                {
                    return Err(self.malformed(
                        base, offset,
                        "explicit tag out-of-bound, longer than data"
                    ))
                }
                Ok(Decoded::Value(obj, tail))
            }
        }
    }

    //--- Helpers for the value types

    /// Strips identifier octets that have to equal `expected`.
    ///
    /// Returns the length of the identifier octets.
    pub(crate) fn strip_tag(
        &self, base: &Base, data: &[u8], offset: usize, expected: Ident,
    ) -> Result<usize> {
        let (tag, tlen) = self.any_tag(base, data, offset)?;
        if tag != expected {
            return Err(self.mismatch(base, offset))
        }
        Ok(tlen)
    }

    /// Strips any identifier octets.
    pub(crate) fn any_tag(
        &self, base: &Base, data: &[u8], offset: usize,
    ) -> Result<(Ident, usize)> {
        Ident::strip(data).map_err(|err| self.at(base, offset, err))
    }

    /// Decodes definite length octets and splits off the content.
    ///
    /// Returns the length of the length octets, the content and the data
    /// following the value.
    pub(crate) fn definite<'d>(
        &self, base: &Base, lv: &'d [u8], offset: usize,
    ) -> Result<(usize, &'d [u8], &'d [u8])> {
        let (len, llen) = Length::decode(lv).map_err(|err| {
            self.at(base, offset, err)
        })?;
        let v = &lv[llen..];
        if len > v.len() {
            return Err(self.short(base, offset))
        }
        let (value, tail) = v.split_at(len);
        Ok((llen, value, tail))
    }

    /// Strips the header of a primitive value.
    ///
    /// Returns `None` if only the tag was to be checked.
    pub(crate) fn primitive<'d>(
        &self, base: &Base, data: &'d [u8], offset: usize, tag_only: bool,
    ) -> Result<Option<Header<'d>>> {
        let tlen = self.strip_tag(base, data, offset, base.tag)?;
        if tag_only {
            return Ok(None)
        }
        let (llen, value, tail) = self.definite(base, &data[tlen..], offset)?;
        Ok(Some(Header { tlen, llen, value, tail, lenindef: false }))
    }

    /// Strips the header of a constructed value.
    ///
    /// The indefinite length form is accepted only when decoding BER.
    /// Returns `None` if only the tag was to be checked.
    pub(crate) fn constructed<'d>(
        &self, base: &Base, data: &'d [u8], offset: usize, tag_only: bool,
    ) -> Result<Option<Header<'d>>> {
        let tlen = self.strip_tag(base, data, offset, base.tag)?;
        if tag_only {
            return Ok(None)
        }
        self.constructed_content(base, &data[tlen..], tlen, offset, false)
            .map(Some)
    }

    /// Decodes the length of a constructed value.
    ///
    /// For the indefinite form, the content of the returned header is all
    /// the remaining data and the tail is empty. The caller has to find the
    /// end-of-contents octets.
    pub(crate) fn constructed_content<'d>(
        &self, base: &Base, lv: &'d [u8], tlen: usize, offset: usize,
        force_ber: bool,
    ) -> Result<Header<'d>> {
        let (len, llen) = Length::decode_any(lv).map_err(|err| {
            self.at(base, offset, err)
        })?;
        let v = &lv[llen..];
        match len {
            Length::Indefinite => {
                if !force_ber && !self.bered() {
                    return Err(
                        self.err(base, offset, DecodeErrorKind::LenIndefForm, "")
                    )
                }
                Ok(Header { tlen, llen, value: v, tail: &[], lenindef: true })
            }
            Length::Definite(len) => {
                if len > v.len() {
                    return Err(self.short(base, offset))
                }
                let (value, tail) = v.split_at(len);
                Ok(Header { tlen, llen, value, tail, lenindef: false })
            }
        }
    }

    /// Checks for and removes the end-of-contents octets.
    pub(crate) fn eoc<'d>(
        &self, base: &Base, offset: usize, data: &'d [u8],
    ) -> Result<&'d [u8]> {
        if starts_with_eoc(data) {
            Ok(&data[EOC_LEN..])
        }
        else {
            Err(self.malformed(base, offset, "no EOC"))
        }
    }
}


//------------ Header --------------------------------------------------------

/// The identifier and length octets of a value.
pub(crate) struct Header<'d> {
    /// The length of the identifier octets.
    pub tlen: usize,

    /// The length of the length octets.
    pub llen: usize,

    /// The content octets.
    ///
    /// For the indefinite length form, this is all the data following the
    /// length octets.
    pub value: &'d [u8],

    /// The data following the value.
    ///
    /// This is empty for the indefinite length form.
    pub tail: &'d [u8],

    /// Whether the indefinite length form was used.
    pub lenindef: bool,
}

impl<'a, T> Decoded<'a, T> {
    /// Returns the decoded value or an error if only the tag was checked.
    pub(crate) fn into_value(self) -> Result<(T, &'a [u8])> {
        match self {
            Decoded::Value(value, tail) => Ok((value, tail)),
            Decoded::TagMatched => {
                Err(Error::invalid("tag check did not produce a value"))
            }
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::int::Integer;
    use crate::ident::Tag;
    use crate::sequence_of::SequenceOf;

    #[test]
    fn explicit_lenindef() {
        let spec = Integer::new().explicit(Ident::ctxc(1)).unwrap();
        let data = b"\xa1\x80\x02\x01\x05\x00\x00rest";
        assert!(spec.decode(data, &Ctx::new()).unwrap_err().is_decode_kind(
            DecodeErrorKind::LenIndefForm
        ));
        let (res, tail) = spec.decode(data, &Ctx::ber()).unwrap();
        assert_eq!(tail, b"rest");
        assert_eq!(res.to_i64(), Some(5));
        assert!(res.base().expl_lenindef());
        assert_eq!(res.base().fulllen(), data.len() - tail.len());
        assert_eq!(res.base().fulllen(), 7);
        assert_eq!(res.base().expl_offset(), 0);

        let mut res = res;
        let mut cer = Vec::new();
        res.encode_cer(&mut cer).unwrap();
        assert_eq!(cer, &data[..7]);
    }

    #[test]
    fn explicit_out_of_bound() {
        let spec = Integer::new().explicit(Ident::ctxc(1)).unwrap();
        let data = b"\xa1\x04\x02\x01\x05\x00";
        let err = spec.decode(data, &Ctx::new()).unwrap_err();
        assert_eq!(
            err.as_decode().unwrap().msg(),
            "explicit tag out-of-bound, longer than data"
        );
        let (_, tail) = spec.decode(
            data, &Ctx::new().allow_expl_oob(true)
        ).unwrap();
        assert_eq!(tail, b"\x00");
    }

    #[test]
    fn explicit_mismatch() {
        let spec = Integer::new().explicit(Ident::ctxc(1)).unwrap();
        assert!(spec.decode(b"\xa2\x03\x02\x01\x05", &Ctx::new()).unwrap_err()
            .is_decode_kind(DecodeErrorKind::TagMismatch)
        );
    }

    #[test]
    fn visitor_stops() {
        let spec = SequenceOf::new(Integer::new());
        let data = b"\x30\x09\x02\x01\x01\x02\x01\x02\x02\x01\x03";
        let mut seen = 0;
        spec.decode_evgen(data, &Ctx::new(), |_, obj, _| {
            assert_eq!(obj.base().tag(), Tag::INTEGER.primitive());
            seen += 1;
            if seen == 2 {
                ControlFlow::Break(())
            }
            else {
                ControlFlow::Continue(())
            }
        }).unwrap();
        assert_eq!(seen, 2);
    }
}
