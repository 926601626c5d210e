//! The NULL type.

use std::borrow::Cow;
use crate::decode::Decoder;
use crate::error::{DecodeErrorKind, Result};
use crate::ident::Tag;
use crate::length::Length;
use crate::obj::{primitive_codec, Asn1, Base, Codec, Decoded, Obj};


//------------ Null ----------------------------------------------------------

/// A NULL value.
///
/// NULL has no content and is always ready.
#[derive(Clone, Debug)]
pub struct Null {
    base: Base,
}

impl Null {
    pub fn new() -> Self {
        Null { base: Base::new("Null", Tag::NULL.primitive()) }
    }

    fn content(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(b""))
    }
}

impl Default for Null {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Null {
    fn eq(&self, other: &Self) -> bool {
        self.base.same_tags(&other.base)
    }
}

impl Codec for Null {
    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    primitive_codec!();

    fn decode_value<'a>(
        &self, dec: &mut Decoder, data: &'a [u8], offset: usize,
        tag_only: bool, _evgen: bool,
    ) -> Result<Decoded<'a, Self>> {
        let base = &self.base;
        let tlen = dec.strip_tag(base, data, offset, base.tag)?;
        if tag_only {
            return Ok(Decoded::TagMatched)
        }
        let lv = &data[tlen..];
        let (len, llen) = Length::decode(lv).map_err(|err| {
            dec.at(base, offset, err)
        })?;
        if len != 0 {
            return Err(dec.err(
                base, offset, DecodeErrorKind::InvalidLength,
                "Null must have zero length"
            ))
        }
        Ok(Decoded::Value(
            Null { base: base.decoded_at(offset, llen, 0) },
            &lv[llen..]
        ))
    }

    fn from_obj(obj: Obj) -> Result<Self> {
        Self::try_from(obj)
    }
}

impl Asn1 for Null {
    fn base(&self) -> &Base {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "NULL"
    }

    fn ready(&self) -> bool {
        true
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::ctx::Ctx;
    use crate::encode::encode2pass;

    #[test]
    fn encode_decode() {
        assert_eq!(Null::new().encode().unwrap(), b"\x05\x00");
        assert_eq!(encode2pass(&mut Null::new()).unwrap(), b"\x05\x00");
        let (res, tail) = Null::new().decode(
            b"\x05\x00\x01", &Ctx::new()
        ).unwrap();
        assert_eq!(tail, b"\x01");
        assert_eq!(res.base().offset(), 0);
        assert_eq!(res.base().llen(), 1);
        assert!(res.base().decoded());
    }

    #[test]
    fn decode_non_empty() {
        let err = Null::new().decode(b"\x05\x01\x00", &Ctx::new()).unwrap_err();
        assert!(err.is_decode_kind(DecodeErrorKind::InvalidLength));
    }
}
