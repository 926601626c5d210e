//! The BOOLEAN type.

use std::borrow::Cow;
use crate::decode::Decoder;
use crate::error::{DecodeErrorKind, Error, Result};
use crate::ident::Tag;
use crate::length::Length;
use crate::obj::{primitive_codec, Asn1, Base, Codec, Decoded, Obj};


//------------ Boolean -------------------------------------------------------

/// A BOOLEAN value.
///
/// DER encodes true as a single `0xFF` octet and false as `0x00`. When
/// decoding BER, any non-zero octet is accepted as true and the value is
/// marked as BER encoded.
#[derive(Clone, Debug)]
pub struct Boolean {
    base: Base,
    value: Option<bool>,
    default: Option<bool>,
}

impl Boolean {
    /// Creates a schema without a value.
    pub fn new() -> Self {
        Boolean {
            base: Base::new("Boolean", Tag::BOOLEAN.primitive()),
            value: None,
            default: None,
        }
    }

    /// Returns the value if there is one.
    pub fn value(&self) -> Option<bool> {
        self.value
    }

    pub fn set(&mut self, value: bool) {
        self.value = Some(value)
    }

    pub fn with_value(mut self, value: bool) -> Self {
        self.set(value);
        self
    }

    /// Adds a DEFAULT value.
    ///
    /// The value becomes optional and, unless it already has one, takes
    /// the default as its value.
    pub fn default(mut self, value: bool) -> Self {
        self.default = Some(value);
        self.base.optional = true;
        if self.value.is_none() {
            self.value = Some(value)
        }
        self
    }

    pub fn default_value(&self) -> Option<bool> {
        self.default
    }

    pub fn is_default(&self) -> bool {
        self.default.is_some() && self.value == self.default
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub(crate) fn adopt(&self, value: Self) -> Result<Self> {
        Ok(Boolean {
            base: self.base.decoded_at(0, 0, 0),
            value: value.value.or(self.default),
            default: self.default,
        })
    }

    fn content(&self) -> Result<Cow<'_, [u8]>> {
        match self.value {
            Some(true) => Ok(Cow::Borrowed(b"\xFF")),
            Some(false) => Ok(Cow::Borrowed(b"\x00")),
            None => Err(Error::ObjNotReady(self.base.class_name.into())),
        }
    }
}


//--- From and PartialEq

impl From<bool> for Boolean {
    fn from(value: bool) -> Self {
        Self::new().with_value(value)
    }
}

impl PartialEq for Boolean {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.base.same_tags(&other.base)
    }
}

impl PartialEq<bool> for Boolean {
    fn eq(&self, other: &bool) -> bool {
        self.value == Some(*other)
    }
}


//--- Codec and Asn1

impl Codec for Boolean {
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
        if len != 1 {
            return Err(dec.err(
                base, offset, DecodeErrorKind::InvalidLength,
                "Boolean's length must be equal to 1"
            ))
        }
        let Some((&octet, tail)) = lv[llen..].split_first() else {
            return Err(dec.short(base, offset))
        };
        let (value, ber_encoded) = match octet {
            0x00 => (false, false),
            0xFF => (true, false),
            _ if dec.bered() => (true, true),
            _ => {
                return Err(dec.malformed(
                    base, offset, "unacceptable Boolean value"
                ))
            }
        };
        let mut base = base.decoded_at(offset, llen, 1);
        base.ber_encoded = ber_encoded;
        Ok(Decoded::Value(
            Boolean { base, value: Some(value), default: self.default },
            tail
        ))
    }

    fn from_obj(obj: Obj) -> Result<Self> {
        Self::try_from(obj)
    }
}

impl Asn1 for Boolean {
    fn base(&self) -> &Base {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "BOOLEAN"
    }

    fn ready(&self) -> bool {
        self.value.is_some()
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::ctx::Ctx;
    use crate::ident::Ident;

    #[test]
    fn encode() {
        assert_eq!(Boolean::from(true).encode().unwrap(), b"\x01\x01\xFF");
        assert_eq!(Boolean::from(false).encode().unwrap(), b"\x01\x01\x00");
        assert!(matches!(
            Boolean::new().encode(), Err(Error::ObjNotReady(_))
        ));
        assert_eq!(
            Boolean::from(true).implicit(Ident::ctxp(3)).unwrap()
                .encode().unwrap(),
            b"\x83\x01\xFF"
        );
    }

    #[test]
    fn decode_strict_and_ber() {
        let spec = Boolean::new();
        let res = spec.decod(b"\x01\x01\xFF", &Ctx::new()).unwrap();
        assert_eq!(res, true);
        assert!(!res.base().ber_encoded());

        let err = spec.decode(b"\x01\x01\x01", &Ctx::new()).unwrap_err();
        assert_eq!(
            err.as_decode().unwrap().msg(), "unacceptable Boolean value"
        );
        let res = spec.decod(b"\x01\x01\x01", &Ctx::ber()).unwrap();
        assert_eq!(res, true);
        assert!(res.base().ber_encoded());
        assert!(res.bered());
    }

    #[test]
    fn decode_length() {
        let spec = Boolean::new();
        assert!(spec.decode(b"\x01\x02\xFF\xFF", &Ctx::new()).unwrap_err()
            .is_decode_kind(DecodeErrorKind::InvalidLength)
        );
        assert!(spec.decode(b"\x01\x01", &Ctx::new()).unwrap_err()
            .is_decode_kind(DecodeErrorKind::NotEnoughData)
        );
        assert!(spec.decode(b"\x02\x01\xFF", &Ctx::new()).unwrap_err()
            .is_decode_kind(DecodeErrorKind::TagMismatch)
        );
    }

    #[test]
    fn default() {
        let spec = Boolean::new().default(false);
        assert!(spec.base().is_optional());
        assert!(spec.is_default());
        assert!(!Boolean::from(true).is_default());
        let adopted = spec.adopt(Boolean::from(true)).unwrap();
        assert_eq!(adopted.value(), Some(true));
        assert!(!adopted.is_default());
    }
}
