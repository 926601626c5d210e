//! The ANY type.

use bytes::Bytes;
use crate::decode::Decoder;
use crate::encode::{write, Target};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::ident::{Ident, TagOrder};
use crate::length::{starts_with_eoc, Length, EOC_LEN};
use crate::obj::{Asn1, Base, Codec, Decoded, Obj};
use crate::oid::Oid;
use crate::path::PathElem;


//------------ AnyValue ------------------------------------------------------

/// The content of an ANY value.
#[derive(Clone, Debug)]
pub enum AnyValue {
    /// A complete encoded value.
    ///
    /// This is what decoding produces.
    Raw(Bytes),

    /// A value that is encoded when the ANY is encoded.
    Obj(Box<Obj>),
}


//------------ Any -----------------------------------------------------------

/// A value of any type.
///
/// An ANY holds a complete encoded value, i.e., identifier, length and
/// content octets. When decoding, any value is accepted and kept in its
/// raw form, which can later be decoded with a concrete schema, either
/// manually or through DEFINED BY. An ANY can only be tagged explicitly.
///
/// When decoding BER, values with indefinite length are accepted. Their
/// content is walked to find the end, and the raw form includes the
/// end-of-contents octets.
#[derive(Clone, Debug)]
pub struct Any {
    base: Base,
    value: Option<AnyValue>,
    defined: Option<Box<(Oid, Obj)>>,
}

impl Any {
    pub fn new() -> Self {
        Any {
            base: Base::headless("Any", Ident::END_OF_CONTENTS),
            value: None,
            defined: None,
        }
    }

    /// Sets the value to an encoded value.
    ///
    /// Only the identifier octets are checked.
    pub fn set_raw(&mut self, raw: impl Into<Bytes>) -> Result<()> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(Error::invalid("Any value can not be empty"))
        }
        Ident::strip(&raw)?;
        self.value = Some(AnyValue::Raw(raw));
        Ok(())
    }

    /// Sets the value to a value of some type.
    pub fn set_obj(&mut self, obj: impl Into<Obj>) {
        self.value = Some(AnyValue::Obj(Box::new(obj.into())));
    }

    pub fn with_raw(mut self, raw: impl Into<Bytes>) -> Result<Self> {
        self.set_raw(raw)?;
        Ok(self)
    }

    pub fn with_obj(mut self, obj: impl Into<Obj>) -> Self {
        self.set_obj(obj);
        self
    }

    pub fn value(&self) -> Option<&AnyValue> {
        self.value.as_ref()
    }

    /// Returns the encoded value if the ANY holds one.
    pub fn raw(&self) -> Option<&Bytes> {
        match self.value.as_ref() {
            Some(AnyValue::Raw(raw)) => Some(raw),
            _ => None,
        }
    }

    /// Returns the encoding of the value.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self.value.as_ref() {
            Some(AnyValue::Raw(raw)) => Ok(raw.to_vec()),
            Some(AnyValue::Obj(obj)) => obj.as_ref().clone().encode(),
            None => Err(Error::ObjNotReady(self.base.class_name.into())),
        }
    }

    /// Returns the value decoded from the content through DEFINED BY.
    pub fn defined(&self) -> Option<(&Oid, &Obj)> {
        self.defined.as_deref().map(|(oid, obj)| (oid, obj))
    }

    pub(crate) fn set_defined(&mut self, oid: Oid, value: Obj) {
        self.defined = Some(Box::new((oid, value)))
    }

    pub(crate) fn adopt(&self, value: Self) -> Result<Self> {
        Ok(Any {
            base: self.base.decoded_at(0, 0, 0),
            value: value.value,
            defined: None,
        })
    }

    fn value_mut(&mut self) -> Result<&mut AnyValue> {
        let class_name = self.base.class_name;
        self.value.as_mut().ok_or_else(|| {
            Error::ObjNotReady(class_name.into())
        })
    }
}

impl Default for Any {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Any {
    fn eq(&self, other: &Self) -> bool {
        match (self.to_bytes(), other.to_bytes()) {
            (Ok(left), Ok(right)) => left == right,
            (left, right) => left.is_ok() == right.is_ok(),
        }
    }
}


//--- Codec and Asn1

impl Codec for Any {
    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    fn write_der(&mut self, out: &mut Vec<u8>) -> Result<()> {
        match self.value_mut()? {
            AnyValue::Raw(raw) => {
                out.extend_from_slice(raw);
                Ok(())
            }
            AnyValue::Obj(obj) => obj.encode_into(out),
        }
    }

    fn encode_first(&mut self, state: &mut Vec<usize>) -> Result<usize> {
        match self.value_mut()? {
            AnyValue::Raw(raw) => Ok(raw.len()),
            AnyValue::Obj(obj) => obj.encode1st(state),
        }
    }

    fn encode_second<T: Target, I: Iterator<Item = usize>>(
        &mut self, target: &mut T, state: &mut I
    ) -> Result<()> {
        match self.value_mut()? {
            AnyValue::Raw(raw) => write(target, raw),
            AnyValue::Obj(obj) => obj.encode2nd(target, state),
        }
    }

    fn write_cer<T: Target>(&mut self, target: &mut T) -> Result<()> {
        match self.value_mut()? {
            AnyValue::Raw(raw) => write(target, raw),
            AnyValue::Obj(obj) => obj.encode_cer(target),
        }
    }

    fn decode_value<'a>(
        &self, dec: &mut Decoder, data: &'a [u8], offset: usize,
        tag_only: bool, evgen: bool,
    ) -> Result<Decoded<'a, Self>> {
        let base = &self.base;
        let (tag, tlen) = dec.any_tag(base, data, offset)?;
        if tag_only {
            return Ok(Decoded::TagMatched)
        }
        let lv = &data[tlen..];
        let (len, llen) = Length::decode_any(lv).map_err(|err| {
            dec.at(base, offset, err)
        })?;
        let (tlvlen, lenindef) = match len {
            Length::Definite(len) => {
                if len > lv.len() - llen {
                    return Err(dec.short(base, offset))
                }
                (tlen + llen + len, false)
            }
            Length::Indefinite => {
                if !dec.bered() {
                    return Err(dec.err(
                        base, offset, DecodeErrorKind::LenIndefForm, ""
                    ))
                }
                let chunk_spec = Obj::from(Any::new());
                let mut rest = &lv[llen..];
                let mut sub_offset = offset + tlen + llen;
                let mut vlen = 0;
                let mut idx = 0;
                while !starts_with_eoc(rest) {
                    let (chunk, tail) = dec.child(PathElem::Index(idx), |dec| {
                        dec.decode_atomic(&chunk_spec, rest, sub_offset, false)
                    })?;
                    let chunk_len = chunk.base().tlvlen();
                    vlen += chunk_len;
                    sub_offset += chunk_len;
                    rest = tail;
                    idx += 1;
                }
                (tlen + llen + vlen + EOC_LEN, true)
            }
        };
        let mut res_base = base.decoded_at(offset, 0, tlvlen);
        res_base.tag = tag;
        res_base.lenindef = lenindef;
        let raw = (!evgen).then(|| {
            AnyValue::Raw(Bytes::copy_from_slice(&data[..tlvlen]))
        });
        Ok(Decoded::Value(
            Any { base: res_base, value: raw, defined: None },
            &data[tlvlen..]
        ))
    }

    fn from_obj(obj: Obj) -> Result<Self> {
        Self::try_from(obj)
    }

    fn check_implicit(&self) -> Result<()> {
        Err(Error::invalid("ANY can not be implicitly tagged"))
    }
}

impl Asn1 for Any {
    fn base(&self) -> &Base {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "ANY"
    }

    fn ready(&self) -> bool {
        self.value.is_some()
    }

    fn bered(&self) -> bool {
        if self.base.expl_lenindef || self.base.lenindef {
            return true
        }
        self.defined.as_ref().map(|defined| defined.1.bered()).unwrap_or(false)
    }

    fn tag_order(&self) -> TagOrder {
        if let Some(expl) = self.base.expl {
            return expl.order()
        }
        match self.value.as_ref() {
            Some(AnyValue::Raw(raw)) => {
                Ident::strip(raw).map(|(tag, _)| tag.order())
                    .unwrap_or(TagOrder::MIN)
            }
            Some(AnyValue::Obj(obj)) => obj.tag_order(),
            None => self.base.tag.order(),
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::ctx::Ctx;
    use crate::encode::encode2pass;
    use crate::int::Integer;
    use crate::string::OctetString;

    #[test]
    fn encode() {
        let mut value = Any::new().with_obj(Integer::from(-123));
        assert_eq!(value.encode().unwrap(), b"\x02\x01\x85");
        assert_eq!(encode2pass(&mut value).unwrap(), b"\x02\x01\x85");
        let raw = Any::new().with_raw(&b"\x02\x01\x85"[..]).unwrap();
        assert_eq!(raw, value);
        assert!(Any::new().with_raw(Bytes::new()).is_err());
        assert!(Any::new().implicit(Ident::ctxp(1)).is_err());
    }

    #[test]
    fn decode() {
        let (res, tail) = Any::new().decode(
            b"\x04\x05hello\xff", &Ctx::new()
        ).unwrap();
        assert_eq!(tail, b"\xff");
        assert_eq!(res.raw().unwrap().as_ref(), b"\x04\x05hello");
        assert_eq!(res.base().tlen(), 0);
        assert_eq!(res.base().tlvlen(), 7);
        let inner = OctetString::new().decod(res.raw().unwrap(), &Ctx::new())
            .unwrap();
        assert_eq!(inner, &b"hello"[..]);
    }

    #[test]
    fn decode_lenindef() {
        let data = b"\x30\x80\x24\x80\x04\x01a\x00\x00\x02\x01\x01\x00\x00\xff";
        assert!(Any::new().decode(data, &Ctx::new()).unwrap_err()
            .is_decode_kind(DecodeErrorKind::LenIndefForm));
        let (res, tail) = Any::new().decode(data, &Ctx::ber()).unwrap();
        assert_eq!(tail, b"\xff");
        assert!(res.base().lenindef());
        assert!(res.bered());
        assert_eq!(res.raw().unwrap().as_ref(), &data[..data.len() - 1]);
    }
}
