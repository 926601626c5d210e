//! OCTET STRING and the machinery shared by all octet based strings.
//!
//! This is an internal module. Its public types are re-exported by the
//! parent.

use bytes::Bytes;
use crate::decode::Decoder;
use crate::encode::{
    append_tlv, tlv_len, write, write_eoc, write_header, write_lenindef,
    ChunkTarget, Target,
};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::ident::{Ident, Tag};
use crate::length::{starts_with_eoc, Length, EOC_LEN};
use crate::obj::{Asn1, Base, Codec, Decoded, Obj};
use crate::oid::Oid;
use crate::path::PathElem;
use super::LenBounds;


/// The maximum number of content octets in a CER primitive string.
const CER_CHUNK: usize = 1000;


//------------ OctetString ---------------------------------------------------

/// An OCTET STRING value.
///
/// An octet string is a sequence of octets, i.e., a glorified `[u8]`. Basic
/// Encoding Rules, however, allow this sequence to be broken up into chunks
/// that are encoded separately to allow for very large octet strings and
/// cases where one doesn’t yet know the length of the string.
///
/// # BER Encoding
///
/// Octet strings are either encoded as a primitive or a constructed value.
/// In the primitive form, the content octets are the string’s octets. In a
/// constructed form, the content is a sequence of encoded octets strings
/// which in turn may be primitive or constructed. In this case, the string’s
/// octets are the concatenation of all the content octets of the primitive
/// forms in the order as encountered. The constructed form is only accepted
/// when decoding BER.
///
/// In CER, the string must use the primitive form if it is at most 1000
/// octets long and the constructed form otherwise. The constructed form
/// consists of a sequence of primitive values each exactly with a 1000
/// octets of content except for the last one.
///
/// In DER, only the primitive form is allowed.
///
/// # Event mode
///
/// When decoding in event mode, the content is not kept. The chunks of a
/// constructed string are reported as separate events, and
/// [`payload_len`][Self::payload_len] still gives the length of the
/// string. Use [`OctetStringAggregator`][crate::decode::OctetStringAggregator]
/// to collect the content while streaming.
#[derive(Clone, Debug)]
pub struct OctetString {
    base: Base,
    value: Option<Bytes>,
    default: Option<Bytes>,
    bounds: LenBounds,
    payload_len: usize,
    defined: Option<Box<(Oid, Obj)>>,

    /// Whether the content is kept even in event mode.
    ///
    /// This is used for the chunks of strings that need their content.
    evgen_keep: bool,
}

impl OctetString {
    pub fn new() -> Self {
        OctetString {
            base: Base::new("OctetString", Tag::OCTET_STRING.primitive()),
            value: None,
            default: None,
            bounds: LenBounds::default(),
            payload_len: 0,
            defined: None,
            evgen_keep: false,
        }
    }

    /// Limits the length of the string to the given inclusive range.
    pub fn bounds(mut self, min: usize, max: Option<usize>) -> Self {
        self.bounds = LenBounds::new(min, max);
        self
    }

    /// Returns the content if there is one.
    pub fn value(&self) -> Option<&Bytes> {
        self.value.as_ref()
    }

    /// Returns the length of the string.
    ///
    /// This is available even if the value was decoded in event mode and
    /// the content wasn’t kept.
    pub fn payload_len(&self) -> usize {
        match self.value.as_ref() {
            Some(value) => value.len(),
            None => self.payload_len,
        }
    }

    /// Sets the content.
    pub fn set(&mut self, value: impl Into<Bytes>) -> Result<()> {
        let value = value.into();
        self.bounds.check(value.len())?;
        self.value = Some(value);
        Ok(())
    }

    pub fn with_value(mut self, value: impl Into<Bytes>) -> Result<Self> {
        self.set(value)?;
        Ok(self)
    }

    /// Adds a DEFAULT value.
    pub fn default(mut self, value: impl Into<Bytes>) -> Result<Self> {
        let value = value.into();
        self.bounds.check(value.len())?;
        self.base.optional = true;
        if self.value.is_none() {
            self.value = Some(value.clone());
        }
        self.default = Some(value);
        Ok(self)
    }

    pub fn default_value(&self) -> Option<&Bytes> {
        self.default.as_ref()
    }

    pub fn is_default(&self) -> bool {
        self.default.is_some() && self.value == self.default
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Returns the value decoded from the content through DEFINED BY.
    pub fn defined(&self) -> Option<(&Oid, &Obj)> {
        self.defined.as_deref().map(|(oid, obj)| (oid, obj))
    }

    pub(crate) fn set_defined(&mut self, oid: Oid, value: Obj) {
        self.defined = Some(Box::new((oid, value)))
    }

    pub(crate) fn adopt(&self, value: Self) -> Result<Self> {
        let mut res = OctetString {
            base: self.base.decoded_at(0, 0, 0),
            value: None,
            default: self.default.clone(),
            bounds: self.bounds,
            payload_len: 0,
            defined: None,
            evgen_keep: self.evgen_keep,
        };
        match value.value {
            Some(value) => res.set(value)?,
            None => res.value = self.default.clone(),
        }
        Ok(res)
    }

    fn content(&self) -> Result<&Bytes> {
        self.value.as_ref().ok_or_else(|| {
            Error::ObjNotReady(self.base.class_name.into())
        })
    }
}

impl Default for OctetString {
    fn default() -> Self {
        Self::new()
    }
}


//--- From and PartialEq

impl From<Bytes> for OctetString {
    fn from(value: Bytes) -> Self {
        let mut res = Self::new();
        res.value = Some(value);
        res
    }
}

impl From<Vec<u8>> for OctetString {
    fn from(value: Vec<u8>) -> Self {
        Bytes::from(value).into()
    }
}

impl<'a> From<&'a [u8]> for OctetString {
    fn from(value: &'a [u8]) -> Self {
        Bytes::copy_from_slice(value).into()
    }
}

impl PartialEq for OctetString {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.base.same_tags(&other.base)
    }
}

impl PartialEq<[u8]> for OctetString {
    fn eq(&self, other: &[u8]) -> bool {
        self.value.as_deref() == Some(other)
    }
}

impl<'a> PartialEq<&'a [u8]> for OctetString {
    fn eq(&self, other: &&'a [u8]) -> bool {
        self.value.as_deref() == Some(*other)
    }
}


//--- Codec and Asn1

impl Codec for OctetString {
    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    fn write_der(&mut self, out: &mut Vec<u8>) -> Result<()> {
        append_tlv(out, self.base.tag, self.content()?);
        Ok(())
    }

    fn encode_first(&mut self, _state: &mut Vec<usize>) -> Result<usize> {
        Ok(tlv_len(self.base.tag, self.content()?.len()))
    }

    fn encode_second<T: Target, I: Iterator<Item = usize>>(
        &mut self, target: &mut T, _state: &mut I
    ) -> Result<()> {
        let content = self.content()?;
        write_header(target, self.base.tag, Length::Definite(content.len()))?;
        write(target, content)
    }

    fn write_cer<T: Target>(&mut self, target: &mut T) -> Result<()> {
        write_cer_octets(target, self.base.tag, self.content()?)
    }

    fn decode_value<'a>(
        &self, dec: &mut Decoder, data: &'a [u8], offset: usize,
        tag_only: bool, evgen: bool,
    ) -> Result<Decoded<'a, Self>> {
        let keep = !evgen || self.evgen_keep;
        let Some(parts) = decode_parts(
            dec, &self.base, data, offset, tag_only, evgen, keep
        )? else {
            return Ok(Decoded::TagMatched)
        };
        if let Err(err) = self.bounds.check(parts.payload_len) {
            return Err(dec.malformed(&self.base, offset, err.to_string()))
        }
        let base = parts.base(&self.base, offset);
        Ok(Decoded::Value(
            OctetString {
                base,
                value: parts.content,
                default: self.default.clone(),
                bounds: self.bounds,
                payload_len: parts.payload_len,
                defined: None,
                evgen_keep: self.evgen_keep,
            },
            parts.tail
        ))
    }

    fn from_obj(obj: Obj) -> Result<Self> {
        Self::try_from(obj)
    }
}

impl Asn1 for OctetString {
    fn base(&self) -> &Base {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "OCTET STRING"
    }

    fn ready(&self) -> bool {
        self.value.is_some()
    }
}


//------------ StringParts ---------------------------------------------------

/// The content of a decoded octet based string.
pub(crate) struct StringParts<'a> {
    /// The octets of the string if they were kept.
    pub content: Option<Bytes>,

    /// The number of octets of the string.
    pub payload_len: usize,

    pub llen: usize,
    pub vlen: usize,

    /// Whether the string was encoded in constructed form.
    pub constructed: bool,

    pub lenindef: bool,

    /// The data following the string.
    pub tail: &'a [u8],
}

impl StringParts<'_> {
    /// Returns the header of the decoded value.
    pub fn base(&self, spec: &Base, offset: usize) -> Base {
        let mut res = spec.decoded_at(offset, self.llen, self.vlen);
        res.lenindef = self.lenindef;
        res.ber_encoded = self.constructed;
        res
    }
}

/// Decodes an octet based string in either primitive or constructed form.
///
/// The constructed form is only accepted when decoding BER. Its chunks are
/// decoded as OCTET STRINGs below the current path and are reported as
/// events in event mode. The content is only collected if `keep` is true.
///
/// Returns `None` if only the tag was to be checked.
pub(crate) fn decode_parts<'a>(
    dec: &mut Decoder, base: &Base, data: &'a [u8], offset: usize,
    tag_only: bool, evgen: bool, keep: bool,
) -> Result<Option<StringParts<'a>>> {
    let (tag, tlen) = dec.any_tag(base, data, offset)?;
    if tag == base.tag {
        if tag_only {
            return Ok(None)
        }
        let (llen, value, tail) = dec.definite(base, &data[tlen..], offset)?;
        return Ok(Some(StringParts {
            content: keep.then(|| Bytes::copy_from_slice(value)),
            payload_len: value.len(),
            llen,
            vlen: value.len(),
            constructed: false,
            lenindef: false,
            tail,
        }))
    }
    if tag != base.tag.with_constructed(true) {
        return Err(dec.mismatch(base, offset))
    }
    if !dec.bered() {
        return Err(dec.malformed(
            base, offset, "unallowed BER constructed encoding"
        ))
    }
    if tag_only {
        return Ok(None)
    }
    let hdr = dec.constructed_content(base, &data[tlen..], tlen, offset, true)?;
    let limit = hdr.value.len();

    let mut chunk_spec = OctetString::new();
    chunk_spec.evgen_keep = keep;
    let chunk_spec = Obj::from(chunk_spec);

    // Chunks are decoded from all the remaining data so that a chunk
    // overrunning the definite length is reported as such.
    let mut rest = &data[tlen + hdr.llen..];
    let mut sub_offset = offset + tlen + hdr.llen;
    let mut vlen = 0;
    let mut payload_len = 0;
    let mut content = Vec::new();
    let mut count = 0;
    let mut last_offset = offset;
    loop {
        if hdr.lenindef {
            if starts_with_eoc(rest) {
                break
            }
        }
        else {
            if vlen == limit {
                break
            }
            if vlen > limit {
                return dec.child(PathElem::Index(count - 1), |dec| {
                    Err(dec.malformed(base, last_offset, "chunk out of bounds"))
                })
            }
        }
        let (chunk, tail) = dec.child(PathElem::Index(count), |dec| {
            dec.decode(&chunk_spec, rest, sub_offset, evgen).map_err(|err| {
                if err.is_decode_kind(DecodeErrorKind::TagMismatch) {
                    dec.malformed(
                        base, sub_offset, "expected OctetString encoded chunk"
                    )
                }
                else {
                    err
                }
            })
        })?;
        let chunk = OctetString::try_from(chunk)?;
        let chunk_base = chunk.base();
        last_offset = chunk_base.offset();
        sub_offset += chunk_base.tlvlen();
        vlen += chunk_base.tlvlen();
        payload_len += chunk.payload_len();
        if let Some(value) = chunk.value.as_ref() {
            content.extend_from_slice(value);
        }
        rest = tail;
        count += 1;
    }
    let (vlen, tail) = if hdr.lenindef {
        (vlen + EOC_LEN, &rest[EOC_LEN..])
    }
    else {
        (vlen, rest)
    };
    Ok(Some(StringParts {
        content: keep.then(|| Bytes::from(content)),
        payload_len,
        llen: hdr.llen,
        vlen,
        constructed: true,
        lenindef: hdr.lenindef,
        tail,
    }))
}

/// Writes the CER encoding of an octet based string.
///
/// Strings of up to 1000 octets are written in primitive form. Longer
/// strings are split into chunks of 1000 octets inside a constructed value
/// of indefinite length.
pub(crate) fn write_cer_octets<T: Target>(
    target: &mut T, tag: Ident, octets: &[u8]
) -> Result<()> {
    if octets.len() <= CER_CHUNK {
        write_header(target, tag, Length::Definite(octets.len()))?;
        return write(target, octets)
    }
    log::debug!("writing {} octets as CER chunks", octets.len());
    write_lenindef(target, tag.with_constructed(true))?;
    {
        let mut split = ChunkTarget::new(
            octets.len(), CER_CHUNK, Tag::OCTET_STRING.primitive(), target
        );
        split.write_all(octets).map_err(Error::write)?;
    }
    write_eoc(target)
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::ctx::Ctx;
    use crate::encode::encode_cer;

    #[test]
    fn encode_decode() {
        let mut value = OctetString::from(&b"hello"[..]);
        assert_eq!(value.encode().unwrap(), b"\x04\x05hello");
        let res = OctetString::new().decod(b"\x04\x05hello", &Ctx::new())
            .unwrap();
        assert_eq!(res, &b"hello"[..]);
        assert_eq!(res.payload_len(), 5);
        assert!(matches!(
            OctetString::new().encode(), Err(Error::ObjNotReady(_))
        ));
    }

    #[test]
    fn bounds() {
        let spec = OctetString::new().bounds(4, Some(4));
        assert!(matches!(
            spec.clone().with_value(&b"hello"[..]), Err(Error::Bounds(_))
        ));
        assert!(spec.clone().with_value(&b"hell"[..]).is_ok());
        let err = spec.decode(b"\x04\x05hello", &Ctx::new()).unwrap_err();
        assert_eq!(
            err.as_decode().unwrap().msg(), "unsatisfied bounds: 4 <= 5 <= 4"
        );
    }

    #[test]
    fn decode_constructed() {
        let data = b"\x24\x80\x04\x02ab\x24\x06\x04\x01c\x04\x01d\x00\x00";
        let spec = OctetString::new();
        let err = spec.decode(data, &Ctx::new()).unwrap_err();
        assert_eq!(
            err.as_decode().unwrap().msg(), "unallowed BER constructed encoding"
        );
        let res = spec.decod(data, &Ctx::ber()).unwrap();
        assert_eq!(res, &b"abcd"[..]);
        assert!(res.base().ber_encoded());
        assert!(res.base().lenindef());
        assert_eq!(res.base().vlen(), data.len() - 2);
    }

    #[test]
    fn decode_bad_chunks() {
        let spec = OctetString::new();
        let err = spec.decode(
            b"\x24\x04\x02\x01\x01\x00", &Ctx::ber()
        ).unwrap_err();
        let err = err.as_decode().unwrap();
        assert_eq!(err.msg(), "expected OctetString encoded chunk");
        assert_eq!(err.path().to_string(), "0");
        assert_eq!(err.offset(), 2);

        let err = spec.decode(
            b"\x24\x03\x04\x02ab", &Ctx::ber()
        ).unwrap_err();
        let err = err.as_decode().unwrap();
        assert_eq!(err.msg(), "chunk out of bounds");
        assert_eq!(err.path().to_string(), "0");
    }

    #[test]
    fn cer_chunks() {
        let content = vec![0x5Au8; 2500];
        let mut value = OctetString::from(content.clone());
        let res = encode_cer(&mut value).unwrap();
        assert_eq!(&res[..2], b"\x24\x80");
        assert_eq!(&res[2..6], b"\x04\x82\x03\xe8");
        assert_eq!(&res[res.len() - 2..], b"\x00\x00");
        let back = OctetString::new().decod(&res, &Ctx::ber()).unwrap();
        assert_eq!(back.value().unwrap().as_ref(), content.as_slice());

        let mut short = OctetString::from(vec![1u8; 1000]);
        assert_eq!(encode_cer(&mut short).unwrap(), short.encode().unwrap());
    }
}
