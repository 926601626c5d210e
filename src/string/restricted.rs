//! Restricted character string types.
//!
//! This is an internal module. Its public items are re-exported by the
//! parent.

use std::fmt;
use bytes::Bytes;
use crate::decode::Decoder;
use crate::encode::{append_tlv, tlv_len, write, write_header, Target};
use crate::error::{DecodeError, Error, Result};
use crate::ident::Tag;
use crate::length::Length;
use crate::obj::{Asn1, Base, Codec, Decoded, Obj};
use super::{decode_parts, write_cer_octets, LenBounds};


//------------ StringKind ----------------------------------------------------

/// The concrete type of a character string.
///
/// Each kind has its own universal tag and text encoding. Some kinds also
/// restrict the characters a value may contain.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StringKind {
    /// UTF8String, encoded as UTF-8.
    Utf8,

    /// NumericString, digits and space only.
    Numeric,

    /// PrintableString, the characters of X.680 table 10.
    Printable,

    Teletex,
    T61,
    Videotex,

    /// IA5String, seven bit ASCII.
    Ia5,

    Graphic,

    /// VisibleString, the printable ASCII characters.
    Visible,

    /// ISO646String, an alias of VisibleString.
    Iso646,

    General,

    /// UniversalString, encoded as UTF-32BE.
    Universal,

    /// BMPString, encoded as UTF-16BE.
    Bmp,
}

impl StringKind {
    /// Returns the universal tag of the kind.
    pub fn tag(self) -> Tag {
        match self {
            StringKind::Utf8 => Tag::UTF8_STRING,
            StringKind::Numeric => Tag::NUMERIC_STRING,
            StringKind::Printable => Tag::PRINTABLE_STRING,
            StringKind::Teletex | StringKind::T61 => Tag::TELETEX_STRING,
            StringKind::Videotex => Tag::VIDEOTEX_STRING,
            StringKind::Ia5 => Tag::IA5_STRING,
            StringKind::Graphic => Tag::GRAPHIC_STRING,
            StringKind::Visible | StringKind::Iso646 => Tag::VISIBLE_STRING,
            StringKind::General => Tag::GENERAL_STRING,
            StringKind::Universal => Tag::UNIVERSAL_STRING,
            StringKind::Bmp => Tag::BMP_STRING,
        }
    }

    /// Returns the ASN.1 name of the kind.
    pub fn asn1_name(self) -> &'static str {
        match self {
            StringKind::Utf8 => "UTF8String",
            StringKind::Numeric => "NumericString",
            StringKind::Printable => "PrintableString",
            StringKind::Teletex => "TeletexString",
            StringKind::T61 => "T61String",
            StringKind::Videotex => "VideotexString",
            StringKind::Ia5 => "IA5",
            StringKind::Graphic => "GraphicString",
            StringKind::Visible => "VisibleString",
            StringKind::Iso646 => "ISO646String",
            StringKind::General => "GeneralString",
            StringKind::Universal => "UniversalString",
            StringKind::Bmp => "BMPString",
        }
    }

    /// Returns the name used for the type in error messages.
    fn class_name(self) -> &'static str {
        match self {
            StringKind::Ia5 => "IA5String",
            _ => self.asn1_name(),
        }
    }

    fn encoding(self) -> Encoding {
        match self {
            StringKind::Utf8 => Encoding::Utf8,
            StringKind::Numeric | StringKind::Printable | StringKind::Ia5
            | StringKind::Visible | StringKind::Iso646 => Encoding::Ascii,
            StringKind::Teletex | StringKind::T61 | StringKind::Videotex
            | StringKind::Graphic | StringKind::General => Encoding::Latin1,
            StringKind::Universal => Encoding::Utf32Be,
            StringKind::Bmp => Encoding::Utf16Be,
        }
    }

    /// Checks the raw octets against the alphabet of the kind.
    fn check_alphabet(
        self, raw: &[u8], asterisk: bool, ampersand: bool
    ) -> bool {
        match self {
            StringKind::Numeric => {
                raw.iter().all(|&ch| ch == b' ' || ch.is_ascii_digit())
            }
            StringKind::Printable => {
                raw.iter().all(|&ch| {
                    ch.is_ascii_alphanumeric()
                    || b" '()+,-./:=?".contains(&ch)
                    || (asterisk && ch == b'*')
                    || (ampersand && ch == b'&')
                })
            }
            StringKind::Ia5 => raw.is_ascii(),
            StringKind::Visible | StringKind::Iso646 => {
                raw.iter().all(|&ch| (0x20..=0x7E).contains(&ch))
            }
            _ => true
        }
    }
}


//------------ Encoding ------------------------------------------------------

/// The text encodings used by the string kinds.
#[derive(Clone, Copy, Debug)]
enum Encoding {
    Utf8,
    Ascii,
    Latin1,
    Utf32Be,
    Utf16Be,
}

impl Encoding {
    fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Ascii => "ascii",
            Encoding::Latin1 => "iso-8859-1",
            Encoding::Utf32Be => "utf-32-be",
            Encoding::Utf16Be => "utf-16-be",
        }
    }

    fn encode_err(self) -> DecodeError {
        DecodeError::malformed(
            format!("'{}' codec can't encode value", self.name())
        )
    }

    fn decode_err(self) -> DecodeError {
        DecodeError::malformed(
            format!("'{}' codec can't decode value", self.name())
        )
    }

    fn encode(self, text: &str) -> Result<Vec<u8>, DecodeError> {
        match self {
            Encoding::Utf8 => Ok(text.as_bytes().into()),
            Encoding::Ascii => {
                if text.is_ascii() {
                    Ok(text.as_bytes().into())
                }
                else {
                    Err(self.encode_err())
                }
            }
            Encoding::Latin1 => {
                text.chars().map(|ch| {
                    u8::try_from(u32::from(ch)).map_err(|_| self.encode_err())
                }).collect()
            }
            Encoding::Utf32Be => {
                Ok(text.chars().flat_map(|ch| {
                    u32::from(ch).to_be_bytes()
                }).collect())
            }
            Encoding::Utf16Be => {
                Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect())
            }
        }
    }

    fn decode(self, raw: &[u8]) -> Result<String, DecodeError> {
        match self {
            Encoding::Utf8 => {
                String::from_utf8(raw.into()).map_err(|_| self.decode_err())
            }
            Encoding::Ascii => {
                if raw.is_ascii() {
                    Ok(raw.iter().copied().map(char::from).collect())
                }
                else {
                    Err(self.decode_err())
                }
            }
            Encoding::Latin1 => Ok(raw.iter().copied().map(char::from).collect()),
            Encoding::Utf32Be => {
                if raw.len() % 4 != 0 {
                    return Err(self.decode_err())
                }
                raw.chunks_exact(4).map(|chunk| {
                    let code = u32::from_be_bytes(
                        [chunk[0], chunk[1], chunk[2], chunk[3]]
                    );
                    char::from_u32(code).ok_or_else(|| self.decode_err())
                }).collect()
            }
            Encoding::Utf16Be => {
                if raw.len() % 2 != 0 {
                    return Err(self.decode_err())
                }
                char::decode_utf16(raw.chunks_exact(2).map(|chunk| {
                    u16::from_be_bytes([chunk[0], chunk[1]])
                })).map(|res| {
                    res.map_err(|_| self.decode_err())
                }).collect()
            }
        }
    }
}


//------------ CommonString --------------------------------------------------

/// A character string of any of the restricted string types.
///
/// The value is kept both as the encoded octets and as text. It can be set
/// from either and is checked against the text encoding and alphabet of
/// the string’s [`StringKind`] and its size bounds. Bounds count
/// characters, not octets.
///
/// Encoding and decoding work exactly like for
/// [`OctetString`][crate::OctetString], including the constructed form in
/// BER and the chunking of long values in CER. Unlike OCTET STRING, the
/// value is kept when decoding in event mode.
#[derive(Clone, Debug)]
pub struct CommonString {
    base: Base,
    kind: StringKind,
    value: Option<(Bytes, String)>,
    default: Option<(Bytes, String)>,
    bounds: LenBounds,
    allow_asterisk: bool,
    allow_ampersand: bool,
}

impl CommonString {
    pub fn new(kind: StringKind) -> Self {
        CommonString {
            base: Base::new(kind.class_name(), kind.tag().primitive()),
            kind,
            value: None,
            default: None,
            bounds: LenBounds::default(),
            allow_asterisk: false,
            allow_ampersand: false,
        }
    }

    pub fn utf8() -> Self {
        Self::new(StringKind::Utf8)
    }

    pub fn numeric() -> Self {
        Self::new(StringKind::Numeric)
    }

    pub fn printable() -> Self {
        Self::new(StringKind::Printable)
    }

    pub fn teletex() -> Self {
        Self::new(StringKind::Teletex)
    }

    pub fn t61() -> Self {
        Self::new(StringKind::T61)
    }

    pub fn videotex() -> Self {
        Self::new(StringKind::Videotex)
    }

    pub fn ia5() -> Self {
        Self::new(StringKind::Ia5)
    }

    pub fn graphic() -> Self {
        Self::new(StringKind::Graphic)
    }

    pub fn visible() -> Self {
        Self::new(StringKind::Visible)
    }

    pub fn iso646() -> Self {
        Self::new(StringKind::Iso646)
    }

    pub fn general() -> Self {
        Self::new(StringKind::General)
    }

    pub fn universal() -> Self {
        Self::new(StringKind::Universal)
    }

    pub fn bmp() -> Self {
        Self::new(StringKind::Bmp)
    }

    /// Limits the number of characters to the given inclusive range.
    pub fn bounds(mut self, min: usize, max: Option<usize>) -> Self {
        self.bounds = LenBounds::new(min, max);
        self
    }

    /// Allows `*` in a PrintableString.
    pub fn allow_asterisk(mut self, yes: bool) -> Self {
        self.allow_asterisk = yes;
        self
    }

    /// Allows `&` in a PrintableString.
    pub fn allow_ampersand(mut self, yes: bool) -> Self {
        self.allow_ampersand = yes;
        self
    }

    pub fn is_allow_asterisk(&self) -> bool {
        self.allow_asterisk
    }

    pub fn is_allow_ampersand(&self) -> bool {
        self.allow_ampersand
    }

    pub fn kind(&self) -> StringKind {
        self.kind
    }

    /// Returns the value as text.
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_ref().map(|(_, text)| text.as_str())
    }

    /// Returns the encoded octets of the value.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        self.value.as_ref().map(|(raw, _)| raw)
    }

    /// Sets the value from text.
    pub fn set(&mut self, text: &str) -> Result<()> {
        let raw = self.kind.encoding().encode(text)?;
        self.value = Some(self.sanitize(raw.into(), text.into())?);
        Ok(())
    }

    /// Sets the value from encoded octets.
    pub fn set_bytes(&mut self, raw: impl Into<Bytes>) -> Result<()> {
        let raw = raw.into();
        let text = self.kind.encoding().decode(&raw)?;
        self.value = Some(self.sanitize(raw, text)?);
        Ok(())
    }

    pub fn with_str(mut self, text: &str) -> Result<Self> {
        self.set(text)?;
        Ok(self)
    }

    pub fn with_bytes(mut self, raw: impl Into<Bytes>) -> Result<Self> {
        self.set_bytes(raw)?;
        Ok(self)
    }

    /// Adds a DEFAULT value.
    pub fn default(mut self, text: &str) -> Result<Self> {
        let raw = self.kind.encoding().encode(text)?;
        let value = self.sanitize(raw.into(), text.into())?;
        self.base.optional = true;
        if self.value.is_none() {
            self.value = Some(value.clone());
        }
        self.default = Some(value);
        Ok(self)
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default.as_ref().map(|(_, text)| text.as_str())
    }

    pub fn is_default(&self) -> bool {
        self.default.is_some() && self.value == self.default
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub(crate) fn adopt(&self, value: Self) -> Result<Self> {
        let mut res = CommonString {
            base: self.base.decoded_at(0, 0, 0),
            value: None,
            default: self.default.clone(),
            ..self.clone()
        };
        match value.value {
            Some((raw, _)) => res.set_bytes(raw)?,
            None => res.value = self.default.clone(),
        }
        Ok(res)
    }

    /// Checks the alphabet and bounds of a value.
    fn sanitize(
        &self, raw: Bytes, text: String
    ) -> Result<(Bytes, String), Error> {
        if !self.kind.check_alphabet(
            &raw, self.allow_asterisk, self.allow_ampersand
        ) {
            return Err(
                DecodeError::malformed("non satisfying alphabet value").into()
            )
        }
        self.bounds.check(text.chars().count())?;
        Ok((raw, text))
    }

    fn content(&self) -> Result<&Bytes> {
        self.as_bytes().ok_or_else(|| {
            Error::ObjNotReady(self.base.class_name.into())
        })
    }
}

impl PartialEq for CommonString {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.as_bytes() == other.as_bytes()
            && self.base.same_tags(&other.base)
    }
}

impl PartialEq<str> for CommonString {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl<'a> PartialEq<&'a str> for CommonString {
    fn eq(&self, other: &&'a str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl fmt::Display for CommonString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or(""))
    }
}


//--- Codec and Asn1

impl Codec for CommonString {
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
        let Some(parts) = decode_parts(
            dec, &self.base, data, offset, tag_only, evgen, true
        )? else {
            return Ok(Decoded::TagMatched)
        };
        let raw = parts.content.clone().unwrap_or_default();
        let value = self.kind.encoding().decode(&raw).map_err(Error::from)
            .and_then(|text| self.sanitize(raw, text));
        let value = match value {
            Ok(value) => value,
            Err(err) => {
                let msg = match err {
                    Error::Decode(err) => err.msg().to_string(),
                    err => err.to_string(),
                };
                return Err(dec.malformed(&self.base, offset, msg))
            }
        };
        let base = parts.base(&self.base, offset);
        Ok(Decoded::Value(
            CommonString {
                base,
                value: Some(value),
                ..self.clone()
            },
            parts.tail
        ))
    }

    fn from_obj(obj: Obj) -> Result<Self> {
        Self::try_from(obj)
    }
}

impl Asn1 for CommonString {
    fn base(&self) -> &Base {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        self.kind.asn1_name()
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

    #[test]
    fn encodings() {
        let mut value = CommonString::bmp().with_str("ад").unwrap();
        assert_eq!(value.as_bytes().unwrap().as_ref(), b"\x04\x30\x04\x34");
        assert_eq!(value.encode().unwrap(), b"\x1e\x04\x04\x30\x04\x34");

        let value = CommonString::universal().with_str("a").unwrap();
        assert_eq!(value.as_bytes().unwrap().as_ref(), b"\x00\x00\x00\x61");

        let value = CommonString::teletex().with_bytes(&b"\xe9t\xe9"[..])
            .unwrap();
        assert_eq!(value.as_str(), Some("été"));
        assert_eq!(value.base().tag(), Tag::TELETEX_STRING.primitive());

        let err = CommonString::printable().with_str("привет").unwrap_err();
        assert_eq!(err.to_string(), "DecodeError 'ascii' codec can't encode value");
        assert!(CommonString::utf8().with_bytes(&b"\xff"[..]).is_err());
    }

    #[test]
    fn alphabets() {
        assert!(CommonString::numeric().with_str("12 34").is_ok());
        assert!(CommonString::numeric().with_str("12a").is_err());
        assert!(CommonString::printable().with_str("foo*bar").is_err());
        let value = CommonString::printable().allow_asterisk(true)
            .with_str("foo*bar").unwrap();
        assert!(value.is_allow_asterisk());
        assert!(!value.is_allow_ampersand());
        assert!(CommonString::ia5().with_str("\x7f").is_ok());
        assert!(CommonString::visible().with_str("\x7f").is_err());
        assert_eq!(
            CommonString::visible().with_str("\t").unwrap_err().to_string(),
            "DecodeError non satisfying alphabet value"
        );
    }

    #[test]
    fn bounds() {
        let spec = CommonString::bmp().bounds(2, Some(2));
        assert_eq!(
            spec.clone().with_str("ада").unwrap_err().to_string(),
            "unsatisfied bounds: 2 <= 3 <= 2"
        );
        assert!(spec.with_str("ад").is_ok());
    }

    #[test]
    fn decode() {
        let spec = CommonString::printable();
        let res = spec.decod(b"\x13\x03abc", &Ctx::new()).unwrap();
        assert_eq!(res, "abc");
        assert_eq!(res.type_name(), "PrintableString");

        let err = spec.decode(b"\x13\x03a*c", &Ctx::new()).unwrap_err();
        let err = err.as_decode().unwrap();
        assert_eq!(err.msg(), "non satisfying alphabet value");
        assert_eq!(err.klass(), Some("PrintableString"));

        let err = spec.clone().bounds(0, Some(2)).decode(
            b"\x13\x03abc", &Ctx::new()
        ).unwrap_err();
        assert_eq!(
            err.as_decode().unwrap().msg(), "unsatisfied bounds: 0 <= 3 <= 2"
        );

        let res = CommonString::utf8().decod(
            b"\x2c\x80\x04\x01a\x04\x02bc\x00\x00", &Ctx::ber()
        ).unwrap();
        assert_eq!(res, "abc");
        assert!(res.base().ber_encoded());
    }
}
