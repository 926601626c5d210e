//! OBJECT IDENTIFIER.
//!
//! The value type [`Oid`] holds the arcs of an identifier as integers. The
//! schema type [`ObjectIdentifier`] can additionally carry the DEFINED BY
//! rules that select schemas for other values once the identifier has been
//! decoded.

use std::{fmt, str};
use std::borrow::Cow;
use smallvec::SmallVec;
use crate::decode::{Decoder, Defines};
use crate::error::{DecodeError, DecodeErrorKind, Error, Result};
use crate::ident::Tag;
use crate::obj::{primitive_codec, Asn1, Base, Codec, Decoded, Obj};


//------------ Oid -----------------------------------------------------------

/// An object identifier value.
///
/// An identifier has at least two arcs. The first arc is 0, 1 or 2 and if
/// it is 0 or 1, the second arc is at most 39.
///
/// Identifiers are usually created from their dotted form:
///
/// ```
/// use derasn::Oid;
///
/// let oid: Oid = "1.2.840.113549".parse().unwrap();
/// assert_eq!(oid.arcs(), &[1, 2, 840, 113549]);
/// assert_eq!(oid.to_string(), "1.2.840.113549");
/// ```
#[derive(Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Oid(SmallVec<[u64; 10]>);

impl Oid {
    /// Creates an identifier from its arcs.
    pub fn from_arcs(arcs: impl IntoIterator<Item = u64>) -> Result<Self> {
        let arcs: SmallVec<[u64; 10]> = arcs.into_iter().collect();
        Self::check(&arcs).map_err(Error::from)?;
        Ok(Oid(arcs))
    }

    fn check(arcs: &[u64]) -> Result<(), DecodeError> {
        let invalid = |msg| DecodeError::new(DecodeErrorKind::InvalidOid, msg);
        match arcs {
            [] | [_] => Err(invalid("less than 2 arcs")),
            [0 | 1, second, ..] if *second > 39 => {
                Err(invalid("second arc is too wide"))
            }
            [2, second, ..] if *second > u64::MAX - 80 => {
                Err(invalid("second arc is too wide"))
            }
            [0..=2, ..] => Ok(()),
            _ => Err(invalid("unacceptable first arc value")),
        }
    }

    pub fn arcs(&self) -> &[u64] {
        self.0.as_slice()
    }

    /// Returns a new identifier with the given arcs appended.
    pub fn join(&self, arcs: impl IntoIterator<Item = u64>) -> Self {
        let mut res = self.clone();
        res.0.extend(arcs);
        res
    }

    /// Returns the content octets of the encoded identifier.
    pub fn to_content(&self) -> Vec<u8> {
        let mut res = Vec::new();
        let mut arcs = self.0.iter().copied();
        // The first two arcs are always there and combine into one
        // subidentifier that can't overflow.
        let first = arcs.next().unwrap_or(0);
        let second = arcs.next().unwrap_or(0);
        push_subid(&mut res, first * 40 + second);
        for arc in arcs {
            push_subid(&mut res, arc);
        }
        res
    }

    /// Decodes the content octets of an identifier.
    ///
    /// Returns the identifier and whether a non-minimal subidentifier was
    /// present. Such an encoding is only accepted if `bered` is true.
    pub fn from_content(
        mut content: &[u8], bered: bool
    ) -> Result<(Self, bool), DecodeError> {
        if content.is_empty() {
            return Err(DecodeError::new(
                DecodeErrorKind::NotEnoughData, "zero length"
            ))
        }
        let mut subids: SmallVec<[u64; 10]> = SmallVec::new();
        let mut ber_encoded = false;
        while !content.is_empty() {
            if content[0] == 0x80 {
                if !bered {
                    return Err(DecodeError::malformed(
                        "non normalized arc encoding"
                    ))
                }
                ber_encoded = true;
            }
            let mut arc = 0u64;
            let mut idx = 0;
            loop {
                let Some(&octet) = content.get(idx) else {
                    return Err(DecodeError::malformed("unfinished OID"))
                };
                if arc > u64::MAX >> 7 {
                    return Err(DecodeError::malformed(
                        "too huge value for local unsigned long"
                    ))
                }
                arc = (arc << 7) | (octet & 0x7F) as u64;
                idx += 1;
                if octet & 0x80 == 0 {
                    break
                }
            }
            subids.push(arc);
            content = &content[idx..];
        }
        let (first, second) = match subids[0] {
            first @ 0..=39 => (0, first),
            first @ 40..=79 => (1, first - 40),
            first => (2, first - 80),
        };
        let mut arcs = SmallVec::with_capacity(subids.len() + 1);
        arcs.push(first);
        arcs.push(second);
        arcs.extend_from_slice(&subids[1..]);
        Ok((Oid(arcs), ber_encoded))
    }
}

fn push_subid(target: &mut Vec<u8>, mut value: u64) {
    let mut buf = [0u8; 10];
    let mut idx = buf.len() - 1;
    buf[idx] = (value & 0x7F) as u8;
    value >>= 7;
    while value > 0 {
        idx -= 1;
        buf[idx] = 0x80 | (value & 0x7F) as u8;
        value >>= 7;
    }
    target.extend_from_slice(&buf[idx..]);
}


//--- FromStr

impl str::FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let arcs = s.split('.').map(|arc| {
            arc.parse::<u64>().map_err(|_| {
                DecodeError::new(
                    DecodeErrorKind::InvalidOid, "unacceptable arcs values"
                )
            })
        }).collect::<Result<SmallVec<[u64; 10]>, _>>()?;
        Self::from_arcs(arcs)
    }
}


//--- Display and Debug

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for arc in &self.0 {
            if first {
                first = false;
            }
            else {
                f.write_str(".")?;
            }
            write!(f, "{}", arc)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}


//------------ ObjectIdentifier ----------------------------------------------

/// An OBJECT IDENTIFIER value.
///
/// Besides the value, the schema may carry [`Defines`] rules. When a value
/// of this schema is decoded as part of a SEQUENCE or SET, the rules
/// determine how other components of that record are decoded.
#[derive(Clone, Debug)]
pub struct ObjectIdentifier {
    base: Base,
    value: Option<Oid>,
    default: Option<Oid>,
    defines: Defines,
}

impl ObjectIdentifier {
    pub fn new() -> Self {
        ObjectIdentifier {
            base: Base::new("ObjectIdentifier", Tag::OID.primitive()),
            value: None,
            default: None,
            defines: Defines::new(),
        }
    }

    /// Returns the value if there is one.
    pub fn value(&self) -> Option<&Oid> {
        self.value.as_ref()
    }

    pub fn set(&mut self, value: Oid) {
        self.value = Some(value)
    }

    pub fn with_value(mut self, value: Oid) -> Self {
        self.set(value);
        self
    }

    /// Attaches DEFINED BY rules to the schema.
    pub fn with_defines(mut self, defines: Defines) -> Self {
        self.defines = defines;
        self
    }

    /// Returns the DEFINED BY rules of the schema if it has any.
    pub fn defines(&self) -> Option<&Defines> {
        if self.defines.is_empty() {
            None
        }
        else {
            Some(&self.defines)
        }
    }

    /// Adds a DEFAULT value.
    pub fn default(mut self, value: Oid) -> Self {
        self.base.optional = true;
        if self.value.is_none() {
            self.value = Some(value.clone());
        }
        self.default = Some(value);
        self
    }

    pub fn default_value(&self) -> Option<&Oid> {
        self.default.as_ref()
    }

    pub fn is_default(&self) -> bool {
        self.default.is_some() && self.value == self.default
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub(crate) fn adopt(&self, value: Self) -> Result<Self> {
        Ok(ObjectIdentifier {
            base: self.base.decoded_at(0, 0, 0),
            value: value.value.or_else(|| self.default.clone()),
            default: self.default.clone(),
            defines: self.defines.clone(),
        })
    }

    fn content(&self) -> Result<Cow<'_, [u8]>> {
        match self.value.as_ref() {
            Some(value) => Ok(Cow::Owned(value.to_content())),
            None => Err(Error::ObjNotReady(self.base.class_name.into())),
        }
    }
}


//--- From and PartialEq

impl From<Oid> for ObjectIdentifier {
    fn from(value: Oid) -> Self {
        Self::new().with_value(value)
    }
}

impl PartialEq for ObjectIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.base.same_tags(&other.base)
    }
}

impl PartialEq<Oid> for ObjectIdentifier {
    fn eq(&self, other: &Oid) -> bool {
        self.value.as_ref() == Some(other)
    }
}


//--- Codec and Asn1

impl Codec for ObjectIdentifier {
    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    primitive_codec!();

    fn decode_value<'a>(
        &self, dec: &mut Decoder, data: &'a [u8], offset: usize,
        tag_only: bool, _evgen: bool,
    ) -> Result<Decoded<'a, Self>> {
        let base = &self.base;
        let Some(hdr) = dec.primitive(base, data, offset, tag_only)? else {
            return Ok(Decoded::TagMatched)
        };
        let (value, ber_encoded) = Oid::from_content(
            hdr.value, dec.bered()
        ).map_err(|err| dec.at(base, offset, err))?;
        let mut base = base.decoded_at(offset, hdr.llen, hdr.value.len());
        base.ber_encoded = ber_encoded;
        Ok(Decoded::Value(
            ObjectIdentifier {
                base,
                value: Some(value),
                default: self.default.clone(),
                defines: self.defines.clone(),
            },
            hdr.tail
        ))
    }

    fn from_obj(obj: Obj) -> Result<Self> {
        Self::try_from(obj)
    }
}

impl Asn1 for ObjectIdentifier {
    fn base(&self) -> &Base {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "OBJECT IDENTIFIER"
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

    fn oid(s: &str) -> Oid {
        s.parse().unwrap()
    }

    #[test]
    fn construct() {
        assert_eq!(oid("2.999.3").arcs(), &[2, 999, 3]);
        assert_eq!(oid("1.2").join([3, 4]), oid("1.2.3.4"));
        let kind = |s: &str| {
            s.parse::<Oid>().unwrap_err().as_decode().unwrap().msg().to_string()
        };
        assert_eq!(kind("1"), "less than 2 arcs");
        assert_eq!(kind("3.1"), "unacceptable first arc value");
        assert_eq!(kind("1.40"), "second arc is too wide");
        assert_eq!(kind("1.x"), "unacceptable arcs values");
        assert!("1.2".parse::<Oid>().unwrap() < "1.2.0".parse().unwrap());
    }

    #[test]
    fn encode() {
        let mut value = ObjectIdentifier::from(oid("1.2.840.113549.1.1.1"));
        assert_eq!(
            value.encode().unwrap(),
            b"\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x01"
        );
        assert_eq!(
            ObjectIdentifier::from(oid("2.999")).encode().unwrap(),
            b"\x06\x02\x88\x37"
        );
    }

    #[test]
    fn decode() {
        let spec = ObjectIdentifier::new();
        let res = spec.decod(b"\x06\x03\x55\x04\x03", &Ctx::new()).unwrap();
        assert_eq!(res, oid("2.5.4.3"));

        let err = |data: &[u8]| {
            spec.decode(data, &Ctx::new()).unwrap_err()
        };
        assert!(err(b"\x06\x00").is_decode_kind(DecodeErrorKind::NotEnoughData));
        assert_eq!(
            err(b"\x06\x02\x55\x84").as_decode().unwrap().msg(),
            "unfinished OID"
        );
        assert_eq!(
            err(b"\x06\x03\x55\x80\x04").as_decode().unwrap().msg(),
            "non normalized arc encoding"
        );
        assert_eq!(
            err(b"\x06\x0C\x55\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF\x7F")
                .as_decode().unwrap().msg(),
            "too huge value for local unsigned long"
        );

        let res = spec.decod(b"\x06\x03\x55\x80\x04", &Ctx::ber()).unwrap();
        assert_eq!(res, oid("2.5.4"));
        assert!(res.base().ber_encoded());
    }
}
