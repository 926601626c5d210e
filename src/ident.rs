//! Tags and the identifier octets of an encoded value.
//!
//! This is a private module. The relevant items are re-exported by the
//! parent.

use std::fmt;
use crate::encode::Target;
use crate::error::{DecodeError, DecodeErrorKind};


//------------ Tag -----------------------------------------------------------

/// A class and number pair.
///
/// A tag says what type a value has. Combined with the primitive or
/// constructed flag it forms the identifier octets of an encoded value,
/// see [`Ident`]. Numbers are limited to `u32`.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
#[repr(transparent)]
pub struct Tag(Ident);

impl Tag {
    pub const fn new(class: Class, number: u32) -> Self {
        Tag(Ident::new(class, false, number))
    }

    /// A context specific tag.
    pub const fn ctx(number: u32) -> Self {
        Tag::new(Class::Context, number)
    }

    pub const fn class(self) -> Class {
        self.0.class()
    }

    pub const fn number(self) -> u32 {
        self.0.number()
    }

    /// The identifier octets of a primitive value with this tag.
    pub const fn primitive(self) -> Ident {
        self.0
    }

    /// The identifier octets of a constructed value with this tag.
    pub const fn constructed(self) -> Ident {
        self.0.with_constructed(true)
    }

    pub const fn order(self) -> TagOrder {
        TagOrder::new(self.class(), self.number())
    }

    /// Returns the ASN.1 name of a universal tag known to this crate.
    fn universal_name(self) -> Option<&'static str> {
        if !matches!(self.class(), Class::Universal) {
            return None
        }
        let name = match self.number() {
            0 => "EOC",
            1 => "BOOLEAN",
            2 => "INTEGER",
            3 => "BIT STRING",
            4 => "OCTET STRING",
            5 => "NULL",
            6 => "OBJECT IDENTIFIER",
            10 => "ENUMERATED",
            12 => "UTF8String",
            16 => "SEQUENCE",
            17 => "SET",
            18 => "NumericString",
            19 => "PrintableString",
            20 => "TeletexString",
            21 => "VideotexString",
            22 => "IA5String",
            23 => "UTCTime",
            24 => "GeneralizedTime",
            25 => "GraphicString",
            26 => "VisibleString",
            27 => "GeneralString",
            28 => "UniversalString",
            30 => "BMPString",
            _ => return None,
        };
        Some(name)
    }
}

/// # Universal tags
///
/// Numbers are from X.690, clause 8.4.
impl Tag {
    pub const END_OF_CONTENTS: Self = Self::new(Class::Universal, 0);
    pub const BOOLEAN: Self = Self::new(Class::Universal, 1);
    pub const INTEGER: Self = Self::new(Class::Universal, 2);
    pub const BIT_STRING: Self = Self::new(Class::Universal, 3);
    pub const OCTET_STRING: Self = Self::new(Class::Universal, 4);
    pub const NULL: Self = Self::new(Class::Universal, 5);
    pub const OID: Self = Self::new(Class::Universal, 6);
    pub const ENUMERATED: Self = Self::new(Class::Universal, 10);
    pub const UTF8_STRING: Self = Self::new(Class::Universal, 12);

    /// Shared by SEQUENCE and SEQUENCE OF.
    pub const SEQUENCE: Self = Self::new(Class::Universal, 16);

    /// Shared by SET and SET OF.
    pub const SET: Self = Self::new(Class::Universal, 17);

    pub const NUMERIC_STRING: Self = Self::new(Class::Universal, 18);
    pub const PRINTABLE_STRING: Self = Self::new(Class::Universal, 19);
    pub const TELETEX_STRING: Self = Self::new(Class::Universal, 20);
    pub const VIDEOTEX_STRING: Self = Self::new(Class::Universal, 21);
    pub const IA5_STRING: Self = Self::new(Class::Universal, 22);
    pub const UTC_TIME: Self = Self::new(Class::Universal, 23);
    pub const GENERALIZED_TIME: Self = Self::new(Class::Universal, 24);
    pub const GRAPHIC_STRING: Self = Self::new(Class::Universal, 25);
    pub const VISIBLE_STRING: Self = Self::new(Class::Universal, 26);
    pub const GENERAL_STRING: Self = Self::new(Class::Universal, 27);
    pub const UNIVERSAL_STRING: Self = Self::new(Class::Universal, 28);
    pub const BMP_STRING: Self = Self::new(Class::Universal, 30);
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(name) = self.universal_name() {
            return f.write_str(name)
        }
        let prefix = match self.class() {
            Class::Universal => "UNIVERSAL ",
            Class::Application => "APPLICATION ",
            Class::Context => "",
            Class::Private => "PRIVATE ",
        };
        write!(f, "[{}{}]", prefix, self.number())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Tag").field(&format_args!("{}", self)).finish()
    }
}


//------------ Ident ---------------------------------------------------------

/// Encoded identifier octets.
///
/// Values keep their identifier in encoded form so that it can be written
/// and compared against input data directly. The octets are held in a
/// fixed buffer; unused trailing octets are always zero, so the derived
/// comparisons work on the encoded form.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct Ident {
    octets: [u8; MAX_IDENT_LEN],
    len: u8,
}

/// A `u32` tag number needs at most five base-128 groups.
const MAX_IDENT_LEN: usize = 6;

/// The constructed bit of the first identifier octet.
const CONSTRUCTED: u8 = 0x20;

/// The number bits of the first octet, all set for the long form.
const LONG_FORM: u8 = 0x1f;

impl Ident {
    pub const END_OF_CONTENTS: Self = Self::new(Class::Universal, false, 0);

    pub const fn new(class: Class, constructed: bool, number: u32) -> Self {
        let mut octets = [0; MAX_IDENT_LEN];
        octets[0] = class.into_u8();
        if constructed {
            octets[0] |= CONSTRUCTED;
        }
        if number < LONG_FORM as u32 {
            octets[0] |= number as u8;
            return Ident { octets, len: 1 }
        }
        octets[0] |= LONG_FORM;

        let mut groups: u32 = 1;
        while groups < 5 && number >> (7 * groups) != 0 {
            groups += 1;
        }
        let mut i = 0;
        while i < groups {
            let mut octet = (number >> (7 * (groups - 1 - i))) as u8 & 0x7f;
            if i + 1 < groups {
                octet |= 0x80;
            }
            octets[1 + i as usize] = octet;
            i += 1;
        }
        Ident { octets, len: 1 + groups as u8 }
    }

    /// Primitive context specific identifier, `[number]` IMPLICIT.
    pub const fn ctxp(number: u32) -> Self {
        Self::new(Class::Context, false, number)
    }

    /// Constructed context specific identifier.
    ///
    /// Used for EXPLICIT tags and for IMPLICIT tags of constructed types.
    pub const fn ctxc(number: u32) -> Self {
        Self::new(Class::Context, true, number)
    }

    pub const fn from_tag(tag: Tag, constructed: bool) -> Self {
        tag.0.with_constructed(constructed)
    }

    pub const fn with_constructed(mut self, constructed: bool) -> Self {
        if constructed {
            self.octets[0] |= CONSTRUCTED;
        }
        else {
            self.octets[0] &= !CONSTRUCTED;
        }
        self
    }

    pub const fn tag(self) -> Tag {
        Tag(self.with_constructed(false))
    }

    pub const fn class(self) -> Class {
        Class::from_u8(self.octets[0])
    }

    pub const fn is_constructed(self) -> bool {
        self.octets[0] & CONSTRUCTED != 0
    }

    pub const fn number(self) -> u32 {
        if self.len == 1 {
            return (self.octets[0] & LONG_FORM) as u32
        }
        let mut res = 0u32;
        let mut i = 1;
        while i < self.len as usize {
            res = (res << 7) | (self.octets[i] & 0x7f) as u32;
            i += 1;
        }
        res
    }

    /// Returns the key DER uses to sort SET components.
    ///
    /// The constructed bit is ignored.
    pub const fn order(self) -> TagOrder {
        TagOrder::new(self.class(), self.number())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.octets[..self.len as usize]
    }

    /// Parses identifier octets at the start of `data`.
    ///
    /// Returns the identifier and its encoded length. Non-minimal long
    /// forms are rejected.
    pub fn strip(data: &[u8]) -> Result<(Self, usize), DecodeError> {
        let Some(&first) = data.first() else {
            return Err(DecodeError::new(
                DecodeErrorKind::NotEnoughData, "no data at all"
            ))
        };
        let mut octets = [0; MAX_IDENT_LEN];
        octets[0] = first;
        if first & LONG_FORM != LONG_FORM {
            return Ok((Ident { octets, len: 1 }, 1))
        }

        let groups = match data[1..].iter().position(|x| x & 0x80 == 0) {
            Some(pos) => &data[1..pos + 2],
            None => return Err(DecodeError::malformed("unfinished tag")),
        };
        if groups.len() == 1 && groups[0] < LONG_FORM {
            return Err(DecodeError::malformed("unexpected long form"))
        }
        if groups[0] == 0x80 {
            return Err(DecodeError::malformed(
                "leading zero byte in tag value"
            ))
        }
        // Five groups carry 35 bits. Only the low 32 may be used.
        if groups.len() >= MAX_IDENT_LEN
            || (groups.len() == MAX_IDENT_LEN - 1 && groups[0] & 0x70 != 0)
        {
            return Err(DecodeError::malformed("too big tag number"))
        }
        octets[1..=groups.len()].copy_from_slice(groups);
        let len = groups.len() + 1;
        Ok((Ident { octets, len: len as u8 }, len))
    }

    pub const fn encoded_len(self) -> usize {
        self.len as usize
    }

    pub fn write_encoded<T: Target>(
        self, target: &mut T
    ) -> Result<(), T::Error> {
        target.write_all(self.as_slice())
    }
}

impl From<Tag> for Ident {
    fn from(tag: Tag) -> Self {
        tag.primitive()
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.tag(), f)
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut res = f.debug_struct("Ident");
        res.field("tag", &format_args!("{}", self.tag()));
        res.field("constructed", &self.is_constructed());
        res.field("octets", &self.as_slice());
        res.finish()
    }
}


//------------ TagOrder ------------------------------------------------------

/// Sort key of a tag: class first, then number.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TagOrder {
    pub class: Class,
    pub number: u32,
}

impl TagOrder {
    pub const MIN: Self = Self::new(Class::Universal, 0);

    pub const fn new(class: Class, number: u32) -> Self {
        TagOrder { class, number }
    }
}


//------------ Class ---------------------------------------------------------

/// Tag class.
///
/// Declaration order is the DER sort order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Class {
    Universal,
    Application,
    Context,
    Private,
}

impl Class {
    /// Takes the class from the top two bits of an identifier octet.
    const fn from_u8(octet: u8) -> Self {
        match octet >> 6 {
            0 => Class::Universal,
            1 => Class::Application,
            2 => Class::Context,
            _ => Class::Private,
        }
    }

    const fn into_u8(self) -> u8 {
        (self as u8) << 6
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn encode_short_and_long() {
        assert_eq!(Ident::new(Class::Universal, false, 2).as_slice(), b"\x02");
        assert_eq!(Ident::ctxc(0).as_slice(), b"\xa0");
        assert_eq!(Ident::ctxp(30).as_slice(), b"\x9e");
        assert_eq!(Ident::ctxp(31).as_slice(), b"\x9f\x1f");
        assert_eq!(Ident::ctxp(0x80).as_slice(), b"\x9f\x81\x00");
        assert_eq!(
            Ident::new(Class::Private, true, 16384).as_slice(),
            b"\xff\x81\x80\x00"
        );
        assert_eq!(
            Ident::new(Class::Application, false, u32::MAX).as_slice(),
            b"\x5f\x8f\xff\xff\xff\x7f"
        );
    }

    #[test]
    fn strip_round_trips() {
        for number in [0, 1, 30, 31, 127, 128, 16383, 16384, u32::MAX] {
            for class in [
                Class::Universal, Class::Application,
                Class::Context, Class::Private
            ] {
                for constructed in [false, true] {
                    let ident = Ident::new(class, constructed, number);
                    let mut data = ident.as_slice().to_vec();
                    data.push(0x00);
                    let (res, len) = Ident::strip(&data).unwrap();
                    assert_eq!(res, ident);
                    assert_eq!(len, ident.encoded_len());
                    assert_eq!(res.number(), number);
                    assert_eq!(res.class(), class);
                    assert_eq!(res.is_constructed(), constructed);
                }
            }
        }
    }

    #[test]
    fn strip_rejects_non_canonical() {
        let err = Ident::strip(b"").unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::NotEnoughData);
        assert_eq!(err.msg(), "no data at all");
        assert_eq!(
            Ident::strip(b"\x1f\x81").unwrap_err().msg(), "unfinished tag"
        );
        assert_eq!(
            Ident::strip(b"\x1f\x1e").unwrap_err().msg(),
            "unexpected long form"
        );
        assert_eq!(
            Ident::strip(b"\x1f\x80\x01").unwrap_err().msg(),
            "leading zero byte in tag value"
        );
        assert_eq!(
            Ident::strip(b"\x1f\xff\xff\xff\xff\x7f").unwrap_err().msg(),
            "too big tag number"
        );
    }

    #[test]
    fn tag_order() {
        assert!(Ident::ctxp(0).order() > Tag::BIT_STRING.primitive().order());
        assert!(Ident::ctxp(128).order() > Ident::ctxc(127).order());
        assert!(
            Tag::new(Class::Application, 200).primitive().order()
            < Ident::ctxp(0).order()
        );
        assert_eq!(Ident::ctxp(3).order(), Ident::ctxc(3).order());
    }

    #[test]
    fn display() {
        assert_eq!(Tag::INTEGER.to_string(), "INTEGER");
        assert_eq!(Ident::ctxc(3).to_string(), "[3]");
        assert_eq!(
            Tag::new(Class::Application, 7).to_string(), "[APPLICATION 7]"
        );
    }
}
