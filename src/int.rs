//! INTEGER and ENUMERATED.
//!
//! Integers in BER can be of any size. The value type [`Int`] keeps them as
//! their minimal two’s complement octets, which is also their content in
//! DER, and converts from and to the built-in integer types where the value
//! fits.

use std::{cmp, fmt};
use std::borrow::Cow;
use std::str::FromStr;
use std::sync::Arc;
use bytes::Bytes;
use crate::decode::Decoder;
use crate::error::{BoundsError, DecodeError, DecodeErrorKind, Error, Result};
use crate::ident::Tag;
use crate::obj::{primitive_codec, Asn1, Base, Codec, Decoded, Obj};


//------------ Int -----------------------------------------------------------

/// An integer of arbitrary size.
///
/// The value is kept as big-endian two’s complement octets in the shortest
/// possible form: there is at least one octet and the first nine bits are
/// never all equal.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct Int(Bytes);

impl Int {
    /// Creates an integer from two’s complement octets.
    ///
    /// Redundant leading octets are removed. An empty slice is zero.
    pub fn from_signed_bytes(octets: &[u8]) -> Self {
        Int(Bytes::copy_from_slice(Self::trim(octets)))
    }

    /// Creates a non-negative integer from big-endian octets.
    pub fn from_unsigned_bytes(octets: &[u8]) -> Self {
        let mut res = Vec::with_capacity(octets.len() + 1);
        res.push(0);
        res.extend_from_slice(octets);
        Self::from_signed_bytes(&res)
    }

    fn trim(mut octets: &[u8]) -> &[u8] {
        if octets.is_empty() {
            return b"\x00"
        }
        while let [first, second, ..] = octets {
            let redundant = (*first == 0x00 && second & 0x80 == 0)
                || (*first == 0xFF && second & 0x80 != 0);
            if !redundant {
                break
            }
            octets = &octets[1..];
        }
        octets
    }

    /// Returns whether the octets are in the shortest form.
    fn is_minimal(octets: &[u8]) -> bool {
        !octets.is_empty() && Self::trim(octets).len() == octets.len()
    }

    /// Returns the content octets.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    pub fn is_negative(&self) -> bool {
        self.0[0] & 0x80 != 0
    }

    pub fn is_zero(&self) -> bool {
        self.0.as_ref() == b"\x00"
    }

    /// Converts the value into an `i128` if it fits.
    pub fn to_i128(&self) -> Option<i128> {
        if self.0.len() > 16 {
            return None
        }
        let mut buf = if self.is_negative() { [0xFF; 16] } else { [0; 16] };
        buf[16 - self.0.len()..].copy_from_slice(&self.0);
        Some(i128::from_be_bytes(buf))
    }

    /// Converts the value into an `i64` if it fits.
    pub fn to_i64(&self) -> Option<i64> {
        self.to_i128().and_then(|value| i64::try_from(value).ok())
    }

    /// Converts the value into a `u64` if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.is_negative() {
            return None
        }
        let octets = match self.0.split_first() {
            Some((0, rest)) => rest,
            _ => self.0.as_ref(),
        };
        if octets.len() > 8 {
            return None
        }
        Some(octets.iter().fold(0, |res, &octet| (res << 8) | octet as u64))
    }

    /// Returns the sign and the big-endian octets of the absolute value.
    fn magnitude(&self) -> (bool, Vec<u8>) {
        if !self.is_negative() {
            return (false, self.0.to_vec())
        }
        let mut res: Vec<u8> = self.0.iter().map(|x| !x).collect();
        for octet in res.iter_mut().rev() {
            let (sum, carry) = octet.overflowing_add(1);
            *octet = sum;
            if !carry {
                break
            }
        }
        // -2^(8n-1) negates to 0x80.. which still is the right magnitude
        // when read as unsigned.
        (true, res)
    }

    /// Returns the upper case hexadecimal form of the absolute value.
    ///
    /// The result has an even number of digits and a leading minus sign
    /// for negative values.
    pub fn to_hex(&self) -> String {
        let (negative, magnitude) = self.magnitude();
        let start = magnitude.iter().position(|&x| x != 0)
            .unwrap_or(magnitude.len().saturating_sub(1));
        let mut res = String::with_capacity(magnitude.len() * 2 + 1);
        if negative {
            res.push('-');
        }
        for octet in &magnitude[start..] {
            res.push_str(&format!("{:02X}", octet));
        }
        res
    }
}


//--- From

macro_rules! int_from_signed {
    ( $( $type:ident ),* ) => {
        $(
            impl From<$type> for Int {
                fn from(value: $type) -> Self {
                    Self::from_signed_bytes(&value.to_be_bytes())
                }
            }
        )*
    }
}

macro_rules! int_from_unsigned {
    ( $( $type:ident ),* ) => {
        $(
            impl From<$type> for Int {
                fn from(value: $type) -> Self {
                    Self::from_unsigned_bytes(&value.to_be_bytes())
                }
            }
        )*
    }
}

int_from_signed!(i8, i16, i32, i64, i128, isize);
int_from_unsigned!(u8, u16, u32, u64, u128, usize);


//--- FromStr

impl FromStr for Int {
    type Err = Error;

    /// Parses a decimal integer with an optional leading minus sign.
    fn from_str(s: &str) -> Result<Self> {
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        if digits.is_empty() {
            return Err(Error::invalid("empty integer"))
        }
        // Little-endian base-256 accumulator.
        let mut magnitude: Vec<u8> = vec![0];
        for ch in digits.chars() {
            let Some(digit) = ch.to_digit(10) else {
                return Err(Error::invalid(format!("invalid digit {:?}", ch)))
            };
            let mut carry = digit;
            for octet in magnitude.iter_mut() {
                let cur = (*octet as u32) * 10 + carry;
                *octet = (cur & 0xFF) as u8;
                carry = cur >> 8;
            }
            if carry > 0 {
                magnitude.push(carry as u8);
            }
        }
        magnitude.push(0);
        magnitude.reverse();
        if negative {
            for octet in magnitude.iter_mut() {
                *octet = !*octet;
            }
            for octet in magnitude.iter_mut().rev() {
                let (sum, carry) = octet.overflowing_add(1);
                *octet = sum;
                if !carry {
                    break
                }
            }
        }
        Ok(Self::from_signed_bytes(&magnitude))
    }
}


//--- PartialOrd and Ord

impl PartialOrd for Int {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Int {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        match (self.is_negative(), other.is_negative()) {
            (true, false) => cmp::Ordering::Less,
            (false, true) => cmp::Ordering::Greater,
            (false, false) => {
                self.0.len().cmp(&other.0.len()).then_with(|| {
                    self.0.cmp(&other.0)
                })
            }
            (true, true) => {
                other.0.len().cmp(&self.0.len()).then_with(|| {
                    self.0.cmp(&other.0)
                })
            }
        }
    }
}


//--- Display and Debug

impl fmt::Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const BASE: u64 = 1_000_000_000;

        let (negative, mut magnitude) = self.magnitude();
        let mut chunks = Vec::new();
        loop {
            let zeros = magnitude.iter().take_while(|&&x| x == 0).count();
            magnitude.drain(..zeros);
            if magnitude.is_empty() {
                break
            }
            let mut rem = 0u64;
            for octet in magnitude.iter_mut() {
                let cur = (rem << 8) | *octet as u64;
                *octet = (cur / BASE) as u8;
                rem = cur % BASE;
            }
            chunks.push(rem);
        }
        if negative {
            f.write_str("-")?;
        }
        match chunks.split_last() {
            None => f.write_str("0"),
            Some((first, rest)) => {
                write!(f, "{}", first)?;
                for chunk in rest.iter().rev() {
                    write!(f, "{:09}", chunk)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Int {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Int({})", self)
    }
}


//------------ IntSchema -----------------------------------------------------

/// The constraints shared by all values of an integer schema.
#[derive(Clone, Debug, Default)]
struct IntSchema {
    named: Vec<(&'static str, Int)>,
    min: Option<Int>,
    max: Option<Int>,
}

impl IntSchema {
    fn check_bounds(&self, value: &Int) -> Result<(), BoundsError> {
        let below = self.min.as_ref().map(|min| value < min).unwrap_or(false);
        let above = self.max.as_ref().map(|max| value > max).unwrap_or(false);
        if below || above {
            Err(BoundsError::new(self.min.as_ref(), value, self.max.as_ref()))
        }
        else {
            Ok(())
        }
    }

    fn by_name(&self, name: &str) -> Option<&Int> {
        self.named.iter().find(|item| item.0 == name).map(|item| &item.1)
    }

    fn name_of(&self, value: &Int) -> Option<&'static str> {
        self.named.iter().find(|item| &item.1 == value).map(|item| item.0)
    }
}


//------------ Integer -------------------------------------------------------

/// An INTEGER value.
///
/// A schema can limit the range of values through [`bounds`][Self::bounds]
/// and give names to values through [`named`][Self::named]. Both are
/// checked when setting a value and when decoding.
///
/// In DER, the content must be the shortest two’s complement form. When
/// decoding BER, longer forms are accepted and the value is marked as BER
/// encoded.
#[derive(Clone, Debug)]
pub struct Integer {
    base: Base,
    value: Option<Int>,
    default: Option<Int>,
    schema: Arc<IntSchema>,
}

impl Integer {
    /// Creates a schema without a value.
    pub fn new() -> Self {
        Integer {
            base: Base::new("Integer", Tag::INTEGER.primitive()),
            value: None,
            default: None,
            schema: Default::default(),
        }
    }

    /// Adds named values to the schema.
    pub fn named<I, V>(mut self, names: I) -> Self
    where I: IntoIterator<Item = (&'static str, V)>, V: Into<Int> {
        Arc::make_mut(&mut self.schema).named.extend(
            names.into_iter().map(|(name, value)| (name, value.into()))
        );
        self
    }

    /// Limits the values to the given inclusive range.
    ///
    /// A missing bound means the range is open on that side.
    pub fn bounds(mut self, min: Option<Int>, max: Option<Int>) -> Self {
        let schema = Arc::make_mut(&mut self.schema);
        schema.min = min;
        schema.max = max;
        self
    }

    /// Returns the value if there is one.
    pub fn value(&self) -> Option<&Int> {
        self.value.as_ref()
    }

    /// Returns the value as an `i64` if there is one and it fits.
    pub fn to_i64(&self) -> Option<i64> {
        self.value.as_ref().and_then(Int::to_i64)
    }

    /// Sets the value.
    pub fn set(&mut self, value: impl Into<Int>) -> Result<()> {
        let value = value.into();
        self.schema.check_bounds(&value)?;
        self.value = Some(value);
        Ok(())
    }

    /// Sets the value to the one with the given name.
    pub fn set_named(&mut self, name: &str) -> Result<()> {
        let value = match self.schema.by_name(name) {
            Some(value) => value.clone(),
            None => {
                return Err(Error::ObjUnknown(format!("integer value: {}", name)))
            }
        };
        self.set(value)
    }

    pub fn with_value(mut self, value: impl Into<Int>) -> Result<Self> {
        self.set(value)?;
        Ok(self)
    }

    pub fn with_named(mut self, name: &str) -> Result<Self> {
        self.set_named(name)?;
        Ok(self)
    }

    /// Returns the name of the current value if it has one.
    pub fn name(&self) -> Option<&'static str> {
        self.value.as_ref().and_then(|value| self.schema.name_of(value))
    }

    /// Returns the named values of the schema.
    pub fn names(&self) -> impl Iterator<Item = (&'static str, &Int)> {
        self.schema.named.iter().map(|(name, value)| (*name, value))
    }

    /// Adds a DEFAULT value.
    ///
    /// The value becomes optional and, unless it already has one, takes
    /// the default as its value.
    pub fn default(mut self, value: impl Into<Int>) -> Result<Self> {
        let value = value.into();
        self.schema.check_bounds(&value)?;
        self.base.optional = true;
        if self.value.is_none() {
            self.value = Some(value.clone());
        }
        self.default = Some(value);
        Ok(self)
    }

    pub fn default_value(&self) -> Option<&Int> {
        self.default.as_ref()
    }

    pub fn is_default(&self) -> bool {
        self.default.is_some() && self.value == self.default
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub(crate) fn adopt(&self, value: Self) -> Result<Self> {
        let mut res = Integer {
            base: self.base.decoded_at(0, 0, 0),
            value: None,
            default: self.default.clone(),
            schema: self.schema.clone(),
        };
        match value.value {
            Some(value) => res.set(value)?,
            None => res.value = self.default.clone(),
        }
        Ok(res)
    }

    fn content(&self) -> Result<Cow<'_, [u8]>> {
        match self.value.as_ref() {
            Some(value) => Ok(Cow::Borrowed(value.as_slice())),
            None => Err(Error::ObjNotReady(self.base.class_name.into())),
        }
    }

    /// Decodes the value and checks the bounds.
    ///
    /// Returns the decoded value and whether the data was BER encoded.
    fn decode_int<'a>(
        &self, dec: &mut Decoder, data: &'a [u8], offset: usize,
        tag_only: bool,
    ) -> Result<Decoded<'a, Self>> {
        let base = &self.base;
        let Some(hdr) = dec.primitive(base, data, offset, tag_only)? else {
            return Ok(Decoded::TagMatched)
        };
        if hdr.value.is_empty() {
            return Err(dec.err(
                base, offset, DecodeErrorKind::NotEnoughData, "zero length"
            ))
        }
        let ber_encoded = !Int::is_minimal(hdr.value);
        if ber_encoded && !dec.bered() {
            return Err(dec.malformed(base, offset, "non normalized integer"))
        }
        let value = Int::from_signed_bytes(hdr.value);
        if let Err(err) = self.schema.check_bounds(&value) {
            return Err(dec.malformed(base, offset, err.to_string()))
        }
        let mut base = base.decoded_at(offset, hdr.llen, hdr.value.len());
        base.ber_encoded = ber_encoded;
        Ok(Decoded::Value(
            Integer {
                base,
                value: Some(value),
                default: self.default.clone(),
                schema: self.schema.clone(),
            },
            hdr.tail
        ))
    }
}


//--- From and PartialEq

macro_rules! integer_from {
    ( $( $type:ident ),* ) => {
        $(
            impl From<$type> for Integer {
                fn from(value: $type) -> Self {
                    let mut res = Self::new();
                    res.value = Some(value.into());
                    res
                }
            }
        )*
    }
}

integer_from!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128);

impl From<Int> for Integer {
    fn from(value: Int) -> Self {
        let mut res = Self::new();
        res.value = Some(value);
        res
    }
}

impl PartialEq for Integer {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.base.same_tags(&other.base)
    }
}

impl PartialEq<i64> for Integer {
    fn eq(&self, other: &i64) -> bool {
        self.to_i64() == Some(*other)
    }
}


//--- Codec and Asn1

impl Codec for Integer {
    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    primitive_codec!();

    fn decode_value<'a>(
        &self, dec: &mut Decoder, data: &'a [u8], offset: usize,
        tag_only: bool, _evgen: bool,
    ) -> Result<Decoded<'a, Self>> {
        self.decode_int(dec, data, offset, tag_only)
    }

    fn from_obj(obj: Obj) -> Result<Self> {
        Self::try_from(obj)
    }
}

impl Asn1 for Integer {
    fn base(&self) -> &Base {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "INTEGER"
    }

    fn ready(&self) -> bool {
        self.value.is_some()
    }
}


//------------ Enumerated ----------------------------------------------------

/// An ENUMERATED value.
///
/// This is an INTEGER with its own tag that only accepts named values.
#[derive(Clone, Debug, PartialEq)]
pub struct Enumerated(Integer);

impl Enumerated {
    /// Creates a schema with the given named values.
    ///
    /// The list of values must not be empty.
    pub fn new<I, V>(names: I) -> Result<Self>
    where I: IntoIterator<Item = (&'static str, V)>, V: Into<Int> {
        let mut inner = Integer::new().named(names);
        if inner.schema.named.is_empty() {
            return Err(Error::invalid("schema must be specified"))
        }
        inner.base = Base::new("Enumerated", Tag::ENUMERATED.primitive());
        Ok(Enumerated(inner))
    }

    fn check(&self, value: &Int) -> Result<(), DecodeError> {
        if self.0.schema.name_of(value).is_none() {
            return Err(DecodeError::malformed(
                format!("unknown integer value: {}", value)
            ))
        }
        Ok(())
    }

    pub fn value(&self) -> Option<&Int> {
        self.0.value()
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.0.to_i64()
    }

    /// Sets the value. It has to be one of the named values.
    pub fn set(&mut self, value: impl Into<Int>) -> Result<()> {
        let value = value.into();
        self.check(&value)?;
        self.0.set(value)
    }

    pub fn set_named(&mut self, name: &str) -> Result<()> {
        self.0.set_named(name)
    }

    pub fn with_value(mut self, value: impl Into<Int>) -> Result<Self> {
        self.set(value)?;
        Ok(self)
    }

    pub fn with_named(mut self, name: &str) -> Result<Self> {
        self.set_named(name)?;
        Ok(self)
    }

    pub fn name(&self) -> Option<&'static str> {
        self.0.name()
    }

    pub fn names(&self) -> impl Iterator<Item = (&'static str, &Int)> {
        self.0.names()
    }

    /// Adds a DEFAULT value given by name.
    pub fn default(self, name: &str) -> Result<Self> {
        let value = match self.0.schema.by_name(name) {
            Some(value) => value.clone(),
            None => {
                return Err(Error::ObjUnknown(format!("integer value: {}", name)))
            }
        };
        Ok(Enumerated(self.0.default(value)?))
    }

    pub fn is_default(&self) -> bool {
        self.0.is_default()
    }

    pub fn has_default(&self) -> bool {
        self.0.has_default()
    }

    pub(crate) fn adopt(&self, value: Self) -> Result<Self> {
        if let Some(value) = value.value() {
            self.check(value)?;
        }
        self.0.adopt(value.0).map(Enumerated)
    }
}

impl Codec for Enumerated {
    fn base_mut(&mut self) -> &mut Base {
        &mut self.0.base
    }

    fn write_der(&mut self, out: &mut Vec<u8>) -> Result<()> {
        self.0.write_der(out)
    }

    fn encode_first(&mut self, state: &mut Vec<usize>) -> Result<usize> {
        self.0.encode_first(state)
    }

    fn encode_second<T: crate::encode::Target, I: Iterator<Item = usize>>(
        &mut self, target: &mut T, state: &mut I
    ) -> Result<()> {
        self.0.encode_second(target, state)
    }

    fn write_cer<T: crate::encode::Target>(
        &mut self, target: &mut T
    ) -> Result<()> {
        self.0.write_cer(target)
    }

    fn decode_value<'a>(
        &self, dec: &mut Decoder, data: &'a [u8], offset: usize,
        tag_only: bool, _evgen: bool,
    ) -> Result<Decoded<'a, Self>> {
        let res = self.0.decode_int(dec, data, offset, tag_only)?;
        if let Decoded::Value(ref value, _) = res {
            if let Some(int) = value.value() {
                self.check(int).map_err(|err| {
                    dec.at(&self.0.base, offset, err)
                })?;
            }
        }
        Ok(res.map(Enumerated))
    }

    fn from_obj(obj: Obj) -> Result<Self> {
        Self::try_from(obj)
    }
}

impl Asn1 for Enumerated {
    fn base(&self) -> &Base {
        &self.0.base
    }

    fn type_name(&self) -> &'static str {
        "ENUMERATED"
    }

    fn ready(&self) -> bool {
        self.0.ready()
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::ctx::Ctx;

    #[test]
    fn int_from_native() {
        assert_eq!(Int::from(0i32).as_slice(), b"\x00");
        assert_eq!(Int::from(127i32).as_slice(), b"\x7F");
        assert_eq!(Int::from(128i32).as_slice(), b"\x00\x80");
        assert_eq!(Int::from(-128i32).as_slice(), b"\x80");
        assert_eq!(Int::from(-129i32).as_slice(), b"\xFF\x7F");
        assert_eq!(Int::from(u64::MAX).as_slice(), b"\x00\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF");
        assert_eq!(Int::from(u64::MAX).to_u64(), Some(u64::MAX));
        assert_eq!(Int::from(i64::MIN).to_i64(), Some(i64::MIN));
        assert_eq!(Int::from(u128::MAX).to_i128(), None);
        assert_eq!(Int::from(-1i8).to_u64(), None);
    }

    #[test]
    fn int_display_and_parse() {
        for value in [
            0i128, 1, -1, 127, 128, -128, -129, 1_000_000_000,
            -999_999_999_999, i64::MAX as i128, i128::MIN, i128::MAX
        ] {
            let int = Int::from(value);
            assert_eq!(int.to_string(), value.to_string());
            assert_eq!(int.to_string().parse::<Int>().unwrap(), int);
        }
        let big = "-340282366920938463463374607431768211457";
        assert_eq!(big.parse::<Int>().unwrap().to_string(), big);
        assert!("".parse::<Int>().is_err());
        assert!("12a".parse::<Int>().is_err());
    }

    #[test]
    fn int_hex_and_order() {
        assert_eq!(Int::from(128).to_hex(), "80");
        assert_eq!(Int::from(-255).to_hex(), "-FF");
        assert_eq!(Int::from(0).to_hex(), "00");
        let mut values: Vec<Int> = [5i64, -300, 0, 70000, -1, 128]
            .into_iter().map(Int::from).collect();
        values.sort();
        assert_eq!(
            values.iter().map(|x| x.to_i64().unwrap()).collect::<Vec<_>>(),
            [-300, -1, 0, 5, 128, 70000]
        );
    }

    #[test]
    fn encode_decode() {
        assert_eq!(Integer::from(-123).encode().unwrap(), b"\x02\x01\x85");
        let res = Integer::new().decod(b"\x02\x01\x85", &Ctx::new()).unwrap();
        assert_eq!(res, -123);
        assert_eq!(
            Integer::from(256).encode().unwrap(), b"\x02\x02\x01\x00"
        );
    }

    #[test]
    fn decode_non_normalized() {
        let err = Integer::new().decode(
            b"\x02\x02\x00\x7F", &Ctx::new()
        ).unwrap_err();
        assert_eq!(err.as_decode().unwrap().msg(), "non normalized integer");
        let err = Integer::new().decode(
            b"\x02\x02\xFF\x80", &Ctx::new()
        ).unwrap_err();
        assert_eq!(err.as_decode().unwrap().msg(), "non normalized integer");

        let res = Integer::new().decod(b"\x02\x02\x00\x7F", &Ctx::ber()).unwrap();
        assert_eq!(res, 127);
        assert!(res.base().ber_encoded());

        let err = Integer::new().decode(b"\x02\x00", &Ctx::new()).unwrap_err();
        assert!(err.is_decode_kind(DecodeErrorKind::NotEnoughData));
    }

    #[test]
    fn bounds() {
        let spec = Integer::new().bounds(Some(Int::from(0)), Some(Int::from(10)));
        assert!(spec.clone().with_value(10).is_ok());
        assert!(matches!(
            spec.clone().with_value(11), Err(Error::Bounds(_))
        ));
        let err = spec.decode(b"\x02\x01\x0B", &Ctx::new()).unwrap_err();
        assert_eq!(
            err.as_decode().unwrap().msg(),
            "unsatisfied bounds: 0 <= 11 <= 10"
        );
    }

    #[test]
    fn named() {
        let spec = Integer::new().named([("v1", 0), ("v2", 1)]);
        let value = spec.clone().with_named("v2").unwrap();
        assert_eq!(value, 1);
        assert_eq!(value.name(), Some("v2"));
        assert!(matches!(
            spec.with_named("v3"), Err(Error::ObjUnknown(_))
        ));
    }

    #[test]
    fn enumerated() {
        assert!(Enumerated::new(Vec::<(&str, i32)>::new()).is_err());
        let spec = Enumerated::new([("a", 1), ("b", 2)]).unwrap();
        let mut value = spec.clone().with_named("b").unwrap();
        assert_eq!(value.encode().unwrap(), b"\x0A\x01\x02");
        assert_eq!(
            crate::encode::encode2pass(&mut value).unwrap(), b"\x0A\x01\x02"
        );
        assert_eq!(
            crate::encode::encode_cer(&mut value).unwrap(), b"\x0A\x01\x02"
        );
        assert!(spec.clone().with_value(3).is_err());
        let res = spec.decod(b"\x0A\x01\x01", &Ctx::new()).unwrap();
        assert_eq!(res.name(), Some("a"));
        let err = spec.decode(b"\x0A\x01\x05", &Ctx::new()).unwrap_err();
        assert_eq!(
            err.as_decode().unwrap().msg(), "unknown integer value: 5"
        );
        assert!(Integer::new().decode(b"\x0A\x01\x01", &Ctx::new()).is_err());
    }
}
