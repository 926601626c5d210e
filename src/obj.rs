//! The common ground of all value types.
//!
//! Every value type embeds a [`Base`] carrying its tags, whether it is
//! optional and, once decoded, where it was found and how it was encoded.
//! The [`Asn1`] trait gives uniform access to that header and provides
//! encoding and decoding. The closed enum [`Obj`] holds a value of any of
//! the types and is what schemas are built from.

use std::ops::ControlFlow;
use bytes::Bytes;
use crate::any::Any;
use crate::boolean::Boolean;
use crate::choice::Choice;
use crate::ctx::Ctx;
use crate::decode::{Decoder, Defines};
use crate::encode::{
    next_state, write, write_eoc, write_header, write_lenindef, Target,
};
use crate::error::{Error, Result};
use crate::ident::{Ident, TagOrder};
use crate::int::{Enumerated, Integer};
use crate::length::{len_size, Length};
use crate::null::Null;
use crate::oid::{ObjectIdentifier, Oid};
use crate::path::DecodePath;
use crate::sequence::{Sequence, Set};
use crate::sequence_of::{SequenceOf, SetOf};
use crate::string::{BitString, CommonString, OctetString};
use crate::time::Time;


//------------ Base ----------------------------------------------------------

/// The header common to all values.
///
/// It holds the identifier octets the value is encoded with, an optional
/// EXPLICIT tag wrapped around it, and whether the value may be absent
/// from a SEQUENCE or SET.
///
/// After decoding, it also knows the offset of the value in the input, the
/// lengths of its length and content octets and whether BER-only features
/// were used. For a value that was not decoded, all of these are zero.
#[derive(Clone, Debug)]
pub struct Base {
    pub(crate) class_name: &'static str,
    pub(crate) tag: Ident,
    pub(crate) expl: Option<Ident>,
    pub(crate) implicit: bool,
    pub(crate) optional: bool,

    /// Whether the value has no identifier octets of its own.
    ///
    /// This is true for CHOICE and ANY whose content is a complete value.
    pub(crate) headless: bool,

    pub(crate) offset: usize,
    pub(crate) llen: usize,
    pub(crate) vlen: usize,
    pub(crate) lenindef: bool,
    pub(crate) expl_lenindef: bool,
    pub(crate) ber_encoded: bool,
}

impl Base {
    pub(crate) const fn new(class_name: &'static str, tag: Ident) -> Self {
        Base {
            class_name, tag,
            expl: None,
            implicit: false,
            optional: false,
            headless: false,
            offset: 0,
            llen: 0,
            vlen: 0,
            lenindef: false,
            expl_lenindef: false,
            ber_encoded: false,
        }
    }

    pub(crate) const fn headless(class_name: &'static str, tag: Ident) -> Self {
        let mut res = Self::new(class_name, tag);
        res.headless = true;
        res
    }

    /// Returns a copy of the header for a freshly decoded value.
    pub(crate) fn decoded_at(
        &self, offset: usize, llen: usize, vlen: usize
    ) -> Self {
        Base {
            offset, llen, vlen,
            lenindef: false,
            expl_lenindef: false,
            ber_encoded: false,
            ..self.clone()
        }
    }

    /// Returns whether both headers have the same tags.
    pub(crate) fn same_tags(&self, other: &Self) -> bool {
        self.tag == other.tag && self.expl == other.expl
    }

    /// Returns the name of the type used in error messages.
    pub fn class_name(&self) -> &'static str {
        self.class_name
    }

    /// Returns the identifier octets of the value.
    pub fn tag(&self) -> Ident {
        self.tag
    }

    /// Returns the EXPLICIT tag if there is one.
    pub fn expl(&self) -> Option<Ident> {
        self.expl
    }

    pub fn expled(&self) -> bool {
        self.expl.is_some()
    }

    /// Returns whether the value may be absent.
    ///
    /// Values with a DEFAULT are always optional.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns the offset of the identifier octets within the input.
    ///
    /// If the value has an EXPLICIT tag, this is the offset of the inner
    /// value.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the length of the identifier octets.
    pub fn tlen(&self) -> usize {
        if self.headless {
            0
        }
        else {
            self.tag.encoded_len()
        }
    }

    /// Returns the length of the length octets.
    pub fn llen(&self) -> usize {
        self.llen
    }

    /// Returns the length of the content octets.
    pub fn vlen(&self) -> usize {
        self.vlen
    }

    /// Returns the length of the complete encoding without EXPLICIT tag.
    pub fn tlvlen(&self) -> usize {
        self.tlen() + self.llen + self.vlen
    }

    /// Returns whether the value was decoded.
    pub fn decoded(&self) -> bool {
        self.llen + self.vlen > 0
    }

    /// Returns whether the value used the indefinite length form.
    pub fn lenindef(&self) -> bool {
        self.lenindef
    }

    /// Returns whether the EXPLICIT tag used the indefinite length form.
    pub fn expl_lenindef(&self) -> bool {
        self.expl_lenindef
    }

    /// Returns whether the value itself used BER-only features.
    pub fn ber_encoded(&self) -> bool {
        self.ber_encoded
    }

    /// Returns whether the header shows any BER-only features.
    pub fn bered(&self) -> bool {
        self.expl_lenindef || self.lenindef || self.ber_encoded
    }

    pub fn expl_tlen(&self) -> usize {
        self.expl.map(Ident::encoded_len).unwrap_or(0)
    }

    pub fn expl_llen(&self) -> usize {
        if self.expl_lenindef {
            1
        }
        else {
            len_size(self.tlvlen())
        }
    }

    pub fn expl_vlen(&self) -> usize {
        self.tlvlen()
    }

    pub fn expl_tlvlen(&self) -> usize {
        self.expl_tlen() + self.expl_llen() + self.expl_vlen()
    }

    /// Returns the offset of the EXPLICIT tag.
    pub fn expl_offset(&self) -> usize {
        self.offset.saturating_sub(self.expl_tlen() + self.expl_llen())
    }

    /// Returns the offset of the complete encoding including EXPLICIT tag.
    pub fn fulloffset(&self) -> usize {
        if self.expled() { self.expl_offset() } else { self.offset }
    }

    /// Returns the length of the complete encoding including EXPLICIT tag.
    pub fn fulllen(&self) -> usize {
        if self.expled() { self.expl_tlvlen() } else { self.tlvlen() }
    }

    /// Returns the ordering key of the outermost tag.
    pub fn tag_order(&self) -> TagOrder {
        self.expl.unwrap_or(self.tag).order()
    }
}


//------------ Decoded -------------------------------------------------------

/// The outcome of decoding a value.
pub enum Decoded<'a, T> {
    /// Only the tag was checked and it matched.
    TagMatched,

    /// The decoded value and the data following it.
    Value(T, &'a [u8]),
}

impl<'a, T> Decoded<'a, T> {
    pub(crate) fn map<U>(self, op: impl FnOnce(T) -> U) -> Decoded<'a, U> {
        match self {
            Decoded::TagMatched => Decoded::TagMatched,
            Decoded::Value(value, tail) => Decoded::Value(op(value), tail),
        }
    }
}


//------------ Codec ---------------------------------------------------------

pub(crate) mod sealed {
    use crate::decode::Decoder;
    use crate::encode::Target;
    use crate::error::Result;
    use super::{Base, Decoded, Obj};

    /// The per-type encoding and decoding primitives.
    ///
    /// All methods deal with the value without its EXPLICIT tag. That is
    /// added by the methods of [`Asn1`][super::Asn1].
    pub trait Codec: Sized + Into<Obj> {
        fn base_mut(&mut self) -> &mut Base;

        /// Appends the DER encoding.
        fn write_der(&mut self, out: &mut Vec<u8>) -> Result<()>;

        /// Computes the encoded length, recording lengths in `state`.
        fn encode_first(&mut self, state: &mut Vec<usize>) -> Result<usize>;

        /// Writes the encoding using lengths from `state`.
        fn encode_second<T: Target, I: Iterator<Item = usize>>(
            &mut self, target: &mut T, state: &mut I
        ) -> Result<()>;

        /// Writes the CER encoding.
        fn write_cer<T: Target>(&mut self, target: &mut T) -> Result<()>;

        /// Decodes a value using `self` as the schema.
        fn decode_value<'a>(
            &self, dec: &mut Decoder, data: &'a [u8], offset: usize,
            tag_only: bool, evgen: bool,
        ) -> Result<Decoded<'a, Self>>;

        fn from_obj(obj: Obj) -> Result<Self>;

        /// Checks whether the type accepts an IMPLICIT tag.
        fn check_implicit(&self) -> Result<()> {
            Ok(())
        }
    }
}

pub(crate) use self::sealed::Codec;


//------------ Asn1 ----------------------------------------------------------

/// The interface shared by all value types.
///
/// The trait is implemented by each of the value types of this crate and by
/// [`Obj`]. It can not be implemented outside of the crate.
///
/// It provides the builder methods for tagging, access to the decode
/// metadata, and the encoding and decoding entry points. Decoding uses
/// `self` as the schema: the result is a copy of `self` with the decoded
/// value and metadata.
pub trait Asn1: Codec + Clone {
    /// Returns the common header.
    fn base(&self) -> &Base;

    /// Returns the ASN.1 name of the type, e.g., `INTEGER`.
    fn type_name(&self) -> &'static str;

    /// Returns whether the value is complete and can be encoded.
    fn ready(&self) -> bool;

    /// Returns whether the value or any component used BER-only features.
    fn bered(&self) -> bool {
        self.base().bered()
    }

    /// Returns the key for DER ordering within a SET.
    fn tag_order(&self) -> TagOrder {
        self.base().tag_order()
    }

    /// Returns the key for CER ordering within a SET.
    fn tag_order_cer(&self) -> TagOrder {
        self.tag_order()
    }

    //--- Builders

    /// Replaces the tag of the value with an IMPLICIT tag.
    fn implicit(mut self, tag: Ident) -> Result<Self> {
        self.check_implicit()?;
        if self.base().expl.is_some() {
            return Err(Error::invalid(
                "implicit and explicit tags can not be set simultaneously"
            ))
        }
        let base = self.base_mut();
        base.tag = tag;
        base.implicit = true;
        Ok(self)
    }

    /// Wraps the value in an EXPLICIT tag.
    fn explicit(mut self, tag: Ident) -> Result<Self> {
        if self.base().implicit {
            return Err(Error::invalid(
                "implicit and explicit tags can not be set simultaneously"
            ))
        }
        self.base_mut().expl = Some(tag);
        Ok(self)
    }

    /// Marks the value as OPTIONAL.
    fn optional(mut self) -> Self {
        self.base_mut().optional = true;
        self
    }

    /// Sets the type name used in error messages.
    fn with_class_name(mut self, name: &'static str) -> Self {
        self.base_mut().class_name = name;
        self
    }

    //--- Encoding

    /// Encodes the value as DER.
    fn encode(&mut self) -> Result<Vec<u8>> {
        let mut res = Vec::new();
        self.encode_into(&mut res)?;
        Ok(res)
    }

    /// Appends the DER encoding of the value to `out`.
    fn encode_into(&mut self, out: &mut Vec<u8>) -> Result<()> {
        match self.base().expl {
            None => self.write_der(out),
            Some(expl) => {
                let mut inner = Vec::new();
                self.write_der(&mut inner)?;
                crate::encode::append_tlv(out, expl, &inner);
                Ok(())
            }
        }
    }

    /// Runs the first pass of the two-pass DER encoding.
    ///
    /// Returns the length of the complete encoding. The lengths of all
    /// constructed values are appended to `state` in the order the second
    /// pass needs them.
    fn encode1st(&mut self, state: &mut Vec<usize>) -> Result<usize> {
        match self.base().expl {
            None => self.encode_first(state),
            Some(expl) => {
                let idx = state.len();
                state.push(0);
                let vlen = self.encode_first(state)?;
                state[idx] = vlen;
                Ok(expl.encoded_len() + len_size(vlen) + vlen)
            }
        }
    }

    /// Runs the second pass of the two-pass DER encoding.
    fn encode2nd<T: Target, I: Iterator<Item = usize>>(
        &mut self, target: &mut T, state: &mut I
    ) -> Result<()> {
        if let Some(expl) = self.base().expl {
            let vlen = next_state(state)?;
            write_header(target, expl, Length::Definite(vlen))?;
        }
        self.encode_second(target, state)
    }

    /// Writes the CER encoding of the value.
    fn encode_cer<T: Target>(&mut self, target: &mut T) -> Result<()> {
        match self.base().expl {
            None => self.write_cer(target),
            Some(expl) => {
                write_lenindef(target, expl)?;
                self.write_cer(target)?;
                write_eoc(target)
            }
        }
    }

    //--- Decoding

    /// Decodes a value from the start of `data`.
    ///
    /// Returns the value and the remaining data.
    fn decode<'a>(
        &self, data: &'a [u8], ctx: &Ctx
    ) -> Result<(Self, &'a [u8])> {
        self.decode_at(data, 0, ctx)
    }

    /// Decodes a value that starts at `offset` of some larger input.
    ///
    /// The offset is only used for the metadata and error reports.
    fn decode_at<'a>(
        &self, data: &'a [u8], offset: usize, ctx: &Ctx
    ) -> Result<(Self, &'a [u8])> {
        let spec: Obj = self.clone().into();
        let mut dec = Decoder::new(ctx, None);
        let (obj, tail) = dec.decode_top(&spec, data, offset, false)?;
        Ok((Self::from_obj(obj)?, tail))
    }

    /// Decodes a value that has to fill all of `data`.
    fn decod(&self, data: &[u8], ctx: &Ctx) -> Result<Self> {
        let (res, tail) = self.decode(data, ctx)?;
        if !tail.is_empty() {
            return Err(Error::ExceedingData(tail.len()))
        }
        Ok(res)
    }

    /// Decodes a value reporting every completed value to `visitor`.
    ///
    /// The visitor receives the decode path, the value and the data
    /// following it. Values are reported after all their components, the
    /// outermost value last. In this mode SEQUENCE OF, SET OF, SEQUENCE and
    /// SET values as well as OCTET STRINGs do not keep their content in
    /// memory. Use the `evgen_mode_upto` option of [`Ctx`] to decode
    /// selected subtrees in memory anyway.
    ///
    /// If the visitor returns [`ControlFlow::Break`], decoding stops and
    /// the method returns successfully.
    fn decode_evgen<F>(
        &self, data: &[u8], ctx: &Ctx, mut visitor: F
    ) -> Result<()>
    where F: FnMut(&DecodePath, &Obj, &[u8]) -> ControlFlow<()> {
        let spec: Obj = self.clone().into();
        let mut dec = Decoder::new(ctx, Some(&mut visitor));
        match dec.decode_top(&spec, data, 0, true) {
            Ok(_) | Err(Error::Interrupted) => Ok(()),
            Err(err) => Err(err),
        }
    }
}


//------------ Obj -----------------------------------------------------------

/// A value of any of the supported types.
///
/// Schemas are built from values of this type and the results of decoding
/// are returned as values of this type. Use the `From` and `TryFrom`
/// conversions or the `as_*` methods to move between `Obj` and the
/// concrete types.
#[derive(Clone, Debug, PartialEq)]
pub enum Obj {
    Boolean(Boolean),
    Integer(Integer),
    Enumerated(Enumerated),
    BitString(BitString),
    OctetString(OctetString),
    Null(Null),
    ObjectIdentifier(ObjectIdentifier),
    String(CommonString),
    Time(Time),
    Any(Any),
    Choice(Choice),
    Sequence(Sequence),
    Set(Set),
    SequenceOf(SequenceOf),
    SetOf(SetOf),
}

/// Runs `$body` on the value inside any variant of an `Obj`.
///
/// Within `$body`, `$wrap` is the variant’s constructor.
macro_rules! dispatch {
    ( $obj:expr, $inner:ident => $body:expr ) => {
        dispatch!($obj, $inner, _wrap => $body)
    };
    ( $obj:expr, $inner:ident, $wrap:ident => $body:expr ) => {
        dispatch!(
            @arms $obj, $inner, $wrap, $body;
            Boolean, Integer, Enumerated, BitString, OctetString, Null,
            ObjectIdentifier, String, Time, Any, Choice, Sequence, Set,
            SequenceOf, SetOf
        )
    };
    ( @arms $obj:expr, $inner:ident, $wrap:ident, $body:expr;
      $( $variant:ident ),* ) => {
        match $obj {
            $(
                Obj::$variant($inner) => {
                    #[allow(unused_variables)]
                    let $wrap = Obj::$variant;
                    $body
                }
            )*
        }
    };
}

impl Obj {
    /// Returns the name of the type used in error messages.
    pub fn class_name(&self) -> &'static str {
        self.base().class_name
    }

    /// Returns whether `other` is a value of the same type.
    ///
    /// For SEQUENCE, SET and CHOICE this also compares the schema names.
    pub fn same_type(&self, other: &Obj) -> bool {
        match (self, other) {
            (Obj::String(left), Obj::String(right)) => {
                left.kind() == right.kind()
            }
            (Obj::Time(left), Obj::Time(right)) => {
                left.kind() == right.kind()
            }
            (Obj::Sequence(_), Obj::Sequence(_))
            | (Obj::Set(_), Obj::Set(_))
            | (Obj::Choice(_), Obj::Choice(_)) => {
                self.class_name() == other.class_name()
            }
            _ => {
                std::mem::discriminant(self) == std::mem::discriminant(other)
            }
        }
    }

    /// Returns whether the value is a DEFAULT value and equals the default.
    pub fn is_default(&self) -> bool {
        match self {
            Obj::Boolean(inner) => inner.is_default(),
            Obj::Integer(inner) => inner.is_default(),
            Obj::Enumerated(inner) => inner.is_default(),
            Obj::BitString(inner) => inner.is_default(),
            Obj::OctetString(inner) => inner.is_default(),
            Obj::ObjectIdentifier(inner) => inner.is_default(),
            Obj::String(inner) => inner.is_default(),
            Obj::Time(inner) => inner.is_default(),
            Obj::Choice(inner) => inner.is_default(),
            Obj::Sequence(inner) => inner.is_default(),
            Obj::Set(inner) => inner.is_default(),
            Obj::SequenceOf(inner) => inner.is_default(),
            Obj::SetOf(inner) => inner.is_default(),
            Obj::Null(_) | Obj::Any(_) => false,
        }
    }

    /// Returns whether the schema has a DEFAULT value.
    pub fn has_default(&self) -> bool {
        match self {
            Obj::Boolean(inner) => inner.has_default(),
            Obj::Integer(inner) => inner.has_default(),
            Obj::Enumerated(inner) => inner.has_default(),
            Obj::BitString(inner) => inner.has_default(),
            Obj::OctetString(inner) => inner.has_default(),
            Obj::ObjectIdentifier(inner) => inner.has_default(),
            Obj::String(inner) => inner.has_default(),
            Obj::Time(inner) => inner.has_default(),
            Obj::Choice(inner) => inner.has_default(),
            Obj::Sequence(inner) => inner.has_default(),
            Obj::Set(inner) => inner.has_default(),
            Obj::SequenceOf(inner) => inner.has_default(),
            Obj::SetOf(inner) => inner.has_default(),
            Obj::Null(_) | Obj::Any(_) => false,
        }
    }

    /// Returns a copy of the schema `self` carrying the value of `value`.
    ///
    /// The result has the tags, bounds and defaults of `self`. Fails if
    /// `value` is of a different type or violates the schema.
    pub fn adopt(&self, value: Obj) -> Result<Obj> {
        match (self, value) {
            (Obj::Boolean(spec), Obj::Boolean(value)) => {
                spec.adopt(value).map(Obj::Boolean)
            }
            (Obj::Integer(spec), Obj::Integer(value)) => {
                spec.adopt(value).map(Obj::Integer)
            }
            (Obj::Enumerated(spec), Obj::Enumerated(value)) => {
                spec.adopt(value).map(Obj::Enumerated)
            }
            (Obj::BitString(spec), Obj::BitString(value)) => {
                spec.adopt(value).map(Obj::BitString)
            }
            (Obj::OctetString(spec), Obj::OctetString(value)) => {
                spec.adopt(value).map(Obj::OctetString)
            }
            (Obj::Null(spec), Obj::Null(_)) => Ok(Obj::Null(spec.clone())),
            (Obj::ObjectIdentifier(spec), Obj::ObjectIdentifier(value)) => {
                spec.adopt(value).map(Obj::ObjectIdentifier)
            }
            (Obj::String(spec), Obj::String(value)) => {
                spec.adopt(value).map(Obj::String)
            }
            (Obj::Time(spec), Obj::Time(value)) => {
                spec.adopt(value).map(Obj::Time)
            }
            (Obj::Any(spec), Obj::Any(value)) => {
                spec.adopt(value).map(Obj::Any)
            }
            (Obj::Choice(spec), Obj::Choice(value)) => {
                spec.adopt(value).map(Obj::Choice)
            }
            (Obj::Sequence(spec), Obj::Sequence(value)) => {
                spec.adopt(value).map(Obj::Sequence)
            }
            (Obj::Set(spec), Obj::Set(value)) => {
                spec.adopt(value).map(Obj::Set)
            }
            (Obj::SequenceOf(spec), Obj::SequenceOf(value)) => {
                spec.adopt(value).map(Obj::SequenceOf)
            }
            (Obj::SetOf(spec), Obj::SetOf(value)) => {
                spec.adopt(value).map(Obj::SetOf)
            }
            (spec, _) => Err(Error::InvalidValueType(vec![spec.class_name()])),
        }
    }

    /// Returns the DEFINED BY rules of an object identifier schema.
    pub(crate) fn defines(&self) -> Option<&Defines> {
        match self {
            Obj::ObjectIdentifier(inner) => inner.defines(),
            _ => None,
        }
    }

    /// Returns the decoded object identifier if this is one.
    pub(crate) fn oid_value(&self) -> Option<&Oid> {
        match self {
            Obj::ObjectIdentifier(inner) => inner.value(),
            _ => None,
        }
    }

    /// Returns the octets an open type value is decoded from.
    ///
    /// Only ANY, OCTET STRING and BIT STRING can carry such a value.
    pub(crate) fn defined_source(&self) -> Option<Bytes> {
        match self {
            Obj::Any(inner) => inner.raw().cloned(),
            Obj::OctetString(inner) => inner.value().cloned(),
            Obj::BitString(inner) => inner.octets().cloned(),
            _ => None,
        }
    }

    /// Attaches a decoded open type value.
    pub(crate) fn set_defined(&mut self, oid: Oid, value: Obj) {
        match self {
            Obj::Any(inner) => inner.set_defined(oid, value),
            Obj::OctetString(inner) => inner.set_defined(oid, value),
            Obj::BitString(inner) => inner.set_defined(oid, value),
            _ => { }
        }
    }

    /// Returns the value decoded from this one through DEFINED BY.
    pub fn defined(&self) -> Option<(&Oid, &Obj)> {
        match self {
            Obj::Any(inner) => inner.defined(),
            Obj::OctetString(inner) => inner.defined(),
            Obj::BitString(inner) => inner.defined(),
            _ => None,
        }
    }
}

impl sealed::Codec for Obj {
    fn base_mut(&mut self) -> &mut Base {
        dispatch!(self, inner => inner.base_mut())
    }

    fn write_der(&mut self, out: &mut Vec<u8>) -> Result<()> {
        dispatch!(self, inner => inner.write_der(out))
    }

    fn encode_first(&mut self, state: &mut Vec<usize>) -> Result<usize> {
        dispatch!(self, inner => inner.encode_first(state))
    }

    fn encode_second<T: Target, I: Iterator<Item = usize>>(
        &mut self, target: &mut T, state: &mut I
    ) -> Result<()> {
        dispatch!(self, inner => inner.encode_second(target, state))
    }

    fn write_cer<T: Target>(&mut self, target: &mut T) -> Result<()> {
        dispatch!(self, inner => inner.write_cer(target))
    }

    fn decode_value<'a>(
        &self, dec: &mut Decoder, data: &'a [u8], offset: usize,
        tag_only: bool, evgen: bool,
    ) -> Result<Decoded<'a, Self>> {
        dispatch!(self, inner, wrap => {
            inner.decode_value(
                dec, data, offset, tag_only, evgen
            ).map(|res| res.map(wrap))
        })
    }

    fn from_obj(obj: Obj) -> Result<Self> {
        Ok(obj)
    }

    fn check_implicit(&self) -> Result<()> {
        dispatch!(self, inner => inner.check_implicit())
    }
}

impl Asn1 for Obj {
    fn base(&self) -> &Base {
        dispatch!(self, inner => inner.base())
    }

    fn type_name(&self) -> &'static str {
        dispatch!(self, inner => inner.type_name())
    }

    fn ready(&self) -> bool {
        dispatch!(self, inner => inner.ready())
    }

    fn bered(&self) -> bool {
        dispatch!(self, inner => inner.bered())
    }

    fn tag_order(&self) -> TagOrder {
        dispatch!(self, inner => inner.tag_order())
    }

    fn tag_order_cer(&self) -> TagOrder {
        dispatch!(self, inner => inner.tag_order_cer())
    }
}


//--- Conversions

macro_rules! conversions {
    ( $( $variant:ident($ty:ident) ),* $(,)? ) => {
        $(
            impl From<$ty> for Obj {
                fn from(value: $ty) -> Self {
                    Obj::$variant(value)
                }
            }

            impl TryFrom<Obj> for $ty {
                type Error = Error;

                fn try_from(obj: Obj) -> Result<Self> {
                    match obj {
                        Obj::$variant(value) => Ok(value),
                        _ => {
                            Err(Error::InvalidValueType(
                                vec![stringify!($ty)]
                            ))
                        }
                    }
                }
            }

            impl<'a> TryFrom<&'a Obj> for &'a $ty {
                type Error = Error;

                fn try_from(obj: &'a Obj) -> Result<Self> {
                    match obj {
                        Obj::$variant(value) => Ok(value),
                        _ => {
                            Err(Error::InvalidValueType(
                                vec![stringify!($ty)]
                            ))
                        }
                    }
                }
            }
        )*
    }
}

conversions!(
    Boolean(Boolean),
    Integer(Integer),
    Enumerated(Enumerated),
    BitString(BitString),
    OctetString(OctetString),
    Null(Null),
    ObjectIdentifier(ObjectIdentifier),
    String(CommonString),
    Time(Time),
    Any(Any),
    Choice(Choice),
    Sequence(Sequence),
    Set(Set),
    SequenceOf(SequenceOf),
    SetOf(SetOf),
);


//------------ Primitive codec helper ----------------------------------------

/// Implements the encoding methods of `Codec` for a primitive type.
///
/// The type needs to provide `fn content(&self) -> Result<Cow<'_, [u8]>>`
/// returning its content octets. DER and CER are identical for these types.
macro_rules! primitive_codec {
    () => {
        fn write_der(&mut self, out: &mut Vec<u8>) -> $crate::error::Result<()> {
            let content = self.content()?;
            $crate::encode::append_tlv(out, self.base.tag, &content);
            Ok(())
        }

        fn encode_first(
            &mut self, _state: &mut Vec<usize>
        ) -> $crate::error::Result<usize> {
            Ok($crate::encode::tlv_len(self.base.tag, self.content()?.len()))
        }

        fn encode_second<T: $crate::encode::Target, I: Iterator<Item = usize>>(
            &mut self, target: &mut T, _state: &mut I
        ) -> $crate::error::Result<()> {
            self.write_cer(target)
        }

        fn write_cer<T: $crate::encode::Target>(
            &mut self, target: &mut T
        ) -> $crate::error::Result<()> {
            let content = self.content()?;
            $crate::encode::write_header(
                target, self.base.tag,
                $crate::length::Length::Definite(content.len())
            )?;
            $crate::encode::write(target, &content)
        }
    }
}

pub(crate) use primitive_codec;

/// Writes the CER encoding of a constructed value from its components.
pub(crate) fn write_cer_components<'a, T: Target>(
    target: &mut T, tag: Ident, components: impl Iterator<Item = &'a mut Obj>
) -> Result<()> {
    write_lenindef(target, tag)?;
    for component in components {
        component.encode_cer(target)?;
    }
    write_eoc(target)
}

/// Writes already encoded component values.
pub(crate) fn write_all<T: Target>(
    target: &mut T, parts: &[Vec<u8>]
) -> Result<()> {
    for part in parts {
        write(target, part)?;
    }
    Ok(())
}
