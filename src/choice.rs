//! The CHOICE type.

use std::sync::Arc;
use crate::decode::Decoder;
use crate::encode::Target;
use crate::error::{Error, Result};
use crate::ident::{Ident, TagOrder};
use crate::int::Integer;
use crate::null::Null;
use crate::obj::{Asn1, Base, Codec, Decoded, Obj};
use crate::oid::ObjectIdentifier;
use crate::boolean::Boolean;
use crate::path::PathElem;
use crate::string::{BitString, CommonString, OctetString};
use crate::time::Time;


//------------ Choice --------------------------------------------------------

/// A value that is one of a list of named alternatives.
///
/// The schema is the ordered list of alternatives. A value holds the name
/// and value of at most one of them. The alternatives need to have
/// distinct tags since they are told apart by tag only: when decoding, the
/// alternatives are tried in order and the first one whose tag matches the
/// data is decoded.
///
/// A CHOICE has no tag of its own. It can be wrapped in an EXPLICIT tag
/// but not tagged implicitly.
///
/// ```
/// use derasn::{Asn1, Choice, CommonString, Ctx, Ident, Obj};
///
/// let name = Choice::new([
///     ("rfc822Name", Obj::from(CommonString::ia5().implicit(Ident::ctxp(1))?)),
///     ("dNSName", Obj::from(CommonString::ia5().implicit(Ident::ctxp(2))?)),
/// ])?.with_class_name("GeneralName");
///
/// let mut value = name.clone().with(
///     "dNSName", CommonString::ia5().with_str("example.com")?
/// )?;
/// let data = value.encode()?;
/// assert_eq!(data[0], 0x82);
///
/// let decoded = name.decod(&data, &Ctx::new())?;
/// assert_eq!(decoded.choice(), Some("dNSName"));
/// # Ok::<_, derasn::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Choice {
    base: Base,
    schema: Arc<Vec<(&'static str, Obj)>>,
    value: Option<(usize, Box<Obj>)>,
    default: Option<(usize, Box<Obj>)>,
}

impl Choice {
    /// Creates a new schema from the alternatives.
    ///
    /// Fails if there are no alternatives.
    pub fn new(
        alternatives: impl IntoIterator<Item = (&'static str, Obj)>
    ) -> Result<Self> {
        let schema: Vec<_> = alternatives.into_iter().collect();
        if schema.is_empty() {
            return Err(Error::invalid("schema must be specified"))
        }
        Ok(Self::from_schema(schema))
    }

    /// Creates a schema accepting any universal primitive value.
    ///
    /// The alternatives are named after the types. This is useful for
    /// decoding values of unknown type.
    pub fn primitive_types() -> Self {
        Self::from_schema(vec![
            ("Boolean", Boolean::new().into()),
            ("Integer", Integer::new().into()),
            ("BitString", BitString::new().into()),
            ("OctetString", OctetString::new().into()),
            ("Null", Null::new().into()),
            ("ObjectIdentifier", ObjectIdentifier::new().into()),
            ("UTF8String", CommonString::utf8().into()),
            ("NumericString", CommonString::numeric().into()),
            ("PrintableString", CommonString::printable().into()),
            ("TeletexString", CommonString::teletex().into()),
            ("VideotexString", CommonString::videotex().into()),
            ("IA5String", CommonString::ia5().into()),
            ("UTCTime", Time::utc().into()),
            ("GeneralizedTime", Time::generalized().into()),
            ("GraphicString", CommonString::graphic().into()),
            ("VisibleString", CommonString::visible().into()),
            ("ISO646String", CommonString::iso646().into()),
            ("GeneralString", CommonString::general().into()),
            ("UniversalString", CommonString::universal().into()),
            ("BMPString", CommonString::bmp().into()),
        ]).with_class_name("PrimitiveTypes")
    }

    fn from_schema(schema: Vec<(&'static str, Obj)>) -> Self {
        Choice {
            base: Base::headless("Choice", Ident::END_OF_CONTENTS),
            schema: Arc::new(schema),
            value: None,
            default: None,
        }
    }

    /// Returns the alternatives of the schema.
    pub fn alternatives(&self) -> impl Iterator<Item = (&'static str, &Obj)> {
        self.schema.iter().map(|(name, spec)| (*name, spec))
    }

    /// Returns the name of the chosen alternative.
    pub fn choice(&self) -> Option<&'static str> {
        self.value.as_ref().map(|(idx, _)| self.schema[*idx].0)
    }

    /// Returns the value of the chosen alternative.
    pub fn value(&self) -> Option<&Obj> {
        self.value.as_ref().map(|(_, value)| value.as_ref())
    }

    pub fn into_value(self) -> Option<Obj> {
        self.value.map(|(_, value)| *value)
    }

    /// Returns the value of the alternative `name` if it is chosen.
    ///
    /// Fails if the schema has no alternative of that name.
    pub fn get(&self, name: &str) -> Result<Option<&Obj>> {
        let idx = self.index_of(name)?;
        Ok(self.value.as_ref().and_then(|(chosen, value)| {
            (*chosen == idx).then_some(value.as_ref())
        }))
    }

    /// Chooses the alternative `name`.
    ///
    /// The value has to be of the type of the alternative. It takes the
    /// tags and constraints of the alternative.
    pub fn set(&mut self, name: &str, value: impl Into<Obj>) -> Result<()> {
        self.value = Some(self.sanitize(name, value.into())?);
        Ok(())
    }

    pub fn with(mut self, name: &str, value: impl Into<Obj>) -> Result<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Adds a DEFAULT value.
    pub fn default(mut self, name: &str, value: impl Into<Obj>) -> Result<Self> {
        let value = self.sanitize(name, value.into())?;
        self.base.optional = true;
        if self.value.is_none() {
            self.value = Some(value.clone());
        }
        self.default = Some(value);
        Ok(self)
    }

    pub fn is_default(&self) -> bool {
        self.default.is_some() && self.default == self.value
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub(crate) fn adopt(&self, value: Self) -> Result<Self> {
        let mut res = Choice {
            base: self.base.decoded_at(0, 0, 0),
            schema: self.schema.clone(),
            value: None,
            default: self.default.clone(),
        };
        match (value.choice(), value.value) {
            (Some(name), Some((_, value))) => res.set(name, *value)?,
            _ => res.value = self.default.clone(),
        }
        Ok(res)
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.schema.iter().position(|(item, _)| *item == name).ok_or_else(|| {
            Error::ObjUnknown(name.into())
        })
    }

    fn sanitize(&self, name: &str, value: Obj) -> Result<(usize, Box<Obj>)> {
        let idx = self.index_of(name)?;
        let spec = &self.schema[idx].1;
        if !spec.same_type(&value) {
            return Err(Error::InvalidValueType(vec![spec.class_name()]))
        }
        Ok((idx, Box::new(spec.adopt(value)?)))
    }

    fn value_mut(&mut self) -> Result<&mut Obj> {
        match self.value.as_mut() {
            Some((_, value)) => Ok(value.as_mut()),
            None => Err(Error::ObjNotReady(self.base.class_name.into())),
        }
    }
}

impl PartialEq for Choice {
    fn eq(&self, other: &Self) -> bool {
        self.base.same_tags(&other.base)
            && self.alternatives().map(|(name, _)| name).eq(
                other.alternatives().map(|(name, _)| name)
            )
            && self.value == other.value
    }
}


//--- Codec and Asn1

impl Codec for Choice {
    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    fn write_der(&mut self, out: &mut Vec<u8>) -> Result<()> {
        self.value_mut()?.encode_into(out)
    }

    fn encode_first(&mut self, state: &mut Vec<usize>) -> Result<usize> {
        self.value_mut()?.encode1st(state)
    }

    fn encode_second<T: Target, I: Iterator<Item = usize>>(
        &mut self, target: &mut T, state: &mut I
    ) -> Result<()> {
        self.value_mut()?.encode2nd(target, state)
    }

    fn write_cer<T: Target>(&mut self, target: &mut T) -> Result<()> {
        self.value_mut()?.encode_cer(target)
    }

    fn decode_value<'a>(
        &self, dec: &mut Decoder, data: &'a [u8], offset: usize,
        tag_only: bool, evgen: bool,
    ) -> Result<Decoded<'a, Self>> {
        let mut chosen = None;
        for (idx, (name, spec)) in self.schema.iter().enumerate() {
            let matched = dec.child(PathElem::from(*name), |dec| {
                dec.probe(spec, data, offset)
            })?;
            if matched {
                chosen = Some(idx);
                break
            }
        }
        let Some(idx) = chosen else {
            return Err(dec.mismatch(&self.base, offset))
        };
        if tag_only {
            return Ok(Decoded::TagMatched)
        }
        let (name, spec) = &self.schema[idx];
        let (value, tail) = dec.child(PathElem::from(*name), |dec| {
            dec.decode(spec, data, offset, evgen)
        })?;
        Ok(Decoded::Value(
            Choice {
                base: self.base.decoded_at(offset, 0, value.base().fulllen()),
                schema: self.schema.clone(),
                value: Some((idx, Box::new(value))),
                default: self.default.clone(),
            },
            tail
        ))
    }

    fn from_obj(obj: Obj) -> Result<Self> {
        Self::try_from(obj)
    }

    fn check_implicit(&self) -> Result<()> {
        Err(Error::invalid("no implicit tag allowed for CHOICE"))
    }
}

impl Asn1 for Choice {
    fn base(&self) -> &Base {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "CHOICE"
    }

    fn ready(&self) -> bool {
        self.value().map(Asn1::ready).unwrap_or(false)
    }

    fn bered(&self) -> bool {
        self.base.expl_lenindef || self.value().map(Asn1::bered).unwrap_or(false)
    }

    fn tag_order(&self) -> TagOrder {
        if let Some(expl) = self.base.expl {
            return expl.order()
        }
        match self.value() {
            Some(value) => value.tag_order(),
            None => self.tag_order_cer(),
        }
    }

    fn tag_order_cer(&self) -> TagOrder {
        self.schema.iter().map(|(_, spec)| spec.tag_order_cer()).min()
            .unwrap_or(TagOrder::MIN)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::ctx::Ctx;
    use crate::error::DecodeErrorKind;

    fn general_name() -> Choice {
        Choice::new([
            (
                "rfc822Name",
                Obj::from(CommonString::ia5().implicit(Ident::ctxp(1)).unwrap())
            ),
            (
                "dNSName",
                Obj::from(CommonString::ia5().implicit(Ident::ctxp(2)).unwrap())
            ),
        ]).unwrap().with_class_name("GeneralName")
    }

    #[test]
    fn set_and_get() {
        let mut name = general_name();
        assert!(!name.ready());
        assert!(Choice::new(Vec::new()).is_err());
        assert!(matches!(
            name.set("uri", CommonString::ia5()), Err(Error::ObjUnknown(_))
        ));
        assert!(matches!(
            name.set("dNSName", Integer::from(1)),
            Err(Error::InvalidValueType(_))
        ));
        name.set("dNSName", CommonString::ia5().with_str("bar.baz").unwrap())
            .unwrap();
        assert!(name.ready());
        assert_eq!(name.choice(), Some("dNSName"));
        assert!(name.get("rfc822Name").unwrap().is_none());
        assert_eq!(
            name.get("dNSName").unwrap().unwrap().base().tag(),
            Ident::ctxp(2)
        );
        assert_eq!(name.tag_order(), Ident::ctxp(2).order());
        assert_eq!(name.tag_order_cer(), Ident::ctxp(1).order());
        assert!(general_name().implicit(Ident::ctxc(0)).is_err());
    }

    #[test]
    fn encode_decode() {
        let mut name = general_name().with(
            "rfc822Name", CommonString::ia5().with_str("a@b").unwrap()
        ).unwrap();
        let data = name.encode().unwrap();
        assert_eq!(data, b"\x81\x03a@b");
        let decoded = general_name().decod(&data, &Ctx::new()).unwrap();
        assert_eq!(decoded, name);
        assert_eq!(decoded.base().tlen(), 0);
        assert_eq!(decoded.base().tlvlen(), 5);

        let err = general_name().decod(b"\x83\x00", &Ctx::new()).unwrap_err();
        assert!(err.is_decode_kind(DecodeErrorKind::TagMismatch));
    }

    #[test]
    fn explicit() {
        let spec = general_name().explicit(Ident::ctxc(3)).unwrap();
        let mut value = spec.clone().with(
            "dNSName", CommonString::ia5().with_str("x").unwrap()
        ).unwrap();
        let data = value.encode().unwrap();
        assert_eq!(data, b"\xa3\x03\x82\x01x");
        assert_eq!(spec.decod(&data, &Ctx::new()).unwrap(), value);
        assert_eq!(value.tag_order(), Ident::ctxc(3).order());
    }

    #[test]
    fn primitive_types() {
        let res = Choice::primitive_types().decod(
            b"\x04\x03foo", &Ctx::new()
        ).unwrap();
        assert_eq!(res.choice(), Some("OctetString"));
        let res = Choice::primitive_types().decod(
            b"\x02\x03\x12\x34\x56", &Ctx::new()
        ).unwrap();
        let value: &Integer = res.value().unwrap().try_into().unwrap();
        assert_eq!(*value, 0x123456);
    }
}
