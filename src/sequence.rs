//! SEQUENCE and SET.
//!
//! Both types are records of named components described by a schema. They
//! only differ in the order components are encoded in and the rules for
//! finding them when decoding, so they share their implementation.

use std::sync::Arc;
use crate::decode::Decoder;
use crate::encode::{append_tlv, next_state, tlv_len, write_header, Target};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::ident::{Tag, TagOrder};
use crate::length::{starts_with_eoc, Length, EOC_LEN};
use crate::obj::{write_cer_components, Asn1, Base, Codec, Decoded, Obj};
use crate::path::PathElem;


//------------ Record --------------------------------------------------------

/// The content of a SEQUENCE or SET.
#[derive(Clone, Debug)]
struct Record {
    base: Base,

    /// The names and schemas of the components.
    schema: Arc<Vec<(&'static str, Obj)>>,

    /// The component values in schema order.
    ///
    /// Absent components and components equal to their default are `None`.
    values: Vec<Option<Obj>>,

    default: Option<Arc<Vec<Option<Obj>>>>,

    /// Whether this is a SET.
    set: bool,
}

impl Record {
    fn new(
        base: Base, set: bool,
        fields: impl IntoIterator<Item = (&'static str, Obj)>,
    ) -> Self {
        let schema: Vec<_> = fields.into_iter().collect();
        Record {
            base,
            values: vec![None; schema.len()],
            schema: Arc::new(schema),
            default: None,
            set,
        }
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.schema.iter().position(|(item, _)| *item == name).ok_or_else(|| {
            Error::ObjUnknown(name.into())
        })
    }

    fn fields(&self) -> impl Iterator<Item = (&'static str, &Obj)> {
        self.schema.iter().map(|(name, spec)| (*name, spec))
    }

    fn values(&self) -> impl Iterator<Item = (&'static str, &Obj)> {
        self.schema.iter().zip(self.values.iter()).filter_map(
            |((name, _), value)| value.as_ref().map(|value| (*name, value))
        )
    }

    fn get(&self, name: &str) -> Result<Option<&Obj>> {
        let idx = self.index_of(name)?;
        let spec = &self.schema[idx].1;
        Ok(self.values[idx].as_ref().or_else(|| {
            spec.has_default().then_some(spec)
        }))
    }

    fn set_value(&mut self, name: &str, value: Obj) -> Result<()> {
        let idx = self.index_of(name)?;
        let spec = &self.schema[idx].1;
        if !spec.same_type(&value) {
            return Err(Error::InvalidValueType(vec![spec.class_name()]))
        }
        let value = spec.adopt(value)?;
        self.values[idx] = if value.is_default() { None } else { Some(value) };
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<Option<Obj>> {
        let idx = self.index_of(name)?;
        Ok(self.values[idx].take())
    }

    fn set_default(&mut self, value: Record) -> Result<()> {
        if !self.same_fields(&value) {
            return Err(Error::InvalidValueType(vec![self.base.class_name]))
        }
        self.base.optional = true;
        if self.values.iter().all(Option::is_none) {
            self.values = value.values.clone();
        }
        self.default = Some(Arc::new(value.values));
        Ok(())
    }

    fn is_default(&self) -> bool {
        self.default.as_deref() == Some(&self.values)
    }

    fn adopt(&self, value: Record) -> Result<Record> {
        let mut res = Record {
            base: self.base.decoded_at(0, 0, 0),
            schema: self.schema.clone(),
            values: vec![None; self.schema.len()],
            default: self.default.clone(),
            set: self.set,
        };
        if value.values.iter().all(Option::is_none) {
            if let Some(default) = self.default.as_ref() {
                res.values = default.as_ref().clone();
            }
            return Ok(res)
        }
        for (name, item) in value.schema.iter().map(|(name, _)| *name).zip(
            value.values
        ) {
            if let Some(item) = item {
                res.set_value(name, item)?;
            }
        }
        Ok(res)
    }

    fn same_fields(&self, other: &Self) -> bool {
        self.fields().map(|(name, _)| name).eq(
            other.fields().map(|(name, _)| name)
        )
    }

    fn ready(&self) -> bool {
        self.schema.iter().zip(self.values.iter()).all(|((_, spec), value)| {
            match value {
                Some(value) => value.ready(),
                None => spec.base().is_optional(),
            }
        })
    }

    fn bered(&self) -> bool {
        self.base.bered() || self.values.iter().flatten().any(Asn1::bered)
    }

    //--- Encoding

    /// Returns the components to encode in encoding order.
    ///
    /// Components equal to their default are left out.
    fn components(&mut self, cer: bool) -> Result<Vec<&mut Obj>> {
        let mut res = Vec::with_capacity(self.values.len());
        for ((name, spec), value) in self.schema.iter().zip(
            self.values.iter_mut()
        ) {
            match value {
                Some(value) => {
                    if !value.is_default() {
                        res.push(value)
                    }
                }
                None => {
                    if !spec.base().is_optional() {
                        return Err(Error::ObjNotReady((*name).into()))
                    }
                }
            }
        }
        if self.set {
            if cer {
                res.sort_by_key(|value| value.tag_order_cer())
            }
            else {
                res.sort_by_key(|value| value.tag_order())
            }
        }
        Ok(res)
    }

    fn write_der(&mut self, out: &mut Vec<u8>) -> Result<()> {
        let tag = self.base.tag;
        let mut content = Vec::new();
        for item in self.components(false)? {
            item.encode_into(&mut content)?;
        }
        append_tlv(out, tag, &content);
        Ok(())
    }

    fn encode_first(&mut self, state: &mut Vec<usize>) -> Result<usize> {
        let tag = self.base.tag;
        let idx = state.len();
        state.push(0);
        let mut vlen = 0;
        for item in self.components(false)? {
            vlen += item.encode1st(state)?;
        }
        state[idx] = vlen;
        Ok(tlv_len(tag, vlen))
    }

    fn encode_second<T: Target, I: Iterator<Item = usize>>(
        &mut self, target: &mut T, state: &mut I
    ) -> Result<()> {
        let vlen = next_state(state)?;
        write_header(target, self.base.tag, Length::Definite(vlen))?;
        for item in self.components(false)? {
            item.encode2nd(target, state)?;
        }
        Ok(())
    }

    fn write_cer<T: Target>(&mut self, target: &mut T) -> Result<()> {
        let tag = self.base.tag;
        let components = self.components(true)?;
        write_cer_components(target, tag, components.into_iter())
    }

    //--- Decoding

    fn decode_value<'a>(
        &self, dec: &mut Decoder, data: &'a [u8], offset: usize,
        tag_only: bool, evgen: bool,
    ) -> Result<Decoded<'a, Self>> {
        let base = &self.base;
        let Some(hdr) = dec.constructed(base, data, offset, tag_only)? else {
            return Ok(Decoded::TagMatched)
        };
        let mut content = Content {
            data: hdr.value,
            offset: offset + hdr.tlen + hdr.llen,
            lenindef: hdr.lenindef,
            vlen: 0,
            ber_encoded: false,
        };
        let mut values = vec![None; self.schema.len()];
        if self.set {
            self.decode_set(dec, &mut content, offset, evgen, &mut values)?;
        }
        else {
            self.decode_sequence(dec, &mut content, offset, evgen, &mut values)?;
        }
        let tail = if hdr.lenindef {
            let tail = dec.eoc(base, offset, content.data)?;
            content.vlen += EOC_LEN;
            tail
        }
        else {
            if !content.data.is_empty() {
                return Err(dec.malformed(base, offset, "remaining data"))
            }
            hdr.tail
        };
        if self.set {
            let missing = self.schema.iter().zip(values.iter()).find(
                |((_, spec), value)| {
                    value.is_none() && !spec.base().is_optional()
                }
            );
            if let Some(((name, _), _)) = missing {
                return Err(dec.malformed(
                    base, offset, format!("{} value is not ready", name)
                ))
            }
        }
        if evgen {
            values.iter_mut().for_each(|value| *value = None);
        }
        let mut res_base = base.decoded_at(offset, hdr.llen, content.vlen);
        res_base.lenindef = hdr.lenindef;
        res_base.ber_encoded = content.ber_encoded;
        Ok(Decoded::Value(
            Record {
                base: res_base,
                schema: self.schema.clone(),
                values,
                default: self.default.clone(),
                set: self.set,
            },
            tail
        ))
    }

    /// Decodes the components of a SEQUENCE.
    ///
    /// Components are expected in schema order. An optional component is
    /// absent if the content is exhausted or its tag doesn’t match.
    fn decode_sequence(
        &self, dec: &mut Decoder, content: &mut Content, offset: usize,
        evgen: bool, values: &mut [Option<Obj>],
    ) -> Result<()> {
        let depth = dec.path().len() + 1;
        for (idx, (name, spec)) in self.schema.iter().enumerate() {
            let optional = spec.base().is_optional();
            if optional && content.at_end() {
                continue
            }
            let res = self.decode_component(
                dec, content, offset, evgen, *name, spec
            );
            let value = match res {
                Ok(value) => value,
                Err(err) if optional && is_mismatch_at(&err, depth) => {
                    log::trace!(
                        "{} absent at {}:{}", name, dec.path(), content.offset
                    );
                    continue
                }
                Err(err) => return Err(err),
            };
            values[idx] = Some(value);
        }
        Ok(())
    }

    /// Decodes the components of a SET.
    ///
    /// Each value found is matched by tag against the components not yet
    /// seen. In DER, components have to appear in tag order.
    fn decode_set(
        &self, dec: &mut Decoder, content: &mut Content, offset: usize,
        evgen: bool, values: &mut [Option<Obj>],
    ) -> Result<()> {
        let mut remaining: Vec<usize> = (0..self.schema.len()).collect();
        let mut order_prev: Option<TagOrder> = None;
        while !content.at_end() {
            let mut found = None;
            for (pos, idx) in remaining.iter().enumerate() {
                let (name, spec) = &self.schema[*idx];
                let matched = dec.child(PathElem::from(*name), |dec| {
                    dec.probe(spec, content.data, content.offset)
                })?;
                if matched {
                    found = Some(pos);
                    break
                }
            }
            let Some(pos) = found else {
                return Err(dec.mismatch(&self.base, offset))
            };
            let idx = remaining.remove(pos);
            let (name, spec) = &self.schema[idx];
            let value_offset = content.offset;
            let value = self.decode_component(
                dec, content, offset, evgen, *name, spec
            )?;
            let order = value.tag_order();
            if order_prev.map(|prev| prev >= order).unwrap_or(false) {
                if dec.bered() || dec.ctx().is_allow_unordered_set() {
                    log::trace!("unordered SET at {}", dec.path());
                    content.ber_encoded = true;
                }
                else {
                    return dec.child(PathElem::from(*name), |dec| {
                        Err(dec.malformed(
                            &self.base, value_offset, "unordered SET"
                        ))
                    })
                }
            }
            order_prev = Some(order);
            values[idx] = Some(value);
        }
        Ok(())
    }

    /// Decodes a single component and advances the content.
    ///
    /// This takes care of DEFAULT values and DEFINED BY.
    fn decode_component(
        &self, dec: &mut Decoder, content: &mut Content, offset: usize,
        evgen: bool, name: &'static str, spec: &Obj,
    ) -> Result<Obj> {
        let base = &self.base;
        let defaulted = spec.has_default();
        let data = content.data;
        let value_offset = content.offset;
        dec.child(PathElem::from(name), |dec| {
            // DEFAULT values need to be compared as a whole, so they are
            // always decoded in memory.
            let (mut value, tail) = if defaulted {
                dec.decode_atomic(spec, data, value_offset, evgen)?
            }
            else {
                dec.decode(spec, data, value_offset, evgen)?
            };
            if !evgen {
                dec.apply_defined(&mut value, base, offset)?;
            }
            let len = value.base().fulllen();
            content.data = tail;
            content.offset += len;
            content.vlen += len;
            if defaulted && value.is_default() {
                if dec.bered() || dec.ctx().is_allow_default_values() {
                    content.ber_encoded = true;
                }
                else {
                    return Err(dec.malformed(
                        base, content.offset, "DEFAULT value met"
                    ))
                }
            }
            if !evgen {
                dec.register_defines(spec, &value);
            }
            Ok(value)
        })
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.base.same_tags(&other.base)
            && self.same_fields(other)
            && self.values == other.values
    }
}


//------------ Content -------------------------------------------------------

/// The state of decoding the content of a record.
struct Content<'a> {
    /// The data not yet decoded.
    data: &'a [u8],

    /// The offset of `data` in the input.
    offset: usize,

    lenindef: bool,

    /// The length of the content decoded so far.
    vlen: usize,

    ber_encoded: bool,
}

impl Content<'_> {
    fn at_end(&self) -> bool {
        self.data.is_empty() || (self.lenindef && starts_with_eoc(self.data))
    }
}

/// Returns whether the error is a tag mismatch at the given path depth.
fn is_mismatch_at(err: &Error, depth: usize) -> bool {
    err.as_decode().map(|err| {
        err.kind() == DecodeErrorKind::TagMismatch && err.path().len() == depth
    }).unwrap_or(false)
}


//------------ Sequence and Set ----------------------------------------------

macro_rules! record_type {
    (
        $(#[$attr:meta])*
        $name:ident, $tag:expr, $type_name:expr, $set:expr
    ) => {
        $(#[$attr])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name(Record);

        impl $name {
            /// Creates a new schema from its named components.
            pub fn new(
                fields: impl IntoIterator<Item = (&'static str, Obj)>
            ) -> Self {
                $name(Record::new(
                    Base::new(stringify!($name), $tag.constructed()),
                    $set, fields
                ))
            }

            /// Returns the names and schemas of the components.
            pub fn fields(
                &self
            ) -> impl Iterator<Item = (&'static str, &Obj)> {
                self.0.fields()
            }

            /// Returns the components that have a value.
            ///
            /// Components equal to their DEFAULT are not included.
            pub fn values(
                &self
            ) -> impl Iterator<Item = (&'static str, &Obj)> {
                self.0.values()
            }

            /// Returns the value of a component.
            ///
            /// If the component is absent but has a DEFAULT, the schema
            /// carrying the default is returned. Fails if there is no
            /// component of that name.
            pub fn get(&self, name: &str) -> Result<Option<&Obj>> {
                self.0.get(name)
            }

            /// Returns whether the component has a value.
            pub fn contains(&self, name: &str) -> bool {
                self.0.index_of(name).map(|idx| {
                    self.0.values[idx].is_some()
                }).unwrap_or(false)
            }

            /// Sets the value of a component.
            ///
            /// The value has to be of the type of the component and takes
            /// its tags and constraints. A value equal to the component’s
            /// DEFAULT removes the component.
            pub fn set(
                &mut self, name: &str, value: impl Into<Obj>
            ) -> Result<()> {
                self.0.set_value(name, value.into())
            }

            pub fn with(
                mut self, name: &str, value: impl Into<Obj>
            ) -> Result<Self> {
                self.set(name, value)?;
                Ok(self)
            }

            /// Removes the value of a component and returns it.
            pub fn remove(&mut self, name: &str) -> Result<Option<Obj>> {
                self.0.remove(name)
            }

            /// Adds a DEFAULT value.
            ///
            /// The value has to have the same components.
            pub fn default(mut self, value: Self) -> Result<Self> {
                self.0.set_default(value.0)?;
                Ok(self)
            }

            pub fn is_default(&self) -> bool {
                self.0.is_default()
            }

            pub fn has_default(&self) -> bool {
                self.0.default.is_some()
            }

            pub(crate) fn adopt(&self, value: Self) -> Result<Self> {
                self.0.adopt(value.0).map($name)
            }
        }

        impl Codec for $name {
            fn base_mut(&mut self) -> &mut Base {
                &mut self.0.base
            }

            fn write_der(&mut self, out: &mut Vec<u8>) -> Result<()> {
                self.0.write_der(out)
            }

            fn encode_first(
                &mut self, state: &mut Vec<usize>
            ) -> Result<usize> {
                self.0.encode_first(state)
            }

            fn encode_second<T: Target, I: Iterator<Item = usize>>(
                &mut self, target: &mut T, state: &mut I
            ) -> Result<()> {
                self.0.encode_second(target, state)
            }

            fn write_cer<T: Target>(&mut self, target: &mut T) -> Result<()> {
                self.0.write_cer(target)
            }

            fn decode_value<'a>(
                &self, dec: &mut Decoder, data: &'a [u8], offset: usize,
                tag_only: bool, evgen: bool,
            ) -> Result<Decoded<'a, Self>> {
                self.0.decode_value(
                    dec, data, offset, tag_only, evgen
                ).map(|res| res.map($name))
            }

            fn from_obj(obj: Obj) -> Result<Self> {
                Self::try_from(obj)
            }
        }

        impl Asn1 for $name {
            fn base(&self) -> &Base {
                &self.0.base
            }

            fn type_name(&self) -> &'static str {
                $type_name
            }

            fn ready(&self) -> bool {
                self.0.ready()
            }

            fn bered(&self) -> bool {
                self.0.bered()
            }
        }
    }
}

record_type!(
    /// A SEQUENCE of named components.
    ///
    /// The schema is the ordered list of components. Components are encoded
    /// in that order, leaving out absent OPTIONAL components and components
    /// equal to their DEFAULT.
    ///
    /// When decoding, a DEFAULT component that is present with its default
    /// value is an error in DER. With `bered` or `allow_default_values`
    /// set in the [`Ctx`][crate::Ctx], it is accepted and the result is
    /// marked as BER encoded.
    ///
    /// ```
    /// use derasn::{Asn1, Boolean, Ctx, Integer, Obj, Sequence};
    ///
    /// let schema = Sequence::new([
    ///     ("critical", Obj::from(Boolean::new().default(false))),
    ///     ("serial", Obj::from(Integer::new())),
    /// ]);
    /// let mut value = schema.clone().with("serial", Integer::from(5))?;
    /// assert_eq!(value.encode()?, b"\x30\x03\x02\x01\x05");
    ///
    /// let data = b"\x30\x06\x01\x01\x00\x02\x01\x05";
    /// assert!(schema.decod(data, &Ctx::new()).is_err());
    /// assert!(schema.decod(data, &Ctx::ber())?.bered());
    /// # Ok::<_, derasn::Error>(())
    /// ```
    Sequence, Tag::SEQUENCE, "SEQUENCE", false
);

record_type!(
    /// A SET of named components.
    ///
    /// This works like [`Sequence`] except that components are encoded in
    /// the order of their tags and may appear in any order when decoding
    /// BER. In DER, unordered components are an error unless
    /// `allow_unordered_set` is set in the [`Ctx`][crate::Ctx].
    Set, Tag::SET, "SET", true
);


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use std::ops::ControlFlow;
    use super::*;
    use crate::any::Any;
    use crate::boolean::Boolean;
    use crate::ctx::Ctx;
    use crate::decode::Defines;
    use crate::encode::{encode2pass, encode_cer};
    use crate::ident::Ident;
    use crate::int::Integer;
    use crate::oid::{ObjectIdentifier, Oid};
    use crate::string::CommonString;

    fn schema() -> Sequence {
        Sequence::new([
            ("version", Obj::from(
                Integer::new().default(0).unwrap()
                    .explicit(Ident::ctxc(0)).unwrap()
            )),
            ("serial", Obj::from(Integer::new())),
            ("name", Obj::from(CommonString::printable().optional())),
        ])
    }

    fn decode_err(schema: &Sequence, data: &[u8], ctx: &Ctx) -> String {
        schema.decod(data, ctx).unwrap_err().as_decode().unwrap()
            .msg().to_string()
    }

    #[test]
    fn set_and_get() {
        let mut seq = schema();
        assert!(!seq.ready());
        assert!(matches!(seq.encode(), Err(Error::ObjNotReady(_))));
        assert!(matches!(
            seq.set("issuer", Integer::from(1)), Err(Error::ObjUnknown(_))
        ));
        assert!(matches!(
            seq.set("serial", Boolean::from(true)),
            Err(Error::InvalidValueType(_))
        ));
        seq.set("serial", Integer::from(5)).unwrap();
        assert!(seq.ready());
        assert!(seq.contains("serial"));
        assert!(!seq.contains("version"));
        let version: &Integer = seq.get("version").unwrap().unwrap()
            .try_into().unwrap();
        assert_eq!(*version, 0);
        assert!(seq.get("name").unwrap().is_none());

        seq.set("version", Integer::from(0)).unwrap();
        assert!(!seq.contains("version"));
        seq.set("version", Integer::from(2)).unwrap();
        assert!(seq.contains("version"));
        assert!(seq.remove("version").unwrap().is_some());
        assert!(!seq.contains("version"));
    }

    #[test]
    fn encode_decode() {
        let mut seq = schema().with("serial", Integer::from(5)).unwrap();
        assert_eq!(seq.encode().unwrap(), b"\x30\x03\x02\x01\x05");

        seq.set("version", Integer::from(1)).unwrap();
        seq.set(
            "name", CommonString::printable().with_str("ab").unwrap()
        ).unwrap();
        let data = seq.encode().unwrap();
        assert_eq!(
            data,
            b"\x30\x0c\xa0\x03\x02\x01\x01\x02\x01\x05\x13\x02ab".as_ref()
        );
        assert_eq!(encode2pass(&mut seq).unwrap(), data);

        let decoded = schema().decod(&data, &Ctx::new()).unwrap();
        assert_eq!(decoded, seq);
        assert_eq!(decoded.base().tlvlen(), data.len());
        let serial = decoded.get("serial").unwrap().unwrap();
        assert_eq!(serial.base().offset(), 7);

        let cer = encode_cer(&mut seq).unwrap();
        assert_eq!(&cer[..2], b"\x30\x80");
        assert_eq!(schema().decod(&cer, &Ctx::ber()).unwrap(), seq);
    }

    #[test]
    fn decode_default() {
        let data = b"\x30\x08\xa0\x03\x02\x01\x00\x02\x01\x05";
        assert_eq!(
            decode_err(&schema(), data, &Ctx::new()), "DEFAULT value met"
        );
        let err = schema().decod(data, &Ctx::new()).unwrap_err();
        assert_eq!(err.as_decode().unwrap().path().to_string(), "version");

        let res = schema().decod(data, &Ctx::ber()).unwrap();
        assert!(res.bered());
        assert!(res.base().ber_encoded());
        let res = schema().decod(
            data, &Ctx::new().allow_default_values(true)
        ).unwrap();
        assert!(res.base().ber_encoded());
    }

    #[test]
    fn decode_errors() {
        assert_eq!(
            decode_err(
                &schema(), b"\x30\x06\x02\x01\x05\x02\x01\x06", &Ctx::new()
            ),
            "remaining data"
        );
        let err = schema().decod(b"\x30\x03\x01\x01\x00", &Ctx::new())
            .unwrap_err();
        assert!(err.is_decode_kind(DecodeErrorKind::TagMismatch));
        assert_eq!(err.as_decode().unwrap().path().to_string(), "serial");
        assert!(schema().decod(b"\x30\x05\x02\x01\x05", &Ctx::new())
            .unwrap_err().is_decode_kind(DecodeErrorKind::NotEnoughData));
    }

    #[test]
    fn decode_lenindef() {
        let data = b"\x30\x80\x02\x01\x05\x00\x00";
        assert!(schema().decod(data, &Ctx::new()).unwrap_err()
            .is_decode_kind(DecodeErrorKind::LenIndefForm));
        let res = schema().decod(data, &Ctx::ber()).unwrap();
        assert!(res.base().lenindef());
        assert_eq!(res.base().tlvlen(), 7);
        assert_eq!(
            decode_err(&schema(), b"\x30\x80\x02\x01\x05", &Ctx::ber()),
            "no EOC"
        );
    }

    #[test]
    fn defined_by() {
        let oid: Oid = "1.2.3".parse().unwrap();
        let schema = Sequence::new([
            ("type", Obj::from(ObjectIdentifier::new().with_defines(
                Defines::new().rule(
                    ["value"], [(oid.clone(), Obj::from(Integer::new()))]
                )
            ))),
            ("value", Obj::from(Any::new())),
        ]);
        let data = b"\x30\x07\x06\x02\x2a\x03\x02\x01\x07";
        let res = schema.decod(data, &Ctx::new()).unwrap();
        let (by, value) = res.get("value").unwrap().unwrap().defined()
            .unwrap();
        assert_eq!(by, &oid);
        let value: &Integer = value.try_into().unwrap();
        assert_eq!(*value, 7);
        assert_eq!(value.base().offset(), 6);

        let res = schema.decod(
            b"\x30\x07\x06\x02\x2a\x04\x02\x01\x07", &Ctx::new()
        ).unwrap();
        assert!(res.get("value").unwrap().unwrap().defined().is_none());
    }

    #[test]
    fn evgen() {
        let mut paths = Vec::new();
        schema().decode_evgen(
            b"\x30\x03\x02\x01\x05", &Ctx::new(), |path, obj, _| {
                paths.push((path.to_string(), obj.type_name()));
                ControlFlow::Continue(())
            }
        ).unwrap();
        assert_eq!(
            paths,
            [
                ("serial".to_string(), "INTEGER"),
                (String::new(), "SEQUENCE")
            ]
        );
    }

    fn set_schema() -> Set {
        Set::new([
            ("flag", Obj::from(
                Boolean::new().implicit(Ident::ctxp(1)).unwrap()
            )),
            ("num", Obj::from(
                Integer::new().implicit(Ident::ctxp(0)).unwrap()
            )),
        ])
    }

    #[test]
    fn set_encode_decode() {
        let mut set = set_schema()
            .with("flag", Boolean::from(true)).unwrap()
            .with("num", Integer::from(5)).unwrap();
        let data = set.encode().unwrap();
        assert_eq!(data, b"\x31\x06\x80\x01\x05\x81\x01\xff");
        assert_eq!(encode2pass(&mut set).unwrap(), data);
        assert_eq!(
            encode_cer(&mut set).unwrap(),
            b"\x31\x80\x80\x01\x05\x81\x01\xff\x00\x00"
        );
        assert_eq!(set_schema().decod(&data, &Ctx::new()).unwrap(), set);
    }

    #[test]
    fn set_decode_errors() {
        let unordered = b"\x31\x06\x81\x01\xff\x80\x01\x05";
        let err = set_schema().decod(unordered, &Ctx::new()).unwrap_err();
        assert_eq!(err.as_decode().unwrap().msg(), "unordered SET");
        let res = set_schema().decod(
            unordered, &Ctx::new().allow_unordered_set(true)
        ).unwrap();
        assert!(res.base().ber_encoded());
        assert!(set_schema().decod(unordered, &Ctx::ber()).unwrap().bered());

        let err = set_schema().decod(b"\x31\x03\x80\x01\x05", &Ctx::new())
            .unwrap_err();
        assert_eq!(err.as_decode().unwrap().msg(), "flag value is not ready");

        let err = set_schema().decod(b"\x31\x03\x82\x01\x05", &Ctx::new())
            .unwrap_err();
        assert!(err.is_decode_kind(DecodeErrorKind::TagMismatch));
    }
}
