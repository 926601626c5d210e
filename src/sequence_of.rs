//! SEQUENCE OF and SET OF.
//!
//! Both types are lists of values of a single schema. A SET OF encodes its
//! elements sorted by their encoding, which is checked again when decoding
//! DER.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use crate::decode::Decoder;
use crate::encode::{append_tlv, next_state, tlv_len, write_header, Target};
use crate::encode::{write_eoc, write_lenindef};
use crate::error::{Error, Result};
use crate::ident::Tag;
use crate::length::{starts_with_eoc, Length, EOC_LEN};
use crate::obj::{write_all, Asn1, Base, Codec, Decoded, Obj};
use crate::path::PathElem;
use crate::string::LenBounds;


//------------ ElementSource -------------------------------------------------

type BoxedIter = Box<dyn Iterator<Item = Obj> + Send>;

/// An iterator providing the elements of a SEQUENCE OF while encoding.
///
/// The iterator can only be used once. Clones of a list share the same
/// source, so whichever is encoded first drains it.
#[derive(Clone)]
pub struct ElementSource(Arc<Mutex<Option<BoxedIter>>>);

impl ElementSource {
    fn new<I>(iter: I) -> Self
    where I: IntoIterator<Item = Obj>, I::IntoIter: Send + 'static {
        ElementSource(Arc::new(Mutex::new(Some(Box::new(iter.into_iter())))))
    }

    /// Takes the iterator out of the source.
    ///
    /// A source that has been drained before yields nothing.
    fn take(&self) -> impl Iterator<Item = Obj> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take()
            .into_iter().flatten()
    }

    fn is_drained(&self) -> bool {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).is_none()
    }
}

impl PartialEq for ElementSource {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ElementSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_drained() {
            f.write_str("ElementSource(drained)")
        }
        else {
            f.write_str("ElementSource(..)")
        }
    }
}


//------------ Elements ------------------------------------------------------

/// The elements of a list.
#[derive(Clone, Debug, PartialEq)]
pub enum Elements {
    /// Elements kept in memory.
    Materialized(Vec<Obj>),

    /// Elements produced by an iterator when encoding.
    ///
    /// Encoding drains the iterator and leaves the list as an empty
    /// `Materialized`. Two-pass encoding drains it in the first pass, so
    /// a fresh source with the same elements has to be set before the
    /// second pass.
    Source(ElementSource),
}

impl Default for Elements {
    fn default() -> Self {
        Elements::Materialized(Vec::new())
    }
}


//------------ List ----------------------------------------------------------

/// The content of a SEQUENCE OF or SET OF.
#[derive(Clone, Debug)]
struct List {
    base: Base,

    /// The schema of the elements.
    spec: Arc<Obj>,

    bounds: LenBounds,
    elements: Elements,
    default: Option<Arc<Vec<Obj>>>,

    /// Whether this is a SET OF.
    set: bool,
}

impl List {
    fn new(base: Base, set: bool, spec: Obj) -> Self {
        List {
            base,
            spec: Arc::new(spec),
            bounds: LenBounds::default(),
            elements: Elements::default(),
            default: None,
            set,
        }
    }

    fn items(&self) -> &[Obj] {
        match &self.elements {
            Elements::Materialized(items) => items,
            Elements::Source(_) => &[],
        }
    }

    fn items_mut(&mut self) -> &mut [Obj] {
        match &mut self.elements {
            Elements::Materialized(items) => items,
            Elements::Source(_) => &mut [],
        }
    }

    /// Checks the type of an element and gives it the element tags.
    fn sanitize(&self, value: Obj) -> Result<Obj> {
        if !self.spec.same_type(&value) {
            return Err(Error::InvalidValueType(
                vec![Obj::class_name(&self.spec)]
            ))
        }
        self.spec.adopt(value)
    }

    fn push(&mut self, value: Obj) -> Result<()> {
        let value = self.sanitize(value)?;
        let bounds = self.bounds;
        match &mut self.elements {
            Elements::Materialized(items) => {
                if bounds.max.map_or(false, |max| items.len() >= max) {
                    bounds.check(items.len() + 1)?;
                }
                items.push(value);
                Ok(())
            }
            Elements::Source(_) => {
                Err(Error::invalid("elements are provided by an iterator"))
            }
        }
    }

    /// Checks a complete list of elements.
    fn checked(
        &self, items: impl IntoIterator<Item = Obj>
    ) -> Result<Vec<Obj>> {
        let items = items.into_iter().map(|item| {
            self.sanitize(item)
        }).collect::<Result<Vec<_>>>()?;
        self.bounds.check(items.len())?;
        Ok(items)
    }

    fn set_items(
        &mut self, items: impl IntoIterator<Item = Obj>
    ) -> Result<()> {
        self.elements = Elements::Materialized(self.checked(items)?);
        Ok(())
    }

    fn set_source<I>(&mut self, iter: I)
    where I: IntoIterator<Item = Obj>, I::IntoIter: Send + 'static {
        self.elements = Elements::Source(ElementSource::new(iter))
    }

    fn set_default(
        &mut self, items: impl IntoIterator<Item = Obj>
    ) -> Result<()> {
        let items = self.checked(items)?;
        self.base.optional = true;
        if self.items().is_empty() {
            self.elements = Elements::Materialized(items.clone());
        }
        self.default = Some(Arc::new(items));
        Ok(())
    }

    fn is_default(&self) -> bool {
        match (&self.elements, self.default.as_deref()) {
            (Elements::Materialized(items), Some(default)) => {
                items == default
            }
            _ => false,
        }
    }

    fn adopt(&self, value: List) -> Result<List> {
        let mut res = List {
            base: self.base.decoded_at(0, 0, 0),
            spec: self.spec.clone(),
            bounds: self.bounds,
            elements: Elements::default(),
            default: self.default.clone(),
            set: self.set,
        };
        match value.elements {
            Elements::Materialized(items) => res.set_items(items)?,
            Elements::Source(source) => {
                res.elements = Elements::Source(source)
            }
        }
        Ok(res)
    }

    fn ready(&self) -> bool {
        match &self.elements {
            Elements::Materialized(items) => {
                self.bounds.check(items.len()).is_ok()
                    && items.iter().all(Asn1::ready)
            }
            Elements::Source(_) => true,
        }
    }

    fn bered(&self) -> bool {
        self.base.bered() || self.items().iter().any(Asn1::bered)
    }

    //--- Encoding

    /// Runs `op` on every element in list order.
    ///
    /// A `Source` is drained and replaced with an empty `Materialized`.
    /// Its elements are type-checked and counted as they are produced, so
    /// bounds violations are only found at the end.
    fn for_each(
        &mut self, mut op: impl FnMut(&mut Obj) -> Result<()>
    ) -> Result<()> {
        match &mut self.elements {
            Elements::Materialized(items) => {
                self.bounds.check(items.len())?;
                items.iter_mut().try_for_each(op)
            }
            Elements::Source(source) => {
                let iter = source.take();
                self.elements = Elements::default();
                if self.set {
                    return Err(Error::invalid(
                        "SET OF does not support iterator values"
                    ))
                }
                let mut count = 0;
                for mut item in iter {
                    if !self.spec.same_type(&item) {
                        return Err(Error::InvalidValueType(
                            vec![Obj::class_name(&self.spec)]
                        ))
                    }
                    op(&mut item)?;
                    count += 1;
                }
                self.bounds.check(count)?;
                Ok(())
            }
        }
    }

    fn write_der(&mut self, out: &mut Vec<u8>) -> Result<()> {
        let tag = self.base.tag;
        let mut content = Vec::new();
        if self.set {
            let mut parts = Vec::new();
            self.for_each(|item| {
                parts.push(item.encode()?);
                Ok(())
            })?;
            parts.sort();
            parts.iter().for_each(|part| content.extend_from_slice(part));
        }
        else {
            self.for_each(|item| item.encode_into(&mut content))?;
        }
        append_tlv(out, tag, &content);
        Ok(())
    }

    fn encode_first(&mut self, state: &mut Vec<usize>) -> Result<usize> {
        let tag = self.base.tag;
        let idx = state.len();
        state.push(0);
        let mut vlen = 0;
        self.for_each(|item| {
            vlen += item.encode1st(state)?;
            Ok(())
        })?;
        state[idx] = vlen;
        Ok(tlv_len(tag, vlen))
    }

    fn encode_second<T: Target, I: Iterator<Item = usize>>(
        &mut self, target: &mut T, state: &mut I
    ) -> Result<()> {
        let vlen = next_state(state)?;
        write_header(target, self.base.tag, Length::Definite(vlen))?;
        if self.set {
            // The lengths were recorded in list order, so the elements are
            // encoded in that order and sorted afterwards.
            let mut parts = Vec::new();
            self.for_each(|item| {
                let mut buf = Vec::new();
                item.encode2nd(&mut buf, &mut *state)?;
                parts.push(buf);
                Ok(())
            })?;
            parts.sort();
            write_all(target, &parts)
        }
        else {
            self.for_each(|item| item.encode2nd(&mut *target, &mut *state))
        }
    }

    fn write_cer<T: Target>(&mut self, target: &mut T) -> Result<()> {
        write_lenindef(target, self.base.tag)?;
        if self.set {
            let mut parts = Vec::new();
            self.for_each(|item| {
                let mut buf = Vec::new();
                item.encode_cer(&mut buf)?;
                parts.push(buf);
                Ok(())
            })?;
            parts.sort();
            write_all(target, &parts)?;
        }
        else {
            self.for_each(|item| item.encode_cer(&mut *target))?;
        }
        write_eoc(target)
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
        let mut rest = hdr.value;
        let mut sub_offset = offset + hdr.tlen + hdr.llen;
        let mut vlen = 0;
        let mut count = 0;
        let mut items = Vec::new();
        let mut prev: &[u8] = &[];
        let mut ber_encoded = false;
        while !(rest.is_empty() || (hdr.lenindef && starts_with_eoc(rest))) {
            let (value, tail) = dec.child(PathElem::Index(count), |dec| {
                dec.decode(&self.spec, rest, sub_offset, evgen)
            })?;
            let len = value.base().fulllen();
            if self.set {
                let raw = &rest[..len];
                if prev > raw {
                    if dec.bered() || dec.ctx().is_allow_unordered_set() {
                        log::trace!("unordered SET OF at {}", dec.path());
                        ber_encoded = true;
                    }
                    else {
                        return dec.child(PathElem::Index(count), |dec| {
                            Err(dec.malformed(
                                base, sub_offset, "unordered SET OF"
                            ))
                        })
                    }
                }
                prev = raw;
            }
            if !evgen {
                items.push(value);
            }
            count += 1;
            sub_offset += len;
            vlen += len;
            rest = tail;
        }
        if let Err(err) = self.bounds.check(count) {
            return Err(dec.malformed(base, offset, err.to_string()))
        }
        let tail = if hdr.lenindef {
            let tail = dec.eoc(base, offset, rest)?;
            vlen += EOC_LEN;
            tail
        }
        else {
            hdr.tail
        };
        let mut res_base = base.decoded_at(offset, hdr.llen, vlen);
        res_base.lenindef = hdr.lenindef;
        res_base.ber_encoded = ber_encoded;
        Ok(Decoded::Value(
            List {
                base: res_base,
                spec: self.spec.clone(),
                bounds: self.bounds,
                elements: Elements::Materialized(items),
                default: self.default.clone(),
                set: self.set,
            },
            tail
        ))
    }
}

impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        self.base.same_tags(&other.base)
            && self.spec.same_type(&other.spec)
            && self.elements == other.elements
    }
}


//------------ SequenceOf and SetOf ------------------------------------------

macro_rules! list_type {
    (
        $(#[$attr:meta])*
        $name:ident, $tag:expr, $type_name:expr, $set:expr
    ) => {
        $(#[$attr])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name(List);

        impl $name {
            /// Creates an empty list of elements of the given schema.
            pub fn new(spec: impl Into<Obj>) -> Self {
                $name(List::new(
                    Base::new(stringify!($name), $tag.constructed()),
                    $set, spec.into()
                ))
            }

            /// Sets inclusive bounds for the number of elements.
            pub fn bounds(mut self, min: usize, max: Option<usize>) -> Self {
                self.0.bounds = LenBounds::new(min, max);
                self
            }

            /// Returns the schema of the elements.
            pub fn spec(&self) -> &Obj {
                &self.0.spec
            }

            pub fn elements(&self) -> &Elements {
                &self.0.elements
            }

            /// Returns the elements kept in memory.
            ///
            /// This is empty if the elements are provided by an iterator.
            pub fn items(&self) -> &[Obj] {
                self.0.items()
            }

            pub(crate) fn items_mut(&mut self) -> &mut [Obj] {
                self.0.items_mut()
            }

            pub fn iter(&self) -> impl Iterator<Item = &Obj> {
                self.0.items().iter()
            }

            pub fn get(&self, idx: usize) -> Option<&Obj> {
                self.0.items().get(idx)
            }

            pub fn len(&self) -> usize {
                self.0.items().len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.items().is_empty()
            }

            /// Appends an element.
            ///
            /// The element has to be of the type of the schema and takes
            /// its tags. Fails if the list would exceed its upper bound.
            pub fn push(&mut self, value: impl Into<Obj>) -> Result<()> {
                self.0.push(value.into())
            }

            /// Replaces all elements.
            pub fn set_items(
                &mut self, items: impl IntoIterator<Item = Obj>
            ) -> Result<()> {
                self.0.set_items(items)
            }

            pub fn with_items(
                mut self, items: impl IntoIterator<Item = Obj>
            ) -> Result<Self> {
                self.set_items(items)?;
                Ok(self)
            }

            /// Adds a DEFAULT value.
            pub fn default(
                mut self, items: impl IntoIterator<Item = Obj>
            ) -> Result<Self> {
                self.0.set_default(items)?;
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

list_type!(
    /// A SEQUENCE OF values of a single schema.
    ///
    /// Instead of keeping all elements in memory, the elements can be
    /// provided by an iterator through [`set_source`][Self::set_source].
    ///
    /// ```
    /// use derasn::{Asn1, Ctx, Integer, Obj, SequenceOf};
    ///
    /// let schema = SequenceOf::new(Integer::new()).bounds(1, Some(3));
    /// let mut value = schema.clone().with_items([
    ///     Obj::from(Integer::from(1)), Obj::from(Integer::from(2)),
    /// ])?;
    /// let data = value.encode()?;
    /// assert_eq!(data, b"\x30\x06\x02\x01\x01\x02\x01\x02");
    /// assert_eq!(schema.decod(&data, &Ctx::new())?.len(), 2);
    /// assert!(schema.decod(b"\x30\x00", &Ctx::new()).is_err());
    /// # Ok::<_, derasn::Error>(())
    /// ```
    SequenceOf, Tag::SEQUENCE, "SEQUENCE OF", false
);

list_type!(
    /// A SET OF values of a single schema.
    ///
    /// Elements are encoded sorted by their encoding. When decoding DER,
    /// elements out of that order are an error unless `bered` or
    /// `allow_unordered_set` is set in the [`Ctx`][crate::Ctx].
    SetOf, Tag::SET, "SET OF", true
);

impl SequenceOf {
    /// Provides the elements through an iterator.
    ///
    /// The iterator is drained by the next encoding, after which the list
    /// is empty.
    pub fn set_source<I>(&mut self, iter: I)
    where I: IntoIterator<Item = Obj>, I::IntoIter: Send + 'static {
        self.0.set_source(iter)
    }

    pub fn with_source<I>(mut self, iter: I) -> Self
    where I: IntoIterator<Item = Obj>, I::IntoIter: Send + 'static {
        self.set_source(iter);
        self
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::boolean::Boolean;
    use crate::ctx::Ctx;
    use crate::encode::{encode2pass, encode_cer};
    use crate::error::DecodeErrorKind;
    use crate::int::Integer;
    use crate::string::OctetString;

    fn ints(values: &[i32]) -> Vec<Obj> {
        values.iter().map(|value| Obj::from(Integer::from(*value))).collect()
    }

    fn decode_err<A: Asn1 + fmt::Debug>(
        schema: &A, data: &[u8], ctx: &Ctx
    ) -> String {
        schema.decod(data, ctx).unwrap_err().as_decode().unwrap()
            .msg().to_string()
    }

    #[test]
    fn push_and_bounds() {
        let mut list = SequenceOf::new(Integer::new()).bounds(1, Some(2));
        assert!(!list.ready());
        assert!(matches!(list.encode(), Err(Error::Bounds(_))));
        assert!(matches!(
            list.push(Boolean::from(true)),
            Err(Error::InvalidValueType(names)) if names == ["Integer"]
        ));
        list.push(Integer::from(1)).unwrap();
        list.push(Integer::from(2)).unwrap();
        assert!(list.ready());
        assert!(matches!(list.push(Integer::from(3)), Err(Error::Bounds(_))));
        assert_eq!(list.len(), 2);
        assert!(matches!(
            list.set_items(ints(&[1, 2, 3])), Err(Error::Bounds(_))
        ));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn encode_decode() {
        let schema = SequenceOf::new(Integer::new());
        let mut list = schema.clone().with_items(ints(&[3, 1, 2])).unwrap();
        let data = list.encode().unwrap();
        assert_eq!(data, b"\x30\x09\x02\x01\x03\x02\x01\x01\x02\x01\x02");
        assert_eq!(encode2pass(&mut list).unwrap(), data);

        let decoded = schema.decod(&data, &Ctx::new()).unwrap();
        assert_eq!(decoded, list);
        assert_eq!(decoded.get(1).unwrap().base().offset(), 5);

        let cer = encode_cer(&mut list).unwrap();
        assert_eq!(
            cer, b"\x30\x80\x02\x01\x03\x02\x01\x01\x02\x01\x02\x00\x00"
        );
        assert!(schema.decod(&cer, &Ctx::new()).unwrap_err().is_decode_kind(
            DecodeErrorKind::LenIndefForm
        ));
        let decoded = schema.decod(&cer, &Ctx::ber()).unwrap();
        assert_eq!(decoded, list);
        assert!(decoded.bered());
        assert_eq!(decoded.base().vlen(), 11);
    }

    #[test]
    fn decode_errors() {
        let schema = SequenceOf::new(Integer::new()).bounds(1, Some(2));
        assert_eq!(
            decode_err(&schema, b"\x30\x00", &Ctx::new()),
            "unsatisfied bounds: 1 <= 0 <= 2"
        );
        let err = schema.decod(
            b"\x30\x06\x02\x01\x01\x01\x01\xff", &Ctx::new()
        ).unwrap_err();
        let err = err.as_decode().unwrap();
        assert_eq!(err.kind(), DecodeErrorKind::TagMismatch);
        assert_eq!(err.path().to_string(), "1");
        assert_eq!(
            decode_err(&schema, b"\x30\x80\x02\x01\x01", &Ctx::ber()),
            "no EOC"
        );
    }

    #[test]
    fn source() {
        let schema = SequenceOf::new(Integer::new()).bounds(0, Some(2));
        let mut list = schema.clone().with_source(ints(&[1, 2]));
        assert!(list.ready());
        assert!(list.is_empty());
        assert_eq!(
            list.encode().unwrap(), b"\x30\x06\x02\x01\x01\x02\x01\x02"
        );
        assert_eq!(list.elements(), &Elements::Materialized(Vec::new()));
        assert_eq!(list.encode().unwrap(), b"\x30\x00");

        list.set_source(ints(&[1, 2, 3]));
        assert!(matches!(list.encode(), Err(Error::Bounds(_))));

        list.set_source(vec![Obj::from(Boolean::from(true))]);
        assert!(matches!(
            list.encode(),
            Err(Error::InvalidValueType(names)) if names == ["Integer"]
        ));

        let mut list = schema.with_source(ints(&[5]));
        let mut state = Vec::new();
        let len = list.encode1st(&mut state).unwrap();
        assert_eq!(len, 5);
        list.set_source(ints(&[5]));
        let mut out = Vec::new();
        list.encode2nd(&mut out, &mut state.into_iter()).unwrap();
        assert_eq!(out, b"\x30\x03\x02\x01\x05");
    }

    #[test]
    fn set_of_encode() {
        let mut set = SetOf::new(OctetString::new()).with_items([
            Obj::from(OctetString::from(&b"zz"[..])),
            Obj::from(OctetString::from(&b"a"[..])),
            Obj::from(OctetString::from(&b"ab"[..])),
        ]).unwrap();
        let data = set.encode().unwrap();
        assert_eq!(
            data,
            b"\x31\x0b\x04\x01a\x04\x02ab\x04\x02zz".as_ref()
        );
        assert_eq!(encode2pass(&mut set).unwrap(), data);
        assert_eq!(
            encode_cer(&mut set).unwrap(),
            b"\x31\x80\x04\x01a\x04\x02ab\x04\x02zz\x00\x00".as_ref()
        );
    }

    #[test]
    fn set_of_decode_unordered() {
        let schema = SetOf::new(Integer::new());
        let data = b"\x31\x06\x02\x01\x02\x02\x01\x01";
        let err = schema.decod(data, &Ctx::new()).unwrap_err();
        let err = err.as_decode().unwrap();
        assert_eq!(err.msg(), "unordered SET OF");
        assert_eq!(err.path().to_string(), "1");
        assert_eq!(err.offset(), 5);

        let res = schema.decod(
            data, &Ctx::new().allow_unordered_set(true)
        ).unwrap();
        assert!(res.base().ber_encoded());
        assert_eq!(res.len(), 2);
        assert!(schema.decod(data, &Ctx::ber()).unwrap().bered());
    }

    #[test]
    fn default() {
        let schema = SequenceOf::new(Integer::new()).default(ints(&[1]))
            .unwrap();
        assert!(schema.base().is_optional());
        assert!(schema.is_default());
        let value = schema.adopt(
            SequenceOf::new(Integer::new()).with_items(ints(&[2])).unwrap()
        ).unwrap();
        assert!(!value.is_default());
        assert!(value.has_default());
    }
}
