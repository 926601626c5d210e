//! DEFINED BY resolution.
//!
//! This is a private module. Its public content is being re-exported by the
//! parent module.

use std::collections::HashMap;
use std::sync::Arc;
use crate::error::Result;
use crate::obj::{Asn1, Base, Obj};
use crate::oid::Oid;
use crate::path::{get_def_by_path, PathElem, RelPath};
use super::Decoder;


//------------ Defines -------------------------------------------------------

/// The schemas an object identifier selects for other values.
///
/// A `Defines` value is a list of rules. Each rule names a value through a
/// path relative to the SEQUENCE or SET holding the object identifier and
/// maps object identifiers to the schema that value should be decoded with.
///
/// Rules are attached either to an object identifier schema directly via
/// [`ObjectIdentifier::defines`][crate::ObjectIdentifier::defines] or to a
/// decode path via [`Ctx::defines_by_path`][crate::Ctx::defines_by_path].
/// When the identifier is decoded and one of the rules knows its value, the
/// target value is decoded again with the selected schema once the decoder
/// reaches it. The target has to be an ANY, OCTET STRING or BIT STRING, or
/// a SEQUENCE OF these, in which case every element is decoded.
#[derive(Clone, Debug, Default)]
pub struct Defines(Arc<Vec<DefinesRule>>);

impl Defines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule.
    ///
    /// The path is given in the textual form accepted by
    /// [`RelPath::parse`].
    pub fn rule<'s>(
        mut self,
        path: impl IntoIterator<Item = &'s str>,
        schemas: impl IntoIterator<Item = (Oid, Obj)>,
    ) -> Self {
        Arc::make_mut(&mut self.0).push(DefinesRule {
            path: RelPath::parse(path),
            schemas: schemas.into_iter().collect(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn rules(&self) -> &[DefinesRule] {
        self.0.as_slice()
    }
}


//------------ DefinesRule ---------------------------------------------------

/// A single rule of a [`Defines`] value.
#[derive(Clone, Debug)]
pub struct DefinesRule {
    path: RelPath,
    schemas: HashMap<Oid, Obj>,
}

impl DefinesRule {
    /// Returns the path of the value the rule applies to.
    pub fn path(&self) -> &RelPath {
        &self.path
    }

    /// Returns the schema for the given object identifier.
    pub fn schema(&self, oid: &Oid) -> Option<&Obj> {
        self.schemas.get(oid)
    }
}


//------------ Decoder -------------------------------------------------------

impl Decoder<'_> {
    /// Collects the DEFINED BY rules triggered by a decoded component.
    ///
    /// The decoder must be positioned at the component. Rules are taken
    /// from the component’s schema or, if it has none, from the context.
    pub(crate) fn register_defines(&mut self, spec: &Obj, value: &Obj) {
        let Some(oid) = value.oid_value() else { return };
        let ctx = self.ctx();
        let defines = match spec.defines() {
            Some(defines) if !defines.is_empty() => defines,
            _ => match ctx.defines_at(self.path()) {
                Some(defines) => defines,
                None => return,
            }
        };
        for rule in defines.rules() {
            let Some(schema) = rule.schema(oid) else { continue };
            let pattern = rule.path().resolve(self.path().parent());
            log::debug!(
                "{} at {} defines {:?}", oid, self.path(), pattern.elems()
            );
            self.defined.push((pattern, (oid.clone(), schema.clone())));
        }
    }

    /// Decodes a component through a collected DEFINED BY rule.
    ///
    /// The decoder must be positioned at the component. `record` and
    /// `record_offset` describe the enclosing SEQUENCE or SET for error
    /// reporting.
    pub(crate) fn apply_defined(
        &mut self, value: &mut Obj, record: &Base, record_offset: usize,
    ) -> Result<()> {
        let Some((oid, schema)) = get_def_by_path(
            &self.defined, self.path()
        ).cloned() else {
            return Ok(())
        };
        log::debug!("decoding {} as defined by {}", self.path(), oid);
        let items = match value {
            Obj::SequenceOf(list) => list.items_mut(),
            Obj::SetOf(list) => list.items_mut(),
            value => {
                return self.decode_defined(
                    value, &oid, &schema, record, record_offset
                )
            }
        };
        for (i, item) in items.iter_mut().enumerate() {
            self.child(PathElem::Index(i), |dec| {
                dec.decode_defined(item, &oid, &schema, record, record_offset)
            })?;
        }
        Ok(())
    }

    fn decode_defined(
        &mut self, target: &mut Obj, oid: &Oid, schema: &Obj,
        record: &Base, record_offset: usize,
    ) -> Result<()> {
        let Some(raw) = target.defined_source() else { return Ok(()) };
        let base = target.base();
        let mut offset = base.offset() + base.tlen() + base.llen();
        if let Obj::BitString(_) = target {
            // Skip the unused bits octet.
            offset += 1;
        }
        self.child(PathElem::DefinedBy(oid.clone()), |dec| {
            let (value, tail) = dec.decode(schema, &raw, offset, false)?;
            if !tail.is_empty() {
                return Err(dec.malformed(record, record_offset, "remaining data"))
            }
            target.set_defined(oid.clone(), value);
            Ok(())
        })
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::ctx::Ctx;
    use crate::path::PathPattern;

    #[test]
    fn rules() {
        let oid: Oid = "1.2.3".parse().unwrap();
        let defines = Defines::new().rule(
            ["..", "value"], [(oid.clone(), Obj::from(crate::Null::new()))]
        );
        assert!(!defines.is_empty());
        assert!(defines.rules()[0].schema(&oid).is_some());
        assert!(defines.rules()[0].schema(&"1.2".parse().unwrap()).is_none());

        let ctx = Ctx::new().defines_by_path(
            PathPattern::new().then("algorithm"), defines
        );
        assert!(ctx.defines_at(&[PathElem::from("algorithm")]).is_some());
    }
}
