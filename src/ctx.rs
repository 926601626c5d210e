//! Decoding options.
//!
//! This is a private module. Its public content is being re-exported by the
//! parent module.

use crate::decode::Defines;
use crate::path::{get_def_by_path, PathElem, PathPattern};


//------------ Ctx -----------------------------------------------------------

/// The options controlling a decode run.
///
/// The default value decodes strict DER: no indefinite lengths, no
/// constructed strings, no non-minimal encodings, DEFAULT values must be
/// omitted and SET components must appear in canonical order.
///
/// Options are set through chainable methods:
///
/// ```
/// use derasn::Ctx;
///
/// let ctx = Ctx::new().bered(true).allow_expl_oob(true);
/// assert!(ctx.is_bered());
/// ```
///
/// A context is never changed by decoding and can be shared freely between
/// concurrent decode runs.
#[derive(Clone, Debug, Default)]
pub struct Ctx {
    bered: bool,
    allow_expl_oob: bool,
    allow_unordered_set: bool,
    allow_default_values: bool,
    defines_by_path: Vec<(PathPattern, Defines)>,
    evgen_mode_upto: Vec<PathPattern>,
}

impl Ctx {
    /// Creates a context for strict DER decoding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context accepting BER.
    pub fn ber() -> Self {
        Self::new().bered(true)
    }

    /// Allows BER encodings.
    ///
    /// This enables indefinite lengths, constructed strings and the
    /// relaxed forms of BOOLEAN, OBJECT IDENTIFIER and time values. Values
    /// decoded from such encodings have their `ber_encoded` flag set.
    pub fn bered(mut self, yes: bool) -> Self {
        self.bered = yes;
        self
    }

    /// Allows the content of an EXPLICIT tag to not fill it exactly.
    pub fn allow_expl_oob(mut self, yes: bool) -> Self {
        self.allow_expl_oob = yes;
        self
    }

    /// Allows SET and SET OF components in non-canonical order.
    pub fn allow_unordered_set(mut self, yes: bool) -> Self {
        self.allow_unordered_set = yes;
        self
    }

    /// Allows components that are present with their DEFAULT value.
    pub fn allow_default_values(mut self, yes: bool) -> Self {
        self.allow_default_values = yes;
        self
    }

    /// Adds a rule supplying DEFINED BY schemas by decode path.
    ///
    /// The rule applies to object identifier components whose decode path
    /// matches `pattern` and that do not carry their own `defines`.
    pub fn defines_by_path(
        mut self, pattern: PathPattern, defines: Defines
    ) -> Self {
        self.defines_by_path.push((pattern, defines));
        self
    }

    /// Adds a path below which event generation is turned off.
    ///
    /// When decoding with events, a value whose decode path matches
    /// `pattern` is decoded fully in memory and reported as a single event.
    pub fn evgen_mode_upto(mut self, pattern: PathPattern) -> Self {
        self.evgen_mode_upto.push(pattern);
        self
    }

    pub fn is_bered(&self) -> bool {
        self.bered
    }

    pub fn is_allow_expl_oob(&self) -> bool {
        self.allow_expl_oob
    }

    pub fn is_allow_unordered_set(&self) -> bool {
        self.allow_unordered_set
    }

    pub fn is_allow_default_values(&self) -> bool {
        self.allow_default_values
    }

    /// Returns the DEFINED BY rules for the value at `path`.
    pub fn defines_at(&self, path: &[PathElem]) -> Option<&Defines> {
        get_def_by_path(&self.defines_by_path, path)
    }

    /// Returns whether event generation stops at `path`.
    pub fn evgen_stops_at(&self, path: &[PathElem]) -> bool {
        self.evgen_mode_upto.iter().any(|pattern| pattern.matches(path))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::DecodePath;

    #[test]
    fn defaults_are_strict() {
        let ctx = Ctx::default();
        assert!(!ctx.is_bered());
        assert!(!ctx.is_allow_expl_oob());
        assert!(!ctx.is_allow_unordered_set());
        assert!(!ctx.is_allow_default_values());
        assert!(Ctx::ber().is_bered());
    }

    #[test]
    fn evgen_mode_upto() {
        let ctx = Ctx::new().evgen_mode_upto(
            PathPattern::new().then("content").any()
        );
        let path = DecodePath::new().join("content").join(2);
        assert!(ctx.evgen_stops_at(&path));
        assert!(!ctx.evgen_stops_at(path.parent()));
    }
}
