//! Decode paths.
//!
//! Every value decoded inside a constructed value is reachable through a
//! path of field names, element indexes and DEFINED BY markers. The decoder
//! reports such paths with events and errors, and the DEFINED BY machinery
//! uses patterns over them to find the places where a decoded object
//! identifier selects a schema.

use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;
use crate::oid::Oid;


//------------ PathElem ------------------------------------------------------

/// One step of a decode path.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum PathElem {
    /// The named component of a SEQUENCE, SET or CHOICE.
    Name(Cow<'static, str>),

    /// The element of a SEQUENCE OF or SET OF or a chunk of a constructed
    /// string.
    Index(usize),

    /// The value of an open type as defined by the given object identifier.
    DefinedBy(Oid),
}

impl From<&'static str> for PathElem {
    fn from(name: &'static str) -> Self {
        PathElem::Name(Cow::Borrowed(name))
    }
}

impl From<String> for PathElem {
    fn from(name: String) -> Self {
        PathElem::Name(Cow::Owned(name))
    }
}

impl From<usize> for PathElem {
    fn from(idx: usize) -> Self {
        PathElem::Index(idx)
    }
}

impl fmt::Display for PathElem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PathElem::Name(name) => f.write_str(name),
            PathElem::Index(idx) => write!(f, "{}", idx),
            PathElem::DefinedBy(oid) => write!(f, "DEFINED BY {}", oid),
        }
    }
}


//------------ DecodePath ----------------------------------------------------

/// The path from the outermost value to a decoded value.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct DecodePath(Vec<PathElem>);

impl DecodePath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new path with `elem` appended.
    pub fn join(&self, elem: impl Into<PathElem>) -> Self {
        let mut res = self.clone();
        res.0.push(elem.into());
        res
    }

    pub(crate) fn push(&mut self, elem: PathElem) {
        self.0.push(elem)
    }

    pub(crate) fn pop(&mut self) -> Option<PathElem> {
        self.0.pop()
    }

    /// Returns the path of the enclosing value.
    pub fn parent(&self) -> &[PathElem] {
        match self.0.split_last() {
            Some((_, parent)) => parent,
            None => &[],
        }
    }
}

impl Deref for DecodePath {
    type Target = [PathElem];

    fn deref(&self) -> &[PathElem] {
        self.0.as_slice()
    }
}

impl FromIterator<PathElem> for DecodePath {
    fn from_iter<I: IntoIterator<Item = PathElem>>(iter: I) -> Self {
        DecodePath(iter.into_iter().collect())
    }
}

impl<'a> From<&'a [PathElem]> for DecodePath {
    fn from(path: &'a [PathElem]) -> Self {
        DecodePath(path.to_vec())
    }
}

impl fmt::Display for DecodePath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for elem in &self.0 {
            if first {
                first = false;
            }
            else {
                f.write_str(":")?;
            }
            elem.fmt(f)?;
        }
        Ok(())
    }
}


//------------ PatternElem ---------------------------------------------------

/// One step of a path pattern.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum PatternElem {
    /// Matches any path element.
    Any,

    /// Matches exactly this path element.
    Is(PathElem),
}

impl From<PathElem> for PatternElem {
    fn from(elem: PathElem) -> Self {
        PatternElem::Is(elem)
    }
}

impl From<&'static str> for PatternElem {
    fn from(name: &'static str) -> Self {
        PatternElem::Is(name.into())
    }
}

impl From<usize> for PatternElem {
    fn from(idx: usize) -> Self {
        PatternElem::Is(idx.into())
    }
}

impl PatternElem {
    fn matches(&self, elem: &PathElem) -> bool {
        match self {
            PatternElem::Any => true,
            PatternElem::Is(own) => own == elem,
        }
    }
}


//------------ PathPattern ---------------------------------------------------

/// A decode path with wildcards.
///
/// A pattern matches a path of the same length if every element either is
/// [`PatternElem::Any`] or equals the path element at its position.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct PathPattern(Vec<PatternElem>);

impl PathPattern {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an exact element.
    pub fn then(mut self, elem: impl Into<PathElem>) -> Self {
        self.0.push(PatternElem::Is(elem.into()));
        self
    }

    /// Appends a wildcard element.
    pub fn any(mut self) -> Self {
        self.0.push(PatternElem::Any);
        self
    }

    /// Returns whether the pattern matches `path`.
    pub fn matches(&self, path: &[PathElem]) -> bool {
        self.0.len() == path.len()
            && self.0.iter().zip(path).all(|(pat, elem)| pat.matches(elem))
    }

    pub fn elems(&self) -> &[PatternElem] {
        self.0.as_slice()
    }
}

impl FromIterator<PatternElem> for PathPattern {
    fn from_iter<I: IntoIterator<Item = PatternElem>>(iter: I) -> Self {
        PathPattern(iter.into_iter().collect())
    }
}

impl<'a> From<&'a [PathElem]> for PathPattern {
    fn from(path: &'a [PathElem]) -> Self {
        path.iter().cloned().map(PatternElem::Is).collect()
    }
}

/// Returns the value of the first rule whose pattern matches `path`.
pub fn get_def_by_path<'a, T>(
    rules: &'a [(PathPattern, T)], path: &[PathElem]
) -> Option<&'a T> {
    rules.iter().find(|(pattern, _)| pattern.matches(path)).map(|x| &x.1)
}


//------------ RelElem and RelPath -------------------------------------------

/// One step of a relative path.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum RelElem {
    /// Start at the outermost value. Only meaningful in first position.
    Root,

    /// Go up one level.
    Parent,

    /// Descend into the given element.
    Elem(PatternElem),
}

/// A path relative to the enclosing value of an object identifier.
///
/// Relative paths say where the value selected by a DEFINED BY object
/// identifier lives. They are resolved against the path of the SEQUENCE or
/// SET the identifier is a component of.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct RelPath(Vec<RelElem>);

impl RelPath {
    /// Parses a relative path from its textual components.
    ///
    /// A leading `"/"` makes the path absolute, `".."` goes up one level and
    /// `"*"` matches any element. Everything else is a component name.
    pub fn parse<'a>(
        elems: impl IntoIterator<Item = &'a str>
    ) -> Self {
        elems.into_iter().enumerate().map(|(i, elem)| {
            match elem {
                "/" if i == 0 => RelElem::Root,
                ".." => RelElem::Parent,
                "*" => RelElem::Elem(PatternElem::Any),
                name => {
                    RelElem::Elem(PatternElem::Is(
                        PathElem::Name(Cow::Owned(name.into()))
                    ))
                }
            }
        }).collect()
    }

    /// Resolves the relative path against `base`.
    pub fn resolve(&self, base: &[PathElem]) -> PathPattern {
        abs_decode_path(base, &self.0)
    }
}

impl FromIterator<RelElem> for RelPath {
    fn from_iter<I: IntoIterator<Item = RelElem>>(iter: I) -> Self {
        RelPath(iter.into_iter().collect())
    }
}

/// Resolves a relative path against a decode path.
///
/// A leading root element discards `base` entirely. Each leading parent
/// element drops the last element of `base`. The rest is appended.
pub fn abs_decode_path(base: &[PathElem], rel: &[RelElem]) -> PathPattern {
    match rel.split_first() {
        Some((RelElem::Root, rest)) => {
            rest.iter().filter_map(|elem| match elem {
                RelElem::Elem(elem) => Some(elem.clone()),
                _ => None,
            }).collect()
        }
        Some((RelElem::Parent, rest)) => {
            let parent = match base.split_last() {
                Some((_, parent)) => parent,
                None => &[],
            };
            abs_decode_path(parent, rest)
        }
        _ => {
            base.iter().cloned().map(PatternElem::Is).chain(
                rel.iter().filter_map(|elem| match elem {
                    RelElem::Elem(elem) => Some(elem.clone()),
                    _ => None,
                })
            ).collect()
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn path(elems: &[&'static str]) -> DecodePath {
        elems.iter().map(|x| PathElem::from(*x)).collect()
    }

    #[test]
    fn display() {
        let p = path(&["tbsCertificate", "extensions"]).join(3).join(
            PathElem::DefinedBy("2.5.29.19".parse::<Oid>().unwrap())
        );
        assert_eq!(
            p.to_string(),
            "tbsCertificate:extensions:3:DEFINED BY 2.5.29.19"
        );
        assert_eq!(DecodePath::new().to_string(), "");
    }

    #[test]
    fn resolve_relative() {
        let base = path(&["a", "b"]);
        assert_eq!(
            RelPath::parse(["c"]).resolve(&base),
            PathPattern::new().then("a").then("b").then("c")
        );
        assert_eq!(
            RelPath::parse(["..", "c"]).resolve(&base),
            PathPattern::new().then("a").then("c")
        );
        assert_eq!(
            RelPath::parse(["..", "..", "..", "c"]).resolve(&base),
            PathPattern::new().then("c")
        );
        assert_eq!(
            RelPath::parse(["/", "x", "*"]).resolve(&base),
            PathPattern::new().then("x").any()
        );
    }

    #[test]
    fn pattern_matching() {
        let pattern = PathPattern::new().then("certs").any().then("content");
        assert!(pattern.matches(&path(&["certs", "x", "content"])));
        assert!(pattern.matches(&path(&["certs"]).join(7).join("content")));
        assert!(!pattern.matches(&path(&["certs", "x"])));
        assert!(!pattern.matches(&path(&["certs", "x", "content", "y"])));

        let rules = vec![
            (PathPattern::new().then("a"), 1),
            (PathPattern::new().any(), 2),
        ];
        assert_eq!(get_def_by_path(&rules, &path(&["a"])), Some(&1));
        assert_eq!(get_def_by_path(&rules, &path(&["b"])), Some(&2));
        assert_eq!(get_def_by_path(&rules, &path(&[])), None);
    }
}
