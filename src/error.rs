//! Error handling.
//!
//! This is a private module. Its public content is being re-exported by the
//! parent module.

use std::borrow::Cow;
use std::{error, fmt};
use thiserror::Error;
use crate::path::DecodePath;


//------------ Error ---------------------------------------------------------

/// The error type of all fallible operations of this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The data being decoded is malformed or does not match the schema.
    #[error("{0}")]
    Decode(#[from] DecodeError),

    /// A decoded value was followed by the given number of extra octets.
    #[error("{0} trailing bytes")]
    ExceedingData(usize),

    /// A name that is not part of a schema was used.
    #[error("object is unknown: {0}")]
    ObjUnknown(String),

    /// A value was encoded before it had everything it needs.
    #[error("object is not ready: {0}")]
    ObjNotReady(String),

    /// A value of the wrong type was given.
    #[error("invalid value type, expected: {}", .0.join(", "))]
    InvalidValueType(Vec<&'static str>),

    /// A value lies outside the bounds of its schema.
    #[error("{0}")]
    Bounds(#[from] BoundsError),

    /// A value or schema can not be constructed that way.
    #[error("{0}")]
    InvalidValue(Cow<'static, str>),

    /// Writing to an encoding target failed.
    #[error("write error: {0}")]
    Write(Box<dyn error::Error + Send + Sync>),

    /// An event visitor asked to stop decoding.
    #[error("decoding interrupted")]
    Interrupted,
}

impl Error {
    /// Creates an error for a misuse of a value or schema.
    pub(crate) fn invalid(msg: impl Into<Cow<'static, str>>) -> Self {
        Error::InvalidValue(msg.into())
    }

    /// Converts an error of an encoding target.
    pub(crate) fn write<E>(err: E) -> Self
    where E: error::Error + Send + Sync + 'static {
        Error::Write(Box::new(err))
    }

    /// Returns the decode error if this is one.
    pub fn as_decode(&self) -> Option<&DecodeError> {
        match self {
            Error::Decode(err) => Some(err),
            _ => None,
        }
    }

    /// Returns whether this is a decode error of the given kind.
    pub fn is_decode_kind(&self, kind: DecodeErrorKind) -> bool {
        self.as_decode().map(|err| err.kind() == kind).unwrap_or(false)
    }
}

/// The result type of this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;


//------------ DecodeErrorKind -----------------------------------------------

/// The family a decode error belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DecodeErrorKind {
    /// Generic malformed data.
    Decode,

    /// The data ended before the value was complete.
    NotEnoughData,

    /// An indefinite length was found where it isn’t allowed.
    LenIndefForm,

    /// The tag of the data differs from the expected one.
    TagMismatch,

    /// The length of a fixed size value is wrong.
    InvalidLength,

    /// An object identifier is malformed.
    InvalidOid,
}

impl DecodeErrorKind {
    /// Returns the name of the kind as used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            DecodeErrorKind::Decode => "DecodeError",
            DecodeErrorKind::NotEnoughData => "NotEnoughData",
            DecodeErrorKind::LenIndefForm => "LenIndefForm",
            DecodeErrorKind::TagMismatch => "TagMismatch",
            DecodeErrorKind::InvalidLength => "InvalidLength",
            DecodeErrorKind::InvalidOid => "InvalidOID",
        }
    }
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}


//------------ DecodeError ---------------------------------------------------

/// An error happened while decoding data.
///
/// Besides a message, the error knows where it happened: the decode path
/// leading to the failing value, the offset of that value in the input and
/// the name of the type that failed.
///
/// Errors are usually created without location by the low-level routines
/// and then located by the value decoder that called them. Errors raised by
/// nested values already carry their own, more precise location and are
/// passed on unchanged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodeError {
    kind: DecodeErrorKind,
    msg: Cow<'static, str>,
    klass: Option<&'static str>,
    path: DecodePath,
    offset: usize,
}

impl DecodeError {
    /// Creates a new error of the given kind without location.
    pub fn new(
        kind: DecodeErrorKind, msg: impl Into<Cow<'static, str>>
    ) -> Self {
        DecodeError {
            kind,
            msg: msg.into(),
            klass: None,
            path: DecodePath::default(),
            offset: 0,
        }
    }

    /// Creates a generic error about malformed data.
    pub fn malformed(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::new(DecodeErrorKind::Decode, msg)
    }

    /// Returns the same error located at the given place.
    pub(crate) fn located(
        mut self, klass: &'static str, path: &DecodePath, offset: usize
    ) -> Self {
        self.klass = Some(klass);
        self.path = path.clone();
        self.offset = offset;
        self
    }

    pub fn kind(&self) -> DecodeErrorKind {
        self.kind
    }

    pub fn msg(&self) -> &str {
        self.msg.as_ref()
    }

    /// Returns the name of the type that failed to decode.
    pub fn klass(&self) -> Option<&'static str> {
        self.klass
    }

    /// Returns the decode path of the value that failed.
    pub fn path(&self) -> &DecodePath {
        &self.path
    }

    /// Returns the offset of the failed value within the input.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.kind.name())?;
        if !self.path.is_empty() {
            write!(f, " ({})", self.path)?;
        }
        if self.offset > 0 {
            write!(f, " (at {})", self.offset)?;
        }
        if !self.msg.is_empty() {
            write!(f, " {}", self.msg)?;
        }
        Ok(())
    }
}

impl error::Error for DecodeError { }


//------------ BoundsError ---------------------------------------------------

/// A value lies outside of the bounds of its schema.
///
/// Values are kept in their display form so that integers of arbitrary
/// size and lengths can share the type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BoundsError {
    min: Option<String>,
    value: String,
    max: Option<String>,
}

impl BoundsError {
    /// Creates a new bounds error. Missing bounds are treated as infinite.
    pub fn new<T: fmt::Display>(
        min: Option<&T>, value: &T, max: Option<&T>
    ) -> Self {
        BoundsError {
            min: min.map(ToString::to_string),
            value: value.to_string(),
            max: max.map(ToString::to_string),
        }
    }

    /// Checks a length against inclusive bounds.
    pub(crate) fn check_len(
        min: usize, value: usize, max: Option<usize>
    ) -> Result<(), Self> {
        if value < min || max.map(|max| value > max).unwrap_or(false) {
            Err(Self::new(Some(&min), &value, max.as_ref()))
        }
        else {
            Ok(())
        }
    }
}

impl fmt::Display for BoundsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f, "unsatisfied bounds: {} <= {} <= {}",
            self.min.as_deref().unwrap_or("-inf"),
            self.value,
            self.max.as_deref().unwrap_or("inf"),
        )
    }
}

impl error::Error for BoundsError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::PathElem;

    #[test]
    fn decode_error_display() {
        let path: DecodePath = [
            PathElem::from("tbsCertificate"), PathElem::from("version")
        ].into_iter().collect();
        let err = DecodeError::new(DecodeErrorKind::TagMismatch, "")
            .located("Integer", &path, 10);
        assert_eq!(err.to_string(), "TagMismatch (tbsCertificate:version) (at 10)");
        assert_eq!(err.klass(), Some("Integer"));

        let err = DecodeError::malformed("zero length");
        assert_eq!(err.to_string(), "DecodeError zero length");
    }

    #[test]
    fn bounds_error_display() {
        assert_eq!(
            BoundsError::check_len(1, 0, None).unwrap_err().to_string(),
            "unsatisfied bounds: 1 <= 0 <= inf"
        );
        assert!(BoundsError::check_len(0, 5, Some(5)).is_ok());
        assert_eq!(
            BoundsError::new(None, &7, Some(&5)).to_string(),
            "unsatisfied bounds: -inf <= 7 <= 5"
        );
    }

    #[test]
    fn error_display() {
        assert_eq!(Error::ExceedingData(3).to_string(), "3 trailing bytes");
        assert_eq!(
            Error::ObjNotReady("version".into()).to_string(),
            "object is not ready: version"
        );
        assert_eq!(
            Error::InvalidValueType(vec!["Integer", "int"]).to_string(),
            "invalid value type, expected: Integer, int"
        );
    }
}
