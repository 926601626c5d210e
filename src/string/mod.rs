//! String types.
//!
//! This module provides the types for the various string encodings of
//! ASN.1.
//!
//! There are two types of strings for binary data. [`OctetString`]s contain
//! an unrestricted sequence of octets while [`BitString`]s contain a
//! sequence of bits that does not need to be of a length divisible by eight.
//!
//! In addition, there are the character string types that each contain a
//! sequence of characters of some character set encoded in a fixed way.
//! They all are represented by [`CommonString`], with the concrete type
//! selected through a [`StringKind`].
//!
//! In BER, all these strings may be broken up into chunks that are encoded
//! as a constructed value. DER never does this, CER does for long strings.

//--- Re-exports

pub use self::bit::BitString;
pub use self::octet::OctetString;
pub use self::restricted::{CommonString, StringKind};

pub(crate) use self::octet::{decode_parts, write_cer_octets};

//--- Private modules

mod bit;
mod octet;
mod restricted;

use crate::error::BoundsError;


//------------ LenBounds -----------------------------------------------------

/// Inclusive bounds for the size of a value.
///
/// An open upper bound is represented by `None`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct LenBounds {
    pub min: usize,
    pub max: Option<usize>,
}

impl LenBounds {
    pub fn new(min: usize, max: Option<usize>) -> Self {
        LenBounds { min, max }
    }

    pub fn check(self, len: usize) -> Result<(), BoundsError> {
        BoundsError::check_len(self.min, len, self.max)
    }
}
