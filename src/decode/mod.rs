//! Decoding data.
//!
//! Values are decoded by handing the data to the `decode` family of
//! methods of the [`Asn1`][crate::Asn1] trait on a schema value. These
//! drive a decoder that walks the schema and the data side by side. The
//! decoder keeps the current decode path, the options of the decode run and
//! the DEFINED BY rules collected so far and, in event mode, hands every
//! completed value to the caller’s visitor.
//!
//! The value types use the decoder through a small set of helpers that
//! strip identifier and length octets and turn low-level errors into
//! located errors.

pub use self::agg::{agg_octet_string, OctetStringAggregator};
pub use self::defines::{Defines, DefinesRule};

mod agg;
mod decoder;
mod defines;

pub(crate) use self::decoder::{Decoder, Header};
