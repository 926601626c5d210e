//! Encoding values.
//!
//! All value types encode through the methods of the [`Asn1`] trait. There
//! are three ways to do so:
//!
//! * `encode` produces DER in memory,
//! * `encode1st` and `encode2nd` produce DER in two passes: the first pass
//!   walks the tree computing all lengths into a flat state vector, the
//!   second writes the encoding to a [`Target`] in order without buffering,
//! * `encode_cer` writes CER to a [`Target`] in a single pass, using
//!   indefinite lengths for all constructed values.
//!
//! The functions [`encode2pass`] and [`encode_cer`] wrap the latter two for
//! the common case of encoding into a vector.
//!
//! [`Asn1`]: crate::Asn1

pub use self::target::{IoTarget, Target};

pub(crate) use self::target::ChunkTarget;

mod target;

use crate::error::{Error, Result};
use crate::ident::Ident;
use crate::length::{Length, EOC, LENINDEF};
use crate::obj::Asn1;


//------------ Two-pass and CER helpers --------------------------------------

/// Encodes a value as DER using two passes.
///
/// The result is identical to that of `encode`.
pub fn encode2pass<A: Asn1>(obj: &mut A) -> Result<Vec<u8>> {
    let mut state = Vec::new();
    let len = obj.encode1st(&mut state)?;
    let mut res = Vec::with_capacity(len);
    obj.encode2nd(&mut res, &mut state.into_iter())?;
    Ok(res)
}

/// Encodes a value as CER.
pub fn encode_cer<A: Asn1>(obj: &mut A) -> Result<Vec<u8>> {
    let mut res = Vec::new();
    obj.encode_cer(&mut res)?;
    Ok(res)
}


//------------ Crate-internal helpers ----------------------------------------

/// Writes all of `data` to a target.
pub(crate) fn write<T: Target>(target: &mut T, data: &[u8]) -> Result<()> {
    target.write_all(data).map_err(Error::write)
}

/// Writes identifier and length octets.
pub(crate) fn write_header<T: Target>(
    target: &mut T, ident: Ident, len: Length
) -> Result<()> {
    ident.write_encoded(target).map_err(Error::write)?;
    len.write_encoded(target).map_err(Error::write)
}

/// Writes the header of a constructed value with indefinite length.
pub(crate) fn write_lenindef<T: Target>(
    target: &mut T, ident: Ident
) -> Result<()> {
    ident.write_encoded(target).map_err(Error::write)?;
    write(target, &[LENINDEF])
}

/// Writes the end-of-contents octets.
pub(crate) fn write_eoc<T: Target>(target: &mut T) -> Result<()> {
    write(target, &EOC)
}

/// Appends a complete DER value to a vector.
pub(crate) fn append_tlv(out: &mut Vec<u8>, ident: Ident, value: &[u8]) {
    out.extend_from_slice(ident.as_slice());
    Length::Definite(value.len()).append_encoded(out);
    out.extend_from_slice(value);
}

/// Returns the total length of a definite length value.
pub(crate) fn tlv_len(ident: Ident, vlen: usize) -> usize {
    ident.encoded_len() + Length::Definite(vlen).encoded_len() + vlen
}

/// Takes the next length from the two-pass state.
pub(crate) fn next_state<I: Iterator<Item = usize>>(
    state: &mut I
) -> Result<usize> {
    state.next().ok_or_else(|| {
        Error::invalid("two-pass encoding state exhausted")
    })
}
