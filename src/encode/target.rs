//! Where encoded data goes.

use std::{error, io};
use std::convert::Infallible;
use crate::ident::Ident;
use crate::length::Length;


//------------ Target --------------------------------------------------------

/// A sink for encoded data.
///
/// This is a reduced `io::Write` with a target-specific error type, so
/// that encoding into memory can use `Infallible`. The two-pass and CER
/// encoders write through it without buffering.
///
/// `write_all` writes everything or fails, and a failed target is not
/// written to again.
pub trait Target {
    type Error: error::Error + Send + Sync + 'static;

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

impl<T: Target> Target for &mut T {
    type Error = T::Error;

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write_all(data)
    }
}

impl Target for Vec<u8> {
    type Error = Infallible;

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.extend_from_slice(data);
        Ok(())
    }
}


//------------ IoTarget ------------------------------------------------------

/// Encodes into an `io::Write`.
///
/// ```
/// use derasn::{Asn1, Integer};
/// use derasn::encode::IoTarget;
///
/// let mut target = IoTarget::new(Vec::new());
/// let mut value = Integer::from(5);
/// let mut state = Vec::new();
/// value.encode1st(&mut state)?;
/// value.encode2nd(&mut target, &mut state.into_iter())?;
/// assert_eq!(target.into_inner(), b"\x02\x01\x05");
/// # Ok::<_, derasn::Error>(())
/// ```
pub struct IoTarget<W>(W);

impl<W> IoTarget<W> {
    pub fn new(writer: W) -> Self {
        IoTarget(writer)
    }

    pub fn into_inner(self) -> W {
        self.0
    }
}

impl<W: io::Write> Target for IoTarget<W> {
    type Error = io::Error;

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.0.write_all(data)
    }
}


//------------ ChunkTarget ---------------------------------------------------

/// Writes data as a series of primitive chunks.
///
/// Every `chunk` octets of data written become the content of a primitive
/// value with identifier `ident`. The last chunk takes whatever is left of
/// `len`, the total that will be written. The caller writes the header
/// and end-of-contents octets of the enclosing constructed value.
///
/// Writing more than `len` octets is a bug in the caller. It is caught by
/// a debug assertion and the excess is dropped.
pub(crate) struct ChunkTarget<'a, T> {
    len: usize,
    chunk: usize,
    ident: Ident,
    target: &'a mut T,

    /// The number of content octets written so far.
    pos: usize,
}

impl<'a, T> ChunkTarget<'a, T> {
    pub fn new(
        len: usize, chunk: usize, ident: Ident, target: &'a mut T
    ) -> Self {
        debug_assert!(chunk > 0);
        ChunkTarget { len, chunk, ident, target, pos: 0 }
    }
}

impl<T: Target> Target for ChunkTarget<'_, T> {
    type Error = T::Error;

    fn write_all(&mut self, mut data: &[u8]) -> Result<(), T::Error> {
        debug_assert!(self.pos + data.len() <= self.len);
        data = &data[..data.len().min(self.len - self.pos)];
        while let Some(room) = self.room(data.len()) {
            if self.pos % self.chunk == 0 {
                self.target.write_all(self.ident.as_slice())?;
                let left = (self.len - self.pos).min(self.chunk);
                Length::Definite(left).write_encoded(self.target)?;
            }
            let (head, tail) = data.split_at(room);
            self.target.write_all(head)?;
            self.pos += head.len();
            data = tail;
        }
        Ok(())
    }
}

impl<T> ChunkTarget<'_, T> {
    /// Returns how much of `avail` octets go into the current chunk.
    fn room(&self, avail: usize) -> Option<usize> {
        if avail == 0 {
            None
        }
        else {
            Some((self.chunk - self.pos % self.chunk).min(avail))
        }
    }
}


//============ Tests =========================================================
