//! Length octets.

use crate::encode::Target;
use crate::error::{DecodeError, DecodeErrorKind};


//------------ Constants -----------------------------------------------------

/// The length octet announcing an indefinite length.
pub const LENINDEF: u8 = 0x80;

/// The end-of-contents octets terminating an indefinite length value.
pub const EOC: [u8; 2] = [0x00, 0x00];

/// The number of end-of-contents octets.
pub const EOC_LEN: usize = EOC.len();

/// Returns whether `data` starts with the end-of-contents octets.
pub(crate) fn starts_with_eoc(data: &[u8]) -> bool {
    data.starts_with(&EOC)
}


//------------ Length --------------------------------------------------------

/// The length octets of an encoded value.
///
/// Short form lengths below 128 are a single octet. Longer lengths use a
/// first octet of `0x80` plus the number of big-endian octets that follow.
/// A lone `0x80` is the indefinite form whose content runs up to the
/// end-of-contents octets.
///
/// Only minimal definite forms are accepted when decoding, BER input
/// included.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Length {
    Definite(usize),
    Indefinite,
}

/// The most octets a long form definite length can use.
const MAX_LONG: usize = std::mem::size_of::<usize>();

impl Length {
    /// Decodes a definite length at the start of `data`.
    ///
    /// Returns the length and the size of the length octets. The
    /// indefinite form fails with [`DecodeErrorKind::LenIndefForm`].
    pub fn decode(data: &[u8]) -> Result<(usize, usize), DecodeError> {
        match Self::decode_any(data)? {
            (Length::Definite(len), llen) => Ok((len, llen)),
            (Length::Indefinite, _) => {
                Err(DecodeError::new(DecodeErrorKind::LenIndefForm, ""))
            }
        }
    }

    /// Decodes either form of length octets.
    pub fn decode_any(data: &[u8]) -> Result<(Self, usize), DecodeError> {
        let (first, rest) = match data.split_first() {
            Some((first, rest)) => (*first, rest),
            None => {
                return Err(DecodeError::new(
                    DecodeErrorKind::NotEnoughData, "no data at all"
                ))
            }
        };
        if first < LENINDEF {
            return Ok((Length::Definite(usize::from(first)), 1))
        }
        let count = usize::from(first & !LENINDEF);
        let Some(octets) = rest.get(..count) else {
            return Err(DecodeError::new(
                DecodeErrorKind::NotEnoughData,
                "encoded length is longer than data"
            ))
        };
        match octets.first() {
            None => return Ok((Length::Indefinite, 1)),
            Some(0) => return Err(DecodeError::malformed("leading zeros")),
            Some(_) => { }
        }
        if count > MAX_LONG {
            return Err(DecodeError::malformed("too big length"))
        }
        let mut len = 0usize;
        for &octet in octets {
            len = len << 8 | usize::from(octet);
        }
        if len < usize::from(LENINDEF) {
            return Err(DecodeError::malformed(
                "long form instead of short one"
            ))
        }
        Ok((Length::Definite(len), count + 1))
    }

    pub fn encoded_len(self) -> usize {
        self.encoded().1
    }

    pub fn append_encoded(self, target: &mut Vec<u8>) {
        let (buf, len) = self.encoded();
        target.extend_from_slice(&buf[..len]);
    }

    pub fn write_encoded<T: Target>(
        self, target: &mut T
    ) -> Result<(), T::Error> {
        let (buf, len) = self.encoded();
        target.write_all(&buf[..len])
    }

    /// Returns the length octets in a buffer and how much of it is used.
    fn encoded(self) -> ([u8; MAX_LONG + 1], usize) {
        let mut buf = [0; MAX_LONG + 1];
        let len = match self {
            Length::Indefinite => {
                buf[0] = LENINDEF;
                1
            }
            Length::Definite(len) if len < usize::from(LENINDEF) => {
                buf[0] = len as u8;
                1
            }
            Length::Definite(len) => {
                let bytes = len.to_be_bytes();
                let skip = bytes.iter().take_while(|&&x| x == 0).count();
                let count = MAX_LONG - skip;
                buf[0] = LENINDEF | count as u8;
                buf[1..=count].copy_from_slice(&bytes[skip..]);
                count + 1
            }
        };
        (buf, len)
    }
}


//------------ Functions -----------------------------------------------------

/// Returns the number of length octets for a definite length.
pub fn len_size(len: usize) -> usize {
    Length::Definite(len).encoded_len()
}


//============ Tests =========================================================
