//! BIT STRING.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::sync::Arc;
use bytes::Bytes;
use crate::decode::Decoder;
use crate::encode::{
    append_tlv, tlv_len, write, write_eoc, write_header, write_lenindef,
    Target,
};
use crate::error::{DecodeError, DecodeErrorKind, Error, Result};
use crate::ident::Tag;
use crate::length::{starts_with_eoc, Length, EOC_LEN};
use crate::obj::{Asn1, Base, Codec, Decoded, Obj};
use crate::oid::Oid;
use crate::path::PathElem;


/// The maximum number of octets of a CER primitive chunk without pad octet.
const CER_CHUNK: usize = 999;


//------------ BitString -----------------------------------------------------

/// A bit string value.
///
/// Bit strings are a sequence of bits. Unlike
/// [`OctetString`][crate::OctetString]s, they do not need to contain a
/// multiple of eight bits. The value is kept as the number of bits and the
/// octets holding them with the first bit in the most significant bit of
/// the first octet. Unused bits in the last octet are always zero.
///
/// A schema can give names to individual bits. Values can then be set from
/// a list of names and the names of the bits that are set can be queried.
/// When names are used, trailing zero bits are dropped from the value as
/// DER demands for named bit lists.
///
/// Values can also be set from the `'0101'B` and `'AB'H` literal forms.
///
/// # BER Encoding
///
/// If encoded as a primitive value, the first octet of the content contains
/// the number of unused bits in the last octet and the following octets
/// contain the bits.
///
/// In the constructed encoding, only accepted when decoding BER, the bit
/// string is represented as a sequence of bit strings which in turn may
/// either be constructed or primitive encodings. Only the last chunk may
/// have a number of bits that is not a multiple of eight.
///
/// With CER, the primitive encoding is chosen if its content would be no
/// more than 1000 octets long. Otherwise, the constructed encoding is used
/// with primitive chunks of 1000 content octets each except for the last
/// one. With DER, only the primitive form is allowed.
#[derive(Clone, Debug)]
pub struct BitString {
    base: Base,
    value: Option<(usize, Bytes)>,
    default: Option<(usize, Bytes)>,
    names: Arc<Vec<(&'static str, usize)>>,
    defined: Option<Box<(Oid, Obj)>>,
}

impl BitString {
    pub fn new() -> Self {
        BitString {
            base: Base::new("BitString", Tag::BIT_STRING.primitive()),
            value: None,
            default: None,
            names: Arc::default(),
            defined: None,
        }
    }

    /// Gives names to bits.
    pub fn named(
        mut self, names: impl IntoIterator<Item = (&'static str, usize)>
    ) -> Self {
        self.names = Arc::new(names.into_iter().collect());
        self
    }

    //--- Setting the value

    /// Sets the value to all bits of the given octets.
    pub fn set_bytes(&mut self, octets: impl Into<Bytes>) {
        let octets = octets.into();
        self.value = Some((octets.len() * 8, octets));
    }

    /// Sets the value to the first `bit_len` bits of `octets`.
    ///
    /// The octets must hold exactly the number of bits and the unused bits
    /// of the last octet must be zero.
    pub fn set_bits(
        &mut self, bit_len: usize, octets: impl Into<Bytes>
    ) -> Result<()> {
        let octets = octets.into();
        check_bits(bit_len, &octets)?;
        self.value = Some((bit_len, octets));
        Ok(())
    }

    /// Sets the value from a `'0101'B` or `'AB'H` literal.
    pub fn set_literal(&mut self, literal: &str) -> Result<()> {
        if let Some(bits) = literal.strip_prefix('\'').and_then(|s| {
            s.strip_suffix("'B")
        }) {
            if !bits.bytes().all(|ch| ch == b'0' || ch == b'1') {
                return Err(Error::invalid(
                    "B's coding contains unacceptable chars"
                ))
            }
            self.value = Some(self.bits_to_octets(bits.bytes().map(|ch| {
                ch == b'1'
            })));
            return Ok(())
        }
        if let Some(digits) = literal.strip_prefix('\'').and_then(|s| {
            s.strip_suffix("'H")
        }) {
            let mut octets = Vec::with_capacity(digits.len() / 2 + 1);
            for pair in digits.as_bytes().chunks(2) {
                let high = hex_digit(pair[0])?;
                let low = match pair.get(1) {
                    Some(ch) => hex_digit(*ch)?,
                    None => 0,
                };
                octets.push(high << 4 | low);
            }
            self.value = Some((digits.len() * 4, octets.into()));
            return Ok(())
        }
        Err(Error::invalid(format!("unsupported BitString literal: {}", literal)))
    }

    /// Sets the bits with the given names and clears all others.
    pub fn set_named<'s>(
        &mut self, names: impl IntoIterator<Item = &'s str>
    ) -> Result<()> {
        let mut bits = Vec::new();
        for name in names {
            bits.push(self.bit_index(name)?);
        }
        let len = bits.iter().max().map(|max| max + 1).unwrap_or(0);
        self.value = Some(self.bits_to_octets(
            (0..len).map(|idx| bits.contains(&idx))
        ));
        Ok(())
    }

    pub fn with_bytes(mut self, octets: impl Into<Bytes>) -> Self {
        self.set_bytes(octets);
        self
    }

    pub fn with_bits(
        mut self, bit_len: usize, octets: impl Into<Bytes>
    ) -> Result<Self> {
        self.set_bits(bit_len, octets)?;
        Ok(self)
    }

    pub fn with_literal(mut self, literal: &str) -> Result<Self> {
        self.set_literal(literal)?;
        Ok(self)
    }

    pub fn with_named<'s>(
        mut self, names: impl IntoIterator<Item = &'s str>
    ) -> Result<Self> {
        self.set_named(names)?;
        Ok(self)
    }

    /// Adds a DEFAULT value taken from another bit string.
    pub fn default(mut self, value: BitString) -> Result<Self> {
        let value = value.value.ok_or_else(|| {
            Error::ObjNotReady(value.base.class_name.into())
        })?;
        self.base.optional = true;
        if self.value.is_none() {
            self.value = Some(value.clone());
        }
        self.default = Some(value);
        Ok(self)
    }

    //--- Accessing the value

    /// Returns the number of bits.
    pub fn bit_len(&self) -> usize {
        self.value.as_ref().map(|(len, _)| *len).unwrap_or(0)
    }

    /// Returns the octets holding the bits.
    pub fn octets(&self) -> Option<&Bytes> {
        self.value.as_ref().map(|(_, octets)| octets)
    }

    /// Returns the value of the given bit.
    ///
    /// Bits beyond the end of the value are zero.
    pub fn bit(&self, idx: usize) -> bool {
        match self.value.as_ref() {
            Some((len, octets)) if idx < *len => {
                octets[idx >> 3] & (0x80 >> (idx & 7)) != 0
            }
            _ => false
        }
    }

    /// Returns the value of the bit with the given name.
    pub fn bit_by_name(&self, name: &str) -> Result<bool> {
        Ok(self.bit(self.bit_index(name)?))
    }

    /// Returns the names of all bits that are set.
    pub fn named_bits(&self) -> Vec<&'static str> {
        self.names.iter().filter_map(|(name, idx)| {
            self.bit(*idx).then_some(*name)
        }).collect()
    }

    /// Returns the names of the bits known by the schema.
    pub fn names(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.names.iter().copied()
    }

    pub fn is_default(&self) -> bool {
        self.default.is_some() && self.value == self.default
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Returns the value decoded from the content through DEFINED BY.
    pub fn defined(&self) -> Option<(&Oid, &Obj)> {
        self.defined.as_deref().map(|(oid, obj)| (oid, obj))
    }

    pub(crate) fn set_defined(&mut self, oid: Oid, value: Obj) {
        self.defined = Some(Box::new((oid, value)))
    }

    pub(crate) fn adopt(&self, value: Self) -> Result<Self> {
        Ok(BitString {
            base: self.base.decoded_at(0, 0, 0),
            value: value.value.or_else(|| self.default.clone()),
            default: self.default.clone(),
            names: self.names.clone(),
            defined: None,
        })
    }

    //--- Helpers

    fn bit_index(&self, name: &str) -> Result<usize> {
        self.names.iter().find(|(item, _)| *item == name).map(|(_, idx)| {
            *idx
        }).ok_or_else(|| {
            Error::ObjUnknown(format!("BitString value: {}", name))
        })
    }

    /// Packs a sequence of bits.
    ///
    /// If the schema has named bits, trailing zero bits are dropped.
    fn bits_to_octets(
        &self, bits: impl Iterator<Item = bool>
    ) -> (usize, Bytes) {
        let mut bits: Vec<bool> = bits.collect();
        if !self.names.is_empty() {
            while bits.last() == Some(&false) {
                bits.pop();
            }
        }
        let mut octets = vec![0u8; (bits.len() + 7) / 8];
        for (idx, bit) in bits.iter().enumerate() {
            if *bit {
                octets[idx >> 3] |= 0x80 >> (idx & 7);
            }
        }
        (bits.len(), octets.into())
    }

    fn value(&self) -> Result<(usize, &Bytes)> {
        match self.value.as_ref() {
            Some((len, octets)) => Ok((*len, octets)),
            None => Err(Error::ObjNotReady(self.base.class_name.into()))
        }
    }

    fn content(&self) -> Result<Vec<u8>> {
        let (len, octets) = self.value()?;
        let mut res = Vec::with_capacity(octets.len() + 1);
        res.push(pad_len(len));
        res.extend_from_slice(octets);
        Ok(res)
    }

    fn with_decoded(&self, base: Base, value: (usize, Bytes)) -> Self {
        BitString {
            base,
            value: Some(value),
            default: self.default.clone(),
            names: self.names.clone(),
            defined: None,
        }
    }

    /// Decodes the constructed form.
    fn decode_chunks<'a>(
        &self, dec: &mut Decoder, data: &'a [u8], tlen: usize, offset: usize,
        evgen: bool,
    ) -> Result<Decoded<'a, Self>> {
        let base = &self.base;
        let hdr = dec.constructed_content(
            base, &data[tlen..], tlen, offset, true
        )?;
        if !hdr.lenindef && hdr.value.is_empty() {
            return Err(dec.err(
                base, offset, DecodeErrorKind::NotEnoughData, "zero length"
            ))
        }
        let limit = hdr.value.len();
        let chunk_spec = Obj::from(BitString::new());
        let mut rest = &data[tlen + hdr.llen..];
        let mut sub_offset = offset + tlen + hdr.llen;
        let mut vlen = 0;
        let mut chunks = Vec::new();
        loop {
            if hdr.lenindef {
                if starts_with_eoc(rest) {
                    break
                }
            }
            else {
                if vlen == limit {
                    break
                }
                if vlen > limit {
                    let last_offset = chunks.last().map(|(_, off)| *off)
                        .unwrap_or(offset);
                    return dec.child(
                        PathElem::Index(chunks.len().saturating_sub(1)), |dec| {
                            Err(dec.malformed(
                                base, last_offset, "chunk out of bounds"
                            ))
                        }
                    )
                }
            }
            let (chunk, tail) = dec.child(PathElem::Index(chunks.len()), |dec| {
                dec.decode(&chunk_spec, rest, sub_offset, evgen).map_err(|err| {
                    if err.is_decode_kind(DecodeErrorKind::TagMismatch) {
                        dec.malformed(
                            base, sub_offset, "expected BitString encoded chunk"
                        )
                    }
                    else {
                        err
                    }
                })
            })?;
            let chunk = BitString::try_from(chunk)?;
            let chunk_len = chunk.base.tlvlen();
            chunks.push((chunk, sub_offset));
            sub_offset += chunk_len;
            vlen += chunk_len;
            rest = tail;
        }
        if chunks.is_empty() {
            return Err(dec.malformed(base, offset, "no chunks"))
        }
        let mut bit_len = 0;
        let mut octets = Vec::new();
        let last = chunks.len() - 1;
        for (idx, (chunk, chunk_offset)) in chunks.iter().enumerate() {
            let (len, value) = chunk.value()?;
            if idx != last && len % 8 != 0 {
                return dec.child(PathElem::Index(idx), |dec| {
                    Err(dec.malformed(
                        base, *chunk_offset,
                        "BitString chunk is not multiple of 8 bits"
                    ))
                })
            }
            bit_len += len;
            octets.extend_from_slice(value);
        }
        let (vlen, tail) = if hdr.lenindef {
            (vlen + EOC_LEN, &rest[EOC_LEN..])
        }
        else {
            (vlen, rest)
        };
        let mut res_base = base.decoded_at(offset, hdr.llen, vlen);
        res_base.lenindef = hdr.lenindef;
        res_base.ber_encoded = true;
        Ok(Decoded::Value(
            self.with_decoded(res_base, (bit_len, octets.into())), tail
        ))
    }
}

impl Default for BitString {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for BitString {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.base.same_tags(&other.base)
    }
}

impl From<Bytes> for BitString {
    fn from(octets: Bytes) -> Self {
        Self::new().with_bytes(octets)
    }
}


//--- Codec and Asn1

impl Codec for BitString {
    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    fn write_der(&mut self, out: &mut Vec<u8>) -> Result<()> {
        append_tlv(out, self.base.tag, &self.content()?);
        Ok(())
    }

    fn encode_first(&mut self, _state: &mut Vec<usize>) -> Result<usize> {
        let (_, octets) = self.value()?;
        Ok(tlv_len(self.base.tag, octets.len() + 1))
    }

    fn encode_second<T: Target, I: Iterator<Item = usize>>(
        &mut self, target: &mut T, _state: &mut I
    ) -> Result<()> {
        let (len, octets) = self.value()?;
        write_header(target, self.base.tag, Length::Definite(octets.len() + 1))?;
        write(target, &[pad_len(len)])?;
        write(target, octets)
    }

    fn write_cer<T: Target>(&mut self, target: &mut T) -> Result<()> {
        if self.value()?.1.len() <= CER_CHUNK {
            return self.encode_second(target, &mut std::iter::empty())
        }
        let (len, octets) = self.value()?;
        log::debug!("writing {} bits as CER chunks", len);
        write_lenindef(target, self.base.tag.with_constructed(true))?;
        let mut chunks = octets.chunks(CER_CHUNK).peekable();
        while let Some(chunk) = chunks.next() {
            let pad = if chunks.peek().is_none() { pad_len(len) } else { 0 };
            write_header(
                target, Tag::BIT_STRING.primitive(),
                Length::Definite(chunk.len() + 1)
            )?;
            write(target, &[pad])?;
            write(target, chunk)?;
        }
        write_eoc(target)
    }

    fn decode_value<'a>(
        &self, dec: &mut Decoder, data: &'a [u8], offset: usize,
        tag_only: bool, evgen: bool,
    ) -> Result<Decoded<'a, Self>> {
        let base = &self.base;
        let (tag, tlen) = dec.any_tag(base, data, offset)?;
        if tag == base.tag {
            if tag_only {
                return Ok(Decoded::TagMatched)
            }
            let (llen, value, tail) = dec.definite(
                base, &data[tlen..], offset
            )?;
            let bits = parse_content(value).map_err(|err| {
                dec.at(base, offset, err)
            })?;
            return Ok(Decoded::Value(
                self.with_decoded(
                    base.decoded_at(offset, llen, value.len()), bits
                ),
                tail
            ))
        }
        if tag != base.tag.with_constructed(true) {
            return Err(dec.mismatch(base, offset))
        }
        if !dec.bered() {
            return Err(dec.malformed(
                base, offset, "unallowed BER constructed encoding"
            ))
        }
        if tag_only {
            return Ok(Decoded::TagMatched)
        }
        self.decode_chunks(dec, data, tlen, offset, evgen)
    }

    fn from_obj(obj: Obj) -> Result<Self> {
        Self::try_from(obj)
    }
}

impl Asn1 for BitString {
    fn base(&self) -> &Base {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "BIT STRING"
    }

    fn ready(&self) -> bool {
        self.value.is_some()
    }
}


//------------ Helper Functions ----------------------------------------------

/// Returns the number of unused bits in the last octet.
fn pad_len(bit_len: usize) -> u8 {
    ((8 - bit_len % 8) % 8) as u8
}

fn check_bits(bit_len: usize, octets: &[u8]) -> Result<()> {
    if octets.len() != (bit_len + 7) / 8 {
        return Err(Error::invalid("BitString length does not match octets"))
    }
    let pad = pad_len(bit_len);
    if let Some(last) = octets.last() {
        if last & ((1u8 << pad) - 1) != 0 {
            return Err(Error::invalid("BitString unused bits are not zero"))
        }
    }
    Ok(())
}

fn hex_digit(ch: u8) -> Result<u8> {
    match ch {
        b'0'..=b'9' => Ok(ch - b'0'),
        b'A'..=b'F' => Ok(ch - b'A' + 10),
        b'a'..=b'f' => Ok(ch - b'a' + 10),
        _ => Err(Error::invalid("H's coding contains unacceptable chars"))
    }
}

/// Parses the content octets of the primitive form.
fn parse_content(content: &[u8]) -> Result<(usize, Bytes), DecodeError> {
    let Some((&pad, octets)) = content.split_first() else {
        return Err(DecodeError::new(
            DecodeErrorKind::NotEnoughData, "zero length"
        ))
    };
    if octets.is_empty() && pad != 0 {
        return Err(DecodeError::malformed("invalid empty value"))
    }
    if pad > 7 {
        return Err(DecodeError::malformed("too big pad"))
    }
    if let Some(last) = octets.last() {
        if last & ((1u8 << pad) - 1) != 0 {
            return Err(DecodeError::malformed("invalid pad"))
        }
    }
    Ok((octets.len() * 8 - usize::from(pad), Bytes::copy_from_slice(octets)))
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::ctx::Ctx;
    use crate::encode::encode_cer;

    #[test]
    fn literals() {
        let value = BitString::new().with_literal("'0101'B").unwrap();
        assert_eq!(value.bit_len(), 4);
        assert_eq!(value.octets().unwrap().as_ref(), b"\x50");
        assert!(value.bit(1));
        assert!(!value.bit(2));
        assert!(!value.bit(100));

        let value = BitString::new().with_literal("'ABC'H").unwrap();
        assert_eq!(value.bit_len(), 12);
        assert_eq!(value.octets().unwrap().as_ref(), b"\xab\xc0");

        assert_eq!(
            BitString::new().with_literal("'012'B").unwrap_err().to_string(),
            "B's coding contains unacceptable chars"
        );
    }

    #[test]
    fn named() {
        let spec = BitString::new().named([
            ("digitalSignature", 0), ("keyEncipherment", 2), ("keyAgreement", 4)
        ]);
        let mut value = spec.clone().with_named(
            ["keyEncipherment", "digitalSignature"]
        ).unwrap();
        assert_eq!(value.bit_len(), 3);
        assert_eq!(value.named_bits(), ["digitalSignature", "keyEncipherment"]);
        assert!(value.bit_by_name("keyEncipherment").unwrap());
        assert!(!value.bit_by_name("keyAgreement").unwrap());
        assert_eq!(value.encode().unwrap(), b"\x03\x02\x05\xa0");
        assert!(matches!(
            spec.clone().with_named(["cRLSign"]), Err(Error::ObjUnknown(_))
        ));

        let value = spec.with_literal("'10100000'B").unwrap();
        assert_eq!(value.bit_len(), 3);
    }

    #[test]
    fn encode_decode() {
        let mut value = BitString::new().with_bits(12, &b"\xab\xc0"[..])
            .unwrap();
        assert_eq!(value.encode().unwrap(), b"\x03\x03\x04\xab\xc0");
        let res = BitString::new().decod(b"\x03\x03\x04\xab\xc0", &Ctx::new())
            .unwrap();
        assert_eq!(res, value);
        assert!(BitString::new().with_bits(12, &b"\xab\xc1"[..]).is_err());
        assert_eq!(
            BitString::new().encode().unwrap_err().to_string(),
            "object is not ready: BitString"
        );
    }

    #[test]
    fn decode_invalid() {
        fn msg(data: &[u8]) -> String {
            BitString::new().decode(data, &Ctx::new()).unwrap_err()
                .as_decode().unwrap().msg().to_string()
        }

        assert_eq!(msg(b"\x03\x00"), "zero length");
        assert_eq!(msg(b"\x03\x01\x01"), "invalid empty value");
        assert_eq!(msg(b"\x03\x02\x08\x00"), "too big pad");
        assert_eq!(msg(b"\x03\x02\x01\x01"), "invalid pad");
    }

    #[test]
    fn decode_constructed() {
        let data = b"\x23\x80\x03\x02\x00\xab\x03\x02\x04\xc0\x00\x00";
        assert_eq!(
            BitString::new().decode(data, &Ctx::new()).unwrap_err()
                .as_decode().unwrap().msg(),
            "unallowed BER constructed encoding"
        );
        let res = BitString::new().decod(data, &Ctx::ber()).unwrap();
        assert_eq!(res.bit_len(), 12);
        assert_eq!(res.octets().unwrap().as_ref(), b"\xab\xc0");
        assert!(res.base().lenindef());
        assert!(res.base().ber_encoded());

        let data = b"\x23\x08\x03\x02\x04\xa0\x03\x02\x00\xab";
        let err = BitString::new().decode(data, &Ctx::ber()).unwrap_err();
        let err = err.as_decode().unwrap();
        assert_eq!(err.msg(), "BitString chunk is not multiple of 8 bits");
        assert_eq!(err.path().to_string(), "0");
        assert_eq!(err.offset(), 2);

        let err = BitString::new().decode(b"\x23\x80\x00\x00", &Ctx::ber())
            .unwrap_err();
        assert_eq!(err.as_decode().unwrap().msg(), "no chunks");
    }

    #[test]
    fn cer_chunks() {
        let mut value = BitString::new().with_bits(
            999 * 8 * 2 + 4, vec![0xffu8; 999 * 2].into_iter().chain(
                [0xf0]
            ).collect::<Vec<_>>()
        ).unwrap();
        let res = encode_cer(&mut value).unwrap();
        assert_eq!(&res[..2], b"\x23\x80");
        assert_eq!(&res[2..7], b"\x03\x82\x03\xe8\x00");
        assert_eq!(&res[res.len() - 6..], b"\x03\x02\x04\xf0\x00\x00");
        let back = BitString::new().decod(&res, &Ctx::ber()).unwrap();
        assert_eq!(back.bit_len(), value.bit_len());
        assert_eq!(back.octets(), value.octets());

        let mut short = BitString::new().with_bytes(vec![1u8; 999]);
        assert_eq!(encode_cer(&mut short).unwrap(), short.encode().unwrap());
    }
}
