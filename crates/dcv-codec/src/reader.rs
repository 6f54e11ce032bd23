use bytes::Bytes;
use dcv_types::Address;

use crate::error::{DecodeError, DecodeResult};
use crate::tag::Tag;
use crate::varint::{decode_varint, zigzag_decode};
use crate::version::{IntEncoding, Ruleset};

/// Cursor over an encoded buffer.
///
/// Holds the buffer as [`Bytes`] so sub-regions can be handed out with
/// [`Reader::read_region`] and [`Reader::rest`] without copying.
#[derive(Clone, Debug)]
pub struct Reader {
    buf: Bytes,
    pos: usize,
    ruleset: Ruleset,
}

impl Reader {
    pub fn new(buf: Bytes, ruleset: Ruleset) -> Self {
        Self {
            buf,
            pos: 0,
            ruleset,
        }
    }

    pub fn ruleset(&self) -> Ruleset {
        self.ruleset
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, len: usize) -> DecodeResult<&[u8]> {
        if len > self.remaining() {
            return Err(DecodeError::malformed(
                self.pos,
                format!("truncated: need {len} bytes, have {}", self.remaining()),
            ));
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.buf[start..self.pos])
    }

    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_array<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Read a leading type tag.
    ///
    /// An unassigned byte is [`DecodeError::UnknownTag`], not `Malformed`.
    pub fn read_tag(&mut self) -> DecodeResult<Tag> {
        let offset = self.pos;
        let byte = self.read_u8()?;
        Tag::from_byte(byte).ok_or(DecodeError::UnknownTag { tag: byte, offset })
    }

    fn read_unsigned(&mut self, encoding: IntEncoding, width: usize) -> DecodeResult<u64> {
        match encoding {
            IntEncoding::Varint => {
                let (value, consumed) = decode_varint(&self.buf[self.pos..], self.pos)?;
                self.pos += consumed;
                Ok(value)
            }
            IntEncoding::FixedBigEndian => {
                let bytes = self.take(width)?;
                Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64))
            }
        }
    }

    fn read_length_field(&mut self) -> DecodeResult<(usize, usize)> {
        let offset = self.pos;
        let raw = self.read_unsigned(self.ruleset.lengths, 4)?;
        let len = usize::try_from(raw)
            .map_err(|_| DecodeError::malformed(offset, format!("length {raw} overflows")))?;
        Ok((len, offset))
    }

    /// Read a byte-length prefix. The length must fit in the remaining input.
    pub fn read_len(&mut self) -> DecodeResult<usize> {
        let (len, offset) = self.read_length_field()?;
        if len > self.remaining() {
            return Err(DecodeError::malformed(
                offset,
                format!("length prefix {len} exceeds remaining {}", self.remaining()),
            ));
        }
        Ok(len)
    }

    /// Read an element count. Every element takes at least one byte, so a
    /// count larger than the remaining input is rejected up front.
    pub fn read_count(&mut self) -> DecodeResult<usize> {
        let (count, offset) = self.read_length_field()?;
        if count > self.remaining() {
            return Err(DecodeError::malformed(
                offset,
                format!("element count {count} exceeds remaining {}", self.remaining()),
            ));
        }
        Ok(count)
    }

    pub fn read_bytes(&mut self, len: usize) -> DecodeResult<&[u8]> {
        self.take(len)
    }

    /// Read `len` bytes as an owned region sharing the underlying buffer.
    pub fn read_region(&mut self, len: usize) -> DecodeResult<Bytes> {
        if len > self.remaining() {
            return Err(DecodeError::malformed(
                self.pos,
                format!("region of {len} bytes exceeds remaining {}", self.remaining()),
            ));
        }
        let region = self.buf.slice(self.pos..self.pos + len);
        self.pos += len;
        Ok(region)
    }

    /// Read a length-prefixed byte string.
    pub fn read_prefixed_bytes(&mut self) -> DecodeResult<&[u8]> {
        let len = self.read_len()?;
        self.take(len)
    }

    pub fn read_str(&mut self) -> DecodeResult<String> {
        let offset = self.pos;
        let bytes = self.read_prefixed_bytes()?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| DecodeError::malformed(offset, format!("invalid UTF-8: {e}")))
    }

    pub fn read_bool(&mut self) -> DecodeResult<bool> {
        let offset = self.pos;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::malformed(offset, format!("invalid bool byte {other}"))),
        }
    }

    pub fn read_int(&mut self) -> DecodeResult<i64> {
        match self.ruleset.integers {
            IntEncoding::Varint => Ok(zigzag_decode(self.read_unsigned(IntEncoding::Varint, 8)?)),
            IntEncoding::FixedBigEndian => Ok(i64::from_be_bytes(self.read_array()?)),
        }
    }

    pub fn read_uint(&mut self) -> DecodeResult<u64> {
        self.read_unsigned(self.ruleset.integers, 8)
    }

    pub fn read_address(&mut self) -> DecodeResult<Address> {
        Ok(Address::new(self.read_array()?))
    }

    /// Take everything not yet read as a region.
    pub fn rest(&mut self) -> Bytes {
        let region = self.buf.slice(self.pos..);
        self.pos = self.buf.len();
        region
    }

    /// Fail if any input is left over.
    pub fn finish(&self) -> DecodeResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::malformed(
                self.pos,
                format!("{} trailing bytes", self.remaining()),
            ))
        }
    }
}
