use dcv_types::Address;

use crate::config::DecodeLimits;
use crate::error::{EncodeError, EncodeResult};
use crate::tag::Tag;
use crate::varint::{encode_varint, zigzag_encode};
use crate::version::{FormatVersion, IntEncoding, Ruleset};

/// Append-only byte sink for encoded values.
///
/// Writes in the current format version unless built with
/// [`Writer::with_ruleset`]. Nesting is bounded by the default
/// [`DecodeLimits::max_depth`] unless changed with
/// [`Writer::with_max_depth`].
#[derive(Clone, Debug)]
pub struct Writer {
    buf: Vec<u8>,
    ruleset: Ruleset,
    depth: u32,
    max_depth: u32,
}

impl Default for Writer {
    fn default() -> Self {
        Self::with_ruleset(Ruleset::current())
    }
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ruleset(ruleset: Ruleset) -> Self {
        Self {
            buf: Vec::new(),
            ruleset,
            depth: 0,
            max_depth: DecodeLimits::default().max_depth,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn ruleset(&self) -> Ruleset {
        self.ruleset
    }

    pub fn version(&self) -> FormatVersion {
        self.ruleset.version
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_tag(&mut self, tag: Tag) {
        self.buf.push(tag.to_byte());
    }

    /// Copy previously read bytes verbatim, without re-interpreting them.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn length_bytes(&self, len: usize) -> EncodeResult<Vec<u8>> {
        let mut out = Vec::with_capacity(4);
        match self.ruleset.lengths {
            IntEncoding::Varint => encode_varint(&mut out, len as u64),
            IntEncoding::FixedBigEndian => {
                let fixed = u32::try_from(len).map_err(|_| EncodeError::TooLarge {
                    size: len,
                    max: self.ruleset.max_len(),
                })?;
                out.extend_from_slice(&fixed.to_be_bytes());
            }
        }
        Ok(out)
    }

    /// Write a length prefix or element count.
    pub fn write_len(&mut self, len: usize) -> EncodeResult<()> {
        match self.ruleset.lengths {
            IntEncoding::Varint => encode_varint(&mut self.buf, len as u64),
            IntEncoding::FixedBigEndian => {
                let prefix = self.length_bytes(len)?;
                self.buf.extend_from_slice(&prefix);
            }
        }
        Ok(())
    }

    pub fn write_prefixed_bytes(&mut self, bytes: &[u8]) -> EncodeResult<()> {
        self.write_len(bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    pub fn write_str(&mut self, value: &str) -> EncodeResult<()> {
        self.write_prefixed_bytes(value.as_bytes())
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(value as u8);
    }

    pub fn write_int(&mut self, value: i64) {
        match self.ruleset.integers {
            IntEncoding::Varint => encode_varint(&mut self.buf, zigzag_encode(value)),
            IntEncoding::FixedBigEndian => self.buf.extend_from_slice(&value.to_be_bytes()),
        }
    }

    pub fn write_uint(&mut self, value: u64) {
        match self.ruleset.integers {
            IntEncoding::Varint => encode_varint(&mut self.buf, value),
            IntEncoding::FixedBigEndian => self.buf.extend_from_slice(&value.to_be_bytes()),
        }
    }

    pub fn write_address(&mut self, value: Address) {
        self.buf.extend_from_slice(value.as_bytes());
    }

    /// Write whatever `body` writes, preceded by its byte length.
    ///
    /// The body is written in place and the prefix inserted in front of it
    /// afterwards, so nested bodies never go through a scratch buffer.
    pub fn write_length_delimited<F>(&mut self, body: F) -> EncodeResult<()>
    where
        F: FnOnce(&mut Self) -> EncodeResult<()>,
    {
        let start = self.buf.len();
        body(self)?;
        let prefix = self.length_bytes(self.buf.len() - start)?;
        self.buf.splice(start..start, prefix);
        Ok(())
    }

    /// Run `body` one nesting level down.
    ///
    /// Fails with [`EncodeError::TooDeep`] instead of descending past the
    /// writer's depth limit.
    pub fn nested<F>(&mut self, body: F) -> EncodeResult<()>
    where
        F: FnOnce(&mut Self) -> EncodeResult<()>,
    {
        if self.depth >= self.max_depth {
            return Err(EncodeError::TooDeep {
                max: self.max_depth,
            });
        }
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        result
    }
}
