use bytes::Bytes;
use dcv_codec::{DecodeError, DecodeResult, Encodable, EncodeResult, FormatVersion, Reader, Writer};
use dcv_types::Address;
use tracing::trace;

use crate::context::DecodeContext;
use crate::value::{decode_tagged, Value};

/// Decode one value from `buffer`, which must hold exactly one value.
///
/// Composites anywhere in the result come back deferred, holding
/// sub-regions of `buffer` without copying it.
pub fn decode_value(
    buffer: impl Into<Bytes>,
    owner: Option<Address>,
    version: FormatVersion,
) -> DecodeResult<Value> {
    decode_value_with(buffer, &DecodeContext::new(owner, version))
}

/// Like [`decode_value`], with explicit limits.
pub fn decode_value_with(buffer: impl Into<Bytes>, ctx: &DecodeContext) -> DecodeResult<Value> {
    let buffer = buffer.into();
    let ruleset = ctx.ruleset()?;
    if buffer.len() > ctx.limits.max_input_len {
        return Err(DecodeError::malformed(
            0,
            format!(
                "input of {} bytes exceeds limit of {}",
                buffer.len(),
                ctx.limits.max_input_len
            ),
        ));
    }
    trace!(len = buffer.len(), version = %ctx.version, "decoding value");
    let mut reader = Reader::new(buffer, ruleset);
    let value = decode_tagged(&mut reader, ctx, 0)?;
    reader.finish()?;
    Ok(value)
}

/// Encode in the current format version.
pub fn encode_value(value: &Value) -> EncodeResult<Vec<u8>> {
    encode_value_as(value, FormatVersion::CURRENT)
}

/// Encode in a specific format version. Deferred regions captured in any
/// other version are decoded and re-serialized.
pub fn encode_value_as(value: &Value, version: FormatVersion) -> EncodeResult<Vec<u8>> {
    let mut writer = Writer::with_ruleset(version.ruleset()?);
    value.encode(&mut writer)?;
    Ok(writer.into_bytes())
}
