//! Wire layout of a composite.
//!
//! ```text
//! TAG_COMPOSITE | BODY_LEN | body
//! body = LOCATION | QUALIFIED_IDENTIFIER | KIND | FIELD_COUNT | (FIELD_NAME | FIELD_VALUE)*
//! ```
//!
//! Identity comes before the fields so a decoder can stop after it and
//! keep the field bytes untouched. `BODY_LEN` lets a parent slice out a
//! nested composite without parsing it.

use bytes::Bytes;
use dcv_codec::{
    DecodeError, DecodeResult, EncodeError, EncodeResult, Reader, Ruleset, Tag, Writer,
};
use dcv_types::{CompositeKind, Location};

use crate::context::DecodeContext;
use crate::fields::FieldMap;
use crate::value::decode_tagged;

const LOCATION_IDENTIFIER: u8 = 1;
const LOCATION_STRING: u8 = 2;
const LOCATION_ADDRESS: u8 = 3;

/// Everything that identifies a composite's type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub location: Location,
    pub qualified_identifier: String,
    pub kind: CompositeKind,
}

fn write_location(writer: &mut Writer, location: &Location) -> EncodeResult<()> {
    writer.write_u8(location.tag());
    match location {
        Location::Identifier(name) | Location::String(name) => writer.write_str(name),
        Location::Address { address, name } => {
            writer.write_address(*address);
            writer.write_str(name)
        }
    }
}

fn read_location(reader: &mut Reader) -> DecodeResult<Location> {
    let offset = reader.position();
    match reader.read_u8()? {
        LOCATION_IDENTIFIER => Ok(Location::Identifier(reader.read_str()?)),
        LOCATION_STRING => Ok(Location::String(reader.read_str()?)),
        LOCATION_ADDRESS => {
            let address = reader.read_address()?;
            let name = reader.read_str()?;
            Ok(Location::Address { address, name })
        }
        tag => Err(DecodeError::UnknownTag { tag, offset }),
    }
}

/// Write location, qualified identifier, and kind.
pub(crate) fn encode_identity(writer: &mut Writer, identity: &Identity) -> EncodeResult<()> {
    let kind = identity
        .kind
        .to_byte()
        .ok_or_else(|| EncodeError::UnknownKind(identity.qualified_identifier.clone()))?;
    write_location(writer, &identity.location)?;
    writer.write_str(&identity.qualified_identifier)?;
    writer.write_u8(kind);
    Ok(())
}

/// Decode the identity at the front of a composite body.
///
/// Returns the identity and the rest of the body, which is the field
/// region. Field bytes are not looked at.
pub(crate) fn decode_identity(content: Bytes, ruleset: Ruleset) -> DecodeResult<(Identity, Bytes)> {
    let mut reader = Reader::new(content, ruleset);
    let location = read_location(&mut reader)?;
    let qualified_identifier = reader.read_str()?;
    let kind_offset = reader.position();
    let kind_byte = reader.read_u8()?;
    let kind = CompositeKind::from_byte(kind_byte).ok_or_else(|| {
        DecodeError::malformed(kind_offset, format!("invalid composite kind {kind_byte}"))
    })?;
    let identity = Identity {
        location,
        qualified_identifier,
        kind,
    };
    Ok((identity, reader.rest()))
}

/// Decode a field region into an ordered map.
///
/// Field values are decoded one level deep: nested composites come back
/// deferred, holding their own regions.
pub(crate) fn decode_fields(fields_content: Bytes, ctx: &DecodeContext) -> DecodeResult<FieldMap> {
    let mut reader = Reader::new(fields_content, ctx.ruleset()?);
    let count = reader.read_count()?;
    let mut fields = FieldMap::with_capacity(count);
    for _ in 0..count {
        let name_offset = reader.position();
        let name = reader.read_str()?;
        let value = decode_tagged(&mut reader, ctx, 1)?;
        if fields.contains(&name) {
            return Err(DecodeError::malformed(
                name_offset,
                format!("duplicate field {name:?}"),
            ));
        }
        fields.set(name, value);
    }
    reader.finish()?;
    Ok(fields)
}

/// Write the field count and each field in map order.
pub(crate) fn encode_fields(writer: &mut Writer, fields: &FieldMap) -> EncodeResult<()> {
    use dcv_codec::Encodable;

    writer.write_len(fields.len())?;
    writer.nested(|w| {
        for (name, value) in fields {
            w.write_str(name)?;
            value.encode(w)?;
        }
        Ok(())
    })
}

/// Serialize a composite from decoded state.
pub(crate) fn encode_composite(
    writer: &mut Writer,
    identity: &Identity,
    fields: &FieldMap,
) -> EncodeResult<()> {
    writer.write_tag(Tag::Composite);
    writer.write_length_delimited(|w| {
        encode_identity(w, identity)?;
        encode_fields(w, fields)
    })
}
