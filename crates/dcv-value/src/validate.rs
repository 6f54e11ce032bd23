use std::collections::HashSet;

use bytes::Bytes;
use dcv_codec::{DecodeError, DecodeResult, Reader, Tag};
use tracing::debug;

use crate::context::DecodeContext;
use crate::layout;

/// What a successful [`validate`] walk saw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Tagged values, composites included.
    pub values: usize,
    pub composites: usize,
    /// Deepest nesting reached, counting composites as a level.
    pub max_depth: u32,
}

/// Check that `buffer` holds exactly one well-formed value, descending
/// into every nested composite body.
///
/// Nothing is materialized. Nesting is counted across composite
/// boundaries, so `ctx.limits.max_depth` bounds the whole tree here,
/// not only one lazily decoded level.
pub fn validate(buffer: impl Into<Bytes>, ctx: &DecodeContext) -> DecodeResult<ValidationReport> {
    let buffer = buffer.into();
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
    let mut walker = Walker {
        ctx,
        report: ValidationReport::default(),
    };
    let mut reader = Reader::new(buffer, ctx.ruleset()?);
    walker.value(&mut reader, 0)?;
    reader.finish()?;
    debug!(
        values = walker.report.values,
        composites = walker.report.composites,
        max_depth = walker.report.max_depth,
        "buffer validated"
    );
    Ok(walker.report)
}

struct Walker<'a> {
    ctx: &'a DecodeContext,
    report: ValidationReport,
}

impl Walker<'_> {
    fn value(&mut self, reader: &mut Reader, depth: u32) -> DecodeResult<()> {
        if depth > self.ctx.limits.max_depth {
            return Err(DecodeError::malformed(
                reader.position(),
                format!("nesting deeper than {}", self.ctx.limits.max_depth),
            ));
        }
        self.report.values += 1;
        self.report.max_depth = self.report.max_depth.max(depth);

        match reader.read_tag()? {
            Tag::Nil => {}
            Tag::Some => self.value(reader, depth + 1)?,
            Tag::Bool => {
                reader.read_bool()?;
            }
            Tag::String => {
                reader.read_str()?;
            }
            Tag::Int => {
                reader.read_int()?;
            }
            Tag::UInt64 => {
                reader.read_uint()?;
            }
            Tag::Address => {
                reader.read_address()?;
            }
            Tag::Array => {
                for _ in 0..reader.read_count()? {
                    self.value(reader, depth + 1)?;
                }
            }
            Tag::Dictionary => {
                for _ in 0..reader.read_count()? {
                    self.value(reader, depth + 1)?;
                    self.value(reader, depth + 1)?;
                }
            }
            Tag::Composite => {
                let len = reader.read_len()?;
                let content = reader.read_region(len)?;
                self.composite(content, depth)?;
            }
        }
        Ok(())
    }

    /// Offsets in errors from here on are relative to the composite body.
    fn composite(&mut self, content: Bytes, depth: u32) -> DecodeResult<()> {
        self.report.composites += 1;
        let (_, fields_content) = layout::decode_identity(content, self.ctx.ruleset()?)?;

        let mut reader = Reader::new(fields_content, self.ctx.ruleset()?);
        let count = reader.read_count()?;
        let mut names = HashSet::with_capacity(count);
        for _ in 0..count {
            let offset = reader.position();
            let name = reader.read_str()?;
            if !names.insert(name) {
                return Err(DecodeError::malformed(offset, "duplicate field"));
            }
            self.value(&mut reader, depth + 1)?;
        }
        reader.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::encode_value;
    use crate::fields::FieldMap;
    use crate::value::Value;
    use crate::CompositeValue;
    use dcv_codec::{DecodeLimits, FormatVersion, Writer};
    use dcv_types::{CompositeKind, Location};

    fn composite(name: &str, fields: FieldMap) -> Value {
        Value::from(CompositeValue::new(
            Location::Identifier("test".into()),
            name,
            CompositeKind::Structure,
            fields,
            None,
        ))
    }

    fn nested(levels: usize) -> Value {
        let mut value = Value::Int(0);
        for _ in 0..levels {
            value = composite("Level", FieldMap::from_iter([("inner", value)]));
        }
        value
    }

    #[test]
    fn counts_everything() {
        let value = composite(
            "Outer",
            FieldMap::from_iter([
                ("a", Value::Array(vec![Value::Int(1), Value::Int(2)])),
                ("b", composite("Inner", FieldMap::from_iter([("c", Value::Nil)]))),
            ]),
        );
        let report = validate(encode_value(&value).unwrap(), &DecodeContext::default()).unwrap();
        assert_eq!(
            report,
            ValidationReport {
                values: 6,
                composites: 2,
                max_depth: 2,
            }
        );
    }

    #[test]
    fn finds_corruption_inside_nested_body() {
        let mut inner = Writer::new();
        inner.write_u8(1);
        inner.write_str("test").unwrap();
        inner.write_str("Broken").unwrap();
        inner.write_u8(CompositeKind::Structure.to_byte().unwrap());
        inner.write_len(1).unwrap();
        inner.write_str("x").unwrap();
        inner.write_u8(0x7f);

        let mut outer = Writer::new();
        outer.write_tag(Tag::Array);
        outer.write_len(1).unwrap();
        outer.write_tag(Tag::Composite);
        outer.write_len(inner.len()).unwrap();
        outer.write_raw(inner.as_slice());
        let bytes = outer.into_bytes();

        // Lazy decode accepts it: the body is never looked at.
        crate::decode_value(bytes.clone(), None, FormatVersion::CURRENT).unwrap();

        let err = validate(bytes, &DecodeContext::default()).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownTag { tag: 0x7f, .. }));
    }

    #[test]
    fn bounds_nesting_across_composites() {
        let bytes = encode_value(&nested(6)).unwrap();
        let limits = DecodeLimits { max_depth: 4, ..Default::default() };
        let ctx = DecodeContext::default().with_limits(limits);
        assert!(validate(bytes.clone(), &ctx).is_err());
        assert_eq!(validate(bytes, &DecodeContext::default()).unwrap().max_depth, 6);
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut bytes = encode_value(&nested(1)).unwrap();
        bytes.push(0);
        assert!(validate(bytes, &DecodeContext::default()).is_err());
    }

    #[test]
    fn legacy_buffer() {
        let value = nested(3);
        let bytes = crate::encode_value_as(&value, FormatVersion::V1).unwrap();
        let ctx = DecodeContext::new(None, FormatVersion::V1);
        assert_eq!(validate(bytes, &ctx).unwrap().composites, 3);
    }
}
