use std::fmt;

use dcv_codec::{DecodeError, DecodeResult, Encodable, EncodeResult, Reader, Tag, Writer};
use dcv_types::Address;

use crate::composite::CompositeValue;
use crate::context::DecodeContext;

/// Any value the interpreter can persist.
///
/// One variant per wire [`Tag`]. Leaf and container kinds are decoded
/// eagerly; composites are decoded lazily (see [`CompositeValue`]).
#[derive(Clone, Debug)]
pub enum Value {
    /// Absent optional.
    Nil,
    /// Present optional.
    Some(Box<Value>),
    Bool(bool),
    String(String),
    Int(i64),
    UInt64(u64),
    Address(Address),
    Array(Vec<Value>),
    /// Entries in insertion order.
    Dictionary(Vec<(Value, Value)>),
    Composite(Box<CompositeValue>),
}

impl Value {
    pub fn some(inner: Value) -> Self {
        Self::Some(Box::new(inner))
    }

    /// Wire tag of this value.
    pub fn tag(&self) -> Tag {
        match self {
            Self::Nil => Tag::Nil,
            Self::Some(_) => Tag::Some,
            Self::Bool(_) => Tag::Bool,
            Self::String(_) => Tag::String,
            Self::Int(_) => Tag::Int,
            Self::UInt64(_) => Tag::UInt64,
            Self::Address(_) => Tag::Address,
            Self::Array(_) => Tag::Array,
            Self::Dictionary(_) => Tag::Dictionary,
            Self::Composite(_) => Tag::Composite,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeValue> {
        match self {
            Self::Composite(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_composite_mut(&mut self) -> Option<&mut CompositeValue> {
        match self {
            Self::Composite(c) => Some(c),
            _ => None,
        }
    }

    /// Hand `owner` to every composite reachable from this value.
    pub fn set_owner(&mut self, owner: Option<Address>) {
        match self {
            Self::Some(inner) => inner.set_owner(owner),
            Self::Array(items) => items.iter_mut().for_each(|v| v.set_owner(owner)),
            Self::Dictionary(entries) => {
                for (key, value) in entries {
                    key.set_owner(owner);
                    value.set_owner(owner);
                }
            }
            Self::Composite(c) => c.set_owner(owner),
            Self::Nil
            | Self::Bool(_)
            | Self::String(_)
            | Self::Int(_)
            | Self::UInt64(_)
            | Self::Address(_) => {}
        }
    }

    /// Equality for a value found `depth` levels below the value being
    /// compared. Composites past their depth limit compare unequal.
    pub(crate) fn eq_at(&self, other: &Self, depth: u32) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Some(a), Self::Some(b)) => a.eq_at(b, depth + 1),
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::UInt64(a), Self::UInt64(b)) => a == b,
            (Self::Address(a), Self::Address(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_at(y, depth + 1))
            }
            (Self::Dictionary(a), Self::Dictionary(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|((ka, va), (kb, vb))| {
                        ka.eq_at(kb, depth + 1) && va.eq_at(vb, depth + 1)
                    })
            }
            (Self::Composite(a), Self::Composite(b)) => a.eq_at(b, depth),
            _ => false,
        }
    }

    pub(crate) fn fmt_at(&self, f: &mut fmt::Formatter<'_>, depth: u32) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Some(inner) => {
                f.write_str("Some(")?;
                inner.fmt_at(f, depth + 1)?;
                f.write_str(")")
            }
            Self::Bool(b) => write!(f, "{b}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::UInt64(u) => write!(f, "{u}"),
            Self::Address(a) => write!(f, "{a}"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt_at(f, depth + 1)?;
                }
                f.write_str("]")
            }
            Self::Dictionary(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    key.fmt_at(f, depth + 1)?;
                    f.write_str(": ")?;
                    value.fmt_at(f, depth + 1)?;
                }
                f.write_str("}")
            }
            Self::Composite(c) => c.fmt_at(f, depth),
        }
    }
}

/// Decode one tagged value, dispatching on its tag.
///
/// A composite is not parsed here: its body is sliced off as a region and
/// wrapped in a deferred [`CompositeValue`].
pub(crate) fn decode_tagged(
    reader: &mut Reader,
    ctx: &DecodeContext,
    depth: u32,
) -> DecodeResult<Value> {
    if depth > ctx.limits.max_depth {
        return Err(DecodeError::malformed(
            reader.position(),
            format!("nesting deeper than {}", ctx.limits.max_depth),
        ));
    }
    let value = match reader.read_tag()? {
        Tag::Nil => Value::Nil,
        Tag::Some => Value::some(decode_tagged(reader, ctx, depth + 1)?),
        Tag::Bool => Value::Bool(reader.read_bool()?),
        Tag::String => Value::String(reader.read_str()?),
        Tag::Int => Value::Int(reader.read_int()?),
        Tag::UInt64 => Value::UInt64(reader.read_uint()?),
        Tag::Address => Value::Address(reader.read_address()?),
        Tag::Array => {
            let count = reader.read_count()?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(decode_tagged(reader, ctx, depth + 1)?);
            }
            Value::Array(items)
        }
        Tag::Dictionary => {
            let count = reader.read_count()?;
            let mut entries = Vec::with_capacity(count);
            for _ in 0..count {
                let key = decode_tagged(reader, ctx, depth + 1)?;
                let value = decode_tagged(reader, ctx, depth + 1)?;
                entries.push((key, value));
            }
            Value::Dictionary(entries)
        }
        Tag::Composite => {
            let len = reader.read_len()?;
            let content = reader.read_region(len)?;
            Value::Composite(Box::new(CompositeValue::from_region(content, *ctx)))
        }
    };
    Ok(value)
}

impl Encodable for Value {
    fn encode(&self, writer: &mut Writer) -> EncodeResult<()> {
        match self {
            Self::Nil => {
                writer.write_tag(Tag::Nil);
                Ok(())
            }
            Self::Some(inner) => {
                writer.write_tag(Tag::Some);
                writer.nested(|w| inner.encode(w))
            }
            Self::Bool(b) => b.encode(writer),
            Self::String(s) => s.encode(writer),
            Self::Int(i) => i.encode(writer),
            Self::UInt64(u) => u.encode(writer),
            Self::Address(a) => a.encode(writer),
            Self::Array(items) => items.encode(writer),
            Self::Dictionary(entries) => {
                writer.write_tag(Tag::Dictionary);
                writer.write_len(entries.len())?;
                writer.nested(|w| {
                    for (key, value) in entries {
                        key.encode(w)?;
                        value.encode(w)?;
                    }
                    Ok(())
                })
            }
            Self::Composite(c) => c.encode(writer),
        }
    }
}

/// Structural equality. Composites compare by identity and fields, never
/// by load state.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.eq_at(other, 0)
    }
}

/// A present optional prints as `Some(..)`, so `Some(nil)` and `nil` stay
/// apart.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_at(f, 0)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::UInt64(value)
    }
}

impl From<Address> for Value {
    fn from(value: Address) -> Self {
        Self::Address(value)
    }
}

impl From<CompositeValue> for Value {
    fn from(value: CompositeValue) -> Self {
        Self::Composite(Box::new(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => Self::some(inner.into()),
            None => Self::Nil,
        }
    }
}
