use dcv_types::Address;

use crate::error::EncodeResult;
use crate::tag::Tag;
use crate::writer::Writer;

/// A value that can serialize itself, tag first, into a [`Writer`].
pub trait Encodable {
    fn encode(&self, writer: &mut Writer) -> EncodeResult<()>;

    /// Encode into a fresh buffer in the current format version.
    fn to_bytes(&self) -> EncodeResult<Vec<u8>> {
        let mut writer = Writer::new();
        self.encode(&mut writer)?;
        Ok(writer.into_bytes())
    }
}

impl Encodable for bool {
    fn encode(&self, writer: &mut Writer) -> EncodeResult<()> {
        writer.write_tag(Tag::Bool);
        writer.write_bool(*self);
        Ok(())
    }
}

impl Encodable for str {
    fn encode(&self, writer: &mut Writer) -> EncodeResult<()> {
        writer.write_tag(Tag::String);
        writer.write_str(self)
    }
}

impl Encodable for String {
    fn encode(&self, writer: &mut Writer) -> EncodeResult<()> {
        self.as_str().encode(writer)
    }
}

impl Encodable for i64 {
    fn encode(&self, writer: &mut Writer) -> EncodeResult<()> {
        writer.write_tag(Tag::Int);
        writer.write_int(*self);
        Ok(())
    }
}

impl Encodable for u64 {
    fn encode(&self, writer: &mut Writer) -> EncodeResult<()> {
        writer.write_tag(Tag::UInt64);
        writer.write_uint(*self);
        Ok(())
    }
}

impl Encodable for Address {
    fn encode(&self, writer: &mut Writer) -> EncodeResult<()> {
        writer.write_tag(Tag::Address);
        writer.write_address(*self);
        Ok(())
    }
}

impl<T: Encodable> Encodable for Option<T> {
    fn encode(&self, writer: &mut Writer) -> EncodeResult<()> {
        match self {
            None => {
                writer.write_tag(Tag::Nil);
                Ok(())
            }
            Some(inner) => {
                writer.write_tag(Tag::Some);
                writer.nested(|w| inner.encode(w))
            }
        }
    }
}

impl<T: Encodable> Encodable for [T] {
    fn encode(&self, writer: &mut Writer) -> EncodeResult<()> {
        writer.write_tag(Tag::Array);
        writer.write_len(self.len())?;
        writer.nested(|w| self.iter().try_for_each(|item| item.encode(w)))
    }
}

impl<T: Encodable> Encodable for Vec<T> {
    fn encode(&self, writer: &mut Writer) -> EncodeResult<()> {
        self.as_slice().encode(writer)
    }
}

impl<T: Encodable + ?Sized> Encodable for &T {
    fn encode(&self, writer: &mut Writer) -> EncodeResult<()> {
        (**self).encode(writer)
    }
}

impl<T: Encodable + ?Sized> Encodable for Box<T> {
    fn encode(&self, writer: &mut Writer) -> EncodeResult<()> {
        (**self).encode(writer)
    }
}
