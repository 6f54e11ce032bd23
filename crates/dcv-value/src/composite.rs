//! Deferred composite values.
//!
//! A composite decoded from a buffer starts out holding its encoded body
//! and nothing else. Accessors decode it in two steps, each consuming the
//! region it decoded:
//!
//! ```text
//! Raw ──identity accessor──▶ IdentityLoaded ──field accessor/mutator──▶ FullyLoaded
//!  └────────────────────field accessor/mutator──────────────────────────────▲
//! ```
//!
//! `FullyLoaded` is terminal. A composite built with [`CompositeValue::new`]
//! starts there. Accessors take `&mut self`: loading rewrites the internal
//! state in place and relies on the caller's exclusive access.

use std::borrow::Cow;
use std::fmt;

use bytes::Bytes;
use dcv_codec::{DecodeResult, Encodable, EncodeResult, FormatVersion, Tag, Writer};
use dcv_types::{Address, CompositeKind, Location};
use tracing::debug;

use crate::context::DecodeContext;
use crate::fields::FieldMap;
use crate::layout::{self, Identity};
use crate::value::Value;

/// How much of a composite has been decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    /// Only the whole-value region is held.
    Raw,
    /// Identity is decoded; the field region is held.
    IdentityLoaded,
    /// Identity and fields are decoded; no region is held.
    FullyLoaded,
}

#[derive(Clone)]
enum State {
    Raw {
        content: Bytes,
    },
    IdentityLoaded {
        identity: Identity,
        fields_content: Bytes,
    },
    FullyLoaded {
        identity: Identity,
        fields: FieldMap,
    },
}

/// A struct-, resource-, contract-, event-, or enum-like record.
#[derive(Clone)]
pub struct CompositeValue {
    state: State,
    /// Owner, version, and limits captured at decode time.
    ctx: DecodeContext,
    modified: bool,
}

impl CompositeValue {
    /// Build a composite from decoded parts.
    ///
    /// The value starts fully loaded and marked modified, since it has
    /// never been persisted. A `Some` owner is handed to every composite
    /// among `fields`; with `None`, children keep the owners they have.
    pub fn new(
        location: Location,
        qualified_identifier: impl Into<String>,
        kind: CompositeKind,
        fields: FieldMap,
        owner: Option<Address>,
    ) -> Self {
        let identity = Identity {
            location,
            qualified_identifier: qualified_identifier.into(),
            kind,
        };
        let mut value = Self {
            state: State::FullyLoaded { identity, fields },
            ctx: DecodeContext::new(owner, FormatVersion::CURRENT),
            modified: true,
        };
        if owner.is_some() {
            value.set_owner(owner);
        }
        value
    }

    pub(crate) fn from_region(content: Bytes, ctx: DecodeContext) -> Self {
        Self {
            state: State::Raw { content },
            ctx,
            modified: false,
        }
    }

    pub fn load_state(&self) -> LoadState {
        match self.state {
            State::Raw { .. } => LoadState::Raw,
            State::IdentityLoaded { .. } => LoadState::IdentityLoaded,
            State::FullyLoaded { .. } => LoadState::FullyLoaded,
        }
    }

    /// Whether a field was written since this value was decoded.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn owner(&self) -> Option<Address> {
        self.ctx.owner
    }

    /// Set the owner of this value and every loaded composite beneath it.
    ///
    /// Composites still deferred inside a region pick the owner up when
    /// their parent's fields are decoded.
    pub fn set_owner(&mut self, owner: Option<Address>) {
        self.ctx.owner = owner;
        if let State::FullyLoaded { fields, .. } = &mut self.state {
            for (_, value) in fields.iter_mut() {
                value.set_owner(owner);
            }
        }
    }

    /// Version the retained regions are encoded in.
    pub fn format_version(&self) -> FormatVersion {
        self.ctx.version
    }

    /// Kind if identity is decoded, `Unknown` otherwise. Never decodes.
    pub fn peek_kind(&self) -> CompositeKind {
        match &self.state {
            State::Raw { .. } => CompositeKind::Unknown,
            State::IdentityLoaded { identity, .. } | State::FullyLoaded { identity, .. } => {
                identity.kind
            }
        }
    }

    fn identity(&mut self) -> DecodeResult<&Identity> {
        if let State::Raw { content } = &self.state {
            let (identity, fields_content) =
                layout::decode_identity(content.clone(), self.ctx.ruleset()?)?;
            debug!(
                qualified_identifier = %identity.qualified_identifier,
                kind = %identity.kind,
                fields_len = fields_content.len(),
                "composite identity loaded"
            );
            self.state = State::IdentityLoaded {
                identity,
                fields_content,
            };
        }
        match &self.state {
            State::Raw { .. } => unreachable!("identity was just loaded"),
            State::IdentityLoaded { identity, .. } | State::FullyLoaded { identity, .. } => {
                Ok(identity)
            }
        }
    }

    /// Decode whatever is still held so the value is fully loaded.
    ///
    /// All or nothing: if decoding fails the value keeps the state it had.
    pub fn ensure_fields_loaded(&mut self) -> DecodeResult<()> {
        match &self.state {
            State::FullyLoaded { .. } => return Ok(()),
            State::Raw { content } => {
                let (identity, fields_content) =
                    layout::decode_identity(content.clone(), self.ctx.ruleset()?)?;
                let fields = layout::decode_fields(fields_content, &self.ctx)?;
                debug!(
                    qualified_identifier = %identity.qualified_identifier,
                    count = fields.len(),
                    "composite fully loaded from raw"
                );
                self.state = State::FullyLoaded { identity, fields };
            }
            State::IdentityLoaded {
                identity,
                fields_content,
            } => {
                let fields = layout::decode_fields(fields_content.clone(), &self.ctx)?;
                debug!(count = fields.len(), "composite fields loaded");
                let identity = identity.clone();
                self.state = State::FullyLoaded { identity, fields };
            }
        }
        Ok(())
    }

    fn loaded_fields(&mut self) -> DecodeResult<&mut FieldMap> {
        self.ensure_fields_loaded()?;
        match &mut self.state {
            State::FullyLoaded { fields, .. } => Ok(fields),
            _ => unreachable!("fields were just loaded"),
        }
    }

    pub fn location(&mut self) -> DecodeResult<&Location> {
        Ok(&self.identity()?.location)
    }

    pub fn qualified_identifier(&mut self) -> DecodeResult<&str> {
        Ok(&self.identity()?.qualified_identifier)
    }

    pub fn kind(&mut self) -> DecodeResult<CompositeKind> {
        Ok(self.identity()?.kind)
    }

    /// Fully qualified type ID, e.g. `A.0000000000000001.Vault`.
    pub fn type_id(&mut self) -> DecodeResult<String> {
        let identity = self.identity()?;
        Ok(identity.location.type_id(&identity.qualified_identifier))
    }

    pub fn fields(&mut self) -> DecodeResult<&FieldMap> {
        Ok(&*self.loaded_fields()?)
    }

    pub fn field_names(&mut self) -> DecodeResult<impl Iterator<Item = &str>> {
        Ok(self.loaded_fields()?.names())
    }

    pub fn get_field(&mut self, name: &str) -> DecodeResult<Option<&Value>> {
        Ok(self.loaded_fields()?.get(name))
    }

    /// Mutable access to a field. The composite counts as modified as soon
    /// as a present field is handed out.
    pub fn field_mut(&mut self, name: &str) -> DecodeResult<Option<&mut Value>> {
        self.ensure_fields_loaded()?;
        let State::FullyLoaded { fields, .. } = &mut self.state else {
            unreachable!("fields were just loaded");
        };
        let field = fields.get_mut(name);
        if field.is_some() {
            self.modified = true;
        }
        Ok(field)
    }

    /// Insert or overwrite a field, returning the previous value.
    ///
    /// The stored value takes over this composite's owner.
    pub fn set_field(
        &mut self,
        name: impl Into<String>,
        mut value: Value,
    ) -> DecodeResult<Option<Value>> {
        value.set_owner(self.ctx.owner);
        let previous = self.loaded_fields()?.set(name, value);
        self.modified = true;
        Ok(previous)
    }

    pub fn remove_field(&mut self, name: &str) -> DecodeResult<Option<Value>> {
        let removed = self.loaded_fields()?.remove(name);
        if removed.is_some() {
            self.modified = true;
        }
        Ok(removed)
    }

    pub fn into_fields(mut self) -> DecodeResult<FieldMap> {
        self.ensure_fields_loaded()?;
        match self.state {
            State::FullyLoaded { fields, .. } => Ok(fields),
            _ => unreachable!("fields were just loaded"),
        }
    }

    /// Decoded identity and fields without changing state.
    ///
    /// Parts that are still encoded are decoded into temporaries.
    fn resolve(&self) -> DecodeResult<(Cow<'_, Identity>, Cow<'_, FieldMap>)> {
        match &self.state {
            State::Raw { content } => {
                let (identity, fields_content) =
                    layout::decode_identity(content.clone(), self.ctx.ruleset()?)?;
                let fields = layout::decode_fields(fields_content, &self.ctx)?;
                Ok((Cow::Owned(identity), Cow::Owned(fields)))
            }
            State::IdentityLoaded {
                identity,
                fields_content,
            } => {
                let fields = layout::decode_fields(fields_content.clone(), &self.ctx)?;
                Ok((Cow::Borrowed(identity), Cow::Owned(fields)))
            }
            State::FullyLoaded { identity, fields } => {
                Ok((Cow::Borrowed(identity), Cow::Borrowed(fields)))
            }
        }
    }

    /// Whether a walk reaching this composite at `depth` has gone past the
    /// captured nesting limit. Each level of a walk through `resolve`
    /// decodes a fresh region, so the walk itself has to stop.
    fn too_deep(&self, depth: u32) -> bool {
        depth > self.ctx.limits.max_depth
    }

    pub(crate) fn eq_at(&self, other: &Self, depth: u32) -> bool {
        if self.too_deep(depth) {
            return false;
        }
        let (Ok((id_a, fields_a)), Ok((id_b, fields_b))) = (self.resolve(), other.resolve())
        else {
            return false;
        };
        id_a == id_b
            && fields_a.len() == fields_b.len()
            && fields_a
                .iter()
                .zip(fields_b.iter())
                .all(|((name_a, a), (name_b, b))| name_a == name_b && a.eq_at(b, depth + 1))
    }

    pub(crate) fn fmt_at(&self, f: &mut fmt::Formatter<'_>, depth: u32) -> fmt::Result {
        if self.too_deep(depth) {
            return f.write_str("<too deep>");
        }
        let Ok((identity, fields)) = self.resolve() else {
            return f.write_str("<malformed>");
        };
        write!(f, "{}(", identity.qualified_identifier)?;
        for (i, (name, value)) in fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: ")?;
            value.fmt_at(f, depth + 1)?;
        }
        f.write_str(")")
    }
}

impl Encodable for CompositeValue {
    /// Retained regions are copied through untouched when they are in the
    /// writer's version; decoded state is serialized field by field.
    fn encode(&self, writer: &mut Writer) -> EncodeResult<()> {
        let passthrough = self.ctx.version == writer.version();
        match &self.state {
            State::Raw { content } if passthrough => {
                debug!(len = content.len(), "composite passthrough");
                writer.write_tag(Tag::Composite);
                writer.write_len(content.len())?;
                writer.write_raw(content);
                Ok(())
            }
            State::IdentityLoaded {
                identity,
                fields_content,
            } if passthrough => {
                debug!(
                    qualified_identifier = %identity.qualified_identifier,
                    len = fields_content.len(),
                    "composite field passthrough"
                );
                writer.write_tag(Tag::Composite);
                writer.write_length_delimited(|w| {
                    layout::encode_identity(w, identity)?;
                    w.write_raw(fields_content);
                    Ok(())
                })
            }
            State::FullyLoaded { identity, fields } => {
                layout::encode_composite(writer, identity, fields)
            }
            State::Raw { .. } | State::IdentityLoaded { .. } => {
                debug!(
                    from = %self.ctx.version,
                    to = %writer.version(),
                    "re-encoding composite across versions"
                );
                let (identity, fields) = self.resolve()?;
                layout::encode_composite(writer, &identity, &fields)
            }
        }
    }
}

/// Structural equality: identity and fields, in order. State, owner, and
/// the modified flag do not take part. A region that fails to decode is
/// unequal to everything.
impl PartialEq for CompositeValue {
    fn eq(&self, other: &Self) -> bool {
        self.eq_at(other, 0)
    }
}

impl fmt::Debug for CompositeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("CompositeValue");
        match &self.state {
            State::Raw { content } => s.field("content_len", &content.len()),
            State::IdentityLoaded {
                identity,
                fields_content,
            } => s
                .field("identity", identity)
                .field("fields_content_len", &fields_content.len()),
            State::FullyLoaded { identity, fields } => {
                s.field("identity", identity).field("fields", fields)
            }
        };
        s.field("owner", &self.ctx.owner)
            .field("version", &self.ctx.version)
            .field("modified", &self.modified)
            .finish()
    }
}

impl fmt::Display for CompositeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_at(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{decode_value, encode_value};
    use dcv_codec::{DecodeError, Ruleset};

    fn test_location() -> Location {
        Location::Identifier("test".into())
    }

    fn simple() -> CompositeValue {
        CompositeValue::new(
            test_location(),
            "TestResource",
            CompositeKind::Resource,
            FieldMap::from_iter([("a", Value::from("hello")), ("b", Value::Bool(true))]),
            None,
        )
    }

    fn decoded(value: CompositeValue) -> CompositeValue {
        let bytes = encode_value(&Value::from(value)).unwrap();
        match decode_value(bytes, Some(Address::from_u64(1)), FormatVersion::CURRENT).unwrap() {
            Value::Composite(c) => *c,
            other => panic!("expected composite, got {other:?}"),
        }
    }

    #[test]
    fn constructed_starts_fully_loaded() {
        let value = simple();
        assert_eq!(value.load_state(), LoadState::FullyLoaded);
        assert!(value.is_modified());
        assert_eq!(value.peek_kind(), CompositeKind::Resource);
    }

    #[test]
    fn decoded_starts_raw() {
        let value = decoded(simple());
        assert_eq!(value.load_state(), LoadState::Raw);
        assert_eq!(value.peek_kind(), CompositeKind::Unknown);
        assert!(!value.is_modified());
        assert_eq!(value.owner(), Some(Address::from_u64(1)));
    }

    #[test]
    fn identity_accessors_stop_at_identity() {
        let mut value = decoded(simple());
        assert_eq!(value.kind().unwrap(), CompositeKind::Resource);
        assert_eq!(value.load_state(), LoadState::IdentityLoaded);
        assert_eq!(value.qualified_identifier().unwrap(), "TestResource");
        assert_eq!(value.location().unwrap(), &test_location());
        assert_eq!(value.type_id().unwrap(), "I.test.TestResource");
        assert_eq!(value.load_state(), LoadState::IdentityLoaded);
    }

    #[test]
    fn field_accessor_from_raw_loads_everything() {
        let mut value = decoded(simple());
        assert_eq!(value.get_field("a").unwrap(), Some(&Value::from("hello")));
        assert_eq!(value.load_state(), LoadState::FullyLoaded);
        assert_eq!(value.qualified_identifier().unwrap(), "TestResource");
    }

    #[test]
    fn field_names_in_order() {
        let mut value = decoded(simple());
        assert_eq!(value.field_names().unwrap().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn set_field_materializes_and_marks_modified() {
        let mut value = decoded(simple());
        let previous = value.set_field("b", Value::Bool(false)).unwrap();
        assert_eq!(previous, Some(Value::Bool(true)));
        assert_eq!(value.load_state(), LoadState::FullyLoaded);
        assert!(value.is_modified());
        assert_eq!(value.get_field("a").unwrap(), Some(&Value::from("hello")));
    }

    #[test]
    fn remove_field_marks_modified_only_when_present() {
        let mut value = decoded(simple());
        assert_eq!(value.remove_field("missing").unwrap(), None);
        assert!(!value.is_modified());
        assert_eq!(value.remove_field("a").unwrap(), Some(Value::from("hello")));
        assert!(value.is_modified());
        assert_eq!(value.fields().unwrap().len(), 1);
    }

    #[test]
    fn field_mut_marks_modified() {
        let mut value = decoded(simple());
        assert!(value.field_mut("missing").unwrap().is_none());
        assert!(!value.is_modified());
        if let Some(Value::String(s)) = value.field_mut("a").unwrap() {
            s.push_str(" world");
        }
        assert!(value.is_modified());
        assert_eq!(value.get_field("a").unwrap(), Some(&Value::from("hello world")));
    }

    #[test]
    fn failed_identity_decode_keeps_raw() {
        let mut value = CompositeValue::from_region(
            Bytes::from_static(&[1, 9]),
            DecodeContext::default(),
        );
        assert!(matches!(value.kind(), Err(DecodeError::Malformed { .. })));
        assert_eq!(value.load_state(), LoadState::Raw);
        assert!(value.fields().is_err());
        assert_eq!(value.load_state(), LoadState::Raw);
    }

    #[test]
    fn failed_field_decode_keeps_prior_state() {
        let mut writer = Writer::new();
        let identity = Identity {
            location: test_location(),
            qualified_identifier: "Broken".into(),
            kind: CompositeKind::Structure,
        };
        layout::encode_identity(&mut writer, &identity).unwrap();
        // One field announced, none present.
        writer.write_len(1).unwrap();
        let content = Bytes::from(writer.into_bytes());

        let mut value = CompositeValue::from_region(content, DecodeContext::default());
        assert!(value.get_field("x").is_err());
        assert_eq!(value.load_state(), LoadState::Raw);

        assert_eq!(value.qualified_identifier().unwrap(), "Broken");
        assert!(value.set_field("x", Value::Nil).is_err());
        assert_eq!(value.load_state(), LoadState::IdentityLoaded);
        assert!(!value.is_modified());
    }

    #[test]
    fn malformed_composite_is_unequal_and_displays() {
        let broken =
            CompositeValue::from_region(Bytes::from_static(&[0xff]), DecodeContext::default());
        assert_ne!(broken, broken.clone());
        assert_eq!(broken.to_string(), "<malformed>");
    }

    #[test]
    fn equality_ignores_state_owner_and_modified() {
        let original = simple();
        let mut partially = decoded(simple());
        partially.kind().unwrap();
        assert_eq!(decoded(simple()), original);
        assert_eq!(partially, original);
    }

    #[test]
    fn display_resolves_without_loading() {
        let value = decoded(simple());
        assert_eq!(value.to_string(), r#"TestResource(a: "hello", b: true)"#);
        assert_eq!(value.load_state(), LoadState::Raw);
    }

    #[test]
    fn set_owner_reaches_loaded_children() {
        let child = CompositeValue::new(
            test_location(),
            "Child",
            CompositeKind::Structure,
            FieldMap::new(),
            None,
        );
        let mut parent = CompositeValue::new(
            test_location(),
            "Parent",
            CompositeKind::Structure,
            FieldMap::from_iter([("items", Value::Array(vec![Value::from(child)]))]),
            None,
        );
        let owner = Some(Address::from_u64(0x42));
        parent.set_owner(owner);
        let Some(Value::Array(items)) = parent.get_field("items").unwrap() else {
            panic!("expected array");
        };
        assert_eq!(items[0].as_composite().unwrap().owner(), owner);
    }

    #[test]
    fn new_without_owner_keeps_child_owners() {
        let child = || {
            Value::from(CompositeValue::new(
                test_location(),
                "Child",
                CompositeKind::Structure,
                FieldMap::new(),
                Some(Address::from_u64(9)),
            ))
        };
        let mut unowned = CompositeValue::new(
            test_location(),
            "Parent",
            CompositeKind::Structure,
            FieldMap::from_iter([("child", child())]),
            None,
        );
        let kept = unowned.get_field("child").unwrap().and_then(Value::as_composite).unwrap();
        assert_eq!(kept.owner(), Some(Address::from_u64(9)));

        let mut owned = CompositeValue::new(
            test_location(),
            "Parent",
            CompositeKind::Structure,
            FieldMap::from_iter([("child", child())]),
            Some(Address::from_u64(2)),
        );
        let taken = owned.get_field("child").unwrap().and_then(Value::as_composite).unwrap();
        assert_eq!(taken.owner(), Some(Address::from_u64(2)));
    }

    #[test]
    fn walks_stop_at_the_captured_depth() {
        let mut value = Value::Int(7);
        for _ in 0..4 {
            value = Value::from(CompositeValue::new(
                test_location(),
                "Link",
                CompositeKind::Structure,
                FieldMap::from_iter([("x", value)]),
                None,
            ));
        }
        let bytes = encode_value(&value).unwrap();
        let limits = dcv_codec::DecodeLimits {
            max_depth: 2,
            ..Default::default()
        };
        let ctx = DecodeContext::default().with_limits(limits);
        let shallow = crate::encoding::decode_value_with(bytes.clone(), &ctx).unwrap();

        assert_ne!(shallow, shallow.clone());
        assert_eq!(shallow.to_string(), "Link(x: Link(x: Link(x: <too deep>)))");

        let full = decode_value(bytes, None, FormatVersion::CURRENT).unwrap();
        assert_eq!(full, value);
        assert_eq!(full.to_string(), "Link(x: Link(x: Link(x: Link(x: 7))))");
    }

    #[test]
    fn set_field_transfers_owner() {
        let mut parent = decoded(simple());
        let child = CompositeValue::new(
            test_location(),
            "Child",
            CompositeKind::Structure,
            FieldMap::new(),
            Some(Address::from_u64(9)),
        );
        parent.set_field("child", Value::from(child)).unwrap();
        let child = parent.get_field("child").unwrap().and_then(Value::as_composite).unwrap();
        assert_eq!(child.owner(), Some(Address::from_u64(1)));
    }

    #[test]
    fn into_fields() {
        let fields = decoded(simple()).into_fields().unwrap();
        assert_eq!(fields.names().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn legacy_region_is_reserialized_not_passed_through() {
        let original = simple();
        let mut legacy = Writer::with_ruleset(Ruleset::V1);
        original.encode(&mut legacy).unwrap();
        let legacy = legacy.into_bytes();

        let value = decode_value(legacy.clone(), None, FormatVersion::V1).unwrap();
        let reencoded = encode_value(&value).unwrap();
        assert_ne!(reencoded, legacy);
        assert_eq!(reencoded, encode_value(&Value::from(original.clone())).unwrap());

        let current = decode_value(reencoded, None, FormatVersion::CURRENT).unwrap();
        assert_eq!(current, Value::from(original));
    }

    #[test]
    fn debug_does_not_load() {
        let value = decoded(simple());
        let debug = format!("{value:?}");
        assert!(debug.contains("content_len"));
        assert_eq!(value.load_state(), LoadState::Raw);
    }
}
