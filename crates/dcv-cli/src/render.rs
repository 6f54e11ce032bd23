use anyhow::bail;
use dcv_value::{CompositeValue, Value};
use serde_json::{json, Map};

/// JSON view of a value. Composites are decoded as they are visited.
///
/// Integers become JSON numbers; dictionaries become arrays of
/// `{"key", "value"}` pairs since their keys need not be strings. Values
/// nesting deeper than `max_depth` are refused.
pub fn value_to_json(value: &mut Value, max_depth: u32) -> anyhow::Result<serde_json::Value> {
    to_json(value, 0, max_depth)
}

/// JSON view of a composite's identity, plus its fields when asked.
pub fn composite_to_json(
    composite: &mut CompositeValue,
    with_fields: bool,
    max_depth: u32,
) -> anyhow::Result<serde_json::Value> {
    composite_at(composite, with_fields, 0, max_depth)
}

fn to_json(value: &mut Value, depth: u32, max_depth: u32) -> anyhow::Result<serde_json::Value> {
    if depth > max_depth {
        bail!("value nests deeper than {max_depth} levels");
    }
    Ok(match value {
        Value::Nil => serde_json::Value::Null,
        Value::Some(inner) => to_json(inner, depth + 1, max_depth)?,
        Value::Bool(b) => json!(b),
        Value::String(s) => json!(s),
        Value::Int(i) => json!(i),
        Value::UInt64(u) => json!(u),
        Value::Address(a) => json!(a.to_string()),
        Value::Array(items) => serde_json::Value::Array(
            items
                .iter_mut()
                .map(|item| to_json(item, depth + 1, max_depth))
                .collect::<anyhow::Result<_>>()?,
        ),
        Value::Dictionary(entries) => {
            let mut pairs = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                pairs.push(json!({
                    "key": to_json(key, depth + 1, max_depth)?,
                    "value": to_json(value, depth + 1, max_depth)?,
                }));
            }
            serde_json::Value::Array(pairs)
        }
        Value::Composite(c) => composite_at(c, true, depth, max_depth)?,
    })
}

fn composite_at(
    composite: &mut CompositeValue,
    with_fields: bool,
    depth: u32,
    max_depth: u32,
) -> anyhow::Result<serde_json::Value> {
    let mut out = Map::new();
    out.insert("type_id".into(), json!(composite.type_id()?));
    out.insert("kind".into(), json!(composite.kind()?.to_string()));
    out.insert("location".into(), json!(composite.location()?.to_string()));
    if with_fields {
        // Walk a copy so rendering never marks the original as modified.
        let mut fields = Map::new();
        for (name, mut field) in composite.clone().into_fields()? {
            fields.insert(name, to_json(&mut field, depth + 1, max_depth)?);
        }
        out.insert("fields".into(), serde_json::Value::Object(fields));
    }
    Ok(serde_json::Value::Object(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcv_codec::FormatVersion;
    use dcv_types::{CompositeKind, Location};
    use dcv_value::{decode_value, encode_value, FieldMap, LoadState};

    const MAX_DEPTH: u32 = 128;

    fn decoded_sample() -> Value {
        let bytes = encode_value(&crate::sample::person()).unwrap();
        decode_value(bytes, None, FormatVersion::CURRENT).unwrap()
    }

    #[test]
    fn identity_only() {
        let mut value = decoded_sample();
        let composite = value.as_composite_mut().unwrap();
        let json = composite_to_json(composite, false, MAX_DEPTH).unwrap();
        assert_eq!(json["type_id"], "A.0000000000000001.People.Person");
        assert_eq!(json["kind"], "resource");
        assert!(json.get("fields").is_none());
        assert_eq!(composite.load_state(), LoadState::IdentityLoaded);
    }

    #[test]
    fn fields_in_order() {
        let mut value = decoded_sample();
        let json = value_to_json(&mut value, MAX_DEPTH).unwrap();
        let fields = json["fields"].as_object().unwrap();
        assert_eq!(
            fields.keys().map(String::as_str).collect::<Vec<_>>(),
            ["fname", "lname", "age", "status", "tags", "nickname", "address"]
        );
        assert_eq!(fields["age"], 30);
        assert_eq!(fields["nickname"], serde_json::Value::Null);
        assert_eq!(fields["tags"], json!(["admin", "owner"]));
        assert_eq!(fields["address"]["fields"]["city"], "Springfield");
        assert!(!value.as_composite().unwrap().is_modified());
    }

    #[test]
    fn dictionary_pairs() {
        let mut value = Value::Dictionary(vec![(Value::Int(1), Value::Bool(true))]);
        assert_eq!(
            value_to_json(&mut value, MAX_DEPTH).unwrap(),
            json!([{"key": 1, "value": true}])
        );
    }

    #[test]
    fn deep_nesting_is_refused() {
        let mut chain = Value::Int(0);
        for _ in 0..10 {
            chain = Value::from(CompositeValue::new(
                Location::Identifier("t".into()),
                "Link",
                CompositeKind::Structure,
                FieldMap::from_iter([("x", chain)]),
                None,
            ));
        }
        let bytes = encode_value(&chain).unwrap();
        let mut value = decode_value(bytes, None, FormatVersion::CURRENT).unwrap();

        let err = value_to_json(&mut value, 4).unwrap_err();
        assert!(err.to_string().contains("deeper than 4"));

        let json = value_to_json(&mut value, 10).unwrap();
        assert_eq!(json["type_id"], "I.t.Link");
    }
}
