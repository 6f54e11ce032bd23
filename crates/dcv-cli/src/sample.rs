use dcv_types::{Address, CompositeKind, Location};
use dcv_value::{CompositeValue, FieldMap, Value};

/// A `Person` resource with a nested `Address` structure.
pub fn person() -> Value {
    let location = Location::Address {
        address: Address::from_u64(1),
        name: "People".into(),
    };
    let address = CompositeValue::new(
        location.clone(),
        "People.Address",
        CompositeKind::Structure,
        FieldMap::from_iter([
            ("street", Value::from("Main St")),
            ("city", Value::from("Springfield")),
            ("state", Value::from("Oregon")),
            ("country", Value::from("USA")),
        ]),
        None,
    );
    Value::from(CompositeValue::new(
        location,
        "People.Person",
        CompositeKind::Resource,
        FieldMap::from_iter([
            ("fname", Value::from("John")),
            ("lname", Value::from("Smith")),
            ("age", Value::Int(30)),
            ("status", Value::from("red")),
            ("tags", Value::Array(vec![Value::from("admin"), Value::from("owner")])),
            ("nickname", Value::from(None::<&str>)),
            ("address", Value::from(address)),
        ]),
        None,
    ))
}
