//! Instance serialization and traversal.

use serde_json::{Map, Value};

use crate::field::Cardinality;
use crate::instance::{FieldValue, ModelInstance};

/// Serialize an instance to a plain JSON object.
///
/// Fields appear in declaration order regardless of input or mutation
/// order. Unset single-value fields serialize as null, many fields as
/// arrays (empty when unpopulated), and nested instances recurse.
pub fn to_value(instance: &ModelInstance) -> Value {
    let mut out = Map::new();
    for field in instance.schema().fields() {
        let name = field.name();
        let value = match field.cardinality() {
            Cardinality::One => match instance.get(name) {
                Some(value) => render(value),
                None => Value::Null,
            },
            Cardinality::Many => {
                Value::Array(instance.items(name).iter().map(render).collect())
            }
        };
        out.insert(name.to_string(), value);
    }
    Value::Object(out)
}

fn render(value: &FieldValue) -> Value {
    match value {
        FieldValue::Scalar(value) => value.clone(),
        FieldValue::Instance(instance) => to_value(instance),
    }
}

/// Depth-first walk over every populated field value.
///
/// The visitor sees `(field_name, value)` pairs: fields in declaration
/// order, each many element in list order, and a nested instance's own
/// fields immediately after the instance value itself. Unset optional
/// fields are skipped. Schema graphs are acyclic (a model type exists
/// only after its builder finished), so the walk always terminates.
pub fn traverse(instance: &ModelInstance, visitor: &mut dyn FnMut(&str, &FieldValue)) {
    for field in instance.schema().fields() {
        let name = field.name();
        match field.cardinality() {
            Cardinality::One => {
                if let Some(value) = instance.get(name) {
                    visitor(name, value);
                    if let FieldValue::Instance(nested) = value {
                        traverse(nested, visitor);
                    }
                }
            }
            Cardinality::Many => {
                for element in instance.items(name) {
                    visitor(name, element);
                    if let FieldValue::Instance(nested) = element {
                        traverse(nested, visitor);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldOptions;
    use crate::schema::{SchemaBuilder, SchemaRef};
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(mapping) => mapping,
            other => panic!("fixture must be an object, got {other}"),
        }
    }

    fn location_schema() -> SchemaRef {
        let coord = SchemaBuilder::new("Coord")
            .one("lat", "number", FieldOptions::new())
            .and_then(|b| b.one("lng", "number", FieldOptions::new()))
            .map(SchemaBuilder::build)
            .unwrap_or_else(|e| panic!("{e}"));
        let polygon = SchemaBuilder::new("Polygon")
            .many("coords", &coord, FieldOptions::new())
            .map(SchemaBuilder::build)
            .unwrap_or_else(|e| panic!("{e}"));
        SchemaBuilder::new("Location")
            .one("name", "string", FieldOptions::new())
            .and_then(|b| b.one("polygon", &polygon, FieldOptions::new()))
            .and_then(|b| b.many("sub_location_ids", "string", FieldOptions::new()))
            .map(SchemaBuilder::build)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn serializes_the_populated_tree_in_declaration_order() {
        let location = location_schema();
        let mut instance = location
            .construct(obj(json!({
                "name": "Nowhere",
                "polygon": {
                    "coords": [
                        { "lat": 1.0, "lng": 2.0 },
                        { "lat": 10.0, "lng": 21.0 },
                    ],
                },
            })))
            .unwrap_or_else(|e| panic!("{e}"));
        // the untouched many field serializes as an empty list, not null
        assert_eq!(instance.to_value()["sub_location_ids"], json!([]));
        instance
            .append("sub_location_ids", "one")
            .unwrap_or_else(|e| panic!("{e}"));

        let expected = json!({
            "name": "Nowhere",
            "polygon": {
                "coords": [
                    { "lat": 1.0, "lng": 2.0 },
                    { "lat": 10.0, "lng": 21.0 },
                ],
            },
            "sub_location_ids": ["one"],
        });
        let actual = instance.to_value();
        assert_eq!(actual, expected);
        // declaration order is part of the contract
        assert_eq!(
            serde_json::to_string(&actual).unwrap(),
            serde_json::to_string(&expected).unwrap()
        );
    }

    #[test]
    fn input_order_does_not_leak_into_the_output() {
        let location = location_schema();
        let instance = location
            .construct(obj(json!({
                "sub_location_ids": ["a"],
                "polygon": { "coords": [] },
                "name": "Nowhere",
            })))
            .unwrap_or_else(|e| panic!("{e}"));
        let keys: Vec<String> = match instance.to_value() {
            Value::Object(map) => map.keys().cloned().collect(),
            other => panic!("expected an object, got {other}"),
        };
        assert_eq!(keys, ["name", "polygon", "sub_location_ids"]);
    }

    #[test]
    fn unset_optional_fields_serialize_as_null() {
        let schema = SchemaBuilder::new("Note")
            .one("title", "string", FieldOptions::new())
            .and_then(|b| b.one("body", "string", FieldOptions::new().optional()))
            .map(SchemaBuilder::build)
            .unwrap_or_else(|e| panic!("{e}"));
        let note = schema
            .construct(obj(json!({ "title": "t" })))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(note.to_value(), json!({ "title": "t", "body": null }));
    }

    // walk a skeleton and a serialized instance together: same keys in the
    // same order, labels standing in for values, lists matching lists
    fn assert_matches_skeleton(skeleton: &Value, value: &Value) {
        match (skeleton, value) {
            (Value::Object(shape), Value::Object(actual)) => {
                let shape_keys: Vec<&String> = shape.keys().collect();
                let actual_keys: Vec<&String> = actual.keys().collect();
                assert_eq!(shape_keys, actual_keys);
                for (key, nested) in shape {
                    assert_matches_skeleton(nested, &actual[key]);
                }
            }
            (Value::Array(shape), Value::Array(items)) => {
                let element = &shape[0];
                for item in items {
                    assert_matches_skeleton(element, item);
                }
            }
            (Value::String(label), actual) => match label.as_str() {
                "number" => assert!(actual.is_number() || actual.is_null()),
                "integer" => assert!(actual.is_i64() || actual.is_u64() || actual.is_null()),
                "string" => assert!(actual.is_string() || actual.is_null()),
                "boolean" => assert!(actual.is_boolean() || actual.is_null()),
                "array" => assert!(actual.is_array() || actual.is_null()),
                other => panic!("unexpected skeleton label: {other}"),
            },
            (shape, actual) => panic!("shape mismatch: {shape} vs {actual}"),
        }
    }

    #[test]
    fn serialized_output_follows_the_skeleton_shape() {
        let location = location_schema();
        let instance = location
            .construct(obj(json!({
                "name": "Nowhere",
                "polygon": {
                    "coords": [
                        { "lat": 1.0, "lng": 2.0 },
                        { "lat": 10.0, "lng": 21.0 },
                    ],
                },
                "sub_location_ids": ["a", "b", "c"],
            })))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_matches_skeleton(&location.skeleton(), &instance.to_value());
    }

    #[test]
    fn serialized_instances_reconstruct_to_the_same_value() {
        let location = location_schema();
        let input = json!({
            "name": "Nowhere",
            "polygon": { "coords": [ { "lat": 1.0, "lng": 2.0 } ] },
            "sub_location_ids": ["a", "b"],
        });
        let instance = location
            .construct(obj(input.clone()))
            .unwrap_or_else(|e| panic!("{e}"));
        let serialized = instance.to_value();
        assert_eq!(serialized, input);
        let again = location
            .construct(obj(serialized.clone()))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(again.to_value(), serialized);
    }

    #[test]
    fn serde_serialize_goes_through_to_value() {
        let location = location_schema();
        let instance = location
            .construct(obj(json!({
                "name": "Nowhere",
                "polygon": { "coords": [] },
            })))
            .unwrap_or_else(|e| panic!("{e}"));
        let via_serde = serde_json::to_string(&instance).unwrap();
        let via_value = serde_json::to_string(&instance.to_value()).unwrap();
        assert_eq!(via_serde, via_value);
    }

    #[test]
    fn traversal_visits_depth_first_in_declaration_order() {
        let location = location_schema();
        let mut instance = location
            .construct(obj(json!({
                "name": "Nowhere",
                "polygon": {
                    "coords": [
                        { "lat": 1.0, "lng": 2.0 },
                        { "lat": 10.0, "lng": 21.0 },
                    ],
                },
            })))
            .unwrap_or_else(|e| panic!("{e}"));
        instance
            .append("sub_location_ids", "one")
            .unwrap_or_else(|e| panic!("{e}"));

        let mut seen = Vec::new();
        instance.traverse(|name, value| {
            let rendered = match value {
                FieldValue::Scalar(v) => v.to_string(),
                FieldValue::Instance(i) => format!("<{}>", i.schema().name()),
            };
            seen.push(format!("{name}={rendered}"));
        });
        assert_eq!(
            seen,
            [
                "name=\"Nowhere\"",
                "polygon=<Polygon>",
                "coords=<Coord>",
                "lat=1.0",
                "lng=2.0",
                "coords=<Coord>",
                "lat=10.0",
                "lng=21.0",
                "sub_location_ids=\"one\"",
            ]
        );
    }

    #[test]
    fn traversal_skips_unset_optional_fields() {
        let schema = SchemaBuilder::new("Note")
            .one("title", "string", FieldOptions::new())
            .and_then(|b| b.one("body", "string", FieldOptions::new().optional()))
            .map(SchemaBuilder::build)
            .unwrap_or_else(|e| panic!("{e}"));
        let note = schema
            .construct(obj(json!({ "title": "t" })))
            .unwrap_or_else(|e| panic!("{e}"));
        let mut names = Vec::new();
        note.traverse(|name, _| names.push(name.to_string()));
        assert_eq!(names, ["title"]);
    }
}
