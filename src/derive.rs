//! Derived schema documents.
//!
//! Two pure views over a published schema, both in declaration order and
//! stable across calls: a plain skeleton (field name to kind label) and a
//! JSON-Schema style document. Nested model types expand in place, so the
//! documents are self-contained. Neither view mentions optionality,
//! element constraints or descriptions; they describe shape only.

use serde_json::{json, Map, Value};

use crate::field::Cardinality;
use crate::registry::MappedType;
use crate::schema::SchemaDefinition;

/// Hash skeleton: `{ field: "kind", nested: { ... }, many: [shape] }`.
pub fn skeleton(schema: &SchemaDefinition) -> Value {
    let mut out = Map::new();
    for field in schema.fields() {
        let shape = match field.mapped() {
            MappedType::Scalar(kind) => Value::from(kind.label()),
            MappedType::Model(model) => skeleton(model),
        };
        let shape = match field.cardinality() {
            Cardinality::One => shape,
            Cardinality::Many => Value::Array(vec![shape]),
        };
        out.insert(field.name().to_string(), shape);
    }
    Value::Object(out)
}

/// JSON-Schema style document: every schema renders as
/// `{"type": "object", "properties": {...}}`, scalars as `{"type": label}`
/// and many fields as `{"type": "array", "items": shape}`.
pub fn json_schema(schema: &SchemaDefinition) -> Value {
    let mut properties = Map::new();
    for field in schema.fields() {
        let shape = match field.mapped() {
            MappedType::Scalar(kind) => json!({ "type": kind.label() }),
            MappedType::Model(model) => json_schema(model),
        };
        let shape = match field.cardinality() {
            Cardinality::One => shape,
            Cardinality::Many => json!({ "type": "array", "items": shape }),
        };
        properties.insert(field.name().to_string(), shape);
    }
    json!({ "type": "object", "properties": properties })
}

#[cfg(test)]
mod tests {
    use crate::field::FieldOptions;
    use crate::schema::{SchemaBuilder, SchemaRef};
    use serde_json::{json, Value};

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

    // order matters in both documents, so compare serialized text
    fn exact(actual: &Value, expected: &Value) {
        assert_eq!(actual, expected);
        assert_eq!(
            serde_json::to_string(actual).unwrap(),
            serde_json::to_string(expected).unwrap()
        );
    }

    #[test]
    fn skeleton_expands_nested_models_in_declaration_order() {
        let location = location_schema();
        exact(
            &location.skeleton(),
            &json!({
                "name": "string",
                "polygon": { "coords": [ { "lat": "number", "lng": "number" } ] },
                "sub_location_ids": [ "string" ],
            }),
        );
    }

    #[test]
    fn json_schema_wraps_each_level_as_an_object() {
        let location = location_schema();
        exact(
            &location.json_schema(),
            &json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "polygon": {
                        "type": "object",
                        "properties": {
                            "coords": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "lat": { "type": "number" },
                                        "lng": { "type": "number" },
                                    },
                                },
                            },
                        },
                    },
                    "sub_location_ids": {
                        "type": "array",
                        "items": { "type": "string" },
                    },
                },
            }),
        );
    }

    #[test]
    fn many_of_scalar_renders_a_singleton_shape() {
        let schema = SchemaBuilder::new("Bag")
            .many("ids", "integer", FieldOptions::new())
            .map(SchemaBuilder::build)
            .unwrap_or_else(|e| panic!("{e}"));
        exact(&schema.skeleton(), &json!({ "ids": ["integer"] }));
        exact(
            &schema.json_schema(),
            &json!({
                "type": "object",
                "properties": {
                    "ids": { "type": "array", "items": { "type": "integer" } },
                },
            }),
        );
    }

    #[test]
    fn optionality_and_element_constraints_are_invisible() {
        let schema = SchemaBuilder::new("S")
            .one("tags", "array", FieldOptions::new().optional().element("string"))
            .map(SchemaBuilder::build)
            .unwrap_or_else(|e| panic!("{e}"));
        exact(&schema.skeleton(), &json!({ "tags": "array" }));
        exact(
            &schema.json_schema(),
            &json!({
                "type": "object",
                "properties": { "tags": { "type": "array" } },
            }),
        );
    }

    #[test]
    fn derivations_are_pure_and_repeatable() {
        let location = location_schema();
        let first = location.json_schema();
        // deriving again, and constructing an instance in between, changes nothing
        let instance = location.construct(
            json!({ "name": "x", "polygon": { "coords": [] } })
                .as_object()
                .cloned()
                .unwrap(),
        );
        assert!(instance.is_ok());
        exact(&location.json_schema(), &first);
        exact(&location.skeleton(), &location.skeleton());
    }

    #[test]
    fn empty_schema_documents_are_empty_objects() {
        let schema = SchemaBuilder::new("Empty").build();
        exact(&schema.skeleton(), &json!({}));
        exact(
            &schema.json_schema(),
            &json!({ "type": "object", "properties": {} }),
        );
    }
}
