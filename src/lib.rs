//! Declarative typed schemas for JSON-shaped records.
//!
//! A schema is declared once through a builder, published as an immutable
//! shared definition, and then used three ways: constructing validated
//! instances from raw mappings, deriving schema documents (a plain
//! skeleton and a JSON-Schema style doc), and serializing instances back
//! to plain data in declaration order.
//!
//! ```
//! use modelkit::{FieldOptions, SchemaBuilder};
//! use serde_json::{json, Map, Value};
//!
//! let coord = SchemaBuilder::new("Coord")
//!     .one("lat", "number", FieldOptions::new())?
//!     .one("lng", "number", FieldOptions::new())?
//!     .build();
//! let polygon = SchemaBuilder::new("Polygon")
//!     .many("coords", &coord, FieldOptions::new())?
//!     .build();
//!
//! let input: Map<String, Value> = serde_json::from_value(json!({
//!     "coords": [ { "lat": 1.0, "lng": 2.0 } ],
//! }))?;
//! let shape = polygon.construct(input)?;
//! assert_eq!(shape.to_value(), json!({ "coords": [ { "lat": 1.0, "lng": 2.0 } ] }));
//! assert_eq!(polygon.skeleton(), json!({ "coords": [ { "lat": "number", "lng": "number" } ] }));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod derive;
pub mod describe;
pub mod error;
pub mod field;
pub mod instance;
pub mod kind;
pub mod registry;
pub mod schema;
pub mod serialize;

pub use error::{PopulateError, SchemaError};
pub use field::{Cardinality, FieldDescriptor, FieldOptions};
pub use instance::{FieldValue, ModelInstance, RawValue};
pub use kind::ScalarKind;
pub use registry::{DeclaredType, MappedType, TypeRegistry};
pub use schema::{SchemaBuilder, SchemaDefinition, SchemaRef};
