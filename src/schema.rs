//! Schema declaration and the frozen definition it produces.
//!
//! Declaration is a consuming builder: each `one`/`many` call resolves the
//! field's type immediately and fails fast on bad declarations. `build`
//! publishes the result as a shared, immutable [`SchemaRef`]; nothing can
//! add fields afterwards. Because a model type can only be referenced once
//! its builder has finished, schema graphs are acyclic by construction and
//! every recursive walk over them terminates.

use std::sync::{Arc, Weak};

use indexmap::IndexMap;

use crate::derive;
use crate::describe::Description;
use crate::error::SchemaError;
use crate::field::{Cardinality, FieldDescriptor, FieldOptions};
use crate::registry::{DeclaredType, TypeRegistry};

/// Shared handle to a published schema. Field types, instance schemas and
/// registries all hold these; identity (pointer) equality is what "same
/// model type" means at population time.
pub type SchemaRef = Arc<SchemaDefinition>;

/// A named, ordered, immutable set of field descriptors.
#[derive(Debug)]
pub struct SchemaDefinition {
    name: String,
    fields: IndexMap<String, FieldDescriptor>,
    description: Description,
    /// Back-reference to the Arc this definition lives in, so `&self`
    /// methods can hand out owning handles.
    self_ref: Weak<SchemaDefinition>,
}

impl SchemaDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning handle to this definition. Definitions only ever exist
    /// behind a [`SchemaRef`], so the upgrade cannot fail.
    pub(crate) fn self_ref(&self) -> SchemaRef {
        self.self_ref
            .upgrade()
            .expect("schema definitions live behind a SchemaRef")
    }

    /// Schema-level description, if declared. Deferred providers run on
    /// first read.
    pub fn description(&self) -> Option<&str> {
        self.description.get()
    }

    /// Descriptors in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Plain skeleton document: field names mapped to kind labels, nested
    /// models expanded in place.
    pub fn skeleton(&self) -> serde_json::Value {
        derive::skeleton(self)
    }

    /// JSON-Schema style document for this schema.
    pub fn json_schema(&self) -> serde_json::Value {
        derive::json_schema(self)
    }
}

// ------------------------------- Builder ----------------------------------- //

/// Declares a schema field by field, then publishes it.
///
/// ```
/// use modelkit::{FieldOptions, SchemaBuilder};
///
/// let coord = SchemaBuilder::new("Coord")
///     .one("lat", "number", FieldOptions::new())?
///     .one("lng", "number", FieldOptions::new())?
///     .build();
/// let polygon = SchemaBuilder::new("Polygon")
///     .many("coords", &coord, FieldOptions::new())?
///     .build();
/// assert_eq!(polygon.field("coords").and_then(|f| f.mapped().as_model()).map(|m| m.name()), Some("Coord"));
/// # Ok::<(), modelkit::SchemaError>(())
/// ```
#[derive(Debug)]
pub struct SchemaBuilder<'reg> {
    registry: &'reg TypeRegistry,
    name: String,
    fields: IndexMap<String, FieldDescriptor>,
    description: Description,
}

impl SchemaBuilder<'static> {
    /// A builder resolving type names against the built-in registry.
    pub fn new(name: impl Into<String>) -> SchemaBuilder<'static> {
        SchemaBuilder::with_registry(name, TypeRegistry::builtin())
    }
}

impl<'reg> SchemaBuilder<'reg> {
    pub fn with_registry(name: impl Into<String>, registry: &'reg TypeRegistry) -> Self {
        SchemaBuilder {
            registry,
            name: name.into(),
            fields: IndexMap::new(),
            description: Description::none(),
        }
    }

    /// Attach fixed description text to the schema itself.
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Description::eager(text);
        self
    }

    /// Attach a deferred schema description, run at most once on first read.
    pub fn describe_with(
        mut self,
        provider: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        self.description = Description::deferred(provider);
        self
    }

    /// Declare a single-valued field.
    pub fn one(
        self,
        name: impl Into<String>,
        ty: impl Into<DeclaredType>,
        options: FieldOptions,
    ) -> Result<Self, SchemaError> {
        self.declare(name.into(), ty.into(), Cardinality::One, options)
    }

    /// Declare a multi-valued field.
    pub fn many(
        self,
        name: impl Into<String>,
        ty: impl Into<DeclaredType>,
        options: FieldOptions,
    ) -> Result<Self, SchemaError> {
        self.declare(name.into(), ty.into(), Cardinality::Many, options)
    }

    fn declare(
        mut self,
        name: String,
        declared: DeclaredType,
        cardinality: Cardinality,
        options: FieldOptions,
    ) -> Result<Self, SchemaError> {
        if self.fields.contains_key(&name) {
            return Err(SchemaError::FieldNameCollision {
                schema: self.name.clone(),
                field: name,
            });
        }
        let descriptor = FieldDescriptor::resolve(
            self.registry,
            &self.name,
            &name,
            declared,
            cardinality,
            options,
        )?;
        self.fields.insert(name, descriptor);
        Ok(self)
    }

    /// Publish the schema. After this the definition is frozen; the only
    /// way to get a different shape is to build a new schema.
    pub fn build(self) -> SchemaRef {
        Arc::new_cyclic(|self_ref| SchemaDefinition {
            name: self.name,
            fields: self.fields,
            description: self.description,
            self_ref: self_ref.clone(),
        })
    }
}
