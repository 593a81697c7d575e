//! Instance population and mutation against a published schema.
//!
//! Construction is a single ordered pass over the declared fields, with an
//! unknown-key sweep over the raw input first. Every value, whether it
//! arrives in the initial mapping or through `set`/`append` later, goes
//! through the owning field descriptor's validate-and-prepare contract, so
//! an instance can never hold a value its schema would reject.
//!
//! Design points:
//! - Fail fast. The first offending field aborts construction; no partial
//!   instance escapes.
//! - Unknown keys are checked before any field work, in input order.
//! - A many field always holds a list. Absent input means empty list, and
//!   there is no nil-like placeholder an element can smuggle through.
//! - Reads are lenient (absent reads as `None` or an empty slice);
//!   mutations are strict and fail on undeclared names.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::PopulateError;
use crate::field::Cardinality;
use crate::kind::value_kind_name;
use crate::schema::{SchemaDefinition, SchemaRef};

// -------------------------------- Values ----------------------------------- //

/// Raw material for one field position: either plain JSON or an
/// already-built instance being attached to a composite field.
#[derive(Debug, Clone)]
pub enum RawValue {
    Json(Value),
    Instance(ModelInstance),
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        RawValue::Json(value)
    }
}

impl From<ModelInstance> for RawValue {
    fn from(instance: ModelInstance) -> Self {
        RawValue::Instance(instance)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Json(Value::from(value))
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Json(Value::from(value))
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Json(Value::from(value))
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Json(Value::from(value))
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Json(Value::from(value))
    }
}

/// A value actually held by an instance, after validation.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Scalar(Value),
    Instance(ModelInstance),
}

impl FieldValue {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            FieldValue::Scalar(value) => Some(value),
            FieldValue::Instance(_) => None,
        }
    }

    pub fn as_instance(&self) -> Option<&ModelInstance> {
        match self {
            FieldValue::Instance(instance) => Some(instance),
            FieldValue::Scalar(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_value().and_then(Value::as_i64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_value().and_then(Value::as_f64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_value().and_then(Value::as_bool)
    }
}

/// Storage for one populated field.
#[derive(Debug, Clone)]
enum Slot {
    One(FieldValue),
    Many(Vec<FieldValue>),
}

// ------------------------------- Instance ---------------------------------- //

/// A validated values container for one schema.
#[derive(Debug, Clone)]
pub struct ModelInstance {
    schema: SchemaRef,
    values: IndexMap<String, Slot>,
}

impl SchemaDefinition {
    /// Construct an instance of this schema from a raw mapping.
    ///
    /// Keys that match no declared field fail first, in input order. Then
    /// each declared field is populated in declaration order: single-value
    /// fields through validate-and-prepare, many fields by validating each
    /// element of the input sequence. An absent many field becomes an
    /// empty list; an absent (or null) required single field is an error.
    pub fn construct(&self, mut input: Map<String, Value>) -> Result<ModelInstance, PopulateError> {
        for key in input.keys() {
            if self.field(key).is_none() {
                return Err(PopulateError::UnknownField {
                    schema: self.name().to_string(),
                    field: key.clone(),
                });
            }
        }
        let mut values = IndexMap::with_capacity(self.len());
        for descriptor in self.fields() {
            let name = descriptor.name();
            match descriptor.cardinality() {
                Cardinality::One => {
                    let raw = input.remove(name).map(RawValue::Json);
                    if let Some(prepared) = descriptor.validate_and_prepare(raw)? {
                        values.insert(name.to_string(), Slot::One(prepared));
                    }
                }
                Cardinality::Many => {
                    let mut items = Vec::new();
                    match input.remove(name) {
                        None | Some(Value::Null) => {}
                        Some(Value::Array(elements)) => {
                            items.reserve(elements.len());
                            for (index, element) in elements.into_iter().enumerate() {
                                items.push(
                                    descriptor.prepare_element(index, RawValue::Json(element))?,
                                );
                            }
                        }
                        Some(other) => {
                            return Err(PopulateError::Cardinality {
                                schema: self.name().to_string(),
                                field: name.to_string(),
                                expected: "a sequence".to_string(),
                                given: value_kind_name(&other).to_string(),
                            });
                        }
                    }
                    values.insert(name.to_string(), Slot::Many(items));
                }
            }
        }
        Ok(ModelInstance {
            schema: self.self_ref(),
            values,
        })
    }
}

impl ModelInstance {
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Number of populated slots. Unset optional fields do not count;
    /// many fields always do, even when empty.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value of a single-valued field. `None` for unset optional
    /// fields, undeclared names, and many fields (use [`Self::items`]).
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        match self.values.get(name)? {
            Slot::One(value) => Some(value),
            Slot::Many(_) => None,
        }
    }

    /// The elements of a many field, empty for anything else.
    pub fn items(&self, name: &str) -> &[FieldValue] {
        match self.values.get(name) {
            Some(Slot::Many(items)) => items,
            _ => &[],
        }
    }

    /// Replace the value of a single-valued field, running the same
    /// validation as construction. Setting null clears an optional field
    /// and is `MissingField` on a required one. Many fields only change
    /// through [`Self::append`].
    pub fn set(&mut self, name: &str, value: impl Into<RawValue>) -> Result<(), PopulateError> {
        let descriptor =
            self.schema
                .field(name)
                .ok_or_else(|| PopulateError::UnknownField {
                    schema: self.schema.name().to_string(),
                    field: name.to_string(),
                })?;
        if descriptor.cardinality() == Cardinality::Many {
            return Err(PopulateError::Cardinality {
                schema: self.schema.name().to_string(),
                field: name.to_string(),
                expected: "appends on the many field".to_string(),
                given: "a whole-value assignment".to_string(),
            });
        }
        match descriptor.validate_and_prepare(Some(value.into()))? {
            Some(prepared) => {
                self.values.insert(name.to_string(), Slot::One(prepared));
            }
            None => {
                self.values.shift_remove(name);
            }
        }
        Ok(())
    }

    /// Append one element to a many field, validating it like any input
    /// element. Null is a value here and fails; appends on single-valued
    /// fields are cardinality errors.
    pub fn append(&mut self, name: &str, value: impl Into<RawValue>) -> Result<(), PopulateError> {
        let descriptor =
            self.schema
                .field(name)
                .ok_or_else(|| PopulateError::UnknownField {
                    schema: self.schema.name().to_string(),
                    field: name.to_string(),
                })?;
        if descriptor.cardinality() == Cardinality::One {
            return Err(PopulateError::Cardinality {
                schema: self.schema.name().to_string(),
                field: name.to_string(),
                expected: "a whole-value assignment via set".to_string(),
                given: "an append".to_string(),
            });
        }
        let index = match self.values.get(name) {
            Some(Slot::Many(items)) => items.len(),
            _ => 0,
        };
        let prepared = descriptor.prepare_element(index, value.into())?;
        match self.values.get_mut(name) {
            Some(Slot::Many(items)) => items.push(prepared),
            _ => {
                self.values
                    .insert(name.to_string(), Slot::Many(vec![prepared]));
            }
        }
        Ok(())
    }

    /// Serialize to a plain JSON value in declaration order. See
    /// [`crate::serialize::to_value`].
    pub fn to_value(&self) -> Value {
        crate::serialize::to_value(self)
    }

    /// Depth-first visit of every populated field value. See
    /// [`crate::serialize::traverse`].
    pub fn traverse<F>(&self, mut visitor: F)
    where
        F: FnMut(&str, &FieldValue),
    {
        crate::serialize::traverse(self, &mut visitor);
    }
}

impl serde::Serialize for ModelInstance {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_value().serialize(serializer)
    }
}
