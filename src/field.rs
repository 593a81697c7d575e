//! Field descriptors: one declared field, fully resolved.
//!
//! A descriptor owns everything needed to admit, cast, or reject a raw
//! value for its field, and is the single place those rules live. Both
//! construction and later mutation route every value through
//! [`FieldDescriptor::validate_and_prepare`].

use std::sync::Arc;

use serde_json::Value;

use crate::describe::Description;
use crate::error::{PopulateError, SchemaError};
use crate::instance::{FieldValue, RawValue};
use crate::kind::{value_kind_name, ScalarKind};
use crate::registry::{DeclaredType, MappedType, TypeRegistry};
use crate::schema::SchemaRef;

/// How many values a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    One,
    Many,
}

// -------------------------- Declaration options ---------------------------- //

/// Per-field declaration options, consumed by the schema builder.
///
/// ```
/// use modelkit::FieldOptions;
///
/// let opts = FieldOptions::new()
///     .optional()
///     .describe("free-form tags");
/// # let _ = opts;
/// ```
#[derive(Debug, Default)]
pub struct FieldOptions {
    pub(crate) optional: bool,
    pub(crate) element: Option<DeclaredType>,
    pub(crate) description: Description,
}

impl FieldOptions {
    pub fn new() -> Self {
        FieldOptions {
            optional: false,
            element: None,
            description: Description::none(),
        }
    }

    /// Absence of this field is not an error.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Constrain the elements of an array-kind value to a scalar kind.
    /// Only meaningful on fields whose resolved kind is `array`.
    pub fn element(mut self, ty: impl Into<DeclaredType>) -> Self {
        self.element = Some(ty.into());
        self
    }

    /// Attach fixed description text.
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Description::eager(text);
        self
    }

    /// Attach a description provider that runs at most once, on first read.
    pub fn describe_with(mut self, provider: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.description = Description::deferred(provider);
        self
    }
}

// ------------------------------ Descriptor --------------------------------- //

#[derive(Debug)]
pub struct FieldDescriptor {
    /// Owning schema name, carried for error messages.
    schema_name: String,
    name: String,
    declared: DeclaredType,
    mapped: MappedType,
    cardinality: Cardinality,
    optional: bool,
    element: Option<ScalarKind>,
    description: Description,
}

impl FieldDescriptor {
    /// Resolve a declaration into a descriptor. Fails when the declared
    /// type (or element constraint) does not resolve; an element
    /// constraint must resolve to a scalar kind.
    pub(crate) fn resolve(
        registry: &TypeRegistry,
        schema_name: &str,
        name: &str,
        declared: DeclaredType,
        cardinality: Cardinality,
        options: FieldOptions,
    ) -> Result<Self, SchemaError> {
        let mapped = registry.resolve(schema_name, name, &declared)?;
        let element = match options.element {
            None => None,
            Some(constraint) => match registry.resolve(schema_name, name, &constraint)? {
                MappedType::Scalar(kind) => Some(kind),
                MappedType::Model(model) => {
                    return Err(SchemaError::ElementNotScalar {
                        schema: schema_name.to_string(),
                        field: name.to_string(),
                        declared: model.name().to_string(),
                    });
                }
            },
        };
        Ok(FieldDescriptor {
            schema_name: schema_name.to_string(),
            name: name.to_string(),
            declared,
            mapped,
            cardinality,
            optional: options.optional,
            element,
            description: options.description,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared(&self) -> &DeclaredType {
        &self.declared
    }

    pub fn mapped(&self) -> &MappedType {
        &self.mapped
    }

    pub fn is_scalar(&self) -> bool {
        self.mapped.is_scalar()
    }

    /// The scalar kind's name, or "object" for model fields.
    pub fn label(&self) -> &'static str {
        self.mapped.label()
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn element_kind(&self) -> Option<ScalarKind> {
        self.element
    }

    pub fn description(&self) -> Option<&str> {
        self.description.get()
    }

    // -------------------- value contract --------------------

    /// Validate and cast one raw value sitting in this field's single-value
    /// position. `None` input means the key was absent; an explicit JSON
    /// null in field position is treated the same way. Absence yields
    /// `Ok(None)` for optional fields and `MissingField` otherwise.
    pub fn validate_and_prepare(
        &self,
        raw: Option<RawValue>,
    ) -> Result<Option<FieldValue>, PopulateError> {
        let raw = match raw {
            None | Some(RawValue::Json(Value::Null)) => {
                return if self.optional {
                    Ok(None)
                } else {
                    Err(PopulateError::MissingField {
                        schema: self.schema_name.clone(),
                        field: self.name.clone(),
                    })
                };
            }
            Some(raw) => raw,
        };
        // a sequence in single-value position is a cardinality problem,
        // not a kind problem, unless the field's own kind is array
        if let (RawValue::Json(Value::Array(_)), MappedType::Scalar(kind)) = (&raw, &self.mapped) {
            if *kind != ScalarKind::Array {
                return Err(PopulateError::Cardinality {
                    schema: self.schema_name.clone(),
                    field: self.name.clone(),
                    expected: format!("a single {} value", kind.label()),
                    given: "a sequence".to_string(),
                });
            }
        }
        self.prepare_value(raw, &self.name).map(Some)
    }

    /// Validate one element of a many field. Errors name the element by
    /// path, e.g. `coords[1]`. Null elements are values here, not absence,
    /// and fail like any other mismatched value.
    pub(crate) fn prepare_element(
        &self,
        index: usize,
        raw: RawValue,
    ) -> Result<FieldValue, PopulateError> {
        let label = format!("{}[{}]", self.name, index);
        self.prepare_value(raw, &label)
    }

    fn prepare_value(&self, raw: RawValue, label: &str) -> Result<FieldValue, PopulateError> {
        match &self.mapped {
            MappedType::Scalar(kind) => self.prepare_scalar(*kind, raw, label),
            MappedType::Model(model) => self.prepare_model(model, raw, label),
        }
    }

    fn prepare_scalar(
        &self,
        kind: ScalarKind,
        raw: RawValue,
        label: &str,
    ) -> Result<FieldValue, PopulateError> {
        let value = match raw {
            RawValue::Json(value) => value,
            RawValue::Instance(instance) => {
                return Err(PopulateError::TypeKind {
                    schema: self.schema_name.clone(),
                    field: label.to_string(),
                    expected: kind.label().to_string(),
                    given: format!("an instance of '{}'", instance.schema().name()),
                });
            }
        };
        let value = kind.cast(value).map_err(|rejected| PopulateError::TypeKind {
            schema: self.schema_name.clone(),
            field: label.to_string(),
            expected: kind.label().to_string(),
            given: value_kind_name(&rejected).to_string(),
        })?;
        match (self.element, value) {
            (Some(element_kind), Value::Array(items)) => {
                let mut cast_items = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    let item =
                        element_kind
                            .cast(item)
                            .map_err(|rejected| PopulateError::TypeKind {
                                schema: self.schema_name.clone(),
                                field: format!("{label}[{index}]"),
                                expected: element_kind.label().to_string(),
                                given: value_kind_name(&rejected).to_string(),
                            })?;
                    cast_items.push(item);
                }
                Ok(FieldValue::Scalar(Value::Array(cast_items)))
            }
            (_, value) => Ok(FieldValue::Scalar(value)),
        }
    }

    fn prepare_model(
        &self,
        model: &SchemaRef,
        raw: RawValue,
        label: &str,
    ) -> Result<FieldValue, PopulateError> {
        match raw {
            RawValue::Instance(instance) => {
                // identity matters here: an instance passes through only
                // when its schema is the very definition this field names
                if Arc::ptr_eq(instance.schema(), model) {
                    Ok(FieldValue::Instance(instance))
                } else {
                    Err(PopulateError::NestedAssignment {
                        schema: self.schema_name.clone(),
                        field: label.to_string(),
                        expected_schema: model.name().to_string(),
                        given: format!("an instance of '{}'", instance.schema().name()),
                    })
                }
            }
            RawValue::Json(Value::Object(mapping)) => {
                let nested = model.construct(mapping)?;
                Ok(FieldValue::Instance(nested))
            }
            RawValue::Json(other) => Err(PopulateError::NestedAssignment {
                schema: self.schema_name.clone(),
                field: label.to_string(),
                expected_schema: model.name().to_string(),
                given: value_kind_name(&other).to_string(),
            }),
        }
    }
}
