//! Error taxonomy: declaration-time vs population-time failures.

use thiserror::Error;

/// Errors raised while declaring a schema.
///
/// Schemas are normally declared once during process startup, so these are
/// effectively fatal: a schema that fails to declare never exists.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The declared type token is neither a registered scalar kind nor a
    /// model type.
    #[error("schema '{schema}': field '{field}' declares '{declared}', which is not a registered type name or a model type")]
    UnknownType {
        schema: String,
        field: String,
        declared: String,
    },

    /// Two fields were declared with the same name on one schema.
    #[error("schema '{schema}' already declares a field named '{field}'")]
    FieldNameCollision { schema: String, field: String },

    /// An array element constraint resolved to a model type. Element
    /// constraints restrict the scalar kind of array elements; a composite
    /// element type belongs in a many-of-model field instead.
    #[error("schema '{schema}': field '{field}' element constraint '{declared}' is not a scalar kind")]
    ElementNotScalar {
        schema: String,
        field: String,
        declared: String,
    },
}

/// Errors raised while populating or mutating an instance.
///
/// All of these are fail-fast: the first offending field aborts the whole
/// construction and no partial instance escapes. The `field` member may
/// carry an element path such as `coords[1]` when the offender is a single
/// element of a sequence.
#[derive(Debug, Error)]
pub enum PopulateError {
    /// A required field was absent from the input (or explicitly null).
    #[error("schema '{schema}': required field '{field}' is missing")]
    MissingField { schema: String, field: String },

    /// The value's runtime representation does not match the field's
    /// resolved kind, and no permissive cast rule applied.
    #[error("schema '{schema}': field '{field}' expects {expected}, got {given}")]
    TypeKind {
        schema: String,
        field: String,
        expected: String,
        given: String,
    },

    /// Wrong shape for the field's cardinality: a many field given a
    /// non-sequence, a single-value field given a sequence, or `set`/`append`
    /// used against the opposite cardinality.
    #[error("schema '{schema}': field '{field}' expects {expected}, got {given}")]
    Cardinality {
        schema: String,
        field: String,
        expected: String,
        given: String,
    },

    /// A composite field was given something that is neither an instance of
    /// the expected model type nor a plain mapping.
    #[error("schema '{schema}': field '{field}' must be populated with a mapping or an instance of '{expected_schema}', got {given}")]
    NestedAssignment {
        schema: String,
        field: String,
        expected_schema: String,
        given: String,
    },

    /// The input mapping contains a key with no matching declared field.
    #[error("schema '{schema}' has no field named '{field}'")]
    UnknownField { schema: String, field: String },
}
