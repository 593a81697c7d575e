//! Type name resolution: declared tokens to resolved kinds.
//!
//! A declaration names its field types either by registry token ("string",
//! "number", ...) or by handing over an already-built model schema. The
//! registry owns the token side of that mapping. The built-in registry is
//! process-wide and read-only; callers that want extra aliases build their
//! own registry and pass it to the schema builder.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::error::SchemaError;
use crate::kind::ScalarKind;
use crate::schema::SchemaRef;

// --------------------------- Declared types ------------------------------- //

/// A field type exactly as the declaration wrote it, before resolution.
#[derive(Clone)]
pub enum DeclaredType {
    /// A type named by registry token.
    Named(String),
    /// A composite type, referenced by its built schema.
    Model(SchemaRef),
}

impl fmt::Debug for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Named(name) => write!(f, "Named({name:?})"),
            DeclaredType::Model(schema) => write!(f, "Model({})", schema.name()),
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Named(name) => f.write_str(name),
            DeclaredType::Model(schema) => f.write_str(schema.name()),
        }
    }
}

impl From<&str> for DeclaredType {
    fn from(name: &str) -> Self {
        DeclaredType::Named(name.to_string())
    }
}

impl From<String> for DeclaredType {
    fn from(name: String) -> Self {
        DeclaredType::Named(name)
    }
}

impl From<ScalarKind> for DeclaredType {
    fn from(kind: ScalarKind) -> Self {
        DeclaredType::Named(kind.label().to_string())
    }
}

impl From<SchemaRef> for DeclaredType {
    fn from(schema: SchemaRef) -> Self {
        DeclaredType::Model(schema)
    }
}

impl From<&SchemaRef> for DeclaredType {
    fn from(schema: &SchemaRef) -> Self {
        DeclaredType::Model(Arc::clone(schema))
    }
}

/// What a declared type resolved to.
#[derive(Clone)]
pub enum MappedType {
    Scalar(ScalarKind),
    Model(SchemaRef),
}

impl MappedType {
    pub fn is_scalar(&self) -> bool {
        matches!(self, MappedType::Scalar(_))
    }

    /// Label used by derived schema documents: the scalar kind's name, or
    /// "object" for composites.
    pub fn label(&self) -> &'static str {
        match self {
            MappedType::Scalar(kind) => kind.label(),
            MappedType::Model(_) => "object",
        }
    }

    pub fn as_model(&self) -> Option<&SchemaRef> {
        match self {
            MappedType::Model(schema) => Some(schema),
            MappedType::Scalar(_) => None,
        }
    }
}

impl fmt::Debug for MappedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappedType::Scalar(kind) => write!(f, "Scalar({kind:?})"),
            MappedType::Model(schema) => write!(f, "Model({})", schema.name()),
        }
    }
}

// ------------------------------ Registry ----------------------------------- //

static BUILTIN: Lazy<TypeRegistry> = Lazy::new(|| {
    let mut names = IndexMap::new();
    for kind in [
        ScalarKind::Integer,
        ScalarKind::Number,
        ScalarKind::String,
        ScalarKind::Boolean,
        ScalarKind::Array,
    ] {
        names.insert(kind.label().to_string(), kind);
    }
    TypeRegistry { names }
});

/// Maps external type tokens to scalar kinds.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    names: IndexMap<String, ScalarKind>,
}

impl TypeRegistry {
    /// The shared read-only registry holding exactly the built-in kinds.
    pub fn builtin() -> &'static TypeRegistry {
        &BUILTIN
    }

    /// A private copy of the built-in registry, ready for extra aliases.
    pub fn custom() -> TypeRegistry {
        BUILTIN.clone()
    }

    /// Register `name` as another token for `kind`. Re-aliasing an existing
    /// token rebinds it.
    pub fn alias(mut self, name: impl Into<String>, kind: ScalarKind) -> Self {
        self.names.insert(name.into(), kind);
        self
    }

    pub fn lookup(&self, name: &str) -> Option<ScalarKind> {
        self.names.get(name).copied()
    }

    /// Resolve a declared type against this registry. Model types resolve
    /// to themselves; named types must be registered tokens. The schema and
    /// field names are only used to build the error.
    pub fn resolve(
        &self,
        schema: &str,
        field: &str,
        declared: &DeclaredType,
    ) -> Result<MappedType, SchemaError> {
        match declared {
            DeclaredType::Named(name) => match self.lookup(name) {
                Some(kind) => Ok(MappedType::Scalar(kind)),
                None => Err(SchemaError::UnknownType {
                    schema: schema.to_string(),
                    field: field.to_string(),
                    declared: name.clone(),
                }),
            },
            DeclaredType::Model(model) => Ok(MappedType::Model(Arc::clone(model))),
        }
    }
}
