//! The built-in scalar kinds and their value-level contracts.
//!
//! Each kind answers two questions about a JSON value: does the value's
//! runtime representation already satisfy the kind (`admits`), and if not,
//! can it be coerced under the kind's permissive cast rule (`cast`)?
//! Casting is deliberately narrow: numeric strings become numbers, a small
//! set of boolean tokens become booleans, and nothing else converts. In
//! particular the string kind never stringifies non-string input.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// The five primitive field kinds every registry knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Integer,
    Number,
    String,
    Boolean,
    Array,
}

static TRUTHY_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(true|t|yes|y|1)$").unwrap());
static FALSY_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(false|f|no|n|0)$").unwrap());

impl ScalarKind {
    /// The registry name of this kind, which is also the label emitted by
    /// derived schema documents.
    pub fn label(self) -> &'static str {
        match self {
            ScalarKind::Integer => "integer",
            ScalarKind::Number => "number",
            ScalarKind::String => "string",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Array => "array",
        }
    }

    /// True when the value's representation already satisfies this kind
    /// with no cast. Integers admit only integral JSON numbers; the number
    /// kind admits any JSON number.
    pub fn admits(self, value: &Value) -> bool {
        match self {
            ScalarKind::Integer => match value {
                Value::Number(n) => n.is_i64() || n.is_u64(),
                _ => false,
            },
            ScalarKind::Number => value.is_number(),
            ScalarKind::String => value.is_string(),
            ScalarKind::Boolean => value.is_boolean(),
            ScalarKind::Array => value.is_array(),
        }
    }

    /// Identity on admitted values, otherwise the kind's cast rule.
    /// Returns the rejected value unchanged so the caller can report what
    /// it actually saw.
    ///
    /// Cast rules:
    /// - integer: integral decimal strings, and floats with no fractional
    ///   part that fit in the integer range
    /// - number: numeric strings (a `.` selects a float reading, otherwise
    ///   an integral one is tried first)
    /// - boolean: the tokens true/t/yes/y/1 and false/f/no/n/0 (any case),
    ///   plus the numbers 1 and 0
    /// - string, array: no casts
    pub fn cast(self, value: Value) -> Result<Value, Value> {
        if self.admits(&value) {
            return Ok(value);
        }
        match self {
            ScalarKind::Integer => cast_integer(value),
            ScalarKind::Number => cast_number(value),
            ScalarKind::Boolean => cast_boolean(value),
            ScalarKind::String | ScalarKind::Array => Err(value),
        }
    }
}

fn cast_integer(value: Value) -> Result<Value, Value> {
    // 2^63, the first integral float past i64; i64::MAX as f64 rounds up
    // to it, so the usable float range is [-2^63, 2^63).
    const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;
    match &value {
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(i) => Ok(Value::from(i)),
            Err(_) => Err(value),
        },
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f >= -I64_LIMIT && f < I64_LIMIT => {
                Ok(Value::from(f as i64))
            }
            _ => Err(value),
        },
        _ => Err(value),
    }
}

fn cast_number(value: Value) -> Result<Value, Value> {
    let Value::String(s) = &value else {
        return Err(value);
    };
    let token = s.trim();
    if !token.contains('.') {
        if let Ok(i) = token.parse::<i64>() {
            return Ok(Value::from(i));
        }
    }
    match token.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(Value::from(f)),
        _ => Err(value),
    }
}

fn cast_boolean(value: Value) -> Result<Value, Value> {
    match &value {
        Value::String(s) => {
            let token = s.trim();
            if TRUTHY_TOKEN.is_match(token) {
                Ok(Value::Bool(true))
            } else if FALSY_TOKEN.is_match(token) {
                Ok(Value::Bool(false))
            } else {
                Err(value)
            }
        }
        Value::Number(n) => match n.as_i64() {
            Some(1) => Ok(Value::Bool(true)),
            Some(0) => Ok(Value::Bool(false)),
            _ => Err(value),
        },
        _ => Err(value),
    }
}

/// Human-readable name of a JSON value's runtime representation, for error
/// messages. Distinguishes integral numbers from fractional ones.
pub fn value_kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "integer"
            } else {
                "number"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
