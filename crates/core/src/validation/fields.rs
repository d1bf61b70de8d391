//! Field declarations and per-field coercion.
//!
//! Every submitted value goes through [`clean_field`] first: presence,
//! declared length and type coercion. Form-specific rules run afterwards on
//! the coerced value.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::{ErrorKind, FieldError};
use crate::messages::{
    FIELD_INVALID_CHOICE, FIELD_INVALID_INTEGER, FIELD_INVALID_TYPE, FIELD_MAX_LENGTH,
    FIELD_REQUIRED,
};
use crate::types::{json_type_name, FormData};

/// Declared value type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Boolean,
    Enum,
}

impl FieldKind {
    fn expected(self) -> &'static str {
        match self {
            Self::String | Self::Enum => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }
}

/// Static description of one form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub max_length: Option<usize>,
    pub allowed_values: Option<&'static [&'static str]>,
    /// Message key used when the field is required but empty.
    pub required_key: &'static str,
    /// When set, the form's own rule reports the length with this key, after
    /// its character check, instead of the generic field-length check.
    pub length_key: Option<&'static str>,
}

impl FieldSpec {
    const fn new(name: &'static str, kind: FieldKind, required: bool) -> Self {
        Self {
            name,
            kind,
            required,
            max_length: None,
            allowed_values: None,
            required_key: FIELD_REQUIRED,
            length_key: None,
        }
    }

    /// A required string field.
    pub const fn string(name: &'static str) -> Self {
        Self::new(name, FieldKind::String, true)
    }

    /// A required integer field.
    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer, true)
    }

    /// An optional boolean (checkbox) field.
    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Boolean, false)
    }

    /// A required field restricted to `allowed`.
    pub const fn choice(name: &'static str, allowed: &'static [&'static str]) -> Self {
        Self {
            allowed_values: Some(allowed),
            ..Self::new(name, FieldKind::Enum, true)
        }
    }

    pub const fn optional(self) -> Self {
        Self {
            required: false,
            ..self
        }
    }

    pub const fn max_length(self, max: usize) -> Self {
        Self {
            max_length: Some(max),
            ..self
        }
    }

    pub const fn with_required_message(self, key: &'static str) -> Self {
        Self {
            required_key: key,
            ..self
        }
    }

    pub const fn with_length_message(self, key: &'static str) -> Self {
        Self {
            length_key: Some(key),
            ..self
        }
    }

    pub fn required_error(&self) -> FieldError {
        FieldError::new(ErrorKind::RequiredField, self.required_key)
    }

    /// Check `value` against `max_length`, counting characters.
    pub fn check_length(&self, value: &str) -> Result<(), FieldError> {
        let Some(max) = self.max_length else {
            return Ok(());
        };
        let length = value.chars().count();
        if length > max {
            let key = self.length_key.unwrap_or(FIELD_MAX_LENGTH);
            return Err(FieldError::new(ErrorKind::LengthExceeded, key)
                .with_param("max", max)
                .with_param("length", length));
        }
        Ok(())
    }

    fn type_error(&self, value: &Value) -> FieldError {
        FieldError::new(ErrorKind::InvalidType, FIELD_INVALID_TYPE)
            .with_param("expected", self.kind.expected())
            .with_param("actual", json_type_name(value))
    }
}

/// A value after field-level coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Empty,
    Text(String),
    Integer(i64),
    Boolean(bool),
}

impl FieldValue {
    /// Text content; `Empty` becomes `""`.
    pub fn into_text(self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s,
            Self::Integer(n) => n.to_string(),
            Self::Boolean(b) => b.to_string(),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> bool {
        matches!(self, Self::Boolean(true))
    }
}

// ---------------------------------------------------------------------------
// Coercion
// ---------------------------------------------------------------------------

/// Look up `spec.name` in `data` and coerce it to the declared kind.
///
/// Missing keys and `null` count as empty. Empty required fields fail with
/// `spec.required_key`; empty optional fields yield `Text("")` for strings,
/// `Empty` for integers and choices, and `Boolean(false)` for booleans.
pub fn clean_field(data: &FormData, spec: &FieldSpec) -> Result<FieldValue, FieldError> {
    let raw = data.get(spec.name).filter(|v| !v.is_null());
    match spec.kind {
        FieldKind::String => clean_string(raw, spec),
        FieldKind::Enum => clean_choice(raw, spec),
        FieldKind::Integer => clean_integer(raw, spec),
        FieldKind::Boolean => clean_boolean(raw, spec),
    }
}

fn raw_text(raw: Option<&Value>, spec: &FieldSpec) -> Result<String, FieldError> {
    match raw {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(spec.type_error(other)),
    }
}

fn clean_string(raw: Option<&Value>, spec: &FieldSpec) -> Result<FieldValue, FieldError> {
    let text = raw_text(raw, spec)?;
    if text.is_empty() {
        if spec.required {
            return Err(spec.required_error());
        }
        return Ok(FieldValue::Text(text));
    }
    if spec.length_key.is_none() {
        spec.check_length(&text)?;
    }
    Ok(FieldValue::Text(text))
}

fn clean_choice(raw: Option<&Value>, spec: &FieldSpec) -> Result<FieldValue, FieldError> {
    let text = raw_text(raw, spec)?;
    if text.is_empty() {
        if spec.required {
            return Err(spec.required_error());
        }
        return Ok(FieldValue::Empty);
    }
    spec.check_length(&text)?;
    if let Some(allowed) = spec.allowed_values {
        if !allowed.contains(&text.as_str()) {
            return Err(FieldError::new(ErrorKind::InvalidChoice, FIELD_INVALID_CHOICE)
                .with_param("value", text)
                .with_param("allowed", allowed.to_vec()));
        }
    }
    Ok(FieldValue::Text(text))
}

/// Integral decimal suffix such as `.0` or `.`, dropped before parsing.
static INTEGRAL_DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.0*\s*$").expect("valid regex"));

fn clean_integer(raw: Option<&Value>, spec: &FieldSpec) -> Result<FieldValue, FieldError> {
    let parsed = match raw {
        None => None,
        Some(Value::Number(n)) => match n.as_i64().or_else(|| integral_float(n.as_f64())) {
            Some(n) => Some(n),
            None => return Err(invalid_integer(n.to_string())),
        },
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                let digits = INTEGRAL_DECIMAL_RE.replace(trimmed, "");
                Some(digits.parse::<i64>().map_err(|_| invalid_integer(s.clone()))?)
            }
        }
        Some(other) => return Err(spec.type_error(other)),
    };
    match parsed {
        Some(n) => Ok(FieldValue::Integer(n)),
        None if spec.required => Err(spec.required_error()),
        None => Ok(FieldValue::Empty),
    }
}

fn integral_float(value: Option<f64>) -> Option<i64> {
    value
        .filter(|f| f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(f))
        .map(|f| f as i64)
}

fn invalid_integer(value: String) -> FieldError {
    FieldError::new(ErrorKind::InvalidType, FIELD_INVALID_INTEGER)
        .with_param("expected", "integer")
        .with_param("value", value)
}

/// Checkbox semantics: absent, `""`, `"false"` and `"0"` are unchecked.
fn clean_boolean(raw: Option<&Value>, spec: &FieldSpec) -> Result<FieldValue, FieldError> {
    let checked = match raw {
        None => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => {
            !(s.is_empty() || s.eq_ignore_ascii_case("false") || s == "0")
        }
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(other) => return Err(spec.type_error(other)),
    };
    if spec.required && !checked {
        return Err(spec.required_error());
    }
    Ok(FieldValue::Boolean(checked))
}
