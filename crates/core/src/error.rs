use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Crate-level error for failures that are not tied to a single field.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] FieldErrors),
}

// ---------------------------------------------------------------------------
// Field-scoped errors
// ---------------------------------------------------------------------------

/// Category of a field-level validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    RequiredField,
    InvalidCharacter,
    LengthExceeded,
    InvalidChoice,
    InvalidType,
}

impl ErrorKind {
    /// Stable machine-readable code, identical to the serialized form.
    pub fn code(self) -> &'static str {
        match self {
            Self::RequiredField => "required_field",
            Self::InvalidCharacter => "invalid_character",
            Self::LengthExceeded => "length_exceeded",
            Self::InvalidChoice => "invalid_choice",
            Self::InvalidType => "invalid_type",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single failed check on one field.
///
/// Carries a message key plus parameters instead of rendered text; see
/// [`crate::messages`] for turning it into a user-facing string.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{kind} ({key})")]
pub struct FieldError {
    #[serde(rename = "code")]
    pub kind: ErrorKind,
    pub key: &'static str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<&'static str, Value>,
}

impl FieldError {
    pub fn new(kind: ErrorKind, key: &'static str) -> Self {
        Self {
            kind,
            key,
            params: BTreeMap::new(),
        }
    }

    /// Attach a message parameter (e.g. `max`, `value`).
    pub fn with_param(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.params.insert(name, value.into());
        self
    }
}

/// Errors collected across a whole form, keyed by field name.
///
/// Fields are validated independently, so several fields may fail in one
/// pass. Within a field only the first failing check is recorded by the
/// validators, but the value is still a sequence so callers can merge in
/// their own errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<FieldError>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, error: FieldError) {
        self.0.entry(field).or_default().push(error);
    }

    /// Record the error from `result` under `field`, returning the value on success.
    pub fn collect<T>(&mut self, field: &'static str, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.add(field, error);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one error.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[FieldError]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// The first error recorded for `field`.
    pub fn first(&self, field: &str) -> Option<&FieldError> {
        self.get(field).and_then(<[FieldError]>::first)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[FieldError])> + '_ {
        self.0.iter().map(|(field, errors)| (*field, errors.as_slice()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, errors) in self.iter() {
            for error in errors {
                if !first {
                    f.write_str(", ")?;
                }
                write!(f, "{field}: {error}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl From<&FieldErrors> for validator::ValidationErrors {
    fn from(errors: &FieldErrors) -> Self {
        let mut out = validator::ValidationErrors::new();
        for (field, field_errors) in errors.iter() {
            for error in field_errors {
                let mut converted = validator::ValidationError::new(error.kind.code())
                    .with_message(Cow::Borrowed(error.key));
                for (name, value) in &error.params {
                    converted.add_param(Cow::Borrowed(*name), value);
                }
                out.add(field, converted);
            }
        }
        out
    }
}
