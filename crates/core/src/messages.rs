//! Message keys and default English wording.
//!
//! Validators only produce keys plus parameters. A [`MessageCatalog`] turns
//! them into display text; plug in your own catalog for translations.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::error::{FieldError, FieldErrors};

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

pub const FIELD_REQUIRED: &str = "field.required";
pub const FIELD_MAX_LENGTH: &str = "field.max_length";
pub const FIELD_INVALID_CHOICE: &str = "field.invalid_choice";
pub const FIELD_INVALID_INTEGER: &str = "field.invalid_integer";
pub const FIELD_INVALID_TYPE: &str = "field.invalid_type";

pub const POOL_NAME_REQUIRED: &str = "pool.name.required";
pub const POOL_NAME_INVALID_CHARACTER: &str = "pool.name.invalid_character";
pub const POOL_NAME_TOO_LONG: &str = "pool.name.too_long";
pub const POOL_TARGET_REQUIRED: &str = "pool.target.required";
pub const POOL_TARGET_INVALID_CHARACTER: &str = "pool.target.invalid_character";
pub const POOL_SOURCE_REQUIRED: &str = "pool.source.required";
pub const POOL_SOURCE_INVALID_CHARACTER: &str = "pool.source.invalid_character";

pub const IMAGE_NAME_INVALID_CHARACTER: &str = "image.name.invalid_character";
pub const IMAGE_NAME_TOO_LONG: &str = "image.name.too_long";

/// Default English templates. `{param}` placeholders are filled from
/// [`FieldError::params`].
const ENGLISH: &[(&str, &str)] = &[
    (FIELD_REQUIRED, "This field is required."),
    (
        FIELD_MAX_LENGTH,
        "Ensure this value has at most {max} characters (it has {length}).",
    ),
    (
        FIELD_INVALID_CHOICE,
        "Select a valid choice. {value} is not one of the available choices.",
    ),
    (FIELD_INVALID_INTEGER, "Enter a whole number."),
    (FIELD_INVALID_TYPE, "Expected a {expected} value."),
    (POOL_NAME_REQUIRED, "No pool name has been entered"),
    (
        POOL_NAME_INVALID_CHARACTER,
        "The pool name must not contain any special characters",
    ),
    (POOL_NAME_TOO_LONG, "The pool name must not exceed {max} characters"),
    (POOL_TARGET_REQUIRED, "No path has been entered"),
    (
        POOL_TARGET_INVALID_CHARACTER,
        "The target must not contain any special characters",
    ),
    (POOL_SOURCE_REQUIRED, "No device or path has been entered"),
    (
        POOL_SOURCE_INVALID_CHARACTER,
        "The disk source must not contain any special characters",
    ),
    (
        IMAGE_NAME_INVALID_CHARACTER,
        "The image name must not contain any special characters",
    ),
    (IMAGE_NAME_TOO_LONG, "The image name must not exceed {max} characters"),
];

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("valid regex"));

// ---------------------------------------------------------------------------
// Catalogs
// ---------------------------------------------------------------------------

/// Source of message templates keyed by message key.
pub trait MessageCatalog {
    fn template(&self, key: &str) -> Option<&str>;

    /// Render one error. Keys missing from this catalog fall back to the
    /// English default, then to the key itself.
    fn render(&self, error: &FieldError) -> String {
        let template = self
            .template(error.key)
            .or_else(|| english_template(error.key))
            .unwrap_or(error.key);
        interpolate(template, &error.params)
    }
}

/// The built-in English wording.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishCatalog;

impl MessageCatalog for EnglishCatalog {
    fn template(&self, key: &str) -> Option<&str> {
        english_template(key)
    }
}

fn english_template(key: &str) -> Option<&'static str> {
    ENGLISH
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, template)| *template)
}

/// Translations loaded by the caller, e.g. from a locale file.
impl<S: BuildHasher> MessageCatalog for HashMap<String, String, S> {
    fn template(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

/// Render every error, producing the field to message-list mapping a form
/// template displays.
pub fn render_errors(
    errors: &FieldErrors,
    catalog: &impl MessageCatalog,
) -> BTreeMap<&'static str, Vec<String>> {
    errors
        .iter()
        .map(|(field, field_errors)| {
            let messages = field_errors.iter().map(|e| catalog.render(e)).collect();
            (field, messages)
        })
        .collect()
}

/// Fill `{name}` placeholders. Unknown placeholders are left untouched.
pub fn interpolate(template: &str, params: &BTreeMap<&'static str, Value>) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| match params.get(&caps[1]) {
            Some(value) => display_value(value),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn english_covers_pool_name_wording() {
        let error = FieldError::new(ErrorKind::RequiredField, POOL_NAME_REQUIRED);
        assert_eq!(EnglishCatalog.render(&error), "No pool name has been entered");
    }

    #[test]
    fn placeholders_are_filled() {
        let error = FieldError::new(ErrorKind::LengthExceeded, FIELD_MAX_LENGTH)
            .with_param("max", 20)
            .with_param("length", 25);
        assert_eq!(
            EnglishCatalog.render(&error),
            "Ensure this value has at most 20 characters (it has 25)."
        );
    }

    #[test]
    fn string_params_render_without_quotes() {
        let error = FieldError::new(ErrorKind::InvalidChoice, FIELD_INVALID_CHOICE)
            .with_param("value", "vhd");
        assert_eq!(
            EnglishCatalog.render(&error),
            "Select a valid choice. vhd is not one of the available choices."
        );
    }

    #[test]
    fn array_params_are_comma_joined() {
        let mut params = BTreeMap::new();
        params.insert("allowed", serde_json::json!(["qcow2", "qcow", "raw"]));
        assert_eq!(interpolate("One of: {allowed}", &params), "One of: qcow2, qcow, raw");
    }

    #[test]
    fn unknown_placeholder_is_kept() {
        assert_eq!(interpolate("Hello {who}", &BTreeMap::new()), "Hello {who}");
    }

    #[test]
    fn translated_catalog_falls_back_to_english() {
        let mut german = HashMap::new();
        german.insert(
            POOL_TARGET_REQUIRED.to_string(),
            "Es wurde kein Pfad eingegeben".to_string(),
        );

        let translated = FieldError::new(ErrorKind::RequiredField, POOL_TARGET_REQUIRED);
        assert_eq!(german.render(&translated), "Es wurde kein Pfad eingegeben");

        let untranslated = FieldError::new(ErrorKind::RequiredField, POOL_SOURCE_REQUIRED);
        assert_eq!(german.render(&untranslated), "No device or path has been entered");
    }

    #[test]
    fn unknown_key_renders_as_key() {
        let error = FieldError::new(ErrorKind::InvalidType, "custom.key");
        assert_eq!(EnglishCatalog.render(&error), "custom.key");
    }

    #[test]
    fn every_key_has_english_text() {
        for key in [
            FIELD_REQUIRED,
            FIELD_MAX_LENGTH,
            FIELD_INVALID_CHOICE,
            FIELD_INVALID_INTEGER,
            FIELD_INVALID_TYPE,
            POOL_NAME_REQUIRED,
            POOL_NAME_INVALID_CHARACTER,
            POOL_NAME_TOO_LONG,
            POOL_TARGET_REQUIRED,
            POOL_TARGET_INVALID_CHARACTER,
            POOL_SOURCE_REQUIRED,
            POOL_SOURCE_INVALID_CHARACTER,
            IMAGE_NAME_INVALID_CHARACTER,
            IMAGE_NAME_TOO_LONG,
        ] {
            assert!(EnglishCatalog.template(key).is_some(), "missing text for {key}");
        }
    }

    #[test]
    fn render_errors_groups_by_field() {
        let mut errors = FieldErrors::new();
        errors.add(
            "name",
            FieldError::new(ErrorKind::InvalidCharacter, IMAGE_NAME_INVALID_CHARACTER),
        );
        let rendered = render_errors(&errors, &EnglishCatalog);
        assert_eq!(
            rendered["name"],
            vec!["The image name must not contain any special characters".to_string()]
        );
    }
}
