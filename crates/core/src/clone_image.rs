//! Image clone form: copy an existing volume, optionally converting it.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, FieldError, FieldErrors};
use crate::messages::{IMAGE_NAME_INVALID_CHARACTER, IMAGE_NAME_TOO_LONG};
use crate::types::FormData;
use crate::validation::fields::{clean_field, FieldSpec, FieldValue};
use crate::validation::{log_outcome, rules, Form};
use crate::volume::{clean_format, ImageFormat};

pub const NAME: FieldSpec = FieldSpec::string("name")
    .max_length(120)
    .with_length_message(IMAGE_NAME_TOO_LONG);
pub const IMAGE: FieldSpec = FieldSpec::string("image").max_length(120);
pub const CONVERT: FieldSpec = FieldSpec::boolean("convert");
pub const FORMAT: FieldSpec = FieldSpec::choice("format", ImageFormat::NAMES).optional();
pub const META_PREALLOC: FieldSpec = FieldSpec::boolean("meta_prealloc");

const FIELDS: &[FieldSpec] = &[NAME, IMAGE, CONVERT, FORMAT, META_PREALLOC];

/// A validated clone request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneImageInput {
    pub name: String,
    /// Source image identifier, taken as submitted.
    pub image: String,
    pub convert: bool,
    pub format: Option<ImageFormat>,
    pub meta_prealloc: bool,
}

impl CloneImageInput {
    /// The format to convert to, if conversion was requested.
    ///
    /// `format` is optional on the form; a caller that requires it whenever
    /// `convert` is set checks for `None` here.
    pub fn target_format(&self) -> Option<ImageFormat> {
        if self.convert {
            self.format
        } else {
            None
        }
    }
}

impl Form for CloneImageInput {
    const FORM_NAME: &'static str = "clone_image";

    fn fields() -> &'static [FieldSpec] {
        FIELDS
    }

    fn clean(data: &FormData) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = errors.collect(NAME.name, clean_name(data));
        let image = errors.collect(
            IMAGE.name,
            clean_field(data, &IMAGE).map(FieldValue::into_text),
        );
        let convert = errors
            .collect(CONVERT.name, clean_field(data, &CONVERT))
            .is_some_and(|v| v.as_bool());
        let format = errors
            .collect(FORMAT.name, clean_format(data, &FORMAT))
            .flatten();
        let meta_prealloc = errors
            .collect(META_PREALLOC.name, clean_field(data, &META_PREALLOC))
            .is_some_and(|v| v.as_bool());

        log_outcome(Self::FORM_NAME, &errors);

        match (name, image) {
            (Some(name), Some(image)) if errors.is_empty() => Ok(Self {
                name,
                image,
                convert,
                format,
                meta_prealloc,
            }),
            _ => Err(errors),
        }
    }

    fn normalized(&self) -> FormData {
        let mut data = FormData::new();
        data.insert(NAME.name.into(), self.name.clone().into());
        data.insert(IMAGE.name.into(), self.image.clone().into());
        data.insert(CONVERT.name.into(), self.convert.into());
        data.insert(FORMAT.name.into(), self.format.map(ImageFormat::name).into());
        data.insert(META_PREALLOC.name.into(), self.meta_prealloc.into());
        data
    }
}

/// Character set first, then the clone-specific length message.
fn clean_name(data: &FormData) -> Result<String, FieldError> {
    let name = clean_field(data, &NAME)?.into_text();
    if !rules::is_valid_name(&name) {
        return Err(FieldError::new(
            ErrorKind::InvalidCharacter,
            IMAGE_NAME_INVALID_CHARACTER,
        ));
    }
    NAME.check_length(&name)?;
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn data(value: Value) -> FormData {
        crate::types::form_data_from_json(value).unwrap()
    }

    #[test]
    fn plain_clone() {
        let clone = CloneImageInput::clean(&data(json!({
            "name": "web-01.qcow2",
            "image": "base image (v2).qcow2",
        })))
        .unwrap();
        assert_eq!(clone.image, "base image (v2).qcow2");
        assert!(!clone.convert);
        assert_eq!(clone.format, None);
        assert_eq!(clone.target_format(), None);
    }

    #[test]
    fn convert_with_format() {
        let clone = CloneImageInput::clean(&data(json!({
            "name": "web-01.img",
            "image": "base.qcow2",
            "convert": "on",
            "format": "raw",
            "meta_prealloc": "on",
        })))
        .unwrap();
        assert_eq!(clone.target_format(), Some(ImageFormat::Raw));
        assert!(clone.meta_prealloc);
    }

    #[test]
    fn format_without_convert_is_ignored_by_target_format() {
        let clone = CloneImageInput::clean(&data(json!({
            "name": "c",
            "image": "base.qcow2",
            "format": "qcow",
        })))
        .unwrap();
        assert_eq!(clone.format, Some(ImageFormat::Qcow));
        assert_eq!(clone.target_format(), None);
    }

    #[test]
    fn long_name_uses_clone_message() {
        let errors = CloneImageInput::clean(&data(json!({
            "name": "a".repeat(121),
            "image": "base.qcow2",
        })))
        .unwrap_err();
        let error = errors.first("name").unwrap();
        assert_eq!(error.kind, ErrorKind::LengthExceeded);
        assert_eq!(error.key, IMAGE_NAME_TOO_LONG);
        assert_eq!(error.params["length"], 121);
    }

    #[test]
    fn long_bad_name_reports_characters() {
        let errors = CloneImageInput::clean(&data(json!({
            "name": "a b".repeat(50),
            "image": "base.qcow2",
        })))
        .unwrap_err();
        assert_eq!(errors.first("name").unwrap().key, IMAGE_NAME_INVALID_CHARACTER);
    }

    #[test]
    fn image_length_uses_generic_message() {
        let errors = CloneImageInput::clean(&data(json!({
            "name": "c",
            "image": "i".repeat(121),
        })))
        .unwrap_err();
        assert_eq!(
            errors.first("image").unwrap().key,
            crate::messages::FIELD_MAX_LENGTH
        );
    }

    #[test]
    fn unknown_format_rejected_even_when_optional() {
        let errors = CloneImageInput::clean(&data(json!({
            "name": "c",
            "image": "base.qcow2",
            "format": "vmdk",
        })))
        .unwrap_err();
        assert_eq!(errors.first("format").unwrap().kind, ErrorKind::InvalidChoice);
    }

    #[test]
    fn normalized_format_is_null_when_absent() {
        let clone = CloneImageInput::clean(&data(json!({
            "name": "c",
            "image": "base.qcow2",
        })))
        .unwrap();
        assert_eq!(clone.normalized()["format"], Value::Null);
    }
}
