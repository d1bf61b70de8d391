//! Disk image formats and the volume creation form.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ErrorKind, FieldError, FieldErrors};
use crate::messages::{FIELD_INVALID_CHOICE, IMAGE_NAME_INVALID_CHARACTER};
use crate::types::FormData;
use crate::validation::fields::{clean_field, FieldSpec, FieldValue};
use crate::validation::{log_outcome, rules, Form};

// ---------------------------------------------------------------------------
// Image formats
// ---------------------------------------------------------------------------

/// Disk image formats a volume can be created or converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Qcow2,
    Qcow,
    Raw,
}

impl ImageFormat {
    pub const ALL: &'static [Self] = &[Self::Qcow2, Self::Qcow, Self::Raw];

    /// Submitted values accepted by the `format` choice fields.
    pub const NAMES: &'static [&'static str] = &["qcow2", "qcow", "raw"];

    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "qcow2" => Ok(Self::Qcow2),
            "qcow" => Ok(Self::Qcow),
            "raw" => Ok(Self::Raw),
            other => Err(CoreError::UnknownVariant {
                kind: "image format",
                value: other.to_string(),
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Qcow2 => "qcow2",
            Self::Qcow => "qcow",
            Self::Raw => "raw",
        }
    }

    /// Label shown in the format drop-down.
    pub fn label(self) -> &'static str {
        match self {
            Self::Qcow2 => "qcow2 (recommended)",
            Self::Qcow => "qcow",
            Self::Raw => "raw",
        }
    }
}

/// Coerce a `format` choice field. `None` when optional and left empty.
pub(crate) fn clean_format(
    data: &FormData,
    spec: &FieldSpec,
) -> Result<Option<ImageFormat>, FieldError> {
    match clean_field(data, spec)? {
        FieldValue::Empty => Ok(None),
        value => {
            let text = value.into_text();
            ImageFormat::from_name(&text).map(Some).map_err(|_| {
                FieldError::new(ErrorKind::InvalidChoice, FIELD_INVALID_CHOICE)
                    .with_param("value", text)
                    .with_param("allowed", ImageFormat::NAMES.to_vec())
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Volume form
// ---------------------------------------------------------------------------

pub const NAME: FieldSpec = FieldSpec::string("name").max_length(120);
pub const FORMAT: FieldSpec = FieldSpec::choice("format", ImageFormat::NAMES);
pub const SIZE: FieldSpec = FieldSpec::integer("size");
pub const META_PREALLOC: FieldSpec = FieldSpec::boolean("meta_prealloc");

const FIELDS: &[FieldSpec] = &[NAME, FORMAT, SIZE, META_PREALLOC];

/// A validated volume creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeInput {
    pub name: String,
    pub format: ImageFormat,
    /// Size as entered; the unit is chosen by the caller's form.
    pub size: i64,
    pub meta_prealloc: bool,
}

impl Form for VolumeInput {
    const FORM_NAME: &'static str = "volume";

    fn fields() -> &'static [FieldSpec] {
        FIELDS
    }

    fn clean(data: &FormData) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = errors.collect(NAME.name, clean_name(data));
        let format = errors
            .collect(FORMAT.name, clean_format(data, &FORMAT))
            .flatten();
        let size = errors
            .collect(SIZE.name, clean_field(data, &SIZE))
            .and_then(|v| v.as_integer());
        let meta_prealloc = errors
            .collect(META_PREALLOC.name, clean_field(data, &META_PREALLOC))
            .is_some_and(|v| v.as_bool());

        log_outcome(Self::FORM_NAME, &errors);

        match (name, format, size) {
            (Some(name), Some(format), Some(size)) if errors.is_empty() => Ok(Self {
                name,
                format,
                size,
                meta_prealloc,
            }),
            _ => Err(errors),
        }
    }

    fn normalized(&self) -> FormData {
        let mut data = FormData::new();
        data.insert(NAME.name.into(), self.name.clone().into());
        data.insert(FORMAT.name.into(), self.format.name().into());
        data.insert(SIZE.name.into(), self.size.into());
        data.insert(META_PREALLOC.name.into(), self.meta_prealloc.into());
        data
    }
}

/// The declared length is enforced at the field boundary, before the
/// character check, with the generic length message.
fn clean_name(data: &FormData) -> Result<String, FieldError> {
    let name = clean_field(data, &NAME)?.into_text();
    if !rules::is_valid_name(&name) {
        return Err(FieldError::new(
            ErrorKind::InvalidCharacter,
            IMAGE_NAME_INVALID_CHARACTER,
        ));
    }
    Ok(name)
}
