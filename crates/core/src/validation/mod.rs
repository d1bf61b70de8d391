//! Form validation engine.
//!
//! Field declarations and coercion, character-set rules, and the [`Form`]
//! trait the storage forms implement. Pure logic, no I/O.

pub mod fields;
pub mod rules;

use serde::{Deserialize, Serialize};

use crate::clone_image::CloneImageInput;
use crate::config::ValidationConfig;
use crate::error::FieldErrors;
use crate::storage_pool::StoragePoolInput;
use crate::types::FormData;
use crate::volume::VolumeInput;

use self::fields::FieldSpec;

/// A validated form: raw mapping in, typed value or field errors out.
pub trait Form: Sized {
    /// Identifier used in logs.
    const FORM_NAME: &'static str;

    /// Declared fields, in display order.
    fn fields() -> &'static [FieldSpec];

    /// Validate every field and apply cross-field rules.
    fn clean(data: &FormData) -> Result<Self, FieldErrors>;

    /// The normalized mapping. Feeding it back into [`Form::clean`] yields
    /// an equal value.
    fn normalized(&self) -> FormData;
}

/// The storage forms, for callers that dispatch on a form name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    StoragePool,
    Volume,
    CloneImage,
}

impl FormKind {
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            Self::StoragePool => StoragePoolInput::fields(),
            Self::Volume => VolumeInput::fields(),
            Self::CloneImage => CloneImageInput::fields(),
        }
    }

    /// Validate `data` as this form with the default configuration,
    /// returning the normalized mapping.
    pub fn validate(self, data: &FormData) -> Result<FormData, FieldErrors> {
        self.validate_with(data, &ValidationConfig::default())
    }

    /// Like [`FormKind::validate`], honouring deployment settings such as the
    /// enabled pool types.
    pub fn validate_with(
        self,
        data: &FormData,
        config: &ValidationConfig,
    ) -> Result<FormData, FieldErrors> {
        match self {
            Self::StoragePool => {
                StoragePoolInput::clean_with(data, config).map(|pool| pool.normalized())
            }
            Self::Volume => validate_as::<VolumeInput>(data),
            Self::CloneImage => validate_as::<CloneImageInput>(data),
        }
    }
}

fn validate_as<F: Form>(data: &FormData) -> Result<FormData, FieldErrors> {
    F::clean(data).map(|form| form.normalized())
}

/// Emit the per-submission debug event. Field values are never logged.
pub(crate) fn log_outcome(form: &'static str, errors: &FieldErrors) {
    if errors.is_empty() {
        tracing::debug!(form, "Form accepted");
    } else {
        let fields: Vec<&str> = errors.fields().collect();
        tracing::debug!(
            form,
            error_count = errors.len(),
            fields = ?fields,
            "Form rejected",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_serializes_snake_case() {
        assert_eq!(serde_json::to_value(FormKind::CloneImage).unwrap(), "clone_image");
        let kind: FormKind = serde_json::from_value(json!("storage_pool")).unwrap();
        assert_eq!(kind, FormKind::StoragePool);
    }

    #[test]
    fn every_form_declares_name_first() {
        for kind in [FormKind::StoragePool, FormKind::Volume, FormKind::CloneImage] {
            let fields = kind.fields();
            assert_eq!(fields[0].name, "name");
            assert!(fields[0].required);
        }
    }

    #[test]
    fn dispatch_returns_normalized_mapping() {
        let data = crate::types::form_data_from_json(json!({
            "name": "vol1",
            "format": "raw",
            "size": "10",
        }))
        .unwrap();
        let normalized = FormKind::Volume.validate(&data).unwrap();
        assert_eq!(normalized["size"], 10);
        assert_eq!(normalized["meta_prealloc"], false);
    }

    #[test]
    fn dispatch_honours_enabled_pool_types() {
        let data = crate::types::form_data_from_json(json!({
            "name": "ceph",
            "stg_type": "rbd",
        }))
        .unwrap();
        let config = ValidationConfig::from_pool_types("dir,netfs");

        assert!(FormKind::StoragePool.validate(&data).is_ok());
        let errors = FormKind::StoragePool.validate_with(&data, &config).unwrap_err();
        assert_eq!(
            errors.first("stg_type").unwrap().kind,
            crate::error::ErrorKind::InvalidChoice
        );
    }
}
