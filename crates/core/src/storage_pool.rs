//! Storage pool creation form.
//!
//! Which of `target` and `source` must be filled in depends on the selected
//! pool type; see [`PoolRequirements`].

use serde::{Deserialize, Serialize};

use crate::config::ValidationConfig;
use crate::error::{CoreError, ErrorKind, FieldError, FieldErrors};
use crate::messages::{
    FIELD_INVALID_CHOICE, POOL_NAME_INVALID_CHARACTER, POOL_NAME_REQUIRED, POOL_NAME_TOO_LONG,
    POOL_SOURCE_INVALID_CHARACTER, POOL_SOURCE_REQUIRED, POOL_TARGET_INVALID_CHARACTER,
    POOL_TARGET_REQUIRED,
};
use crate::types::FormData;
use crate::validation::fields::{clean_field, FieldSpec, FieldValue};
use crate::validation::{log_outcome, rules, Form};

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

pub const NAME: FieldSpec = FieldSpec::string("name")
    .max_length(20)
    .with_required_message(POOL_NAME_REQUIRED)
    .with_length_message(POOL_NAME_TOO_LONG);
pub const STG_TYPE: FieldSpec =
    FieldSpec::choice("stg_type", StoragePoolType::NAMES).max_length(10);
pub const TARGET: FieldSpec = FieldSpec::string("target")
    .max_length(100)
    .optional()
    .with_required_message(POOL_TARGET_REQUIRED);
pub const SOURCE: FieldSpec = FieldSpec::string("source")
    .max_length(100)
    .optional()
    .with_required_message(POOL_SOURCE_REQUIRED);
pub const CEPH_USER: FieldSpec = FieldSpec::string("ceph_user").optional();
pub const CEPH_HOST: FieldSpec = FieldSpec::string("ceph_host").optional();
pub const CEPH_POOL: FieldSpec = FieldSpec::string("ceph_pool").optional();
pub const SECRET: FieldSpec = FieldSpec::string("secret").optional();
pub const NETFS_HOST: FieldSpec = FieldSpec::string("netfs_host").optional();
pub const SOURCE_FORMAT: FieldSpec = FieldSpec::string("source_format").optional();

const FIELDS: &[FieldSpec] = &[
    NAME,
    STG_TYPE,
    TARGET,
    SOURCE,
    CEPH_USER,
    CEPH_HOST,
    CEPH_POOL,
    SECRET,
    NETFS_HOST,
    SOURCE_FORMAT,
];

// ---------------------------------------------------------------------------
// Pool types
// ---------------------------------------------------------------------------

/// Storage pool backends offered by the creation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoragePoolType {
    Dir,
    Fs,
    Netfs,
    Logical,
    Disk,
    Iscsi,
    Scsi,
    Mpath,
    Rbd,
    Gluster,
    Zfs,
}

impl StoragePoolType {
    pub const ALL: &'static [Self] = &[
        Self::Dir,
        Self::Fs,
        Self::Netfs,
        Self::Logical,
        Self::Disk,
        Self::Iscsi,
        Self::Scsi,
        Self::Mpath,
        Self::Rbd,
        Self::Gluster,
        Self::Zfs,
    ];

    /// Submitted values accepted by the `stg_type` field, in `ALL` order.
    pub const NAMES: &'static [&'static str] = &[
        "dir", "fs", "netfs", "logical", "disk", "iscsi", "scsi", "mpath", "rbd", "gluster", "zfs",
    ];

    /// Parse from the submitted form value.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name() == name)
            .ok_or_else(|| CoreError::UnknownVariant {
                kind: "storage pool type",
                value: name.to_string(),
            })
    }

    /// Form / libvirt name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dir => "dir",
            Self::Fs => "fs",
            Self::Netfs => "netfs",
            Self::Logical => "logical",
            Self::Disk => "disk",
            Self::Iscsi => "iscsi",
            Self::Scsi => "scsi",
            Self::Mpath => "mpath",
            Self::Rbd => "rbd",
            Self::Gluster => "gluster",
            Self::Zfs => "zfs",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Dir => "Directory",
            Self::Fs => "Pre-formatted block device",
            Self::Netfs => "Network filesystem",
            Self::Logical => "LVM volume group",
            Self::Disk => "Physical disk",
            Self::Iscsi => "iSCSI target",
            Self::Scsi => "SCSI host adapter",
            Self::Mpath => "Multipath device",
            Self::Rbd => "Ceph RBD",
            Self::Gluster => "Gluster",
            Self::Zfs => "ZFS pool",
        }
    }
}

/// Which location fields a pool type needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolRequirements {
    pub target_required: bool,
    pub source_required: bool,
}

const REQUIREMENTS: &[(&str, PoolRequirements)] = &[
    (
        "dir",
        PoolRequirements {
            target_required: true,
            source_required: false,
        },
    ),
    (
        "netfs",
        PoolRequirements {
            target_required: true,
            source_required: true,
        },
    ),
    (
        "logical",
        PoolRequirements {
            target_required: false,
            source_required: true,
        },
    ),
];

impl PoolRequirements {
    /// Look up by the submitted type string. Unlisted types need neither field.
    pub fn for_type(stg_type: &str) -> Self {
        REQUIREMENTS
            .iter()
            .find(|(name, _)| *name == stg_type)
            .map(|(_, req)| *req)
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// A validated storage pool creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoragePoolInput {
    pub name: String,
    pub stg_type: StoragePoolType,
    pub target: String,
    pub source: String,
    pub ceph_user: String,
    pub ceph_host: String,
    pub ceph_pool: String,
    pub secret: String,
    pub netfs_host: String,
    pub source_format: String,
}

impl StoragePoolInput {
    /// Validate against an explicit set of enabled pool types.
    pub fn clean_with(data: &FormData, config: &ValidationConfig) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = errors.collect(NAME.name, clean_name(data));

        // Field-level result drives the requirement table even when the type
        // itself is not enabled.
        let stg_type_text = errors.collect(
            STG_TYPE.name,
            clean_field(data, &STG_TYPE).map(FieldValue::into_text),
        );
        let requirements = stg_type_text
            .as_deref()
            .map(PoolRequirements::for_type)
            .unwrap_or_default();
        let stg_type = stg_type_text.and_then(|text| {
            errors.collect(STG_TYPE.name, parse_stg_type(&text, config))
        });

        let target = errors.collect(TARGET.name, clean_target(data, requirements));
        let source = errors.collect(SOURCE.name, clean_source(data, requirements));

        let [ceph_user, ceph_host, ceph_pool, secret, netfs_host, source_format] = [
            CEPH_USER,
            CEPH_HOST,
            CEPH_POOL,
            SECRET,
            NETFS_HOST,
            SOURCE_FORMAT,
        ]
        .map(|spec| {
            errors
                .collect(spec.name, clean_field(data, &spec).map(FieldValue::into_text))
                .unwrap_or_default()
        });

        log_outcome(Self::FORM_NAME, &errors);

        let (Some(name), Some(stg_type), Some(target), Some(source)) =
            (name, stg_type, target, source)
        else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            name,
            stg_type,
            target,
            source,
            ceph_user,
            ceph_host,
            ceph_pool,
            secret,
            netfs_host,
            source_format,
        })
    }

    pub fn requirements(&self) -> PoolRequirements {
        PoolRequirements::for_type(self.stg_type.name())
    }
}

impl Form for StoragePoolInput {
    const FORM_NAME: &'static str = "storage_pool";

    fn fields() -> &'static [FieldSpec] {
        FIELDS
    }

    fn clean(data: &FormData) -> Result<Self, FieldErrors> {
        Self::clean_with(data, &ValidationConfig::default())
    }

    fn normalized(&self) -> FormData {
        let mut data = FormData::new();
        data.insert(NAME.name.into(), self.name.clone().into());
        data.insert(STG_TYPE.name.into(), self.stg_type.name().into());
        data.insert(TARGET.name.into(), self.target.clone().into());
        data.insert(SOURCE.name.into(), self.source.clone().into());
        data.insert(CEPH_USER.name.into(), self.ceph_user.clone().into());
        data.insert(CEPH_HOST.name.into(), self.ceph_host.clone().into());
        data.insert(CEPH_POOL.name.into(), self.ceph_pool.clone().into());
        data.insert(SECRET.name.into(), self.secret.clone().into());
        data.insert(NETFS_HOST.name.into(), self.netfs_host.clone().into());
        data.insert(SOURCE_FORMAT.name.into(), self.source_format.clone().into());
        data
    }
}

// ---------------------------------------------------------------------------
// Field rules
// ---------------------------------------------------------------------------

/// Character set first, then the pool-specific length message.
fn clean_name(data: &FormData) -> Result<String, FieldError> {
    let name = clean_field(data, &NAME)?.into_text();
    if !rules::is_valid_name(&name) {
        return Err(FieldError::new(
            ErrorKind::InvalidCharacter,
            POOL_NAME_INVALID_CHARACTER,
        ));
    }
    NAME.check_length(&name)?;
    Ok(name)
}

fn parse_stg_type(text: &str, config: &ValidationConfig) -> Result<StoragePoolType, FieldError> {
    match StoragePoolType::from_name(text) {
        Ok(pool_type) if config.allows(pool_type) => Ok(pool_type),
        _ => {
            let allowed: Vec<&str> = config.pool_types.iter().map(|t| t.name()).collect();
            Err(FieldError::new(ErrorKind::InvalidChoice, FIELD_INVALID_CHOICE)
                .with_param("value", text)
                .with_param("allowed", allowed))
        }
    }
}

fn clean_target(data: &FormData, requirements: PoolRequirements) -> Result<String, FieldError> {
    let target = clean_field(data, &TARGET)?.into_text();
    if !requirements.target_required {
        return Ok(target);
    }
    if target.is_empty() {
        return Err(TARGET.required_error());
    }
    if !rules::is_valid_target_path(&target) {
        return Err(FieldError::new(
            ErrorKind::InvalidCharacter,
            POOL_TARGET_INVALID_CHARACTER,
        ));
    }
    Ok(target)
}

fn clean_source(data: &FormData, requirements: PoolRequirements) -> Result<String, FieldError> {
    let source = clean_field(data, &SOURCE)?.into_text();
    if !requirements.source_required {
        return Ok(source);
    }
    if source.is_empty() {
        return Err(SOURCE.required_error());
    }
    if !rules::is_valid_source(&source) {
        return Err(FieldError::new(
            ErrorKind::InvalidCharacter,
            POOL_SOURCE_INVALID_CHARACTER,
        ));
    }
    Ok(source)
}
