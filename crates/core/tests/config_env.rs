//! Environment-driven configuration. Kept in its own test binary because it
//! mutates the process environment.

use serde_json::json;

use virtforms_core::config::POOL_TYPES_ENV;
use virtforms_core::{
    form_data_from_json, ErrorKind, FormKind, StoragePoolInput, StoragePoolType,
    ValidationConfig,
};

#[test]
fn pool_types_come_from_environment() {
    std::env::remove_var(POOL_TYPES_ENV);
    assert_eq!(ValidationConfig::from_env(), ValidationConfig::default());

    std::env::set_var(POOL_TYPES_ENV, "dir, logical");
    let config = ValidationConfig::from_env();
    std::env::remove_var(POOL_TYPES_ENV);

    assert_eq!(
        config.pool_types,
        vec![StoragePoolType::Dir, StoragePoolType::Logical]
    );

    let data = form_data_from_json(json!({"name": "p", "stg_type": "zfs"})).unwrap();
    assert!(StoragePoolInput::clean_with(&data, &ValidationConfig::default()).is_ok());
    let errors = StoragePoolInput::clean_with(&data, &config).unwrap_err();
    assert_eq!(errors.first("stg_type").unwrap().kind, ErrorKind::InvalidChoice);

    let errors = FormKind::StoragePool.validate_with(&data, &config).unwrap_err();
    assert_eq!(errors.first("stg_type").unwrap().kind, ErrorKind::InvalidChoice);
}
