use crate::storage_pool::StoragePoolType;

/// Environment variable listing the enabled storage pool types.
pub const POOL_TYPES_ENV: &str = "VIRTFORMS_POOL_TYPES";

/// Deployment-specific validation settings.
///
/// Defaults accept every supported pool type. Override via environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Pool types the creation form accepts, in display order.
    pub pool_types: Vec<StoragePoolType>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            pool_types: StoragePoolType::ALL.to_vec(),
        }
    }
}

impl ValidationConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default             |
    /// |------------------------|---------------------|
    /// | `VIRTFORMS_POOL_TYPES` | all supported types |
    pub fn from_env() -> Self {
        match std::env::var(POOL_TYPES_ENV) {
            Ok(raw) => Self::from_pool_types(&raw),
            Err(_) => Self::default(),
        }
    }

    /// Build from a comma-separated pool type list such as `"dir,netfs,rbd"`.
    ///
    /// Unknown names are skipped with a warning. If nothing usable remains,
    /// the default set is used.
    pub fn from_pool_types(raw: &str) -> Self {
        let mut pool_types = Vec::new();
        for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match StoragePoolType::from_name(name) {
                Ok(pool_type) if !pool_types.contains(&pool_type) => pool_types.push(pool_type),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Ignoring configured pool type"),
            }
        }

        if pool_types.is_empty() {
            tracing::warn!(
                env = POOL_TYPES_ENV,
                "No usable pool types configured, enabling all"
            );
            return Self::default();
        }

        let names: Vec<&str> = pool_types.iter().map(|t| t.name()).collect();
        tracing::info!(pool_types = ?names, "Loaded pool type configuration");
        Self { pool_types }
    }

    pub fn allows(&self, pool_type: StoragePoolType) -> bool {
        self.pool_types.contains(&pool_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allows_everything() {
        let config = ValidationConfig::default();
        for pool_type in StoragePoolType::ALL {
            assert!(config.allows(*pool_type));
        }
    }

    #[test]
    fn parses_list_in_order_without_duplicates() {
        let config = ValidationConfig::from_pool_types(" netfs, dir ,netfs,,rbd");
        assert_eq!(
            config.pool_types,
            vec![
                StoragePoolType::Netfs,
                StoragePoolType::Dir,
                StoragePoolType::Rbd
            ]
        );
        assert!(!config.allows(StoragePoolType::Logical));
    }

    #[test]
    fn unknown_names_are_skipped() {
        let config = ValidationConfig::from_pool_types("dir,sheepdog");
        assert_eq!(config.pool_types, vec![StoragePoolType::Dir]);
    }

    #[test]
    fn nothing_usable_falls_back_to_default() {
        assert_eq!(ValidationConfig::from_pool_types(""), ValidationConfig::default());
        assert_eq!(
            ValidationConfig::from_pool_types("bogus, ,"),
            ValidationConfig::default()
        );
    }
}
