//! Record store configuration.

/// Field used as the primary key when no key-path is configured.
pub(crate) const DEFAULT_KEY_PATH: &str = "id";

/// Configuration for a record store, fixed at construction.
///
/// Bumping `version` triggers the engine's upgrade logic on the next open;
/// changing `store_name` or `key_path` without a version bump has undefined
/// effect on existing data.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Name of the database.
    pub db_name: String,
    /// Schema version (positive integer).
    pub version: u32,
    /// Name of the object store within the database.
    pub store_name: String,
    /// Field within each record used as its primary key. When absent, the
    /// store uses generated keys written through the default key-path.
    pub key_path: Option<String>,
    /// Secondary index built over the identically-named field.
    pub index_name: Option<String>,
}

impl StoreConfig {
    /// Creates a configuration with the given database and store names.
    pub fn new(db_name: impl Into<String>, store_name: impl Into<String>) -> Self {
        Self {
            db_name: db_name.into(),
            version: 1,
            store_name: store_name.into(),
            key_path: None,
            index_name: None,
        }
    }

    /// Sets the schema version.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Sets the key-path field.
    pub fn with_key_path(mut self, key_path: impl Into<String>) -> Self {
        self.key_path = Some(key_path.into());
        self
    }

    /// Sets the secondary index name.
    pub fn with_index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }

    /// Key path the object store is created with.
    pub(crate) fn effective_key_path(&self) -> &str {
        self.key_path.as_deref().unwrap_or(DEFAULT_KEY_PATH)
    }

    /// Whether the engine generates keys for records that do not carry one.
    pub(crate) fn auto_increment(&self) -> bool {
        self.key_path.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::new("d1", "items");
        assert_eq!(config.version, 1);
        assert_eq!(config.effective_key_path(), "id");
        assert!(config.auto_increment());
    }

    #[test]
    fn test_key_path_disables_generator() {
        let config = StoreConfig::new("d1", "items")
            .with_version(2)
            .with_key_path("slug")
            .with_index("status");
        assert_eq!(config.version, 2);
        assert_eq!(config.effective_key_path(), "slug");
        assert!(!config.auto_increment());
        assert_eq!(config.index_name.as_deref(), Some("status"));
    }
}
