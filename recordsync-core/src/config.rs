//! Configuration of the synchronization engine.

/// Default length of the random suffix appended to temporary column names.
pub const DEFAULT_TEMP_SUFFIX_LEN: usize = 5;

/// Name of the reserved collection whose table carries a JSON `value` column.
pub const DEFAULT_PARAMS_COLLECTION: &str = "_params";

/// Settings shared by every synchronization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Length of the random suffix of temporary column names, values below one count as one
    pub temp_suffix_len: usize,

    /// Collection that receives the extra JSON `value` column on creation
    pub params_collection: String,

    /// Create the collection scoped unique indexes of auth collections
    pub auth_unique_indexes: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            temp_suffix_len: DEFAULT_TEMP_SUFFIX_LEN,
            params_collection: DEFAULT_PARAMS_COLLECTION.to_owned(),
            auth_unique_indexes: true,
        }
    }
}

/// Configuration builder for customizing the engine
#[derive(Debug)]
pub struct ConfigBuilder {
    config: SyncConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values
    pub fn new() -> Self {
        Self {
            config: SyncConfig::default(),
        }
    }

    /// Set the length of temporary column suffixes, at least one character is kept
    pub fn temp_suffix_len(mut self, len: usize) -> Self {
        self.config.temp_suffix_len = len.max(1);
        self
    }

    /// Set the name of the params collection
    pub fn params_collection(mut self, name: impl Into<String>) -> Self {
        self.config.params_collection = name.into();
        self
    }

    /// Enable or disable the auth unique indexes
    pub fn auth_unique_indexes(mut self, enabled: bool) -> Self {
        self.config.auth_unique_indexes = enabled;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> SyncConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
