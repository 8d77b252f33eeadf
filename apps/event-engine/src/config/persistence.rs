//! Event store configuration.

use serde::{Deserialize, Serialize};

/// Settings for the durable event store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// SQLite database URL.
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://events.db".to_string()
}
