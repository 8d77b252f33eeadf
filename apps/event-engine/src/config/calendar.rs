//! Local economic-calendar extract configuration.

use serde::{Deserialize, Serialize};

/// Settings for the locally cached calendar extract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Path to the CSV extract. Unset disables the local fallback source.
    #[serde(default)]
    pub path: Option<String>,
}
