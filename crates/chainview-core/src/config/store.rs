//! Reconciliation store configuration.

use serde::{Deserialize, Serialize};

/// Settings for the in-memory notification store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// How many notifications the summary's `recent` list keeps.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
        }
    }
}

fn default_recent_limit() -> usize {
    5
}
