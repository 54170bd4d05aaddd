//! Configuration for the legacy browsing bridge
//!
//! Controls the response size ceiling applied to item lists, the page size
//! used when a client asks for everything, and the root returned when a
//! session cannot produce one.

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

/// Root id handed to legacy clients when the session has no library root
pub const DEFAULT_ROOT_ID: &str = "androidx.media3.session.MediaLibraryService";

/// Byte ceiling of a single legacy transaction
pub const TRANSACTION_SIZE_LIMIT_IN_BYTES: usize = 256 * 1024;

/// Configuration for a [`LegacyBridge`](crate::LegacyBridge)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Maximum serialized size of an item list sent back to a legacy client
    /// Default: 256 KiB
    pub transaction_size_limit: usize,

    /// Page size requested from the session when no pagination was asked for
    /// Default: i32::MAX
    pub unbounded_page_size: i32,

    /// Root id used when the session fails to produce a root
    /// Default: [`DEFAULT_ROOT_ID`]
    pub default_root_id: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            transaction_size_limit: TRANSACTION_SIZE_LIMIT_IN_BYTES,
            unbounded_page_size: i32::MAX,
            default_root_id: DEFAULT_ROOT_ID.to_string(),
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transaction_size_limit(mut self, limit: usize) -> Self {
        self.transaction_size_limit = limit;
        self
    }

    pub fn with_default_root_id(mut self, root_id: impl Into<String>) -> Self {
        self.default_root_id = root_id.into();
        self
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        if self.transaction_size_limit == 0 {
            return Err(BridgeError::Configuration(
                "Transaction size limit must be greater than 0".to_string(),
            ));
        }

        if self.unbounded_page_size < 1 {
            return Err(BridgeError::Configuration(
                "Unbounded page size must be at least 1".to_string(),
            ));
        }

        if self.default_root_id.is_empty() {
            return Err(BridgeError::Configuration(
                "Default root id must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
