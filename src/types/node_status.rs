use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ClientError, ClientResult};

/// Output of `provider-services status`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeStatus {
    // Older CLI releases print `SyncInfo`, newer ones `sync_info`
    #[serde(alias = "SyncInfo")]
    pub sync_info: SyncInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncInfo {
    pub latest_block_height: String,
    pub latest_block_time: String,
    pub catching_up: bool,
}

impl NodeStatus {
    pub fn latest_height(&self) -> ClientResult<u64> {
        self.sync_info
            .latest_block_height
            .parse()
            .map_err(|e| {
                ClientError::Handler(format!(
                    "invalid latest_block_height '{}': {e}",
                    self.sync_info.latest_block_height
                ))
            })
    }

    pub fn latest_block_time(&self) -> ClientResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.sync_info.latest_block_time)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| {
                ClientError::Handler(format!(
                    "invalid latest_block_time '{}': {e}",
                    self.sync_info.latest_block_time
                ))
            })
    }

    pub fn is_catching_up(&self) -> bool {
        self.sync_info.catching_up
    }
}
