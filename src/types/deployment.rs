use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Sequence numbers identifying a deployment's order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seqs {
    pub dseq: String,
    pub gseq: String,
    pub oseq: String,
}

/// Output of `query deployment get`
///
/// Groups and escrow are kept as raw JSON; nothing in the pipeline reads them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deployment {
    pub deployment: DeploymentInfo,
    #[serde(deserialize_with = "null_as_default")]
    pub groups: Vec<serde_json::Value>,
    pub escrow_account: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentInfo {
    pub deployment_id: DeploymentId,
    pub state: String,
    pub version: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentId {
    pub owner: String,
    pub dseq: String,
}

impl Deployment {
    pub fn is_active(&self) -> bool {
        self.deployment.state == "active"
    }
}
