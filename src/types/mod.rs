//! Wire records decoded from `provider-services ... -o json`
//!
//! Every field defaults when missing: the CLI's output shape drifts between
//! releases and a missing field must never turn into a panic. Fields the CLI
//! may print as `null` go through `null_as_default` as well.

pub mod deployment;
pub mod market;
pub mod node_status;
pub mod transactions;

use serde::{Deserialize, Deserializer};

/// Decode `null` like a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub use deployment::{Deployment, DeploymentId, DeploymentInfo, Seqs};
pub use market::{Bid, BidEntry, BidId, BidList, Coin};
pub use node_status::{NodeStatus, SyncInfo};
pub use transactions::{
    Transaction, TransactionEvent, TransactionEventAttribute, TransactionEventAttributes,
    TransactionLog,
};
