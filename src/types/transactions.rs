use serde::{Deserialize, Serialize};

use super::null_as_default;
use crate::errors::{ClientError, ClientResult};

/// Ledger response for a broadcast or queried transaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transaction {
    #[serde(deserialize_with = "null_as_default")]
    pub height: String,
    #[serde(deserialize_with = "null_as_default")]
    pub txhash: String,
    /// ABCI result code, 0 on success. Absent from some query outputs.
    #[serde(deserialize_with = "null_as_default")]
    pub code: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub logs: Vec<TransactionLog>,
    #[serde(deserialize_with = "null_as_default")]
    pub raw_log: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionLog {
    #[serde(deserialize_with = "null_as_default")]
    pub events: Vec<TransactionEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionEvent {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub event_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub attributes: TransactionEventAttributes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionEventAttribute {
    pub key: String,
    pub value: String,
}

/// Ordered key/value pairs of one event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionEventAttributes(pub Vec<TransactionEventAttribute>);

impl TransactionEventAttributes {
    /// Value of the first attribute named `key`
    pub fn get(&self, key: &str) -> ClientResult<&str> {
        self.0
            .iter()
            .find(|attr| attr.key == key)
            .map(|attr| attr.value.as_str())
            .ok_or_else(|| ClientError::AttributeNotFound(key.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransactionEventAttribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Transaction {
    /// A record without logs never describes a successful transaction
    pub fn failed(&self) -> bool {
        self.logs.is_empty()
    }

    /// Rejected at broadcast time, before reaching a block
    pub fn rejected(&self) -> bool {
        self.code != 0
    }

    pub fn events(&self) -> impl Iterator<Item = &TransactionEvent> {
        self.logs.iter().flat_map(|log| log.events.iter())
    }

    pub fn events_by_type(&self, event_type: &str) -> Vec<&TransactionEvent> {
        self.events()
            .filter(|event| event.event_type == event_type)
            .collect()
    }

    /// First value for `key` across all events of all logs
    pub fn find_attribute(&self, key: &str) -> ClientResult<&str> {
        self.events()
            .find_map(|event| event.attributes.get(key).ok())
            .ok_or_else(|| ClientError::AttributeNotFound(key.to_string()))
    }

    /// Attributes of the first event that carries `key`
    pub fn attributes_with(&self, key: &str) -> ClientResult<&TransactionEventAttributes> {
        self.events()
            .map(|event| &event.attributes)
            .find(|attrs| attrs.get(key).is_ok())
            .ok_or_else(|| ClientError::AttributeNotFound(key.to_string()))
    }
}
