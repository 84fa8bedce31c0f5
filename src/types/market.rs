use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Output of `query market bid list`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BidList {
    #[serde(deserialize_with = "null_as_default")]
    pub bids: Vec<BidEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BidEntry {
    pub bid: Bid,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bid {
    pub bid_id: BidId,
    pub state: String,
    pub price: Coin,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BidId {
    pub owner: String,
    pub dseq: String,
    pub gseq: u32,
    pub oseq: u32,
    pub provider: String,
}

/// Decimal coin amount as printed by the ledger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

impl BidList {
    pub fn into_bids(self) -> Vec<Bid> {
        self.bids.into_iter().map(|entry| entry.bid).collect()
    }
}

impl Bid {
    pub fn is_open(&self) -> bool {
        self.state == "open"
    }
}
