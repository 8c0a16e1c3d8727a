pub mod classify;

use serde::{Deserialize, Serialize};

/// A caller-supplied identifier after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Txid(String),
    Address(String),
    Invalid,
}

/// Graph node. The attribute set differs by kind: address nodes may carry
/// balance figures (only the traced address does), transaction nodes carry
/// fee and confirmation status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    #[serde(rename_all = "camelCase")]
    Address {
        #[serde(skip_serializing_if = "Option::is_none")]
        confirmed_balance_sat: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        total_received_sat: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        exchange: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Transaction { fee_sat: u64, confirmed: bool },
}

/// Directed edge between an address node and a transaction node.
///
/// The graph is a multigraph: parallel edges between the same pair are legal
/// and meaningful. Edge ids are derived deterministically from
/// `(from, to, discriminator)` so that re-deriving the same edge from
/// repeated or overlapping fetches yields the same id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_sat: Option<u64>,
    pub label: String,
}

/// A transaction as returned by the Esplora-style API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub txid: String,
    pub vin: Vec<TxInput>,
    pub vout: Vec<TxOutput>,
    pub status: TxStatus,
    #[serde(default)]
    pub fee: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxInput {
    /// Absent for coinbase inputs.
    #[serde(default)]
    pub prevout: Option<Prevout>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prevout {
    /// Absent for non-standard scripts.
    #[serde(default)]
    pub scriptpubkey_address: Option<String>,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxOutput {
    #[serde(default)]
    pub scriptpubkey_address: Option<String>,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxStatus {
    pub confirmed: bool,
    #[serde(default)]
    pub block_time: Option<i64>,
}

impl Transaction {
    /// Resolved input addresses, in the transaction's own input order.
    pub fn input_addresses(&self) -> impl Iterator<Item = &str> {
        self.vin
            .iter()
            .filter_map(|inp| inp.prevout.as_ref())
            .filter_map(|p| p.scriptpubkey_address.as_deref())
    }

    /// Resolved output addresses, in the transaction's own output order.
    pub fn output_addresses(&self) -> impl Iterator<Item = &str> {
        self.vout
            .iter()
            .filter_map(|out| out.scriptpubkey_address.as_deref())
    }

    /// Whether `address` appears among the resolved output recipients.
    pub fn pays_to(&self, address: &str) -> bool {
        self.output_addresses().any(|a| a == address)
    }

    /// Whether `address` appears among the resolved input sources.
    pub fn spends_from(&self, address: &str) -> bool {
        self.input_addresses().any(|a| a == address)
    }
}

/// Confirmed-chain totals for an address (Esplora `chain_stats`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressStats {
    pub funded_txo_sum: u64,
    pub spent_txo_sum: u64,
}

impl AddressStats {
    /// Confirmed balance, `funded - spent`. Spent exceeding funded is an
    /// upstream data inconsistency and is surfaced, never clamped.
    pub fn confirmed_balance(&self) -> Result<u64, TraceError> {
        self.funded_txo_sum
            .checked_sub(self.spent_txo_sum)
            .ok_or_else(|| {
                TraceError::Inconsistency(format!(
                    "spent_txo_sum {} exceeds funded_txo_sum {}",
                    self.spent_txo_sum, self.funded_txo_sum
                ))
            })
    }
}

/// Error taxonomy for a trace request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    /// The identifier failed classification. No gateway call was made.
    InvalidIdentifier(String),
    /// The gateway reports the address/transaction does not exist.
    NotFound,
    /// The gateway rejected the call due to rate limiting.
    RateLimited,
    /// Network failure or unexpected upstream response.
    Unavailable(String),
    /// The gateway call exceeded the configured timeout.
    Timeout,
    /// Malformed or contradictory upstream data (e.g. negative balance).
    Inconsistency(String),
}

impl std::fmt::Display for TraceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceError::InvalidIdentifier(id) => {
                write!(f, "invalid identifier: {id:?} is neither a txid nor an address")
            }
            TraceError::NotFound => write!(f, "address or transaction not found upstream"),
            TraceError::RateLimited => write!(f, "upstream rate limit exceeded"),
            TraceError::Unavailable(msg) => write!(f, "upstream unavailable: {msg}"),
            TraceError::Timeout => write!(f, "upstream request timed out"),
            TraceError::Inconsistency(msg) => write!(f, "inconsistent upstream data: {msg}"),
        }
    }
}

impl std::error::Error for TraceError {}

/// Format satoshis as a fixed 8-decimal BTC string. Display boundary only;
/// all arithmetic stays in integral satoshis.
pub fn format_btc(sat: u64) -> String {
    format!("{}.{:08} BTC", sat / 100_000_000, sat % 100_000_000)
}
