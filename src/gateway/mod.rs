use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::core::{AddressStats, TraceError, Transaction};

/// Read access to the upstream blockchain data provider.
///
/// The core never retries; retry policy, if any, belongs to the
/// implementation behind this trait.
#[async_trait]
pub trait BlockchainGateway: Send + Sync {
    /// Confirmed-chain stats for an address.
    async fn address_stats(&self, address: &str) -> Result<AddressStats, TraceError>;

    /// Most recent transactions touching an address, newest first,
    /// truncated to `limit`.
    async fn address_transactions(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<Transaction>, TraceError>;

    /// Full detail for a single transaction.
    async fn transaction(&self, txid: &str) -> Result<Transaction, TraceError>;
}

/// Esplora-style REST client (mempool.space API).
pub struct EsploraGateway {
    base_url: String,
    client: Client,
    timeout: Duration,
}

/// Esplora `/address/{addr}` response; only `chain_stats` is consumed.
#[derive(Debug, Deserialize)]
struct AddressInfo {
    chain_stats: AddressStats,
}

impl EsploraGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            timeout,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TraceError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {url}");

        let resp = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(map_transport_error)?;

        match resp.status() {
            // Esplora answers 400 for malformed addresses, 404 for unknown ones
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => Err(TraceError::NotFound),
            StatusCode::TOO_MANY_REQUESTS => Err(TraceError::RateLimited),
            status if !status.is_success() => {
                Err(TraceError::Unavailable(format!("{url} returned {status}")))
            }
            _ => resp.json::<T>().await.map_err(map_transport_error),
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> TraceError {
    if e.is_timeout() {
        TraceError::Timeout
    } else {
        TraceError::Unavailable(e.to_string())
    }
}

#[async_trait]
impl BlockchainGateway for EsploraGateway {
    async fn address_stats(&self, address: &str) -> Result<AddressStats, TraceError> {
        let info: AddressInfo = self.get_json(&format!("/address/{address}")).await?;
        Ok(info.chain_stats)
    }

    async fn address_transactions(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<Transaction>, TraceError> {
        let mut txs: Vec<Transaction> =
            self.get_json(&format!("/address/{address}/txs")).await?;
        txs.truncate(limit);
        Ok(txs)
    }

    async fn transaction(&self, txid: &str) -> Result<Transaction, TraceError> {
        self.get_json(&format!("/tx/{txid}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_esplora_transaction() {
        let json = r#"{
            "txid": "f4184fc596403b9d638783cf57adfe4c75c605f6356fbc91338530e9831e9e16",
            "version": 1,
            "locktime": 0,
            "vin": [
                {
                    "txid": "0437cd7f8525ceed2324359c2d0ba26006d92d856a9c20fa0241106ee5a597c9",
                    "vout": 0,
                    "prevout": {
                        "scriptpubkey": "410411db93e1dcdb8a016b49840f8c53bc1eb68a382e97b1482ecad7b148a6909a5cac",
                        "scriptpubkey_type": "p2pk",
                        "value": 5000000000
                    },
                    "is_coinbase": false,
                    "sequence": 4294967295
                }
            ],
            "vout": [
                {
                    "scriptpubkey": "76a914...88ac",
                    "scriptpubkey_type": "p2pkh",
                    "scriptpubkey_address": "1Q2TWHE3GMdB6BZKafqwxXtWAWgFt5Jvm3",
                    "value": 1000000000
                },
                {
                    "scriptpubkey": "41047...ac",
                    "scriptpubkey_type": "p2pk",
                    "value": 4000000000
                }
            ],
            "size": 275,
            "weight": 1100,
            "fee": 0,
            "status": {
                "confirmed": true,
                "block_height": 170,
                "block_hash": "00000000d1145790a8694403d4063f323d499e655c83426834d4ce2f8dd4a2ee",
                "block_time": 1231731025
            }
        }"#;

        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.vin.len(), 1);
        // p2pk prevout has no address but keeps its value
        assert_eq!(tx.vin[0].prevout.as_ref().unwrap().scriptpubkey_address, None);
        assert_eq!(tx.vin[0].prevout.as_ref().unwrap().value, 5_000_000_000);
        assert_eq!(
            tx.vout[0].scriptpubkey_address.as_deref(),
            Some("1Q2TWHE3GMdB6BZKafqwxXtWAWgFt5Jvm3")
        );
        assert!(tx.status.confirmed);
        assert_eq!(tx.status.block_time, Some(1_231_731_025));
    }

    #[test]
    fn deserializes_coinbase_input_without_prevout() {
        let tx: Transaction = serde_json::from_str(
            r#"{
                "txid": "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b",
                "vin": [{"is_coinbase": true, "sequence": 4294967295}],
                "vout": [{"scriptpubkey_type": "p2pk", "value": 5000000000}],
                "status": {"confirmed": false}
            }"#,
        )
        .unwrap();
        assert_eq!(tx.vin[0].prevout, None);
        assert_eq!(tx.status.block_time, None);
        assert_eq!(tx.fee, 0);
    }

    #[test]
    fn deserializes_address_info() {
        let json = r#"{
            "address": "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa",
            "chain_stats": {
                "funded_txo_count": 4190,
                "funded_txo_sum": 10394044538,
                "spent_txo_count": 0,
                "spent_txo_sum": 0,
                "tx_count": 4186
            },
            "mempool_stats": {
                "funded_txo_count": 0,
                "funded_txo_sum": 0,
                "spent_txo_count": 0,
                "spent_txo_sum": 0,
                "tx_count": 0
            }
        }"#;
        let info: AddressInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.chain_stats.funded_txo_sum, 10_394_044_538);
        assert_eq!(info.chain_stats.spent_txo_sum, 0);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let gw = EsploraGateway::new("https://mempool.space/api/", Duration::from_secs(5));
        assert_eq!(gw.base_url, "https://mempool.space/api");
    }
}
