use chrono::{Local, TimeZone};
use serde::Serialize;

use crate::core::{Transaction, format_btc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

/// One transaction reduced to the target address's point of view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTx {
    pub txid: String,
    pub timestamp: String,
    pub direction: Direction,
    pub amount_sat: u64,
    pub amount_btc: String,
    pub counterparts: Vec<String>,
    pub confirmed: bool,
}

/// Summarize the display-bounded transaction list for the target address.
pub fn summarize_recent(target: &str, txs: &[Transaction]) -> Vec<RecentTx> {
    txs.iter().map(|tx| summarize_tx(target, tx)).collect()
}

fn summarize_tx(target: &str, tx: &Transaction) -> RecentTx {
    let mut value_in: u64 = 0;
    let mut value_out: u64 = 0;
    // Distinct addresses in encounter order; the counterpart selection
    // deliberately follows the transaction's own leg ordering.
    let mut input_addrs: Vec<&str> = Vec::new();
    let mut output_addrs: Vec<&str> = Vec::new();

    for input in &tx.vin {
        let Some(prevout) = &input.prevout else { continue };
        let Some(addr) = prevout.scriptpubkey_address.as_deref() else {
            continue;
        };
        if !input_addrs.contains(&addr) {
            input_addrs.push(addr);
        }
        if addr == target {
            value_out += prevout.value;
        }
    }
    for output in &tx.vout {
        let Some(addr) = output.scriptpubkey_address.as_deref() else {
            continue;
        };
        if !output_addrs.contains(&addr) {
            output_addrs.push(addr);
        }
        if addr == target {
            value_in += output.value;
        }
    }

    let net = value_in as i64 - value_out as i64;
    // Net of exactly zero (a pure self-transfer) classifies as inbound.
    let direction = if net >= 0 { Direction::In } else { Direction::Out };
    let amount_sat = net.unsigned_abs();

    let opposing = match direction {
        Direction::In => &input_addrs,
        Direction::Out => &output_addrs,
    };
    let counterparts: Vec<String> = opposing
        .iter()
        .filter(|a| **a != target)
        .take(2)
        .map(|a| a.to_string())
        .collect();

    RecentTx {
        txid: tx.txid.clone(),
        timestamp: format_timestamp(tx),
        direction,
        amount_sat,
        amount_btc: format_btc(amount_sat),
        counterparts,
        confirmed: tx.status.confirmed,
    }
}

fn format_timestamp(tx: &Transaction) -> String {
    if tx.status.confirmed {
        if let Some(t) = tx.status.block_time {
            if let Some(dt) = Local.timestamp_opt(t, 0).single() {
                return dt.format("%m/%d/%Y, %H:%M:%S").to_string();
            }
        }
    }
    "Unconfirmed".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Prevout, TxInput, TxOutput, TxStatus};

    const TARGET: &str = "target";

    fn make_tx(
        txid: &str,
        inputs: &[(&str, u64)],
        outputs: &[(&str, u64)],
        block_time: Option<i64>,
    ) -> Transaction {
        Transaction {
            txid: txid.to_string(),
            vin: inputs
                .iter()
                .map(|(addr, value)| TxInput {
                    prevout: Some(Prevout {
                        scriptpubkey_address: Some(addr.to_string()),
                        value: *value,
                    }),
                })
                .collect(),
            vout: outputs
                .iter()
                .map(|(addr, value)| TxOutput {
                    scriptpubkey_address: Some(addr.to_string()),
                    value: *value,
                })
                .collect(),
            status: TxStatus {
                confirmed: block_time.is_some(),
                block_time,
            },
            fee: 300,
        }
    }

    #[test]
    fn incoming_payment() {
        let tx = make_tx(
            "t1",
            &[("alice", 50_000)],
            &[(TARGET, 49_000)],
            Some(1_700_000_000),
        );
        let summary = &summarize_recent(TARGET, &[tx])[0];
        assert_eq!(summary.direction, Direction::In);
        assert_eq!(summary.amount_sat, 49_000);
        assert_eq!(summary.amount_btc, "0.00049000 BTC");
        assert_eq!(summary.counterparts, vec!["alice"]);
        assert!(summary.confirmed);
        assert_ne!(summary.timestamp, "Unconfirmed");
    }

    #[test]
    fn outgoing_payment_with_change() {
        let tx = make_tx(
            "t1",
            &[(TARGET, 100_000)],
            &[("bob", 60_000), (TARGET, 39_000)],
            Some(1_700_000_000),
        );
        let summary = &summarize_recent(TARGET, &[tx])[0];
        // net = 39_000 - 100_000
        assert_eq!(summary.direction, Direction::Out);
        assert_eq!(summary.amount_sat, 61_000);
        assert_eq!(summary.counterparts, vec!["bob"]);
    }

    #[test]
    fn counterparts_capped_at_two_in_encounter_order() {
        let tx = make_tx(
            "t1",
            &[(TARGET, 100_000)],
            &[
                ("eve", 20_000),
                ("dan", 20_000),
                ("carol", 20_000),
                ("bob", 20_000),
                ("alice", 19_000),
            ],
            Some(1_700_000_000),
        );
        let summary = &summarize_recent(TARGET, &[tx])[0];
        assert_eq!(summary.direction, Direction::Out);
        // first two by leg order, not sorted or largest
        assert_eq!(summary.counterparts, vec!["eve", "dan"]);
    }

    #[test]
    fn counterparts_exclude_target_and_dedupe() {
        let tx = make_tx(
            "t1",
            &[(TARGET, 100_000)],
            &[
                (TARGET, 10_000),
                ("bob", 20_000),
                ("bob", 5_000),
                ("carol", 30_000),
            ],
            Some(1_700_000_000),
        );
        let summary = &summarize_recent(TARGET, &[tx])[0];
        assert_eq!(summary.counterparts, vec!["bob", "carol"]);
    }

    #[test]
    fn zero_net_classifies_as_in() {
        // target pays itself everything minus nothing: in == out
        let tx = make_tx(
            "t1",
            &[(TARGET, 50_000)],
            &[(TARGET, 50_000)],
            Some(1_700_000_000),
        );
        let summary = &summarize_recent(TARGET, &[tx])[0];
        assert_eq!(summary.direction, Direction::In);
        assert_eq!(summary.amount_sat, 0);
    }

    #[test]
    fn unconfirmed_uses_literal_timestamp() {
        let tx = make_tx("t1", &[("alice", 50_000)], &[(TARGET, 49_000)], None);
        let summary = &summarize_recent(TARGET, &[tx])[0];
        assert_eq!(summary.timestamp, "Unconfirmed");
        assert!(!summary.confirmed);
    }

    #[test]
    fn unresolved_legs_are_inert() {
        let mut tx = make_tx("t1", &[], &[(TARGET, 10_000)], Some(1_700_000_000));
        tx.vin.push(TxInput { prevout: None });
        tx.vout.push(TxOutput {
            scriptpubkey_address: None,
            value: 7_000,
        });
        let summary = &summarize_recent(TARGET, &[tx])[0];
        assert_eq!(summary.direction, Direction::In);
        assert_eq!(summary.amount_sat, 10_000);
        assert!(summary.counterparts.is_empty());
    }

    #[test]
    fn one_summary_per_transaction() {
        let txs = vec![
            make_tx("t1", &[("alice", 5_000)], &[(TARGET, 4_000)], Some(1_700_000_000)),
            make_tx("t2", &[(TARGET, 4_000)], &[("bob", 3_500)], None),
        ];
        let summaries = summarize_recent(TARGET, &txs);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].txid, "t1");
        assert_eq!(summaries[1].direction, Direction::Out);
    }
}
