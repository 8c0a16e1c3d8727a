use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::config::AnalysisConfig;
use crate::core::Transaction;

/// Verdict of the transaction-count check over a trailing window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeFinding {
    pub detected: bool,
    pub count: usize,
    pub window_hours: u32,
}

/// Count confirmed transactions whose block time falls within the trailing
/// window ending at `now`. Detected when the count strictly exceeds the
/// configured threshold.
pub fn analyze_high_volume(
    txs: &[Transaction],
    now: DateTime<Utc>,
    cfg: &AnalysisConfig,
) -> VolumeFinding {
    let cutoff = now.timestamp() - i64::from(cfg.volume_window_hours) * 3_600;
    let count = txs
        .iter()
        .filter(|tx| tx.status.confirmed)
        .filter(|tx| tx.status.block_time.is_some_and(|t| t >= cutoff))
        .count();

    VolumeFinding {
        detected: count > cfg.volume_min_count,
        count,
        window_hours: cfg.volume_window_hours,
    }
}

/// Per-direction event counts for the unique-counterpart check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidationFinding {
    /// Transactions paying the target from >= threshold distinct senders.
    pub consolidation_events: usize,
    /// Transactions spending from the target to >= threshold distinct recipients.
    pub fragmentation_events: usize,
    pub unique_io_threshold: usize,
}

impl ConsolidationFinding {
    pub fn consolidation_detected(&self) -> bool {
        self.consolidation_events > 0
    }

    pub fn fragmentation_detected(&self) -> bool {
        self.fragmentation_events > 0
    }
}

/// For each transaction: if the target receives, count distinct non-target
/// input addresses; if the target spends, count distinct non-target output
/// addresses. Either count reaching the threshold marks an event. Both
/// directions may fire across different transactions of the same address.
pub fn analyze_consolidation_fragmentation(
    txs: &[Transaction],
    target: &str,
    cfg: &AnalysisConfig,
) -> ConsolidationFinding {
    let mut consolidation_events = 0;
    let mut fragmentation_events = 0;

    for tx in txs {
        if tx.pays_to(target) {
            let distinct: HashSet<&str> =
                tx.input_addresses().filter(|a| *a != target).collect();
            if distinct.len() >= cfg.unique_io_threshold {
                consolidation_events += 1;
            }
        }
        if tx.spends_from(target) {
            let distinct: HashSet<&str> =
                tx.output_addresses().filter(|a| *a != target).collect();
            if distinct.len() >= cfg.unique_io_threshold {
                fragmentation_events += 1;
            }
        }
    }

    ConsolidationFinding {
        consolidation_events,
        fragmentation_events,
        unique_io_threshold: cfg.unique_io_threshold,
    }
}

/// Verdict of the dust-output check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DustingFinding {
    pub detected: bool,
    pub count: usize,
    pub dust_threshold_sat: u64,
}

/// Count outputs paid to the target with `0 < value < dust_threshold_sat`,
/// across all transactions. Several dust outputs inside one transaction
/// each count.
pub fn analyze_dusting(txs: &[Transaction], target: &str, cfg: &AnalysisConfig) -> DustingFinding {
    let count = txs
        .iter()
        .flat_map(|tx| &tx.vout)
        .filter(|out| out.scriptpubkey_address.as_deref() == Some(target))
        .filter(|out| out.value > 0 && out.value < cfg.dust_threshold_sat)
        .count();

    DustingFinding {
        detected: count >= cfg.dust_min_outputs,
        count,
        dust_threshold_sat: cfg.dust_threshold_sat,
    }
}

/// Verdict of the burst-of-incoming-transfers check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfluxFinding {
    pub detected: bool,
    pub incoming_tx_count: usize,
    pub unique_senders_count: usize,
    pub time_window_minutes: u32,
}

/// Anchor a window at the latest confirmed block time in the set (falling
/// back to `now` when nothing is confirmed) and count incoming transactions
/// inside it that carry at least one resolved external sender. Unconfirmed
/// transactions are treated as happening at `now`. Detected when both the
/// incoming count and the distinct-sender count reach their thresholds.
pub fn analyze_rapid_influx(
    txs: &[Transaction],
    target: &str,
    now: DateTime<Utc>,
    cfg: &AnalysisConfig,
) -> InfluxFinding {
    let not_detected = |incoming: usize, senders: usize| InfluxFinding {
        detected: false,
        incoming_tx_count: incoming,
        unique_senders_count: senders,
        time_window_minutes: cfg.influx_window_minutes,
    };

    if txs.is_empty() {
        return not_detected(0, 0);
    }

    let reference = txs
        .iter()
        .filter(|tx| tx.status.confirmed)
        .filter_map(|tx| tx.status.block_time)
        .max()
        .unwrap_or_else(|| now.timestamp());
    let window_start = reference - i64::from(cfg.influx_window_minutes) * 60;

    let mut incoming = 0;
    let mut senders: HashSet<&str> = HashSet::new();

    for tx in txs {
        let tx_time = match (tx.status.confirmed, tx.status.block_time) {
            (true, Some(t)) => t,
            _ => now.timestamp(),
        };
        if tx_time < window_start || tx_time > reference {
            continue;
        }
        if !tx.pays_to(target) {
            continue;
        }

        let external: Vec<&str> = tx.input_addresses().filter(|a| *a != target).collect();
        if external.is_empty() {
            // self-spend back into the target, no external sender
            continue;
        }
        incoming += 1;
        senders.extend(external);
    }

    InfluxFinding {
        detected: incoming >= cfg.influx_min_txs && senders.len() >= cfg.influx_min_senders,
        incoming_tx_count: incoming,
        unique_senders_count: senders.len(),
        time_window_minutes: cfg.influx_window_minutes,
    }
}
