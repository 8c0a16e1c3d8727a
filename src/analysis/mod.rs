pub mod detectors;
pub mod summary;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use crate::config::AnalysisConfig;
use crate::core::Transaction;

/// Behavioral pattern names, serialized with the display names the
/// response contract uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PatternKind {
    #[serde(rename = "High Transaction Volume")]
    HighVolume,
    #[serde(rename = "Consolidation/Fragmentation")]
    ConsolidationFragmentation,
    #[serde(rename = "Dusting Activity")]
    Dusting,
    #[serde(rename = "Rapid Influx from Multiple Sources")]
    RapidInflux,
}

/// One detector verdict with its supporting detail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pattern {
    pub name: PatternKind,
    pub detected: bool,
    pub detail: serde_json::Value,
}

/// The pattern engine runs every detector over the full fetched
/// transaction set. Detectors are independent, stateless and never mutate
/// their input; the emission order here is fixed for determinism but
/// carries no meaning to consumers.
pub struct PatternEngine {
    config: AnalysisConfig,
}

impl PatternEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn analyze(
        &self,
        txs: &[Transaction],
        target: &str,
        now: DateTime<Utc>,
    ) -> Vec<Pattern> {
        let cfg = &self.config;
        let mut patterns = Vec::new();

        let volume = detectors::analyze_high_volume(txs, now, cfg);
        patterns.push(Pattern {
            name: PatternKind::HighVolume,
            detected: volume.detected,
            detail: json!({
                "count": volume.count,
                "windowHours": volume.window_hours,
            }),
        });

        // Consolidation/fragmentation contributes one record per direction
        // that fires, or a single quiet record when neither does.
        let consfrag = detectors::analyze_consolidation_fragmentation(txs, target, cfg);
        if consfrag.consolidation_detected() {
            patterns.push(Pattern {
                name: PatternKind::ConsolidationFragmentation,
                detected: true,
                detail: json!({
                    "type": "consolidation",
                    "count": consfrag.consolidation_events,
                    "thresholdInputs": consfrag.unique_io_threshold,
                }),
            });
        }
        if consfrag.fragmentation_detected() {
            patterns.push(Pattern {
                name: PatternKind::ConsolidationFragmentation,
                detected: true,
                detail: json!({
                    "type": "fragmentation",
                    "count": consfrag.fragmentation_events,
                    "thresholdOutputs": consfrag.unique_io_threshold,
                }),
            });
        }
        if !consfrag.consolidation_detected() && !consfrag.fragmentation_detected() {
            patterns.push(Pattern {
                name: PatternKind::ConsolidationFragmentation,
                detected: false,
                detail: json!({
                    "uniqueIoThreshold": consfrag.unique_io_threshold,
                }),
            });
        }

        let dusting = detectors::analyze_dusting(txs, target, cfg);
        patterns.push(Pattern {
            name: PatternKind::Dusting,
            detected: dusting.detected,
            detail: json!({
                "count": dusting.count,
                "dustThresholdSat": dusting.dust_threshold_sat,
            }),
        });

        let influx = detectors::analyze_rapid_influx(txs, target, now, cfg);
        patterns.push(Pattern {
            name: PatternKind::RapidInflux,
            detected: influx.detected,
            detail: json!({
                "incomingTxCount": influx.incoming_tx_count,
                "uniqueSendersCount": influx.unique_senders_count,
                "timeWindowMinutes": influx.time_window_minutes,
            }),
        });

        patterns
    }
}
