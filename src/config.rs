use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub analysis: AnalysisConfig,
    pub display: DisplayConfig,
    pub tags: TagConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GatewayConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    /// How many transactions to fetch per address for analysis.
    pub tx_fetch_limit: usize,
}

/// Detector thresholds. These are policy, not mechanism: the detectors take
/// them as parameters so they stay testable against arbitrary values.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AnalysisConfig {
    pub volume_window_hours: u32,
    pub volume_min_count: usize,
    pub unique_io_threshold: usize,
    pub dust_threshold_sat: u64,
    pub dust_min_outputs: usize,
    pub influx_window_minutes: u32,
    pub influx_min_txs: usize,
    pub influx_min_senders: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    /// Recent transactions shown in the graph and summary list.
    pub recent_tx_limit: usize,
}

/// Static lookup table mapping known addresses to an exchange label.
/// Caller-maintained configuration data, not derived logic.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TagConfig {
    pub exchanges: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            analysis: AnalysisConfig::default(),
            display: DisplayConfig::default(),
            tags: TagConfig::default(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://mempool.space/api".into(),
            timeout_seconds: 10,
            tx_fetch_limit: 25,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            volume_window_hours: 24,
            volume_min_count: 20,
            unique_io_threshold: 5,
            dust_threshold_sat: 1_000,
            dust_min_outputs: 5,
            influx_window_minutes: 240,
            influx_min_txs: 5,
            influx_min_senders: 3,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { recent_tx_limit: 10 }
    }
}

impl Config {
    /// Load config from a TOML file. Falls back to defaults if file doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Config loaded from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config: Config = toml::from_str(
            r#"
            [analysis]
            dust_threshold_sat = 546

            [tags.exchanges]
            "bc1qexample" = "Binance"
            "#,
        )
        .unwrap();
        assert_eq!(config.analysis.dust_threshold_sat, 546);
        assert_eq!(config.analysis.volume_min_count, 20);
        assert_eq!(config.gateway.base_url, "https://mempool.space/api");
        assert_eq!(config.display.recent_tx_limit, 10);
        assert_eq!(
            config.tags.exchanges.get("bc1qexample").map(String::as_str),
            Some("Binance")
        );
    }
}
