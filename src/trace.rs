use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::analysis::summary::{RecentTx, summarize_recent};
use crate::analysis::{Pattern, PatternEngine};
use crate::config::Config;
use crate::core::classify::classify;
use crate::core::{Edge, Identifier, Node, TraceError, format_btc};
use crate::gateway::BlockchainGateway;
use crate::graph::{TraceGraph, build_from_address, build_from_tx};
use crate::tags::TagLookup;

/// Per-address summary attached to an address trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSummary {
    pub address: String,
    pub total_received_btc: String,
    pub confirmed_balance_btc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    pub behavioral_patterns: Vec<Pattern>,
}

/// Result of one trace request. A transaction trace carries only the
/// graph; summary and recent transactions are address-scoped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceResult {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<AddressSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_transactions: Option<Vec<RecentTx>>,
}

/// Top-level trace operation: classify, fetch, build, analyze, assemble.
///
/// Everything is created fresh per request from gateway responses; nothing
/// is cached or persisted across calls.
pub struct Tracer<G> {
    gateway: G,
    engine: PatternEngine,
    tags: TagLookup,
    tx_fetch_limit: usize,
    recent_tx_limit: usize,
}

impl<G: BlockchainGateway> Tracer<G> {
    pub fn new(gateway: G, config: &Config) -> Self {
        Self {
            gateway,
            engine: PatternEngine::new(config.analysis.clone()),
            tags: TagLookup::new(config.tags.exchanges.clone()),
            tx_fetch_limit: config.gateway.tx_fetch_limit,
            recent_tx_limit: config.display.recent_tx_limit,
        }
    }

    pub async fn trace(&self, identifier: &str) -> Result<TraceResult, TraceError> {
        match classify(identifier) {
            Identifier::Txid(txid) => self.trace_tx(&txid).await,
            Identifier::Address(addr) => self.trace_address(&addr).await,
            Identifier::Invalid => Err(TraceError::InvalidIdentifier(identifier.to_string())),
        }
    }

    async fn trace_tx(&self, txid: &str) -> Result<TraceResult, TraceError> {
        info!("tracing transaction {txid}");
        let tx = self.gateway.transaction(txid).await?;

        let mut graph = TraceGraph::new();
        build_from_tx(&mut graph, &tx);
        let (nodes, edges) = graph.into_parts();
        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            "transaction trace assembled"
        );

        // Behavioral analysis is address-scoped by design; a transaction
        // trace never carries a summary or recent-transaction list.
        Ok(TraceResult {
            nodes,
            edges,
            summary: None,
            recent_transactions: None,
        })
    }

    async fn trace_address(&self, address: &str) -> Result<TraceResult, TraceError> {
        info!("tracing address {address}");

        // The two fetches are independent; either failure fails the whole
        // trace, no partial address results.
        let (stats, txs) = tokio::try_join!(
            self.gateway.address_stats(address),
            self.gateway.address_transactions(address, self.tx_fetch_limit),
        )?;
        debug!(
            fetched = txs.len(),
            funded = stats.funded_txo_sum,
            spent = stats.spent_txo_sum,
            "address data fetched"
        );

        let display_txs = &txs[..txs.len().min(self.recent_tx_limit)];
        let exchange = self.tags.exchange(address);

        let mut graph = TraceGraph::new();
        build_from_address(&mut graph, address, &stats, display_txs, exchange)?;

        // Detectors run over the full fetched set, not the display subset.
        let patterns = self.engine.analyze(&txs, address, Utc::now());
        let recent = summarize_recent(address, display_txs);

        let summary = AddressSummary {
            address: address.to_string(),
            total_received_btc: format_btc(stats.funded_txo_sum),
            confirmed_balance_btc: format_btc(stats.confirmed_balance()?),
            exchange: exchange.map(str::to_string),
            behavioral_patterns: patterns,
        };

        let (nodes, edges) = graph.into_parts();
        info!(
            nodes = nodes.len(),
            edges = edges.len(),
            patterns = summary.behavioral_patterns.len(),
            "address trace assembled"
        );

        Ok(TraceResult {
            nodes,
            edges,
            summary: Some(summary),
            recent_transactions: Some(recent),
        })
    }
}
