use std::collections::HashSet;

use crate::core::{
    AddressStats, Edge, Node, NodeKind, TraceError, Transaction, format_btc,
};

/// Deduplicating node/edge accumulator for one trace result.
///
/// Adding a node or edge whose id already exists is a no-op, never an
/// error. Per-leg contributions are independent, so the same builder can
/// run against repeated or overlapping transaction sets without
/// duplication, and a downstream consumer can merge results by id.
#[derive(Debug, Default)]
pub struct TraceGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_ids: HashSet<String>,
    edge_ids: HashSet<String>,
}

impl TraceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless a node with the same id exists. Returns whether inserted.
    pub fn add_node(&mut self, node: Node) -> bool {
        if !self.node_ids.insert(node.id.clone()) {
            return false;
        }
        self.nodes.push(node);
        true
    }

    /// Insert unless an edge with the same id exists. Returns whether inserted.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if !self.edge_ids.insert(edge.id.clone()) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn into_parts(self) -> (Vec<Node>, Vec<Edge>) {
        (self.nodes, self.edges)
    }
}

/// Add one transaction's contribution: the transaction node, an
/// `address -> tx` edge per resolved input and a `tx -> address` edge per
/// resolved output. Inputs and outputs without a resolvable address are
/// skipped entirely, which under-represents coinbase and non-standard
/// script flows.
pub fn build_from_tx(graph: &mut TraceGraph, tx: &Transaction) {
    graph.add_node(Node {
        id: tx.txid.clone(),
        label: tx_label(&tx.txid),
        kind: NodeKind::Transaction {
            fee_sat: tx.fee,
            confirmed: tx.status.confirmed,
        },
    });

    for input in &tx.vin {
        let Some(prevout) = &input.prevout else { continue };
        let Some(addr) = prevout.scriptpubkey_address.as_deref() else {
            continue;
        };
        graph.add_node(peripheral_address(addr));
        graph.add_edge(Edge {
            id: format!("in-{addr}-{}", tx.txid),
            from: addr.to_string(),
            to: tx.txid.clone(),
            value_sat: Some(prevout.value),
            label: format_btc(prevout.value),
        });
    }

    for (index, output) in tx.vout.iter().enumerate() {
        let Some(addr) = output.scriptpubkey_address.as_deref() else {
            continue;
        };
        graph.add_node(peripheral_address(addr));
        // The output index keeps edges distinct when several outputs pay
        // the same address.
        graph.add_edge(Edge {
            id: format!("out-{}-{addr}-{index}", tx.txid),
            from: tx.txid.clone(),
            to: addr.to_string(),
            value_sat: Some(output.value),
            label: format_btc(output.value),
        });
    }
}

/// Add an address's contribution: the central address node with its
/// confirmed balance and total received, one transaction node per recent
/// transaction, and spend/receive edges between them. Both edges may
/// coexist for a single transaction (the address paying itself change).
pub fn build_from_address(
    graph: &mut TraceGraph,
    address: &str,
    stats: &AddressStats,
    recent_txs: &[Transaction],
    exchange: Option<&str>,
) -> Result<(), TraceError> {
    let balance = stats.confirmed_balance()?;
    graph.add_node(Node {
        id: address.to_string(),
        label: central_label(address),
        kind: NodeKind::Address {
            confirmed_balance_sat: Some(balance),
            total_received_sat: Some(stats.funded_txo_sum),
            exchange: exchange.map(str::to_string),
        },
    });

    for tx in recent_txs {
        graph.add_node(Node {
            id: tx.txid.clone(),
            label: tx_label(&tx.txid),
            kind: NodeKind::Transaction {
                fee_sat: tx.fee,
                confirmed: tx.status.confirmed,
            },
        });

        if tx.spends_from(address) {
            graph.add_edge(Edge {
                id: format!("spend-{address}-{}", tx.txid),
                from: address.to_string(),
                to: tx.txid.clone(),
                value_sat: None,
                label: format!("spent in {}", short(&tx.txid, 8)),
            });
        }
        if tx.pays_to(address) {
            graph.add_edge(Edge {
                id: format!("recv-{}-{address}", tx.txid),
                from: tx.txid.clone(),
                to: address.to_string(),
                value_sat: None,
                label: format!("received in {}", short(&tx.txid, 8)),
            });
        }
    }

    Ok(())
}

/// Address node reached through a transaction leg; carries no balance data.
fn peripheral_address(addr: &str) -> Node {
    Node {
        id: addr.to_string(),
        label: addr_label(addr),
        kind: NodeKind::Address {
            confirmed_balance_sat: None,
            total_received_sat: None,
            exchange: None,
        },
    }
}

fn tx_label(txid: &str) -> String {
    format!("TX: {}...", short(txid, 8))
}

fn addr_label(addr: &str) -> String {
    if addr.len() <= 10 {
        return addr.to_string();
    }
    format!("{}...{}", &addr[..6], &addr[addr.len() - 4..])
}

fn central_label(addr: &str) -> String {
    if addr.len() <= 14 {
        return addr.to_string();
    }
    format!("{}...{}", &addr[..8], &addr[addr.len() - 6..])
}

fn short(s: &str, n: usize) -> &str {
    &s[..n.min(s.len())]
}
