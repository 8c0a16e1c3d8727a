use std::collections::HashMap;

/// In-memory lookup of known exchange addresses.
///
/// The table is caller-maintained configuration data, not derived logic:
/// it only annotates traced addresses with an entity label.
#[derive(Debug, Clone, Default)]
pub struct TagLookup {
    exchanges: HashMap<String, String>,
}

impl TagLookup {
    pub fn new(exchanges: HashMap<String, String>) -> Self {
        tracing::debug!("TagLookup loaded {} exchange addresses", exchanges.len());
        Self { exchanges }
    }

    /// Exchange label for an address, if known.
    pub fn exchange(&self, address: &str) -> Option<&str> {
        self.exchanges.get(address).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}
