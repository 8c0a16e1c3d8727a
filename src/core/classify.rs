use super::Identifier;

/// Classify a raw identifier string as a txid, an address, or invalid.
///
/// Syntactic heuristic only: exactly 64 hex characters is a txid, anything
/// 26-62 characters long is assumed to be an address. No checksum or
/// network validation is performed, so a well-formed-looking but
/// nonexistent address classifies as `Address` and fails at fetch time.
pub fn classify(raw: &str) -> Identifier {
    if raw.len() == 64 && raw.chars().all(|c| c.is_ascii_hexdigit()) {
        return Identifier::Txid(raw.to_string());
    }
    if (26..=62).contains(&raw.len()) {
        return Identifier::Address(raw.to_string());
    }
    Identifier::Invalid
}
