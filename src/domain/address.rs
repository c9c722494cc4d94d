//! Address Helpers
//!
//! EVM address validation, EIP-55 checksum formatting and the free-text
//! contract-address heuristic used by the dialogue machine.

use sha3::{Digest, Keccak256};

/// Minimum length for free text to be treated as a contract lookup
pub const CONTRACT_LOOKUP_MIN_LEN: usize = 40;

/// Returns true when free text should be handled as a token lookup.
///
/// The check is deliberately loose (`0x` prefix and 40+ characters) and runs
/// before the dialogue state is consulted.
pub fn looks_like_contract_address(text: &str) -> bool {
    text.starts_with("0x") && text.len() >= CONTRACT_LOOKUP_MIN_LEN
}

/// Validate an EVM address.
///
/// Accepts 40 hex digits with or without the `0x` prefix. All-lowercase and
/// all-uppercase input is accepted as-is; mixed case must match its EIP-55
/// checksum.
pub fn is_valid_address(raw: &str) -> bool {
    let body = raw.strip_prefix("0x").unwrap_or(raw);
    if body.len() != 40 || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return false;
    }

    let has_lower = body.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = body.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        return to_checksum_address(body)[2..] == *body;
    }
    true
}

/// Format 40 hex digits (no prefix) as an EIP-55 checksummed address
pub fn to_checksum_address(hex_body: &str) -> String {
    let lower = hex_body.to_ascii_lowercase();
    let hash = Keccak256::digest(lower.as_bytes());

    let mut out = String::with_capacity(2 + lower.len());
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Display form of an address: first 6 + `...` + last 4 characters
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
