//! Minimal ABI decoding for ERC-20 view functions and bytecode inspection.

use sha3::{Digest, Keccak256};
use thiserror::Error;

const WORD: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AbiError {
    #[error("Return data too short: {0} bytes")]
    TooShort(usize),

    #[error("Value does not fit: {0}")]
    Overflow(&'static str),

    #[error("Invalid UTF-8 in string return")]
    InvalidUtf8,
}

/// First four bytes of keccak256 over a function signature
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Calldata for a zero-argument call, `0x`-prefixed hex
pub fn calldata(signature: &str) -> String {
    format!("0x{}", hex::encode(selector(signature)))
}

/// Decode a `string` return, falling back to `bytes32` for legacy tokens
pub fn decode_string(data: &[u8]) -> Result<String, AbiError> {
    if data.len() == WORD {
        let end = data.iter().position(|b| *b == 0).unwrap_or(WORD);
        return String::from_utf8(data[..end].to_vec()).map_err(|_| AbiError::InvalidUtf8);
    }

    if data.len() < 2 * WORD {
        return Err(AbiError::TooShort(data.len()));
    }

    let offset = word_to_usize(&data[..WORD])?;
    let len_end = offset
        .checked_add(WORD)
        .ok_or(AbiError::Overflow("string offset"))?;
    if data.len() < len_end {
        return Err(AbiError::TooShort(data.len()));
    }

    let len = word_to_usize(&data[offset..len_end])?;
    let end = len_end
        .checked_add(len)
        .ok_or(AbiError::Overflow("string length"))?;
    if data.len() < end {
        return Err(AbiError::TooShort(data.len()));
    }

    String::from_utf8(data[len_end..end].to_vec()).map_err(|_| AbiError::InvalidUtf8)
}

/// Decode a `uint256` return into a `u128`
pub fn decode_u128(data: &[u8]) -> Result<u128, AbiError> {
    if data.len() < WORD {
        return Err(AbiError::TooShort(data.len()));
    }
    let word = &data[..WORD];
    if word[..16].iter().any(|b| *b != 0) {
        return Err(AbiError::Overflow("uint256 exceeds u128"));
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&word[16..]);
    Ok(u128::from_be_bytes(low))
}

/// Decode a `uint8` return
pub fn decode_u8(data: &[u8]) -> Result<u8, AbiError> {
    let value = decode_u128(data)?;
    u8::try_from(value).map_err(|_| AbiError::Overflow("uint8"))
}

fn word_to_usize(word: &[u8]) -> Result<usize, AbiError> {
    let value = decode_u128(word)?;
    usize::try_from(value).map_err(|_| AbiError::Overflow("usize"))
}

/// Selectors pushed by `PUSH4` in runtime bytecode (dispatcher table)
pub fn push4_selectors(code: &[u8]) -> Vec<[u8; 4]> {
    const PUSH1: u8 = 0x60;
    const PUSH4: u8 = 0x63;
    const PUSH32: u8 = 0x7f;

    let mut found = Vec::new();
    let mut pc = 0;
    while pc < code.len() {
        let op = code[pc];
        if op == PUSH4 && pc + 4 < code.len() {
            found.push([code[pc + 1], code[pc + 2], code[pc + 3], code[pc + 4]]);
        }
        // skip immediate data of any PUSH
        if (PUSH1..=PUSH32).contains(&op) {
            pc += (op - PUSH1 + 1) as usize;
        }
        pc += 1;
    }
    found
}

/// Parse `0x`-prefixed hex returned by the node
pub fn decode_hex(raw: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let body = raw.strip_prefix("0x").unwrap_or(raw);
    if body.len() % 2 == 1 {
        return hex::decode(format!("0{}", body));
    }
    hex::decode(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(value: u128) -> Vec<u8> {
        let mut out = vec![0u8; 16];
        out.extend_from_slice(&value.to_be_bytes());
        out
    }

    #[test]
    fn test_well_known_selectors() {
        assert_eq!(calldata("name()"), "0x06fdde03");
        assert_eq!(calldata("symbol()"), "0x95d89b41");
        assert_eq!(calldata("decimals()"), "0x313ce567");
        assert_eq!(calldata("totalSupply()"), "0x18160ddd");
        assert_eq!(selector("mint(address,uint256)"), [0x40, 0xc1, 0x0f, 0x19]);
    }

    #[test]
    fn test_decode_dynamic_string() {
        let mut data = word(32);
        data.extend(word(4));
        let mut text = b"SEED".to_vec();
        text.resize(32, 0);
        data.extend(text);

        assert_eq!(decode_string(&data).unwrap(), "SEED");
    }

    #[test]
    fn test_decode_bytes32_string() {
        let mut data = b"MKR".to_vec();
        data.resize(32, 0);
        assert_eq!(decode_string(&data).unwrap(), "MKR");
    }

    #[test]
    fn test_decode_string_truncated() {
        let mut data = word(32);
        data.extend(word(64));
        assert_eq!(decode_string(&data), Err(AbiError::TooShort(64)));
    }

    #[test]
    fn test_decode_uints() {
        assert_eq!(decode_u128(&word(1_000_000)).unwrap(), 1_000_000);
        assert_eq!(decode_u8(&word(18)).unwrap(), 18);
        assert!(decode_u8(&word(256)).is_err());

        let mut huge = vec![0u8; 32];
        huge[0] = 1;
        assert!(matches!(decode_u128(&huge), Err(AbiError::Overflow(_))));
    }

    #[test]
    fn test_push4_scan_skips_push_data() {
        // PUSH4 40c10f19, then PUSH32 whose data contains a fake PUSH4 opcode
        let mut code = vec![0x63, 0x40, 0xc1, 0x0f, 0x19, 0x14];
        code.push(0x7f);
        let mut data = vec![0u8; 32];
        data[0] = 0x63;
        code.extend(data);
        code.push(0x00);

        assert_eq!(push4_selectors(&code), vec![[0x40, 0xc1, 0x0f, 0x19]]);
    }

    #[test]
    fn test_decode_hex() {
        assert_eq!(decode_hex("0x0a").unwrap(), vec![0x0a]);
        assert_eq!(decode_hex("0xa").unwrap(), vec![0x0a]);
        assert!(decode_hex("0x").unwrap().is_empty());
    }
}
