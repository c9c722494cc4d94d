//! Lenient decoding of Kuru API payloads.
//!
//! The API mixes strings and numbers for the same fields, so responses are
//! read as `serde_json::Value` and coerced field by field.

use serde_json::Value;

use crate::ports::{PairLpInfo, SocialLinks, TokenMarketInfo};

/// Number or numeric string as f64; anything else is 0
pub fn value_as_f64(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if parsed.is_finite() {
        parsed.max(0.0)
    } else {
        0.0
    }
}

/// Integer or integer string as u128
pub fn value_as_u128(value: Option<&Value>) -> Option<u128> {
    match value {
        Some(Value::Number(n)) => n.as_u64().map(u128::from),
        Some(Value::String(s)) => s.trim().parse::<u128>().ok(),
        None | Some(Value::Null) => Some(0),
        _ => None,
    }
}

/// Free-form display value
pub fn value_as_display(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "0".to_string(),
    }
}

/// Unix seconds, accepting milliseconds when the magnitude says so
pub fn value_as_timestamp(value: Option<&Value>) -> Option<i64> {
    let raw = match value? {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    if raw <= 0 {
        return None;
    }
    // 1e12 seconds is far in the future; treat as milliseconds
    Some(if raw >= 1_000_000_000_000 { raw / 1000 } else { raw })
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn parse_token_info(body: &Value) -> TokenMarketInfo {
    TokenMarketInfo {
        price: value_as_f64(body.get("price")),
        liquidity: value_as_display(body.get("liquidity")),
        pair_created_at: value_as_timestamp(body.get("pairCreatedAt")),
    }
}

pub fn parse_pair_info(body: &Value) -> PairLpInfo {
    let lp = body.get("lpInfo");
    PairLpInfo {
        total_supply: value_as_f64(lp.and_then(|v| v.get("totalSupply"))),
        burned_amount: value_as_f64(lp.and_then(|v| v.get("burnedAmount"))),
        reserve0: value_as_u128(body.get("reserve0")),
        reserve1: value_as_u128(body.get("reserve1")),
    }
}

pub fn parse_socials(body: &Value) -> SocialLinks {
    SocialLinks {
        website: non_empty_str(body.get("website")),
        telegram: non_empty_str(body.get("telegram")),
        twitter: non_empty_str(body.get("twitter")),
        discord: non_empty_str(body.get("discord")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_info_mixed_types() {
        let body = json!({"price": "0.00042", "liquidity": 15230.5, "pairCreatedAt": 1700000000});
        let info = parse_token_info(&body);
        assert_eq!(info.price, 0.00042);
        assert_eq!(info.liquidity, "15230.5");
        assert_eq!(info.pair_created_at, Some(1_700_000_000));
    }

    #[test]
    fn test_token_info_defaults() {
        let info = parse_token_info(&json!({}));
        assert_eq!(info, TokenMarketInfo {
            price: 0.0,
            liquidity: "0".to_string(),
            pair_created_at: None,
        });
    }

    #[test]
    fn test_millisecond_timestamps() {
        assert_eq!(value_as_timestamp(Some(&json!(1_700_000_000_000i64))), Some(1_700_000_000));
        assert_eq!(value_as_timestamp(Some(&json!("0"))), None);
    }

    #[test]
    fn test_pair_info() {
        let body = json!({
            "lpInfo": {"totalSupply": "1000", "burnedAmount": "250"},
            "reserve0": "5000000000000000000",
            "reserve1": "garbage"
        });
        let lp = parse_pair_info(&body);
        assert_eq!(lp.total_supply, 1000.0);
        assert_eq!(lp.burned_amount, 250.0);
        assert_eq!(lp.reserve0, Some(5_000_000_000_000_000_000));
        assert_eq!(lp.reserve1, None);
    }

    #[test]
    fn test_socials_skip_blank() {
        let socials = parse_socials(&json!({"website": "https://seed.fun", "twitter": "  "}));
        assert_eq!(socials.website.as_deref(), Some("https://seed.fun"));
        assert!(socials.twitter.is_none());
        assert!(!socials.is_empty());
        assert!(parse_socials(&json!({})).is_empty());
    }
}
