//! Store configuration
//!
//! `max_bytes` may be written as a plain integer or as a byte-size string:
//!
//! ```json
//! { "max_bytes": 1048576 }
//! { "max_bytes": "64 MiB" }
//! ```

use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};

/// Configuration for an [`LruStore`](crate::LruStore)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Byte budget for keys plus values. `0` disables eviction.
    #[serde(deserialize_with = "deserialize_byte_size")]
    pub max_bytes: usize,
}

impl StoreConfig {
    /// Create a config with the given byte budget
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// Load a config from a JSON document
    ///
    /// Missing fields fall back to [`StoreConfig::default`].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Parse a byte size such as `"4096"`, `"64KB"` or `"2 GiB"`
///
/// Units are case-insensitive and 1024-based; `KB` and `KiB` are the same.
pub fn parse_byte_size(input: &str) -> Result<usize> {
    let invalid = || Error::InvalidByteSize(input.to_string());

    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);
    if digits.is_empty() {
        return Err(invalid());
    }

    let count: usize = digits.parse().map_err(|_| invalid())?;
    let multiplier: usize = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => 1 << 10,
        "m" | "mb" | "mib" => 1 << 20,
        "g" | "gb" | "gib" => 1 << 30,
        _ => return Err(invalid()),
    };

    count.checked_mul(multiplier).ok_or_else(invalid)
}

fn deserialize_byte_size<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSize {
        Bytes(usize),
        Text(String),
    }

    match RawSize::deserialize(deserializer)? {
        RawSize::Bytes(n) => Ok(n),
        RawSize::Text(s) => parse_byte_size(&s).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_bytes() {
        assert_eq!(parse_byte_size("0").unwrap(), 0);
        assert_eq!(parse_byte_size("4096").unwrap(), 4096);
        assert_eq!(parse_byte_size(" 12b ").unwrap(), 12);
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_byte_size("64KB").unwrap(), 64 * 1024);
        assert_eq!(parse_byte_size("64 kib").unwrap(), 64 * 1024);
        assert_eq!(parse_byte_size("3M").unwrap(), 3 * 1024 * 1024);
        assert_eq!(parse_byte_size("1GiB").unwrap(), 1024 * 1024 * 1024);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "MB", "1.5MB", "12XB", "-4", "ten"] {
            match parse_byte_size(input) {
                Err(Error::InvalidByteSize(s)) => assert_eq!(s, input),
                other => panic!("expected InvalidByteSize for {:?}, got {:?}", input, other),
            }
        }
    }

    #[test]
    fn test_parse_overflow() {
        let input = format!("{}G", usize::MAX);
        assert!(parse_byte_size(&input).is_err());
    }

    #[test]
    fn test_config_default_is_unbounded() {
        assert_eq!(StoreConfig::default().max_bytes, 0);
        assert_eq!(StoreConfig::from_json("{}").unwrap(), StoreConfig::default());
    }

    #[test]
    fn test_config_from_json() {
        let config = StoreConfig::from_json(r#"{ "max_bytes": 2048 }"#).unwrap();
        assert_eq!(config, StoreConfig::new(2048));

        let config = StoreConfig::from_json(r#"{ "max_bytes": "8 KiB" }"#).unwrap();
        assert_eq!(config.max_bytes, 8 * 1024);
    }

    #[test]
    fn test_config_from_json_errors() {
        assert!(matches!(
            StoreConfig::from_json(r#"{ "max_bytes": "8 parsecs" }"#),
            Err(Error::Json(_))
        ));
        assert!(StoreConfig::from_json(r#"{ "max_bytes": -1 }"#).is_err());
        assert!(StoreConfig::from_json(r#"{ "capacity": 10 }"#).is_err());
        assert!(StoreConfig::from_json("not json").is_err());
    }
}
