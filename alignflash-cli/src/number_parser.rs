//! Number and byte-string parsing for CLI arguments
//!
//! Flash addresses are usually written in hex, sizes in decimal. Both are
//! accepted everywhere:
//!
//! - `4096`, `1_048_576` - decimal
//! - `0x1000`, `0X3C_0000` - hex
//!
//! Data for `write` is a hex byte string: `deadbeef`, `de ad be ef`,
//! `0xdeadbeef` or `de:ad:be:ef`.

use anyhow::{Context, Result};

/// Parse a decimal or `0x`-prefixed hex `u32`
pub fn parse_u32(text: &str) -> Result<u32> {
    let cleaned: String = text.trim().chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() {
        anyhow::bail!("Expected a number, got an empty string");
    }

    let parsed = match cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => cleaned.parse::<u32>(),
    };

    parsed.with_context(|| format!("Invalid number '{}' (use decimal or 0x hex)", text))
}

/// Parse a hex byte string into bytes
///
/// Whitespace, `:` and `_` separators are ignored, as is a leading `0x`.
pub fn parse_hex_bytes(text: &str) -> Result<Vec<u8>> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let digits: Vec<u8> = body
        .bytes()
        .filter(|b| !b.is_ascii_whitespace() && *b != b':' && *b != b'_')
        .collect();

    if digits.len() % 2 != 0 {
        anyhow::bail!(
            "Hex data '{}' has an odd number of digits; every byte needs two",
            text
        );
    }

    digits
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).context("Hex data must be ASCII")?;
            u8::from_str_radix(pair, 16)
                .with_context(|| format!("Invalid hex byte '{}' in '{}'", pair, text))
        })
        .collect()
}
