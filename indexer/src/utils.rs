/// Parse an API quantity: `0x`-prefixed hex or plain decimal.
///
/// A bare `0x` is zero, which is how the explorer reports log index 0.
pub fn parse_quantity(value: &str) -> Option<u64> {
    let value = value.trim();
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some("") => Some(0),
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => value.parse::<u64>().ok(),
    }
}
