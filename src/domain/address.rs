//! Address display helpers.

/// Shorten an address for display: first 5 characters, `...`, last 4.
///
/// Strings too short to shorten are returned unchanged.
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 9 {
        return address.to_string();
    }
    let head: String = chars[..5].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
