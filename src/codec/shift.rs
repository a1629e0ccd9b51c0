//! Fixed-shift substitution over ASCII letters and digits.
//!
//! This is light obfuscation so the payload is not readable at a glance in a
//! hex dump. It offers no confidentiality.

use crate::config::SHIFT;

/// Encode text by rotating letters within their case range and digits
/// within 0-9. Every other character passes through unchanged.
///
/// # Example
///
/// ```
/// use tailmark::codec::{decode, encode};
///
/// assert_eq!(encode("Order 005"), "Vykly 772");
/// assert_eq!(decode(&encode("Order 005")), "Order 005");
/// ```
pub fn encode(text: &str) -> String {
    text.chars().map(|c| rotate(c, SHIFT)).collect()
}

/// Reverse [`encode`].
pub fn decode(text: &str) -> String {
    text.chars().map(|c| unrotate(c, SHIFT)).collect()
}

fn rotate(c: char, shift: u32) -> char {
    match c {
        'A'..='Z' => shift_within(c, b'A', 26, shift),
        'a'..='z' => shift_within(c, b'a', 26, shift),
        '0'..='9' => shift_within(c, b'0', 10, shift),
        _ => c,
    }
}

fn unrotate(c: char, shift: u32) -> char {
    match c {
        'A'..='Z' => shift_within(c, b'A', 26, 26 - shift % 26),
        'a'..='z' => shift_within(c, b'a', 26, 26 - shift % 26),
        '0'..='9' => shift_within(c, b'0', 10, 10 - shift % 10),
        _ => c,
    }
}

fn shift_within(c: char, base: u8, modulus: u32, shift: u32) -> char {
    let index = c as u32 - base as u32;
    let shifted = (index + shift) % modulus;
    char::from(base + shifted as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        assert_eq!(encode("ABC"), "HIJ");
        assert_eq!(encode("xyz"), "efg");
        assert_eq!(encode("0123456789"), "7890123456");
        assert_eq!(encode("Z"), "G");
    }

    #[test]
    fn test_round_trip() {
        let samples = [
            "",
            "ORDER 007",
            "Hello, World!",
            "Photo-session 2024/05 #12",
            "mixed ÄÖÜ émoji 🎉 text",
        ];
        for s in samples {
            assert_eq!(decode(&encode(s)), s);
        }
    }

    #[test]
    fn test_non_alphanumeric_passthrough() {
        let s = " -_.,!?*/<>=\t\nÄé🎉";
        assert_eq!(encode(s), s);
        assert_eq!(decode(s), s);
    }

    #[test]
    fn test_decode_is_not_encode() {
        assert_ne!(encode("abc"), decode("abc"));
    }
}
