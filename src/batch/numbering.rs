//! Order numbers and file-name numbers.

use crate::config::ORDER_NUMBER_WIDTH;

/// Render an order number zero-padded to three digits.
pub fn format_order_number(value: u32) -> String {
    format!("{:0width$}", value, width = ORDER_NUMBER_WIDTH)
}

/// Number carried by the trailing digit run of `text`, or 1 when there is
/// none.
///
/// ```
/// use tailmark::batch::extract_start_number;
///
/// assert_eq!(extract_start_number("ORDER 007"), 7);
/// assert_eq!(extract_start_number("ORDER"), 1);
/// ```
pub fn extract_start_number(text: &str) -> u32 {
    let digits = trailing_digits(text);
    if digits.is_empty() {
        return 1;
    }
    digits.parse().unwrap_or(1)
}

/// `text` with its trailing digit run removed and surrounding whitespace
/// trimmed.
pub fn base_prefix(text: &str) -> &str {
    let digits = trailing_digits(text);
    text[..text.len() - digits.len()].trim()
}

/// Logical number of a file: the first run of ASCII digits in its name.
///
/// Names without digits, or whose first run overflows, have no number.
pub fn extract_file_number(name: &str) -> Option<u32> {
    let start = name.find(|c: char| c.is_ascii_digit())?;
    let rest = &name[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

/// Contiguous run of order numbers starting at `start`.
pub fn order_numbers(start: u32, count: usize) -> Vec<String> {
    (0..count as u32)
        .map(|i| format_order_number(start.saturating_add(i)))
        .collect()
}

fn trailing_digits(text: &str) -> &str {
    let cut = text
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    &text[cut..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_number() {
        assert_eq!(extract_start_number("ORDER 007"), 7);
        assert_eq!(extract_start_number("ORDER 5"), 5);
        assert_eq!(extract_start_number("ORDER"), 1);
        assert_eq!(extract_start_number(""), 1);
        assert_eq!(extract_start_number("12 apples"), 1);
        assert_eq!(extract_start_number("A99999999999999999999"), 1);
    }

    #[test]
    fn test_base_prefix() {
        assert_eq!(base_prefix("ORDER 007"), "ORDER");
        assert_eq!(base_prefix("  Studio Lumen 12"), "Studio Lumen");
        assert_eq!(base_prefix("ORDER"), "ORDER");
        assert_eq!(base_prefix("42"), "");
    }

    #[test]
    fn test_file_number() {
        assert_eq!(extract_file_number("Photo-001.jpg"), Some(1));
        assert_eq!(extract_file_number("Photo-0011.jpg"), Some(11));
        assert_eq!(extract_file_number("image-101.png"), Some(101));
        assert_eq!(extract_file_number("IMG_2024_05.png"), Some(2024));
        assert_eq!(extract_file_number("no-digits.png"), None);
    }

    #[test]
    fn test_order_numbers() {
        assert_eq!(order_numbers(5, 3), vec!["005", "006", "007"]);
        assert_eq!(order_numbers(998, 3), vec!["998", "999", "1000"]);
        assert!(order_numbers(1, 0).is_empty());
    }
}
