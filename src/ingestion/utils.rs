//! Field-level normalizers shared by the extractors

use crate::ingestion::defaults::ZERO;

/// Parse a bureau numeric field, taking the leading run of digits.
/// Anything without leading digits, negative, or out of range becomes zero.
pub fn parse_amount(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else {
        return ZERO;
    };
    let trimmed = raw.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());

    unsigned[..digits_end].parse::<i64>().unwrap_or(ZERO)
}

/// Non-blank value, trimmed, or the given fallback
pub fn text_or(raw: Option<&str>, fallback: &str) -> String {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => fallback.to_string(),
    }
}

/// Join name parts with single spaces, dropping blank parts
pub fn format_name(first: Option<&str>, last: Option<&str>) -> String {
    [first, last]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Join address lines with ", ", dropping blank lines. Duplicates are kept.
pub fn format_address<'a>(lines: impl IntoIterator<Item = Option<&'a str>>) -> String {
    lines
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(Some("150000")), 150_000);
        assert_eq!(parse_amount(Some("  42 ")), 42);
        assert_eq!(parse_amount(Some("+7")), 7);
        assert_eq!(parse_amount(Some("12.75")), 12);
        assert_eq!(parse_amount(Some("300abc")), 300);
        assert_eq!(parse_amount(Some("")), 0);
        assert_eq!(parse_amount(Some("abc")), 0);
        assert_eq!(parse_amount(Some("-500")), 0);
        assert_eq!(parse_amount(Some("99999999999999999999999")), 0);
        assert_eq!(parse_amount(None), 0);
    }

    #[test]
    fn test_text_or() {
        assert_eq!(text_or(Some(" HDFC Bank "), "N/A"), "HDFC Bank");
        assert_eq!(text_or(Some("   "), "N/A"), "N/A");
        assert_eq!(text_or(None, "N/A"), "N/A");
    }

    #[test]
    fn test_format_name() {
        assert_eq!(format_name(Some("Sagar"), Some("Ugle")), "Sagar Ugle");
        assert_eq!(format_name(Some("Sagar"), None), "Sagar");
        assert_eq!(format_name(None, Some("Ugle")), "Ugle");
        assert_eq!(format_name(Some(""), Some("  ")), "");
        assert_eq!(format_name(None, None), "");
    }

    #[test]
    fn test_format_address() {
        assert_eq!(
            format_address([
                Some("12 Oak Rd"),
                Some(""),
                Some("Suite 4"),
                Some("Springfield"),
                Some("500001"),
            ]),
            "12 Oak Rd, Suite 4, Springfield, 500001"
        );

        assert_eq!(
            format_address([Some("Flat 2"), None, Some("   "), Some("Pune"), None]),
            "Flat 2, Pune"
        );

        assert_eq!(
            format_address([Some("Main St"), Some("Main St")]),
            "Main St, Main St"
        );

        assert_eq!(format_address([None, None]), "");
    }
}
