/// Rendered in place of any missing value or unresolved foreign key.
pub const PLACEHOLDER: &str = "-";

/// Thousands separator used by French number formatting (narrow no-break space).
const GROUP_SEPARATOR: char = '\u{202F}';

/// Format an amount with two decimals, French style: `1 234,56`.
/// Rounds half away from zero to the cent.
pub fn format_amount_value(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let negative = cents < 0;
    let cents = cents.unsigned_abs();
    let units = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, c) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(c);
    }

    format!("{}{},{:02}", if negative { "-" } else { "" }, grouped, fraction)
}

/// Format an optional amount, rendering the placeholder when absent.
pub fn format_amount(value: Option<f64>) -> String {
    match value {
        Some(v) => format_amount_value(v),
        None => PLACEHOLDER.to_string(),
    }
}

/// Keep the `YYYY-MM-DD` part of a date or timestamp string.
pub fn format_date(date: Option<&str>) -> String {
    match date {
        Some(d) if !d.is_empty() => d.chars().take(10).collect(),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Format an optional string, returning the placeholder if None or empty
pub fn or_placeholder(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Case-insensitive substring test; an empty needle matches everything.
pub fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack
        .map(|h| h.to_lowercase().contains(&needle.to_lowercase()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_value() {
        assert_eq!(format_amount_value(0.0), "0,00");
        assert_eq!(format_amount_value(12.5), "12,50");
        assert_eq!(format_amount_value(1234.56), "1\u{202F}234,56");
        assert_eq!(format_amount_value(1_000_000.0), "1\u{202F}000\u{202F}000,00");
        assert_eq!(format_amount_value(-2500.1), "-2\u{202F}500,10");
        assert_eq!(format_amount_value(0.005), "0,01");
    }

    #[test]
    fn test_format_amount_placeholder() {
        assert_eq!(format_amount(None), "-");
        assert_eq!(format_amount(Some(3.0)), "3,00");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(Some("2025-03-14T10:00:00")), "2025-03-14");
        assert_eq!(format_date(Some("")), "-");
        assert_eq!(format_date(None), "-");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Réseau été", 6), "Rés...");
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case(Some("Maintenance Serveurs"), "serveur"));
        assert!(!contains_ignore_case(None, "x"));
        assert!(contains_ignore_case(None, ""));
    }
}
