//! Number and label formatting shared by the render functions.

/// Format a count with comma separators (`1200` → `"1,200"`).
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Format an axis tick as a rounded, comma-separated integer.
pub fn format_tick(v: f64) -> String {
    if v < 0.0 {
        return format!("-{}", format_number((-v).round() as u64));
    }
    format_number(v.round() as u64)
}

/// Shortest decimal rendering of a percentage (`12.5`, `40`).
pub fn format_decimal(v: f64) -> String {
    format!("{v}")
}

/// Shorten an axis label: anything longer than `max_chars` is cut to
/// `keep` characters followed by `...`.
pub fn truncate_label(s: &str, max_chars: usize, keep: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(keep).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(45), "45");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1200), "1,200");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(2500.0), "2,500");
        assert_eq!(format_tick(12.6), "13");
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(12.5), "12.5");
        assert_eq!(format_decimal(40.0), "40");
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("Acme", 16, 14), "Acme");
        assert_eq!(truncate_label("Sixteen chars ok", 16, 14), "Sixteen chars ok");
        assert_eq!(
            truncate_label("Very Long Manufacturer Name", 16, 14),
            "Very Long Manu..."
        );
    }
}
