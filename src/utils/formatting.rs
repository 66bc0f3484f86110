//! Formatting utilities used for CLI outputs.

use chrono::NaiveDateTime;
use unicode_width::UnicodeWidthStr;

pub fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}

/// Display width ignoring ANSI color sequences (wide glyphs count double).
pub fn visible_width(s: &str) -> usize {
    let mut plain = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // skip up to and including the final letter of the sequence
            for t in chars.by_ref() {
                if t.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            plain.push(c);
        }
    }
    UnicodeWidthStr::width(plain.as_str())
}

/// Pad on the right to a display width.
pub fn pad_right(s: &str, width: usize) -> String {
    let w = visible_width(s);
    format!("{}{}", s, " ".repeat(width.saturating_sub(w)))
}

pub fn pad_left(s: &str, width: usize) -> String {
    let w = visible_width(s);
    format!("{}{}", " ".repeat(width.saturating_sub(w)), s)
}

/// `1234.5` → `$1,234.50`
pub fn format_currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{:02}", sign, grouped, frac)
}

/// Parse a salary typed as `$1,200.50` or `1200.5`.
pub fn parse_currency(s: &str) -> Option<f64> {
    s.trim().replace(['$', ','], "").parse::<f64>().ok()
}

pub fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value)
}

pub fn format_date(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        let mut s: String = text.chars().take(max_len).collect();
        s.push_str("...");
        s
    } else {
        text.to_string()
    }
}

pub fn format_file_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} PB", size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_currency(-42.129), "-$42.13");
    }

    #[test]
    fn currency_input_accepts_symbols() {
        assert_eq!(parse_currency("$1,200.50"), Some(1200.5));
        assert_eq!(parse_currency("abc"), None);
    }

    #[test]
    fn truncation_counts_chars() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdefghij", 4), "abcd...");
    }

    #[test]
    fn file_sizes_are_human_readable() {
        assert_eq!(format_file_size(512), "512.0 B");
        assert_eq!(format_file_size(2048), "2.0 KB");
    }

    #[test]
    fn padding_uses_display_width() {
        assert_eq!(pad_right("ab", 4), "ab  ");
        assert_eq!(pad_left("ab", 4), "  ab");
        assert_eq!(visible_width("\x1b[32m8.5\x1b[0m"), 3);
    }
}
