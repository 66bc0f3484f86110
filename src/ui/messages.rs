//! One-line user feedback. Everything a view prints outside of a table or
//! card goes through these helpers so the shell and one-shot commands read
//! the same.

use crate::errors::AppError;
use std::fmt;
use std::io::{self, Write};

/// ANSI colors
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

const FG_BLUE: &str = "\x1b[34m";
const FG_GREEN: &str = "\x1b[32m";
const FG_YELLOW: &str = "\x1b[33m";
const FG_RED: &str = "\x1b[31m";

/// Icons
const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_ERR: &str = "❌";

fn line<W: Write, T: fmt::Display>(
    out: &mut W,
    color: &str,
    icon: &str,
    msg: T,
) -> io::Result<()> {
    writeln!(out, "{}{}{} {}{}", color, BOLD, icon, RESET, msg)
}

pub fn info_to<W: Write, T: fmt::Display>(out: &mut W, msg: T) -> io::Result<()> {
    line(out, FG_BLUE, ICON_INFO, msg)
}

pub fn success_to<W: Write, T: fmt::Display>(out: &mut W, msg: T) -> io::Result<()> {
    line(out, FG_GREEN, ICON_OK, msg)
}

pub fn warning_to<W: Write, T: fmt::Display>(out: &mut W, msg: T) -> io::Result<()> {
    line(out, FG_YELLOW, ICON_WARN, msg)
}

pub fn error_to<W: Write, T: fmt::Display>(out: &mut W, msg: T) -> io::Result<()> {
    line(out, FG_RED, ICON_ERR, msg)
}

/// Inline error for a failed view action: validation text as-is, storage
/// failures collapsed to the generic message. The detail goes to the log.
pub fn report_to<W: Write>(out: &mut W, err: &AppError) -> io::Result<()> {
    tracing::debug!(kind = ?err.kind(), error = %err, "view action failed");
    error_to(out, err.user_message())
}

pub fn info<T: fmt::Display>(msg: T) {
    let _ = info_to(&mut io::stdout(), msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    let _ = success_to(&mut io::stdout(), msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    let _ = warning_to(&mut io::stdout(), msg);
}

pub fn error<T: fmt::Display>(msg: T) {
    let _ = error_to(&mut io::stderr(), msg);
}

/// Section header
pub fn header<T: fmt::Display>(msg: T) {
    println!("\n{}{}══ {} ══{}", FG_BLUE, BOLD, msg, RESET);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_go_to_the_given_writer() {
        let mut out = Vec::new();
        success_to(&mut out, "Saved").unwrap();
        report_to(&mut out, &AppError::validation("Name is required")).unwrap();
        report_to(&mut out, &AppError::Other("disk on fire".into())).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains(ICON_OK) && lines[0].ends_with("Saved"));
        assert!(lines[1].ends_with("Name is required"));
        assert!(!lines[2].contains("disk on fire"));
    }
}
