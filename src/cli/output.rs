use std::fmt;

use colored::{ColoredString, Colorize};

use hearth_core::format::round_currency;

/// Enables or disables ANSI styling for everything printed afterwards.
pub fn set_color_enabled(enabled: bool) {
    colored::control::set_override(enabled);
}

pub fn success(message: impl fmt::Display) -> String {
    format!("{} {message}", "[ok]".bright_green())
}

pub fn warning(message: impl fmt::Display) -> String {
    format!("{} {message}", "[!]".bright_yellow())
}

pub fn error(code: &str, message: impl fmt::Display) -> String {
    format!("{} {message}", format!("error[{code}]:").bright_red().bold())
}

pub fn section(title: impl fmt::Display) -> String {
    format!("=== {title} ===").bold().to_string()
}

pub fn status_label(is_open: bool) -> ColoredString {
    if is_open {
        "open".bright_green()
    } else {
        "closed".dimmed()
    }
}

/// Fixed-precision amount; negative values are highlighted.
pub fn amount(value: f64, precision: u8) -> String {
    let text = format!("{:.*}", usize::from(precision), round_currency(value));
    if value < 0.0 {
        text.red().to_string()
    } else {
        text
    }
}

pub fn percent(value: f64) -> String {
    format!("{value:.1}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_amounts_when_color_disabled() {
        set_color_enabled(false);
        assert_eq!(amount(1234.5, 2), "1234.50");
        assert_eq!(amount(-3.0, 0), "-3");
        assert_eq!(status_label(true).to_string(), "open");
        assert_eq!(percent(75.0), "75.0%");
        assert_eq!(error("CONFLICT", "busy"), "error[CONFLICT]: busy");
    }
}
