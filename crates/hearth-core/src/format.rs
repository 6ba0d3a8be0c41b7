use chrono::NaiveDate;

/// Rounds a monetary value to two decimals.
pub fn round_currency(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    // avoid printing "-0.00"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Formats currency amounts for presentation.
pub trait CurrencyFormatter: Send + Sync {
    fn format_amount(&self, amount: f64, currency: &str) -> String;
}

/// Formats dates for presentation.
pub trait DateFormatter: Send + Sync {
    fn format_date(&self, date: NaiveDate) -> String;
}

/// Fixed-precision formatter: `1234.5` in `USD` renders as `1234.50 USD`.
#[derive(Debug, Clone, Copy)]
pub struct PlainFormatter {
    pub precision: usize,
}

impl Default for PlainFormatter {
    fn default() -> Self {
        Self { precision: 2 }
    }
}

impl CurrencyFormatter for PlainFormatter {
    fn format_amount(&self, amount: f64, currency: &str) -> String {
        format!("{:.*} {}", self.precision, amount, currency)
    }
}

impl DateFormatter for PlainFormatter {
    fn format_date(&self, date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }
}
