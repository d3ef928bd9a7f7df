//! Number Formatting
//!
//! en-US style currency and percentage strings for the summary cards.

/// Format an amount as US dollars, e.g. `-$1,234.50`
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };

    format!("{}${}.{:02}", sign, group_thousands(cents / 100), cents % 100)
}

/// Format a value already expressed in percent, e.g. `12.345` -> `12.3%`
pub fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value)
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}
