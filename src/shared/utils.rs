//! Utility functions and helpers

/// Format a dollar price the way the site shows it: no decimals from 1000 up,
/// two decimals from 1 up, up to six significant decimals below 1.
pub fn format_price(price: f64) -> String {
    if price >= 1000.0 {
        format!("${}", group_thousands(&format!("{:.0}", price)))
    } else if price >= 1.0 {
        format!("${:.2}", price)
    } else {
        let formatted = format!("{:.6}", price);
        let trimmed = formatted.trim_end_matches('0');
        // keep at least four decimals
        let decimals = trimmed.split('.').nth(1).map(str::len).unwrap_or(0);
        if decimals < 4 {
            format!("${:.4}", price)
        } else {
            format!("${}", trimmed)
        }
    }
}

/// Format market caps and volumes as 1.23T / 4.56B / 7.89M
pub fn format_large_number(value: f64) -> String {
    if value >= 1e12 {
        format!("{:.2}T", value / 1e12)
    } else if value >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if value >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else {
        group_thousands(&format!("{:.0}", value))
    }
}

/// Signed percentage with two decimals, "+1.23%" / "-0.45%"
pub fn format_change(change: f64) -> String {
    if change >= 0.0 {
        format!("+{:.2}%", change)
    } else {
        format!("{:.2}%", change)
    }
}

/// Generate unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };

    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("{}{}", sign, out)
}
