//! Output formatting utilities

use colored::Colorize;
use serde::Serialize;

/// Print a section header
pub(crate) fn section(title: &str) {
    println!("\n{}", format!("=== {title} ===").cyan().bold());
}

/// Print a key-value pair
pub(crate) fn kv(key: &str, value: impl std::fmt::Display) {
    println!("  {}: {}", key.white().bold(), value);
}

/// Print a success message
pub(crate) fn success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// Print a warning message
pub(crate) fn warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// Print a bulleted line
pub(crate) fn bullet(msg: impl std::fmt::Display) {
    println!("  - {msg}");
}

/// Print `value` as pretty JSON on stdout
pub(crate) fn json<T: Serialize>(value: &T) -> crate::error::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Horizontal bar, one `#` per 5 percent
pub(crate) fn importance_bar(importance: f64) -> String {
    "#".repeat((importance * 100.0 / 5.0).max(0.0) as usize)
}

/// Format kWh with thousands separators, no decimals
pub(crate) fn format_kwh(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-{grouped} kWh")
    } else {
        format!("{grouped} kWh")
    }
}
