use super::value::Value;

/// Format a value for display.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Empty => String::new(),
        Value::Number(n) => format_number(*n),
        Value::Text(s) => s.clone(),
        Value::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        Value::Time(t) => t.format("%H:%M").to_string(),
        Value::Invalid { raw } => format!("⚠ {}", raw),
        Value::Error(e) => e.code().to_string(),
    }
}

/// Format a number for display: whole numbers without decimals, everything
/// else to two places.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#INF!".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        format!("{:.2}", n)
    }
}

/// Shortest round-trip form, as a number literal inside a formula.
pub fn format_plain(n: f64) -> String {
    format!("{}", n)
}

/// `$1,234.50` style money.
pub fn format_currency(n: f64) -> String {
    if !n.is_finite() {
        return format_number(n);
    }
    let sign = if n < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", n.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{}${}.{}", sign, group_thousands(whole), cents)
}

/// A fraction as a percentage (`0.05` -> `5%`).
pub fn format_percent(fraction: f64) -> String {
    let pct = fraction * 100.0;
    if (pct - pct.round()).abs() < 1e-9 {
        format!("{:.0}%", pct)
    } else {
        format!("{:.2}%", pct)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
