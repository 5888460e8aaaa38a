//! Presentation formatting for engine outputs. The engine itself returns
//! raw numbers; only these helpers produce display strings.

pub fn format_currency(value: f64) -> String {
    format!("${value:.2}")
}

pub fn format_rate(value: f64) -> String {
    format!("${value:.2}/h")
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

// signed variants keep the explicit `+` so deltas read as deltas
pub fn format_signed_percent(value: f64) -> String {
    format!("{value:+.1} pts")
}

pub fn format_signed_currency(value: f64) -> String {
    format!("{value:+.2}")
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
