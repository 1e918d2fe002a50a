pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Formats seconds as `M:SS`; minutes are not wrapped into hours
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Formats a `[0, 1]` fraction as a whole percentage, floored so that
/// anything short of done never shows 100%
pub fn format_percent(fraction: f64) -> String {
    let pct = (fraction.clamp(0.0, 1.0) * 100.0).floor();
    format!("{pct:.0}%")
}
