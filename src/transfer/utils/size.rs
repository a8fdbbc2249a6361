const UNITS: [&str; 5] = ["B", "K", "M", "G", "T"];

/// Render a byte count with a 1024-based unit suffix. Plain bytes are shown
/// without a decimal; everything larger gets one.
pub fn format_size(size: u64) -> String {
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{size}B")
    } else {
        format!("{value:.1}{}", UNITS[unit])
    }
}
