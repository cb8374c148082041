//! Human-readable formatting helpers.

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Render a byte count as stored in the `size` column, e.g. `2.3 MB`.
///
/// Base 1024, at most two decimals, trailing zeros dropped. Sizes beyond the
/// gigabyte range stay expressed in GB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut exponent = 0;
    let mut scale = 1u64;
    while exponent < SIZE_UNITS.len() - 1 && bytes >= scale * 1024 {
        scale *= 1024;
        exponent += 1;
    }
    let rounded = (bytes as f64 / scale as f64 * 100.0).round() / 100.0;

    format!("{} {}", rounded, SIZE_UNITS[exponent])
}
