/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use pmo_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    // Handle the sign separately so the thousands grouping works on the
    // absolute value.
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Round to the requested decimal places.
    // Add a tiny epsilon (half ULP at the target precision) before rounding
    // to avoid IEEE 754 binary-representation issues at exact midpoints.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    // Build the thousands-separated integer portion.
    let int_str = integer_part.to_string();
    let grouped = group_thousands(&int_str);

    let result = if decimals == 0 {
        grouped
    } else {
        // Format the fractional part to the exact number of decimals.
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        // `frac_str` starts with "0.", e.g. "0.50". Strip the leading "0".
        let decimal_digits = &frac_str[1..]; // ".50"
        format!("{}{}", grouped, decimal_digits)
    };

    if negative {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format an AED amount at KPI scale.
///
/// Values at or above one million render in millions with one decimal and an
/// `M` suffix; at or above one thousand in thousands with an integer `K`
/// suffix; smaller values as grouped integers.
///
/// # Examples
///
/// ```
/// use pmo_core::formatting::format_aed;
///
/// assert_eq!(format_aed(12_340_000.0), "AED 12.3M");
/// assert_eq!(format_aed(45_000.0),     "AED 45K");
/// assert_eq!(format_aed(512.0),        "AED 512");
/// assert_eq!(format_aed(-2_500_000.0), "AED -2.5M");
/// ```
pub fn format_aed(amount: f64) -> String {
    let abs = amount.abs();
    let sign = if amount < 0.0 { "-" } else { "" };
    if abs >= 1_000_000.0 {
        format!("AED {}{:.1}M", sign, abs / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("AED {}{:.0}K", sign, abs / 1_000.0)
    } else {
        format!("AED {}{}", sign, format_number(abs, 0))
    }
}

/// Format a full-precision AED amount with thousands separators, no scaling.
///
/// Used in detail tables where `format_aed`'s M/K rounding would hide
/// variance between close figures.
pub fn format_aed_full(amount: f64) -> String {
    if amount < 0.0 {
        format!("AED -{}", format_number(amount.abs(), 0))
    } else {
        format!("AED {}", format_number(amount, 0))
    }
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` if `whole` is zero to avoid division by zero.
///
/// # Examples
///
/// ```
/// use pmo_core::formatting::percentage;
///
/// assert!((percentage(50.0, 200.0, 1) - 25.0).abs() < 1e-9);
/// assert_eq!(percentage(0.0, 0.0, 2), 0.0);
/// ```
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let raw = (part / whole) * 100.0;
    let factor = 10_f64.powi(decimal_places as i32);
    (raw * factor).round() / factor
}

/// Format a percentage value with fixed one-decimal precision.
///
/// # Examples
///
/// ```
/// use pmo_core::formatting::format_pct;
///
/// assert_eq!(format_pct(25.0),   "25.0%");
/// assert_eq!(format_pct(33.333), "33.3%");
/// ```
pub fn format_pct(value: f64) -> String {
    format!("{:.1}%", value)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── format_number ────────────────────────────────────────────────────────

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(0.0, 2), "0.00");
    }

    #[test]
    fn test_format_number_no_thousands() {
        assert_eq!(format_number(123.456, 2), "123.46");
    }

    #[test]
    fn test_format_number_with_thousands() {
        assert_eq!(format_number(1_234.5, 1), "1,234.5");
    }

    #[test]
    fn test_format_number_millions() {
        assert_eq!(format_number(1_234_567.0, 0), "1,234,567");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(-9_876.5, 1), "-9,876.5");
    }

    #[test]
    fn test_format_number_exact_thousands() {
        assert_eq!(format_number(1_000.0, 0), "1,000");
    }

    // ── format_aed ───────────────────────────────────────────────────────────

    #[test]
    fn test_format_aed_millions() {
        assert_eq!(format_aed(12_340_000.0), "AED 12.3M");
        assert_eq!(format_aed(1_000_000.0), "AED 1.0M");
    }

    #[test]
    fn test_format_aed_thousands() {
        assert_eq!(format_aed(45_000.0), "AED 45K");
        assert_eq!(format_aed(1_500.0), "AED 2K");
    }

    #[test]
    fn test_format_aed_small() {
        assert_eq!(format_aed(512.0), "AED 512");
        assert_eq!(format_aed(0.0), "AED 0");
    }

    #[test]
    fn test_format_aed_negative() {
        assert_eq!(format_aed(-2_500_000.0), "AED -2.5M");
        assert_eq!(format_aed(-800.0), "AED -800");
    }

    #[test]
    fn test_format_aed_full() {
        assert_eq!(format_aed_full(1_234_567.0), "AED 1,234,567");
        assert_eq!(format_aed_full(-50_000.0), "AED -50,000");
    }

    // ── percentage ───────────────────────────────────────────────────────────

    #[test]
    fn test_percentage_basic() {
        let p = percentage(50.0, 200.0, 1);
        assert!((p - 25.0).abs() < 1e-9, "percentage = {p}");
    }

    #[test]
    fn test_percentage_zero_whole() {
        assert_eq!(percentage(10.0, 0.0, 2), 0.0);
        assert_eq!(percentage(0.0, 0.0, 2), 0.0);
    }

    #[test]
    fn test_percentage_full() {
        let p = percentage(100.0, 100.0, 0);
        assert!((p - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentage_rounding() {
        let p = percentage(1.0, 3.0, 2);
        assert!((p - 33.33).abs() < 1e-2, "percentage = {p}");
    }

    // ── format_pct ───────────────────────────────────────────────────────────

    #[test]
    fn test_format_pct_one_decimal() {
        assert_eq!(format_pct(25.0), "25.0%");
        assert_eq!(format_pct(33.333), "33.3%");
        assert_eq!(format_pct(0.0), "0.0%");
    }

    // ── group_thousands (via format_number) ──────────────────────────────────

    #[test]
    fn test_group_thousands_one_digit() {
        assert_eq!(format_number(5.0, 0), "5");
    }

    #[test]
    fn test_group_thousands_seven_digits() {
        assert_eq!(format_number(1_234_567.0, 0), "1,234,567");
    }
}
