//! printf-compatible number formatting for the fixed-column layout.

/// Formats like C `%<width>.<precision>E`: one leading digit, an uppercase
/// `E`, an explicit exponent sign and at least two exponent digits,
/// right-aligned in `width` columns.
#[must_use]
pub fn sci(value: f64, width: usize, precision: usize) -> String {
    let text = if value.is_finite() {
        let raw = format!("{:.*E}", precision, value);
        match raw.split_once('E') {
            Some((mantissa, exponent)) => with_c_exponent(mantissa, 'E', exponent),
            None => raw,
        }
    } else {
        non_finite(value).to_uppercase()
    };
    format!("{text:>width$}")
}

/// Formats like C `%g`: six significant digits, trailing zeros removed,
/// scientific notation when the exponent is below -4 or at least 6.
#[must_use]
pub fn general(value: f64) -> String {
    if !value.is_finite() {
        return non_finite(value).to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let raw = format!("{value:.5e}");
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    let exp: i32 = exponent.parse().unwrap_or(0);
    if !(-4..6).contains(&exp) {
        return with_c_exponent(strip_zeros(mantissa), 'e', exponent);
    }
    let decimals = usize::try_from(5 - exp).unwrap_or(0);
    strip_zeros(&format!("{value:.decimals$}")).to_string()
}

fn with_c_exponent(mantissa: &str, marker: char, exponent: &str) -> String {
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}{marker}{sign}{digits:0>2}")
}

fn strip_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

fn non_finite(value: f64) -> &'static str {
    if value.is_nan() {
        "nan"
    } else if value > 0.0 {
        "inf"
    } else {
        "-inf"
    }
}
