//! fr-FR number formatting for labels and reports.
//!
//! Thousands are grouped with a narrow no-break space (U+202F) and the
//! decimal separator is a comma, e.g. `1 300,23`.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::calculations::common::round_half_up_whole;

/// Thousands separator used by the fr-FR locale.
pub const GROUP_SEPARATOR: char = '\u{202f}';

/// Fraction digits kept when the caller asks for fewer.
const DEFAULT_MAX_FRACTION_DIGITS: u32 = 3;

/// Formats `value` fr-FR style with at least `min_fraction_digits` decimals.
///
/// At most `max(3, min_fraction_digits)` decimals are shown; extra digits are
/// rounded half away from zero and trailing zeros beyond the minimum are
/// dropped.
///
/// ```
/// use rust_decimal_macros::dec;
/// use irg_core::format::format_fr;
///
/// assert_eq!(format_fr(dec!(320000), 0), "320\u{202f}000");
/// assert_eq!(format_fr(dec!(1300.23), 2), "1\u{202f}300,23");
/// assert_eq!(format_fr(dec!(2070), 2), "2\u{202f}070,00");
/// assert_eq!(format_fr(dec!(0.12345), 0), "0,123");
/// ```
pub fn format_fr(
    value: Decimal,
    min_fraction_digits: u32,
) -> String {
    let max_fraction_digits = min_fraction_digits.max(DEFAULT_MAX_FRACTION_DIGITS);
    let rounded =
        value.round_dp_with_strategy(max_fraction_digits, RoundingStrategy::MidpointAwayFromZero);

    let text = rounded.abs().normalize().to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut out = String::with_capacity(text.len() + 8);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));

    let mut fraction = frac_part.to_string();
    while fraction.len() < min_fraction_digits as usize {
        fraction.push('0');
    }
    if !fraction.is_empty() {
        out.push(',');
        out.push_str(&fraction);
    }
    out
}

/// Formats a fractional rate as a whole percentage, e.g. `0.23` as `23%`.
pub fn format_percent(rate: Decimal) -> String {
    let percent = round_half_up_whole(rate * Decimal::ONE_HUNDRED);
    format!("{}%", percent.normalize())
}

/// Label for a bracket: `"20 000 - 40 000"`, or `"> 320 000"` when unbounded.
pub fn bracket_label(
    lower: Decimal,
    upper: Option<Decimal>,
) -> String {
    match upper {
        Some(upper) => format!("{} - {}", format_fr(lower, 0), format_fr(upper, 0)),
        None => format!("> {}", format_fr(lower, 0)),
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * GROUP_SEPARATOR.len_utf8());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(ch);
    }
    out
}
