//! Common numeric helpers for IRG calculations.
//!
//! Rounding to whole dinars for the final tax and clamping for the
//! abattement.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds down to the nearest whole number.
///
/// ```
/// use rust_decimal_macros::dec;
/// use irg_core::calculations::common::round_floor;
///
/// assert_eq!(round_floor(dec!(1300.99)), dec!(1300));
/// assert_eq!(round_floor(dec!(1300)), dec!(1300));
/// ```
pub fn round_floor(value: Decimal) -> Decimal {
    value.floor()
}

/// Rounds up to the nearest whole number.
///
/// ```
/// use rust_decimal_macros::dec;
/// use irg_core::calculations::common::round_ceil;
///
/// assert_eq!(round_ceil(dec!(1300.01)), dec!(1301));
/// assert_eq!(round_ceil(dec!(1300)), dec!(1300));
/// ```
pub fn round_ceil(value: Decimal) -> Decimal {
    value.ceil()
}

/// Rounds to the nearest whole number, halves going up.
///
/// Tax amounts are never negative, so rounding midpoints away from zero
/// is the same as rounding them up.
///
/// ```
/// use rust_decimal_macros::dec;
/// use irg_core::calculations::common::round_half_up_whole;
///
/// assert_eq!(round_half_up_whole(dec!(1311.49)), dec!(1311));
/// assert_eq!(round_half_up_whole(dec!(1311.5)), dec!(1312));
/// ```
pub fn round_half_up_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
///
/// ```
/// use rust_decimal_macros::dec;
/// use irg_core::calculations::common::max;
///
/// assert_eq!(max(dec!(-20.00), dec!(0)), dec!(0));
/// assert_eq!(max(dec!(200.00), dec!(100.00)), dec!(200.00));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_floor tests
    // =========================================================================

    #[test]
    fn round_floor_drops_fraction() {
        assert_eq!(round_floor(dec!(1300.99)), dec!(1300));
    }

    #[test]
    fn round_floor_keeps_whole_values() {
        assert_eq!(round_floor(dec!(2070.00)), dec!(2070));
    }

    #[test]
    fn round_floor_handles_zero() {
        assert_eq!(round_floor(dec!(0.00)), dec!(0));
    }

    // =========================================================================
    // round_ceil tests
    // =========================================================================

    #[test]
    fn round_ceil_raises_any_fraction() {
        assert_eq!(round_ceil(dec!(1300.001)), dec!(1301));
    }

    #[test]
    fn round_ceil_keeps_whole_values() {
        assert_eq!(round_ceil(dec!(5800)), dec!(5800));
    }

    // =========================================================================
    // round_half_up_whole tests
    // =========================================================================

    #[test]
    fn round_half_up_whole_rounds_down_below_midpoint() {
        assert_eq!(round_half_up_whole(dec!(1300.49)), dec!(1300));
    }

    #[test]
    fn round_half_up_whole_rounds_up_at_midpoint() {
        assert_eq!(round_half_up_whole(dec!(1311.5)), dec!(1312));
    }

    #[test]
    fn round_half_up_whole_rounds_even_midpoint_up() {
        // Banker's rounding would give 1310 here.
        assert_eq!(round_half_up_whole(dec!(1310.5)), dec!(1311));
    }

    #[test]
    fn round_half_up_whole_rounds_up_above_midpoint() {
        assert_eq!(round_half_up_whole(dec!(1300.575)), dec!(1301));
    }

    // =========================================================================
    // ordering between modes
    // =========================================================================

    #[test]
    fn floor_round_ceil_are_ordered() {
        for value in [dec!(0), dec!(0.5), dec!(1300.23), dec!(1311.5), dec!(118700), dec!(7.999)] {
            let floor = round_floor(value);
            let round = round_half_up_whole(value);
            let ceil = round_ceil(value);

            assert!(floor <= round, "floor > round for {value}");
            assert!(round <= ceil, "round > ceil for {value}");
        }
    }

    #[test]
    fn all_modes_agree_on_whole_values() {
        for value in [dec!(0), dec!(1300), dec!(118700.000)] {
            assert_eq!(round_floor(value), round_ceil(value));
            assert_eq!(round_floor(value), round_half_up_whole(value));
        }
    }

    // =========================================================================
    // max tests
    // =========================================================================

    #[test]
    fn max_returns_larger_value() {
        assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
    }

    #[test]
    fn max_clamps_negative_to_zero() {
        assert_eq!(max(dec!(-460), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn max_handles_equal_values() {
        assert_eq!(max(dec!(150.00), dec!(150.00)), dec!(150.00));
    }
}
