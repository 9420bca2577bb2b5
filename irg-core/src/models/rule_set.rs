use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Bracket;

/// Errors reported by [`RuleSet::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleSetError {
    /// The bracket table has no rows.
    #[error("no tax brackets provided")]
    NoBrackets,

    /// The first bracket starts below zero.
    #[error("first bracket lower bound must be non-negative, got {0}")]
    NegativeLowerBound(Decimal),

    /// A bounded bracket has `upper <= lower`.
    #[error("bracket {index} is empty: upper {upper} is not above lower {lower}")]
    EmptyBracket {
        index: usize,
        lower: Decimal,
        upper: Decimal,
    },

    /// A bracket does not start where the previous one ended.
    #[error("bracket {index} starts at {found} but the previous bracket ends at {expected}")]
    NonContiguousBrackets {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    /// An open-ended bracket appears before the end of the table.
    #[error("bracket {0} has no upper bound but is not the last bracket")]
    UnboundedBracketNotLast(usize),

    /// The last bracket has an upper bound.
    #[error("last bracket must have no upper bound")]
    MissingUnboundedBracket,

    /// A bracket rate is outside `[0, 1]`.
    #[error("bracket {index} rate must be between 0 and 1, got {rate}")]
    InvalidBracketRate { index: usize, rate: Decimal },

    /// Rates must strictly increase from one bracket to the next.
    #[error("bracket {index} rate {rate} does not exceed the previous rate {previous}")]
    RatesNotIncreasing {
        index: usize,
        previous: Decimal,
        rate: Decimal,
    },

    /// The abattement rate is outside `[0, 1]`.
    #[error("abattement rate must be between 0 and 1, got {0}")]
    InvalidAbattementRate(Decimal),

    /// The abattement clamp bounds are negative or inverted.
    #[error("abattement bounds must satisfy 0 <= min <= max, got min {min} and max {max}")]
    InvalidAbattementBounds { min: Decimal, max: Decimal },

    /// The exemption limit is negative.
    #[error("exemption limit must be non-negative, got {0}")]
    NegativeExemptionLimit(Decimal),

    /// The CNAS rate is outside `[0, 1)`.
    #[error("CNAS rate must be at least 0 and below 1, got {0}")]
    InvalidCnasRate(Decimal),
}

/// The complete set of IRG parameters for one tax year.
///
/// A rule set is a plain immutable value: the engine takes one at
/// construction and never reads any global configuration. The
/// [`Default`] implementation is the 2025 monthly table.
///
/// # Example
///
/// ```
/// use irg_core::RuleSet;
/// use rust_decimal_macros::dec;
///
/// let rules = RuleSet::default();
///
/// assert_eq!(rules.year, 2025);
/// assert_eq!(rules.exemption_limit, dec!(30000));
/// assert_eq!(rules.brackets.len(), 5);
/// assert_eq!(rules.validate(), Ok(()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Year of the bracket table (barème).
    pub year: i32,

    /// Rule-set version stamped on every result.
    pub version: String,

    /// Brackets in ascending order of `lower`.
    pub brackets: Vec<Bracket>,

    /// Fraction of the pre-allowance tax granted as abattement.
    pub abattement_rate: Decimal,

    /// Lower clamp for the abattement.
    pub abattement_min: Decimal,

    /// Upper clamp for the abattement.
    pub abattement_max: Decimal,

    /// Salaries at or below this amount pay no IRG.
    pub exemption_limit: Decimal,

    /// Social-contribution rate used to derive taxable salary from gross.
    pub cnas_rate: Decimal,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            year: 2025,
            version: "1.0.0".to_string(),
            brackets: vec![
                bracket(20_000, Some(40_000), 23),
                bracket(40_000, Some(80_000), 27),
                bracket(80_000, Some(160_000), 30),
                bracket(160_000, Some(320_000), 33),
                bracket(320_000, None, 35),
            ],
            abattement_rate: Decimal::new(40, 2),
            abattement_min: Decimal::from(1_000),
            abattement_max: Decimal::from(1_500),
            exemption_limit: Decimal::from(30_000),
            cnas_rate: Decimal::new(9, 2),
        }
    }
}

/// Whole-dinar bounds and a rate in percent.
fn bracket(
    lower: i64,
    upper: Option<i64>,
    rate_percent: i64,
) -> Bracket {
    Bracket::new(
        Decimal::from(lower),
        upper.map(Decimal::from),
        Decimal::new(rate_percent, 2),
    )
}

impl RuleSet {
    /// Checks the bracket table and every rate and bound.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleSetError`] found, checking the bracket table
    /// top to bottom before the scalar parameters.
    ///
    /// # Example
    ///
    /// ```
    /// use irg_core::{RuleSet, RuleSetError};
    /// use rust_decimal_macros::dec;
    ///
    /// let rules = RuleSet {
    ///     abattement_min: dec!(2000),
    ///     abattement_max: dec!(1500),
    ///     ..RuleSet::default()
    /// };
    ///
    /// assert_eq!(
    ///     rules.validate(),
    ///     Err(RuleSetError::InvalidAbattementBounds { min: dec!(2000), max: dec!(1500) })
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), RuleSetError> {
        self.validate_brackets()?;

        if self.abattement_rate < Decimal::ZERO || self.abattement_rate > Decimal::ONE {
            return Err(RuleSetError::InvalidAbattementRate(self.abattement_rate));
        }
        if self.abattement_min < Decimal::ZERO || self.abattement_min > self.abattement_max {
            return Err(RuleSetError::InvalidAbattementBounds {
                min: self.abattement_min,
                max: self.abattement_max,
            });
        }
        if self.exemption_limit < Decimal::ZERO {
            return Err(RuleSetError::NegativeExemptionLimit(self.exemption_limit));
        }
        if self.cnas_rate < Decimal::ZERO || self.cnas_rate >= Decimal::ONE {
            return Err(RuleSetError::InvalidCnasRate(self.cnas_rate));
        }
        Ok(())
    }

    fn validate_brackets(&self) -> Result<(), RuleSetError> {
        let first = self.brackets.first().ok_or(RuleSetError::NoBrackets)?;
        if first.lower < Decimal::ZERO {
            return Err(RuleSetError::NegativeLowerBound(first.lower));
        }

        let last_index = self.brackets.len() - 1;
        let mut previous: Option<&Bracket> = None;

        for (index, bracket) in self.brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(RuleSetError::InvalidBracketRate {
                    index,
                    rate: bracket.rate,
                });
            }

            match bracket.upper {
                Some(upper) if upper <= bracket.lower => {
                    return Err(RuleSetError::EmptyBracket {
                        index,
                        lower: bracket.lower,
                        upper,
                    });
                }
                Some(_) if index == last_index => {
                    return Err(RuleSetError::MissingUnboundedBracket);
                }
                None if index != last_index => {
                    return Err(RuleSetError::UnboundedBracketNotLast(index));
                }
                _ => {}
            }

            if let Some(prev) = previous {
                // Only the last bracket is unbounded, so `prev.upper` is set here.
                let expected = prev.upper.unwrap_or(Decimal::MAX);
                if bracket.lower != expected {
                    return Err(RuleSetError::NonContiguousBrackets {
                        index,
                        expected,
                        found: bracket.lower,
                    });
                }
                if bracket.rate <= prev.rate {
                    return Err(RuleSetError::RatesNotIncreasing {
                        index,
                        previous: prev.rate,
                        rate: bracket.rate,
                    });
                }
            }

            previous = Some(bracket);
        }

        Ok(())
    }

    /// Human-readable summary of the active parameters, used in audit stamps.
    ///
    /// ```
    /// use irg_core::RuleSet;
    ///
    /// assert_eq!(
    ///     RuleSet::default().rules_description(),
    ///     "barème 2025; abattement 40%, clamp 1000-1500"
    /// );
    /// ```
    pub fn rules_description(&self) -> String {
        format!(
            "barème {}; abattement {}%, clamp {}-{}",
            self.year,
            (self.abattement_rate * Decimal::ONE_HUNDRED).normalize(),
            self.abattement_min.normalize(),
            self.abattement_max.normalize(),
        )
    }
}
