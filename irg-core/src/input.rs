//! Salary input normalization.
//!
//! Turns a salary typed by a user (`"45 000"`, `"1,250,000.50"`) into the
//! taxable amount handed to [`IrgEngine`](crate::IrgEngine), optionally
//! deducting the CNAS social contribution from a gross figure first.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::RuleSet;

/// Digits with at most one decimal point, once separators are stripped.
static PLAIN_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d*\.?\d*$").expect("salary pattern is valid"));

/// Error returned when a salary cannot be used as engine input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputError {
    /// Nothing but whitespace and separators was entered.
    #[error("salary is empty")]
    Empty,

    /// The text is not a plain non-negative decimal number.
    #[error("invalid salary '{0}'")]
    Invalid(String),

    /// The amount is below zero.
    #[error("salary must be non-negative, got {0}")]
    Negative(Decimal),
}

/// Whether the entered figure is already taxable or still gross.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SalaryBasis {
    #[default]
    Taxable,
    /// CNAS is deducted before the engine sees the amount.
    Gross,
}

/// Normalizes raw salary input into a taxable amount.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use irg_core::{InputNormalizer, RuleSet, SalaryBasis};
///
/// let normalizer = InputNormalizer::from_rules(&RuleSet::default());
///
/// assert_eq!(normalizer.normalize("45 000", SalaryBasis::Taxable), Ok(dec!(45000)));
/// // 50 000 gross minus 9% CNAS
/// assert_eq!(normalizer.normalize("50,000", SalaryBasis::Gross), Ok(dec!(45500)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputNormalizer {
    cnas_rate: Decimal,
}

impl InputNormalizer {
    pub fn new(cnas_rate: Decimal) -> Self {
        Self { cnas_rate }
    }

    /// Uses the CNAS rate of `rules`.
    pub fn from_rules(rules: &RuleSet) -> Self {
        Self::new(rules.cnas_rate)
    }

    /// Parses `raw` and converts it to a taxable salary.
    ///
    /// Whitespace of any kind and `,` grouping separators are ignored.
    ///
    /// # Errors
    ///
    /// [`InputError::Empty`] when nothing is left after stripping separators,
    /// [`InputError::Invalid`] for anything that is not a plain decimal.
    pub fn normalize(
        &self,
        raw: &str,
        basis: SalaryBasis,
    ) -> Result<Decimal, InputError> {
        let amount = parse_salary(raw)?;
        self.taxable_amount(amount, basis)
    }

    /// Converts an already-parsed amount to a taxable salary.
    ///
    /// # Errors
    ///
    /// [`InputError::Negative`] when `amount` is below zero.
    pub fn taxable_amount(
        &self,
        amount: Decimal,
        basis: SalaryBasis,
    ) -> Result<Decimal, InputError> {
        if amount < Decimal::ZERO {
            tracing::warn!(amount = %amount, "rejected negative salary");
            return Err(InputError::Negative(amount));
        }
        Ok(match basis {
            SalaryBasis::Taxable => amount,
            SalaryBasis::Gross => amount - amount * self.cnas_rate,
        })
    }
}

/// Removes whitespace (including no-break spaces) and comma separators.
fn strip_separators(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect()
}

/// Parses a user-entered salary into a [`Decimal`].
///
/// Unlike free-form decimal parsing this rejects signs, exponents and
/// anything but digits and a single `.`.
pub fn parse_salary(raw: &str) -> Result<Decimal, InputError> {
    let normalized = strip_separators(raw);
    if normalized.is_empty() {
        return Err(InputError::Empty);
    }
    if !PLAIN_DECIMAL.is_match(&normalized) || normalized == "." {
        tracing::warn!(input = %raw, "invalid salary input");
        return Err(InputError::Invalid(raw.to_string()));
    }
    // `Decimal` wants digits on both sides of the point.
    let digits = normalized.strip_suffix('.').unwrap_or(normalized.as_str());
    let digits = if digits.starts_with('.') {
        format!("0{digits}")
    } else {
        digits.to_string()
    };
    digits.parse::<Decimal>().map_err(|e| {
        tracing::warn!(input = %raw, "invalid salary input: {}", e);
        InputError::Invalid(raw.to_string())
    })
}
