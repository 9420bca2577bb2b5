//! Monthly IRG withholding calculation.
//!
//! # Algorithm
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Salary at or below the exemption limit: no tax, stop here |
//! | 2    | Tax each bracket whose lower bound is below the salary |
//! | 3    | Abattement = tax × rate, clamped to `[min, max]`, then capped at the tax |
//! | 4    | Final raw IRG = tax − abattement (minimum 0) |
//! | 5    | Round the final IRG (floor, round half up, or ceil) |
//! | 6    | Net salary = taxable salary − rounded IRG |
//! | 7    | Stamp the result with time, rule-set version and rule summary |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use irg_core::{AbattementLimit, IrgEngine, RoundingMode};
//!
//! let engine = IrgEngine::default();
//! let result = engine.compute(dec!(50000), RoundingMode::Floor);
//!
//! // 20 000 × 23% + 10 000 × 27%
//! assert_eq!(result.irg_before_abattement, dec!(7300));
//! assert_eq!(result.abattement_applied_limit, AbattementLimit::Max);
//! assert_eq!(result.irg_final_rounded, dec!(5800));
//! assert_eq!(result.net_salary, dec!(44200));
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::calculations::common::max;
use crate::format::bracket_label;
use crate::models::{
    AbattementLimit, AuditStamp, BracketDetail, CalculationResult, RoundingMode, RuleSet,
    RuleSetError,
};

/// Abattement after clamping, with the bound that was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Abattement {
    raw: Decimal,
    monthly: Decimal,
    limit: AbattementLimit,
}

/// Calculator for monthly IRG withholding.
///
/// Holds one validated [`RuleSet`]; every call to [`IrgEngine::compute`]
/// works on local state only, so a single engine can be shared freely
/// between threads.
#[derive(Debug, Clone, Default)]
pub struct IrgEngine {
    rules: RuleSet,
}

impl IrgEngine {
    /// Creates an engine for the given rule set.
    ///
    /// # Errors
    ///
    /// Returns [`RuleSetError`] if the rule set fails [`RuleSet::validate`].
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use irg_core::{IrgEngine, RuleSet, RuleSetError};
    ///
    /// let rules = RuleSet {
    ///     exemption_limit: dec!(-1),
    ///     ..RuleSet::default()
    /// };
    ///
    /// assert_eq!(
    ///     IrgEngine::new(rules).unwrap_err(),
    ///     RuleSetError::NegativeExemptionLimit(dec!(-1))
    /// );
    /// ```
    pub fn new(rules: RuleSet) -> Result<Self, RuleSetError> {
        rules.validate()?;
        Ok(Self { rules })
    }

    /// The rule set this engine applies.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Calculates IRG on `taxable_salary`, stamping the result with the
    /// current time.
    ///
    /// `taxable_salary` must be non-negative; input is expected to have
    /// gone through [`InputNormalizer`](crate::InputNormalizer) first.
    pub fn compute(
        &self,
        taxable_salary: Decimal,
        rounding_mode: RoundingMode,
    ) -> CalculationResult {
        self.compute_at(taxable_salary, rounding_mode, Utc::now())
    }

    /// Same as [`IrgEngine::compute`] with an explicit audit timestamp.
    ///
    /// Equal inputs always produce equal results.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::Utc;
    /// use rust_decimal_macros::dec;
    /// use irg_core::{IrgEngine, RoundingMode};
    ///
    /// let engine = IrgEngine::default();
    /// let now = Utc::now();
    ///
    /// // At the exemption limit nothing is due.
    /// let result = engine.compute_at(dec!(30000), RoundingMode::Round, now);
    ///
    /// assert!(result.exempt);
    /// assert_eq!(result.net_salary, dec!(30000));
    /// assert_eq!(result, engine.compute_at(dec!(30000), RoundingMode::Round, now));
    /// ```
    pub fn compute_at(
        &self,
        taxable_salary: Decimal,
        rounding_mode: RoundingMode,
        timestamp: DateTime<Utc>,
    ) -> CalculationResult {
        debug_assert!(
            taxable_salary >= Decimal::ZERO,
            "taxable salary must be non-negative"
        );

        let audit = self.audit_stamp(timestamp);

        // Step 1: exemption short-circuit
        if taxable_salary <= self.rules.exemption_limit {
            debug!(
                taxable_salary = %taxable_salary,
                exemption_limit = %self.rules.exemption_limit,
                "salary at or below exemption limit; no IRG due"
            );
            return CalculationResult::exempt(taxable_salary, rounding_mode, audit);
        }

        // Step 2: bracket traversal
        let breakdown = self.bracket_breakdown(taxable_salary);
        let irg_before_abattement: Decimal = breakdown.iter().map(|detail| detail.tax).sum();

        // Step 3: abattement
        let abattement = self.abattement(irg_before_abattement);

        // Step 4: final tax before rounding
        let irg_final_raw = self.final_tax(irg_before_abattement, abattement.monthly);

        // Step 5: rounding
        let irg_final_rounded = rounding_mode.apply(irg_final_raw);

        // Step 6: net salary
        let net_salary = taxable_salary - irg_final_rounded;

        debug!(
            taxable_salary = %taxable_salary,
            irg_before_abattement = %irg_before_abattement,
            monthly_abattement = %abattement.monthly,
            irg_final_rounded = %irg_final_rounded,
            rounding = %rounding_mode,
            "IRG computed"
        );

        CalculationResult {
            taxable_salary,
            breakdown,
            irg_before_abattement,
            raw_abattement: abattement.raw,
            monthly_abattement: abattement.monthly,
            abattement_applied_limit: abattement.limit,
            irg_final_raw,
            irg_final_rounded,
            rounding_mode,
            exempt: false,
            net_salary,
            audit,
        }
    }

    /// Records one [`BracketDetail`] per bracket whose lower bound is below
    /// the salary.
    fn bracket_breakdown(
        &self,
        taxable_salary: Decimal,
    ) -> Vec<BracketDetail> {
        self.rules
            .brackets
            .iter()
            .filter(|bracket| taxable_salary > bracket.lower)
            .map(|bracket| {
                let taxable_part = bracket.slice_of(taxable_salary);
                let tax = taxable_part * bracket.rate;
                trace!(
                    lower = %bracket.lower,
                    taxable_part = %taxable_part,
                    rate = %bracket.rate,
                    tax = %tax,
                    "bracket taxed"
                );
                BracketDetail {
                    lower: bracket.lower,
                    upper: bracket.upper,
                    taxable_part,
                    rate: bracket.rate,
                    tax,
                    label: bracket_label(bracket.lower, bracket.upper),
                }
            })
            .collect()
    }

    /// Applies the abattement rate and its clamps.
    ///
    /// The reported limit reflects the `[min, max]` clamp only; the final
    /// cap at `irg_before_abattement` leaves it unchanged.
    fn abattement(
        &self,
        irg_before_abattement: Decimal,
    ) -> Abattement {
        let raw = irg_before_abattement * self.rules.abattement_rate;

        let (clamped, limit) = if raw < self.rules.abattement_min {
            (self.rules.abattement_min, AbattementLimit::Min)
        } else if raw > self.rules.abattement_max {
            (self.rules.abattement_max, AbattementLimit::Max)
        } else {
            (raw, AbattementLimit::None)
        };

        if limit != AbattementLimit::None {
            debug!(raw = %raw, clamped = %clamped, limit = limit.as_str(), "abattement clamped");
        }

        Abattement {
            raw,
            monthly: clamped.min(irg_before_abattement),
            limit,
        }
    }

    /// Final IRG before rounding, never negative.
    fn final_tax(
        &self,
        irg_before_abattement: Decimal,
        monthly_abattement: Decimal,
    ) -> Decimal {
        max(irg_before_abattement - monthly_abattement, Decimal::ZERO)
    }

    fn audit_stamp(
        &self,
        timestamp: DateTime<Utc>,
    ) -> AuditStamp {
        AuditStamp {
            timestamp,
            version: self.rules.version.clone(),
            rules_applied: self.rules.rules_description(),
        }
    }
}
