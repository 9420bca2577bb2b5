use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::RoundingMode;

/// Tax computed on one bracket touched by a salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketDetail {
    pub lower: Decimal,
    pub upper: Option<Decimal>,

    /// Portion of the salary taxed at `rate`.
    #[serde(rename = "part")]
    pub taxable_part: Decimal,

    pub rate: Decimal,
    pub tax: Decimal,

    /// `"20 000 - 40 000"` or `"> 320 000"`, fr-FR formatted.
    #[serde(rename = "description")]
    pub label: String,
}

/// Which clamp bound, if any, replaced the raw abattement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbattementLimit {
    Min,
    Max,
    #[default]
    None,
}

impl AbattementLimit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::None => "none",
        }
    }
}

/// Informational record attached to every result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub rules_applied: String,
}

/// Fully itemized output of one IRG calculation.
///
/// Serialized field names follow the established wire shape
/// (`salaire_imposable`, `IRG_before_abattement`, ...) so downstream
/// renderers can consume the JSON verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    #[serde(rename = "salaire_imposable")]
    pub taxable_salary: Decimal,

    pub breakdown: Vec<BracketDetail>,

    #[serde(rename = "IRG_before_abattement")]
    pub irg_before_abattement: Decimal,

    pub raw_abattement: Decimal,

    /// Abattement actually deducted, after clamping and capping.
    pub monthly_abattement: Decimal,

    pub abattement_applied_limit: AbattementLimit,

    #[serde(rename = "IRG_final_raw")]
    pub irg_final_raw: Decimal,

    #[serde(rename = "IRG_final_rounded")]
    pub irg_final_rounded: Decimal,

    #[serde(rename = "rounding_method")]
    pub rounding_mode: RoundingMode,

    pub exempt: bool,
    pub net_salary: Decimal,
    pub audit: AuditStamp,
}

impl CalculationResult {
    /// Creates the zero-tax result for a salary at or below the exemption limit.
    pub(crate) fn exempt(
        taxable_salary: Decimal,
        rounding_mode: RoundingMode,
        audit: AuditStamp,
    ) -> Self {
        Self {
            taxable_salary,
            breakdown: Vec::new(),
            irg_before_abattement: Decimal::ZERO,
            raw_abattement: Decimal::ZERO,
            monthly_abattement: Decimal::ZERO,
            abattement_applied_limit: AbattementLimit::None,
            irg_final_raw: Decimal::ZERO,
            irg_final_rounded: Decimal::ZERO,
            rounding_mode,
            exempt: true,
            net_salary: taxable_salary,
            audit,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn stamp() -> AuditStamp {
        AuditStamp {
            timestamp: Utc.with_ymd_and_hms(2025, 1, 31, 12, 0, 0).unwrap(),
            version: "1.0.0".to_string(),
            rules_applied: "barème 2025; abattement 40%, clamp 1000-1500".to_string(),
        }
    }

    #[test]
    fn exempt_result_zeroes_every_tax_field() {
        let result = CalculationResult::exempt(dec!(25000), RoundingMode::Ceil, stamp());

        assert!(result.exempt);
        assert!(result.breakdown.is_empty());
        assert_eq!(result.irg_before_abattement, Decimal::ZERO);
        assert_eq!(result.monthly_abattement, Decimal::ZERO);
        assert_eq!(result.irg_final_rounded, Decimal::ZERO);
        assert_eq!(result.abattement_applied_limit, AbattementLimit::None);
        assert_eq!(result.rounding_mode, RoundingMode::Ceil);
        assert_eq!(result.net_salary, dec!(25000));
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let result = CalculationResult::exempt(dec!(25000), RoundingMode::Floor, stamp());

        let json = serde_json::to_value(&result).unwrap();

        for key in [
            "salaire_imposable",
            "breakdown",
            "IRG_before_abattement",
            "raw_abattement",
            "monthly_abattement",
            "abattement_applied_limit",
            "IRG_final_raw",
            "IRG_final_rounded",
            "rounding_method",
            "exempt",
            "net_salary",
            "audit",
        ] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(json["abattement_applied_limit"], "none");
        assert_eq!(json["rounding_method"], "floor");
        assert_eq!(json["audit"]["version"], "1.0.0");
    }

    #[test]
    fn bracket_detail_uses_part_and_description_keys() {
        let detail = BracketDetail {
            lower: dec!(20000),
            upper: None,
            taxable_part: dec!(100),
            rate: dec!(0.23),
            tax: dec!(23),
            label: "> 20\u{202f}000".to_string(),
        };

        let json = serde_json::to_value(&detail).unwrap();

        assert_eq!(json["part"], "100");
        assert_eq!(json["description"], "> 20\u{202f}000");
        assert!(json["upper"].is_null());
    }

    #[test]
    fn abattement_limit_as_str() {
        assert_eq!(AbattementLimit::Min.as_str(), "min");
        assert_eq!(AbattementLimit::Max.as_str(), "max");
        assert_eq!(AbattementLimit::None.as_str(), "none");
    }
}
