//! Report rendering for the `irg` command.

use std::fmt;

use rust_decimal::Decimal;

use irg_core::format::{format_fr, format_percent};
use irg_core::{AbattementLimit, CalculationResult, RuleSet};

/// Amounts in reports are shown with at least this many decimals.
const MONEY_DIGITS: u32 = 2;

/// Human-readable report of a [`CalculationResult`].
///
/// Renders the same sections as the result view of the calculator:
/// taxable salary, the exemption notice or bracket table, the abattement
/// with its clamp note, the final IRG and the net salary.
pub struct TextReport<'a> {
    result: &'a CalculationResult,
    rules: &'a RuleSet,
    gross: Option<Decimal>,
}

impl<'a> TextReport<'a> {
    pub fn new(
        result: &'a CalculationResult,
        rules: &'a RuleSet,
    ) -> Self {
        Self {
            result,
            rules,
            gross: None,
        }
    }

    /// Also show the gross salary the taxable amount was derived from.
    pub fn with_gross(
        mut self,
        gross: Decimal,
    ) -> Self {
        self.gross = Some(gross);
        self
    }

    fn abattement_note(&self) -> String {
        match self.result.abattement_applied_limit {
            AbattementLimit::Min => format!(
                "Raised to the {} DA minimum (capped at the IRG due).",
                format_fr(self.rules.abattement_min, 0)
            ),
            AbattementLimit::Max => format!(
                "Limited to the {} DA maximum.",
                format_fr(self.rules.abattement_max, 0)
            ),
            AbattementLimit::None => format!(
                "Within the {} - {} DA range.",
                format_fr(self.rules.abattement_min, 0),
                format_fr(self.rules.abattement_max, 0)
            ),
        }
    }

    fn write_breakdown(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let r = self.result;

        writeln!(f, "IRG breakdown")?;
        writeln!(
            f,
            "  {:<20} {:>14} {:>5} {:>12}",
            "Bracket", "Taxable part", "Rate", "Tax"
        )?;
        for detail in &r.breakdown {
            writeln!(
                f,
                "  {:<20} {:>14} {:>5} {:>12}",
                detail.label,
                money(detail.taxable_part),
                format_percent(detail.rate),
                money(detail.tax)
            )?;
        }
        writeln!(
            f,
            "  {:<41} {:>12}",
            "IRG before abattement",
            money(r.irg_before_abattement)
        )?;
        writeln!(f)?;

        writeln!(f, "Abattement ({})", format_percent(self.rules.abattement_rate))?;
        writeln!(f, "  Raw abattement:     {} DA", money(r.raw_abattement))?;
        writeln!(f, "  Monthly abattement: {} DA", money(r.monthly_abattement))?;
        writeln!(f, "  {}", self.abattement_note())?;
        writeln!(f)
    }
}

fn money(value: Decimal) -> String {
    format_fr(value, MONEY_DIGITS)
}

impl fmt::Display for TextReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let r = self.result;

        if let Some(gross) = self.gross {
            writeln!(
                f,
                "Gross salary:   {} DA (CNAS {})",
                money(gross),
                format_percent(self.rules.cnas_rate)
            )?;
        }
        writeln!(f, "Taxable salary: {} DA", money(r.taxable_salary))?;
        writeln!(f)?;

        if r.exempt {
            writeln!(
                f,
                "Exempt: salaries up to {} DA are not subject to IRG.",
                format_fr(self.rules.exemption_limit, 0)
            )?;
            writeln!(f)?;
        } else {
            self.write_breakdown(f)?;
        }

        writeln!(
            f,
            "Final IRG:  {} DA (rounding: {}, raw {})",
            format_fr(r.irg_final_rounded, 0),
            r.rounding_mode,
            money(r.irg_final_raw)
        )?;
        writeln!(f, "Net salary: {} DA", money(r.net_salary))?;
        writeln!(f)?;
        writeln!(
            f,
            "Rules: {} (v{}, computed {})",
            r.audit.rules_applied,
            r.audit.version,
            r.audit.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

/// Pretty-printed JSON using the result's wire field names.
pub fn render_json(result: &CalculationResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use irg_core::{IrgEngine, RoundingMode};

    use super::*;

    const NNBSP: char = '\u{202f}';

    fn compute(
        salary: Decimal,
        mode: RoundingMode,
    ) -> (CalculationResult, RuleSet) {
        let engine = IrgEngine::default();
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();
        (engine.compute_at(salary, mode, at), engine.rules().clone())
    }

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(|l| l.trim_end().replace(NNBSP, " ")).collect()
    }

    // =========================================================================
    // Text report tests
    // =========================================================================

    #[test]
    fn exempt_report_shows_notice_instead_of_table() {
        let (result, rules) = compute(dec!(25000), RoundingMode::Floor);

        let text = TextReport::new(&result, &rules).to_string();
        let lines = lines(&text);

        assert_eq!(lines[0], "Taxable salary: 25 000,00 DA");
        assert!(lines.contains(&"Exempt: salaries up to 30 000 DA are not subject to IRG.".to_string()));
        assert!(!text.contains("IRG breakdown"));
        assert!(lines.contains(&"Final IRG:  0 DA (rounding: floor, raw 0,00)".to_string()));
        assert!(lines.contains(&"Net salary: 25 000,00 DA".to_string()));
    }

    #[test]
    fn taxed_report_lists_each_bracket() {
        let (result, rules) = compute(dec!(50000), RoundingMode::Floor);

        let lines = lines(&TextReport::new(&result, &rules).to_string());

        assert!(lines.iter().any(|l| l.starts_with("  20 000 - 40 000")
            && l.contains("20 000,00")
            && l.contains("23%")
            && l.ends_with("4 600,00")));
        assert!(lines.iter().any(|l| l.starts_with("  40 000 - 80 000")
            && l.contains("27%")
            && l.ends_with("2 700,00")));
        assert!(lines.iter().any(|l| l.starts_with("  IRG before abattement")
            && l.ends_with("7 300,00")));
    }

    #[test]
    fn taxed_report_explains_abattement_clamp() {
        let (result, rules) = compute(dec!(50000), RoundingMode::Floor);

        let lines = lines(&TextReport::new(&result, &rules).to_string());

        assert!(lines.contains(&"Abattement (40%)".to_string()));
        assert!(lines.contains(&"  Raw abattement:     2 920,00 DA".to_string()));
        assert!(lines.contains(&"  Monthly abattement: 1 500,00 DA".to_string()));
        assert!(lines.contains(&"  Limited to the 1 500 DA maximum.".to_string()));
        assert!(lines.contains(&"Final IRG:  5 800 DA (rounding: floor, raw 5 800,00)".to_string()));
        assert!(lines.contains(&"Net salary: 44 200,00 DA".to_string()));
    }

    #[test]
    fn minimum_clamp_note() {
        let (result, rules) = compute(dec!(30001), RoundingMode::Ceil);

        let lines = lines(&TextReport::new(&result, &rules).to_string());

        assert!(lines.contains(&"  Raised to the 1 000 DA minimum (capped at the IRG due).".to_string()));
        assert!(lines.contains(&"Final IRG:  1 301 DA (rounding: ceil, raw 1 300,23)".to_string()));
    }

    #[test]
    fn unclamped_note() {
        let (result, rules) = compute(dec!(35000), RoundingMode::Round);

        let lines = lines(&TextReport::new(&result, &rules).to_string());

        assert!(lines.contains(&"  Within the 1 000 - 1 500 DA range.".to_string()));
    }

    #[test]
    fn gross_line_shown_when_requested() {
        let (result, rules) = compute(dec!(45500), RoundingMode::Floor);

        let text = TextReport::new(&result, &rules)
            .with_gross(dec!(50000))
            .to_string();
        let lines = lines(&text);

        assert_eq!(lines[0], "Gross salary:   50 000,00 DA (CNAS 9%)");
        assert_eq!(lines[1], "Taxable salary: 45 500,00 DA");
    }

    #[test]
    fn report_ends_with_audit_line() {
        let (result, rules) = compute(dec!(50000), RoundingMode::Floor);

        let lines = lines(&TextReport::new(&result, &rules).to_string());

        assert_eq!(
            lines.last().unwrap(),
            "Rules: barème 2025; abattement 40%, clamp 1000-1500 (v1.0.0, computed 2025-03-14 09:30:00 UTC)"
        );
    }

    // =========================================================================
    // JSON tests
    // =========================================================================

    #[test]
    fn json_uses_wire_field_names() {
        let (result, _) = compute(dec!(50000), RoundingMode::Floor);

        let json = render_json(&result).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let amount = |key: &str| value[key].as_str().unwrap().parse::<Decimal>().unwrap();

        assert_eq!(amount("salaire_imposable"), dec!(50000));
        assert_eq!(amount("IRG_final_rounded"), dec!(5800));
        assert_eq!(value["rounding_method"], "floor");
        assert_eq!(value["abattement_applied_limit"], "max");
        assert_eq!(value["exempt"], false);
        assert_eq!(value["breakdown"][0]["description"], "20\u{202f}000 - 40\u{202f}000");
        assert_eq!(value["audit"]["version"], "1.0.0");
    }

    #[test]
    fn json_round_trips_to_the_same_result() {
        let (result, _) = compute(dec!(123456.78), RoundingMode::Round);

        let json = render_json(&result).unwrap();
        let parsed: CalculationResult = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, result);
    }
}
