use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the IRG bracket table (tranche).
///
/// `upper` is `None` for the open-ended top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub lower: Decimal,
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}

impl Bracket {
    pub fn new(
        lower: Decimal,
        upper: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self { lower, upper, rate }
    }

    /// Portion of `salary` that falls inside this bracket.
    ///
    /// Callers only ask for brackets whose lower bound is below the salary,
    /// so the result is non-negative for any validated table.
    pub fn slice_of(
        &self,
        salary: Decimal,
    ) -> Decimal {
        let top = match self.upper {
            Some(upper) => salary.min(upper),
            None => salary,
        };
        top - self.lower
    }
}
