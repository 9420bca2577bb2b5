mod bracket;
mod calculation_result;
mod rounding_mode;
mod rule_set;

pub use bracket::Bracket;
pub use calculation_result::{AbattementLimit, AuditStamp, BracketDetail, CalculationResult};
pub use rounding_mode::{ParseRoundingModeError, RoundingMode};
pub use rule_set::{RuleSet, RuleSetError};
