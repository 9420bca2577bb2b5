use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::{round_ceil, round_floor, round_half_up_whole};

/// How the final IRG amount is brought to a whole number of dinars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    #[default]
    Floor,
    Round,
    Ceil,
}

/// Returned when a rounding mode name is not one of `floor`, `round`, `ceil`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown rounding mode '{0}' (expected floor, round or ceil)")]
pub struct ParseRoundingModeError(pub String);

impl RoundingMode {
    pub const ALL: [RoundingMode; 3] = [Self::Floor, Self::Round, Self::Ceil];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Floor => "floor",
            Self::Round => "round",
            Self::Ceil => "ceil",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "floor" => Some(Self::Floor),
            "round" => Some(Self::Round),
            "ceil" => Some(Self::Ceil),
            _ => None,
        }
    }

    /// Rounds `value` to a whole number according to this mode.
    pub fn apply(
        &self,
        value: Decimal,
    ) -> Decimal {
        match self {
            Self::Floor => round_floor(value),
            Self::Round => round_half_up_whole(value),
            Self::Ceil => round_ceil(value),
        }
    }
}

impl FromStr for RoundingMode {
    type Err = ParseRoundingModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParseRoundingModeError(s.to_string()))
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
