use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use irg_core::{Bracket, RuleSet, RuleSetError};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading rule sets or bracket tables.
#[derive(Debug, Error)]
pub enum RuleSetLoaderError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("invalid rule set: {0}")]
    Invalid(#[from] RuleSetError),
}

impl From<csv::Error> for RuleSetLoaderError {
    fn from(err: csv::Error) -> Self {
        RuleSetLoaderError::CsvParse(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Decimal cells
// ---------------------------------------------------------------------------

/// A number written as a TOML integer, float or string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DecimalRepr {
    Int(i64),
    Float(f64),
    Text(String),
}

/// [`Decimal`] that accepts any [`DecimalRepr`].
///
/// Floats go through their shortest decimal string, so `0.23` becomes
/// exactly `0.23` rather than the nearest binary fraction.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(try_from = "DecimalRepr")]
struct DecimalValue(Decimal);

impl TryFrom<DecimalRepr> for DecimalValue {
    type Error = String;

    fn try_from(repr: DecimalRepr) -> Result<Self, Self::Error> {
        let parsed = match repr {
            DecimalRepr::Int(i) => Ok(Decimal::from(i)),
            DecimalRepr::Float(f) => Decimal::from_str(&f.to_string()),
            DecimalRepr::Text(s) => Decimal::from_str(s.trim()),
        };
        parsed
            .map(DecimalValue)
            .map_err(|e| format!("invalid decimal: {e}"))
    }
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// TOML rule-set file
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleSetFile {
    year: i32,
    #[serde(default = "default_version")]
    version: String,
    exemption_limit: DecimalValue,
    cnas_rate: DecimalValue,
    abattement: AbattementSection,
    #[serde(default)]
    brackets: Vec<BracketSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AbattementSection {
    rate: DecimalValue,
    min: DecimalValue,
    max: DecimalValue,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BracketSection {
    lower: DecimalValue,
    #[serde(default)]
    upper: Option<DecimalValue>,
    rate: DecimalValue,
}

fn default_version() -> String {
    RuleSet::default().version
}

impl From<RuleSetFile> for RuleSet {
    fn from(file: RuleSetFile) -> Self {
        RuleSet {
            year: file.year,
            version: file.version,
            brackets: file
                .brackets
                .into_iter()
                .map(|b| Bracket::new(b.lower.0, b.upper.map(|u| u.0), b.rate.0))
                .collect(),
            abattement_rate: file.abattement.rate.0,
            abattement_min: file.abattement.min.0,
            abattement_max: file.abattement.max.0,
            exemption_limit: file.exemption_limit.0,
            cnas_rate: file.cnas_rate.0,
        }
    }
}

/// Loader for IRG rule sets.
///
/// A rule set comes from a TOML file, optionally with its bracket table
/// replaced by a CSV file (see [`BracketLoader`]). The result is always
/// validated before it is returned.
///
/// ```toml
/// year = 2025
/// version = "1.0.0"
/// exemption_limit = 30000
/// cnas_rate = 0.09
///
/// [abattement]
/// rate = 0.40
/// min = 1000
/// max = 1500
///
/// [[brackets]]
/// lower = 20000
/// upper = 40000
/// rate = 0.23
///
/// [[brackets]]
/// lower = 40000
/// rate = 0.27
/// ```
pub struct RuleSetLoader;

impl RuleSetLoader {
    /// Parse and validate a rule set from TOML text.
    pub fn parse_toml(text: &str) -> Result<RuleSet, RuleSetLoaderError> {
        let rules = Self::read_toml(text)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Parse and validate a rule set from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<RuleSet, RuleSetLoaderError> {
        Self::load(Some(path), None)
    }

    /// Build the active rule set.
    ///
    /// Starts from the TOML file at `rules_path`, or the built-in default
    /// when `None`, then replaces its brackets with the CSV table at
    /// `brackets_path` if one is given. Validation runs once, after both
    /// sources are merged, so a TOML file may omit its brackets when a CSV
    /// table supplies them.
    pub fn load(
        rules_path: Option<&Path>,
        brackets_path: Option<&Path>,
    ) -> Result<RuleSet, RuleSetLoaderError> {
        let mut rules = match rules_path {
            Some(path) => {
                info!(path = %path.display(), "loading rule set");
                let text = fs::read_to_string(path).map_err(|source| RuleSetLoaderError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::read_toml(&text)?
            }
            None => RuleSet::default(),
        };

        if let Some(path) = brackets_path {
            info!(path = %path.display(), "loading bracket table");
            rules.brackets = BracketLoader::load_from_file(path)?;
        }

        rules.validate()?;
        debug!(
            year = rules.year,
            version = %rules.version,
            brackets = rules.brackets.len(),
            "rule set ready"
        );
        Ok(rules)
    }

    fn read_toml(text: &str) -> Result<RuleSet, RuleSetLoaderError> {
        let file: RuleSetFile = toml::from_str(text)?;
        Ok(file.into())
    }
}

// ---------------------------------------------------------------------------
// CSV bracket table
// ---------------------------------------------------------------------------

/// A single record from a bracket CSV file.
///
/// - `lower`: lower bound of the bracket
/// - `upper`: upper bound (empty for the open-ended top bracket)
/// - `rate`: rate as a decimal fraction (e.g., 0.23 for 23%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub lower: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}

impl From<BracketRecord> for Bracket {
    fn from(record: BracketRecord) -> Self {
        Bracket::new(record.lower, record.upper, record.rate)
    }
}

/// Loader for bracket tables stored as CSV.
///
/// Rows must appear in ascending order of `lower`; ordering and contiguity
/// are checked when the table is validated as part of a [`RuleSet`].
pub struct BracketLoader;

impl BracketLoader {
    /// Parse brackets from a CSV reader with a `lower,upper,rate` header.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<Bracket>, RuleSetLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut brackets = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            brackets.push(record.into());
        }

        Ok(brackets)
    }

    /// Parse brackets from a CSV file.
    pub fn load_from_file(path: &Path) -> Result<Vec<Bracket>, RuleSetLoaderError> {
        let file = File::open(path).map_err(|source| RuleSetLoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(file)
    }
}
