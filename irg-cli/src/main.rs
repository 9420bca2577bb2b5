use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::debug;

use irg_cli::logging::init_logging;
use irg_cli::render::{TextReport, render_json};
use irg_core::input::parse_salary;
use irg_core::{InputNormalizer, IrgEngine, RoundingMode, SalaryBasis};
use irg_data::RuleSetLoader;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Monthly IRG withholding calculator for Algerian salaries.
///
/// Applies the progressive barème to a taxable monthly salary, deducts the
/// clamped abattement, rounds the result and prints an itemized report.
#[derive(Debug, Parser)]
#[command(name = "irg", version, about, long_about = None)]
struct Cli {
    /// Monthly salary in DA. Spaces and commas are ignored ("45 000", "1,250,000.50").
    #[arg(allow_negative_numbers = true)]
    salary: String,

    /// Treat SALARY as gross and deduct CNAS before computing.
    #[arg(long)]
    gross: bool,

    /// Rounding applied to the final IRG: floor, round or ceil.
    #[arg(short, long, default_value_t = RoundingMode::Floor)]
    rounding: RoundingMode,

    /// TOML rule-set file. Defaults to the built-in 2025 rules.
    #[arg(long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// CSV bracket table (lower,upper,rate) replacing the rule set's brackets.
    #[arg(long, value_name = "FILE")]
    brackets: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Also append log output to FILE.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let rules = RuleSetLoader::load(cli.rules.as_deref(), cli.brackets.as_deref())
        .context("Failed to load IRG rules")?;
    debug!("using {}", rules.rules_description());

    let basis = if cli.gross {
        SalaryBasis::Gross
    } else {
        SalaryBasis::Taxable
    };
    let entered = parse_salary(&cli.salary)
        .with_context(|| format!("Cannot use salary '{}'", cli.salary))?;
    let salary = InputNormalizer::from_rules(&rules)
        .taxable_amount(entered, basis)
        .with_context(|| format!("Cannot use salary '{}'", cli.salary))?;

    let engine = IrgEngine::new(rules).context("Rule set rejected by the engine")?;
    let result = engine.compute(salary, cli.rounding);

    match cli.format {
        OutputFormat::Text => {
            let report = TextReport::new(&result, engine.rules());
            let report = match basis {
                SalaryBasis::Gross => report.with_gross(entered),
                SalaryBasis::Taxable => report,
            };
            print!("{report}");
        }
        OutputFormat::Json => {
            let json = render_json(&result).context("Failed to serialize result")?;
            println!("{json}");
        }
    }

    Ok(())
}
