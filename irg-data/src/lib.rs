//! Loading IRG rule sets and bracket tables from files.

mod loader;

pub use loader::{BracketLoader, BracketRecord, RuleSetLoader, RuleSetLoaderError};
