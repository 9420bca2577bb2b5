pub mod calculations;
pub mod format;
pub mod input;
pub mod models;

pub use calculations::IrgEngine;
pub use input::{InputError, InputNormalizer, SalaryBasis};
pub use models::*;
