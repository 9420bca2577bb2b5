//! IRG calculation logic.
//!
//! [`IrgEngine`] is the single entry point; [`common`] holds the rounding
//! primitives it shares with [`RoundingMode`](crate::RoundingMode).

pub mod common;
pub mod irg;

pub use irg::IrgEngine;
