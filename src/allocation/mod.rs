//! Address allocation logic.
//!
//! - [`scanner`] - lowest free address of a block
//! - [`engine`] - reservation under the engine lock
//! - [`release`] - release and block queries

mod engine;
mod release;
mod scanner;

pub use engine::AllocationEngine;
pub use scanner::{scan, ScanOutcome};
