//! Input/output helpers.
//!
//! - panel CSV export and re-import (`export`)

pub mod export;

pub use export::*;
