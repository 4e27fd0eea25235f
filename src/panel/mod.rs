//! Panel assembly.
//!
//! Responsibilities:
//!
//! - collect one keyword's per-geography series into a long table
//! - join long tables into the wide (geography, date) panel, one keyword at a time
//! - post-process the finished panel (ratios, dropping missing rows)

pub mod assembler;
pub mod merge;
pub mod ratio;
pub mod table;

pub use assembler::*;
pub use merge::*;
pub use ratio::*;
pub use table::*;
