//! `trends-panel` library crate.
//!
//! The binary (`trends`) is a thin wrapper around this library so that:
//!
//! - the collection and merge logic is testable without network access
//! - the trends service sits behind a trait and can be replaced by canned data
//! - pacing is an explicit value owned by the pipeline

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod panel;
pub mod report;
