//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - query scope types (`GeoScope`, `Geography`, `DateWindow`)
//! - service-facing and normalized observations (`RawSeries`, `NormalizedPoint`)
//! - fold configuration (`JoinPolicy`, `EmptyResultPolicy`, `CollectConfig`)

pub mod types;
pub mod window;

pub use types::*;
pub use window::*;
