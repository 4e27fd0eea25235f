//! External trends data: the service seam, the Google Trends client, and the
//! request pacer that every query in a run goes through.

pub mod google;
pub mod pacer;
pub mod source;

pub use google::{GoogleTrendsClient, TrendsSettings};
pub use pacer::{Pacing, QueryPacer};
pub use source::{TrendsSource, normalize_series};
