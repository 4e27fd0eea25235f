//! The trends-service seam and response normalization.

use chrono::DateTime;

use crate::domain::{DateWindow, Geography, NormalizedPoint, RawSeries};
use crate::error::AppError;

/// Something that can answer one interest-over-time query.
///
/// Implementations return `Ok` with an empty series when the service has
/// nothing usable for the pair, and `Err` only when the service itself is
/// unavailable.
pub trait TrendsSource {
    fn query(
        &mut self,
        keyword: &str,
        geography: &Geography,
        window: &DateWindow,
    ) -> Result<RawSeries, AppError>;
}

impl<T: TrendsSource + ?Sized> TrendsSource for &mut T {
    fn query(
        &mut self,
        keyword: &str,
        geography: &Geography,
        window: &DateWindow,
    ) -> Result<RawSeries, AppError> {
        (**self).query(keyword, geography, window)
    }
}

impl<T: TrendsSource + ?Sized> TrendsSource for Box<T> {
    fn query(
        &mut self,
        keyword: &str,
        geography: &Geography,
        window: &DateWindow,
    ) -> Result<RawSeries, AppError> {
        (**self).query(keyword, geography, window)
    }
}

/// Convert a raw response into points for `keyword`, tagged with `geography`.
///
/// A response without a column for the keyword yields no points. Dates keep
/// the service's native sampling; timestamps outside chrono's range are dropped.
pub fn normalize_series(raw: &RawSeries, keyword: &str, geography: &Geography) -> Vec<NormalizedPoint> {
    let Some(col) = raw.columns.iter().position(|c| c == keyword) else {
        return Vec::new();
    };

    raw.points
        .iter()
        .filter_map(|p| {
            let date = DateTime::from_timestamp(p.timestamp, 0)?.date_naive();
            Some(NormalizedPoint {
                geography: geography.code.clone(),
                date,
                keyword: keyword.to_string(),
                value: p.values.get(col).copied().flatten(),
            })
        })
        .collect()
}
