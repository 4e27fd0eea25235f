//! Request pacing in front of a `TrendsSource`.
//!
//! The trends service throttles clients that query too quickly, so every
//! request of a run goes through one `QueryPacer`. The pacer serializes the
//! requests and blocks before each one until the configured interval has
//! passed since the previous request completed.

use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::data::source::{TrendsSource, normalize_series};
use crate::domain::{DateWindow, Geography, NormalizedPoint};
use crate::error::AppError;

/// Minimum spacing between consecutive requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub min_interval: Duration,
    /// Upper bound of a uniformly drawn extra delay added to each wait.
    pub jitter: Duration,
}

impl Pacing {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

    pub fn new(min_interval: Duration, jitter: Duration) -> Self {
        Self {
            min_interval,
            jitter,
        }
    }

    /// No delay at all; for tests and replayed data.
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL, Duration::ZERO)
    }
}

pub struct QueryPacer<S> {
    source: S,
    pacing: Pacing,
    rng: StdRng,
    last_request: Option<Instant>,
    requests: usize,
}

impl<S: TrendsSource> QueryPacer<S> {
    pub fn new(source: S, pacing: Pacing) -> Self {
        Self::with_rng(source, pacing, StdRng::from_entropy())
    }

    /// Deterministic jitter, for reproducible timing in tests.
    pub fn with_seed(source: S, pacing: Pacing, seed: u64) -> Self {
        Self::with_rng(source, pacing, StdRng::seed_from_u64(seed))
    }

    fn with_rng(source: S, pacing: Pacing, rng: StdRng) -> Self {
        Self {
            source,
            pacing,
            rng,
            last_request: None,
            requests: 0,
        }
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    pub fn requests_issued(&self) -> usize {
        self.requests
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Fetch one keyword's series for one geography.
    ///
    /// Empty, malformed, or schema-mismatched responses come back as an empty
    /// vector. Only an unavailable service is an error. Points dated on or
    /// after the window end are dropped.
    pub fn fetch(
        &mut self,
        keyword: &str,
        geography: &Geography,
        window: &DateWindow,
    ) -> Result<Vec<NormalizedPoint>, AppError> {
        self.wait_turn();

        let started = Instant::now();
        let result = self.source.query(keyword, geography, window);
        self.last_request = Some(Instant::now());
        self.requests += 1;

        let raw = result?;
        let mut points = normalize_series(&raw, keyword, geography);
        let fetched = points.len();
        points.retain(|p| p.date < window.end());
        if points.len() < fetched {
            debug!(
                action = "clip",
                component = "query_pacer",
                keyword = keyword,
                geo = %geography.query_code,
                dropped = fetched - points.len(),
                end = %window.end(),
                "Dropped points past the window end"
            );
        }

        if points.is_empty() {
            warn!(
                action = "fetch",
                component = "query_pacer",
                keyword = keyword,
                geo = %geography.query_code,
                raw_points = raw.points.len(),
                "No usable data returned"
            );
        } else {
            info!(
                action = "fetch",
                component = "query_pacer",
                keyword = keyword,
                geo = %geography.query_code,
                points = points.len(),
                duration_ms = started.elapsed().as_millis(),
                "Fetched series"
            );
        }

        Ok(points)
    }

    fn wait_turn(&mut self) {
        let Some(last) = self.last_request else {
            return;
        };

        let target = self.pacing.min_interval + self.draw_jitter();
        let elapsed = last.elapsed();
        if elapsed < target {
            let wait = target - elapsed;
            debug!(
                action = "wait",
                component = "query_pacer",
                wait_ms = wait.as_millis(),
                "Pacing before next request"
            );
            thread::sleep(wait);
        }
    }

    fn draw_jitter(&mut self) -> Duration {
        let max_ms = self.pacing.jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(self.rng.gen_range(0..=max_ms))
    }
}
