//! Google Trends interest-over-time client.
//!
//! A query takes two calls:
//!
//! 1. `explore` returns the widgets for the comparison; the `TIMESERIES`
//!    widget carries a request payload and a short-lived token.
//! 2. `widgetdata/multiline` exchanges that payload + token for the timeline.
//!
//! Both endpoints prefix their JSON with junk (`)]}'`) to defeat JSON
//! hijacking, which is stripped before parsing.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::data::source::TrendsSource;
use crate::domain::{DateWindow, Geography, RawPoint, RawSeries};
use crate::error::AppError;

const DEFAULT_BASE_URL: &str = "https://trends.google.com";
const EXPLORE_PATH: &str = "/trends/api/explore";
const MULTILINE_PATH: &str = "/trends/api/widgetdata/multiline";
const TIMESERIES_WIDGET: &str = "TIMESERIES";

const DEFAULT_HOST_LANGUAGE: &str = "en-US";
const DEFAULT_TZ_OFFSET: i32 = 360;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings, read from the environment (`.env` supported).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendsSettings {
    pub base_url: String,
    /// `hl` parameter: interface language of the response.
    pub host_language: String,
    /// `tz` parameter: minutes west of UTC.
    pub tz_offset: i32,
    pub timeout: Duration,
}

impl Default for TrendsSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            host_language: DEFAULT_HOST_LANGUAGE.to_string(),
            tz_offset: DEFAULT_TZ_OFFSET,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl TrendsSettings {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut settings = Self::default();

        if let Some(url) = lookup("TRENDS_BASE_URL") {
            settings.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(hl) = lookup("TRENDS_HL") {
            settings.host_language = hl;
        }
        if let Some(raw) = lookup("TRENDS_TZ") {
            settings.tz_offset = raw
                .trim()
                .parse()
                .map_err(|e| AppError::invalid_input(format!("Invalid TRENDS_TZ '{raw}': {e}")))?;
        }
        if let Some(raw) = lookup("TRENDS_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|e| {
                AppError::invalid_input(format!("Invalid TRENDS_TIMEOUT_SECS '{raw}': {e}"))
            })?;
            settings.timeout = Duration::from_secs(secs);
        }

        Ok(settings)
    }
}

pub struct GoogleTrendsClient {
    client: Client,
    settings: TrendsSettings,
    session_primed: bool,
}

impl GoogleTrendsClient {
    pub fn new(settings: TrendsSettings) -> Result<Self, AppError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(settings.timeout)
            .user_agent(concat!("trends-panel/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::external(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            settings,
            session_primed: false,
        })
    }

    pub fn from_env() -> Result<Self, AppError> {
        Self::new(TrendsSettings::from_env()?)
    }

    pub fn settings(&self) -> &TrendsSettings {
        &self.settings
    }

    /// Visit the landing page once so the cookie store holds a session cookie.
    fn prime_session(&mut self, geo: &str) {
        if self.session_primed {
            return;
        }
        self.session_primed = true;

        let url = format!("{}/", self.settings.base_url);
        match self.client.get(&url).query(&[("geo", geo)]).send() {
            Ok(resp) => debug!(
                action = "prime",
                component = "google_trends",
                status = resp.status().as_u16(),
                "Session cookie requested"
            ),
            Err(e) => warn!(
                action = "prime",
                component = "google_trends",
                error = %e,
                "Could not prime session; continuing without cookie"
            ),
        }
    }

    fn explore(&self, keyword: &str, geography: &Geography, window: &DateWindow) -> Result<Option<Widget>, AppError> {
        let req = json!({
            "comparisonItem": [{
                "keyword": keyword,
                "time": window.timeframe(),
                "geo": geography.query_code,
            }],
            "category": 0,
            "property": "",
        });

        let builder = self
            .client
            .post(format!("{}{EXPLORE_PATH}", self.settings.base_url))
            .query(&[
                ("hl", self.settings.host_language.clone()),
                ("tz", self.settings.tz_offset.to_string()),
                ("req", req.to_string()),
            ]);

        let Some(body) = self.send_text(builder, "explore")? else {
            return Ok(None);
        };
        let widget = parse_explore_body(&body);
        if widget.is_none() {
            warn!(
                action = "parse",
                component = "google_trends",
                keyword = keyword,
                geo = %geography.query_code,
                "Explore response had no time-series widget"
            );
        }
        Ok(widget)
    }

    fn multiline(&self, widget: &Widget, columns: &[String]) -> Result<RawSeries, AppError> {
        let builder = self
            .client
            .get(format!("{}{MULTILINE_PATH}", self.settings.base_url))
            .query(&[
                ("req", widget.request.to_string()),
                ("token", widget.token.clone()),
                ("tz", self.settings.tz_offset.to_string()),
            ]);

        let Some(body) = self.send_text(builder, "multiline")? else {
            return Ok(RawSeries::empty());
        };
        match parse_multiline_body(&body, columns) {
            Some(series) => Ok(series),
            None => {
                warn!(
                    action = "parse",
                    component = "google_trends",
                    "Malformed timeline response"
                );
                Ok(RawSeries::empty())
            }
        }
    }

    /// Send a request and return its body.
    ///
    /// `Ok(None)` means the service rejected this particular query (e.g. an
    /// unknown geography). Throttling, server errors and transport failures
    /// are returned as errors.
    fn send_text(&self, builder: RequestBuilder, what: &str) -> Result<Option<String>, AppError> {
        let resp = builder
            .send()
            .map_err(|e| AppError::external(format!("Trends {what} request failed: {e}")))?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::external(format!(
                "Trends {what} request was throttled (429); increase --interval-secs."
            )));
        }
        if status.is_server_error() {
            return Err(AppError::external(format!(
                "Trends {what} request failed with status {status}."
            )));
        }
        if !status.is_success() {
            warn!(
                action = "request",
                component = "google_trends",
                endpoint = what,
                status = status.as_u16(),
                "Query rejected by service"
            );
            return Ok(None);
        }

        resp.text()
            .map(Some)
            .map_err(|e| AppError::external(format!("Failed to read trends {what} response: {e}")))
    }
}

impl TrendsSource for GoogleTrendsClient {
    fn query(&mut self, keyword: &str, geography: &Geography, window: &DateWindow) -> Result<RawSeries, AppError> {
        self.prime_session(&geography.query_code);

        let Some(widget) = self.explore(keyword, geography, window)? else {
            return Ok(RawSeries::empty());
        };
        self.multiline(&widget, &[keyword.to_string()])
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ExploreResponse {
    #[serde(default)]
    widgets: Vec<Widget>,
}

#[derive(Debug, Clone, Deserialize)]
struct Widget {
    #[serde(default)]
    id: String,
    #[serde(default)]
    request: serde_json::Value,
    #[serde(default)]
    token: String,
}

#[derive(Debug, Deserialize)]
struct MultilineResponse {
    default: TimelineBlock,
}

#[derive(Debug, Deserialize)]
struct TimelineBlock {
    #[serde(default, rename = "timelineData")]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
struct TimelinePoint {
    time: String,
    #[serde(default)]
    value: Vec<f64>,
    #[serde(default, rename = "hasData")]
    has_data: Vec<bool>,
    #[serde(default, rename = "isPartial")]
    is_partial: bool,
}

fn strip_json_prefix(body: &str) -> &str {
    match body.find('{') {
        Some(idx) => &body[idx..],
        None => body,
    }
}

fn parse_explore_body(body: &str) -> Option<Widget> {
    let parsed: ExploreResponse = serde_json::from_str(strip_json_prefix(body)).ok()?;
    parsed
        .widgets
        .into_iter()
        .find(|w| w.id == TIMESERIES_WIDGET && !w.token.is_empty())
}

/// Parse a timeline body. `None` means the body is not a usable timeline.
fn parse_multiline_body(body: &str, columns: &[String]) -> Option<RawSeries> {
    let parsed: MultilineResponse = serde_json::from_str(strip_json_prefix(body)).ok()?;

    let mut points = Vec::with_capacity(parsed.default.timeline_data.len());
    for p in parsed.default.timeline_data {
        if p.value.len() != columns.len() {
            return None;
        }
        let timestamp = p.time.trim().parse::<i64>().ok()?;
        let values = p
            .value
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let has_data = p.has_data.get(i).copied().unwrap_or(true);
                (has_data && v.is_finite()).then_some(*v)
            })
            .collect();
        points.push(RawPoint {
            timestamp,
            values,
            is_partial: p.is_partial,
        });
    }

    Some(RawSeries {
        columns: columns.to_vec(),
        points,
    })
}
