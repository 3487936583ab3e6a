//! Google Trends client
//!
//! Google Trends has no official API; the web front end talks to two JSON
//! endpoints that this client drives directly:
//! - `/trends/api/explore` turns a query set into widgets, each carrying a
//!   signed `request` and `token`
//! - `/trends/api/widgetdata/multiline` returns the interest-over-time series
//!   for the `TIMESERIES` widget
//!
//! Both bodies start with an anti-XSSI prefix (`)]}'`) that is stripped before
//! parsing. The session cookie is obtained by loading the home page once.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

use super::{InterestTable, TrendsError, TrendsService};
use crate::config::TrendsConfig;

const EXPLORE_PATH: &str = "/trends/api/explore";
const MULTILINE_PATH: &str = "/trends/api/widgetdata/multiline";
const TIMESERIES_WIDGET: &str = "TIMESERIES";
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Deserialize)]
struct Widget {
    id: String,
    #[serde(default)]
    token: String,
    #[serde(default)]
    request: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ExploreResponse {
    #[serde(default)]
    widgets: Vec<Widget>,
}

#[derive(Debug, Deserialize)]
struct MultilineResponse {
    default: Timeline,
}

#[derive(Debug, Deserialize)]
struct Timeline {
    #[serde(rename = "timelineData", default)]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
struct TimelinePoint {
    time: String,
    value: Vec<f64>,
}

/// Query set submitted by the last `build_payload`
#[derive(Debug, Clone)]
struct Payload {
    queries: Vec<String>,
    widget: Widget,
}

#[derive(Debug, Default)]
struct Session {
    warmed_up: bool,
    payload: Option<Payload>,
}

/// Google Trends implementation of [`TrendsService`]
pub struct GoogleTrendsClient {
    client: Client,
    endpoint: Url,
    hl: String,
    tz: i32,
    session: Mutex<Session>,
}

impl GoogleTrendsClient {
    /// Create a client for `endpoint`
    ///
    /// # Errors
    ///
    /// Returns `TrendsError::Http` if the HTTP client cannot be created, or
    /// `TrendsError::MalformedResponse` for an unparsable endpoint
    pub fn new(endpoint: &str, hl: &str, tz: i32, timeout: Duration) -> Result<Self, TrendsError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| TrendsError::MalformedResponse(format!("invalid endpoint {endpoint}: {e}")))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .gzip(true)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            hl: hl.to_string(),
            tz,
            session: Mutex::new(Session::default()),
        })
    }

    /// Create a client from the `[trends]` configuration section
    ///
    /// # Errors
    ///
    /// See [`GoogleTrendsClient::new`]
    pub fn from_config(config: &TrendsConfig) -> Result<Self, TrendsError> {
        Self::new(
            &config.endpoint,
            &config.hl,
            config.tz,
            config.request_timeout(),
        )
    }

    fn url(&self, path: &str) -> Result<Url, TrendsError> {
        self.endpoint
            .join(path)
            .map_err(|e| TrendsError::MalformedResponse(format!("invalid path {path}: {e}")))
    }

    /// Load the home page once so the session carries Google's cookies
    async fn warm_up(&self, session: &mut Session) -> Result<(), TrendsError> {
        if session.warmed_up {
            return Ok(());
        }

        let geo = self.hl.rsplit('-').next().unwrap_or_default();
        let response = self
            .client
            .get(self.url("/")?)
            .query(&[("geo", geo)])
            .send()
            .await?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => return Err(TrendsError::RateLimited),
            status if !status.is_success() => {
                tracing::debug!(status = status.as_u16(), "Trends home page did not load");
            }
            _ => {}
        }

        session.warmed_up = true;
        Ok(())
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, TrendsError> {
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TrendsError::RateLimited);
        }
        if !status.is_success() {
            return Err(TrendsError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(strip_xssi_prefix(&body))
            .map_err(|e| TrendsError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl TrendsService for GoogleTrendsClient {
    async fn build_payload(
        &self,
        queries: &[String],
        timeframe: &str,
        geo: &str,
    ) -> Result<(), TrendsError> {
        let mut session = self.session.lock().await;
        session.payload = None;
        self.warm_up(&mut session).await?;

        let req = json!({
            "comparisonItem": queries
                .iter()
                .map(|q| json!({ "keyword": q, "time": timeframe, "geo": geo }))
                .collect::<Vec<_>>(),
            "category": 0,
            "property": "",
        });

        tracing::debug!(queries = ?queries, timeframe, geo, "Building trends payload");

        let response = self
            .client
            .post(self.url(EXPLORE_PATH)?)
            .query(&[
                ("hl", self.hl.clone()),
                ("tz", self.tz.to_string()),
                ("req", req.to_string()),
            ])
            .send()
            .await?;

        let explore: ExploreResponse = Self::read_json(response).await?;
        let widget = explore
            .widgets
            .into_iter()
            .find(|w| w.id == TIMESERIES_WIDGET)
            .ok_or_else(|| {
                TrendsError::MalformedResponse(String::from("no TIMESERIES widget in explore response"))
            })?;

        session.payload = Some(Payload {
            queries: queries.to_vec(),
            widget,
        });
        Ok(())
    }

    async fn interest_over_time(&self) -> Result<InterestTable, TrendsError> {
        let payload = self
            .session
            .lock()
            .await
            .payload
            .clone()
            .ok_or(TrendsError::NoPayload)?;

        let response = self
            .client
            .get(self.url(MULTILINE_PATH)?)
            .query(&[
                ("hl", self.hl.clone()),
                ("tz", self.tz.to_string()),
                ("req", payload.widget.request.to_string()),
                ("token", payload.widget.token.clone()),
            ])
            .send()
            .await?;

        let multiline: MultilineResponse = Self::read_json(response).await?;

        let mut table = InterestTable::new(payload.queries);
        for point in multiline.default.timeline_data {
            table.push_row(parse_unix_time(&point.time)?, point.value)?;
        }

        tracing::debug!(rows = table.rows().len(), "Received interest over time");
        Ok(table)
    }
}

/// Skip everything before the JSON document
fn strip_xssi_prefix(body: &str) -> &str {
    body.find(['{', '['].as_slice())
        .map(|start| &body[start..])
        .unwrap_or(body)
}

fn parse_unix_time(raw: &str) -> Result<DateTime<Utc>, TrendsError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| TrendsError::MalformedResponse(format!("invalid timestamp '{raw}'")))
}
