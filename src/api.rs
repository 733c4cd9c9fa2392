//! Client for the dashboard backend.
//!
//! The backend computes returns, prices and sector groupings. This module
//! only knows its two read endpoints and their JSON shapes:
//!
//! * `GET /api/compare?tickers=A,B&period=P[&start=S&end=E]`
//! * `GET /api/heatmap-cached?period=P`

use crate::error::ApiError;
use crate::selection::{ChartWindow, HeatmapPeriod, SelectionState, Ticker};
use reqwest::header::CACHE_CONTROL;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One price point. The backend has shipped both `[ts, value]` pairs and
/// `{"time": ts, "value": v}` objects, so both are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "RawPoint")]
pub struct Point {
    pub time: i64,
    pub value: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Pair(f64, f64),
    Object { time: f64, value: f64 },
}

impl From<RawPoint> for Point {
    fn from(raw: RawPoint) -> Self {
        let (time, value) = match raw {
            RawPoint::Pair(time, value) => (time, value),
            RawPoint::Object { time, value } => (time, value),
        };
        Point {
            time: time as i64,
            value,
        }
    }
}

/// A single ticker's line as returned by `/api/compare`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StockSeries {
    pub ticker: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub data: Vec<Point>,
    #[serde(rename = "return", default)]
    pub return_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompareResponse {
    #[serde(default)]
    pub stocks: Vec<StockSeries>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Heatmap leaf. Any numeric field may be missing or `null`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub ticker: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub change: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub pe: Option<f64>,
    #[serde(default)]
    pub fwd_pe: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Sector {
    pub name: String,
    #[serde(default)]
    pub stocks: Vec<Stock>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SectorDataset {
    #[serde(default)]
    pub sectors: Vec<Sector>,
}

impl SectorDataset {
    pub fn is_empty(&self) -> bool {
        self.sectors.iter().all(|s| s.stocks.is_empty())
    }
}

#[derive(Deserialize)]
struct HeatmapResponse {
    #[serde(flatten)]
    dataset: SectorDataset,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Parameters of a `/api/compare` call, derived from the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareRequest {
    pub tickers: Vec<Ticker>,
    pub window: ChartWindow,
}

impl CompareRequest {
    /// `None` when there is nothing to compare.
    pub fn from_selection(state: &SelectionState) -> Option<CompareRequest> {
        if state.tickers().is_empty() {
            return None;
        }
        Some(CompareRequest {
            tickers: state.tickers().to_vec(),
            window: state.window(),
        })
    }

    /// Query string without the leading `?`
    pub fn query(&self) -> String {
        let tickers = self
            .tickers
            .iter()
            .map(Ticker::as_str)
            .collect::<Vec<_>>()
            .join(",");
        match self.window {
            ChartWindow::Preset(period) => format!("tickers={tickers}&period={period}"),
            ChartWindow::Custom(range) => format!(
                "tickers={tickers}&start={}&end={}",
                range.start.format("%Y-%m-%d"),
                range.end.format("%Y-%m-%d")
            ),
        }
    }
}

/// Source of chart and heatmap data.
pub trait MarketData {
    fn compare(
        &self,
        request: &CompareRequest,
    ) -> impl Future<Output = Result<CompareResponse, ApiError>> + Send;

    fn heatmap(
        &self,
        period: HeatmapPeriod,
    ) -> impl Future<Output = Result<SectorDataset, ApiError>> + Send;
}

/// HTTP client for the dashboard backend
#[derive(Debug, Clone)]
pub struct DashboardClient {
    base_url: String,
    client: reqwest::Client,
}

impl DashboardClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ApiError::InvalidUrl(base_url));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {e}")))?;

        info!(%base_url, "created dashboard client");
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        debug!(%url, "GET");

        let response = self
            .client
            .get(&url)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            // the backend reports validation failures as {"error": "..."} with a 4xx
            if let Ok(err) = serde_json::from_str::<ErrorBody>(&body) {
                return Err(ApiError::Backend(err.error));
            }
            return Err(ApiError::Status(status.as_u16()));
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

impl MarketData for DashboardClient {
    async fn compare(&self, request: &CompareRequest) -> Result<CompareResponse, ApiError> {
        let response: CompareResponse = self
            .get_json(&format!("/api/compare?{}", request.query()))
            .await?;
        if let Some(error) = response.error {
            warn!(%error, "compare request rejected by backend");
            return Err(ApiError::Backend(error));
        }
        debug!(stocks = response.stocks.len(), "compare response");
        Ok(response)
    }

    async fn heatmap(&self, period: HeatmapPeriod) -> Result<SectorDataset, ApiError> {
        let response: HeatmapResponse = self
            .get_json(&format!("/api/heatmap-cached?period={period}"))
            .await?;
        if let Some(error) = response.error {
            warn!(%error, "heatmap request rejected by backend");
            return Err(ApiError::Backend(error));
        }
        debug!(sectors = response.dataset.sectors.len(), "heatmap response");
        Ok(response.dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve a single canned HTTP response and hand back the request head.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&head).to_string()
        });
        (format!("http://{addr}"), handle)
    }

    fn client(url: &str) -> DashboardClient {
        DashboardClient::new(url, Duration::from_secs(5)).unwrap()
    }

    fn selection(tickers: &[&str]) -> SelectionState {
        let mut state = SelectionState::new();
        for t in tickers {
            state.add_ticker(t).unwrap();
        }
        state
    }

    #[test]
    fn test_compare_query_for_period() {
        let state = selection(&["AAPL", "NVDA"]);
        let request = CompareRequest::from_selection(&state).unwrap();
        assert_eq!(request.query(), "tickers=AAPL,NVDA&period=1mo");
    }

    #[test]
    fn test_compare_query_for_custom_range() {
        let mut state = selection(&["AAPL", "NVDA"]);
        state
            .set_date_range(
                NaiveDate::from_ymd_opt(2024, 1, 1),
                NaiveDate::from_ymd_opt(2024, 2, 1),
            )
            .unwrap();
        let query = CompareRequest::from_selection(&state).unwrap().query();
        assert_eq!(query, "tickers=AAPL,NVDA&start=2024-01-01&end=2024-02-01");
        assert!(!query.contains("period="));
    }

    #[test]
    fn test_no_request_without_tickers() {
        assert!(CompareRequest::from_selection(&SelectionState::new()).is_none());
    }

    #[test]
    fn test_points_accept_pairs_and_objects() {
        let json = r#"{"stocks": [
            {"ticker": "AAPL", "return": 1.5, "data": [[1700000000, 0.0], [1700003600, 1.5]]},
            {"ticker": "NVDA", "name": "NVIDIA", "price": 480.1, "return": -2.0,
             "data": [{"time": 1700000000, "value": 0.0}, {"time": 1700003600, "value": -2.0}]}
        ]}"#;
        let response: CompareResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.stocks.len(), 2);
        assert_eq!(
            response.stocks[0].data[1],
            Point {
                time: 1_700_003_600,
                value: 1.5
            }
        );
        assert_eq!(response.stocks[1].data[1].value, -2.0);
        assert_eq!(response.stocks[1].name.as_deref(), Some("NVIDIA"));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_heatmap_nulls_deserialize() {
        let json = r#"{"sectors": [{"name": "Technology", "stocks": [
            {"ticker": "AAPL", "price": 190.5, "change": 1.2, "marketCap": 3.0e12, "pe": 30.1, "fwdPe": null},
            {"ticker": "XYZ", "price": 10.0, "change": null}
        ]}]}"#;
        let response: HeatmapResponse = serde_json::from_str(json).unwrap();
        let stocks = &response.dataset.sectors[0].stocks;
        assert_eq!(stocks[0].market_cap, Some(3.0e12));
        assert_eq!(stocks[0].fwd_pe, None);
        assert_eq!(stocks[1].change, None);
        assert_eq!(stocks[1].pe, None);
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            DashboardClient::new("localhost:8080", Duration::from_secs(1)),
            Err(ApiError::InvalidUrl(_))
        ));
        let c = client("http://localhost:8080/");
        assert_eq!(c.base_url(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_compare_over_http() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"stocks": [{"ticker": "AAPL", "return": 3.2, "data": [[1, 0.0], [2, 3.2]]}]}"#,
        )
        .await;
        let request = CompareRequest::from_selection(&selection(&["AAPL", "NVDA"])).unwrap();

        let response = client(&url).compare(&request).await.unwrap();
        assert_eq!(response.stocks[0].return_pct, Some(3.2));

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /api/compare?tickers=AAPL,NVDA&period=1mo HTTP/1.1"));
        assert!(head.to_lowercase().contains("cache-control: no-store"));
    }

    #[tokio::test]
    async fn test_compare_backend_error_field() {
        let (url, _server) = serve_once("200 OK", r#"{"error": "no data"}"#).await;
        let request = CompareRequest::from_selection(&selection(&["ZZZZ"])).unwrap();
        let result = client(&url).compare(&request).await;
        assert!(matches!(result, Err(ApiError::Backend(msg)) if msg == "no data"));
    }

    #[tokio::test]
    async fn test_error_status_with_error_body() {
        let (url, _server) = serve_once("400 Bad Request", r#"{"error": "empty"}"#).await;
        let request = CompareRequest::from_selection(&selection(&["AAPL"])).unwrap();
        let result = client(&url).compare(&request).await;
        assert!(matches!(result, Err(ApiError::Backend(_))));
    }

    #[tokio::test]
    async fn test_error_status_without_body() {
        let (url, _server) = serve_once("502 Bad Gateway", "").await;
        let result = client(&url).heatmap(HeatmapPeriod::OneDay).await;
        assert!(matches!(result, Err(ApiError::Status(502))));
    }

    #[tokio::test]
    async fn test_heatmap_over_http() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"sectors": [{"name": "Energy", "stocks": [{"ticker": "XOM", "price": 100.0, "change": -0.4, "marketCap": 4.0e11}]}]}"#,
        )
        .await;
        let dataset = client(&url).heatmap(HeatmapPeriod::OneWeek).await.unwrap();
        assert_eq!(dataset.sectors[0].name, "Energy");
        assert!(!dataset.is_empty());

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /api/heatmap-cached?period=1w HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_garbage_body_is_parse_error() {
        let (url, _server) = serve_once("200 OK", "not json").await;
        let result = client(&url).heatmap(HeatmapPeriod::OneDay).await;
        assert!(matches!(result, Err(ApiError::Parse(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let result = client(&format!("http://{addr}"))
            .heatmap(HeatmapPeriod::OneDay)
            .await;
        assert!(matches!(result, Err(ApiError::Network(_))));
    }
}
