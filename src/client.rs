//! Client for the external calculator service
//!
//! The service owns the allocation optimisation; this side only shapes the
//! requests and decodes the responses:
//! - `POST /diversify` and `POST /sector-diversify` for budget allocation
//! - `POST /ROI` for a single ticker's return over a number of years
//! - `GET /ticker?name=` to resolve a company name to a ticker

use crate::config::Config;
use crate::error::{EsgError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculatorRequest {
    pub budget_dollars: f64,
    /// Upper bound on the beta-weighted allocation, as a fraction of budget.
    pub risk_tolerance: f64,
    pub max_companies: u32,
    /// Minimum fraction of the budget given to each selected company.
    pub min_value: f64,
    /// Only sent to `/sector-diversify`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_sectors: Option<u32>,
}

impl Default for CalculatorRequest {
    fn default() -> Self {
        CalculatorRequest {
            budget_dollars: 10000.0,
            risk_tolerance: 0.7,
            max_companies: 10,
            min_value: 0.01,
            min_sectors: None,
        }
    }
}

impl CalculatorRequest {
    pub fn validate(&self) -> Result<()> {
        if !(self.budget_dollars.is_finite() && self.budget_dollars > 0.0) {
            return Err(EsgError::InvalidRequest(format!(
                "budget must be positive, got {}",
                self.budget_dollars
            )));
        }
        if !(self.risk_tolerance.is_finite() && self.risk_tolerance > 0.0) {
            return Err(EsgError::InvalidRequest(format!(
                "risk tolerance must be positive, got {}",
                self.risk_tolerance
            )));
        }
        if self.max_companies == 0 {
            return Err(EsgError::InvalidRequest("max companies must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.min_value) {
            return Err(EsgError::InvalidRequest(format!(
                "min value is a budget fraction in [0, 1], got {}",
                self.min_value
            )));
        }
        if let Some(min_sectors) = self.min_sectors {
            if min_sectors == 0 || min_sectors > self.max_companies {
                return Err(EsgError::InvalidRequest(format!(
                    "min sectors must be between 1 and max companies ({}), got {}",
                    self.max_companies, min_sectors
                )));
            }
        }
        Ok(())
    }
}

/// Allocation returned by the diversification endpoints: two summary
/// figures plus one dollar amount per company.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Allocation {
    #[serde(default)]
    pub expected_return: f64,
    #[serde(default)]
    pub portfolio_beta: f64,
    #[serde(flatten)]
    pub positions: BTreeMap<String, f64>,
}

impl Allocation {
    /// Largest allocation first; equal amounts by ticker.
    pub fn sorted_positions(&self) -> Vec<(&str, f64)> {
        let mut out: Vec<(&str, f64)> = self.positions.iter().map(|(t, v)| (t.as_str(), *v)).collect();
        out.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        out
    }

    pub fn total_allocated(&self) -> f64 {
        self.positions.values().sum()
    }
}

#[derive(Debug, Clone, Serialize)]
struct RoiRequest<'a> {
    ticker: &'a str,
    years: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RoiResult {
    pub roi: f64,
    pub annualized_roi: f64,
}

#[derive(Debug, Deserialize)]
struct TickerResponse {
    ticker: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EsgClient {
    http: reqwest::Client,
    base_url: String,
}

impl EsgClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .default_headers(headers)
            .build()?;

        Ok(EsgClient {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_body(resp: reqwest::Response) -> Result<String> {
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            Err(EsgError::Api { status: status.as_u16(), body: text })
        } else {
            Ok(text)
        }
    }

    async fn send_get_request(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let url = self.url(path);
        debug!(%url, "GET");
        let resp = self.http.get(&url).query(query).send().await?;
        Self::read_body(resp).await
    }

    async fn send_post_request<T: Serialize + ?Sized>(&self, path: &str, data: &T) -> Result<String> {
        let url = self.url(path);
        debug!(%url, "POST");
        let resp = self.http.post(&url).json(data).send().await?;
        Self::read_body(resp).await
    }

    /// Budget allocation across companies without sector constraints.
    pub async fn diversify(&self, request: &CalculatorRequest) -> Result<Allocation> {
        let body = CalculatorRequest { min_sectors: None, ..request.clone() };
        body.validate()?;
        let text = self.send_post_request("/diversify", &body).await?;
        let allocation: Allocation = serde_json::from_str(&text)?;
        info!(positions = allocation.positions.len(), "received allocation");
        Ok(allocation)
    }

    /// Budget allocation spanning at least `min_sectors` sectors (defaults to 1).
    pub async fn sector_diversify(&self, request: &CalculatorRequest) -> Result<Allocation> {
        let body = CalculatorRequest {
            min_sectors: Some(request.min_sectors.unwrap_or(1)),
            ..request.clone()
        };
        body.validate()?;
        let text = self.send_post_request("/sector-diversify", &body).await?;
        let allocation: Allocation = serde_json::from_str(&text)?;
        info!(positions = allocation.positions.len(), "received sector allocation");
        Ok(allocation)
    }

    pub async fn roi(&self, ticker: &str, years: u32) -> Result<RoiResult> {
        if ticker.trim().is_empty() {
            return Err(EsgError::InvalidRequest("ticker must not be empty".to_string()));
        }
        if years == 0 {
            return Err(EsgError::InvalidRequest("years must be at least 1".to_string()));
        }
        let text = self.send_post_request("/ROI", &RoiRequest { ticker, years }).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Resolve a company name to its ticker. `Ok(None)` when the service
    /// answers without one.
    pub async fn lookup_ticker(&self, name: &str) -> Result<Option<String>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EsgError::InvalidRequest("company name must not be empty".to_string()));
        }
        let text = self.send_get_request("/ticker", &[("name", name)]).await?;
        let resp: TickerResponse = serde_json::from_str(&text)?;
        Ok(resp.ticker.filter(|t| !t.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn default_request_matches_dashboard() {
        let req = CalculatorRequest::default();
        assert!(req.validate().is_ok());
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "budget_dollars": 10000.0,
                "risk_tolerance": 0.7,
                "max_companies": 10,
                "min_value": 0.01
            })
        );
    }

    #[test]
    fn sector_request_carries_min_sectors() {
        let req = CalculatorRequest { min_sectors: Some(3), ..Default::default() };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["min_sectors"], 3);
    }

    #[test]
    fn rejects_bad_requests() {
        let bad = [
            CalculatorRequest { budget_dollars: 0.0, ..Default::default() },
            CalculatorRequest { budget_dollars: f64::NAN, ..Default::default() },
            CalculatorRequest { risk_tolerance: -0.1, ..Default::default() },
            CalculatorRequest { max_companies: 0, ..Default::default() },
            CalculatorRequest { min_value: 1.5, ..Default::default() },
            CalculatorRequest { min_sectors: Some(0), ..Default::default() },
            CalculatorRequest { min_sectors: Some(11), ..Default::default() },
        ];
        for req in bad {
            assert!(matches!(req.validate(), Err(EsgError::InvalidRequest(_))), "{req:?}");
        }
    }

    #[test]
    fn decodes_allocation_with_dynamic_keys() {
        let text = r#"{"expected_return": 0.08, "portfolio_beta": 0.65, "MSFT": 2500.5, "AAPL": 4000, "JNJ": 2500.5}"#;
        let alloc: Allocation = serde_json::from_str(text).unwrap();
        assert_eq!(alloc.expected_return, 0.08);
        assert_eq!(alloc.portfolio_beta, 0.65);
        assert_eq!(alloc.positions.len(), 3);
        assert_eq!(
            alloc.sorted_positions(),
            vec![("AAPL", 4000.0), ("JNJ", 2500.5), ("MSFT", 2500.5)]
        );
        assert!((alloc.total_allocated() - 9001.0).abs() < 1e-9);
    }

    #[test]
    fn allocation_without_summary_fields() {
        let alloc: Allocation = serde_json::from_str(r#"{"XOM": 100.0}"#).unwrap();
        assert_eq!(alloc.expected_return, 0.0);
        assert_eq!(alloc.positions["XOM"], 100.0);
    }

    /// Serve one canned HTTP response and hand back the raw request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];

            // headers, then Content-Length bytes of body
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let content_length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let (k, v) = l.split_once(':')?;
                            k.eq_ignore_ascii_case("content-length").then(|| v.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + content_length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }

            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&buf).to_string()
        });

        (format!("http://{addr}"), handle)
    }

    fn client_for(url: String) -> EsgClient {
        let config = Config {
            api_url: url,
            data_file: String::new(),
            http_timeout: Duration::from_secs(5),
        };
        EsgClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn diversify_posts_inputs_and_decodes() {
        let (url, server) = serve_once("HTTP/1.1 200 OK", r#"{"expected_return":0.1,"portfolio_beta":0.9,"KO":10000}"#).await;
        let alloc = client_for(url).diversify(&CalculatorRequest::default()).await.unwrap();
        assert_eq!(alloc.positions["KO"], 10000.0);

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /diversify "));
        assert!(raw.contains("\"budget_dollars\":10000.0"));
        assert!(!raw.contains("min_sectors"));
    }

    #[tokio::test]
    async fn sector_diversify_defaults_min_sectors() {
        let (url, server) = serve_once("HTTP/1.1 200 OK", r#"{"KO":5000,"JNJ":5000}"#).await;
        let alloc = client_for(url).sector_diversify(&CalculatorRequest::default()).await.unwrap();
        assert_eq!(alloc.positions.len(), 2);

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /sector-diversify "));
        assert!(raw.contains("\"min_sectors\":1"));
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let (url, _server) = serve_once("HTTP/1.1 500 Internal Server Error", r#"{"detail":"solver failed"}"#).await;
        let err = client_for(url).roi("AAPL", 3).await.unwrap_err();
        match err {
            EsgError::Api { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("solver failed"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn lookup_ticker_sends_name_query() {
        let (url, server) = serve_once("HTTP/1.1 200 OK", r#"{"ticker":"AAPL"}"#).await;
        let ticker = client_for(url).lookup_ticker("Apple").await.unwrap();
        assert_eq!(ticker.as_deref(), Some("AAPL"));

        let raw = server.await.unwrap();
        assert!(raw.starts_with("GET /ticker?name=Apple "));
    }

    #[tokio::test]
    async fn invalid_requests_never_hit_the_network() {
        let client = client_for("http://127.0.0.1:9".to_string());
        assert!(matches!(client.roi("", 1).await, Err(EsgError::InvalidRequest(_))));
        assert!(matches!(client.roi("AAPL", 0).await, Err(EsgError::InvalidRequest(_))));
        assert!(matches!(client.lookup_ticker("  ").await, Err(EsgError::InvalidRequest(_))));
        let bad = CalculatorRequest { max_companies: 0, ..Default::default() };
        assert!(matches!(client.diversify(&bad).await, Err(EsgError::InvalidRequest(_))));
    }
}
