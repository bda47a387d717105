//! Demo interceptor client.
//!
//! Sends a raw transaction payload to the local compression sidecar and
//! reports what it did with it. One request per call, no retry.

use std::fmt;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::format::to_fixed;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const INTERCEPT_PATH: &str = "/intercept";
/// ERC-20 `transfer(address,uint256)` call used by the page demo.
pub const DEMO_PAYLOAD_HEX: &str = "0xa9059cbb0000000000000000000000005fbdb2315678afecb367f032d93f642f64180aa300000000000000000000000000000000000000000000000000000000000003e8";

#[derive(Debug, Serialize)]
struct InterceptRequest<'a> {
    payload_hex: &'a str,
}

/// Sidecar response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InterceptReport {
    pub original_size: u64,
    pub packed_size: u64,
    pub tx_hash: String,
    pub gas_used: u64,
    pub compression_time_ms: f64,
}

impl InterceptReport {
    /// Compression time with four decimals.
    pub fn compression_time_text(&self) -> String {
        to_fixed(self.compression_time_ms, 4)
    }

    /// First ten characters of the hash followed by `...`.
    pub fn short_hash(&self) -> String {
        let prefix: String = self.tx_hash.chars().take(10).collect();
        format!("{prefix}...")
    }
}

/// Why a demo request failed.
#[derive(Debug)]
pub enum InterceptError {
    /// The sidecar answered with a non-success status.
    Api { status: u16 },
    /// The sidecar could not be reached or sent an unreadable body.
    Unreachable(reqwest::Error),
}

impl InterceptError {
    pub fn status_text(&self) -> &'static str {
        match self {
            Self::Api { .. } => InterceptStatus::ApiFailed.text(),
            Self::Unreachable(_) => InterceptStatus::Unreachable.text(),
        }
    }
}

impl fmt::Display for InterceptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api { status } => write!(f, "intercept API returned HTTP {status}"),
            Self::Unreachable(err) => write!(f, "intercept sidecar unreachable: {err}"),
        }
    }
}

impl std::error::Error for InterceptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api { .. } => None,
            Self::Unreachable(err) => Some(err),
        }
    }
}

/// Status line shown next to the demo button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptStatus {
    Sending,
    Success,
    ApiFailed,
    Unreachable,
}

impl InterceptStatus {
    pub fn text(self) -> &'static str {
        match self {
            Self::Sending => "Intercepting & Sending...",
            Self::Success => "Success!",
            Self::ApiFailed => "Error: API failed",
            Self::Unreachable => "Error: Is sidecar running?",
        }
    }

    pub fn is_error(self) -> bool {
        matches!(self, Self::ApiFailed | Self::Unreachable)
    }
}

impl From<&InterceptError> for InterceptStatus {
    fn from(err: &InterceptError) -> Self {
        match err {
            InterceptError::Api { .. } => Self::ApiFailed,
            InterceptError::Unreachable(_) => Self::Unreachable,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InterceptClient {
    endpoint: Url,
    http: reqwest::Client,
}

impl InterceptClient {
    /// # Errors
    /// Returns an error if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url.trim())
            .with_context(|| format!("Invalid intercept base URL '{base_url}'"))?;
        if !matches!(base.scheme(), "http" | "https") {
            bail!("Intercept base URL must be http or https, got '{base_url}'");
        }
        let endpoint = format!("{}{INTERCEPT_PATH}", base.as_str().trim_end_matches('/'));
        let endpoint = Url::parse(&endpoint)
            .with_context(|| format!("Invalid intercept endpoint '{endpoint}'"))?;
        Ok(Self {
            endpoint,
            http: reqwest::Client::new(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Posts `payload_hex` (trimmed) to the sidecar.
    ///
    /// # Errors
    /// `Api` for a non-success status, `Unreachable` for transport or
    /// decode failures.
    pub async fn send(&self, payload_hex: &str) -> Result<InterceptReport, InterceptError> {
        let payload_hex = payload_hex.trim();
        debug!(endpoint = %self.endpoint, bytes = payload_hex.len(), "sending intercept request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&InterceptRequest { payload_hex })
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "intercept request failed");
                InterceptError::Unreachable(err)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "intercept API failed");
            return Err(InterceptError::Api {
                status: status.as_u16(),
            });
        }

        response
            .json::<InterceptReport>()
            .await
            .map_err(InterceptError::Unreachable)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn can_bind_localhost() -> bool {
        std::net::TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn sample_body() -> serde_json::Value {
        json!({
            "original_size": 68,
            "packed_size": 24,
            "tx_hash": "0x9f2c1e77aa00bb11cc22",
            "gas_used": 21000,
            "compression_time_ms": 0.123_456,
        })
    }

    #[test]
    fn test_report_formatting() {
        let report: InterceptReport = serde_json::from_value(sample_body()).unwrap();
        assert_eq!(report.compression_time_text(), "0.1235");
        assert_eq!(report.short_hash(), "0x9f2c1e77...");
    }

    #[test]
    fn test_short_hash_keeps_short_values() {
        let report = InterceptReport {
            original_size: 0,
            packed_size: 0,
            tx_hash: "0xab".to_string(),
            gas_used: 0,
            compression_time_ms: 2.0,
        };
        assert_eq!(report.short_hash(), "0xab...");
        assert_eq!(report.compression_time_text(), "2.0000");
    }

    #[test]
    fn test_compression_time_rounds_ties_up() {
        let report = InterceptReport {
            original_size: 68,
            packed_size: 24,
            tx_hash: "0x00".to_string(),
            gas_used: 21000,
            compression_time_ms: 0.031_25,
        };
        assert_eq!(report.compression_time_text(), "0.0313");
    }

    #[test]
    fn test_base_url_validation() {
        let client = InterceptClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.endpoint().as_str(), "http://localhost:3000/intercept");
        assert!(InterceptClient::new("not a url").is_err());
        assert!(InterceptClient::new("ftp://localhost").is_err());
    }

    #[tokio::test]
    async fn test_send_success() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/intercept"))
            .and(body_json(json!({ "payload_hex": "0xdeadbeef" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = InterceptClient::new(&server.uri()).unwrap();
        let report = client.send("  0xdeadbeef\n").await.unwrap();
        assert_eq!(report.original_size, 68);
        assert_eq!(report.packed_size, 24);
        assert_eq!(report.gas_used, 21000);
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/intercept"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = InterceptClient::new(&server.uri()).unwrap();
        let err = client.send(DEMO_PAYLOAD_HEX).await.unwrap_err();
        assert!(matches!(err, InterceptError::Api { status: 500 }));
        assert_eq!(err.status_text(), "Error: API failed");
    }

    #[tokio::test]
    async fn test_bad_body_is_unreachable() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/intercept"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = InterceptClient::new(&server.uri()).unwrap();
        let err = client.send(DEMO_PAYLOAD_HEX).await.unwrap_err();
        assert_eq!(InterceptStatus::from(&err), InterceptStatus::Unreachable);
        assert_eq!(err.status_text(), "Error: Is sidecar running?");
    }

    #[tokio::test]
    async fn test_closed_port_is_unreachable() {
        let port = match std::net::TcpListener::bind("127.0.0.1:0") {
            Ok(listener) => listener.local_addr().unwrap().port(),
            Err(_) => return,
        };
        let client = InterceptClient::new(&format!("http://127.0.0.1:{port}")).unwrap();
        let err = client.send(DEMO_PAYLOAD_HEX).await.unwrap_err();
        assert!(matches!(err, InterceptError::Unreachable(_)));
    }
}
