//! HTTP client for the leaderboard / market definition API

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;

use crate::chain::DeploymentDoc;
use crate::error::OracleError;
use crate::types::{Entry, MarketDefinition, Snapshot};
use crate::DEFAULT_LEADERBOARD_API_BASE;

/// Bound on every data-retrieval call. Submission has no such bound; it
/// blocks until the transaction is mined.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Read-only client for the snapshot and market definition stores.
#[derive(Clone)]
pub struct LeaderboardClient {
    client: Client,
    base_url: String,
}

impl LeaderboardClient {
    /// Create a new client with the default base URL.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_LEADERBOARD_API_BASE)
    }

    /// Create a new client with a custom base URL.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, FETCH_TIMEOUT)
    }

    /// Create a client with an explicit retrieval timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    /// GET /leaderboard/today - the ordered ranked snapshot for today.
    pub async fn fetch_snapshot(&self) -> Result<Snapshot, OracleError> {
        let entries: Vec<Entry> = self.get_json("/leaderboard/today", "leaderboard fetch").await?;
        Ok(Snapshot::from_entries(entries))
    }

    /// GET /markets - current market definitions.
    pub async fn fetch_markets(&self) -> Result<Vec<MarketDefinition>, OracleError> {
        self.get_json("/markets", "market fetch").await
    }

    /// GET /deployments - remote contract address document, possibly partial.
    pub async fn fetch_deployments(&self) -> Result<DeploymentDoc, OracleError> {
        self.get_json("/deployments", "deployment fetch").await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        what: &str,
    ) -> Result<T, OracleError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| OracleError::from_http(what, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::TransportUnavailable {
                what: what.to_string(),
                detail: format!("HTTP {} for {}: {}", status, url, body),
            });
        }

        response.json().await.map_err(|e| OracleError::from_http(what, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = LeaderboardClient::with_base_url("https://example.com/").unwrap();
        assert_eq!(client.base_url, "https://example.com");
    }

    #[tokio::test]
    async fn test_fetch_snapshot_parses_ordered_entries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/leaderboard/today"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "name": "alice", "rank": 1, "score": 99.5, "logo": "a.png" },
                { "name": "bob", "rank": 2, "score": 88.25, "logo": "b.png" }
            ])))
            .mount(&server)
            .await;

        let client = LeaderboardClient::with_base_url(&server.uri()).unwrap();
        let snapshot = client.fetch_snapshot().await.unwrap();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.entries()[0].name, "alice");
        assert_eq!(snapshot.entry("bob").map(|e| e.rank), Some(2));
    }

    #[tokio::test]
    async fn test_fetch_markets_parses_both_kinds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/markets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "kind": "single-entry-threshold",
                    "subjectA": "alice",
                    "lockTime": 1767300000u64,
                    "resolveTime": 1767386400u64,
                    "questionDigest":
                        "0x1111111111111111111111111111111111111111111111111111111111111111"
                },
                {
                    "kind": "head-to-head",
                    "subjectA": "alice",
                    "subjectB": "bob",
                    "lockTime": 1767300000u64,
                    "resolveTime": 1767386400u64,
                    "questionDigest":
                        "0x2222222222222222222222222222222222222222222222222222222222222222"
                }
            ])))
            .mount(&server)
            .await;

        let client = LeaderboardClient::with_base_url(&server.uri()).unwrap();
        let markets = client.fetch_markets().await.unwrap();
        assert_eq!(markets.len(), 2);
        assert_eq!(markets[0].kind.label(), "top10:alice");
        assert_eq!(markets[1].kind.label(), "h2h:alice-vs-bob");
    }

    #[tokio::test]
    async fn test_http_error_maps_to_transport_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/markets"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = LeaderboardClient::with_base_url(&server.uri()).unwrap();
        let err = client.fetch_markets().await.unwrap_err();
        assert!(matches!(err, OracleError::TransportUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_slow_response_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/leaderboard/today"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([]))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client =
            LeaderboardClient::with_timeout(&server.uri(), Duration::from_millis(50)).unwrap();
        let err = client.fetch_snapshot().await.unwrap_err();
        assert!(matches!(err, OracleError::Timeout { .. }));
    }
}
