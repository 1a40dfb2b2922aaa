use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::domain::models::{Asset, Fiat, Snapshot, Ticker, User};
use crate::domain::Session;
use crate::infrastructure::api::error::{ApiClientError, UNAUTHORIZED_CODE};
use crate::infrastructure::api::wallet_api::{SnapshotRequest, WalletApi};

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: i64,
    #[serde(default)]
    description: String,
}

/// HTTP client for the Mixin wallet API
pub struct MixinApiClient {
    client: Client,
    api_url: String,
    session: Arc<Session>,
}

impl MixinApiClient {
    /// Create a new API client
    pub fn new(config: &AppConfig, session: Arc<Session>) -> Result<Self, ApiClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| {
                ApiClientError::ResponseError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(MixinApiClient {
            client,
            api_url: config.api.url.clone(),
            session,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiClientError> {
        match self.session.token() {
            Some(token) => Ok(request.bearer_auth(token)),
            None => Err(ApiClientError::Unauthorized),
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiClientError> {
        let response = self.authorized(request)?.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        decode_envelope(status, &body)
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ApiClientError> {
        endpoint(&self.api_url, segments)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiClientError> {
        let url = self.url(segments)?;
        tracing::debug!("GET {}", url);
        self.send(self.client.get(url)).await
    }
}

/// Append `segments` to `base`, percent-encoding each one as a single path
/// segment so ids and search text never alter the request
fn endpoint(base: &str, segments: &[&str]) -> Result<Url, ApiClientError> {
    let mut url = Url::parse(base)
        .map_err(|e| ApiClientError::ResponseError(format!("Invalid API URL {}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| ApiClientError::ResponseError(format!("API URL {} cannot take a path", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Decode the `{data}` / `{error}` envelope every endpoint answers with
fn decode_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiClientError> {
    let envelope: Envelope<T> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) if status == UNAUTHORIZED_CODE as u16 => return Err(ApiClientError::Unauthorized),
        Err(e) => {
            tracing::error!("Error decoding API response (status {}): {}", status, e);
            return Err(ApiClientError::ResponseError(format!(
                "Error decoding response: {}",
                e
            )));
        }
    };

    if let Some(error) = envelope.error {
        return Err(ApiClientError::ApiError {
            code: error.code,
            description: error.description,
        });
    }

    match envelope.data {
        Some(data) => Ok(data),
        None if status == UNAUTHORIZED_CODE as u16 => Err(ApiClientError::Unauthorized),
        None => Err(ApiClientError::ResponseError(format!(
            "Response without data (status {})",
            status
        ))),
    }
}

#[async_trait]
impl WalletApi for MixinApiClient {
    async fn fetch_profile(&self) -> Result<User, ApiClientError> {
        self.get(&["me"]).await
    }

    async fn fetch_assets(&self) -> Result<Vec<Asset>, ApiClientError> {
        self.get(&["assets"]).await
    }

    async fn fetch_asset(&self, asset_id: &str) -> Result<Asset, ApiClientError> {
        self.get(&["assets", asset_id]).await
    }

    async fn fetch_exchange_rates(&self) -> Result<Vec<Fiat>, ApiClientError> {
        self.get(&["fiats"]).await
    }

    async fn fetch_snapshots(
        &self,
        request: &SnapshotRequest,
    ) -> Result<Vec<Snapshot>, ApiClientError> {
        let url = self.url(&["snapshots"])?;
        let mut query: Vec<(&str, String)> = vec![
            ("limit", request.limit.to_string()),
            ("order", "DESC".to_string()),
        ];
        if let Some(asset_id) = &request.asset_id {
            query.push(("asset", asset_id.clone()));
        }
        if let Some(opponent_id) = &request.opponent_id {
            query.push(("opponent", opponent_id.clone()));
        }
        if let Some(offset) = &request.offset {
            query.push(("offset", offset.clone()));
        }
        tracing::debug!("GET {} {:?}", url, query);
        self.send(self.client.get(url).query(&query)).await
    }

    async fn fetch_snapshot(&self, snapshot_id: &str) -> Result<Snapshot, ApiClientError> {
        self.get(&["snapshots", snapshot_id]).await
    }

    async fn fetch_users(&self, user_ids: &[String]) -> Result<Vec<User>, ApiClientError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.url(&["users", "fetch"])?;
        tracing::debug!("POST {} ({} ids)", url, user_ids.len());
        self.send(self.client.post(url).json(user_ids)).await
    }

    async fn fetch_ticker(
        &self,
        asset_id: &str,
        at: Option<DateTime<Utc>>,
    ) -> Result<Ticker, ApiClientError> {
        let url = self.url(&["network", "ticker"])?;
        let mut query: Vec<(&str, String)> = vec![("asset", asset_id.to_string())];
        if let Some(at) = at {
            query.push(("offset", at.to_rfc3339_opts(SecondsFormat::Millis, true)));
        }
        self.send(self.client.get(url).query(&query)).await
    }

    async fn fetch_top_assets(&self) -> Result<Vec<Asset>, ApiClientError> {
        self.get(&["network", "assets", "top"]).await
    }

    async fn search_assets(&self, query: &str) -> Result<Vec<Asset>, ApiClientError> {
        self.get(&["network", "assets", "search", query.trim()]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_envelope_data() {
        let fiats: Vec<Fiat> =
            decode_envelope(200, r#"{"data":[{"code":"USD","rate":1},{"code":"EUR","rate":"0.9"}]}"#)
                .unwrap();
        assert_eq!(fiats.len(), 2);
        assert_eq!(fiats[1].code, "EUR");
    }

    #[test]
    fn test_decode_envelope_error_object() {
        let err = decode_envelope::<Vec<Fiat>>(
            202,
            r#"{"error":{"status":202,"code":401,"description":"Unauthorized, maybe invalid token."}}"#,
        )
        .unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.code(), Some(401));
    }

    #[test]
    fn test_decode_envelope_bare_401() {
        let err = decode_envelope::<User>(401, "Unauthorized").unwrap_err();
        assert!(matches!(err, ApiClientError::Unauthorized));
    }

    #[test]
    fn test_endpoint_encodes_reserved_characters_in_one_segment() {
        let url = endpoint(
            "https://api.mixin.one",
            &["network", "assets", "search", "usdt?limit=1#x/y"],
        )
        .unwrap();

        assert_eq!(url.path(), "/network/assets/search/usdt%3Flimit=1%23x%2Fy");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path_segments().unwrap().count(), 4);
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let url = endpoint("http://localhost:8080/v1", &["assets", "a b"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/v1/assets/a%20b");
    }

    #[test]
    fn test_decode_envelope_garbage() {
        let err = decode_envelope::<User>(500, "<html>").unwrap_err();
        assert!(matches!(err, ApiClientError::ResponseError(_)));
    }
}
