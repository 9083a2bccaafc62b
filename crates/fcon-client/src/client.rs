//! FordConnect HTTP client implementation

use std::time::Duration;

use fcon_core::{parse_api_response, VehicleData};
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{ClientError, Result};
use crate::types::Garage;

/// Production base URL of the Query API
pub const DEFAULT_BASE_URL: &str = "https://api.vehicle.ford.com/fcon-query/v1/";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default connection timeout
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// FordConnect Query API client
///
/// Holds a pooled HTTP client. The bearer token is supplied per call so the
/// same client survives token refreshes.
#[derive(Debug, Clone)]
pub struct FordClient {
    client: Client,
    base_url: Url,
}

impl FordClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the Query API (e.g. [`DEFAULT_BASE_URL`])
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(base_url, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a new client with custom timeouts
    pub fn with_config(base_url: &str, timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        // Url::join drops the last segment unless the base ends with '/'
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };

        Ok(Self { client, base_url })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // =========================================================================
    // Garage
    // =========================================================================

    /// Look up the vehicle attached to the account
    #[instrument(skip(self, access_token))]
    pub async fn fetch_garage(&self, access_token: &str) -> Result<Garage> {
        let url = self.base_url.join("garage")?;
        debug!("Fetching garage from {}", url);

        let response = self.get(url, access_token).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))
    }

    // =========================================================================
    // Telemetry
    // =========================================================================

    /// Fetch the raw telemetry snapshot without normalizing it
    #[instrument(skip(self, access_token))]
    pub async fn fetch_telemetry_raw(&self, access_token: &str) -> Result<Value> {
        let url = self.base_url.join("telemetry")?;
        debug!("Fetching telemetry from {}", url);

        let response = self.get(url, access_token).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))
    }

    /// Fetch the telemetry snapshot and normalize it
    ///
    /// Mapping failures are returned as [`ClientError::Mapping`].
    pub async fn fetch_telemetry(&self, access_token: &str) -> Result<VehicleData> {
        let raw = self.fetch_telemetry_raw(access_token).await?;
        Ok(parse_api_response(&raw)?)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn get(&self, url: Url, access_token: &str) -> Result<Response> {
        if access_token.is_empty() || access_token.contains(['\r', '\n']) {
            return Err(ClientError::InvalidToken(
                "token is empty or contains line breaks".to_string(),
            ));
        }

        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(send_error)?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(extract_error(response).await)
        }
    }
}

fn send_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout
    } else {
        ClientError::HttpError(err)
    }
}

/// Extract error from failed response
async fn extract_error(response: Response) -> ClientError {
    let status = response.status();
    let message = match response.text().await {
        Ok(body) if !body.trim().is_empty() => body.trim().to_string(),
        _ => format!("HTTP {}", status),
    };

    ClientError::status_error(status.as_u16(), message)
}
