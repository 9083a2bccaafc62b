//! Bearer token capability
//!
//! Token acquisition and refresh happen outside this workspace. The
//! coordinator only asks a [`TokenProvider`] for a currently valid access
//! token before each poll and treats any failure as an authorization error.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AuthError, AuthResult};

/// Tokens expiring within this window are treated as already expired
const EXPIRY_LEEWAY_SECS: i64 = 20;

/// Supplies a valid bearer token or fails
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return an access token that is valid right now
    async fn access_token(&self) -> AuthResult<String>;
}

/// OAuth token as persisted by the token manager
///
/// Mirrors the standard token response with `expires_at` as Unix seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<f64>,
}

impl StoredToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at.timestamp() as f64);
        self
    }

    /// Expiry as a timestamp, if the token carries one
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .and_then(|secs| Utc.timestamp_opt(secs as i64, 0).single())
    }

    /// Check validity against `now`, allowing for clock skew
    pub fn ensure_valid_at(&self, now: DateTime<Utc>) -> AuthResult<()> {
        if self.access_token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        match self.expiry() {
            Some(expiry) if expiry - Duration::seconds(EXPIRY_LEEWAY_SECS) <= now => {
                Err(AuthError::Expired(expiry))
            }
            _ => Ok(()),
        }
    }
}

/// Token held in memory; replaced by whoever performs the refresh
#[derive(Debug, Default)]
pub struct StaticToken {
    token: RwLock<Option<StoredToken>>,
}

impl StaticToken {
    pub fn new(token: StoredToken) -> Self {
        Self {
            token: RwLock::new(Some(token)),
        }
    }

    /// Install a freshly refreshed token
    pub fn replace(&self, token: StoredToken) {
        *self.token.write() = Some(token);
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> AuthResult<String> {
        let guard = self.token.read();
        let token = guard.as_ref().ok_or(AuthError::MissingToken)?;
        token.ensure_valid_at(Utc::now())?;
        Ok(token.access_token.clone())
    }
}

/// Reads the token from a JSON file on every call
///
/// An external refresher rewrites the file; this provider never writes it.
#[derive(Debug, Clone)]
pub struct FileTokenProvider {
    path: PathBuf,
}

impl FileTokenProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> AuthResult<StoredToken> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AuthError::MissingToken)
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }
}

#[async_trait]
impl TokenProvider for FileTokenProvider {
    async fn access_token(&self) -> AuthResult<String> {
        let token = self.load().await?;
        token.ensure_valid_at(Utc::now())?;
        debug!(path = %self.path.display(), "Loaded access token");
        Ok(token.access_token)
    }
}
