//! Bearer tokens for the Google Calendar API

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use busysync_domain::CalendarCredentials;
use tokio::sync::Mutex;
use tracing::debug;

use super::types::TokenResponse;
use crate::errors::InfraError;
use crate::http::{ensure_success, HttpClient};

/// Tokens are refreshed this long before Google says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Source of bearer tokens for calendar requests.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, InfraError>;
}

/// Build the provider matching the configured credentials.
pub fn access_token_provider(
    credentials: &CalendarCredentials,
    http: HttpClient,
) -> Arc<dyn AccessTokenProvider> {
    match credentials {
        CalendarCredentials::AccessToken { token } => Arc::new(StaticAccessToken::new(token)),
        CalendarCredentials::RefreshToken {
            client_id,
            client_secret,
            refresh_token,
            token_url,
        } => {
            Arc::new(RefreshingAccessToken::new(
                http,
                token_url,
                client_id,
                client_secret,
                refresh_token,
            ))
        }
    }
}

/// A token supplied directly; never refreshed.
pub struct StaticAccessToken {
    token: String,
}

impl StaticAccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl fmt::Debug for StaticAccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticAccessToken").field("token", &"<redacted>").finish()
    }
}

#[async_trait]
impl AccessTokenProvider for StaticAccessToken {
    async fn access_token(&self) -> Result<String, InfraError> {
        Ok(self.token.clone())
    }
}

struct CachedToken {
    token: String,
    refresh_at: Instant,
}

/// OAuth2 refresh-token grant with an in-memory cache.
pub struct RefreshingAccessToken {
    http: HttpClient,
    token_url: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    cached: Mutex<Option<CachedToken>>,
}

impl RefreshingAccessToken {
    pub fn new(
        http: HttpClient,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
            cached: Mutex::new(None),
        }
    }

    async fn refresh(&self) -> Result<CachedToken, InfraError> {
        debug!(token_url = %self.token_url, "refreshing calendar access token");

        let request = self.http.post(&self.token_url).form(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", self.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ]);

        let response = ensure_success(self.http.send(request).await?).await.map_err(|err| {
            match err {
                InfraError::Status { status, body } => {
                    InfraError::Auth(format!("token refresh failed ({status}): {body}"))
                }
                other => other,
            }
        })?;

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| InfraError::Auth(format!("failed to parse token response: {e}")))?;

        let lifetime = Duration::from_secs(u64::try_from(token.expires_in).unwrap_or(0));
        let refresh_at = Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN);

        Ok(CachedToken { token: token.access_token, refresh_at })
    }
}

impl fmt::Debug for RefreshingAccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshingAccessToken")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AccessTokenProvider for RefreshingAccessToken {
    async fn access_token(&self) -> Result<String, InfraError> {
        let mut cached = self.cached.lock().await;

        if let Some(current) = cached.as_ref() {
            if Instant::now() < current.refresh_at {
                return Ok(current.token.clone());
            }
        }

        let fresh = self.refresh().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}
