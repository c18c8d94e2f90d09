use super::GOOGLE_TOKEN_URI;
use super::credentials::{AccessToken, CredentialFile};
use super::endpoints::GoogleOauthEndpoints;
use crate::config::Config;
use crate::error::{BatchError, OauthError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Supplies bearer tokens to the Google API clients.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, BatchError>;
}

/// A fixed, externally minted token.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, BatchError> {
        Ok(self.0.clone())
    }
}

/// Mints tokens from a credential file and caches them until shortly before expiry.
pub struct GoogleTokenSource {
    credential: CredentialFile,
    http_client: reqwest::Client,
    cache: Mutex<Option<AccessToken>>,
}

impl GoogleTokenSource {
    pub fn new(credential: CredentialFile, http_client: reqwest::Client) -> Self {
        Self {
            credential,
            http_client,
            cache: Mutex::new(None),
        }
    }

    async fn mint(&self) -> Result<AccessToken, OauthError> {
        match &self.credential {
            CredentialFile::AuthorizedUser(user) => {
                GoogleOauthEndpoints::refresh_user_token(user, GOOGLE_TOKEN_URI, &self.http_client)
                    .await
            }
            CredentialFile::ServiceAccount(key) => {
                GoogleOauthEndpoints::exchange_service_account_jwt(key, &self.http_client).await
            }
        }
    }
}

#[async_trait]
impl TokenSource for GoogleTokenSource {
    async fn access_token(&self) -> Result<String, BatchError> {
        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.as_ref().filter(|token| !token.is_expired()) {
            debug!("Using cached access token");
            return Ok(token.secret.clone());
        }

        let token = self.mint().await?;
        let secret = token.secret.clone();
        *cache = Some(token);
        Ok(secret)
    }
}

/// Pick the token source for this run: an explicit `access_token`, else a credential file.
pub fn token_source(
    cfg: &Config,
    http_client: reqwest::Client,
) -> Result<Arc<dyn TokenSource>, BatchError> {
    if let Some(token) = cfg.access_token.as_deref().filter(|t| !t.trim().is_empty()) {
        info!("Using access token from configuration");
        return Ok(Arc::new(StaticToken::new(token.trim())));
    }

    let credential = CredentialFile::discover(cfg.credentials_path.as_deref())?;
    info!(kind = credential.kind(), "Using Google credential file");
    Ok(Arc::new(GoogleTokenSource::new(credential, http_client)))
}
