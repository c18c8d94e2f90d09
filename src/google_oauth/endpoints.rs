use super::CLOUD_PLATFORM_SCOPE;
use super::credentials::{AccessToken, AuthorizedUser, ServiceAccountKey};
use crate::error::{OauthError, truncate_body};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use oauth2::basic::BasicClient;
use oauth2::{ClientId, ClientSecret, RefreshToken, TokenResponse, TokenUrl};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Tokens without an `expires_in` are treated as valid for this long.
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Stateless Google token endpoints.
pub(crate) struct GoogleOauthEndpoints;

#[derive(Debug, Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct JwtTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl GoogleOauthEndpoints {
    /// Exchange an ADC refresh token for an access token.
    pub(crate) async fn refresh_user_token(
        user: &AuthorizedUser,
        token_uri: &str,
        http_client: &reqwest::Client,
    ) -> Result<AccessToken, OauthError> {
        let token_url = TokenUrl::new(token_uri.to_string()).map_err(|e| OauthError::Other {
            message: format!("invalid token uri {token_uri}: {e}"),
        })?;
        let client = BasicClient::new(ClientId::new(user.client_id.clone()))
            .set_client_secret(ClientSecret::new(user.client_secret.clone()))
            .set_token_uri(token_url);

        let token = client
            .exchange_refresh_token(&RefreshToken::new(user.refresh_token.clone()))
            .request_async(http_client)
            .await?;

        let ttl = token
            .expires_in()
            .and_then(|d| i64::try_from(d.as_secs()).ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        info!(expires_in = ttl, "Access token refreshed from authorized_user credentials");
        Ok(AccessToken::expires_in(token.access_token().secret(), ttl))
    }

    /// Sign an RS256 assertion for the service account and exchange it for an access token.
    pub(crate) async fn exchange_service_account_jwt(
        key: &ServiceAccountKey,
        http_client: &reqwest::Client,
    ) -> Result<AccessToken, OauthError> {
        let now = Utc::now();
        let claims = JwtClaims {
            iss: &key.client_email,
            scope: CLOUD_PLATFORM_SCOPE,
            aud: &key.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&key.private_key_id);
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        let assertion = encode(&header, &claims, &signing_key)?;

        debug!(token_uri = %key.token_uri, "Exchanging service account JWT for access token");
        let resp = http_client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(OauthError::UpstreamStatus {
                status,
                body: truncate_body(&body),
            });
        }

        let bytes = resp.bytes().await?;
        let token: JwtTokenResponse =
            serde_json::from_slice(&bytes).map_err(|e| OauthError::Parse {
                message: e.to_string(),
                body: truncate_body(&String::from_utf8_lossy(&bytes)),
            })?;
        let ttl = token.expires_in.unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        info!(
            client_email = %key.client_email,
            expires_in = ttl,
            "Access token obtained for service account"
        );
        Ok(AccessToken::expires_in(token.access_token, ttl))
    }
}
