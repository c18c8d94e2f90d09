pub mod credentials;
pub mod endpoints;
pub mod token;

pub use credentials::{AccessToken, AuthorizedUser, CredentialFile, ServiceAccountKey};
pub use token::{GoogleTokenSource, StaticToken, TokenSource, token_source};

/// Scope requested for Vertex AI and Cloud Storage.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Google OAuth token endpoint.
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
