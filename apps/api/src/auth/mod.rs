//! Sign-in through an external OAuth identity provider.
//!
//! The frontend completes the OAuth flow and hands us an access token; the
//! provider resolves it to a `User`. Token handling beyond that single lookup
//! is the provider's business.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::models::User;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("access token rejected")]
    Rejected,

    #[error("identity provider error (status {0})")]
    Provider(u16),
}

/// Resolves an OAuth access token to the signed-in user.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, access_token: &str) -> Result<User, AuthError>;
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

impl From<UserInfo> for User {
    fn from(info: UserInfo) -> Self {
        let name = info
            .name
            .filter(|n| !n.trim().is_empty())
            .or(info.email)
            .unwrap_or_else(|| info.sub.clone());
        User {
            id: info.sub,
            name,
            image_url: info.picture.filter(|p| !p.is_empty()),
        }
    }
}

/// Google's OpenID userinfo endpoint.
#[derive(Clone)]
pub struct GoogleIdentity {
    client: Client,
    userinfo_url: String,
}

impl GoogleIdentity {
    pub fn new(userinfo_url: String) -> Self {
        Self {
            client: Client::builder()
                .build()
                .expect("Failed to build HTTP client"),
            userinfo_url,
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentity {
    async fn resolve(&self, access_token: &str) -> Result<User, AuthError> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(AuthError::Rejected),
            status if !status.is_success() => return Err(AuthError::Provider(status.as_u16())),
            _ => {}
        }

        let info: UserInfo = response.json().await?;
        debug!("Resolved identity for subject {}", info.sub);
        Ok(info.into())
    }
}
