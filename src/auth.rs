//! Credentials for calls made on the signed-in user's behalf.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuthError {
    #[error("no signed-in user")]
    SignedOut,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub user_id: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Supplies credentials to outbound collaborators.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn credentials(&self) -> Result<Credentials, AuthError>;
}

/// Credentials fixed at start-up, or none at all.
#[derive(Debug, Clone, Default)]
pub struct StaticAuth {
    credentials: Option<Credentials>,
}

impl StaticAuth {
    pub fn new(access_token: impl Into<String>, user_id: Option<String>) -> Self {
        Self {
            credentials: Some(Credentials {
                access_token: access_token.into(),
                user_id,
            }),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthProvider for StaticAuth {
    async fn credentials(&self) -> Result<Credentials, AuthError> {
        self.credentials.clone().ok_or(AuthError::SignedOut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_auth_returns_credentials() {
        let auth = StaticAuth::new("token", Some("user-1".to_string()));
        let creds = auth.credentials().await.unwrap();
        assert_eq!(creds.access_token, "token");
        assert_eq!(creds.user_id.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn signed_out_is_an_error() {
        let auth = StaticAuth::signed_out();
        assert_eq!(auth.credentials().await, Err(AuthError::SignedOut));
    }

    #[test]
    fn debug_hides_token() {
        let creds = Credentials {
            access_token: "secret".to_string(),
            user_id: None,
        };
        assert!(!format!("{creds:?}").contains("secret"));
    }
}
