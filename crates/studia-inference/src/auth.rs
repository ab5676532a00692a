//! Bearer token validation against Supabase Auth.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use studia_core::{Error, Identity, IdentityProvider, Result};

const AUTH_TIMEOUT_SECS: u64 = 10;

#[derive(Deserialize)]
struct SupabaseUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Identity provider calling `GET {SUPABASE_URL}/auth/v1/user`.
#[derive(Clone)]
pub struct SupabaseAuth {
    client: Client,
    base_url: String,
    anon_key: Option<String>,
}

impl SupabaseAuth {
    pub fn new(base_url: impl Into<String>, anon_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(AUTH_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key,
        })
    }

    /// Build from `SUPABASE_URL` and `SUPABASE_ANON_KEY`.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("SUPABASE_URL")
            .map_err(|_| Error::Config("SUPABASE_URL is required for authentication".into()))?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY")
            .ok()
            .filter(|k| !k.is_empty());
        Self::new(base_url, anon_key)
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuth {
    async fn authenticate(&self, token: &str) -> Result<Identity> {
        let url = format!("{}/auth/v1/user", self.base_url);
        let mut req = self.client.get(&url).bearer_auth(token);
        if let Some(ref key) = self.anon_key {
            req = req.header("apikey", key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| Error::Request(format!("Auth request failed: {}", e)))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                debug!(subsystem = "auth", "Token rejected by identity provider");
                return Err(Error::Unauthorized("Invalid or expired token".into()));
            }
            status => {
                warn!(
                    subsystem = "auth",
                    status = status.as_u16(),
                    "Identity provider returned unexpected status"
                );
                return Err(Error::Request(format!(
                    "Identity provider returned {}",
                    status
                )));
            }
        }

        let user: SupabaseUser = response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("Invalid user payload: {}", e)))?;
        let user_id = Uuid::parse_str(&user.id)
            .map_err(|_| Error::Unauthorized("Token subject is not a valid user id".into()))?;

        Ok(Identity {
            user_id,
            email: user.email,
        })
    }
}
