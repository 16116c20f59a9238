//! Data API client
//!
//! Talks to the sim platform's member Data API: password-digest login that
//! yields a short-lived bearer token, then authenticated GETs against the
//! hosted results search. The token is cached and refreshed ahead of its
//! TTL; a 401 mid-fetch drops the session and retries once.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::provider::types::SessionRecord;
use crate::provider::ResultsProvider;
use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use url::Url;

/// Tokens are issued for an hour; re-authenticate a little ahead of expiry
const TOKEN_TTL_SECS: i64 = 60 * 60;
const TOKEN_SAFETY_MARGIN_SECS: i64 = 5 * 60;

struct AuthSession {
    token: String,
    authenticated_at: DateTime<Utc>,
}

/// HTTP implementation of [`ResultsProvider`] over the platform's Data API
pub struct DataApiClient {
    client: Client,
    base_url: Url,
    email: String,
    password: String,
    session: RwLock<Option<AuthSession>>,
}

impl DataApiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: config.api_base_url.clone(),
            email: config.api_email.clone(),
            password: config.api_password.clone(),
            session: RwLock::new(None),
        }
    }

    /// Login digest required by the auth endpoint:
    /// base64(sha256(password + lowercase(email)))
    fn login_digest(email: &str, password: &str) -> String {
        let input = format!("{}{}", password, email.to_lowercase());
        let mut hasher = Sha256::new();
        hasher.update(input.as_bytes());
        base64::engine::general_purpose::STANDARD.encode(hasher.finalize())
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::Config(format!("Invalid Data API endpoint: {}", e)))
    }

    fn cached_token(&self, now: DateTime<Utc>) -> Option<String> {
        let session = self.session.read();
        session
            .as_ref()
            .filter(|s| !token_expired(s.authenticated_at, now))
            .map(|s| s.token.clone())
    }

    fn drop_token(&self) {
        *self.session.write() = None;
    }

    /// Authenticate against the Data API and cache the bearer token
    async fn authenticate(&self) -> Result<String> {
        #[derive(Serialize)]
        struct AuthRequest<'a> {
            email: &'a str,
            password: String,
        }

        let request = AuthRequest {
            email: &self.email,
            password: Self::login_digest(&self.email, &self.password),
        };

        let response = self
            .client
            .post(self.endpoint("auth")?)
            .json(&request)
            .send()
            .await?;

        #[derive(Deserialize)]
        struct AuthReply {
            authcode: Option<String>,
            message: Option<String>,
        }

        let reply: AuthReply = response.json().await?;

        let token = match reply.authcode {
            Some(token) if !token.is_empty() => token,
            _ => {
                let message = reply
                    .message
                    .unwrap_or_else(|| "login rejected".to_string());
                return Err(AppError::Auth(message));
            }
        };

        info!("Authenticated against the Data API");
        *self.session.write() = Some(AuthSession {
            token: token.clone(),
            authenticated_at: Utc::now(),
        });

        Ok(token)
    }

    async fn bearer_token(&self) -> Result<String> {
        if let Some(token) = self.cached_token(Utc::now()) {
            debug!("Reusing cached Data API token");
            return Ok(token);
        }
        self.authenticate().await
    }

    async fn search_request(
        &self,
        token: &str,
        season_year: i32,
        season_quarter: i32,
        race_week: i32,
    ) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(self.endpoint("data/results/search_series")?)
            .bearer_auth(token)
            .query(&[
                ("season_year", season_year),
                ("season_quarter", season_quarter),
                ("race_week_num", race_week),
            ])
            .send()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl ResultsProvider for DataApiClient {
    fn name(&self) -> &'static str {
        "data-api"
    }

    async fn fetch_series_results(
        &self,
        season_year: i32,
        season_quarter: i32,
        race_week: i32,
    ) -> Result<Vec<SessionRecord>> {
        let token = self.bearer_token().await?;
        let mut response = self
            .search_request(&token, season_year, season_quarter, race_week)
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            // Token invalidated server side; one fresh login, one retry
            warn!("Data API returned 401, re-authenticating");
            self.drop_token();
            let token = self.authenticate().await?;
            response = self
                .search_request(&token, season_year, season_quarter, race_week)
                .await?;
        }

        let response = response.error_for_status()?;

        #[derive(Deserialize)]
        struct SearchReply {
            success: bool,
            message: Option<String>,
            results: Option<Vec<SessionRecord>>,
        }

        let reply: SearchReply = response.json().await?;

        if !reply.success {
            let message = reply
                .message
                .unwrap_or_else(|| "results search rejected".to_string());
            return Err(AppError::Provider(message));
        }

        Ok(reply.results.unwrap_or_default())
    }
}

/// True when a token issued at `authenticated_at` should no longer be used
fn token_expired(authenticated_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let age = now.signed_duration_since(authenticated_at);
    age.num_seconds() >= TOKEN_TTL_SECS - TOKEN_SAFETY_MARGIN_SECS
}
