use serde::Deserialize;
use serde_json::json;

use crate::auth::state::AuthState;
use crate::config::TmdbConfig;
use crate::remote::http_client::RateLimitClient;
use crate::shared::errors::{AppError, AppResult};

const AUTHENTICATE_URL: &str = "https://www.themoviedb.org/authenticate";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    success: bool,
    request_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    success: bool,
    session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeleteSessionResponse {
    success: bool,
}

/// TMDB v3 authentication handshake: request token → user authorization
/// in the browser → session creation.
pub struct TmdbAuthClient {
    http_client: RateLimitClient,
    config: TmdbConfig,
}

impl TmdbAuthClient {
    pub fn new(config: TmdbConfig) -> Self {
        Self {
            http_client: RateLimitClient::for_tmdb(),
            config,
        }
    }

    /// Create client with custom HTTP client (for testing)
    pub fn with_client(http_client: RateLimitClient, config: TmdbConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    pub async fn request_token(&self) -> AppResult<String> {
        let url = format!(
            "{}/authentication/token/new?api_key={}",
            self.config.base_url, self.config.api_key
        );
        let response: TokenResponse = self.http_client.get(&url).await?;

        match response.request_token {
            Some(token) if response.success => Ok(token),
            _ => Err(AppError::Unauthorized(
                "TMDB did not issue a request token".to_string(),
            )),
        }
    }

    pub async fn create_session(&self, request_token: &str) -> AppResult<AuthState> {
        let url = format!(
            "{}/authentication/session/new?api_key={}",
            self.config.base_url, self.config.api_key
        );
        let body = json!({ "request_token": request_token });
        let response: SessionResponse = self.http_client.post_json(&url, &body).await?;

        match response.session_id {
            Some(session_id) if response.success => Ok(AuthState::authorized(session_id)),
            _ => Err(AppError::Unauthorized(
                "TMDB rejected the request token".to_string(),
            )),
        }
    }

    pub async fn delete_session(&self, session_id: &str) -> AppResult<bool> {
        let url = format!(
            "{}/authentication/session?api_key={}",
            self.config.base_url, self.config.api_key
        );
        let body = json!({ "session_id": session_id });
        let response: DeleteSessionResponse = self.http_client.delete_json(&url, &body).await?;
        Ok(response.success)
    }

    /// Where to send the user so they can approve the request token.
    pub fn authorization_url(&self, request_token: &str, redirect_to: &str) -> String {
        format!(
            "{}/{}?redirect_to={}",
            AUTHENTICATE_URL,
            request_token,
            urlencoding::encode(redirect_to)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_url_encodes_redirect() {
        let client = TmdbAuthClient::new(TmdbConfig::new("key"));
        let url = client.authorization_url("tok123", "watchdone://tmdb/auth/success");

        assert!(url.starts_with("https://www.themoviedb.org/authenticate/tok123"));
        assert!(url.contains("redirect_to=watchdone%3A%2F%2Ftmdb%2Fauth%2Fsuccess"));
    }
}
