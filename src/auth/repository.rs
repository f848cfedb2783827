use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{watch, RwLock};
use tracing::debug;

use crate::auth::client::TmdbAuthClient;
use crate::auth::state::AuthState;
use crate::auth::store::AuthStore;
use crate::shared::errors::AppResult;

/// Cached tokens are trusted for this long before the persistent store
/// is consulted again.
const AUTH_STATE_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TmdbLoginState {
    LoggedIn,
    LoggedOut,
}

#[derive(Default)]
struct CachedAuth {
    state: Option<AuthState>,
    valid_until: Option<Instant>,
}

impl CachedAuth {
    fn fresh(&self) -> Option<&AuthState> {
        let state = self.state.as_ref()?;
        if !state.is_authorized {
            return None;
        }
        match self.valid_until {
            Some(deadline) if Instant::now() < deadline => Some(state),
            _ => None,
        }
    }
}

/// Holds the active TMDB session: an in-memory copy with a one-hour
/// validity window over a persistent [`AuthStore`].
pub struct TmdbAuthRepository {
    auth_store: Arc<dyn AuthStore>,
    auth_client: Arc<TmdbAuthClient>,
    cached: RwLock<CachedAuth>,
    login_state: watch::Sender<TmdbLoginState>,
}

impl TmdbAuthRepository {
    pub fn new(auth_store: Arc<dyn AuthStore>, auth_client: Arc<TmdbAuthClient>) -> Self {
        Self {
            auth_store,
            auth_client,
            cached: RwLock::new(CachedAuth::default()),
            login_state: watch::channel(TmdbLoginState::LoggedOut).0,
        }
    }

    /// Prime the in-memory state from the persistent store. Call once at
    /// startup.
    pub async fn load(&self) -> AppResult<()> {
        let state = self.auth_store.get().await?.unwrap_or_else(AuthState::empty);
        self.cache_auth_state(state).await;
        Ok(())
    }

    pub fn observe_login_state(&self) -> watch::Receiver<TmdbLoginState> {
        self.login_state.subscribe()
    }

    pub async fn is_logged_in(&self) -> bool {
        let cached = self.cached.read().await;
        cached
            .state
            .as_ref()
            .map(|s| s.is_authorized)
            .unwrap_or(false)
    }

    /// Current session state: the cached copy while it is fresh,
    /// otherwise re-read from the persistent store.
    pub async fn auth_state(&self) -> AppResult<Option<AuthState>> {
        {
            let cached = self.cached.read().await;
            if let Some(state) = cached.fresh() {
                debug!("auth_state: using cached tokens");
                return Ok(Some(state.clone()));
            }
        }

        debug!("auth_state: retrieving tokens from auth store");
        let state = self.auth_store.get().await?;
        if let Some(state) = &state {
            self.cache_auth_state(state.clone()).await;
        }
        Ok(state)
    }

    /// Where to send the user, plus the request token the redirect will
    /// hand back to [`login`](Self::login).
    pub async fn authorization_url(&self, redirect_to: &str) -> AppResult<(String, String)> {
        debug!("authorization_url()");
        let token = self.auth_client.request_token().await?;
        let url = self.auth_client.authorization_url(&token, redirect_to);
        Ok((url, token))
    }

    /// Complete the handshake for an approved request token.
    pub async fn login(&self, request_token: &str) -> AppResult<AuthState> {
        debug!("login()");
        let state = self.auth_client.create_session(request_token).await?;
        self.update_auth_state(state.clone(), true).await?;
        Ok(state)
    }

    pub async fn logout(&self) -> AppResult<()> {
        let session_id = {
            let cached = self.cached.read().await;
            cached.state.as_ref().map(|s| s.session_id.clone())
        };

        self.update_auth_state(AuthState::empty(), true).await?;

        if let Some(session_id) = session_id.filter(|id| !id.is_empty()) {
            let deleted = self.auth_client.delete_session(&session_id).await?;
            debug!(deleted, "logout: deleted tmdb session");
        }
        Ok(())
    }

    async fn update_auth_state(&self, state: AuthState, persist: bool) -> AppResult<()> {
        if persist {
            if state.is_authorized {
                self.auth_store.save(&state).await?;
                debug!("Saved state to auth store");
            } else {
                self.auth_store.clear().await?;
                debug!("Cleared auth store");
            }
        }

        self.cache_auth_state(state).await;
        Ok(())
    }

    async fn cache_auth_state(&self, state: AuthState) {
        let login = if state.is_authorized {
            TmdbLoginState::LoggedIn
        } else {
            TmdbLoginState::LoggedOut
        };
        let valid_until = state
            .is_authorized
            .then(|| Instant::now() + AUTH_STATE_TTL);

        {
            let mut cached = self.cached.write().await;
            cached.state = Some(state);
            cached.valid_until = valid_until;
        }
        self.login_state.send_replace(login);
    }
}
