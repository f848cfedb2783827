use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::auth::state::AuthState;
use crate::shared::errors::AppResult;

/// Persistent storage for the TMDB session state.
#[async_trait]
pub trait AuthStore: Send + Sync {
    async fn get(&self) -> AppResult<Option<AuthState>>;
    async fn save(&self, auth_state: &AuthState) -> AppResult<()>;
    async fn clear(&self) -> AppResult<()>;

    async fn is_available(&self) -> bool {
        true
    }
}

/// Preferences-backed store: one JSON file on disk.
pub struct PreferencesAuthStore {
    path: PathBuf,
}

impl PreferencesAuthStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AuthStore for PreferencesAuthStore {
    async fn get(&self) -> AppResult<Option<AuthState>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => Ok(Some(AuthState::from_json(&json)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, auth_state: &AuthState) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, auth_state.to_json()?).await?;
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Secondary OS-level backup location, consulted when the primary store
/// is empty. May be unavailable (e.g. the backup directory cannot be
/// created on this host).
pub struct BackupAuthStore {
    path: PathBuf,
}

impl BackupAuthStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AuthStore for BackupAuthStore {
    async fn get(&self) -> AppResult<Option<AuthState>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(json) if json.trim().is_empty() => Ok(None),
            Ok(json) => Ok(Some(AuthState::from_json(&json)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, auth_state: &AuthState) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, auth_state.to_json()?).await?;
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        // Overwrite with nothing rather than delete, mirroring how block
        // storage zeroes the slot.
        match tokio::fs::write(&self.path, "").await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn is_available(&self) -> bool {
        match self.path.parent() {
            Some(parent) => tokio::fs::create_dir_all(parent).await.is_ok(),
            None => true,
        }
    }
}

/// Primary store with an opportunistically synced backup: reads fall
/// back to the backup (and repopulate the primary); writes go to both,
/// with backup failures logged rather than surfaced.
pub struct CompositeAuthStore {
    primary: Arc<dyn AuthStore>,
    backup: Arc<dyn AuthStore>,
}

impl CompositeAuthStore {
    pub fn new(primary: Arc<dyn AuthStore>, backup: Arc<dyn AuthStore>) -> Self {
        Self { primary, backup }
    }
}

#[async_trait]
impl AuthStore for CompositeAuthStore {
    async fn get(&self) -> AppResult<Option<AuthState>> {
        if let Some(state) = self.primary.get().await? {
            return Ok(Some(state));
        }

        if self.backup.is_available().await {
            if let Some(state) = self.backup.get().await? {
                debug!("Auth state restored from backup store");
                if let Err(err) = self.primary.save(&state).await {
                    warn!(error = %err, "Failed to sync auth state back to primary store");
                }
                return Ok(Some(state));
            }
        }

        Ok(None)
    }

    async fn save(&self, auth_state: &AuthState) -> AppResult<()> {
        self.primary.save(auth_state).await?;
        if self.backup.is_available().await {
            if let Err(err) = self.backup.save(auth_state).await {
                warn!(error = %err, "Failed to save auth state to backup store");
            }
        }
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        self.primary.clear().await?;
        if self.backup.is_available().await {
            if let Err(err) = self.backup.clear().await {
                warn!(error = %err, "Failed to clear auth state from backup store");
            }
        }
        Ok(())
    }
}
