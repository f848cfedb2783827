//! Auth store tests: file persistence, backup fallback with
//! opportunistic sync, and the repository's cached login state.

use std::sync::Arc;

use tempfile::TempDir;
use watchdone::auth::{
    AuthState, AuthStore, BackupAuthStore, CompositeAuthStore, PreferencesAuthStore,
    TmdbAuthClient, TmdbAuthRepository, TmdbLoginState,
};
use watchdone::config::TmdbConfig;

fn stores(dir: &TempDir) -> (Arc<PreferencesAuthStore>, Arc<BackupAuthStore>) {
    (
        Arc::new(PreferencesAuthStore::new(dir.path().join("prefs/auth.json"))),
        Arc::new(BackupAuthStore::new(dir.path().join("backup/auth.json"))),
    )
}

#[tokio::test]
async fn preferences_store_round_trips() {
    let dir = TempDir::new().unwrap();
    let (prefs, _) = stores(&dir);

    assert_eq!(prefs.get().await.unwrap(), None);

    let state = AuthState::authorized("session-1");
    prefs.save(&state).await.unwrap();
    assert_eq!(prefs.get().await.unwrap(), Some(state));

    prefs.clear().await.unwrap();
    assert_eq!(prefs.get().await.unwrap(), None);
}

#[tokio::test]
async fn backup_clear_zeroes_the_slot() {
    let dir = TempDir::new().unwrap();
    let (_, backup) = stores(&dir);

    backup.save(&AuthState::authorized("session-2")).await.unwrap();
    backup.clear().await.unwrap();

    assert_eq!(backup.get().await.unwrap(), None);
}

#[tokio::test]
async fn composite_falls_back_to_backup_and_syncs_primary() {
    let dir = TempDir::new().unwrap();
    let (prefs, backup) = stores(&dir);

    let state = AuthState::authorized("session-3");
    backup.save(&state).await.unwrap();

    let composite = CompositeAuthStore::new(
        Arc::clone(&prefs) as Arc<dyn AuthStore>,
        Arc::clone(&backup) as Arc<dyn AuthStore>,
    );

    assert_eq!(composite.get().await.unwrap(), Some(state.clone()));
    // Opportunistic sync repopulated the primary store.
    assert_eq!(prefs.get().await.unwrap(), Some(state));
}

#[tokio::test]
async fn composite_save_writes_both_stores() {
    let dir = TempDir::new().unwrap();
    let (prefs, backup) = stores(&dir);
    let composite = CompositeAuthStore::new(
        Arc::clone(&prefs) as Arc<dyn AuthStore>,
        Arc::clone(&backup) as Arc<dyn AuthStore>,
    );

    let state = AuthState::authorized("session-4");
    composite.save(&state).await.unwrap();

    assert_eq!(prefs.get().await.unwrap(), Some(state.clone()));
    assert_eq!(backup.get().await.unwrap(), Some(state));
}

#[tokio::test]
async fn repository_reports_login_state_from_persisted_session() {
    let dir = TempDir::new().unwrap();
    let (prefs, _) = stores(&dir);
    prefs.save(&AuthState::authorized("session-5")).await.unwrap();

    let repository = TmdbAuthRepository::new(
        prefs,
        Arc::new(TmdbAuthClient::new(TmdbConfig::new("key"))),
    );

    let mut login_state = repository.observe_login_state();
    assert_eq!(*login_state.borrow_and_update(), TmdbLoginState::LoggedOut);

    repository.load().await.unwrap();

    assert!(repository.is_logged_in().await);
    assert_eq!(*login_state.borrow_and_update(), TmdbLoginState::LoggedIn);

    let state = repository.auth_state().await.unwrap().unwrap();
    assert_eq!(state.session_id, "session-5");
}

#[tokio::test]
async fn repository_with_empty_store_is_logged_out() {
    let dir = TempDir::new().unwrap();
    let (prefs, _) = stores(&dir);

    let repository = TmdbAuthRepository::new(
        prefs,
        Arc::new(TmdbAuthClient::new(TmdbConfig::new("key"))),
    );
    repository.load().await.unwrap();

    assert!(!repository.is_logged_in().await);
    assert_eq!(repository.auth_state().await.unwrap(), None);
}
