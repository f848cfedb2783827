pub mod client;
pub mod repository;
pub mod state;
pub mod store;

pub use client::TmdbAuthClient;
pub use repository::{TmdbAuthRepository, TmdbLoginState};
pub use state::AuthState;
pub use store::{AuthStore, BackupAuthStore, CompositeAuthStore, PreferencesAuthStore};
