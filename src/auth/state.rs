use serde::{Deserialize, Serialize};

use crate::shared::errors::AppResult;

/// TMDB session state, serializable to a compact JSON form for the
/// persistent stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub is_authorized: bool,
}

impl AuthState {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn authorized(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            is_authorized: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.is_authorized && self.session_id.is_empty()
    }

    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_compact_json() {
        let state = AuthState::authorized("abc123");
        let json = state.to_json().unwrap();
        assert!(json.contains("\"session_id\":\"abc123\""));
        assert_eq!(AuthState::from_json(&json).unwrap(), state);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let state = AuthState::from_json("{}").unwrap();
        assert!(state.is_empty());
    }
}
