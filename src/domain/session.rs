//! Per-user session context: authentication state and chat transcript.
//!
//! A `Session` is owned by the request shell and handed to handlers
//! explicitly. There is no expiry and no token refresh.

use std::collections::HashMap;

use serde::Serialize;

use super::chat::Transcript;
use crate::error::DeskError;

/// Read-only username → password table consulted at login.
#[derive(Debug, Clone, Default)]
pub struct CredentialTable {
    passwords: HashMap<String, String>,
}

impl CredentialTable {
    pub fn new(passwords: HashMap<String, String>) -> Self {
        Self { passwords }
    }

    /// Whether `username` exists and `password` matches it.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.passwords
            .get(username)
            .is_some_and(|expected| expected == password)
    }

    pub fn len(&self) -> usize {
        self.passwords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passwords.is_empty()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for CredentialTable {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(u, p)| (u.to_string(), p.to_string()))
                .collect(),
        )
    }
}

/// Authentication state machine: two states, two transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthState {
    #[default]
    Unauthenticated,
    Authenticated {
        username: String,
    },
}

/// Everything one viewer owns for the lifetime of their session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    auth: AuthState,
    /// Chat history for this session.
    pub transcript: Transcript,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to `Authenticated` on a credential match.
    ///
    /// Unknown user and wrong password both return
    /// `InvalidCredentials`, so callers cannot tell them apart.
    pub fn login(
        &mut self,
        credentials: &CredentialTable,
        username: &str,
        password: &str,
    ) -> Result<(), DeskError> {
        if !credentials.verify(username, password) {
            return Err(DeskError::InvalidCredentials);
        }
        self.auth = AuthState::Authenticated {
            username: username.to_string(),
        };
        Ok(())
    }

    /// Back to `Unauthenticated`.
    pub fn logout(&mut self) {
        self.auth = AuthState::Unauthenticated;
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.auth, AuthState::Authenticated { .. })
    }

    /// Username of the authenticated viewer, or `NotAuthenticated`.
    pub fn require_authenticated(&self) -> Result<&str, DeskError> {
        match &self.auth {
            AuthState::Authenticated { username } => Ok(username.as_str()),
            AuthState::Unauthenticated => Err(DeskError::NotAuthenticated),
        }
    }
}
