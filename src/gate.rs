//! Shared-password gate in front of the catalog screens.
//!
//! This is a convenience lock for a single operator: the password is compared
//! in cleartext against a value from local configuration, with no hashing,
//! lockout or rate limiting. Do not rely on it for real access control.

use crate::error::{AppError, Result};

pub struct AccessGate {
    expected: Option<String>,
    pub authorized: bool,
    pub candidate: String,
    pub notice: Option<String>,
}

impl AccessGate {
    /// An empty configured password counts as unset.
    pub fn new(expected: Option<String>) -> Self {
        Self {
            expected: expected.filter(|p| !p.is_empty()),
            authorized: false,
            candidate: String::new(),
            notice: None,
        }
    }

    /// Checks `candidate` against the configured password. Fails closed when
    /// no password is configured.
    pub fn attempt_login(&mut self, candidate: &str) -> Result<()> {
        let Some(expected) = self.expected.as_deref() else {
            return Err(AppError::Config(
                "admin_password is not configured; the console stays locked".to_string(),
            ));
        };

        if candidate == expected {
            self.authorized = true;
            self.notice = None;
            tracing::info!("Operator unlocked the console");
            Ok(())
        } else {
            tracing::warn!("Rejected login attempt");
            Err(AppError::Auth("Incorrect password".to_string()))
        }
    }

    /// Submits the typed candidate, recording any failure in `notice`.
    pub fn submit(&mut self) -> bool {
        let candidate = std::mem::take(&mut self.candidate);
        let result = self.attempt_login(&candidate);
        self.candidate = candidate;

        match result {
            Ok(()) => {
                self.candidate.clear();
                true
            }
            Err(e) => {
                self.notice = Some(e.to_string());
                false
            }
        }
    }
}
