//! Single-operator session gate.
//!
//! Credentials are compared verbatim against a fixed pair (configurable via
//! `[session]`). The only persisted state is the literal `"true"` under
//! [`AUTH_KEY`]; anything else, including an unreadable store, means
//! logged out.

use crate::config::SessionConfig;
use crate::storage::{KeyValueStore, AUTH_KEY};

pub const DEFAULT_IDENTIFIER: &str = "admin@folio.local";
pub const DEFAULT_SECRET: &str = "folio-admin";

const AUTH_TRUE: &str = "true";

pub struct SessionGate<S: KeyValueStore> {
    store: S,
    identifier: String,
    secret: String,
    authenticated: bool,
}

impl<S: KeyValueStore> SessionGate<S> {
    /// Gate with the built-in credentials. Restores a persisted session.
    pub fn new(store: S) -> Self {
        Self::with_credentials(store, DEFAULT_IDENTIFIER, DEFAULT_SECRET)
    }

    pub fn from_config(store: S, config: &SessionConfig) -> Self {
        Self::with_credentials(store, &config.identifier, &config.secret)
    }

    pub fn with_credentials(
        store: S,
        identifier: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        let authenticated = match store.get(AUTH_KEY) {
            Ok(value) => value.as_deref() == Some(AUTH_TRUE),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read session flag");
                false
            }
        };
        Self {
            store,
            identifier: identifier.into(),
            secret: secret.into(),
            authenticated,
        }
    }

    /// Exact, case-sensitive comparison. On success the session is
    /// persisted; a failed write still leaves this process logged in.
    pub fn login(&mut self, identifier: &str, secret: &str) -> bool {
        if identifier != self.identifier || secret != self.secret {
            tracing::debug!("login rejected");
            return false;
        }
        self.authenticated = true;
        if let Err(e) = self.store.set(AUTH_KEY, AUTH_TRUE) {
            tracing::warn!(error = %e, "session flag not saved");
        }
        tracing::info!("logged in");
        true
    }

    pub fn logout(&mut self) {
        self.authenticated = false;
        if let Err(e) = self.store.delete(AUTH_KEY) {
            tracing::warn!(error = %e, "session flag not removed");
        }
        tracing::info!("logged out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
