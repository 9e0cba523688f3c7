//! In-memory account store backing register/login.
//!
//! Deliberately simple: usernames map to a blake3 digest of the password.
//! Nothing is persisted.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use drowse_core::AccountError;

#[derive(Debug, Clone)]
struct Account {
    email: Option<String>,
    password_digest: [u8; 32],
}

#[derive(Clone, Default)]
pub struct AccountStore {
    /// username → account
    accounts: Arc<DashMap<String, Account>>,
}

fn digest(password: &str) -> [u8; 32] {
    *blake3::hash(password.as_bytes()).as_bytes()
}

impl AccountStore {
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(DashMap::new()),
        }
    }

    pub fn register(
        &self,
        username: &str,
        email: Option<&str>,
        password: &str,
    ) -> Result<(), AccountError> {
        if username.trim().is_empty() {
            return Err(AccountError::UsernameRequired);
        }
        match self.accounts.entry(username.to_string()) {
            Entry::Occupied(_) => Err(AccountError::UserExists(username.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(Account {
                    email: email.map(str::to_string),
                    password_digest: digest(password),
                });
                tracing::info!(username, "account registered");
                Ok(())
            }
        }
    }

    /// Check credentials. Returns the identity to open a session for.
    pub fn login(&self, username: &str, password: &str) -> Result<String, AccountError> {
        let ok = self
            .accounts
            .get(username)
            .map(|a| a.password_digest == digest(password))
            .unwrap_or(false);
        if ok {
            Ok(username.to_string())
        } else {
            tracing::warn!(username, "login rejected");
            Err(AccountError::InvalidLogin)
        }
    }

    pub fn email(&self, username: &str) -> Option<String> {
        self.accounts.get(username).and_then(|a| a.email.clone())
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
