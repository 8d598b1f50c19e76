use anyhow::{Context, Result};
use keyring::Entry;

use super::session::TokenStore;

const SERVICE_NAME: &str = "budgetdesk";

/// Token store backed by the OS keychain. The storage key is used as the
/// keychain account name.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringTokenStore;

impl KeyringTokenStore {
    fn entry(key: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, key).context("Failed to create keyring entry")
    }
}

impl TokenStore for KeyringTokenStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        match Self::entry(key)?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn save(&mut self, key: &str, token: &str) -> Result<()> {
        Self::entry(key)?
            .set_password(token)
            .context("Failed to store token in keychain")
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match Self::entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}
