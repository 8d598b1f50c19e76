use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::models::UserDescriptor;

/// Fixed storage key the credential lives under.
pub const TOKEN_KEY: &str = "bmp_jwt";

/// Token file name in cache directory
const TOKEN_FILE: &str = "session.json";

/// Persistent key/value storage for the session credential.
pub trait TokenStore: Send {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&mut self, key: &str, token: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Stores credentials as a small JSON object in the cache directory, keyed by
/// storage key.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            path: cache_dir.join(TOKEN_FILE),
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents =
            std::fs::read_to_string(&self.path).context("Failed to read session file")?;
        serde_json::from_str(&contents).context("Failed to parse session file")
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if values.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).context("Failed to remove session file")?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, contents).context("Failed to write session file")
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn save(&mut self, key: &str, token: &str) -> Result<()> {
        let mut values = self.read_all().unwrap_or_default();
        values.insert(key.to_string(), token.to_string());
        self.write_all(&values)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut values = self.read_all().unwrap_or_default();
        values.remove(key);
        self.write_all(&values)
    }
}

/// Process-local store. Clones share the same map, so a test can keep a handle
/// and observe what the session holder did.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    values: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        store.lock().insert(TOKEN_KEY.to_string(), token.to_string());
        store
    }

    pub fn peek(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.peek(key))
    }

    fn save(&mut self, key: &str, token: &str) -> Result<()> {
        self.lock().insert(key.to_string(), token.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}

/// Claims embedded in the credential. Only the fields the console uses are
/// decoded; the signature is never verified client side.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Claims {
    pub exp: Option<i64>,
    pub login: Option<String>,
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub role: Option<String>,
    pub service_id: Option<i64>,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// A token without a readable expiry is treated as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map(|exp| exp <= now).unwrap_or(true)
    }

    pub fn user(&self) -> UserDescriptor {
        UserDescriptor {
            login: self.login.clone(),
            nom: self.nom.clone(),
            prenom: self.prenom.clone(),
            role: self.role.clone().unwrap_or_default(),
        }
    }
}

/// Holds the one active credential and the user it belongs to.
pub struct SessionHolder {
    store: Box<dyn TokenStore>,
    user: Option<UserDescriptor>,
}

impl SessionHolder {
    pub fn new(store: Box<dyn TokenStore>) -> Self {
        Self { store, user: None }
    }

    /// The stored credential, if any. Storage failures read as absent.
    pub fn get(&self) -> Option<String> {
        match self.store.load(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read stored credential");
                None
            }
        }
    }

    pub fn set(&mut self, token: &str) -> Result<()> {
        self.store.save(TOKEN_KEY, token)
    }

    /// Remove the credential and forget the user. Never fails; storage errors are logged.
    pub fn clear(&mut self) {
        self.user = None;
        if let Err(e) = self.store.remove(TOKEN_KEY) {
            warn!(error = %e, "Failed to remove stored credential");
        }
    }

    /// Parse the claims segment of a JWT without verifying its signature.
    pub fn decode(token: &str) -> Option<Claims> {
        let payload = token.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Startup check: keep the stored credential only if its expiry is in the
    /// future, otherwise purge it. Returns the claims of a valid session.
    pub fn restore(&mut self, now: DateTime<Utc>) -> Option<Claims> {
        let token = self.get()?;
        match Self::decode(&token) {
            Some(claims) if !claims.is_expired_at(now) => {
                info!(login = ?claims.login, "Restored session");
                self.user = Some(claims.user());
                Some(claims)
            }
            Some(_) => {
                info!("Stored session expired, purging credential");
                self.clear();
                None
            }
            None => {
                debug!("Stored credential is malformed, purging");
                self.clear();
                None
            }
        }
    }

    pub fn user(&self) -> Option<&UserDescriptor> {
        self.user.as_ref()
    }

    pub fn set_user(&mut self, user: UserDescriptor) {
        self.user = Some(user);
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.get()
            .and_then(|t| Self::decode(&t))
            .map(|c| !c.is_expired_at(now))
            .unwrap_or(false)
    }
}

/// Session holder shared between the gateway and the console.
/// The lock is only ever held for the duration of a synchronous call.
#[derive(Clone)]
pub struct SharedSession(Arc<Mutex<SessionHolder>>);

impl SharedSession {
    pub fn new(holder: SessionHolder) -> Self {
        Self(Arc::new(Mutex::new(holder)))
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut SessionHolder) -> R) -> R {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn token(&self) -> Option<String> {
        self.with(|s| s.get())
    }

    pub fn clear(&self) {
        self.with(|s| s.clear())
    }

    pub fn user(&self) -> Option<UserDescriptor> {
        self.with(|s| s.user().cloned())
    }
}

#[cfg(test)]
pub(crate) fn make_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.signature", header, payload)
}
