//! Authentication module for managing the session credential.
//!
//! This module provides:
//! - `SessionHolder`: stores the bearer token, decodes its claims and decides
//!   at startup whether the session is still valid
//! - `TokenStore` backends: a JSON file in the cache directory, the OS keychain
//!   (`KeyringTokenStore`), and an in-memory store
//!
//! Expiry is checked at startup and reactively when the gateway sees a 401.

pub mod credentials;
pub mod session;

pub use credentials::KeyringTokenStore;
pub use session::{
    Claims, FileTokenStore, MemoryTokenStore, SessionHolder, SharedSession, TokenStore,
    TOKEN_KEY,
};
