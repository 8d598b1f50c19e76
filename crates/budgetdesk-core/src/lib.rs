//! Core library for the budgetdesk procurement console.
//!
//! The crate mirrors the server-side lookup tables of a budget/procurement
//! backend and keeps them consistent while the user creates, edits and links
//! entities:
//!
//! - `auth`: the session holder and its token stores
//! - `api`: the gateway wrapping every network call
//! - `cache`: the reference snapshot, the per-entity list caches and the
//!   selection widgets bound to reference categories
//! - `views`: the view controllers (one per entity type), implemented on `Console`
//! - `ui`: the presentation sink trait, banners, modals and selection slots
//!
//! Rendering is delegated to a `PresentationSink`; the core never draws.

pub mod api;
pub mod app;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod ui;
pub mod utils;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

pub use app::{Console, View};
pub use error::{ConsoleError, ErrorKind};
