//! View controllers.
//!
//! Each module extends `Console` with the load/render and mutation actions of
//! one entity type. A load fetches the list, replaces the matching entity
//! cache and renders from it; edit actions read back from that cache. After a
//! successful mutation the affected list is reloaded, and the reference
//! snapshot is refreshed whenever the mutated entity feeds a selector.

pub mod admin;
pub mod budget;
pub mod contact;
pub mod contract;
pub mod dashboard;
pub mod project;
pub mod purchase_order;
pub mod service;
pub mod supplier;
pub mod task;

use crate::app::Console;
use crate::cache::Selector;
use crate::error::ConsoleError;

impl Console {
    /// Required text field; reported before any request is sent.
    pub(crate) fn require(&self, value: &str, message: &str) -> Result<(), ConsoleError> {
        if value.trim().is_empty() {
            return self.fail(ConsoleError::validation(message));
        }
        Ok(())
    }

    /// Create forms: an id left empty by the caller falls back to the bound
    /// control.
    pub(crate) fn or_selected(&self, id: Option<i64>, selector: Selector) -> Option<i64> {
        id.or_else(|| self.selected(selector))
    }
}

/// `Some(s)` for non-empty text.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Plain number display with a unit suffix, `-` when absent.
pub(crate) fn with_unit(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{} {}", v, unit),
        None => crate::utils::PLACEHOLDER.to_string(),
    }
}
