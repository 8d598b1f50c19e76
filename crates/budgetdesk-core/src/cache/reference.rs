use chrono::{DateTime, Utc};
use tracing::debug;

use crate::api::{ApiClient, ApiError};
use crate::models::{Category, ReferenceSnapshot};

use super::selection::SelectorBoard;

/// Consolidated lookup endpoint.
pub const REFERENCES_PATH: &str = "/referentiels";

/// In-memory mirror of the server lookup tables plus the controls bound to
/// them.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    snapshot: ReferenceSnapshot,
    refreshed_at: Option<DateTime<Utc>>,
    selectors: SelectorBoard,
}

impl ReferenceCache {
    pub fn snapshot(&self) -> &ReferenceSnapshot {
        &self.snapshot
    }

    pub fn selectors(&self) -> &SelectorBoard {
        &self.selectors
    }

    pub fn selectors_mut(&mut self) -> &mut SelectorBoard {
        &mut self.selectors
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    /// Fetch the consolidated lookup data and apply it. On failure the
    /// previous snapshot stays in place.
    pub async fn refresh(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        let snapshot: ReferenceSnapshot = api.get(REFERENCES_PATH).await?;
        self.apply(snapshot);
        Ok(())
    }

    /// Swap in a new snapshot in one step, then rebuild every bound control.
    pub fn apply(&mut self, snapshot: ReferenceSnapshot) {
        debug!(
            suppliers = snapshot.len(Category::Suppliers),
            lines = snapshot.len(Category::BudgetLines),
            contracts = snapshot.len(Category::Contracts),
            "Reference snapshot replaced"
        );
        self.snapshot = snapshot;
        self.refreshed_at = Some(Utc::now());
        self.selectors.repopulate(&self.snapshot);
    }
}
