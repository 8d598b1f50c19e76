use chrono::{DateTime, Utc};

use crate::api::Resource;
use crate::error::ConsoleError;
use crate::models::{
    AdminUser, Budget, BudgetLine, Contact, Contract, OrgService, Project, PurchaseOrder,
    Supplier, Task,
};

/// Last loaded list of one entity type. Replaced wholesale on every load and
/// never patched in place.
#[derive(Debug, Clone)]
pub struct EntityListCache<T> {
    items: Vec<T>,
    loaded_at: Option<DateTime<Utc>>,
}

impl<T> Default for EntityListCache<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loaded_at: None,
        }
    }
}

impl<T: Resource> EntityListCache<T> {
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.loaded_at = Some(Utc::now());
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded_at.is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.items.iter().any(|item| item.id() == id)
    }

    /// Record from the most recent load. A miss means the list must be
    /// reloaded before editing.
    pub fn find(&self, id: i64) -> Result<&T, ConsoleError> {
        self.items
            .iter()
            .find(|item| item.id() == id)
            .ok_or(ConsoleError::StaleCache { kind: T::KIND, id })
    }

    pub fn age_minutes(&self) -> Option<i64> {
        self.loaded_at.map(|at| (Utc::now() - at).num_minutes())
    }

    pub fn age_display(&self) -> String {
        match self.age_minutes() {
            None => "jamais chargé".to_string(),
            Some(m) if m < 1 => "à l'instant".to_string(),
            Some(m) if m < 60 => format!("il y a {} min", m),
            Some(m) => format!("il y a {} h", m / 60),
        }
    }
}

/// One list cache per entity type the console edits.
#[derive(Debug, Default)]
pub struct EntityCaches {
    pub budgets: EntityListCache<Budget>,
    pub budget_lines: EntityListCache<BudgetLine>,
    pub purchase_orders: EntityListCache<PurchaseOrder>,
    pub contracts: EntityListCache<Contract>,
    pub projects: EntityListCache<Project>,
    pub tasks: EntityListCache<Task>,
    pub suppliers: EntityListCache<Supplier>,
    pub contacts: EntityListCache<Contact>,
    pub services: EntityListCache<OrgService>,
    pub users: EntityListCache<AdminUser>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contracts(ids: &[i64]) -> Vec<Contract> {
        ids.iter()
            .map(|id| serde_json::from_value(json!({"id": id})).unwrap())
            .collect()
    }

    #[test]
    fn test_find_hit_and_miss() {
        let mut cache = EntityListCache::<Contract>::default();
        assert!(!cache.is_loaded());
        cache.replace(contracts(&[1, 2, 3]));
        assert_eq!(cache.find(2).unwrap().id, 2);

        match cache.find(42) {
            Err(ConsoleError::StaleCache { kind, id }) => {
                assert_eq!(kind, "Contrat");
                assert_eq!(id, 42);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut cache = EntityListCache::<Contract>::default();
        cache.replace(contracts(&[1, 2]));
        cache.replace(contracts(&[3]));
        assert_eq!(cache.len(), 1);
        assert!(cache.find(1).is_err());
        assert!(cache.contains(3));
    }

    #[test]
    fn test_age_display() {
        let mut cache = EntityListCache::<Contract>::default();
        assert_eq!(cache.age_display(), "jamais chargé");
        cache.replace(Vec::new());
        assert_eq!(cache.age_display(), "à l'instant");
    }
}
