//! Selection controls bound to a reference category.
//!
//! Every bound control is rebuilt from the snapshot after each reference
//! refresh. A selected id survives the rebuild only if it still exists in its
//! category; otherwise the control falls back to the empty option.

use std::collections::BTreeMap;

use crate::error::ConsoleError;
use crate::models::{Category, RefOption, ReferenceSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Selector {
    BudgetEntity,
    OrderSupplier,
    OrderEntity,
    OrderEntityFilter,
    OrderLine,
    ContractSupplier,
    TaskProject,
    TaskProjectFilter,
    KanbanProjectFilter,
    EditTaskProject,
    EditContractSupplier,
    EditOrderSupplier,
    EditOrderEntity,
    EditOrderLine,
    EditOrderProject,
    EditOrderContract,
    ProjectService,
    EditProjectService,
    AllocationLine,
    EditLineSupplier,
    EditLineApplication,
}

impl Selector {
    pub const ALL: [Selector; 21] = [
        Selector::BudgetEntity,
        Selector::OrderSupplier,
        Selector::OrderEntity,
        Selector::OrderEntityFilter,
        Selector::OrderLine,
        Selector::ContractSupplier,
        Selector::TaskProject,
        Selector::TaskProjectFilter,
        Selector::KanbanProjectFilter,
        Selector::EditTaskProject,
        Selector::EditContractSupplier,
        Selector::EditOrderSupplier,
        Selector::EditOrderEntity,
        Selector::EditOrderLine,
        Selector::EditOrderProject,
        Selector::EditOrderContract,
        Selector::ProjectService,
        Selector::EditProjectService,
        Selector::AllocationLine,
        Selector::EditLineSupplier,
        Selector::EditLineApplication,
    ];

    pub fn category(&self) -> Category {
        match self {
            Selector::BudgetEntity
            | Selector::OrderEntity
            | Selector::OrderEntityFilter
            | Selector::EditOrderEntity => Category::Entities,
            Selector::OrderSupplier
            | Selector::ContractSupplier
            | Selector::EditContractSupplier
            | Selector::EditOrderSupplier
            | Selector::EditLineSupplier => Category::Suppliers,
            Selector::OrderLine | Selector::EditOrderLine | Selector::AllocationLine => {
                Category::BudgetLines
            }
            Selector::TaskProject
            | Selector::TaskProjectFilter
            | Selector::KanbanProjectFilter
            | Selector::EditTaskProject
            | Selector::EditOrderProject => Category::Projects,
            Selector::EditOrderContract => Category::Contracts,
            Selector::ProjectService | Selector::EditProjectService => Category::Services,
            Selector::EditLineApplication => Category::Applications,
        }
    }

    /// Stable identifier for front-ends.
    pub fn key(&self) -> &'static str {
        match self {
            Selector::BudgetEntity => "budget-entite",
            Selector::OrderSupplier => "bc-fournisseur",
            Selector::OrderEntity => "bc-entite",
            Selector::OrderEntityFilter => "bc-filter-entite",
            Selector::OrderLine => "bc-ligne",
            Selector::ContractSupplier => "contrat-fournisseur",
            Selector::TaskProject => "tache-projet",
            Selector::TaskProjectFilter => "tache-filter-projet",
            Selector::KanbanProjectFilter => "kanban-filter-projet",
            Selector::EditTaskProject => "edit-tache-projet",
            Selector::EditContractSupplier => "edit-contrat-fournisseur",
            Selector::EditOrderSupplier => "edit-bc-fournisseur",
            Selector::EditOrderEntity => "edit-bc-entite",
            Selector::EditOrderLine => "edit-bc-ligne",
            Selector::EditOrderProject => "edit-bc-projet",
            Selector::EditOrderContract => "edit-bc-contrat",
            Selector::ProjectService => "projet-service",
            Selector::EditProjectService => "edit-projet-service",
            Selector::AllocationLine => "imputer-ligne",
            Selector::EditLineSupplier => "edit-ligne-fournisseur",
            Selector::EditLineApplication => "edit-ligne-application",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorState {
    pub selector: Selector,
    pub options: Vec<RefOption>,
    /// `None` is the default empty option.
    pub selected: Option<i64>,
}

impl SelectorState {
    fn empty(selector: Selector) -> Self {
        Self {
            selector,
            options: Vec::new(),
            selected: None,
        }
    }

    pub fn selected_label(&self) -> Option<&str> {
        let id = self.selected?;
        self.options
            .iter()
            .find(|o| o.id == id)
            .map(|o| o.label.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorBoard {
    states: BTreeMap<Selector, SelectorState>,
}

impl Default for SelectorBoard {
    fn default() -> Self {
        Self {
            states: Selector::ALL
                .iter()
                .map(|s| (*s, SelectorState::empty(*s)))
                .collect(),
        }
    }
}

impl SelectorBoard {
    /// Rebuild every control from `snapshot`, keeping selections whose id is
    /// still present.
    pub fn repopulate(&mut self, snapshot: &ReferenceSnapshot) {
        for state in self.states.values_mut() {
            let category = state.selector.category();
            state.options = snapshot.options(category);
            state.selected = state
                .selected
                .filter(|id| state.options.iter().any(|o| o.id == *id));
        }
    }

    pub fn get(&self, selector: Selector) -> Option<&SelectorState> {
        self.states.get(&selector)
    }

    pub fn states(&self) -> impl Iterator<Item = &SelectorState> {
        self.states.values()
    }

    pub fn selected(&self, selector: Selector) -> Option<i64> {
        self.states.get(&selector).and_then(|s| s.selected)
    }

    /// Select an option, or clear with `None`. An id missing from the
    /// current options is refused.
    pub fn select(&mut self, selector: Selector, id: Option<i64>) -> Result<(), ConsoleError> {
        let state = self
            .states
            .entry(selector)
            .or_insert_with(|| SelectorState::empty(selector));
        match id {
            None => {
                state.selected = None;
                Ok(())
            }
            Some(id) if state.options.iter().any(|o| o.id == id) => {
                state.selected = Some(id);
                Ok(())
            }
            Some(id) => Err(ConsoleError::StaleCache {
                kind: selector.category().key(),
                id,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(contract_ids: &[i64]) -> ReferenceSnapshot {
        let contrats: Vec<_> = contract_ids
            .iter()
            .map(|id| json!({"id": id, "numero_contrat": format!("C-{}", id)}))
            .collect();
        serde_json::from_value(json!({
            "contrats": contrats,
            "fournisseurs": [{"id": 1, "nom": "Acme"}]
        }))
        .unwrap()
    }

    #[test]
    fn test_every_selector_is_bound() {
        let board = SelectorBoard::default();
        assert_eq!(board.states().count(), Selector::ALL.len());
    }

    #[test]
    fn test_selection_kept_when_still_present() {
        let mut board = SelectorBoard::default();
        board.repopulate(&snapshot(&[5, 7]));
        board.select(Selector::EditOrderContract, Some(7)).unwrap();

        board.repopulate(&snapshot(&[7, 9]));
        assert_eq!(board.selected(Selector::EditOrderContract), Some(7));
    }

    #[test]
    fn test_stale_selection_reset_to_empty() {
        let mut board = SelectorBoard::default();
        board.repopulate(&snapshot(&[5, 7]));
        board.select(Selector::EditOrderContract, Some(7)).unwrap();
        board.select(Selector::OrderSupplier, Some(1)).unwrap();

        board.repopulate(&snapshot(&[5]));
        assert_eq!(board.selected(Selector::EditOrderContract), None);
        assert_eq!(board.selected(Selector::OrderSupplier), Some(1));
    }

    #[test]
    fn test_select_unknown_id_is_refused() {
        let mut board = SelectorBoard::default();
        board.repopulate(&snapshot(&[5]));
        let err = board.select(Selector::EditOrderContract, Some(6)).unwrap_err();
        assert!(matches!(err, ConsoleError::StaleCache { kind: "contrats", id: 6 }));
        assert_eq!(board.selected(Selector::EditOrderContract), None);
    }

    #[test]
    fn test_selected_label() {
        let mut board = SelectorBoard::default();
        board.repopulate(&snapshot(&[5]));
        board.select(Selector::EditOrderContract, Some(5)).unwrap();
        let state = board.get(Selector::EditOrderContract).unwrap();
        assert_eq!(state.selected_label(), Some("C-5"));
    }
}
