use super::modal::Modal;

/// "Currently selected id" per interactive list or dialog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSlots {
    /// Row highlighted in the budget line list.
    pub budget_line: Option<i64>,
    pub budget_to_vote: Option<i64>,
    pub contract_to_renew: Option<i64>,
    pub order_to_allocate: Option<i64>,
    /// Voted/committed/balance figures of the line picked in the allocation
    /// dialog. Single use: cleared when the dialog closes.
    pub allocation_readout: Option<String>,
}

impl SelectionSlots {
    pub fn on_modal_closed(&mut self, modal: Modal) {
        if modal == Modal::AllocateOrder {
            self.allocation_readout = None;
        }
    }
}
