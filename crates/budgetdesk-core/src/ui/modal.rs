/// Dialogs the console can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modal {
    VoteBudget,
    EditBudgetLine,
    EditOrder,
    AllocateOrder,
    RenewContract,
    EditContract,
    EditProject,
    EditTask,
    EditSupplier,
    EditContact,
    AddUser,
    EditUser,
}

impl Modal {
    pub fn title(&self) -> &'static str {
        match self {
            Modal::VoteBudget => "Voter le budget",
            Modal::EditBudgetLine => "Ligne budgétaire",
            Modal::EditOrder => "Modifier le BC",
            Modal::AllocateOrder => "Imputer le BC",
            Modal::RenewContract => "Reconduire le contrat",
            Modal::EditContract => "Modifier le contrat",
            Modal::EditProject => "Modifier le projet",
            Modal::EditTask => "Modifier la tâche",
            Modal::EditSupplier => "Modifier le fournisseur",
            Modal::EditContact => "Modifier le contact",
            Modal::AddUser => "Nouvel utilisateur",
            Modal::EditUser => "Modifier l'utilisateur",
        }
    }
}

/// Open dialogs, most recent last. Each modal is either closed or open once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalStack {
    open: Vec<Modal>,
}

impl ModalStack {
    /// Open `modal`, or bring it to the top if already open.
    pub fn open(&mut self, modal: Modal) {
        self.open.retain(|m| *m != modal);
        self.open.push(modal);
    }

    /// Returns whether the modal was open.
    pub fn close(&mut self, modal: Modal) -> bool {
        let before = self.open.len();
        self.open.retain(|m| *m != modal);
        self.open.len() != before
    }

    /// Overlay click: close whatever is on top.
    pub fn close_topmost(&mut self) -> Option<Modal> {
        self.open.pop()
    }

    pub fn is_open(&self, modal: Modal) -> bool {
        self.open.contains(&modal)
    }

    pub fn topmost(&self) -> Option<Modal> {
        self.open.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_close_cycle() {
        let mut stack = ModalStack::default();
        stack.open(Modal::AllocateOrder);
        assert!(stack.is_open(Modal::AllocateOrder));
        assert!(stack.close(Modal::AllocateOrder));
        assert!(!stack.close(Modal::AllocateOrder));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_overlay_closes_topmost() {
        let mut stack = ModalStack::default();
        stack.open(Modal::EditOrder);
        stack.open(Modal::VoteBudget);
        assert_eq!(stack.close_topmost(), Some(Modal::VoteBudget));
        assert_eq!(stack.topmost(), Some(Modal::EditOrder));
    }

    #[test]
    fn test_reopen_moves_to_top() {
        let mut stack = ModalStack::default();
        stack.open(Modal::EditOrder);
        stack.open(Modal::VoteBudget);
        stack.open(Modal::EditOrder);
        assert_eq!(stack.topmost(), Some(Modal::EditOrder));
        assert_eq!(stack.close_topmost(), Some(Modal::EditOrder));
        assert_eq!(stack.close_topmost(), Some(Modal::VoteBudget));
        assert_eq!(stack.close_topmost(), None);
    }
}
