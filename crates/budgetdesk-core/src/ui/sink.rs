//! Rendering seam between the console and whatever draws it.

use crate::app::View;
use crate::cache::SelectorState;
use crate::models::{KanbanBoard, UserDescriptor};

use super::banner::Banner;
use super::modal::Modal;

/// The one UI transition the gateway may trigger on its own.
pub trait LoginGate: Send + Sync {
    fn show_login_gate(&self);
}

/// Everything the console renders goes through this trait. Implementations
/// only draw; they never call back into the console.
pub trait PresentationSink: LoginGate {
    fn hide_login_gate(&self);

    /// Show the signed-in user and reveal role-gated navigation.
    fn apply_user(&self, user: &UserDescriptor);

    fn show_view(&self, view: View);

    fn banner(&self, banner: &Banner);

    fn populate_selector(&self, state: &SelectorState);

    fn render_table(&self, table: &Table);

    fn render_kpis(&self, view: View, kpis: &[Kpi]);

    fn render_kanban(&self, board: &KanbanBoard);

    /// Computed text shown inside a dialog; `None` clears it.
    fn render_readout(&self, readout: Readout, text: Option<&str>);

    fn modal_changed(&self, modal: Modal, open: bool);

    fn set_notification_badge(&self, unread: u64);
}

/// Computed text areas inside dialogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Readout {
    /// Figures of the line picked in the allocation dialog.
    AllocationLine,
    /// Figures of the line picked in the order editor.
    OrderLine,
    /// Inclusive-of-tax preview in the order editor.
    OrderTtc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Kpi {
    pub label: &'static str,
    pub value: String,
}

impl Kpi {
    pub fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: i64,
    pub cells: Vec<String>,
    pub actions: Vec<&'static str>,
    pub selected: bool,
}

impl Row {
    pub fn new(id: i64, cells: Vec<String>) -> Self {
        Self {
            id,
            cells,
            actions: Vec::new(),
            selected: false,
        }
    }

    pub fn with_actions(mut self, actions: Vec<&'static str>) -> Self {
        self.actions = actions;
        self
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub view: View,
    /// Sub-table title, e.g. the orders allocated to the selected line.
    pub title: Option<String>,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Row>,
    pub empty_message: &'static str,
}

impl Table {
    pub fn new(view: View, columns: Vec<&'static str>, rows: Vec<Row>) -> Self {
        Self {
            view,
            title: None,
            columns,
            rows,
            empty_message: "Aucune donnée.",
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn empty_message(mut self, message: &'static str) -> Self {
        self.empty_message = message;
        self
    }
}
