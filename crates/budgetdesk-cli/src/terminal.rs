//! Plain-text presentation sink: tables and KPIs on stdout, banners and
//! session prompts on stderr.

use std::sync::{Mutex, PoisonError};

use budgetdesk_core::cache::SelectorState;
use budgetdesk_core::models::{KanbanBoard, UserDescriptor};
use budgetdesk_core::ui::{Banner, Kpi, LoginGate, Modal, PresentationSink, Readout, Table};
use budgetdesk_core::utils::{format_date, truncate_string};
use budgetdesk_core::View;
use tracing::debug;

/// Cells wider than this are truncated with an ellipsis.
const MAX_CELL_WIDTH: usize = 40;

/// Prints only what belongs to the focused view, so loads triggered on the
/// way (startup dashboard, reloads of other lists) stay off stdout.
#[derive(Default)]
pub struct TerminalSink {
    focus: Mutex<Option<View>>,
}

impl TerminalSink {
    pub fn focus(&self, view: View) {
        *self.focus.lock().unwrap_or_else(PoisonError::into_inner) = Some(view);
    }

    fn is_focused(&self, view: View) -> bool {
        *self.focus.lock().unwrap_or_else(PoisonError::into_inner) == Some(view)
    }
}

fn print_table(table: &Table) {
    if let Some(title) = &table.title {
        println!("\n{}", title);
    }
    if table.rows.is_empty() {
        println!("{}", table.empty_message);
        return;
    }

    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            let mut cells: Vec<String> = row
                .cells
                .iter()
                .map(|c| truncate_string(c, MAX_CELL_WIDTH))
                .collect();
            if row.selected {
                if let Some(first) = cells.first_mut() {
                    first.insert_str(0, "> ");
                }
            }
            cells
        })
        .collect();

    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |values: Vec<&str>| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
    };
    println!("{}", line(table.columns.to_vec()));
    println!(
        "{}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  ")
    );
    for (row, values) in table.rows.iter().zip(&cells) {
        let mut text = line(values.iter().map(String::as_str).collect());
        if !row.actions.is_empty() {
            text.push_str(&format!("  [{}]", row.actions.join(" | ")));
        }
        println!("{}", text.trim_end());
    }
}

impl LoginGate for TerminalSink {
    fn show_login_gate(&self) {
        eprintln!("Session expirée ou absente. Connectez-vous avec `budgetdesk login`.");
    }
}

impl PresentationSink for TerminalSink {
    fn hide_login_gate(&self) {}

    fn apply_user(&self, user: &UserDescriptor) {
        debug!(user = %user.display_name(), "Signed in");
    }

    fn show_view(&self, view: View) {
        if self.is_focused(view) {
            println!("== {} ==", view.title());
        }
    }

    fn banner(&self, banner: &Banner) {
        if banner.is_error() {
            eprintln!("✗ {}", banner.text);
        } else {
            eprintln!("✓ {}", banner.text);
        }
    }

    fn populate_selector(&self, _state: &SelectorState) {}

    fn render_table(&self, table: &Table) {
        if self.is_focused(table.view) {
            print_table(table);
        }
    }

    fn render_kpis(&self, view: View, kpis: &[Kpi]) {
        if !self.is_focused(view) {
            return;
        }
        let line = kpis
            .iter()
            .map(|k| format!("{}: {}", k.label, k.value))
            .collect::<Vec<_>>()
            .join("   ");
        println!("{}\n", line);
    }

    fn render_kanban(&self, board: &KanbanBoard) {
        if !self.is_focused(View::Kanban) {
            return;
        }
        for column in &board.columns {
            println!("{} ({})", column.status, column.cards.len());
            for card in &column.cards {
                let due = card
                    .date_echeance
                    .as_deref()
                    .map(|d| format!(" · Éch: {}", format_date(Some(d))))
                    .unwrap_or_default();
                println!(
                    "  - {}{}",
                    card.titre.as_deref().unwrap_or("-"),
                    due
                );
            }
        }
    }

    fn render_readout(&self, readout: Readout, text: Option<&str>) {
        if let Some(text) = text {
            eprintln!("  {:?}: {}", readout, text);
        }
    }

    fn modal_changed(&self, modal: Modal, open: bool) {
        debug!(modal = modal.title(), open, "Dialog state");
    }

    fn set_notification_badge(&self, unread: u64) {
        if unread > 0 {
            eprintln!("{} notification(s) non lue(s)", unread);
        }
    }
}
