use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::common::{de_amount, de_opt_id};
use crate::api::Resource;

/// Kanban columns in board order. Statuses outside this list get their own
/// column after these.
pub const KANBAN_COLUMNS: [&str; 5] = ["A faire", "En cours", "En attente", "Bloqué", "Terminé"];

/// Status given to tasks created without one.
pub const DEFAULT_TASK_STATUS: &str = "A faire";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    #[serde(default)]
    pub titre: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub projet_id: Option<i64>,
    #[serde(default)]
    pub projet_nom: Option<String>,
    #[serde(default)]
    pub statut: Option<String>,
    #[serde(default)]
    pub priorite: Option<String>,
    #[serde(default)]
    pub date_echeance: Option<String>,
    #[serde(default, deserialize_with = "de_amount")]
    pub estimation_heures: Option<f64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub avancement: Option<f64>,
}

impl Resource for Task {
    const COLLECTION: &'static str = "tache";
    const KIND: &'static str = "Tâche";

    fn id(&self) -> i64 {
        self.id
    }
}

/// Local filters of the task list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub projet_id: Option<i64>,
    pub statut: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        let project_ok = self.projet_id.map_or(true, |p| task.projet_id == Some(p));
        let status_ok = match self.statut.as_deref() {
            Some(s) if !s.is_empty() => task.statut.as_deref() == Some(s),
            _ => true,
        };
        project_ok && status_ok
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskInput {
    pub titre: String,
    pub projet_id: Option<i64>,
    pub statut: String,
    pub priorite: Option<String>,
    pub date_echeance: Option<String>,
    pub estimation_heures: Option<f64>,
    pub avancement: f64,
}

impl Default for TaskInput {
    fn default() -> Self {
        Self {
            titre: String::new(),
            projet_id: None,
            statut: DEFAULT_TASK_STATUS.to_string(),
            priorite: None,
            date_echeance: None,
            estimation_heures: None,
            avancement: 0.0,
        }
    }
}

impl From<&Task> for TaskInput {
    fn from(task: &Task) -> Self {
        Self {
            titre: task.titre.clone().unwrap_or_default(),
            projet_id: task.projet_id,
            statut: task
                .statut
                .clone()
                .unwrap_or_else(|| DEFAULT_TASK_STATUS.to_string()),
            priorite: task.priorite.clone(),
            date_echeance: task
                .date_echeance
                .as_deref()
                .map(|d| d.split('T').next().unwrap_or(d).to_string()),
            estimation_heures: task.estimation_heures,
            avancement: task.avancement.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct KanbanResponse {
    #[serde(default)]
    columns: HashMap<String, Vec<Task>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KanbanColumn {
    pub status: String,
    pub cards: Vec<Task>,
}

/// Board returned by `GET /kanban`, columns in board order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KanbanBoard {
    pub columns: Vec<KanbanColumn>,
}

impl<'de> Deserialize<'de> for KanbanBoard {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let mut raw = KanbanResponse::deserialize(deserializer)?.columns;
        let mut columns: Vec<KanbanColumn> = KANBAN_COLUMNS
            .iter()
            .map(|status| KanbanColumn {
                status: status.to_string(),
                cards: raw.remove(*status).unwrap_or_default(),
            })
            .collect();

        let mut extra: Vec<(String, Vec<Task>)> = raw.into_iter().collect();
        extra.sort_by(|a, b| a.0.cmp(&b.0));
        columns.extend(
            extra
                .into_iter()
                .map(|(status, cards)| KanbanColumn { status, cards }),
        );
        Ok(KanbanBoard { columns })
    }
}
