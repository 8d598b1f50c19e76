//! Tasks: filtered list and kanban board.

use crate::app::{Console, View};
use crate::cache::Selector;
use crate::error::ConsoleError;
use crate::models::{KanbanBoard, Task, TaskFilter, TaskInput};
use crate::ui::{Modal, Row, Table};
use crate::utils::{format_date, or_placeholder};

use super::with_unit;

const KANBAN_PATH: &str = "/kanban";

impl Console {
    /// Full list from the server, project and status filters applied locally.
    pub async fn load_tasks(&mut self) -> Result<(), ConsoleError> {
        let tasks = match self.api.list::<Task>(Vec::new()).await {
            Ok(tasks) => tasks,
            Err(e) => return self.load_failed("tâches", e),
        };
        self.caches.tasks.replace(tasks);

        let filter = &self.filters.tasks;
        let rows = self
            .caches
            .tasks
            .items()
            .iter()
            .filter(|t| filter.matches(t))
            .map(|t| {
                Row::new(
                    t.id,
                    vec![
                        t.id.to_string(),
                        or_placeholder(t.titre.as_deref()),
                        or_placeholder(t.projet_nom.as_deref()),
                        or_placeholder(t.statut.as_deref()),
                        or_placeholder(t.priorite.as_deref()),
                        format_date(t.date_echeance.as_deref()),
                        with_unit(t.estimation_heures, "h"),
                        with_unit(t.avancement, "%"),
                    ],
                )
                .with_actions(vec!["Modifier", "Suppr."])
            })
            .collect();
        self.sink.render_table(&Table::new(
            View::Tasks,
            vec![
                "ID", "Titre", "Projet", "Statut", "Priorité", "Échéance", "Estimation",
                "Avancement",
            ],
            rows,
        ));
        Ok(())
    }

    pub async fn set_task_filter(&mut self, filter: TaskFilter) -> Result<(), ConsoleError> {
        self.preselect(Selector::TaskProjectFilter, filter.projet_id);
        self.filters.tasks = filter;
        self.load_tasks().await
    }

    pub async fn create_task(&mut self, mut input: TaskInput) -> Result<(), ConsoleError> {
        self.require(&input.titre, "Le titre est obligatoire")?;
        input.projet_id = self.or_selected(input.projet_id, Selector::TaskProject);
        input.avancement = 0.0;

        let outcome = self.api.create::<Task, _>(&input).await;
        self.settle(outcome, "Tâche ajoutée")?;
        let reload = self.load_tasks().await;
        self.reloaded(reload)
    }

    pub fn edit_task(&mut self, id: i64) -> Result<TaskInput, ConsoleError> {
        let task = match self.caches.tasks.find(id) {
            Ok(task) => task.clone(),
            Err(e) => return self.fail(e),
        };
        self.preselect(Selector::EditTaskProject, task.projet_id);
        self.open_modal(Modal::EditTask);
        Ok(TaskInput::from(&task))
    }

    pub async fn save_task(&mut self, id: i64, mut input: TaskInput) -> Result<(), ConsoleError> {
        self.require(&input.titre, "Le titre est obligatoire")?;
        input.projet_id = self.selected(Selector::EditTaskProject);

        let outcome = self.api.update::<Task, _>(id, &input).await;
        self.settle(outcome, "Tâche mise à jour")?;
        self.close_modal(Modal::EditTask);
        let reload = self.load_tasks().await;
        self.reloaded(reload)
    }

    pub async fn delete_task(&mut self, id: i64) -> Result<(), ConsoleError> {
        let outcome = self.api.remove::<Task>(id).await;
        self.settle(outcome, "Tâche supprimée")?;
        let reload = self.load_tasks().await;
        self.reloaded(reload)
    }

    // =========================================================================
    // Kanban
    // =========================================================================

    pub async fn load_kanban(&mut self) -> Result<(), ConsoleError> {
        let query = self
            .filters
            .kanban_project
            .map(|id| vec![("projet_id".to_string(), id.to_string())])
            .unwrap_or_default();
        let board: KanbanBoard = match self.api.get_with_query(KANBAN_PATH, query).await {
            Ok(board) => board,
            Err(e) => return self.load_failed("kanban", e),
        };
        self.sink.render_kanban(&board);
        Ok(())
    }

    pub async fn set_kanban_project(&mut self, project: Option<i64>) -> Result<(), ConsoleError> {
        self.preselect(Selector::KanbanProjectFilter, project);
        self.filters.kanban_project = self.selected(Selector::KanbanProjectFilter);
        self.load_kanban().await
    }
}
