//! Projects and the workload (ETP) report.
//!
//! Projects feed the project selectors of orders and tasks, so every project
//! mutation refreshes the reference snapshot.

use crate::app::{Console, View};
use crate::cache::Selector;
use crate::error::ConsoleError;
use crate::models::{Project, ProjectInput, WorkloadReport};
use crate::ui::{Kpi, Modal, Row, Table};
use crate::utils::{format_amount, or_placeholder, PLACEHOLDER};

use super::with_unit;

const WORKLOAD_PATH: &str = "/etp";

impl Console {
    pub async fn load_projects(&mut self) -> Result<(), ConsoleError> {
        let projects = match self.api.list::<Project>(Vec::new()).await {
            Ok(projects) => projects,
            Err(e) => return self.load_failed("projets", e),
        };
        self.caches.projects.replace(projects);

        let rows = self
            .caches
            .projects
            .items()
            .iter()
            .map(|p| {
                Row::new(
                    p.id,
                    vec![
                        or_placeholder(p.code.as_deref()),
                        or_placeholder(p.nom.as_deref()),
                        or_placeholder(p.type_projet.as_deref()),
                        or_placeholder(p.phase.as_deref()),
                        or_placeholder(p.statut.as_deref()),
                        or_placeholder(p.priorite.as_deref()),
                        or_placeholder(p.service_display()),
                        format_amount(p.budget_estime),
                        format!("{} %", p.avancement.unwrap_or(0.0)),
                    ],
                )
                .with_actions(vec!["Modifier", "Suppr."])
            })
            .collect();
        self.sink.render_table(&Table::new(
            View::Projects,
            vec![
                "Code", "Nom", "Type", "Phase", "Statut", "Priorité", "Service", "Budget",
                "Avancement",
            ],
            rows,
        ));
        Ok(())
    }

    pub async fn create_project(&mut self, mut input: ProjectInput) -> Result<(), ConsoleError> {
        self.require(&input.nom, "Le nom est obligatoire")?;
        input.service_id = self.or_selected(input.service_id, Selector::ProjectService);

        let outcome = self.api.create::<Project, _>(&input).await;
        self.settle(outcome, "Projet ajouté")?;
        let reload = self.load_projects().await;
        self.refresh_references().await;
        self.reloaded(reload)
    }

    pub fn edit_project(&mut self, id: i64) -> Result<ProjectInput, ConsoleError> {
        let project = match self.caches.projects.find(id) {
            Ok(project) => project.clone(),
            Err(e) => return self.fail(e),
        };
        self.preselect(Selector::EditProjectService, project.service_id);
        self.open_modal(Modal::EditProject);
        Ok(ProjectInput::from(&project))
    }

    pub async fn save_project(&mut self, id: i64, mut input: ProjectInput) -> Result<(), ConsoleError> {
        self.require(&input.nom, "Le nom est obligatoire")?;
        input.service_id = self.selected(Selector::EditProjectService);

        let outcome = self.api.update::<Project, _>(id, &input).await;
        self.settle(outcome, "Projet mis à jour")?;
        self.close_modal(Modal::EditProject);
        let reload = self.load_projects().await;
        self.refresh_references().await;
        self.reloaded(reload)
    }

    pub async fn delete_project(&mut self, id: i64) -> Result<(), ConsoleError> {
        let outcome = self.api.remove::<Project>(id).await;
        self.settle(outcome, "Projet supprimé")?;
        let reload = self.load_projects().await;
        self.refresh_references().await;
        self.reloaded(reload)
    }

    // =========================================================================
    // Workload
    // =========================================================================

    /// Estimated hours per open project, converted to days and FTE.
    pub async fn load_workload(&mut self) -> Result<(), ConsoleError> {
        let report: WorkloadReport = match self.api.get(WORKLOAD_PATH).await {
            Ok(report) => report,
            Err(e) => return self.load_failed("ETP", e),
        };

        self.sink.render_kpis(
            View::Workload,
            &[
                Kpi::new("Heures estimées", with_unit(report.total_heures, "h")),
                Kpi::new("Jours", with_unit(report.total_jours, "j")),
                Kpi::new(
                    "ETP",
                    report
                        .total_etp
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| PLACEHOLDER.to_string()),
                ),
            ],
        );

        let rows = report
            .list
            .iter()
            .map(|w| {
                Row::new(
                    w.id,
                    vec![
                        or_placeholder(w.code.as_deref()),
                        or_placeholder(w.nom.as_deref()),
                        or_placeholder(w.statut.as_deref()),
                        w.nb_taches.to_string(),
                        with_unit(w.heures_estimees, "h"),
                        with_unit(w.heures_reelles, "h"),
                        format!("{} j", w.days()),
                        w.fte().to_string(),
                    ],
                )
            })
            .collect();
        self.sink.render_table(
            &Table::new(
                View::Workload,
                vec![
                    "Code", "Projet", "Statut", "Tâches", "Heures est.", "Heures réelles",
                    "Jours", "ETP",
                ],
                rows,
            )
            .empty_message("Aucun projet en cours."),
        );
        Ok(())
    }
}
