use serde::{Deserialize, Serialize};

use super::common::{de_amount, de_opt_id, de_string_or_number};
use crate::api::Resource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    #[serde(default, deserialize_with = "de_string_or_number")]
    pub code: Option<String>,
    #[serde(default)]
    pub nom: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub type_projet: Option<String>,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub statut: Option<String>,
    #[serde(default)]
    pub priorite: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub service_id: Option<i64>,
    #[serde(default, deserialize_with = "de_string_or_number")]
    pub service_code: Option<String>,
    #[serde(default)]
    pub service_nom: Option<String>,
    #[serde(default, deserialize_with = "de_amount")]
    pub budget_initial: Option<f64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub budget_estime: Option<f64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub budget_actuel: Option<f64>,
    #[serde(default)]
    pub date_debut: Option<String>,
    #[serde(default)]
    pub date_fin_prevue: Option<String>,
    #[serde(default)]
    pub date_fin_reelle: Option<String>,
    #[serde(default, deserialize_with = "de_amount")]
    pub avancement: Option<f64>,
}

impl Project {
    /// Service column: code when known, else name.
    pub fn service_display(&self) -> Option<&str> {
        self.service_code
            .as_deref()
            .filter(|c| !c.is_empty())
            .or(self.service_nom.as_deref())
    }
}

impl Resource for Project {
    const COLLECTION: &'static str = "projet";
    const KIND: &'static str = "Projet";

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectInput {
    pub code: Option<String>,
    pub nom: String,
    pub description: Option<String>,
    pub type_projet: Option<String>,
    pub phase: Option<String>,
    pub statut: Option<String>,
    pub priorite: Option<String>,
    pub service_id: Option<i64>,
    pub budget_initial: Option<f64>,
    pub budget_estime: Option<f64>,
    pub budget_actuel: Option<f64>,
    pub date_debut: Option<String>,
    pub date_fin_prevue: Option<String>,
    pub date_fin_reelle: Option<String>,
    pub avancement: f64,
}

impl From<&Project> for ProjectInput {
    fn from(project: &Project) -> Self {
        Self {
            code: project.code.clone(),
            nom: project.nom.clone().unwrap_or_default(),
            description: project.description.clone(),
            type_projet: project.type_projet.clone(),
            phase: project.phase.clone(),
            statut: project.statut.clone(),
            priorite: project.priorite.clone(),
            service_id: project.service_id,
            budget_initial: project.budget_initial,
            budget_estime: project.budget_estime,
            budget_actuel: project.budget_actuel,
            date_debut: project.date_debut.clone(),
            date_fin_prevue: project.date_fin_prevue.clone(),
            date_fin_reelle: project.date_fin_reelle.clone(),
            avancement: project.avancement.unwrap_or(0.0),
        }
    }
}

/// `GET /etp`: estimated workload per open project.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectWorkload {
    pub id: i64,
    #[serde(default, deserialize_with = "de_string_or_number")]
    pub code: Option<String>,
    #[serde(default)]
    pub nom: Option<String>,
    #[serde(default)]
    pub statut: Option<String>,
    #[serde(default, deserialize_with = "de_amount")]
    pub heures_estimees: Option<f64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub heures_reelles: Option<f64>,
    #[serde(default)]
    pub nb_taches: u64,
}

/// Hours in a working day.
const HOURS_PER_DAY: f64 = 7.0;

/// Working hours in one full-time-equivalent year.
const HOURS_PER_FTE: f64 = 154.0;

impl ProjectWorkload {
    pub fn days(&self) -> f64 {
        (self.heures_estimees.unwrap_or(0.0) / HOURS_PER_DAY * 10.0).round() / 10.0
    }

    pub fn fte(&self) -> f64 {
        (self.heures_estimees.unwrap_or(0.0) / HOURS_PER_FTE * 100.0).round() / 100.0
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkloadReport {
    #[serde(default)]
    pub list: Vec<ProjectWorkload>,
    #[serde(default, deserialize_with = "de_amount")]
    pub total_heures: Option<f64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub total_jours: Option<f64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub total_etp: Option<f64>,
}
