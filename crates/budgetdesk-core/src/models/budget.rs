use serde::{Deserialize, Serialize};

use super::common::{de_amount, de_flag, de_opt_id, de_string_or_number};
use crate::api::Resource;
use crate::utils::contains_ignore_case;

/// Default nature of a budget line.
pub const DEFAULT_LINE_NATURE: &str = "FONCTIONNEMENT";

/// Default status of a budget line.
pub const DEFAULT_LINE_STATUS: &str = "ACTIF";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub entite_id: Option<i64>,
    #[serde(default, deserialize_with = "de_string_or_number")]
    pub entite_code: Option<String>,
    #[serde(default)]
    pub entite_nom: Option<String>,
    #[serde(default, deserialize_with = "de_string_or_number")]
    pub exercice: Option<String>,
    #[serde(default)]
    pub nature: Option<String>,
    #[serde(default, deserialize_with = "de_amount")]
    pub montant_previsionnel: Option<f64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub montant_vote: Option<f64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub montant_engage: Option<f64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub montant_paye: Option<f64>,
    #[serde(default)]
    pub statut: Option<String>,
}

impl Budget {
    fn owner(&self) -> &str {
        [self.entite_code.as_deref(), self.entite_nom.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or("?")
    }

    /// Label used by budget pickers: `DSI — FONCTIONNEMENT 2025`.
    pub fn label(&self) -> String {
        format!(
            "{} — {} {}",
            self.owner(),
            self.nature.as_deref().unwrap_or("?"),
            self.exercice.as_deref().unwrap_or("?")
        )
    }

    /// Engagement ratio in percent of the voted amount, if anything was voted.
    pub fn engagement_rate(&self) -> Option<f64> {
        match (self.montant_vote, self.montant_engage) {
            (Some(vote), engage) if vote > 0.0 => {
                Some((engage.unwrap_or(0.0) / vote * 1000.0).round() / 10.0)
            }
            _ => None,
        }
    }
}

impl Resource for Budget {
    const COLLECTION: &'static str = "budget";
    const KIND: &'static str = "Budget";

    fn id(&self) -> i64 {
        self.id
    }
}

/// `GET /budget`: budgets in `details` plus aggregate totals.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetOverview {
    #[serde(default, deserialize_with = "de_amount")]
    pub total_vote: Option<f64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub total_engage: Option<f64>,
    #[serde(default)]
    pub details: Vec<Budget>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetInput {
    pub entite_id: Option<i64>,
    pub exercice: String,
    pub nature: Option<String>,
    pub montant_previsionnel: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub montant_vote: Option<f64>,
    pub statut: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoteRequest {
    pub montant_vote: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLine {
    pub id: i64,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub budget_id: Option<i64>,
    #[serde(default)]
    pub libelle: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub application_id: Option<i64>,
    #[serde(default)]
    pub application_nom: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub fournisseur_id: Option<i64>,
    #[serde(default)]
    pub fournisseur_nom: Option<String>,
    #[serde(default, deserialize_with = "de_amount")]
    pub montant_prevu: Option<f64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub montant_vote: Option<f64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub montant_engage: Option<f64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub montant_solde: Option<f64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub taux_engagement: Option<f64>,
    /// Set by the server when the engagement threshold is crossed.
    #[serde(default, deserialize_with = "de_flag")]
    pub alerte: bool,
    #[serde(default)]
    pub nature: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub statut: Option<String>,
    #[serde(default)]
    pub budget_label: Option<String>,
}

impl BudgetLine {
    pub fn name(&self) -> String {
        match self.libelle.as_deref() {
            Some(l) if !l.is_empty() => l.to_string(),
            _ => format!("Ligne #{}", self.id),
        }
    }

    /// Case-insensitive match over label, application and supplier names.
    pub fn matches_search(&self, needle: &str) -> bool {
        contains_ignore_case(self.libelle.as_deref(), needle)
            || contains_ignore_case(self.application_nom.as_deref(), needle)
            || contains_ignore_case(self.fournisseur_nom.as_deref(), needle)
    }

    pub fn is_overdrawn(&self) -> bool {
        self.montant_solde.map(|s| s < 0.0).unwrap_or(false)
    }
}

impl Resource for BudgetLine {
    const COLLECTION: &'static str = "ligne";
    const KIND: &'static str = "Ligne";

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetLineInput {
    pub budget_id: Option<i64>,
    pub libelle: String,
    pub application_id: Option<i64>,
    pub fournisseur_id: Option<i64>,
    pub montant_prevu: f64,
    pub montant_vote: f64,
    pub nature: String,
    pub note: Option<String>,
    pub statut: String,
}

impl Default for BudgetLineInput {
    fn default() -> Self {
        Self {
            budget_id: None,
            libelle: String::new(),
            application_id: None,
            fournisseur_id: None,
            montant_prevu: 0.0,
            montant_vote: 0.0,
            nature: DEFAULT_LINE_NATURE.to_string(),
            note: None,
            statut: DEFAULT_LINE_STATUS.to_string(),
        }
    }
}

impl From<&BudgetLine> for BudgetLineInput {
    fn from(line: &BudgetLine) -> Self {
        Self {
            budget_id: line.budget_id,
            libelle: line.libelle.clone().unwrap_or_default(),
            application_id: line.application_id,
            fournisseur_id: line.fournisseur_id,
            montant_prevu: line.montant_prevu.unwrap_or(0.0),
            montant_vote: line.montant_vote.unwrap_or(0.0),
            nature: line
                .nature
                .clone()
                .unwrap_or_else(|| DEFAULT_LINE_NATURE.to_string()),
            note: line.note.clone(),
            statut: line
                .statut
                .clone()
                .unwrap_or_else(|| DEFAULT_LINE_STATUS.to_string()),
        }
    }
}
