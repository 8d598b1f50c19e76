use serde::Deserialize;

use super::common::de_amount;

/// At most this many contract alerts are shown on the dashboard.
pub const MAX_DASHBOARD_ALERTS: usize = 5;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dashboard {
    #[serde(default)]
    pub kpi_projets: Option<u64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub kpi_budget: Option<f64>,
    #[serde(default)]
    pub kpi_bons_commande: Option<u64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub kpi_montant_bc: Option<f64>,
    #[serde(default)]
    pub kpi_contrats: Option<u64>,
    #[serde(default)]
    pub kpi_alertes_contrats: Option<u64>,
    #[serde(default)]
    pub kpi_bc_attente: Option<u64>,
    #[serde(default)]
    pub alertes_contrats: Vec<ContractAlert>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContractAlert {
    #[serde(default)]
    pub numero_contrat: Option<String>,
    #[serde(default)]
    pub objet: Option<String>,
    #[serde(default)]
    pub fournisseur_nom: Option<String>,
    #[serde(default)]
    pub date_fin: Option<String>,
    #[serde(default)]
    pub jours_restants: Option<i64>,
    #[serde(default)]
    pub niveau_alerte: Option<String>,
}

impl Dashboard {
    pub fn top_alerts(&self) -> &[ContractAlert] {
        let end = self.alertes_contrats.len().min(MAX_DASHBOARD_ALERTS);
        &self.alertes_contrats[..end]
    }
}
