use serde::{Deserialize, Serialize};

use super::common::{de_amount, de_opt_id, de_string_or_number};
use crate::api::Resource;

/// Statuses from which a contract may be renewed.
const RENEWABLE: [&str; 2] = ["ACTIF", "RECONDUIT"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: i64,
    #[serde(default, deserialize_with = "de_string_or_number")]
    pub numero_contrat: Option<String>,
    #[serde(default)]
    pub objet: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub fournisseur_id: Option<i64>,
    #[serde(default)]
    pub fournisseur_nom: Option<String>,
    #[serde(default, deserialize_with = "de_amount")]
    pub montant_total_ht: Option<f64>,
    #[serde(default)]
    pub date_debut: Option<String>,
    #[serde(default)]
    pub date_fin: Option<String>,
    #[serde(default)]
    pub jours_restants: Option<i64>,
    #[serde(default)]
    pub statut: Option<String>,
    #[serde(default)]
    pub type_contrat: Option<String>,
    #[serde(default)]
    pub niveau_alerte: Option<String>,
    #[serde(default)]
    pub nombre_reconductions: Option<i64>,
}

impl Contract {
    pub fn is_renewable(&self) -> bool {
        self.statut
            .as_deref()
            .map(|s| RENEWABLE.contains(&s))
            .unwrap_or(false)
    }

    /// `12 j.`, or the placeholder when the server did not compute it.
    pub fn remaining_display(&self) -> String {
        self.jours_restants
            .map(|d| format!("{} j.", d))
            .unwrap_or_else(|| crate::utils::PLACEHOLDER.to_string())
    }
}

impl Resource for Contract {
    const COLLECTION: &'static str = "contrat";
    const KIND: &'static str = "Contrat";

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContractInput {
    pub numero_contrat: String,
    pub objet: String,
    pub fournisseur_id: Option<i64>,
    pub montant_total_ht: Option<f64>,
    pub date_debut: Option<String>,
    pub date_fin: Option<String>,
    pub statut: Option<String>,
}

impl From<&Contract> for ContractInput {
    fn from(contract: &Contract) -> Self {
        Self {
            numero_contrat: contract.numero_contrat.clone().unwrap_or_default(),
            objet: contract.objet.clone().unwrap_or_default(),
            fournisseur_id: contract.fournisseur_id,
            montant_total_ht: contract.montant_total_ht,
            date_debut: contract.date_debut.clone(),
            date_fin: contract.date_fin.clone(),
            statut: contract.statut.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RenewalRequest {
    pub nouvelle_date_fin: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_renewable_statuses() {
        let active: Contract = serde_json::from_value(json!({"id": 1, "statut": "ACTIF"})).unwrap();
        let renewed: Contract =
            serde_json::from_value(json!({"id": 2, "statut": "RECONDUIT"})).unwrap();
        let ended: Contract = serde_json::from_value(json!({"id": 3, "statut": "TERMINE"})).unwrap();
        assert!(active.is_renewable());
        assert!(renewed.is_renewable());
        assert!(!ended.is_renewable());
    }

    #[test]
    fn test_remaining_display() {
        let c: Contract = serde_json::from_value(json!({"id": 1, "jours_restants": -4})).unwrap();
        assert_eq!(c.remaining_display(), "-4 j.");
        let c: Contract = serde_json::from_value(json!({"id": 1})).unwrap();
        assert_eq!(c.remaining_display(), "-");
    }
}
