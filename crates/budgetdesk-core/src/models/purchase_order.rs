use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::common::{de_amount, de_opt_id, de_string_or_number, StatBucket};
use crate::api::Resource;
use crate::utils::contains_ignore_case;

/// VAT rate assumed when it cannot be derived from stored amounts.
pub const DEFAULT_VAT_RATE: f64 = 20.0;

/// Statuses shown in the order statistics bar, in display order.
pub const STATUS_ORDER: [&str; 6] = ["BROUILLON", "EN_ATTENTE", "VALIDE", "IMPUTE", "SOLDE", "ANNULE"];

/// Key of the all-statuses bucket in `/bon_commande/stats`.
const TOTAL_BUCKET: &str = "_total";

/// Inclusive-of-tax amount: `round(ht × (1 + vat/100), 2)`, half away from zero.
pub fn compute_ttc(ht: f64, vat_rate: f64) -> f64 {
    (ht * (1.0 + vat_rate / 100.0) * 100.0).round() / 100.0
}

/// VAT rate implied by stored amounts, rounded to one decimal.
pub fn derive_vat_rate(ht: Option<f64>, ttc: Option<f64>) -> f64 {
    match (ht, ttc) {
        (Some(ht), ttc) if ht > 0.0 => ((ttc.unwrap_or(0.0) / ht - 1.0) * 1000.0).round() / 10.0,
        _ => DEFAULT_VAT_RATE,
    }
}

/// Lifecycle of a purchase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoStatus {
    Draft,
    Pending,
    Validated,
    Allocated,
    Settled,
    Cancelled,
}

impl PoStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "BROUILLON" => Some(PoStatus::Draft),
            "EN_ATTENTE" => Some(PoStatus::Pending),
            "VALIDE" => Some(PoStatus::Validated),
            "IMPUTE" => Some(PoStatus::Allocated),
            "SOLDE" => Some(PoStatus::Settled),
            "ANNULE" => Some(PoStatus::Cancelled),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PoStatus::Draft => "BROUILLON",
            PoStatus::Pending => "EN_ATTENTE",
            PoStatus::Validated => "VALIDE",
            PoStatus::Allocated => "IMPUTE",
            PoStatus::Settled => "SOLDE",
            PoStatus::Cancelled => "ANNULE",
        }
    }
}

/// Row actions offered for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoAction {
    Validate,
    Allocate,
    Delete,
}

impl PoAction {
    pub fn label(&self) -> &'static str {
        match self {
            PoAction::Validate => "Valider",
            PoAction::Allocate => "Imputer",
            PoAction::Delete => "Suppr.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: i64,
    #[serde(default, deserialize_with = "de_string_or_number")]
    pub numero_bc: Option<String>,
    #[serde(default)]
    pub objet: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub fournisseur_id: Option<i64>,
    #[serde(default)]
    pub fournisseur_nom: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub entite_id: Option<i64>,
    #[serde(default, deserialize_with = "de_string_or_number")]
    pub entite_code: Option<String>,
    #[serde(default, deserialize_with = "de_amount")]
    pub montant_ht: Option<f64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub montant_ttc: Option<f64>,
    #[serde(default)]
    pub statut: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub ligne_budgetaire_id: Option<i64>,
    #[serde(default)]
    pub ligne_libelle: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub projet_id: Option<i64>,
    #[serde(default)]
    pub projet_nom: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub contrat_id: Option<i64>,
    #[serde(default, deserialize_with = "de_string_or_number")]
    pub contrat_numero: Option<String>,
    #[serde(default)]
    pub date_imputation: Option<String>,
    #[serde(default)]
    pub date_solde: Option<String>,
}

impl PurchaseOrder {
    pub fn status(&self) -> Option<PoStatus> {
        self.statut.as_deref().and_then(PoStatus::parse)
    }

    /// Validate while draft or pending, allocate once validated, delete
    /// unless allocated or settled.
    pub fn available_actions(&self) -> Vec<PoAction> {
        let status = self.status();
        let mut actions = Vec::new();
        if matches!(status, Some(PoStatus::Draft | PoStatus::Pending)) {
            actions.push(PoAction::Validate);
        }
        if status == Some(PoStatus::Validated) {
            actions.push(PoAction::Allocate);
        }
        if !matches!(status, Some(PoStatus::Allocated | PoStatus::Settled)) {
            actions.push(PoAction::Delete);
        }
        actions
    }

    pub fn vat_rate(&self) -> f64 {
        derive_vat_rate(self.montant_ht, self.montant_ttc)
    }
}

impl Resource for PurchaseOrder {
    const COLLECTION: &'static str = "bon_commande";
    const KIND: &'static str = "BC";

    fn id(&self) -> i64 {
        self.id
    }
}

/// Filter bar of the order list. Sent as query parameters and re-applied
/// locally to whatever the server returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PurchaseOrderFilter {
    pub statut: Option<String>,
    pub entite_id: Option<i64>,
    pub search: Option<String>,
}

impl PurchaseOrderFilter {
    pub fn query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(statut) = self.statut.as_deref().filter(|s| !s.is_empty()) {
            query.push(("statut".to_string(), statut.to_string()));
        }
        if let Some(entite) = self.entite_id {
            query.push(("entite_id".to_string(), entite.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            query.push(("search".to_string(), search.to_string()));
        }
        query
    }

    /// Status equality AND case-insensitive search over number, object and
    /// supplier name. Empty criteria match everything.
    pub fn matches(&self, order: &PurchaseOrder) -> bool {
        let status_ok = match self.statut.as_deref() {
            Some(s) if !s.is_empty() => order.statut.as_deref() == Some(s),
            _ => true,
        };
        let search_ok = match self.search.as_deref() {
            Some(needle) if !needle.is_empty() => {
                contains_ignore_case(order.numero_bc.as_deref(), needle)
                    || contains_ignore_case(order.objet.as_deref(), needle)
                    || contains_ignore_case(order.fournisseur_nom.as_deref(), needle)
            }
            _ => true,
        };
        status_ok && search_ok
    }

    pub fn apply(&self, orders: &[PurchaseOrder]) -> Vec<PurchaseOrder> {
        orders.iter().filter(|o| self.matches(o)).cloned().collect()
    }
}

/// `GET /bon_commande/stats`: per-status buckets plus `_total`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct PurchaseOrderStats(pub HashMap<String, StatBucket>);

impl PurchaseOrderStats {
    pub fn total(&self) -> StatBucket {
        self.0.get(TOTAL_BUCKET).copied().unwrap_or_default()
    }

    pub fn count(&self, status: &str) -> u64 {
        self.0.get(status).map(|b| b.count).unwrap_or(0)
    }

    /// Non-empty status counters in display order.
    pub fn summary(&self) -> Vec<(&'static str, u64)> {
        STATUS_ORDER
            .iter()
            .map(|s| (*s, self.count(s)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

/// Create/update body. TTC is always derived from HT and the VAT rate.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseOrderInput {
    pub numero_bc: String,
    pub objet: String,
    pub statut: Option<String>,
    pub fournisseur_id: Option<i64>,
    pub entite_id: Option<i64>,
    pub ligne_budgetaire_id: Option<i64>,
    pub projet_id: Option<i64>,
    pub contrat_id: Option<i64>,
    pub montant_ht: f64,
    pub montant_ttc: f64,
}

impl PurchaseOrderInput {
    pub fn set_amounts(&mut self, ht: f64, vat_rate: f64) {
        self.montant_ht = ht;
        self.montant_ttc = compute_ttc(ht, vat_rate);
    }
}

impl From<&PurchaseOrder> for PurchaseOrderInput {
    fn from(order: &PurchaseOrder) -> Self {
        Self {
            numero_bc: order.numero_bc.clone().unwrap_or_default(),
            objet: order.objet.clone().unwrap_or_default(),
            statut: order.statut.clone(),
            fournisseur_id: order.fournisseur_id,
            entite_id: order.entite_id,
            ligne_budgetaire_id: order.ligne_budgetaire_id,
            projet_id: order.projet_id,
            contrat_id: order.contrat_id,
            montant_ht: order.montant_ht.unwrap_or(0.0),
            montant_ttc: order.montant_ttc.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AllocationRequest {
    pub ligne_id: i64,
}

/// `GET /ligne/:id/bcs`: orders allocated to one budget line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineOrders {
    #[serde(default)]
    pub bcs: Vec<PurchaseOrder>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order(value: serde_json::Value) -> PurchaseOrder {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_compute_ttc() {
        assert_eq!(compute_ttc(100.0, 20.0), 120.0);
        assert_eq!(compute_ttc(133.33, 5.5), 140.66);
        assert_eq!(compute_ttc(0.0, 20.0), 0.0);
    }

    #[test]
    fn test_derive_vat_rate() {
        assert_eq!(derive_vat_rate(Some(100.0), Some(120.0)), 20.0);
        assert_eq!(derive_vat_rate(Some(133.33), Some(140.66)), 5.5);
        assert_eq!(derive_vat_rate(Some(0.0), Some(50.0)), DEFAULT_VAT_RATE);
        assert_eq!(derive_vat_rate(None, None), DEFAULT_VAT_RATE);
    }

    #[test]
    fn test_actions_by_status() {
        let draft = order(json!({"id": 1, "statut": "BROUILLON"}));
        assert_eq!(draft.available_actions(), vec![PoAction::Validate, PoAction::Delete]);

        let validated = order(json!({"id": 2, "statut": "VALIDE"}));
        assert_eq!(validated.available_actions(), vec![PoAction::Allocate, PoAction::Delete]);

        let allocated = order(json!({"id": 3, "statut": "IMPUTE"}));
        assert!(allocated.available_actions().is_empty());

        let settled = order(json!({"id": 4, "statut": "SOLDE"}));
        assert!(settled.available_actions().is_empty());

        let cancelled = order(json!({"id": 5, "statut": "ANNULE"}));
        assert_eq!(cancelled.available_actions(), vec![PoAction::Delete]);
    }

    #[test]
    fn test_filter_and_semantics() {
        let orders = vec![
            order(json!({"id": 1, "numero_bc": "BC-001", "objet": "Serveurs", "fournisseur_nom": "Dell", "statut": "VALIDE"})),
            order(json!({"id": 2, "numero_bc": "BC-002", "objet": "Licences", "fournisseur_nom": "Dell", "statut": "BROUILLON"})),
            order(json!({"id": 3, "numero_bc": "BC-003", "objet": "Audit", "fournisseur_nom": "Conseil", "statut": "VALIDE"})),
        ];

        let filter = PurchaseOrderFilter {
            statut: Some("VALIDE".to_string()),
            search: Some("dell".to_string()),
            ..Default::default()
        };
        let ids: Vec<i64> = filter.apply(&orders).iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1]);

        let by_search = PurchaseOrderFilter {
            search: Some("BC-00".to_string()),
            ..Default::default()
        };
        assert_eq!(by_search.apply(&orders).len(), 3);

        let none = PurchaseOrderFilter::default();
        assert_eq!(none.apply(&orders).len(), 3);
    }

    #[test]
    fn test_filter_query_skips_empty_values() {
        let filter = PurchaseOrderFilter {
            statut: Some(String::new()),
            entite_id: Some(4),
            search: Some("dell".to_string()),
        };
        assert_eq!(
            filter.query(),
            vec![
                ("entite_id".to_string(), "4".to_string()),
                ("search".to_string(), "dell".to_string())
            ]
        );
    }

    #[test]
    fn test_stats_summary() {
        let stats: PurchaseOrderStats = serde_json::from_value(json!({
            "_total": {"count": 5, "total": "1500.5"},
            "VALIDE": {"count": 3},
            "BROUILLON": {"count": 2, "total": 100},
            "ANNULE": {"count": 0}
        }))
        .unwrap();
        assert_eq!(stats.total().count, 5);
        assert_eq!(stats.total().total, Some(1500.5));
        assert_eq!(stats.summary(), vec![("BROUILLON", 2), ("VALIDE", 3)]);
    }
}
