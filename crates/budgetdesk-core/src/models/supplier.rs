use serde::{Deserialize, Serialize};

use super::common::de_amount;
use crate::api::Resource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: i64,
    #[serde(default)]
    pub nom: Option<String>,
    #[serde(default)]
    pub contact_principal: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default)]
    pub adresse: Option<String>,
    #[serde(default)]
    pub ville: Option<String>,
    #[serde(default)]
    pub statut: Option<String>,
    #[serde(default)]
    pub nb_bc: u64,
    #[serde(default)]
    pub nb_contrats: u64,
    #[serde(default, deserialize_with = "de_amount")]
    pub montant_total: Option<f64>,
}

impl Resource for Supplier {
    const COLLECTION: &'static str = "fournisseur";
    const KIND: &'static str = "Fournisseur";

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SupplierInput {
    pub nom: String,
    pub contact_principal: Option<String>,
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub adresse: Option<String>,
    pub ville: Option<String>,
}

impl From<&Supplier> for SupplierInput {
    fn from(supplier: &Supplier) -> Self {
        Self {
            nom: supplier.nom.clone().unwrap_or_default(),
            contact_principal: supplier.contact_principal.clone(),
            email: supplier.email.clone(),
            telephone: supplier.telephone.clone(),
            adresse: supplier.adresse.clone(),
            ville: supplier.ville.clone(),
        }
    }
}
