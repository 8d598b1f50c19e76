//! Lightweight lookup records returned by `GET /referentiels`.
//!
//! Each category is a list of `{id, ...}` rows carrying just enough to build
//! the label shown in selection controls and inline displays.

use serde::{Deserialize, Serialize};

use super::common::{de_amount, de_string_or_number};
use crate::utils::{format_amount, format_amount_value, PLACEHOLDER};

/// Separator between a code and a name in labels.
const CODE_SEPARATOR: &str = " – ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Suppliers,
    Entities,
    Projects,
    BudgetLines,
    Applications,
    Contracts,
    Services,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Suppliers,
        Category::Entities,
        Category::Projects,
        Category::BudgetLines,
        Category::Applications,
        Category::Contracts,
        Category::Services,
    ];

    /// Key of the category in the reference payload.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Suppliers => "fournisseurs",
            Category::Entities => "entites",
            Category::Projects => "projets",
            Category::BudgetLines => "lignes",
            Category::Applications => "applications",
            Category::Contracts => "contrats",
            Category::Services => "services",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

fn code_label(code: Option<&str>, nom: Option<&str>) -> String {
    let nom = nom.unwrap_or_default();
    match code {
        Some(code) if !code.is_empty() => format!("{}{}{}", code, CODE_SEPARATOR, nom),
        _ => nom.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierRef {
    pub id: i64,
    #[serde(default)]
    pub nom: Option<String>,
}

impl SupplierRef {
    pub fn label(&self) -> String {
        self.nom.clone().unwrap_or_default()
    }
}

/// Organisational entity a budget or order belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: i64,
    #[serde(default, deserialize_with = "de_string_or_number")]
    pub code: Option<String>,
    #[serde(default)]
    pub nom: Option<String>,
}

impl EntityRef {
    pub fn label(&self) -> String {
        code_label(self.code.as_deref(), self.nom.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: i64,
    #[serde(default, deserialize_with = "de_string_or_number")]
    pub code: Option<String>,
    #[serde(default)]
    pub nom: Option<String>,
}

impl ProjectRef {
    pub fn label(&self) -> String {
        code_label(self.code.as_deref(), self.nom.as_deref())
    }
}

/// Budget line with its server-computed figures. The client never
/// recomputes these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLineRef {
    pub id: i64,
    #[serde(default)]
    pub libelle: Option<String>,
    #[serde(default, deserialize_with = "de_amount")]
    pub montant_vote: Option<f64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub montant_engage: Option<f64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub montant_solde: Option<f64>,
}

impl BudgetLineRef {
    pub fn name(&self) -> String {
        match self.libelle.as_deref() {
            Some(l) if !l.is_empty() => l.to_string(),
            _ => format!("Ligne #{}", self.id),
        }
    }

    pub fn label(&self) -> String {
        format!(
            "{} — Solde: {} €",
            self.name(),
            format_amount_value(self.montant_solde.unwrap_or(0.0))
        )
    }

    /// Voted / committed / balance summary shown next to a line picker.
    pub fn readout(&self) -> String {
        format!(
            "Voté: {} € — Engagé: {} € — Solde: {} €",
            format_amount(self.montant_vote),
            format_amount(self.montant_engage),
            format_amount(self.montant_solde)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRef {
    pub id: i64,
    #[serde(default)]
    pub nom: Option<String>,
}

impl ApplicationRef {
    pub fn label(&self) -> String {
        self.nom.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRef {
    pub id: i64,
    #[serde(default, deserialize_with = "de_string_or_number")]
    pub numero_contrat: Option<String>,
    #[serde(default)]
    pub objet: Option<String>,
}

impl ContractRef {
    pub fn label(&self) -> String {
        match (self.numero_contrat.as_deref(), self.objet.as_deref()) {
            (Some(numero), Some(objet)) if !numero.is_empty() && !objet.is_empty() => {
                format!("{}{}{}", numero, CODE_SEPARATOR, objet)
            }
            (Some(numero), _) if !numero.is_empty() => numero.to_string(),
            _ => format!("Contrat #{}", self.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRef {
    pub id: i64,
    #[serde(default, deserialize_with = "de_string_or_number")]
    pub code: Option<String>,
    #[serde(default)]
    pub nom: Option<String>,
}

impl ServiceRef {
    pub fn label(&self) -> String {
        code_label(self.code.as_deref(), self.nom.as_deref())
    }
}

/// One entry of a selection control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefOption {
    pub id: i64,
    pub label: String,
}

/// Snapshot of every lookup category. Missing keys decode as empty lists and
/// keys the console does not use (`etp`, `contacts`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceSnapshot {
    pub fournisseurs: Vec<SupplierRef>,
    pub entites: Vec<EntityRef>,
    pub projets: Vec<ProjectRef>,
    pub lignes: Vec<BudgetLineRef>,
    pub applications: Vec<ApplicationRef>,
    pub contrats: Vec<ContractRef>,
    pub services: Vec<ServiceRef>,
}

impl ReferenceSnapshot {
    /// Labelled options of a category, in server order.
    pub fn options(&self, category: Category) -> Vec<RefOption> {
        fn collect<T>(items: &[T], id: impl Fn(&T) -> i64, label: impl Fn(&T) -> String) -> Vec<RefOption> {
            items
                .iter()
                .map(|item| RefOption {
                    id: id(item),
                    label: label(item),
                })
                .collect()
        }

        match category {
            Category::Suppliers => collect(&self.fournisseurs, |r| r.id, SupplierRef::label),
            Category::Entities => collect(&self.entites, |r| r.id, EntityRef::label),
            Category::Projects => collect(&self.projets, |r| r.id, ProjectRef::label),
            Category::BudgetLines => collect(&self.lignes, |r| r.id, BudgetLineRef::label),
            Category::Applications => collect(&self.applications, |r| r.id, ApplicationRef::label),
            Category::Contracts => collect(&self.contrats, |r| r.id, ContractRef::label),
            Category::Services => collect(&self.services, |r| r.id, ServiceRef::label),
        }
    }

    pub fn len(&self, category: Category) -> usize {
        match category {
            Category::Suppliers => self.fournisseurs.len(),
            Category::Entities => self.entites.len(),
            Category::Projects => self.projets.len(),
            Category::BudgetLines => self.lignes.len(),
            Category::Applications => self.applications.len(),
            Category::Contracts => self.contrats.len(),
            Category::Services => self.services.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.len(*c) == 0)
    }

    pub fn contains(&self, category: Category, id: i64) -> bool {
        match category {
            Category::Suppliers => self.fournisseurs.iter().any(|r| r.id == id),
            Category::Entities => self.entites.iter().any(|r| r.id == id),
            Category::Projects => self.projets.iter().any(|r| r.id == id),
            Category::BudgetLines => self.lignes.iter().any(|r| r.id == id),
            Category::Applications => self.applications.iter().any(|r| r.id == id),
            Category::Contracts => self.contrats.iter().any(|r| r.id == id),
            Category::Services => self.services.iter().any(|r| r.id == id),
        }
    }

    pub fn budget_line(&self, id: i64) -> Option<&BudgetLineRef> {
        self.lignes.iter().find(|l| l.id == id)
    }

    /// Label of a foreign key, or the placeholder when the key is absent or
    /// does not resolve against this snapshot.
    pub fn label_for(&self, category: Category, id: Option<i64>) -> String {
        id.and_then(|id| self.options(category).into_iter().find(|o| o.id == id))
            .map(|o| o.label)
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }
}
