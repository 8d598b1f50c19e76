//! Suppliers. Every mutation refreshes references: suppliers feed the order,
//! contract and budget line selectors.

use crate::app::{Console, View};
use crate::error::ConsoleError;
use crate::models::{Supplier, SupplierInput};
use crate::ui::{Modal, Row, Table};
use crate::utils::{format_amount, or_placeholder};

/// Status shown for suppliers the server returns without one.
const DEFAULT_SUPPLIER_STATUS: &str = "ACTIF";

impl Console {
    pub async fn load_suppliers(&mut self) -> Result<(), ConsoleError> {
        let suppliers = match self.api.list::<Supplier>(Vec::new()).await {
            Ok(suppliers) => suppliers,
            Err(e) => return self.load_failed("fournisseurs", e),
        };
        self.caches.suppliers.replace(suppliers);

        let rows = self
            .caches
            .suppliers
            .items()
            .iter()
            .map(|s| {
                Row::new(
                    s.id,
                    vec![
                        s.id.to_string(),
                        or_placeholder(s.nom.as_deref()),
                        or_placeholder(s.contact_principal.as_deref()),
                        or_placeholder(s.email.as_deref()),
                        or_placeholder(s.telephone.as_deref()),
                        or_placeholder(s.ville.as_deref()),
                        s.nb_contrats.to_string(),
                        s.nb_bc.to_string(),
                        format_amount(s.montant_total),
                        s.statut
                            .clone()
                            .unwrap_or_else(|| DEFAULT_SUPPLIER_STATUS.to_string()),
                    ],
                )
                .with_actions(vec!["Modifier", "Suppr."])
            })
            .collect();
        self.sink.render_table(&Table::new(
            View::Suppliers,
            vec![
                "ID", "Nom", "Contact", "Email", "Téléphone", "Ville", "Contrats", "BC", "Montant",
                "Statut",
            ],
            rows,
        ));
        Ok(())
    }

    pub async fn create_supplier(&mut self, input: SupplierInput) -> Result<(), ConsoleError> {
        self.require(&input.nom, "Le nom est obligatoire")?;
        let outcome = self.api.create::<Supplier, _>(&input).await;
        self.settle(outcome, "Fournisseur ajouté")?;
        let reload = self.load_suppliers().await;
        self.refresh_references().await;
        self.reloaded(reload)
    }

    pub fn edit_supplier(&mut self, id: i64) -> Result<SupplierInput, ConsoleError> {
        let input = match self.caches.suppliers.find(id) {
            Ok(supplier) => SupplierInput::from(supplier),
            Err(e) => return self.fail(e),
        };
        self.open_modal(Modal::EditSupplier);
        Ok(input)
    }

    pub async fn save_supplier(&mut self, id: i64, input: SupplierInput) -> Result<(), ConsoleError> {
        self.require(&input.nom, "Le nom est obligatoire")?;
        let outcome = self.api.update::<Supplier, _>(id, &input).await;
        self.settle(outcome, "Fournisseur mis à jour")?;
        self.close_modal(Modal::EditSupplier);
        let reload = self.load_suppliers().await;
        self.refresh_references().await;
        self.reloaded(reload)
    }

    pub async fn delete_supplier(&mut self, id: i64) -> Result<(), ConsoleError> {
        let outcome = self.api.remove::<Supplier>(id).await;
        self.settle(outcome, "Fournisseur supprimé")?;
        let reload = self.load_suppliers().await;
        self.refresh_references().await;
        self.reloaded(reload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::cache::Selector;
    use crate::models::Category;
    use crate::testing::{references, signed_in};
    use serde_json::json;

    #[tokio::test]
    async fn test_new_supplier_reaches_selectors() {
        let (mut console, transport, _, _) = signed_in("gestionnaire");
        transport.respond(Method::Get, "/referentiels", 200, references());
        transport.respond(Method::Post, "/fournisseur", 200, json!({"success": true}));
        transport.respond(Method::Get, "/fournisseur", 200, json!({"list": []}));
        let mut refs = references();
        refs["fournisseurs"]
            .as_array_mut()
            .unwrap()
            .push(json!({"id": 3, "nom": "Initech"}));
        transport.enqueue(Method::Get, "/referentiels", 200, refs);

        console.refresh_references().await;
        assert_eq!(console.references().len(Category::Suppliers), 2);

        console
            .create_supplier(SupplierInput {
                nom: "Initech".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(console.references().len(Category::Suppliers), 3);
        console.select(Selector::OrderSupplier, Some(3)).unwrap();
    }

    #[tokio::test]
    async fn test_failed_delete_leaves_references_alone() {
        let (mut console, transport, sink, _) = signed_in("gestionnaire");
        transport.respond(
            Method::Delete,
            "/fournisseur/1",
            200,
            json!({"success": false, "error": "Fournisseur utilisé par des BC"}),
        );

        assert!(console.delete_supplier(1).await.is_err());
        assert_eq!(sink.last_banner().unwrap().text, "Fournisseur utilisé par des BC");
        assert!(transport.calls(Method::Get, "/referentiels").is_empty());
        assert!(transport.calls(Method::Get, "/fournisseur").is_empty());
    }

    #[tokio::test]
    async fn test_edit_reads_from_last_load() {
        let (mut console, transport, sink, _) = signed_in("gestionnaire");
        transport.respond(
            Method::Get,
            "/fournisseur",
            200,
            json!({"list": [{"id": 1, "nom": "Acme", "ville": "Lyon", "nb_bc": 3}]}),
        );
        console.load_suppliers().await.unwrap();
        let table = sink.tables(View::Suppliers).pop().unwrap();
        assert_eq!(table.rows[0].cells[9], "ACTIF");

        let input = console.edit_supplier(1).unwrap();
        assert_eq!(input.ville.as_deref(), Some("Lyon"));
        assert!(console.modals().is_open(Modal::EditSupplier));
        assert!(console.edit_supplier(2).is_err());
    }
}
