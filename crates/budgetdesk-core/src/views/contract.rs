//! Contracts and their renewal.

use crate::api::Resource;
use crate::app::{Console, View};
use crate::cache::Selector;
use crate::error::ConsoleError;
use crate::models::{Contract, ContractInput, RenewalRequest};
use crate::ui::{Modal, Row, Table};
use crate::utils::{format_amount, format_date, or_placeholder};

impl Console {
    pub async fn load_contracts(&mut self) -> Result<(), ConsoleError> {
        let contracts = match self.api.list::<Contract>(Vec::new()).await {
            Ok(contracts) => contracts,
            Err(e) => return self.load_failed("contrats", e),
        };
        self.caches.contracts.replace(contracts);

        let rows = self
            .caches
            .contracts
            .items()
            .iter()
            .map(|c| {
                let mut actions = vec!["Modifier"];
                if c.is_renewable() {
                    actions.push("Reconduire");
                }
                actions.push("Suppr.");
                Row::new(
                    c.id,
                    vec![
                        or_placeholder(c.numero_contrat.as_deref()),
                        or_placeholder(c.objet.as_deref()),
                        or_placeholder(c.fournisseur_nom.as_deref()),
                        format_amount(c.montant_total_ht),
                        format_date(c.date_debut.as_deref()),
                        format_date(c.date_fin.as_deref()),
                        c.remaining_display(),
                        or_placeholder(c.statut.as_deref()),
                        c.niveau_alerte.clone().unwrap_or_else(|| "OK".to_string()),
                    ],
                )
                .with_actions(actions)
            })
            .collect();
        self.sink.render_table(&Table::new(
            View::Contracts,
            vec![
                "N° contrat", "Objet", "Fournisseur", "Montant HT", "Début", "Fin", "Restant",
                "Statut", "Alerte",
            ],
            rows,
        ));
        Ok(())
    }

    pub async fn create_contract(&mut self, mut input: ContractInput) -> Result<(), ConsoleError> {
        self.require(&input.numero_contrat, "Le N° contrat est obligatoire")?;
        input.fournisseur_id = self.or_selected(input.fournisseur_id, Selector::ContractSupplier);

        let outcome = self.api.create::<Contract, _>(&input).await;
        self.settle(outcome, "Contrat ajouté")?;
        let reload = self.load_contracts().await;
        self.refresh_references().await;
        self.reloaded(reload)
    }

    /// Prefill the edit dialog from the last loaded list.
    pub fn edit_contract(&mut self, id: i64) -> Result<ContractInput, ConsoleError> {
        let contract = match self.caches.contracts.find(id) {
            Ok(contract) => contract.clone(),
            Err(e) => return self.fail(e),
        };
        self.preselect(Selector::EditContractSupplier, contract.fournisseur_id);
        self.open_modal(Modal::EditContract);
        Ok(ContractInput::from(&contract))
    }

    pub async fn save_contract(&mut self, id: i64, mut input: ContractInput) -> Result<(), ConsoleError> {
        self.require(&input.numero_contrat, "Le N° contrat est obligatoire")?;
        input.fournisseur_id = self.selected(Selector::EditContractSupplier);

        let outcome = self.api.update::<Contract, _>(id, &input).await;
        self.settle(outcome, "Contrat mis à jour")?;
        self.close_modal(Modal::EditContract);
        let reload = self.load_contracts().await;
        self.refresh_references().await;
        self.reloaded(reload)
    }

    pub async fn delete_contract(&mut self, id: i64) -> Result<(), ConsoleError> {
        let outcome = self.api.remove::<Contract>(id).await;
        self.settle(outcome, "Contrat supprimé")?;
        let reload = self.load_contracts().await;
        self.refresh_references().await;
        self.reloaded(reload)
    }

    // =========================================================================
    // Renewal
    // =========================================================================

    pub fn open_renewal(&mut self, id: i64) -> Result<(), ConsoleError> {
        if let Err(e) = self.caches.contracts.find(id) {
            return self.fail(e);
        }
        self.selection.contract_to_renew = Some(id);
        self.open_modal(Modal::RenewContract);
        Ok(())
    }

    /// Extend the selected contract to `new_end` (`YYYY-MM-DD`).
    pub async fn confirm_renewal(&mut self, new_end: &str) -> Result<(), ConsoleError> {
        self.require(new_end, "Date requise")?;
        let Some(id) = self.selection.contract_to_renew else {
            return self.fail(ConsoleError::validation("Aucun contrat sélectionné"));
        };

        let path = format!("/{}/{}/reconduire", Contract::COLLECTION, id);
        let body = RenewalRequest {
            nouvelle_date_fin: new_end.trim().to_string(),
        };
        let outcome = self.api.post(&path, &body).await;
        self.settle(outcome, "Contrat reconduit")?;
        self.selection.contract_to_renew = None;
        self.close_modal(Modal::RenewContract);
        let reload = self.load_contracts().await;
        self.refresh_references().await;
        self.reloaded(reload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::testing::{references, signed_in};
    use serde_json::json;

    fn contracts() -> serde_json::Value {
        json!({"list": [
            {"id": 7, "numero_contrat": "C-01", "statut": "ACTIF", "fournisseur_id": 2, "jours_restants": 12},
            {"id": 8, "numero_contrat": "C-02", "statut": "TERMINE"}
        ]})
    }

    #[tokio::test]
    async fn test_renew_action_only_for_renewable() {
        let (mut console, transport, sink, _) = signed_in("gestionnaire");
        transport.respond(Method::Get, "/contrat", 200, contracts());

        console.load_contracts().await.unwrap();
        let table = sink.tables(View::Contracts).pop().unwrap();
        assert_eq!(table.rows[0].actions, vec!["Modifier", "Reconduire", "Suppr."]);
        assert_eq!(table.rows[1].actions, vec!["Modifier", "Suppr."]);
        assert_eq!(table.rows[0].cells[6], "12 j.");
    }

    #[tokio::test]
    async fn test_renewal_requires_date() {
        let (mut console, transport, sink, _) = signed_in("gestionnaire");
        transport.respond(Method::Get, "/contrat", 200, contracts());
        console.load_contracts().await.unwrap();
        console.open_renewal(7).unwrap();

        assert!(console.confirm_renewal("  ").await.is_err());
        assert_eq!(sink.last_banner().unwrap().text, "Date requise");
        assert!(console.modals().is_open(Modal::RenewContract));
        assert!(transport.calls(Method::Post, "/contrat/7/reconduire").is_empty());
    }

    #[tokio::test]
    async fn test_renewal_posts_new_end_and_reloads() {
        let (mut console, transport, sink, _) = signed_in("gestionnaire");
        transport.respond(Method::Get, "/contrat", 200, contracts());
        transport.respond(Method::Get, "/referentiels", 200, references());
        transport.respond(Method::Post, "/contrat/7/reconduire", 200, json!({"success": true}));
        console.load_contracts().await.unwrap();
        console.open_renewal(7).unwrap();

        console.confirm_renewal("2027-12-31").await.unwrap();
        let sent = transport.calls(Method::Post, "/contrat/7/reconduire");
        assert_eq!(sent[0].body, Some(json!({"nouvelle_date_fin": "2027-12-31"})));
        assert_eq!(sink.last_banner().unwrap().text, "Contrat reconduit");
        assert!(!console.modals().is_open(Modal::RenewContract));
        assert_eq!(transport.calls(Method::Get, "/contrat").len(), 2);
        assert_eq!(transport.calls(Method::Get, "/referentiels").len(), 1);
    }

    #[tokio::test]
    async fn test_renewal_succeeds_when_reload_fails() {
        let (mut console, transport, sink, _) = signed_in("gestionnaire");
        transport.respond(Method::Get, "/contrat", 200, contracts());
        transport.respond(Method::Get, "/referentiels", 200, references());
        transport.respond(Method::Post, "/contrat/7/reconduire", 200, json!({"success": true}));
        console.load_contracts().await.unwrap();
        console.open_renewal(7).unwrap();

        transport.respond(Method::Get, "/contrat", 500, json!({}));
        console.confirm_renewal("2027-12-31").await.unwrap();
        assert_eq!(transport.calls(Method::Get, "/referentiels").len(), 1);
        assert!(!console.modals().is_open(Modal::RenewContract));
        assert_eq!(sink.last_banner().unwrap().text, "Erreur chargement contrats");
    }

    #[tokio::test]
    async fn test_edit_unlisted_contract_is_stale() {
        let (mut console, _, _, _) = signed_in("gestionnaire");
        let err = console.edit_contract(7).unwrap_err();
        assert!(matches!(err, ConsoleError::StaleCache { kind: "Contrat", id: 7 }));
        assert!(console.modals().is_empty());
    }

    #[tokio::test]
    async fn test_create_falls_back_to_bound_supplier() {
        let (mut console, transport, _, _) = signed_in("gestionnaire");
        transport.respond(Method::Get, "/referentiels", 200, references());
        transport.respond(Method::Post, "/contrat", 200, json!({"success": true}));
        transport.respond(Method::Get, "/contrat", 200, contracts());
        console.refresh_references().await;
        console.select(Selector::ContractSupplier, Some(1)).unwrap();

        let input = ContractInput {
            numero_contrat: "C-03".to_string(),
            objet: "Hébergement".to_string(),
            fournisseur_id: None,
            montant_total_ht: Some(1200.0),
            date_debut: None,
            date_fin: None,
            statut: None,
        };
        console.create_contract(input).await.unwrap();
        let body = transport.calls(Method::Post, "/contrat")[0].body.clone().unwrap();
        assert_eq!(body["fournisseur_id"], json!(1));
    }
}
