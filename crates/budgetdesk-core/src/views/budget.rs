//! Budgets, votes and budget lines.

use tracing::{debug, warn};

use crate::api::Resource;
use crate::app::{Console, View};
use crate::cache::Selector;
use crate::error::ConsoleError;
use crate::models::{
    Budget, BudgetInput, BudgetLine, BudgetLineInput, BudgetOverview, LineOrders, ListResponse,
    VoteRequest,
};
use crate::ui::{Kpi, Modal, Row, Table};
use crate::utils::{format_amount, format_date, or_placeholder, PLACEHOLDER};

const BUDGETS_PATH: &str = "/budget";

/// Line listing lives under its own plural path.
const LINES_PATH: &str = "/lignes";

fn line_row(index: usize, line: &BudgetLine, selected: bool) -> Row {
    Row::new(
        line.id,
        vec![
            (index + 1).to_string(),
            or_placeholder(line.libelle.as_deref()),
            or_placeholder(line.application_nom.as_deref()),
            or_placeholder(line.fournisseur_nom.as_deref()),
            format_amount(line.montant_vote),
            format_amount(line.montant_engage),
            format_amount(Some(line.montant_solde.unwrap_or(0.0))),
            format!("{} %", line.taux_engagement.unwrap_or(0.0)),
            if line.alerte { "⚠ SEUIL" } else { "✓ OK" }.to_string(),
            line.note.clone().unwrap_or_default(),
            or_placeholder(line.budget_label.as_deref()),
        ],
    )
    .with_actions(vec!["Modifier"])
    .selected(selected)
}

impl Console {
    // =========================================================================
    // Budgets
    // =========================================================================

    pub async fn load_budgets(&mut self) -> Result<(), ConsoleError> {
        let overview: BudgetOverview = match self.api.get(BUDGETS_PATH).await {
            Ok(overview) => overview,
            Err(e) => return self.load_failed("budgets", e),
        };
        self.caches.budgets.replace(overview.details);

        self.sink.render_kpis(
            View::Budgets,
            &[
                Kpi::new("Total voté", format_amount(overview.total_vote)),
                Kpi::new("Total engagé", format_amount(overview.total_engage)),
            ],
        );

        let rows = self
            .caches
            .budgets
            .items()
            .iter()
            .map(|b| {
                Row::new(
                    b.id,
                    vec![
                        b.id.to_string(),
                        or_placeholder(b.entite_code.as_deref().or(b.entite_nom.as_deref())),
                        or_placeholder(b.exercice.as_deref()),
                        or_placeholder(b.nature.as_deref()),
                        format_amount(b.montant_previsionnel),
                        format_amount(Some(b.montant_vote.unwrap_or(0.0))),
                        format_amount(Some(b.montant_engage.unwrap_or(0.0))),
                        format_amount(b.montant_paye),
                        b.engagement_rate()
                            .map(|r| format!("{} %", r))
                            .unwrap_or_else(|| PLACEHOLDER.to_string()),
                        or_placeholder(b.statut.as_deref()),
                    ],
                )
                .with_actions(vec!["Lignes & BC", "Voter", "Suppr."])
            })
            .collect();
        self.sink.render_table(&Table::new(
            View::Budgets,
            vec![
                "ID", "Entité", "Exercice", "Nature", "Prévisionnel", "Voté", "Engagé", "Payé",
                "Engagement", "Statut",
            ],
            rows,
        ));
        Ok(())
    }

    pub async fn create_budget(&mut self, mut input: BudgetInput) -> Result<(), ConsoleError> {
        self.require(&input.exercice, "L'exercice est obligatoire")?;
        input.entite_id = self.or_selected(input.entite_id, Selector::BudgetEntity);

        let outcome = self.api.create::<Budget, _>(&input).await;
        self.settle(outcome, "Budget ajouté")?;
        let reload = self.load_budgets().await;
        self.reloaded(reload)
    }

    /// Open the vote dialog for a listed budget. Returns the currently voted
    /// amount to prefill the form.
    pub fn open_vote(&mut self, id: i64) -> Result<Option<f64>, ConsoleError> {
        let current = match self.caches.budgets.find(id) {
            Ok(budget) => budget.montant_vote,
            Err(e) => return self.fail(e),
        };
        self.selection.budget_to_vote = Some(id);
        self.open_modal(Modal::VoteBudget);
        Ok(current)
    }

    pub async fn confirm_vote(&mut self, amount: f64) -> Result<(), ConsoleError> {
        if !(amount > 0.0) {
            return self.fail(ConsoleError::validation("Montant invalide"));
        }
        let Some(id) = self.selection.budget_to_vote else {
            return self.fail(ConsoleError::validation("Aucun budget sélectionné"));
        };

        let path = format!("{}/{}/voter", BUDGETS_PATH, id);
        let outcome = self
            .api
            .post(&path, &VoteRequest { montant_vote: amount })
            .await;
        self.settle(outcome, "Budget voté")?;
        self.selection.budget_to_vote = None;
        self.close_modal(Modal::VoteBudget);
        let reload = self.load_budgets().await;
        self.reloaded(reload)
    }

    pub async fn delete_budget(&mut self, id: i64) -> Result<(), ConsoleError> {
        let outcome = self.api.remove::<Budget>(id).await;
        self.settle(outcome, "Budget supprimé")?;
        let reload = self.load_budgets().await;
        self.reloaded(reload)
    }

    // =========================================================================
    // Budget lines
    // =========================================================================

    pub async fn set_line_filter(
        &mut self,
        budget_id: Option<i64>,
        search: &str,
    ) -> Result<(), ConsoleError> {
        self.filters.line_budget = budget_id;
        self.filters.line_search = search.trim().to_string();
        self.load_lines().await
    }

    /// Load lines for the budget filter, search locally, and reload the
    /// orders of the highlighted line if it is still listed.
    pub async fn load_lines(&mut self) -> Result<(), ConsoleError> {
        let query = self
            .filters
            .line_budget
            .map(|id| vec![("budget_id".to_string(), id.to_string())])
            .unwrap_or_default();
        let response: ListResponse<BudgetLine> =
            match self.api.get_with_query(LINES_PATH, query).await {
                Ok(response) => response,
                Err(e) => return self.load_failed("lignes", e),
            };
        self.caches.budget_lines.replace(response.list);

        if let Some(id) = self.selection.budget_line {
            if !self.caches.budget_lines.contains(id) {
                debug!(id, "Selected line no longer listed");
                self.selection.budget_line = None;
            }
        }

        let needle = self.filters.line_search.as_str();
        let rows = self
            .caches
            .budget_lines
            .items()
            .iter()
            .filter(|l| l.matches_search(needle))
            .enumerate()
            .map(|(i, l)| line_row(i, l, self.selection.budget_line == Some(l.id)))
            .collect();
        self.sink.render_table(
            &Table::new(
                View::BudgetLines,
                vec![
                    "#", "Libellé", "Application", "Fournisseur", "Voté", "Engagé", "Solde",
                    "Taux", "Alerte", "Note", "Budget",
                ],
                rows,
            )
            .empty_message("Aucune ligne trouvée."),
        );

        if let Some(id) = self.selection.budget_line {
            let _ = self.show_line_orders(id, true).await;
        }
        Ok(())
    }

    /// Highlight a line and list the purchase orders allocated to it.
    pub async fn select_line(&mut self, id: i64) -> Result<(), ConsoleError> {
        self.selection.budget_line = Some(id);
        self.show_line_orders(id, false).await
    }

    async fn show_line_orders(&mut self, id: i64, silent: bool) -> Result<(), ConsoleError> {
        let name = self
            .caches
            .budget_lines
            .find(id)
            .map(|l| l.name())
            .unwrap_or_else(|_| format!("Ligne #{}", id));
        let path = format!("/{}/{}/bcs", BudgetLine::COLLECTION, id);
        let orders: LineOrders = match self.api.get(&path).await {
            Ok(orders) => orders,
            Err(e) if silent => {
                warn!(id, error = %e, "Line orders reload failed");
                return Err(e.into());
            }
            Err(e) => {
                let err = ConsoleError::from(e);
                self.sink
                    .banner(&self.notifier.error("Erreur chargement BCs de la ligne"));
                return Err(err);
            }
        };

        let rows = orders
            .bcs
            .iter()
            .map(|o| {
                Row::new(
                    o.id,
                    vec![
                        or_placeholder(o.numero_bc.as_deref()),
                        or_placeholder(o.objet.as_deref()),
                        or_placeholder(o.fournisseur_nom.as_deref()),
                        format!("{} €", format_amount(o.montant_ttc)),
                        format_date(o.date_imputation.as_deref()),
                        format_date(o.date_solde.as_deref()),
                        or_placeholder(o.statut.as_deref()),
                        or_placeholder(o.projet_nom.as_deref()),
                        or_placeholder(o.contrat_numero.as_deref()),
                    ],
                )
            })
            .collect();
        self.sink.render_table(
            &Table::new(
                View::BudgetLines,
                vec![
                    "N° BC", "Objet", "Fournisseur", "TTC", "Imputation", "Solde", "Statut",
                    "Projet", "Contrat",
                ],
                rows,
            )
            .titled(format!("BCs imputés — {}", name))
            .empty_message("Aucun BC imputé sur cette ligne."),
        );
        Ok(())
    }

    /// Open the line dialog, for a listed line or for a new one in the
    /// filtered budget. Returns the form values.
    pub fn open_line_editor(&mut self, id: Option<i64>) -> Result<BudgetLineInput, ConsoleError> {
        let input = match id {
            Some(id) => match self.caches.budget_lines.find(id) {
                Ok(line) => BudgetLineInput::from(line),
                Err(e) => return self.fail(e),
            },
            None => BudgetLineInput {
                budget_id: self.filters.line_budget,
                ..Default::default()
            },
        };
        self.preselect(Selector::EditLineSupplier, input.fournisseur_id);
        self.preselect(Selector::EditLineApplication, input.application_id);
        self.open_modal(Modal::EditBudgetLine);
        Ok(input)
    }

    /// Create (`id` = None) or update a line. Supplier and application come
    /// from the dialog's bound controls.
    pub async fn save_line(
        &mut self,
        id: Option<i64>,
        mut input: BudgetLineInput,
    ) -> Result<(), ConsoleError> {
        if input.budget_id.is_none() {
            return self.fail(ConsoleError::validation("Sélectionnez un budget"));
        }
        self.require(&input.libelle, "Le libellé est obligatoire")?;
        input.libelle = input.libelle.trim().to_string();
        input.fournisseur_id = self.selected(Selector::EditLineSupplier);
        input.application_id = self.selected(Selector::EditLineApplication);

        let (outcome, message) = match id {
            Some(id) => (
                self.api.update::<BudgetLine, _>(id, &input).await,
                "Ligne mise à jour",
            ),
            None => (self.api.create::<BudgetLine, _>(&input).await, "Ligne créée"),
        };
        self.settle(outcome, message)?;
        self.close_modal(Modal::EditBudgetLine);
        let reload = self.load_lines().await;
        let budgets = self.load_budgets().await;
        self.refresh_references().await;
        self.reloaded(reload.and(budgets))
    }
}

#[cfg(test)]
mod tests {
    use crate::api::Method;
    use crate::app::View;
    use crate::error::ConsoleError;
    use crate::models::{BudgetInput, BudgetLineInput};
    use crate::testing::{references, signed_in};
    use crate::ui::Modal;
    use serde_json::json;

    fn lines() -> serde_json::Value {
        json!({"list": [
            {"id": 5, "libelle": "Licences", "application_nom": "Messagerie", "montant_solde": 750},
            {"id": 6, "libelle": "Maintenance", "fournisseur_nom": "Acme", "alerte": 1}
        ]})
    }

    #[tokio::test]
    async fn test_create_budget_requires_year() {
        let (mut console, transport, sink, _) = signed_in("gestionnaire");
        let input = BudgetInput {
            entite_id: None,
            exercice: " ".to_string(),
            nature: None,
            montant_previsionnel: 0.0,
            montant_vote: None,
            statut: None,
        };
        let err = console.create_budget(input).await.unwrap_err();
        assert!(matches!(err, ConsoleError::Validation(_)));
        assert!(transport.requests().is_empty());
        assert_eq!(sink.last_banner().unwrap().text, "L'exercice est obligatoire");
    }

    #[tokio::test]
    async fn test_vote_rejects_non_positive_amount_and_keeps_modal() {
        let (mut console, transport, _, _) = signed_in("gestionnaire");
        transport.respond(Method::Get, "/budget", 200, json!({"details": [{"id": 2, "montant_vote": 100}]}));
        console.load_budgets().await.unwrap();

        assert_eq!(console.open_vote(2).unwrap(), Some(100.0));
        let err = console.confirm_vote(0.0).await.unwrap_err();
        assert_eq!(err.to_string(), "Montant invalide");
        assert!(console.modals().is_open(Modal::VoteBudget));
        assert!(transport.calls(Method::Post, "/budget/2/voter").is_empty());
    }

    #[tokio::test]
    async fn test_vote_success_closes_and_reloads() {
        let (mut console, transport, sink, _) = signed_in("gestionnaire");
        transport.respond(Method::Get, "/budget", 200, json!({"details": [{"id": 2}]}));
        transport.respond(Method::Post, "/budget/2/voter", 200, json!({"success": true}));
        console.load_budgets().await.unwrap();

        console.open_vote(2).unwrap();
        console.confirm_vote(2500.0).await.unwrap();
        let sent = transport.calls(Method::Post, "/budget/2/voter");
        assert_eq!(sent[0].body, Some(json!({"montant_vote": 2500.0})));
        assert!(!console.modals().is_open(Modal::VoteBudget));
        assert_eq!(transport.calls(Method::Get, "/budget").len(), 2);
        assert_eq!(sink.last_banner().unwrap().text, "Budget voté");
    }

    #[tokio::test]
    async fn test_open_vote_on_unlisted_budget_is_stale() {
        let (mut console, _, _, _) = signed_in("gestionnaire");
        let err = console.open_vote(9).unwrap_err();
        assert!(matches!(err, ConsoleError::StaleCache { kind: "Budget", id: 9 }));
        assert!(console.modals().is_empty());
    }

    #[tokio::test]
    async fn test_lines_search_locally_and_keep_selection() {
        let (mut console, transport, sink, _) = signed_in("lecteur");
        transport.respond(Method::Get, "/lignes", 200, lines());
        transport.respond(Method::Get, "/ligne/6/bcs", 200, json!({"bcs": [{"id": 1, "numero_bc": "BC-1"}]}));

        console.load_lines().await.unwrap();
        console.select_line(6).await.unwrap();
        let orders = sink.tables(View::BudgetLines).pop().unwrap();
        assert_eq!(orders.title.as_deref(), Some("BCs imputés — Maintenance"));

        console.set_line_filter(Some(3), "acme").await.unwrap();
        let sent = transport.calls(Method::Get, "/lignes");
        assert_eq!(sent[1].query, vec![("budget_id".to_string(), "3".to_string())]);

        let tables = sink.tables(View::BudgetLines);
        let listing = tables.iter().rev().find(|t| t.title.is_none()).unwrap();
        assert_eq!(listing.rows.len(), 1);
        assert!(listing.rows[0].selected);
        assert_eq!(transport.calls(Method::Get, "/ligne/6/bcs").len(), 2);
    }

    #[tokio::test]
    async fn test_save_line_validations() {
        let (mut console, transport, sink, _) = signed_in("gestionnaire");
        let input = BudgetLineInput {
            libelle: "X".to_string(),
            ..Default::default()
        };
        assert!(console.save_line(None, input).await.is_err());
        assert_eq!(sink.last_banner().unwrap().text, "Sélectionnez un budget");

        let input = BudgetLineInput {
            budget_id: Some(1),
            ..Default::default()
        };
        assert!(console.save_line(None, input).await.is_err());
        assert_eq!(sink.last_banner().unwrap().text, "Le libellé est obligatoire");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_edit_line_uses_bound_controls() {
        let (mut console, transport, _, _) = signed_in("gestionnaire");
        transport.respond(Method::Get, "/referentiels", 200, references());
        transport.respond(
            Method::Get,
            "/lignes",
            200,
            json!({"list": [{"id": 5, "budget_id": 1, "libelle": "Licences", "fournisseur_id": 2, "application_id": 99}]}),
        );
        transport.respond(Method::Put, "/ligne/5", 200, json!({"success": true}));
        transport.respond(Method::Get, "/budget", 200, json!({"details": []}));
        console.refresh_references().await;
        console.load_lines().await.unwrap();

        let input = console.open_line_editor(Some(5)).unwrap();
        assert_eq!(input.fournisseur_id, Some(2));
        console.select(crate::cache::Selector::EditLineSupplier, Some(1)).unwrap();
        console.save_line(Some(5), input).await.unwrap();

        let body = transport.calls(Method::Put, "/ligne/5")[0].body.clone().unwrap();
        assert_eq!(body["fournisseur_id"], json!(1));
        assert_eq!(body["application_id"], json!(null));
        assert!(!console.modals().is_open(Modal::EditBudgetLine));
        assert_eq!(transport.calls(Method::Get, "/referentiels").len(), 2);
    }
}
