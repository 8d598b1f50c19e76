//! Purchase orders: listing with stats, validation, allocation to a budget
//! line, and the edit dialog with its live TTC preview.
//!
//! Allocation and edits change the committed/balance figures of budget lines
//! server side. The console never recomputes those figures: on success it
//! reloads the order list and refreshes the reference snapshot.

use serde_json::json;
use tracing::debug;

use crate::api::Resource;
use crate::app::{Console, View};
use crate::cache::Selector;
use crate::error::ConsoleError;
use crate::models::{
    compute_ttc, AllocationRequest, ListResponse, MutationOutcome, PurchaseOrder,
    PurchaseOrderFilter, PurchaseOrderInput, PurchaseOrderStats,
};
use crate::ui::{Kpi, Modal, Readout, Row, Table};
use crate::utils::{format_amount, format_amount_value, or_placeholder, PLACEHOLDER};

const STATS_PATH: &str = "/bon_commande/stats";

/// Form state of the order edit dialog. Foreign keys live in the dialog's
/// bound controls, not here.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub id: i64,
    pub input: PurchaseOrderInput,
    pub vat_rate: f64,
}

impl OrderDraft {
    pub fn ttc(&self) -> f64 {
        compute_ttc(self.input.montant_ht, self.vat_rate)
    }
}

fn ttc_display(ttc: f64) -> String {
    format!("{} €", format_amount_value(ttc))
}

fn orders_path() -> String {
    format!("/{}", PurchaseOrder::COLLECTION)
}

fn order_path(id: i64, action: &str) -> String {
    format!("/{}/{}/{}", PurchaseOrder::COLLECTION, id, action)
}

impl Console {
    // =========================================================================
    // Listing
    // =========================================================================

    /// Fetch the filtered list and the status stats together; render only
    /// when both arrive.
    pub async fn load_orders(&mut self) -> Result<(), ConsoleError> {
        let path = orders_path();
        let query = self.filters.orders.query();
        let api = self.api.clone();
        let fetched = tokio::try_join!(
            api.get_with_query::<ListResponse<PurchaseOrder>>(&path, query),
            api.get::<PurchaseOrderStats>(STATS_PATH),
        );
        let (list, stats) = match fetched {
            Ok(pair) => pair,
            Err(e) => return self.load_failed("BC", e),
        };
        self.caches.purchase_orders.replace(list.list);

        let total = stats.total();
        let mut kpis = vec![Kpi::new("Total", total.count.to_string())];
        kpis.extend(
            stats
                .summary()
                .into_iter()
                .map(|(status, count)| Kpi::new(status, count.to_string())),
        );
        kpis.push(Kpi::new(
            "Montant total",
            format!("{} €", format_amount_value(total.total.unwrap_or(0.0))),
        ));
        self.sink.render_kpis(View::PurchaseOrders, &kpis);

        let rows = self
            .filters
            .orders
            .apply(self.caches.purchase_orders.items())
            .iter()
            .map(|o| {
                let mut actions = vec!["Fiche", "Modifier"];
                actions.extend(o.available_actions().iter().map(|a| a.label()));
                Row::new(
                    o.id,
                    vec![
                        o.id.to_string(),
                        or_placeholder(o.numero_bc.as_deref()),
                        or_placeholder(o.objet.as_deref()),
                        or_placeholder(o.fournisseur_nom.as_deref()),
                        or_placeholder(o.entite_code.as_deref()),
                        format_amount(o.montant_ht),
                        format_amount(o.montant_ttc),
                        or_placeholder(o.statut.as_deref()),
                    ],
                )
                .with_actions(actions)
            })
            .collect();
        self.sink.render_table(&Table::new(
            View::PurchaseOrders,
            vec!["ID", "N° BC", "Objet", "Fournisseur", "Entité", "HT", "TTC", "Statut"],
            rows,
        ));
        Ok(())
    }

    pub async fn set_order_filter(&mut self, filter: PurchaseOrderFilter) -> Result<(), ConsoleError> {
        self.preselect(Selector::OrderEntityFilter, filter.entite_id);
        self.filters.orders = filter;
        self.load_orders().await
    }

    /// Full record for the order sheet.
    pub async fn order_sheet(&mut self, id: i64) -> Result<PurchaseOrder, ConsoleError> {
        self.fetch_order(id, "fiche BC").await
    }

    async fn fetch_order(&self, id: i64, what: &str) -> Result<PurchaseOrder, ConsoleError> {
        let path = format!("{}/{}", orders_path(), id);
        match self.api.get(&path).await {
            Ok(order) => Ok(order),
            Err(e) => self.load_failed(what, e),
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub async fn create_order(
        &mut self,
        mut input: PurchaseOrderInput,
        vat_rate: f64,
    ) -> Result<(), ConsoleError> {
        self.require(&input.numero_bc, "Le N° BC est obligatoire")?;
        self.require(&input.objet, "L'objet est obligatoire")?;
        input.fournisseur_id = self.or_selected(input.fournisseur_id, Selector::OrderSupplier);
        input.entite_id = self.or_selected(input.entite_id, Selector::OrderEntity);
        input.ligne_budgetaire_id = self.or_selected(input.ligne_budgetaire_id, Selector::OrderLine);
        input.set_amounts(input.montant_ht, vat_rate);

        let outcome = self.api.create::<PurchaseOrder, _>(&input).await;
        self.settle(outcome, "BC ajouté")?;
        let reload = self.load_orders().await;
        self.reloaded(reload)
    }

    /// Move an order to its next status; the banner reports the new one.
    pub async fn validate_order(&mut self, id: i64) -> Result<(), ConsoleError> {
        let result = self
            .api
            .post(&order_path(id, "valider"), &json!({}))
            .await
            .map_err(ConsoleError::from)
            .and_then(MutationOutcome::into_result);
        match result {
            Ok(outcome) => {
                let status = outcome.statut.as_deref().unwrap_or(PLACEHOLDER);
                self.notify_success(format!("BC → {}", status));
            }
            Err(e) => return self.fail(e),
        }
        let reload = self.load_orders().await;
        self.reloaded(reload)
    }

    pub async fn delete_order(&mut self, id: i64) -> Result<(), ConsoleError> {
        let outcome = self.api.remove::<PurchaseOrder>(id).await;
        self.settle(outcome, "BC supprimé")?;
        let reload = self.load_orders().await;
        self.reloaded(reload)
    }

    // =========================================================================
    // Allocation ("imputer")
    // =========================================================================

    pub fn open_allocation(&mut self, id: i64) -> Result<(), ConsoleError> {
        if let Err(e) = self.caches.purchase_orders.find(id) {
            return self.fail(e);
        }
        self.selection.order_to_allocate = Some(id);
        self.selection.allocation_readout = None;
        self.preselect(Selector::AllocationLine, None);
        self.sink.render_readout(Readout::AllocationLine, None);
        self.open_modal(Modal::AllocateOrder);
        Ok(())
    }

    /// Pick the target line; its figures are read from the current snapshot.
    /// An id the snapshot does not know clears the choice and the readout.
    pub fn select_allocation_line(&mut self, id: Option<i64>) -> Result<(), ConsoleError> {
        let result = self
            .references
            .selectors_mut()
            .select(Selector::AllocationLine, id);
        if result.is_err() {
            let _ = self
                .references
                .selectors_mut()
                .select(Selector::AllocationLine, None);
        }
        self.push_selector(Selector::AllocationLine);

        let readout = self
            .selected(Selector::AllocationLine)
            .and_then(|line| self.references().budget_line(line))
            .map(|line| line.readout());
        self.sink
            .render_readout(Readout::AllocationLine, readout.as_deref());
        self.selection.allocation_readout = readout;
        result
    }

    pub async fn confirm_allocation(&mut self) -> Result<(), ConsoleError> {
        let Some(order) = self.selection.order_to_allocate else {
            return self.fail(ConsoleError::validation("Aucun BC sélectionné"));
        };
        let Some(line) = self.selected(Selector::AllocationLine) else {
            return self.fail(ConsoleError::validation("Sélectionnez une ligne budgétaire"));
        };

        let outcome = self
            .api
            .post(&order_path(order, "imputer"), &AllocationRequest { ligne_id: line })
            .await;
        self.settle(outcome, "BC imputé sur la ligne budgétaire")?;
        debug!(order, line, "Order allocated, refreshing lists and references");
        self.selection.order_to_allocate = None;
        self.close_modal(Modal::AllocateOrder);
        let reload = self.load_orders().await;
        self.refresh_references().await;
        self.reloaded(reload)
    }

    // =========================================================================
    // Edit dialog
    // =========================================================================

    /// Fetch the listed order, derive its VAT rate and open the edit dialog
    /// with every bound control set from the stored keys.
    pub async fn edit_order(&mut self, id: i64) -> Result<OrderDraft, ConsoleError> {
        if let Err(e) = self.caches.purchase_orders.find(id) {
            return self.fail(e);
        }
        let order = self.fetch_order(id, "BC").await?;
        let draft = OrderDraft {
            id,
            input: PurchaseOrderInput::from(&order),
            vat_rate: order.vat_rate(),
        };

        self.preselect(Selector::EditOrderSupplier, order.fournisseur_id);
        self.preselect(Selector::EditOrderEntity, order.entite_id);
        self.preselect(Selector::EditOrderLine, order.ligne_budgetaire_id);
        self.preselect(Selector::EditOrderProject, order.projet_id);
        self.preselect(Selector::EditOrderContract, order.contrat_id);

        let line_info = match (order.ligne_budgetaire_id, order.ligne_libelle.as_deref()) {
            (Some(_), Some(label)) if !label.is_empty() => Some(format!("Ligne : {}", label)),
            _ => None,
        };
        self.sink
            .render_readout(Readout::OrderLine, line_info.as_deref());
        self.sink.render_readout(
            Readout::OrderTtc,
            Some(&ttc_display(order.montant_ttc.unwrap_or(0.0))),
        );

        self.order_draft = Some(draft.clone());
        self.open_modal(Modal::EditOrder);
        Ok(draft)
    }

    pub fn order_draft(&self) -> Option<&OrderDraft> {
        self.order_draft.as_ref()
    }

    /// Text fields of the open edit dialog.
    pub fn order_draft_mut(&mut self) -> Option<&mut OrderDraft> {
        self.order_draft.as_mut()
    }

    pub fn select_order_line(&mut self, id: Option<i64>) -> Result<(), ConsoleError> {
        let result = self
            .references
            .selectors_mut()
            .select(Selector::EditOrderLine, id);
        if result.is_err() {
            let _ = self
                .references
                .selectors_mut()
                .select(Selector::EditOrderLine, None);
        }
        self.push_selector(Selector::EditOrderLine);

        let readout = self
            .selected(Selector::EditOrderLine)
            .and_then(|line| self.references().budget_line(line))
            .map(|line| line.readout());
        self.sink.render_readout(Readout::OrderLine, readout.as_deref());
        result
    }

    /// Live TTC preview. Nothing is sent until the dialog is saved.
    pub fn set_order_amounts(&mut self, ht: f64, vat_rate: f64) -> Result<f64, ConsoleError> {
        let Some(draft) = self.order_draft.as_mut() else {
            return self.fail(ConsoleError::validation("Aucun BC en cours de modification"));
        };
        draft.vat_rate = vat_rate;
        draft.input.set_amounts(ht, vat_rate);
        let ttc = draft.input.montant_ttc;
        self.sink
            .render_readout(Readout::OrderTtc, Some(&ttc_display(ttc)));
        Ok(ttc)
    }

    pub async fn save_order(&mut self) -> Result<(), ConsoleError> {
        let Some(draft) = self.order_draft.clone() else {
            return self.fail(ConsoleError::validation("Aucun BC en cours de modification"));
        };
        let mut input = draft.input;
        self.require(&input.numero_bc, "Le N° BC est obligatoire")?;
        self.require(&input.objet, "L'objet est obligatoire")?;

        input.fournisseur_id = self.selected(Selector::EditOrderSupplier);
        input.entite_id = self.selected(Selector::EditOrderEntity);
        input.ligne_budgetaire_id = self.selected(Selector::EditOrderLine);
        input.projet_id = self.selected(Selector::EditOrderProject);
        input.contrat_id = self.selected(Selector::EditOrderContract);
        input.set_amounts(input.montant_ht, draft.vat_rate);

        let outcome = self.api.update::<PurchaseOrder, _>(draft.id, &input).await;
        self.settle(outcome, "BC mis à jour")?;
        self.close_modal(Modal::EditOrder);
        let reload = self.load_orders().await;
        self.refresh_references().await;
        self.reloaded(reload)
    }
}
