//! Console state and wiring.
//!
//! `Console` owns the session, the gateway, every client-side cache and the
//! presentation state (modals, selection slots, filters). View controllers
//! live in `crate::views` as further `impl Console` blocks; this module holds
//! startup, login/logout, navigation and the shared reporting helpers.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, HttpTransport, Transport};
use crate::auth::{FileTokenStore, KeyringTokenStore, SessionHolder, SharedSession, TokenStore};
use crate::cache::{EntityCaches, ReferenceCache, Selector};
use crate::config::{Config, TokenBackend};
use crate::error::ConsoleError;
use crate::models::{
    ContactFilter, MutationOutcome, PurchaseOrderFilter, ReferenceSnapshot, TaskFilter,
    UserDescriptor,
};
use crate::ui::{LoginGate, Modal, ModalStack, Notifier, PresentationSink, SelectionSlots};
use crate::views::purchase_order::OrderDraft;

// ============================================================================
// Constants
// ============================================================================

/// Shown when the login form is submitted with an empty field.
const CREDENTIALS_REQUIRED: &str = "Identifiant et mot de passe requis";

// ============================================================================
// Navigation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Dashboard,
    Budgets,
    BudgetLines,
    PurchaseOrders,
    Contracts,
    Projects,
    Tasks,
    Kanban,
    Suppliers,
    Contacts,
    Services,
    Workload,
    Notifications,
    Admin,
}

impl View {
    pub const ALL: [View; 14] = [
        View::Dashboard,
        View::Budgets,
        View::BudgetLines,
        View::PurchaseOrders,
        View::Contracts,
        View::Projects,
        View::Tasks,
        View::Kanban,
        View::Suppliers,
        View::Contacts,
        View::Services,
        View::Workload,
        View::Notifications,
        View::Admin,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            View::Dashboard => "Tableau de bord",
            View::Budgets => "Budgets",
            View::BudgetLines => "Lignes budgétaires",
            View::PurchaseOrders => "Bons de commande",
            View::Contracts => "Contrats",
            View::Projects => "Projets",
            View::Tasks => "Tâches",
            View::Kanban => "Kanban",
            View::Suppliers => "Fournisseurs",
            View::Contacts => "Contacts",
            View::Services => "Services",
            View::Workload => "Charge / ETP",
            View::Notifications => "Notifications",
            View::Admin => "Administration",
        }
    }

    /// Only shown to administrators.
    pub fn requires_admin(&self) -> bool {
        matches!(self, View::Admin)
    }
}

/// Filter bars of the list views.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    pub orders: PurchaseOrderFilter,
    pub tasks: TaskFilter,
    pub contacts: ContactFilter,
    pub line_budget: Option<i64>,
    pub line_search: String,
    pub kanban_project: Option<i64>,
}

// ============================================================================
// Console
// ============================================================================

pub struct Console {
    pub(crate) config: Config,
    pub(crate) api: ApiClient,
    pub(crate) session: SharedSession,
    pub(crate) sink: Arc<dyn PresentationSink>,
    pub(crate) notifier: Notifier,
    pub(crate) references: ReferenceCache,
    pub(crate) caches: EntityCaches,
    pub(crate) selection: SelectionSlots,
    pub(crate) modals: ModalStack,
    pub(crate) filters: Filters,
    pub(crate) order_draft: Option<OrderDraft>,
    current_view: View,
}

impl Console {
    pub fn new<S>(
        config: Config,
        store: Box<dyn TokenStore>,
        transport: Arc<dyn Transport>,
        sink: Arc<S>,
    ) -> Self
    where
        S: PresentationSink + 'static,
    {
        let gate: Arc<dyn LoginGate> = sink.clone();
        let sink: Arc<dyn PresentationSink> = sink;
        let session = SharedSession::new(SessionHolder::new(store));
        let api = ApiClient::new(transport, session.clone(), gate);
        let notifier = Notifier::new(config.banner_duration());

        Self {
            config,
            api,
            session,
            sink,
            notifier,
            references: ReferenceCache::default(),
            caches: EntityCaches::default(),
            selection: SelectionSlots::default(),
            modals: ModalStack::default(),
            filters: Filters::default(),
            order_draft: None,
            current_view: View::Dashboard,
        }
    }

    /// Production wiring: reqwest transport and the configured token store.
    pub fn connect<S>(config: Config, sink: Arc<S>) -> Result<Self>
    where
        S: PresentationSink + 'static,
    {
        let transport = HttpTransport::new(config.api_root(), config.request_timeout())
            .context("Failed to build HTTP client")?;
        let store: Box<dyn TokenStore> = match config.token_backend {
            TokenBackend::File => Box::new(FileTokenStore::new(&config.cache_dir()?)),
            TokenBackend::Keyring => Box::new(KeyringTokenStore),
        };
        debug!(api_root = %config.api_root(), backend = ?config.token_backend, "Console wired");
        Ok(Self::new(config, store, Arc::new(transport), sink))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn current_view(&self) -> View {
        self.current_view
    }

    pub fn user(&self) -> Option<UserDescriptor> {
        self.session.user()
    }

    pub fn is_admin(&self) -> bool {
        self.user().map(|u| u.is_admin()).unwrap_or(false)
    }

    pub fn references(&self) -> &ReferenceSnapshot {
        self.references.snapshot()
    }

    pub fn reference_cache(&self) -> &ReferenceCache {
        &self.references
    }

    pub fn caches(&self) -> &EntityCaches {
        &self.caches
    }

    pub fn selection(&self) -> &SelectionSlots {
        &self.selection
    }

    pub fn modals(&self) -> &ModalStack {
        &self.modals
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Startup check. A stored, unexpired credential unlocks the console and
    /// loads references, dashboard and notifications; anything else purges
    /// the credential and shows the login gate.
    pub async fn startup(&mut self, now: DateTime<Utc>) -> bool {
        let claims = self.session.with(|s| s.restore(now));
        match claims {
            Some(claims) => {
                let user = claims.user();
                self.unlock(&user).await;
                true
            }
            None => {
                self.sink.show_login_gate();
                false
            }
        }
    }

    pub async fn login(&mut self, login: &str, password: &str) -> Result<UserDescriptor, ConsoleError> {
        let login = login.trim();
        if login.is_empty() || password.is_empty() {
            return self.fail(ConsoleError::validation(CREDENTIALS_REQUIRED));
        }

        let response = match self.api.login(login, password).await {
            Ok(response) => response,
            Err(e) => return self.fail(e.into()),
        };

        let user = response.user;
        let token = response.token;
        self.session.with(|s| {
            if let Err(e) = s.set(&token) {
                warn!(error = %e, "Failed to persist credential, session lasts until exit");
            }
            s.set_user(user.clone());
        });
        self.config.last_login = Some(login.to_string());
        self.unlock(&user).await;
        Ok(user)
    }

    pub fn logout(&mut self) {
        info!("Logging out");
        self.session.clear();
        self.references = ReferenceCache::default();
        self.caches = EntityCaches::default();
        self.selection = SelectionSlots::default();
        self.modals = ModalStack::default();
        self.order_draft = None;
        self.sink.show_login_gate();
    }

    pub fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
        self.session.with(|s| s.is_valid_at(now))
    }

    async fn unlock(&mut self, user: &UserDescriptor) {
        self.session.with(|s| s.set_user(user.clone()));
        self.sink.hide_login_gate();
        self.sink.apply_user(user);
        self.refresh_references().await;
        if let Err(e) = self.show_view(View::Dashboard).await {
            debug!(error = %e, "Dashboard unavailable after unlock");
        }
        self.load_notifications().await;
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Switch to `view` and run its loader.
    pub async fn show_view(&mut self, view: View) -> Result<(), ConsoleError> {
        if view.requires_admin() && !self.is_admin() {
            return self.fail(ConsoleError::AdminOnly);
        }
        self.current_view = view;
        self.sink.show_view(view);
        match view {
            View::Dashboard => self.load_dashboard().await,
            View::Budgets => self.load_budgets().await,
            View::BudgetLines => self.load_lines().await,
            View::PurchaseOrders => self.load_orders().await,
            View::Contracts => self.load_contracts().await,
            View::Projects => self.load_projects().await,
            View::Tasks => self.load_tasks().await,
            View::Kanban => self.load_kanban().await,
            View::Suppliers => self.load_suppliers().await,
            View::Contacts => self.load_contacts().await,
            View::Services => self.load_services().await,
            View::Workload => self.load_workload().await,
            View::Notifications => {
                self.load_notifications().await;
                Ok(())
            }
            View::Admin => self.load_users().await,
        }
    }

    /// Reload whatever view is on screen.
    pub async fn reload(&mut self) -> Result<(), ConsoleError> {
        self.show_view(self.current_view).await
    }

    // =========================================================================
    // References
    // =========================================================================

    /// Refresh the lookup snapshot and repopulate every bound control.
    /// Failures are logged and leave the previous snapshot in place.
    pub async fn refresh_references(&mut self) -> bool {
        match self.references.refresh(&self.api).await {
            Ok(()) => {
                for state in self.references.selectors().states() {
                    self.sink.populate_selector(state);
                }
                true
            }
            Err(e) => {
                warn!(error = %e, "Reference refresh failed, keeping previous snapshot");
                false
            }
        }
    }

    /// Pick an option in a bound control. Ids outside the current options
    /// are refused.
    pub fn select(&mut self, selector: Selector, id: Option<i64>) -> Result<(), ConsoleError> {
        match selector {
            Selector::AllocationLine => self.select_allocation_line(id),
            Selector::EditOrderLine => self.select_order_line(id),
            _ => {
                let result = self.references.selectors_mut().select(selector, id);
                self.push_selector(selector);
                result
            }
        }
    }

    /// Set a control from a stored foreign key; unknown ids fall back to the
    /// empty option.
    pub(crate) fn preselect(&mut self, selector: Selector, id: Option<i64>) {
        let board = self.references.selectors_mut();
        if board.select(selector, id).is_err() {
            debug!(selector = selector.key(), ?id, "Stored key not in references, clearing");
            let _ = board.select(selector, None);
        }
        self.push_selector(selector);
    }

    pub(crate) fn push_selector(&self, selector: Selector) {
        if let Some(state) = self.references.selectors().get(selector) {
            self.sink.populate_selector(state);
        }
    }

    pub(crate) fn selected(&self, selector: Selector) -> Option<i64> {
        self.references.selectors().selected(selector)
    }

    // =========================================================================
    // Modals
    // =========================================================================

    pub(crate) fn open_modal(&mut self, modal: Modal) {
        self.modals.open(modal);
        self.sink.modal_changed(modal, true);
    }

    /// Close button of a dialog.
    pub fn close_modal(&mut self, modal: Modal) {
        if self.modals.close(modal) {
            self.after_close(modal);
        }
    }

    /// Click on the overlay: close the topmost dialog.
    pub fn close_topmost_modal(&mut self) -> Option<Modal> {
        let modal = self.modals.close_topmost()?;
        self.after_close(modal);
        Some(modal)
    }

    fn after_close(&mut self, modal: Modal) {
        self.selection.on_modal_closed(modal);
        if modal == Modal::AllocateOrder {
            self.sink
                .render_readout(crate::ui::Readout::AllocationLine, None);
        }
        if modal == Modal::EditOrder {
            self.order_draft = None;
        }
        self.sink.modal_changed(modal, false);
    }

    // =========================================================================
    // Reporting
    // =========================================================================

    pub(crate) fn notify_success(&self, text: impl Into<String>) {
        self.sink.banner(&self.notifier.success(text));
    }

    /// Report an error as a banner and return it.
    pub(crate) fn fail<T>(&self, err: ConsoleError) -> Result<T, ConsoleError> {
        self.sink.banner(&self.notifier.error(err.to_string()));
        Err(err)
    }

    /// Turn a gateway mutation result into a console result, with a banner
    /// either way.
    pub(crate) fn settle(
        &self,
        outcome: Result<MutationOutcome, ApiError>,
        success: &str,
    ) -> Result<MutationOutcome, ConsoleError> {
        match outcome.map_err(ConsoleError::from).and_then(MutationOutcome::into_result) {
            Ok(outcome) => {
                self.notify_success(success);
                Ok(outcome)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Reload that follows an accepted mutation. A failure is already on the
    /// banner and does not turn the mutation into an error.
    pub(crate) fn reloaded(&self, reload: Result<(), ConsoleError>) -> Result<(), ConsoleError> {
        if let Err(e) = reload {
            warn!(error = %e, "Reload after mutation failed");
        }
        Ok(())
    }

    /// A list load failed: generic banner, error returned to the caller.
    pub(crate) fn load_failed<T>(&self, what: &str, err: ApiError) -> Result<T, ConsoleError> {
        warn!(view = what, error = %err, "Load failed");
        let err = ConsoleError::from(err);
        let text = match err.kind() {
            crate::error::ErrorKind::Authentication | crate::error::ErrorKind::Authorization => {
                err.to_string()
            }
            _ => format!("Erreur chargement {}", what),
        };
        self.sink.banner(&self.notifier.error(text));
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::auth::session::make_token;
    use crate::auth::TOKEN_KEY;
    use crate::testing::{console_with, SinkEvent};
    use serde_json::json;

    fn valid_token(role: &str) -> String {
        let exp = (Utc::now() + chrono::Duration::hours(1)).timestamp();
        make_token(&json!({"nom": "Dupont", "prenom": "Marie", "role": role, "exp": exp}))
    }

    #[tokio::test]
    async fn test_startup_with_valid_token_unlocks() {
        let (mut console, transport, sink, store) = console_with(Some(&valid_token("admin")));
        transport.respond(Method::Get, "/referentiels", 200, json!({"fournisseurs": [{"id": 1, "nom": "Acme"}]}));
        transport.respond(Method::Get, "/dashboard", 200, json!({"kpi_projets": 3}));
        transport.respond(Method::Get, "/notifications", 200, json!({"list": [], "non_lues": 2}));

        assert!(console.startup(Utc::now()).await);
        assert!(store.peek(TOKEN_KEY).is_some());
        assert_eq!(sink.count(|e| matches!(e, SinkEvent::HideLoginGate)), 1);
        assert!(console.is_admin());
        assert_eq!(console.references().fournisseurs.len(), 1);
        assert_eq!(sink.count(|e| matches!(e, SinkEvent::Badge(2))), 1);
    }

    #[tokio::test]
    async fn test_startup_with_expired_token_shows_gate() {
        let exp = (Utc::now() - chrono::Duration::minutes(5)).timestamp();
        let token = make_token(&json!({"role": "lecteur", "exp": exp}));
        let (mut console, transport, sink, store) = console_with(Some(&token));

        assert!(!console.startup(Utc::now()).await);
        assert!(store.peek(TOKEN_KEY).is_none());
        assert_eq!(sink.count(|e| matches!(e, SinkEvent::LoginGate)), 1);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let (mut console, transport, sink, _) = console_with(None);
        let err = console.login("  ", "secret").await.unwrap_err();
        assert_eq!(err.to_string(), CREDENTIALS_REQUIRED);
        assert!(transport.requests().is_empty());
        assert_eq!(sink.last_banner().unwrap().text, CREDENTIALS_REQUIRED);
    }

    #[tokio::test]
    async fn test_login_stores_token_and_applies_user() {
        let (mut console, transport, sink, store) = console_with(None);
        transport.respond(
            Method::Post,
            "/auth/login",
            200,
            json!({"token": "t.o.k", "user": {"nom": "Durand", "role": "gestionnaire"}}),
        );

        let user = console.login("pdurand", "pw").await.unwrap();
        assert_eq!(user.role, "gestionnaire");
        assert_eq!(store.peek(TOKEN_KEY).as_deref(), Some("t.o.k"));
        assert_eq!(console.config().last_login.as_deref(), Some("pdurand"));
        assert_eq!(sink.count(|e| matches!(e, SinkEvent::User(_))), 1);
        assert!(!console.is_admin());
    }

    #[tokio::test]
    async fn test_admin_view_is_gated() {
        let (mut console, transport, _, _) = console_with(Some(&valid_token("lecteur")));
        console.session.with(|s| s.restore(Utc::now()));

        let err = console.show_view(View::Admin).await.unwrap_err();
        assert!(matches!(err, ConsoleError::AdminOnly));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let (mut console, transport, sink, store) = console_with(Some(&valid_token("admin")));
        transport.respond(Method::Get, "/referentiels", 200, json!({"projets": [{"id": 1, "nom": "P"}]}));
        console.refresh_references().await;

        console.logout();
        assert!(store.peek(TOKEN_KEY).is_none());
        assert!(console.references().is_empty());
        assert!(console.user().is_none());
        assert_eq!(sink.count(|e| matches!(e, SinkEvent::LoginGate)), 1);
    }

    #[tokio::test]
    async fn test_unauthorized_from_any_view_clears_session() {
        for (view, path) in [
            (View::Contracts, "/contrat"),
            (View::Projects, "/projet"),
            (View::Suppliers, "/fournisseur"),
        ] {
            let (mut console, transport, sink, store) = console_with(Some(&valid_token("admin")));
            transport.respond(Method::Get, path, 401, json!({}));

            let err = console.show_view(view).await.unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::Authentication);
            assert!(store.peek(TOKEN_KEY).is_none());
            assert_eq!(sink.count(|e| matches!(e, SinkEvent::LoginGate)), 1);
        }
    }

    #[tokio::test]
    async fn test_reference_failure_keeps_previous_snapshot() {
        let (mut console, transport, _, _) = console_with(Some(&valid_token("admin")));
        transport.respond(Method::Get, "/referentiels", 200, json!({"projets": [{"id": 1, "nom": "P"}]}));
        assert!(console.refresh_references().await);

        transport.respond(Method::Get, "/referentiels", 500, json!({"error": "db down"}));
        assert!(!console.refresh_references().await);
        assert_eq!(console.references().projets.len(), 1);
    }

    #[tokio::test]
    async fn test_overlay_click_closes_topmost() {
        let (mut console, _, sink, _) = console_with(None);
        console.open_modal(Modal::EditOrder);
        console.open_modal(Modal::AllocateOrder);

        assert_eq!(console.close_topmost_modal(), Some(Modal::AllocateOrder));
        assert!(console.modals().is_open(Modal::EditOrder));
        assert_eq!(
            sink.count(|e| matches!(e, SinkEvent::Modal(Modal::AllocateOrder, false))),
            1
        );
    }
}
