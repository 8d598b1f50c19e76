//! Test doubles: a scripted transport and a recording presentation sink.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use crate::api::{ApiError, ApiRequest, ApiResponse, Method, Transport};
use crate::app::{Console, View};
use crate::auth::session::make_token;
use crate::auth::MemoryTokenStore;
use crate::cache::SelectorState;
use crate::config::Config;
use crate::models::{KanbanBoard, UserDescriptor};
use crate::ui::{Banner, Kpi, LoginGate, Modal, PresentationSink, Readout, Table};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Transport
// ============================================================================

/// Answers requests from a per-(method, path) script. The last scripted
/// response for a key is sticky; unscripted calls answer 404.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<HashMap<(Method, String), VecDeque<ApiResponse>>>,
    sent: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever was scripted for this key.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.respond_raw(method, path, status, &body.to_string());
    }

    pub fn respond_raw(&self, method: Method, path: &str, status: u16, body: &str) {
        let mut queue = VecDeque::new();
        queue.push_back(ApiResponse {
            status,
            body: body.to_string(),
        });
        lock(&self.script).insert((method, path.to_string()), queue);
    }

    /// Queue a further response after the ones already scripted.
    pub fn enqueue(&self, method: Method, path: &str, status: u16, body: Value) {
        lock(&self.script)
            .entry((method, path.to_string()))
            .or_default()
            .push_back(ApiResponse {
                status,
                body: body.to_string(),
            });
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        lock(&self.sent).clone()
    }

    pub fn calls(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let key = (request.method, request.path.clone());
        lock(&self.sent).push(request);

        let mut script = lock(&self.script);
        let response = match script.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or_else(|| ApiResponse {
            status: 404,
            body: json!({"error": "not scripted"}).to_string(),
        }))
    }
}

// ============================================================================
// Sink
// ============================================================================

#[derive(Debug, Clone)]
pub(crate) enum SinkEvent {
    LoginGate,
    HideLoginGate,
    User(UserDescriptor),
    View(View),
    Banner(Banner),
    Selector(SelectorState),
    Table(Table),
    Kpis(View, Vec<Kpi>),
    Kanban(KanbanBoard),
    Readout(Readout, Option<String>),
    Modal(Modal, bool),
    Badge(u64),
}

#[derive(Default)]
pub(crate) struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    fn push(&self, event: SinkEvent) {
        lock(&self.events).push(event);
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        lock(&self.events).clone()
    }

    pub fn count(&self, pred: impl Fn(&SinkEvent) -> bool) -> usize {
        lock(&self.events).iter().filter(|e| pred(e)).count()
    }

    pub fn last_banner(&self) -> Option<Banner> {
        lock(&self.events).iter().rev().find_map(|e| match e {
            SinkEvent::Banner(b) => Some(b.clone()),
            _ => None,
        })
    }

    pub fn tables(&self, view: View) -> Vec<Table> {
        lock(&self.events)
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Table(t) if t.view == view => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_kpis(&self, view: View) -> Option<Vec<Kpi>> {
        lock(&self.events).iter().rev().find_map(|e| match e {
            SinkEvent::Kpis(v, kpis) if *v == view => Some(kpis.clone()),
            _ => None,
        })
    }

    pub fn last_readout(&self, readout: Readout) -> Option<Option<String>> {
        lock(&self.events).iter().rev().find_map(|e| match e {
            SinkEvent::Readout(r, text) if *r == readout => Some(text.clone()),
            _ => None,
        })
    }
}

impl LoginGate for RecordingSink {
    fn show_login_gate(&self) {
        self.push(SinkEvent::LoginGate);
    }
}

impl PresentationSink for RecordingSink {
    fn hide_login_gate(&self) {
        self.push(SinkEvent::HideLoginGate);
    }

    fn apply_user(&self, user: &UserDescriptor) {
        self.push(SinkEvent::User(user.clone()));
    }

    fn show_view(&self, view: View) {
        self.push(SinkEvent::View(view));
    }

    fn banner(&self, banner: &Banner) {
        self.push(SinkEvent::Banner(banner.clone()));
    }

    fn populate_selector(&self, state: &SelectorState) {
        self.push(SinkEvent::Selector(state.clone()));
    }

    fn render_table(&self, table: &Table) {
        self.push(SinkEvent::Table(table.clone()));
    }

    fn render_kpis(&self, view: View, kpis: &[Kpi]) {
        self.push(SinkEvent::Kpis(view, kpis.to_vec()));
    }

    fn render_kanban(&self, board: &KanbanBoard) {
        self.push(SinkEvent::Kanban(board.clone()));
    }

    fn render_readout(&self, readout: Readout, text: Option<&str>) {
        self.push(SinkEvent::Readout(readout, text.map(str::to_string)));
    }

    fn modal_changed(&self, modal: Modal, open: bool) {
        self.push(SinkEvent::Modal(modal, open));
    }

    fn set_notification_badge(&self, unread: u64) {
        self.push(SinkEvent::Badge(unread));
    }
}

// ============================================================================
// Console fixtures
// ============================================================================

pub(crate) type Fixture = (
    Console,
    Arc<ScriptedTransport>,
    Arc<RecordingSink>,
    MemoryTokenStore,
);

/// Console over the test doubles. The stored token, if any, is not restored.
pub(crate) fn console_with(token: Option<&str>) -> Fixture {
    let store = match token {
        Some(token) => MemoryTokenStore::with_token(token),
        None => MemoryTokenStore::new(),
    };
    let transport = Arc::new(ScriptedTransport::new());
    let sink = Arc::new(RecordingSink::default());
    let console = Console::new(
        Config::default(),
        Box::new(store.clone()),
        transport.clone(),
        sink.clone(),
    );
    (console, transport, sink, store)
}

/// Console with a restored, unexpired session for `role`.
pub(crate) fn signed_in(role: &str) -> Fixture {
    let exp = (Utc::now() + Duration::hours(1)).timestamp();
    let token = make_token(&json!({
        "login": "mdupont", "nom": "Dupont", "prenom": "Marie", "role": role, "exp": exp
    }));
    let fixture = console_with(Some(&token));
    fixture.0.session.with(|s| s.restore(Utc::now()));
    fixture
}

/// Reference payload shared by controller tests.
pub(crate) fn references() -> Value {
    json!({
        "fournisseurs": [{"id": 1, "nom": "Acme"}, {"id": 2, "nom": "Globex"}],
        "entites": [{"id": 10, "code": "DSI", "nom": "Direction SI"}],
        "projets": [{"id": 20, "code": "P1", "nom": "Refonte"}],
        "lignes": [
            {"id": 5, "libelle": "Licences", "montant_vote": 1000, "montant_engage": 250, "montant_solde": 750},
            {"id": 6, "libelle": "Maintenance", "montant_vote": 500, "montant_engage": 0, "montant_solde": 500}
        ],
        "applications": [{"id": 30, "nom": "Messagerie"}],
        "contrats": [{"id": 7, "numero_contrat": "C-01", "objet": "Support"}],
        "services": [{"id": 40, "code": "SI", "nom": "Service info"}]
    })
}
