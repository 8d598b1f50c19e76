//! Gateway for every call to the procurement backend.
//!
//! `ApiClient` attaches the bearer credential, classifies failures and
//! decodes JSON bodies into typed records. It is the only place that reacts to
//! a `401` on its own: the credential is cleared and the login gate shown
//! before the error reaches the caller.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::auth::SharedSession;
use crate::models::{ListResponse, LoginRequest, LoginResponse, MutationOutcome};
use crate::ui::LoginGate;

use super::transport::{ApiRequest, Method, Transport};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

const LOGIN_PATH: &str = "/auth/login";

/// Shown when the login endpoint fails without an explanation.
const LOGIN_FAILED: &str = "Identifiants invalides";

/// A list/detail/mutation endpoint family under `/<COLLECTION>`.
pub trait Resource: DeserializeOwned + Send {
    /// Path segment of the collection, e.g. `projet`.
    const COLLECTION: &'static str;
    /// Human label used in banners and cache errors, e.g. `Projet`.
    const KIND: &'static str;

    fn id(&self) -> i64;
}

/// Clone is cheap: every field is reference counted.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: SharedSession,
    gate: Arc<dyn LoginGate>,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: SharedSession,
        gate: Arc<dyn LoginGate>,
    ) -> Self {
        Self {
            transport,
            session,
            gate,
        }
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    // ========================================================================
    // Core request path
    // ========================================================================

    /// Send a request with the current credential and decode the 2xx body.
    pub async fn request<T: DeserializeOwned>(&self, mut request: ApiRequest) -> Result<T, ApiError> {
        request.bearer = self.session.token();
        let method = request.method;
        let path = request.path.clone();

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            let err = ApiError::from_status(response.status, &response.body);
            if let ApiError::Authentication = err {
                info!(path = %path, "Session rejected by server, showing login gate");
                self.session.clear();
                self.gate.show_login_gate();
            } else {
                warn!(
                    method = %method,
                    path = %path,
                    status = response.status,
                    body = %ApiError::truncate_body(&response.body),
                    "Request failed"
                );
            }
            return Err(err);
        }

        debug!(method = %method, path = %path, status = response.status, "Request succeeded");
        Self::decode(&response.body)
    }

    fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
        let text = if body.trim().is_empty() { "null" } else { body };
        serde_json::from_str(text).map_err(|e| {
            ApiError::InvalidResponse(format!("{} ({})", e, ApiError::truncate_body(body)))
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(ApiRequest::new(Method::Get, path)).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        self.request(ApiRequest::new(Method::Get, path).with_query(query))
            .await
    }

    /// Mutating call. An empty or non-object 2xx body decodes as an outcome
    /// with nothing set.
    pub async fn mutate<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<MutationOutcome, ApiError> {
        let mut request = ApiRequest::new(method, path);
        if let Some(body) = body {
            let value = serde_json::to_value(body)
                .map_err(|e| ApiError::InvalidResponse(format!("Unserializable body: {}", e)))?;
            request = request.with_body(value);
        }
        let value: Value = self.request(request).await?;
        Ok(serde_json::from_value(value).unwrap_or_default())
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<MutationOutcome, ApiError> {
        self.mutate(Method::Post, path, Some(body)).await
    }

    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<MutationOutcome, ApiError> {
        self.mutate(Method::Put, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<MutationOutcome, ApiError> {
        self.mutate::<Value>(Method::Delete, path, None).await
    }

    // ========================================================================
    // Resource helpers
    // ========================================================================

    pub async fn list<R: Resource>(&self, query: Vec<(String, String)>) -> Result<Vec<R>, ApiError> {
        let path = format!("/{}", R::COLLECTION);
        let response: ListResponse<R> = self.get_with_query(&path, query).await?;
        debug!(collection = R::COLLECTION, count = response.list.len(), "Loaded list");
        Ok(response.list)
    }

    pub async fn create<R: Resource, B: Serialize>(&self, body: &B) -> Result<MutationOutcome, ApiError> {
        self.post(&format!("/{}", R::COLLECTION), body).await
    }

    pub async fn update<R: Resource, B: Serialize>(
        &self,
        id: i64,
        body: &B,
    ) -> Result<MutationOutcome, ApiError> {
        self.put(&format!("/{}/{}", R::COLLECTION, id), body).await
    }

    pub async fn remove<R: Resource>(&self, id: i64) -> Result<MutationOutcome, ApiError> {
        self.delete(&format!("/{}/{}", R::COLLECTION, id)).await
    }

    // ========================================================================
    // Login
    // ========================================================================

    /// Exchange credentials for a token. Bypasses the 401 handling: a refused
    /// login must not bounce the login gate.
    pub async fn login(&self, login: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = serde_json::to_value(LoginRequest {
            login: login.to_string(),
            password: password.to_string(),
        })
        .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        let request = ApiRequest::new(Method::Post, LOGIN_PATH).with_body(body);

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            let message = ApiError::server_message(&response.body)
                .unwrap_or_else(|| LOGIN_FAILED.to_string());
            error!(login = %login, status = response.status, "Login refused");
            return Err(ApiError::Request {
                status: response.status,
                message,
            });
        }

        let parsed: LoginResponse = Self::decode(&response.body)?;
        info!(login = %login, role = %parsed.user.role, "Login succeeded");
        Ok(parsed)
    }
}
