use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// `401`: the credential is gone or expired. The gateway has already
    /// cleared the session and shown the login gate.
    #[error("Session expirée, veuillez vous reconnecter")]
    Authentication,

    /// `403`: the session stays valid but lacks the rights.
    #[error("Accès interdit — droits insuffisants")]
    Authorization,

    /// Any other non-2xx answer. `message` is the server's `error` field when
    /// it sent one, `HTTP <status>` otherwise.
    #[error("{message}")]
    Request { status: u16, message: String },

    #[error("Erreur réseau: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Réponse invalide: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Server-provided `error` field of a JSON body, if any.
    pub(crate) fn server_message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.trim().is_empty())
    }

    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => ApiError::Authentication,
            403 => ApiError::Authorization,
            _ => ApiError::Request {
                status,
                message: Self::server_message(body)
                    .map(|m| Self::truncate_body(&m))
                    .unwrap_or_else(|| format!("HTTP {}", status)),
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Authentication => Some(401),
            ApiError::Authorization => Some(403),
            ApiError::Request { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            ApiError::InvalidResponse(_) => None,
        }
    }
}
