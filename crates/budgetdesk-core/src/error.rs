use thiserror::Error;

use crate::api::ApiError;

/// Generic message used when a mutation fails without a server explanation.
pub const GENERIC_FAILURE: &str = "Erreur";

/// Every failure a console action can surface to the user.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A required field is missing or invalid. Raised before any request is sent.
    #[error("{0}")]
    Validation(String),

    /// The server answered 2xx but refused the mutation (`success` not true).
    #[error("{0}")]
    Rejected(String),

    #[error("Données {kind} non chargées, rechargez la liste")]
    StaleCache { kind: &'static str, id: i64 },

    /// Client-side role gate (admin-only views).
    #[error("Accès réservé aux administrateurs")]
    AdminOnly,
}

/// Coarse classification used by front-ends to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authentication,
    Authorization,
    Validation,
    Request,
    StaleCache,
    Network,
}

impl ConsoleError {
    pub fn validation(message: impl Into<String>) -> Self {
        ConsoleError::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ConsoleError::Api(ApiError::Authentication) => ErrorKind::Authentication,
            ConsoleError::Api(ApiError::Authorization) | ConsoleError::AdminOnly => {
                ErrorKind::Authorization
            }
            ConsoleError::Api(ApiError::Network(_)) => ErrorKind::Network,
            ConsoleError::Api(_) | ConsoleError::Rejected(_) => ErrorKind::Request,
            ConsoleError::Validation(_) => ErrorKind::Validation,
            ConsoleError::StaleCache { .. } => ErrorKind::StaleCache,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            ConsoleError::from(ApiError::Authentication).kind(),
            ErrorKind::Authentication
        );
        assert_eq!(
            ConsoleError::from(ApiError::Authorization).kind(),
            ErrorKind::Authorization
        );
        assert_eq!(
            ConsoleError::from(ApiError::Request {
                status: 500,
                message: "boom".to_string()
            })
            .kind(),
            ErrorKind::Request
        );
        assert_eq!(ConsoleError::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(
            ConsoleError::StaleCache { kind: "contrat", id: 3 }.kind(),
            ErrorKind::StaleCache
        );
    }

    #[test]
    fn test_stale_cache_message_asks_for_reload() {
        let err = ConsoleError::StaleCache { kind: "contrat", id: 42 };
        assert!(err.to_string().contains("rechargez"));
    }
}
