//! REST gateway to the procurement backend.
//!
//! `ApiClient` wraps a `Transport` (reqwest in production, scripted in tests),
//! attaches the bearer credential from the shared session and turns non-2xx
//! answers into `ApiError`s. Entity endpoints share one shape, captured by the
//! `Resource` trait: `GET /<collection>`, `POST /<collection>`,
//! `PUT /<collection>/<id>`, `DELETE /<collection>/<id>`.

pub mod client;
pub mod error;
pub mod transport;

pub use client::{ApiClient, Resource};
pub use error::ApiError;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};
