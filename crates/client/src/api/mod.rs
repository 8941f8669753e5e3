//! QKart backend REST API client.
//!
//! # Architecture
//!
//! - Plain REST/JSON over `reqwest`; the backend is the source of truth for
//!   carts, addresses and balances
//! - Bearer token passed per call, never stored on the client
//! - In-memory caching via `moka` for catalog listings and search results
//!
//! # Example
//!
//! ```rust,ignore
//! use qkart_client::api::ApiClient;
//!
//! let client = ApiClient::new(&config)?;
//!
//! let products = client.products().await?;
//! let cart = client.update_cart(session.token(), &products[0].id, 1).await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::ApiClient;

use thiserror::Error;

/// Errors that can occur when talking to the QKart backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection refused, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API error: {status} - {}", message.as_deref().unwrap_or("(no message)"))]
    Api {
        /// HTTP status code.
        status: u16,
        /// The `message` field of the error body, when there was one.
        message: Option<String>,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be built from the endpoint.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// The backend's own explanation, if it sent one.
    ///
    /// This is what gets shown to users verbatim; everything else is reported
    /// as a connectivity problem.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Api {
                message: Some(message),
                ..
            } if !message.is_empty() => Some(message),
            _ => None,
        }
    }

    /// HTTP status of a backend error response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
