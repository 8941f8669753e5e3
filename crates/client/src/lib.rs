//! QKart Client - Backend access and storefront operations.
//!
//! This crate talks to the QKart REST backend and exposes the storefront
//! as a set of typed operations that any front end can drive.
//!
//! # Architecture
//!
//! - [`api`] - `reqwest` client for the backend endpoints, with a `moka`
//!   cache in front of catalog and search reads
//! - [`session`] - Explicit session context (token, username, wallet
//!   balance) and where it is persisted between runs
//! - [`search`] - Debounced search-as-you-type that never lets a stale
//!   response overwrite a newer one
//! - [`storefront`] - Facade joining the above with the pure rules in
//!   `qkart-core` (cart reconciliation, quantity policy, checkout gate)
//! - [`error`] - Unified error type and the user-facing notice for each failure
//! - [`config`] - Environment-driven configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod search;
pub mod session;
pub mod storefront;

pub use api::{ApiClient, ApiError};
pub use config::{ClientConfig, ConfigError};
pub use error::{LoginRequired, Severity, StorefrontError};
pub use search::{DebouncedSearch, ProductSearch, SearchOutcome};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionError, SessionStore};
pub use storefront::{CartView, CheckoutReceipt, Storefront};
