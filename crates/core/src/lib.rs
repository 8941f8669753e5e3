//! QKart Core - Domain types and storefront rules.
//!
//! This crate provides the types and pure logic shared by the QKart client
//! and command-line tools:
//! - `client` - HTTP client, session handling and storefront facade
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no clocks. Everything here is deterministic for its inputs.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, products, addresses and credentials
//! - [`cart`] - Cart reconciliation, totals and quantity policy
//! - [`checkout`] - Checkout validation gate

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod types;

pub use cart::{
    AddOptions, CartEntry, CartError, LineItem, Quantity, QuantityChange, check_add, reconcile,
    total_count, total_value,
};
pub use checkout::{CheckoutRejection, validate};
pub use types::*;
