//! CLI command implementations.

pub mod account;
pub mod address;
pub mod cart;
pub mod catalog;
pub mod checkout;
