//! Core types for QKart.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod address;
pub mod credential;
pub mod id;
pub mod money;
pub mod product;

pub use address::{Address, AddressBook, AddressBookError};
pub use credential::{CredentialError, Login, Password, Registration, Username};
pub use id::*;
pub use money::Money;
pub use product::{Product, Rating, RatingError};
