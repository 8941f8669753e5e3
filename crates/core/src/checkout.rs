//! Checkout validation gate.
//!
//! Decides whether a checkout attempt may be submitted. Checks run in a fixed
//! priority order and the first failure is the only one reported:
//!
//! 1. wallet balance covers the cart total
//! 2. at least one address is saved
//! 3. an address is selected
//!
//! Callers depend on that order, so it must not change.

use crate::types::{AddressBook, AddressId, Money};

/// Why a checkout attempt was blocked.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutRejection {
    /// The wallet balance is lower than the cart total.
    #[error("You do not have enough balance in your wallet for this purchase")]
    InsufficientFunds {
        /// Cart total.
        required: Money,
        /// Wallet balance.
        available: Money,
    },

    /// No shipping address has been saved.
    #[error("Please add a new address before proceeding.")]
    NoAddressAvailable,

    /// Addresses exist but none is selected.
    #[error("Please select one shipping address to proceed.")]
    NoAddressSelected,
}

/// Validate a checkout attempt.
///
/// Returns the selected address ID on success.
///
/// # Errors
///
/// Returns the first failing [`CheckoutRejection`] in priority order.
pub fn validate(
    total_value: Money,
    wallet_balance: Money,
    addresses: &AddressBook,
) -> Result<AddressId, CheckoutRejection> {
    if wallet_balance < total_value {
        return Err(CheckoutRejection::InsufficientFunds {
            required: total_value,
            available: wallet_balance,
        });
    }

    if addresses.is_empty() {
        return Err(CheckoutRejection::NoAddressAvailable);
    }

    match addresses.selected() {
        Some(id) if !id.is_empty() => Ok(id.clone()),
        _ => Err(CheckoutRejection::NoAddressSelected),
    }
}
