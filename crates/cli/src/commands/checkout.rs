//! Checkout command.

use qkart_client::{SessionStore, Storefront};
use qkart_core::AddressId;

use crate::error::CliError;
use crate::output;

/// Place the order, shipping to `address` when given.
///
/// Addresses are reloaded first so the choice is checked against the
/// backend's current list. An address that is not there counts as no
/// selection.
pub async fn run<S: SessionStore>(
    storefront: &mut Storefront<S>,
    address: Option<&str>,
) -> Result<(), CliError> {
    let address = address.map(AddressId::new);
    let receipt = storefront.checkout_with(address.as_ref()).await?;
    output::receipt(&receipt);
    Ok(())
}
