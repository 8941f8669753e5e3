//! Address book commands.

use qkart_client::{SessionStore, Severity, Storefront};
use qkart_core::AddressId;

use crate::error::CliError;
use crate::output;

/// List saved addresses.
pub async fn list<S: SessionStore>(storefront: &mut Storefront<S>) -> Result<(), CliError> {
    let book = storefront.refresh_addresses().await?;
    output::addresses(book);
    Ok(())
}

/// Save a new address.
pub async fn add<S: SessionStore>(
    storefront: &mut Storefront<S>,
    address: &str,
) -> Result<(), CliError> {
    let book = storefront.add_address(address).await?;
    output::notice(Severity::Success, "Address added");
    output::addresses(book);
    Ok(())
}

/// Delete a saved address.
pub async fn delete<S: SessionStore>(
    storefront: &mut Storefront<S>,
    address_id: &str,
) -> Result<(), CliError> {
    let book = storefront
        .delete_address(&AddressId::new(address_id))
        .await?;
    output::notice(Severity::Success, "Address deleted");
    output::addresses(book);
    Ok(())
}
