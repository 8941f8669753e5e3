//! Cart commands.
//!
//! All of these need a logged-in session.

use qkart_client::{SessionStore, Severity, Storefront};
use qkart_core::{AddOptions, ProductId, Quantity};

use crate::error::CliError;
use crate::output;

/// Show the reconciled cart with totals.
pub async fn show<S: SessionStore>(storefront: &Storefront<S>) -> Result<(), CliError> {
    let view = storefront.cart().await?;
    output::cart(&view);
    Ok(())
}

/// Add a product to the cart.
pub async fn add<S: SessionStore>(
    storefront: &Storefront<S>,
    product_id: &str,
    qty: Quantity,
    no_duplicates: bool,
) -> Result<(), CliError> {
    let options = AddOptions {
        prevent_duplicate: no_duplicates,
    };
    let view = storefront
        .add_to_cart(&ProductId::new(product_id), qty, options)
        .await?;
    output::notice(Severity::Success, "Item added to cart");
    output::cart(&view);
    Ok(())
}

/// Set a product's quantity; zero or less removes it.
pub async fn set<S: SessionStore>(
    storefront: &Storefront<S>,
    product_id: &str,
    qty: i64,
) -> Result<(), CliError> {
    let view = storefront
        .set_quantity(&ProductId::new(product_id), qty)
        .await?;
    output::cart(&view);
    Ok(())
}

/// Remove a product from the cart.
pub async fn remove<S: SessionStore>(
    storefront: &Storefront<S>,
    product_id: &str,
) -> Result<(), CliError> {
    let view = storefront
        .remove_from_cart(&ProductId::new(product_id))
        .await?;
    output::notice(Severity::Success, "Item removed from cart");
    output::cart(&view);
    Ok(())
}
