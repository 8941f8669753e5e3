//! Storefront facade.
//!
//! [`Storefront`] is what a front end talks to. It owns the explicit session
//! context and the address book, and turns user intents into backend calls:
//!
//! - catalog browsing and search
//! - cart view (entries reconciled against the catalog), add, set quantity
//! - address book management and selection
//! - checkout behind the validation gate, with wallet deduction
//! - registration, login and logout
//!
//! The backend is the source of truth for cart and addresses; every mutation
//! answers with the full collection and local views are rebuilt from it.

use std::sync::Arc;

use qkart_core::{
    AddOptions, AddressBook, AddressId, CartEntry, LineItem, Login, Money, Product, ProductId,
    Quantity, QuantityChange, Registration, check_add, reconcile, total_count, total_value,
    validate,
};
use secrecy::SecretString;
use tracing::{info, instrument, warn};

use crate::api::ApiClient;
use crate::error::{LoginRequired, Result, StorefrontError};
use crate::session::{Session, SessionStore};

/// A reconciled cart ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    /// Line items in cart order.
    pub items: Vec<LineItem>,
    /// Σ qty × cost.
    pub total_value: Money,
    /// Σ qty.
    pub total_count: u64,
}

impl CartView {
    /// Rebuild the view from raw cart entries and the catalog.
    #[must_use]
    pub fn build(entries: &[CartEntry], catalog: &[Product]) -> Self {
        let items = reconcile(entries, catalog);
        Self {
            total_value: total_value(&items),
            total_count: total_count(&items),
            items,
        }
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Outcome of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReceipt {
    /// Where the order ships.
    pub address_id: AddressId,
    /// What was ordered.
    pub items: Vec<LineItem>,
    /// What it cost.
    pub total_value: Money,
    /// Wallet balance after the order.
    pub remaining_balance: Money,
}

/// Storefront operations for one user.
pub struct Storefront<S> {
    api: ApiClient,
    store: S,
    session: Option<Session>,
    addresses: AddressBook,
}

impl<S: SessionStore> Storefront<S> {
    /// Create the storefront and load any saved session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub fn new(api: ApiClient, store: S) -> Result<Self> {
        let session = store.load()?;
        if let Some(session) = &session {
            info!(username = session.username(), "Restored session");
        }
        Ok(Self {
            api,
            store,
            session,
            addresses: AddressBook::default(),
        })
    }

    /// The underlying API client.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The current session, if logged in.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Whether a user is logged in.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    fn token(&self, reason: LoginRequired) -> Result<SecretString> {
        self.session
            .as_ref()
            .map(|session| session.token().clone())
            .ok_or(StorefrontError::NotLoggedIn(reason))
    }

    // =========================================================================
    // Account
    // =========================================================================

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the form is invalid or the backend rejects it.
    #[instrument(skip(self, password, confirm))]
    pub async fn register(&self, username: &str, password: &str, confirm: &str) -> Result<()> {
        let form = Registration::new(username, password, confirm)?;
        self.api
            .register(&form)
            .await
            .map_err(StorefrontError::api("register"))?;
        info!(username = %form.username, "Registered successfully");
        Ok(())
    }

    /// Log in and persist the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the form is invalid, the backend rejects the
    /// credentials, or the session cannot be saved.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, username: &str, password: &str) -> Result<&Session> {
        let form = Login::new(username, password)?;
        let response = self
            .api
            .login(&form)
            .await
            .map_err(StorefrontError::api("log in"))?;

        let session = Session::new(
            response.username,
            SecretString::from(response.token),
            response.balance,
        );
        self.store.save(&session)?;
        info!(username = session.username(), "Logged in successfully");

        self.addresses = AddressBook::default();
        Ok(self.session.insert(session))
    }

    /// Forget the session locally and in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be cleared.
    pub fn logout(&mut self) -> Result<()> {
        self.store.clear()?;
        if let Some(session) = self.session.take() {
            info!(username = session.username(), "Logged out");
        }
        self.addresses = AddressBook::default();
        Ok(())
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn products(&self) -> Result<Arc<Vec<Product>>> {
        self.api
            .products()
            .await
            .map_err(StorefrontError::api("fetch products"))
    }

    /// Search the catalog immediately (no debounce).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn search(&self, query: &str) -> Result<Arc<Vec<Product>>> {
        self.api
            .search_products(query)
            .await
            .map_err(StorefrontError::api("search products"))
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the cart and reconcile it against the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or a backend call fails.
    #[instrument(skip(self))]
    pub async fn cart(&self) -> Result<CartView> {
        let token = self.token(LoginRequired::ViewCart)?;
        let entries = self
            .api
            .cart(&token)
            .await
            .map_err(StorefrontError::api("fetch cart details"))?;
        self.view(&entries).await
    }

    /// Add a product to the cart.
    ///
    /// With `options.prevent_duplicate` set, a product already in the cart is
    /// rejected before any request is sent.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in, the add is a rejected duplicate, or
    /// a backend call fails.
    #[instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        product_id: &ProductId,
        qty: Quantity,
        options: AddOptions,
    ) -> Result<CartView> {
        let token = self.token(LoginRequired::AddToCart)?;

        if options.prevent_duplicate {
            let entries = self
                .api
                .cart(&token)
                .await
                .map_err(StorefrontError::api("fetch cart details"))?;
            check_add(&entries, product_id, options).inspect_err(|_| {
                warn!(%product_id, "Product already in cart");
            })?;
        }

        let entries = self
            .api
            .update_cart(&token, product_id, qty.get())
            .await
            .map_err(StorefrontError::api("add to cart"))?;
        self.view(&entries).await
    }

    /// Set a product's quantity; zero or less removes it.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or a backend call fails.
    #[instrument(skip(self))]
    pub async fn set_quantity(&self, product_id: &ProductId, requested: i64) -> Result<CartView> {
        let token = self.token(LoginRequired::AddToCart)?;
        let change = QuantityChange::from_requested(requested);

        let entries = self
            .api
            .update_cart(&token, product_id, change.wire_qty())
            .await
            .map_err(StorefrontError::api("update the cart"))?;
        self.view(&entries).await
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or a backend call fails.
    pub async fn remove_from_cart(&self, product_id: &ProductId) -> Result<CartView> {
        self.set_quantity(product_id, 0).await
    }

    async fn view(&self, entries: &[CartEntry]) -> Result<CartView> {
        let catalog = self.products().await?;
        Ok(CartView::build(entries, &catalog))
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// The locally held address book.
    #[must_use]
    pub const fn addresses(&self) -> &AddressBook {
        &self.addresses
    }

    /// Reload the address book from the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or the backend call fails.
    #[instrument(skip(self))]
    pub async fn refresh_addresses(&mut self) -> Result<&AddressBook> {
        let token = self.token(LoginRequired::ManageAddresses)?;
        let all = self
            .api
            .addresses(&token)
            .await
            .map_err(StorefrontError::api("fetch addresses"))?;
        self.addresses.replace_all(all);
        Ok(&self.addresses)
    }

    /// Save a new address.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or the backend rejects the address.
    #[instrument(skip(self, address))]
    pub async fn add_address(&mut self, address: &str) -> Result<&AddressBook> {
        let token = self.token(LoginRequired::ManageAddresses)?;
        let all = self
            .api
            .add_address(&token, address)
            .await
            .map_err(StorefrontError::api("add this address"))?;
        self.addresses.replace_all(all);
        Ok(&self.addresses)
    }

    /// Delete a saved address.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or the backend call fails.
    #[instrument(skip(self))]
    pub async fn delete_address(&mut self, address_id: &AddressId) -> Result<&AddressBook> {
        let token = self.token(LoginRequired::ManageAddresses)?;
        let all = self
            .api
            .delete_address(&token, address_id)
            .await
            .map_err(StorefrontError::api("delete this address"))?;
        self.addresses.replace_all(all);
        Ok(&self.addresses)
    }

    /// Choose the shipping address for checkout.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is not in the address book.
    pub fn select_address(&mut self, address_id: &AddressId) -> Result<()> {
        self.addresses.select(address_id)?;
        Ok(())
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Reload addresses, ship to `address_id` if given, then [`checkout`](Self::checkout).
    ///
    /// An `address_id` that is not in the reloaded book leaves nothing
    /// selected, so validation reports it in its usual order (funds first,
    /// then a missing or unselected address).
    ///
    /// # Errors
    ///
    /// Same as [`checkout`](Self::checkout), plus a failed address reload.
    #[instrument(skip(self))]
    pub async fn checkout_with(
        &mut self,
        address_id: Option<&AddressId>,
    ) -> Result<CheckoutReceipt> {
        self.token(LoginRequired::Checkout)?;
        self.refresh_addresses().await?;

        if let Some(address_id) = address_id
            && self.addresses.select(address_id).is_err()
        {
            warn!(%address_id, "Unknown shipping address");
            self.addresses.deselect();
        }

        self.checkout().await
    }

    /// Validate and place the order, then deduct it from the wallet.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in, validation blocks the order (one
    /// reason, in priority order), a backend call fails, or the updated
    /// session cannot be saved.
    #[instrument(skip(self))]
    pub async fn checkout(&mut self) -> Result<CheckoutReceipt> {
        let token = self.token(LoginRequired::Checkout)?;
        let balance = self
            .session
            .as_ref()
            .map_or(Money::ZERO, Session::balance);

        let cart = self.cart().await?;
        let address_id = validate(cart.total_value, balance, &self.addresses).inspect_err(|e| {
            warn!(reason = %e, "Checkout blocked");
        })?;

        self.api
            .checkout(&token, &address_id)
            .await
            .map_err(StorefrontError::api("perform checkout"))?;

        let remaining_balance = match self.session.as_mut() {
            Some(session) => {
                session.debit(cart.total_value);
                self.store.save(session)?;
                session.balance()
            }
            None => Money::ZERO,
        };

        info!(
            total = %cart.total_value,
            remaining = %remaining_balance,
            "Order placed successfully"
        );

        Ok(CheckoutReceipt {
            address_id,
            items: cart.items,
            total_value: cart.total_value,
            remaining_balance,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use qkart_core::Rating;

    use super::*;
    use crate::config::ClientConfig;
    use crate::session::MemorySessionStore;

    fn storefront(store: MemorySessionStore) -> Storefront<MemorySessionStore> {
        // Nothing listens on port 9; tests here must not reach the network.
        let config = ClientConfig::for_endpoint("http://127.0.0.1:9/api/v1").unwrap();
        Storefront::new(ApiClient::new(&config).unwrap(), store).unwrap()
    }

    fn product(id: &str, cost: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: id.to_owned(),
            category: "Kitchen".to_owned(),
            cost: Money::from_units(cost),
            rating: Rating::new(5).unwrap(),
            image: String::new(),
        }
    }

    #[test]
    fn test_cart_view_build() {
        let catalog = vec![product("A", 100), product("B", 30)];
        let entries = vec![
            CartEntry::new(ProductId::new("B"), Quantity::new(3).unwrap()),
            CartEntry::new(ProductId::new("gone"), Quantity::ONE),
            CartEntry::new(ProductId::new("A"), Quantity::new(2).unwrap()),
        ];

        let view = CartView::build(&entries, &catalog);
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.total_value, Money::from_units(290));
        assert_eq!(view.total_count, 5);
        assert!(!view.is_empty());
        assert!(CartView::build(&[], &catalog).is_empty());
    }

    #[test]
    fn test_new_restores_saved_session() {
        let store = MemorySessionStore::new();
        store
            .save(&Session::new(
                "crio.do".to_string(),
                SecretString::from("token"),
                Money::from_units(5000),
            ))
            .unwrap();

        let storefront = storefront(store);
        assert!(storefront.is_logged_in());
        assert_eq!(storefront.session().unwrap().username(), "crio.do");
    }

    #[test]
    fn test_logout_clears_store() {
        let store = MemorySessionStore::new();
        store
            .save(&Session::new(
                "crio.do".to_string(),
                SecretString::from("token"),
                Money::from_units(5000),
            ))
            .unwrap();

        let mut storefront = storefront(store);
        storefront.logout().unwrap();
        assert!(!storefront.is_logged_in());
        assert!(storefront.store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_to_cart_requires_login() {
        let storefront = storefront(MemorySessionStore::new());
        let err = storefront
            .add_to_cart(&ProductId::new("A"), Quantity::ONE, AddOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Login to add an item to the Cart");
    }

    #[tokio::test]
    async fn test_checkout_requires_login() {
        let mut storefront = storefront(MemorySessionStore::new());
        let err = storefront.checkout().await.unwrap_err();
        assert_eq!(
            err.user_message(),
            "You must be logged in to access checkout page"
        );
    }

    #[tokio::test]
    async fn test_register_validates_before_request() {
        let storefront = storefront(MemorySessionStore::new());
        let err = storefront
            .register("crio.do", "learnbydoing", "different")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "passwords do not match");
    }

    #[tokio::test]
    async fn test_checkout_with_address_requires_login_first() {
        let mut storefront = storefront(MemorySessionStore::new());
        let err = storefront
            .checkout_with(Some(&AddressId::new("x")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StorefrontError::NotLoggedIn(LoginRequired::Checkout)
        ));
        assert_eq!(err.severity(), crate::error::Severity::Info);
    }

    #[test]
    fn test_select_unknown_address() {
        let mut storefront = storefront(MemorySessionStore::new());
        let err = storefront
            .select_address(&AddressId::new("nope"))
            .unwrap_err();
        assert!(matches!(err, StorefrontError::AddressBook(_)));
    }
}
