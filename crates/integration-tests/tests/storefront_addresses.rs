//! Integration tests for the address book.
//!
//! Run with: cargo test -p qkart-integration-tests

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use qkart_client::StorefrontError;
use qkart_core::AddressId;
use qkart_integration_tests::MockBackend;

const HOME: &str = "No 12, 4th Cross, Indiranagar, Bengaluru";
const OFFICE: &str = "Crio.Do, 3rd Floor, Koramangala, Bengaluru";

#[tokio::test]
async fn test_addresses_require_login() {
    let backend = MockBackend::start().await;
    let mut storefront = backend.storefront();

    let err = storefront.refresh_addresses().await.unwrap_err();

    assert!(matches!(err, StorefrontError::NotLoggedIn(_)));
}

#[tokio::test]
async fn test_add_and_list_addresses() {
    let backend = MockBackend::start().await;
    let mut storefront = backend.logged_in_storefront().await;

    assert!(storefront.refresh_addresses().await.unwrap().is_empty());

    storefront.add_address(HOME).await.unwrap();
    let book = storefront.add_address(OFFICE).await.unwrap();

    let texts: Vec<&str> = book.all().iter().map(|a| a.address.as_str()).collect();
    assert_eq!(texts, [HOME, OFFICE]);
    assert!(book.selected().is_none());
}

#[tokio::test]
async fn test_short_address_shows_backend_message() {
    let backend = MockBackend::start().await;
    let mut storefront = backend.logged_in_storefront().await;

    let err = storefront.add_address("Bengaluru").await.unwrap_err();

    assert_eq!(
        err.user_message(),
        "Address should be greater than 20 characters"
    );
}

#[tokio::test]
async fn test_deleting_selected_address_clears_selection() {
    let backend = MockBackend::start().await;
    let mut storefront = backend.logged_in_storefront().await;

    storefront.add_address(HOME).await.unwrap();
    let book = storefront.add_address(OFFICE).await.unwrap();
    let home = book.all()[0].id.clone();
    let office = book.all()[1].id.clone();

    storefront.select_address(&home).unwrap();
    let book = storefront.delete_address(&office).await.unwrap();
    assert_eq!(book.selected(), Some(&home));

    let book = storefront.delete_address(&home).await.unwrap();
    assert!(book.is_empty());
    assert!(book.selected().is_none());
}

#[tokio::test]
async fn test_select_unknown_address_is_rejected() {
    let backend = MockBackend::start().await;
    let mut storefront = backend.logged_in_storefront().await;
    storefront.add_address(HOME).await.unwrap();

    let err = storefront
        .select_address(&AddressId::new("not-an-address"))
        .unwrap_err();

    assert!(matches!(err, StorefrontError::AddressBook(_)));
    assert!(storefront.addresses().selected().is_none());
}
