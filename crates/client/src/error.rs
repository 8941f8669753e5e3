//! Unified error handling for storefront operations.
//!
//! Provides a unified `StorefrontError` type that every facade operation
//! returns. Each error knows the notice a front end should show for it:
//! local validation failures carry their own message, backend failures show
//! the backend's message verbatim when it sent one and a generic connectivity
//! hint otherwise.

use qkart_core::{AddressBookError, CartError, CheckoutRejection, CredentialError};
use thiserror::Error;

use crate::api::ApiError;
use crate::session::SessionError;

/// How prominently a notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Neutral information.
    Info,
    /// The operation completed.
    Success,
    /// The user needs to change something before retrying.
    Warning,
    /// Something failed outside the user's control.
    Error,
}

/// Why an operation needs a logged-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum LoginRequired {
    #[error("Login to add an item to the Cart")]
    AddToCart,
    #[error("Login to view your cart")]
    ViewCart,
    #[error("Login to manage your addresses")]
    ManageAddresses,
    #[error("You must be logged in to access checkout page")]
    Checkout,
}

impl LoginRequired {
    /// Checkout is a page the user navigated to; the rest block an action.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::Checkout => Severity::Info,
            Self::AddToCart | Self::ViewCart | Self::ManageAddresses => Severity::Warning,
        }
    }
}

/// Application-level error type for storefront operations.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// A backend call failed.
    #[error("Could not {action}: {source}")]
    Api {
        /// What the user was trying to do, e.g. "fetch cart details".
        action: &'static str,
        #[source]
        source: ApiError,
    },

    /// Checkout was blocked by local validation.
    #[error(transparent)]
    Checkout(#[from] CheckoutRejection),

    /// A cart change was blocked by local policy.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// A registration or login form is invalid.
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    /// An address selection is invalid.
    #[error(transparent)]
    AddressBook(#[from] AddressBookError),

    /// The operation needs a logged-in user.
    #[error(transparent)]
    NotLoggedIn(LoginRequired),

    /// The session could not be loaded or saved.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl StorefrontError {
    /// Build a mapper for backend failures of a given user action.
    ///
    /// ```rust,ignore
    /// client.cart(token).await.map_err(StorefrontError::api("fetch cart details"))?;
    /// ```
    pub fn api(action: &'static str) -> impl FnOnce(ApiError) -> Self {
        move |source| Self::Api { action, source }
    }

    /// The message to show the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { action, source } => source.backend_message().map_or_else(
                || {
                    format!(
                        "Could not {action}. Check that the backend is running, reachable and returns valid JSON."
                    )
                },
                str::to_owned,
            ),
            _ => self.to_string(),
        }
    }

    /// How the notice should be presented.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Api { .. } | Self::Session(_) => Severity::Error,
            Self::NotLoggedIn(reason) => reason.severity(),
            Self::Checkout(_) | Self::Cart(_) | Self::Credentials(_) | Self::AddressBook(_) => {
                Severity::Warning
            }
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

#[cfg(test)]
mod tests {
    use qkart_core::ProductId;

    use super::*;

    #[test]
    fn test_backend_message_is_shown_verbatim() {
        let err = StorefrontError::api("add this address")(ApiError::Api {
            status: 400,
            message: Some("Address should be greater than 20 characters".to_string()),
        });
        assert_eq!(
            err.user_message(),
            "Address should be greater than 20 characters"
        );
        assert_eq!(err.severity(), Severity::Error);
    }

    #[test]
    fn test_missing_backend_message_falls_back_to_connectivity_hint() {
        let err = StorefrontError::api("fetch products")(ApiError::Api {
            status: 500,
            message: None,
        });
        assert_eq!(
            err.user_message(),
            "Could not fetch products. Check that the backend is running, reachable and returns valid JSON."
        );
    }

    #[test]
    fn test_local_rejections_are_warnings() {
        let err = StorefrontError::from(CheckoutRejection::NoAddressSelected);
        assert_eq!(err.severity(), Severity::Warning);
        assert_eq!(
            err.user_message(),
            "Please select one shipping address to proceed."
        );

        let err = StorefrontError::from(CartError::AlreadyInCart(ProductId::new("A")));
        assert_eq!(err.severity(), Severity::Warning);
        assert!(err.user_message().starts_with("Item already in cart."));
    }

    #[test]
    fn test_not_logged_in_message() {
        let err = StorefrontError::NotLoggedIn(LoginRequired::AddToCart);
        assert_eq!(err.user_message(), "Login to add an item to the Cart");
        assert_eq!(err.severity(), Severity::Warning);
    }

    #[test]
    fn test_checkout_login_prompt_is_info() {
        let err = StorefrontError::NotLoggedIn(LoginRequired::Checkout);
        assert_eq!(
            err.user_message(),
            "You must be logged in to access checkout page"
        );
        assert_eq!(err.severity(), Severity::Info);
    }
}
