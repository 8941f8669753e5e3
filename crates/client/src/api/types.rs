//! Request and response bodies of the QKart REST API.

use qkart_core::{AddressId, Money, ProductId};
use serde::{Deserialize, Serialize};

/// Body of `POST /cart`.
#[derive(Debug, Serialize)]
pub struct CartUpdateRequest<'a> {
    #[serde(rename = "productId")]
    pub product_id: &'a ProductId,
    /// Zero removes the product.
    pub qty: u32,
}

/// Body of `POST /user/addresses`.
#[derive(Debug, Serialize)]
pub struct NewAddressRequest<'a> {
    pub address: &'a str,
}

/// Body of `POST /cart/checkout`.
#[derive(Debug, Serialize)]
pub struct CheckoutRequest<'a> {
    #[serde(rename = "addressId")]
    pub address_id: &'a AddressId,
}

/// Body of `POST /auth/register` and `POST /auth/login`.
#[derive(Serialize)]
pub struct CredentialsRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Successful `POST /auth/login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub balance: Money,
}

/// Error body sent with non-success responses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_update_request_wire_names() {
        let id = ProductId::new("BW0jAAeDJmlZCF8i");
        let body = serde_json::to_value(CartUpdateRequest {
            product_id: &id,
            qty: 2,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"productId": "BW0jAAeDJmlZCF8i", "qty": 2}));
    }

    #[test]
    fn test_checkout_request_wire_names() {
        let id = AddressId::new("x");
        let body = serde_json::to_value(CheckoutRequest { address_id: &id }).unwrap();
        assert_eq!(body, serde_json::json!({"addressId": "x"}));
    }

    #[test]
    fn test_login_response() {
        let json = r#"{"success":true,"token":"eyJhbGciOiJIUzI1NiJ9","username":"crio.do","balance":5000}"#;
        let response: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.username, "crio.do");
        assert_eq!(response.balance, Money::from_units(5000));
    }

    #[test]
    fn test_error_body_without_message() {
        let body: ErrorBody = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert!(body.message.is_none());
    }
}
