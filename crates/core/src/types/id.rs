//! Newtype IDs for type-safe entity references.
//!
//! The backend hands out opaque string identifiers (`_id` fields). Use the
//! `define_id!` macro to create wrappers that prevent accidentally passing a
//! product ID where an address ID is expected.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`, `is_empty()`
/// - `Display`, `AsRef<str>`, `From<&str>` and `From<String>` implementations
///
/// # Example
///
/// ```rust
/// # use qkart_core::define_id;
/// define_id!(OrderId);
/// define_id!(CouponId);
///
/// let order_id = OrderId::new("5f2a");
/// let coupon_id = CouponId::new("5f2a");
///
/// // These are different types, so this won't compile:
/// // let _: OrderId = coupon_id;
/// assert_eq!(order_id.as_str(), coupon_id.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Whether the identifier is blank.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.pad(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define storefront entity IDs
define_id!(ProductId);
define_id!(AddressId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_as_str() {
        let id = ProductId::new("KCRwjF7lN97HnEaY");
        assert_eq!(id.as_str(), "KCRwjF7lN97HnEaY");
        assert_eq!(id.to_string(), "KCRwjF7lN97HnEaY");
    }

    #[test]
    fn test_id_is_empty() {
        assert!(AddressId::new("").is_empty());
        assert!(AddressId::new("   ").is_empty());
        assert!(!AddressId::new("x").is_empty());
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = AddressId::from("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        let parsed: AddressId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(parsed, id);
    }
}
