//! Cache types for catalog responses.

use std::sync::Arc;

use qkart_core::Product;

/// Cache key for catalog listings.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Catalog,
    Search(String),
}

/// Cached product list, shared between callers without cloning the products.
pub type CacheValue = Arc<Vec<Product>>;
