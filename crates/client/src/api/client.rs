//! QKart REST API client implementation.
//!
//! Uses `reqwest` for HTTP and caches catalog listings with `moka`.

use std::sync::Arc;

use moka::future::Cache;
use qkart_core::{Address, AddressId, CartEntry, Login, Product, ProductId, Registration};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::ApiError;
use super::cache::{CacheKey, CacheValue};
use super::types::{
    CartUpdateRequest, CheckoutRequest, CredentialsRequest, ErrorBody, LoginResponse,
    NewAddressRequest,
};
use crate::config::ClientConfig;

/// How much of a response body ends up in logs.
const LOGGED_BODY_CHARS: usize = 500;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the QKart REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and the catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    endpoint: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("qkart-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(256)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                endpoint: config.api_endpoint.clone(),
                cache,
            }),
        })
    }

    /// The API base URL.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Build an absolute URL for a path below the endpoint.
    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .endpoint
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }

    fn request(&self, method: Method, url: Url, token: Option<&SecretString>) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and decode the JSON response.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&body),
                "Failed to parse QKart API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request and ignore the body of a successful response.
    async fn send_unit(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_body(status, &body));
        }

        Ok(())
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// List every product in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        if let Some(products) = self.inner.cache.get(&CacheKey::Catalog).await {
            debug!("Cache hit for catalog");
            return Ok(products);
        }

        let url = self.url("products")?;
        let products: Vec<Product> = self.send(self.request(Method::GET, url, None)).await?;
        let products = Arc::new(products);

        self.inner
            .cache
            .insert(CacheKey::Catalog, Arc::clone(&products))
            .await;

        debug!(count = products.len(), "Fetched catalog");
        Ok(products)
    }

    /// Search the catalog by name or category.
    ///
    /// A blank query lists the whole catalog. No matches is an empty list,
    /// even though the backend signals it with a 404.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Arc<Vec<Product>>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return self.products().await;
        }

        let cache_key = CacheKey::Search(query.to_owned());
        if let Some(products) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for search");
            return Ok(products);
        }

        let mut url = self.url("products/search")?;
        url.query_pairs_mut().append_pair("value", query);

        let products = match self
            .send::<Vec<Product>>(self.request(Method::GET, url, None))
            .await
        {
            Ok(products) => Arc::new(products),
            Err(ApiError::Api { status: 404, .. }) => {
                debug!("No products matched");
                Arc::new(Vec::new())
            }
            Err(e) => return Err(e),
        };

        self.inner
            .cache
            .insert(cache_key, Arc::clone(&products))
            .await;

        Ok(products)
    }

    /// Drop cached catalog listings and search results.
    pub fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Get the user's cart entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn cart(&self, token: &SecretString) -> Result<Vec<CartEntry>, ApiError> {
        let url = self.url("cart")?;
        self.send(self.request(Method::GET, url, Some(token))).await
    }

    /// Set the quantity of a product in the cart; zero removes it.
    ///
    /// Returns the full cart after the update.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn update_cart(
        &self,
        token: &SecretString,
        product_id: &ProductId,
        qty: u32,
    ) -> Result<Vec<CartEntry>, ApiError> {
        let url = self.url("cart")?;
        let body = CartUpdateRequest { product_id, qty };
        self.send(self.request(Method::POST, url, Some(token)).json(&body))
            .await
    }

    /// Place the order for the current cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn checkout(
        &self,
        token: &SecretString,
        address_id: &AddressId,
    ) -> Result<(), ApiError> {
        let url = self.url("cart/checkout")?;
        let body = CheckoutRequest { address_id };
        self.send_unit(self.request(Method::POST, url, Some(token)).json(&body))
            .await
    }

    // =========================================================================
    // Address Methods
    // =========================================================================

    /// List the user's saved addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn addresses(&self, token: &SecretString) -> Result<Vec<Address>, ApiError> {
        let url = self.url("user/addresses")?;
        self.send(self.request(Method::GET, url, Some(token))).await
    }

    /// Save a new address; returns the updated list.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, address))]
    pub async fn add_address(
        &self,
        token: &SecretString,
        address: &str,
    ) -> Result<Vec<Address>, ApiError> {
        let url = self.url("user/addresses")?;
        let body = NewAddressRequest { address };
        self.send(self.request(Method::POST, url, Some(token)).json(&body))
            .await
    }

    /// Delete a saved address; returns the updated list.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn delete_address(
        &self,
        token: &SecretString,
        address_id: &AddressId,
    ) -> Result<Vec<Address>, ApiError> {
        let mut url = self.url("user/addresses")?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(url_string(&self.inner.endpoint)))?
            .pop_if_empty()
            .push(address_id.as_str());
        self.send(self.request(Method::DELETE, url, Some(token)))
            .await
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails (e.g. username taken).
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn register(&self, form: &Registration) -> Result<(), ApiError> {
        let url = self.url("auth/register")?;
        let body = CredentialsRequest {
            username: form.username.as_str(),
            password: form.password.expose(),
        };
        self.send_unit(self.request(Method::POST, url, None).json(&body))
            .await
    }

    /// Log in and receive a bearer token plus wallet balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails (e.g. wrong password).
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn login(&self, form: &Login) -> Result<LoginResponse, ApiError> {
        let url = self.url("auth/login")?;
        let body = CredentialsRequest {
            username: &form.username,
            password: form.password.expose_secret(),
        };
        self.send(self.request(Method::POST, url, None).json(&body))
            .await
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Turn a non-success response into an [`ApiError`], keeping the backend message.
fn error_from_body(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .unwrap_or_default()
        .message;

    tracing::warn!(
        status = %status,
        body = %truncate(body),
        "QKart API returned non-success status"
    );

    ApiError::Api {
        status: status.as_u16(),
        message,
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(LOGGED_BODY_CHARS).collect()
}

fn url_string(url: &Url) -> String {
    url.as_str().to_owned()
}
