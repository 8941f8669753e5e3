//! Integration tests for the QKart client.
//!
//! The tests in `tests/` drive [`qkart_client::Storefront`] against
//! [`MockBackend`], an in-process `axum` server that speaks the QKart REST
//! API. No external services are needed:
//!
//! ```bash
//! cargo test -p qkart-integration-tests
//! ```
//!
//! The mock keeps all state in memory and mirrors the backend's behavior
//! where the client depends on it: bearer tokens, `{ success, message }`
//! error bodies, full collections returned from every mutation, 404 for a
//! search without matches, and wallet deduction at checkout.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use qkart_client::{ApiClient, ClientConfig, MemorySessionStore, Storefront};
use qkart_core::{Address, AddressId, CartEntry, Money, Product, ProductId, Quantity, Rating};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// Username of the account every backend starts with.
pub const TEST_USERNAME: &str = "crio.do";
/// Password of [`TEST_USERNAME`].
pub const TEST_PASSWORD: &str = "learnbydoing";
/// Wallet balance given to every new account.
pub const STARTING_BALANCE: i64 = 5000;

/// Product IDs in the seeded catalog.
pub mod catalog {
    pub const RUNNING_SHOES: &str = "BW0jAAeDJmlZCF8i";
    pub const RACQUET: &str = "KCRwjF7lN97HnEaY";
    pub const DUFFLE: &str = "a4sLtEcMpzabRyfx";
    pub const EARBUDS: &str = "upLK9JbQ4rMhTwt4";
    pub const SOFA: &str = "v4sLtEcMpzabRyfx";
}

// ============================================================================
// Backend state
// ============================================================================

struct User {
    password: String,
    token: String,
    balance: Money,
    cart: Vec<CartEntry>,
    addresses: Vec<Address>,
}

impl User {
    fn new(username: &str, password: &str) -> Self {
        Self {
            password: password.to_owned(),
            token: format!("token-{username}"),
            balance: Money::from_units(STARTING_BALANCE),
            cart: Vec::new(),
            addresses: Vec::new(),
        }
    }
}

struct Backend {
    products: Vec<Product>,
    users: HashMap<String, User>,
    next_address: u64,
}

#[derive(Default)]
struct Counters {
    catalog: AtomicUsize,
    search: AtomicUsize,
    checkout: AtomicUsize,
}

#[derive(Clone)]
struct AppState {
    backend: Arc<Mutex<Backend>>,
    counters: Arc<Counters>,
    broken: Arc<AtomicBool>,
}

impl AppState {
    fn lock(&self) -> MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn product(id: &str, name: &str, category: &str, cost: i64, rating: u8) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_owned(),
        category: category.to_owned(),
        cost: Money::from_units(cost),
        rating: Rating::new(rating).unwrap_or_default(),
        image: format!("https://crio-directus-assets.s3.ap-south-1.amazonaws.com/{id}.png"),
    }
}

fn seed_catalog() -> Vec<Product> {
    vec![
        product(
            catalog::RUNNING_SHOES,
            "UNIFACTOR Mens Running Shoes",
            "Fashion",
            50,
            5,
        ),
        product(
            catalog::RACQUET,
            "YONEX Smash Badminton Racquet",
            "Sports",
            100,
            5,
        ),
        product(
            catalog::DUFFLE,
            "Tan Leatherette Weekender Duffle",
            "Fashion",
            150,
            4,
        ),
        product(
            catalog::EARBUDS,
            "Bluetooth Wireless Earbuds",
            "Electronics",
            200,
            3,
        ),
        product(
            catalog::SOFA,
            "Stylecon 9 Seater RHS Sofa Set",
            "Home & Kitchen",
            4900,
            3,
        ),
    ]
}

// ============================================================================
// Errors
// ============================================================================

/// Error response in the backend's `{ success, message }` shape.
struct Failure {
    status: StatusCode,
    message: &'static str,
}

impl Failure {
    const fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    const fn bad_request(message: &'static str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "success": false, "message": self.message })),
        )
            .into_response()
    }
}

type HandlerResult = Result<Json<Value>, Failure>;

/// Find the username for the request's bearer token.
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<String, Failure> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(Failure::new(
            StatusCode::UNAUTHORIZED,
            "Protected route, Oauth2 Bearer token not found",
        ))?;

    state
        .lock()
        .users
        .iter()
        .find(|(_, user)| user.token == token)
        .map(|(name, _)| name.clone())
        .ok_or(Failure::new(
            StatusCode::UNAUTHORIZED,
            "Please authenticate",
        ))
}

fn to_json<T: serde::Serialize>(value: &T) -> HandlerResult {
    serde_json::to_value(value).map(Json).map_err(|_| {
        Failure::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to serialize response",
        )
    })
}

// ============================================================================
// Handlers: catalog
// ============================================================================

async fn list_products(State(state): State<AppState>) -> Response {
    state.counters.catalog.fetch_add(1, Ordering::SeqCst);
    if state.broken.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }
    let products = state.lock().products.clone();
    Json(products).into_response()
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    value: String,
}

async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>, (StatusCode, Json<Vec<Product>>)> {
    state.counters.search.fetch_add(1, Ordering::SeqCst);
    let needle = query.value.to_lowercase();
    let matches: Vec<Product> = state
        .lock()
        .products
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle) || p.category.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();

    if matches.is_empty() {
        Err((StatusCode::NOT_FOUND, Json(matches)))
    } else {
        Ok(Json(matches))
    }
}

// ============================================================================
// Handlers: cart
// ============================================================================

async fn get_cart(State(state): State<AppState>, headers: HeaderMap) -> HandlerResult {
    let username = authenticate(&state, &headers)?;
    let backend = state.lock();
    let cart = backend.users.get(&username).map(|u| u.cart.clone());
    to_json(&cart.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartBody {
    product_id: String,
    qty: u32,
}

async fn update_cart(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CartBody>,
) -> HandlerResult {
    let username = authenticate(&state, &headers)?;
    let product_id = ProductId::new(body.product_id);

    let mut backend = state.lock();
    if !backend.products.iter().any(|p| p.id == product_id) {
        return Err(Failure::bad_request("Product doesn't exist in database"));
    }
    let user = backend
        .users
        .get_mut(&username)
        .ok_or(Failure::bad_request("User not found"))?;

    match Quantity::new(body.qty) {
        None => user.cart.retain(|entry| entry.product_id != product_id),
        Some(qty) => match user.cart.iter_mut().find(|e| e.product_id == product_id) {
            Some(entry) => entry.qty = qty,
            None => user.cart.push(CartEntry::new(product_id, qty)),
        },
    }
    to_json(&user.cart)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutBody {
    address_id: String,
}

async fn checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CheckoutBody>,
) -> HandlerResult {
    let username = authenticate(&state, &headers)?;
    state.counters.checkout.fetch_add(1, Ordering::SeqCst);

    let mut guard = state.lock();
    let backend = &mut *guard;
    let user = backend
        .users
        .get_mut(&username)
        .ok_or(Failure::bad_request("User not found"))?;

    if user.cart.is_empty() {
        return Err(Failure::bad_request("Cart is empty"));
    }
    let address_id = AddressId::new(body.address_id);
    if !user.addresses.iter().any(|a| a.id == address_id) {
        return Err(Failure::bad_request("Address not set"));
    }

    let total: Money = user
        .cart
        .iter()
        .filter_map(|entry| {
            backend
                .products
                .iter()
                .find(|p| p.id == entry.product_id)
                .map(|p| p.cost * entry.qty.get())
        })
        .sum();

    user.balance = user
        .balance
        .checked_debit(total)
        .ok_or(Failure::bad_request(
            "Wallet balance not sufficient to place order",
        ))?;
    user.cart.clear();

    Ok(Json(json!({ "success": true })))
}

// ============================================================================
// Handlers: addresses
// ============================================================================

async fn get_addresses(State(state): State<AppState>, headers: HeaderMap) -> HandlerResult {
    let username = authenticate(&state, &headers)?;
    let backend = state.lock();
    let addresses = backend.users.get(&username).map(|u| u.addresses.clone());
    to_json(&addresses.unwrap_or_default())
}

#[derive(Deserialize)]
struct AddressBody {
    address: String,
}

async fn add_address(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AddressBody>,
) -> HandlerResult {
    let username = authenticate(&state, &headers)?;
    if body.address.chars().count() < 20 {
        return Err(Failure::bad_request(
            "Address should be greater than 20 characters",
        ));
    }

    let mut guard = state.lock();
    let backend = &mut *guard;
    backend.next_address += 1;
    let id = AddressId::new(format!("addr-{:04}", backend.next_address));
    let user = backend
        .users
        .get_mut(&username)
        .ok_or(Failure::bad_request("User not found"))?;
    user.addresses.push(Address {
        id,
        address: body.address,
    });
    to_json(&user.addresses)
}

async fn delete_address(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> HandlerResult {
    let username = authenticate(&state, &headers)?;
    let id = AddressId::new(id);

    let mut backend = state.lock();
    let user = backend
        .users
        .get_mut(&username)
        .ok_or(Failure::bad_request("User not found"))?;
    if !user.addresses.iter().any(|a| a.id == id) {
        return Err(Failure::new(StatusCode::NOT_FOUND, "Address not found"));
    }
    user.addresses.retain(|a| a.id != id);
    to_json(&user.addresses)
}

// ============================================================================
// Handlers: auth
// ============================================================================

#[derive(Deserialize)]
struct CredentialsBody {
    username: String,
    password: String,
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<CredentialsBody>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    let mut backend = state.lock();
    if backend.users.contains_key(&body.username) {
        return Err(Failure::bad_request("Username is already taken"));
    }
    let user = User::new(&body.username, &body.password);
    backend.users.insert(body.username, user);
    Ok((StatusCode::CREATED, Json(json!({ "success": true }))))
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsBody>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    let backend = state.lock();
    let user = backend
        .users
        .get(&body.username)
        .ok_or(Failure::bad_request("Username does not exist"))?;
    if user.password != body.password {
        return Err(Failure::bad_request("Password is incorrect"));
    }
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "token": user.token,
            "username": body.username,
            "balance": user.balance,
        })),
    ))
}

// ============================================================================
// MockBackend
// ============================================================================

/// In-process QKart backend listening on a random local port.
///
/// The server stops when the value is dropped.
pub struct MockBackend {
    addr: SocketAddr,
    state: AppState,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Start a backend with the seeded catalog and the [`TEST_USERNAME`] account.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let mut users = HashMap::new();
        users.insert(
            TEST_USERNAME.to_owned(),
            User::new(TEST_USERNAME, TEST_PASSWORD),
        );

        let state = AppState {
            backend: Arc::new(Mutex::new(Backend {
                products: seed_catalog(),
                users,
                next_address: 0,
            })),
            counters: Arc::new(Counters::default()),
            broken: Arc::new(AtomicBool::new(false)),
        };

        let app = Router::new()
            .route("/api/v1/products", get(list_products))
            .route("/api/v1/products/search", get(search_products))
            .route("/api/v1/cart", get(get_cart).post(update_cart))
            .route("/api/v1/cart/checkout", post(checkout))
            .route("/api/v1/user/addresses", get(get_addresses).post(add_address))
            .route("/api/v1/user/addresses/{id}", delete(delete_address))
            .route("/api/v1/auth/register", post(register))
            .route("/api/v1/auth/login", post(login))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Mock backend has no address");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// The API base URL, as a user would configure it.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    /// Client configuration pointing at this backend.
    ///
    /// # Panics
    ///
    /// Panics if the endpoint URL is rejected.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        let mut config =
            ClientConfig::for_endpoint(&self.endpoint()).expect("Mock endpoint is a valid URL");
        config.search_debounce = Duration::from_millis(50);
        config.request_timeout = Duration::from_secs(5);
        config
    }

    /// A logged-out storefront with an in-memory session store.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn storefront(&self) -> Storefront<MemorySessionStore> {
        let api = ApiClient::new(&self.config()).expect("Failed to build API client");
        Storefront::new(api, MemorySessionStore::new()).expect("Memory store cannot fail")
    }

    /// A storefront already logged in as [`TEST_USERNAME`].
    ///
    /// # Panics
    ///
    /// Panics if login fails.
    pub async fn logged_in_storefront(&self) -> Storefront<MemorySessionStore> {
        let mut storefront = self.storefront();
        storefront
            .login(TEST_USERNAME, TEST_PASSWORD)
            .await
            .expect("Test account login failed");
        storefront
    }

    /// Make the catalog endpoint answer 500 with a non-JSON body.
    pub fn break_catalog(&self) {
        self.state.broken.store(true, Ordering::SeqCst);
    }

    /// Set a user's wallet balance.
    pub fn set_balance(&self, username: &str, balance: Money) {
        if let Some(user) = self.state.lock().users.get_mut(username) {
            user.balance = balance;
        }
    }

    /// A user's wallet balance as the backend sees it.
    #[must_use]
    pub fn balance(&self, username: &str) -> Option<Money> {
        self.state.lock().users.get(username).map(|u| u.balance)
    }

    /// A user's cart as the backend sees it.
    #[must_use]
    pub fn cart(&self, username: &str) -> Vec<CartEntry> {
        self.state
            .lock()
            .users
            .get(username)
            .map(|u| u.cart.clone())
            .unwrap_or_default()
    }

    /// Number of catalog listing requests served.
    #[must_use]
    pub fn catalog_requests(&self) -> usize {
        self.state.counters.catalog.load(Ordering::SeqCst)
    }

    /// Number of search requests served.
    #[must_use]
    pub fn search_requests(&self) -> usize {
        self.state.counters.search.load(Ordering::SeqCst)
    }

    /// Number of checkout requests that passed authentication.
    #[must_use]
    pub fn checkout_requests(&self) -> usize {
        self.state.counters.checkout.load(Ordering::SeqCst)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}
