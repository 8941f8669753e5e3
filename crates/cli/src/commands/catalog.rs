//! Catalog browsing commands.
//!
//! # Usage
//!
//! ```bash
//! # Whole catalog
//! qkart products
//!
//! # One-off search
//! qkart products --search "running shoes"
//!
//! # Search as you type: each line replaces the previous query
//! qkart browse
//! ```

use qkart_client::{
    ApiError, ClientConfig, DebouncedSearch, SearchOutcome, SessionStore, Severity, Storefront,
    StorefrontError,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::{JoinError, JoinSet};

use crate::error::CliError;
use crate::output;

/// List the catalog, or the products matching `search`.
pub async fn list<S: SessionStore>(
    storefront: &Storefront<S>,
    search: Option<&str>,
) -> Result<(), CliError> {
    let products = match search {
        Some(query) => storefront.search(query).await?,
        None => storefront.products().await?,
    };
    output::products(&products);
    Ok(())
}

/// Read queries from stdin and show results once typing pauses.
///
/// Every line supersedes the ones before it, so only the latest query's
/// results are ever printed.
pub async fn browse<S: SessionStore>(
    storefront: &Storefront<S>,
    config: &ClientConfig,
) -> Result<(), CliError> {
    let search = DebouncedSearch::new(storefront.api().clone(), config.search_debounce);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending = JoinSet::new();

    output::notice(
        Severity::Info,
        "Type a query and press Enter. Ctrl-D to quit.",
    );

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let search = search.clone();
                pending.spawn(async move { search.search(&line).await });
            }
            Some(joined) = pending.join_next(), if !pending.is_empty() => report(joined),
        }
    }

    while let Some(joined) = pending.join_next().await {
        report(joined);
    }
    Ok(())
}

fn report(joined: Result<Result<SearchOutcome, ApiError>, JoinError>) {
    match joined {
        Ok(Ok(SearchOutcome::Results(products))) => output::products(&products),
        Ok(Ok(SearchOutcome::Superseded)) => tracing::debug!("Dropped superseded search"),
        Ok(Err(e)) => output::failure(&CliError::from(StorefrontError::api("search products")(e))),
        Err(e) => tracing::warn!(error = %e, "Search task failed"),
    }
}
