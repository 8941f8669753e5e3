//! Account commands.

use qkart_client::{SessionStore, Severity, Storefront};

use crate::error::CliError;
use crate::output;

/// Create an account.
pub async fn register<S: SessionStore>(
    storefront: &Storefront<S>,
    username: &str,
    password: &str,
    confirm: &str,
) -> Result<(), CliError> {
    storefront.register(username, password, confirm).await?;
    output::notice(Severity::Success, "Registered successfully");
    Ok(())
}

/// Log in and remember the session.
pub async fn login<S: SessionStore>(
    storefront: &mut Storefront<S>,
    username: &str,
    password: &str,
) -> Result<(), CliError> {
    let session = storefront.login(username, password).await?;
    output::notice(Severity::Success, "Logged in successfully");
    output::session(Some(session));
    Ok(())
}

/// Forget the saved session.
pub fn logout<S: SessionStore>(storefront: &mut Storefront<S>) -> Result<(), CliError> {
    storefront.logout()?;
    output::notice(Severity::Success, "Logged out");
    Ok(())
}

/// Show who is logged in.
pub fn whoami<S: SessionStore>(storefront: &Storefront<S>) {
    output::session(storefront.session());
}
