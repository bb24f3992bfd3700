//! Stored GitHub token
//!
//! The token lives in the same on-disk store as cached templates and
//! drafts, under a fixed key. It is written verbatim and never logged.

use anyhow::Result;
use sitesmith::store::Store;

const TOKEN_KEY: &str = "github_token";

/// Read the stored token, if any
///
/// # Errors
///
/// Returns an error when the store entry exists but cannot be read.
pub fn load(store: &Store) -> Result<Option<String>> {
    Ok(store.get::<String>(TOKEN_KEY)?)
}

/// Persist a token for later sessions
///
/// # Errors
///
/// Returns an error when the entry cannot be written.
pub fn save(store: &Store, token: &str) -> Result<()> {
    store.set(TOKEN_KEY, &token.to_string())?;
    Ok(())
}

/// Remove the stored token
///
/// # Errors
///
/// Returns an error when the entry cannot be removed.
pub fn clear(store: &Store) -> Result<()> {
    store.remove(TOKEN_KEY)?;
    Ok(())
}
