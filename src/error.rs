//! Error taxonomy for the inventory core.
//!
//! Repository operations surface exactly one of these variants; the
//! expiration helpers never fail and are not represented here.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, InventoryError>;

/// Errors surfaced by repository and worker operations
#[derive(Debug, Error)]
pub enum InventoryError {
    /// A required field was missing or blank
    #[error("validation failed: {0}")]
    Validation(String),

    /// A uniqueness rule was violated (exact-name or name-within-parent)
    #[error("duplicate entry: {0}")]
    Duplicate(String),

    /// A referenced row does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The underlying SQLite store failed
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The background worker is gone; no further operations are possible
    #[error("inventory worker has shut down")]
    Shutdown,
}

impl InventoryError {
    /// True when retrying the same call with the same input cannot succeed
    /// (validation, duplicate and not-found failures are caller mistakes).
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            InventoryError::Validation(_)
                | InventoryError::Duplicate(_)
                | InventoryError::NotFound(_)
        )
    }
}
