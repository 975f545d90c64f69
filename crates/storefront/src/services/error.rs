//! Service-level error kinds.

use thiserror::Error;

use cartwright_core::QuantityError;

use crate::db::RepositoryError;

/// Errors returned by the cart, checkout, catalog and order services.
#[derive(Debug, Error)]
pub enum ShopError {
    /// The named cart, order, product or user does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The resource belongs to another user.
    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    /// Checkout of a cart with no items.
    #[error("cart is empty")]
    EmptyCart,

    /// Malformed quantity, identifier or filter.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Duplicate creation, or the cart changed during checkout.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The store failed or returned unusable data.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] RepositoryError),
}

impl From<RepositoryError> for ShopError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("referenced resource"),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            RepositoryError::OutOfRange(msg) => Self::InvalidInput(msg),
            other @ (RepositoryError::Database(_) | RepositoryError::DataCorruption(_)) => {
                Self::StoreUnavailable(other)
            }
        }
    }
}

impl From<QuantityError> for ShopError {
    fn from(err: QuantityError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}
