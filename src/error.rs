//! Error types for the cache.

use thiserror::Error;

/// Errors that can occur when constructing or using a cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A supplied TTL was not a positive duration
    #[error("Invalid TTL: must be a positive duration")]
    InvalidTtl,
}
