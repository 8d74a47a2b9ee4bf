//! # Forgetful
//!
//! A simple in-memory key-value cache with per-entry TTL (time-to-live)
//! expiration.
//!
//! ## Features
//!
//! - Thread-safe storage using `DashMap` (lock-free concurrent access)
//! - Push-based expiration: every insert arms one deferred deletion task,
//!   no background sweep
//! - Per-entry TTL overrides on top of a construction-time default
//! - `clear` invalidates every pending expiration in one step via a
//!   swappable generation token
//!
//! ## Example
//!
//! ```rust,no_run
//! use forgetful::Cache;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), forgetful::Error> {
//!     // Entries live for 30 seconds unless a per-entry TTL says otherwise
//!     let cache: Cache<String, String> = Cache::new(Duration::from_secs(30))?;
//!
//!     cache.set("user:123".into(), "John Doe".into());
//!     cache.set_with_ttl("session:abc".into(), "token".into(), Duration::from_secs(5))?;
//!
//!     // Retrieve the value
//!     if let Some(value) = cache.get(&"user:123".to_string()) {
//!         println!("User: {}", value);
//!     }
//!
//!     // Delete a key
//!     cache.delete(&"user:123".to_string());
//!
//!     // Drop everything and cancel all pending expirations
//!     cache.clear();
//!     Ok(())
//! }
//! ```

mod cache;
mod config;
mod entry;
mod error;

pub use cache::Cache;
pub use config::CacheConfig;
pub use entry::Entry;
pub use error::Error;
