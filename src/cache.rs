use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};
use std::time::Duration;

use dashmap::DashMap;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::config::CacheConfig;
use crate::entry::Entry;
use crate::error::Error;

/// Cap on effective TTLs (~2 years). Deadlines past the tokio timer's
/// supported horizon would panic inside `sleep`.
const MAX_TTL: Duration = Duration::from_secs(2 * 365 * 24 * 60 * 60);

/// Internal shared state for the cache
struct CacheInner<K, V> {
    entries: DashMap<K, Entry<V>>,
    default_ttl: Duration,
    /// Live generation token. Every armed expiration captures a clone;
    /// `clear` cancels and replaces it, orphaning everything armed before.
    generation: RwLock<CancellationToken>,
    /// Revision counter stamping each insert, so a superseded expiration
    /// cannot evict a newer write to the same key.
    revisions: AtomicU64,
    /// Runtime the expiration tasks run on, captured at construction
    runtime: Handle,
}

/// Thread-safe in-memory key-value cache with per-entry TTL expiration
///
/// Uses `DashMap` for lock-free concurrent access. Reads never block other
/// reads, and writes only block access to the specific key being written.
///
/// Every insert arms one deferred deletion task on the tokio runtime; there
/// is no periodic sweep. `clear` invalidates all pending expirations at once
/// by retiring the cache's generation token.
///
/// The cache is cheap to clone: clones share the same entries and the same
/// generation token.
///
/// # Example
///
/// ```rust,no_run
/// use forgetful::Cache;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), forgetful::Error> {
///     let cache: Cache<String, String> = Cache::new(Duration::from_secs(30))?;
///
///     cache
///         .set("user:123".into(), "John Doe".into())
///         .set_with_ttl("session:abc".into(), "token".into(), Duration::from_secs(5))?;
///
///     assert_eq!(cache.get(&"user:123".into()).as_deref(), Some("John Doe"));
///     Ok(())
/// }
/// ```
pub struct Cache<K, V> {
    inner: Arc<CacheInner<K, V>>,
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a new cache whose entries live for `default_ttl` unless a
    /// per-entry TTL says otherwise
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTtl` if `default_ttl` is zero.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context. The cache
    /// requires a runtime to run its expiration tasks.
    pub fn new(default_ttl: Duration) -> Result<Self, Error> {
        Self::with_config(CacheConfig::new(default_ttl))
    }

    /// Creates a new cache with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTtl` if the configured default TTL is zero.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context. The cache
    /// requires a runtime to run its expiration tasks.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use forgetful::{Cache, CacheConfig};
    /// use std::time::Duration;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let config = CacheConfig::default()
    ///         .with_default_ttl(Duration::from_secs(300));
    ///     let cache: Cache<String, u32> = Cache::with_config(config).unwrap();
    /// }
    /// ```
    pub fn with_config(config: CacheConfig) -> Result<Self, Error> {
        if config.default_ttl.is_zero() {
            return Err(Error::InvalidTtl);
        }

        // Capture the runtime handle up front. This provides a clear error
        // message instead of a cryptic panic from tokio::spawn, and lets
        // inserts arm expirations from non-runtime threads later on.
        let Ok(runtime) = Handle::try_current() else {
            panic!(
                "forgetful::Cache requires a Tokio runtime. \
                 Ensure you are calling Cache::new() or Cache::with_config() \
                 from within a #[tokio::main] or #[tokio::test] context, \
                 or from code running on a Tokio runtime."
            );
        };

        Ok(Self {
            inner: Arc::new(CacheInner {
                entries: DashMap::new(),
                default_ttl: config.default_ttl,
                generation: RwLock::new(CancellationToken::new()),
                revisions: AtomicU64::new(0),
                runtime,
            }),
        })
    }

    /// Checks if a key is currently present
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.entries.contains_key(key)
    }

    /// Retrieves a value by key
    ///
    /// Returns `None` if the key doesn't exist or has already expired.
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.entries.get(key).map(|entry| entry.value().value().clone())
    }

    /// Stores a value under the given key with the cache's default TTL
    ///
    /// If the key already exists, the value is overwritten and the entry's
    /// lifetime starts over from the new insert. Returns the cache itself so
    /// inserts can be chained:
    ///
    /// ```rust,no_run
    /// # use forgetful::Cache;
    /// # use std::time::Duration;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), forgetful::Error> {
    /// let cache = Cache::new(Duration::from_secs(60))?;
    /// cache.set("key1", 1).set("key2", 2).set("key3", 3);
    /// # Ok(())
    /// # }
    /// ```
    pub fn set(&self, key: K, value: V) -> &Self {
        self.insert(key, value, self.inner.default_ttl);
        self
    }

    /// Stores a value under the given key with a per-entry TTL
    ///
    /// The TTL applies to this entry only; later inserts without one fall
    /// back to the cache default.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTtl` if `ttl` is zero. The cache is left
    /// untouched in that case.
    pub fn set_with_ttl(&self, key: K, value: V, ttl: Duration) -> Result<&Self, Error> {
        if ttl.is_zero() {
            return Err(Error::InvalidTtl);
        }
        self.insert(key, value, ttl);
        Ok(self)
    }

    fn insert(&self, key: K, value: V, ttl: Duration) {
        let ttl = ttl.min(MAX_TTL);
        let revision = self.inner.revisions.fetch_add(1, Ordering::Relaxed) + 1;

        // Insert and capture the generation token under the read half, so
        // the token always matches the epoch the entry was written in. A
        // `clear` racing this call either wipes the entry (and the captured
        // token is already cancelled when the timer arms) or runs before it
        // (and the entry keeps a live timer).
        let generation = {
            let guard = self
                .inner
                .generation
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            self.inner.entries.insert(key.clone(), Entry::new(value, revision));
            (*guard).clone()
        };
        self.arm_expiration(generation, key, revision, ttl);
    }

    /// Arms the deferred deletion task for one entry revision
    ///
    /// The task resolves in exactly one of two ways: the TTL elapses and the
    /// key is removed if its revision is still the one targeted, or the
    /// captured generation token is cancelled and the task exits without
    /// touching the cache. The task holds only a weak reference, so pending
    /// expirations never keep a dropped cache alive.
    fn arm_expiration(&self, generation: CancellationToken, key: K, revision: u64, ttl: Duration) {
        let inner = Arc::downgrade(&self.inner);
        self.inner.runtime.spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(ttl) => {
                    let Some(inner) = Weak::upgrade(&inner) else {
                        return;
                    };
                    let removed = inner
                        .entries
                        .remove_if(&key, |_, entry| entry.version() == revision);
                    if removed.is_some() {
                        trace!(revision, "expired entry evicted");
                    }
                }
                _ = generation.cancelled() => {
                    // Invalidated by clear() or shutdown(); resolve silently.
                }
            }
        });
    }

    /// Deletes a key from the cache
    ///
    /// Returns `true` if the key was present, `false` otherwise. The entry's
    /// pending expiration is not cancelled; when it eventually fires it
    /// finds nothing to remove and resolves as a no-op.
    #[must_use = "returns whether the key existed"]
    pub fn delete(&self, key: &K) -> bool {
        self.inner.entries.remove(key).is_some()
    }

    /// Returns the number of entries currently in the cache
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    /// Returns `true` if the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Returns a snapshot of the keys currently present
    pub fn keys(&self) -> Vec<K> {
        self.inner.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Empties the cache and invalidates all pending expirations
    ///
    /// The generation token is retired and replaced with a fresh one:
    /// expirations armed before the call fire as silent no-ops, and inserts
    /// after the call arm against the new token as usual.
    pub fn clear(&self) {
        let mut generation = self
            .inner
            .generation
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let count = self.inner.entries.len();
        self.inner.entries.clear();
        generation.cancel();
        *generation = CancellationToken::new();
        debug!(count, "cache cleared, pending expirations invalidated");
    }

    /// Cancels all pending expirations without touching the entries
    ///
    /// Best-effort cleanup for process teardown: wire this to whatever
    /// lifecycle signal the embedding application has so no expiration task
    /// outlives its owner. Entries already stored stay readable; inserts
    /// after the call expire as usual.
    ///
    /// This is also done automatically when the last handle to the cache is
    /// dropped.
    pub fn shutdown(&self) {
        let mut generation = self
            .inner
            .generation
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        generation.cancel();
        *generation = CancellationToken::new();
        debug!("cache shut down, pending expirations invalidated");
    }
}

impl<K, V> Drop for CacheInner<K, V> {
    fn drop(&mut self) {
        // Wake every pending expiration so none sleeps out its full TTL
        // against a cache that no longer exists.
        if let Ok(generation) = self.generation.get_mut() {
            generation.cancel();
        }
    }
}
