use std::time::Duration;

/// Configuration for a cache instance
///
/// # Example
///
/// ```rust
/// use forgetful::CacheConfig;
/// use std::time::Duration;
///
/// let config = CacheConfig::default()
///     .with_default_ttl(Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL applied when a set does not supply one (default: 60 seconds)
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(60),
        }
    }
}

impl CacheConfig {
    /// Creates a new configuration with the given default TTL
    pub fn new(default_ttl: Duration) -> Self {
        Self { default_ttl }
    }

    /// Sets the TTL used by inserts that do not carry their own
    ///
    /// # Example
    ///
    /// ```rust
    /// use forgetful::CacheConfig;
    /// use std::time::Duration;
    ///
    /// // Entries live for five minutes unless told otherwise
    /// let config = CacheConfig::default()
    ///     .with_default_ttl(Duration::from_secs(300));
    /// ```
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.default_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_custom_default_ttl() {
        let config = CacheConfig::default().with_default_ttl(Duration::from_secs(30));
        assert_eq!(config.default_ttl, Duration::from_secs(30));
    }

    #[test]
    fn test_new_sets_ttl() {
        let config = CacheConfig::new(Duration::from_millis(100));
        assert_eq!(config.default_ttl, Duration::from_millis(100));
    }
}
