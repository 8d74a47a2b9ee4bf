/// A stored value stamped with the revision that wrote it
///
/// Every insert bumps the cache-wide revision counter, so a pending
/// expiration can tell whether the entry it targets has been overwritten
/// since it was armed.
#[derive(Debug, Clone)]
pub struct Entry<V> {
    value: V,
    version: u64,
}

impl<V> Entry<V> {
    /// Creates a new entry with the given value and version stamp
    pub fn new(value: V, version: u64) -> Self {
        Self { value, version }
    }

    /// Returns a reference to the stored value
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Returns the revision that wrote this entry
    pub fn version(&self) -> u64 {
        self.version
    }
}
