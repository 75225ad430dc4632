use crate::error::StoreResult;

/// Document-scoped key-value property store.
///
/// All implementations must satisfy these invariants:
/// - A `set` fully replaces the previous value; readers never observe a
///   partially written value.
/// - The store never interprets values. Encoding belongs to the caller.
/// - All I/O errors are propagated, never silently ignored.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any prior value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`. Returns `true` if it existed.
    fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Check whether `key` exists.
    fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        (**self).delete(key)
    }
}
