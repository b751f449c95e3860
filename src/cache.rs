//! # Step Cache
//!
//! Content-addressed memoization for research steps. Calling a step twice with
//! the same inputs returns the stored result instead of hitting the provider
//! again.
//!
//! The key is the SHA-256 of the step name plus the JSON-serialized inputs.
//! The gateway handle is not part of the key. Entries are never
//! evicted: the cache lives as long as the pipeline that owns it, and only
//! successful results are stored.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Mutex;
use tracing::debug;

use crate::error::Result;

/// Hex-encoded SHA-256 over `(step, inputs)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new<K: Serialize>(step: &str, inputs: &K) -> Result<Self> {
        let inputs = serde_json::to_vec(inputs)?;

        let mut hasher = Sha256::new();
        hasher.update(step.as_bytes());
        hasher.update([0u8]);
        hasher.update(&inputs);
        Ok(Self(format!("{:x}", hasher.finalize())))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unbounded in-memory store of step results.
#[derive(Debug, Default)]
pub struct StepCache {
    entries: Mutex<HashMap<CacheKey, Value>>,
}

impl StepCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `(step, inputs)` or compute and store it.
    ///
    /// The lock is never held across the `compute` future. Errors from
    /// `compute` are returned as-is and leave the cache untouched.
    pub async fn get_or_compute<K, V, F, Fut>(&self, step: &str, inputs: &K, compute: F) -> Result<V>
    where
        K: Serialize,
        V: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        let key = CacheKey::new(step, inputs)?;

        if let Some(hit) = self.lookup(&key) {
            debug!(step, key = %key, "Step cache hit");
            return Ok(serde_json::from_value(hit)?);
        }

        let value = compute().await?;
        self.lock().insert(key, serde_json::to_value(&value)?);
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lookup(&self, key: &CacheKey) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, Value>> {
        // A poisoned map still holds complete entries.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
