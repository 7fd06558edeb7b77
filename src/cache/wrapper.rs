//! Cached function wrapper
//!
//! Binds an async read operation to a deterministic cache key and a
//! declared tag set, delegating storage to [`CacheStore`]. The wrapper is
//! a transparent decorator: it never inspects or transforms the value the
//! read produces.
//!
//! This module owns the canonical key contract: a key is the operation
//! identifier plus the JSON form of the arguments routed through
//! `serde_json::Value`, whose object map keeps fields in sorted order.
//! Two structurally equal argument sets therefore yield identical keys no
//! matter how they were constructed, and two logically different argument
//! sets never collide.

use crate::cache::{store::CacheStore, tags::Tag, types::CacheKey};
use crate::error::{CacheError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type ReadFuture<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;

/// A read operation bound to caching, produced by [`wrap`]
pub struct CachedFn<A, T> {
    store: Arc<CacheStore>,
    operation_id: String,
    tags_of: Arc<dyn Fn(&A) -> Vec<Tag> + Send + Sync>,
    read_fn: Arc<dyn Fn(A) -> ReadFuture<T> + Send + Sync>,
}

impl<A, T> CachedFn<A, T>
where
    A: Serialize + Send + 'static,
    T: Serialize + DeserializeOwned,
{
    /// Call the wrapped read through the cache.
    ///
    /// Computes the canonical key and the tag set from `args`, then
    /// delegates to [`CacheStore::get_or_compute`]. A hit deserializes the
    /// stored value without invoking the read.
    pub async fn call(&self, args: A) -> Result<T> {
        let key = canonical_key(&self.operation_id, &args)?;
        let tags = (self.tags_of)(&args);

        let read_fn = Arc::clone(&self.read_fn);
        let raw = self
            .store
            .get_or_compute(key, tags, move || async move {
                let value = read_fn(args).await?;
                serde_json::to_string(&value)
                    .map_err(|e| CacheError::Serialization(e.to_string()))
            })
            .await?;

        serde_json::from_str(&raw).map_err(|e| CacheError::Serialization(e.to_string()))
    }
}

// Manual impl: the closures are shared, not cloned
impl<A, T> Clone for CachedFn<A, T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            operation_id: self.operation_id.clone(),
            tags_of: Arc::clone(&self.tags_of),
            read_fn: Arc::clone(&self.read_fn),
        }
    }
}

/// Bind a read operation to caching.
///
/// `operation_id` names the read and keeps its keys disjoint from every
/// other operation's. `tags_of` derives the invalidation tag set from the
/// call's arguments, so a read may, for example, tag by user when no
/// entity id is given and by entity id when one is.
pub fn wrap<A, T, G, F, Fut>(
    store: Arc<CacheStore>,
    operation_id: impl Into<String>,
    tags_of: G,
    read_fn: F,
) -> CachedFn<A, T>
where
    A: Serialize + Send + 'static,
    T: Serialize + DeserializeOwned,
    G: Fn(&A) -> Vec<Tag> + Send + Sync + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    CachedFn {
        store,
        operation_id: operation_id.into(),
        tags_of: Arc::new(tags_of),
        read_fn: Arc::new(move |args| Box::pin(read_fn(args)) as ReadFuture<T>),
    }
}

/// Derive the deterministic cache key for one memoized call.
///
/// Arguments are canonicalized through `serde_json::Value`: object fields
/// are emitted in sorted order regardless of declaration or insertion
/// order in the source arguments.
pub fn canonical_key<A: Serialize>(operation_id: &str, args: &A) -> Result<CacheKey> {
    let canonical = serde_json::to_value(args)
        .map_err(|e| CacheError::Serialization(e.to_string()))?;
    Ok(format!("{}:{}", operation_id, canonical))
}
