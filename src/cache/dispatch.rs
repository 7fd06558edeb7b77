//! Invalidation dispatcher
//!
//! Translates a mutation's "what changed" description into the concrete
//! tag set and purges it through the store. The write path must call
//! [`InvalidationDispatcher::revalidate`] synchronously after the mutation
//! is durably committed, never before: invalidating first risks a reader
//! repopulating the cache with pre-mutation data that then never gets
//! invalidated. A mutation touching several resources calls `revalidate`
//! once per affected resource.

use crate::cache::{
    store::CacheStore,
    tags::{global_tag, id_tag, user_tag, Resource},
};
use std::sync::Arc;
use tracing::info;

/// Optional scope for an invalidation: which user and/or entity the
/// mutation touched
#[derive(Debug, Clone, Default)]
pub struct RevalidateScope {
    /// User whose scoped entries should be purged
    pub user_id: Option<String>,

    /// Entity whose scoped entries should be purged
    pub entity_id: Option<String>,
}

impl RevalidateScope {
    /// Scope an invalidation to one user
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            entity_id: None,
        }
    }

    /// Scope an invalidation to one entity
    pub fn entity(entity_id: impl Into<String>) -> Self {
        Self {
            user_id: None,
            entity_id: Some(entity_id.into()),
        }
    }

    /// Scope an invalidation to a user and an entity
    pub fn user_and_entity(user_id: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            entity_id: Some(entity_id.into()),
        }
    }
}

/// Single entry point for write paths to purge the entries a committed
/// mutation affected
pub struct InvalidationDispatcher {
    store: Arc<CacheStore>,
}

impl InvalidationDispatcher {
    /// Create a dispatcher over a shared store
    pub fn new(store: Arc<CacheStore>) -> Self {
        Self { store }
    }

    /// Expand `(resource, scope)` into its tag set and invalidate each
    /// tag. Always includes the global tag; adds the user tag and the
    /// entity tag when the scope names them. Returns the total number of
    /// entries removed.
    pub async fn revalidate(&self, resource: Resource, scope: RevalidateScope) -> usize {
        let mut tags = vec![global_tag(resource)];
        if let Some(user_id) = &scope.user_id {
            tags.push(user_tag(user_id, resource));
        }
        if let Some(entity_id) = &scope.entity_id {
            tags.push(id_tag(entity_id, resource));
        }

        let mut removed = 0;
        for tag in &tags {
            removed += self.store.invalidate_by_tag(tag).await;
        }

        info!(
            resource = %resource,
            tags = tags.len(),
            removed,
            "revalidated resource"
        );
        removed
    }
}
