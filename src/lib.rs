//! # dbcache
//!
//! A process-local, tag-indexed, read-through cache for multi-tenant
//! dashboard reads.
//!
//! ## Features
//!
//! - Read-through memoization of async read operations
//! - Singleflight: concurrent identical requests share one computation
//! - Multi-dimensional invalidation (global / per-user / per-entity)
//!   through a tag -> keys reverse index, without a full flush
//! - Generation fencing: a slow computation can never repopulate an entry
//!   invalidated during its execution
//! - No negative caching: a failed read is delivered to every waiter and
//!   the key reverts to absent
//! - Optional LRU capacity bound
//!
//! ## Usage
//!
//! Read paths bind their queries with [`wrap`] and declare the tags each
//! call depends on. Write paths, after committing, call
//! [`InvalidationDispatcher::revalidate`] with the resource kind and the
//! user/entity scope the mutation touched.
//!
//! ```no_run
//! use dbcache::{
//!     wrap, CacheConfig, CacheStore, InvalidationDispatcher, Resource,
//!     RevalidateScope, user_tag,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> dbcache::Result<()> {
//!     let store = Arc::new(CacheStore::new(CacheConfig::default()));
//!
//!     let get_products = wrap(
//!         Arc::clone(&store),
//!         "getProducts",
//!         |user_id: &String| vec![user_tag(user_id, Resource::Products)],
//!         |user_id: String| async move {
//!             // expensive database read goes here
//!             Ok(vec![format!("product-of-{user_id}")])
//!         },
//!     );
//!
//!     let products = get_products.call("u42".to_string()).await?;
//!     println!("{products:?}");
//!
//!     // After creating a product for u42:
//!     let dispatcher = InvalidationDispatcher::new(Arc::clone(&store));
//!     dispatcher
//!         .revalidate(Resource::Products, RevalidateScope::user("u42"))
//!         .await;
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod error;

// Re-export main types for convenience
pub use cache::{
    canonical_key, global_tag, id_tag, user_tag, wrap, CacheConfig, CacheConfigBuilder,
    CachedFn, CacheKey, CacheStats, CacheStore, CacheValue, InvalidationDispatcher, Resource,
    RevalidateScope, Tag,
};
pub use error::{CacheError, Result};
