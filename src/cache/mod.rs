//! # Tag-Indexed Read-Through Cache
//!
//! Memoizes expensive per-user / per-entity reads and invalidates exactly
//! the memoized entries affected by a write, without flushing unrelated
//! data.
//!
//! ## Architecture
//!
//! Four components, leaves first:
//! - [`tags`] - pure functions producing canonical invalidation tags from
//!   a resource kind and an optional scope
//! - [`store`] - the concurrent key->entry map plus a tag->keys reverse
//!   index; owns the singleflight and generation-fencing guarantees
//! - [`wrapper`] - binds an arbitrary async read to a deterministic cache
//!   key and a declared tag set
//! - [`dispatch`] - translates a mutation's "what changed" description
//!   into the concrete tag set and purges it
//!
//! ## Example
//!
//! ```rust
//! use dbcache::{
//!     wrap, CacheConfig, CacheStore, InvalidationDispatcher, Resource,
//!     RevalidateScope, user_tag,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> dbcache::Result<()> {
//! let store = Arc::new(CacheStore::new(CacheConfig::default()));
//!
//! // Bind a read to the cache, tagged per user
//! let get_product_count = wrap(
//!     Arc::clone(&store),
//!     "getProductCount",
//!     |user_id: &String| vec![user_tag(user_id, Resource::Products)],
//!     |user_id: String| async move {
//!         // ... query the database ...
//!         Ok(42u64)
//!     },
//! );
//!
//! let count = get_product_count.call("u42".to_string()).await?;
//!
//! // After a committed write, purge exactly what it affected
//! let dispatcher = InvalidationDispatcher::new(Arc::clone(&store));
//! dispatcher
//!     .revalidate(Resource::Products, RevalidateScope::user("u42"))
//!     .await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatch;
mod entry;
pub mod store;
pub mod tags;
pub mod types;
pub mod wrapper;

pub use config::{CacheConfig, CacheConfigBuilder};
pub use dispatch::{InvalidationDispatcher, RevalidateScope};
pub use store::CacheStore;
pub use tags::{global_tag, id_tag, user_tag, Resource, Tag};
pub use types::{CacheKey, CacheStats, CacheValue};
pub use wrapper::{canonical_key, wrap, CachedFn};
