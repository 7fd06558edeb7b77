//! Canonical invalidation tag construction
//!
//! Every producer (cache writer) and every consumer (invalidator) builds
//! tags through the functions in this module, so format drift cannot
//! silently break invalidation. Tags are opaque to everything else and
//! compared by equality only: no hierarchy is inferred between a global
//! tag and a user/id tag of the same resource.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed enumeration of cached resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    /// Product rows owned by a user
    Products,

    /// Recorded product page views
    ProductViews,

    /// The country reference table
    Countries,

    /// Country discount groupings
    CountryGroups,

    /// User subscription tiers
    Subscriptions,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Products => write!(f, "products"),
            Resource::ProductViews => write!(f, "productViews"),
            Resource::Countries => write!(f, "countries"),
            Resource::CountryGroups => write!(f, "countryGroups"),
            Resource::Subscriptions => write!(f, "subscriptions"),
        }
    }
}

/// An opaque invalidation label scoped to global, user, or entity level,
/// for one resource kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag(String);

impl Tag {
    /// Get the canonical string form of the tag
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Build the tag covering every entry scoped only by resource kind:
/// `global:<resource>`
pub fn global_tag(resource: Resource) -> Tag {
    Tag(format!("global:{}", resource))
}

/// Build the tag covering entries scoped to one user:
/// `user:<userId>:<resource>`
pub fn user_tag(user_id: &str, resource: Resource) -> Tag {
    Tag(format!("user:{}:{}", user_id, resource))
}

/// Build the tag covering entries scoped to one entity:
/// `id:<entityId>:<resource>`
pub fn id_tag(entity_id: &str, resource: Resource) -> Tag {
    Tag(format!("id:{}:{}", entity_id, resource))
}
