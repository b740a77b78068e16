//! Request DTOs for the diagnostics API
//!
//! Defines the query parameters accepted by the invalidation endpoints.

use serde::Deserialize;

/// Query parameters of `DELETE /cache`
///
/// # Fields
/// - `pattern`: Optional `*` glob; absent or empty clears the whole remote cache
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvalidateParams {
    #[serde(default)]
    pub pattern: Option<String>,
}

/// Query parameters of `DELETE /cache/related/:entity`
///
/// # Fields
/// - `id`: Optional record id, also invalidates `<entity>:<id>:*`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelatedParams {
    #[serde(default)]
    pub id: Option<String>,
}

impl RelatedParams {
    /// The id, with an empty value treated as absent.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}
