//! Category taxonomy
//!
//! Two-level accounting taxonomy (Post → SubPost) and the registry of
//! per-environment mappings.

mod categories;
mod registry;

pub use categories::{Environment, Post, SubPost};
pub use registry::{get_post, list_posts, taxonomy, Taxonomy};
