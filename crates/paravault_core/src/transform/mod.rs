//! Content rewrites for migrated notes.
//!
//! # Responsibility
//! - Keep tag escaping and asset-link rebasing pure and composable.

pub mod content_transformer;

pub use content_transformer::{rebase_asset_links, ContentTransformer, DEFAULT_TRUSTED_TAGS};
