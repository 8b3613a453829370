//! Category path normalization.
//!
//! # Responsibility
//! - Turn inconsistent classifier folder suggestions into canonical paths.
//!
//! # See also
//! - crate::model::canonical_path

pub mod path_normalizer;

pub use path_normalizer::normalize;
