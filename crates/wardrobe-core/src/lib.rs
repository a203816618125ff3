//! # wardrobe-core
//!
//! Core types, traits, and tag orchestration for the wardrobe attribute
//! taxonomy.
//!
//! Colors, materials and occasions share one generic catalog parameterized
//! by [`AttributeKind`]; seasons are a fixed vocabulary. Concrete stores
//! implement the traits in [`traits`]: `wardrobe-db` on PostgreSQL and,
//! with the `test-utils` feature, `memory` in memory.

pub mod access;
pub mod defaults;
pub mod error;
pub mod item_tags;
pub mod logging;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod models;
pub mod normalize;
pub mod options;
pub mod retry;
pub mod seasons;
pub mod traits;

// Re-export commonly used types at crate root
pub use access::AccessDecision;
pub use error::{Error, Result};
pub use item_tags::ItemTagOrchestrator;
pub use models::*;
pub use normalize::{clean_label, clean_tag, display_label, normalize_label, same_label};
pub use options::merge_options;
pub use retry::RetryPolicy;
pub use seasons::{resolve_seasons, Season, SeasonCatalog};
pub use traits::*;
