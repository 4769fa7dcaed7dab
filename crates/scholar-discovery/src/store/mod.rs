//! Repositories injected into the engine.
//!
//! - [`UserProfileStore`]: one profile per user, last write wins
//! - [`PaperCatalog`]: paper records by identifier, cached in front of the proxy

mod catalog;
mod profiles;

pub use catalog::{CachedCatalog, PaperCatalog};
pub use profiles::{InMemoryProfileStore, UserProfileStore};
