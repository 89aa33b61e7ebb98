//! # Repository Module
//!
//! SQL access for the order app store, one repository per table group.
//!
//! ```text
//!   db.preferences() ──► PreferenceRepository ──► preferences
//!   db.assets()      ──► AssetRepository      ──► cache_generations
//!                                                 cached_assets
//! ```
//!
//! Repositories are cheap handles over a pool clone; create them on demand.
//!
//! ## Available Repositories
//!
//! - [`PreferenceRepository`](preference::PreferenceRepository) - key-value preferences
//! - [`AssetRepository`](asset::AssetRepository) - offline asset cache generations

pub mod asset;
pub mod preference;
