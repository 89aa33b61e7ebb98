//! # order-core: Order State Engine
//!
//! The product/order state machine and its rendering contract, with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Order App Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              apps/order-app (CLI, text renderer)                │   │
//! │  └───────────┬─────────────────────────────────────┬───────────────┘   │
//! │              │ intents / Screen                    │ cache commands    │
//! │  ┌───────────▼──────────────────────────┐  ┌───────▼───────────────┐   │
//! │  │      ★ order-core (THIS CRATE) ★     │  │     order-cache       │   │
//! │  │                                      │  │  install / activate   │   │
//! │  │  catalog  engine  order  view  i18n  │  │  handle / proxy       │   │
//! │  │                                      │  └───────┬───────────────┘   │
//! │  │  NO I/O • NO DATABASE • NO NETWORK   │          │                   │
//! │  └───────────┬──────────────────────────┘          │                   │
//! │              │ PreferenceStore                     │ CacheStorage      │
//! │  ┌───────────▼─────────────────────────────────────▼───────────────┐   │
//! │  │                order-store (SQLite via sqlx)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product, ViewState and the preference enums
//! - [`money`] - Fixed-point Money (ten-thousandths, no floating point)
//! - [`catalog`] - The ordered product list
//! - [`engine`] - `OrderEngine`, the single owner of session state
//! - [`order`] - Summary totals and submitted orders
//! - [`view`] - The `Screen` view-model renderers consume
//! - [`i18n`] - The validated translation table
//! - [`prefs`] - Preference keys and the `PreferenceStore` trait
//! - [`events`] - Observer subscription types
//!
//! ## Example Usage
//!
//! ```rust
//! use order_core::prelude::*;
//!
//! let mut engine = OrderEngine::new(
//!     Catalog::demo(),
//!     Box::new(MemoryPreferences::new()),
//!     Theme::Light,
//! );
//! engine.adjust_quantity("p1", QuantityChange::Increment);
//! engine.adjust_quantity("p1", QuantityChange::Increment);
//!
//! let screen = Screen::build(&engine, &Translations::builtin());
//! assert_eq!(screen.summary.total, "35.82");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod engine;
pub mod error;
pub mod events;
pub mod i18n;
pub mod money;
pub mod order;
pub mod prefs;
pub mod types;
pub mod validation;
pub mod view;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

/// Everything a front end usually needs.
pub mod prelude {
    pub use crate::catalog::Catalog;
    pub use crate::engine::OrderEngine;
    pub use crate::events::{StateChange, StateObserver, SubscriptionId};
    pub use crate::i18n::{TextKey, Translations};
    pub use crate::money::Money;
    pub use crate::order::{OrderResult, OrderSummary};
    pub use crate::prefs::{MemoryPreferences, PreferenceKey, PreferenceStore};
    pub use crate::types::*;
    pub use crate::view::Screen;
}

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// VAT applied to every order subtotal (12%).
pub const VAT_RATE: TaxRate = TaxRate::from_bps(1200);

/// Number of line slots in the rendered order summary.
///
/// A display cap only: lines beyond it still count toward the totals.
pub const SUMMARY_SLOTS: usize = 5;

/// Fragment that marks the "no image available" placeholder image.
pub const NO_IMAGE_SENTINEL: &str = "No%20Image%20Available";
