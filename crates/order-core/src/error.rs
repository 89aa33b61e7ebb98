//! # Error Types
//!
//! Domain-specific error types for order-core.
//!
//! ## Where Errors Can Occur
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  Startup (fallible)                  Session (total, never fails)       │
//! │  ──────────────────                  ────────────────────────────       │
//! │  Catalog::new / from_json            navigate, adjust_quantity          │
//! │  Translations::builtin / from_json   compute_summary, submit_order      │
//! │  Money::from_str                     set_language / theme / delivery    │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  CoreError ◄── ValidationError                                          │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  AppError (order-app) → printed by main                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Engine operations degrade to no-ops instead of returning errors, so every
//! variant here describes bad input at load time.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Two catalog entries share the same product id.
    #[error("Duplicate product id in catalog: {0}")]
    DuplicateProduct(String),

    /// A translation table lacks an entry for a supported language.
    ///
    /// ## When This Occurs
    /// - A custom translations file omits a key
    /// - A new `TextKey` was added without translating it
    #[error("Missing '{key}' translation for language '{language}'")]
    MissingTranslation { language: String, key: String },

    /// A monetary amount could not be parsed.
    #[error("Invalid amount: '{0}'")]
    InvalidMoney(String),

    /// A catalog or translation document is malformed.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::InvalidData(err.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value exceeds its upper bound.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Builds a `NotAllowed` error from a field name and its allowed codes.
    pub fn not_allowed(field: &str, allowed: &[&str]) -> Self {
        ValidationError::NotAllowed {
            field: field.to_string(),
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
