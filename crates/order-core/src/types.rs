//! # Domain Types
//!
//! Core domain types shared by the engine and its renderers.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   ViewState     │   │    TaxRate      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  selected_index │   │  bps (u32)      │       │
//! │  │  name           │   │  language       │   │  1200 = 12%     │       │
//! │  │  price (fixed)  │   │  theme          │   └─────────────────┘       │
//! │  │  quantity (>=0) │   │  delivery       │                              │
//! │  │  image_url      │   │  modal_image    │                              │
//! │  └─────────────────┘   │  cookie consent │                              │
//! │                        └─────────────────┘                              │
//! │                                                                         │
//! │  Language {En, Es}   Theme {Light, Dark}   DeliveryChoice {Yes, No}     │
//! │  Direction {Previous, Next}   QuantityChange {Decrement, Increment}     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, ValidationError};
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1200 bps = 12%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Product
// =============================================================================

/// A purchasable catalog entry together with its ordered quantity.
///
/// Price is fixed once the catalog is loaded; only the quantity moves, and it
/// never drops below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    id: String,
    name: String,
    #[ts(type = "string")]
    price: Money,
    #[serde(default)]
    quantity: u32,
    #[serde(default)]
    image_url: Option<String>,
}

impl Product {
    /// Creates a product with zero quantity and no image.
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        Product {
            id: id.into(),
            name: name.into(),
            price,
            quantity: 0,
            image_url: None,
        }
    }

    /// Sets the image reference. Blank references mean "no image".
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.image_url = if url.trim().is_empty() { None } else { Some(url) };
        self
    }

    /// Sets the starting quantity.
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn price(&self) -> Money {
        self.price
    }

    #[inline]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the image reference, treating blank strings as missing.
    pub fn image_url(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }

    /// Active products are the ones that appear in the order summary.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.quantity > 0
    }

    /// `quantity × price`, unrounded.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }

    /// Applies a ±1 change, clamping at zero. Returns the new quantity.
    pub(crate) fn apply(&mut self, change: QuantityChange) -> u32 {
        self.quantity = match change {
            QuantityChange::Increment => self.quantity.saturating_add(1),
            QuantityChange::Decrement => self.quantity.saturating_sub(1),
        };
        self.quantity
    }
}

// =============================================================================
// Intents
// =============================================================================

/// Carousel navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// A single-step quantity adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    Decrement,
    Increment,
}

// =============================================================================
// Preferences Enums
// =============================================================================

/// Supported display languages.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Es];

    /// The persisted code (`"en"` / `"es"`).
    pub const fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }

    /// The language a toggle switches to.
    pub const fn other(&self) -> Language {
        match self {
            Language::En => Language::Es,
            Language::Es => Language::En,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "es" => Ok(Language::Es),
            _ => Err(ValidationError::not_allowed("language", &["en", "es"]).into()),
        }
    }
}

/// Colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const fn code(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub const fn other(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Theme {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(ValidationError::not_allowed("theme", &["light", "dark"]).into()),
        }
    }
}

/// Whether the order includes delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum DeliveryChoice {
    Yes,
    No,
}

impl DeliveryChoice {
    pub const fn code(&self) -> &'static str {
        match self {
            DeliveryChoice::Yes => "yes",
            DeliveryChoice::No => "no",
        }
    }
}

impl fmt::Display for DeliveryChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for DeliveryChoice {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" | "y" => Ok(DeliveryChoice::Yes),
            "no" | "n" => Ok(DeliveryChoice::No),
            _ => Err(ValidationError::not_allowed("delivery", &["yes", "no"]).into()),
        }
    }
}

// =============================================================================
// View State
// =============================================================================

/// Per-session selection and preference state, distinct from catalog data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ViewState {
    /// Index of the product shown in the single-item viewer.
    pub selected_index: usize,
    pub language: Language,
    pub theme: Theme,
    /// `None` until the user picks one of the two options.
    pub delivery: Option<DeliveryChoice>,
    /// Image currently shown in the zoom modal.
    pub modal_image: Option<String>,
    pub cookie_consent_accepted: bool,
}

impl ViewState {
    /// Fresh state with the given theme and every other field at its default.
    pub fn new(theme: Theme) -> Self {
        ViewState {
            selected_index: 0,
            language: Language::default(),
            theme,
            delivery: None,
            modal_image: None,
            cookie_consent_accepted: false,
        }
    }

    #[inline]
    pub fn is_modal_open(&self) -> bool {
        self.modal_image.is_some()
    }
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState::new(Theme::default())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_binding_matches_serde() {
        let decl = <Product as TS>::decl();
        assert!(decl.contains("imageUrl"));
        assert!(!decl.contains("img"));

        let product = Product::new("p1", "Mug", Money::from_cents(100));
        let json = serde_json::to_value(product).unwrap();
        assert!(json.get("imageUrl").is_some());
    }

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(1200);
        assert_eq!(rate.bps(), 1200);
        assert!((rate.percentage() - 12.0).abs() < 0.001);
    }

    #[test]
    fn test_quantity_never_negative() {
        let mut product = Product::new("p1", "Mug", Money::from_cents(1599));
        assert_eq!(product.apply(QuantityChange::Decrement), 0);
        assert_eq!(product.apply(QuantityChange::Increment), 1);
        assert_eq!(product.apply(QuantityChange::Decrement), 0);
        assert_eq!(product.apply(QuantityChange::Decrement), 0);
    }

    #[test]
    fn test_blank_image_is_missing() {
        let product = Product::new("p3", "Book", Money::from_cents(999)).with_image("   ");
        assert_eq!(product.image_url(), None);

        let json = r#"{"id":"p3","name":"Book","price":"9.99","img":""}"#;
        let parsed: Product = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.image_url(), None);
        assert_eq!(parsed.quantity(), 0);
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!("EN".parse::<Language>().unwrap(), Language::En);
        assert_eq!(" es ".parse::<Language>().unwrap(), Language::Es);
        assert!("fr".parse::<Language>().is_err());
        assert_eq!(Language::En.other(), Language::Es);
    }

    #[test]
    fn test_theme_and_delivery_parsing() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("blue".parse::<Theme>().is_err());
        assert_eq!("y".parse::<DeliveryChoice>().unwrap(), DeliveryChoice::Yes);
        assert_eq!("no".parse::<DeliveryChoice>().unwrap(), DeliveryChoice::No);
    }

    #[test]
    fn test_view_state_default() {
        let view = ViewState::default();
        assert_eq!(view.language, Language::En);
        assert_eq!(view.theme, Theme::Light);
        assert!(!view.is_modal_open());
        assert!(!view.cookie_consent_accepted);
    }
}
