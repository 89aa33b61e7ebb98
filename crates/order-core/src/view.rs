//! # Rendering Contract
//!
//! Turns engine state into a fully formatted, localized [`Screen`]. A
//! renderer (terminal, web) only lays out the strings it receives here.
//!
//! ## Screen Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Order App                                   [ES]  [theme]              │
//! │                                                                         │
//! │   ◄  ┌──────────────────────┐  ►      Order Items                       │
//! │      │  image / placeholder │         Mug x 2            $31.98         │
//! │      └──────────────────────┘         (empty slot)                      │
//! │      Liquid Glass Mug                 (empty slot)                      │
//! │      $15.99     [-] 2 [+]             (empty slot)                      │
//! │                                       (empty slot)                      │
//! │                                       Subtotal 31.98                    │
//! │  Includes Delivery  [Yes] [No]        VAT 3.84    Total 35.82   [PAY]   │
//! │                                                                         │
//! │  cookie banner (until accepted)                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Formatting Rules
//! - Prices are `$` prefixed with two fraction digits
//! - Summary totals are bare two-digit numbers (`31.98`)
//! - The summary always has exactly [`SUMMARY_SLOTS`] slots

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::engine::{is_zoomable, OrderEngine};
use crate::i18n::{TextKey, Translations};
use crate::money::Money;
use crate::order::{OrderResult, OrderSummary};
use crate::types::{DeliveryChoice, Language, Theme};
use crate::SUMMARY_SLOTS;

/// `$` prefixed amount with two fraction digits.
pub fn format_currency(amount: Money) -> String {
    amount.to_string()
}

/// The localized message shown after pressing PAY.
pub fn message_for(result: &OrderResult, language: Language, translations: &Translations) -> String {
    let key = match result {
        OrderResult::Empty => TextKey::EmptyOrderMessage,
        OrderResult::Submitted(_) => TextKey::OrderConfirmedMessage,
    };
    translations.translate(key, language).to_string()
}

// =============================================================================
// View Models
// =============================================================================

/// What the product image area shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[ts(export)]
pub enum ImageView {
    Image { url: String, alt: String },
    Placeholder { text: String },
}

/// The single-item viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductView {
    /// `None` for an empty catalog.
    pub product_id: Option<String>,
    pub position: usize,
    pub count: usize,
    pub name: String,
    pub price: String,
    pub quantity: u32,
    pub image: ImageView,
    pub zoomable: bool,
    pub add_label: String,
    pub remove_label: String,
}

/// One row of the summary list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SummarySlot {
    pub text: String,
    /// Empty for placeholder slots.
    pub amount: String,
}

impl SummarySlot {
    pub fn is_placeholder(&self) -> bool {
        self.amount.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SummaryView {
    pub title: String,
    pub slots: Vec<SummarySlot>,
    pub subtotal: String,
    pub vat: String,
    pub total: String,
}

impl SummaryView {
    /// Fills the fixed slot list from a summary. Lines past the cap are not
    /// shown but still count in the totals.
    pub fn build(summary: &OrderSummary, language: Language, translations: &Translations) -> Self {
        let placeholder = translations.translate(TextKey::EmptyItemPlaceholder, language);

        let mut slots: Vec<SummarySlot> = summary
            .lines
            .iter()
            .take(SUMMARY_SLOTS)
            .map(|line| SummarySlot {
                text: format!("{} x {}", line.name, line.quantity),
                amount: format_currency(line.line_total),
            })
            .collect();
        slots.resize_with(SUMMARY_SLOTS, || SummarySlot {
            text: placeholder.to_string(),
            amount: String::new(),
        });

        SummaryView {
            title: translations
                .translate(TextKey::SummaryTitle, language)
                .to_string(),
            slots,
            subtotal: summary.subtotal.format_amount(),
            vat: summary.vat.format_amount(),
            total: summary.total.format_amount(),
        }
    }
}

/// Static labels for the current language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Labels {
    pub app_title: String,
    pub pay_button: String,
    pub subtotal: String,
    pub vat: String,
    pub total: String,
    pub qty: String,
    pub delivery: String,
    pub delivery_yes: String,
    pub delivery_no: String,
    pub image: String,
    pub zoom: String,
    pub close_hint: String,
    /// The code of the language a toggle would switch to (`ES` while English
    /// is active).
    pub language_toggle: String,
}

impl Labels {
    pub fn build(language: Language, translations: &Translations) -> Self {
        let t = |key| translations.translate(key, language).to_string();
        Labels {
            app_title: t(TextKey::AppTitle),
            pay_button: t(TextKey::PayButtonLabel),
            subtotal: t(TextKey::SubtotalLabel),
            vat: t(TextKey::VatLabel),
            total: t(TextKey::TotalLabel),
            qty: t(TextKey::QtyLabel),
            delivery: t(TextKey::DeliveryLabel),
            delivery_yes: t(TextKey::DeliveryYesLabel),
            delivery_no: t(TextKey::DeliveryNoLabel),
            image: t(TextKey::ImageLabel),
            zoom: t(TextKey::ZoomLabel),
            close_hint: t(TextKey::CloseHint),
            language_toggle: language.other().code().to_uppercase(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CookieBanner {
    pub message: String,
    pub accept_label: String,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Screen {
    pub language: Language,
    pub theme: Theme,
    pub labels: Labels,
    pub product: ProductView,
    pub summary: SummaryView,
    pub delivery: Option<DeliveryChoice>,
    pub modal_image: Option<String>,
    /// Present until cookies are accepted.
    pub cookie_banner: Option<CookieBanner>,
}

impl Screen {
    /// Builds the current frame from engine state.
    pub fn build(engine: &OrderEngine, translations: &Translations) -> Self {
        let language = engine.language();
        let summary = engine.compute_summary();

        let cookie_banner = (!engine.cookie_consent_accepted()).then(|| CookieBanner {
            message: translations
                .translate(TextKey::CookieBannerMessage, language)
                .to_string(),
            accept_label: translations
                .translate(TextKey::AcceptCookiesLabel, language)
                .to_string(),
        });

        Screen {
            language,
            theme: engine.theme(),
            labels: Labels::build(language, translations),
            product: product_view(engine, translations),
            summary: SummaryView::build(&summary, language, translations),
            delivery: engine.delivery(),
            modal_image: engine.modal_image().map(str::to_string),
            cookie_banner,
        }
    }
}

fn product_view(engine: &OrderEngine, translations: &Translations) -> ProductView {
    let language = engine.language();
    let count = engine.catalog().len();

    let Some(product) = engine.selected_product() else {
        return ProductView {
            product_id: None,
            position: 0,
            count,
            name: translations
                .translate(TextKey::NotAvailable, language)
                .to_string(),
            price: format_currency(Money::zero()),
            quantity: 0,
            image: ImageView::Placeholder {
                text: translations
                    .translate(TextKey::NoProductsLoaded, language)
                    .to_string(),
            },
            zoomable: false,
            add_label: translations.translate_with_name(
                TextKey::AddItemLabel,
                language,
                translations.translate(TextKey::GenericItemName, language),
            ),
            remove_label: translations.translate_with_name(
                TextKey::RemoveItemLabel,
                language,
                translations.translate(TextKey::GenericItemName, language),
            ),
        };
    };

    let image = match product.image_url() {
        Some(url) => ImageView::Image {
            url: url.to_string(),
            alt: product.name().to_string(),
        },
        None => ImageView::Placeholder {
            text: translations
                .translate(TextKey::NoImageAvailable, language)
                .to_string(),
        },
    };

    ProductView {
        product_id: Some(product.id().to_string()),
        position: engine.selected_index() + 1,
        count,
        name: product.name().to_string(),
        price: format_currency(product.price()),
        quantity: product.quantity(),
        zoomable: product.image_url().is_some_and(is_zoomable),
        image,
        add_label: translations.translate_with_name(
            TextKey::AddItemLabel,
            language,
            product.name(),
        ),
        remove_label: translations.translate_with_name(
            TextKey::RemoveItemLabel,
            language,
            product.name(),
        ),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::prefs::MemoryPreferences;
    use crate::types::{Product, QuantityChange};

    fn engine(catalog: Catalog) -> OrderEngine {
        OrderEngine::new(catalog, Box::new(MemoryPreferences::new()), Theme::Light)
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(Money::from_cents(1599)), "$15.99");
        assert_eq!(format_currency(Money::from_cents(1200)), "$12.00");
        assert_eq!(format_currency(Money::from_raw(38_376)), "$3.84");
    }

    #[test]
    fn test_initial_screen() {
        let translations = Translations::builtin();
        let screen = Screen::build(&engine(Catalog::demo()), &translations);

        assert_eq!(screen.labels.app_title, "Order App");
        assert_eq!(screen.labels.language_toggle, "ES");
        assert_eq!(screen.product.name, "Liquid Glass Mug");
        assert_eq!(screen.product.price, "$15.99");
        assert_eq!(screen.product.position, 1);
        assert_eq!(screen.product.count, 5);
        assert_eq!(screen.product.add_label, "Add one Liquid Glass Mug");
        assert!(screen.product.zoomable);
        assert_eq!(screen.summary.slots.len(), SUMMARY_SLOTS);
        assert!(screen.summary.slots.iter().all(SummarySlot::is_placeholder));
        assert_eq!(screen.summary.slots[0].text, "\u{a0}");
        assert_eq!(screen.summary.total, "0.00");
        assert!(screen.cookie_banner.is_some());
    }

    #[test]
    fn test_mug_screen() {
        let mut engine = engine(Catalog::demo());
        engine.adjust_selected(QuantityChange::Increment);
        engine.adjust_selected(QuantityChange::Increment);

        let screen = Screen::build(&engine, &Translations::builtin());
        assert_eq!(screen.summary.slots[0].text, "Liquid Glass Mug x 2");
        assert_eq!(screen.summary.slots[0].amount, "$31.98");
        assert!(screen.summary.slots[1].is_placeholder());
        assert_eq!(screen.summary.subtotal, "31.98");
        assert_eq!(screen.summary.vat, "3.84");
        assert_eq!(screen.summary.total, "35.82");
    }

    #[test]
    fn test_six_lines_show_five_slots() {
        let products = (1..=6)
            .map(|i| {
                Product::new(format!("p{i}"), format!("Item {i}"), Money::from_cents(1000))
                    .with_quantity(1)
            })
            .collect();
        let engine = engine(Catalog::new(products).unwrap());

        let screen = Screen::build(&engine, &Translations::builtin());
        assert_eq!(screen.summary.slots.len(), 5);
        assert_eq!(screen.summary.slots[4].text, "Item 5 x 1");
        assert_eq!(screen.summary.subtotal, "60.00");
        assert_eq!(screen.summary.vat, "7.20");
        assert_eq!(screen.summary.total, "67.20");
    }

    #[test]
    fn test_empty_catalog_screen() {
        let screen = Screen::build(&engine(Catalog::empty()), &Translations::builtin());
        assert_eq!(screen.product.product_id, None);
        assert_eq!(screen.product.name, "N/A");
        assert_eq!(screen.product.price, "$0.00");
        assert_eq!(screen.product.quantity, 0);
        assert_eq!(
            screen.product.image,
            ImageView::Placeholder {
                text: "No Products Loaded".to_string()
            }
        );
        assert_eq!(screen.summary.subtotal, "0.00");
        assert_eq!(screen.summary.vat, "0.00");
        assert_eq!(screen.summary.total, "0.00");
    }

    #[test]
    fn test_missing_image_and_spanish_labels() {
        let mut engine = engine(Catalog::demo());
        engine.set_language(Language::Es);
        engine.navigate(crate::types::Direction::Next);
        engine.navigate(crate::types::Direction::Next);

        let screen = Screen::build(&engine, &Translations::builtin());
        assert_eq!(
            screen.product.image,
            ImageView::Placeholder {
                text: "No Hay Imagen Disponible".to_string()
            }
        );
        assert!(!screen.product.zoomable);
        assert_eq!(screen.labels.pay_button, "PAGAR");
        assert_eq!(screen.labels.language_toggle, "EN");
        assert_eq!(screen.labels.zoom, "ampliar");
        assert_eq!(screen.labels.close_hint, "esc para cerrar");
        assert_eq!(screen.summary.title, "Artículos del Pedido");
        assert_eq!(screen.product.add_label, "Añadir un AR Book Viewer");
        assert_eq!(screen.product.remove_label, "Quitar un AR Book Viewer");

        let empty = engine_es_empty();
        let screen = Screen::build(&empty, &Translations::builtin());
        assert_eq!(screen.product.add_label, "Añadir un artículo");
        assert_eq!(screen.product.remove_label, "Quitar un artículo");
    }

    fn engine_es_empty() -> OrderEngine {
        let mut engine = engine(Catalog::empty());
        engine.set_language(Language::Es);
        engine
    }

    #[test]
    fn test_message_for_result() {
        let translations = Translations::builtin();
        assert_eq!(
            message_for(&OrderResult::Empty, Language::En, &translations),
            "Your order is empty."
        );

        let mut engine = engine(Catalog::demo());
        engine.adjust_quantity("p5", QuantityChange::Increment);
        let result = engine.submit_order();
        assert_eq!(
            message_for(&result, Language::Es, &translations),
            "✅ Pedido enviado (simulado). ¡Gracias!"
        );
    }

    #[test]
    fn test_screen_serializes_camel_case() {
        let mut engine = engine(Catalog::demo());
        engine.accept_cookies();
        let json = serde_json::to_value(Screen::build(&engine, &Translations::builtin())).unwrap();
        assert_eq!(json["labels"]["languageToggle"], "ES");
        assert_eq!(json["product"]["image"]["kind"], "image");
        assert!(json["cookieBanner"].is_null());
    }
}
