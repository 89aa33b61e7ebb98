//! # Translations
//!
//! One table holds every user-facing string for every supported language.
//!
//! ## Lookup
//! ```text
//!   TextKey::PayButtonLabel ──┐
//!                             ├──► Translations::translate ──► "PAGAR"
//!   Language::Es ─────────────┘
//! ```
//!
//! The table is validated when it is built: a missing (language, key) pair is
//! a startup error, so `translate` itself never fails.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::Language;

// =============================================================================
// Keys
// =============================================================================

/// Identifier of a translatable string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum TextKey {
    AppTitle,
    SummaryTitle,
    PayButtonLabel,
    SubtotalLabel,
    VatLabel,
    TotalLabel,
    DeliveryLabel,
    EmptyItemPlaceholder,
    QtyLabel,
    NoImageAvailable,
    NoProductsLoaded,
    OrderConfirmedMessage,
    EmptyOrderMessage,
    DeliveryYesLabel,
    DeliveryNoLabel,
    CookieBannerMessage,
    AcceptCookiesLabel,
    NotAvailable,
    /// Template; `{name}` is replaced by the product name.
    AddItemLabel,
    /// Template; `{name}` is replaced by the product name.
    RemoveItemLabel,
    /// Stands in for a product name when the catalog is empty.
    GenericItemName,
    ImageLabel,
    ZoomLabel,
    CloseHint,
}

impl TextKey {
    pub const ALL: [TextKey; 24] = [
        TextKey::AppTitle,
        TextKey::SummaryTitle,
        TextKey::PayButtonLabel,
        TextKey::SubtotalLabel,
        TextKey::VatLabel,
        TextKey::TotalLabel,
        TextKey::DeliveryLabel,
        TextKey::EmptyItemPlaceholder,
        TextKey::QtyLabel,
        TextKey::NoImageAvailable,
        TextKey::NoProductsLoaded,
        TextKey::OrderConfirmedMessage,
        TextKey::EmptyOrderMessage,
        TextKey::DeliveryYesLabel,
        TextKey::DeliveryNoLabel,
        TextKey::CookieBannerMessage,
        TextKey::AcceptCookiesLabel,
        TextKey::NotAvailable,
        TextKey::AddItemLabel,
        TextKey::RemoveItemLabel,
        TextKey::GenericItemName,
        TextKey::ImageLabel,
        TextKey::ZoomLabel,
        TextKey::CloseHint,
    ];

    /// Key name as it appears in translation files.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TextKey::AppTitle => "appTitle",
            TextKey::SummaryTitle => "summaryTitle",
            TextKey::PayButtonLabel => "payButtonLabel",
            TextKey::SubtotalLabel => "subtotalLabel",
            TextKey::VatLabel => "vatLabel",
            TextKey::TotalLabel => "totalLabel",
            TextKey::DeliveryLabel => "deliveryLabel",
            TextKey::EmptyItemPlaceholder => "emptyItemPlaceholder",
            TextKey::QtyLabel => "qtyLabel",
            TextKey::NoImageAvailable => "noImageAvailable",
            TextKey::NoProductsLoaded => "noProductsLoaded",
            TextKey::OrderConfirmedMessage => "orderConfirmedMessage",
            TextKey::EmptyOrderMessage => "emptyOrderMessage",
            TextKey::DeliveryYesLabel => "deliveryYesLabel",
            TextKey::DeliveryNoLabel => "deliveryNoLabel",
            TextKey::CookieBannerMessage => "cookieBannerMessage",
            TextKey::AcceptCookiesLabel => "acceptCookiesLabel",
            TextKey::NotAvailable => "notAvailable",
            TextKey::AddItemLabel => "addItemLabel",
            TextKey::RemoveItemLabel => "removeItemLabel",
            TextKey::GenericItemName => "genericItemName",
            TextKey::ImageLabel => "imageLabel",
            TextKey::ZoomLabel => "zoomLabel",
            TextKey::CloseHint => "closeHint",
        }
    }
}

// =============================================================================
// Built-in Tables
// =============================================================================

const EN: [(TextKey, &str); 24] = [
    (TextKey::AppTitle, "Order App"),
    (TextKey::SummaryTitle, "Order Items"),
    (TextKey::PayButtonLabel, "PAY"),
    (TextKey::SubtotalLabel, "Subtotal"),
    (TextKey::VatLabel, "VAT"),
    (TextKey::TotalLabel, "Total"),
    (TextKey::DeliveryLabel, "Includes Delivery"),
    (TextKey::EmptyItemPlaceholder, "\u{a0}"),
    (TextKey::QtyLabel, "Qty"),
    (TextKey::NoImageAvailable, "No Image Available"),
    (TextKey::NoProductsLoaded, "No Products Loaded"),
    (
        TextKey::OrderConfirmedMessage,
        "✅ Order submitted (simulated). Thank you!",
    ),
    (TextKey::EmptyOrderMessage, "Your order is empty."),
    (TextKey::DeliveryYesLabel, "Yes"),
    (TextKey::DeliveryNoLabel, "No"),
    (
        TextKey::CookieBannerMessage,
        "We use cookies to remember your language and theme.",
    ),
    (TextKey::AcceptCookiesLabel, "Accept"),
    (TextKey::NotAvailable, "N/A"),
    (TextKey::AddItemLabel, "Add one {name}"),
    (TextKey::RemoveItemLabel, "Remove one {name}"),
    (TextKey::GenericItemName, "item"),
    (TextKey::ImageLabel, "image"),
    (TextKey::ZoomLabel, "zoom"),
    (TextKey::CloseHint, "esc to close"),
];

const ES: [(TextKey, &str); 24] = [
    (TextKey::AppTitle, "Aplicación de Pedido"),
    (TextKey::SummaryTitle, "Artículos del Pedido"),
    (TextKey::PayButtonLabel, "PAGAR"),
    (TextKey::SubtotalLabel, "Subtotal"),
    (TextKey::VatLabel, "IVA"),
    (TextKey::TotalLabel, "Total"),
    (TextKey::DeliveryLabel, "Incluye Envío"),
    (TextKey::EmptyItemPlaceholder, "\u{a0}"),
    (TextKey::QtyLabel, "Cant"),
    (TextKey::NoImageAvailable, "No Hay Imagen Disponible"),
    (TextKey::NoProductsLoaded, "No Hay Productos Cargados"),
    (
        TextKey::OrderConfirmedMessage,
        "✅ Pedido enviado (simulado). ¡Gracias!",
    ),
    (TextKey::EmptyOrderMessage, "Tu pedido está vacío."),
    (TextKey::DeliveryYesLabel, "Sí"),
    (TextKey::DeliveryNoLabel, "No"),
    (
        TextKey::CookieBannerMessage,
        "Usamos cookies para recordar tu idioma y tema.",
    ),
    (TextKey::AcceptCookiesLabel, "Aceptar"),
    (TextKey::NotAvailable, "N/D"),
    (TextKey::AddItemLabel, "Añadir un {name}"),
    (TextKey::RemoveItemLabel, "Quitar un {name}"),
    (TextKey::GenericItemName, "artículo"),
    (TextKey::ImageLabel, "imagen"),
    (TextKey::ZoomLabel, "ampliar"),
    (TextKey::CloseHint, "esc para cerrar"),
];

// =============================================================================
// Translation Table
// =============================================================================

/// Translation file shape: `{ "en": { "appTitle": "..." }, "es": { ... } }`.
type TranslationFile = HashMap<Language, HashMap<TextKey, String>>;

/// Validated translation table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translations {
    entries: HashMap<(Language, TextKey), String>,
}

impl Translations {
    /// The built-in English and Spanish tables.
    pub fn builtin() -> Self {
        let entries = [(Language::En, EN), (Language::Es, ES)]
            .into_iter()
            .flat_map(|(lang, table)| {
                table
                    .into_iter()
                    .map(move |(key, text)| ((lang, key), text.to_string()))
            })
            .collect();
        Translations { entries }
    }

    /// Builds a table from explicit entries, failing on any gap.
    pub fn from_entries<I>(entries: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (Language, TextKey, String)>,
    {
        let table = Translations {
            entries: entries
                .into_iter()
                .map(|(lang, key, text)| ((lang, key), text))
                .collect(),
        };
        table.validate()?;
        Ok(table)
    }

    /// Parses a complete translation document.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let file: TranslationFile = serde_json::from_str(json)?;
        Translations::from_entries(flatten(file))
    }

    /// Built-in tables with some strings replaced from a (partial) document.
    pub fn with_overrides_json(json: &str) -> CoreResult<Self> {
        let file: TranslationFile = serde_json::from_str(json)?;
        let mut table = Translations::builtin();
        for (lang, key, text) in flatten(file) {
            table.entries.insert((lang, key), text);
        }
        table.validate()?;
        Ok(table)
    }

    /// Checks that every supported language has every key.
    pub fn validate(&self) -> CoreResult<()> {
        for lang in Language::ALL {
            for key in TextKey::ALL {
                if !self.entries.contains_key(&(lang, key)) {
                    return Err(CoreError::MissingTranslation {
                        language: lang.code().to_string(),
                        key: key.as_str().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Looks up a string. Tables are validated on construction, so the key
    /// name fallback is unreachable in practice.
    pub fn translate(&self, key: TextKey, language: Language) -> &str {
        self.entries
            .get(&(language, key))
            .map(String::as_str)
            .unwrap_or(key.as_str())
    }

    /// Looks up a template string and fills in `{name}`.
    pub fn translate_with_name(&self, key: TextKey, language: Language, name: &str) -> String {
        self.translate(key, language).replace("{name}", name)
    }
}

impl Default for Translations {
    fn default() -> Self {
        Translations::builtin()
    }
}

fn flatten(file: TranslationFile) -> impl Iterator<Item = (Language, TextKey, String)> {
    file.into_iter().flat_map(|(lang, texts)| {
        texts
            .into_iter()
            .map(move |(key, text)| (lang, key, text))
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_complete() {
        let table = Translations::builtin();
        assert!(table.validate().is_ok());
        for lang in Language::ALL {
            for key in TextKey::ALL {
                assert!(!table.translate(key, lang).is_empty());
            }
        }
    }

    #[test]
    fn test_translate() {
        let table = Translations::builtin();
        assert_eq!(table.translate(TextKey::PayButtonLabel, Language::En), "PAY");
        assert_eq!(table.translate(TextKey::PayButtonLabel, Language::Es), "PAGAR");
        assert_eq!(table.translate(TextKey::VatLabel, Language::Es), "IVA");
        assert_eq!(
            table.translate(TextKey::EmptyOrderMessage, Language::Es),
            "Tu pedido está vacío."
        );
    }

    #[test]
    fn test_name_templates() {
        let table = Translations::builtin();
        assert_eq!(
            table.translate_with_name(TextKey::AddItemLabel, Language::En, "Lamp"),
            "Add one Lamp"
        );
        assert_eq!(
            table.translate_with_name(TextKey::RemoveItemLabel, Language::Es, "Lámpara"),
            "Quitar un Lámpara"
        );
    }

    #[test]
    fn test_incomplete_table_rejected() {
        let entries = TextKey::ALL
            .into_iter()
            .map(|key| (Language::En, key, key.as_str().to_string()));
        let err = Translations::from_entries(entries).unwrap_err();
        assert!(matches!(
            err,
            CoreError::MissingTranslation { ref language, .. } if language == "es"
        ));
    }

    #[test]
    fn test_overrides_merge_onto_builtin() {
        let json = r#"{"en": {"payButtonLabel": "Checkout"}}"#;
        let table = Translations::with_overrides_json(json).unwrap();
        assert_eq!(table.translate(TextKey::PayButtonLabel, Language::En), "Checkout");
        assert_eq!(table.translate(TextKey::PayButtonLabel, Language::Es), "PAGAR");
    }

    #[test]
    fn test_partial_document_is_not_a_full_table() {
        let json = r#"{"en": {"appTitle": "Shop"}, "es": {"appTitle": "Tienda"}}"#;
        assert!(matches!(
            Translations::from_json(json),
            Err(CoreError::MissingTranslation { .. })
        ));
    }

    #[test]
    fn test_unknown_key_is_invalid_data() {
        let json = r#"{"en": {"bogusKey": "x"}}"#;
        assert!(matches!(
            Translations::with_overrides_json(json),
            Err(CoreError::InvalidData(_))
        ));
    }
}
