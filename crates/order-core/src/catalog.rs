//! # Catalog
//!
//! The ordered, fixed list of purchasable products.
//!
//! Insertion order is significant: it drives carousel navigation and the
//! order of summary lines. Products cannot be added or removed once the
//! catalog is built; only quantities change, through the engine.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;
use crate::validation::validate_product;

/// Ordered product list with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

/// Catalog files may be a bare array or `{ "products": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    List(Vec<ProductEntry>),
    Wrapped { products: Vec<ProductEntry> },
}

/// One product as written in a catalog file. `img` is accepted for `imageUrl`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductEntry {
    id: String,
    name: String,
    price: Money,
    #[serde(default)]
    quantity: u32,
    #[serde(default, alias = "img")]
    image_url: Option<String>,
}

impl From<ProductEntry> for Product {
    fn from(entry: ProductEntry) -> Self {
        Product::new(entry.id, entry.name, entry.price)
            .with_quantity(entry.quantity)
            .with_image(entry.image_url.unwrap_or_default())
    }
}

impl Catalog {
    /// Builds a catalog, validating every product and rejecting duplicate ids.
    pub fn new(products: Vec<Product>) -> CoreResult<Self> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            validate_product(product)?;
            if !seen.insert(product.id()) {
                return Err(CoreError::DuplicateProduct(product.id().to_string()));
            }
        }
        Ok(Catalog { products })
    }

    /// A catalog with no products.
    pub fn empty() -> Self {
        Catalog::default()
    }

    /// The five demo products the app ships with.
    ///
    /// | id | name              | price | image |
    /// |----|-------------------|-------|-------|
    /// | p1 | Liquid Glass Mug  | 15.99 | yes   |
    /// | p2 | Neumorphic Lamp   | 34.50 | yes   |
    /// | p3 | AR Book Viewer    |  9.99 | none  |
    /// | p4 | Ergo Mouse Pad    | 12.00 | yes   |
    /// | p5 | Ambient LED Strip | 22.75 | yes   |
    pub fn demo() -> Self {
        const IMAGE_BASE: &str = "https://via.placeholder.com/300x200?text=";

        let products = vec![
            Product::new("p1", "Liquid Glass Mug", Money::from_cents(1599))
                .with_image(format!("{IMAGE_BASE}Glass+Mug")),
            Product::new("p2", "Neumorphic Lamp", Money::from_cents(3450))
                .with_image(format!("{IMAGE_BASE}Lamp")),
            Product::new("p3", "AR Book Viewer", Money::from_cents(999)),
            Product::new("p4", "Ergo Mouse Pad", Money::from_cents(1200))
                .with_image(format!("{IMAGE_BASE}Mouse+Pad")),
            Product::new("p5", "Ambient LED Strip", Money::from_cents(2275))
                .with_image(format!("{IMAGE_BASE}LED+Strip")),
        ];

        Catalog { products }
    }

    /// Parses and validates a JSON catalog document.
    ///
    /// ## Example
    /// ```rust
    /// use order_core::catalog::Catalog;
    ///
    /// let json = r#"[{"id":"p1","name":"Mug","price":15.99,"img":""}]"#;
    /// let catalog = Catalog::from_json(json).unwrap();
    /// assert_eq!(catalog.len(), 1);
    /// ```
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let entries = match serde_json::from_str::<CatalogFile>(json)? {
            CatalogFile::List(entries) => entries,
            CatalogFile::Wrapped { products } => products,
        };
        Catalog::new(entries.into_iter().map(Product::from).collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Product at a carousel index.
    pub fn get(&self, index: usize) -> Option<&Product> {
        self.products.get(index)
    }

    /// Product by id.
    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id() == id)
    }

    /// Carousel index of a product id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.products.iter().position(|p| p.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Products with a positive quantity, in catalog order.
    pub fn active(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.is_active())
    }

    pub(crate) fn find_mut(&mut self, id: &str) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id() == id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QuantityChange;

    #[test]
    fn test_demo_catalog() {
        let catalog = Catalog::demo();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.get(0).unwrap().name(), "Liquid Glass Mug");
        assert_eq!(catalog.find("p3").unwrap().image_url(), None);
        assert_eq!(catalog.position("p5"), Some(4));
        assert_eq!(catalog.active().count(), 0);
        assert!(Catalog::new(catalog.products().to_vec()).is_ok());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let products = vec![
            Product::new("p1", "Mug", Money::from_cents(100)),
            Product::new("p1", "Lamp", Money::from_cents(200)),
        ];
        let err = Catalog::new(products).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateProduct(id) if id == "p1"));
    }

    #[test]
    fn test_negative_price_rejected() {
        let json = r#"[{"id":"p1","name":"Mug","price":"-1.00"}]"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_from_json_wrapped() {
        let json = r#"{"products":[
            {"id":"a","name":"A","price":"1.50","imageUrl":"https://x/a.png"},
            {"id":"b","name":"B","price":2}
        ]}"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).unwrap().image_url(), Some("https://x/a.png"));
        assert_eq!(catalog.get(1).unwrap().price(), Money::from_cents(200));
    }

    #[test]
    fn test_img_field_accepted() {
        let json = r#"[
            {"id":"a","name":"A","price":"1.50","img":"https://x/a.png"},
            {"id":"b","name":"B","price":"2.00","img":"  "}
        ]"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.get(0).unwrap().image_url(), Some("https://x/a.png"));
        assert_eq!(catalog.get(1).unwrap().image_url(), None);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Catalog::from_json("{not json"),
            Err(CoreError::InvalidData(_))
        ));
    }

    #[test]
    fn test_active_preserves_order() {
        let mut catalog = Catalog::demo();
        catalog.find_mut("p4").unwrap().apply(QuantityChange::Increment);
        catalog.find_mut("p2").unwrap().apply(QuantityChange::Increment);

        let ids: Vec<&str> = catalog.active().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["p2", "p4"]);
    }
}
