//! # Validation Module
//!
//! Load-time checks for catalog entries.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Catalog Load                                       │
//! │                                                                         │
//! │  catalog.json / Catalog::demo()                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  serde (shape, price parsing)                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  validate_product ← THIS MODULE (id, name, price, image)                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Catalog::new (uniqueness of ids)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Once a catalog passes these checks, engine operations never fail.

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Product;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_ID_LEN: usize = 64;
const MAX_NAME_LEN: usize = 200;
const MAX_IMAGE_URL_LEN: usize = 2048;

/// Highest accepted unit price: $1,000,000.00.
pub const MAX_PRICE: Money = Money::from_cents(100_000_000);

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product id.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - Letters, digits, hyphens and underscores only
///
/// ## Example
/// ```rust
/// use order_core::validation::validate_product_id;
///
/// assert!(validate_product_id("p1").is_ok());
/// assert!(validate_product_id("").is_err());
/// assert!(validate_product_id("p 1").is_err());
/// ```
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    if id.len() > MAX_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "id".to_string(),
            max: MAX_ID_LEN,
        });
    }

    if !id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "id".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product display name.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an optional image reference.
///
/// Blank references are allowed (they render the "no image" placeholder), but
/// a present reference must not contain whitespace.
pub fn validate_image_url(url: Option<&str>) -> ValidationResult<()> {
    let Some(url) = url else {
        return Ok(());
    };

    if url.len() > MAX_IMAGE_URL_LEN {
        return Err(ValidationError::TooLong {
            field: "imageUrl".to_string(),
            max: MAX_IMAGE_URL_LEN,
        });
    }

    if url.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "imageUrl".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
/// - Must not exceed [`MAX_PRICE`]
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    if price > MAX_PRICE {
        return Err(ValidationError::TooLarge {
            field: "price".to_string(),
            max: MAX_PRICE.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Runs every per-field check against a product.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_product_id(product.id())?;
    validate_product_name(product.name())?;
    validate_price(product.price())?;
    validate_image_url(product.image_url())?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_id() {
        assert!(validate_product_id("p1").is_ok());
        assert!(validate_product_id("led_strip-2").is_ok());
        assert!(matches!(
            validate_product_id("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_product_id(&"x".repeat(65)),
            Err(ValidationError::TooLong { max: 64, .. })
        ));
        assert!(matches!(
            validate_product_id("p/1"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Liquid Glass Mug").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(999)).is_ok());
        assert!(matches!(
            validate_price(Money::from_cents(-1)),
            Err(ValidationError::Negative { .. })
        ));
        assert!(validate_price(MAX_PRICE).is_ok());
        assert!(matches!(
            validate_price(MAX_PRICE + Money::from_raw(1)),
            Err(ValidationError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_oversized_price_rejected_by_catalog() {
        let json = r#"[{"id":"p1","name":"Yacht","price":"500000000000000"}]"#;
        assert!(crate::catalog::Catalog::from_json(json).is_err());
    }

    #[test]
    fn test_validate_image_url() {
        assert!(validate_image_url(None).is_ok());
        assert!(validate_image_url(Some("https://via.placeholder.com/300x200?text=Lamp")).is_ok());
        assert!(validate_image_url(Some("bad url")).is_err());
    }

    #[test]
    fn test_validate_product() {
        let ok = Product::new("p2", "Neumorphic Lamp", Money::from_cents(3450));
        assert!(validate_product(&ok).is_ok());

        let bad = Product::new("p2", "", Money::from_cents(3450));
        assert!(validate_product(&bad).is_err());
    }
}
