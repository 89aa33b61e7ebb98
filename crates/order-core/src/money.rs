//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Ten-Thousandths?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE ROUNDING PROBLEM                                                   │
//! │                                                                         │
//! │  Prices carry 2 decimals, VAT is 12% of the subtotal:                   │
//! │    $31.98 × 12% = $3.8376                                               │
//! │                                                                         │
//! │  Stored in cents, the VAT must be rounded to $3.84 immediately, and     │
//! │  every later sum inherits that error.                                   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer ten-thousandths                                  │
//! │    319_800 units × 1200 bps / 10_000 = 38_376 units  ($3.8376 exact)    │
//! │    Rounding to cents happens ONLY when the value is displayed.          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use order_core::money::Money;
//!
//! let price: Money = "15.99".parse().unwrap();
//! let line = price.multiply_quantity(2);
//! assert_eq!(line.format_amount(), "31.98");
//! assert_eq!(line.to_string(), "$31.98");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::types::TaxRate;

/// Internal units per major currency unit.
pub const SCALE: i64 = 10_000;

/// Number of fraction digits carried internally.
const SCALE_DIGITS: usize = 4;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in ten-thousandths of the currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: arithmetic stays closed under subtraction
/// - **4 fraction digits**: exact for 2-decimal prices and percentage taxes on them
/// - **Serialized as a decimal string**: `"3.8376"`, never a float
///
/// ## Where Money is Used
/// ```text
/// Product.price ──► OrderLine.line_total ──► OrderSummary.subtotal
///                                                 │
///                                                 ▼
///                                     calculate_tax(VAT_RATE) ──► vat
///                                                 │
///                                                 ▼
///                                        total = subtotal + vat
///                                                 │
///                                                 ▼
///                                   format_amount() → "35.82" (display only)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from raw ten-thousandths.
    #[inline]
    pub const fn from_raw(units: i64) -> Self {
        Money(units)
    }

    /// Returns the raw value in ten-thousandths.
    #[inline]
    pub const fn raw(&self) -> i64 {
        self.0
    }

    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use order_core::money::Money;
    ///
    /// let price = Money::from_cents(1599); // $15.99
    /// assert_eq!(price.raw(), 159_900);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents * (SCALE / 100))
    }

    /// Creates a Money value from major units and cents.
    ///
    /// For negative amounts only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -$5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, cents: i64) -> Self {
        if major < 0 {
            Money::from_cents(major * 100 - cents)
        } else {
            Money::from_cents(major * 100 + cents)
        }
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity, saturating at the i64 bounds.
    ///
    /// ## Example
    /// ```rust
    /// use order_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(1599);
    /// assert_eq!(unit_price.multiply_quantity(2), Money::from_cents(3198));
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }

    /// Calculates tax at the given rate without rounding to cents.
    ///
    /// ## Implementation
    /// `amount × bps / 10_000` in i128, rounded half away from zero at the
    /// fourth fraction digit. For cent-granular amounts and whole-percent
    /// rates the division is exact, so nothing is lost.
    ///
    /// ## Example
    /// ```rust
    /// use order_core::money::Money;
    /// use order_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(3198);
    /// let vat = subtotal.calculate_tax(TaxRate::from_bps(1200));
    /// assert_eq!(vat.raw(), 38_376); // $3.8376
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let scaled = self.0 as i128 * rate.bps() as i128;
        Money(div_round_half_away(scaled, 10_000) as i64)
    }

    /// Rounds to whole cents, half away from zero.
    pub fn rounded_cents(&self) -> i64 {
        div_round_half_away(self.0 as i128, (SCALE / 100) as i128) as i64
    }

    /// Formats the amount with exactly 2 fraction digits and no symbol.
    ///
    /// ## Example
    /// ```rust
    /// use order_core::money::Money;
    ///
    /// assert_eq!(Money::from_raw(38_376).format_amount(), "3.84");
    /// assert_eq!(Money::zero().format_amount(), "0.00");
    /// ```
    pub fn format_amount(&self) -> String {
        let cents = self.rounded_cents();
        let sign = if cents < 0 { "-" } else { "" };
        let abs = cents.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }

    /// Formats the full stored precision, keeping at least 2 fraction digits.
    ///
    /// Used for serialization so that unrounded values survive a round trip.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = SCALE as u64;
        let mut frac = format!("{:0width$}", abs % scale, width = SCALE_DIGITS);
        while frac.len() > 2 && frac.ends_with('0') {
            frac.pop();
        }
        format!("{}{}.{}", sign, abs / scale, frac)
    }
}

/// Integer division rounding half away from zero.
fn div_round_half_away(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.abs() * 2 >= denominator {
        quotient + numerator.signum()
    } else {
        quotient
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

// Arithmetic saturates at the i64 bounds.

/// Shows money as a `$` prefixed amount rounded to cents.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = self.format_amount();
        match amount.strip_prefix('-') {
            Some(abs) => write!(f, "-${}", abs),
            None => write!(f, "${}", amount),
        }
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Parses a plain decimal such as `"15.99"`, `"-2.5"` or `"12"`.
///
/// At most four fraction digits are accepted; anything finer would be
/// silently truncated, so it is rejected instead.
impl FromStr for Money {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let invalid = || CoreError::InvalidMoney(s.to_string());
        let trimmed = s.trim();

        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
            || frac.len() > SCALE_DIGITS
        {
            return Err(invalid());
        }

        let whole_units: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac_units: i64 = if frac.is_empty() {
            0
        } else {
            let parsed: i64 = frac.parse().map_err(|_| invalid())?;
            parsed * 10_i64.pow((SCALE_DIGITS - frac.len()) as u32)
        };

        let raw = whole_units
            .checked_mul(SCALE)
            .and_then(|v| v.checked_add(frac_units))
            .ok_or_else(invalid)?;

        Ok(Money(if negative { -raw } else { raw }))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal_string())
    }
}

/// Accepted JSON shapes for a price: `"15.99"`, `12` or `15.99`.
#[derive(Deserialize)]
#[serde(untagged)]
enum MoneyRepr {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match MoneyRepr::deserialize(deserializer)? {
            MoneyRepr::Text(text) => text.parse().map_err(serde::de::Error::custom),
            MoneyRepr::Integer(whole) => whole
                .checked_mul(SCALE)
                .map(Money)
                .ok_or_else(|| serde::de::Error::custom("amount out of range")),
            MoneyRepr::Float(value) => {
                let scaled = (value * SCALE as f64).round();
                if !scaled.is_finite() || scaled.abs() > i64::MAX as f64 {
                    return Err(serde::de::Error::custom("amount out of range"));
                }
                Ok(Money(scaled as i64))
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.raw(), 109_900);
        assert_eq!(money.rounded_cents(), 1099);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99), Money::from_cents(1099));
        assert_eq!(Money::from_major_minor(-5, 50), Money::from_cents(-550));
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Money::from_raw(i64::MAX / 2 + 1);
        assert_eq!(huge.multiply_quantity(2), Money::from_raw(i64::MAX));
        assert_eq!(huge + huge, Money::from_raw(i64::MAX));
        assert_eq!(Money::from_raw(i64::MIN) - Money::from_cents(1), Money::from_raw(i64::MIN));

        let total: Money = [huge, huge, Money::from_cents(1)].into_iter().sum();
        assert_eq!(total, Money::from_raw(i64::MAX));

        let mut acc = huge;
        acc += huge;
        assert_eq!(acc, Money::from_raw(i64::MAX));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(500).to_string(), "$5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(Money::from_raw(38_376).format_amount(), "3.84");
        assert_eq!(Money::from_raw(358_176).format_amount(), "35.82");
        assert_eq!(Money::from_raw(12_350).format_amount(), "1.24");
        assert_eq!(Money::from_raw(12_349).format_amount(), "1.23");
        assert_eq!(Money::from_raw(-12_350).format_amount(), "-1.24");
    }

    #[test]
    fn test_vat_is_not_rounded() {
        let subtotal = Money::from_cents(3198);
        let vat = subtotal.calculate_tax(TaxRate::from_bps(1200));
        assert_eq!(vat.to_decimal_string(), "3.8376");
        assert_eq!((subtotal + vat).to_decimal_string(), "35.8176");
    }

    #[test]
    fn test_parse() {
        assert_eq!("15.99".parse::<Money>().unwrap(), Money::from_cents(1599));
        assert_eq!("34.5".parse::<Money>().unwrap(), Money::from_cents(3450));
        assert_eq!("12".parse::<Money>().unwrap(), Money::from_cents(1200));
        assert_eq!(".5".parse::<Money>().unwrap(), Money::from_cents(50));
        assert_eq!("-2.25".parse::<Money>().unwrap(), Money::from_cents(-225));
        assert_eq!("3.8376".parse::<Money>().unwrap(), Money::from_raw(38_376));

        assert!("".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("1.23456".parse::<Money>().is_err());
        assert!("1,50".parse::<Money>().is_err());
    }

    #[test]
    fn test_decimal_string_keeps_two_digits() {
        assert_eq!(Money::zero().to_decimal_string(), "0.00");
        assert_eq!(Money::from_cents(3450).to_decimal_string(), "34.50");
        assert_eq!(Money::from_raw(-5).to_decimal_string(), "-0.0005");
    }

    #[test]
    fn test_serde_accepts_text_and_numbers() {
        let text: Money = serde_json::from_str("\"15.99\"").unwrap();
        let float: Money = serde_json::from_str("15.99").unwrap();
        let integer: Money = serde_json::from_str("12").unwrap();

        assert_eq!(text, Money::from_cents(1599));
        assert_eq!(float, Money::from_cents(1599));
        assert_eq!(integer, Money::from_cents(1200));
        assert_eq!(serde_json::to_string(&text).unwrap(), "\"15.99\"");
    }

    #[test]
    fn test_sum() {
        let total: Money = [Money::from_cents(100), Money::from_cents(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_cents(350));
    }
}
