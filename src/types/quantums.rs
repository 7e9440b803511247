//! Fixed-point quantum and subticks arithmetic.
//!
//! ## Units
//!
//! - **Base quantums**: smallest indivisible unit of the traded asset.
//! - **Quote quantums**: smallest indivisible unit of the settlement asset.
//! - **Subticks**: integer price unit; the human price is
//!   `subticks * 10^quantum_conversion_exponent`.
//!
//! The bridge between them is
//! `quote_quantums = subticks * base_quantums * 10^exponent`.
//!
//! ## Widths
//!
//! Quantities reach 10^19 and beyond, so all intermediate products are
//! computed in u128: the u64 x u64 product always fits, and only a positive
//! power-of-ten scaling can overflow, which is surfaced explicitly instead
//! of wrapping. No floating point anywhere; `rust_decimal` appears only in
//! display helpers, never on a consensus path.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::types::error::ClobError;

/// Integer price unit.
pub type Subticks = u64;

/// Smallest unit of the traded asset.
pub type BaseQuantums = u64;

/// Smallest unit of the settlement asset (wide, to absorb products).
pub type QuoteQuantums = u128;

/// Asset id of the quote/settlement asset.
pub const QUOTE_ASSET_ID: u32 = 0;

/// 10^exp in u128, or an overflow error for exponents past u128 range.
fn pow10_u128(exp: u32) -> Result<u128, ClobError> {
    10u128
        .checked_pow(exp)
        .ok_or(ClobError::ArithmeticOverflow {
            context: "computing a power of ten",
        })
}

/// Convert a fill to quote quantums:
/// `floor(subticks * base_quantums * 10^exponent)`.
///
/// Negative exponents floor-divide; positive exponents use checked
/// multiplication and overflow is a typed error.
pub fn fill_amount_to_quote_quantums(
    subticks: Subticks,
    base_quantums: BaseQuantums,
    quantum_conversion_exponent: i32,
) -> Result<QuoteQuantums, ClobError> {
    // u64 x u64 always fits in u128.
    let product = u128::from(subticks) * u128::from(base_quantums);

    if quantum_conversion_exponent >= 0 {
        let scale = pow10_u128(quantum_conversion_exponent as u32)?;
        product.checked_mul(scale).ok_or(ClobError::ArithmeticOverflow {
            context: "scaling quote quantums",
        })
    } else {
        let scale = pow10_u128(quantum_conversion_exponent.unsigned_abs())?;
        Ok(product / scale)
    }
}

// ============================================================================
// Exact price rational
// ============================================================================

/// An exact, reduced rational price in subticks.
///
/// Produced by [`get_average_price_subticks`]; carries the unrounded
/// `quote * 10^-exponent / base` value so callers choose their own rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRational {
    numerator: u128,
    denominator: u128,
}

fn gcd_u128(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

impl PriceRational {
    /// Build a reduced rational.
    ///
    /// # Panics
    ///
    /// Panics on a zero denominator.
    pub fn new(numerator: u128, denominator: u128) -> Self {
        if denominator == 0 {
            panic!("PriceRational: zero denominator");
        }
        if numerator == 0 {
            return Self {
                numerator: 0,
                denominator: 1,
            };
        }
        let g = gcd_u128(numerator, denominator);
        Self {
            numerator: numerator / g,
            denominator: denominator / g,
        }
    }

    /// The reduced numerator.
    pub fn numerator(&self) -> u128 {
        self.numerator
    }

    /// The reduced denominator.
    pub fn denominator(&self) -> u128 {
        self.denominator
    }

    /// Round down to an integer subticks value.
    pub fn floor(&self) -> u128 {
        self.numerator / self.denominator
    }

    /// Whether the rational is an exact integer.
    pub fn is_integer(&self) -> bool {
        self.denominator == 1
    }

    /// Decimal approximation for display. `None` when the value exceeds
    /// `Decimal` range.
    pub fn to_decimal(&self) -> Option<Decimal> {
        let num = Decimal::from_u128(self.numerator)?;
        let den = Decimal::from_u128(self.denominator)?;
        num.checked_div(den)
    }
}

/// Exact average price in subticks for a (quote, base) fill total:
/// `quote_quantums * 10^-exponent / base_quantums`.
///
/// # Panics
///
/// Panics when `base_quantums == 0`, or when the power-of-ten scaling
/// overflows u128. Both indicate the caller violated its preconditions:
/// averages are only taken over nonzero filled amounts within range.
pub fn get_average_price_subticks(
    quote_quantums: QuoteQuantums,
    base_quantums: BaseQuantums,
    quantum_conversion_exponent: i32,
) -> PriceRational {
    if base_quantums == 0 {
        panic!("get_average_price_subticks: base_quantums is zero");
    }

    if quantum_conversion_exponent <= 0 {
        let scale = pow10_u128(quantum_conversion_exponent.unsigned_abs())
            .unwrap_or_else(|_| panic!("get_average_price_subticks: scale overflows u128"));
        let numerator = quote_quantums
            .checked_mul(scale)
            .unwrap_or_else(|| panic!("get_average_price_subticks: numerator overflows u128"));
        PriceRational::new(numerator, u128::from(base_quantums))
    } else {
        let scale = pow10_u128(quantum_conversion_exponent as u32)
            .unwrap_or_else(|_| panic!("get_average_price_subticks: scale overflows u128"));
        let denominator = u128::from(base_quantums)
            .checked_mul(scale)
            .unwrap_or_else(|| panic!("get_average_price_subticks: denominator overflows u128"));
        PriceRational::new(quote_quantums, denominator)
    }
}

// ============================================================================
// Display helpers (not consensus math)
// ============================================================================

/// Human-readable price for a subticks value:
/// `subticks * 10^exponent` as a `Decimal`.
///
/// Returns `None` when the value is outside `Decimal` range.
pub fn subticks_to_price_decimal(subticks: Subticks, quantum_conversion_exponent: i32) -> Option<Decimal> {
    let base = Decimal::from_u64(subticks)?;
    if quantum_conversion_exponent >= 0 {
        let scale = Decimal::from_u128(pow10_u128(quantum_conversion_exponent as u32).ok()?)?;
        base.checked_mul(scale)
    } else {
        let scale = Decimal::from_u128(pow10_u128(quantum_conversion_exponent.unsigned_abs()).ok()?)?;
        base.checked_div(scale)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_quantums_identity_exponent() {
        assert_eq!(fill_amount_to_quote_quantums(10, 5, 0), Ok(50));
    }

    #[test]
    fn test_quote_quantums_rounds_down() {
        // floor(1 * 9 * 10^-1) = floor(0.9) = 0
        assert_eq!(fill_amount_to_quote_quantums(1, 9, -1), Ok(0));
        // floor(3 * 7 * 10^-1) = floor(2.1) = 2
        assert_eq!(fill_amount_to_quote_quantums(3, 7, -1), Ok(2));
    }

    #[test]
    fn test_quote_quantums_positive_exponent() {
        assert_eq!(fill_amount_to_quote_quantums(10, 5, 3), Ok(50_000));
    }

    #[test]
    fn test_quote_quantums_wide_product() {
        // The u64 x u64 product must not wrap before scaling.
        let result = fill_amount_to_quote_quantums(u64::MAX, u64::MAX, -10).expect("in range");
        let expected = (u128::from(u64::MAX) * u128::from(u64::MAX)) / 10u128.pow(10);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_quote_quantums_overflow_is_error() {
        assert!(matches!(
            fill_amount_to_quote_quantums(u64::MAX, u64::MAX, 10),
            Err(ClobError::ArithmeticOverflow { .. })
        ));
    }

    #[test]
    fn test_average_price_exact() {
        // 25 quote / 10 base at exponent 0 = 5/2 exactly.
        let price = get_average_price_subticks(25, 10, 0);
        assert_eq!(price.numerator(), 5);
        assert_eq!(price.denominator(), 2);
        assert_eq!(price.floor(), 2);
        assert!(!price.is_integer());
    }

    #[test]
    fn test_average_price_negative_exponent() {
        // 9 quote / 2 base at exponent -1: 9 * 10 / 2 = 45 exactly.
        let price = get_average_price_subticks(9, 2, -1);
        assert_eq!(price.numerator(), 45);
        assert_eq!(price.denominator(), 1);
        assert!(price.is_integer());
    }

    #[test]
    fn test_average_price_positive_exponent() {
        // 100 quote / 4 base at exponent 1: 100 / 40 = 5/2.
        let price = get_average_price_subticks(100, 4, 1);
        assert_eq!(price.numerator(), 5);
        assert_eq!(price.denominator(), 2);
    }

    #[test]
    #[should_panic(expected = "base_quantums is zero")]
    fn test_average_price_zero_base_panics() {
        let _ = get_average_price_subticks(100, 0, 0);
    }

    #[test]
    fn test_round_trip_with_quote_quantums() {
        // A fill at an exact price averages back to that price.
        let subticks = 5_000_000_000u64;
        let base = 1_000_000u64;
        let exponent = -8;

        let quote = fill_amount_to_quote_quantums(subticks, base, exponent).expect("in range");
        let price = get_average_price_subticks(quote, base, exponent);
        assert_eq!(price.floor(), u128::from(subticks));
    }

    #[test]
    fn test_price_rational_reduction() {
        let price = PriceRational::new(100, 40);
        assert_eq!(price.numerator(), 5);
        assert_eq!(price.denominator(), 2);

        let zero = PriceRational::new(0, 17);
        assert_eq!(zero.numerator(), 0);
        assert_eq!(zero.denominator(), 1);
    }

    #[test]
    fn test_price_rational_to_decimal() {
        let price = PriceRational::new(5, 2);
        assert_eq!(price.to_decimal(), Decimal::from_str("2.5").ok());
    }

    #[test]
    fn test_subticks_to_price_decimal() {
        // 5_000_000_000 subticks at exponent -8 = 50.0
        let price = subticks_to_price_decimal(5_000_000_000, -8).expect("in range");
        assert_eq!(price, Decimal::from(50));

        // Positive exponent scales up.
        let price = subticks_to_price_decimal(5, 2).expect("in range");
        assert_eq!(price, Decimal::from(500));
    }
}
