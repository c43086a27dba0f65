//! # Money Module
//!
//! Fixed-point types for monetary values, fractional quantities, and tax
//! rates.
//!
//! ## Why Integer Money?
//! ```text
//! In floating point:  0.1 + 0.2 = 0.30000000000000004
//!
//! Summing dozens of line items in floats drifts away from the exact
//! 2-decimal amounts a billing document must carry.
//!
//! OUR SOLUTION: integers in the smallest unit.
//!   Money    -> cents       (1 cent    = 0.01 of currency)
//!   Quantity -> hundredths  (2.50 units = 250)
//!   TaxRate  -> basis points (20.00 %  = 2000 bps)
//! ```
//!
//! The API boundary speaks 2-decimal strings ("250.00"); parsing and
//! rendering are exact and reject more than two decimal places.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use thiserror::Error;

/// Error returned when a 2-decimal string cannot be parsed exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("not a valid amount with at most two decimal places")]
pub struct ParseAmountError;

/// Parses a decimal string with at most two fractional digits into the
/// value scaled by 100. `"250"`, `"250.5"`, and `"250.50"` all parse to
/// `25050`; `"250.505"` is rejected.
fn parse_fixed2(input: &str) -> Result<i64, ParseAmountError> {
    let input = input.trim();
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, f),
        None => (digits, ""),
    };

    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseAmountError);
    }
    if frac_part.len() > 2 || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseAmountError);
    }

    let whole: i64 = int_part.parse().map_err(|_| ParseAmountError)?;
    let frac: i64 = match frac_part.len() {
        0 => 0,
        1 => frac_part.parse::<i64>().map_err(|_| ParseAmountError)? * 10,
        _ => frac_part.parse().map_err(|_| ParseAmountError)?,
    };

    let value = whole
        .checked_mul(100)
        .and_then(|v| v.checked_add(frac))
        .ok_or(ParseAmountError)?;

    Ok(if negative { -value } else { value })
}

/// Formats a value scaled by 100 as a 2-decimal string.
fn format_fixed2(value: i64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let sign = if value < 0 { "-" } else { "" };
    write!(f, "{}{}.{:02}", sign, (value / 100).abs(), (value % 100).abs())
}

// =============================================================================
// Money
// =============================================================================

/// A monetary value in cents (the smallest currency unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: room for adjustments and safe subtraction
/// - **Single-field tuple struct**: zero-cost abstraction over i64
/// - Database columns, calculations, and internal APIs all use cents;
///   only the DTO layer renders decimal strings
///
/// ## Example
/// ```rust
/// use atelier_core::money::Money;
///
/// let price = Money::from_cents(10050);
/// assert_eq!(price.to_string(), "100.50");
/// assert_eq!("100.50".parse::<Money>().unwrap(), price);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a fractional quantity, rounding half-up
    /// to the nearest cent.
    ///
    /// cents × hundredths is in units of 1/10000 of the currency; the
    /// `+ 50 / 100` step brings it back to cents with rounding. i128
    /// intermediate prevents overflow on large documents.
    ///
    /// ## Example
    /// ```rust
    /// use atelier_core::money::{Money, Quantity};
    ///
    /// let unit_price = Money::from_cents(10033); // 100.33
    /// let qty = Quantity::from_hundredths(250);  // 2.50
    /// assert_eq!(unit_price.multiply_quantity(qty).cents(), 25083); // 250.825 -> 250.83
    /// ```
    pub fn multiply_quantity(&self, qty: Quantity) -> Money {
        let product = self.0 as i128 * qty.hundredths() as i128;
        Money::from_cents(((product + 50) / 100) as i64)
    }

    /// Calculates tax at the given rate, rounding half-up to the cent.
    ///
    /// Formula: `(amount_cents * bps + 5000) / 10000`.
    ///
    /// ## Example
    /// ```rust
    /// use atelier_core::money::{Money, TaxRate};
    ///
    /// let subtotal = Money::from_cents(25000);   // 250.00
    /// let rate = TaxRate::from_bps(2000);        // 20.00 %
    /// assert_eq!(subtotal.calculate_tax(rate).cents(), 5000); // 50.00
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }
}

/// Renders as a bare 2-decimal string ("250.00"), the wire format used by
/// the API. Currency symbols are a presentation concern.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_fixed2(self.0, f)
    }
}

impl std::str::FromStr for Money {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed2(s).map(Money)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Quantity
// =============================================================================

/// A fractional quantity with 2-decimal precision, stored in hundredths.
///
/// Line items are billed in fractional units (2.50 days of consulting,
/// 12.75 m² of flooring), so quantities carry the same fixed-point
/// treatment as money.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Quantity(i64);

impl Quantity {
    /// Creates a quantity from hundredths (250 = 2.50).
    #[inline]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Quantity(hundredths)
    }

    /// Returns the quantity in hundredths.
    #[inline]
    pub const fn hundredths(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_fixed2(self.0, f)
    }
}

impl std::str::FromStr for Quantity {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed2(s).map(Quantity)
    }
}

// =============================================================================
// TaxRate
// =============================================================================

/// Tax rate in basis points (bps).
///
/// 1 basis point = 0.01 %, so 2000 bps = 20.00 % (the default VAT rate).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
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

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

/// Renders as a 2-decimal percentage string ("20.00").
impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_fixed2(self.0 as i64, f)
    }
}

impl std::str::FromStr for TaxRate {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let scaled = parse_fixed2(s)?;
        u32::try_from(scaled).map(TaxRate).map_err(|_| ParseAmountError)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_roundtrip() {
        let money: Money = "100.50".parse().unwrap();
        assert_eq!(money.cents(), 10050);
        assert_eq!(money.to_string(), "100.50");

        assert_eq!("250".parse::<Money>().unwrap().cents(), 25000);
        assert_eq!("250.5".parse::<Money>().unwrap().cents(), 25050);
        assert_eq!("0.07".parse::<Money>().unwrap().cents(), 7);
        assert_eq!("-5.50".parse::<Money>().unwrap().cents(), -550);
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(0).to_string(), "0.00");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("10.005".parse::<Money>().is_err());
        assert!("10,50".parse::<Money>().is_err());
        assert!(".50".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);

        let total: Money = [a, b, Money::from_cents(1)].into_iter().sum();
        assert_eq!(total.cents(), 1501);
    }

    #[test]
    fn test_multiply_quantity_whole() {
        let unit_price = Money::from_cents(10000); // 100.00
        let qty = Quantity::from_hundredths(200); // 2.00
        assert_eq!(unit_price.multiply_quantity(qty).cents(), 20000);
    }

    #[test]
    fn test_multiply_quantity_fractional_rounds_half_up() {
        // 100.33 * 2.50 = 250.825 -> 250.83
        let unit_price = Money::from_cents(10033);
        let qty = Quantity::from_hundredths(250);
        assert_eq!(unit_price.multiply_quantity(qty).cents(), 25083);

        // 0.01 * 0.50 = 0.005 -> 0.01
        let tiny = Money::from_cents(1);
        let half = Quantity::from_hundredths(50);
        assert_eq!(tiny.multiply_quantity(half).cents(), 1);
    }

    #[test]
    fn test_tax_calculation() {
        // 250.00 at 20% = 50.00 exactly
        let subtotal = Money::from_cents(25000);
        assert_eq!(subtotal.calculate_tax(TaxRate::from_bps(2000)).cents(), 5000);

        // 10.00 at 8.25% = 0.825 -> 0.83
        let amount = Money::from_cents(1000);
        assert_eq!(amount.calculate_tax(TaxRate::from_bps(825)).cents(), 83);

        // zero rate
        assert_eq!(amount.calculate_tax(TaxRate::zero()).cents(), 0);
    }

    #[test]
    fn test_tax_rate_parse() {
        assert_eq!("20.00".parse::<TaxRate>().unwrap().bps(), 2000);
        assert_eq!("20".parse::<TaxRate>().unwrap().bps(), 2000);
        assert_eq!("8.25".parse::<TaxRate>().unwrap().bps(), 825);
        assert!("-1".parse::<TaxRate>().is_err());
    }

    #[test]
    fn test_quantity_parse() {
        let qty: Quantity = "2.50".parse().unwrap();
        assert_eq!(qty.hundredths(), 250);
        assert!(qty.is_positive());
        assert!(!"0.00".parse::<Quantity>().unwrap().is_positive());
        assert_eq!(qty.to_string(), "2.50");
    }
}
