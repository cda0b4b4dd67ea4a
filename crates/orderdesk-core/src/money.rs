//! # Money Module
//!
//! Provides the `Money` type for prices and order totals, and the `Weight`
//! type for product weights.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With f64 prices:                                                       │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │    An order total summed from doubles drifts away from DECIMAL(24,2)    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents / Integer Grams                            │
//! │    price  "10.50"  → Money(1050)                                        │
//! │    weight "1.250"  → Weight(1250)                                       │
//! │    Totals are exact sums of i64 products                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use orderdesk_core::money::{Money, Weight};
//!
//! let price: Money = "10.50".parse().unwrap();
//! assert_eq!(price.cents(), 1050);
//! assert_eq!((price * 2).to_string(), "$21.00");
//!
//! let weight: Weight = "1.25".parse().unwrap();
//! assert_eq!(weight.grams(), 1250);
//! assert_eq!(weight.to_string(), "1.250 kg");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;

// =============================================================================
// Fixed-Point Parsing
// =============================================================================

/// Why a decimal string could not be read as a fixed-point amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountParseError {
    Empty,
    InvalidCharacter(char),
    TooManyDecimals { max: u32 },
    Overflow,
}

impl fmt::Display for AmountParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountParseError::Empty => write!(f, "value is empty"),
            AmountParseError::InvalidCharacter(c) => write!(f, "unexpected character '{}'", c),
            AmountParseError::TooManyDecimals { max } => {
                write!(f, "at most {} decimal places are allowed", max)
            }
            AmountParseError::Overflow => write!(f, "value is too large"),
        }
    }
}

impl std::error::Error for AmountParseError {}

/// Parses a decimal string into an integer count of `10^-scale` units.
///
/// Accepts an optional sign, an optional leading `$`, `,` as a grouping
/// separator and `.` as the decimal point: `"1,234.5"` at scale 2 is
/// `123450`.
fn parse_fixed(input: &str, scale: u32) -> Result<i64, AmountParseError> {
    let mut s = input.trim();
    if s.is_empty() {
        return Err(AmountParseError::Empty);
    }

    let negative = s.starts_with('-');
    if negative || s.starts_with('+') {
        s = &s[1..];
    }
    s = s.strip_prefix('$').unwrap_or(s).trim_start();

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(AmountParseError::Empty);
    }
    if frac.len() > scale as usize {
        return Err(AmountParseError::TooManyDecimals { max: scale });
    }

    let mut units: i64 = 0;
    for c in whole.chars() {
        match c {
            ',' => continue,
            '0'..='9' => {
                units = units
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(c as i64 - '0' as i64))
                    .ok_or(AmountParseError::Overflow)?;
            }
            other => return Err(AmountParseError::InvalidCharacter(other)),
        }
    }

    let mut frac_units: i64 = 0;
    for c in frac.chars() {
        match c {
            '0'..='9' => frac_units = frac_units * 10 + (c as i64 - '0' as i64),
            other => return Err(AmountParseError::InvalidCharacter(other)),
        }
    }
    // Right-pad the fraction: "5" at scale 2 means 50 hundredths
    for _ in frac.len()..scale as usize {
        frac_units *= 10;
    }

    let value = units
        .checked_mul(10_i64.pow(scale))
        .and_then(|v| v.checked_add(frac_units))
        .ok_or(AmountParseError::Overflow)?;

    Ok(if negative { -value } else { value })
}

/// Formats `units` of `10^-scale` as a plain decimal string.
fn format_fixed(units: i64, scale: u32) -> String {
    let divisor = 10_i64.pow(scale);
    let sign = if units < 0 { "-" } else { "" };
    let abs = units.unsigned_abs();
    format!(
        "{}{}.{:0width$}",
        sign,
        abs / divisor as u64,
        abs % divisor as u64,
        width = scale as usize
    )
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Where Money is Used
/// ```text
/// Product.price ──► line contribution (price × quantity) ──► Order.total_price
///                                                                 │
///                                 Displayed as "$25.50" ◄─────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use orderdesk_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

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

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use orderdesk_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 897); // $8.97
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// The amount as a form-friendly decimal without currency symbol.
    ///
    /// ```rust
    /// use orderdesk_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1050).to_decimal_string(), "10.50");
    /// ```
    pub fn to_decimal_string(&self) -> String {
        format_fixed(self.0, 2)
    }
}

impl FromStr for Money {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed(s, 2).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Weight Type
// =============================================================================

/// A product weight in grams (kilograms with three decimal places).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Weight(i64);

impl Weight {
    #[inline]
    pub const fn from_grams(grams: i64) -> Self {
        Weight(grams)
    }

    #[inline]
    pub const fn grams(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Kilograms as a form-friendly decimal, e.g. `"1.250"`.
    pub fn to_decimal_string(&self) -> String {
        format_fixed(self.0, 3)
    }
}

/// Parses kilograms: `"1.25"` is 1250 grams.
impl FromStr for Weight {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s
            .strip_suffix("kg")
            .or_else(|| s.strip_suffix("Kg"))
            .unwrap_or(s);
        parse_fixed(s, 3).map(Weight)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kg", format_fixed(self.0, 3))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
