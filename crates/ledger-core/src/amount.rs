//! Monetary amounts.
//!
//! Amounts travel over the wire as decimal strings with at most two fractional
//! digits (`"100"`, `"12.5"`, `"0.99"`). Inside the ledger they are held as
//! [`Decimal`] so arithmetic on balances is exact.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum number of fractional digits an amount may carry.
pub const MAX_FRACTION_DIGITS: u32 = 2;

/// A strictly positive transaction magnitude.
///
/// Direction is never encoded in the sign; it is carried separately by
/// [`TransactionType`](crate::TransactionType).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Parse an amount from its wire representation.
    ///
    /// The text must be one or more ASCII digits, optionally followed by a
    /// `.` and one or two digits. Signs, exponents, whitespace and anything
    /// else are rejected, as is a value of zero.
    ///
    /// # Errors
    ///
    /// Returns `AmountError::Malformed` if the text is not in the wire format
    /// and `AmountError::NotPositive` if it parses to zero.
    pub fn parse(text: &str) -> Result<Self, AmountError> {
        let malformed = || AmountError::Malformed(text.to_string());

        let (whole, fraction) = split_wire_format(text).ok_or_else(malformed)?;
        let value = Decimal::from_str(text).map_err(|_| malformed())?;

        // `Decimal` rounds digits beyond its precision instead of failing.
        if value.to_string() != canonical_text(whole, fraction) {
            return Err(malformed());
        }

        Self::try_from(value)
    }

    /// Return the amount as a decimal.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }
}

/// Split wire-format text into its whole and fractional digits.
fn split_wire_format(text: &str) -> Option<(&str, Option<&str>)> {
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text, None),
    };

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let fraction_ok = fraction.map_or(true, |f| {
        (1..=MAX_FRACTION_DIGITS as usize).contains(&f.len())
            && f.bytes().all(|b| b.is_ascii_digit())
    });

    fraction_ok.then_some((whole, fraction))
}

/// How `Decimal` displays the text when it was parsed without loss.
fn canonical_text(whole: &str, fraction: Option<&str>) -> String {
    let whole = match whole.trim_start_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };

    match fraction {
        Some(fraction) => format!("{whole}.{fraction}"),
        None => whole.to_string(),
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value));
        }
        if value.normalize().scale() > MAX_FRACTION_DIGITS {
            return Err(AmountError::Malformed(value.to_string()));
        }
        Ok(Self(value))
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({})", self.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur when parsing an amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// The text is not a decimal with at most two fractional digits.
    #[error("amount '{0}' is not a decimal with at most two fractional digits")]
    Malformed(String),

    /// The amount is zero or negative.
    #[error("amount must be a positive number, got {0}")]
    NotPositive(Decimal),
}
