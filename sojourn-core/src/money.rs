//! Exact monetary amounts in minor units.
//!
//! Amounts never pass through floating point. Decimal strings such as
//! `"12.5"` are parsed digit by digit into cents, and every arithmetic
//! operation is checked for overflow, negativity and currency agreement.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MINOR_PER_MAJOR: u64 = 100;

/// Errors raised by [`Money`] and [`Currency`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// The amount string was not a non-negative decimal with at most two
    /// fractional digits.
    #[error("invalid amount {input:?}")]
    InvalidAmount {
        /// Rejected input.
        input: String,
    },
    /// The currency code was not three ASCII letters.
    #[error("invalid currency code {code:?}")]
    InvalidCurrency {
        /// Rejected code.
        code: String,
    },
    /// Two amounts in different currencies were combined.
    #[error("cannot combine {found} with {expected}")]
    CurrencyMismatch {
        /// Currency of the left-hand operand.
        expected: Currency,
        /// Currency of the right-hand operand.
        found: Currency,
    },
    /// The result does not fit in 64 bits of minor units.
    #[error("monetary amount overflowed")]
    Overflow,
    /// A subtraction would produce a negative amount.
    #[error("monetary amount would become negative")]
    Negative,
}

/// ISO-4217 style three-letter currency code.
///
/// # Examples
/// ```
/// use sojourn_core::Currency;
///
/// let eur: Currency = "eur".parse()?;
/// assert_eq!(eur.to_string(), "EUR");
/// # Ok::<(), sojourn_core::MoneyError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency([u8; 3]);

impl Currency {
    /// United States dollar.
    pub const USD: Self = Self(*b"USD");
    /// Euro.
    pub const EUR: Self = Self(*b"EUR");
    /// Pound sterling.
    pub const GBP: Self = Self(*b"GBP");
}

impl Default for Currency {
    fn default() -> Self {
        Self::USD
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MoneyError::InvalidCurrency { code: s.to_owned() };
        let bytes: [u8; 3] = s.as_bytes().try_into().map_err(|_| invalid())?;
        if !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(invalid());
        }
        Ok(Self(bytes.map(|b| b.to_ascii_uppercase())))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0
            .iter()
            .try_for_each(|byte| write!(f, "{}", char::from(*byte)))
    }
}

impl TryFrom<String> for Currency {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.to_string()
    }
}

/// A non-negative amount of money.
///
/// # Examples
/// ```
/// use sojourn_core::{Currency, Money};
///
/// let ticket = Money::parse("20", Currency::USD)?;
/// let fare = Money::parse("4.5", Currency::USD)?;
/// let total = ticket.checked_add(fare)?;
/// assert_eq!(total.minor(), 2450);
/// assert_eq!(total.to_string(), "24.50 USD");
/// # Ok::<(), sojourn_core::MoneyError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MoneyRecord", into = "MoneyRecord")]
pub struct Money {
    minor: u64,
    currency: Currency,
}

#[derive(Serialize, Deserialize)]
struct MoneyRecord {
    amount: String,
    currency: Currency,
}

impl TryFrom<MoneyRecord> for Money {
    type Error = MoneyError;

    fn try_from(value: MoneyRecord) -> Result<Self, Self::Error> {
        Self::parse(&value.amount, value.currency)
    }
}

impl From<Money> for MoneyRecord {
    fn from(value: Money) -> Self {
        Self {
            amount: value.amount(),
            currency: value.currency,
        }
    }
}

impl Money {
    /// Build an amount from minor units (cents).
    #[must_use]
    pub const fn from_minor(minor: u64, currency: Currency) -> Self {
        Self { minor, currency }
    }

    /// Zero in `currency`.
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self::from_minor(0, currency)
    }

    /// Parse a decimal amount such as `"12"`, `"12.5"` or `"12.50"`.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::InvalidAmount`] for signs, exponents, more than
    /// two fractional digits or non-digit characters, and
    /// [`MoneyError::Overflow`] for amounts that do not fit.
    pub fn parse(amount: &str, currency: Currency) -> Result<Self, MoneyError> {
        let invalid = || MoneyError::InvalidAmount {
            input: amount.to_owned(),
        };
        let trimmed = amount.trim();
        let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
        if whole.is_empty() || fraction.len() > 2 {
            return Err(invalid());
        }
        if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let major: u64 = whole.parse().map_err(|_| MoneyError::Overflow)?;
        let cents = fraction
            .bytes()
            .chain(std::iter::repeat(b'0'))
            .take(2)
            .fold(0_u64, |acc, digit| acc * 10 + u64::from(digit - b'0'));
        let minor = major
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|m| m.checked_add(cents))
            .ok_or(MoneyError::Overflow)?;
        Ok(Self::from_minor(minor, currency))
    }

    /// Amount in minor units.
    #[must_use]
    pub const fn minor(&self) -> u64 {
        self.minor
    }

    /// Currency of the amount.
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Whether the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.minor == 0
    }

    /// Decimal representation with exactly two fractional digits.
    #[must_use]
    #[expect(
        clippy::integer_division,
        clippy::integer_division_remainder_used,
        reason = "splitting minor units into major and minor parts is exact"
    )]
    pub fn amount(&self) -> String {
        format!(
            "{}.{:02}",
            self.minor / MINOR_PER_MAJOR,
            self.minor % MINOR_PER_MAJOR
        )
    }

    /// Add two amounts of the same currency.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::CurrencyMismatch`] or [`MoneyError::Overflow`].
    pub fn checked_add(self, other: Self) -> Result<Self, MoneyError> {
        self.same_currency(other)?;
        self.minor
            .checked_add(other.minor)
            .map(|minor| Self::from_minor(minor, self.currency))
            .ok_or(MoneyError::Overflow)
    }

    /// Subtract `other`, refusing to go below zero.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::CurrencyMismatch`] or [`MoneyError::Negative`].
    pub fn checked_sub(self, other: Self) -> Result<Self, MoneyError> {
        self.same_currency(other)?;
        self.minor
            .checked_sub(other.minor)
            .map(|minor| Self::from_minor(minor, self.currency))
            .ok_or(MoneyError::Negative)
    }

    /// Whether `self` does not exceed `cap`.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::CurrencyMismatch`] when the currencies differ.
    pub fn fits_within(&self, cap: &Self) -> Result<bool, MoneyError> {
        self.same_currency(*cap)?;
        Ok(self.minor <= cap.minor)
    }

    /// Sum `amounts`, all of which must be in `currency`.
    ///
    /// # Errors
    ///
    /// Propagates the first [`MoneyError`] from [`Money::checked_add`].
    pub fn sum<'a, I>(currency: Currency, amounts: I) -> Result<Self, MoneyError>
    where
        I: IntoIterator<Item = &'a Self>,
    {
        amounts
            .into_iter()
            .try_fold(Self::zero(currency), |acc, amount| acc.checked_add(*amount))
    }

    fn same_currency(self, other: Self) -> Result<(), MoneyError> {
        if self.currency == other.currency {
            return Ok(());
        }
        Err(MoneyError::CurrencyMismatch {
            expected: self.currency,
            found: other.currency,
        })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount(), self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn usd(amount: &str) -> Money {
        Money::parse(amount, Currency::USD).expect("valid amount")
    }

    #[rstest]
    #[case("0", 0)]
    #[case("20", 2000)]
    #[case("20.5", 2050)]
    #[case("20.05", 2005)]
    #[case(" 7.10 ", 710)]
    fn parses_decimal_amounts(#[case] input: &str, #[case] minor: u64) {
        assert_eq!(usd(input).minor(), minor);
    }

    #[rstest]
    #[case("-1")]
    #[case("1.234")]
    #[case("1e3")]
    #[case(".5")]
    #[case("abc")]
    #[case("")]
    fn rejects_malformed_amounts(#[case] input: &str) {
        let err = Money::parse(input, Currency::USD).expect_err("invalid amount");
        assert!(matches!(err, MoneyError::InvalidAmount { .. }));
    }

    #[rstest]
    fn rejects_overflowing_amounts() {
        let err = Money::parse("184467440737095517", Currency::USD).expect_err("too large");
        assert_eq!(err, MoneyError::Overflow);
    }

    #[rstest]
    fn subtraction_never_goes_negative() {
        assert_eq!(usd("5").checked_sub(usd("6")), Err(MoneyError::Negative));
        assert_eq!(usd("6").checked_sub(usd("5")), Ok(usd("1")));
    }

    #[rstest]
    fn combining_currencies_is_an_error() {
        let euros = Money::from_minor(100, Currency::EUR);
        let err = usd("1").checked_add(euros).expect_err("mismatch");
        assert_eq!(
            err,
            MoneyError::CurrencyMismatch {
                expected: Currency::USD,
                found: Currency::EUR,
            }
        );
    }

    #[rstest]
    fn sums_are_exact() {
        let parts = [usd("0.10"), usd("0.20"), usd("0.30")];
        assert_eq!(Money::sum(Currency::USD, &parts), Ok(usd("0.60")));
    }

    #[rstest]
    #[case("US")]
    #[case("US1")]
    #[case("USDX")]
    fn rejects_bad_currency_codes(#[case] code: &str) {
        assert!(code.parse::<Currency>().is_err());
    }

    #[rstest]
    fn serialises_as_decimal_string() {
        let json = serde_json::to_string(&usd("20")).expect("serialise");
        assert_eq!(json, r#"{"amount":"20.00","currency":"USD"}"#);
        let back: Money = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(back, usd("20"));
    }
}
