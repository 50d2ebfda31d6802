use crate::error::CheckoutError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::fmt;

/// A positive monetary amount expressed in major currency units (e.g. naira).
///
/// This is a wrapper around `rust_decimal::Decimal` so that amounts are never
/// confused with the minor-unit values handed to the payment provider.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, CheckoutError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(CheckoutError::InvalidArgument(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Converts the amount into the provider's minor currency unit.
    ///
    /// Fails when the result is not a whole number of minor units or does not
    /// fit in a `u64`.
    pub fn to_minor_units(&self, currency: &Currency) -> Result<MinorUnits, CheckoutError> {
        let minor = self
            .0
            .checked_mul(Decimal::from(currency.minor_unit_factor()))
            .ok_or_else(|| {
                CheckoutError::InvalidArgument(format!("Amount {} is too large", self.0))
            })?;

        if !minor.fract().is_zero() {
            return Err(CheckoutError::InvalidArgument(format!(
                "Amount {} is finer than one minor unit of {}",
                self.0,
                currency.code()
            )));
        }

        minor.to_u64().map(MinorUnits).ok_or_else(|| {
            CheckoutError::InvalidArgument(format!("Amount {} is too large", self.0))
        })
    }
}

/// An amount in the smallest denomination of a currency (kobo, cents).
///
/// Only `Amount::to_minor_units` produces one, and there is no way back into
/// major units, so a value cannot be scaled twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MinorUnits(u64);

impl MinorUnits {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The currency a checkout is charged in, with its minor-unit factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Currency {
    code: String,
    minor_unit_factor: u32,
}

impl Currency {
    pub const DEFAULT_CODE: &'static str = "NGN";
    pub const DEFAULT_MINOR_UNIT_FACTOR: u32 = 100;

    /// Creates a currency from a three-letter uppercase code and a power-of-ten
    /// minor-unit factor (1, 10, 100, ...).
    pub fn new(code: impl Into<String>, minor_unit_factor: u32) -> Result<Self, CheckoutError> {
        let code = code.into();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(CheckoutError::InvalidArgument(format!(
                "Currency code must be three uppercase letters, got {code:?}"
            )));
        }

        let mut factor = minor_unit_factor;
        while factor >= 10 && factor % 10 == 0 {
            factor /= 10;
        }
        if factor != 1 {
            return Err(CheckoutError::InvalidArgument(format!(
                "Minor unit factor must be a power of ten, got {minor_unit_factor}"
            )));
        }

        Ok(Self {
            code,
            minor_unit_factor,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn minor_unit_factor(&self) -> u32 {
        self.minor_unit_factor
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self {
            code: Self::DEFAULT_CODE.to_string(),
            minor_unit_factor: Self::DEFAULT_MINOR_UNIT_FACTOR,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(1.0)).is_ok());
        assert!(matches!(
            Amount::new(dec!(0.0)),
            Err(CheckoutError::InvalidArgument(_))
        ));
        assert!(matches!(
            Amount::new(dec!(-1.0)),
            Err(CheckoutError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_whole_amount_converts_to_kobo() {
        let amount = Amount::new(dec!(500)).unwrap();
        let minor = amount.to_minor_units(&Currency::default()).unwrap();
        assert_eq!(minor.value(), 50000);
    }

    #[test]
    fn test_fractional_amount_converts_to_kobo() {
        let amount = Amount::new(dec!(12.34)).unwrap();
        let minor = amount.to_minor_units(&Currency::default()).unwrap();
        assert_eq!(minor.value(), 1234);
    }

    #[test]
    fn test_sub_minor_amount_is_rejected() {
        let amount = Amount::new(dec!(1.005)).unwrap();
        assert!(matches!(
            amount.to_minor_units(&Currency::default()),
            Err(CheckoutError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_overflowing_amount_is_rejected() {
        let amount = Amount::new(Decimal::MAX).unwrap();
        assert!(amount.to_minor_units(&Currency::default()).is_err());
    }

    #[test]
    fn test_zero_decimal_currency() {
        let yen = Currency::new("JPY", 1).unwrap();
        let minor = Amount::new(dec!(750)).unwrap().to_minor_units(&yen).unwrap();
        assert_eq!(minor.value(), 750);
    }

    #[test]
    fn test_currency_validation() {
        assert!(Currency::new("USD", 100).is_ok());
        assert!(Currency::new("KWD", 1000).is_ok());
        assert!(Currency::new("usd", 100).is_err());
        assert!(Currency::new("NAIRA", 100).is_err());
        assert!(Currency::new("NGN", 0).is_err());
        assert!(Currency::new("NGN", 150).is_err());
    }

    #[test]
    fn test_default_currency_is_naira() {
        let currency = Currency::default();
        assert_eq!(currency.code(), "NGN");
        assert_eq!(currency.minor_unit_factor(), 100);
    }
}
