use crate::domain::money::Currency;
use crate::error::{CheckoutError, Result};
use std::time::Duration;

pub const DEFAULT_CANCEL_MESSAGE: &str = "Transaction was not completed, window closed.";

/// Settings shared by every checkout an initiator starts.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSettings {
    pub currency: Currency,
    /// How long to wait for the overlay to call back. `None` waits forever.
    pub stall_timeout: Option<Duration>,
    pub cancel_message: String,
    pub merchant_public_key: Option<String>,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            stall_timeout: None,
            cancel_message: DEFAULT_CANCEL_MESSAGE.to_string(),
            merchant_public_key: None,
        }
    }
}

impl CheckoutSettings {
    /// Loads settings from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let code =
            lookup("CHECKOUT_CURRENCY").unwrap_or_else(|| Currency::DEFAULT_CODE.to_string());
        let factor = match lookup("CHECKOUT_MINOR_UNIT_FACTOR") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                CheckoutError::ConfigError(format!("Invalid CHECKOUT_MINOR_UNIT_FACTOR {raw:?}"))
            })?,
            None => Currency::DEFAULT_MINOR_UNIT_FACTOR,
        };
        let currency =
            Currency::new(code, factor).map_err(|e| CheckoutError::ConfigError(e.to_string()))?;

        let stall_timeout = match lookup("CHECKOUT_STALL_TIMEOUT_MS") {
            Some(raw) => {
                let millis: u64 = raw.trim().parse().map_err(|_| {
                    CheckoutError::ConfigError(format!("Invalid CHECKOUT_STALL_TIMEOUT_MS {raw:?}"))
                })?;
                Some(Duration::from_millis(millis))
            }
            None => None,
        };

        let cancel_message = lookup("CHECKOUT_CANCEL_MESSAGE")
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CANCEL_MESSAGE.to_string());

        let merchant_public_key =
            lookup("PAYSTACK_PUBLIC_KEY").filter(|key| !key.trim().is_empty());

        Ok(Self {
            currency,
            stall_timeout,
            cancel_message,
            merchant_public_key,
        })
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_stall_timeout(mut self, timeout: Duration) -> Self {
        self.stall_timeout = Some(timeout);
        self
    }

    pub fn with_cancel_message(mut self, message: impl Into<String>) -> Self {
        self.cancel_message = message.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = CheckoutSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, CheckoutSettings::default());
        assert_eq!(settings.currency.code(), "NGN");
        assert!(settings.stall_timeout.is_none());
    }

    #[test]
    fn test_overrides() {
        let settings = CheckoutSettings::from_lookup(lookup(&[
            ("CHECKOUT_CURRENCY", "GHS"),
            ("CHECKOUT_MINOR_UNIT_FACTOR", "100"),
            ("CHECKOUT_STALL_TIMEOUT_MS", "1500"),
            ("CHECKOUT_CANCEL_MESSAGE", "Payment window closed"),
            ("PAYSTACK_PUBLIC_KEY", "pk_test_abc"),
        ]))
        .unwrap();

        assert_eq!(settings.currency.code(), "GHS");
        assert_eq!(settings.stall_timeout, Some(Duration::from_millis(1500)));
        assert_eq!(settings.cancel_message, "Payment window closed");
        assert_eq!(settings.merchant_public_key.as_deref(), Some("pk_test_abc"));
    }

    #[test]
    fn test_invalid_values() {
        for vars in [
            [("CHECKOUT_CURRENCY", "naira")],
            [("CHECKOUT_MINOR_UNIT_FACTOR", "ten")],
            [("CHECKOUT_STALL_TIMEOUT_MS", "-1")],
        ] {
            assert!(matches!(
                CheckoutSettings::from_lookup(lookup(&vars)),
                Err(CheckoutError::ConfigError(_))
            ));
        }
    }
}
