use super::money::Amount;
use crate::error::{CheckoutError, Result};
use rust_decimal::Decimal;
use url::Url;

/// Everything the page knows about one checkout attempt.
///
/// The amount is in major currency units; it is converted to minor units by
/// the initiator, exactly once, when the overlay is configured.
#[derive(Debug, PartialEq, Clone)]
pub struct PaymentRequest {
    pub merchant_public_key: String,
    pub payer_email: String,
    pub amount: Decimal,
    pub item_id: String,
    pub user_id: String,
    pub callback_url: String,
}

impl PaymentRequest {
    /// Builds a request and validates it.
    pub fn new(
        merchant_public_key: impl Into<String>,
        payer_email: impl Into<String>,
        amount: Decimal,
        item_id: impl Into<String>,
        user_id: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Result<Self> {
        let request = Self {
            merchant_public_key: merchant_public_key.into(),
            payer_email: payer_email.into(),
            amount,
            item_id: item_id.into(),
            user_id: user_id.into(),
            callback_url: callback_url.into(),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<()> {
        self.checked_parts().map(|_| ())
    }

    /// Validates every field and returns the typed amount and callback URL.
    pub(crate) fn checked_parts(&self) -> Result<(Amount, Url)> {
        require_non_empty("Merchant public key", &self.merchant_public_key)?;
        require_non_empty("Item id", &self.item_id)?;
        require_non_empty("User id", &self.user_id)?;
        validate_email(&self.payer_email)?;
        let amount = Amount::new(self.amount)?;
        let callback_url = parse_callback_url(&self.callback_url)?;
        Ok((amount, callback_url))
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(CheckoutError::InvalidArgument(format!(
            "{field} must not be empty"
        )))
    } else {
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<()> {
    let invalid = || CheckoutError::InvalidArgument(format!("Invalid payer email {email:?}"));

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.is_empty()
        || domain.contains('@')
        || email.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }
    Ok(())
}

fn parse_callback_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| {
        CheckoutError::InvalidArgument(format!("Invalid callback URL {raw:?}: {e}"))
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(CheckoutError::InvalidArgument(format!(
            "Callback URL must be http(s), got scheme {other:?}"
        ))),
    }
}
