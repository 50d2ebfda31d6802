use super::money::MinorUnits;
use super::reference::TransactionReference;
use super::session::ProviderResponse;
use serde::Serialize;
use std::fmt;

/// Invoked by the provider when the payment went through.
pub type SuccessCallback = Box<dyn FnOnce(ProviderResponse) + Send>;
/// Invoked by the provider when the payer dismissed the overlay.
pub type CloseCallback = Box<dyn FnOnce() + Send>;

/// Everything the hosted overlay needs to start a payment.
pub struct OverlayConfig {
    pub key: String,
    pub email: String,
    pub amount: MinorUnits,
    pub currency: String,
    pub reference: TransactionReference,
    pub callback: SuccessCallback,
    pub on_close: CloseCallback,
}

/// The data part of `OverlayConfig`, in the shape the SDK's `setup` accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SdkPayload {
    pub key: String,
    pub email: String,
    pub amount: MinorUnits,
    pub currency: String,
    #[serde(rename = "ref")]
    pub reference: TransactionReference,
}

impl OverlayConfig {
    pub fn payload(&self) -> SdkPayload {
        SdkPayload {
            key: self.key.clone(),
            email: self.email.clone(),
            amount: self.amount,
            currency: self.currency.clone(),
            reference: self.reference.clone(),
        }
    }

    pub fn sdk_payload(&self) -> serde_json::Value {
        serde_json::json!(self.payload())
    }

    /// Splits the config into its payload and the two callbacks.
    pub fn into_parts(self) -> (SdkPayload, SuccessCallback, CloseCallback) {
        let payload = self.payload();
        (payload, self.callback, self.on_close)
    }
}

impl fmt::Debug for OverlayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayConfig")
            .field("key", &self.key)
            .field("email", &self.email)
            .field("amount", &self.amount)
            .field("currency", &self.currency)
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}
