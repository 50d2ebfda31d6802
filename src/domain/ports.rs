use super::overlay::OverlayConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

/// A hosted payment page the browser cannot see into.
///
/// `setup` registers the payment; the returned handle shows it to the payer.
/// The provider later invokes at most one of the config's callbacks.
#[async_trait]
pub trait PaymentOverlay: Send + Sync {
    async fn setup(&self, config: OverlayConfig) -> Result<OverlayHandleBox>;
}

#[async_trait]
pub trait OverlayHandle: Send {
    async fn open(self: Box<Self>) -> Result<()>;
}

/// Moves the current page to another URL.
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &Url) -> Result<()>;
}

/// Shows a blocking message to the user.
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str) -> Result<()>;
}

pub type PaymentOverlayBox = Box<dyn PaymentOverlay>;
pub type OverlayHandleBox = Box<dyn OverlayHandle>;
pub type SharedNavigator = Arc<dyn Navigator>;
pub type SharedNotifier = Arc<dyn Notifier>;
