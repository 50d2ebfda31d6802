#![allow(dead_code)]

use market_checkout::application::initiator::PaymentInitiator;
use market_checkout::config::CheckoutSettings;
use market_checkout::domain::reference::ReferenceGenerator;
use market_checkout::domain::request::PaymentRequest;
use market_checkout::infrastructure::in_memory::{
    RecordingNavigator, RecordingNotifier, ScriptedOverlay,
};
use rust_decimal_macros::dec;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;

pub const CANCEL_MESSAGE: &str = "Transaction was not completed, window closed.";

pub fn request() -> PaymentRequest {
    PaymentRequest::new(
        "pk_test_123",
        "buyer@example.com",
        dec!(500),
        "42",
        "7",
        "https://example.com/done",
    )
    .unwrap()
}

/// An initiator wired to in-memory fakes the test can inspect.
pub struct Harness {
    pub overlay: ScriptedOverlay,
    pub navigator: RecordingNavigator,
    pub notifier: RecordingNotifier,
    pub initiator: PaymentInitiator,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(CheckoutSettings::default())
    }

    pub fn with_settings(settings: CheckoutSettings) -> Self {
        let overlay = ScriptedOverlay::new();
        let navigator = RecordingNavigator::new();
        let notifier = RecordingNotifier::new();
        let initiator = PaymentInitiator::new(
            Box::new(overlay.clone()),
            Arc::new(navigator.clone()),
            Arc::new(notifier.clone()),
            settings,
        )
        .with_reference_generator(ReferenceGenerator::seeded(2024));

        Self {
            overlay,
            navigator,
            notifier,
            initiator,
        }
    }
}

pub fn write_attempts_csv(path: &Path, rows: &[[&str; 6]]) -> Result<(), Error> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        "item_id",
        "user_id",
        "email",
        "amount",
        "callback_url",
        "provider_action",
    ])?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}
