use super::session::{PaymentSession, SessionShared};
use crate::config::CheckoutSettings;
use crate::domain::overlay::{CloseCallback, OverlayConfig, SuccessCallback};
use crate::domain::ports::{PaymentOverlayBox, SharedNavigator, SharedNotifier};
use crate::domain::redirect::redirect_target;
use crate::domain::reference::ReferenceGenerator;
use crate::domain::request::PaymentRequest;
use crate::domain::session::{ProviderResponse, SessionState};
use crate::error::{CheckoutError, Result};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use url::Url;

/// Starts payments on a hosted overlay and reacts to its callbacks.
///
/// On success the page is sent to the callback URL with the provider's
/// reference attached; on cancellation the user is told once and the page is
/// left alone. At most one of the two ever takes effect per session.
pub struct PaymentInitiator {
    overlay: PaymentOverlayBox,
    navigator: SharedNavigator,
    notifier: SharedNotifier,
    references: ReferenceGenerator,
    settings: CheckoutSettings,
}

impl PaymentInitiator {
    /// Creates a new `PaymentInitiator`.
    ///
    /// # Arguments
    ///
    /// * `overlay` - The hosted payment page.
    /// * `navigator` - Used to leave the page after a successful payment.
    /// * `notifier` - Used to tell the user a payment was abandoned.
    /// * `settings` - Currency, stall timeout and cancellation message.
    pub fn new(
        overlay: PaymentOverlayBox,
        navigator: SharedNavigator,
        notifier: SharedNotifier,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            overlay,
            navigator,
            notifier,
            references: ReferenceGenerator::new(),
            settings,
        }
    }

    /// Replaces the reference generator, e.g. with a seeded one.
    pub fn with_reference_generator(mut self, references: ReferenceGenerator) -> Self {
        self.references = references;
        self
    }

    /// Opens the payment overlay for `request`.
    ///
    /// Invalid requests fail before the overlay is touched. The returned
    /// session settles once the provider calls back (or stalls).
    #[instrument(skip_all, fields(item = %request.item_id, user = %request.user_id))]
    pub async fn initiate(&self, request: PaymentRequest) -> Result<PaymentSession> {
        let (amount, callback_url) = request.checked_parts()?;
        let reference = self
            .references
            .generate(&request.item_id, &request.user_id)?;
        let minor_amount = amount.to_minor_units(&self.settings.currency)?;

        let shared = SessionShared::new(reference.clone());
        let config = OverlayConfig {
            key: request.merchant_public_key,
            email: request.payer_email,
            amount: minor_amount,
            currency: self.settings.currency.code().to_string(),
            reference: reference.clone(),
            callback: self.success_callback(shared.clone(), callback_url),
            on_close: self.close_callback(shared.clone()),
        };

        let handle = self.overlay.setup(config).await.map_err(|e| {
            error!(%reference, error = %e, "Payment overlay setup failed");
            provider_failure(e)
        })?;

        shared.mark_open();
        if let Err(e) = handle.open().await {
            error!(%reference, error = %e, "Payment overlay failed to open");
            if shared.claim() {
                shared.publish(SessionState::Idle);
                return Err(provider_failure(e));
            }
            warn!(%reference, "Overlay reported an error after it had already called back");
        }

        info!(
            %reference,
            amount = %minor_amount,
            currency = %self.settings.currency,
            "Payment overlay opened"
        );
        Ok(PaymentSession::new(
            shared,
            minor_amount,
            self.settings.stall_timeout,
        ))
    }

    fn success_callback(&self, shared: Arc<SessionShared>, callback_url: Url) -> SuccessCallback {
        let navigator = self.navigator.clone();
        Box::new(move |response: ProviderResponse| {
            if !shared.claim() {
                warn!(
                    reference = %shared.reference(),
                    "Ignoring success callback on a settled session"
                );
                return;
            }

            if response.reference.is_empty() {
                warn!(reference = %shared.reference(), "Provider returned an empty reference");
            }
            let target = redirect_target(&callback_url, &response.reference);
            info!(
                reference = %shared.reference(),
                provider_reference = %response.reference,
                %target,
                "Payment succeeded, redirecting"
            );

            if let Err(e) = navigator.navigate(&target) {
                error!(reference = %shared.reference(), error = %e, "Redirect failed");
            }
            shared.publish(SessionState::Redirecting(target));
        })
    }

    fn close_callback(&self, shared: Arc<SessionShared>) -> CloseCallback {
        let notifier = self.notifier.clone();
        let message = self.settings.cancel_message.clone();
        Box::new(move || {
            if !shared.claim() {
                warn!(
                    reference = %shared.reference(),
                    "Ignoring close callback on a settled session"
                );
                return;
            }

            info!(reference = %shared.reference(), "Payment overlay closed by the payer");
            if let Err(e) = notifier.alert(&message) {
                error!(reference = %shared.reference(), error = %e, "Cancellation notice failed");
            }
            shared.publish(SessionState::CancelledNotified);
        })
    }
}

fn provider_failure(e: CheckoutError) -> CheckoutError {
    match e {
        CheckoutError::ProviderFailure(_) => e,
        other => CheckoutError::ProviderFailure(other.to_string()),
    }
}
