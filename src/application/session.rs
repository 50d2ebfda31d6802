use crate::domain::money::MinorUnits;
use crate::domain::reference::TransactionReference;
use crate::domain::session::{SessionOutcome, SessionState};
use crate::error::{CheckoutError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::warn;

/// State shared between a session and the callbacks handed to the overlay.
///
/// `settled` is a one-shot latch: the first party to claim it (a callback or
/// the stall timer) decides the terminal state, everyone after is ignored.
pub(crate) struct SessionShared {
    reference: TransactionReference,
    settled: AtomicBool,
    state: watch::Sender<SessionState>,
}

impl SessionShared {
    pub(crate) fn new(reference: TransactionReference) -> Arc<Self> {
        let (state, _) = watch::channel(SessionState::Idle);
        Arc::new(Self {
            reference,
            settled: AtomicBool::new(false),
            state,
        })
    }

    pub(crate) fn reference(&self) -> &TransactionReference {
        &self.reference
    }

    /// Returns true for exactly one caller.
    pub(crate) fn claim(&self) -> bool {
        self.settled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn publish(&self, state: SessionState) {
        self.state.send_replace(state);
    }

    /// Moves `Idle` to `OverlayOpen`, leaving any other state untouched.
    pub(crate) fn mark_open(&self) {
        self.state.send_if_modified(|state| {
            if *state == SessionState::Idle {
                *state = SessionState::OverlayOpen;
                true
            } else {
                false
            }
        });
    }

    fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}

/// A payment attempt whose overlay has been opened.
///
/// Each session is one-shot. Retrying means calling `initiate` again, which
/// produces a fresh reference.
pub struct PaymentSession {
    shared: Arc<SessionShared>,
    amount: MinorUnits,
    opened_at: Instant,
    stall_timeout: Option<Duration>,
}

impl PaymentSession {
    pub(crate) fn new(
        shared: Arc<SessionShared>,
        amount: MinorUnits,
        stall_timeout: Option<Duration>,
    ) -> Self {
        Self {
            shared,
            amount,
            opened_at: Instant::now(),
            stall_timeout,
        }
    }

    pub fn reference(&self) -> &TransactionReference {
        self.shared.reference()
    }

    /// The amount handed to the overlay, in minor units.
    pub fn amount(&self) -> MinorUnits {
        self.amount
    }

    pub fn state(&self) -> SessionState {
        self.shared.state.borrow().clone()
    }

    /// Waits until the provider calls back or the stall timeout expires.
    pub async fn wait(self) -> Result<SessionOutcome> {
        let mut receiver = self.shared.subscribe();

        let settled = match self.stall_timeout {
            None => Some(Self::settled(&mut receiver).await?),
            Some(timeout) => {
                tokio::time::timeout_at(self.opened_at + timeout, Self::settled(&mut receiver))
                    .await
                    .ok()
                    .transpose()?
            }
        };

        if let Some(outcome) = settled {
            return Ok(outcome);
        }

        if self.shared.claim() {
            warn!(
                reference = %self.shared.reference(),
                "Payment overlay stalled without calling back"
            );
            self.shared.publish(SessionState::Stalled);
            return Ok(SessionOutcome::Stalled);
        }

        // A callback won the race against the timer.
        Self::settled(&mut receiver).await
    }

    async fn settled(receiver: &mut watch::Receiver<SessionState>) -> Result<SessionOutcome> {
        let state = receiver
            .wait_for(SessionState::is_terminal)
            .await
            .map(|state| (*state).clone())
            .map_err(|_| {
                CheckoutError::ProviderFailure("Session state channel closed".to_string())
            })?;

        SessionOutcome::try_from(state).map_err(|state| {
            CheckoutError::ProviderFailure(format!(
                "Session settled in non-terminal state {state:?}"
            ))
        })
    }
}
