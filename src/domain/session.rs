use crate::error::{CheckoutError, Result};
use serde::Deserialize;
use url::Url;

/// What the provider hands to the success callback.
///
/// `reference` is the provider's own identifier for the transaction and may
/// differ from the reference we supplied.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
pub struct ProviderResponse {
    pub reference: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "trans")]
    pub transaction: Option<String>,
}

impl ProviderResponse {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            status: None,
            transaction: None,
        }
    }
}

/// Lifecycle of a single payment attempt.
///
/// `Idle -> OverlayOpen -> {Redirecting | CancelledNotified | Stalled}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    OverlayOpen,
    Redirecting(Url),
    CancelledNotified,
    Stalled,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Redirecting(_) | SessionState::CancelledNotified | SessionState::Stalled
        )
    }
}

/// How a payment attempt ended, as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Redirected(Url),
    Cancelled,
    Stalled,
}

impl SessionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            SessionOutcome::Redirected(_) => "redirected",
            SessionOutcome::Cancelled => "cancelled",
            SessionOutcome::Stalled => "stalled",
        }
    }

    /// Maps cancellation and stalls to errors, for callers that want `?`.
    pub fn into_result(self) -> Result<Url> {
        match self {
            SessionOutcome::Redirected(url) => Ok(url),
            SessionOutcome::Cancelled => Err(CheckoutError::UserCancelled),
            SessionOutcome::Stalled => Err(CheckoutError::Stalled),
        }
    }
}

impl TryFrom<SessionState> for SessionOutcome {
    type Error = SessionState;

    fn try_from(state: SessionState) -> std::result::Result<Self, Self::Error> {
        match state {
            SessionState::Redirecting(url) => Ok(SessionOutcome::Redirected(url)),
            SessionState::CancelledNotified => Ok(SessionOutcome::Cancelled),
            SessionState::Stalled => Ok(SessionOutcome::Stalled),
            other => Err(other),
        }
    }
}
