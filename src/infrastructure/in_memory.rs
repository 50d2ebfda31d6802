use crate::domain::overlay::{CloseCallback, OverlayConfig, SdkPayload, SuccessCallback};
use crate::domain::ports::{Navigator, Notifier, OverlayHandle, OverlayHandleBox, PaymentOverlay};
use crate::domain::session::ProviderResponse;
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use url::Url;

/// What a scripted provider does once its overlay is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderAction {
    /// Call the success callback with this provider reference.
    Succeed(String),
    /// Call the close callback.
    Cancel,
    /// Call nothing; callbacks stay pending until triggered by hand.
    Silent,
}

impl FromStr for ProviderAction {
    type Err = CheckoutError;

    fn from_str(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        match raw {
            "cancel" => Ok(ProviderAction::Cancel),
            "silent" => Ok(ProviderAction::Silent),
            _ => match raw.strip_prefix("success:") {
                Some(reference) if !reference.is_empty() => {
                    Ok(ProviderAction::Succeed(reference.to_string()))
                }
                _ => Err(CheckoutError::InvalidArgument(format!(
                    "Unknown provider action {raw:?}"
                ))),
            },
        }
    }
}

/// The data part of one `setup` call, as the overlay saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySetup {
    pub payload: SdkPayload,
    pub sdk_payload: serde_json::Value,
}

#[derive(Default)]
struct OverlayState {
    script: VecDeque<ProviderAction>,
    setups: Vec<OverlaySetup>,
    opens: usize,
    fail_next_setup: bool,
    fail_next_open: bool,
    pending_success: Option<SuccessCallback>,
    pending_close: Option<CloseCallback>,
}

/// An in-memory stand-in for the hosted payment overlay.
///
/// Each `open` consumes the next scripted action. With no action queued the
/// callbacks are kept so a test can fire them later, in any order.
#[derive(Default, Clone)]
pub struct ScriptedOverlay {
    state: Arc<Mutex<OverlayState>>,
}

impl ScriptedOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the action for the next opened overlay.
    pub fn push(&self, action: ProviderAction) {
        self.lock().script.push_back(action);
    }

    /// Drops any queued actions that no overlay consumed.
    pub fn discard_script(&self) {
        self.lock().script.clear();
    }

    pub fn fail_next_setup(&self) {
        self.lock().fail_next_setup = true;
    }

    /// Makes the next `open` report an error after running its scripted action.
    pub fn fail_next_open(&self) {
        self.lock().fail_next_open = true;
    }

    pub fn setups(&self) -> Vec<OverlaySetup> {
        self.lock().setups.clone()
    }

    pub fn setup_count(&self) -> usize {
        self.lock().setups.len()
    }

    pub fn open_count(&self) -> usize {
        self.lock().opens
    }

    /// Fires the pending success callback. Returns false if there was none.
    pub fn trigger_success(&self, provider_reference: &str) -> bool {
        let callback = self.lock().pending_success.take();
        match callback {
            Some(callback) => {
                callback(ProviderResponse::new(provider_reference));
                true
            }
            None => false,
        }
    }

    /// Fires the pending close callback. Returns false if there was none.
    pub fn trigger_close(&self) -> bool {
        let callback = self.lock().pending_close.take();
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, OverlayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PaymentOverlay for ScriptedOverlay {
    async fn setup(&self, config: OverlayConfig) -> Result<OverlayHandleBox> {
        let sdk_payload = config.sdk_payload();
        let (payload, success, close) = config.into_parts();

        let mut state = self.lock();
        if state.fail_next_setup {
            state.fail_next_setup = false;
            return Err(CheckoutError::ProviderFailure(
                "Scripted overlay configured to fail".to_string(),
            ));
        }
        state.setups.push(OverlaySetup {
            payload,
            sdk_payload,
        });

        Ok(Box::new(ScriptedHandle {
            state: self.state.clone(),
            success,
            close,
        }))
    }
}

struct ScriptedHandle {
    state: Arc<Mutex<OverlayState>>,
    success: SuccessCallback,
    close: CloseCallback,
}

#[async_trait]
impl OverlayHandle for ScriptedHandle {
    async fn open(self: Box<Self>) -> Result<()> {
        let ScriptedHandle {
            state,
            success,
            close,
        } = *self;

        let (action, fail) = {
            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            state.opens += 1;
            let fail = std::mem::take(&mut state.fail_next_open);
            let action = state.script.pop_front().unwrap_or(ProviderAction::Silent);
            (action, fail)
        };

        // Callbacks run without the lock held; the unused one stays pending.
        match action {
            ProviderAction::Succeed(reference) => {
                state
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .pending_close = Some(close);
                success(ProviderResponse::new(reference));
            }
            ProviderAction::Cancel => {
                state
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .pending_success = Some(success);
                close();
            }
            ProviderAction::Silent => {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                state.pending_success = Some(success);
                state.pending_close = Some(close);
            }
        }

        if fail {
            return Err(CheckoutError::ProviderFailure(
                "Scripted overlay failed to open".to_string(),
            ));
        }
        Ok(())
    }
}

/// Records every navigation instead of leaving the page.
#[derive(Default, Clone)]
pub struct RecordingNavigator {
    navigations: Arc<Mutex<Vec<Url>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn navigations(&self) -> Vec<Url> {
        self.navigations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: &Url) -> Result<()> {
        self.navigations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(target.clone());
        Ok(())
    }
}

/// Records every alert instead of showing it.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    alerts: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) -> Result<()> {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
        Ok(())
    }
}
