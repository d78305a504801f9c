//! "Press a key to assign this sound" prompt.
//!
//! [`KeyCapturePrompt`] is the pure state machine
//! (Idle -> Waiting -> Resolved | Cancelled). [`KeyCaptureSession`] runs it on
//! a short-lived thread fed by a [`KeyTap`](crate::hotkey_listener::KeyTap), so the global
//! listener keeps dispatching while the prompt waits.

use crate::{AppError, AppResult, BindingId, HotkeyListener, KeyBindingRegistry, KeyEvent, KeyId};

use std::{
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::RecvTimeoutError,
    },
    thread::JoinHandle,
    time::Duration,
};

use error_location::ErrorLocation;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// How often the capture thread checks for cancellation.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Prompt lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptState {
    /// Created, not yet listening.
    Idle,
    /// Listening for a key.
    Waiting,
    /// A key was accepted.
    Resolved(KeyId),
    /// Dismissed without a key.
    Cancelled,
}

/// Result of offering one key press to the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// Not a usable key, or the prompt is not waiting.
    Ignored,
    /// Key belongs to another sound; the prompt keeps waiting.
    Duplicate(KeyId),
    /// Key accepted; the prompt is resolved.
    Accepted(KeyId),
}

/// Key-capture state machine for one target sound.
#[derive(Debug)]
pub struct KeyCapturePrompt {
    target: BindingId,
    state: PromptState,
}

impl KeyCapturePrompt {
    /// New idle prompt choosing a key for `target`.
    pub fn new(target: BindingId) -> Self {
        Self {
            target,
            state: PromptState::Idle,
        }
    }

    /// Start waiting for key presses.
    pub fn open(&mut self) {
        if self.state == PromptState::Idle {
            self.state = PromptState::Waiting;
        }
    }

    /// Current state.
    #[cfg(test)]
    pub fn state(&self) -> &PromptState {
        &self.state
    }

    /// Test one key press against the registry.
    ///
    /// The target's own key is accepted again; a key held by any other sound
    /// is reported as a duplicate and the prompt stays open.
    pub fn offer(&mut self, event: &KeyEvent, registry: &KeyBindingRegistry) -> PromptOutcome {
        if self.state != PromptState::Waiting {
            return PromptOutcome::Ignored;
        }
        let Some(key) = event.key_id() else {
            return PromptOutcome::Ignored;
        };

        if registry.is_bound_elsewhere(&key, self.target) {
            return PromptOutcome::Duplicate(key);
        }

        self.state = PromptState::Resolved(key.clone());
        PromptOutcome::Accepted(key)
    }

    /// Dismiss the prompt. No effect once resolved.
    pub fn cancel(&mut self) {
        if matches!(self.state, PromptState::Idle | PromptState::Waiting) {
            self.state = PromptState::Cancelled;
        }
    }

    /// The accepted key, or `None` for "no key assigned".
    pub fn into_key(self) -> Option<KeyId> {
        match self.state {
            PromptState::Resolved(key) => Some(key),
            _ => None,
        }
    }
}

/// Progress reported by a running [`KeyCaptureSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureUpdate {
    /// The pressed key is taken; tell the user and keep waiting.
    Duplicate(KeyId),
    /// The prompt closed, with the accepted key or none.
    Finished(Option<KeyId>),
}

/// An open key-capture prompt running on its own thread.
pub struct KeyCaptureSession {
    target: BindingId,
    cancel: Arc<AtomicBool>,
    updates: mpsc::UnboundedReceiver<CaptureUpdate>,
    worker: Option<JoinHandle<()>>,
}

impl KeyCaptureSession {
    /// Attach a tap to `listener` and start waiting for a key for `target`.
    #[track_caller]
    #[instrument(skip(listener, registry))]
    pub fn open(
        listener: &HotkeyListener,
        registry: KeyBindingRegistry,
        target: BindingId,
    ) -> AppResult<Self> {
        let tap = listener.attach_tap();
        let cancel = Arc::new(AtomicBool::new(false));
        let (update_tx, updates) = mpsc::unbounded_channel();

        let thread_cancel = Arc::clone(&cancel);
        let worker = std::thread::Builder::new()
            .name("soundboard-key-capture".to_string())
            .spawn(move || {
                let mut prompt = KeyCapturePrompt::new(target);
                prompt.open();

                loop {
                    if thread_cancel.load(Ordering::Acquire) {
                        prompt.cancel();
                        break;
                    }
                    match tap.recv_timeout(CANCEL_POLL_INTERVAL) {
                        Ok(event) => match prompt.offer(&event, &registry) {
                            PromptOutcome::Accepted(_) => break,
                            PromptOutcome::Duplicate(key) => {
                                let _ = update_tx.send(CaptureUpdate::Duplicate(key));
                            }
                            PromptOutcome::Ignored => {}
                        },
                        Err(RecvTimeoutError::Timeout) => {}
                        Err(RecvTimeoutError::Disconnected) => {
                            // Another prompt took over the tap.
                            prompt.cancel();
                            break;
                        }
                    }
                }

                drop(tap);
                let _ = update_tx.send(CaptureUpdate::Finished(prompt.into_key()));
            })
            .map_err(|e| AppError::HotkeyListenerFailed {
                reason: format!("Failed to spawn key capture thread: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(binding_id = %target, "Waiting for a key");

        Ok(Self {
            target,
            cancel,
            updates,
            worker: Some(worker),
        })
    }

    /// Next progress update. `None` only if the capture thread died.
    pub async fn next_update(&mut self) -> Option<CaptureUpdate> {
        let update = self.updates.recv().await;
        if matches!(update, Some(CaptureUpdate::Finished(_)) | None) {
            self.join();
        }
        update
    }

    /// Dismiss the prompt; it finishes with no key.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
        debug!(binding_id = %self.target, "Key capture cancelled");
    }

    fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Key capture thread panicked");
            }
        }
    }
}

impl Drop for KeyCaptureSession {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Release);
    }
}
