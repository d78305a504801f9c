//! System-wide key listener.
//!
//! One long-lived background thread receives every key press on the system
//! (via `rdev`), resolves it to a [`KeyEvent`], and plays the sound bound to
//! that key. While a key-capture prompt is open, the same events are also
//! copied to a single [`KeyTap`] so the prompt can pick a key without
//! installing a second OS hook.

use crate::{AppError, AppResult, BindingId, KeyBindingRegistry, KeyEvent};

use soundboard_core::AudioPlayback;

use std::{
    panic::{AssertUnwindSafe, Location},
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, AtomicU64, Ordering},
        mpsc,
    },
    time::Duration,
};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// How long `start` waits for the OS hook to fail before assuming it is live.
const LISTENER_STARTUP_GRACE: Duration = Duration::from_millis(200);

/// Callback handed to the OS-level listen loop.
pub type KeyCallback = Box<dyn FnMut(rdev::Event) + Send>;

/// Plays the sound bound to a key press.
#[derive(Clone)]
pub struct HotkeyDispatcher {
    registry: KeyBindingRegistry,
    playback: Arc<dyn AudioPlayback>,
}

impl HotkeyDispatcher {
    /// Dispatch through `registry` to `playback`.
    pub fn new(registry: KeyBindingRegistry, playback: Arc<dyn AudioPlayback>) -> Self {
        Self { registry, playback }
    }

    /// Play the sound bound to `event`'s key.
    ///
    /// Returns the sound that was triggered, `None` when the key is unbound or
    /// unresolvable. Playback is queued, never awaited.
    #[track_caller]
    pub fn dispatch(&self, event: &KeyEvent) -> AppResult<Option<BindingId>> {
        let Some(key) = event.key_id() else {
            return Ok(None);
        };
        let Some(sound) = self.registry.resolve(&key) else {
            return Ok(None);
        };

        self.playback.play(&sound.file_path)?;
        debug!(key = %key, binding_id = %sound.binding_id, "Hotkey triggered sound");

        Ok(Some(sound.binding_id))
    }
}

type TapSlot = Option<(u64, mpsc::Sender<KeyEvent>)>;

struct ListenerShared {
    dispatcher: HotkeyDispatcher,
    tap: Mutex<TapSlot>,
    next_tap_id: AtomicU64,
    running: AtomicBool,
    started: AtomicBool,
}

impl ListenerShared {
    fn tap_slot(&self) -> MutexGuard<'_, TapSlot> {
        self.tap.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Process-wide key listener. Construct once at startup and share by cloning.
#[derive(Clone)]
pub struct HotkeyListener {
    shared: Arc<ListenerShared>,
}

impl HotkeyListener {
    /// Create a stopped listener that will dispatch through `dispatcher`.
    pub fn new(dispatcher: HotkeyDispatcher) -> Self {
        Self {
            shared: Arc::new(ListenerShared {
                dispatcher,
                tap: Mutex::new(None),
                next_tap_id: AtomicU64::new(1),
                running: AtomicBool::new(false),
                started: AtomicBool::new(false),
            }),
        }
    }

    /// Start the background thread on the OS keyboard hook.
    #[instrument(skip(self))]
    pub fn start(&self) -> AppResult<()> {
        self.start_with(|callback| rdev::listen(callback).map_err(|e| format!("{:?}", e)))
    }

    /// Start the background thread on a caller-supplied listen loop.
    ///
    /// `listen` must block for as long as it delivers events.
    #[track_caller]
    pub fn start_with<L>(&self, listen: L) -> AppResult<()>
    where
        L: FnOnce(KeyCallback) -> Result<(), String> + Send + 'static,
    {
        if self.shared.started.swap(true, Ordering::AcqRel) {
            warn!("Hotkey listener already started");
            self.shared.running.store(true, Ordering::Release);
            return Ok(());
        }
        self.shared.running.store(true, Ordering::Release);

        let shared = Arc::clone(&self.shared);
        let (failed_tx, failed_rx) = mpsc::channel::<String>();

        let callback: KeyCallback = Box::new(move |event: rdev::Event| {
            let Some(key_event) = KeyEvent::from_rdev(&event) else {
                return;
            };
            let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
                on_key(&shared, key_event);
            }));
            if outcome.is_err() {
                error!("Key handler panicked, listener continues");
            }
        });

        std::thread::Builder::new()
            .name("soundboard-hotkeys".to_string())
            .spawn(move || {
                if let Err(reason) = listen(callback) {
                    error!(reason = %reason, "Global key listener stopped");
                    let _ = failed_tx.send(reason);
                }
            })
            .map_err(|e| AppError::HotkeyListenerFailed {
                reason: format!("Failed to spawn listener thread: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        if let Ok(reason) = failed_rx.recv_timeout(LISTENER_STARTUP_GRACE) {
            self.shared.running.store(false, Ordering::Release);
            self.shared.started.store(false, Ordering::Release);
            return Err(AppError::HotkeyListenerFailed {
                reason,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        info!("Global key listener started");
        Ok(())
    }

    /// Ignore all further key presses.
    ///
    /// The OS hook thread itself cannot be ended early; it exits with the
    /// process.
    pub fn stop(&self) {
        if self.shared.running.swap(false, Ordering::AcqRel) {
            info!("Global key listener stopped");
        }
    }

    /// True between `start` and `stop`.
    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Handle one resolved key press: copy it to the tap, then dispatch.
    pub fn on_key(&self, event: KeyEvent) {
        on_key(&self.shared, event);
    }

    /// Attach the transient listener used by the key-capture prompt.
    ///
    /// Only one tap exists at a time; attaching replaces the previous one.
    /// The tap detaches itself when dropped.
    pub fn attach_tap(&self) -> KeyTap {
        let id = self.shared.next_tap_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel();

        if self.shared.tap_slot().replace((id, tx)).is_some() {
            warn!("Replacing an attached key tap");
        }
        debug!(tap_id = id, "Key tap attached");

        KeyTap {
            id,
            shared: Arc::clone(&self.shared),
            rx,
        }
    }

    /// True while a key tap is attached.
    #[cfg(test)]
    pub fn has_tap(&self) -> bool {
        self.shared.tap_slot().is_some()
    }
}

fn on_key(shared: &ListenerShared, event: KeyEvent) {
    if !shared.running.load(Ordering::Acquire) {
        return;
    }

    {
        let slot = shared.tap_slot();
        if let Some((_, tx)) = slot.as_ref() {
            // A closed tap is cleaned up by its own Drop.
            let _ = tx.send(event.clone());
        }
    }

    match shared.dispatcher.dispatch(&event) {
        Ok(_) => {}
        Err(e) => warn!(error = %e, event = ?event, "Hotkey dispatch failed"),
    }
}

/// Receiving end of the listener's copy of key presses.
pub struct KeyTap {
    id: u64,
    shared: Arc<ListenerShared>,
    rx: mpsc::Receiver<KeyEvent>,
}

impl KeyTap {
    /// Wait up to `timeout` for the next key press.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<KeyEvent, mpsc::RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

impl Drop for KeyTap {
    fn drop(&mut self) {
        let mut slot = self.shared.tap_slot();
        if slot.as_ref().is_some_and(|(id, _)| *id == self.id) {
            *slot = None;
            debug!(tap_id = self.id, "Key tap detached");
        }
    }
}
