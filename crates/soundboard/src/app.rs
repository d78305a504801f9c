use crate::{
    AppResult, BindingId, BoardStatus, CaptureUpdate, HotkeyListener, KeyCaptureSession, MenuAction,
    Notice, RecordingState, RecordingWorkflow, SoundEntry, SoundboardController, UserInterface,
    controller::DeleteOutcome, recording_workflow::parse_duration,
};

use std::{fs, sync::Arc, time::Duration};

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Interval, MissedTickBehavior},
};
use tracing::{debug, error, info, instrument, warn};
use tray_icon::menu::MenuEvent;

const TICK_INTERVAL: Duration = Duration::from_secs(1);
const BUSY_NOTICE: &str = "Busy: finish or cancel the current recording or key prompt first";

/// Main application state.
///
/// Runs on the async runtime thread, which plays the role of the single UI
/// thread: every menu action, every recording tick and every registry write
/// happens here, one at a time. Tray updates go back to the main thread
/// through the [`UserInterface`] port.
pub struct App {
    controller: SoundboardController,
    workflow: RecordingWorkflow,
    listener: HotkeyListener,
    ui: Arc<dyn UserInterface>,
    actions: mpsc::Receiver<MenuAction>,
    assign_key_on_add: bool,
    exiting: bool,
}

impl App {
    /// Wire the app to its collaborators. `actions` carries decoded menu
    /// clicks.
    pub(crate) fn new(
        controller: SoundboardController,
        workflow: RecordingWorkflow,
        listener: HotkeyListener,
        ui: Arc<dyn UserInterface>,
        actions: mpsc::Receiver<MenuAction>,
        assign_key_on_add: bool,
    ) -> Self {
        Self {
            controller,
            workflow,
            listener,
            ui,
            actions,
            assign_key_on_add,
            exiting: false,
        }
    }

    /// Run the main application event loop until Exit.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Soundboard starting");

        self.load_existing();
        self.ui.set_status(BoardStatus::Idle);

        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                action = self.actions.recv() => match action {
                    Some(action) => self.handle_action(action, &mut ticker).await,
                    None => {
                        info!("Menu channel closed, shutting down");
                        break;
                    }
                },

                _ = ticker.tick(), if self.workflow.is_active() => {
                    self.on_tick().await;
                }
            }

            if self.exiting {
                break;
            }
        }

        self.shutdown();
        info!("Soundboard shut down successfully");

        Ok(())
    }

    /// Startup scan of the recordings directory.
    pub(crate) fn load_existing(&mut self) {
        match self.controller.load_existing() {
            Ok(count) => debug!(count, "Startup scan finished"),
            Err(e) => {
                error!(error = %e, "Failed to scan recordings directory");
                self.ui.notify(Notice::Error(e.user_message()));
            }
        }
        self.publish_sounds();
    }

    /// Handle one menu click.
    #[instrument(skip(self, ticker))]
    pub(crate) async fn handle_action(&mut self, action: MenuAction, ticker: &mut Interval) {
        if self.workflow.is_active() && !action.allowed_while_busy() {
            self.ui.notify(Notice::Warning(BUSY_NOTICE.to_string()));
            return;
        }

        match action {
            MenuAction::AddSound => self.add_from_picker().await,
            MenuAction::RecordSound => {
                if self.start_recording().await {
                    // First countdown tick one full second from now.
                    ticker.reset();
                }
            }
            MenuAction::Cancel => self.cancel_recording().await,
            MenuAction::Play(id) => {
                if let Err(e) = self.controller.play(id) {
                    warn!(binding_id = %id, error = %e, "Failed to play sound");
                    self.ui.notify(Notice::Error(e.user_message()));
                }
            }
            MenuAction::Delete(id) => self.delete(id),
            MenuAction::Reassign(id) => self.capture_key(id).await,
            MenuAction::OpenRecordings => self.open_recordings(),
            MenuAction::Exit => {
                info!("Exit requested from tray menu");
                self.exiting = true;
            }
        }
    }

    /// Advance the recording by one second and show the result.
    pub(crate) async fn on_tick(&mut self) {
        match self.workflow.tick() {
            Ok(RecordingState::Countdown { remaining }) => {
                self.ui.set_status(BoardStatus::Countdown(remaining));
            }
            Ok(RecordingState::Capturing { remaining }) => {
                self.ui.set_status(BoardStatus::Recording(remaining));
            }
            Ok(RecordingState::Saving) => self.ui.set_status(BoardStatus::Saving),
            Ok(RecordingState::Done { path }) => {
                self.ui.set_status(BoardStatus::Idle);
                self.ui
                    .notify(Notice::Info(format!("Recording saved to {}", path.display())));
                self.add_path(&path).await;
            }
            Ok(RecordingState::Cancelled) => {
                self.ui.set_status(BoardStatus::Idle);
                self.ui.notify(Notice::Info("Recording cancelled".to_string()));
            }
            Ok(RecordingState::Idle) => self.ui.set_status(BoardStatus::Idle),
            Err(e) => {
                error!(error = %e, "Recording failed");
                self.ui.set_status(BoardStatus::Idle);
                self.ui.notify(Notice::Error(e.user_message()));
            }
        }
    }

    /// True once Exit was chosen.
    #[cfg(test)]
    pub(crate) fn is_exiting(&self) -> bool {
        self.exiting
    }

    /// The board.
    #[cfg(test)]
    pub(crate) fn controller(&self) -> &SoundboardController {
        &self.controller
    }

    /// The recording workflow.
    #[cfg(test)]
    pub(crate) fn workflow(&self) -> &RecordingWorkflow {
        &self.workflow
    }

    async fn add_from_picker(&mut self) {
        let Some(path) = self.ui.pick_audio_file().await else {
            debug!("File picker cancelled");
            return;
        };
        self.add_path(&path).await;
    }

    /// Put `path` on the board, then optionally ask for its key.
    async fn add_path(&mut self, path: &std::path::Path) {
        let id = match self.controller.add_sound(path) {
            Ok(id) => id,
            Err(e) => {
                warn!(path = ?path, error = %e, "Failed to add sound");
                self.ui.notify(Notice::Error(e.user_message()));
                return;
            }
        };
        self.publish_sounds();

        if self.assign_key_on_add {
            self.capture_key(id).await;
        }
    }

    /// Ask for a name and a duration, then enter the countdown.
    ///
    /// Returns true when a recording started.
    async fn start_recording(&mut self) -> bool {
        let started = self.prompt_and_start().await;
        if !started {
            self.ui.set_status(BoardStatus::Idle);
        }
        started
    }

    async fn prompt_and_start(&mut self) -> bool {
        let Some(name) = self.ask_text("Record Sound", "Name").await else {
            return false;
        };
        let Some(duration) = self.ask_text("Record Sound", "Duration in seconds").await else {
            return false;
        };

        let started = parse_duration(&duration).and_then(|secs| self.workflow.start(&name, secs));

        match started {
            Ok(RecordingState::Countdown { remaining }) => {
                self.ui.set_status(BoardStatus::Countdown(remaining));
                true
            }
            Ok(state) => {
                warn!(state = ?state, "Recording started in an unexpected state");
                true
            }
            Err(e) => {
                warn!(error = %e, "Recording not started");
                self.ui.notify(Notice::Warning(e.user_message()));
                false
            }
        }
    }

    /// Ask for one line of text while still reading the menu.
    ///
    /// Cancel dismisses the prompt and Exit ends the app; other clicks are
    /// refused until the prompt is answered.
    async fn ask_text(&mut self, title: &str, label: &str) -> Option<String> {
        self.ui.set_status(BoardStatus::AwaitingText(label.to_string()));

        let ui = Arc::clone(&self.ui);
        let prompt = ui.ask_text(title, label);
        tokio::pin!(prompt);

        loop {
            tokio::select! {
                answer = &mut prompt => return answer,

                action = self.actions.recv() => match action {
                    Some(MenuAction::Cancel) => {
                        debug!(label, "Text prompt cancelled from the menu");
                        return None;
                    }
                    Some(MenuAction::Exit) => {
                        info!("Exit requested during text prompt");
                        self.exiting = true;
                        return None;
                    }
                    Some(_) => self.ui.notify(Notice::Warning(BUSY_NOTICE.to_string())),
                    None => return None,
                },
            }
        }
    }

    async fn cancel_recording(&mut self) {
        if !self.workflow.is_active() {
            debug!("Nothing to cancel");
            return;
        }
        self.workflow.cancel();
        // The flag is seen at the next tick boundary; take that boundary now.
        self.on_tick().await;
    }

    fn delete(&mut self, id: BindingId) {
        let name = self
            .controller
            .binding(id)
            .map(|b| b.display_name.clone())
            .unwrap_or_else(|| id.to_string());

        match self.controller.delete(id) {
            Ok(DeleteOutcome::FileRemoved) => {
                self.ui
                    .notify(Notice::Info(format!("Deleted {} and its recording", name)));
            }
            Ok(DeleteOutcome::FileKept) => {
                self.ui.notify(Notice::Info(format!("Removed {}", name)));
            }
            Err(e) => {
                warn!(binding_id = %id, error = %e, "Failed to delete sound");
                self.ui.notify(Notice::Error(e.user_message()));
            }
        }
        self.publish_sounds();
    }

    /// Run the key-capture prompt for `id` and apply its outcome.
    ///
    /// Nested sub-loop: menu clicks are still read so Cancel can dismiss the
    /// prompt, while the global listener keeps playing sounds.
    async fn capture_key(&mut self, id: BindingId) {
        let Some(name) = self.controller.binding(id).map(|b| b.display_name.clone()) else {
            warn!(binding_id = %id, "Key prompt for unknown sound");
            return;
        };

        let mut session =
            match KeyCaptureSession::open(&self.listener, self.controller.registry().clone(), id) {
                Ok(session) => session,
                Err(e) => {
                    error!(binding_id = %id, error = %e, "Failed to open key prompt");
                    self.ui.notify(Notice::Error(e.user_message()));
                    return;
                }
            };

        self.ui.set_status(BoardStatus::AwaitingKey(name.clone()));

        let mut actions_open = true;
        let key = loop {
            tokio::select! {
                update = session.next_update() => match update {
                    Some(CaptureUpdate::Duplicate(key)) => {
                        self.ui.notify(Notice::Warning(format!(
                            "Key '{}' is already used by another sound, press a different key",
                            key
                        )));
                    }
                    Some(CaptureUpdate::Finished(key)) => break key,
                    None => break None,
                },

                action = self.actions.recv(), if actions_open => match action {
                    Some(MenuAction::Cancel) => session.cancel(),
                    Some(MenuAction::Exit) => {
                        self.exiting = true;
                        session.cancel();
                    }
                    Some(_) => self.ui.notify(Notice::Warning(BUSY_NOTICE.to_string())),
                    None => {
                        actions_open = false;
                        session.cancel();
                    }
                },
            }
        };

        match self.controller.assign_key(id, key.clone()) {
            Ok(()) => match key {
                Some(key) => self
                    .ui
                    .notify(Notice::Info(format!("Key '{}' now plays {}", key, name))),
                None => self.ui.notify(Notice::Info(format!("{} has no key", name))),
            },
            Err(e) => {
                warn!(binding_id = %id, error = %e, "Failed to assign key");
                self.ui.notify(Notice::Error(e.user_message()));
            }
        }

        self.publish_sounds();
        self.ui.set_status(BoardStatus::Idle);
    }

    fn open_recordings(&self) {
        let dir = self.controller.recordings_dir();
        let opened = fs::create_dir_all(dir).and_then(|()| open::that(dir));
        if let Err(e) = opened {
            warn!(dir = ?dir, error = %e, "Failed to open recordings folder");
            self.ui.notify(Notice::Error(format!(
                "Could not open {}: {}",
                dir.display(),
                e
            )));
        }
    }

    fn publish_sounds(&self) {
        let sounds = self
            .controller
            .bindings()
            .iter()
            .map(|b| SoundEntry {
                id: b.id,
                label: b.label(),
            })
            .collect();
        self.ui.set_sounds(sounds);
    }

    fn shutdown(&mut self) {
        self.listener.stop();
        if self.workflow.is_active() {
            self.workflow.cancel();
            if let Err(e) = self.workflow.tick() {
                warn!(error = %e, "Recording did not shut down cleanly");
            }
        }
    }
}

/// Forward tray menu clicks into `actions` on a single blocking task.
///
/// `MenuEvent::receiver()` is a blocking channel, so one dedicated thread
/// waits on it. The task ends at the first click after `actions` is closed.
pub(crate) fn spawn_menu_forwarder(actions: mpsc::Sender<MenuAction>) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        let receiver = MenuEvent::receiver();
        while let Ok(event) = receiver.recv() {
            let Some(action) = MenuAction::parse(&event.id.0) else {
                debug!(menu_id = ?event.id, "Ignoring unknown menu item");
                continue;
            };
            if actions.blocking_send(action).is_err() {
                break;
            }
        }
    })
}
