//! Soundboard: play clips with global hotkeys, from the system tray.

mod app;
mod config;
mod controller;
mod desktop_ui;
mod error;
mod hotkey_listener;
mod key_capture;
mod key_event;
mod key_registry;
mod menu_action;
mod recording_state;
mod recording_workflow;
mod sound_binding;
#[cfg(test)]
mod tests;
mod tray_command;
mod tray_icon_state;
mod tray_manager;
mod ui;

pub(crate) use {
    app::App,
    controller::SoundboardController,
    desktop_ui::DesktopUi,
    error::{AppError, Result as AppResult},
    hotkey_listener::{HotkeyDispatcher, HotkeyListener},
    key_capture::{CaptureUpdate, KeyCaptureSession},
    key_event::{KeyEvent, KeyId},
    key_registry::KeyBindingRegistry,
    menu_action::MenuAction,
    recording_state::RecordingState,
    recording_workflow::RecordingWorkflow,
    sound_binding::{BindingId, SoundBinding},
    tray_command::TrayCommand,
    tray_icon_state::TrayIconState,
    tray_manager::TrayManager,
    ui::{BoardStatus, Notice, SoundEntry, UserInterface},
};

use crate::config::Config;

use soundboard_core::{
    AudioError, AudioPlayback, CpalCapture, RodioPlayback, UnavailablePlayback,
};

use std::{sync::Arc, time::Duration};

use tao::{
    event::{Event, StartCause},
    event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy},
};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_PREFIX: &str = "soundboard.log";
const FORWARDER_STOP_TIMEOUT: Duration = Duration::from_secs(1);

/// Application entry point.
fn main() {
    let (config, config_error) = match Config::load() {
        Ok(c) => (c, None),
        Err(e) => (Config::default(), Some(e)),
    };

    // tao ends the process without unwinding, so the log writer is flushed
    // by dropping its guard on Shutdown.
    let mut log_guard = init_tracing(&config.logging.filter);
    if let Some(e) = config_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }

    let event_loop = EventLoopBuilder::<TrayCommand>::with_user_event().build();
    let tray_proxy = event_loop.create_proxy();

    // TrayManager lives on the main thread - TrayIcon is !Send on all platforms.
    let mut tray_manager = match TrayManager::new() {
        Ok(tm) => tm,
        Err(e) => {
            error!("Failed to create TrayManager: {:?}", e);
            std::process::exit(1);
        }
    };

    let mut config = Some(config);

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(cmd) => match cmd {
                TrayCommand::SetStatus(status) => {
                    if let Err(e) = tray_manager.update_status(&status) {
                        error!(error = ?e, "Failed to update tray icon");
                    }
                }
                TrayCommand::SetSounds(sounds) => {
                    if let Err(e) = tray_manager.update_sounds(sounds) {
                        error!(error = ?e, "Failed to update tray menu");
                    }
                }
                TrayCommand::Shutdown => {
                    info!("Event loop exiting");
                    drop(log_guard.take());
                    *control_flow = ControlFlow::ExitWithCode(0);
                }
            },
            Event::NewEvents(StartCause::Init) => {
                let Some(config) = config.take() else {
                    return;
                };

                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                if let Err(e) = start_services(config, tray_proxy.clone()) {
                    error!("Failed to start soundboard: {:?}", e);
                    std::process::exit(1);
                }
            }
            _ => {}
        }
    });
}

/// Console output plus a daily rolling file in the data directory.
///
/// Returns the file writer guard, or `None` when only the console is logged.
fn init_tracing(filter: &str) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|e| {
        eprintln!("Invalid log filter {:?} ({}), using default", filter, e);
        EnvFilter::new(config::DEFAULT_LOG_FILTER)
    });

    let console = fmt::layer().with_target(true);

    let Ok(log_dir) = Config::log_dir() else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console)
            .init();
        return None;
    };

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    Some(guard)
}

/// Build the audio ports, start the global listener, and run the app on its
/// own tokio runtime thread.
fn start_services(config: Config, tray_proxy: EventLoopProxy<TrayCommand>) -> AppResult<()> {
    let recordings_dir = config.recordings.directory.clone();

    let ui: Arc<dyn UserInterface> = Arc::new(DesktopUi::new(tray_proxy.clone()));
    let playback = open_playback(ui.as_ref());
    let registry = KeyBindingRegistry::new();

    let listener = HotkeyListener::new(HotkeyDispatcher::new(
        registry.clone(),
        Arc::clone(&playback),
    ));
    if let Err(e) = listener.start() {
        // The board still works from the tray menu.
        error!(error = %e, "Global hotkeys unavailable");
        ui.notify(Notice::Error(e.user_message()));
    }

    let controller = SoundboardController::new(registry, playback, recordings_dir.clone());
    let capture = CpalCapture::new(config.audio.selected_device.clone());
    let workflow = RecordingWorkflow::new(Box::new(capture), recordings_dir);
    let assign_key_on_add = config.behavior.assign_key_on_add;

    // Spawn tokio runtime on separate thread.
    // TrayManager stays on the main thread.
    std::thread::Builder::new()
        .name("soundboard-app".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    error!("Failed to create tokio runtime: {:?}", e);
                    std::process::exit(1);
                }
            };

            rt.block_on(async {
                let (action_tx, action_rx) = mpsc::channel(32);
                let forwarder = app::spawn_menu_forwarder(action_tx);

                let app = App::new(
                    controller,
                    workflow,
                    listener,
                    ui,
                    action_rx,
                    assign_key_on_add,
                );

                if let Err(e) = app.run().await {
                    error!(error = ?e, "App error");
                }

                match tokio::time::timeout(FORWARDER_STOP_TIMEOUT, forwarder).await {
                    Ok(Ok(())) => info!("Menu event forwarder stopped cleanly"),
                    Ok(Err(e)) => error!(error = ?e, "Menu event forwarder task panicked"),
                    Err(_) => info!(
                        "Menu event forwarder did not stop within timeout, \
                         will be cleaned up on exit"
                    ),
                }

                if let Err(e) = tray_proxy.send_event(TrayCommand::Shutdown) {
                    error!(error = ?e, "Failed to send shutdown to the event loop");
                }
            });

            // The forwarder may still be parked on the menu channel.
            rt.shutdown_background();
        })?;

    Ok(())
}

/// Default output device, or a stand-in that reports every press when there
/// is none. Recording and key management keep working either way.
fn open_playback(ui: &dyn UserInterface) -> Arc<dyn AudioPlayback> {
    match RodioPlayback::new() {
        Ok(playback) => Arc::new(playback),
        Err(e) => {
            error!(error = %e, "Audio output unavailable, sounds will not play");
            let reason = match &e {
                AudioError::NoOutputDevice { reason, .. } => reason.clone(),
                other => other.to_string(),
            };
            ui.notify(Notice::Error(format!(
                "No audio output ({}). Sounds will not play.",
                reason
            )));
            Arc::new(UnavailablePlayback::new(reason))
        }
    }
}
