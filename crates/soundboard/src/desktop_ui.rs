//! Desktop implementation of [`UserInterface`].
//!
//! - file picker: native dialog via `rfd`
//! - text input: a native entry dialog (zenity/kdialog, osascript or
//!   PowerShell), else one line from the launching terminal, else a notice
//! - notices: desktop notifications via `notify-rust` (also logged)
//! - status and sound list: forwarded to the tray on the main thread

use crate::{BoardStatus, Notice, SoundEntry, TrayCommand, UserInterface};

use soundboard_core::SUPPORTED_EXTENSIONS;

use std::{
    io::{self, BufRead, IsTerminal, Write},
    path::PathBuf,
    process::Stdio,
    sync::{Mutex, OnceLock},
};

use async_trait::async_trait;
use tao::event_loop::EventLoopProxy;
use tokio::{process::Command, sync::mpsc};
use tracing::{debug, error, info, warn};

const APP_NAME: &str = "Soundboard";
const NO_TEXT_INPUT: &str =
    "No text input available: install zenity or kdialog, or start Soundboard from a terminal";

/// Result of one attempt at reading a line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TextAnswer {
    /// The user entered this (trimmed, non-empty) text.
    Text(String),
    /// The user dismissed the prompt or left it empty.
    Cancelled,
    /// This input method does not work here.
    Unavailable,
}

type ConsoleLines = tokio::sync::Mutex<mpsc::UnboundedReceiver<String>>;

/// Tray + dialogs + console.
pub struct DesktopUi {
    tray_proxy: Mutex<EventLoopProxy<TrayCommand>>,
    console: OnceLock<Option<ConsoleLines>>,
}

impl DesktopUi {
    /// UI forwarding tray updates through `tray_proxy`.
    pub fn new(tray_proxy: EventLoopProxy<TrayCommand>) -> Self {
        Self {
            tray_proxy: Mutex::new(tray_proxy),
            console: OnceLock::new(),
        }
    }

    fn send(&self, command: TrayCommand) {
        let proxy = self.tray_proxy.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = proxy.send_event(command) {
            debug!(error = ?e, "Tray event loop closed, update dropped");
        }
    }

    /// Lines typed in the launching terminal, `None` without one.
    ///
    /// A single reader thread owns stdin for the life of the process, so a
    /// prompt dropped by Cancel leaves nothing blocked behind it.
    fn console_lines(&self) -> Option<&ConsoleLines> {
        self.console
            .get_or_init(|| {
                if !io::stdin().is_terminal() {
                    debug!("Stdin is not a terminal, console prompts disabled");
                    return None;
                }

                let (line_tx, line_rx) = mpsc::unbounded_channel();
                let spawned = std::thread::Builder::new()
                    .name("soundboard-console".to_string())
                    .spawn(move || {
                        for line in io::stdin().lock().lines() {
                            match line {
                                Ok(line) => {
                                    if line_tx.send(line).is_err() {
                                        break;
                                    }
                                }
                                Err(e) => {
                                    warn!(error = %e, "Failed to read console input");
                                    break;
                                }
                            }
                        }
                        debug!("Console input closed");
                    });

                match spawned {
                    Ok(_) => Some(tokio::sync::Mutex::new(line_rx)),
                    Err(e) => {
                        warn!(error = %e, "Failed to spawn console reader");
                        None
                    }
                }
            })
            .as_ref()
    }

    async fn ask_console(&self, title: &str, label: &str) -> TextAnswer {
        let Some(lines) = self.console_lines() else {
            return TextAnswer::Unavailable;
        };
        let mut lines = lines.lock().await;

        // Lines typed before the prompt was shown answer nothing.
        while lines.try_recv().is_ok() {}

        let mut stdout = io::stdout();
        let shown = stdout
            .write_all(format!("[{}] {}: ", title, label).as_bytes())
            .and_then(|()| stdout.flush());
        if let Err(e) = shown {
            warn!(error = %e, "Failed to show console prompt");
            return TextAnswer::Unavailable;
        }

        match lines.recv().await {
            Some(line) => console_answer(&line),
            None => TextAnswer::Unavailable,
        }
    }
}

#[async_trait]
impl UserInterface for DesktopUi {
    async fn pick_audio_file(&self) -> Option<PathBuf> {
        let picked = rfd::AsyncFileDialog::new()
            .set_title("Add Sound")
            .add_filter("Audio", &SUPPORTED_EXTENSIONS)
            .pick_file()
            .await;

        picked.map(|handle| handle.path().to_path_buf())
    }

    async fn ask_text(&self, title: &str, label: &str) -> Option<String> {
        let answer = match ask_dialog(title, label).await {
            TextAnswer::Unavailable => self.ask_console(title, label).await,
            answer => answer,
        };

        match answer {
            TextAnswer::Text(text) => Some(text),
            TextAnswer::Cancelled => {
                debug!(label, "Text prompt dismissed");
                None
            }
            TextAnswer::Unavailable => {
                self.notify(Notice::Warning(NO_TEXT_INPUT.to_string()));
                None
            }
        }
    }

    fn notify(&self, notice: Notice) {
        let (summary, icon) = match &notice {
            Notice::Info(text) => {
                info!(notice = %text, "Notice");
                ("Soundboard", "dialog-information")
            }
            Notice::Warning(text) => {
                warn!(notice = %text, "Notice");
                ("Soundboard", "dialog-warning")
            }
            Notice::Error(text) => {
                error!(notice = %text, "Notice");
                ("Soundboard - Error", "dialog-error")
            }
        };

        let body = notice.text().to_string();

        // Showing a notification can block on the session bus.
        let spawned = std::thread::Builder::new()
            .name("soundboard-notice".to_string())
            .spawn(move || {
                if let Err(e) = notify_rust::Notification::new()
                    .appname(APP_NAME)
                    .summary(summary)
                    .body(&body)
                    .icon(icon)
                    .show()
                {
                    warn!(error = %e, "Failed to show desktop notification");
                }
            });

        if let Err(e) = spawned {
            warn!(error = %e, "Failed to spawn notification thread");
        }
    }

    fn set_status(&self, status: BoardStatus) {
        self.send(TrayCommand::SetStatus(status));
    }

    fn set_sounds(&self, sounds: Vec<SoundEntry>) {
        self.send(TrayCommand::SetSounds(sounds));
    }
}

/// Try each entry dialog this platform may have, in order.
///
/// The child is killed if the prompt is dropped (menu Cancel or Exit).
async fn ask_dialog(title: &str, label: &str) -> TextAnswer {
    for (program, args) in dialog_commands(title, label) {
        let output = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await;

        match output {
            Ok(output) => return dialog_answer(output.status.success(), &output.stdout),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(program, "Text dialog not installed");
            }
            Err(e) => warn!(program, error = %e, "Failed to run text dialog"),
        }
    }
    TextAnswer::Unavailable
}

#[cfg(target_os = "windows")]
fn dialog_commands(title: &str, label: &str) -> Vec<(&'static str, Vec<String>)> {
    let script = format!(
        "Add-Type -AssemblyName Microsoft.VisualBasic; \
         [Microsoft.VisualBasic.Interaction]::InputBox({}, {})",
        powershell_literal(label),
        powershell_literal(title)
    );
    vec![(
        "powershell",
        vec!["-NoProfile".to_string(), "-Command".to_string(), script],
    )]
}

#[cfg(target_os = "macos")]
fn dialog_commands(title: &str, label: &str) -> Vec<(&'static str, Vec<String>)> {
    let script = format!(
        "text returned of (display dialog {} default answer \"\" with title {})",
        applescript_literal(label),
        applescript_literal(title)
    );
    vec![("osascript", vec!["-e".to_string(), script])]
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn dialog_commands(title: &str, label: &str) -> Vec<(&'static str, Vec<String>)> {
    vec![
        (
            "zenity",
            vec![
                "--entry".to_string(),
                format!("--title={}", title),
                format!("--text={}", label),
            ],
        ),
        (
            "kdialog",
            vec![
                "--title".to_string(),
                title.to_string(),
                "--inputbox".to_string(),
                label.to_string(),
            ],
        ),
    ]
}

/// Interpret a dialog's exit status and output.
///
/// Every entry dialog exits non-zero when dismissed.
pub(crate) fn dialog_answer(success: bool, stdout: &[u8]) -> TextAnswer {
    if !success {
        return TextAnswer::Cancelled;
    }
    console_answer(&String::from_utf8_lossy(stdout))
}

/// An empty answer counts as a dismissal.
pub(crate) fn console_answer(line: &str) -> TextAnswer {
    match line.trim() {
        "" => TextAnswer::Cancelled,
        text => TextAnswer::Text(text.to_string()),
    }
}

/// Double-quoted AppleScript string.
#[cfg_attr(not(any(test, target_os = "macos")), allow(dead_code))]
pub(crate) fn applescript_literal(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Single-quoted PowerShell string.
#[cfg_attr(not(any(test, target_os = "windows")), allow(dead_code))]
pub(crate) fn powershell_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}
