use crate::{BoardStatus, SoundEntry};

/// Commands sent from the async runtime to the main UI thread.
///
/// The main thread owns `TrayManager` (because `TrayIcon` is `!Send`),
/// so all tray mutations and process lifecycle events flow through this enum.
#[derive(Debug, Clone)]
pub enum TrayCommand {
    /// Update icon and tooltip.
    SetStatus(BoardStatus),
    /// Rebuild the per-sound submenus.
    SetSounds(Vec<SoundEntry>),
    /// Shut down the application. The main thread will exit the event loop.
    Shutdown,
}
