use crate::BindingId;

/// A tray menu click, decoded from the item id.
///
/// Per-sound items carry the sound in their id (`play:3`), so the menu can be
/// rebuilt freely without keeping a lookup table in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Pick a file and add it.
    AddSound,
    /// Record a new clip.
    RecordSound,
    /// Cancel the running recording or key prompt.
    Cancel,
    /// Play a sound.
    Play(BindingId),
    /// Delete a sound.
    Delete(BindingId),
    /// Pick a new key for a sound.
    Reassign(BindingId),
    /// Open the recordings directory in the file manager.
    OpenRecordings,
    /// Quit.
    Exit,
}

impl MenuAction {
    /// Menu item id for this action.
    pub fn id(&self) -> String {
        match self {
            MenuAction::AddSound => "add".to_string(),
            MenuAction::RecordSound => "record".to_string(),
            MenuAction::Cancel => "cancel".to_string(),
            MenuAction::Play(id) => format!("play:{}", id.0),
            MenuAction::Delete(id) => format!("delete:{}", id.0),
            MenuAction::Reassign(id) => format!("reassign:{}", id.0),
            MenuAction::OpenRecordings => "open_recordings".to_string(),
            MenuAction::Exit => "exit".to_string(),
        }
    }

    /// Decode a menu item id. Unknown ids (submenu headers) yield `None`.
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "add" => return Some(MenuAction::AddSound),
            "record" => return Some(MenuAction::RecordSound),
            "cancel" => return Some(MenuAction::Cancel),
            "open_recordings" => return Some(MenuAction::OpenRecordings),
            "exit" => return Some(MenuAction::Exit),
            _ => {}
        }

        let (verb, raw) = id.split_once(':')?;
        let binding = BindingId(raw.parse().ok()?);
        match verb {
            "play" => Some(MenuAction::Play(binding)),
            "delete" => Some(MenuAction::Delete(binding)),
            "reassign" => Some(MenuAction::Reassign(binding)),
            _ => None,
        }
    }

    /// Actions still honoured while a recording or key prompt is running.
    pub fn allowed_while_busy(&self) -> bool {
        matches!(self, MenuAction::Cancel | MenuAction::Exit)
    }
}
