//! System tray icon, tooltip and menu.
//!
//! The icon colour follows the board status, the tooltip carries the
//! countdown, and the Play / Delete / Re-Assign submenus list every sound.
//! Lives on the main thread: `TrayIcon` is `!Send`.

use crate::{AppError, AppResult, BoardStatus, MenuAction, SoundEntry, TrayIconState};

use std::panic::Location;

use error_location::ErrorLocation;
use image::{Rgba, RgbaImage};
use tracing::{debug, info, instrument};
use tray_icon::menu::{IsMenuItem, Menu, MenuItem, PredefinedMenuItem, Submenu};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

const ICON_SIZE: u32 = 32;

/// System tray icon manager.
pub struct TrayManager {
    tray_icon: TrayIcon,
    state: TrayIconState,
    busy: bool,
    sounds: Vec<SoundEntry>,
}

impl TrayManager {
    /// Create the tray icon with an empty board.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let menu = build_menu(&[], false)?;
        let icon = render_icon(TrayIconState::Idle)?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip(BoardStatus::Idle.describe())
            .with_menu(Box::new(menu))
            .with_icon(icon)
            .build()
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to create tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("System tray icon initialized");

        Ok(Self {
            tray_icon,
            state: TrayIconState::Idle,
            busy: false,
            sounds: Vec::new(),
        })
    }

    /// Show `status` on the icon and tooltip.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn update_status(&mut self, status: &BoardStatus) -> AppResult<()> {
        let state = TrayIconState::from(status);

        if state != self.state {
            let icon = render_icon(state)?;
            self.tray_icon
                .set_icon(Some(icon))
                .map_err(|e| AppError::TrayError {
                    reason: format!("Failed to update icon: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;
            self.state = state;
        }

        self.tray_icon
            .set_tooltip(Some(status.describe()))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update tooltip: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        // Cancel is only clickable while there is something to cancel.
        let busy = state != TrayIconState::Idle;
        if busy != self.busy {
            self.busy = busy;
            self.rebuild_menu()?;
        }

        Ok(())
    }

    /// Replace the sounds listed in the submenus.
    #[track_caller]
    #[instrument(skip(self, sounds), fields(count = sounds.len()))]
    pub fn update_sounds(&mut self, sounds: Vec<SoundEntry>) -> AppResult<()> {
        self.sounds = sounds;
        self.rebuild_menu()
    }

    #[track_caller]
    fn rebuild_menu(&mut self) -> AppResult<()> {
        let menu = build_menu(&self.sounds, self.busy)?;
        self.tray_icon.set_menu(Some(Box::new(menu)));
        debug!(sounds = self.sounds.len(), busy = self.busy, "Tray menu rebuilt");
        Ok(())
    }
}

#[track_caller]
fn build_menu(sounds: &[SoundEntry], busy: bool) -> AppResult<Menu> {
    let menu = Menu::new();

    let add = action_item(MenuAction::AddSound, "Add Sound", !busy);
    let record = action_item(MenuAction::RecordSound, "Record Sound", !busy);
    let cancel = action_item(MenuAction::Cancel, "Cancel", busy);
    let play = sound_submenu("Play", sounds, !busy, MenuAction::Play)?;
    let delete = sound_submenu("Delete Sound", sounds, !busy, MenuAction::Delete)?;
    let reassign = sound_submenu("Re-Assign Key", sounds, !busy, MenuAction::Reassign)?;
    let open = action_item(MenuAction::OpenRecordings, "Open Recordings Folder", true);
    let exit = action_item(MenuAction::Exit, "Exit", true);
    let first_separator = PredefinedMenuItem::separator();
    let second_separator = PredefinedMenuItem::separator();

    let items: [&dyn IsMenuItem; 10] = [
        &add,
        &record,
        &cancel,
        &first_separator,
        &play,
        &delete,
        &reassign,
        &second_separator,
        &open,
        &exit,
    ];

    menu.append_items(&items).map_err(|e| AppError::TrayError {
        reason: format!("Failed to build tray menu: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok(menu)
}

fn action_item(action: MenuAction, text: &str, enabled: bool) -> MenuItem {
    MenuItem::with_id(action.id(), text, enabled, None)
}

#[track_caller]
fn sound_submenu(
    title: &str,
    sounds: &[SoundEntry],
    enabled: bool,
    action: fn(crate::BindingId) -> MenuAction,
) -> AppResult<Submenu> {
    let submenu = Submenu::new(title, enabled && !sounds.is_empty());

    for sound in sounds {
        let item = action_item(action(sound.id), &sound.label, true);
        submenu.append(&item).map_err(|e| AppError::TrayError {
            reason: format!("Failed to add {} entry: {}", title, e),
            location: ErrorLocation::from(Location::caller()),
        })?;
    }

    Ok(submenu)
}

/// Filled circle in the state's colour.
#[track_caller]
fn render_icon(state: TrayIconState) -> AppResult<Icon> {
    let [r, g, b] = state.colour();
    let centre = (ICON_SIZE as f32 - 1.0) / 2.0;
    let radius = ICON_SIZE as f32 / 2.0 - 1.0;

    let img = RgbaImage::from_fn(ICON_SIZE, ICON_SIZE, |x, y| {
        let dx = x as f32 - centre;
        let dy = y as f32 - centre;
        if dx * dx + dy * dy <= radius * radius {
            Rgba([r, g, b, 0xff])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });

    let (width, height) = (img.width(), img.height());

    Icon::from_rgba(img.into_raw(), width, height).map_err(|e| AppError::TrayError {
        reason: format!("Failed to create icon from RGBA: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })
}
