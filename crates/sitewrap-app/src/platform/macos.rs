//! macOS platform implementation
//!
//! The menu bar is application-wide and also carries the standard edit
//! items, without which clipboard shortcuts do nothing in the webview.

use super::{create_window_menu, PlatformError, PlatformManager, PlatformResult};
use muda::{Menu, PredefinedMenuItem, Submenu};
use tao::window::{Window, WindowBuilder};
use tracing::debug;

/// macOS platform manager
pub struct MacOSPlatform;

impl MacOSPlatform {
    pub fn new() -> Self {
        Self
    }

    fn create_app_menu(&self, menu: &Menu) -> PlatformResult<()> {
        let app_menu = Submenu::new("SiteWrap", true);

        app_menu
            .append(&PredefinedMenuItem::hide(None))
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to add Hide: {}", e)))?;

        app_menu
            .append(&PredefinedMenuItem::separator())
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to add separator: {}", e)))?;

        app_menu
            .append(&PredefinedMenuItem::quit(None))
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to add Quit: {}", e)))?;

        menu.append(&app_menu)
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to append app menu: {}", e)))?;

        Ok(())
    }

    fn create_edit_menu(&self, menu: &Menu) -> PlatformResult<()> {
        let edit_menu = Submenu::new("Edit", true);

        edit_menu
            .append(&PredefinedMenuItem::undo(None))
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to add Undo: {}", e)))?;

        edit_menu
            .append(&PredefinedMenuItem::redo(None))
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to add Redo: {}", e)))?;

        edit_menu
            .append(&PredefinedMenuItem::separator())
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to add separator: {}", e)))?;

        edit_menu
            .append(&PredefinedMenuItem::cut(None))
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to add Cut: {}", e)))?;

        edit_menu
            .append(&PredefinedMenuItem::copy(None))
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to add Copy: {}", e)))?;

        edit_menu
            .append(&PredefinedMenuItem::paste(None))
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to add Paste: {}", e)))?;

        edit_menu
            .append(&PredefinedMenuItem::select_all(None))
            .map_err(|e| {
                PlatformError::MenuInitFailed(format!("Failed to add Select All: {}", e))
            })?;

        menu.append(&edit_menu)
            .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to append edit menu: {}", e)))?;

        Ok(())
    }
}

impl Default for MacOSPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformManager for MacOSPlatform {
    fn initialize_menu(&self, _window: &Window, menu: &Menu) -> PlatformResult<()> {
        self.create_app_menu(menu)?;
        self.create_edit_menu(menu)?;
        create_window_menu(menu)?;

        menu.init_for_nsapp();

        debug!("macOS menu initialized successfully");
        Ok(())
    }

    fn parented(&self, builder: WindowBuilder, _parent: &Window) -> WindowBuilder {
        // no owned-window builder option here; keep it above the main window instead
        builder.with_always_on_top(true)
    }

    fn platform_name(&self) -> &'static str {
        "macOS"
    }
}
