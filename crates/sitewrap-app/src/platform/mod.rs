//! Platform abstraction layer
//!
//! Menus, modal dialogs and window parenting differ across macOS, Windows
//! and Linux. Everything else in the app is platform neutral.

#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "linux")]
mod linux;

use muda::{
    accelerator::{Accelerator, Code, Modifiers},
    Menu, MenuItem, Submenu,
};
use sitewrap_core::{Denied, SiteWrapError, SiteWrapResult};
use tao::window::{Window, WindowBuilder};
use tracing::debug;

/// Menu item IDs dispatched back to the event loop
pub mod menu_ids {
    pub const CLOSE_MOST_RECENT: &str = "close_most_recent";
}

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Platform-specific error types
#[derive(Debug, Clone)]
pub enum PlatformError {
    /// Menu initialization failed
    MenuInitFailed(String),
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::MenuInitFailed(msg) => write!(f, "Menu initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for PlatformError {}

/// Trait for platform-specific operations
pub trait PlatformManager: Send + Sync {
    /// Attach the application menu to the main window
    ///
    /// On macOS the menu is app-wide; elsewhere it belongs to the window.
    fn initialize_menu(&self, window: &Window, menu: &Menu) -> PlatformResult<()>;

    /// Make `builder` produce a window owned by `parent`, so it stays above
    /// it and closes with it.
    fn parented(&self, builder: WindowBuilder, parent: &Window) -> WindowBuilder;

    /// Get the platform name for logging
    fn platform_name(&self) -> &'static str;
}

/// Get the platform manager for the current operating system
pub fn get_platform_manager() -> Box<dyn PlatformManager> {
    #[cfg(target_os = "macos")]
    {
        Box::new(macos::MacOSPlatform::new())
    }

    #[cfg(target_os = "windows")]
    {
        Box::new(windows::WindowsPlatform::new())
    }

    #[cfg(target_os = "linux")]
    {
        Box::new(linux::LinuxPlatform::new())
    }
}

/// Fail fast on operating systems the shell has no window backend for
pub fn ensure_supported() -> SiteWrapResult<()> {
    if cfg!(any(target_os = "macos", target_os = "windows", target_os = "linux")) {
        Ok(())
    } else {
        Err(SiteWrapError::UnsupportedPlatform(
            std::env::consts::OS.to_string(),
        ))
    }
}

/// Accelerator for closing the most recent virtual window (CmdOrCtrl+W)
pub fn close_accelerator() -> Accelerator {
    let modifier = if cfg!(target_os = "macos") {
        Modifiers::META
    } else {
        Modifiers::CONTROL
    };
    Accelerator::new(Some(modifier), Code::KeyW)
}

/// Window menu shared by every platform
pub(crate) fn create_window_menu(menu: &Menu) -> PlatformResult<()> {
    let window_menu = Submenu::new("Window", true);

    let close_item = MenuItem::with_id(
        menu_ids::CLOSE_MOST_RECENT,
        "Close Window",
        true,
        Some(close_accelerator()),
    );
    window_menu
        .append(&close_item)
        .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to add Close Window: {}", e)))?;

    menu.append(&window_menu)
        .map_err(|e| PlatformError::MenuInitFailed(format!("Failed to append window menu: {}", e)))?;

    debug!("Window menu created");
    Ok(())
}

/// Text of the modal shown for a refused action
pub fn denial_description(denied: &Denied) -> String {
    if denied.url.is_empty() {
        denied.message.clone()
    } else {
        format!("{}\n\n{}", denied.message, denied.url)
    }
}

/// Show a blocking warning for a refused action
pub fn show_denied(denied: &Denied) {
    let _ = rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Warning)
        .set_title("SiteWrap")
        .set_description(denial_description(denied))
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}
