//! Windows platform implementation

use super::{create_window_menu, PlatformError, PlatformManager, PlatformResult};
use muda::Menu;
use tao::platform::windows::{WindowBuilderExtWindows, WindowExtWindows};
use tao::window::{Window, WindowBuilder};
use tracing::debug;

/// Windows platform manager
pub struct WindowsPlatform;

impl WindowsPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformManager for WindowsPlatform {
    fn initialize_menu(&self, window: &Window, menu: &Menu) -> PlatformResult<()> {
        create_window_menu(menu)?;

        unsafe {
            menu.init_for_hwnd(window.hwnd() as _)
                .map_err(|e| PlatformError::MenuInitFailed(format!("HWND init failed: {}", e)))?;
        }

        debug!("Windows menu initialized successfully");
        Ok(())
    }

    fn parented(&self, builder: WindowBuilder, parent: &Window) -> WindowBuilder {
        builder.with_owner_window(parent.hwnd() as _)
    }

    fn platform_name(&self) -> &'static str {
        "Windows"
    }
}
