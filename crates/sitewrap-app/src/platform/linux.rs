//! Linux platform implementation
//!
//! The menu bar is packed into tao's default GTK vbox. Headless sessions
//! may not have one; the shortcut is then unavailable but the app runs.

use super::{create_window_menu, PlatformError, PlatformManager, PlatformResult};
use muda::Menu;
use tao::platform::unix::{WindowBuilderExtUnix, WindowExtUnix};
use tao::window::{Window, WindowBuilder};
use tracing::{debug, warn};

/// Linux platform manager
pub struct LinuxPlatform;

impl LinuxPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LinuxPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformManager for LinuxPlatform {
    fn initialize_menu(&self, window: &Window, menu: &Menu) -> PlatformResult<()> {
        create_window_menu(menu)?;

        match window.default_vbox() {
            Some(vbox) => {
                menu.init_for_gtk_window(window.gtk_window(), Some(vbox))
                    .map_err(|e| PlatformError::MenuInitFailed(format!("GTK init failed: {}", e)))?;
            }
            None => {
                warn!("GTK vbox not available for menu initialization");
            }
        }

        debug!("Linux menu initialized successfully");
        Ok(())
    }

    fn parented(&self, builder: WindowBuilder, parent: &Window) -> WindowBuilder {
        builder.with_transient_for(parent.gtk_window())
    }

    fn platform_name(&self) -> &'static str {
        "Linux"
    }
}
