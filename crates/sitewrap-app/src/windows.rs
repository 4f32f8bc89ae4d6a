//! Virtual window panes and top-level client windows

use crate::events::UserEvent;
use crate::ipc::{set_title_script, window_id_script, IpcMessage};
use crate::platform::{show_denied, PlatformManager};
use crate::surfaces::{
    client_body, client_title_bar, client_window_geometry, logical_size, virtual_window_body, Bounds,
    ContentSurface, Source, SurfaceFactory,
};
use sitewrap_core::types::{SurfaceId, WindowId};
use sitewrap_core::{Denied, SiteWrapError, SiteWrapResult};
use sitewrap_policy::WindowHost;
use tao::dpi::{LogicalPosition, LogicalSize};
use tao::event_loop::EventLoopWindowTarget;
use tao::window::{Window, WindowBuilder};
use tracing::{info, warn};
use wry::WebView;

/// Title bar page of a virtual window, drawn over a dimming mask
const FRAME_HTML: &str = include_str!("ui/frame.html");
/// Title bar page of a client window
const CLIENT_HTML: &str = include_str!("ui/client.html");

fn push_title(frame: &WebView, title: &str) {
    if let Err(e) = frame.evaluate_script(&set_title_script(title)) {
        warn!("Failed to update title bar: {}", e);
    }
}

/// Views of one virtual window inside the main window
pub struct VirtualPane {
    pub content: ContentSurface,
    pub frame: WebView,
}

impl VirtualPane {
    /// Build the frame and its content surface over `main`
    pub fn open(surfaces: &SurfaceFactory, main: &Window, url: &str) -> SiteWrapResult<Self> {
        let id = SurfaceId::new();
        let (width, height) = logical_size(main);

        // frame first so the content view stacks above it
        let frame = surfaces.chrome(main, FRAME_HTML, None, Bounds::full(width, height), move |msg| {
            match msg {
                IpcMessage::CloseVirtualWindow => Some(UserEvent::CloseVirtualWindow(id)),
                _ => None,
            }
        })?;
        let content = surfaces.content(main, id, Source::Url(url), virtual_window_body(width, height))?;

        Ok(Self { content, frame })
    }

    pub fn surface(&self) -> SurfaceId {
        self.content.id
    }

    pub fn relayout(&self, width: f64, height: f64) {
        if let Err(e) = self.frame.set_bounds(Bounds::full(width, height).to_rect()) {
            warn!("Failed to resize frame of {}: {}", self.content.id, e);
        }
        self.content.set_bounds(virtual_window_body(width, height));
    }

    pub fn set_title(&self, title: &str) {
        push_title(&self.frame, title);
    }

    pub fn close(self) {
        self.content.terminate();
    }
}

/// A frameless top-level window: title bar page plus content surface
pub struct ClientWindow {
    pub content: ContentSurface,
    pub frame: WebView,
    pub window: Window,
}

impl ClientWindow {
    pub fn relayout(&self) {
        let (width, height) = logical_size(&self.window);
        if let Err(e) = self.frame.set_bounds(client_title_bar(width).to_rect()) {
            warn!("Failed to resize title bar of {}: {}", self.content.id, e);
        }
        self.content.set_bounds(client_body(width, height));
    }

    pub fn set_title(&self, title: &str) {
        push_title(&self.frame, title);
        self.window.set_title(title);
    }

    pub fn close(self) {
        self.content.terminate();
    }
}

/// Native handle stored in the window registry
pub enum TopLevel {
    /// The main window; owned by the app itself
    Main(tao::window::WindowId),
    Client(ClientWindow),
}

impl TopLevel {
    pub fn native_id(&self) -> tao::window::WindowId {
        match self {
            TopLevel::Main(id) => *id,
            TopLevel::Client(client) => client.window.id(),
        }
    }

    pub fn as_client(&self) -> Option<&ClientWindow> {
        match self {
            TopLevel::Main(_) => None,
            TopLevel::Client(client) => Some(client),
        }
    }
}

/// Creates client windows on the running event loop
pub struct ClientWindowHost<'a> {
    pub target: &'a EventLoopWindowTarget<UserEvent>,
    pub main: &'a Window,
    pub surfaces: &'a SurfaceFactory,
    pub platform: &'a dyn PlatformManager,
}

impl ClientWindowHost<'_> {
    fn main_bounds(&self) -> Bounds {
        let (width, height) = logical_size(self.main);
        let position = self
            .main
            .outer_position()
            .map(|p| p.to_logical::<f64>(self.main.scale_factor()))
            .unwrap_or_else(|_| LogicalPosition::new(0.0, 0.0));
        Bounds {
            x: position.x,
            y: position.y,
            width,
            height,
        }
    }
}

impl WindowHost for ClientWindowHost<'_> {
    type Handle = TopLevel;

    fn create_client_window(&mut self, id: WindowId, url: &str) -> SiteWrapResult<TopLevel> {
        let geometry = client_window_geometry(self.main_bounds());

        let builder = WindowBuilder::new()
            .with_title(url)
            .with_decorations(false)
            .with_inner_size(LogicalSize::new(geometry.width, geometry.height))
            .with_position(LogicalPosition::new(geometry.x, geometry.y));
        let window = self
            .platform
            .parented(builder, self.main)
            .build(self.target)
            .map_err(|e| SiteWrapError::window(format!("{}: {}", id, e)))?;

        let frame = self.surfaces.chrome(
            &window,
            CLIENT_HTML,
            Some(&window_id_script(id.0)),
            client_title_bar(geometry.width),
            move |msg| match msg {
                IpcMessage::CloseWindow { win_id } if win_id == id.0 => Some(UserEvent::CloseWindow(id)),
                _ => None,
            },
        )?;
        let content = self.surfaces.content(
            &window,
            SurfaceId::new(),
            Source::Url(url),
            client_body(geometry.width, geometry.height),
        )?;

        info!("Created client window {} ({})", id, content.id);
        Ok(TopLevel::Client(ClientWindow {
            content,
            frame,
            window,
        }))
    }

    fn report_denied(&mut self, denied: &Denied) {
        show_denied(denied);
    }
}
