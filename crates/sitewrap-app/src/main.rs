//! SiteWrap - Main Application Entry Point
//!
//! Wraps one configured website in a native window. The event loop owns every
//! window and webview; webview handlers only post [`UserEvent`]s. Navigation
//! checks go to the policy thread over a blocking channel.

mod events;
mod ipc;
mod platform;
mod surfaces;
mod windows;

use events::UserEvent;
use muda::{Menu, MenuEvent};
use platform::{get_platform_manager, menu_ids, show_denied, PlatformManager};
use sitewrap_core::config::default_config_path;
use sitewrap_core::types::{SurfaceId, WindowId};
use sitewrap_core::{AppConfig, SiteWrapResult};
use sitewrap_policy::{policy_channel, NavigationPolicy, PolicyEngine, WindowRegistry, WindowRole};
use sitewrap_shell::{NewWindowMode, TitleTarget, VirtualWindowStack};
use std::sync::Arc;
use surfaces::{logical_size, Bounds, ContentSurface, Source, SurfaceFactory};
use tao::{
    dpi::LogicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoopBuilder, EventLoopWindowTarget},
    window::{Fullscreen, Window, WindowBuilder},
};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use windows::{ClientWindowHost, TopLevel, VirtualPane};

const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Shown in the main window when no site is configured
const VERSION_HTML: &str = include_str!("ui/version.html");
/// Set to `1` for debug logging
const DEBUG_ENV: &str = "SITEWRAP_DEBUG";

fn init_logging() {
    let level = match std::env::var(DEBUG_ENV) {
        Ok(value) if value == "1" => Level::DEBUG,
        _ => Level::INFO,
    };

    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to set log tracer: {}", e);
    }
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set subscriber: {}", e);
    }
}

fn version_page() -> String {
    VERSION_HTML.replace("{{VERSION}}", VERSION)
}

/// Everything the event loop owns
struct App {
    platform: Box<dyn PlatformManager>,
    engine: Arc<PolicyEngine>,
    surfaces: SurfaceFactory,
    main_surface: ContentSurface,
    virtual_windows: VirtualWindowStack<VirtualPane>,
    windows: WindowRegistry<TopLevel>,
    _menu: Menu,
    // dropped last; every webview above is a child of it
    window: Window,
}

impl App {
    fn handle_user_event(&mut self, event: UserEvent, target: &EventLoopWindowTarget<UserEvent>) {
        match event {
            UserEvent::OpenInnerWindow(url) => self.open_virtual_window(&url),
            UserEvent::OpenClientWindow(url) => self.open_client_window(&url, target),
            UserEvent::CloseMostRecent => self.close_most_recent(),
            UserEvent::CloseVirtualWindow(surface) => {
                if let Some(closed) = self.virtual_windows.close(surface) {
                    closed.handle.close();
                }
            }
            UserEvent::CloseWindow(id) => self.close_window(id),
            UserEvent::LoadUrl { surface, url } => match self.content_surface(surface) {
                Some(content) => content.load_url(&url),
                None => warn!("Load of {} for unknown {}", url, surface),
            },
            UserEvent::ShowBlockPage { surface, html } => match self.content_surface(surface) {
                Some(content) => content.show_block_page(&html),
                None => warn!("Block page for unknown {}", surface),
            },
            UserEvent::TitleChanged { surface, title } => self.route_title(surface, &title),
            UserEvent::PageLoaded(surface) => {
                if let Some(content) = self.content_surface(surface) {
                    content.interceptor.load_finished();
                }
            }
            UserEvent::Denied(denied) => show_denied(&denied),
        }
    }

    fn open_virtual_window(&mut self, url: &str) {
        let pane = match VirtualPane::open(&self.surfaces, &self.window, url) {
            Ok(pane) => pane,
            Err(e) => {
                error!("Failed to open virtual window for {}: {}", url, e);
                return;
            }
        };
        let surface = pane.surface();
        if let Err(e) = self.virtual_windows.open(surface, url, pane) {
            error!("Failed to register virtual window: {}", e);
        }
    }

    fn open_client_window(&mut self, url: &str, target: &EventLoopWindowTarget<UserEvent>) {
        let mut host = ClientWindowHost {
            target,
            main: &self.window,
            surfaces: &self.surfaces,
            platform: self.platform.as_ref(),
        };
        match self
            .engine
            .request_open_client_window(url, &mut self.windows, &mut host)
        {
            Ok(id) => info!("Client window {} open", id),
            Err(e) if e.as_denied().is_some() => {}
            Err(e) => error!("Failed to open client window for {}: {}", url, e),
        }
    }

    fn close_most_recent(&mut self) {
        match self.virtual_windows.close_most_recent() {
            Some(closed) => closed.handle.close(),
            None => info!("No virtual window to close"),
        }
    }

    fn close_window(&mut self, id: WindowId) {
        if self.windows.role(id) == Some(WindowRole::Main) {
            warn!("Refusing to close main window {} from a page", id);
            return;
        }
        if let Some(TopLevel::Client(client)) = self.windows.close(id) {
            client.close();
        }
    }

    /// Every content surface, main first
    fn content_surface(&self, surface: SurfaceId) -> Option<&ContentSurface> {
        if self.main_surface.id == surface {
            return Some(&self.main_surface);
        }
        if let Some(pane) = self.virtual_windows.get(surface) {
            return Some(&pane.handle.content);
        }
        self.windows
            .handles()
            .filter_map(TopLevel::as_client)
            .map(|client| &client.content)
            .find(|content| content.id == surface)
    }

    fn route_title(&mut self, surface: SurfaceId, title: &str) {
        match self.virtual_windows.update_title(surface, title) {
            TitleTarget::VirtualWindow(owner) => {
                if let Some(pane) = self.virtual_windows.get(owner) {
                    pane.handle.set_title(title);
                }
            }
            TitleTarget::Native => {
                if self.main_surface.id == surface {
                    self.window.set_title(title);
                    return;
                }
                let client = self
                    .windows
                    .handles()
                    .filter_map(TopLevel::as_client)
                    .find(|client| client.content.id == surface);
                if let Some(client) = client {
                    client.set_title(title);
                }
            }
        }
    }

    fn relayout(&self, window_id: tao::window::WindowId) {
        if window_id == self.window.id() {
            let (width, height) = logical_size(&self.window);
            self.main_surface.set_bounds(Bounds::full(width, height));
            for pane in self.virtual_windows.iter() {
                pane.handle.relayout(width, height);
            }
            return;
        }
        if let Some(client) = self
            .windows
            .handles()
            .filter_map(TopLevel::as_client)
            .find(|client| client.window.id() == window_id)
        {
            client.relayout();
        }
    }

    /// Returns true when the app should exit
    fn close_requested(&mut self, window_id: tao::window::WindowId) -> bool {
        if window_id == self.window.id() {
            info!("Main window close requested, shutting down...");
            return true;
        }
        if let Some(id) = self.windows.find_id(|handle| handle.native_id() == window_id) {
            self.close_window(id);
        }
        false
    }
}

fn create_main_surface(
    surfaces: &SurfaceFactory,
    window: &Window,
    config: &AppConfig,
) -> SiteWrapResult<ContentSurface> {
    let (width, height) = logical_size(window);
    let bounds = Bounds::full(width, height);
    let id = SurfaceId::new();
    match config.start_location() {
        Ok(Some(url)) => {
            info!("Loading {}", url);
            surfaces.content(window, id, Source::Url(url.as_str()), bounds)
        }
        Ok(None) => {
            info!("No site configured, showing version page");
            surfaces.content(window, id, Source::Html(&version_page()), bounds)
        }
        Err(e) => {
            error!("{}, showing version page", e);
            surfaces.content(window, id, Source::Html(&version_page()), bounds)
        }
    }
}

fn main() {
    init_logging();
    info!("Starting SiteWrap v{}...", VERSION);

    if let Err(e) = platform::ensure_supported() {
        error!("{}", e);
        std::process::exit(1);
    }

    let config_path = default_config_path();
    let config = AppConfig::load_or_default(&config_path);
    info!("Configuration loaded from {:?}", config_path);

    let engine = Arc::new(PolicyEngine::new(NavigationPolicy::from_config(
        &config.new_window,
    )));
    let (policy_client, policy_service) = policy_channel(Arc::clone(&engine));
    if let Err(e) = policy_service.spawn() {
        error!("Failed to start policy thread: {}", e);
        std::process::exit(1);
    }

    let mode = NewWindowMode::from_in_process(config.new_window.in_process);
    info!("New windows open as {:?}", mode);

    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let window = match WindowBuilder::new()
        .with_title("SiteWrap")
        .with_inner_size(LogicalSize::new(1280.0, 800.0))
        .with_always_on_top(config.always_on_top)
        .build(&event_loop)
    {
        Ok(window) => window,
        Err(e) => {
            error!("Failed to create window: {}", e);
            std::process::exit(1);
        }
    };
    if config.full_screen {
        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
    }

    let platform = get_platform_manager();
    info!("Platform: {}", platform.platform_name());

    let menu = Menu::new();
    if let Err(e) = platform.initialize_menu(&window, &menu) {
        error!("Failed to initialize menu: {}", e);
        // the close shortcut is unavailable, everything else still works
    }
    let menu_proxy = proxy.clone();
    MenuEvent::set_event_handler(Some(move |event: MenuEvent| {
        if event.id.0 == menu_ids::CLOSE_MOST_RECENT {
            let _ = menu_proxy.send_event(UserEvent::CloseMostRecent);
        }
    }));

    let surfaces = SurfaceFactory::new(policy_client, mode, proxy);
    let main_surface = match create_main_surface(&surfaces, &window, &config) {
        Ok(surface) => surface,
        Err(e) => {
            error!("Failed to create main surface: {}", e);
            std::process::exit(1);
        }
    };

    let mut windows = WindowRegistry::new();
    if let Err(e) = windows.register_main(TopLevel::Main(window.id())) {
        error!("{}", e);
        std::process::exit(1);
    }

    let mut app = App {
        platform,
        engine,
        surfaces,
        main_surface,
        virtual_windows: VirtualWindowStack::new(),
        windows,
        _menu: menu,
        window,
    };
    info!("Window created successfully");

    event_loop.run(move |event, event_loop_target, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                window_id,
                ..
            } => {
                if app.close_requested(window_id) {
                    *control_flow = ControlFlow::Exit;
                }
            }
            Event::WindowEvent {
                event: WindowEvent::Resized(_),
                window_id,
                ..
            } => app.relayout(window_id),
            Event::UserEvent(user_event) => app.handle_user_event(user_event, event_loop_target),
            _ => {}
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_page_names_version() {
        let page = version_page();
        assert!(page.contains(&format!("SiteWrap v{}", VERSION)));
        assert!(!page.contains("{{VERSION}}"));
    }
}
