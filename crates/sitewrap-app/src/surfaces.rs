//! Webview construction and layout
//!
//! A content surface is a wry webview whose navigation, new-window,
//! download, title and load callbacks all go through one [`Interceptor`].
//! [`Backend`] decides what each callback means on the running platform.
//! Chrome webviews (frames) render local HTML and only talk IPC.

use crate::events::{follow_up, UserEvent};
use crate::ipc::{content_script, IpcMessage};
use sitewrap_core::types::SurfaceId;
use sitewrap_core::{SiteWrapError, SiteWrapResult};
use sitewrap_policy::PolicyClient;
use sitewrap_shell::{Backend, Interception, Interceptor, NewWindowMode};
use std::path::PathBuf;
use std::sync::Arc;
use tao::dpi::{LogicalPosition, LogicalSize};
use tao::event_loop::EventLoopProxy;
use tao::window::Window;
use tracing::{debug, info, warn};
use wry::raw_window_handle::HasWindowHandle;
use wry::{PageLoadEvent, Rect, WebView, WebViewBuilder};

/// Height of the title bar drawn by frame pages
pub const TITLE_BAR_HEIGHT: f64 = 20.0;
/// Virtual window panel offset, as a fraction of the main window
const PANEL_INSET: f64 = 0.075;
/// Virtual window panel size, as a fraction of the main window
const PANEL_SCALE: f64 = 0.85;

/// Rectangle in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn full(width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    pub fn to_rect(self) -> Rect {
        Rect {
            position: LogicalPosition::new(self.x, self.y).into(),
            size: LogicalSize::new(self.width, self.height).into(),
        }
    }
}

/// Inner size of `window` in logical pixels
pub fn logical_size(window: &Window) -> (f64, f64) {
    let scale = window.scale_factor();
    let size = window.inner_size();
    (size.width as f64 / scale, size.height as f64 / scale)
}

/// Content area of a virtual window panel, below its title bar
pub fn virtual_window_body(width: f64, height: f64) -> Bounds {
    Bounds {
        x: width * PANEL_INSET,
        y: height * PANEL_INSET + TITLE_BAR_HEIGHT,
        width: width * PANEL_SCALE,
        height: (height * PANEL_SCALE - TITLE_BAR_HEIGHT).max(0.0),
    }
}

/// Title bar strip of a client window
pub fn client_title_bar(width: f64) -> Bounds {
    Bounds::full(width, TITLE_BAR_HEIGHT)
}

/// Content area of a client window
pub fn client_body(width: f64, height: f64) -> Bounds {
    Bounds {
        x: 0.0,
        y: TITLE_BAR_HEIGHT,
        width,
        height: (height - TITLE_BAR_HEIGHT).max(0.0),
    }
}

/// Outer geometry of a client window: a scaled copy of the main window,
/// centered on it
pub fn client_window_geometry(main: Bounds) -> Bounds {
    let width = main.width * PANEL_SCALE;
    let height = main.height * PANEL_SCALE;
    Bounds {
        x: main.x + (main.width - width) / 2.0,
        y: main.y + (main.height - height) / 2.0,
        width,
        height,
    }
}

/// What a content surface starts with
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    /// Remote document; approved before the surface exists
    Url(&'a str),
    /// Locally generated document
    Html(&'a str),
}

pub type SurfaceInterceptor = Arc<Interceptor<PolicyClient>>;

/// One embedded content view and its policy enforcement
pub struct ContentSurface {
    pub id: SurfaceId,
    pub interceptor: SurfaceInterceptor,
    pub webview: WebView,
}

impl ContentSurface {
    /// Stop policy enforcement and drop the view
    pub fn terminate(self) {
        self.interceptor.terminate();
        debug!("Terminated {}", self.id);
    }

    /// Load a destination the policy already approved
    pub fn load_url(&self, url: &str) {
        if let Err(e) = self.webview.load_url(url) {
            warn!("Failed to load {} on {}: {}", url, self.id, e);
        }
    }

    pub fn show_block_page(&self, html: &str) {
        if let Err(e) = self.webview.load_html(html) {
            warn!("Failed to show block page on {}: {}", self.id, e);
        }
    }

    pub fn set_bounds(&self, bounds: Bounds) {
        if let Err(e) = self.webview.set_bounds(bounds.to_rect()) {
            warn!("Failed to resize {}: {}", self.id, e);
        }
    }
}

/// Builds content surfaces and chrome webviews with the app's handlers
#[derive(Clone)]
pub struct SurfaceFactory {
    policy: PolicyClient,
    mode: NewWindowMode,
    proxy: EventLoopProxy<UserEvent>,
    backend: Backend,
    script: Arc<str>,
}

impl SurfaceFactory {
    pub fn new(policy: PolicyClient, mode: NewWindowMode, proxy: EventLoopProxy<UserEvent>) -> Self {
        let backend = Backend::current();
        info!("Webview backend: {}", backend.name);
        Self {
            policy,
            mode,
            proxy,
            backend,
            script: Arc::from(content_script(&backend)),
        }
    }

    /// Create content surface `id` as a child of `parent`
    pub fn content<W: HasWindowHandle>(
        &self,
        parent: &W,
        id: SurfaceId,
        source: Source<'_>,
        bounds: Bounds,
    ) -> SiteWrapResult<ContentSurface> {
        let mut interceptor = Interceptor::new(id, self.policy.clone(), self.mode);
        if let Source::Url(url) = source {
            interceptor = interceptor.with_initial_url(url);
        }
        let interceptor = Arc::new(interceptor);

        let builder = WebViewBuilder::new()
            .with_devtools(cfg!(debug_assertions))
            .with_clipboard(true)
            // every frame, so subframes report their own in-page navigation
            .with_initialization_script_for_main_only(&self.script, false)
            .with_bounds(bounds.to_rect())
            .with_navigation_handler({
                let interceptor = Arc::clone(&interceptor);
                let proxy = self.proxy.clone();
                let backend = self.backend;
                move |url: String| {
                    let event = backend.navigation_event(url, id);
                    dispatch(interceptor.intercept(&event), id, &proxy)
                }
            })
            .with_new_window_req_handler({
                let interceptor = Arc::clone(&interceptor);
                let proxy = self.proxy.clone();
                let backend = self.backend;
                // pop-ups are always prevented; only a subframe load may proceed
                move |url: String| {
                    let event = backend.new_window_event(url, id);
                    dispatch(interceptor.intercept(&event), id, &proxy)
                }
            })
            .with_download_started_handler({
                let interceptor = Arc::clone(&interceptor);
                let proxy = self.proxy.clone();
                move |url: String, _path: &mut PathBuf| {
                    let denied = interceptor.intercept_download(&url);
                    let _ = proxy.send_event(UserEvent::Denied(denied));
                    false
                }
            })
            .with_document_title_changed_handler({
                let proxy = self.proxy.clone();
                move |title: String| {
                    let _ = proxy.send_event(UserEvent::TitleChanged { surface: id, title });
                }
            })
            .with_on_page_load_handler({
                let proxy = self.proxy.clone();
                move |event, url| {
                    if let PageLoadEvent::Finished = event {
                        debug!("{} finished loading {}", id, url);
                        let _ = proxy.send_event(UserEvent::PageLoaded(id));
                    }
                }
            })
            .with_ipc_handler({
                let interceptor = Arc::clone(&interceptor);
                let proxy = self.proxy.clone();
                move |request: wry::http::Request<String>| match IpcMessage::parse(request.body()) {
                    Some(IpcMessage::InPageNavigation { url, main_frame }) => {
                        let event = Backend::in_page_event(url, main_frame, id);
                        dispatch(interceptor.intercept(&event), id, &proxy);
                    }
                    Some(IpcMessage::OpenWindow { url }) => {
                        dispatch(interceptor.intercept(&Backend::popup_event(url, id)), id, &proxy);
                    }
                    Some(IpcMessage::Navigate { url }) => {
                        let event = Backend::link_event(url.as_str(), id);
                        if dispatch(interceptor.intercept(&event), id, &proxy) {
                            let _ = proxy.send_event(UserEvent::LoadUrl { surface: id, url });
                        }
                    }
                    Some(other) => warn!("{} sent a chrome-only message: {:?}", id, other),
                    None => {}
                }
            });

        let builder = match source {
            Source::Url(url) => builder.with_url(url),
            Source::Html(html) => builder.with_html(html),
        };

        let webview = builder
            .build_as_child(parent)
            .map_err(|e| SiteWrapError::webview(format!("{}: {}", id, e)))?;

        info!("Created content surface {}", id);
        Ok(ContentSurface {
            id,
            interceptor,
            webview,
        })
    }

    /// Create a chrome webview showing local `html`. Only messages accepted
    /// by `on_message` reach the event loop.
    pub fn chrome<W, F>(
        &self,
        parent: &W,
        html: &str,
        init_script: Option<&str>,
        bounds: Bounds,
        on_message: F,
    ) -> SiteWrapResult<WebView>
    where
        W: HasWindowHandle,
        F: Fn(IpcMessage) -> Option<UserEvent> + 'static,
    {
        let proxy = self.proxy.clone();
        let mut builder = WebViewBuilder::new()
            .with_html(html)
            .with_devtools(cfg!(debug_assertions))
            .with_bounds(bounds.to_rect())
            .with_navigation_handler(|url: String| url == "about:blank" || url.starts_with("data:"))
            .with_new_window_req_handler(|_url: String| false)
            .with_ipc_handler(move |request: wry::http::Request<String>| {
                if let Some(event) = IpcMessage::parse(request.body()).and_then(&on_message) {
                    let _ = proxy.send_event(event);
                }
            });
        if let Some(script) = init_script {
            builder = builder.with_initialization_script(script);
        }

        builder
            .build_as_child(parent)
            .map_err(|e| SiteWrapError::webview(e.to_string()))
    }
}

/// Forward the follow-up work for `interception` and return whether the
/// platform may continue
fn dispatch(interception: Interception, surface: SurfaceId, proxy: &EventLoopProxy<UserEvent>) -> bool {
    let allowed = interception.allows_navigation();
    if let Some(event) = follow_up(interception, surface) {
        let _ = proxy.send_event(event);
    }
    allowed
}
