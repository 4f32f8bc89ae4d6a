//! What each system webview tells us about a navigation
//!
//! The platform callbacks do not carry the same information everywhere:
//!
//! * WKWebView (macOS) reports main-frame loads to the navigation callback
//!   and subframe loads to the new-window callback. Pop-ups never reach the
//!   host, so the page script reports them over IPC.
//! * WebKitGTK (Linux) reports every frame to the navigation callback
//!   without saying which one. The page script routes top-level link clicks
//!   over IPC so a refused link still gets its block page.
//! * WebView2 (Windows) reports only main-frame loads to the navigation
//!   callback and real pop-ups to the new-window callback.
//!
//! [`Backend`] turns a raw callback into a [`NavigationEvent`] carrying only
//! the frame attribution the platform can vouch for.

use sitewrap_core::types::{NavigationEvent, NavigationKind, SurfaceId};
use sitewrap_core::FrameTarget;

/// Callback semantics of one system webview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backend {
    pub name: &'static str,
    /// Frame the navigation callback is known to report
    pub navigation_frames: FrameTarget,
    /// The new-window callback fires for subframe loads, not pop-ups
    pub new_window_carries_subframes: bool,
    /// Top-level link clicks are reported by the page script
    pub routes_links: bool,
}

impl Backend {
    pub const WKWEBVIEW: Backend = Backend {
        name: "WKWebView",
        navigation_frames: FrameTarget::Main,
        new_window_carries_subframes: true,
        routes_links: false,
    };

    pub const WEBKIT_GTK: Backend = Backend {
        name: "WebKitGTK",
        navigation_frames: FrameTarget::Unknown,
        new_window_carries_subframes: false,
        routes_links: true,
    };

    pub const WEBVIEW2: Backend = Backend {
        name: "WebView2",
        navigation_frames: FrameTarget::Main,
        new_window_carries_subframes: false,
        routes_links: false,
    };

    /// The webview this build runs on
    pub fn current() -> Backend {
        if cfg!(target_os = "macos") {
            Self::WKWEBVIEW
        } else if cfg!(target_os = "windows") {
            Self::WEBVIEW2
        } else {
            Self::WEBKIT_GTK
        }
    }

    /// Pop-ups have to be caught by the page script
    pub fn reports_popups_from_script(&self) -> bool {
        self.new_window_carries_subframes
    }

    /// Event for the platform navigation callback
    pub fn navigation_event(&self, url: impl Into<String>, surface: SurfaceId) -> NavigationEvent {
        NavigationEvent::new(NavigationKind::WillNavigate, url, surface).in_frame(self.navigation_frames)
    }

    /// Event for the platform new-window callback
    pub fn new_window_event(&self, url: impl Into<String>, surface: SurfaceId) -> NavigationEvent {
        if self.new_window_carries_subframes {
            NavigationEvent::new(NavigationKind::WillNavigate, url, surface).in_subframe()
        } else {
            NavigationEvent::new(NavigationKind::NewWindowRequest, url, surface)
        }
    }

    /// Event for a pop-up reported by the page script
    pub fn popup_event(url: impl Into<String>, surface: SurfaceId) -> NavigationEvent {
        NavigationEvent::new(NavigationKind::NewWindowRequest, url, surface)
    }

    /// Event for a top-level link click reported by the page script
    pub fn link_event(url: impl Into<String>, surface: SurfaceId) -> NavigationEvent {
        NavigationEvent::new(NavigationKind::WillNavigate, url, surface)
    }

    /// Event for a same-document URL change reported by the page script
    pub fn in_page_event(url: impl Into<String>, main_frame: bool, surface: SurfaceId) -> NavigationEvent {
        let event = NavigationEvent::new(NavigationKind::InPageNavigation, url, surface);
        if main_frame {
            event
        } else {
            event.in_subframe()
        }
    }
}
