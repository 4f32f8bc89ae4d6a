//! Common types used throughout SiteWrap

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a top-level native window (main or client)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u64);

/// Identifier for an embedded content surface (one webview)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(pub u64);

impl SurfaceId {
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window-{}", self.0)
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface-{}", self.0)
    }
}

/// The navigation-class events a content surface can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// Link click or `window.open` asking for a new window
    NewWindowRequest,
    /// History API or fragment change inside the current document
    InPageNavigation,
    /// A regular navigation about to start
    WillNavigate,
    /// Server-side redirect of an in-flight navigation
    Redirect,
}

impl NavigationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NavigationKind::NewWindowRequest => "new-window-request",
            NavigationKind::InPageNavigation => "in-page-navigation",
            NavigationKind::WillNavigate => "will-navigate",
            NavigationKind::Redirect => "redirect",
        }
    }
}

/// Which frame of a content surface a navigation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameTarget {
    /// The top-level document
    Main,
    /// An embedded frame
    Sub,
    /// The host callback does not say
    Unknown,
}

impl FrameTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            FrameTarget::Main => "main",
            FrameTarget::Sub => "sub",
            FrameTarget::Unknown => "unknown",
        }
    }
}

/// A navigation attempt raised by a content surface. Only lives while it is handled.
#[derive(Debug, Clone)]
pub struct NavigationEvent {
    pub kind: NavigationKind,
    pub url: String,
    pub frame: FrameTarget,
    pub surface: SurfaceId,
}

impl NavigationEvent {
    pub fn new(kind: NavigationKind, url: impl Into<String>, surface: SurfaceId) -> Self {
        Self {
            kind,
            url: url.into(),
            frame: FrameTarget::Main,
            surface,
        }
    }

    /// Attribute the event to `frame`
    pub fn in_frame(mut self, frame: FrameTarget) -> Self {
        self.frame = frame;
        self
    }

    /// Mark the event as coming from an embedded subframe
    pub fn in_subframe(self) -> Self {
        self.in_frame(FrameTarget::Sub)
    }

    /// Only a navigation known to target the top-level document may replace it
    pub fn is_main_frame(&self) -> bool {
        self.frame == FrameTarget::Main
    }
}

/// Why a destination was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// New windows are disabled entirely
    PolicyDisabled,
    /// Host is not covered by any allow-list pattern
    NotAllowListed,
    /// Destination could not be parsed
    MalformedUrl,
    /// Downloads are never allowed
    Download,
}

impl DenialReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DenialReason::PolicyDisabled => "new windows disabled",
            DenialReason::NotAllowListed => "not allow-listed",
            DenialReason::MalformedUrl => "malformed url",
            DenialReason::Download => "download blocked",
        }
    }
}

/// A refused navigation, window or download, with the message shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Denied {
    pub reason: DenialReason,
    pub url: String,
    pub message: String,
}

impl Denied {
    pub fn new(reason: DenialReason, url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            reason,
            url: url.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Denied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.url, self.reason.as_str(), self.message)
    }
}
