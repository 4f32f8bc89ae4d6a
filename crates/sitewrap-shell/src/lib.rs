//! Window virtualization layer - navigation interception, block pages and
//! in-app virtual windows

pub mod backend;
pub mod interceptor;
pub mod pages;
pub mod surface;
pub mod virtual_window;

use sitewrap_core::Denied;
use sitewrap_policy::{PolicyClient, PolicyEngine};
use std::sync::Arc;

pub use backend::Backend;
pub use interceptor::{Interception, Interceptor, NewWindowMode};
pub use pages::block_page;
pub use surface::SurfaceState;
pub use virtual_window::{TitleTarget, VirtualWindow, VirtualWindowStack};

/// Where the content plane gets its verdicts from
pub trait NavigationGate {
    /// Blocking allow-list check for a navigation destination
    fn check_url(&self, url: &str) -> bool;

    /// Blocking check for a new-window request
    fn authorize_new_window(&self, url: &str) -> Result<(), Denied>;
}

impl NavigationGate for PolicyClient {
    fn check_url(&self, url: &str) -> bool {
        self.check_url_sync(url)
    }

    fn authorize_new_window(&self, url: &str) -> Result<(), Denied> {
        PolicyClient::authorize_new_window(self, url)
    }
}

impl NavigationGate for PolicyEngine {
    fn check_url(&self, url: &str) -> bool {
        self.can_open(url)
    }

    fn authorize_new_window(&self, url: &str) -> Result<(), Denied> {
        PolicyEngine::authorize_new_window(self, url)
    }
}

impl<G: NavigationGate + ?Sized> NavigationGate for Arc<G> {
    fn check_url(&self, url: &str) -> bool {
        (**self).check_url(url)
    }

    fn authorize_new_window(&self, url: &str) -> Result<(), Denied> {
        (**self).authorize_new_window(url)
    }
}
