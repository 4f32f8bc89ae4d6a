//! Top-level window registry
//!
//! The control plane owns every native window. Content surfaces only ever
//! refer to them by [`WindowId`].

use crate::PolicyEngine;
use sitewrap_core::types::WindowId;
use sitewrap_core::{Denied, SiteWrapError, SiteWrapResult};
use std::collections::BTreeMap;

/// Kind of top-level window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowRole {
    /// Long-lived window created at startup
    Main,
    /// Window created for an approved new-window request
    Client,
}

/// Native side of window management, implemented by the application host
pub trait WindowHost {
    type Handle;

    /// Create a frameless, centered child of the main window that shows `url`
    /// inside a wrapper page
    fn create_client_window(&mut self, id: WindowId, url: &str) -> SiteWrapResult<Self::Handle>;

    /// Show the user a modal for a refused request
    fn report_denied(&mut self, denied: &Denied);
}

struct RegisteredWindow<H> {
    role: WindowRole,
    url: Option<String>,
    handle: H,
}

/// Map from window id to native handle
pub struct WindowRegistry<H> {
    windows: BTreeMap<WindowId, RegisteredWindow<H>>,
    main: Option<WindowId>,
    next_id: u64,
}

impl<H> WindowRegistry<H> {
    pub fn new() -> Self {
        Self {
            windows: BTreeMap::new(),
            main: None,
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> WindowId {
        let id = WindowId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Register the main window. There is at most one.
    pub fn register_main(&mut self, handle: H) -> SiteWrapResult<WindowId> {
        if let Some(existing) = self.main {
            return Err(SiteWrapError::window(format!(
                "main window already registered as {}",
                existing
            )));
        }

        let id = self.allocate_id();
        self.windows.insert(
            id,
            RegisteredWindow {
                role: WindowRole::Main,
                url: None,
                handle,
            },
        );
        self.main = Some(id);
        log::info!("Registered main window {}", id);
        Ok(id)
    }

    /// Remove a window. Unknown or already-closed ids are ignored.
    pub fn close(&mut self, id: WindowId) -> Option<H> {
        let removed = self.windows.remove(&id)?;
        if self.main == Some(id) {
            self.main = None;
        }
        log::info!("Closed {:?} window {}", removed.role, id);
        Some(removed.handle)
    }

    pub fn get(&self, id: WindowId) -> Option<&H> {
        self.windows.get(&id).map(|w| &w.handle)
    }

    pub fn role(&self, id: WindowId) -> Option<WindowRole> {
        self.windows.get(&id).map(|w| w.role)
    }

    /// Destination a client window was opened for
    pub fn url(&self, id: WindowId) -> Option<&str> {
        self.windows.get(&id).and_then(|w| w.url.as_deref())
    }

    pub fn main_id(&self) -> Option<WindowId> {
        self.main
    }

    /// Find the id of the window whose handle satisfies `predicate`
    pub fn find_id(&self, predicate: impl Fn(&H) -> bool) -> Option<WindowId> {
        self.windows
            .iter()
            .find(|(_, w)| predicate(&w.handle))
            .map(|(id, _)| *id)
    }

    pub fn client_ids(&self) -> Vec<WindowId> {
        self.windows
            .iter()
            .filter(|(_, w)| w.role == WindowRole::Client)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn handles(&self) -> impl Iterator<Item = &H> {
        self.windows.values().map(|w| &w.handle)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl<H> Default for WindowRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyEngine {
    /// Open `url` in a new top-level client window.
    ///
    /// A refused request is reported once through the host and creates
    /// nothing. An approved one creates exactly one window.
    pub fn request_open_client_window<W>(
        &self,
        url: &str,
        registry: &mut WindowRegistry<W::Handle>,
        host: &mut W,
    ) -> SiteWrapResult<WindowId>
    where
        W: WindowHost,
    {
        if let Err(denied) = self.authorize_new_window(url) {
            host.report_denied(&denied);
            return Err(denied.into());
        }

        let id = registry.allocate_id();
        let handle = host.create_client_window(id, url)?;
        registry.windows.insert(
            id,
            RegisteredWindow {
                role: WindowRole::Client,
                url: Some(url.to_string()),
                handle,
            },
        );
        log::info!("Opened client window {} for {}", id, url);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AllowList, NavigationPolicy};
    use sitewrap_core::DenialReason;

    #[derive(Default)]
    struct RecordingHost {
        created: Vec<(WindowId, String)>,
        denied: Vec<Denied>,
        fail_creation: bool,
    }

    impl WindowHost for RecordingHost {
        type Handle = String;

        fn create_client_window(&mut self, id: WindowId, url: &str) -> SiteWrapResult<String> {
            if self.fail_creation {
                return Err(SiteWrapError::window("no display"));
            }
            self.created.push((id, url.to_string()));
            Ok(format!("native:{}", url))
        }

        fn report_denied(&mut self, denied: &Denied) {
            self.denied.push(denied.clone());
        }
    }

    fn engine(allow: &[&str], can_open_new_window: bool) -> PolicyEngine {
        PolicyEngine::new(NavigationPolicy {
            can_open_new_window,
            block_message: "Not allowed".to_string(),
            allow_list: AllowList::new(allow),
        })
    }

    #[test]
    fn test_approved_request_creates_exactly_one_window() {
        let engine = engine(&["example.com"], true);
        let mut registry = WindowRegistry::new();
        let mut host = RecordingHost::default();
        registry.register_main("main".to_string()).unwrap();

        let id = engine
            .request_open_client_window("https://app.example.com", &mut registry, &mut host)
            .unwrap();

        assert_eq!(host.created.len(), 1);
        assert!(host.denied.is_empty());
        assert_eq!(registry.role(id), Some(WindowRole::Client));
        assert_eq!(registry.url(id), Some("https://app.example.com"));
        assert_eq!(registry.client_ids(), vec![id]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_denied_request_creates_nothing_and_reports_once() {
        let engine = engine(&["example.com"], true);
        let mut registry: WindowRegistry<String> = WindowRegistry::new();
        let mut host = RecordingHost::default();

        let err = engine
            .request_open_client_window("https://evil.net", &mut registry, &mut host)
            .unwrap_err();

        assert_eq!(err.as_denied().map(|d| d.reason), Some(DenialReason::NotAllowListed));
        assert!(host.created.is_empty());
        assert_eq!(host.denied.len(), 1);
        assert_eq!(host.denied[0].message, "Not allowed");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_disabled_policy_denies_before_allow_list() {
        let engine = engine(&[], false);
        let mut registry: WindowRegistry<String> = WindowRegistry::new();
        let mut host = RecordingHost::default();

        let err = engine
            .request_open_client_window("https://example.com", &mut registry, &mut host)
            .unwrap_err();

        assert_eq!(err.as_denied().map(|d| d.reason), Some(DenialReason::PolicyDisabled));
        assert_eq!(host.denied.len(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_host_failure_leaves_registry_unchanged() {
        let engine = engine(&[], true);
        let mut registry: WindowRegistry<String> = WindowRegistry::new();
        let mut host = RecordingHost {
            fail_creation: true,
            ..Default::default()
        };

        assert!(engine
            .request_open_client_window("https://example.com", &mut registry, &mut host)
            .is_err());
        assert!(registry.is_empty());
        assert!(host.denied.is_empty());
    }

    #[test]
    fn test_close_is_idempotent() {
        let engine = engine(&[], true);
        let mut registry = WindowRegistry::new();
        let mut host = RecordingHost::default();
        let id = engine
            .request_open_client_window("https://example.com", &mut registry, &mut host)
            .unwrap();

        assert_eq!(registry.close(id), Some("native:https://example.com".to_string()));
        assert!(registry.close(id).is_none());
        assert!(registry.close(WindowId(999)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_single_main_window() {
        let mut registry = WindowRegistry::new();
        let main = registry.register_main(1u32).unwrap();
        assert!(registry.register_main(2u32).is_err());
        assert_eq!(registry.main_id(), Some(main));
        assert_eq!(registry.find_id(|h| *h == 1), Some(main));

        registry.close(main);
        assert!(registry.main_id().is_none());
    }

    #[test]
    fn test_window_ids_are_not_reused() {
        let engine = engine(&[], true);
        let mut registry = WindowRegistry::new();
        let mut host = RecordingHost::default();

        let first = engine
            .request_open_client_window("https://a.example.com", &mut registry, &mut host)
            .unwrap();
        registry.close(first);
        let second = engine
            .request_open_client_window("https://b.example.com", &mut registry, &mut host)
            .unwrap();

        assert_ne!(first, second);
    }
}
