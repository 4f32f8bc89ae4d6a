//! Navigation interception for one content surface
//!
//! Every navigation-class event goes through [`Interceptor::intercept`], which
//! applies the same policy check to all of them and tells the host what to do.

use crate::pages::{block_page, DOWNLOAD_BLOCKED_MESSAGE};
use crate::surface::{is_local_document, same_document, SurfaceState};
use crate::NavigationGate;
use sitewrap_core::types::{NavigationEvent, NavigationKind, SurfaceId};
use sitewrap_core::{DenialReason, Denied};
use std::sync::{Mutex, PoisonError};

/// How approved new-window requests are materialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewWindowMode {
    /// In-app virtual window inside the main surface
    Virtual,
    /// Real top-level client window
    Client,
}

impl NewWindowMode {
    pub fn from_in_process(in_process: bool) -> Self {
        if in_process {
            NewWindowMode::Virtual
        } else {
            NewWindowMode::Client
        }
    }
}

/// What the host must do with an intercepted event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interception {
    /// Let the navigation continue
    Proceed,
    /// Abort the load; show `block_page` if it is set (main frame only)
    Stop {
        url: String,
        block_page: Option<String>,
    },
    /// Default action prevented; open an in-app virtual window
    OpenVirtualWindow { url: String },
    /// Default action prevented; ask the control plane for a client window
    OpenClientWindow { url: String },
    /// Default action prevented; tell the user why
    Refuse(Denied),
    /// Surface is gone
    Ignored,
}

impl Interception {
    /// Whether the platform should let the navigation happen
    pub fn allows_navigation(&self) -> bool {
        matches!(self, Interception::Proceed)
    }
}

/// Policy enforcement for one content surface
pub struct Interceptor<G> {
    surface: SurfaceId,
    gate: G,
    mode: NewWindowMode,
    initial_url: Option<String>,
    state: Mutex<SurfaceState>,
}

impl<G: NavigationGate> Interceptor<G> {
    pub fn new(surface: SurfaceId, gate: G, mode: NewWindowMode) -> Self {
        Self {
            surface,
            gate,
            mode,
            initial_url: None,
            state: Mutex::new(SurfaceState::Loading),
        }
    }

    /// The URL the surface was created with. It was approved before the
    /// surface existed, so loading it is not checked again.
    pub fn with_initial_url(mut self, url: impl Into<String>) -> Self {
        self.initial_url = Some(url.into());
        self
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn state(&self) -> SurfaceState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, next: impl FnOnce(SurfaceState) -> SurfaceState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = next(*state);
    }

    /// Decide one navigation-class event
    pub fn intercept(&self, event: &NavigationEvent) -> Interception {
        let state = self.state();
        if state == SurfaceState::Terminated {
            log::debug!("Ignoring {} on terminated {}", event.kind.as_str(), self.surface);
            return Interception::Ignored;
        }

        match event.kind {
            NavigationKind::NewWindowRequest => self.on_new_window(&event.url),
            NavigationKind::InPageNavigation
            | NavigationKind::WillNavigate
            | NavigationKind::Redirect => self.on_navigation(event, state),
        }
    }

    fn on_new_window(&self, url: &str) -> Interception {
        match self.gate.authorize_new_window(url) {
            Ok(()) => {
                log::info!("New window approved from {}: {}", self.surface, url);
                match self.mode {
                    NewWindowMode::Virtual => Interception::OpenVirtualWindow {
                        url: url.to_string(),
                    },
                    NewWindowMode::Client => Interception::OpenClientWindow {
                        url: url.to_string(),
                    },
                }
            }
            Err(denied) => {
                log::warn!("New window denied from {}: {}", self.surface, denied);
                Interception::Refuse(denied)
            }
        }
    }

    fn on_navigation(&self, event: &NavigationEvent, state: SurfaceState) -> Interception {
        let loads_document = event.kind != NavigationKind::InPageNavigation;
        let main_frame = event.is_main_frame();

        if self.is_exempt(event, state) {
            return Interception::Proceed;
        }

        if self.gate.check_url(&event.url) {
            if main_frame {
                self.transition(|s| s.on_navigation_approved(loads_document));
            }
            return Interception::Proceed;
        }

        log::warn!(
            "Blocked {} on {} ({} frame): {}",
            event.kind.as_str(),
            self.surface,
            event.frame.as_str(),
            event.url
        );
        self.transition(|s| s.on_navigation_denied(main_frame));

        Interception::Stop {
            url: event.url.clone(),
            block_page: main_frame.then(|| block_page(&event.url)),
        }
    }

    /// Local documents in frames that are not known to be the top-level
    /// document are always admitted. The top-level document only admits them
    /// while loading or blocked.
    fn is_exempt(&self, event: &NavigationEvent, state: SurfaceState) -> bool {
        let url = event.url.as_str();
        if is_local_document(url) && (!event.is_main_frame() || state.admits_local_documents()) {
            return true;
        }
        state == SurfaceState::Loading
            && self
                .initial_url
                .as_deref()
                .map_or(false, |initial| same_document(initial, url))
    }

    /// Downloads are always cancelled, whatever the allow-list says
    pub fn intercept_download(&self, url: &str) -> Denied {
        log::warn!("Cancelled download on {}: {}", self.surface, url);
        Denied::new(DenialReason::Download, url, DOWNLOAD_BLOCKED_MESSAGE)
    }

    pub fn load_finished(&self) {
        self.transition(SurfaceState::on_load_finished);
    }

    /// Detach the surface; later events are ignored
    pub fn terminate(&self) {
        self.transition(|_| SurfaceState::Terminated);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitewrap_core::FrameTarget;
    use sitewrap_policy::{AllowList, NavigationPolicy, PolicyEngine};
    use std::cell::Cell;

    struct CountingGate {
        engine: PolicyEngine,
        checks: Cell<usize>,
    }

    impl NavigationGate for CountingGate {
        fn check_url(&self, url: &str) -> bool {
            self.checks.set(self.checks.get() + 1);
            self.engine.can_open(url)
        }

        fn authorize_new_window(&self, url: &str) -> Result<(), Denied> {
            self.engine.authorize_new_window(url)
        }
    }

    fn gate(allow: &[&str], can_open_new_window: bool) -> CountingGate {
        CountingGate {
            engine: PolicyEngine::new(NavigationPolicy {
                can_open_new_window,
                block_message: "Not allowed".to_string(),
                allow_list: AllowList::new(allow),
            }),
            checks: Cell::new(0),
        }
    }

    fn ready(allow: &[&str], mode: NewWindowMode) -> Interceptor<CountingGate> {
        let interceptor = Interceptor::new(SurfaceId::new(), gate(allow, true), mode);
        interceptor.load_finished();
        interceptor
    }

    fn event(interceptor: &Interceptor<CountingGate>, kind: NavigationKind, url: &str) -> NavigationEvent {
        NavigationEvent::new(kind, url, interceptor.surface())
    }

    #[test]
    fn test_same_check_for_every_navigation_kind() {
        let interceptor = ready(&["example.com"], NewWindowMode::Virtual);
        for kind in [
            NavigationKind::InPageNavigation,
            NavigationKind::WillNavigate,
            NavigationKind::Redirect,
        ] {
            let allowed = interceptor.intercept(&event(&interceptor, kind, "https://www.example.com/a"));
            assert_eq!(allowed, Interception::Proceed);
            interceptor.load_finished();

            let denied = interceptor.intercept(&event(&interceptor, kind, "https://evil.net/a"));
            assert!(!denied.allows_navigation());
            interceptor.load_finished();
        }
        assert_eq!(interceptor.gate.checks.get(), 6);
    }

    #[test]
    fn test_denied_main_frame_gets_block_page_with_url() {
        let interceptor = ready(&["example.com"], NewWindowMode::Virtual);
        let result = interceptor.intercept(&event(
            &interceptor,
            NavigationKind::WillNavigate,
            "https://evil.net/phish",
        ));

        match result {
            Interception::Stop { url, block_page } => {
                assert_eq!(url, "https://evil.net/phish");
                assert!(block_page.unwrap().contains("https://evil.net/phish"));
            }
            other => panic!("expected stop, got {:?}", other),
        }
        assert_eq!(interceptor.state(), SurfaceState::Blocked);
    }

    #[test]
    fn test_denied_subframe_only_stops() {
        let interceptor = ready(&["example.com"], NewWindowMode::Virtual);
        let result = interceptor.intercept(
            &event(&interceptor, NavigationKind::Redirect, "https://ads.evil.net/frame").in_subframe(),
        );

        assert_eq!(
            result,
            Interception::Stop {
                url: "https://ads.evil.net/frame".to_string(),
                block_page: None,
            }
        );
        assert_eq!(interceptor.state(), SurfaceState::Ready);
    }

    #[test]
    fn test_unknown_frame_denial_keeps_document() {
        let interceptor = ready(&["example.com"], NewWindowMode::Virtual);
        let result = interceptor.intercept(
            &event(&interceptor, NavigationKind::WillNavigate, "https://ads.evil.net/frame")
                .in_frame(FrameTarget::Unknown),
        );

        assert_eq!(
            result,
            Interception::Stop {
                url: "https://ads.evil.net/frame".to_string(),
                block_page: None,
            }
        );
        assert_eq!(interceptor.state(), SurfaceState::Ready);
    }

    #[test]
    fn test_subframe_local_documents_load_any_time() {
        let interceptor = ready(&["example.com"], NewWindowMode::Virtual);
        for url in ["about:srcdoc", "about:blank", "data:text/html,<p>ad</p>"] {
            assert_eq!(
                interceptor.intercept(&event(&interceptor, NavigationKind::WillNavigate, url).in_subframe()),
                Interception::Proceed
            );
        }
        assert_eq!(interceptor.gate.checks.get(), 0);
        assert_eq!(interceptor.state(), SurfaceState::Ready);
    }

    #[test]
    fn test_malformed_destination_is_denied() {
        let interceptor = ready(&["example.com"], NewWindowMode::Virtual);
        let result = interceptor.intercept(&event(&interceptor, NavigationKind::WillNavigate, "http://"));
        assert!(matches!(result, Interception::Stop { block_page: Some(_), .. }));
    }

    #[test]
    fn test_approved_navigation_moves_to_navigating() {
        let interceptor = ready(&["example.com"], NewWindowMode::Virtual);
        interceptor.intercept(&event(&interceptor, NavigationKind::WillNavigate, "https://example.com/next"));
        assert_eq!(interceptor.state(), SurfaceState::Navigating);
        interceptor.load_finished();
        assert_eq!(interceptor.state(), SurfaceState::Ready);
    }

    #[test]
    fn test_new_window_virtual_mode() {
        let interceptor = ready(&["example.com"], NewWindowMode::Virtual);
        let result = interceptor.intercept(&event(
            &interceptor,
            NavigationKind::NewWindowRequest,
            "https://help.example.com",
        ));
        assert_eq!(
            result,
            Interception::OpenVirtualWindow {
                url: "https://help.example.com".to_string()
            }
        );
        assert!(!result.allows_navigation());
    }

    #[test]
    fn test_new_window_client_mode() {
        let interceptor = ready(&[], NewWindowMode::Client);
        let result = interceptor.intercept(&event(
            &interceptor,
            NavigationKind::NewWindowRequest,
            "https://anything.test",
        ));
        assert_eq!(
            result,
            Interception::OpenClientWindow {
                url: "https://anything.test".to_string()
            }
        );
    }

    #[test]
    fn test_new_window_denied_carries_message() {
        let interceptor = ready(&["example.com"], NewWindowMode::Virtual);
        let result = interceptor.intercept(&event(
            &interceptor,
            NavigationKind::NewWindowRequest,
            "https://evil.net",
        ));
        match result {
            Interception::Refuse(denied) => {
                assert_eq!(denied.reason, DenialReason::NotAllowListed);
                assert_eq!(denied.message, "Not allowed");
            }
            other => panic!("expected refusal, got {:?}", other),
        }
    }

    #[test]
    fn test_new_window_disabled_policy() {
        let interceptor = Interceptor::new(SurfaceId::new(), gate(&[], false), NewWindowMode::Virtual);
        let result = interceptor.intercept(&event(
            &interceptor,
            NavigationKind::NewWindowRequest,
            "https://example.com",
        ));
        assert!(matches!(
            result,
            Interception::Refuse(Denied { reason: DenialReason::PolicyDisabled, .. })
        ));
    }

    #[test]
    fn test_initial_url_and_blank_are_exempt_while_loading() {
        let interceptor = Interceptor::new(SurfaceId::new(), gate(&["example.com"], true), NewWindowMode::Virtual)
            .with_initial_url("https://other.test/start");

        assert_eq!(
            interceptor.intercept(&event(&interceptor, NavigationKind::WillNavigate, "about:blank")),
            Interception::Proceed
        );
        assert_eq!(
            interceptor.intercept(&event(
                &interceptor,
                NavigationKind::WillNavigate,
                "https://other.test/start"
            )),
            Interception::Proceed
        );
        assert_eq!(interceptor.gate.checks.get(), 0);

        interceptor.load_finished();
        assert!(!interceptor
            .intercept(&event(&interceptor, NavigationKind::WillNavigate, "https://other.test/start"))
            .allows_navigation());
    }

    #[test]
    fn test_initial_url_exemption_survives_normalization() {
        let interceptor = Interceptor::new(SurfaceId::new(), gate(&["example.com"], true), NewWindowMode::Virtual)
            .with_initial_url("https://app.corp.example");

        assert_eq!(
            interceptor.intercept(&event(
                &interceptor,
                NavigationKind::WillNavigate,
                "https://app.corp.example/"
            )),
            Interception::Proceed
        );
        assert_eq!(interceptor.state(), SurfaceState::Loading);
        assert_eq!(interceptor.gate.checks.get(), 0);
    }

    #[test]
    fn test_block_page_load_is_admitted_only_after_denial() {
        let interceptor = ready(&["example.com"], NewWindowMode::Virtual);
        let data_url = "data:text/html,<p>x</p>";

        assert!(!interceptor
            .intercept(&event(&interceptor, NavigationKind::WillNavigate, data_url))
            .allows_navigation());
        // the refusal above moved the surface to Blocked, so the block page may load
        assert_eq!(interceptor.state(), SurfaceState::Blocked);
        assert_eq!(
            interceptor.intercept(&event(&interceptor, NavigationKind::WillNavigate, "about:blank")),
            Interception::Proceed
        );
    }

    #[test]
    fn test_terminated_surface_ignores_events() {
        let interceptor = ready(&[], NewWindowMode::Virtual);
        interceptor.terminate();
        assert_eq!(
            interceptor.intercept(&event(&interceptor, NavigationKind::WillNavigate, "https://a.test")),
            Interception::Ignored
        );
        interceptor.load_finished();
        assert_eq!(interceptor.state(), SurfaceState::Terminated);
    }

    #[test]
    fn test_downloads_always_cancelled() {
        let interceptor = ready(&[], NewWindowMode::Virtual);
        let denied = interceptor.intercept_download("https://example.com/file.zip");
        assert_eq!(denied.reason, DenialReason::Download);
        assert_eq!(denied.url, "https://example.com/file.zip");
        assert_eq!(denied.message, DOWNLOAD_BLOCKED_MESSAGE);
    }
}
