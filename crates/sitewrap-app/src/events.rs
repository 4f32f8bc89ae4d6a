//! Events delivered to the main event loop

use sitewrap_core::types::{SurfaceId, WindowId};
use sitewrap_core::Denied;
use sitewrap_shell::Interception;

/// Custom events for the event loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEvent {
    /// Approved new-window request, virtual mode
    OpenInnerWindow(String),
    /// Approved new-window request, client-window mode
    OpenClientWindow(String),
    /// Close the most recently opened virtual window
    CloseMostRecent,
    /// Close button of the virtual window backed by this surface
    CloseVirtualWindow(SurfaceId),
    /// Close button of a client window
    CloseWindow(WindowId),
    /// Load an approved link the page script held back
    LoadUrl { surface: SurfaceId, url: String },
    /// Replace a surface's document after a refused main-frame navigation
    ShowBlockPage { surface: SurfaceId, html: String },
    TitleChanged { surface: SurfaceId, title: String },
    PageLoaded(SurfaceId),
    /// Tell the user about a refused action
    Denied(Denied),
}

/// Work the event loop must do after a handler decided `interception`
pub fn follow_up(interception: Interception, surface: SurfaceId) -> Option<UserEvent> {
    match interception {
        Interception::Proceed | Interception::Ignored => None,
        Interception::Stop { block_page, .. } => {
            block_page.map(|html| UserEvent::ShowBlockPage { surface, html })
        }
        Interception::OpenVirtualWindow { url } => Some(UserEvent::OpenInnerWindow(url)),
        Interception::OpenClientWindow { url } => Some(UserEvent::OpenClientWindow(url)),
        Interception::Refuse(denied) => Some(UserEvent::Denied(denied)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitewrap_core::DenialReason;

    #[test]
    fn test_main_frame_stop_shows_block_page() {
        let surface = SurfaceId::new();
        let event = follow_up(
            Interception::Stop {
                url: "https://evil.net".to_string(),
                block_page: Some("<html>403</html>".to_string()),
            },
            surface,
        );
        assert_eq!(
            event,
            Some(UserEvent::ShowBlockPage {
                surface,
                html: "<html>403</html>".to_string()
            })
        );
    }

    #[test]
    fn test_subframe_stop_needs_no_follow_up() {
        let event = follow_up(
            Interception::Stop {
                url: "https://ads.evil.net".to_string(),
                block_page: None,
            },
            SurfaceId::new(),
        );
        assert_eq!(event, None);
        assert_eq!(follow_up(Interception::Proceed, SurfaceId::new()), None);
        assert_eq!(follow_up(Interception::Ignored, SurfaceId::new()), None);
    }

    #[test]
    fn test_window_requests_become_open_events() {
        let surface = SurfaceId::new();
        assert_eq!(
            follow_up(
                Interception::OpenVirtualWindow {
                    url: "https://a.example.com".to_string()
                },
                surface
            ),
            Some(UserEvent::OpenInnerWindow("https://a.example.com".to_string()))
        );
        assert_eq!(
            follow_up(
                Interception::OpenClientWindow {
                    url: "https://b.example.com".to_string()
                },
                surface
            ),
            Some(UserEvent::OpenClientWindow("https://b.example.com".to_string()))
        );
    }

    #[test]
    fn test_refusal_is_reported() {
        let denied = Denied::new(DenialReason::PolicyDisabled, "https://a.test", "No popups");
        assert_eq!(
            follow_up(Interception::Refuse(denied.clone()), SurfaceId::new()),
            Some(UserEvent::Denied(denied))
        );
    }
}
