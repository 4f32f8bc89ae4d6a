//! Lifecycle of a single content surface

use url::Url;

/// State of one embedded content surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    /// Initial document is loading
    Loading,
    /// Idle with a document shown
    Ready,
    /// An approved navigation is in flight
    Navigating,
    /// A navigation was refused; the block page may be loading
    Blocked,
    /// Surface was detached; events are ignored
    Terminated,
}

impl SurfaceState {
    /// Whether local documents (`about:blank`, `data:`, `blob:`) may load
    /// without a policy check. Only the initial document and the substituted
    /// block page qualify.
    pub fn admits_local_documents(self) -> bool {
        matches!(self, SurfaceState::Loading | SurfaceState::Blocked)
    }

    /// State after a page load finished
    pub fn on_load_finished(self) -> Self {
        match self {
            SurfaceState::Terminated => SurfaceState::Terminated,
            _ => SurfaceState::Ready,
        }
    }

    /// State after an approved navigation started
    pub fn on_navigation_approved(self, loads_document: bool) -> Self {
        match self {
            SurfaceState::Terminated => SurfaceState::Terminated,
            state if !loads_document => state,
            _ => SurfaceState::Navigating,
        }
    }

    /// State after a refused navigation. Only main-frame refusals replace the
    /// document.
    pub fn on_navigation_denied(self, main_frame: bool) -> Self {
        match self {
            SurfaceState::Terminated => SurfaceState::Terminated,
            _ if main_frame => SurfaceState::Blocked,
            state => state,
        }
    }
}

/// Scheme-level check for documents that never touch the network
pub fn is_local_document(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    lower == "about:blank"
        || lower == "about:srcdoc"
        || lower.starts_with("data:")
        || lower.starts_with("blob:")
}

/// Whether two URLs name the same document once both are normalized. Falls
/// back to exact comparison when either side does not parse.
pub fn same_document(a: &str, b: &str) -> bool {
    match (Url::parse(a.trim()), Url::parse(b.trim())) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_finished_returns_to_ready() {
        assert_eq!(SurfaceState::Loading.on_load_finished(), SurfaceState::Ready);
        assert_eq!(SurfaceState::Navigating.on_load_finished(), SurfaceState::Ready);
        assert_eq!(SurfaceState::Blocked.on_load_finished(), SurfaceState::Ready);
        assert_eq!(SurfaceState::Terminated.on_load_finished(), SurfaceState::Terminated);
    }

    #[test]
    fn test_in_page_approval_keeps_state() {
        assert_eq!(
            SurfaceState::Ready.on_navigation_approved(false),
            SurfaceState::Ready
        );
        assert_eq!(
            SurfaceState::Ready.on_navigation_approved(true),
            SurfaceState::Navigating
        );
    }

    #[test]
    fn test_subframe_denial_keeps_state() {
        assert_eq!(SurfaceState::Ready.on_navigation_denied(false), SurfaceState::Ready);
        assert_eq!(SurfaceState::Ready.on_navigation_denied(true), SurfaceState::Blocked);
    }

    #[test]
    fn test_local_documents() {
        assert!(is_local_document("about:blank"));
        assert!(is_local_document("data:text/html,<p>hi</p>"));
        assert!(is_local_document("BLOB:https://example.com/123"));
        assert!(!is_local_document("https://example.com"));
        assert!(!is_local_document("about:config"));
    }

    #[test]
    fn test_same_document_normalizes() {
        assert!(same_document("https://app.corp.example", "https://app.corp.example/"));
        assert!(same_document("HTTPS://App.Corp.Example:443/a", "https://app.corp.example/a"));
        assert!(!same_document("https://app.corp.example/a", "https://app.corp.example/b"));
        assert!(same_document("not a url", "not a url"));
        assert!(!same_document("not a url", "https://app.corp.example/"));
    }

    #[test]
    fn test_only_loading_and_blocked_admit_local_documents() {
        assert!(SurfaceState::Loading.admits_local_documents());
        assert!(SurfaceState::Blocked.admits_local_documents());
        assert!(!SurfaceState::Ready.admits_local_documents());
        assert!(!SurfaceState::Navigating.admits_local_documents());
    }
}
