//! IPC between page scripts and the event loop
//!
//! Content surfaces report in-page navigation, and on some backends pop-ups
//! and link clicks. Window chrome (the virtual window frame and the client
//! window title bar) only asks to be closed. Each webview's handler accepts
//! the messages meant for its role.

use serde::Deserialize;
use sitewrap_shell::Backend;
use tracing::warn;

/// IPC message from JavaScript to Rust
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum IpcMessage {
    /// History API or fragment change that never reached the navigation
    /// handler
    InPageNavigation {
        url: String,
        #[serde(default = "main_frame_default")]
        main_frame: bool,
    },
    /// `window.open` or a `target=_blank` click caught by the page script
    OpenWindow { url: String },
    /// Top-level link click caught by the page script
    Navigate { url: String },
    /// Close button of a virtual window frame
    CloseVirtualWindow,
    /// Close button of a client window
    CloseWindow { win_id: u64 },
}

fn main_frame_default() -> bool {
    true
}

impl IpcMessage {
    pub fn parse(body: &str) -> Option<Self> {
        match serde_json::from_str(body) {
            Ok(msg) => Some(msg),
            Err(e) => {
                warn!("Ignoring malformed IPC message {:?}: {}", body, e);
                None
            }
        }
    }
}

/// Shared by every content script: posts a message to the host from any
/// frame that can reach the IPC bridge
const POST_HELPER: &str = r#"
(function() {
    if (window.__sitewrapPost) { return; }
    window.__sitewrapPost = function(message) {
        try {
            var ipc = window.ipc;
            if (!ipc && window.webkit && window.webkit.messageHandlers) {
                ipc = window.webkit.messageHandlers.ipc;
            }
            if (!ipc) {
                try { ipc = window.top.ipc; } catch (e) {}
            }
            if (ipc) { ipc.postMessage(JSON.stringify(message)); }
        } catch (e) {}
    };
})();
"#;

/// Reports same-document URL changes, which the platform navigation handler
/// does not see
const NAVIGATION_REPORTER: &str = r#"
(function() {
    if (window.__sitewrapReporter) { return; }
    window.__sitewrapReporter = true;

    var last = location.href;
    function report() {
        if (location.href === last) { return; }
        last = location.href;
        window.__sitewrapPost({
            cmd: 'in_page_navigation',
            url: location.href,
            main_frame: window.top === window
        });
    }

    var push = history.pushState;
    var replace = history.replaceState;
    history.pushState = function() {
        var result = push.apply(this, arguments);
        report();
        return result;
    };
    history.replaceState = function() {
        var result = replace.apply(this, arguments);
        report();
        return result;
    };
    window.addEventListener('hashchange', report);
    window.addEventListener('popstate', report);
})();
"#;

/// Reports `window.open` and `target=_blank` clicks as pop-up requests
const POPUP_SHIM: &str = r#"
(function() {
    if (window.__sitewrapPopups) { return; }
    window.__sitewrapPopups = true;

    function resolve(url) {
        try { return new URL(url, location.href).href; } catch (e) { return null; }
    }

    window.open = function(url) {
        var target = resolve(url === undefined || url === '' ? 'about:blank' : String(url));
        if (target) { window.__sitewrapPost({ cmd: 'open_window', url: target }); }
        return null;
    };

    window.addEventListener('click', function(event) {
        if (event.defaultPrevented || event.button !== 0) { return; }
        var link = event.target && event.target.closest ? event.target.closest('a[href]') : null;
        if (!link) { return; }
        var blank = (link.target || '').toLowerCase() === '_blank';
        if (!blank && !event.metaKey && !event.ctrlKey && !event.shiftKey) { return; }
        event.preventDefault();
        window.__sitewrapPost({ cmd: 'open_window', url: link.href });
    });
})();
"#;

/// Reports plain top-level link clicks so the host can check them before
/// the document is replaced
const LINK_ROUTER: &str = r#"
(function() {
    if (window.top !== window || window.__sitewrapLinks) { return; }
    window.__sitewrapLinks = true;

    window.addEventListener('click', function(event) {
        if (event.defaultPrevented || event.button !== 0) { return; }
        if (event.metaKey || event.ctrlKey || event.shiftKey || event.altKey) { return; }
        var link = event.target && event.target.closest ? event.target.closest('a[href]') : null;
        if (!link || link.hasAttribute('download')) { return; }
        var target = (link.target || '').toLowerCase();
        if (target && target !== '_self' && target !== '_top') { return; }
        if (link.protocol !== 'http:' && link.protocol !== 'https:') { return; }
        if (link.hash && link.href.split('#')[0] === location.href.split('#')[0]) { return; }
        event.preventDefault();
        window.__sitewrapPost({ cmd: 'navigate', url: link.href });
    });
})();
"#;

/// Script installed in every frame of a content surface on `backend`
pub fn content_script(backend: &Backend) -> String {
    let mut script = String::from(POST_HELPER);
    script.push_str(NAVIGATION_REPORTER);
    if backend.reports_popups_from_script() {
        script.push_str(POPUP_SHIM);
    }
    if backend.routes_links {
        script.push_str(LINK_ROUTER);
    }
    script
}

/// Script handing a client window's title bar its window id
pub fn window_id_script(win_id: u64) -> String {
    format!("window.__SITEWRAP_WINDOW_ID__ = {};", win_id)
}

/// Script pushing a title into a frame page's title bar
pub fn set_title_script(title: &str) -> String {
    format!(
        "window.sitewrap && window.sitewrap.setTitle({});",
        serde_json::Value::from(title)
    )
}
