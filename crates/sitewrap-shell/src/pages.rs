//! Locally generated pages

/// Title shown in a virtual window's title bar until the page reports one
pub const LOADING_TITLE: &str = "loading...";

/// Message shown when a download is cancelled
pub const DOWNLOAD_BLOCKED_MESSAGE: &str = "Downloads are not allowed.";

/// Minimal HTML document substituted for a refused main-frame navigation
pub fn block_page(url: &str) -> String {
    format!(
        concat!(
            "<html><head><meta charset=\"utf-8\"/><title>403</title></head>",
            "<body>The following address is not allowed: {}</body></html>"
        ),
        escape_html(url)
    )
}

/// Escape text for inclusion in HTML content
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
