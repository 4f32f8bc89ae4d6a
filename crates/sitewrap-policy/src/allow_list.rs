//! Domain allow-list
//!
//! A pattern matches a host when its dot-separated labels line up with the
//! host's labels from the right: `example.com` covers `example.com` and
//! `www.example.com` but not `notexample.com` or `example.com.evil.net`.

use url::Url;

/// A single domain pattern, stored as lowercase labels in right-to-left order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainPattern {
    labels: Vec<String>,
}

impl DomainPattern {
    /// Parse a pattern. Returns `None` for patterns with fewer than two
    /// labels or with empty labels.
    pub fn parse(pattern: &str) -> Option<Self> {
        let pattern = pattern.trim();
        let labels: Vec<String> = pattern
            .split('.')
            .rev()
            .map(|label| label.to_ascii_lowercase())
            .collect();

        if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
            return None;
        }

        Some(Self { labels })
    }

    /// Check whether `host` is this domain or one of its subdomains
    pub fn matches_host(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.');
        let mut host_labels = host.rsplit('.');

        self.labels.iter().all(|label| {
            host_labels
                .next()
                .map_or(false, |host_label| host_label.eq_ignore_ascii_case(label))
        })
    }

    /// The pattern in its usual left-to-right form
    pub fn as_domain(&self) -> String {
        self.labels
            .iter()
            .rev()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Ordered set of trusted domain patterns
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    patterns: Vec<DomainPattern>,
    ignored: Vec<String>,
}

impl AllowList {
    /// Build an allow-list, dropping invalid entries
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut patterns = Vec::new();
        let mut ignored = Vec::new();

        for entry in entries {
            let entry = entry.as_ref();
            match DomainPattern::parse(entry) {
                Some(pattern) => patterns.push(pattern),
                None => {
                    log::warn!("Ignoring invalid allow-list pattern: {:?}", entry);
                    ignored.push(entry.to_string());
                }
            }
        }

        Self { patterns, ignored }
    }

    /// True when no valid pattern is present, which allows every destination
    pub fn is_unrestricted(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[DomainPattern] {
        &self.patterns
    }

    /// Entries that were rejected while building the list
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    pub fn allows_host(&self, host: &str) -> bool {
        self.is_unrestricted() || self.patterns.iter().any(|p| p.matches_host(host))
    }

    /// Check a full URL. Unparseable URLs and URLs without a host only pass
    /// an unrestricted list.
    pub fn allows_url(&self, url: &str) -> bool {
        if self.is_unrestricted() {
            return true;
        }

        destination_host(url).map_or(false, |host| self.allows_host(&host))
    }
}

/// Host of a destination URL, or `None` when the URL cannot be parsed or has
/// no host to match against
pub fn destination_host(url: &str) -> Option<String> {
    match Url::parse(url) {
        Ok(parsed) => parsed.host_str().map(str::to_string),
        Err(e) => {
            log::debug!("Unparseable destination {:?}: {}", url, e);
            None
        }
    }
}
