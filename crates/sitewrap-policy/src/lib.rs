//! Navigation policy for SiteWrap
//!
//! The policy engine is the only place that decides whether a destination may
//! be opened. It owns the allow-list and the new-window flag, and it drives
//! the lifecycle of top-level client windows through [`WindowRegistry`].

pub mod allow_list;
pub mod channel;
pub mod registry;

use sitewrap_core::config::NewWindowConfig;
use sitewrap_core::{DenialReason, Denied};

pub use allow_list::{AllowList, DomainPattern};
pub use channel::{policy_channel, PolicyClient, PolicyService};
pub use registry::{WindowHost, WindowRegistry, WindowRole};

/// Immutable navigation policy, loaded once at startup
#[derive(Debug, Clone)]
pub struct NavigationPolicy {
    pub can_open_new_window: bool,
    pub block_message: String,
    pub allow_list: AllowList,
}

impl NavigationPolicy {
    pub fn from_config(config: &NewWindowConfig) -> Self {
        Self {
            can_open_new_window: config.can_open_new_window,
            block_message: config.message.clone(),
            allow_list: AllowList::new(&config.allow_list),
        }
    }
}

impl Default for NavigationPolicy {
    fn default() -> Self {
        Self::from_config(&NewWindowConfig::default())
    }
}

/// Allow/deny decisions over a [`NavigationPolicy`]
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    policy: NavigationPolicy,
}

impl PolicyEngine {
    pub fn new(policy: NavigationPolicy) -> Self {
        log::info!(
            "Initializing policy engine ({} allow-list patterns, new windows {})",
            policy.allow_list.patterns().len(),
            if policy.can_open_new_window {
                "enabled"
            } else {
                "disabled"
            }
        );
        Self { policy }
    }

    pub fn policy(&self) -> &NavigationPolicy {
        &self.policy
    }

    /// Whether `url` may be opened. Never panics; malformed URLs only pass an
    /// unrestricted allow-list.
    pub fn can_open(&self, url: &str) -> bool {
        self.policy.allow_list.allows_url(url)
    }

    /// Check a navigation destination, producing the denial to report
    pub fn check_navigation(&self, url: &str) -> Result<(), Denied> {
        if self.can_open(url) {
            return Ok(());
        }
        let reason = match allow_list::destination_host(url) {
            Some(_) => DenialReason::NotAllowListed,
            None => DenialReason::MalformedUrl,
        };
        Err(self.deny(reason, url))
    }

    /// Decide whether a page may open `url` in a new window
    pub fn authorize_new_window(&self, url: &str) -> Result<(), Denied> {
        if !self.policy.can_open_new_window {
            return Err(self.deny(DenialReason::PolicyDisabled, url));
        }
        self.check_navigation(url)
    }

    /// Build a denial carrying the configured message
    pub fn deny(&self, reason: DenialReason, url: &str) -> Denied {
        log::warn!("Denied {} ({})", url, reason.as_str());
        Denied::new(reason, url, self.policy.block_message.clone())
    }
}
