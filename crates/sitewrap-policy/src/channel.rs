//! Synchronous policy queries across the control/content boundary
//!
//! Navigation handlers must not let a navigation start before the verdict is
//! known, so every query is a blocking round trip: the request carries its
//! own reply channel and the caller waits on it.

use crate::PolicyEngine;
use sitewrap_core::{DenialReason, Denied};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

enum PolicyRequest {
    CheckUrl {
        url: String,
        reply: SyncSender<bool>,
    },
    AuthorizeNewWindow {
        url: String,
        reply: SyncSender<Result<(), Denied>>,
    },
}

/// Create a connected client/service pair over `engine`
pub fn policy_channel(engine: Arc<PolicyEngine>) -> (PolicyClient, PolicyService) {
    let (tx, rx) = mpsc::channel();
    let block_message = Arc::from(engine.policy().block_message.as_str());
    (
        PolicyClient { tx, block_message },
        PolicyService { engine, rx },
    )
}

/// Content-plane handle for blocking policy queries
#[derive(Clone)]
pub struct PolicyClient {
    tx: Sender<PolicyRequest>,
    /// Shown when the service cannot answer
    block_message: Arc<str>,
}

impl PolicyClient {
    /// `check-url-can-open`: blocks until the service answers. A closed
    /// channel denies.
    pub fn check_url_sync(&self, url: &str) -> bool {
        let (reply, verdict) = mpsc::sync_channel(1);
        let request = PolicyRequest::CheckUrl {
            url: url.to_string(),
            reply,
        };

        if self.tx.send(request).is_err() {
            log::error!("Policy service is gone, denying {}", url);
            return false;
        }

        verdict.recv().unwrap_or_else(|_| {
            log::error!("Policy service dropped the request for {}", url);
            false
        })
    }

    /// Blocking new-window authorization
    pub fn authorize_new_window(&self, url: &str) -> Result<(), Denied> {
        let (reply, verdict) = mpsc::sync_channel(1);
        let request = PolicyRequest::AuthorizeNewWindow {
            url: url.to_string(),
            reply,
        };

        let unavailable = || {
            log::error!("Policy service unavailable, denying new window {}", url);
            Denied::new(DenialReason::NotAllowListed, url, &*self.block_message)
        };

        if self.tx.send(request).is_err() {
            return Err(unavailable());
        }
        verdict.recv().unwrap_or_else(|_| Err(unavailable()))
    }
}

/// Control-plane side answering [`PolicyClient`] queries
pub struct PolicyService {
    engine: Arc<PolicyEngine>,
    rx: Receiver<PolicyRequest>,
}

impl PolicyService {
    /// Answer queries until every client is dropped
    pub fn serve(self) {
        log::debug!("Policy service started");
        for request in self.rx.iter() {
            match request {
                PolicyRequest::CheckUrl { url, reply } => {
                    let allowed = self.engine.can_open(&url);
                    log::debug!("check-url-can-open {} -> {}", url, allowed);
                    let _ = reply.send(allowed);
                }
                PolicyRequest::AuthorizeNewWindow { url, reply } => {
                    let _ = reply.send(self.engine.authorize_new_window(&url));
                }
            }
        }
        log::debug!("Policy service stopped");
    }

    /// Run [`serve`](Self::serve) on a dedicated thread
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("sitewrap-policy".to_string())
            .spawn(move || self.serve())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AllowList, NavigationPolicy};

    fn engine(allow: &[&str], can_open_new_window: bool) -> Arc<PolicyEngine> {
        Arc::new(PolicyEngine::new(NavigationPolicy {
            can_open_new_window,
            block_message: "blocked".to_string(),
            allow_list: AllowList::new(allow),
        }))
    }

    #[test]
    fn test_round_trip_matches_engine() {
        let (client, service) = policy_channel(engine(&["example.com"], true));
        let handle = service.spawn().unwrap();

        assert!(client.check_url_sync("https://www.example.com"));
        assert!(!client.check_url_sync("https://example.com.evil.net"));
        assert!(!client.check_url_sync("not a url"));

        drop(client);
        handle.join().unwrap();
    }

    #[test]
    fn test_clients_share_one_service() {
        let (client, service) = policy_channel(engine(&["example.com"], true));
        let handle = service.spawn().unwrap();

        let workers: Vec<_> = (0..4)
            .map(|i| {
                let client = client.clone();
                thread::spawn(move || client.check_url_sync(&format!("https://n{}.example.com", i)))
            })
            .collect();
        for worker in workers {
            assert!(worker.join().unwrap());
        }

        drop(client);
        handle.join().unwrap();
    }

    #[test]
    fn test_authorize_new_window_round_trip() {
        let (client, service) = policy_channel(engine(&[], false));
        let handle = service.spawn().unwrap();

        let denied = client.authorize_new_window("https://example.com").unwrap_err();
        assert_eq!(denied.reason, DenialReason::PolicyDisabled);
        assert_eq!(denied.message, "blocked");

        drop(client);
        handle.join().unwrap();
    }

    #[test]
    fn test_stopped_service_fails_closed() {
        let (client, service) = policy_channel(engine(&[], true));
        drop(service);

        assert!(!client.check_url_sync("https://example.com"));
        assert!(client.authorize_new_window("https://example.com").is_err());
    }

    #[test]
    fn test_stopped_service_denial_uses_configured_message() {
        let (client, service) = policy_channel(engine(&["example.com"], true));
        drop(service);

        let denied = client.authorize_new_window("https://docs.example.com").unwrap_err();
        assert_eq!(denied.message, "blocked");
        assert_eq!(denied.url, "https://docs.example.com");
    }
}
