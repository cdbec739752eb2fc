//! mDNS-based device discovery.
//!
//! Browses the two adb service types with the `mdns-sd` daemon and feeds every
//! callback through the [`DiscoveryRouter`].
//!
//! # How the browse works (for beginners)
//!
//! mDNS (multicast DNS) lets devices on a LAN announce services without a DNS
//! server.  After the QR scan the phone announces:
//!
//! ```text
//! adb-<serial>-<id>._adb-tls-pairing._tcp.local.   port 37xxx
//! adb-<serial>-<id>._adb-tls-connect._tcp.local.   port 4xxxx
//! ```
//!
//! `mdns-sd` runs its own daemon thread and hands events to us through one
//! channel per browsed type.  We read each channel on a dedicated OS thread so
//! the blocking `adb` calls made while handling an event never stall the Tokio
//! runtime.  Both threads call into the router concurrently; the orchestrator
//! lock serializes them.
//!
//! # Resolution
//!
//! `ServiceResolved` events carry the address and port.  They are stored in a
//! [`ServiceCache`], which is also the router's [`ServiceLookup`]: the router
//! asks the cache to resolve the instance name it was given, exactly like a
//! synchronous lookup against the discovery library.  The first resolution of
//! an instance is reported as `Added`; later ones as `Updated`.  A
//! `ServiceRemoved` event evicts the instance so a re-announcement is `Added`
//! again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use airpair_core::{Lifecycle, RawServiceEvent, ResolvedService, ServiceKind};
use mdns_sd::{ServiceDaemon, ServiceEvent};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::lifecycle::DiscoverySubscription;
use crate::application::route_discovery::{DiscoveryRouter, ServiceLookup};

pub mod mock;

/// Error type for discovery startup.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The mDNS daemon could not be created.
    #[error("failed to start mDNS daemon: {0}")]
    Daemon(#[source] mdns_sd::Error),

    /// Browsing a service type was refused by the daemon.
    #[error("failed to browse {service_type}: {source}")]
    Browse {
        service_type: &'static str,
        #[source]
        source: mdns_sd::Error,
    },

    /// The per-type event thread could not be spawned.
    #[error("failed to spawn discovery thread: {0}")]
    Spawn(#[source] std::io::Error),
}

// ── Resolved-service cache ────────────────────────────────────────────────────

/// Latest resolution of every instance currently advertised.
#[derive(Debug, Default)]
pub struct ServiceCache {
    services: Mutex<HashMap<String, ResolvedService>>,
}

impl ServiceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a resolution and reports whether the instance is new.
    pub fn record(&self, fullname: &str, resolved: ResolvedService) -> Lifecycle {
        match self.lock().insert(fullname.to_string(), resolved) {
            None => Lifecycle::Added,
            Some(_) => Lifecycle::Updated,
        }
    }

    /// Evicts an instance.
    pub fn forget(&self, fullname: &str) {
        self.lock().remove(fullname);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ResolvedService>> {
        self.services
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ServiceLookup for ServiceCache {
    fn resolve(&self, _service_type: &str, instance_name: &str) -> Option<ResolvedService> {
        self.lock().get(instance_name).cloned()
    }
}

// ── mDNS subscription ─────────────────────────────────────────────────────────

/// A running mDNS browse of both adb service types.
pub struct MdnsDiscovery {
    daemon: ServiceDaemon,
    stopped: bool,
}

impl MdnsDiscovery {
    /// Starts the daemon, browses both service types and spawns one event
    /// thread per type.  Each thread ends when the daemon closes its channel.
    /// A partially started browse is torn down on error.
    ///
    /// `cache` must be the same lookup the `router` resolves against.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] if the daemon cannot start, a browse is
    /// refused, or a thread cannot be spawned.
    pub fn start(
        router: Arc<DiscoveryRouter>,
        cache: Arc<ServiceCache>,
    ) -> Result<Self, DiscoveryError> {
        let daemon = ServiceDaemon::new().map_err(DiscoveryError::Daemon)?;
        let discovery = Self {
            daemon,
            stopped: false,
        };

        for kind in ServiceKind::ALL {
            let service_type = kind.service_type();
            let events = discovery
                .daemon
                .browse(service_type)
                .map_err(|source| DiscoveryError::Browse {
                    service_type,
                    source,
                })?;

            let router = Arc::clone(&router);
            let cache = Arc::clone(&cache);
            std::thread::Builder::new()
                .name(format!("airpair-mdns-{kind:?}").to_lowercase())
                .spawn(move || {
                    while let Ok(event) = events.recv() {
                        if let Some(raw) = translate_event(event, &cache) {
                            router.route(&raw);
                        }
                    }
                    debug!(service_type, "browse channel closed");
                })
                .map_err(DiscoveryError::Spawn)?;

            info!(service_type, "browsing");
        }

        Ok(discovery)
    }
}

impl DiscoverySubscription for MdnsDiscovery {
    fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        for kind in ServiceKind::ALL {
            if let Err(e) = self.daemon.stop_browse(kind.service_type()) {
                debug!(service_type = kind.service_type(), "stop_browse failed: {e}");
            }
        }
        if let Err(e) = self.daemon.shutdown() {
            warn!("mDNS daemon shutdown failed: {e}");
        }
        info!("mDNS discovery stopped");
    }
}

impl Drop for MdnsDiscovery {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Updates the cache and produces the raw callback for one daemon event.
fn translate_event(event: ServiceEvent, cache: &ServiceCache) -> Option<RawServiceEvent> {
    match event {
        ServiceEvent::ServiceResolved(info) => {
            let resolved = ResolvedService {
                addresses: info.get_addresses().iter().copied().collect(),
                port: info.get_port(),
            };
            let lifecycle = cache.record(info.get_fullname(), resolved);
            Some(RawServiceEvent {
                service_type: info.get_type().to_string(),
                instance_name: info.get_fullname().to_string(),
                lifecycle,
            })
        }
        ServiceEvent::ServiceRemoved(service_type, fullname) => {
            cache.forget(&fullname);
            Some(RawServiceEvent {
                service_type,
                instance_name: fullname,
                lifecycle: Lifecycle::Removed,
            })
        }
        ServiceEvent::ServiceFound(service_type, fullname) => {
            debug!(%service_type, %fullname, "service found; waiting for resolution");
            None
        }
        other => {
            debug!(?other, "mDNS browse event");
            None
        }
    }
}
