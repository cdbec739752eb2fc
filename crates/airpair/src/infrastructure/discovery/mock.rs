//! In-memory service lookup for testing the router without a network.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;

use airpair_core::ResolvedService;

use crate::application::route_discovery::ServiceLookup;

/// A [`ServiceLookup`] answering from a fixed table keyed by instance name.
///
/// Instances not in the table are unresolvable, which lets tests exercise
/// the router's resolution-failure path.
#[derive(Debug, Default)]
pub struct StaticServiceLookup {
    services: Mutex<HashMap<String, ResolvedService>>,
}

impl StaticServiceLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `instance_name` as resolving to a single `address:port`.
    ///
    /// # Panics
    ///
    /// Panics if `address` is not a valid IP address literal.
    pub fn insert(&self, instance_name: &str, address: &str, port: u16) {
        let address: IpAddr = address.parse().expect("valid IP address literal");
        self.insert_resolved(
            instance_name,
            ResolvedService {
                addresses: vec![address],
                port,
            },
        );
    }

    /// Registers `instance_name` with an arbitrary resolution.
    pub fn insert_resolved(&self, instance_name: &str, resolved: ResolvedService) {
        self.services
            .lock()
            .expect("lock poisoned")
            .insert(instance_name.to_string(), resolved);
    }
}

impl ServiceLookup for StaticServiceLookup {
    fn resolve(&self, _service_type: &str, instance_name: &str) -> Option<ResolvedService> {
        self.services
            .lock()
            .expect("lock poisoned")
            .get(instance_name)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_instance_resolves() {
        let lookup = StaticServiceLookup::new();
        lookup.insert("adb-1", "192.168.1.40", 40000);

        let resolved = lookup.resolve("_adb-tls-connect._tcp.local.", "adb-1").unwrap();

        assert_eq!(resolved.port, 40000);
        assert_eq!(resolved.addresses, vec!["192.168.1.40".parse::<IpAddr>().unwrap()]);
    }

    #[test]
    fn test_unregistered_instance_is_unresolved() {
        let lookup = StaticServiceLookup::new();
        assert!(lookup.resolve("_adb-tls-connect._tcp.local.", "adb-9").is_none());
    }
}
