//! Discovery events and service-type classification.
//!
//! The discovery subsystem reports `(service type, instance name, lifecycle)`
//! triples.  The router resolves the instance to an address and port and turns
//! the triple into a [`DiscoveryEvent`] that the state machine understands.

use std::net::IpAddr;

/// mDNS service type advertised once the device accepts `adb connect`.
pub const CONNECT_SERVICE_TYPE: &str = "_adb-tls-connect._tcp.local.";

/// mDNS service type advertised while the device waits for `adb pair`.
pub const PAIRING_SERVICE_TYPE: &str = "_adb-tls-pairing._tcp.local.";

/// Which of the two browsed advertisements an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    /// Carries the port for an authenticated connection.
    ConnectAd,
    /// Carries the port on which the device accepts the pairing password.
    PairingAd,
}

impl ServiceKind {
    /// All kinds, in the order they are subscribed.
    pub const ALL: [ServiceKind; 2] = [ServiceKind::ConnectAd, ServiceKind::PairingAd];

    /// Classifies a fully-qualified service type.
    ///
    /// The trailing dot is optional; anything else returns `None`.
    pub fn from_service_type(service_type: &str) -> Option<Self> {
        let normalized = service_type.trim_end_matches('.');
        if normalized == CONNECT_SERVICE_TYPE.trim_end_matches('.') {
            Some(ServiceKind::ConnectAd)
        } else if normalized == PAIRING_SERVICE_TYPE.trim_end_matches('.') {
            Some(ServiceKind::PairingAd)
        } else {
            None
        }
    }

    pub fn service_type(self) -> &'static str {
        match self {
            ServiceKind::ConnectAd => CONNECT_SERVICE_TYPE,
            ServiceKind::PairingAd => PAIRING_SERVICE_TYPE,
        }
    }
}

/// Lifecycle of an advertisement as reported by the discovery subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Added,
    Removed,
    Updated,
}

/// An untranslated discovery callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawServiceEvent {
    pub service_type: String,
    pub instance_name: String,
    pub lifecycle: Lifecycle,
}

/// Address and port an instance name resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedService {
    pub addresses: Vec<IpAddr>,
    pub port: u16,
}

impl ResolvedService {
    /// Picks the address to hand to `adb`.
    ///
    /// IPv4 is preferred; among addresses of the same family the lowest wins
    /// so the choice does not depend on hash-set iteration order.
    pub fn preferred_address(&self) -> Option<IpAddr> {
        let lowest_v4 = self.addresses.iter().filter(|a| a.is_ipv4()).min();
        lowest_v4.or_else(|| self.addresses.iter().min()).copied()
    }
}

/// A resolved, classified advertisement.  Consumed immediately, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryEvent {
    pub kind: ServiceKind,
    pub lifecycle: Lifecycle,
    pub address: IpAddr,
    pub port: u16,
    pub raw_name: String,
}

impl DiscoveryEvent {
    /// Builds an event from a lookup result.
    ///
    /// Returns `None` when the lookup produced no address.
    pub fn from_resolved(
        kind: ServiceKind,
        lifecycle: Lifecycle,
        raw_name: impl Into<String>,
        resolved: &ResolvedService,
    ) -> Option<Self> {
        Some(Self {
            kind,
            lifecycle,
            address: resolved.preferred_address()?,
            port: resolved.port,
            raw_name: raw_name.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_connect_service_type() {
        assert_eq!(
            ServiceKind::from_service_type("_adb-tls-connect._tcp.local."),
            Some(ServiceKind::ConnectAd)
        );
    }

    #[test]
    fn test_classifies_pairing_service_type_without_trailing_dot() {
        assert_eq!(
            ServiceKind::from_service_type("_adb-tls-pairing._tcp.local"),
            Some(ServiceKind::PairingAd)
        );
    }

    #[test]
    fn test_unknown_service_type_is_none() {
        assert_eq!(ServiceKind::from_service_type("_googlecast._tcp.local."), None);
    }

    #[test]
    fn test_service_type_round_trips_through_classification() {
        for kind in ServiceKind::ALL {
            assert_eq!(ServiceKind::from_service_type(kind.service_type()), Some(kind));
        }
    }

    #[test]
    fn test_preferred_address_favours_ipv4() {
        // Arrange
        let resolved = ResolvedService {
            addresses: vec!["fe80::1".parse().unwrap(), "192.168.1.40".parse().unwrap()],
            port: 40000,
        };

        // Act / Assert
        assert_eq!(
            resolved.preferred_address(),
            Some("192.168.1.40".parse().unwrap())
        );
    }

    #[test]
    fn test_preferred_address_falls_back_to_ipv6() {
        let resolved = ResolvedService {
            addresses: vec!["fe80::1".parse().unwrap()],
            port: 40000,
        };
        assert_eq!(resolved.preferred_address(), Some("fe80::1".parse().unwrap()));
    }

    #[test]
    fn test_from_resolved_without_address_is_none() {
        let resolved = ResolvedService {
            addresses: Vec::new(),
            port: 40000,
        };
        let event =
            DiscoveryEvent::from_resolved(ServiceKind::ConnectAd, Lifecycle::Added, "x", &resolved);
        assert!(event.is_none());
    }

    #[test]
    fn test_from_resolved_copies_port_and_name() {
        // Arrange
        let resolved = ResolvedService {
            addresses: vec!["10.0.0.7".parse().unwrap()],
            port: 37099,
        };

        // Act
        let event = DiscoveryEvent::from_resolved(
            ServiceKind::PairingAd,
            Lifecycle::Added,
            "adb-XYZ-abc",
            &resolved,
        )
        .expect("resolved service has an address");

        // Assert
        assert_eq!(event.port, 37099);
        assert_eq!(event.raw_name, "adb-XYZ-abc");
        assert_eq!(event.address.to_string(), "10.0.0.7");
    }
}
