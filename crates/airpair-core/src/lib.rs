//! # airpair-core
//!
//! Shared domain library for airpair: the pieces of wireless `adb` pairing that
//! carry no I/O of their own.
//!
//! This crate has zero dependencies on OS processes, sockets, or the mDNS
//! daemon.  The `airpair` application crate builds the orchestration state
//! machine, the discovery router, and the infrastructure adapters on top of it.
//!
//! # Architecture overview (for beginners)
//!
//! Android 11+ devices can be paired with `adb` over Wi-Fi by scanning a QR
//! code.  The QR code carries a made-up network name and password.  After the
//! scan the phone advertises two mDNS services on the local network:
//!
//! - `_adb-tls-connect._tcp` – the port on which the device accepts an
//!   authenticated `adb connect`.
//! - `_adb-tls-pairing._tcp` – the port on which the device waits for
//!   `adb pair` with the password from the QR code.
//!
//! This crate defines:
//!
//! - **`domain::credential`** – the one-time [`PairingCredential`] and its QR
//!   payload.
//! - **`domain::config`** – the immutable [`SessionConfig`].
//! - **`domain::events`** – [`DiscoveryEvent`] and the service-type
//!   classification.
//! - **`domain::port_queue`** – the FIFO [`PortQueue`] of connect ports.
//! - **`domain::executor`** – [`ExecutorResult`] and [`ExecutorAction`].
//! - **`error`** – the orchestration error taxonomy.

pub mod domain;
pub mod error;

pub use domain::config::{SessionConfig, DEFAULT_MODE_SWITCH_PORT, DEFAULT_PAIRING_PORT};
pub use domain::credential::PairingCredential;
pub use domain::events::{
    DiscoveryEvent, Lifecycle, RawServiceEvent, ResolvedService, ServiceKind,
    CONNECT_SERVICE_TYPE, PAIRING_SERVICE_TYPE,
};
pub use domain::executor::{ExecutorAction, ExecutorResult};
pub use domain::port_queue::PortQueue;
pub use error::OrchestrationError;
