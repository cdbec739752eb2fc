//! The device executor seam.
//!
//! The orchestrator never spawns processes itself.  It calls a
//! [`DeviceExecutor`], which the infrastructure layer implements on top of the
//! `adb` binary and tests implement with a recording double.

use std::net::IpAddr;

use airpair_core::ExecutorResult;

/// Runs pair / connect / mode-switch actions against the device.
///
/// Every call blocks until the external collaborator has finished and its
/// result is known.  Implementations must not retry and must not let two
/// calls overlap: the underlying executor holds exclusive device-session
/// state.
pub trait DeviceExecutor: Send + Sync {
    /// Presents `password` to the device's pairing service at `address:port`.
    fn pair(&self, address: IpAddr, port: u16, password: &str) -> ExecutorResult;

    /// Opens an authenticated connection to `address:port`.
    fn connect(&self, address: IpAddr, port: u16) -> ExecutorResult;

    /// Restarts the connected device's daemon listening on TCP `port`.
    fn switch_mode(&self, port: u16) -> ExecutorResult;
}
