//! airpair library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does airpair do? (for beginners)
//!
//! Pairing a phone with `adb` over Wi-Fi normally means reading a port and a
//! six-digit code off the phone and typing both into a terminal.  airpair
//! removes the typing:
//!
//! 1. It generates a one-time credential and shows it as a QR code.
//! 2. The user scans the code from the phone's "Wireless debugging" screen.
//! 3. The phone advertises `_adb-tls-connect` and `_adb-tls-pairing` over
//!    mDNS.  airpair resolves both advertisements.
//! 4. It runs `adb pair`, then `adb connect`, and optionally `adb tcpip`.
//! 5. It exits as soon as the device is connected.

/// Application layer: orchestration state machine, discovery router and
/// lifecycle controller.
pub mod application;

/// Infrastructure layer: adb, mDNS, terminal output and the config file.
pub mod infrastructure;
