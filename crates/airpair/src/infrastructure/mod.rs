//! Infrastructure layer for airpair.
//!
//! Contains OS-facing adapters: the `adb` process executor, the mDNS browse,
//! terminal output of the pairing code, and config-file storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `airpair_core`, but MUST NOT be imported by the `application` or domain
//! layers outside of their tests.

pub mod discovery;
pub mod executor;
pub mod storage;
pub mod terminal;
