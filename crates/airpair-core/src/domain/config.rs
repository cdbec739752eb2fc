//! Session configuration consumed by the orchestration state machine.
//!
//! [`SessionConfig`] is resolved once at startup (CLI flags layered over an
//! optional config file) and is read-only afterwards.  Keeping it a plain
//! struct with no environment reads inside the domain makes the state machine
//! easy to drive from tests.

use serde::{Deserialize, Serialize};

/// Port used by `adb pair` when the pairing advertisement carries port 0.
pub const DEFAULT_PAIRING_PORT: u16 = 5555;

/// Default port for `adb tcpip`.
pub const DEFAULT_MODE_SWITCH_PORT: u16 = 5555;

/// Behaviour switches for one pairing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Skip `adb pair` and go straight to `adb connect`.
    pub only_connect: bool,
    /// Run `adb tcpip` after a successful connect.
    pub do_mode_switch: bool,
    /// Connect and switch mode as soon as a connect advertisement appears,
    /// without waiting for a pairing advertisement.
    pub auto_mode_switch: bool,
    /// Port handed to `adb tcpip`.
    pub mode_switch_port: u16,
    /// Overrides every discovered port for both pair and connect.
    pub explicit_port: Option<u16>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            only_connect: false,
            do_mode_switch: false,
            auto_mode_switch: false,
            mode_switch_port: DEFAULT_MODE_SWITCH_PORT,
            explicit_port: None,
        }
    }
}

impl SessionConfig {
    /// Port for `adb pair`: the explicit override, else the announced port,
    /// else [`DEFAULT_PAIRING_PORT`] when the announcement carries 0.
    pub fn pairing_port(&self, announced: u16) -> u16 {
        match (self.explicit_port, announced) {
            (Some(port), _) => port,
            (None, 0) => DEFAULT_PAIRING_PORT,
            (None, port) => port,
        }
    }
}
