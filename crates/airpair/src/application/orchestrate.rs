//! Orchestration state machine: from discovery events to a connected device.
//!
//! # State transitions (for beginners)
//!
//! ```text
//!                 ConnectAd: queue port
//!                ┌───────────┐
//!                ▼           │
//!   ┌──────► Discovering ────┘
//!   │            │ PairingAd (queue non-empty)
//!   │            ▼
//!   │         Pairing ──── pair ok ────► Connecting ── ok, no mode switch ──► Completed
//!   │            │                           │                                   ▲
//!   │       pair failed                 connect ok, mode switch                 │
//!   │            │                           ▼                                   │
//!   │            │                  ActivatingModeSwitch ──── ok ────────────────┘
//!   │            ▼                           │
//!   └──────── Failed ◄──── any failure ──────┘
//! ```
//!
//! - A pairing advertisement that arrives before any connect advertisement is
//!   ignored; the phone re-announces, so nothing is buffered.
//! - `only_connect` skips `Pairing`.
//! - `auto_mode_switch` reacts to connect advertisements alone
//!   (connect, then mode switch) and ignores pairing advertisements.  Nothing
//!   reads the port queue in that mode, so ports are not queued.
//! - The front port is dequeued only when the whole attempt (pair, connect
//!   and any mode switch) has succeeded.
//! - `Failed` is never a resting state: it is logged and immediately followed
//!   by `Discovering`, with the port queue and credential untouched, so a
//!   re-announced advertisement retries the same step.
//! - `Completed` is final; later events are ignored.
//!
//! # Concurrency
//!
//! The orchestrator has no locking of its own.  It is shared as
//! [`SharedOrchestrator`] and every event is handled while holding that one
//! mutex, including the blocking executor calls.  Two discovery threads can
//! therefore never interleave their effects, and at most one `adb` command runs
//! at a time.

use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use airpair_core::{
    DiscoveryEvent, ExecutorAction, ExecutorResult, Lifecycle, OrchestrationError,
    PairingCredential, PortQueue, ServiceKind, SessionConfig,
};
use tracing::{debug, info};

use super::execute_device::DeviceExecutor;
use super::lifecycle::CompletionSignal;

/// The single orchestrator instance, shared between discovery threads.
pub type SharedOrchestrator = Arc<Mutex<Orchestrator>>;

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestrationState {
    /// Waiting for advertisements.
    Discovering,
    /// `adb pair` in progress.
    Pairing,
    /// `adb connect` in progress.
    Connecting,
    /// `adb tcpip` in progress.
    ActivatingModeSwitch,
    /// Device connected (and mode switched, if requested).  Final.
    Completed,
    /// The last step failed.  Transient; always followed by `Discovering`.
    Failed,
}

/// Decides, for each discovery event, which action to run and what follows.
pub struct Orchestrator {
    config: SessionConfig,
    credential: PairingCredential,
    executor: Arc<dyn DeviceExecutor>,
    completion: CompletionSignal,
    ports: PortQueue,
    state: OrchestrationState,
}

impl Orchestrator {
    pub fn new(
        config: SessionConfig,
        credential: PairingCredential,
        executor: Arc<dyn DeviceExecutor>,
        completion: CompletionSignal,
    ) -> Self {
        Self {
            config,
            credential,
            executor,
            completion,
            ports: PortQueue::new(),
            state: OrchestrationState::Discovering,
        }
    }

    /// Wraps the orchestrator for sharing with the discovery router.
    pub fn into_shared(self) -> SharedOrchestrator {
        Arc::new(Mutex::new(self))
    }

    pub fn state(&self) -> OrchestrationState {
        self.state
    }

    /// Connect ports seen so far, earliest first.
    pub fn ports(&self) -> &PortQueue {
        &self.ports
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Handles one discovery event and returns the state it left behind.
    ///
    /// # Errors
    ///
    /// - [`OrchestrationError::NoCandidatePort`] when a pairing advertisement
    ///   arrives with an empty port queue.
    /// - [`OrchestrationError::ExecutorFailure`] when pair, connect or mode
    ///   switch fails.  The state is back at `Discovering` by then.
    pub fn handle_event(
        &mut self,
        event: &DiscoveryEvent,
    ) -> Result<OrchestrationState, OrchestrationError> {
        if self.state == OrchestrationState::Completed {
            debug!(name = %event.raw_name, "session already completed; ignoring event");
            return Ok(self.state);
        }
        if event.lifecycle != Lifecycle::Added {
            debug!(name = %event.raw_name, lifecycle = ?event.lifecycle, "not an added service; ignoring");
            return Ok(self.state);
        }

        match event.kind {
            ServiceKind::ConnectAd => self.on_connect_advertised(event),
            ServiceKind::PairingAd => self.on_pairing_advertised(event),
        }
    }

    fn on_connect_advertised(
        &mut self,
        event: &DiscoveryEvent,
    ) -> Result<OrchestrationState, OrchestrationError> {
        if self.config.auto_mode_switch {
            let port = self.config.explicit_port.unwrap_or(event.port);
            self.connect(event.address, port)?;
            self.switch_mode()?;
            return Ok(self.complete());
        }

        self.ports.push(event.port);
        debug!(
            port = event.port,
            queued = ?self.ports.iter().collect::<Vec<_>>(),
            "queued connect port"
        );
        Ok(self.state)
    }

    fn on_pairing_advertised(
        &mut self,
        event: &DiscoveryEvent,
    ) -> Result<OrchestrationState, OrchestrationError> {
        if self.config.auto_mode_switch {
            debug!(name = %event.raw_name, "auto mode switch enabled; ignoring pairing advertisement");
            return Ok(self.state);
        }
        let Some(queued_port) = self.ports.front() else {
            return Err(OrchestrationError::NoCandidatePort);
        };

        if self.config.only_connect {
            info!("skipping pairing");
        } else {
            let pairing_port = self.config.pairing_port(event.port);
            self.pair(event.address, pairing_port)?;
        }

        let explicit_port = self.config.explicit_port;
        self.connect(event.address, explicit_port.unwrap_or(queued_port))?;
        if self.config.do_mode_switch {
            self.switch_mode()?;
        }

        // The queued port is consumed only by a fully successful attempt.
        if explicit_port.is_none() {
            self.ports.pop_front();
        }
        Ok(self.complete())
    }

    fn pair(&mut self, address: IpAddr, port: u16) -> Result<(), OrchestrationError> {
        self.transition(OrchestrationState::Pairing);
        info!(%address, port, "pairing…");
        let result = self
            .executor
            .pair(address, port, self.credential.password());
        self.settle(ExecutorAction::Pair, result)?;
        info!("paired");
        Ok(())
    }

    fn connect(&mut self, address: IpAddr, port: u16) -> Result<(), OrchestrationError> {
        self.transition(OrchestrationState::Connecting);
        info!(%address, port, "connecting…");
        let result = self.executor.connect(address, port);
        self.settle(ExecutorAction::Connect, result)?;
        info!("connected");
        Ok(())
    }

    fn switch_mode(&mut self) -> Result<(), OrchestrationError> {
        let port = self.config.mode_switch_port;
        self.transition(OrchestrationState::ActivatingModeSwitch);
        info!(port, "activating TCP/IP mode…");
        let result = self.executor.switch_mode(port);
        self.settle(ExecutorAction::SwitchMode, result)?;
        info!("activated");
        Ok(())
    }

    /// Maps an executor result onto the state machine.  A failure passes
    /// through `Failed` back to `Discovering`.
    fn settle(
        &mut self,
        action: ExecutorAction,
        result: ExecutorResult,
    ) -> Result<(), OrchestrationError> {
        if result.succeeded {
            return Ok(());
        }
        self.transition(OrchestrationState::Failed);
        self.transition(OrchestrationState::Discovering);
        Err(OrchestrationError::ExecutorFailure { action, result })
    }

    fn complete(&mut self) -> OrchestrationState {
        self.transition(OrchestrationState::Completed);
        self.completion.notify();
        self.state
    }

    fn transition(&mut self, next: OrchestrationState) {
        debug!(from = ?self.state, to = ?next, "state transition");
        self.state = next;
    }
}
