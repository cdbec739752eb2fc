//! Discovery event router.
//!
//! Receives raw `(service type, instance name, lifecycle)` callbacks from the
//! discovery subsystem, resolves them to an address and port, classifies them
//! as connect or pairing advertisements, and hands `Added` events to the
//! orchestrator under its lock.
//!
//! `Removed` and `Updated` callbacks are logged and dropped: the process ends
//! on the first successful connection, so a device going away mid-session is
//! not modelled.  Callbacks that cannot be resolved are expected on a busy
//! network and are dropped at debug level.

use std::sync::{Arc, MutexGuard};

use airpair_core::{
    DiscoveryEvent, Lifecycle, OrchestrationError, RawServiceEvent, ResolvedService, ServiceKind,
};
use tracing::{debug, error, info, warn};

use super::orchestrate::{OrchestrationState, Orchestrator, SharedOrchestrator};

/// Synchronous lookup from an instance name to its address and port.
pub trait ServiceLookup: Send + Sync {
    /// Returns `None` when the instance is not (or no longer) resolvable.
    fn resolve(&self, service_type: &str, instance_name: &str) -> Option<ResolvedService>;
}

/// Classifies discovery callbacks and forwards them to the orchestrator.
pub struct DiscoveryRouter {
    orchestrator: SharedOrchestrator,
    lookup: Arc<dyn ServiceLookup>,
}

impl DiscoveryRouter {
    pub fn new(orchestrator: SharedOrchestrator, lookup: Arc<dyn ServiceLookup>) -> Self {
        Self {
            orchestrator,
            lookup,
        }
    }

    /// Routes one callback.
    ///
    /// Returns the orchestrator state after handling, or `None` when the
    /// callback never reached the orchestrator.  Errors are logged here and
    /// never propagated: no discovery event can end the process.
    pub fn route(&self, raw: &RawServiceEvent) -> Option<OrchestrationState> {
        let event = match self.translate(raw) {
            Ok(Some(event)) => event,
            Ok(None) => return None,
            Err(err) => {
                report(&err);
                return None;
            }
        };

        debug!(
            kind = ?event.kind,
            address = %event.address,
            port = event.port,
            name = %event.raw_name,
            "forwarding discovery event"
        );

        let mut orchestrator = self.lock();
        match orchestrator.handle_event(&event) {
            Ok(state) => Some(state),
            Err(err) => {
                report(&err);
                Some(orchestrator.state())
            }
        }
    }

    /// Turns a raw callback into a [`DiscoveryEvent`].
    ///
    /// `Ok(None)` means the callback is deliberately not forwarded (unknown
    /// service type, or a lifecycle other than `Added`).
    ///
    /// # Errors
    ///
    /// Returns [`OrchestrationError::ResolutionFailure`] when the instance has
    /// no usable address.
    pub fn translate(
        &self,
        raw: &RawServiceEvent,
    ) -> Result<Option<DiscoveryEvent>, OrchestrationError> {
        let Some(kind) = ServiceKind::from_service_type(&raw.service_type) else {
            debug!(service_type = %raw.service_type, "unknown service type; dropping");
            return Ok(None);
        };

        match raw.lifecycle {
            Lifecycle::Added => {}
            Lifecycle::Removed => {
                info!(name = %raw.instance_name, ?kind, "service removed");
                return Ok(None);
            }
            Lifecycle::Updated => {
                debug!(name = %raw.instance_name, ?kind, "service updated; ignoring");
                return Ok(None);
            }
        }

        let resolution_failure = || OrchestrationError::ResolutionFailure {
            service_type: raw.service_type.clone(),
            instance_name: raw.instance_name.clone(),
        };
        let resolved = self
            .lookup
            .resolve(&raw.service_type, &raw.instance_name)
            .ok_or_else(resolution_failure)?;

        DiscoveryEvent::from_resolved(kind, raw.lifecycle, &raw.instance_name, &resolved)
            .map(Some)
            .ok_or_else(resolution_failure)
    }

    /// Current orchestrator state, for diagnostics.
    pub fn state(&self) -> OrchestrationState {
        self.lock().state()
    }

    /// Connect ports queued so far, for diagnostics.
    pub fn queued_ports(&self) -> Vec<u16> {
        self.lock().ports().iter().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Orchestrator> {
        self.orchestrator.lock().unwrap_or_else(|poisoned| {
            warn!("orchestrator lock poisoned; continuing with inner state");
            poisoned.into_inner()
        })
    }
}

fn report(err: &OrchestrationError) {
    match err {
        OrchestrationError::ExecutorFailure { result, .. } => {
            error!("{err}");
            debug!(stderr = %result.stderr, stdout = %result.stdout, "executor output");
        }
        _ => debug!("{err}"),
    }
}
