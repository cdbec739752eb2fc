//! Recording executor for unit and integration testing.
//!
//! Records every call in order, returns scripted results (success unless told
//! otherwise), and tracks how many calls were ever in flight at once so tests
//! can assert that executor invocations never overlap.

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use airpair_core::{ExecutorAction, ExecutorResult};

use crate::application::execute_device::DeviceExecutor;

/// One recorded executor invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutorCall {
    Pair {
        address: IpAddr,
        port: u16,
        password: String,
    },
    Connect {
        address: IpAddr,
        port: u16,
    },
    SwitchMode {
        port: u16,
    },
}

/// A [`DeviceExecutor`] that records calls instead of running `adb`.
#[derive(Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<ExecutorCall>>,
    scripted: Mutex<HashMap<ExecutorAction, VecDeque<ExecutorResult>>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingExecutor {
    /// Creates an executor whose every call succeeds immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call block for `delay` before returning, widening the
    /// window in which overlapping calls would be observed.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Queues the result of the next `action` call.  Calls without a queued
    /// result succeed.
    pub fn push_result(&self, action: ExecutorAction, result: ExecutorResult) {
        self.scripted
            .lock()
            .expect("lock poisoned")
            .entry(action)
            .or_default()
            .push_back(result);
    }

    /// Returns a snapshot of all recorded calls, oldest first.
    pub fn calls(&self) -> Vec<ExecutorCall> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    /// Highest number of calls that were ever running concurrently.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, action: ExecutorAction, call: ExecutorCall) -> ExecutorResult {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        self.calls.lock().expect("lock poisoned").push(call);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        let result = self
            .scripted
            .lock()
            .expect("lock poisoned")
            .get_mut(&action)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(ExecutorResult::success);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl DeviceExecutor for RecordingExecutor {
    fn pair(&self, address: IpAddr, port: u16, password: &str) -> ExecutorResult {
        self.record(
            ExecutorAction::Pair,
            ExecutorCall::Pair {
                address,
                port,
                password: password.to_string(),
            },
        )
    }

    fn connect(&self, address: IpAddr, port: u16) -> ExecutorResult {
        self.record(ExecutorAction::Connect, ExecutorCall::Connect { address, port })
    }

    fn switch_mode(&self, port: u16) -> ExecutorResult {
        self.record(ExecutorAction::SwitchMode, ExecutorCall::SwitchMode { port })
    }
}
