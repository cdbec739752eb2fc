//! Device executor infrastructure.
//!
//! # Sub-modules
//!
//! - **`adb`** – the production [`DeviceExecutor`](crate::application::execute_device::DeviceExecutor)
//!   that shells out to the `adb` platform tool.
//! - **`mock`** – a recording executor with scripted results, used by unit and
//!   integration tests.

pub mod adb;
pub mod mock;

pub use adb::{AdbExecutor, CommandOutput, CommandRunner, ProcessRunner};
