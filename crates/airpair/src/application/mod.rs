//! Application layer use cases.
//!
//! # What is the "application" layer? (for beginners)
//!
//! The application layer sits between the domain types in `airpair-core` and
//! the infrastructure adapters (mDNS, `adb`, the terminal).  Code here:
//!
//! - **Orchestrates** domain objects to fulfil the user goal ("get this phone
//!   connected").
//! - **Depends on abstractions** ([`execute_device::DeviceExecutor`],
//!   [`route_discovery::ServiceLookup`], [`lifecycle::DiscoverySubscription`])
//!   so tests can swap the real adapters for recording doubles.
//! - **Contains no process spawning, sockets or terminal I/O.**
//!
//! # Sub-modules
//!
//! - **`orchestrate`** – the state machine that decides, per discovery event,
//!   whether to pair, connect or switch mode.
//! - **`route_discovery`** – turns raw discovery callbacks into domain events
//!   and feeds them to the state machine under its lock.
//! - **`lifecycle`** – waits for completion or Ctrl-C and tears discovery down.
//! - **`execute_device`** – the executor seam.

pub mod execute_device;
pub mod lifecycle;
pub mod orchestrate;
pub mod route_discovery;
