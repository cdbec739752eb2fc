//! Domain entities for airpair.
//!
//! Pure data types and rules with no infrastructure dependencies.  Code in the
//! application and infrastructure layers depends on these modules; they never
//! depend back.

pub mod config;
pub mod credential;
pub mod events;
pub mod executor;

/// FIFO of connect-service ports; see [`port_queue::PortQueue`].
pub mod port_queue;
