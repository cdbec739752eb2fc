//! Ordered record of connect-service ports seen so far.
//!
//! Ports are used first-seen, first-used.  The queue is never reordered or
//! deduplicated: a device that re-announces the same port simply appears
//! twice.  There is no capacity bound.
//!
//! The queue is not synchronized on its own; the orchestrator owns it and
//! only touches it while holding its lock.

use std::collections::VecDeque;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortQueue {
    ports: VecDeque<u16>,
}

impl PortQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a port to the back of the queue.
    pub fn push(&mut self, port: u16) {
        self.ports.push_back(port);
    }

    /// Removes and returns the earliest-pushed port.
    pub fn pop_front(&mut self) -> Option<u16> {
        self.ports.pop_front()
    }

    /// Returns the earliest-pushed port without removing it.
    pub fn front(&self) -> Option<u16> {
        self.ports.front().copied()
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Iterates ports in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.ports.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_starts_empty() {
        let queue = PortQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.front(), None);
    }

    #[test]
    fn test_pop_front_on_empty_queue_is_none() {
        let mut queue = PortQueue::new();
        assert_eq!(queue.pop_front(), None);
    }

    #[test]
    fn test_ports_are_consumed_in_arrival_order() {
        // Arrange
        let mut queue = PortQueue::new();
        queue.push(40000);
        queue.push(41000);
        queue.push(42000);

        // Act / Assert
        assert_eq!(queue.pop_front(), Some(40000));
        assert_eq!(queue.pop_front(), Some(41000));
        assert_eq!(queue.pop_front(), Some(42000));
        assert_eq!(queue.pop_front(), None);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut queue = PortQueue::new();
        queue.push(40000);
        queue.push(40000);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.iter().collect::<Vec<_>>(), vec![40000, 40000]);
    }

    #[test]
    fn test_front_does_not_consume() {
        let mut queue = PortQueue::new();
        queue.push(40000);
        assert_eq!(queue.front(), Some(40000));
        assert_eq!(queue.len(), 1);
    }
}
