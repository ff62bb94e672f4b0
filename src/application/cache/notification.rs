//! Bounded, most-recent-first buffer of deposit notifications.

use std::collections::VecDeque;

use crate::port::inbound::agent::DepositNotification;

/// Default number of notifications retained.
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 50;

/// Ring of the newest deposit notifications.
#[derive(Debug)]
pub struct NotificationBuffer {
    items: VecDeque<DepositNotification>,
    capacity: usize,
}

impl NotificationBuffer {
    /// Create a buffer retaining at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add a notification at the front, dropping the oldest past capacity.
    pub fn push(&mut self, notification: DepositNotification) {
        self.items.push_front(notification);
        self.items.truncate(self.capacity);
    }

    /// Notifications, newest first.
    #[must_use]
    pub fn recent(&self) -> Vec<DepositNotification> {
        self.items.iter().cloned().collect()
    }

    /// Number of buffered notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Return `true` if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for NotificationBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_CAPACITY)
    }
}
