//! Process-wide agent state, owned explicitly.
//!
//! Every store the agent mutates lives here behind `parking_lot` locks and is
//! shared through an `Arc<AgentSession>`. Locks are never held across an
//! `.await`.

use std::collections::HashSet;

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::cache::{NotificationBuffer, PositionBoundsCache, ValidationStore};
use crate::domain::{AgentIdentity, DepositId};

/// Shared state for one running agent.
#[derive(Debug)]
pub struct AgentSession {
    /// Bounds of open positions.
    bounds: RwLock<PositionBoundsCache>,
    /// Validation records created by this process.
    validations: RwLock<ValidationStore>,
    /// Identity, resolved once.
    identity: RwLock<Option<AgentIdentity>>,
    /// Recent deposit notifications.
    notifications: RwLock<NotificationBuffer>,
    /// Last block scanned by the reconciliation loop.
    watermark: RwLock<Option<u64>>,
    /// Deposits currently being processed (prevents overlapping passes).
    in_flight: Mutex<HashSet<DepositId>>,
}

impl AgentSession {
    /// Create a session whose notification buffer keeps `notification_capacity` entries.
    #[must_use]
    pub fn new(notification_capacity: usize) -> Self {
        Self {
            bounds: RwLock::new(PositionBoundsCache::new()),
            validations: RwLock::new(ValidationStore::new()),
            identity: RwLock::new(None),
            notifications: RwLock::new(NotificationBuffer::new(notification_capacity)),
            watermark: RwLock::new(None),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Get read access to the bounds cache.
    pub fn bounds(&self) -> RwLockReadGuard<'_, PositionBoundsCache> {
        self.bounds.read()
    }

    /// Get write access to the bounds cache.
    pub fn bounds_mut(&self) -> RwLockWriteGuard<'_, PositionBoundsCache> {
        self.bounds.write()
    }

    /// Get read access to the validation store.
    pub fn validations(&self) -> RwLockReadGuard<'_, ValidationStore> {
        self.validations.read()
    }

    /// Get write access to the validation store.
    pub fn validations_mut(&self) -> RwLockWriteGuard<'_, ValidationStore> {
        self.validations.write()
    }

    /// Cached identity, if resolved.
    #[must_use]
    pub fn identity(&self) -> Option<AgentIdentity> {
        self.identity.read().clone()
    }

    /// Cache the resolved identity.
    pub fn set_identity(&self, identity: AgentIdentity) {
        *self.identity.write() = Some(identity);
    }

    /// Get read access to the notification buffer.
    pub fn notifications(&self) -> RwLockReadGuard<'_, NotificationBuffer> {
        self.notifications.read()
    }

    /// Get write access to the notification buffer.
    pub fn notifications_mut(&self) -> RwLockWriteGuard<'_, NotificationBuffer> {
        self.notifications.write()
    }

    /// Last scanned block.
    #[must_use]
    pub fn watermark(&self) -> Option<u64> {
        *self.watermark.read()
    }

    /// Advance the watermark.
    pub fn set_watermark(&self, height: u64) {
        *self.watermark.write() = Some(height);
    }

    /// Claim a deposit for processing.
    ///
    /// Returns `None` if the deposit is already being processed. The claim is
    /// released when the returned guard drops.
    pub fn try_begin(&self, deposit_id: DepositId) -> Option<InFlightGuard<'_>> {
        if self.in_flight.lock().insert(deposit_id) {
            Some(InFlightGuard {
                session: self,
                deposit_id,
            })
        } else {
            None
        }
    }

    /// Return `true` if the deposit is being processed.
    #[must_use]
    pub fn is_in_flight(&self, deposit_id: DepositId) -> bool {
        self.in_flight.lock().contains(&deposit_id)
    }
}

impl Default for AgentSession {
    fn default() -> Self {
        Self::new(super::cache::notification::DEFAULT_NOTIFICATION_CAPACITY)
    }
}

/// Releases a deposit's in-flight claim on drop.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    session: &'a AgentSession,
    deposit_id: DepositId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.session.in_flight.lock().remove(&self.deposit_id);
    }
}
