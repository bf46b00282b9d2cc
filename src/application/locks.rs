//! Bounded per-session lock registry.
//!
//! Serializes stage work per session: an overlapping operation on the same
//! session fails fast with `ConcurrencyConflict` instead of queueing. The
//! registry is bounded; entries are evicted on session completion and a
//! sweep drops unreferenced entries once the map outgrows its capacity.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::foundation::{DomainError, SessionId};

const DEFAULT_CAPACITY: usize = 1024;

/// Guard over one session's turn execution.
pub type SessionGuard = OwnedMutexGuard<()>;

/// Registry of per-session mutexes.
#[derive(Debug)]
pub struct SessionLocks {
    entries: StdMutex<HashMap<SessionId, Arc<Mutex<()>>>>,
    capacity: usize,
}

impl Default for SessionLocks {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl SessionLocks {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: StdMutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Acquires the session's lock without waiting.
    ///
    /// # Errors
    ///
    /// - `ConcurrencyConflict` if another operation holds the lock
    pub fn try_acquire(&self, session_id: SessionId) -> Result<SessionGuard, DomainError> {
        let entry = {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            if entries.len() >= self.capacity && !entries.contains_key(&session_id) {
                Self::sweep(&mut entries);
            }
            entries
                .entry(session_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        entry
            .try_lock_owned()
            .map_err(|_| DomainError::concurrency_conflict(session_id))
    }

    /// Drops a session's lock entry, typically on completion.
    ///
    /// A guard still held keeps the underlying mutex alive; only the
    /// registry entry goes away.
    pub fn evict(&self, session_id: SessionId) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(&session_id);
    }

    /// Removes entries nobody holds a guard or clone of.
    fn sweep(entries: &mut HashMap<SessionId, Arc<Mutex<()>>>) {
        entries.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    #[test]
    fn acquire_then_conflict_then_reacquire() {
        let locks = SessionLocks::default();
        let session_id = SessionId::new();

        let guard = locks.try_acquire(session_id).unwrap();
        let conflict = locks.try_acquire(session_id).unwrap_err();
        assert_eq!(conflict.code, ErrorCode::ConcurrencyConflict);

        drop(guard);
        assert!(locks.try_acquire(session_id).is_ok());
    }

    #[test]
    fn different_sessions_do_not_conflict() {
        let locks = SessionLocks::default();
        let _a = locks.try_acquire(SessionId::new()).unwrap();
        let _b = locks.try_acquire(SessionId::new()).unwrap();
    }

    #[test]
    fn evict_removes_the_entry() {
        let locks = SessionLocks::default();
        let session_id = SessionId::new();

        drop(locks.try_acquire(session_id).unwrap());
        assert_eq!(locks.len(), 1);

        locks.evict(session_id);
        assert_eq!(locks.len(), 0);
    }

    #[test]
    fn sweep_keeps_the_registry_bounded() {
        let locks = SessionLocks::new(4);
        for _ in 0..10 {
            drop(locks.try_acquire(SessionId::new()).unwrap());
        }
        // Unreferenced entries were swept as capacity was reached.
        assert!(locks.len() <= 4);
    }

    #[test]
    fn sweep_spares_held_locks() {
        let locks = SessionLocks::new(2);
        let held_id = SessionId::new();
        let guard = locks.try_acquire(held_id).unwrap();

        for _ in 0..5 {
            drop(locks.try_acquire(SessionId::new()).unwrap());
        }

        // The held entry survived every sweep.
        let conflict = locks.try_acquire(held_id);
        assert!(conflict.is_err());
        drop(guard);
    }
}
