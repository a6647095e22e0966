//! Balance write serialization.
//!
//! Every local coin movement is mirrored to the store as a full balance
//! replacement. Writes are issued one at a time; while one is in flight,
//! later movements wait in a queue and read the local balance only when
//! they are dispatched, so the last write always carries the latest value.
//!
//! The synchronizer is "synced" when nothing is in flight or queued. Remote
//! pushes arriving while it is not synced are dropped by the session, so a
//! stale echo cannot overwrite a local movement the store has not seen yet.
//!
//! The in-flight movement stays here rather than travelling with the write,
//! so its outcome can be applied even if the write task dies.

use std::collections::VecDeque;

#[derive(Debug)]
pub struct BalanceSynchronizer<M> {
    in_flight: Option<M>,
    queued: VecDeque<M>,
}

impl<M> Default for BalanceSynchronizer<M> {
    fn default() -> Self {
        Self {
            in_flight: None,
            queued: VecDeque::new(),
        }
    }
}

impl<M> BalanceSynchronizer<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether remote pushes may be applied.
    pub fn is_synced(&self) -> bool {
        self.in_flight.is_none()
    }

    /// Record a local movement. Returns `true` if it is now in flight and a
    /// write should be dispatched for it.
    pub fn enqueue(&mut self, mutation: M) -> bool {
        if self.in_flight.is_some() {
            self.queued.push_back(mutation);
            return false;
        }
        self.in_flight = Some(mutation);
        true
    }

    /// Resolve the in-flight write (successfully or not) and return its
    /// movement. The next queued movement, if any, becomes in flight and
    /// leaves the synchronizer unsynced.
    pub fn complete(&mut self) -> Option<M> {
        let finished = self.in_flight.take();
        self.in_flight = self.queued.pop_front();
        finished
    }

    /// Forget all writes, for example on teardown.
    pub fn clear(&mut self) {
        self.in_flight = None;
        self.queued.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_write() {
        let mut sync = BalanceSynchronizer::new();
        assert!(sync.is_synced());
        assert!(sync.enqueue("debit"));
        assert!(!sync.is_synced());
        assert_eq!(sync.complete(), Some("debit"));
        assert!(sync.is_synced());
        assert_eq!(sync.complete(), None);
    }

    #[test]
    fn test_writes_are_serialized() {
        let mut sync = BalanceSynchronizer::new();
        assert!(sync.enqueue(1));
        assert!(!sync.enqueue(2));
        assert!(!sync.enqueue(3));

        assert_eq!(sync.complete(), Some(1));
        assert!(!sync.is_synced());
        assert_eq!(sync.complete(), Some(2));
        assert!(!sync.is_synced());
        assert_eq!(sync.complete(), Some(3));
        assert!(sync.is_synced());
    }

    #[test]
    fn test_clear() {
        let mut sync = BalanceSynchronizer::new();
        sync.enqueue(1);
        sync.enqueue(2);
        sync.clear();
        assert!(sync.is_synced());
        assert_eq!(sync.complete(), None);
        assert!(sync.enqueue(3));
    }
}
