//! Deferred actions on a logical clock.
//!
//! Hosts never run timers for the gate. Instead the gate schedules
//! `Scheduled` records here and drains the due ones from `tick`. Each record
//! carries the epoch it was scheduled in so the consumer can discard actions
//! made stale by a later transition.

/// One pending action.
#[derive(Debug, Clone, PartialEq)]
pub struct Scheduled<A> {
    /// Logical time (seconds) at or after which the action fires.
    pub due: f64,
    pub epoch: u64,
    pub action: A,
}

#[derive(Debug, Clone)]
pub struct DeferredQueue<A> {
    pending: Vec<Scheduled<A>>,
}

impl<A> Default for DeferredQueue<A> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<A> DeferredQueue<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: f64, epoch: u64, action: A) {
        self.pending.push(Scheduled { due, epoch, action });
    }

    /// Remove and return every record with `due <= now`, ordered by due
    /// time. Records due at the same instant keep insertion order.
    pub fn drain_due(&mut self, now: f64) -> Vec<Scheduled<A>> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.pending)
                .into_iter()
                .partition(|s| s.due <= now);
        self.pending = rest;
        due.sort_by(|a, b| a.due.total_cmp(&b.due));
        due
    }

    /// Earliest pending due time.
    pub fn next_due(&self) -> Option<f64> {
        self.pending.iter().map(|s| s.due).min_by(f64::total_cmp)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
