use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub enum CoalescerState<T> {
    Idle,
    PendingUpdate { snapshot: T, due_at: Instant },
}

/// Debounces settings changes into a single preview regeneration.
///
/// Every `notify` replaces the pending snapshot and pushes the due time out;
/// `poll` hands the snapshot back once the due time has passed. Time is
/// passed in so the state machine can be driven by a simulated clock.
#[derive(Debug)]
pub struct PreviewCoalescer<T> {
    state: CoalescerState<T>,
    delay: Duration,
}

impl<T> PreviewCoalescer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            state: CoalescerState::Idle,
            delay,
        }
    }

    pub fn notify(&mut self, snapshot: T, now: Instant) {
        self.state = CoalescerState::PendingUpdate {
            snapshot,
            due_at: now + self.delay,
        };
    }

    /// Periodic tick. Returns the snapshot to regenerate with, if one is due,
    /// and goes back to `Idle`.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.state {
            CoalescerState::PendingUpdate { due_at, .. } if now >= *due_at => {
                match std::mem::replace(&mut self.state, CoalescerState::Idle) {
                    CoalescerState::PendingUpdate { snapshot, .. } => Some(snapshot),
                    CoalescerState::Idle => None,
                }
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, CoalescerState::PendingUpdate { .. })
    }

    pub fn state(&self) -> &CoalescerState<T> {
        &self.state
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(100);
    const TICK: Duration = Duration::from_millis(10);

    #[test]
    fn burst_of_changes_regenerates_once_with_last_snapshot() {
        let start = Instant::now();
        let mut coalescer = PreviewCoalescer::new(DELAY);

        // 5 changes within 50ms
        for i in 0..5u64 {
            coalescer.notify(i, start + Duration::from_millis(i * 10));
        }

        let mut regenerated = Vec::new();
        let mut now = start;
        while now <= start + Duration::from_millis(500) {
            regenerated.extend(coalescer.poll(now));
            now += TICK;
        }

        assert_eq!(regenerated, vec![4]);
        assert_eq!(coalescer.state(), &CoalescerState::Idle);
    }

    #[test]
    fn not_due_before_delay() {
        let start = Instant::now();
        let mut coalescer = PreviewCoalescer::new(DELAY);
        coalescer.notify("a", start);

        assert_eq!(coalescer.poll(start + Duration::from_millis(99)), None);
        assert!(coalescer.is_pending());
        assert_eq!(coalescer.poll(start + DELAY), Some("a"));
        assert!(!coalescer.is_pending());
        assert_eq!(coalescer.poll(start + DELAY * 2), None);
    }

    #[test]
    fn each_change_pushes_due_time_out() {
        let start = Instant::now();
        let mut coalescer = PreviewCoalescer::new(DELAY);
        coalescer.notify(1, start);
        coalescer.notify(2, start + Duration::from_millis(90));

        assert_eq!(coalescer.poll(start + Duration::from_millis(120)), None);
        assert_eq!(coalescer.poll(start + Duration::from_millis(190)), Some(2));
    }

    #[test]
    fn idle_poll_is_a_no_op() {
        let mut coalescer: PreviewCoalescer<u8> = PreviewCoalescer::new(DELAY);
        assert_eq!(coalescer.poll(Instant::now()), None);
        assert_eq!(coalescer.delay(), DELAY);
    }
}
