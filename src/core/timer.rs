use winsys::window::Window;

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::collections::HashMap;
use std::time::Duration;
use std::time::Instant;

pub type TimerId = u64;

/// Recurring timers never fire more often than this, so a re-armed
/// timer is always due after the expiry pass that re-armed it.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TimerKind {
    AutoRaise(Window),
}

#[derive(Debug, Copy, Clone)]
struct Timer {
    kind: TimerKind,
    deadline: Instant,
    interval: Option<Duration>,
}

/// Software timers ordered by deadline; equal deadlines fire in the
/// order they were started.
#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Reverse<(Instant, u64, TimerId)>>,
    timers: HashMap<TimerId, Timer>,
    next_seq: u64,
    next_id: TimerId,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            timers: HashMap::new(),
            next_seq: 0,
            next_id: 1,
        }
    }

    fn schedule(
        &mut self,
        id: TimerId,
        deadline: Instant,
    ) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse((deadline, seq, id)));
    }

    pub fn start(
        &mut self,
        kind: TimerKind,
        delay: Duration,
        recurring: bool,
    ) -> TimerId {
        self.start_at(Instant::now(), kind, delay, recurring)
    }

    pub fn start_at(
        &mut self,
        now: Instant,
        kind: TimerKind,
        delay: Duration,
        recurring: bool,
    ) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;

        let deadline = now + delay;
        self.timers.insert(id, Timer {
            kind,
            deadline,
            interval: if recurring {
                Some(std::cmp::max(delay, MIN_INTERVAL))
            } else {
                None
            },
        });

        self.schedule(id, deadline);
        trace!("started timer {} for {:?} in {:?}", id, kind, delay);
        id
    }

    /// Stale heap entries of stopped timers are skipped lazily.
    pub fn stop(
        &mut self,
        id: TimerId,
    ) -> bool {
        self.timers.remove(&id).is_some()
    }

    #[inline]
    pub fn is_timing(
        &self,
        id: TimerId,
    ) -> bool {
        self.timers.contains_key(&id)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    fn prune(&mut self) {
        while let Some(&Reverse((deadline, _, id))) = self.heap.peek() {
            match self.timers.get(&id) {
                Some(timer) if timer.deadline == deadline => break,
                _ => {
                    self.heap.pop();
                },
            }
        }
    }

    /// Time left until the soonest live timer fires, if any is running.
    pub fn timeout(
        &mut self,
        now: Instant,
    ) -> Option<Duration> {
        self.prune();

        self.heap
            .peek()
            .map(|&Reverse((deadline, ..))| deadline.saturating_duration_since(now))
    }

    /// Removes every timer that is due and returns what each was for.
    /// Recurring timers are re-armed relative to `now`.
    pub fn expire(
        &mut self,
        now: Instant,
    ) -> Vec<TimerKind> {
        let mut expired = Vec::new();

        loop {
            self.prune();

            let id = match self.heap.peek() {
                Some(&Reverse((deadline, _, id))) if deadline <= now => id,
                _ => break,
            };

            self.heap.pop();

            if let Some(timer) = self.timers.get_mut(&id) {
                expired.push(timer.kind);

                match timer.interval {
                    Some(interval) => {
                        timer.deadline = now + interval;
                        let deadline = timer.deadline;
                        self.schedule(id, deadline);
                    },
                    None => {
                        self.timers.remove(&id);
                    },
                }
            }
        }

        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_in_deadline_order_with_stable_ties() {
        let mut timers = TimerQueue::new();
        let now = Instant::now();

        timers.start_at(now, TimerKind::AutoRaise(3), Duration::from_millis(30), false);
        timers.start_at(now, TimerKind::AutoRaise(1), Duration::from_millis(10), false);
        timers.start_at(now, TimerKind::AutoRaise(2), Duration::from_millis(10), false);

        assert_eq!(timers.timeout(now), Some(Duration::from_millis(10)));
        assert_eq!(timers.expire(now + Duration::from_millis(5)), vec![]);

        assert_eq!(timers.expire(now + Duration::from_millis(40)), vec![
            TimerKind::AutoRaise(1),
            TimerKind::AutoRaise(2),
            TimerKind::AutoRaise(3),
        ]);

        assert!(timers.is_empty());
        assert_eq!(timers.timeout(now), None);
    }

    #[test]
    fn stopped_timers_never_fire() {
        let mut timers = TimerQueue::new();
        let now = Instant::now();

        let id = timers.start_at(now, TimerKind::AutoRaise(1), Duration::from_millis(10), false);
        timers.start_at(now, TimerKind::AutoRaise(2), Duration::from_millis(20), false);

        assert!(timers.is_timing(id));
        assert!(timers.stop(id));
        assert!(!timers.is_timing(id));
        assert!(!timers.stop(id));

        assert_eq!(timers.timeout(now), Some(Duration::from_millis(20)));
        assert_eq!(timers.expire(now + Duration::from_millis(50)), vec![
            TimerKind::AutoRaise(2)
        ]);
    }

    #[test]
    fn recurring_timers_are_rearmed() {
        let mut timers = TimerQueue::new();
        let now = Instant::now();

        let id = timers.start_at(now, TimerKind::AutoRaise(1), Duration::from_millis(10), true);
        let later = now + Duration::from_millis(15);

        assert_eq!(timers.expire(later), vec![TimerKind::AutoRaise(1)]);
        assert!(timers.is_timing(id));
        assert_eq!(timers.timeout(later), Some(Duration::from_millis(10)));
    }

    #[test]
    fn zero_interval_timers_fire_once_per_pass() {
        let mut timers = TimerQueue::new();
        let now = Instant::now();

        timers.start_at(now, TimerKind::AutoRaise(1), Duration::from_millis(0), true);

        assert_eq!(timers.expire(now), vec![TimerKind::AutoRaise(1)]);
        assert_eq!(timers.timeout(now), Some(MIN_INTERVAL));
        assert_eq!(timers.expire(now + MIN_INTERVAL), vec![TimerKind::AutoRaise(1)]);
    }

    #[test]
    fn overdue_timers_have_zero_timeout() {
        let mut timers = TimerQueue::new();
        let now = Instant::now();

        timers.start_at(now, TimerKind::AutoRaise(1), Duration::from_millis(10), false);
        assert_eq!(
            timers.timeout(now + Duration::from_secs(1)),
            Some(Duration::from_millis(0))
        );
    }
}
