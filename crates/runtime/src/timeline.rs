use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use foundation::time::Time;
use tracing::trace;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimelineId(pub u64);

/// A repeating timeline: restarts from progress 0 every `period_s` seconds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Timeline {
    pub period_s: f64,
    pub started_at: Time,
}

impl Timeline {
    pub fn sample(&self, id: TimelineId, now: Time) -> TimelineSample {
        if self.period_s <= 0.0 {
            return TimelineSample {
                id,
                cycle: 0,
                progress: 0.0,
            };
        }
        let cycles = now.since(self.started_at) / self.period_s;
        TimelineSample {
            id,
            cycle: cycles.floor() as u64,
            progress: cycles.fract(),
        }
    }
}

/// Position of a timeline at some instant.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TimelineSample {
    pub id: TimelineId,
    /// Completed cycles since the timeline started.
    pub cycle: u64,
    /// Progress through the current cycle, in `[0, 1)`.
    pub progress: f64,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    timelines: BTreeMap<TimelineId, Timeline>,
}

/// Host-side animation scheduler for single-threaded surfaces.
///
/// Timelines never finish on their own. Each one is owned by the
/// [`TimelineGuard`] returned from [`AnimationScheduler::start_repeating`] and
/// is removed from the scheduler when that guard is dropped.
#[derive(Debug, Clone, Default)]
pub struct AnimationScheduler {
    registry: Rc<RefCell<Registry>>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_repeating(&self, period_s: f64, now: Time) -> TimelineGuard {
        let mut reg = self.registry.borrow_mut();
        let id = TimelineId(reg.next_id);
        reg.next_id = reg.next_id.wrapping_add(1);
        reg.timelines.insert(
            id,
            Timeline {
                period_s,
                started_at: now,
            },
        );
        trace!(timeline = id.0, period_s, "timeline started");
        TimelineGuard {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    pub fn active_count(&self) -> usize {
        self.registry.borrow().timelines.len()
    }

    /// Samples every live timeline at `now`, in ascending id order.
    pub fn tick(&self, now: Time) -> Vec<TimelineSample> {
        self.registry
            .borrow()
            .timelines
            .iter()
            .map(|(id, t)| t.sample(*id, now))
            .collect()
    }
}

/// Cancellation token for one timeline. Dropping it stops the timeline.
#[derive(Debug)]
pub struct TimelineGuard {
    id: TimelineId,
    registry: Weak<RefCell<Registry>>,
}

impl TimelineGuard {
    pub fn id(&self) -> TimelineId {
        self.id
    }

    /// Returns `None` once the scheduler itself is gone.
    pub fn sample(&self, now: Time) -> Option<TimelineSample> {
        let reg = self.registry.upgrade()?;
        let reg = reg.borrow();
        reg.timelines.get(&self.id).map(|t| t.sample(self.id, now))
    }
}

impl Drop for TimelineGuard {
    fn drop(&mut self) {
        if let Some(reg) = self.registry.upgrade() {
            if reg.borrow_mut().timelines.remove(&self.id).is_some() {
                trace!(timeline = self.id.0, "timeline cancelled");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AnimationScheduler;
    use foundation::time::Time;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() <= 1e-9, "expected {a} ~= {b}");
    }

    #[test]
    fn repeating_timeline_restarts_each_period() {
        let sched = AnimationScheduler::new();
        let guard = sched.start_repeating(1.5, Time(0.0));

        let s = guard.sample(Time(0.75)).unwrap();
        assert_eq!(s.cycle, 0);
        assert_close(s.progress, 0.5);

        let s = guard.sample(Time(1.5)).unwrap();
        assert_eq!(s.cycle, 1);
        assert_close(s.progress, 0.0);

        let s = guard.sample(Time(4.875)).unwrap();
        assert_eq!(s.cycle, 3);
        assert_close(s.progress, 0.25);
    }

    #[test]
    fn sampling_before_start_is_at_origin() {
        let sched = AnimationScheduler::new();
        let guard = sched.start_repeating(1.5, Time(2.0));
        let s = guard.sample(Time(1.0)).unwrap();
        assert_eq!(s.cycle, 0);
        assert_close(s.progress, 0.0);
    }

    #[test]
    fn dropping_guard_cancels_timeline() {
        let sched = AnimationScheduler::new();
        let a = sched.start_repeating(1.5, Time(0.0));
        let b = sched.start_repeating(1.5, Time(0.0));
        assert_eq!(sched.active_count(), 2);

        drop(a);
        assert_eq!(sched.active_count(), 1);

        let ids: Vec<_> = sched.tick(Time(1.0)).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![b.id()]);

        drop(b);
        assert_eq!(sched.active_count(), 0);
        assert!(sched.tick(Time(2.0)).is_empty());
    }

    #[test]
    fn guard_outliving_scheduler_is_inert() {
        let sched = AnimationScheduler::new();
        let guard = sched.start_repeating(1.0, Time(0.0));
        drop(sched);
        assert!(guard.sample(Time(0.5)).is_none());
    }
}
