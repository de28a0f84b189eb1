//! Wall-clock one-shot tasks tied to a focus generation
//!
//! Every accepted focus request bumps the `Generation`. Tasks are never
//! cancelled explicitly: when they come due, a task whose generation is not
//! the current one is dropped instead of run. A superseded transition's
//! re-arm therefore can never re-target following onto the old body.

use std::fmt;
use std::time::Duration;

use tracing::debug;

/// Monotonic focus-request generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct ScheduledTask<T> {
    generation: Generation,
    due: Duration,
    payload: T,
}

/// Queue of delayed tasks driven by an explicit wall clock
#[derive(Debug, Clone)]
pub struct TaskQueue<T> {
    now: Duration,
    tasks: Vec<ScheduledTask<T>>,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            tasks: Vec::new(),
        }
    }

    /// Wall-clock time since the queue was created
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn advance(&mut self, dt: Duration) {
        self.now += dt;
    }

    /// Run `payload` after `delay`, but only if `generation` is still current then
    pub fn schedule(&mut self, delay: Duration, generation: Generation, payload: T) {
        self.tasks.push(ScheduledTask {
            generation,
            due: self.now + delay,
            payload,
        });
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Remove every task that has come due.
    ///
    /// Returns payloads of the `current` generation in due order (ties keep
    /// scheduling order); stale generations are discarded.
    pub fn take_due(&mut self, current: Generation) -> Vec<T> {
        let now = self.now;
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.tasks.drain(..).partition(|task| task.due <= now);
        self.tasks = pending;

        due.sort_by_key(|task| task.due);
        due.into_iter()
            .filter_map(|task| {
                if task.generation == current {
                    Some(task.payload)
                } else {
                    debug!(
                        "Discarding task from {} (current {})",
                        task.generation, current
                    );
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_fires_once_when_due() {
        let mut queue = TaskQueue::new();
        let generation = Generation(1);
        queue.schedule(Duration::from_millis(100), generation, "rearm");

        queue.advance(Duration::from_millis(99));
        assert!(queue.take_due(generation).is_empty());

        queue.advance(Duration::from_millis(1));
        assert_eq!(queue.take_due(generation), vec!["rearm"]);
        assert!(queue.take_due(generation).is_empty());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_zero_delay_is_due_immediately() {
        let mut queue = TaskQueue::new();
        queue.schedule(Duration::ZERO, Generation(3), 7);
        assert_eq!(queue.take_due(Generation(3)), vec![7]);
    }

    #[test]
    fn test_stale_generation_is_discarded() {
        let mut queue = TaskQueue::new();
        queue.schedule(Duration::from_millis(2500), Generation(1), "a");
        queue.advance(Duration::from_millis(100));
        queue.schedule(Duration::from_millis(2500), Generation(2), "b");

        queue.advance(Duration::from_millis(2400));
        assert!(queue.take_due(Generation(2)).is_empty());
        assert_eq!(queue.len(), 1);

        queue.advance(Duration::from_millis(100));
        assert_eq!(queue.take_due(Generation(2)), vec!["b"]);
    }

    #[test]
    fn test_due_order() {
        let mut queue = TaskQueue::new();
        queue.schedule(Duration::from_millis(30), Generation(0), 3);
        queue.schedule(Duration::from_millis(10), Generation(0), 1);
        queue.schedule(Duration::from_millis(20), Generation(0), 2);

        queue.advance(Duration::from_millis(50));
        assert_eq!(queue.take_due(Generation(0)), vec![1, 2, 3]);
    }

    #[test]
    fn test_generation_next() {
        assert_eq!(Generation::default().next(), Generation(1));
        assert_eq!(Generation(41).next().to_string(), "gen#42");
    }
}
