//! Delayed sub-events polled from the frame update.
//!
//! A `Schedule` keeps its own clock. Events are queued relative to "now"
//! and come back out of `advance` in time order once their moment has
//! passed, so timer-style choreography stays inside the single per-frame
//! call and remains deterministic.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct Schedule<E> {
    now: f64,
    queue: VecDeque<(f64, E)>,
}

impl<E> Default for Schedule<E> {
    fn default() -> Self {
        Self {
            now: 0.0,
            queue: VecDeque::new(),
        }
    }
}

impl<E> Schedule<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `event` to fire `delay` seconds from now. Events with equal
    /// times fire in insertion order.
    pub fn after(&mut self, delay: f64, event: E) {
        let delay = if delay.is_nan() { 0.0 } else { delay.max(0.0) };
        let at = self.now + delay;
        let index = self.queue.partition_point(|(t, _)| *t <= at);
        self.queue.insert(index, (at, event));
    }

    /// Move the clock forward and drain everything that is now due.
    pub fn advance(&mut self, dt: f64) -> Vec<E> {
        if dt > 0.0 {
            self.now += dt;
        }
        let mut due = Vec::new();
        while let Some((at, _)) = self.queue.front() {
            if *at > self.now + 1e-9 {
                break;
            }
            if let Some((_, event)) = self.queue.pop_front() {
                due.push(event);
            }
        }
        due
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
