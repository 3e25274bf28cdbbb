//! Bounded trail of recorded positions with explicit breaks.

use std::collections::VecDeque;

use crate::types::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrailEntry {
    Point(Point),
    /// Never connect across this marker.
    Break,
}

#[derive(Debug, Clone)]
pub struct TrailBuffer {
    entries: VecDeque<TrailEntry>,
    capacity: usize,
}

impl TrailBuffer {
    pub const DEFAULT_CAPACITY: usize = 5000;

    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append `point` unless it lies closer than `min_dist` to the previous
    /// recorded point. The first point after a break is always kept.
    pub fn record(&mut self, point: Point, min_dist: f64) -> bool {
        if !point.x.is_finite() || !point.y.is_finite() {
            return false;
        }
        if let Some(TrailEntry::Point(last)) = self.entries.back() {
            if last.distance(point) < min_dist {
                return false;
            }
        }
        self.entries.push_back(TrailEntry::Point(point));
        self.evict();
        true
    }

    pub fn push_break(&mut self) {
        if matches!(self.entries.back(), Some(TrailEntry::Point(_))) {
            self.entries.push_back(TrailEntry::Break);
            self.evict();
        }
    }

    fn evict(&mut self) {
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        while matches!(self.entries.front(), Some(TrailEntry::Break)) {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &TrailEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Connected runs of points, split at every break.
    pub fn segments(&self) -> Vec<Vec<Point>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for entry in &self.entries {
            match entry {
                TrailEntry::Point(p) => current.push(*p),
                TrailEntry::Break => {
                    if !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }
}

impl Default for TrailBuffer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_entries_are_evicted() {
        let mut trail = TrailBuffer::new(3);
        for i in 0..5 {
            trail.record(Point::new(i as f64 * 10.0, 0.0), 1.0);
        }
        let xs: Vec<f64> = trail
            .entries()
            .filter_map(|e| match e {
                TrailEntry::Point(p) => Some(p.x),
                TrailEntry::Break => None,
            })
            .collect();
        assert_eq!(xs, vec![20.0, 30.0, 40.0]);
    }

    #[test]
    fn leading_breaks_are_dropped_after_eviction() {
        let mut trail = TrailBuffer::new(2);
        trail.record(Point::new(0.0, 0.0), 1.0);
        trail.push_break();
        trail.record(Point::new(5.0, 0.0), 1.0);
        assert_eq!(trail.entries().next(), Some(&TrailEntry::Point(Point::new(5.0, 0.0))));
    }

    #[test]
    fn repeated_breaks_collapse() {
        let mut trail = TrailBuffer::default();
        trail.push_break();
        assert!(trail.is_empty());
        trail.record(Point::new(1.0, 1.0), 0.5);
        trail.push_break();
        trail.push_break();
        assert_eq!(trail.len(), 2);
    }
}
