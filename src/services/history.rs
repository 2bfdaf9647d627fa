use crate::types::PricePoint;
use std::collections::VecDeque;

/// Capacity-bounded, time-ordered price history.
///
/// Points are appended at the back; once full, the oldest point is evicted
/// from the front. Only the refresh loop owns and mutates the buffer.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    points: VecDeque<PricePoint>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a point, evicting the oldest entries beyond capacity.
    pub fn push(&mut self, point: PricePoint) {
        self.points.push_back(point);

        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    /// Append several points in order.
    pub fn extend<I: IntoIterator<Item = PricePoint>>(&mut self, points: I) {
        for point in points {
            self.push(point);
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.iter()
    }

    /// Read-only copy of the points, oldest first.
    pub fn snapshot(&self) -> Vec<PricePoint> {
        self.points.iter().cloned().collect()
    }

    /// Observed prices, oldest first.
    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }
}
