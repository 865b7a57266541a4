use std::collections::VecDeque;

use crate::config::HISTORY_LEN;

/// Fixed-capacity history, oldest first. Pushing past capacity drops the head.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingWindow<T> {
    values: VecDeque<T>,
    cap: usize,
}

impl<T> RollingWindow<T> {
    pub fn new(cap: usize) -> Self {
        Self { values: VecDeque::with_capacity(cap + 1), cap }
    }

    pub fn push(&mut self, value: T) {
        self.values.push_back(value);
        if self.values.len() > self.cap {
            self.values.pop_front();
        }
    }

    pub fn latest(&self) -> Option<&T> { self.values.back() }
    pub fn len(&self) -> usize { self.values.len() }
    pub fn is_empty(&self) -> bool { self.values.is_empty() }
    pub fn capacity(&self) -> usize { self.cap }
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ { self.values.iter() }
}

impl<T: Clone> RollingWindow<T> {
    /// A window already holding `cap` copies of `value`.
    pub fn filled(cap: usize, value: T) -> Self {
        let mut w = Self::new(cap);
        w.values.extend(std::iter::repeat(value).take(cap));
        w
    }
}

impl<T> Default for RollingWindow<T> {
    fn default() -> Self { Self::new(HISTORY_LEN) }
}

impl RollingWindow<f64> {
    /// `[index, value]` pairs for plotting, index 0 being the oldest sample.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.values.iter().enumerate().map(|(i, v)| [i as f64, *v]).collect()
    }

    pub fn latest_or_zero(&self) -> f64 { self.latest().copied().unwrap_or(0.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_exceeds_capacity() {
        let mut w = RollingWindow::new(50);
        for i in 0..200 {
            w.push(i);
            assert!(w.len() <= 50);
        }
        assert_eq!(w.len(), 50);
    }

    #[test]
    fn evicts_oldest_after_overflow() {
        let mut w = RollingWindow::new(50);
        for i in 1..=51 {
            w.push(i);
        }
        let held: Vec<i32> = w.iter().copied().collect();
        assert_eq!(held, (2..=51).collect::<Vec<_>>());
        assert_eq!(w.latest(), Some(&51));
    }

    #[test]
    fn filled_window_is_at_capacity() {
        let w = RollingWindow::filled(50, 0.0);
        assert_eq!(w.len(), 50);
        assert!(w.iter().all(|v| *v == 0.0));
        assert_eq!(w.points()[49], [49.0, 0.0]);
    }

    #[test]
    fn empty_window_latest_defaults_to_zero() {
        let w: RollingWindow<f64> = RollingWindow::default();
        assert!(w.is_empty());
        assert_eq!(w.capacity(), 50);
        assert_eq!(w.latest_or_zero(), 0.0);
    }
}
