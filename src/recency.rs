use std::collections::VecDeque;

/// FIFO touch-order queue, optionally capacity-bounded.
///
/// Oldest occurrence at the head, newest at the tail. The queue records
/// *occurrences*, not distinct items: touching an item twice leaves two
/// entries. Bounded-mode eviction in the tree pops the head before each
/// append once the queue is full.
#[derive(Clone, Debug)]
pub struct RecencyQueue<T> {
    items: VecDeque<T>,
    cap: Option<usize>,
}

impl<T> RecencyQueue<T> {
    pub fn bounded(cap: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(cap),
            cap: Some(cap),
        }
    }

    pub fn unbounded() -> Self {
        Self {
            items: VecDeque::new(),
            cap: None,
        }
    }

    #[inline]
    pub fn capacity(&self) -> Option<usize> {
        self.cap
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.cap.is_some_and(|c| self.items.len() >= c)
    }

    /// Append at the tail. Refused (returns false) when already full;
    /// callers pop first when they want rotation.
    pub fn push_back(&mut self, item: T) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push_back(item);
        true
    }

    /// Pop the oldest occurrence.
    pub fn pop_front(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Oldest-first traversal.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_refuses_push_when_full() {
        let mut q = RecencyQueue::bounded(2);
        assert!(q.push_back(1));
        assert!(q.push_back(2));
        assert!(q.is_full());
        assert!(!q.push_back(3));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn fifo_order() {
        let mut q = RecencyQueue::bounded(3);
        for x in [10, 20, 30] {
            assert!(q.push_back(x));
        }
        assert_eq!(q.pop_front(), Some(10));
        assert!(q.push_back(40));
        let seen: Vec<_> = q.iter().copied().collect();
        assert_eq!(seen, [20, 30, 40]);
    }

    #[test]
    fn unbounded_never_fills() {
        let mut q = RecencyQueue::unbounded();
        for x in 0..1000 {
            assert!(q.push_back(x));
        }
        assert!(!q.is_full());
        assert_eq!(q.capacity(), None);
        assert_eq!(q.len(), 1000);
    }

    #[test]
    fn zero_capacity_holds_nothing() {
        let mut q = RecencyQueue::bounded(0);
        assert!(q.is_full());
        assert!(!q.push_back(1));
        assert_eq!(q.pop_front(), None);
    }
}
