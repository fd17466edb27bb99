use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

use ordered_float::OrderedFloat;
use smallvec::SmallVec;

use crate::chan_log;
use crate::chanlog::ChanLog;
use crate::format::{fmt_f64, with_fmt_buf};
use crate::recency::RecencyQueue;
use crate::FastHashMap;

/// The set of items currently sharing one score.
///
/// A bundle lives in the score index iff its item set is non-empty, and
/// its `score` always equals the key it is stored under. Iteration order
/// within a bundle is arbitrary and not guaranteed stable across calls.
#[derive(Clone, Debug)]
pub struct Bundle<T> {
    score: f64,
    items: SmallVec<[T; 4]>,
}

impl<T: Eq> Bundle<T> {
    pub(crate) fn new(score: f64) -> Self {
        Self {
            score,
            items: SmallVec::new(),
        }
    }

    #[inline]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.iter().any(|x| x == item)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Add without duplicating; returns false when already present.
    pub(crate) fn insert(&mut self, item: T) -> bool {
        if self.contains(&item) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Rebuild a bundle from decoded parts, trusting the caller that the
    /// items really belong at `score`. Bulk-load path only.
    pub(crate) fn from_parts(score: f64, items: Vec<T>) -> Self {
        Self {
            score,
            items: SmallVec::from_vec(items),
        }
    }

    pub(crate) fn remove(&mut self, item: &T) -> bool {
        match self.items.iter().position(|x| x == item) {
            Some(pos) => {
                self.items.swap_remove(pos);
                true
            }
            None => false,
        }
    }
}

impl<T: Eq + fmt::Debug> Bundle<T> {
    /// `[<score>: item, item, ...]`, items prefixed with the tree label.
    pub(crate) fn render(&self, label: &str) -> String {
        let mut joined = String::new();
        for item in &self.items {
            if !joined.is_empty() {
                joined.push_str(", ");
            }
            joined.push_str(&render_item(label, item));
        }
        with_fmt_buf(|b| format!("[{}: {joined}]", fmt_f64(b, self.score)))
    }
}

fn render_item<T: fmt::Debug>(label: &str, item: &T) -> String {
    if label.is_empty() {
        format!("{item:?}")
    } else {
        format!("<{label} {item:?}>")
    }
}

/// Score-ordered index over opaque items, with tied scores merged into
/// [`Bundle`]s and, in bounded mode, lazy recency-based eviction.
///
/// Three containers move together: the ordered score index, the
/// item-to-score reverse index, and (bounded mode only) the recency
/// queue with its per-item occurrence counter. Items are tracked by
/// identity only; the tree never looks inside them.
///
/// Single-threaded by design. Shared access requires one external lock
/// around the whole tree.
#[derive(Debug)]
pub struct BundleTree<T> {
    pub(crate) by_score: BTreeMap<OrderedFloat<f64>, Bundle<T>>,
    pub(crate) scores: FastHashMap<T, f64>,
    pub(crate) queue: RecencyQueue<T>,
    pub(crate) queue_uses: FastHashMap<T, usize>,
    pub(crate) log: ChanLog,
    pub(crate) size: usize,
    pub(crate) capped: bool,
    pub(crate) label: String,
}

impl<T> BundleTree<T>
where
    T: Clone + Eq + Hash + fmt::Debug,
{
    /// A tree holding at most `capacity` distinct items, give or take the
    /// lazy-eviction slack: an item stays indexed while any queue
    /// occurrence still references it.
    pub fn bounded(capacity: usize, log: ChanLog, label: impl Into<String>) -> Self {
        Self {
            by_score: BTreeMap::new(),
            scores: FastHashMap::default(),
            queue: RecencyQueue::bounded(capacity),
            queue_uses: FastHashMap::default(),
            log,
            size: 0,
            capped: true,
            label: label.into(),
        }
    }

    /// A tree with no capacity bound; the recency queue is never used.
    pub fn unbounded(log: ChanLog, label: impl Into<String>) -> Self {
        Self {
            by_score: BTreeMap::new(),
            scores: FastHashMap::default(),
            queue: RecencyQueue::unbounded(),
            queue_uses: FastHashMap::default(),
            log,
            size: 0,
            capped: false,
            label: label.into(),
        }
    }

    /// Insert `item` at `score`, or move it there if it is already
    /// tracked at a different score. Re-inserting at the current score
    /// changes nothing in the index but still counts as a touch.
    ///
    /// In bounded mode, returns the item popped from the recency queue
    /// during this call when the queue was full — whether or not that pop
    /// evicted anything from the index. `None` otherwise.
    pub fn insert(&mut self, item: T, score: f64) -> Option<T> {
        let key = OrderedFloat(score);
        let old = self.scores.get(&item).map(|s| OrderedFloat(*s));
        let same = old == Some(key);

        if let Some(old_key) = old {
            if !same {
                self.remove(&item, old_key.0);
            }
        }
        if !same {
            self.size += 1;
        }

        let label = &self.label;
        let bundle = self
            .by_score
            .entry(key)
            .or_insert_with(|| Bundle::new(score));
        if self.log.wants("tree") {
            chan_log!(
                self.log,
                "tree",
                "adding {} to bundle {}",
                render_item(label, &item),
                bundle.render(label)
            );
        }
        bundle.insert(item.clone());
        self.scores.insert(item.clone(), score);

        let evicted = if self.capped { self.touch(item) } else { None };

        debug_assert_eq!(self.size, self.scores.len());
        self.show();
        evicted
    }

    /// Remove `item` from the bundle at exactly `score`.
    ///
    /// Returns false — and changes nothing — when no bundle exists at
    /// that score or the bundle does not contain the item; a stale score
    /// is not an error. The recency queue and occurrence counter are
    /// deliberately left alone: queued occurrences of a removed item stay
    /// queued, and a later overflow pop finds it untracked and skips the
    /// index-removal step.
    pub fn remove(&mut self, item: &T, score: f64) -> bool {
        let key = OrderedFloat(score);
        let bundle = match self.by_score.get_mut(&key) {
            Some(b) => b,
            None => return false,
        };
        if !bundle.remove(item) {
            return false;
        }
        self.size -= 1;
        self.scores.remove(item);
        if bundle.is_empty() {
            self.by_score.remove(&key);
        }
        if self.log.wants("tree_remove") {
            let rendered = with_fmt_buf(|b| fmt_f64(b, score).to_owned());
            chan_log!(
                self.log,
                "tree_remove",
                "removed {} at score {rendered}",
                render_item(&self.label, item)
            );
        }
        debug_assert_eq!(self.size, self.scores.len());
        true
    }

    /// An arbitrary item from the highest-score bundle; `None` when
    /// empty. Which member of a tied bundle comes back is unspecified.
    pub fn max_item(&self) -> Option<&T> {
        self.by_score.last_key_value().and_then(|(_, b)| b.iter().next())
    }

    /// An arbitrary item from the lowest-score bundle; `None` when empty.
    pub fn min_item(&self) -> Option<&T> {
        self.by_score.first_key_value().and_then(|(_, b)| b.iter().next())
    }

    /// True when `item` ranks within the top `n` positions by score,
    /// counting whole bundles: a bundle is never split, so an item tied
    /// with the n-th item counts even when its bundle overflows `n`.
    pub fn in_top_items(&self, item: &T, n: usize) -> bool {
        let mut seen = 0usize;
        for bundle in self.by_score.values().rev() {
            if seen >= n {
                break;
            }
            for candidate in bundle.iter() {
                seen += 1;
                if candidate == item {
                    return true;
                }
            }
        }
        false
    }

    #[inline]
    pub fn contains(&self, item: &T) -> bool {
        self.scores.contains_key(item)
    }

    /// The item's tracked score, `None` when untracked.
    #[inline]
    pub fn score(&self, item: &T) -> Option<f64> {
        self.scores.get(item).copied()
    }

    /// Number of distinct tracked items.
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline]
    pub fn is_capped(&self) -> bool {
        self.capped
    }

    /// Recency-queue capacity; `None` when unbounded.
    #[inline]
    pub fn capacity(&self) -> Option<usize> {
        self.queue.capacity()
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Unordered snapshot view of the full item-to-score mapping.
    pub fn items(&self) -> impl Iterator<Item = (&T, f64)> {
        self.scores.iter().map(|(item, score)| (item, *score))
    }

    /// Descending-score traversal across bundles.
    pub fn iter(&self) -> impl Iterator<Item = (&T, f64)> {
        self.by_score
            .iter()
            .rev()
            .flat_map(|(score, bundle)| bundle.iter().map(move |item| (item, score.0)))
    }

    /// Outstanding occurrences of `item` in the recency queue.
    pub fn queue_uses(&self, item: &T) -> usize {
        self.queue_uses.get(item).copied().unwrap_or(0)
    }

    /// Record a touch: count the occurrence, rotate the queue if full,
    /// and lazily evict the popped head — but only once its occurrence
    /// count hits zero and it is still indexed.
    fn touch(&mut self, item: T) -> Option<T> {
        *self.queue_uses.entry(item.clone()).or_insert(0) += 1;
        if self.log.wants("tree_deque") {
            chan_log!(self.log, "tree_deque", "queue append {item:?}");
        }

        let mut oldest = None;
        if self.queue.is_full() {
            if let Some(popped) = self.queue.pop_front() {
                let remaining = match self.queue_uses.get_mut(&popped) {
                    Some(n) => {
                        *n -= 1;
                        let left = *n;
                        if left == 0 {
                            self.queue_uses.remove(&popped);
                        }
                        left
                    }
                    None => 0,
                };
                if remaining == 0 {
                    if let Some(score) = self.scores.get(&popped).copied() {
                        if self.log.wants("tree_deque") {
                            chan_log!(self.log, "tree_deque", "evicting oldest {popped:?}");
                        }
                        self.remove(&popped, score);
                    }
                }
                oldest = Some(popped);
            }
        }
        if !self.queue.push_back(item.clone()) {
            // capacity zero: nothing is retained, undo the count
            if let Some(n) = self.queue_uses.get_mut(&item) {
                *n -= 1;
                if *n == 0 {
                    self.queue_uses.remove(&item);
                }
            }
        }
        oldest
    }

    /// Dump every bundle, highest score first, on the `tree_show`
    /// channel. All formatting is skipped when the channel is off.
    pub fn show(&self) {
        if !self.log.wants("tree_show") {
            return;
        }
        chan_log!(self.log, "tree_show", "tree dump:");
        for bundle in self.by_score.values().rev() {
            chan_log!(self.log, "tree_show", "{}", bundle.render(&self.label));
        }
    }

    /// Dump the recency queue, oldest first, on the `tree_show` channel.
    pub fn show_queue(&self) {
        if !self.log.wants("tree_show") {
            return;
        }
        let mut line = String::from("queue dump:");
        for item in self.queue.iter() {
            line.push(' ');
            line.push_str(&format!("{item:?}"));
        }
        chan_log!(self.log, "tree_show", "{line}");
    }
}
