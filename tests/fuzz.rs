use bundletree::{BundleTree, ChanLog};
use quickcheck::quickcheck;
use std::collections::HashMap;

quickcheck! {
    fn size_matches_distinct_items(ops: Vec<(u8, f64)>) -> bool {
        let mut t = BundleTree::unbounded(ChanLog::off(), "");
        let mut model: HashMap<u8, f64> = HashMap::new();
        for (item, score) in ops {
            if score.is_nan() {
                continue;
            }
            assert_eq!(t.insert(item, score), None);
            model.insert(item, score);
        }
        t.len() == model.len() && model.iter().all(|(k, v)| t.score(k) == Some(*v))
    }

    fn reinsert_at_current_score_is_idempotent(ops: Vec<(u8, f64)>) -> bool {
        let mut t = BundleTree::unbounded(ChanLog::off(), "");
        for (item, score) in &ops {
            if !score.is_nan() {
                t.insert(*item, *score);
            }
        }
        let before = t.len();
        let tracked: Vec<u8> = t.items().map(|(i, _)| *i).collect();
        for item in &tracked {
            let current = t.score(item).unwrap();
            t.insert(*item, current);
        }
        t.len() == before
    }

    fn extremal_items_dominate(ops: Vec<(u16, f64)>) -> bool {
        let mut t = BundleTree::unbounded(ChanLog::off(), "");
        for (item, score) in ops {
            if !score.is_nan() {
                t.insert(item, score);
            }
        }
        match (t.max_item(), t.min_item()) {
            (None, None) => t.is_empty(),
            (Some(max), Some(min)) => {
                let hi = t.score(max).unwrap();
                let lo = t.score(min).unwrap();
                t.items().all(|(_, s)| lo <= s && s <= hi)
            }
            _ => false,
        }
    }

    fn top_items_honors_rank_with_ties(ops: Vec<(u8, i8)>, n: usize) -> bool {
        let n = n % 16;
        let mut t = BundleTree::unbounded(ChanLog::off(), "");
        for (item, score) in &ops {
            t.insert(*item, f64::from(*score));
        }
        let scores: Vec<f64> = t.items().map(|(_, s)| s).collect();
        // an item ranks in the top n iff fewer than n items score
        // strictly higher; its own tied bundle is never split
        let ok = t.items().all(|(item, score)| {
            let better = scores.iter().filter(|s| **s > score).count();
            t.in_top_items(item, n) == (better < n)
        });
        ok
    }

    fn distinct_single_inserts_keep_the_last_c(items: Vec<u16>) -> bool {
        let cap = 3usize;
        let mut t = BundleTree::bounded(cap, ChanLog::off(), "");
        let mut distinct: Vec<u16> = Vec::new();
        for item in items {
            if distinct.contains(&item) {
                continue;
            }
            t.insert(item, f64::from(item));
            distinct.push(item);
        }
        let survivors: Vec<u16> = distinct.iter().rev().take(cap).copied().collect();
        t.len() == survivors.len() && survivors.iter().all(|s| t.contains(s))
    }

    fn indexed_items_keep_queue_references(ops: Vec<(u8, f64)>) -> bool {
        let mut t = BundleTree::bounded(4, ChanLog::off(), "");
        for (item, score) in ops {
            if score.is_nan() {
                continue;
            }
            t.insert(item, score);
            // lazy eviction only fires at a zero count, so every indexed
            // item must still hold at least one queue occurrence
            let referenced = (0..=u8::MAX).filter(|i| t.queue_uses(i) > 0).count();
            assert!(t.len() <= referenced);
        }
        true
    }
}
