use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::hash::Hash;
use std::path::Path;

use ordered_float::OrderedFloat;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::recency::RecencyQueue;
use crate::tree::{Bundle, BundleTree};
use crate::FastHashMap;

/// Hard failures of save/load. In-memory operations never error; only
/// file I/O and the wire encoding can.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode failure: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("decode failure: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

/// Unbounded trees persist this in the capacity slot.
const UNCAPPED: i64 = -1;

#[derive(Serialize, Deserialize)]
struct SavedBundle<T> {
    score: f64,
    items: Vec<T>,
    label: String,
}

/// On-disk image, fields in wire order: counters and flags, the reverse
/// index, the usage counter, the bundles highest score first (the Vec's
/// length prefix carries the bundle count), the queue, then the logger
/// configuration.
#[derive(Serialize, Deserialize)]
struct SavedTree<T> {
    size: u64,
    capped: bool,
    label: String,
    scores: Vec<(T, f64)>,
    queue_uses: Vec<(T, u64)>,
    bundles: Vec<SavedBundle<T>>,
    queue_cap: i64,
    queue_items: Vec<T>,
    log: crate::ChanLog,
}

impl<T> BundleTree<T>
where
    T: Clone + Eq + Hash + fmt::Debug + Serialize + DeserializeOwned,
{
    /// Encode the whole tree and write it to `path`. An encode failure
    /// writes nothing; a write failure leaves the target in whatever
    /// state the underlying storage guarantees.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), PersistError> {
        let bytes = bincode::serde::encode_to_vec(self.to_saved(), bincode::config::standard())?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Decode a tree previously written by [`save_to`](Self::save_to).
    ///
    /// Builds a fresh tree and returns it, so a failed load never
    /// mutates any live structure: callers swap the result in on `Ok`.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, PersistError> {
        let bytes = fs::read(path)?;
        let (saved, _): (SavedTree<T>, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard())?;
        Ok(Self::from_saved(saved))
    }

    fn to_saved(&self) -> SavedTree<T> {
        SavedTree {
            size: self.size as u64,
            capped: self.capped,
            label: self.label.clone(),
            scores: self
                .scores
                .iter()
                .map(|(item, score)| (item.clone(), *score))
                .collect(),
            queue_uses: self
                .queue_uses
                .iter()
                .map(|(item, n)| (item.clone(), *n as u64))
                .collect(),
            bundles: self
                .by_score
                .iter()
                .rev()
                .map(|(key, bundle)| SavedBundle {
                    score: key.0,
                    items: bundle.iter().cloned().collect(),
                    label: self.label.clone(),
                })
                .collect(),
            queue_cap: self
                .queue
                .capacity()
                .map_or(UNCAPPED, |c| c as i64),
            queue_items: self.queue.iter().cloned().collect(),
            log: self.log.clone(),
        }
    }

    /// Direct bulk rebuild. Bundles go straight into the score index
    /// without passing through `insert`, so the decoded bundle/score
    /// pairing is trusted as-is — unsound to feed with untrusted data.
    /// The queue is replayed through normal appends up to the recorded
    /// capacity.
    fn from_saved(saved: SavedTree<T>) -> Self {
        let mut by_score = BTreeMap::new();
        for sb in saved.bundles {
            by_score.insert(OrderedFloat(sb.score), Bundle::from_parts(sb.score, sb.items));
        }
        let scores: FastHashMap<T, f64> = saved.scores.into_iter().collect();
        let queue_uses: FastHashMap<T, usize> = saved
            .queue_uses
            .into_iter()
            .map(|(item, n)| (item, n as usize))
            .collect();
        let mut queue = if saved.queue_cap < 0 {
            RecencyQueue::unbounded()
        } else {
            RecencyQueue::bounded(saved.queue_cap as usize)
        };
        for item in saved.queue_items {
            if !queue.push_back(item) {
                break;
            }
        }
        Self {
            by_score,
            scores,
            queue,
            queue_uses,
            log: saved.log,
            size: saved.size as usize,
            capped: saved.capped,
            label: saved.label,
        }
    }
}
