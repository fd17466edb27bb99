//! Bounded, score-ordered index.
//!
//! A [`BundleTree`] ranks opaque items by an `f64` score, merging items
//! that share a score into one [`Bundle`] per distinct score value. It
//! answers extremal and top-K queries over the ranking and, when built
//! bounded, evicts the least-recently-touched items once a fixed number
//! of distinct items is exceeded. Eviction is lazy and reference
//! counted: an item leaves the index only when its last outstanding
//! occurrence in the recency queue has been popped.
//!
//! The whole structure is single-threaded and exact; see [`BundleTree`]
//! for the operation contracts and [`PersistError`] for the only hard
//! failure mode (file persistence).

#![deny(clippy::uninlined_format_args)]
#![deny(clippy::to_string_in_format_args)]

use rustc_hash::FxHashMap;

pub type FastHashMap<K, V> = FxHashMap<K, V>;

mod chanlog;
mod format;
mod persist;
mod recency;
mod tree;

pub use chanlog::ChanLog;
pub use persist::PersistError;
pub use recency::RecencyQueue;
pub use tree::{Bundle, BundleTree};
