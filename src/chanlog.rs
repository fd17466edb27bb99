use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Channel-gated diagnostic logger.
///
/// Every trace point in the tree names a channel (`tree`, `tree_remove`,
/// `tree_deque`, `tree_show`). An event is emitted only when the global
/// flag AND that channel's flag are both on; otherwise the call is free.
/// Emission goes through [`tracing`] at DEBUG level, so a host process
/// controls the actual sink with its usual subscriber setup.
///
/// The configuration is plain data and serializes alongside the tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChanLog {
    global: bool,
    channels: BTreeMap<String, bool>,
}

impl ChanLog {
    /// A logger with the global switch set; no channels enabled yet.
    pub fn new(global: bool) -> Self {
        Self {
            global,
            channels: BTreeMap::new(),
        }
    }

    /// Fully silent logger.
    pub fn off() -> Self {
        Self::new(false)
    }

    pub fn set_global(&mut self, on: bool) {
        self.global = on;
    }

    /// Channel names are case-insensitive; stored lowercased.
    pub fn set_channel(&mut self, channel: &str, on: bool) {
        self.channels.insert(channel.to_ascii_lowercase(), on);
    }

    pub fn set_channels<'a, I>(&mut self, channels: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for c in channels {
            self.set_channel(c, true);
        }
    }

    /// True when an event on `channel` would actually be emitted. Callers
    /// with expensive message construction check this first.
    #[inline]
    pub fn wants(&self, channel: &str) -> bool {
        self.global
            && self
                .channels
                .get(&channel.to_ascii_lowercase())
                .copied()
                .unwrap_or(false)
    }

    /// Fire-and-forget: never fails, never alters caller state.
    pub fn log(&self, channel: &str, args: fmt::Arguments<'_>) {
        if self.wants(channel) {
            tracing::debug!(channel, "{}", args);
        }
    }
}

/// `chan_log!(logger, "tree_deque", "evicting {:?}", item)`
#[macro_export]
macro_rules! chan_log {
    ($logger:expr, $channel:expr, $($arg:tt)*) => {
        $logger.log($channel, format_args!($($arg)*))
    };
}
