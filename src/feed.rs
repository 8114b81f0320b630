/// A price value.
///
/// Semantic alias for [`f64`]. Documents intent in function signatures
/// without introducing newtype construction overhead.
pub type Price = f64;

/// Bar open timestamp or sequence number.
///
/// Used for bar boundary detection and run mapping. Must be strictly
/// increasing along a feed.
pub type Timestamp = u64;

/// A point-in-time view of one bar of a feed.
///
/// Plain value type: feeds hand out copies so the engine never borrows
/// into host-owned storage. For a still-forming bar, `close` is the
/// latest price and `high`/`low` the extremes so far.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct BarSnapshot {
    /// Opening price of the bar.
    pub open: Price,
    /// Highest price during the bar.
    pub high: Price,
    /// Lowest price during the bar.
    pub low: Price,
    /// Closing (or latest) price of the bar.
    pub close: Price,
    /// Bar open timestamp.
    pub open_time: Timestamp,
}

impl BarSnapshot {
    /// Bar with all four prices equal. Convenient for close-only data.
    #[must_use]
    pub fn flat(price: Price, open_time: Timestamp) -> Self {
        Self {
            open: price,
            high: price,
            low: price,
            close: price,
            open_time,
        }
    }
}

/// An ordered, append-only sequence of bars owned by the host data feed.
///
/// Bars are indexed `0..len()` in chronological order with strictly
/// increasing open times. The engine only reads: per-pass bar lookups by
/// index plus the timestamp query [`index_by_time`](BarFeed::index_by_time)
/// that maps a fine-timeframe open time onto the upper-timeframe feed.
///
/// # Example
///
/// ```
/// use qqe_engine::{BarFeed, BarSnapshot};
///
/// let feed = vec![
///     BarSnapshot::flat(10.0, 100),
///     BarSnapshot::flat(11.0, 160),
///     BarSnapshot::flat(12.0, 220),
/// ];
///
/// assert_eq!(feed.bar(1).close, 11.0);
/// assert_eq!(feed.index_by_time(200), Some(1));
/// assert_eq!(feed.index_by_time(50), None);
/// ```
pub trait BarFeed {
    /// Number of bars currently in the feed.
    fn len(&self) -> usize;

    /// Returns the bar at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    fn bar(&self, index: usize) -> BarSnapshot;

    /// `true` when the feed holds no bars.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the most recent bar whose open time is at or before `time`,
    /// or `None` when every bar opens after `time` (or the feed is empty).
    ///
    /// Binary search over open times; feeds with cheaper lookups (fixed bar
    /// duration) may override.
    fn index_by_time(&self, time: Timestamp) -> Option<usize> {
        let mut lo = 0;
        let mut hi = self.len();

        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.bar(mid).open_time <= time {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }

        lo.checked_sub(1)
    }
}

impl BarFeed for Vec<BarSnapshot> {
    #[inline]
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    fn bar(&self, index: usize) -> BarSnapshot {
        self[index]
    }
}
