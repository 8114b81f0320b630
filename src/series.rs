use crate::Price;

/// An append-only, index-addressable sequence of computed values.
///
/// One entry per bar index of the relevant timeframe. Entries that have not
/// been computed yet (warm-up, resampling gaps) read as NaN; writes past the
/// current end fill the gap with NaN. A calculation pass only ever writes at
/// its current index, so earlier entries are stable once their bar closes.
///
/// # Example
///
/// ```
/// use qqe_engine::Series;
///
/// let mut s = Series::new();
/// s.set(2, 50.0);
///
/// assert!(s.get(0).is_nan());
/// assert_eq!(s.get(2), 50.0);
/// assert!(s.get(10).is_nan()); // never written
/// ```
#[derive(Clone, Default, Debug)]
pub struct Series {
    values: Vec<Price>,
}

impl Series {
    /// Empty series.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots, including NaN gap fill.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` when nothing has been written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`, NaN when unset or out of range.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Price {
        self.values.get(index).copied().unwrap_or(f64::NAN)
    }

    /// `true` when the entry at `index` holds a computed value.
    #[must_use]
    pub fn is_defined(&self, index: usize) -> bool {
        !self.get(index).is_nan()
    }

    /// Writes `value` at `index`, growing the series with NaN as needed.
    /// Overwrites any previous value at that index.
    pub fn set(&mut self, index: usize, value: Price) {
        if index >= self.values.len() {
            self.values.resize(index + 1, f64::NAN);
        }
        self.values[index] = value;
    }

    /// Raw storage view. Unset entries are NaN.
    #[must_use]
    pub fn as_slice(&self) -> &[Price] {
        &self.values
    }

    /// Arithmetic mean of the `period` values ending at `end` (inclusive).
    ///
    /// Seeds the Wilder smoothers. NaN when the window reaches before index
    /// zero or touches any undefined entry, which is what lets the smoothers
    /// defer seeding until the window is fully populated.
    #[must_use]
    pub fn mean(&self, end: usize, period: usize) -> Price {
        debug_assert!(period > 0, "mean window must be non-empty");
        if end + 1 < period {
            return f64::NAN;
        }

        let mut sum = 0.0;
        for i in 0..period {
            sum += self.get(end - i);
        }

        #[allow(clippy::cast_precision_loss)]
        let divisor = period as f64;
        sum / divisor
    }
}
