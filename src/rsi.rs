use crate::{Price, Timestamp};

#[derive(Clone, Debug)]
enum RsiPhase {
    Seeding {
        sum_gain: f64,
        sum_loss: f64,
        prev_gain: f64,
        prev_loss: f64,
        seen_bars: usize,
    },
    Active {
        prev_avg_gain: f64,
        prev_avg_loss: f64,
        avg_gain: f64,
        avg_loss: f64,
    },
}

/// Relative Strength Index with Wilder's smoothing, fed one close per bar.
///
/// The first `length` price changes are averaged with a simple mean (SMA
/// seed); afterwards gains and losses are smoothed with `α = 1 / length`:
///
/// ```text
/// avg_gain = (prev_avg_gain × (length − 1) + gain) / length
/// avg_loss = (prev_avg_loss × (length − 1) + loss) / length
/// RSI      = 100 × avg_gain / (avg_gain + avg_loss)
/// ```
///
/// Output is `None` until `length + 1` bars have been seen. Feeding a bar
/// with an unchanged `open_time` repaints: the previous state is reapplied
/// to the new close without advancing, so a still-forming coarse bar can be
/// recomputed any number of times.
#[derive(Clone, Debug)]
pub(crate) struct Rsi {
    length: usize,
    phase: RsiPhase,
    prev_price: f64,
    cur_price: f64,
    current: Option<Price>,
    last_open_time: Option<Timestamp>,
    length_reciprocal: f64,
    length_minus_one: f64,
}

impl Rsi {
    pub(crate) fn new(length: usize) -> Self {
        debug_assert!(length > 0, "RSI length must be at least 1");

        Self {
            length,
            phase: RsiPhase::Seeding {
                sum_gain: 0.0,
                sum_loss: 0.0,
                prev_gain: 0.0,
                prev_loss: 0.0,
                seen_bars: 0,
            },
            prev_price: 0.0,
            cur_price: 0.0,
            current: None,
            last_open_time: None,
            #[allow(clippy::cast_precision_loss)]
            length_reciprocal: 1.0 / length as f64,
            #[allow(clippy::cast_precision_loss)]
            length_minus_one: (length - 1) as f64,
        }
    }

    pub(crate) fn compute(&mut self, close: Price, open_time: Timestamp) -> Option<Price> {
        debug_assert!(
            self.last_open_time.is_none_or(|t| t <= open_time),
            "open_time must be non-decreasing: last={}, got={open_time}",
            self.last_open_time.unwrap_or(0),
        );

        let is_next_bar = self.last_open_time.is_none_or(|t| t < open_time);

        if is_next_bar {
            self.prev_price = self.cur_price;
            self.last_open_time = Some(open_time);
        }
        self.cur_price = close;

        self.current = match &mut self.phase {
            RsiPhase::Seeding {
                sum_gain,
                sum_loss,
                prev_gain,
                prev_loss,
                seen_bars,
            } if *seen_bars <= self.length => {
                if is_next_bar {
                    // First bar has no previous price, so no change yet.
                    if *seen_bars > 0 {
                        (*prev_gain, *prev_loss) = Self::gain_and_loss(self.prev_price, close);
                        *sum_gain += *prev_gain;
                        *sum_loss += *prev_loss;
                    }

                    *seen_bars += 1;
                } else if *seen_bars > 1 {
                    let (gain, loss) = Self::gain_and_loss(self.prev_price, close);

                    *sum_gain = *sum_gain - *prev_gain + gain;
                    *sum_loss = *sum_loss - *prev_loss + loss;
                    *prev_gain = gain;
                    *prev_loss = loss;
                }

                if *seen_bars > self.length {
                    Some(Self::rsi_from_averages(
                        *sum_gain * self.length_reciprocal,
                        *sum_loss * self.length_reciprocal,
                    ))
                } else {
                    None
                }
            }

            // seen_bars > length: repaint of the transition bar, or advance
            // into the Wilder recurrence.
            RsiPhase::Seeding {
                sum_gain,
                sum_loss,
                prev_gain,
                prev_loss,
                ..
            } => {
                if is_next_bar {
                    let prev_avg_gain = *sum_gain * self.length_reciprocal;
                    let prev_avg_loss = *sum_loss * self.length_reciprocal;

                    let (gain, loss) = Self::gain_and_loss(self.prev_price, close);

                    let avg_gain =
                        prev_avg_gain.mul_add(self.length_minus_one, gain) * self.length_reciprocal;
                    let avg_loss =
                        prev_avg_loss.mul_add(self.length_minus_one, loss) * self.length_reciprocal;

                    self.phase = RsiPhase::Active {
                        prev_avg_gain,
                        prev_avg_loss,
                        avg_gain,
                        avg_loss,
                    };

                    Some(Self::rsi_from_averages(avg_gain, avg_loss))
                } else {
                    let (gain, loss) = Self::gain_and_loss(self.prev_price, close);

                    *sum_gain = *sum_gain - *prev_gain + gain;
                    *sum_loss = *sum_loss - *prev_loss + loss;
                    *prev_gain = gain;
                    *prev_loss = loss;

                    Some(Self::rsi_from_averages(
                        *sum_gain * self.length_reciprocal,
                        *sum_loss * self.length_reciprocal,
                    ))
                }
            }

            RsiPhase::Active {
                prev_avg_gain,
                prev_avg_loss,
                avg_gain,
                avg_loss,
            } => {
                if is_next_bar {
                    *prev_avg_gain = *avg_gain;
                    *prev_avg_loss = *avg_loss;
                }

                let (gain, loss) = Self::gain_and_loss(self.prev_price, close);

                *avg_gain =
                    prev_avg_gain.mul_add(self.length_minus_one, gain) * self.length_reciprocal;
                *avg_loss =
                    prev_avg_loss.mul_add(self.length_minus_one, loss) * self.length_reciprocal;

                Some(Self::rsi_from_averages(*avg_gain, *avg_loss))
            }
        };

        self.current
    }

    #[inline]
    pub(crate) fn value(&self) -> Option<Price> {
        self.current
    }

    #[inline]
    fn gain_and_loss(prev_price: Price, price: Price) -> (Price, Price) {
        let change = price - prev_price;
        (change.max(0.0), (-change).max(0.0))
    }

    #[inline]
    fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
        let sum = avg_gain + avg_loss;
        if sum == 0.0 {
            50.0
        } else {
            100.0 * avg_gain / sum
        }
    }
}
