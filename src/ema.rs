use crate::{Price, Timestamp};

/// Exponential moving average over a derived value stream (the RSI line).
///
/// Standard smoothing factor `α = 2 / (length + 1)`:
///
/// ```text
/// EMA = α × value + (1 − α) × prev_EMA
/// ```
///
/// The first `length` inputs are averaged into an SMA seed; after that the
/// recurrence runs with O(1) state. Inputs carry the open time of the bar
/// they were derived from: an unchanged open time repaints the current bar,
/// recomputing from the previous closed EMA without advancing.
#[derive(Clone, Debug)]
pub(crate) struct Ema {
    length: usize,
    alpha: f64,
    length_reciprocal: f64,
    in_seed: bool,
    sum: f64,
    seen: usize,
    last_input: f64,
    previous: f64,
    current: Option<Price>,
    last_open_time: Option<Timestamp>,
}

impl Ema {
    pub(crate) fn new(length: usize) -> Self {
        debug_assert!(length > 0, "EMA length must be at least 1");

        Self {
            length,
            #[allow(clippy::cast_precision_loss)]
            alpha: 2.0 / (length + 1) as f64,
            #[allow(clippy::cast_precision_loss)]
            length_reciprocal: 1.0 / length as f64,
            in_seed: true,
            sum: 0.0,
            seen: 0,
            last_input: 0.0,
            previous: 0.0,
            current: None,
            last_open_time: None,
        }
    }

    pub(crate) fn compute(&mut self, value: Price, open_time: Timestamp) -> Option<Price> {
        debug_assert!(
            self.last_open_time.is_none_or(|t| t <= open_time),
            "open_time must be non-decreasing: last={}, got={open_time}",
            self.last_open_time.unwrap_or(0),
        );

        let is_next_bar = self.last_open_time.is_none_or(|t| t < open_time);
        self.last_open_time = Some(open_time);

        if self.in_seed && is_next_bar && self.seen >= self.length {
            self.in_seed = false;
        }

        if self.in_seed {
            if is_next_bar {
                self.seen += 1;
                self.sum += value;
            } else {
                self.sum += value - self.last_input;
            }
            self.last_input = value;

            self.current = (self.seen >= self.length).then(|| self.sum * self.length_reciprocal);
        } else {
            if is_next_bar {
                self.previous = self
                    .current
                    .expect("EMA value must be Some after the seeding phase");
            }

            self.current = Some(self.alpha.mul_add(value - self.previous, self.previous));
        }

        self.current
    }

    #[inline]
    pub(crate) fn value(&self) -> Option<Price> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod seeding {
        use super::*;

        #[test]
        fn none_during_seeding() {
            let mut ema = Ema::new(3);
            assert_eq!(ema.compute(10.0, 1), None);
            assert_eq!(ema.compute(20.0, 2), None);
        }

        #[test]
        fn first_value_is_sma_seed() {
            let mut ema = Ema::new(3);
            ema.compute(2.0, 1);
            ema.compute(4.0, 2);
            // (2 + 4 + 6) / 3 = 4.0
            assert_eq!(ema.compute(6.0, 3), Some(4.0));
        }

        #[test]
        fn repaint_during_seeding() {
            let mut ema = Ema::new(3);
            ema.compute(2.0, 1);
            ema.compute(5.0, 1); // repaint bar 1
            ema.compute(4.0, 2);
            // (5 + 4 + 6) / 3 = 5.0
            assert_eq!(ema.compute(6.0, 3), Some(5.0));
        }
    }

    mod computation {
        use super::*;

        #[test]
        fn applies_formula_after_seed() {
            // EMA(3): α = 0.5
            let mut ema = Ema::new(3);
            ema.compute(2.0, 1);
            ema.compute(4.0, 2);
            ema.compute(6.0, 3); // seed = 4.0
            // 8 * 0.5 + 4.0 * 0.5 = 6.0
            assert_eq!(ema.compute(8.0, 4), Some(6.0));
        }

        #[test]
        fn continues_computation() {
            let mut ema = Ema::new(3);
            ema.compute(2.0, 1);
            ema.compute(4.0, 2);
            ema.compute(6.0, 3); // seed = 4.0
            ema.compute(8.0, 4); // 6.0
            // 10 * 0.5 + 6.0 * 0.5 = 8.0
            assert_eq!(ema.compute(10.0, 5), Some(8.0));
        }

        #[test]
        fn constant_input_converges() {
            let mut ema = Ema::new(3);
            for i in 1..=20 {
                ema.compute(50.0, i);
            }
            assert_eq!(ema.compute(50.0, 21), Some(50.0));
        }

        #[test]
        fn ema_2_alpha_is_two_thirds() {
            // seed [3, 6] → SMA = 4.5; bar 3: 9 * 2/3 + 4.5 * 1/3 = 7.5
            let mut ema = Ema::new(2);
            ema.compute(3.0, 1);
            ema.compute(6.0, 2);
            assert_eq!(ema.compute(9.0, 3), Some(7.5));
        }
    }

    mod repaint {
        use super::*;

        #[test]
        fn recomputes_from_prev_ema() {
            let mut ema = Ema::new(3);
            ema.compute(2.0, 1);
            ema.compute(4.0, 2);
            ema.compute(6.0, 3); // seed = 4.0
            ema.compute(8.0, 4); // 6.0
            // Repaint bar 4: 12 * 0.5 + 4.0 * 0.5 = 8.0
            assert_eq!(ema.compute(12.0, 4), Some(8.0));
        }

        #[test]
        fn advance_after_repaint() {
            let mut ema = Ema::new(3);
            ema.compute(2.0, 1);
            ema.compute(4.0, 2);
            ema.compute(6.0, 3); // seed = 4.0
            ema.compute(8.0, 4); // 6.0
            ema.compute(10.0, 4); // repaint: 10*0.5 + 4*0.5 = 7.0
            // prev_ema = 7.0 (repainted): 12 * 0.5 + 7.0 * 0.5 = 9.5
            assert_eq!(ema.compute(12.0, 5), Some(9.5));
        }

        #[test]
        fn seed_bar_repaint_then_advance() {
            let mut ema = Ema::new(3);
            ema.compute(2.0, 1);
            ema.compute(4.0, 2);
            ema.compute(6.0, 3); // seed = 4.0
            ema.compute(9.0, 3); // repaint seed bar → (2+4+9)/3 = 5.0
            assert_eq!(ema.value(), Some(5.0));
            // 7 * 0.5 + 5.0 * 0.5 = 6.0
            assert_eq!(ema.compute(7.0, 4), Some(6.0));
        }
    }

    mod window_size_one {
        use super::*;

        #[test]
        fn always_equals_latest_input() {
            // EMA(1): α = 1.0
            let mut ema = Ema::new(1);
            assert_eq!(ema.compute(42.0, 1), Some(42.0));
            assert_eq!(ema.compute(20.0, 2), Some(20.0));
            assert_eq!(ema.compute(5.0, 3), Some(5.0));
        }
    }

    mod value_accessor {
        use super::*;

        #[test]
        fn none_before_seed() {
            let ema = Ema::new(3);
            assert_eq!(ema.value(), None);
        }

        #[test]
        fn matches_last_compute() {
            let mut ema = Ema::new(2);
            ema.compute(2.0, 1);
            let computed = ema.compute(4.0, 2);
            assert_eq!(ema.value(), computed);
        }
    }
}
