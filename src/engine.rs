use tracing::{debug, warn};

use crate::{
    config::QqeConfig,
    ema::Ema,
    feed::{BarFeed, Timestamp},
    rsi::Rsi,
    series::Series,
    sink::{Alert, Marker, MarkerKind, SignalSink},
};

const RSI_PERIOD: usize = 14;
const WILDERS_PERIOD: usize = 2 * RSI_PERIOD - 1;
#[allow(clippy::cast_precision_loss)]
const WILDERS_ALPHA: f64 = 2.0 / (WILDERS_PERIOD + 1) as f64;
const DAR_MULTIPLIER: f64 = 4.236;

/// Per-channel alert deduplication state.
///
/// The first qualifying event after startup only arms the watermark; it is
/// never sent, so attaching to a chart mid-history cannot spam stale alerts.
/// Subsequent events send only when strictly later than the stored time.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum AlertWatermark {
    Idle,
    Armed(Timestamp),
    Fired(Timestamp),
}

impl AlertWatermark {
    /// Records a qualifying event at `event_time`; `true` means send.
    fn observe(&mut self, event_time: Timestamp) -> bool {
        match *self {
            Self::Idle => {
                *self = Self::Armed(event_time);
                false
            }
            Self::Armed(t) | Self::Fired(t) if event_time > t => {
                *self = Self::Fired(event_time);
                true
            }
            Self::Armed(_) | Self::Fired(_) => false,
        }
    }
}

/// Streaming QQE (Qualitative Quantitative Estimation) engine.
///
/// One instance per configured (symbol, timeframe, upper-timeframe) tuple.
/// The driver calls [`calculate`](Self::calculate) once per bar event in
/// non-decreasing fine-index order; the engine maintains the RSI MA and
/// trailing "Smoothed" lines incrementally and pushes crossover/level
/// signals into the supplied [`SignalSink`].
///
/// The pipeline runs five stages per pass: coarse index mapping (when an
/// upper timeframe resamples the feed), RSI(14) plus an EMA of RSI, the
/// double Wilder-smoothed volatility of that line, the 4.236-scaled
/// adaptive trailing level, and signal detection over completed runs.
/// Every stage leaves its series entries undefined (NaN) until its own
/// warm-up completes; there are no error states.
pub struct QqeEngine {
    config: QqeConfig,
    resample: bool,
    rsi: Rsi,
    rsi_ema: Ema,
    /// Coarse-indexed intermediate series.
    rsi_ma_coarse: Series,
    atr_rsi: Series,
    ma_atr_rsi: Series,
    ma_atr_rsi_wilders: Series,
    trailing_coarse: Series,
    /// Published fine-indexed outputs.
    rsi_ma: Series,
    trailing: Series,
    ci_zero: Option<usize>,
    seeded_ma_atr: Option<usize>,
    seeded_wilders: Option<usize>,
    prev_index: Option<usize>,
    cross_watermark: AlertWatermark,
    level_watermark: AlertWatermark,
}

impl QqeEngine {
    /// Creates an engine for `config`.
    ///
    /// A configured upper timeframe that is not strictly coarser than the
    /// native one is downgraded to no resampling with a log advisory.
    #[must_use]
    pub fn new(config: QqeConfig) -> Self {
        let resample = match config.upper_timeframe() {
            Some(upper) if upper > config.timeframe() => true,
            Some(upper) => {
                warn!(
                    native = %config.timeframe(),
                    upper = %upper,
                    "upper timeframe is not coarser than native, resampling disabled"
                );
                false
            }
            None => false,
        };
        let rsi_ema = Ema::new(config.smoothing_factor());

        Self {
            config,
            resample,
            rsi: Rsi::new(RSI_PERIOD),
            rsi_ema,
            rsi_ma_coarse: Series::new(),
            atr_rsi: Series::new(),
            ma_atr_rsi: Series::new(),
            ma_atr_rsi_wilders: Series::new(),
            trailing_coarse: Series::new(),
            rsi_ma: Series::new(),
            trailing: Series::new(),
            ci_zero: None,
            seeded_ma_atr: None,
            seeded_wilders: None,
            prev_index: None,
            cross_watermark: AlertWatermark::Idle,
            level_watermark: AlertWatermark::Idle,
        }
    }

    /// Engine configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &QqeConfig {
        &self.config
    }

    /// `true` while upper-timeframe resampling is active.
    #[inline]
    #[must_use]
    pub fn is_resampling(&self) -> bool {
        self.resample
    }

    /// The published RSI MA line, addressable by fine bar index.
    #[inline]
    #[must_use]
    pub fn rsi_ma(&self) -> &Series {
        &self.rsi_ma
    }

    /// The published trailing "Smoothed" line, addressable by fine bar index.
    #[inline]
    #[must_use]
    pub fn trailing_level(&self) -> &Series {
        &self.trailing
    }

    /// Processes the bar event at fine index `index`.
    ///
    /// `upper` supplies the coarse feed when resampling is configured; a
    /// missing upper feed downgrades the engine to no resampling. Repeated
    /// calls for the same index repaint the still-forming bar.
    pub fn calculate<F: BarFeed, S: SignalSink>(
        &mut self,
        bars: &F,
        upper: Option<&F>,
        index: usize,
        sink: &mut S,
    ) {
        debug_assert!(index < bars.len(), "bar index out of range");
        debug_assert!(
            self.prev_index.is_none_or(|p| p <= index),
            "fine index must be non-decreasing: last={}, got={index}",
            self.prev_index.unwrap_or(0),
        );
        self.prev_index = Some(index);

        if self.resample && upper.is_none() {
            warn!(
                native = %self.config.timeframe(),
                "no upper feed supplied, resampling disabled"
            );
            self.resample = false;
        }
        let upper = if self.resample { upper } else { None };

        let fine = bars.bar(index);
        let (ci, coarse) = match upper {
            Some(feed) => {
                let Some(ci) = feed.index_by_time(fine.open_time) else {
                    return;
                };
                (ci, feed.bar(ci))
            }
            None => (index, fine),
        };
        let ci_zero = *self.ci_zero.get_or_insert(ci);

        // RSI and its EMA consume every coarse bar, warm-up gates or not.
        // Repeated fine bars of one run repaint the same coarse input.
        if let Some(rsi) = self.rsi.compute(coarse.close, coarse.open_time) {
            if let Some(rsi_ma) = self.rsi_ema.compute(rsi, coarse.open_time) {
                self.rsi_ma_coarse.set(ci, rsi_ma);
            }
        }

        let sf = self.config.smoothing_factor();
        if ci <= ci_zero + sf {
            return;
        }

        // Run length: consecutive fine bars ending here with the same
        // coarse index. 1 when not resampling.
        let mut cnt = 1;
        if let Some(feed) = upper {
            while cnt <= index && feed.index_by_time(bars.bar(index - cnt).open_time) == Some(ci) {
                cnt += 1;
            }
        }

        self.rsi_ma.set(index, self.rsi_ma_coarse.get(ci));
        self.atr_rsi.set(
            ci,
            (self.rsi_ma_coarse.get(ci - 1) - self.rsi_ma_coarse.get(ci)).abs(),
        );

        if ci <= ci_zero + sf + WILDERS_PERIOD + 1 {
            return;
        }
        Self::smooth_wilders(&self.atr_rsi, &mut self.ma_atr_rsi, &mut self.seeded_ma_atr, ci);

        if ci <= ci_zero + sf + 2 * WILDERS_PERIOD {
            return;
        }
        Self::smooth_wilders(
            &self.ma_atr_rsi,
            &mut self.ma_atr_rsi_wilders,
            &mut self.seeded_wilders,
            ci,
        );

        let tr = self.trail(ci);
        self.trailing_coarse.set(ci, tr);
        self.trailing.set(index, tr);

        // Fan the coarse result out over the rest of the current run.
        for back in 1..cnt {
            self.rsi_ma.set(index - back, self.rsi_ma.get(index));
            self.trailing.set(index - back, self.trailing.get(index));
        }

        // `recent` is the last bar of the previous run, `older` the last
        // bar of the run before it. Detectors only look at completed runs.
        let Some(recent) = index.checked_sub(cnt) else {
            return;
        };
        let mut cnt_prev = cnt + 1;
        if let Some(feed) = upper {
            let Some(prev_ci) = feed.index_by_time(bars.bar(recent).open_time) else {
                return;
            };
            while cnt_prev <= index
                && feed.index_by_time(bars.bar(index - cnt_prev).open_time) == Some(prev_ci)
            {
                cnt_prev += 1;
            }
        }
        let Some(older) = index.checked_sub(cnt_prev) else {
            return;
        };

        self.detect_signals(bars, index, cnt, recent, older, sink);
    }

    /// Removes this engine's chart objects. Call once at indicator stop.
    pub fn teardown<S: SignalSink>(&self, sink: &mut S) {
        if self.config.markers_on_crossover() || self.config.markers_on_level() {
            sink.remove_markers(self.config.object_prefix());
        }
    }

    /// Wilder smoothing of `source` into `target` at coarse index `ci`.
    ///
    /// The first value is the arithmetic mean of the trailing window; after
    /// that the recurrence applies, except when the previous value is
    /// undefined, which re-seeds from a fresh mean window (self-healing).
    /// A repaint of the seeded bar keeps the original seed.
    fn smooth_wilders(
        source: &Series,
        target: &mut Series,
        seeded: &mut Option<usize>,
        ci: usize,
    ) {
        let value = match *seeded {
            None => {
                *seeded = Some(ci);
                source.mean(ci, WILDERS_PERIOD)
            }
            Some(s) if s < ci => {
                let prev = target.get(ci - 1);
                if prev.is_nan() {
                    debug!(ci, "previous smoothed value undefined, re-seeding");
                    source.mean(ci, WILDERS_PERIOD)
                } else {
                    WILDERS_ALPHA.mul_add(source.get(ci) - prev, prev)
                }
            }
            Some(_) => return,
        };
        target.set(ci, value);
    }

    /// One-sided ratchet of the trailing level at coarse index `ci`.
    fn trail(&self, ci: usize) -> f64 {
        let dar = self.ma_atr_rsi_wilders.get(ci) * DAR_MULTIPLIER;
        let rsi0 = self.rsi_ma_coarse.get(ci);
        let rsi1 = self.rsi_ma_coarse.get(ci - 1);
        let prev = self.trailing_coarse.get(ci - 1);
        let tr_prev = if prev.is_nan() { 0.0 } else { prev };

        if rsi0 < tr_prev {
            let tr = rsi0 + dar;
            // Trailing from above: never jump back up through the level.
            if rsi1 < tr_prev && tr > tr_prev { tr_prev } else { tr }
        } else if rsi0 > tr_prev {
            let tr = rsi0 - dar;
            if rsi1 > tr_prev && tr < tr_prev { tr_prev } else { tr }
        } else {
            tr_prev
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn detect_signals<F: BarFeed, S: SignalSink>(
        &mut self,
        bars: &F,
        index: usize,
        cnt: usize,
        recent: usize,
        older: usize,
        sink: &mut S,
    ) {
        let rsi_recent = self.rsi_ma.get(recent);
        let rsi_older = self.rsi_ma.get(older);
        let trail_recent = self.trailing.get(recent);
        let trail_older = self.trailing.get(older);
        let level = f64::from(self.config.alert_level());

        // Strict inequalities on both sides; NaN never fires.
        let cross_up = rsi_older < trail_older && rsi_recent > trail_recent;
        let cross_down = rsi_older > trail_older && rsi_recent < trail_recent;
        let level_up = rsi_older < level && rsi_recent > level;
        let level_down = rsi_older > level && rsi_recent < level;

        let anchor = index - cnt + 1;
        let anchor_bar = bars.bar(anchor);
        let prefix = self.config.object_prefix();

        if self.config.markers_on_crossover() {
            if cross_up {
                sink.draw_marker(Marker {
                    name: format!("{prefix}C{}", anchor_bar.open_time),
                    kind: MarkerKind::UpTriangle,
                    bar_index: anchor,
                    price: anchor_bar.low,
                    color: self.config.crossover_up_color().to_owned(),
                });
            } else if cross_down {
                sink.draw_marker(Marker {
                    name: format!("{prefix}C{}", anchor_bar.open_time),
                    kind: MarkerKind::DownTriangle,
                    bar_index: anchor,
                    price: anchor_bar.high,
                    color: self.config.crossover_down_color().to_owned(),
                });
            }
        }

        if self.config.markers_on_level() {
            // Both arrows anchor at the bar low.
            if level_up {
                sink.draw_marker(Marker {
                    name: format!("{prefix}L{}", anchor_bar.open_time),
                    kind: MarkerKind::UpArrow,
                    bar_index: anchor,
                    price: anchor_bar.low,
                    color: self.config.level_up_color().to_owned(),
                });
            } else if level_down {
                sink.draw_marker(Marker {
                    name: format!("{prefix}L{}", anchor_bar.open_time),
                    kind: MarkerKind::DownArrow,
                    bar_index: anchor,
                    price: anchor_bar.low,
                    color: self.config.level_down_color().to_owned(),
                });
            }
        }

        if !self.config.email_alerts() {
            return;
        }
        let event_time = bars.bar(recent).open_time;
        let subject = format!(
            "QQE Alert - {} @ {}",
            self.config.symbol(),
            self.config.timeframe()
        );

        if self.config.alert_on_crossover()
            && (cross_up || cross_down)
            && self.cross_watermark.observe(event_time)
        {
            let side = if cross_up { "below" } else { "above" };
            sink.send_alert(Alert {
                from: self.config.email_from().to_owned(),
                to: self.config.email_to().to_owned(),
                subject: subject.clone(),
                body: format!(
                    "QQE: {} - {} - RSI MA crossed Smoothed Line from {side}.",
                    self.config.symbol(),
                    self.config.timeframe()
                ),
                event_time,
            });
        }

        if self.config.alert_on_level()
            && (level_up || level_down)
            && self.level_watermark.observe(event_time)
        {
            let side = if level_up { "Up" } else { "Down" };
            sink.send_alert(Alert {
                from: self.config.email_from().to_owned(),
                to: self.config.email_to().to_owned(),
                subject,
                body: format!(
                    "QQE: {} - {} - Level Cross {side}",
                    self.config.symbol(),
                    self.config.timeframe()
                ),
                event_time,
            });
        }
    }
}
