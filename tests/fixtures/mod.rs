#![allow(dead_code)]

use qqe_engine::{Alert, BarSnapshot, Marker, SignalSink, Timestamp};

/// Flat synthetic bars walking a piecewise-linear price path.
///
/// Each `(delta, count)` segment appends `count` bars, moving the price by
/// `delta` per bar starting from 100.0. Bars are `step` apart in time.
pub fn wave(segments: &[(f64, usize)], start_time: Timestamp, step: Timestamp) -> Vec<BarSnapshot> {
    let mut bars = Vec::new();
    let mut price = 100.0;
    let mut t = start_time;
    for &(delta, count) in segments {
        for _ in 0..count {
            price += delta;
            bars.push(BarSnapshot::flat(price, t));
            t += step;
        }
    }
    bars
}

/// Like [`wave`], but every bar carries a high/low range of `spread`
/// around the close, for asserting marker anchor prices.
pub fn ranged_wave(
    segments: &[(f64, usize)],
    start_time: Timestamp,
    step: Timestamp,
    spread: f64,
) -> Vec<BarSnapshot> {
    wave(segments, start_time, step)
        .into_iter()
        .map(|bar| BarSnapshot {
            high: bar.close + spread,
            low: bar.close - spread,
            ..bar
        })
        .collect()
}

/// Expands each coarse bar into `per_run` fine bars carrying the coarse
/// prices, with open times spaced `fine_step` apart inside the coarse bar.
pub fn expand_to_fine(
    coarse: &[BarSnapshot],
    per_run: u64,
    fine_step: Timestamp,
) -> Vec<BarSnapshot> {
    coarse
        .iter()
        .flat_map(|bar| {
            (0..per_run).map(move |k| BarSnapshot {
                open_time: bar.open_time + k * fine_step,
                ..*bar
            })
        })
        .collect()
}

/// Sink capturing every outbound call for assertions.
#[derive(Default)]
pub struct RecordingSink {
    pub markers: Vec<Marker>,
    pub alerts: Vec<Alert>,
    pub removed: Vec<String>,
}

impl SignalSink for RecordingSink {
    fn draw_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    fn send_alert(&mut self, alert: Alert) {
        self.alerts.push(alert);
    }

    fn remove_markers(&mut self, prefix: &str) {
        self.removed.push(prefix.to_owned());
    }
}
