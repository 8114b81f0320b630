//! Streaming QQE (Qualitative Quantitative Estimation) indicator engine.
//!
//! QQE layers a volatility-adaptive trailing level over a smoothed RSI:
//! RSI(14) of closes, an EMA of that RSI (the published "RSI MA" line),
//! a double Wilder-smoothed measure of the line's bar-to-bar volatility,
//! and a 4.236-scaled ratcheting trailing level (the "Smoothed" line).
//! Crossovers of the two lines, and crosses of a fixed level, yield chart
//! markers and deduplicated alerts through a host-supplied [`SignalSink`].
//!
//! The engine is incremental: the driver calls
//! [`QqeEngine::calculate`] once per bar event in non-decreasing index
//! order, and every derived series stays undefined (NaN) until its warm-up
//! completes. An optional upper timeframe resamples the computation onto
//! coarser bars and fans each coarse result out over the corresponding run
//! of fine bars.
//!
//! # Example
//!
//! ```
//! use qqe_engine::{Alert, BarSnapshot, Marker, QqeConfig, QqeEngine, SignalSink, Timeframe};
//!
//! struct NullSink;
//!
//! impl SignalSink for NullSink {
//!     fn draw_marker(&mut self, _marker: Marker) {}
//!     fn send_alert(&mut self, _alert: Alert) {}
//!     fn remove_markers(&mut self, _prefix: &str) {}
//! }
//!
//! let bars: Vec<BarSnapshot> = (0u64..120)
//!     .map(|i| BarSnapshot::flat(100.0, i * 60))
//!     .collect();
//!
//! let mut engine = QqeEngine::new(
//!     QqeConfig::builder()
//!         .symbol("EURUSD")
//!         .timeframe(Timeframe::M1)
//!         .build(),
//! );
//!
//! let mut sink = NullSink;
//! for i in 0..bars.len() {
//!     engine.calculate(&bars, None, i, &mut sink);
//! }
//!
//! // A flat feed pins RSI at 50, and the trailing level converges onto it.
//! assert_eq!(engine.rsi_ma().get(119), 50.0);
//! assert_eq!(engine.trailing_level().get(119), 50.0);
//! ```

mod config;
mod ema;
mod engine;
mod feed;
mod rsi;
mod series;
mod sink;
mod timeframe;

pub use config::{QqeConfig, QqeConfigBuilder};
pub use engine::QqeEngine;
pub use feed::{BarFeed, BarSnapshot, Price, Timestamp};
pub use series::Series;
pub use sink::{Alert, Marker, MarkerKind, SignalSink};
pub use timeframe::{ParseTimeframeError, Timeframe};
