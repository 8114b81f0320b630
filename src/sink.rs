use crate::{Price, Timestamp};

/// Shape of a chart marker drawn by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum MarkerKind {
    /// Bullish crossover of the trailing level.
    UpTriangle,
    /// Bearish crossover of the trailing level.
    DownTriangle,
    /// RSI MA crossed the fixed level upward.
    UpArrow,
    /// RSI MA crossed the fixed level downward.
    DownArrow,
}

/// A chart marker request.
///
/// `name` is unique per (signal kind, bar): re-drawing with the same name on
/// a repaint replaces the previous object on hosts that key by name.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Marker {
    /// Object name, prefixed with the engine's configured object prefix.
    pub name: String,
    /// Marker shape.
    pub kind: MarkerKind,
    /// Fine-timeframe bar index the marker is anchored to.
    pub bar_index: usize,
    /// Price level the marker is anchored to.
    pub price: Price,
    /// Host color name, e.g. `"Green"`.
    pub color: String,
}

/// An outbound email alert request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Alert {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub body: String,
    /// Open time of the signal bar the alert refers to.
    pub event_time: Timestamp,
}

/// Host capabilities the engine emits signals through.
///
/// Fire-and-forget: the engine never inspects delivery outcomes, so the
/// methods return nothing. Hosts that can fail should log and swallow.
pub trait SignalSink {
    /// Draws (or replaces, by name) a chart marker.
    fn draw_marker(&mut self, marker: Marker);

    /// Sends an email alert.
    fn send_alert(&mut self, alert: Alert);

    /// Removes every marker whose name starts with `prefix`.
    fn remove_markers(&mut self, prefix: &str);
}
