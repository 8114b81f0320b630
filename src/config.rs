use std::{fmt::Display, num::NonZero};

use crate::Timeframe;

/// Configuration for a [`QqeEngine`](crate::QqeEngine) instance.
///
/// One config describes one (symbol, timeframe, upper-timeframe) engine.
/// All parameters arrive validated from the host; the builder enforces the
/// ranges the host promises (alert level 1–99, smoothing factor ≥ 1).
///
/// # Example
///
/// ```
/// use qqe_engine::{QqeConfig, Timeframe};
/// use std::num::NonZero;
///
/// let config = QqeConfig::builder()
///     .symbol("EURUSD")
///     .timeframe(Timeframe::M5)
///     .smoothing_factor(NonZero::new(5).unwrap())
///     .alert_on_level(true)
///     .build();
///
/// assert_eq!(config.smoothing_factor(), 5);
/// assert_eq!(config.alert_level(), 50);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct QqeConfig {
    symbol: String,
    timeframe: Timeframe,
    upper_timeframe: Option<Timeframe>,
    smoothing_factor: usize,
    alert_on_crossover: bool,
    alert_on_level: bool,
    alert_level: u8,
    markers_on_crossover: bool,
    crossover_up_color: String,
    crossover_down_color: String,
    markers_on_level: bool,
    level_up_color: String,
    level_down_color: String,
    email_alerts: bool,
    email_from: String,
    email_to: String,
    object_prefix: String,
}

impl QqeConfig {
    /// Returns a new builder with default values.
    #[must_use]
    pub fn builder() -> QqeConfigBuilder {
        QqeConfigBuilder::new()
    }

    /// Symbol name, used in alert subjects and bodies.
    #[inline]
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Native chart timeframe.
    #[inline]
    #[must_use]
    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Optional aggregation timeframe. Resampling activates only when this
    /// is strictly coarser than [`timeframe`](Self::timeframe).
    #[inline]
    #[must_use]
    pub fn upper_timeframe(&self) -> Option<Timeframe> {
        self.upper_timeframe
    }

    /// Smoothing factor SF: EMA period applied to the RSI line. Default 5.
    #[inline]
    #[must_use]
    pub fn smoothing_factor(&self) -> usize {
        self.smoothing_factor
    }

    /// Send an alert when the RSI MA crosses the trailing level.
    #[inline]
    #[must_use]
    pub fn alert_on_crossover(&self) -> bool {
        self.alert_on_crossover
    }

    /// Send an alert when the RSI MA crosses the fixed alert level.
    #[inline]
    #[must_use]
    pub fn alert_on_level(&self) -> bool {
        self.alert_on_level
    }

    /// Fixed level for the level detector, 1–99. Default 50.
    #[inline]
    #[must_use]
    pub fn alert_level(&self) -> u8 {
        self.alert_level
    }

    /// Draw triangle markers on trailing-level crossovers.
    #[inline]
    #[must_use]
    pub fn markers_on_crossover(&self) -> bool {
        self.markers_on_crossover
    }

    /// Color of the up-triangle crossover marker.
    #[inline]
    #[must_use]
    pub fn crossover_up_color(&self) -> &str {
        &self.crossover_up_color
    }

    /// Color of the down-triangle crossover marker.
    #[inline]
    #[must_use]
    pub fn crossover_down_color(&self) -> &str {
        &self.crossover_down_color
    }

    /// Draw arrow markers on alert-level crosses.
    #[inline]
    #[must_use]
    pub fn markers_on_level(&self) -> bool {
        self.markers_on_level
    }

    /// Color of the up-arrow level marker.
    #[inline]
    #[must_use]
    pub fn level_up_color(&self) -> &str {
        &self.level_up_color
    }

    /// Color of the down-arrow level marker.
    #[inline]
    #[must_use]
    pub fn level_down_color(&self) -> &str {
        &self.level_down_color
    }

    /// Master switch for outbound email alerts.
    #[inline]
    #[must_use]
    pub fn email_alerts(&self) -> bool {
        self.email_alerts
    }

    /// Sender address for email alerts.
    #[inline]
    #[must_use]
    pub fn email_from(&self) -> &str {
        &self.email_from
    }

    /// Recipient address for email alerts.
    #[inline]
    #[must_use]
    pub fn email_to(&self) -> &str {
        &self.email_to
    }

    /// Prefix namespacing this engine's drawn markers. Default `"QQE-"`.
    #[inline]
    #[must_use]
    pub fn object_prefix(&self) -> &str {
        &self.object_prefix
    }
}

impl Display for QqeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "QqeConfig({}, {}, SF {}",
            self.symbol, self.timeframe, self.smoothing_factor
        )?;
        if let Some(upper) = self.upper_timeframe {
            write!(f, ", upper {upper}")?;
        }
        write!(f, ")")
    }
}

/// Builder for [`QqeConfig`].
///
/// Defaults mirror the indicator's published parameter defaults: smoothing
/// factor 5, alert level 50, markers on, alerts off, prefix `"QQE-"`,
/// green/red marker colors. The timeframe must be set before calling
/// [`build`](Self::build).
pub struct QqeConfigBuilder {
    symbol: String,
    timeframe: Option<Timeframe>,
    upper_timeframe: Option<Timeframe>,
    smoothing_factor: usize,
    alert_on_crossover: bool,
    alert_on_level: bool,
    alert_level: u8,
    markers_on_crossover: bool,
    crossover_up_color: String,
    crossover_down_color: String,
    markers_on_level: bool,
    level_up_color: String,
    level_down_color: String,
    email_alerts: bool,
    email_from: String,
    email_to: String,
    object_prefix: String,
}

impl QqeConfigBuilder {
    fn new() -> Self {
        Self {
            symbol: String::new(),
            timeframe: None,
            upper_timeframe: None,
            smoothing_factor: 5,
            alert_on_crossover: false,
            alert_on_level: false,
            alert_level: 50,
            markers_on_crossover: true,
            crossover_up_color: "Green".to_owned(),
            crossover_down_color: "Red".to_owned(),
            markers_on_level: true,
            level_up_color: "Green".to_owned(),
            level_down_color: "Red".to_owned(),
            email_alerts: false,
            email_from: String::new(),
            email_to: String::new(),
            object_prefix: "QQE-".to_owned(),
        }
    }

    /// Sets the symbol name.
    #[must_use]
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    /// Sets the native chart timeframe.
    #[must_use]
    pub fn timeframe(mut self, timeframe: Timeframe) -> Self {
        self.timeframe = Some(timeframe);
        self
    }

    /// Sets the aggregation timeframe.
    #[must_use]
    pub fn upper_timeframe(mut self, upper: Timeframe) -> Self {
        self.upper_timeframe = Some(upper);
        self
    }

    /// Sets the smoothing factor SF.
    #[must_use]
    pub fn smoothing_factor(mut self, sf: NonZero<usize>) -> Self {
        self.smoothing_factor = sf.get();
        self
    }

    /// Enables or disables crossover alerts.
    #[must_use]
    pub fn alert_on_crossover(mut self, enabled: bool) -> Self {
        self.alert_on_crossover = enabled;
        self
    }

    /// Enables or disables level alerts.
    #[must_use]
    pub fn alert_on_level(mut self, enabled: bool) -> Self {
        self.alert_on_level = enabled;
        self
    }

    /// Sets the fixed alert level.
    ///
    /// # Panics
    ///
    /// Panics if `level` is outside `1..=99`.
    #[must_use]
    pub fn alert_level(mut self, level: u8) -> Self {
        assert!(
            (1..=99).contains(&level),
            "alert level must be within 1..=99, got {level}"
        );
        self.alert_level = level;
        self
    }

    /// Enables or disables crossover markers.
    #[must_use]
    pub fn markers_on_crossover(mut self, enabled: bool) -> Self {
        self.markers_on_crossover = enabled;
        self
    }

    /// Sets the up/down colors for crossover markers.
    #[must_use]
    pub fn crossover_colors(mut self, up: impl Into<String>, down: impl Into<String>) -> Self {
        self.crossover_up_color = up.into();
        self.crossover_down_color = down.into();
        self
    }

    /// Enables or disables level markers.
    #[must_use]
    pub fn markers_on_level(mut self, enabled: bool) -> Self {
        self.markers_on_level = enabled;
        self
    }

    /// Sets the up/down colors for level markers.
    #[must_use]
    pub fn level_colors(mut self, up: impl Into<String>, down: impl Into<String>) -> Self {
        self.level_up_color = up.into();
        self.level_down_color = down.into();
        self
    }

    /// Enables or disables outbound email alerts.
    #[must_use]
    pub fn email_alerts(mut self, enabled: bool) -> Self {
        self.email_alerts = enabled;
        self
    }

    /// Sets the email sender and recipient addresses.
    #[must_use]
    pub fn email_addresses(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.email_from = from.into();
        self.email_to = to.into();
        self
    }

    /// Sets the marker object name prefix.
    #[must_use]
    pub fn object_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.object_prefix = prefix.into();
        self
    }

    /// Builds the config. Panics if the timeframe is missing.
    #[must_use]
    pub fn build(self) -> QqeConfig {
        let timeframe = self.timeframe.expect("timeframe is required");

        QqeConfig {
            symbol: self.symbol,
            timeframe,
            upper_timeframe: self.upper_timeframe,
            smoothing_factor: self.smoothing_factor,
            alert_on_crossover: self.alert_on_crossover,
            alert_on_level: self.alert_on_level,
            alert_level: self.alert_level,
            markers_on_crossover: self.markers_on_crossover,
            crossover_up_color: self.crossover_up_color,
            crossover_down_color: self.crossover_down_color,
            markers_on_level: self.markers_on_level,
            level_up_color: self.level_up_color,
            level_down_color: self.level_down_color,
            email_alerts: self.email_alerts,
            email_from: self.email_from,
            email_to: self.email_to,
            object_prefix: self.object_prefix,
        }
    }
}
