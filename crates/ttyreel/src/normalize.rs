//! Delay normalization under playback policy.
//!
//! For each frame independently:
//!
//! 1. a fixed `frame_delay` overrides the recorded delay, otherwise
//! 2. a numeric `max_idle_time` caps it,
//! 3. then `speed_factor` scales the result.
//!
//! Override and cap saturate, so re-applying the same options is a no-op as
//! long as `speed_factor` is 1. A sequence must never be re-normalized with a
//! different speed factor; the factors would multiply.

use crate::frame::FrameSequence;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Default idle cap in milliseconds
pub const DEFAULT_MAX_IDLE_TIME_MS: f64 = 2000.0;

/// `auto` or a fixed number of milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DelayPolicy {
    /// Keep the recorded value
    #[default]
    Auto,
    /// Fixed milliseconds
    Millis(f64),
}

impl DelayPolicy {
    /// Whether this is the `auto` sentinel
    #[must_use]
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Milliseconds, if not `auto`
    #[must_use]
    pub const fn millis(self) -> Option<f64> {
        match self {
            Self::Auto => None,
            Self::Millis(ms) => Some(ms),
        }
    }
}

impl fmt::Display for DelayPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Millis(ms) => write!(f, "{ms}"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PolicyRepr {
    Number(f64),
    Text(String),
}

impl Serialize for DelayPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Auto => PolicyRepr::Text("auto".to_string()).serialize(serializer),
            Self::Millis(ms) => PolicyRepr::Number(*ms).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for DelayPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match PolicyRepr::deserialize(deserializer)? {
            PolicyRepr::Number(ms) => Ok(Self::Millis(ms)),
            PolicyRepr::Text(text) if text.trim().eq_ignore_ascii_case("auto") => Ok(Self::Auto),
            PolicyRepr::Text(text) => text
                .trim()
                .parse::<f64>()
                .map(Self::Millis)
                .map_err(|_| serde::de::Error::custom(format!("expected `auto` or a number, got `{text}`"))),
        }
    }
}

/// Playback policy applied by [`normalize`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackOptions {
    /// Fixed delay for every frame, or `auto` for recorded timing
    pub frame_delay: DelayPolicy,
    /// Cap for recorded delays, or `auto` for no cap. Ignored unless
    /// `frame_delay` is `auto`.
    pub max_idle_time: DelayPolicy,
    /// Multiplier applied last
    pub speed_factor: f64,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            frame_delay: DelayPolicy::Auto,
            max_idle_time: DelayPolicy::Millis(DEFAULT_MAX_IDLE_TIME_MS),
            speed_factor: 1.0,
        }
    }
}

impl PlaybackOptions {
    /// Create default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded timing untouched: `auto`, `auto`, factor kept
    #[must_use]
    pub fn real_timing(speed_factor: f64) -> Self {
        Self {
            frame_delay: DelayPolicy::Auto,
            max_idle_time: DelayPolicy::Auto,
            speed_factor,
        }
    }

    /// Set the fixed frame delay
    #[must_use]
    pub const fn with_frame_delay(mut self, frame_delay: DelayPolicy) -> Self {
        self.frame_delay = frame_delay;
        self
    }

    /// Set the idle cap
    #[must_use]
    pub const fn with_max_idle_time(mut self, max_idle_time: DelayPolicy) -> Self {
        self.max_idle_time = max_idle_time;
        self
    }

    /// Set the speed factor
    #[must_use]
    pub const fn with_speed_factor(mut self, speed_factor: f64) -> Self {
        self.speed_factor = speed_factor;
        self
    }

    /// Compute the normalized delay for one recorded delay
    #[must_use]
    pub fn apply(&self, delay: f64) -> f64 {
        let base = match (self.frame_delay, self.max_idle_time) {
            (DelayPolicy::Millis(fixed), _) => fixed,
            (DelayPolicy::Auto, DelayPolicy::Millis(cap)) if delay > cap => cap,
            _ => delay,
        };
        base * self.speed_factor
    }
}

/// Return a copy of `sequence` with every delay remapped under `options`.
///
/// Frames are never dropped or reordered.
#[must_use]
pub fn normalize(sequence: &FrameSequence, options: &PlaybackOptions) -> FrameSequence {
    let mut out = sequence.clone();
    normalize_in_place(&mut out, options);
    out
}

/// In-place variant of [`normalize`]
pub fn normalize_in_place(sequence: &mut FrameSequence, options: &PlaybackOptions) {
    for frame in sequence.iter_mut() {
        frame.delay = options.apply(frame.delay);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use proptest::prelude::*;

    fn seq(delays: &[f64]) -> FrameSequence {
        delays.iter().map(|d| Frame::new(*d, "x")).collect()
    }

    mod policy_tests {
        use super::*;

        #[test]
        fn test_policy_parses_auto_and_numbers() {
            let auto: DelayPolicy = serde_yaml_ng::from_str("auto").unwrap();
            let num: DelayPolicy = serde_yaml_ng::from_str("150").unwrap();
            let text_num: DelayPolicy = serde_yaml_ng::from_str("'75'").unwrap();
            assert_eq!(auto, DelayPolicy::Auto);
            assert_eq!(num, DelayPolicy::Millis(150.0));
            assert_eq!(text_num, DelayPolicy::Millis(75.0));
        }

        #[test]
        fn test_policy_rejects_garbage() {
            assert!(serde_yaml_ng::from_str::<DelayPolicy>("soon").is_err());
        }

        #[test]
        fn test_policy_display() {
            assert_eq!(DelayPolicy::Auto.to_string(), "auto");
            assert_eq!(DelayPolicy::Millis(200.0).to_string(), "200");
        }

        #[test]
        fn test_options_default() {
            let options = PlaybackOptions::default();
            assert!(options.frame_delay.is_auto());
            assert_eq!(options.max_idle_time.millis(), Some(2000.0));
            assert_eq!(options.speed_factor, 1.0);
        }
    }

    mod normalize_tests {
        use super::*;

        #[test]
        fn test_fixed_delay_overrides_cap() {
            let options = PlaybackOptions::new()
                .with_frame_delay(DelayPolicy::Millis(200.0))
                .with_max_idle_time(DelayPolicy::Millis(2000.0));
            let out = normalize(&seq(&[100.0, 2500.0, 50.0]), &options);
            assert_eq!(out.delays(), vec![200.0, 200.0, 200.0]);
        }

        #[test]
        fn test_idle_cap_clamps_long_delays() {
            let out = normalize(&seq(&[100.0, 2500.0, 50.0]), &PlaybackOptions::default());
            assert_eq!(out.delays(), vec![100.0, 2000.0, 50.0]);
        }

        #[test]
        fn test_cap_then_scale() {
            let options = PlaybackOptions::default().with_speed_factor(2.0);
            let out = normalize(&seq(&[100.0, 2500.0, 50.0]), &options);
            assert_eq!(out.delays(), vec![200.0, 4000.0, 100.0]);
        }

        #[test]
        fn test_real_timing_only_scales() {
            let out = normalize(
                &seq(&[100.0, 2500.0, 50.0]),
                &PlaybackOptions::real_timing(0.5),
            );
            assert_eq!(out.delays(), vec![50.0, 1250.0, 25.0]);
        }

        #[test]
        fn test_source_is_untouched() {
            let source = seq(&[3000.0]);
            let _ = normalize(&source, &PlaybackOptions::default());
            assert_eq!(source.delays(), vec![3000.0]);
        }

        #[test]
        fn test_content_and_order_preserved() {
            let source: FrameSequence = vec![Frame::new(1.0, "a"), Frame::new(9000.0, "b")].into();
            let out = normalize(&source, &PlaybackOptions::default());
            assert_eq!(out.get(0).unwrap().content, b"a");
            assert_eq!(out.get(1).unwrap().content, b"b");
        }

        #[test]
        fn test_renormalizing_defaults_is_identity() {
            let once = normalize(&seq(&[100.0, 2500.0, 50.0]), &PlaybackOptions::default());
            let twice = normalize(&once, &PlaybackOptions::default());
            assert_eq!(once, twice);
        }
    }

    proptest! {
        #[test]
        fn prop_never_changes_length(delays in prop::collection::vec(0.0f64..10_000.0, 0..64)) {
            let source = seq(&delays);
            let out = normalize(&source, &PlaybackOptions::default());
            prop_assert_eq!(out.len(), source.len());
        }

        #[test]
        fn prop_unit_speed_is_idempotent(
            delays in prop::collection::vec(0.0f64..10_000.0, 0..64),
            cap in 0.0f64..5_000.0,
        ) {
            let options = PlaybackOptions::default().with_max_idle_time(DelayPolicy::Millis(cap));
            let once = normalize(&seq(&delays), &options);
            let twice = normalize(&once, &options);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_capped_delays_stay_under_cap(
            delays in prop::collection::vec(0.0f64..10_000.0, 1..64),
            cap in 0.0f64..5_000.0,
        ) {
            let options = PlaybackOptions::default().with_max_idle_time(DelayPolicy::Millis(cap));
            let out = normalize(&seq(&delays), &options);
            prop_assert!(out.iter().all(|f| f.delay <= cap));
        }
    }
}
