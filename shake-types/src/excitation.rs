//! Time-to-value excitation functions.
//!
//! An [`Excitation`] maps simulated time to a scalar displacement, with
//! analytic first and second derivatives where they exist. Two shapes are
//! supported: a sine wave, and a [`MotionProfile`] of recorded control
//! points (typically a ground-displacement record sampled from an
//! accelerogram) interpolated piecewise-linearly.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::io::Read;
use std::path::Path;
use tracing::{debug, trace};

/// One recorded `(time, value)` sample of a motion profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    /// Sample time in seconds.
    pub time: f64,
    /// Sampled displacement value.
    pub value: f64,
}

impl ControlPoint {
    /// Create a control point.
    #[must_use]
    pub const fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

/// Why profile parsing consumed no further input.
///
/// Parsing is prefix-tolerant: whatever was read before the stop is kept,
/// and the reason is reported alongside rather than as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    /// The whole stream parsed cleanly.
    EndOfStream,
    /// A token failed to parse as a number.
    MalformedToken {
        /// The offending token text.
        token: String,
        /// Zero-based index of the token in the stream.
        index: usize,
    },
    /// The stream ended with a time that had no paired value.
    OddTrailingToken,
    /// A sample time was earlier than its predecessor.
    NonMonotonicTime {
        /// The out-of-order time, after any offset was applied.
        time: f64,
    },
}

/// Result of parsing a profile stream: the profile plus how parsing ended.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileOutcome {
    /// The parsed profile.
    pub profile: MotionProfile,
    /// Number of control points read (after last-wins deduplication).
    pub points_read: usize,
    /// Why parsing stopped.
    pub stop: StopReason,
}

/// A piecewise-linear function of time defined by recorded control points.
///
/// Evaluation clamps to the endpoint values outside the recorded span, so
/// a profile never extrapolates. Points are held in strictly increasing
/// time order. Deserialization goes through [`MotionProfile::from_points`],
/// so an empty or non-finite point list is rejected there too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ControlPoint>", into = "Vec<ControlPoint>")]
pub struct MotionProfile {
    points: Vec<ControlPoint>,
}

impl TryFrom<Vec<ControlPoint>> for MotionProfile {
    type Error = crate::RigError;

    fn try_from(points: Vec<ControlPoint>) -> crate::Result<Self> {
        Self::from_points(points)
    }
}

impl From<MotionProfile> for Vec<ControlPoint> {
    fn from(profile: MotionProfile) -> Self {
        profile.points
    }
}

impl MotionProfile {
    /// Build a profile from control points already in hand.
    ///
    /// Points are sorted by time; when two points share a time the later
    /// one in the input wins, matching the parser's behavior.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RigError::EmptyProfile`] if `points` is empty, and
    /// [`crate::RigError::InvalidConfig`] if any coordinate is non-finite.
    pub fn from_points(points: Vec<ControlPoint>) -> crate::Result<Self> {
        if points
            .iter()
            .any(|p| !p.time.is_finite() || !p.value.is_finite())
        {
            return Err(crate::RigError::invalid_config(
                "profile control points must be finite",
            ));
        }
        let mut sorted = points;
        sorted.sort_by(|a, b| a.time.total_cmp(&b.time));
        sorted.dedup_by(|later, earlier| {
            if later.time == earlier.time {
                earlier.value = later.value;
                true
            } else {
                false
            }
        });
        if sorted.is_empty() {
            return Err(crate::RigError::empty_profile("point list"));
        }
        Ok(Self { points: sorted })
    }

    /// Parse whitespace-separated `time value` pairs from text.
    ///
    /// Each time is shifted by `time_offset` and each value scaled by
    /// `scale` as it is read. Parsing is prefix-tolerant: a malformed
    /// token, a dangling trailing time, or a backwards time step ends the
    /// scan and the points read so far form the profile. Two consecutive
    /// samples at the same time keep the later value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RigError::EmptyProfile`] only when no complete
    /// pair could be read at all.
    pub fn parse(text: &str, time_offset: f64, scale: f64) -> crate::Result<ProfileOutcome> {
        let mut points: Vec<ControlPoint> = Vec::new();
        let mut tokens = text.split_whitespace().enumerate();
        let stop = loop {
            let Some((time_index, time_token)) = tokens.next() else {
                break StopReason::EndOfStream;
            };
            let Ok(raw_time) = time_token.parse::<f64>() else {
                break StopReason::MalformedToken {
                    token: time_token.to_owned(),
                    index: time_index,
                };
            };
            let Some((value_index, value_token)) = tokens.next() else {
                break StopReason::OddTrailingToken;
            };
            let Ok(raw_value) = value_token.parse::<f64>() else {
                break StopReason::MalformedToken {
                    token: value_token.to_owned(),
                    index: value_index,
                };
            };
            let point = ControlPoint::new(raw_time + time_offset, raw_value * scale);
            match points.last_mut() {
                Some(last) if point.time < last.time => {
                    break StopReason::NonMonotonicTime { time: point.time };
                }
                Some(last) if point.time == last.time => last.value = point.value,
                _ => points.push(point),
            }
            trace!(time = point.time, value = point.value, "profile point");
        };

        if points.is_empty() {
            return Err(crate::RigError::empty_profile("profile text"));
        }
        let points_read = points.len();
        debug!(points = points_read, ?stop, "parsed motion profile");
        Ok(ProfileOutcome {
            profile: Self { points },
            points_read,
            stop,
        })
    }

    /// Parse a profile from any reader. See [`MotionProfile::parse`].
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the stream cannot be read, or
    /// [`crate::RigError::EmptyProfile`] if it held no complete pair.
    pub fn from_reader<R: Read>(
        mut reader: R,
        time_offset: f64,
        scale: f64,
    ) -> crate::Result<ProfileOutcome> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::parse(&text, time_offset, scale)
    }

    /// Load a profile from a file. See [`MotionProfile::parse`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::RigError::ProfileNotFound`] if the file does not
    /// exist, other I/O errors as [`crate::RigError::Io`], and
    /// [`crate::RigError::EmptyProfile`] if the file held no complete
    /// pair.
    pub fn load(
        path: impl AsRef<Path>,
        time_offset: f64,
        scale: f64,
    ) -> crate::Result<ProfileOutcome> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                crate::RigError::ProfileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                crate::RigError::Io(err)
            }
        })?;
        debug!(path = %path.display(), "loading motion profile");
        Self::parse(&text, time_offset, scale)
    }

    /// The control points, in strictly increasing time order.
    #[must_use]
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    /// Time of the first control point.
    #[must_use]
    pub fn start_time(&self) -> f64 {
        self.points[0].time
    }

    /// Time of the last control point.
    #[must_use]
    pub fn end_time(&self) -> f64 {
        self.points[self.points.len() - 1].time
    }

    /// Interpolated value at time `t`, clamped to the endpoints.
    #[must_use]
    pub fn value(&self, t: f64) -> f64 {
        let n = self.points.len();
        if t <= self.points[0].time {
            return self.points[0].value;
        }
        if t >= self.points[n - 1].time {
            return self.points[n - 1].value;
        }
        // First point strictly after t; bounds are safe after the clamps.
        let hi = self.points.partition_point(|p| p.time <= t);
        let a = self.points[hi - 1];
        let b = self.points[hi];
        let s = (t - a.time) / (b.time - a.time);
        a.value + s * (b.value - a.value)
    }

    /// Slope of the active segment at time `t`, zero outside the span.
    ///
    /// At a control point the right-hand segment's slope is reported.
    #[must_use]
    pub fn derivative(&self, t: f64) -> f64 {
        let n = self.points.len();
        if t < self.points[0].time || t >= self.points[n - 1].time {
            return 0.0;
        }
        let hi = self.points.partition_point(|p| p.time <= t).min(n - 1);
        let a = self.points[hi - 1];
        let b = self.points[hi];
        (b.value - a.value) / (b.time - a.time)
    }
}

/// A time-to-value excitation function with analytic derivatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Excitation {
    /// `amplitude * sin(2π * frequency * t + phase)`.
    Sine {
        /// Phase offset in radians.
        phase: f64,
        /// Frequency in Hz.
        frequency: f64,
        /// Peak displacement.
        amplitude: f64,
    },
    /// Piecewise-linear interpolation of recorded control points.
    Profile(MotionProfile),
}

impl Excitation {
    /// Create a sine excitation.
    #[must_use]
    pub const fn sine(phase: f64, frequency: f64, amplitude: f64) -> Self {
        Self::Sine {
            phase,
            frequency,
            amplitude,
        }
    }

    /// An excitation that is identically zero.
    ///
    /// Used as the placeholder before a profile is bound to an axis; the
    /// driven axis then tracks the reference body exactly.
    #[must_use]
    pub const fn none() -> Self {
        Self::sine(0.0, 0.0, 0.0)
    }

    /// Displacement at time `t`.
    #[must_use]
    pub fn value(&self, t: f64) -> f64 {
        match self {
            Self::Sine {
                phase,
                frequency,
                amplitude,
            } => amplitude * (TAU * frequency * t + phase).sin(),
            Self::Profile(profile) => profile.value(t),
        }
    }

    /// Velocity at time `t`.
    ///
    /// For a profile this is the active segment's slope, discontinuous at
    /// control points and zero outside the recorded span.
    #[must_use]
    pub fn derivative(&self, t: f64) -> f64 {
        match self {
            Self::Sine {
                phase,
                frequency,
                amplitude,
            } => {
                let omega = TAU * frequency;
                amplitude * omega * (omega * t + phase).cos()
            }
            Self::Profile(profile) => profile.derivative(t),
        }
    }

    /// Acceleration at time `t`. Zero everywhere for a profile.
    #[must_use]
    pub fn second_derivative(&self, t: f64) -> f64 {
        match self {
            Self::Sine {
                phase,
                frequency,
                amplitude,
            } => {
                let omega = TAU * frequency;
                -amplitude * omega * omega * (omega * t + phase).sin()
            }
            Self::Profile(_) => 0.0,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle() -> MotionProfile {
        MotionProfile::from_points(vec![
            ControlPoint::new(0.0, 0.0),
            ControlPoint::new(1.0, 2.0),
            ControlPoint::new(2.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn profile_interpolates_between_points() {
        let profile = triangle();
        assert_relative_eq!(profile.value(0.5), 1.0);
        assert_relative_eq!(profile.value(1.0), 2.0);
        assert_relative_eq!(profile.value(1.5), 1.0);
    }

    #[test]
    fn profile_clamps_outside_span() {
        let profile = triangle();
        assert_relative_eq!(profile.value(-1.0), 0.0);
        assert_relative_eq!(profile.value(3.0), 0.0);
        assert_relative_eq!(profile.derivative(-1.0), 0.0);
        assert_relative_eq!(profile.derivative(3.0), 0.0);
    }

    #[test]
    fn profile_segment_slope() {
        let profile = triangle();
        assert_relative_eq!(profile.derivative(0.5), 2.0);
        assert_relative_eq!(profile.derivative(1.5), -2.0);
    }

    #[test]
    fn parse_clean_stream() {
        let outcome = MotionProfile::parse("0 0\n1 2\n2 0\n", 0.0, 1.0).unwrap();
        assert_eq!(outcome.points_read, 3);
        assert_eq!(outcome.stop, StopReason::EndOfStream);
        assert_relative_eq!(outcome.profile.value(0.5), 1.0);
    }

    #[test]
    fn parse_keeps_prefix_on_odd_trailing_token() {
        let outcome = MotionProfile::parse("0 0 1 2 2", 0.0, 1.0).unwrap();
        assert_eq!(outcome.points_read, 2);
        assert_eq!(outcome.stop, StopReason::OddTrailingToken);
        assert_relative_eq!(outcome.profile.end_time(), 1.0);
    }

    #[test]
    fn parse_keeps_prefix_on_malformed_token() {
        let outcome = MotionProfile::parse("0 0 1 2 oops 3", 0.0, 1.0).unwrap();
        assert_eq!(outcome.points_read, 2);
        assert_eq!(
            outcome.stop,
            StopReason::MalformedToken {
                token: "oops".to_owned(),
                index: 4,
            }
        );
    }

    #[test]
    fn parse_stops_on_backwards_time() {
        let outcome = MotionProfile::parse("0 0 2 4 1 9", 0.0, 1.0).unwrap();
        assert_eq!(outcome.points_read, 2);
        assert_eq!(outcome.stop, StopReason::NonMonotonicTime { time: 1.0 });
    }

    #[test]
    fn parse_duplicate_time_last_wins() {
        let outcome = MotionProfile::parse("0 1 0 5 1 7", 0.0, 1.0).unwrap();
        assert_eq!(outcome.points_read, 2);
        assert_relative_eq!(outcome.profile.value(0.0), 5.0);
        assert_relative_eq!(outcome.profile.value(1.0), 7.0);
    }

    #[test]
    fn parse_applies_offset_and_scale() {
        let outcome = MotionProfile::parse("0 1 2 3", 10.0, 0.5).unwrap();
        let points = outcome.profile.points();
        assert_relative_eq!(points[0].time, 10.0);
        assert_relative_eq!(points[0].value, 0.5);
        assert_relative_eq!(points[1].time, 12.0);
        assert_relative_eq!(points[1].value, 1.5);
    }

    #[test]
    fn empty_stream_is_an_error() {
        assert!(MotionProfile::parse("", 0.0, 1.0).is_err());
        assert!(MotionProfile::parse("   \n\t ", 0.0, 1.0).is_err());
        assert!(MotionProfile::parse("junk", 0.0, 1.0).is_err());
    }

    #[test]
    fn deserializing_empty_point_list_is_rejected() {
        let err = serde_json::from_str::<MotionProfile>("[]").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn profile_serde_round_trip() {
        let profile = triangle();
        let json = serde_json::to_string(&profile).unwrap();
        let back: MotionProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn load_missing_file() {
        let err = MotionProfile::load("/nonexistent/quake.txt", 0.0, 1.0).unwrap_err();
        assert!(matches!(err, crate::RigError::ProfileNotFound { .. }));
    }

    #[test]
    fn from_reader_matches_parse() {
        let text = "0 0 1 2";
        let via_reader = MotionProfile::from_reader(text.as_bytes(), 0.0, 1.0).unwrap();
        let via_parse = MotionProfile::parse(text, 0.0, 1.0).unwrap();
        assert_eq!(via_reader, via_parse);
    }

    #[test]
    fn sine_quarter_period_reaches_amplitude() {
        let excitation = Excitation::sine(0.0, 1.5, 0.001);
        assert_relative_eq!(excitation.value(0.0), 0.0);
        assert_relative_eq!(
            excitation.value(1.0 / (4.0 * 1.5)),
            0.001,
            max_relative = 1e-12
        );
    }

    #[test]
    fn sine_derivatives() {
        let excitation = Excitation::sine(0.0, 2.0, 3.0);
        let omega = TAU * 2.0;
        assert_relative_eq!(excitation.derivative(0.0), 3.0 * omega);
        assert_relative_eq!(excitation.second_derivative(0.0), 0.0, epsilon = 1e-9);
        let quarter = 1.0 / 8.0;
        assert_relative_eq!(
            excitation.second_derivative(quarter),
            -3.0 * omega * omega,
            max_relative = 1e-12
        );
    }

    #[test]
    fn none_is_identically_zero() {
        let excitation = Excitation::none();
        for t in [0.0, 0.3, 17.0] {
            assert_relative_eq!(excitation.value(t), 0.0);
            assert_relative_eq!(excitation.derivative(t), 0.0);
            assert_relative_eq!(excitation.second_derivative(t), 0.0);
        }
    }

    #[test]
    fn profile_excitation_second_derivative_is_zero() {
        let excitation = Excitation::Profile(triangle());
        assert_relative_eq!(excitation.second_derivative(0.5), 0.0);
    }
}
