//! Elevation model: track samples, the derived slope table and height lookups.
//!
//! A track is an ordered list of `(distance, elevation)` samples. Loading a
//! track replaces the previous one wholesale and rebuilds the slope table.
//! A rejected load clears the model so that `slope_at` falls back to flat
//! terrain instead of using stale data.

pub mod gpx;
pub mod profile;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{LOG_TRACK_LOADED, LOG_TRACK_REJECTED, MIN_NORMALIZE_DISTANCE};
use crate::numbers::{floor_f64_to_usize, usize_to_f64};

pub use profile::{ProfilePath, ProfileViewport};

/// One point on a track: cumulative horizontal distance and elevation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackSample {
    pub distance: f64,
    pub elevation: f64,
}

impl TrackSample {
    #[must_use]
    pub const fn new(distance: f64, elevation: f64) -> Self {
        Self {
            distance,
            elevation,
        }
    }
}

/// How slopes are derived from adjacent samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SlopePolicy {
    /// Elevation delta per sample index.
    #[default]
    RawDelta,
    /// Elevation delta divided by the horizontal distance between samples.
    DistanceNormalized,
}

impl SlopePolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RawDelta => "raw_delta",
            Self::DistanceNormalized => "distance_normalized",
        }
    }

    fn slope(self, prev: TrackSample, next: TrackSample) -> f64 {
        let rise = next.elevation - prev.elevation;
        match self {
            Self::RawDelta => rise,
            Self::DistanceNormalized => {
                let run = (next.distance - prev.distance).abs();
                if run < MIN_NORMALIZE_DISTANCE {
                    0.0
                } else {
                    rise / run
                }
            }
        }
    }
}

/// Errors raised when elevation input cannot be used.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("GPX parse error: {0}")]
    Gpx(String),
    #[error("track file contains no tracks")]
    NoTracks,
    #[error("track contains no points")]
    NoPoints,
    #[error("track points carry no elevation data")]
    NoElevation,
}

/// Loaded elevation track plus its slope table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElevationModel {
    policy: SlopePolicy,
    samples: Vec<TrackSample>,
    slopes: Vec<f64>,
    max_elevation: f64,
}

impl ElevationModel {
    #[must_use]
    pub fn new(policy: SlopePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Replace the stored track with `samples` and rebuild the slope table.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NoPoints`] if `samples` is empty; the model is
    /// cleared in that case.
    pub fn load(&mut self, samples: &[TrackSample]) -> Result<(), ParseError> {
        let usable: Vec<TrackSample> = samples
            .iter()
            .copied()
            .filter(|s| s.elevation.is_finite() && s.distance.is_finite())
            .collect();
        if usable.len() < samples.len() {
            log::warn!(
                "{LOG_TRACK_REJECTED}: dropped {} non-finite samples",
                samples.len() - usable.len()
            );
        }
        if usable.is_empty() {
            self.clear();
            log::warn!("{LOG_TRACK_REJECTED}: {}", ParseError::NoPoints);
            return Err(ParseError::NoPoints);
        }

        self.slopes = usable
            .windows(2)
            .map(|pair| self.policy.slope(pair[0], pair[1]))
            .collect();
        self.max_elevation = usable
            .iter()
            .map(|s| s.elevation)
            .fold(f64::NEG_INFINITY, f64::max);
        self.samples = usable;
        log::info!(
            "{LOG_TRACK_LOADED}: {} samples, {} slopes, max elevation {:.1} ({})",
            self.samples.len(),
            self.slopes.len(),
            self.max_elevation,
            self.policy.as_str()
        );
        Ok(())
    }

    /// Parse GPX content and load its first track.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the document is malformed, has no tracks,
    /// or none of its points carry elevation. The model is cleared on error.
    pub fn load_gpx(&mut self, content: &[u8]) -> Result<(), ParseError> {
        match self::gpx::parse_track(content) {
            Ok(samples) => self.load(&samples),
            Err(err) => {
                log::warn!("{LOG_TRACK_REJECTED}: {err}");
                self.clear();
                Err(err)
            }
        }
    }

    /// Drop the loaded track; slope queries return 0 afterwards.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.slopes.clear();
        self.max_elevation = 0.0;
    }

    /// Switch slope derivation and rebuild the table for the current track.
    pub fn set_policy(&mut self, policy: SlopePolicy) {
        self.policy = policy;
        self.slopes = self
            .samples
            .windows(2)
            .map(|pair| policy.slope(pair[0], pair[1]))
            .collect();
    }

    /// Slope at `height`, mapped linearly onto the slope table (nearest below).
    #[must_use]
    pub fn slope_at(&self, height: f64) -> f64 {
        let Some(last) = self.slopes.len().checked_sub(1) else {
            return 0.0;
        };
        let reference = self.max_height();
        let index = if reference > 0.0 && height.is_finite() {
            floor_f64_to_usize((height / reference) * usize_to_f64(last))
        } else {
            0
        };
        self.slopes[index.min(last)]
    }

    /// Highest elevation on the loaded track, 0 when empty.
    #[must_use]
    pub fn max_height(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.max_elevation
        }
    }

    /// Project the track into `viewport` for drawing.
    #[must_use]
    pub fn elevation_profile(&self, viewport: ProfileViewport) -> ProfilePath {
        ProfilePath::project(&self.samples, viewport)
    }

    #[must_use]
    pub fn samples(&self) -> &[TrackSample] {
        &self.samples
    }

    #[must_use]
    pub fn slopes(&self) -> &[f64] {
        &self.slopes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub const fn policy(&self) -> SlopePolicy {
        self.policy
    }

    /// Distance from the first to the last sample.
    #[must_use]
    pub fn total_distance(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.distance - first.distance,
            _ => 0.0,
        }
    }
}
