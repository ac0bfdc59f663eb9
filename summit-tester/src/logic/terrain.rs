//! Track sources for tester runs: GPX files or seeded synthetic ridges.
use std::path::Path;

use anyhow::{Context, Result, bail};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use summit_game::TrackSample;
use summit_game::terrain::gpx::{parse_track, track_name};

const SYNTHETIC_POINTS: usize = 240;
const SYNTHETIC_BASE_ELEVATION: f64 = 300.0;

/// A track ready to hand to a session, plus what the report says about it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTrack {
    pub label: String,
    pub samples: Vec<TrackSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSummary {
    pub label: String,
    pub samples: usize,
    pub min_elevation: f64,
    pub max_elevation: f64,
    pub total_distance: f64,
}

impl LoadedTrack {
    /// Read and parse the first track of a GPX file.
    pub fn from_gpx_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let samples = parse_track(&content)
            .with_context(|| format!("failed to parse GPX track {}", path.display()))?;
        let label = track_name(&content).unwrap_or_else(|| path.display().to_string());
        Ok(Self { label, samples })
    }

    /// Deterministic random-walk ridge for `seed`.
    #[must_use]
    pub fn synthetic(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut distance = 0.0;
        let mut elevation = SYNTHETIC_BASE_ELEVATION;
        let mut samples = Vec::with_capacity(SYNTHETIC_POINTS);
        for _ in 0..SYNTHETIC_POINTS {
            samples.push(TrackSample::new(distance, elevation));
            distance += rng.gen_range(15.0..40.0);
            // Biased upward so the walk reads as a climb.
            elevation = (elevation + rng.gen_range(-4.0..6.0)).max(0.0);
        }
        Self {
            label: format!("synthetic-{seed}"),
            samples,
        }
    }

    pub fn summary(&self) -> Result<TrackSummary> {
        let (Some(first), Some(last)) = (self.samples.first(), self.samples.last()) else {
            bail!("track {} has no samples", self.label);
        };
        let (min_elevation, max_elevation) = self
            .samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s.elevation), hi.max(s.elevation))
            });
        Ok(TrackSummary {
            label: self.label.clone(),
            samples: self.samples.len(),
            min_elevation,
            max_elevation,
            total_distance: last.distance - first.distance,
        })
    }
}

/// Pick the track for a run; a GPX path wins over a synthetic seed.
pub fn resolve_track(gpx: Option<&Path>, synthetic_seed: Option<u64>) -> Result<Option<LoadedTrack>> {
    match (gpx, synthetic_seed) {
        (Some(path), _) => LoadedTrack::from_gpx_file(path).map(Some),
        (None, Some(seed)) => Ok(Some(LoadedTrack::synthetic(seed))),
        (None, None) => Ok(None),
    }
}
