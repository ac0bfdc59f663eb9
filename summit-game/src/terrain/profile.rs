//! Elevation profile projection for drawing the mountain silhouette.
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use super::TrackSample;
use crate::constants::{PROFILE_HEIGHT, PROFILE_TOP_MARGIN, PROFILE_WIDTH};
use crate::numbers::usize_to_f64;

/// Drawing area the profile is normalized into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileViewport {
    #[serde(default = "ProfileViewport::default_width")]
    pub width: f64,
    #[serde(default = "ProfileViewport::default_height")]
    pub height: f64,
    #[serde(default = "ProfileViewport::default_top_margin")]
    pub top_margin: f64,
}

impl ProfileViewport {
    const fn default_width() -> f64 {
        PROFILE_WIDTH
    }

    const fn default_height() -> f64 {
        PROFILE_HEIGHT
    }

    const fn default_top_margin() -> f64 {
        PROFILE_TOP_MARGIN
    }

    /// Vertical span available below the top margin.
    #[must_use]
    pub fn drawable_height(&self) -> f64 {
        (self.height - self.top_margin).max(0.0)
    }
}

impl Default for ProfileViewport {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            height: Self::default_height(),
            top_margin: Self::default_top_margin(),
        }
    }
}

/// Projected polyline; `y` grows downward as in SVG.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePath {
    pub points: Vec<(f64, f64)>,
}

impl ProfilePath {
    /// Project samples by index along x and by normalized elevation along y.
    #[must_use]
    pub fn project(samples: &[TrackSample], viewport: ProfileViewport) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let (min, max) = samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s.elevation), hi.max(s.elevation))
            });
        let range = max - min;
        let span = usize_to_f64(samples.len() - 1);
        let drawable = viewport.drawable_height();
        let baseline = viewport.height - viewport.top_margin;

        let points = samples
            .iter()
            .enumerate()
            .map(|(index, sample)| {
                let x = if span > 0.0 {
                    usize_to_f64(index) / span * viewport.width
                } else {
                    0.0
                };
                let normalized = if range > 0.0 {
                    (sample.elevation - min) / range
                } else {
                    0.0
                };
                (x, baseline - normalized * drawable)
            })
            .collect();
        Self { points }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// SVG path data: `M x,y L x,y ...` with two decimals.
    #[must_use]
    pub fn to_svg_path(&self) -> String {
        let mut path = String::new();
        for (index, (x, y)) in self.points.iter().enumerate() {
            let command = if index == 0 { "M" } else { " L" };
            let _ = write!(path, "{command}{x:.2},{y:.2}");
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(elevations: &[f64]) -> Vec<TrackSample> {
        elevations
            .iter()
            .enumerate()
            .map(|(i, &e)| TrackSample::new(usize_to_f64(i), e))
            .collect()
    }

    #[test]
    fn projects_into_default_viewport() {
        let path = ProfilePath::project(&samples(&[100.0, 150.0, 200.0]), ProfileViewport::default());
        assert_eq!(path.points, vec![(0.0, 180.0), (200.0, 90.0), (400.0, 0.0)]);
        assert_eq!(path.to_svg_path(), "M0.00,180.00 L200.00,90.00 L400.00,0.00");
    }

    #[test]
    fn flat_track_stays_on_baseline() {
        let path = ProfilePath::project(&samples(&[50.0, 50.0, 50.0]), ProfileViewport::default());
        assert!(path.points.iter().all(|(x, y)| x.is_finite() && (*y - 180.0).abs() < 1e-9));
    }

    #[test]
    fn single_sample_sits_at_origin_column() {
        let path = ProfilePath::project(&samples(&[75.0]), ProfileViewport::default());
        assert_eq!(path.points, vec![(0.0, 180.0)]);
    }

    #[test]
    fn empty_track_renders_nothing() {
        let path = ProfilePath::project(&[], ProfileViewport::default());
        assert!(path.is_empty());
        assert_eq!(path.to_svg_path(), "");
    }
}
