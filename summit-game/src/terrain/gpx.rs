//! GPX ingestion for elevation tracks.

use super::{ParseError, TrackSample};
use crate::constants::EARTH_RADIUS_M;

/// Parse GPX content into distance/elevation samples from its first track.
///
/// Segments of the first track are concatenated in order. Points without an
/// `<ele>` element are skipped; distance still accumulates across them.
///
/// # Errors
///
/// Returns [`ParseError::Gpx`] for malformed input, [`ParseError::NoTracks`]
/// when the document holds no `<trk>`, [`ParseError::NoPoints`] for an empty
/// track and [`ParseError::NoElevation`] when no point carries elevation.
pub fn parse_track(content: &[u8]) -> Result<Vec<TrackSample>, ParseError> {
    let content_str = std::str::from_utf8(content)
        .map_err(|e| ParseError::Gpx(format!("Invalid UTF-8: {e}")))?;
    let gpx_data: gpx::Gpx =
        gpx::read(content_str.as_bytes()).map_err(|e| ParseError::Gpx(e.to_string()))?;

    let track = gpx_data.tracks.first().ok_or(ParseError::NoTracks)?;
    let points: Vec<&gpx::Waypoint> = track
        .segments
        .iter()
        .flat_map(|segment| segment.points.iter())
        .collect();
    if points.is_empty() {
        return Err(ParseError::NoPoints);
    }

    let mut samples = Vec::with_capacity(points.len());
    let mut distance = 0.0;
    let mut previous: Option<(f64, f64)> = None;
    let mut skipped = 0usize;
    for point in points {
        let lat = point.point().y();
        let lon = point.point().x();
        if let Some((prev_lat, prev_lon)) = previous {
            distance += haversine_distance(prev_lat, prev_lon, lat, lon);
        }
        previous = Some((lat, lon));

        match point.elevation {
            Some(elevation) => samples.push(TrackSample::new(distance, elevation)),
            None => skipped += 1,
        }
    }

    if samples.is_empty() {
        return Err(ParseError::NoElevation);
    }
    if skipped > 0 {
        log::warn!("skipped {skipped} track points without elevation");
    }
    Ok(samples)
}

/// Name of the first track, if the document declares one.
#[must_use]
pub fn track_name(content: &[u8]) -> Option<String> {
    let gpx_data = gpx::read(content).ok()?;
    gpx_data
        .tracks
        .first()
        .and_then(|track| track.name.clone())
        .or_else(|| gpx_data.metadata.and_then(|m| m.name))
}

/// Great-circle distance in metres between two coordinates (haversine).
#[must_use]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test">
  <trk>
    <name>Test Ridge</name>
    <trkseg>
      <trkpt lat="47.50" lon="-121.80"><ele>100</ele></trkpt>
      <trkpt lat="47.51" lon="-121.80"><ele>110</ele></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="47.52" lon="-121.80"><ele>90</ele></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn parses_segments_in_order() {
        let samples = parse_track(SAMPLE_GPX.as_bytes()).unwrap();
        let elevations: Vec<f64> = samples.iter().map(|s| s.elevation).collect();
        assert_eq!(elevations, vec![100.0, 110.0, 90.0]);
        assert!((samples[0].distance - 0.0).abs() < f64::EPSILON);
        // 0.01 degrees of latitude is roughly 1.11 km.
        assert!((samples[1].distance - 1_112.0).abs() < 5.0);
        assert!(samples[2].distance > samples[1].distance);
    }

    #[test]
    fn reads_track_name() {
        assert_eq!(
            track_name(SAMPLE_GPX.as_bytes()),
            Some("Test Ridge".to_string())
        );
    }

    #[test]
    fn rejects_document_without_tracks() {
        let gpx = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test">
  <wpt lat="45.5" lon="-122.5"><ele>100</ele></wpt>
</gpx>"#;
        assert_eq!(parse_track(gpx.as_bytes()), Err(ParseError::NoTracks));
    }

    #[test]
    fn rejects_empty_track() {
        let gpx = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test">
  <trk><name>Empty</name><trkseg></trkseg></trk>
</gpx>"#;
        assert_eq!(parse_track(gpx.as_bytes()), Err(ParseError::NoPoints));
    }

    #[test]
    fn rejects_points_without_elevation() {
        let gpx = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test">
  <trk><trkseg>
    <trkpt lat="45.5" lon="-122.5"></trkpt>
    <trkpt lat="45.6" lon="-122.5"></trkpt>
  </trkseg></trk>
</gpx>"#;
        assert_eq!(parse_track(gpx.as_bytes()), Err(ParseError::NoElevation));
    }

    #[test]
    fn rejects_malformed_xml() {
        let err = parse_track(b"<gpx><trk>").unwrap_err();
        assert!(matches!(err, ParseError::Gpx(_)));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = parse_track(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, ParseError::Gpx(msg) if msg.contains("UTF-8")));
    }

    #[test]
    fn haversine_is_zero_for_identical_points() {
        assert!(haversine_distance(10.0, 20.0, 10.0, 20.0).abs() < 1e-9);
    }
}
