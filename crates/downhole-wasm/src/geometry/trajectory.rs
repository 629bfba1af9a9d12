//! Straight-segment desurveying of deviated holes.
//!
//! Each survey station's dip and azimuth apply to the segment ending at that
//! station. The collar is the implicit first station at depth 0, so the first
//! segment runs from the collar to the shallowest surveyed depth.

use super::types::{BoundingBox, Point3, SurveyStation};

/// Zips depth, dip and azimuth samples into complete stations.
///
/// Rows missing any of the three values, or carrying a non-finite one, are
/// dropped. The survivors are sorted by depth, keeping source order for equal
/// depths.
pub fn complete_stations(
    depths: &[Option<f64>],
    dips: &[Option<f64>],
    azimuths: &[Option<f64>],
) -> Vec<SurveyStation> {
    let mut stations: Vec<SurveyStation> = depths
        .iter()
        .zip(dips)
        .zip(azimuths)
        .filter_map(|((depth, dip), azimuth)| {
            let depth = depth.filter(|v| v.is_finite())?;
            let dip = dip.filter(|v| v.is_finite())?;
            let azimuth = azimuth.filter(|v| v.is_finite())?;
            Some(SurveyStation {
                depth,
                dip,
                azimuth,
            })
        })
        .collect();
    stations.sort_by(|a, b| a.depth.total_cmp(&b.depth));
    stations
}

/// Integrates stations from the collar into a polyline.
///
/// The returned trajectory starts with the collar itself followed by one point
/// per station. `stations` must already be sorted by depth.
pub fn desurvey(collar: Point3, stations: &[SurveyStation]) -> Vec<Point3> {
    let mut points = Vec::with_capacity(stations.len() + 1);
    points.push(collar);

    let mut current = collar;
    let mut previous_depth = 0.0;
    for station in stations {
        let step = station.depth - previous_depth;
        previous_depth = station.depth;

        let dip = station.dip.to_radians();
        let azimuth = station.azimuth.to_radians();

        let horizontal = step * dip.sin();
        let down = step * dip.cos();
        let north = horizontal * azimuth.cos();
        let east = horizontal * azimuth.sin();

        current = Point3 {
            x: current.x + east,
            y: current.y + north,
            z: current.z - down,
        };
        points.push(current);
    }

    points
}

/// Bounding box of one hole's trajectory.
///
/// Returns `None` when no complete survey row remains after dropping missing
/// values; such a hole contributes nothing, not even its collar.
pub fn hole_bounding_box(
    collar: Point3,
    depths: &[Option<f64>],
    dips: &[Option<f64>],
    azimuths: &[Option<f64>],
) -> Option<BoundingBox> {
    let stations = complete_stations(depths, dips, azimuths);
    if stations.is_empty() {
        return None;
    }
    BoundingBox::from_points(&desurvey(collar, &stations))
}

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::expect_used)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn vertical_hole_drops_straight_down() {
        let collar = Point3::new(10.0, 20.0, 100.0);
        let b = hole_bounding_box(
            collar,
            &[Some(5.0), Some(15.0)],
            &[Some(0.0), Some(0.0)],
            &[Some(0.0), Some(0.0)],
        )
        .expect("complete rows");
        assert_close(b.min_x, 10.0);
        assert_close(b.max_x, 10.0);
        assert_close(b.min_y, 20.0);
        assert_close(b.max_y, 20.0);
        assert_close(b.min_z, 85.0);
        assert_close(b.max_z, 100.0);
    }

    #[test]
    fn horizontal_north_station_moves_y_only() {
        let b = hole_bounding_box(
            Point3::new(0.0, 0.0, 50.0),
            &[Some(10.0)],
            &[Some(90.0)],
            &[Some(0.0)],
        )
        .expect("complete row");
        assert_close(b.min_y, 0.0);
        assert_close(b.max_y, 10.0);
        assert_close(b.min_z, 50.0);
        assert_close(b.max_z, 50.0);
        assert_close(b.min_x, 0.0);
        assert_close(b.max_x, 0.0);
    }

    #[test]
    fn horizontal_east_station_moves_x() {
        let points = desurvey(
            Point3::new(0.0, 0.0, 0.0),
            &[SurveyStation {
                depth: 4.0,
                dip: 90.0,
                azimuth: 90.0,
            }],
        );
        assert_eq!(points.len(), 2);
        assert_close(points[1].x, 4.0);
        assert_close(points[1].y, 0.0);
        assert_close(points[1].z, 0.0);
    }

    #[test]
    fn first_step_is_measured_from_collar() {
        let points = desurvey(
            Point3::new(0.0, 0.0, 0.0),
            &[
                SurveyStation {
                    depth: 3.0,
                    dip: 0.0,
                    azimuth: 0.0,
                },
                SurveyStation {
                    depth: 7.0,
                    dip: 90.0,
                    azimuth: 180.0,
                },
            ],
        );
        assert_eq!(points.len(), 3);
        assert_close(points[1].z, -3.0);
        assert_close(points[2].z, -3.0);
        assert_close(points[2].y, -4.0);
    }

    #[test]
    fn incomplete_rows_are_dropped_and_rest_sorted() {
        let stations = complete_stations(
            &[Some(20.0), Some(10.0), None, Some(30.0), Some(5.0)],
            &[Some(0.0), Some(0.0), Some(0.0), None, Some(f64::NAN)],
            &[Some(0.0), Some(0.0), Some(0.0), Some(0.0), Some(0.0)],
        );
        let depths: Vec<f64> = stations.iter().map(|s| s.depth).collect();
        assert_eq!(depths, vec![10.0, 20.0]);
    }

    #[test]
    fn hole_without_complete_rows_has_no_box() {
        let b = hole_bounding_box(
            Point3::new(0.0, 0.0, 0.0),
            &[Some(1.0), Some(2.0)],
            &[None, Some(0.0)],
            &[Some(0.0), None],
        );
        assert_eq!(b, None);
    }

    #[test]
    fn non_finite_values_count_as_missing() {
        let b = hole_bounding_box(
            Point3::new(0.0, 0.0, 0.0),
            &[Some(f64::INFINITY), Some(5.0), Some(8.0)],
            &[Some(0.0), Some(0.0), Some(f64::NEG_INFINITY)],
            &[Some(0.0), Some(0.0), Some(0.0)],
        )
        .expect("one finite row");
        assert_eq!(b.to_array(), [0.0, 0.0, 0.0, 0.0, -5.0, 0.0]);
    }

    #[test]
    fn unsorted_input_matches_sorted_input() {
        let collar = Point3::new(0.0, 0.0, 0.0);
        let sorted = hole_bounding_box(
            collar,
            &[Some(10.0), Some(20.0)],
            &[Some(30.0), Some(60.0)],
            &[Some(45.0), Some(90.0)],
        );
        let shuffled = hole_bounding_box(
            collar,
            &[Some(20.0), Some(10.0)],
            &[Some(60.0), Some(30.0)],
            &[Some(90.0), Some(45.0)],
        );
        assert_eq!(sorted, shuffled);
    }
}
