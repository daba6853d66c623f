// Copyright Catenary Transit Initiatives
// Derivation of "entrecalles": the nearest named roads around a point,
// computed from Overpass way geometry

use crate::models::{CrossStreets, WayCandidate};
use ahash::AHashMap;
use geo_types::Point;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::Deserialize;

pub const MIN_RADIUS_M: f64 = 40.0;
pub const MAX_RADIUS_M: f64 = 120.0;
pub const DEFAULT_RADIUS_M: f64 = 60.0;

/// Highway classes that never count as a cross street.
pub const SKIP_HIGHWAY_CLASSES: [&str; 6] = [
    "footway",
    "path",
    "cycleway",
    "steps",
    "bridleway",
    "track",
];

/// Keep this many distinct candidates; the first two are the entrecalles.
const MAX_CANDIDATES: usize = 3;

/// Metres per degree of latitude / longitude (at the equator) for the local
/// flat approximation. Good enough at street scale.
const METRES_PER_DEG_LAT: f64 = 110_540.0;
const METRES_PER_DEG_LON: f64 = 111_320.0;

pub fn clamp_radius(requested: Option<f64>) -> f64 {
    let radius = requested.filter(|r| r.is_finite()).unwrap_or(DEFAULT_RADIUS_M);
    radius.clamp(MIN_RADIUS_M, MAX_RADIUS_M)
}

/// One element of an Overpass `out body` response. Only the fields the
/// cross-street pass reads are modelled.
#[derive(Clone, Debug, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub nodes: Vec<i64>,
    #[serde(default)]
    pub tags: AHashMap<String, String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

/// Picks the nearest distinct named roads around (lat, lon).
///
/// Ways are scored by the minimal distance from the point to their polyline,
/// non-vehicular classes are skipped, and names are deduplicated
/// case-insensitively so a dual carriageway does not fill both slots.
pub fn nearest_cross_streets(lat: f64, lon: f64, response: &OverpassResponse) -> CrossStreets {
    let mut node_positions: AHashMap<i64, Point<f64>> = AHashMap::new();
    for element in &response.elements {
        if element.kind == "node" {
            if let (Some(node_lat), Some(node_lon)) = (element.lat, element.lon) {
                node_positions.insert(element.id, Point::new(node_lon, node_lat));
            }
        }
    }

    let mut ways: Vec<WayCandidate> = Vec::new();
    for element in &response.elements {
        if element.kind != "way" {
            continue;
        }
        let Some(name) = element.tags.get("name") else {
            continue;
        };
        let Some(highway) = element.tags.get("highway") else {
            continue;
        };
        if SKIP_HIGHWAY_CLASSES.contains(&highway.as_str()) {
            continue;
        }

        let polyline: Vec<Point<f64>> = element
            .nodes
            .iter()
            .filter_map(|node_id| node_positions.get(node_id).copied())
            .collect();
        if polyline.len() < 2 {
            continue;
        }

        ways.push(WayCandidate {
            name: name.clone(),
            distance: min_distance_to_polyline(lat, lon, &polyline),
        });
    }

    ways.sort_by_key(|way| OrderedFloat(way.distance));

    let unique: Vec<WayCandidate> = ways
        .into_iter()
        .unique_by(|way| way.name.to_lowercase())
        .take(MAX_CANDIDATES)
        .collect();

    let between = unique
        .iter()
        .take(2)
        .map(|way| way.name.clone())
        .collect();

    CrossStreets {
        between,
        candidates: unique,
    }
}

/// Minimal distance in metres from (lat, lon) to a polyline of (lon, lat)
/// points.
pub fn min_distance_to_polyline(lat: f64, lon: f64, polyline: &[Point<f64>]) -> f64 {
    let mut min = f64::INFINITY;
    for segment in polyline.windows(2) {
        let d = point_to_segment_metres(lat, lon, segment[0], segment[1]);
        if d < min {
            min = d;
        }
    }
    min
}

/// Distance from a point to a segment, in a local flat projection centred on
/// the query latitude.
fn point_to_segment_metres(lat: f64, lon: f64, a: Point<f64>, b: Point<f64>) -> f64 {
    let cos_lat = lat.to_radians().cos();
    let to_xy = |point_lat: f64, point_lon: f64| -> (f64, f64) {
        (
            point_lon * METRES_PER_DEG_LON * cos_lat,
            point_lat * METRES_PER_DEG_LAT,
        )
    };

    let (px, py) = to_xy(lat, lon);
    let (x1, y1) = to_xy(a.y(), a.x());
    let (x2, y2) = to_xy(b.y(), b.x());

    let dx = x2 - x1;
    let dy = y2 - y1;
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return (px - x1).hypot(py - y1);
    }
    let t = (((px - x1) * dx + (py - y1) * dy) / len2).clamp(0.0, 1.0);
    let cx = x1 + t * dx;
    let cy = y1 + t * dy;
    (px - cx).hypot(py - cy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64, lat: f64, lon: f64) -> OverpassElement {
        OverpassElement {
            kind: String::from("node"),
            id,
            lat: Some(lat),
            lon: Some(lon),
            nodes: vec![],
            tags: AHashMap::new(),
        }
    }

    fn way(id: i64, name: &str, highway: &str, nodes: Vec<i64>) -> OverpassElement {
        let mut tags = AHashMap::new();
        tags.insert(String::from("name"), String::from(name));
        tags.insert(String::from("highway"), String::from(highway));
        OverpassElement {
            kind: String::from("way"),
            id,
            lat: None,
            lon: None,
            nodes,
            tags,
        }
    }

    // A tiny grid around (-34.6457, -58.5036): one street ~11m east of the
    // query point running north-south, another ~55m north running east-west.
    fn grid() -> OverpassResponse {
        OverpassResponse {
            elements: vec![
                node(1, -34.6460, -58.50348),
                node(2, -34.6454, -58.50348),
                node(3, -34.64620, -58.5040),
                node(4, -34.64620, -58.5030),
                way(10, "Murguiondo", "residential", vec![1, 2]),
                way(11, "Av. Eva Per\u{f3}n", "primary", vec![3, 4]),
            ],
        }
    }

    #[test]
    fn test_clamp_radius() {
        assert_eq!(clamp_radius(None), DEFAULT_RADIUS_M);
        assert_eq!(clamp_radius(Some(10.0)), MIN_RADIUS_M);
        assert_eq!(clamp_radius(Some(500.0)), MAX_RADIUS_M);
        assert_eq!(clamp_radius(Some(80.0)), 80.0);
        assert_eq!(clamp_radius(Some(f64::NAN)), DEFAULT_RADIUS_M);
    }

    #[test]
    fn test_nearest_two_roads_in_distance_order() {
        let result = nearest_cross_streets(-34.6457, -58.5036, &grid());
        assert_eq!(
            result.between,
            vec![String::from("Murguiondo"), String::from("Av. Eva Per\u{f3}n")]
        );
        assert!(result.candidates[0].distance < result.candidates[1].distance);
    }

    #[test]
    fn test_footways_are_skipped() {
        let mut response = grid();
        // a footway right through the query point must not win
        response.elements.push(node(5, -34.6457, -58.5040));
        response.elements.push(node(6, -34.6457, -58.5030));
        response
            .elements
            .push(way(12, "Pasaje peatonal", "footway", vec![5, 6]));

        let result = nearest_cross_streets(-34.6457, -58.5036, &response);
        assert!(
            !result.between.iter().any(|n| n == "Pasaje peatonal"),
            "footways must never be entrecalles"
        );
    }

    #[test]
    fn test_duplicate_names_collapse_case_insensitively() {
        let mut response = grid();
        // same street surveyed twice with different casing
        response.elements.push(node(7, -34.6460, -58.50346));
        response.elements.push(node(8, -34.6454, -58.50346));
        response
            .elements
            .push(way(13, "MURGUIONDO", "residential", vec![7, 8]));

        let result = nearest_cross_streets(-34.6457, -58.5036, &response);
        let murguiondos = result
            .candidates
            .iter()
            .filter(|c| c.name.eq_ignore_ascii_case("murguiondo"))
            .count();
        assert_eq!(murguiondos, 1);
    }

    #[test]
    fn test_ways_without_geometry_ignored() {
        let response = OverpassResponse {
            elements: vec![
                node(1, -34.6460, -58.50348),
                // second node missing from the response
                way(10, "Fantasma", "residential", vec![1, 99]),
            ],
        };
        let result = nearest_cross_streets(-34.6457, -58.5036, &response);
        assert!(result.between.is_empty());
        assert!(result.candidates.is_empty());
    }

    #[test]
    fn test_unnamed_ways_ignored() {
        let mut tags = AHashMap::new();
        tags.insert(String::from("highway"), String::from("residential"));
        let response = OverpassResponse {
            elements: vec![
                node(1, -34.6460, -58.50348),
                node(2, -34.6454, -58.50348),
                OverpassElement {
                    kind: String::from("way"),
                    id: 10,
                    lat: None,
                    lon: None,
                    nodes: vec![1, 2],
                    tags,
                },
            ],
        };
        let result = nearest_cross_streets(-34.6457, -58.5036, &response);
        assert!(result.candidates.is_empty());
    }

    #[test]
    fn test_point_to_segment_projection() {
        // Query point due west of a vertical segment: distance is the
        // longitude gap, not the distance to an endpoint.
        let a = Point::new(-58.5030, -34.6460);
        let b = Point::new(-58.5030, -34.6450);
        let d = min_distance_to_polyline(-34.6455, -58.5036, &[a, b]);
        let expected = 0.0006 * METRES_PER_DEG_LON * (-34.6455_f64).to_radians().cos();
        assert!((d - expected).abs() < 0.5, "got {}, expected {}", d, expected);
    }

    #[test]
    fn test_candidates_capped_at_three() {
        let mut response = grid();
        response.elements.push(node(20, -34.6466, -58.5040));
        response.elements.push(node(21, -34.6466, -58.5030));
        response
            .elements
            .push(way(14, "Pil\u{e1}r", "residential", vec![20, 21]));
        response.elements.push(node(22, -34.6470, -58.5040));
        response.elements.push(node(23, -34.6470, -58.5030));
        response
            .elements
            .push(way(15, "Tapalqu\u{e9}", "residential", vec![22, 23]));

        let result = nearest_cross_streets(-34.6457, -58.5036, &response);
        assert_eq!(result.candidates.len(), 3);
        assert_eq!(result.between.len(), 2);
    }
}
