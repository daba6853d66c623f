// Copyright Catenary Transit Initiatives
// On-map label merging: greedy pixel-distance grouping of nearby points

use crate::models::AddressItem;
use serde::Deserialize;
use serde::Serialize;
use std::f64::consts::PI;

/// Two labels closer than this (in container pixels) collapse into one.
pub const MERGE_PX: f64 = 28.0;

/// The viewport is padded by this ratio on each axis before the visibility
/// test, so labels just off-screen are still computed.
pub const VIEW_PAD_RATIO: f64 = 0.2;

const TILE_SIZE: f64 = 256.0;

/// Web Mercator clamps latitude; beyond this the projection diverges.
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Absolute Web Mercator pixel coordinates of a lat/lon at a zoom level.
pub fn project(lat: f64, lon: f64, zoom: f64) -> (f64, f64) {
    let scale = TILE_SIZE * 2_f64.powf(zoom);
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = (lon + 180.0) / 360.0 * scale;
    let y = (0.5 - (PI / 4.0 + lat.to_radians() / 2.0).tan().ln() / (2.0 * PI)) * scale;
    (x, y)
}

/// Inverse of [`project`].
pub fn unproject(x: f64, y: f64, zoom: f64) -> (f64, f64) {
    let scale = TILE_SIZE * 2_f64.powf(zoom);
    let lon = x / scale * 360.0 - 180.0;
    let lat_rad = 2.0 * (((0.5 - y / scale) * 2.0 * PI).exp().atan() - PI / 4.0);
    (lat_rad.to_degrees(), lon)
}

/// The visible map: centre, zoom and container size in CSS pixels.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Viewport {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: f64,
    pub width_px: f64,
    pub height_px: f64,
}

impl Viewport {
    /// Absolute pixel position of the container's top-left corner.
    fn top_left(&self) -> (f64, f64) {
        let (cx, cy) = project(self.center_lat, self.center_lon, self.zoom);
        (cx - self.width_px / 2.0, cy - self.height_px / 2.0)
    }

    /// Container-pixel position of a lat/lon (0,0 = top-left corner).
    pub fn container_point(&self, lat: f64, lon: f64) -> (f64, f64) {
        let (tx, ty) = self.top_left();
        let (x, y) = project(lat, lon, self.zoom);
        (x - tx, y - ty)
    }

    /// Lat/lon under a container-pixel position.
    pub fn latlng_at(&self, x: f64, y: f64) -> (f64, f64) {
        let (tx, ty) = self.top_left();
        unproject(tx + x, ty + y, self.zoom)
    }

    /// Whether a container point falls inside the padded viewport.
    pub fn contains_padded(&self, point: (f64, f64)) -> bool {
        let pad_x = self.width_px * VIEW_PAD_RATIO;
        let pad_y = self.height_px * VIEW_PAD_RATIO;
        point.0 >= -pad_x
            && point.0 <= self.width_px + pad_x
            && point.1 >= -pad_y
            && point.1 <= self.height_px + pad_y
    }
}

/// One merged on-map label.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MergedLabel {
    pub lat: f64,
    pub lon: f64,
    pub text: String,
    pub count: usize,
}

struct VisiblePoint<'a> {
    item: &'a AddressItem,
    px: (f64, f64),
}

/// Groups visible located items into merged labels.
///
/// Greedy single pass in input order: each not-yet-grouped point absorbs
/// every other ungrouped point within [`MERGE_PX`] of it. The label sits at
/// the pixel centroid of the group and joins the member short-labels with
/// " - ". Order-dependent; re-run on every viewport change.
pub fn merge_labels(items: &[AddressItem], viewport: &Viewport) -> Vec<MergedLabel> {
    let mut visible: Vec<VisiblePoint> = Vec::new();

    for item in items {
        let Some((lat, lon)) = item.position() else {
            continue;
        };
        if !lat.is_finite() || !lon.is_finite() {
            continue;
        }
        let px = viewport.container_point(lat, lon);
        if viewport.contains_padded(px) {
            visible.push(VisiblePoint { item, px });
        }
    }

    let mut used = vec![false; visible.len()];
    let mut labels = Vec::new();

    for i in 0..visible.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        let mut group = vec![&visible[i]];

        for j in (i + 1)..visible.len() {
            if used[j] {
                continue;
            }
            let dx = visible[j].px.0 - visible[i].px.0;
            let dy = visible[j].px.1 - visible[i].px.1;
            if dx.hypot(dy) <= MERGE_PX {
                group.push(&visible[j]);
                used[j] = true;
            }
        }

        let mut cx = 0.0;
        let mut cy = 0.0;
        for member in &group {
            cx += member.px.0;
            cy += member.px.1;
        }
        cx /= group.len() as f64;
        cy /= group.len() as f64;

        let (lat, lon) = viewport.latlng_at(cx, cy);
        let text = group
            .iter()
            .map(|member| member.item.short_label())
            .collect::<Vec<&str>>()
            .join(" - ");

        labels.push(MergedLabel {
            lat,
            lon,
            text,
            count: group.len(),
        });
    }

    labels
}
