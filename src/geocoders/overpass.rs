// Copyright Catenary Transit Initiatives
// Overpass interpreter client: named highways around a point

use crate::cross_streets::OverpassResponse;
use crate::geocoders::{GeoClient, UpstreamError, expect_success};

/// Overpass QL for every named highway way within `radius` metres of the
/// point, with its member nodes recursed in.
pub fn highways_around_query(lat: f64, lon: f64, radius: f64) -> String {
    format!(
        "[out:json][timeout:25];\n(\n  way(around:{radius},{lat},{lon})[highway][name];\n);\n(._;>;);\nout body;",
        radius = radius,
        lat = lat,
        lon = lon
    )
}

pub async fn highways_around(
    client: &GeoClient,
    lat: f64,
    lon: f64,
    radius: f64,
) -> Result<OverpassResponse, UpstreamError> {
    let response = client
        .http
        .post(&client.overpass_base)
        .form(&[("data", highways_around_query(lat, lon, radius))])
        .send()
        .await?;
    let response = expect_success(response).await?;
    Ok(response.json().await?)
}
