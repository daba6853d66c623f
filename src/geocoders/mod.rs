// Copyright Catenary Transit Initiatives
// Clients for the upstream geocoding services

pub mod georef;
pub mod nominatim;
pub mod overpass;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upstream error {status}: {body}")]
    Status { status: u16, body: String },
}

/// Shared handle to the upstream services: one reqwest client plus the base
/// URLs, which are env-overridable so a local mirror can stand in.
#[derive(Clone, Debug)]
pub struct GeoClient {
    pub http: reqwest::Client,
    pub nominatim_base: String,
    pub georef_base: String,
    pub overpass_base: String,
}

impl GeoClient {
    pub fn new(http: reqwest::Client) -> GeoClient {
        GeoClient {
            http,
            nominatim_base: std::env::var("NOMINATIM_BASE_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            georef_base: std::env::var("GEOREF_BASE_URL")
                .unwrap_or_else(|_| "https://apis.datos.gob.ar/georef/api".to_string()),
            overpass_base: std::env::var("OVERPASS_BASE_URL")
                .unwrap_or_else(|_| "https://overpass-api.de/api/interpreter".to_string()),
        }
    }
}

/// Maps a non-2xx upstream response to [`UpstreamError::Status`], keeping the
/// body text for the error payload.
pub(crate) async fn expect_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, UpstreamError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(UpstreamError::Status { status, body })
    }
}
