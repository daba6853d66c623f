// Copyright Catenary Transit Initiatives
// Entrecalles endpoint: nearest named roads around a point, via Overpass

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use croquis::cross_streets;
use croquis::geocoders::{GeoClient, UpstreamError, overpass};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize, Clone, Debug)]
pub struct IntersectionsQuery {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub radius: Option<f64>,
}

#[actix_web::get("/api/intersections")]
pub async fn intersections(
    query: web::Query<IntersectionsQuery>,
    client: web::Data<Arc<GeoClient>>,
) -> impl Responder {
    let (lat, lon) = match (query.lat, query.lon) {
        (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => (lat, lon),
        _ => {
            return HttpResponse::BadRequest()
                .json(serde_json::json!({"error": "Missing lat/lon"}));
        }
    };
    let radius = cross_streets::clamp_radius(query.radius);

    match overpass::highways_around(client.as_ref(), lat, lon, radius).await {
        Ok(response) => {
            HttpResponse::Ok().json(cross_streets::nearest_cross_streets(lat, lon, &response))
        }
        Err(UpstreamError::Status { status, body }) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            HttpResponse::build(status)
                .json(serde_json::json!({"error": "Upstream error", "details": body}))
        }
        Err(e) => {
            eprintln!("Intersections error: {}", e);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({"error": "Intersections failed"}))
        }
    }
}
