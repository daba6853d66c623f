// Copyright Catenary Transit Initiatives
// Reverse geocoding proxy, forwarded verbatim from Nominatim

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use croquis::geocoders::{GeoClient, UpstreamError, nominatim};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize, Clone, Debug)]
pub struct ReverseQuery {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

#[actix_web::get("/api/reverse")]
pub async fn reverse(
    query: web::Query<ReverseQuery>,
    client: web::Data<Arc<GeoClient>>,
) -> impl Responder {
    let (lat, lon) = match (query.lat, query.lon) {
        (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => (lat, lon),
        _ => {
            return HttpResponse::BadRequest()
                .json(serde_json::json!({"error": "Missing lat/lon"}));
        }
    };

    match nominatim::reverse(client.as_ref(), lat, lon).await {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(UpstreamError::Status { status, body }) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            HttpResponse::build(status)
                .json(serde_json::json!({"error": "Upstream error", "details": body}))
        }
        Err(e) => {
            eprintln!("Reverse error: {}", e);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({"error": "Reverse failed"}))
        }
    }
}
