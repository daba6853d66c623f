// Copyright Catenary Transit Initiatives
// Geocoding endpoint: intersection fast path, then Nominatim with
// restriction filtering

use actix_web::{HttpResponse, Responder, web};
use croquis::fallback;
use croquis::geocoders::GeoClient;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize, Clone, Debug)]
pub struct GeocodeQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub restrict: Option<String>,
    /// "georef" selects the Georef direcciones chain; anything else gets the
    /// default Nominatim chain.
    #[serde(default)]
    pub engine: Option<String>,
}

#[actix_web::get("/api/geocode")]
pub async fn geocode(
    query: web::Query<GeocodeQuery>,
    client: web::Data<Arc<GeoClient>>,
) -> impl Responder {
    let q = query.q.as_deref().unwrap_or("").trim().to_string();
    let restrict = query.restrict.as_deref() == Some("comuna9");

    if q.is_empty() {
        return HttpResponse::BadRequest()
            .json(serde_json::json!({"error": "Missing query parameter q"}));
    }

    let chain = match query.engine.as_deref() {
        Some("georef") => fallback::geocode_query_georef(client.as_ref(), &q, restrict).await,
        _ => fallback::geocode_query(client.as_ref(), &q, restrict).await,
    };

    match chain {
        Ok(results) => HttpResponse::Ok().json(results),
        Err(e) => {
            eprintln!("Geocode error: {}", e);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({"error": "Geocode failed"}))
        }
    }
}
