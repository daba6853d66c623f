// Copyright Catenary Transit Initiatives
// Batch geocoding and manual placement, run through the sequential pipeline

use actix_web::{HttpResponse, Responder, web};
use croquis::geocoders::GeoClient;
use croquis::models::{AddressBook, AddressItem};
use croquis::pipeline;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize, Clone, Debug)]
pub struct BatchRequest {
    /// Raw multi-line input, one address per line.
    pub text: String,
    #[serde(default)]
    pub restrict: bool,
}

/// Parses the input and geocodes every line, strictly one at a time.
#[actix_web::post("/api/geocode_batch")]
pub async fn geocode_batch(
    body: web::Json<BatchRequest>,
    client: web::Data<Arc<GeoClient>>,
) -> impl Responder {
    let mut items = pipeline::parse_input_lines(&body.text);
    pipeline::geocode_all(client.as_ref(), &mut items, body.restrict).await;
    HttpResponse::Ok().json(AddressBook { items })
}

#[derive(Deserialize, Clone, Debug)]
pub struct ManualPlaceRequest {
    pub item: AddressItem,
    pub lat: f64,
    pub lon: f64,
}

/// Pins an item to hand-picked coordinates and enriches it best-effort.
#[actix_web::post("/api/manual")]
pub async fn manual_place(
    body: web::Json<ManualPlaceRequest>,
    client: web::Data<Arc<GeoClient>>,
) -> impl Responder {
    if !body.lat.is_finite() || !body.lon.is_finite() {
        return HttpResponse::BadRequest().json(serde_json::json!({"error": "Missing lat/lon"}));
    }
    let mut item = body.item.clone();
    pipeline::set_manual(client.as_ref(), &mut item, body.lat, body.lon).await;
    HttpResponse::Ok().json(item)
}
