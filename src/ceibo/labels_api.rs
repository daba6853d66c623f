// Copyright Catenary Transit Initiatives
// Merged on-map labels for a viewport

use actix_web::{HttpResponse, Responder, web};
use croquis::clustering::{MergedLabel, Viewport, merge_labels};
use croquis::models::AddressItem;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Clone, Debug)]
pub struct LabelsRequest {
    pub items: Vec<AddressItem>,
    pub viewport: Viewport,
}

#[derive(Serialize, Clone, Debug)]
pub struct LabelsResponse {
    pub labels: Vec<MergedLabel>,
}

#[actix_web::post("/api/labels")]
pub async fn labels(body: web::Json<LabelsRequest>) -> impl Responder {
    let labels = merge_labels(&body.items, &body.viewport);
    HttpResponse::Ok().json(LabelsResponse { labels })
}
