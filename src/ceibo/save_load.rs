// Copyright Catenary Transit Initiatives
// Persistence endpoints: save/load the flat JSON document, GeoJSON export

use actix_web::{HttpResponse, Responder, web};
use croquis::models::{AddressBook, AddressItem};
use croquis::store::AddressStore;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry};
use std::sync::Arc;

#[actix_web::post("/api/save")]
pub async fn save(
    body: web::Json<AddressBook>,
    store: web::Data<Arc<AddressStore>>,
) -> impl Responder {
    match store.save(&body).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({"ok": true})),
        Err(e) => {
            eprintln!("Save error: {:?}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({"error": "Save failed"}))
        }
    }
}

#[actix_web::get("/api/load")]
pub async fn load(store: web::Data<Arc<AddressStore>>) -> impl Responder {
    match store.load().await {
        Ok(book) => HttpResponse::Ok().json(book),
        Err(e) => {
            eprintln!("Load error: {:?}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({"error": "Load failed"}))
        }
    }
}

fn item_to_feature(item: &AddressItem) -> Option<Feature> {
    let (lat, lon) = item.position()?;

    let mut properties = serde_json::map::Map::new();
    properties.insert(
        String::from("id"),
        serde_json::Value::String(item.id.clone()),
    );
    properties.insert(
        String::from("raw"),
        serde_json::Value::String(item.raw.clone()),
    );
    properties.insert(
        String::from("type"),
        serde_json::Value::String(item.category.clone()),
    );
    properties.insert(String::from("status"), serde_json::json!(item.status));
    if let Some(display_name) = &item.display_name {
        properties.insert(
            String::from("displayName"),
            serde_json::Value::String(display_name.clone()),
        );
    }
    if let Some(street) = &item.street {
        properties.insert(
            String::from("street"),
            serde_json::Value::String(street.clone()),
        );
    }
    if let Some(cross) = &item.cross {
        properties.insert(String::from("cross"), serde_json::json!(cross));
    }

    Some(Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::Point(vec![lon, lat]))),
        id: Some(geojson::feature::Id::String(item.id.clone())),
        properties: Some(properties),
        foreign_members: None,
    })
}

/// Located items of the persisted document as a GeoJSON FeatureCollection.
#[actix_web::get("/api/export.geojson")]
pub async fn export_geojson(store: web::Data<Arc<AddressStore>>) -> impl Responder {
    let book = match store.load().await {
        Ok(book) => book,
        Err(e) => {
            eprintln!("Export error: {:?}", e);
            return HttpResponse::InternalServerError()
                .json(serde_json::json!({"error": "Export failed"}));
        }
    };

    let features = book
        .items
        .iter()
        .filter_map(item_to_feature)
        .collect::<Vec<Feature>>();

    let mut foreign_members = serde_json::map::Map::new();
    foreign_members.insert(
        String::from("generated_at"),
        serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
    );

    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    };

    HttpResponse::Ok()
        .insert_header(("Content-Type", "application/geo+json"))
        .body(GeoJson::from(collection).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use croquis::models::ItemStatus;

    #[test]
    fn test_unlocated_items_are_not_features() {
        let item = AddressItem::new("pendiente");
        assert!(item_to_feature(&item).is_none());
    }

    #[test]
    fn test_feature_geometry_is_lon_lat() {
        let mut item = AddressItem::new("Murguiondo 4100");
        item.status = ItemStatus::Found;
        item.lat = Some(-34.6457);
        item.lon = Some(-58.5036);
        item.street = Some(String::from("Murguiondo 4100"));

        let feature = item_to_feature(&item).unwrap();
        match feature.geometry.unwrap().value {
            geojson::Value::Point(coords) => {
                assert_eq!(coords, vec![-58.5036, -34.6457]);
            }
            other => panic!("expected a point, got {:?}", other),
        }
        let properties = feature.properties.unwrap();
        assert_eq!(properties["status"], "found");
        assert_eq!(properties["street"], "Murguiondo 4100");
    }
}
