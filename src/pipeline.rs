// Copyright Catenary Transit Initiatives
// Sequential geocode-then-enrich pipeline over a batch of address items

use crate::cross_streets;
use crate::fallback;
use crate::geocoders::{GeoClient, nominatim, overpass};
use crate::models::{AddressDetails, AddressItem, GeocodeCandidate, ItemStatus};

/// One pending item per non-empty trimmed input line.
pub fn parse_input_lines(text: &str) -> Vec<AddressItem> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(AddressItem::new)
        .collect()
}

/// Applies the winning candidate to an item and marks it found.
pub fn apply_geocode_hit(item: &mut AddressItem, best: &GeocodeCandidate) {
    item.lat = Some(best.lat);
    item.lon = Some(best.lon);
    item.display_name = Some(best.display_name.clone());
    if let Some(street) = best.address.as_ref().and_then(AddressDetails::street_label) {
        item.street = Some(street);
    }
    item.status = ItemStatus::Found;
}

/// Folds a reverse-geocode response into the item: a street-only label and a
/// "calle altura · barrio · ciudad" display name.
pub fn apply_reverse(item: &mut AddressItem, reverse: &serde_json::Value) {
    let Some(address_value) = reverse.get("address") else {
        return;
    };
    let Ok(address) = serde_json::from_value::<AddressDetails>(address_value.clone()) else {
        return;
    };

    if let Some(street) = address.street_label() {
        item.street = Some(street);
    }

    let non_empty = |field: &Option<String>| -> Option<String> {
        field.clone().filter(|s| !s.trim().is_empty())
    };

    let barrio = non_empty(&address.suburb)
        .or_else(|| non_empty(&address.neighbourhood))
        .unwrap_or_default();
    let calle = non_empty(&address.road).unwrap_or_default();
    let altura = non_empty(&address.house_number).unwrap_or_default();
    let ciudad = non_empty(&address.city)
        .or_else(|| non_empty(&address.town))
        .unwrap_or_else(|| String::from("CABA"));

    // street + number only when the street itself is known
    let calle_altura = if calle.is_empty() {
        String::new()
    } else {
        format!("{} {}", calle, altura).trim_end().to_string()
    };
    let nota = [calle_altura.as_str(), barrio.as_str(), ciudad.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<&str>>()
        .join(" \u{b7} ");

    if !nota.is_empty() {
        item.display_name = Some(nota);
    }
}

/// Best-effort enrichment of a located item: reverse geocode, then nearby
/// cross streets. Failures are swallowed; the item status never changes here.
pub async fn enrich(client: &GeoClient, item: &mut AddressItem) {
    let Some((lat, lon)) = item.position() else {
        return;
    };

    match nominatim::reverse(client, lat, lon).await {
        Ok(reverse) => apply_reverse(item, &reverse),
        Err(e) => eprintln!("reverse enrichment failed for {}: {}", item.id, e),
    }

    match overpass::highways_around(client, lat, lon, cross_streets::DEFAULT_RADIUS_M).await {
        Ok(response) => {
            let cross = cross_streets::nearest_cross_streets(lat, lon, &response);
            if !cross.between.is_empty() {
                item.cross = Some(cross.between);
            }
        }
        Err(e) => eprintln!("cross street enrichment failed for {}: {}", item.id, e),
    }
}

/// Geocodes one item through the fallback chain. Empty results and upstream
/// errors both degrade to `notfound`.
pub async fn geocode_item(client: &GeoClient, item: &mut AddressItem, restrict: bool) {
    item.status = ItemStatus::Pending;

    match fallback::geocode_query(client, &item.raw, restrict).await {
        Ok(candidates) if !candidates.is_empty() => {
            apply_geocode_hit(item, &candidates[0]);
            enrich(client, item).await;
        }
        Ok(_) => {
            item.status = ItemStatus::NotFound;
        }
        Err(e) => {
            eprintln!("geocode error for {:?}: {}", item.raw, e);
            item.status = ItemStatus::NotFound;
        }
    }
}

/// Geocodes a batch strictly one item at a time. The sequencing is the rate
/// limit: one upstream round trip finishes before the next begins.
pub async fn geocode_all(client: &GeoClient, items: &mut [AddressItem], restrict: bool) {
    for item in items.iter_mut() {
        geocode_item(client, item, restrict).await;
    }
}

/// Places an item by hand, then runs the same best-effort enrichment.
pub async fn set_manual(client: &GeoClient, item: &mut AddressItem, lat: f64, lon: f64) {
    item.lat = Some(lat);
    item.lon = Some(lon);
    item.status = ItemStatus::Manual;
    enrich(client, item).await;
}
