// Copyright Catenary Transit Initiatives
// Data model for the address croquis tool

use serde::Deserialize;
use serde::Serialize;

/// Lifecycle of an address item. `NotFound` covers both "no results" and
/// "upstream failed"; re-running the geocoder moves the item back through
/// `Pending`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Pending,
    Found,
    Manual,
    NotFound,
}

impl Default for ItemStatus {
    fn default() -> Self {
        ItemStatus::Pending
    }
}

fn default_category() -> String {
    String::from("A")
}

/// One line of user input and everything derived from it. The wire names
/// (`type`, `displayName`) are fixed by the persisted file format.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AddressItem {
    pub id: String,
    pub raw: String,
    #[serde(rename = "type", default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(rename = "displayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross: Option<Vec<String>>,
}

impl AddressItem {
    pub fn new(raw: impl Into<String>) -> AddressItem {
        AddressItem {
            id: uuid::Uuid::new_v4().simple().to_string(),
            raw: raw.into(),
            category: default_category(),
            status: ItemStatus::Pending,
            lat: None,
            lon: None,
            display_name: None,
            street: None,
            cross: None,
        }
    }

    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// Label shown on the map: street + house number when known, the raw
    /// input otherwise.
    pub fn short_label(&self) -> &str {
        match &self.street {
            Some(street) if !street.trim().is_empty() => street,
            _ => &self.raw,
        }
    }
}

/// Subset of a Nominatim `address` object that the tool reads, reused as the
/// normalised address detail block on geocode candidates.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AddressDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub road: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        alias = "housenumber",
        alias = "addr:housenumber"
    )]
    pub house_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residential: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pedestrian: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighbourhood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suburb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub town: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl AddressDetails {
    /// Street name for labels, in the same preference order the map uses:
    /// road, then residential, pedestrian, neighbourhood, suburb.
    pub fn road_like(&self) -> Option<&str> {
        non_empty(&self.road)
            .or_else(|| non_empty(&self.residential))
            .or_else(|| non_empty(&self.pedestrian))
            .or_else(|| non_empty(&self.neighbourhood))
            .or_else(|| non_empty(&self.suburb))
    }

    /// "Road 1234" when a house number is known, "Road" otherwise.
    pub fn street_label(&self) -> Option<String> {
        let road = self.road_like()?;
        match non_empty(&self.house_number) {
            Some(hn) => Some(format!("{} {}", road, hn)),
            None => Some(road.to_string()),
        }
    }
}

/// One geocoder hit, normalised across providers. `lat`/`lon` are always
/// finite numbers here even though Nominatim sends them as strings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GeocodeCandidate {
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<AddressDetails>,
    pub geocoder: String,
}

/// The persisted document: a flat list, overwritten wholesale on save.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AddressBook {
    pub items: Vec<AddressItem>,
}

/// Named road near a point, with its minimal distance in metres.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WayCandidate {
    pub name: String,
    pub distance: f64,
}

/// Cross streets flanking a point ("entrecalles"): the two nearest distinct
/// road names, plus the candidate list they were picked from.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CrossStreets {
    pub between: Vec<String>,
    pub candidates: Vec<WayCandidate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_defaults() {
        let item = AddressItem::new("Av. Eva Per\u{f3}n 4100");
        assert_eq!(item.status, ItemStatus::Pending);
        assert_eq!(item.category, "A");
        assert!(item.position().is_none());
        assert_eq!(item.short_label(), "Av. Eva Per\u{f3}n 4100");
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&ItemStatus::NotFound).unwrap(),
            "\"notfound\""
        );
        assert_eq!(
            serde_json::from_str::<ItemStatus>("\"manual\"").unwrap(),
            ItemStatus::Manual
        );
    }

    #[test]
    fn test_item_wire_names() {
        let mut item = AddressItem::new("Lisandro de la Torre 800");
        item.category = String::from("B");
        item.status = ItemStatus::Found;
        item.lat = Some(-34.6457);
        item.lon = Some(-58.5036);
        item.display_name = Some(String::from("Lisandro de la Torre 800 \u{b7} Liniers \u{b7} CABA"));

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "B");
        assert_eq!(json["status"], "found");
        assert_eq!(
            json["displayName"],
            "Lisandro de la Torre 800 \u{b7} Liniers \u{b7} CABA"
        );
        // absent optionals are omitted, not null
        assert!(json.get("street").is_none());
        assert!(json.get("cross").is_none());
    }

    #[test]
    fn test_item_deserialize_minimal() {
        let item: AddressItem =
            serde_json::from_str(r#"{"id":"abc","raw":"Guaminí 1540"}"#).unwrap();
        assert_eq!(item.category, "A");
        assert_eq!(item.status, ItemStatus::Pending);
        assert!(item.lat.is_none());
    }

    #[test]
    fn test_short_label_prefers_street() {
        let mut item = AddressItem::new("algo ilegible");
        item.street = Some(String::from("Murguiondo 4100"));
        assert_eq!(item.short_label(), "Murguiondo 4100");
        item.street = Some(String::from("   "));
        assert_eq!(item.short_label(), "algo ilegible");
    }

    #[test]
    fn test_street_label_derivation() {
        let details = AddressDetails {
            road: Some(String::from("Av. Juan Bautista Alberdi")),
            house_number: Some(String::from("5500")),
            ..Default::default()
        };
        assert_eq!(
            details.street_label().unwrap(),
            "Av. Juan Bautista Alberdi 5500"
        );

        let fallback_to_suburb = AddressDetails {
            suburb: Some(String::from("Mataderos")),
            ..Default::default()
        };
        assert_eq!(fallback_to_suburb.street_label().unwrap(), "Mataderos");

        assert!(AddressDetails::default().street_label().is_none());
    }

    #[test]
    fn test_house_number_aliases() {
        let details: AddressDetails =
            serde_json::from_str(r#"{"road":"Pilar","addr:housenumber":"984"}"#).unwrap();
        assert_eq!(details.street_label().unwrap(), "Pilar 984");
    }
}
