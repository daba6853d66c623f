// Copyright Catenary Transit Initiatives
// Nominatim search + reverse client, with the Comuna 9 membership filter

use crate::geocoders::{GeoClient, UpstreamError, expect_success};
use crate::models::{AddressDetails, GeocodeCandidate};
use crate::{CABA_VIEWBOX, COMUNA9_BARRIOS};
use serde::Deserialize;

/// One row of a Nominatim `search` response. Coordinates arrive as strings.
#[derive(Clone, Debug, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub address: Option<AddressDetails>,
}

pub fn search_params(query: &str, use_caba_box: bool) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("q", query.to_string()),
        ("format", String::from("jsonv2")),
        ("addressdetails", String::from("1")),
        ("limit", String::from("5")),
        ("countrycodes", String::from("ar")),
    ];
    if use_caba_box {
        params.push(("viewbox", CABA_VIEWBOX.as_query_value()));
        params.push(("bounded", String::from("1")));
    }
    params
}

pub fn reverse_params(lat: f64, lon: f64) -> Vec<(&'static str, String)> {
    vec![
        ("lat", lat.to_string()),
        ("lon", lon.to_string()),
        ("format", String::from("jsonv2")),
        ("addressdetails", String::from("1")),
        ("zoom", String::from("18")),
        ("namedetails", String::from("1")),
        ("extratags", String::from("1")),
    ]
}

fn place_to_candidate(place: NominatimPlace) -> Option<GeocodeCandidate> {
    let lat = place.lat.parse::<f64>().ok().filter(|v| v.is_finite())?;
    let lon = place.lon.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(GeocodeCandidate {
        lat,
        lon,
        display_name: place.display_name,
        address: place.address,
        geocoder: String::from("nominatim"),
    })
}

/// Whether a Nominatim address block belongs to Comuna 9. A matching barrio
/// is accepted on its own; a "Comuna 9" city district additionally needs a
/// CABA city or state.
pub fn in_comuna9(address: Option<&AddressDetails>) -> bool {
    let Some(address) = address else {
        return false;
    };

    let lower = |field: &Option<String>| field.as_deref().unwrap_or("").to_lowercase();

    let suburb = lower(&address.suburb);
    let city_district = {
        let primary = lower(&address.city_district);
        if primary.is_empty() {
            lower(&address.district)
        } else {
            primary
        }
    };
    let city = {
        let primary = lower(&address.city);
        if primary.is_empty() {
            lower(&address.town)
        } else {
            primary
        }
    };
    let state = lower(&address.state);

    let matches_suburb = COMUNA9_BARRIOS.contains(&suburb.as_str());
    let matches_district = city_district.contains("comuna 9");
    let matches_caba = city.contains("buenos aires")
        || state.contains("buenos aires")
        || city.contains("aut\u{f3}noma")
        || state.contains("aut\u{f3}noma")
        || city == "caba"
        || state == "caba"
        || city.contains("ciudad autonoma")
        || state.contains("ciudad autonoma");

    (matches_suburb || matches_district) && (matches_caba || matches_suburb)
}

pub async fn search(
    client: &GeoClient,
    query: &str,
    use_caba_box: bool,
) -> Result<Vec<GeocodeCandidate>, UpstreamError> {
    let url = format!("{}/search", client.nominatim_base);
    let response = client
        .http
        .get(&url)
        .query(&search_params(query, use_caba_box))
        .send()
        .await?;
    let response = expect_success(response).await?;
    let places: Vec<NominatimPlace> = response.json().await?;
    Ok(places.into_iter().filter_map(place_to_candidate).collect())
}

/// Reverse geocode, forwarded as raw JSON: the caller relays whatever
/// Nominatim said about the point.
pub async fn reverse(
    client: &GeoClient,
    lat: f64,
    lon: f64,
) -> Result<serde_json::Value, UpstreamError> {
    let url = format!("{}/reverse", client.nominatim_base);
    let response = client
        .http
        .get(&url)
        .query(&reverse_params(lat, lon))
        .send()
        .await?;
    let response = expect_success(response).await?;
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(json: serde_json::Value) -> AddressDetails {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_search_params_unrestricted() {
        let params = search_params("Murguiondo 4100", false);
        assert!(params.contains(&("format", String::from("jsonv2"))));
        assert!(params.contains(&("countrycodes", String::from("ar"))));
        assert!(!params.iter().any(|(k, _)| *k == "viewbox"));
    }

    #[test]
    fn test_search_params_with_caba_box() {
        let params = search_params("Murguiondo 4100", true);
        assert!(params.contains(&("viewbox", String::from("-58.531,-34.526,-58.335,-34.705"))));
        assert!(params.contains(&("bounded", String::from("1"))));
    }

    #[test]
    fn test_reverse_params() {
        let params = reverse_params(-34.6457, -58.5036);
        assert!(params.contains(&("zoom", String::from("18"))));
        assert!(params.contains(&("lat", String::from("-34.6457"))));
    }

    #[test]
    fn test_candidate_parses_string_coordinates() {
        let place = NominatimPlace {
            lat: String::from("-34.6457"),
            lon: String::from("-58.5036"),
            display_name: String::from("Murguiondo 4100, Mataderos, CABA"),
            address: None,
        };
        let candidate = place_to_candidate(place).unwrap();
        assert_eq!(candidate.lat, -34.6457);
        assert_eq!(candidate.geocoder, "nominatim");
    }

    #[test]
    fn test_unparsable_coordinates_dropped() {
        let place = NominatimPlace {
            lat: String::from("no-a-number"),
            lon: String::from("-58.5"),
            display_name: String::new(),
            address: None,
        };
        assert!(place_to_candidate(place).is_none());
    }

    #[test]
    fn test_in_comuna9_by_barrio() {
        let address = details(serde_json::json!({
            "suburb": "Mataderos",
            "city": "Buenos Aires"
        }));
        assert!(in_comuna9(Some(&address)));

        // a barrio match carries even without the city fields
        let address = details(serde_json::json!({ "suburb": "Liniers" }));
        assert!(in_comuna9(Some(&address)));
    }

    #[test]
    fn test_in_comuna9_by_city_district_needs_caba() {
        let address = details(serde_json::json!({
            "city_district": "Comuna 9",
            "state": "Ciudad Aut\u{f3}noma de Buenos Aires"
        }));
        assert!(in_comuna9(Some(&address)));

        let address = details(serde_json::json!({ "city_district": "Comuna 9" }));
        assert!(!in_comuna9(Some(&address)));
    }

    #[test]
    fn test_outside_comuna9_rejected() {
        let address = details(serde_json::json!({
            "suburb": "Palermo",
            "city": "Buenos Aires"
        }));
        assert!(!in_comuna9(Some(&address)));
        assert!(!in_comuna9(None));
    }

    #[test]
    fn test_district_field_is_a_fallback() {
        let address = details(serde_json::json!({
            "district": "Comuna 9",
            "city": "CABA"
        }));
        assert!(in_comuna9(Some(&address)));
    }
}
