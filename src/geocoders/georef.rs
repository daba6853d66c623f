// Copyright Catenary Transit Initiatives
// Georef (datos.gob.ar) address and street-intersection client

use crate::geocoders::{GeoClient, UpstreamError, expect_success};
use crate::models::{AddressDetails, GeocodeCandidate};
use crate::{CABA_PROVINCIA, COMUNA9_DEPARTAMENTO, COMUNA9_DEPARTAMENTO_ID};
use serde_derive::Deserialize;

const DEFAULT_MAX: u32 = 10;

/// Geographic pinning for a Georef query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeorefScope {
    pub provincia: Option<String>,
    pub departamento: Option<String>,
    pub max: u32,
}

impl GeorefScope {
    pub fn unrestricted() -> GeorefScope {
        GeorefScope {
            provincia: None,
            departamento: None,
            max: DEFAULT_MAX,
        }
    }

    /// Pinned to CABA only; the loosened retry scope.
    pub fn caba() -> GeorefScope {
        GeorefScope {
            provincia: Some(CABA_PROVINCIA.to_string()),
            departamento: None,
            max: DEFAULT_MAX,
        }
    }

    /// Pinned to CABA + Comuna 9; the first attempt under restriction.
    pub fn comuna9() -> GeorefScope {
        GeorefScope {
            provincia: Some(CABA_PROVINCIA.to_string()),
            departamento: Some(COMUNA9_DEPARTAMENTO.to_string()),
            max: DEFAULT_MAX,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Nombre {
    #[serde(default)]
    pub nombre: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Departamento {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub nombre: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Ubicacion {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

/// Georef nests the house number as `altura.valor`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Altura {
    #[serde(default)]
    pub valor: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Direccion {
    #[serde(default)]
    pub ubicacion: Option<Ubicacion>,
    #[serde(default)]
    pub calle: Option<Nombre>,
    #[serde(default)]
    pub altura: Option<Altura>,
    #[serde(default)]
    pub localidad: Option<Nombre>,
    #[serde(default)]
    pub municipio: Option<Nombre>,
    #[serde(default)]
    pub provincia: Option<Nombre>,
    #[serde(default)]
    pub departamento: Option<Departamento>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DireccionesResponse {
    #[serde(default)]
    pub direcciones: Vec<Direccion>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Interseccion {
    #[serde(default)]
    pub ubicacion: Option<Ubicacion>,
    #[serde(default)]
    pub localidad: Option<Nombre>,
    #[serde(default)]
    pub municipio: Option<Nombre>,
    #[serde(default)]
    pub provincia: Option<Nombre>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct InterseccionesResponse {
    #[serde(default)]
    pub intersecciones: Vec<Interseccion>,
}

fn scope_params(scope: &GeorefScope) -> Vec<(&'static str, String)> {
    let mut params = vec![("max", scope.max.to_string())];
    if let Some(provincia) = &scope.provincia {
        params.push(("provincia", provincia.clone()));
    }
    if let Some(departamento) = &scope.departamento {
        params.push(("departamento", departamento.clone()));
    }
    params
}

pub fn direcciones_params(query: &str, scope: &GeorefScope) -> Vec<(&'static str, String)> {
    let mut params = vec![("direccion", query.to_string())];
    params.extend(scope_params(scope));
    params
}

pub fn intersecciones_params(
    street_a: &str,
    street_b: &str,
    scope: &GeorefScope,
) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("calle_nombre", street_a.to_string()),
        ("interseccion_nombre", street_b.to_string()),
    ];
    params.extend(scope_params(scope));
    params
}

fn name_of(field: &Option<Nombre>) -> Option<&str> {
    field
        .as_ref()
        .and_then(|n| n.nombre.as_deref())
        .filter(|s| !s.is_empty())
}

/// Whether a Georef direccion sits in Comuna 9 of CABA.
pub fn in_comuna9_direccion(direccion: &Direccion) -> bool {
    let departamento = direccion.departamento.as_ref();
    let dep_nombre = departamento
        .and_then(|d| d.nombre.as_deref())
        .unwrap_or("")
        .to_lowercase();
    let dep_id = departamento.and_then(|d| d.id.as_deref()).unwrap_or("");
    let match_dep = dep_nombre.contains("comuna 9") || dep_id == COMUNA9_DEPARTAMENTO_ID;

    let provincia = name_of(&direccion.provincia).unwrap_or("").to_lowercase();
    let match_prov = provincia.contains("ciudad aut\u{f3}noma de buenos aires")
        || provincia.contains("ciudad autonoma de buenos aires")
        || provincia == "caba";

    match_dep && match_prov
}

fn direccion_to_candidate(direccion: &Direccion) -> Option<GeocodeCandidate> {
    let ubicacion = direccion.ubicacion.as_ref()?;
    let (lat, lon) = match (ubicacion.lat, ubicacion.lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => return None,
    };

    let calle = name_of(&direccion.calle);
    let altura = direccion.altura.as_ref().and_then(|a| a.valor);
    let localidad = name_of(&direccion.localidad).or_else(|| name_of(&direccion.municipio));
    let provincia = name_of(&direccion.provincia);

    let street = match (calle, altura) {
        (Some(calle), Some(altura)) => Some(format!("{} {}", calle, altura)),
        (Some(calle), None) => Some(calle.to_string()),
        _ => None,
    };

    let display_name = [
        street.as_deref(),
        localidad,
        provincia,
        Some("Argentina"),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<&str>>()
    .join(", ");

    let dep_nombre = direccion
        .departamento
        .as_ref()
        .and_then(|d| d.nombre.clone());
    let city_district = dep_nombre.filter(|n| n.to_lowercase().contains("comuna"));

    let address = AddressDetails {
        road: calle.map(str::to_string),
        house_number: altura.map(|a| a.to_string()),
        city: localidad.map(str::to_string),
        state: provincia.map(str::to_string),
        city_district,
        country: Some(String::from("Argentina")),
        country_code: Some(String::from("ar")),
        ..Default::default()
    };

    Some(GeocodeCandidate {
        lat,
        lon,
        display_name,
        address: Some(address),
        geocoder: String::from("georef"),
    })
}

fn interseccion_to_candidate(
    interseccion: &Interseccion,
    street_a: &str,
    street_b: &str,
) -> Option<GeocodeCandidate> {
    let ubicacion = interseccion.ubicacion.as_ref()?;
    let (lat, lon) = match (ubicacion.lat, ubicacion.lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => return None,
    };

    let corner = format!("{} y {}", street_a, street_b);
    let localidad = name_of(&interseccion.localidad).or_else(|| name_of(&interseccion.municipio));
    let provincia = name_of(&interseccion.provincia);

    let display_name = [Some(corner.as_str()), localidad, provincia, Some("Argentina")]
        .into_iter()
        .flatten()
        .collect::<Vec<&str>>()
        .join(", ");

    let address = AddressDetails {
        road: Some(corner),
        city: localidad.map(str::to_string),
        state: provincia.map(str::to_string),
        country: Some(String::from("Argentina")),
        country_code: Some(String::from("ar")),
        ..Default::default()
    };

    Some(GeocodeCandidate {
        lat,
        lon,
        display_name,
        address: Some(address),
        geocoder: String::from("georef"),
    })
}

/// CABA check for intersection hits. Comuna 9 cannot be verified from the
/// intersecciones payload, so restriction only pins the city here.
fn candidate_in_caba(candidate: &GeocodeCandidate) -> bool {
    let Some(address) = &candidate.address else {
        return false;
    };
    let state = address.state.as_deref().unwrap_or("").to_lowercase();
    let city = address.city.as_deref().unwrap_or("").to_lowercase();
    state.contains("ciudad aut") || state == "caba" || city.contains("buenos aires")
}

/// Address search against `direcciones`.
pub async fn search(
    client: &GeoClient,
    query: &str,
    scope: &GeorefScope,
    restrict: bool,
) -> Result<Vec<GeocodeCandidate>, UpstreamError> {
    let url = format!("{}/direcciones", client.georef_base);
    let response = client
        .http
        .get(&url)
        .query(&direcciones_params(query, scope))
        .send()
        .await?;
    let response = expect_success(response).await?;
    let parsed: DireccionesResponse = response.json().await?;

    Ok(parsed
        .direcciones
        .iter()
        .filter(|d| !restrict || in_comuna9_direccion(d))
        .filter_map(direccion_to_candidate)
        .collect())
}

/// Corner lookup against `intersecciones`.
pub async fn intersection(
    client: &GeoClient,
    street_a: &str,
    street_b: &str,
    scope: &GeorefScope,
    restrict: bool,
) -> Result<Vec<GeocodeCandidate>, UpstreamError> {
    let url = format!("{}/intersecciones", client.georef_base);
    let response = client
        .http
        .get(&url)
        .query(&intersecciones_params(street_a, street_b, scope))
        .send()
        .await?;
    let response = expect_success(response).await?;
    let parsed: InterseccionesResponse = response.json().await?;

    Ok(parsed
        .intersecciones
        .iter()
        .filter_map(|i| interseccion_to_candidate(i, street_a, street_b))
        .filter(|c| !restrict || candidate_in_caba(c))
        .collect())
}
