// Copyright Catenary Transit Initiatives
// Provider chain for a single geocode query: intersection fast path first,
// then Nominatim with progressively looser geographic bias

use crate::geocoders::georef::GeorefScope;
use crate::geocoders::{GeoClient, UpstreamError, georef, nominatim};
use crate::intersection_query::parse_intersection;
use crate::models::GeocodeCandidate;

/// Bias suffixes appended to the query when a restricted search comes back
/// empty, loosest last.
pub const BIAS_SUFFIXES: [&str; 2] = [
    ", Comuna 9, Ciudad Aut\u{f3}noma de Buenos Aires, Argentina",
    ", CABA, Argentina",
];

pub fn biased_queries(query: &str) -> [String; 2] {
    [
        format!("{}{}", query, BIAS_SUFFIXES[0]),
        format!("{}{}", query, BIAS_SUFFIXES[1]),
    ]
}

/// Resolves a free-text query to candidates. First non-empty result set
/// wins; an overall empty result means "not found". Upstream transport
/// errors abort the whole chain.
pub async fn geocode_query(
    client: &GeoClient,
    query: &str,
    restrict: bool,
) -> Result<Vec<GeocodeCandidate>, UpstreamError> {
    // Fast path: corner-style queries go to the intersection endpoint first.
    if let Some(corner) = parse_intersection(query) {
        let scope = if restrict {
            GeorefScope::comuna9()
        } else {
            GeorefScope::unrestricted()
        };
        let mut results =
            georef::intersection(client, &corner.a, &corner.b, &scope, restrict).await?;
        if restrict && results.is_empty() {
            results =
                georef::intersection(client, &corner.a, &corner.b, &GeorefScope::caba(), restrict)
                    .await?;
        }
        if !results.is_empty() {
            return Ok(results);
        }
    }

    let mut results = nominatim::search(client, query, restrict).await?;
    if restrict {
        results.retain(|c| nominatim::in_comuna9(c.address.as_ref()));
        for biased in biased_queries(query) {
            if !results.is_empty() {
                break;
            }
            results = nominatim::search(client, &biased, true).await?;
            results.retain(|c| nominatim::in_comuna9(c.address.as_ref()));
        }
    }

    Ok(results)
}

/// Georef address search with the same loosening scheme, kept as the
/// selectable alternate provider.
pub async fn geocode_query_georef(
    client: &GeoClient,
    query: &str,
    restrict: bool,
) -> Result<Vec<GeocodeCandidate>, UpstreamError> {
    let scope = if restrict {
        GeorefScope::comuna9()
    } else {
        GeorefScope::unrestricted()
    };
    let results = georef::search(client, query, &scope, restrict).await?;
    if restrict && results.is_empty() {
        return georef::search(client, query, &GeorefScope::caba(), restrict).await;
    }
    Ok(results)
}
