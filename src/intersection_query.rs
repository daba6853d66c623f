// Copyright Catenary Transit Initiatives
// Detection of intersection-style queries ("Azul y Directorio")

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // "y" must stand alone as a word so street names containing the letter
    // ("Mayo", "Yrigoyen") are not misread as intersections; "&" and "/"
    // may be glued to the names.
    static ref INTERSECTION_RE: Regex =
        Regex::new(r"(?i)^(.+?)(?:\s+y\s+|\s*&\s*|\s*/\s*)(.+)$").unwrap();
}

/// A query of the form "street A at street B".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntersectionQuery {
    pub a: String,
    pub b: String,
}

/// Parses an intersection-style query, if the text looks like one.
/// Whitespace is collapsed first; both sides must be non-empty.
pub fn parse_intersection(text: &str) -> Option<IntersectionQuery> {
    let norm = text.split_whitespace().collect::<Vec<&str>>().join(" ");
    let caps = INTERSECTION_RE.captures(&norm)?;
    let a = caps.get(1)?.as_str().trim();
    let b = caps.get(2)?.as_str().trim();
    if a.is_empty() || b.is_empty() {
        return None;
    }
    Some(IntersectionQuery {
        a: a.to_string(),
        b: b.to_string(),
    })
}
