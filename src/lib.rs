// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

#![deny(
    clippy::mutable_key_type,
    clippy::map_entry,
    clippy::boxed_local,
    clippy::let_unit_value,
    clippy::redundant_allocation,
    clippy::bool_comparison,
    clippy::bind_instead_of_map,
    clippy::vec_box,
    clippy::while_let_loop,
    clippy::useless_asref,
    clippy::repeat_once,
    clippy::deref_addrof,
    clippy::suspicious_map,
    clippy::arc_with_non_send_sync,
    clippy::single_char_pattern,
    clippy::for_kv_map,
    clippy::let_unit_value,
    clippy::let_and_return,
    clippy::iter_nth,
    clippy::iter_cloned_collect,
    clippy::bytes_nth,
    clippy::deprecated_clippy_cfg_attr,
    clippy::match_result_ok,
    clippy::cmp_owned,
    clippy::cmp_null,
    clippy::op_ref
)]

#[macro_use]
extern crate serde;

pub mod clustering;
pub mod cross_streets;
pub mod fallback;
pub mod geocoders;
pub mod intersection_query;
pub mod models;
pub mod pipeline;
pub mod store;

/// Bounding box used to bias searches towards the city of Buenos Aires.
/// Stored as (west, north, east, south) to match the Nominatim viewbox order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewbox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Viewbox {
    pub fn as_query_value(&self) -> String {
        format!("{},{},{},{}", self.left, self.top, self.right, self.bottom)
    }
}

pub const CABA_VIEWBOX: Viewbox = Viewbox {
    left: -58.531,
    top: -34.526,
    right: -58.335,
    bottom: -34.705,
};

/// Neighbourhoods that make up Comuna 9.
pub const COMUNA9_BARRIOS: [&str; 3] = ["liniers", "mataderos", "parque avellaneda"];

/// INDEC id of the Comuna 9 departamento in the Georef dataset.
pub const COMUNA9_DEPARTAMENTO_ID: &str = "02009";

pub const COMUNA9_DEPARTAMENTO: &str = "Comuna 9";
pub const CABA_PROVINCIA: &str = "Ciudad Aut\u{f3}noma de Buenos Aires";
