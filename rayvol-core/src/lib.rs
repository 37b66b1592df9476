//! This library is the foundation for the `rayvol-in` and `rayvol-out` crates. It holds the
//! in-memory models for the two weather radar volume formats the suite understands: the
//! Sigmet/IRIS raw product format (single-file multi-sweep volumes) and the DORADE sweep
//! format (per-sweep block-tagged files). It can be built either with serialization support,
//! or in a slightly more lightweight manner without it (see features).
#![allow(clippy::derive_partial_eq_without_eq)]
extern crate chrono;
extern crate fnv;
extern crate num;
#[macro_use]
extern crate num_derive;

#[cfg(any(feature = "to_json", feature = "serde"))]
extern crate serde;
#[cfg(feature = "to_json")]
extern crate serde_json;

pub mod bytestream;
pub mod data_types;
pub mod dorade;
pub mod enums;
pub mod errors;
pub mod geog;
pub mod headers;
pub mod proj;
pub mod tm;
pub mod volume;
#[cfg(test)]
mod tests;

pub use errors::{Error, Status};

pub use data_types::{ConvContext, Registry, StorToComp};
pub use dorade::DoradeSweep;
pub use enums::*;
pub use headers::*;
pub use proj::Projection;
pub use volume::{Field, FieldData, RayHeader, SweepHeader, Volume};

/// Length of every record in a Sigmet raw product file.
pub const REC_LEN: usize = 6144;
/// Length of the `raw_prod_bhdr` at the start of every data record.
pub const RAW_PROD_BHDR_LEN: usize = 12;
/// Length of one `ingest_data_header` substructure.
pub const INGEST_DATA_HDR_LEN: usize = 76;
/// Length of the ray header at the front of each decompressed ray payload.
pub const RAY_HDR_LEN: usize = 12;
/// The structure-header identifier of record 1, used for byte order detection.
pub const PRODUCT_HDR_ID: i16 = 27;
/// Maximum number of fields a Sigmet volume may carry.
pub const MAX_FIELDS: usize = 512;
/// Maximum number of parameters a DORADE sweep may carry.
pub const DORADE_MAX_PARMS: usize = 512;
/// Maximum length of a field name.
pub const NAME_LEN: usize = 31;
/// Maximum length of a field description.
pub const DESCR_LEN: usize = 127;
