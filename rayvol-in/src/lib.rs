//! This is a library for reading weather radar volume files into rust. It parses the
//! Sigmet/IRIS raw product format (single-file multi-sweep volumes) and the DORADE
//! sweep format (per-sweep block-tagged files) into the models of `rayvol-core`.
//!
//! Both readers consume plain byte streams, so input may come from a file, a pipe, or
//! any other `std::io::Read`; byte order is detected from the data itself. A Sigmet
//! file that stops early still yields the complete prefix of its sweeps, flagged
//! `truncated`.
//!
//! ```no_run
//! use rayvol_in::read_volume;
//!
//! let file = std::fs::File::open("KOUN_raw.vol").unwrap();
//! let vol = read_volume(std::io::BufReader::new(file)).unwrap();
//! for field in vol.fields() {
//!     println!("{} ({})", field.abbrv, field.unit);
//! }
//! ```
extern crate num;
extern crate rayvol_core;

pub mod convert_headers;
pub mod dorade;
pub mod sigmet;
#[cfg(test)]
mod tests;

pub use rayvol_core::enums;
pub use rayvol_core::errors::*;
pub use rayvol_core::{DoradeSweep, Volume};

pub use crate::dorade::{open_sweep, read_sweep};
pub use crate::sigmet::{read_headers, read_volume};

use std::path::Path;

/// Read a Sigmet raw volume from disk.
pub fn open_volume<P: AsRef<Path>>(path: P) -> Result<Volume, Error> {
    let file = std::fs::File::open(path)?;
    read_volume(std::io::BufReader::new(file))
}
