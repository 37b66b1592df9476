//! This is a library for writing DORADE sweep files from rust. It serialises the
//! sweep model of `rayvol-core` block by block and can populate such a model from one
//! sweep of a Sigmet raw volume.
//!
//! The writer emits blocks in the fixed order `COMM, SSWB, VOLD, RADD, PARM...,
//! CELV | CSFD, CFAC, SWIB`, then `RYIB, ASIB, RDAT...` per ray, always uncompressed,
//! and finally seeks back to patch the file size into the SSWB block.
extern crate num;
extern crate rayvol_core;
extern crate tinyvec;
#[cfg(test)]
extern crate rayvol_in;
#[cfg(test)]
extern crate tempfile;

#[cfg(test)]
mod integration_tests;
pub mod translate;
pub mod write_blocks;
pub mod write_data;

pub use rayvol_core::errors::*;
pub use rayvol_core::{DoradeSweep, Volume};

pub use crate::translate::sigmet_to_dorade;

use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::write_blocks::{DoradeBlockToBytes, SIZEOF_FILE_OFFSET};
use crate::write_data::rdat_block;
use rayvol_core::dorade::CellGeometry;

/// Write a sweep to `out` and patch the SSWB file size. The sweep is marked
/// uncompressed first, because that is the only form the writer produces, and its
/// `sizeof_file` member is updated to the number of bytes written.
pub fn write_sweep<W: Write + Seek>(swp: &mut DoradeSweep, mut out: W) -> Result<(), Error> {
    let num_cells = swp.num_cells().ok_or(Error::BlockBeforePrereq {
        id: "RDAT",
        needs: "CELV or CSFD",
    })?;
    let num_rays = swp.swib.num_rays.max(0) as usize;

    // Refuse early anything but the 16-bit sample path, before any bytes move.
    for parm in &swp.sensor.parms {
        if parm.binary_format != rayvol_core::enums::BinaryFormat::Int16 {
            return Err(Error::UnsupportedBinaryFormat {
                parm: parm.name.clone(),
                format: parm.binary_format as i32,
            });
        }
    }

    if num_rays > swp.ray_hdrs.len() {
        return Err(Error::TooManyRays { declared: num_rays });
    }

    // Output here is always uncompressed.
    swp.sswb.compression_flag = 0;
    swp.sensor.radd.data_compress = 0;

    out.write_all(&swp.comm.as_block_bytes()?)?;
    out.write_all(&swp.sswb.as_block_bytes()?)?;
    out.write_all(&swp.vold.as_block_bytes()?)?;
    out.write_all(&swp.sensor.radd.as_block_bytes()?)?;
    for parm in &swp.sensor.parms {
        out.write_all(&parm.as_block_bytes()?)?;
    }
    let cell_geometry = swp.sensor.cell_geometry.as_ref().ok_or(Error::BlockBeforePrereq {
        id: "RDAT",
        needs: "CELV or CSFD",
    })?;
    match cell_geometry {
        CellGeometry::Celv(celv) => out.write_all(&celv.as_block_bytes()?)?,
        CellGeometry::Csfd(csfd) => out.write_all(&csfd.as_block_bytes()?)?,
    }
    out.write_all(&swp.sensor.cfac.as_block_bytes()?)?;
    out.write_all(&swp.swib.as_block_bytes()?)?;

    for r in 0..num_rays {
        let hdr = &swp.ray_hdrs[r];
        out.write_all(&hdr.ryib.as_block_bytes()?)?;
        out.write_all(&hdr.asib.as_block_bytes()?)?;
        for p in 0..swp.sensor.parms.len() {
            let parm = &swp.sensor.parms[p];
            let empty: &[f32] = &[];
            let dat = swp.data(p).unwrap_or(empty);
            let row = if dat.len() >= (r + 1) * num_cells {
                &dat[r * num_cells..(r + 1) * num_cells]
            } else {
                empty
            };
            if row.is_empty() {
                let blanks = vec![f32::NAN; num_cells];
                out.write_all(&rdat_block(parm, &blanks)?)?;
            } else {
                out.write_all(&rdat_block(parm, row)?)?;
            }
        }
    }

    // Put the final file size into the SSWB block.
    let fl_sz = out.stream_position()?;
    out.seek(SeekFrom::Start(SIZEOF_FILE_OFFSET))?;
    let size_bytes = (fl_sz as i32).to_le_bytes();
    out.write_all(&size_bytes)?;
    out.flush()?;
    swp.sswb.sizeof_file = fl_sz as i32;
    Ok(())
}

/// Create a sweep file. With no name given, the conventional
/// `swp.YYYYMMDDhhmmss...` name is derived from the sweep itself; the path of the
/// file actually written is returned.
pub fn write_sweep_file<P: AsRef<Path>>(
    swp: &mut DoradeSweep,
    path: Option<P>,
) -> Result<PathBuf, Error> {
    let path = match path {
        Some(p) => p.as_ref().to_path_buf(),
        None => PathBuf::from(swp.default_file_name()),
    };
    let file = OpenOptions::new()
        .write(true)
        .read(true)
        .create_new(true)
        .open(&path)?;
    match write_sweep(swp, std::io::BufWriter::new(file)) {
        Ok(()) => Ok(path),
        Err(e) => {
            // Leave no partial sweep file behind.
            let _ = std::fs::remove_file(&path);
            Err(e)
        }
    }
}
