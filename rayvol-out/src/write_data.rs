//! This contains the code for writing ray data to RDAT blocks.
//!
//! Output is always uncompressed 16-bit samples: the writer quantises each physical
//! value with the parameter's scale and bias, and NaN becomes the parameter's bad
//! data flag. The sample area is padded to an even cell count so the block length
//! stays divisible by four.
use tinyvec::TinyVec;

use rayvol_core::bytestream::ByteSink;
use rayvol_core::dorade::{Parm, BAD_I2};
use rayvol_core::enums::BinaryFormat;
use rayvol_core::errors::Error;

/// This exists to save us a lot of typing.
pub(crate) type TVu8 = TinyVec<[u8; 8]>;

pub const RDAT_HDR_LEN: usize = 16;

/// Length in bytes of the RDAT block for one ray of `num_cells` 16-bit samples.
pub fn rdat_len(num_cells: usize) -> usize {
    RDAT_HDR_LEN + 2 * (num_cells + num_cells % 2)
}

/// Quantise one physical value to its stored 16-bit sample.
pub(crate) fn sample_bytes(v: f32, parm: &Parm) -> TVu8 {
    let s = if v.is_finite() {
        let q = (parm.parameter_scale * (v + parm.parameter_bias)).round();
        if q < i16::MIN as f32 || q > i16::MAX as f32 {
            parm.bad_data as i16
        } else {
            q as i16
        }
    } else {
        parm.bad_data as i16
    };
    TinyVec::from(&s.to_le_bytes()[..])
}

/// Emit the RDAT block for one ray of one parameter.
pub fn rdat_block(parm: &Parm, row: &[f32]) -> Result<Vec<u8>, Error> {
    if parm.binary_format != BinaryFormat::Int16 {
        return Err(Error::UnsupportedBinaryFormat {
            parm: parm.name.clone(),
            format: parm.binary_format as i32,
        });
    }
    let len = rdat_len(row.len());
    let mut sink = ByteSink::with_capacity(len);
    sink.put_bytes(b"RDAT");
    sink.put_i32(len as i32);
    sink.put_str_fixed(&parm.name, 8);
    for &v in row {
        sink.put_bytes(sample_bytes(v, parm).as_ref());
    }
    if row.len() % 2 == 1 {
        // Pad the odd cell out with the generic bad value.
        sink.put_i16(BAD_I2);
    }
    Ok(sink.into_inner())
}
