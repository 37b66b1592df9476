//! The Sigmet raw product reader.
//!
//! A raw volume is a sequence of 6144 byte records: two header records, then data
//! records carrying run length encoded ray payloads that may cross record boundaries.
//! Byte order is detected from the structure header identifier at the start of
//! record 1. A file that stops early still yields the complete prefix of its sweeps,
//! flagged `truncated`.
use std::io::Read;

use rayvol_core::bytestream::ByteStream;
use rayvol_core::data_types::bin2_to_rad;
use rayvol_core::enums::{DataTypeCode, StorageFormat};
use rayvol_core::errors::Error;
use rayvol_core::geog::{lat_in_domain, lon_in_domain};
use rayvol_core::volume::{FieldData, Volume};
use rayvol_core::{
    IngestDataHeader, INGEST_DATA_HDR_LEN, PRODUCT_HDR_ID, RAW_PROD_BHDR_LEN, RAY_HDR_LEN, REC_LEN,
};

use crate::convert_headers::{parse_ingest_header, parse_product_hdr, HeaderFromBytes};

/// Fill `rec` from the input. Returns the number of bytes read; less than the record
/// length means the input ended.
fn read_record<R: Read>(input: &mut R, rec: &mut [u8; REC_LEN]) -> Result<usize, Error> {
    let mut got = 0;
    while got < REC_LEN {
        match input.read(&mut rec[got..])? {
            0 => break,
            n => got += n,
        }
    }
    Ok(got)
}

fn word_at(rec: &[u8], pos: usize, swap: bool) -> u16 {
    let arr = [rec[pos], rec[pos + 1]];
    if swap {
        u16::from_be_bytes(arr)
    } else {
        u16::from_le_bytes(arr)
    }
}

fn sword_at(rec: &[u8], pos: usize, swap: bool) -> i16 {
    word_at(rec, pos, swap) as i16
}

/// Outcome of the header phase: the volume plus the detected byte order.
struct Headers {
    vol: Volume,
    swap: bool,
}

fn read_headers_internal<R: Read>(input: &mut R) -> Result<Headers, Error> {
    let mut rec = [0u8; REC_LEN];

    // Record 1, <product_hdr>. The 16-bit structure identifier at offset 0 must
    // be 27; if it is not with the current byte order, the order is wrong.
    let got = read_record(input, &mut rec)?;
    if got < REC_LEN {
        return Err(Error::ShortRead { wanted: REC_LEN, got });
    }
    let mut swap = false;
    if sword_at(&rec, 0, swap) != PRODUCT_HDR_ID {
        swap = true;
        if sword_at(&rec, 0, swap) != PRODUCT_HDR_ID {
            return Err(Error::BadMagic { value: sword_at(&rec, 0, false) });
        }
    }
    let ph = parse_product_hdr(&rec, swap)?;

    // Record 2, <ingest_header>.
    let got = read_record(input, &mut rec)?;
    if got < REC_LEN {
        return Err(Error::ShortRead { wanted: REC_LEN, got });
    }
    let ih = parse_ingest_header(&rec, swap)?;

    let mut vol = Volume::new();
    vol.set_headers(ph, ih)?;

    // Walk the bits of the data type mask. A set bit adds the corresponding data
    // type; types with storage get a field, the extended header type only sets a
    // flag.
    let mask = vol.ingest_hdr.tc.tdi.curr_data_mask.mask_word_0;
    for code in DataTypeCode::iter() {
        if mask & code.mask_bit() == 0 {
            continue;
        }
        match code.storage() {
            StorageFormat::Empty => {
                vol.xhdr = true;
            }
            StorageFormat::U1 | StorageFormat::U2 => {
                vol.install_builtin_field(code)?;
            }
            StorageFormat::F4 => {
                return Err(Error::UnknownStorage { abbrv: code.abbrv().to_string() })
            }
        }
        vol.types_in_file.push(code);
    }
    Ok(Headers { vol, swap })
}

/// Read only the two header records of a raw volume. The returned volume has its
/// headers and field descriptors but no ray data.
pub fn read_headers<R: Read>(mut input: R) -> Result<Volume, Error> {
    read_headers_internal(&mut input).map(|h| h.vol)
}

/// Read a complete raw volume.
///
/// The reader tolerates truncation: as long as at least one sweep is complete, a
/// short file or an out-of-order trailing sweep yields a volume with
/// `truncated` set and `num_sweeps_actual` counting the usable prefix.
pub fn read_volume<R: Read>(mut input: R) -> Result<Volume, Error> {
    let Headers { mut vol, swap } = read_headers_internal(&mut input)?;

    let num_sweeps = vol.num_sweeps();
    let num_rays = vol.num_rays();
    let num_bins = vol.num_bins();
    let num_types_fl = vol.types_in_file.len();
    let num_fields = vol.num_fields();

    // The ray buffer receives one decompressed ray: its 12 byte header, then the
    // samples of the current data type (or the extended header).
    let ray_buf_sz = RAY_HDR_LEN
        + vol.ingest_hdr.ic.extended_ray_headers_sz.max(0) as usize
        + num_fields * 2 * num_bins;
    let mut ray_buf = vec![0u8; ray_buf_sz.max(RAY_HDR_LEN + 4)];
    let mut ray_pos = 0usize;

    let mut rec = [0u8; REC_LEN];
    let mut rec_idx: i16 = 1;
    let mut sweep_num: i16 = 0;
    let mut s = 0usize;
    let mut r = 0usize;
    let mut yf = 0usize;
    let mut swp_time = 0.0f64;

    'records: loop {
        let got = read_record(&mut input, &mut rec)?;
        if got == 0 {
            break;
        }
        if got < REC_LEN {
            vol.truncated = true;
            break;
        }

        // <raw_prod_bhdr>: record index, then sweep number.
        let idx = sword_at(&rec, 0, swap);
        let n_swp = sword_at(&rec, 2, swap);
        if idx != rec_idx + 1 {
            return Err(Error::RecordOutOfSequence { expected: rec_idx + 1, found: idx });
        }
        rec_idx = idx;

        let mut rec_pos;
        if n_swp != sweep_num {
            // Sweep number has changed, so the record starts a new sweep.
            if n_swp != sweep_num + 1 {
                if sweep_num > 0 {
                    vol.truncated = true;
                    vol.num_sweeps_actual = sweep_num as usize;
                    return Ok(vol);
                }
                return Err(Error::SweepOutOfOrder { found: n_swp });
            }
            if n_swp as usize > num_sweeps {
                return Err(Error::ExcessSweeps { declared: num_sweeps });
            }
            sweep_num = n_swp;
            s = sweep_num as usize - 1;
            r = 0;

            let mut bs = ByteStream::with_swap(
                &rec[RAW_PROD_BHDR_LEN..RAW_PROD_BHDR_LEN + INGEST_DATA_HDR_LEN],
                swap,
            );
            let idh = IngestDataHeader::from_bytes(&mut bs)?;
            if idh.sweep_num == 0 {
                // Sweep number in the ingest data header went back to zero,
                // so the volume holds no more sweeps.
                break;
            }
            let hdr = vol.sweep_hdr_mut(s)?;
            hdr.ok = idh.time.year >= 1900 && idh.time.month != 0 && idh.time.day != 0;
            swp_time = match idh.time.to_julian() {
                Ok(t) => t,
                Err(_) => {
                    hdr.ok = false;
                    0.0
                }
            };
            hdr.time = swp_time;
            hdr.angle = bin2_to_rad(idh.fixed_angle);

            rec_pos = RAW_PROD_BHDR_LEN + num_types_fl * INGEST_DATA_HDR_LEN;
            ray_buf.iter_mut().for_each(|b| *b = 0);
            ray_pos = 0;
            yf = 0;
        } else {
            // The record continues a sweep started earlier.
            rec_pos = RAW_PROD_BHDR_LEN;
        }

        // Decompress ray payloads. Each 16-bit control word introduces a run of
        // data words, a run of zero words, or ends the ray.
        while rec_pos + 1 < REC_LEN {
            let cc = word_at(&rec, rec_pos, swap);
            if cc & 0x8000 == 0x8000 {
                let mut num_wds = (cc & 0x7FFF) as usize;
                rec_pos += 2;
                while num_wds > 0 {
                    if ray_pos + 2 > ray_buf.len() {
                        return Err(Error::RayOverrun);
                    }
                    if rec_pos == REC_LEN {
                        // The data run crosses a record boundary; pull in the
                        // next record and keep copying after its header.
                        let got = read_record(&mut input, &mut rec)?;
                        if got < REC_LEN {
                            vol.truncated = true;
                            break 'records;
                        }
                        let idx = sword_at(&rec, 0, swap);
                        if idx != rec_idx + 1 {
                            return Err(Error::RecordOutOfSequence {
                                expected: rec_idx + 1,
                                found: idx,
                            });
                        }
                        rec_idx = idx;
                        rec_pos = RAW_PROD_BHDR_LEN;
                    }
                    ray_buf[ray_pos] = rec[rec_pos];
                    ray_buf[ray_pos + 1] = rec[rec_pos + 1];
                    ray_pos += 2;
                    rec_pos += 2;
                    num_wds -= 1;
                }
            } else if cc == 1 {
                // End of ray: interpret the buffer and store it.
                if r >= num_rays {
                    return Err(Error::ExcessRays { declared: num_rays });
                }
                flush_ray(&mut vol, &ray_buf, swap, s, r, yf, swp_time)?;
                ray_buf.iter_mut().for_each(|b| *b = 0);
                ray_pos = 0;
                yf += 1;
                if yf == num_types_fl {
                    r += 1;
                    yf = 0;
                }
                rec_pos += 2;
            } else {
                // Run of zero words: skip ahead in the ray buffer.
                let num_wds = (cc & 0x7FFF) as usize;
                if ray_pos + num_wds * 2 > ray_buf.len() {
                    return Err(Error::RayOverrun);
                }
                ray_pos += num_wds * 2;
                rec_pos += 2;
            }
        }
    }

    let s_ok = vol.sweep_hdrs().iter().take_while(|h| h.ok).count();
    if s_ok < num_sweeps || (s_ok > 0 && r < num_rays) {
        vol.truncated = true;
    }
    vol.num_sweeps_actual = s_ok;
    Ok(vol)
}

/// Interpret a decompressed ray buffer: the 12 byte ray header, then the samples of
/// the data type at file position `yf`.
fn flush_ray(
    vol: &mut Volume,
    ray_buf: &[u8],
    swap: bool,
    s: usize,
    r: usize,
    yf: usize,
    swp_time: f64,
) -> Result<(), Error> {
    if yf >= vol.types_in_file.len() {
        return Err(Error::RayOverrun);
    }
    let num_bins_out = vol.num_bins();
    let az0 = word_at(ray_buf, 0, swap);
    let tilt0 = word_at(ray_buf, 2, swap);
    let az1 = word_at(ray_buf, 4, swap);
    let tilt1 = word_at(ray_buf, 6, swap);
    let nbins = sword_at(ray_buf, 8, swap) as i32;
    let time_sec = word_at(ray_buf, 10, swap);

    if nbins > num_bins_out as i32 {
        return Err(Error::ExcessBins { num_bins: nbins, max: num_bins_out as i32 });
    }

    let xhdr = vol.xhdr;
    {
        let hdr = vol.ray_hdr_mut(s, r)?;
        hdr.az0 = lon_in_domain(bin2_to_rad(az0), 0.0);
        hdr.tilt0 = lat_in_domain(bin2_to_rad(tilt0));
        hdr.az1 = lon_in_domain(bin2_to_rad(az1), 0.0);
        hdr.tilt1 = lat_in_domain(bin2_to_rad(tilt1));
        hdr.num_bins = nbins;
        hdr.ok = nbins > 0;
        if !xhdr {
            hdr.time = swp_time + time_sec as f64 / 86400.0;
        }
    }

    let code = vol.types_in_file[yf];
    if code == DataTypeCode::Xhdr {
        // The extended header carries the ray time as milliseconds from the
        // start of the sweep.
        let mut bs = ByteStream::with_swap(&ray_buf[RAY_HDR_LEN..RAY_HDR_LEN + 4], swap);
        let tm_incr = bs.get_i32()?;
        vol.ray_hdr_mut(s, r)?.time = swp_time + tm_incr as f64 * 0.001 / 86400.0;
        return Ok(());
    }

    // Skip past DB_XHDR, which holds no field, to find the field index.
    let y = yf - vol.xhdr as usize;
    let start = vol.ray_offset(s, r);
    let nbins = nbins.max(0) as usize;
    match vol.field_data_mut(y) {
        Some(FieldData::U1(vals)) => {
            vals[start..start + nbins].copy_from_slice(&ray_buf[RAY_HDR_LEN..RAY_HDR_LEN + nbins]);
        }
        Some(FieldData::U2(vals)) => {
            let mut bs =
                ByteStream::with_swap(&ray_buf[RAY_HDR_LEN..RAY_HDR_LEN + 2 * nbins], swap);
            for v in &mut vals[start..start + nbins] {
                *v = bs.get_u16()?;
            }
        }
        _ => return Err(Error::UnknownStorage { abbrv: code.abbrv().to_string() }),
    }
    Ok(())
}
