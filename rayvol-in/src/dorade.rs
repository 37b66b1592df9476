//! The DORADE sweep file reader.
//!
//! A sweep file is a sequence of blocks, each tagged with four ASCII bytes and a four
//! byte length covering the whole block. Blocks arrive in any order the writer chose;
//! the reader dispatches on the tag, skips tags it does not know, and stops at a
//! `NULL` block or end of input. Byte order is detected from the sign of the first
//! block's declared length.
use std::io::Read;

use num::FromPrimitive;

use rayvol_core::bytestream::ByteStream;
use rayvol_core::dorade::{
    Asib, Celv, CellGeometry, Cfac, Comm, Csfd, DoradeSweep, Parm, Radd, RayHdr, Ryib, Sswb, Swib,
    Vold, BAD_I2, BAD_I4,
};
use rayvol_core::enums::{BinaryFormat, DoradeScanMode};
use rayvol_core::errors::Error;
use rayvol_core::DORADE_MAX_PARMS;

/// Nominal payload sizes (block length less the eight byte header). Shorter blocks
/// in the wild are zero padded up to these before decoding, the way ancient writers
/// intended.
const COMM_PAYLOAD: usize = 500;
const SSWB_PAYLOAD: usize = 188;
const VOLD_PAYLOAD: usize = 64;
const RADD_PAYLOAD: usize = 292;
const CFAC_PAYLOAD: usize = 64;
const PARM_PAYLOAD: usize = 208;
const CSFD_PAYLOAD: usize = 56;
const SWIB_PAYLOAD: usize = 32;
const ASIB_PAYLOAD: usize = 72;
const RYIB_PAYLOAD: usize = 36;

/// Read a DORADE sweep from a byte stream.
pub fn read_sweep<R: Read>(mut input: R) -> Result<DoradeSweep, Error> {
    let mut swp = DoradeSweep::new();
    let mut swap = false;
    let mut read_any = false;
    let mut done = false;

    // Reader position within the sweep: the current ray and the parameter the next
    // RDAT block belongs to.
    let mut ray: Option<usize> = None;
    let mut num_rays_read = 0usize;
    let mut parm_cursor = 0usize;

    while !done {
        let mut tag = [0u8; 4];
        match read_exact_or_eof(&mut input, &mut tag)? {
            ReadOutcome::Eof => break,
            ReadOutcome::Full => {}
        }
        let mut len_bytes = [0u8; 4];
        if let ReadOutcome::Eof = read_exact_or_eof(&mut input, &mut len_bytes)? {
            return Err(Error::ShortRead { wanted: 4, got: 0 });
        }
        let mut blk_len = read_len(&len_bytes, swap);
        if blk_len < 0 && !read_any {
            // A block size cannot be negative; try the other byte order once.
            swap = !swap;
            blk_len = read_len(&len_bytes, swap);
        }
        if blk_len < 8 {
            return Err(Error::NegativeBlockLength {
                id: String::from_utf8_lossy(&tag).to_string(),
                len: blk_len,
            });
        }
        let payload_len = blk_len as usize - 8;
        let mut payload = vec![0u8; payload_len];
        input.read_exact(&mut payload).map_err(Error::StdIoError)?;
        read_any = true;

        match &tag {
            b"COMM" => swp.comm = read_comm(&payload, swap)?,
            b"SSWB" => swp.sswb = read_sswb(&payload, swap)?,
            b"VOLD" => swp.vold = read_vold(&payload, swap)?,
            b"RADD" => swp.sensor.radd = read_radd(&payload, swap)?,
            b"CFAC" => swp.sensor.cfac = read_cfac(&payload, swap)?,
            b"PARM" => {
                if swp.sensor.radd.num_parms == BAD_I2 {
                    return Err(Error::BlockBeforePrereq { id: "PARM", needs: "RADD" });
                }
                if swp.sensor.parms.len() + 1 > DORADE_MAX_PARMS {
                    return Err(Error::TooManyParms { max: DORADE_MAX_PARMS });
                }
                let parm = read_parm(&payload, swap)?;
                swp.add_parm(parm)?;
            }
            b"CELV" => {
                swp.sensor.cell_geometry = Some(CellGeometry::Celv(read_celv(&payload, swap)?));
            }
            b"CSFD" => {
                swp.sensor.cell_geometry = Some(CellGeometry::Csfd(read_csfd(&payload, swap)?));
            }
            b"SWIB" => {
                swp.swib = read_swib(&payload, swap)?;
                let num_rays = swp.swib.num_rays.max(0) as usize;
                if swp.ray_hdrs.is_empty() {
                    swp.ray_hdrs = vec![RayHdr::default(); num_rays];
                }
            }
            b"RYIB" => {
                if swp.swib.num_rays == BAD_I4 {
                    return Err(Error::BlockBeforePrereq { id: "RYIB", needs: "SWIB" });
                }
                if num_rays_read + 1 > swp.swib.num_rays.max(0) as usize {
                    return Err(Error::TooManyRays { declared: swp.swib.num_rays.max(0) as usize });
                }
                if swp.num_cells().is_none() {
                    return Err(Error::BlockBeforePrereq { id: "RYIB", needs: "CELV or CSFD" });
                }
                let r = num_rays_read;
                swp.ray_hdrs[r].ryib = read_ryib(&payload, swap)?;
                ray = Some(r);
                parm_cursor = 0;
            }
            b"ASIB" => {
                let r = ray.ok_or(Error::BlockBeforePrereq { id: "ASIB", needs: "RYIB" })?;
                swp.ray_hdrs[r].asib = read_asib(&payload, swap)?;
            }
            b"RDAT" => {
                let r = ray.ok_or(Error::BlockBeforePrereq { id: "RDAT", needs: "RYIB" })?;
                read_rdat(&mut swp, &payload, swap, r, parm_cursor)?;
                parm_cursor += 1;
                if parm_cursor == swp.sensor.parms.len() {
                    num_rays_read += 1;
                }
            }
            b"NULL" => done = true,
            // RKTB, SEDS and anything else: skip by length.
            _ => {}
        }
    }

    if !read_any {
        return Err(Error::EmptySweepFile);
    }
    Ok(swp)
}

/// Read a DORADE sweep file from disk.
pub fn open_sweep<P: AsRef<std::path::Path>>(path: P) -> Result<DoradeSweep, Error> {
    let file = std::fs::File::open(&path)?;
    let mut swp = read_sweep(std::io::BufReader::new(file))?;
    swp.source_file = Some(path.as_ref().to_string_lossy().to_string());
    Ok(swp)
}

enum ReadOutcome {
    Full,
    Eof,
}

/// Fill `buf` completely, or report a clean end of input before the first byte.
fn read_exact_or_eof<R: Read>(input: &mut R, buf: &mut [u8]) -> Result<ReadOutcome, Error> {
    let mut got = 0;
    while got < buf.len() {
        match input.read(&mut buf[got..])? {
            0 if got == 0 => return Ok(ReadOutcome::Eof),
            0 => return Err(Error::ShortRead { wanted: buf.len(), got }),
            n => got += n,
        }
    }
    Ok(ReadOutcome::Full)
}

fn read_len(bytes: &[u8; 4], swap: bool) -> i32 {
    if swap {
        i32::from_be_bytes(*bytes)
    } else {
        i32::from_le_bytes(*bytes)
    }
}

/// Zero pad a payload out to the block's nominal size, so short blocks written by
/// older producers decode with defaulted trailing fields.
fn padded(payload: &[u8], nominal: usize) -> Vec<u8> {
    let mut buf = payload.to_vec();
    if buf.len() < nominal {
        buf.resize(nominal, 0);
    }
    buf
}

fn read_comm(payload: &[u8], swap: bool) -> Result<Comm, Error> {
    let buf = padded(payload, COMM_PAYLOAD);
    let mut bs = ByteStream::with_swap(&buf, swap);
    Ok(Comm { comment: bs.get_string(COMM_PAYLOAD)? })
}

fn read_sswb(payload: &[u8], swap: bool) -> Result<Sswb, Error> {
    let buf = padded(payload, SSWB_PAYLOAD);
    let mut bs = ByteStream::with_swap(&buf, swap);
    let last_used = bs.get_i32()?;
    let i_start_time = bs.get_i32()?;
    let i_stop_time = bs.get_i32()?;
    let sizeof_file = bs.get_i32()?;
    let compression_flag = bs.get_i32()?;
    let volume_time_stamp = bs.get_i32()?;
    let num_parms = bs.get_i32()?;
    let radar_name = bs.get_string(8)?;
    let start_time = bs.get_f64()?;
    let stop_time = bs.get_f64()?;
    let version_num = bs.get_i32()?;
    bs.skip(4)?;
    let status = bs.get_i32()?;
    Ok(Sswb {
        last_used,
        i_start_time,
        i_stop_time,
        sizeof_file,
        compression_flag,
        volume_time_stamp,
        num_parms,
        radar_name,
        start_time,
        stop_time,
        version_num,
        status,
    })
}

fn read_vold(payload: &[u8], swap: bool) -> Result<Vold, Error> {
    let buf = padded(payload, VOLD_PAYLOAD);
    let mut bs = ByteStream::with_swap(&buf, swap);
    Ok(Vold {
        format_version: bs.get_i16()?,
        volume_num: bs.get_i16()?,
        maximum_bytes: bs.get_i32()?,
        proj_name: bs.get_string(20)?,
        year: bs.get_i16()?,
        month: bs.get_i16()?,
        day: bs.get_i16()?,
        data_set_hour: bs.get_i16()?,
        data_set_minute: bs.get_i16()?,
        data_set_second: bs.get_i16()?,
        flight_number: bs.get_string(8)?,
        gen_facility: bs.get_string(8)?,
        gen_year: bs.get_i16()?,
        gen_month: bs.get_i16()?,
        gen_day: bs.get_i16()?,
        num_sensors: bs.get_i16()?,
    })
}

fn read_radd(payload: &[u8], swap: bool) -> Result<Radd, Error> {
    let buf = padded(payload, RADD_PAYLOAD);
    let mut bs = ByteStream::with_swap(&buf, swap);
    let radar_name = bs.get_string(8)?;
    let radar_const = bs.get_f32()?;
    let peak_power = bs.get_f32()?;
    let noise_power = bs.get_f32()?;
    let receiver_gain = bs.get_f32()?;
    let antenna_gain = bs.get_f32()?;
    let system_gain = bs.get_f32()?;
    let horz_beam_width = bs.get_f32()?;
    let vert_beam_width = bs.get_f32()?;
    let radar_type = bs.get_i16()?;
    let scan_mode = DoradeScanMode::new(bs.get_i16()?);
    let req_rotat_vel = bs.get_f32()?;
    let scan_mode_pram0 = bs.get_f32()?;
    let scan_mode_pram1 = bs.get_f32()?;
    let num_parms = bs.get_i16()?;
    let total_num_des = bs.get_i16()?;
    let data_compress = bs.get_i16()?;
    let data_reduction = bs.get_i16()?;
    let data_red_parm0 = bs.get_f32()?;
    let data_red_parm1 = bs.get_f32()?;
    let radar_longitude = bs.get_f32()?;
    let radar_latitude = bs.get_f32()?;
    let radar_altitude = bs.get_f32()?;
    let eff_unamb_vel = bs.get_f32()?;
    let eff_unamb_range = bs.get_f32()?;
    let num_freq_trans = bs.get_i16()?;
    let num_ipps_trans = bs.get_i16()?;
    let freq1 = bs.get_f32()?;
    let freq2 = bs.get_f32()?;
    let freq3 = bs.get_f32()?;
    let freq4 = bs.get_f32()?;
    let freq5 = bs.get_f32()?;
    let interpulse_per1 = bs.get_f32()?;
    let interpulse_per2 = bs.get_f32()?;
    let interpulse_per3 = bs.get_f32()?;
    let interpulse_per4 = bs.get_f32()?;
    let interpulse_per5 = bs.get_f32()?;
    let extension_num = bs.get_i32()?;
    let config_name = bs.get_string(8)?;
    let config_num = bs.get_i32()?;
    let aperture_size = bs.get_f32()?;
    let field_of_view = bs.get_f32()?;
    let aperture_eff = bs.get_f32()?;
    let mut freq = [0f32; 11];
    for f in &mut freq {
        *f = bs.get_f32()?;
    }
    let mut interpulse_per = [0f32; 11];
    for p in &mut interpulse_per {
        *p = bs.get_f32()?;
    }
    let pulse_width = bs.get_f32()?;
    let primary_cop_baseln = bs.get_f32()?;
    let secondary_cop_baseln = bs.get_f32()?;
    let pc_xmtr_bandwidth = bs.get_f32()?;
    let pc_waveform_type = bs.get_i32()?;
    let site_name = bs.get_string(20)?;
    Ok(Radd {
        radar_name,
        radar_const,
        peak_power,
        noise_power,
        receiver_gain,
        antenna_gain,
        system_gain,
        horz_beam_width,
        vert_beam_width,
        radar_type,
        scan_mode,
        req_rotat_vel,
        scan_mode_pram0,
        scan_mode_pram1,
        num_parms,
        total_num_des,
        data_compress,
        data_reduction,
        data_red_parm0,
        data_red_parm1,
        radar_longitude,
        radar_latitude,
        radar_altitude,
        eff_unamb_vel,
        eff_unamb_range,
        num_freq_trans,
        num_ipps_trans,
        freq1,
        freq2,
        freq3,
        freq4,
        freq5,
        interpulse_per1,
        interpulse_per2,
        interpulse_per3,
        interpulse_per4,
        interpulse_per5,
        extension_num,
        config_name,
        config_num,
        aperture_size,
        field_of_view,
        aperture_eff,
        freq,
        interpulse_per,
        pulse_width,
        primary_cop_baseln,
        secondary_cop_baseln,
        pc_xmtr_bandwidth,
        pc_waveform_type,
        site_name,
    })
}

fn read_cfac(payload: &[u8], swap: bool) -> Result<Cfac, Error> {
    let buf = padded(payload, CFAC_PAYLOAD);
    let mut bs = ByteStream::with_swap(&buf, swap);
    Ok(Cfac {
        azimuth_corr: bs.get_f32()?,
        elevation_corr: bs.get_f32()?,
        range_delay_corr: bs.get_f32()?,
        longitude_corr: bs.get_f32()?,
        latitude_corr: bs.get_f32()?,
        pressure_alt_corr: bs.get_f32()?,
        radar_alt_corr: bs.get_f32()?,
        ew_gndspd_corr: bs.get_f32()?,
        ns_gndspd_corr: bs.get_f32()?,
        vert_vel_corr: bs.get_f32()?,
        heading_corr: bs.get_f32()?,
        roll_corr: bs.get_f32()?,
        pitch_corr: bs.get_f32()?,
        drift_corr: bs.get_f32()?,
        rot_angle_corr: bs.get_f32()?,
        tilt_corr: bs.get_f32()?,
    })
}

fn read_parm(payload: &[u8], swap: bool) -> Result<Parm, Error> {
    let buf = padded(payload, PARM_PAYLOAD);
    let mut bs = ByteStream::with_swap(&buf, swap);
    let name = bs.get_string(8)?;
    let description = bs.get_string(40)?;
    let units = bs.get_string(8)?;
    let interpulse_time = bs.get_i16()?;
    let xmitted_freq = bs.get_i16()?;
    let recvr_bandwidth = bs.get_f32()?;
    let pulse_width = bs.get_i16()?;
    let polarization = bs.get_i16()?;
    let num_samples = bs.get_i16()?;
    let raw_format = bs.get_i16()?;
    let binary_format = BinaryFormat::from_i16(raw_format).ok_or(
        Error::UnsupportedBinaryFormat { parm: name.clone(), format: raw_format as i32 },
    )?;
    let threshold_field = bs.get_string(8)?;
    let threshold_value = bs.get_f32()?;
    let parameter_scale = bs.get_f32()?;
    let parameter_bias = bs.get_f32()?;
    let bad_data = bs.get_i32()?;
    let extension_num = bs.get_i32()?;
    let config_name = bs.get_string(8)?;
    let config_num = bs.get_i32()?;
    let offset_to_data = bs.get_i32()?;
    let mks_conversion = bs.get_f32()?;
    let num_qnames = bs.get_i32()?;
    let qdata_names = bs.get_string(32)?;
    let num_criteria = bs.get_i32()?;
    let criteria_names = bs.get_string(32)?;
    let num_cells = bs.get_i32()?;
    let meters_to_first_cell = bs.get_f32()?;
    let meters_between_cells = bs.get_f32()?;
    let eff_unamb_vel = bs.get_f32()?;
    Ok(Parm {
        name,
        description,
        units,
        interpulse_time,
        xmitted_freq,
        recvr_bandwidth,
        pulse_width,
        polarization,
        num_samples,
        binary_format,
        threshold_field,
        threshold_value,
        parameter_scale,
        parameter_bias,
        bad_data,
        extension_num,
        config_name,
        config_num,
        offset_to_data,
        mks_conversion,
        num_qnames,
        qdata_names,
        num_criteria,
        criteria_names,
        num_cells,
        meters_to_first_cell,
        meters_between_cells,
        eff_unamb_vel,
    })
}

fn read_celv(payload: &[u8], swap: bool) -> Result<Celv, Error> {
    let mut bs = ByteStream::with_swap(payload, swap);
    let num_cells = bs.get_i32()?.max(0) as usize;
    let mut dist_cells = Vec::with_capacity(num_cells);
    for _ in 0..num_cells {
        dist_cells.push(bs.get_f32()?);
    }
    Ok(Celv { dist_cells })
}

fn read_csfd(payload: &[u8], swap: bool) -> Result<Csfd, Error> {
    let buf = padded(payload, CSFD_PAYLOAD);
    let mut bs = ByteStream::with_swap(&buf, swap);
    let num_segments = bs.get_i32()?;
    let dist_to_first = bs.get_f32()?;
    let mut spacing = [0f32; 8];
    for sp in &mut spacing {
        *sp = bs.get_f32()?;
    }
    let mut num_cells = [0i16; 8];
    for n in &mut num_cells {
        *n = bs.get_i16()?;
    }
    Ok(Csfd { num_segments, dist_to_first, spacing, num_cells })
}

fn read_swib(payload: &[u8], swap: bool) -> Result<Swib, Error> {
    let buf = padded(payload, SWIB_PAYLOAD);
    let mut bs = ByteStream::with_swap(&buf, swap);
    Ok(Swib {
        radar_name: bs.get_string(8)?,
        sweep_num: bs.get_i32()?,
        num_rays: bs.get_i32()?,
        start_angle: bs.get_f32()?,
        stop_angle: bs.get_f32()?,
        fixed_angle: bs.get_f32()?,
        filter_flag: bs.get_i32()?,
    })
}

fn read_asib(payload: &[u8], swap: bool) -> Result<Asib, Error> {
    let buf = padded(payload, ASIB_PAYLOAD);
    let mut bs = ByteStream::with_swap(&buf, swap);
    Ok(Asib {
        longitude: bs.get_f32()?,
        latitude: bs.get_f32()?,
        altitude_msl: bs.get_f32()?,
        altitude_agl: bs.get_f32()?,
        ew_velocity: bs.get_f32()?,
        ns_velocity: bs.get_f32()?,
        vert_velocity: bs.get_f32()?,
        heading: bs.get_f32()?,
        roll: bs.get_f32()?,
        pitch: bs.get_f32()?,
        drift_angle: bs.get_f32()?,
        rotation_angle: bs.get_f32()?,
        tilt: bs.get_f32()?,
        ew_horiz_wind: bs.get_f32()?,
        ns_horiz_wind: bs.get_f32()?,
        vert_wind: bs.get_f32()?,
        heading_change: bs.get_f32()?,
        pitch_change: bs.get_f32()?,
    })
}

fn read_ryib(payload: &[u8], swap: bool) -> Result<Ryib, Error> {
    let buf = padded(payload, RYIB_PAYLOAD);
    let mut bs = ByteStream::with_swap(&buf, swap);
    Ok(Ryib {
        sweep_num: bs.get_i32()?,
        julian_day: bs.get_i32()?,
        hour: bs.get_i16()?,
        minute: bs.get_i16()?,
        second: bs.get_i16()?,
        millisecond: bs.get_i16()?,
        azimuth: bs.get_f32()?,
        elevation: bs.get_f32()?,
        peak_power: bs.get_f32()?,
        true_scan_rate: bs.get_f32()?,
        ray_status: bs.get_i32()?,
    })
}

/// Decode one RDAT block: the eight byte parameter name, then the sample stream of
/// the current parameter for the current ray.
fn read_rdat(
    swp: &mut DoradeSweep,
    payload: &[u8],
    swap: bool,
    ray: usize,
    parm_cursor: usize,
) -> Result<(), Error> {
    if parm_cursor >= swp.sensor.parms.len() {
        return Err(Error::BlockBeforePrereq { id: "RDAT", needs: "PARM" });
    }
    let num_cells = swp
        .num_cells()
        .ok_or(Error::BlockBeforePrereq { id: "RDAT", needs: "CELV or CSFD" })?;
    let num_rays = swp.swib.num_rays.max(0) as usize;

    let parm = swp.sensor.parms[parm_cursor].clone();
    let compressed_16 = swp.sensor.radd.data_compress > 0;
    let compressed_fp = swp.sswb.compression_flag > 0;

    if swp.data(parm_cursor).map(|d| d.is_empty()).unwrap_or(true) {
        swp.alloc_parm_data(parm_cursor, num_rays, num_cells);
    }

    let mut bs = ByteStream::with_swap(payload, swap);
    let _pdata_name = bs.get_string(8)?;
    let scale_inv = 1.0 / parm.parameter_scale;
    let bias = parm.parameter_bias;

    let dat = swp
        .data_mut(parm_cursor)
        .ok_or(Error::BlockBeforePrereq { id: "RDAT", needs: "PARM" })?;
    let row = &mut dat[ray * num_cells..(ray + 1) * num_cells];

    match parm.binary_format {
        BinaryFormat::Int16 => {
            if compressed_16 {
                let mut c = 0usize;
                loop {
                    let code = bs.get_i16()? as u16;
                    if code == 1 {
                        break;
                    }
                    let cnt = (code & 0x7FFF) as usize;
                    if c + cnt > num_cells {
                        return Err(Error::DecompressOverrun { parm: parm.name.clone() });
                    }
                    if code & 0x8000 == 0x8000 {
                        // Run of good data.
                        for _ in 0..cnt {
                            let s = bs.get_i16()?;
                            row[c] = if s as i32 == parm.bad_data {
                                f32::NAN
                            } else {
                                s as f32 * scale_inv - bias
                            };
                            c += 1;
                        }
                    } else {
                        // Run of bad or deleted data.
                        for _ in 0..cnt {
                            row[c] = f32::NAN;
                            c += 1;
                        }
                    }
                }
                if c != num_cells {
                    return Err(Error::DecompressShort { parm: parm.name.clone() });
                }
            } else {
                for cell in row.iter_mut() {
                    let s = bs.get_i16()?;
                    *cell = if s as i32 == parm.bad_data {
                        f32::NAN
                    } else {
                        s as f32 * scale_inv - bias
                    };
                }
            }
        }
        BinaryFormat::Float32 => {
            let bad = parm.bad_data as f32;
            if compressed_fp {
                let mut c = 0usize;
                loop {
                    let code = bs.get_i32()? as u32;
                    if code == 1 {
                        break;
                    }
                    let cnt = (code & 0x7FFF_FFFF) as usize;
                    if c + cnt > num_cells {
                        return Err(Error::DecompressOverrun { parm: parm.name.clone() });
                    }
                    if code & 0x8000_0000 == 0x8000_0000 {
                        for _ in 0..cnt {
                            let v = bs.get_f32()?;
                            row[c] = if v == bad { f32::NAN } else { v };
                            c += 1;
                        }
                    } else {
                        for _ in 0..cnt {
                            row[c] = f32::NAN;
                            c += 1;
                        }
                    }
                }
                if c != num_cells {
                    return Err(Error::DecompressShort { parm: parm.name.clone() });
                }
            } else {
                for cell in row.iter_mut() {
                    let v = bs.get_f32()?;
                    *cell = if v == bad { f32::NAN } else { v };
                }
            }
        }
        BinaryFormat::Int8 | BinaryFormat::Int24 | BinaryFormat::Float16 => {
            return Err(Error::UnsupportedBinaryFormat {
                parm: parm.name.clone(),
                format: parm.binary_format as i32,
            });
        }
    }
    Ok(())
}
