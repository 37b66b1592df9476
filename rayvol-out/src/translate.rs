//! Translation of one sweep of a Sigmet raw volume into a DORADE sweep.
//!
//! The translation carries the radar description across (site, power, beam widths,
//! Nyquist velocity, location), emits one parameter per field of the volume, keeps
//! only the usable rays, and converts every sample to its physical value. When the
//! volume holds reflectivity, an additional `DM` returned power parameter is
//! synthesised as reflectivity minus `20 log10(range)`.
use rayvol_core::data_types::bin4_to_rad;
use rayvol_core::dorade::{Celv, CellGeometry, DoradeSweep, Parm, RayHdr};
use rayvol_core::enums::{BinaryFormat, DataTypeCode, DoradeScanMode, ScanMode};
use rayvol_core::errors::Error;
use rayvol_core::geog::lon_in_domain;
use rayvol_core::tm::{jul_to_cal, UNIX_EPOCH_JULIAN};
use rayvol_core::volume::Volume;

const DEG_PER_RAD: f64 = 180.0 / std::f64::consts::PI;

/// Speed of light in km/s, as the DORADE unambiguous range formula wants it.
const C_KM_PER_S: f64 = 2.9979e5;

/// Populate a DORADE sweep from sweep `s` of a Sigmet volume.
///
/// Only usable rays are carried over, so the DORADE ray count may be less than the
/// Sigmet ray count. Fails when the sweep index is out of range or the sweep holds
/// no usable rays.
pub fn sigmet_to_dorade(vol: &Volume, s: usize) -> Result<DoradeSweep, Error> {
    if !vol.has_headers() {
        return Err(Error::NoHeaders);
    }
    if s >= vol.num_sweeps() || !vol.sweep_hdr(s)?.ok {
        return Err(Error::SweepIndexOutOfBounds { s });
    }
    let num_rays = vol.num_rays();
    let num_cells = vol.num_bins();
    let good_rays: Vec<usize> = (0..num_rays).filter(|&r| !vol.bad_ray(s, r)).collect();
    if good_rays.is_empty() {
        return Err(Error::NoGoodRays);
    }

    let ic = &vol.ingest_hdr.ic;
    let tc = &vol.ingest_hdr.tc;
    let sweep_hdr = *vol.sweep_hdr(s)?;
    let site_name = &ic.su_site_name;
    let task_name = &vol.product_hdr.pc.task_name;
    let wave_len = vol.wave_len();
    let prf = tc.tdi.prf as f64;
    let unamb_vel = vol.nyquist_velocity();
    let peak_power_kw = 0.001 * tc.tmi.power as f64;
    let radar_lon = vol.radar_lon() * DEG_PER_RAD;
    let radar_lat = vol.radar_lat() * DEG_PER_RAD;
    let radar_alt_km = 0.001 * (ic.ground_elev as f64 + ic.radar_ht as f64);

    let mut swp = DoradeSweep::new();

    // COMM names the origin of the translated data.
    swp.comm.comment = format!("Sigmet volume sweep {}, task {}", s, task_name);

    // SSWB: sweep times as Unix seconds.
    let start_secs = (sweep_hdr.time - UNIX_EPOCH_JULIAN) * 86400.0;
    let stop_time = good_rays
        .last()
        .map(|&r| vol.ray_hdr(s, r).map(|h| h.time))
        .transpose()?
        .unwrap_or(sweep_hdr.time);
    let stop_secs = (stop_time - UNIX_EPOCH_JULIAN) * 86400.0;
    swp.sswb.i_start_time = (start_secs + 0.5) as i32;
    swp.sswb.i_stop_time = (stop_secs + 0.5) as i32;
    swp.sswb.start_time = start_secs;
    swp.sswb.stop_time = stop_secs;
    swp.sswb.compression_flag = 0;
    swp.sswb.radar_name = fixed(site_name, 8);

    // VOLD: calendar fields of the sweep time.
    let (year, month, day, hour, minute, second) = jul_to_cal(sweep_hdr.time)?;
    swp.vold.format_version = 1;
    swp.vold.volume_num = 1;
    swp.vold.maximum_bytes = 65500;
    swp.vold.year = year as i16;
    swp.vold.month = month as i16;
    swp.vold.day = day as i16;
    swp.vold.data_set_hour = hour as i16;
    swp.vold.data_set_minute = minute as i16;
    swp.vold.data_set_second = second as i16;
    swp.vold.gen_facility = fixed(site_name, 8);
    swp.vold.gen_year = year as i16;
    swp.vold.gen_month = month as i16;
    swp.vold.gen_day = day as i16;
    swp.vold.num_sensors = 1;

    // RADD: the radar description.
    let radd = &mut swp.sensor.radd;
    radd.radar_name = fixed(site_name, 8);
    radd.radar_const = 0.01 * tc.tci.hpol_radar_const as f32;
    radd.peak_power = peak_power_kw as f32;
    radd.noise_power = 0.01 * tc.tci.hpol_noise as f32;
    radd.horz_beam_width = (bin4_to_rad(tc.tmi.horiz_beam_width) * DEG_PER_RAD) as f32;
    radd.vert_beam_width = (bin4_to_rad(tc.tmi.vert_beam_width) * DEG_PER_RAD) as f32;
    radd.radar_type = 0;
    radd.scan_mode = match tc.tni.scan_mode {
        ScanMode::PpiSector | ScanMode::PpiContinuous => DoradeScanMode::Ppi,
        ScanMode::Rhi => DoradeScanMode::Rhi,
        ScanMode::Manual => DoradeScanMode::Manual,
        ScanMode::FileScan => DoradeScanMode::Invalid,
    };
    radd.data_compress = 0;
    radd.radar_longitude = radar_lon as f32;
    radd.radar_latitude = radar_lat as f32;
    radd.radar_altitude = radar_alt_km as f32;
    radd.eff_unamb_vel = unamb_vel as f32;
    radd.eff_unamb_range = (0.5 * C_KM_PER_S / prf) as f32;
    radd.num_freq_trans = 1;
    radd.num_ipps_trans = 1;
    radd.freq1 = (2.9979e8 / wave_len) as f32;
    radd.interpulse_per1 = (1.0 / prf) as f32;
    radd.config_name = fixed(task_name, 8);
    radd.pulse_width = 0.01 * tc.tdi.pulse_w as f32;
    radd.site_name = fixed(site_name, 20);

    // One PARM per field of the volume, in field order.
    let meters_to_first = (vol.bin_start(0) + 0.5 * vol.bin_step()) as f32;
    let meters_between = vol.bin_step() as f32;
    for field in vol.fields() {
        let mut parm = Parm::default();
        parm.name = parm_name(field.sig_type, &field.abbrv);
        parm.description = fixed(&field.descr, 40);
        parm.units = match field.sig_type {
            Some(code) => dorade_units(code).to_string(),
            None => fixed(&field.unit, 8),
        };
        parm.interpulse_time = 1;
        parm.xmitted_freq = 1;
        parm.recvr_bandwidth = tc.tci.bandwidth as f32;
        parm.pulse_width = (tc.tdi.pulse_w as f64 * 1.0e-8 * 2.9979e8) as i16;
        parm.num_samples = tc.tdi.sampl_sz;
        parm.binary_format = BinaryFormat::Int16;
        parm.threshold_field = "NONE".to_string();
        parm.parameter_scale = 1.0;
        parm.parameter_bias = 0.0;
        parm.bad_data = i16::MIN as i32;
        parm.config_name = fixed(task_name, 8);
        parm.num_cells = num_cells as i32;
        parm.meters_to_first_cell = meters_to_first;
        parm.meters_between_cells = meters_between;
        parm.eff_unamb_vel = unamb_vel as f32;
        swp.add_parm(parm)?;
    }

    // CELV: the distance to every cell.
    let dist_cells: Vec<f32> = (0..num_cells).map(|b| vol.bin_start(b) as f32).collect();
    swp.sensor.cell_geometry = Some(CellGeometry::Celv(Celv { dist_cells }));

    // A Sigmet volume has no correction factors, so CFAC stays zeroed.

    // SWIB: angles come from the first and last usable rays.
    let first = *good_rays.first().unwrap();
    let last = *good_rays.last().unwrap();
    swp.swib.radar_name = fixed(site_name, 8);
    swp.swib.sweep_num = s as i32 + 1;
    swp.swib.num_rays = good_rays.len() as i32;
    swp.swib.start_angle = (mean_angle(vol, s, first, tc.tni.scan_mode)? * DEG_PER_RAD) as f32;
    swp.swib.stop_angle = (mean_angle(vol, s, last, tc.tni.scan_mode)? * DEG_PER_RAD) as f32;
    swp.swib.fixed_angle = (sweep_hdr.angle * DEG_PER_RAD) as f32;
    swp.swib.filter_flag = 0;

    // Ray headers: RYIB and ASIB per usable ray.
    swp.ray_hdrs = Vec::with_capacity(good_rays.len());
    for &r in &good_rays {
        let hdr = vol.ray_hdr(s, r)?;
        let mut ray = RayHdr::default();
        let (ray_year, _, _, hr, min, sec) = jul_to_cal(hdr.time)?;
        ray.ryib.sweep_num = s as i32 + 1;
        ray.ryib.julian_day = DoradeSweep::day_of_year(ray_year, hdr.time)?;
        ray.ryib.hour = hr as i16;
        ray.ryib.minute = min as i16;
        ray.ryib.second = sec.floor() as i16;
        ray.ryib.millisecond = ((sec - sec.floor()) * 1000.0) as i16;
        let az = 0.5 * (hdr.az0 + lon_in_domain(hdr.az1, hdr.az0));
        ray.ryib.azimuth = (lon_in_domain(az, 0.0) * DEG_PER_RAD) as f32;
        ray.ryib.elevation = (0.5 * (hdr.tilt0 + hdr.tilt1) * DEG_PER_RAD) as f32;
        ray.ryib.peak_power = peak_power_kw as f32;
        ray.ryib.ray_status = 0;
        // Assume a stationary ground radar.
        ray.asib.longitude = radar_lon as f32;
        ray.asib.latitude = radar_lat as f32;
        ray.asib.altitude_msl = radar_alt_km as f32;
        ray.asib.altitude_agl = 0.001 * ic.radar_ht as f32;
        swp.ray_hdrs.push(ray);
    }

    // Data arrays: physical values, cell by cell. Bins past a short ray are missing.
    for (p, _) in vol.fields().iter().enumerate() {
        swp.alloc_parm_data(p, good_rays.len(), num_cells);
        let dat = swp.data_mut(p).unwrap();
        for (rd, &r) in good_rays.iter().enumerate() {
            let nbins = vol.ray_hdr(s, r)?.num_bins.max(0) as usize;
            for b in 0..nbins.min(num_cells) {
                dat[rd * num_cells + b] = vol.datum(p, s, r, b) as f32;
            }
        }
    }

    // If the volume has reflectivity, synthesise the returned power parameter
    // DM = dBZ - 20 log10(range).
    let dbz_y = vol
        .fields()
        .iter()
        .position(|f| matches!(f.sig_type, Some(DataTypeCode::DbZ) | Some(DataTypeCode::DbZ2)));
    if let Some(y) = dbz_y {
        let mut parm = swp.sensor.parms[y].clone();
        parm.name = "DM".to_string();
        parm.description = "Returned power".to_string();
        parm.units = "dB".to_string();
        let p_dm = swp.add_parm(parm)?;
        let log_r: Vec<f64> = (0..num_cells)
            .map(|b| (vol.bin_start(b) + 0.5 * vol.bin_step()).log10())
            .collect();
        swp.alloc_parm_data(p_dm, good_rays.len(), num_cells);
        let dat = swp.data_mut(p_dm).unwrap();
        for (rd, &r) in good_rays.iter().enumerate() {
            let nbins = vol.ray_hdr(s, r)?.num_bins.max(0) as usize;
            for b in 0..nbins.min(num_cells) {
                let dbz = vol.datum(y, s, r, b);
                dat[rd * num_cells + b] = (dbz - 20.0 * log_r[b]) as f32;
            }
        }
    }

    let num_parms = swp.num_parms();
    swp.sswb.num_parms = num_parms as i32;
    swp.sensor.radd.num_parms = num_parms as i16;
    swp.sensor.radd.total_num_des = num_parms as i16;
    Ok(swp)
}

/// Mean pointing angle of a ray: azimuth for PPI sweeps, tilt for RHI sweeps,
/// radians.
fn mean_angle(vol: &Volume, s: usize, r: usize, mode: ScanMode) -> Result<f64, Error> {
    let hdr = vol.ray_hdr(s, r)?;
    Ok(match mode {
        ScanMode::Rhi => 0.5 * (hdr.tilt0 + hdr.tilt1),
        _ => lon_in_domain(0.5 * (hdr.az0 + lon_in_domain(hdr.az1, hdr.az0)), 0.0),
    })
}

/// Truncate a header string to the fixed width DORADE allots it.
fn fixed(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// The DORADE parameter name for a field: Sigmet abbreviations lose their `DB_`
/// prefix so they fit the eight byte name field.
fn parm_name(sig_type: Option<DataTypeCode>, abbrv: &str) -> String {
    match sig_type {
        Some(code) => code.abbrv().trim_start_matches("DB_").to_string(),
        None => fixed(abbrv, 8),
    }
}

/// Units strings DORADE consumers expect for the built in Sigmet data types.
fn dorade_units(code: DataTypeCode) -> &'static str {
    use DataTypeCode::*;
    match code {
        DbT | DbZ | Zdr | DbZc | DbT2 | DbZ2 | Zdr2 | DbZc2 => "dB",
        Vel | Width | Vel2 | Width2 | VelC | VelC2 => "m/s",
        PhiDp | PhiDp2 => "degrees",
        RainRate2 => "mm/hr",
        _ => "No unit",
    }
}
