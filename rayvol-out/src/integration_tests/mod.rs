//! This module uses `rayvol_in` and `rayvol_out` together to make round trip tests
//! and observe whether the crates work in a compatible manner. Sweeps are written to
//! temporary files, read back, and compared; the Sigmet translation path is checked
//! against hand-built volumes.
use rayvol_core::dorade::{Celv, CellGeometry, DoradeSweep, Parm, RayHdr};
use rayvol_core::enums::DoradeScanMode;

mod sweep_roundtrip;
mod translation;

/// A writable sweep with `num_rays` rays of `num_cells` cells for one parameter,
/// filled with a predictable ramp.
fn test_sweep(num_rays: usize, num_cells: usize) -> DoradeSweep {
    let mut swp = DoradeSweep::new();
    swp.comm.comment = "Round trip test sweep".to_string();
    swp.sswb.last_used = 0;
    swp.sswb.i_start_time = 1_500_000_000;
    swp.sswb.i_stop_time = 1_500_000_030;
    swp.sswb.start_time = 1_500_000_000.0;
    swp.sswb.stop_time = 1_500_000_030.0;
    swp.sswb.volume_time_stamp = 1_500_000_000;
    swp.sswb.num_parms = 1;
    swp.sswb.radar_name = "TEST".to_string();
    swp.sswb.version_num = 1;
    swp.sswb.status = 0;

    swp.vold.format_version = 1;
    swp.vold.volume_num = 1;
    swp.vold.maximum_bytes = 65500;
    swp.vold.year = 2017;
    swp.vold.month = 7;
    swp.vold.day = 14;
    swp.vold.data_set_hour = 2;
    swp.vold.data_set_minute = 40;
    swp.vold.data_set_second = 0;
    swp.vold.gen_year = 2017;
    swp.vold.gen_month = 7;
    swp.vold.gen_day = 14;
    swp.vold.num_sensors = 1;

    swp.sensor.radd.radar_name = "TEST".to_string();
    swp.sensor.radd.scan_mode = DoradeScanMode::Ppi;
    swp.sensor.radd.num_parms = 1;
    swp.sensor.radd.total_num_des = 1;
    swp.sensor.radd.radar_longitude = -97.5;
    swp.sensor.radd.radar_latitude = 35.2;
    swp.sensor.radd.radar_altitude = 0.37;
    swp.sensor.radd.eff_unamb_vel = 25.0;
    swp.sensor.radd.eff_unamb_range = 150.0;

    let mut parm = Parm::default();
    parm.name = "DBZ".to_string();
    parm.description = "Reflectivity".to_string();
    parm.units = "dB".to_string();
    parm.parameter_scale = 100.0;
    parm.parameter_bias = 0.0;
    parm.threshold_field = "NONE".to_string();
    parm.num_cells = num_cells as i32;
    parm.meters_to_first_cell = 1050.0;
    parm.meters_between_cells = 100.0;
    let p = swp.add_parm(parm).unwrap();

    let dist_cells = (0..num_cells).map(|c| 1000.0 + 100.0 * c as f32).collect();
    swp.sensor.cell_geometry = Some(CellGeometry::Celv(Celv { dist_cells }));

    swp.swib.radar_name = "TEST".to_string();
    swp.swib.sweep_num = 1;
    swp.swib.num_rays = num_rays as i32;
    swp.swib.start_angle = 0.0;
    swp.swib.stop_angle = 90.0;
    swp.swib.fixed_angle = 0.5;
    swp.swib.filter_flag = 0;

    swp.ray_hdrs = Vec::with_capacity(num_rays);
    for r in 0..num_rays {
        let mut hdr = RayHdr::default();
        hdr.ryib.sweep_num = 1;
        hdr.ryib.julian_day = 195;
        hdr.ryib.hour = 2;
        hdr.ryib.minute = 40;
        hdr.ryib.second = r as i16;
        hdr.ryib.millisecond = 0;
        hdr.ryib.azimuth = r as f32 * 9.0;
        hdr.ryib.elevation = 0.5;
        hdr.ryib.peak_power = 250.0;
        hdr.ryib.true_scan_rate = 18.0;
        hdr.ryib.ray_status = 0;
        hdr.asib.longitude = -97.5;
        hdr.asib.latitude = 35.2;
        hdr.asib.altitude_msl = 0.37;
        hdr.asib.altitude_agl = 0.02;
        swp.ray_hdrs.push(hdr);
    }

    swp.alloc_parm_data(p, num_rays, num_cells);
    let dat = swp.data_mut(p).unwrap();
    for r in 0..num_rays {
        for c in 0..num_cells {
            // A ramp with one missing cell per ray.
            dat[r * num_cells + c] = if c == num_cells / 2 {
                f32::NAN
            } else {
                r as f32 - 0.25 * c as f32
            };
        }
    }
    swp
}
