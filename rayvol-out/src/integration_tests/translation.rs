use crate::sigmet_to_dorade;
use rayvol_core::data_types::rad_to_bin4;
use rayvol_core::enums::{DataTypeCode, DoradeScanMode, ScanMode};
use rayvol_core::tm::cal_to_jul;
use rayvol_core::volume::{FieldData, Volume};

/// A one sweep PPI volume with reflectivity and velocity: wavelength 0.1 m,
/// PRF 1000 Hz, 1:1 mode, so the Nyquist velocity is 25 m/s.
fn test_volume() -> Volume {
    let mut vol = Volume::with_dimensions(1, 3, 4).unwrap();
    vol.ingest_hdr.tc.tni.scan_mode = ScanMode::PpiSector;
    vol.ingest_hdr.tc.tmi.wave_len = 1000;
    vol.ingest_hdr.tc.tdi.prf = 1000;
    vol.ingest_hdr.tc.tri.rng_1st_bin = 100_000; // 1 km
    vol.ingest_hdr.tc.tri.step_out = 10_000; // 100 m
    vol.ingest_hdr.ic.su_site_name = "KOUN".to_string();
    vol.ingest_hdr.ic.latitude = rad_to_bin4(35.2f64.to_radians());
    vol.ingest_hdr.ic.longitude = rad_to_bin4(-97.5f64.to_radians());
    vol.ingest_hdr.ic.ground_elev = 370;
    vol.ingest_hdr.ic.radar_ht = 20;
    vol.product_hdr.pc.task_name = "SURVEIL".to_string();

    let time = cal_to_jul(2020, 1, 1, 12, 0, 0.0).unwrap();
    vol.sweep_hdr_mut(0).unwrap().time = time;
    vol.sweep_hdr_mut(0).unwrap().angle = 0.5f64.to_radians();
    for r in 0..3 {
        let hdr = vol.ray_hdr_mut(0, r).unwrap();
        hdr.time = time + r as f64 / 86400.0;
        hdr.az0 = (r as f64 * 2.0).to_radians();
        hdr.az1 = (r as f64 * 2.0 + 1.0).to_radians();
        hdr.tilt0 = 0.5f64.to_radians();
        hdr.tilt1 = 0.5f64.to_radians();
    }

    let y_dbz = vol.install_builtin_field(DataTypeCode::DbZ).unwrap();
    if let Some(FieldData::U1(vals)) = vol.field_data_mut(y_dbz) {
        for (i, v) in vals.iter_mut().enumerate() {
            *v = 64 + (i as u8 % 32) * 2;
        }
        vals[0] = 0; // one missing bin
    }
    let y_vel = vol.install_builtin_field(DataTypeCode::Vel).unwrap();
    if let Some(FieldData::U1(vals)) = vol.field_data_mut(y_vel) {
        for v in vals.iter_mut() {
            *v = 255;
        }
    }
    vol
}

#[test]
fn reflectivity_translates_to_physical_values() {
    let vol = test_volume();
    let swp = sigmet_to_dorade(&vol, 0).unwrap();

    // DB_DBZ and DB_VEL plus the synthesised returned power parameter.
    assert_eq!(swp.num_parms(), 3);
    assert_eq!(swp.sensor.parms[0].name, "DBZ");
    assert_eq!(swp.sensor.parms[1].name, "VEL");
    assert_eq!(swp.sensor.parms[2].name, "DM");
    assert_eq!(swp.sswb.num_parms, 3);
    assert_eq!(swp.sensor.radd.num_parms, 3);

    let dat = swp.parm_data("DBZ").unwrap();
    assert!(dat[0].is_nan());
    // Raw v decodes as 0.5 * (v - 64).
    let raw = 64 + (1 % 32) * 2;
    assert!((dat[1] - 0.5 * (raw as f32 - 64.0)).abs() < 1e-3);
}

#[test]
fn velocity_is_scaled_by_the_nyquist_velocity() {
    let vol = test_volume();
    assert_eq!(vol.nyquist_velocity(), 25.0);
    let swp = sigmet_to_dorade(&vol, 0).unwrap();
    // Raw 255 is full scale: +25 m/s.
    let dat = swp.parm_data("VEL").unwrap();
    for &v in dat {
        assert!((v - 25.0).abs() < 1e-3);
    }
    assert!((swp.sensor.radd.eff_unamb_vel - 25.0).abs() < 1e-6);
}

#[test]
fn returned_power_subtracts_the_range_term() {
    let vol = test_volume();
    let swp = sigmet_to_dorade(&vol, 0).unwrap();
    let dbz = swp.parm_data("DBZ").unwrap();
    let dm = swp.parm_data("DM").unwrap();
    // Bin 1 center sits at 1000 + 100 + 50 meters.
    let expect = dbz[1] - 20.0 * 1150.0f32.log10();
    assert!((dm[1] - expect).abs() < 1e-3);
    assert!(dm[0].is_nan());
}

#[test]
fn sweep_metadata_is_carried_over() {
    let vol = test_volume();
    let swp = sigmet_to_dorade(&vol, 0).unwrap();

    assert_eq!(swp.sensor.radd.radar_name, "KOUN");
    assert_eq!(swp.sensor.radd.scan_mode, DoradeScanMode::Ppi);
    assert!((swp.sensor.radd.radar_latitude - 35.2).abs() < 1e-4);
    assert!((swp.sensor.radd.radar_longitude - -97.5).abs() < 1e-4);
    assert!((swp.sensor.radd.radar_altitude - 0.39).abs() < 1e-6);
    // 0.5 * c / prf in km.
    assert!((swp.sensor.radd.eff_unamb_range - 149.895).abs() < 1e-3);

    assert_eq!(swp.vold.year, 2020);
    assert_eq!(swp.vold.data_set_hour, 12);
    assert_eq!(swp.swib.num_rays, 3);
    assert!((swp.swib.fixed_angle - 0.5).abs() < 1e-4);
    // Unix seconds of 2020-01-01 12:00:00.
    assert_eq!(swp.sswb.i_start_time, 1_577_880_000);

    // The cell vector walks the bins.
    let rng = swp.cell_ranges();
    assert_eq!(rng.len(), 4);
    assert!((rng[0] - 1000.0).abs() < 1e-3);
    assert!((rng[3] - 1300.0).abs() < 1e-3);

    // Ray headers carry the mean pointing angles in degrees.
    assert!((swp.ray_hdrs[1].ryib.azimuth - 2.5).abs() < 1e-4);
    assert!((swp.ray_hdrs[1].ryib.elevation - 0.5).abs() < 1e-4);
    assert_eq!(swp.ray_hdrs[0].ryib.julian_day, 1);
    assert_eq!(swp.ray_hdrs[0].ryib.hour, 12);
}

#[test]
fn bad_sweeps_are_rejected() {
    let vol = test_volume();
    assert!(sigmet_to_dorade(&vol, 5).is_err());
    let mut vol = test_volume();
    for r in 0..3 {
        vol.ray_hdr_mut(0, r).unwrap().ok = false;
    }
    assert!(sigmet_to_dorade(&vol, 0).is_err());
}

#[test]
fn translated_sweeps_round_trip_through_a_file() {
    let dir = tempfile::tempdir().expect("Couldn't get tempfile.");
    let path = dir.path().join("swp.translated");
    let vol = test_volume();
    let mut swp = sigmet_to_dorade(&vol, 0).unwrap();
    crate::write_sweep_file(&mut swp, Some(&path)).unwrap();
    let back = rayvol_in::open_sweep(&path).unwrap();
    assert_eq!(back.sensor.parms, swp.sensor.parms);
    // Scale 1.0 quantises to whole units.
    let orig = swp.parm_data("DBZ").unwrap();
    let read = back.parm_data("DBZ").unwrap();
    for (a, b) in orig.iter().zip(read.iter()) {
        if a.is_nan() {
            assert!(b.is_nan());
        } else {
            assert!((a - b).abs() <= 0.5);
        }
    }
}
