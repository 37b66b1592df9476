mod bytestream {
    use crate::bytestream::{trim_fixed, ByteSink, ByteStream};

    #[test]
    fn endian_round_trip_i16() {
        for &v in &[0i16, 1, -1, i16::MAX, i16::MIN, 27, 0x1234] {
            let mut sink = ByteSink::new();
            sink.put_i16(v);
            let bytes = sink.into_inner();
            let mut bs = ByteStream::new(&bytes);
            assert_eq!(bs.get_i16().unwrap(), v);
            let mut bs = ByteStream::with_swap(&bytes, true);
            assert_eq!(bs.get_i16().unwrap(), v.swap_bytes());
        }
    }

    #[test]
    fn endian_round_trip_i32() {
        for &v in &[0i32, 1, -1, i32::MAX, i32::MIN, 0x0102_0304] {
            let mut sink = ByteSink::new();
            sink.put_i32(v);
            let bytes = sink.into_inner();
            let mut bs = ByteStream::new(&bytes);
            assert_eq!(bs.get_i32().unwrap(), v);
            let mut bs = ByteStream::with_swap(&bytes, true);
            assert_eq!(bs.get_i32().unwrap(), v.swap_bytes());
        }
    }

    #[test]
    fn swapped_writer_matches_swapped_reader() {
        let mut sink = ByteSink::with_swap(true);
        sink.put_u16(0xBEEF);
        sink.put_f32(42.5);
        sink.put_f64(-1.25);
        let bytes = sink.into_inner();
        let mut bs = ByteStream::with_swap(&bytes, true);
        assert_eq!(bs.get_u16().unwrap(), 0xBEEF);
        assert_eq!(bs.get_f32().unwrap(), 42.5);
        assert_eq!(bs.get_f64().unwrap(), -1.25);
    }

    #[test]
    fn reads_advance_and_end() {
        let bytes = [1u8, 0, 2, 0, 0, 0];
        let mut bs = ByteStream::new(&bytes);
        assert_eq!(bs.get_i16().unwrap(), 1);
        assert_eq!(bs.pos(), 2);
        assert_eq!(bs.get_i32().unwrap(), 2);
        assert!(bs.is_empty());
        assert!(bs.get_u8().is_err());
    }

    #[test]
    fn fixed_strings() {
        assert_eq!(trim_fixed(b"DB_VEL2 "), "DB_VEL2");
        assert_eq!(trim_fixed(b"ABC\0XYZ"), "ABC");
        assert_eq!(trim_fixed(b"        "), "");
        let mut sink = ByteSink::new();
        sink.put_str_fixed("KOUN", 8);
        assert_eq!(sink.as_slice(), b"KOUN\0\0\0\0");
    }
}

mod data_types {
    use crate::data_types::*;
    use crate::enums::{DataTypeCode, StorageFormat};

    fn ctx() -> ConvContext {
        // Wavelength 0.1 m, PRF 1000 Hz, 1:1 PRF mode.
        ConvContext { v_nyquist: 25.0, wave_len: 0.1, prf: 1000.0 }
    }

    #[test]
    fn binary_angles() {
        assert_eq!(bin4_to_rad(0), 0.0);
        let quarter = bin4_to_rad(0x4000_0000);
        assert!((quarter - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
        assert_eq!(rad_to_bin2(std::f64::consts::PI), 0x8000);
        assert!((bin2_to_rad(rad_to_bin2(1.0)) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn reflectivity_conversion() {
        let conv = DataTypeCode::DbZ.stor_to_comp();
        assert!(conv(0.0, &ctx()).is_nan());
        assert_eq!(conv(64.0, &ctx()), 0.0);
        assert_eq!(conv(128.0, &ctx()), 32.0);
        // Clipped above the valid range.
        assert_eq!(conv(256.0, &ctx()), 95.5);
    }

    #[test]
    fn velocity_conversion() {
        let conv = DataTypeCode::Vel.stor_to_comp();
        assert!(conv(0.0, &ctx()).is_nan());
        assert_eq!(conv(128.0, &ctx()), 0.0);
        assert_eq!(conv(255.0, &ctx()), 25.0);
        assert_eq!(conv(1.0, &ctx()), 25.0 * -127.0 / 127.0);
    }

    #[test]
    fn two_byte_conversions() {
        let conv = DataTypeCode::DbZ2.stor_to_comp();
        assert!(conv(0.0, &ctx()).is_nan());
        assert_eq!(conv(32768.0, &ctx()), 0.0);
        assert!((conv(32868.0, &ctx()) - 1.0).abs() < 1e-9);
        let conv = DataTypeCode::Width2.stor_to_comp();
        assert!((conv(250.0, &ctx()) - 2.5).abs() < 1e-9);
        let conv = DataTypeCode::PhiDp2.stor_to_comp();
        assert_eq!(conv(1.0, &ctx()), 0.0);
        assert!((conv(65535.0, &ctx()) - 360.0).abs() < 1e-9);
    }

    #[test]
    fn rain_rate_packing() {
        let conv = DataTypeCode::RainRate2.stor_to_comp();
        assert!(conv(0.0, &ctx()).is_nan());
        // Exponent 0: linear in the mantissa.
        assert_eq!(conv(1.0, &ctx()), 0.0);
        assert!((conv(11.0, &ctx()) - 0.001).abs() < 1e-9);
        // Exponent 1: mantissa with the hidden bit, shifted by 0.
        let v = (1 << 12 | 0x0800) as f64;
        let expect = 0.0001 * ((0x1800u32 << 0) as f64 - 1.0);
        assert!((conv(v, &ctx()) - expect).abs() < 1e-9);
    }

    #[test]
    fn kdp_is_signed_around_128() {
        let conv = DataTypeCode::Kdp.stor_to_comp();
        assert_eq!(conv(128.0, &ctx()), 0.0);
        let up = conv(200.0, &ctx());
        let down = conv(56.0, &ctx());
        assert!(up > 0.0 && down < 0.0);
        assert!((up + down).abs() < 1e-9);
    }

    #[test]
    fn abbreviations_round_trip() {
        for code in DataTypeCode::iter() {
            assert_eq!(DataTypeCode::from_abbrv(code.abbrv()), Some(code));
        }
        assert_eq!(DataTypeCode::from_abbrv("DB_NOPE"), None);
    }

    #[test]
    fn storage_widths() {
        assert_eq!(DataTypeCode::Xhdr.storage(), StorageFormat::Empty);
        assert_eq!(DataTypeCode::DbZ.storage().bytes_per_bin(), 1);
        assert_eq!(DataTypeCode::DbZ2.storage().bytes_per_bin(), 2);
        assert_eq!(StorageFormat::F4.bytes_per_bin(), 4);
    }

    #[test]
    fn registry_rejects_builtins_and_duplicates() {
        let mut reg = Registry::new();
        reg.add_data_type("SNR", "Signal to noise", "dB").unwrap();
        assert!(reg.add_data_type("SNR", "again", "dB").is_err());
        assert!(reg.add_data_type("DB_VEL", "", "m/s").is_err());
        assert_eq!(reg.get("SNR").unwrap().unit, "dB");
        assert!(reg.remove("SNR").is_some());
        assert!(reg.get("SNR").is_none());
    }
}

mod enums {
    use crate::enums::*;

    #[test]
    fn mask_bits_skip_bit_six() {
        assert_eq!(DataTypeCode::Xhdr.mask_bit(), 1);
        assert_eq!(DataTypeCode::Zdr.mask_bit(), 1 << 5);
        assert_eq!(DataTypeCode::DbZc.mask_bit(), 1 << 7);
        assert_eq!(DataTypeCode::DbT2.mask_bit(), 1 << 8);
        // No two types share a bit, and bit 6 stays clear.
        let mut all = 0u32;
        for code in DataTypeCode::iter() {
            assert_eq!(all & code.mask_bit(), 0);
            all |= code.mask_bit();
        }
        assert_eq!(all & (1 << 6), 0);
    }

    #[test]
    fn scan_mode_codes() {
        assert_eq!(ScanMode::new(1).unwrap(), ScanMode::PpiSector);
        assert_eq!(ScanMode::new(2).unwrap(), ScanMode::Rhi);
        assert_eq!(ScanMode::new(4).unwrap(), ScanMode::PpiContinuous);
        assert!(ScanMode::new(1).unwrap().is_ppi());
        assert!(ScanMode::new(4).unwrap().is_ppi());
        assert!(ScanMode::new(2).unwrap().is_rhi());
        assert!(ScanMode::new(0).is_err());
        assert!(ScanMode::new(6).is_err());
    }

    #[test]
    fn multi_prf_codes() {
        assert_eq!(MultiPrfMode::new(0).unwrap(), MultiPrfMode::OneOne);
        assert_eq!(MultiPrfMode::new(3).unwrap(), MultiPrfMode::FourFive);
        assert!(MultiPrfMode::new(4).is_err());
    }

    #[test]
    fn dorade_scan_mode_tolerates_junk() {
        assert_eq!(DoradeScanMode::new(1), DoradeScanMode::Ppi);
        assert_eq!(DoradeScanMode::new(3), DoradeScanMode::Rhi);
        assert_eq!(DoradeScanMode::new(-999), DoradeScanMode::Invalid);
    }
}

mod tm {
    use crate::tm::*;

    #[test]
    fn epoch() {
        assert_eq!(cal_to_jul(1970, 1, 1, 0, 0, 0.0).unwrap(), UNIX_EPOCH_JULIAN);
    }

    #[test]
    fn calendar_round_trip() {
        let j = cal_to_jul(2004, 2, 29, 23, 59, 30.0).unwrap();
        let (y, mo, d, h, mi, s) = jul_to_cal(j).unwrap();
        assert_eq!((y, mo, d, h, mi), (2004, 2, 29, 23, 59));
        assert!((s - 30.0).abs() < 1e-3);
    }

    #[test]
    fn bad_dates_fail() {
        assert!(cal_to_jul(2005, 2, 29, 0, 0, 0.0).is_err());
        assert!(cal_to_jul(2005, 13, 1, 0, 0, 0.0).is_err());
        assert!(jul_to_cal(f64::NAN).is_err());
    }

    #[test]
    fn ymds_incr_rolls_the_calendar() {
        let mut tm = crate::headers::YmdsTime {
            sec: 86399,
            msec: 0,
            utc: true,
            year: 1999,
            month: 12,
            day: 31,
        };
        tm.incr(2.0 / 86400.0).unwrap();
        assert_eq!((tm.year, tm.month, tm.day), (2000, 1, 1));
        assert_eq!(tm.sec, 1);
    }
}

mod geog {
    use crate::geog::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn lon_wraps_into_domain() {
        assert!((lon_in_domain(2.5 * PI, 0.0) - 0.5 * PI).abs() < 1e-12);
        assert!((lon_in_domain(-2.5 * PI, 0.0) + 0.5 * PI).abs() < 1e-12);
        // Already within half a turn of the reference: unchanged.
        assert!((lon_in_domain(0.1, PI) - 0.1).abs() < 1e-12);
        // A quarter turn west of the reference comes back east of it.
        assert!((lon_in_domain(-0.25 * PI, PI) - 1.75 * PI).abs() < 1e-12);
    }

    #[test]
    fn lat_folds_over_poles() {
        assert!((lat_in_domain(0.4) - 0.4).abs() < 1e-12);
        assert!((lat_in_domain(FRAC_PI_2 + 0.1) - (FRAC_PI_2 - 0.1)).abs() < 1e-12);
        assert!((lat_in_domain(-FRAC_PI_2 - 0.1) + (FRAC_PI_2 - 0.1)).abs() < 1e-12);
    }

    #[test]
    fn step_north_increases_latitude() {
        let (lon, lat) = step(0.0, 0.0, 0.0, 0.01);
        assert!(lon.abs() < 1e-12);
        assert!((lat - 0.01).abs() < 1e-12);
    }

    #[test]
    fn step_and_distance_agree() {
        let (lon, lat) = step(0.2, 0.7, 1.1, 0.05);
        let d = distance(0.2, 0.7, lon, lat);
        assert!((d - 0.05).abs() < 1e-9);
        let az = azimuth(0.2, 0.7, lon, lat);
        assert!((az - 1.1).abs() < 1e-6);
    }

    #[test]
    fn beam_height_grows_with_tilt() {
        let re = FOUR_THIRD * R_EARTH;
        let low = beam_height(10_000.0, 0.0, re);
        let high = beam_height(10_000.0, 0.1, re);
        assert!(high > low);
        // At small tilt, height is close to range * sin(tilt).
        assert!((high - 10_000.0 * 0.1f64.sin()).abs() < 20.0);
    }
}

mod proj {
    use crate::geog::R_EARTH;
    use crate::proj::Projection;

    #[test]
    fn parse_specifiers() {
        assert!(Projection::from_spec("CylEqDist 0.0 45.0").is_ok());
        assert!(Projection::from_spec("Mercator -97.0").is_ok());
        assert!(Projection::from_spec("CylEqArea 10.0").is_ok());
        assert!(Projection::from_spec("Orthographic 0 0").is_err());
        assert!(Projection::from_spec("CylEqDist").is_err());
        assert!(Projection::from_spec("CylEqDist 0.0 0.0 junk").is_err());
    }

    #[test]
    fn equirect_round_trip() {
        let proj = Projection::from_spec("CylEqDist 0.0 0.0").unwrap();
        let (x, y) = proj.lonlat_to_xy(0.02, 0.01).unwrap();
        assert!((x - 0.02 * R_EARTH).abs() < 1.0);
        assert!((y - 0.01 * R_EARTH).abs() < 1.0);
        let (lon, lat) = proj.xy_to_lonlat(x, y).unwrap();
        assert!((lon - 0.02).abs() < 1e-9 && (lat - 0.01).abs() < 1e-9);
    }

    #[test]
    fn mercator_rejects_poles() {
        let proj = Projection::from_spec("Mercator 0.0").unwrap();
        assert!(proj.lonlat_to_xy(0.0, std::f64::consts::FRAC_PI_2).is_none());
        let (x, y) = proj.lonlat_to_xy(0.01, 0.5).unwrap();
        let (lon, lat) = proj.xy_to_lonlat(x, y).unwrap();
        assert!((lon - 0.01).abs() < 1e-9 && (lat - 0.5).abs() < 1e-9);
    }
}

mod volume {
    use crate::enums::{DataTypeCode, ScanMode};
    use crate::errors::{Error, Status};
    use crate::proj::Projection;
    use crate::volume::{FieldData, Volume};
    use std::f64::consts::PI;

    fn test_volume() -> Volume {
        Volume::with_dimensions(1, 4, 3).unwrap()
    }

    #[test]
    fn set_constant_then_log10() {
        let mut vol = test_volume();
        vol.new_field("Z", "Test", "dB").unwrap();
        vol.set_value("Z", 10.0).unwrap();
        vol.log10_field("Z").unwrap();
        for r in 0..4 {
            for b in 0..3 {
                assert_eq!(vol.datum(0, 0, r, b), 1.0);
            }
        }
        assert!(vol.modified);
    }

    #[test]
    fn add_then_subtract_is_identity_off_nan() {
        let mut vol = test_volume();
        vol.new_field("F", "", "").unwrap();
        vol.set_value("F", 3.5).unwrap();
        // Poke one bin back to NaN through the data array.
        if let Some(FieldData::F4(vals)) = vol.field_data_mut(0) {
            vals[4] = f32::NAN;
        }
        vol.add_value("F", 2.5).unwrap();
        vol.sub_value("F", 2.5).unwrap();
        let mut nan_seen = 0;
        for r in 0..4 {
            for b in 0..3 {
                let v = vol.datum(0, 0, r, b);
                if v.is_nan() {
                    nan_seen += 1;
                } else {
                    assert_eq!(v, 3.5);
                }
            }
        }
        assert_eq!(nan_seen, 1);
    }

    #[test]
    fn field_wise_combination_and_negation() {
        let mut vol = test_volume();
        vol.new_field("A", "", "").unwrap();
        vol.new_field("B", "", "").unwrap();
        vol.set_value("A", 8.0).unwrap();
        vol.set_value("B", 2.0).unwrap();
        vol.add_field("A", "-B").unwrap();
        assert_eq!(vol.datum(0, 0, 0, 0), 6.0);
        vol.div_field("A", "B").unwrap();
        assert_eq!(vol.datum(0, 0, 0, 0), 3.0);
        vol.mul_field("A", "B").unwrap();
        assert_eq!(vol.datum(0, 0, 0, 0), 6.0);
        vol.sub_field("A", "B").unwrap();
        assert_eq!(vol.datum(0, 0, 0, 0), 4.0);
    }

    #[test]
    fn copy_converts_raw_fields() {
        let mut vol = test_volume();
        let y = vol.install_builtin_field(DataTypeCode::DbZ).unwrap();
        if let Some(FieldData::U1(vals)) = vol.field_data_mut(y) {
            for v in vals.iter_mut() {
                *v = 128;
            }
            vals[0] = 0; // missing
        }
        vol.new_field("ZC", "", "dBZ").unwrap();
        vol.copy_field("ZC", "DB_DBZ").unwrap();
        assert!(vol.datum(1, 0, 0, 0).is_nan());
        assert_eq!(vol.datum(1, 0, 0, 1), 32.0);
    }

    #[test]
    fn builtin_fields_are_not_editable() {
        let mut vol = test_volume();
        vol.install_builtin_field(DataTypeCode::DbZ).unwrap();
        let err = vol.set_value("DB_DBZ", 1.0).unwrap_err();
        assert_eq!(err.status(), Status::BadArg);
        assert!(matches!(err, Error::BuiltinType { .. }));
        assert!(vol.new_field("DB_DBZ", "", "").is_err());
    }

    #[test]
    fn divide_by_zero_is_rejected() {
        let mut vol = test_volume();
        vol.new_field("F", "", "").unwrap();
        let err = vol.div_value("F", 0.0).unwrap_err();
        assert!(matches!(err, Error::DivideByZero));
    }

    #[test]
    fn delete_keeps_remaining_fields_reachable() {
        let mut vol = test_volume();
        vol.new_field("A", "", "").unwrap();
        vol.new_field("B", "", "").unwrap();
        vol.set_value("B", 7.0).unwrap();
        vol.del_field("A").unwrap();
        assert_eq!(vol.num_fields(), 1);
        assert_eq!(vol.field_index("B"), Some(0));
        assert_eq!(vol.datum(0, 0, 0, 0), 7.0);
        assert!(vol.del_field("A").is_err());
    }

    #[test]
    fn set_beam_range_uses_bin_centers() {
        let mut vol = test_volume();
        vol.ingest_hdr.tc.tri.rng_1st_bin = 100_000; // 1000 m in cm
        vol.ingest_hdr.tc.tri.step_out = 10_000; // 100 m in cm
        vol.new_field("RNG", "", "m").unwrap();
        vol.set_beam_range("RNG").unwrap();
        assert_eq!(vol.datum(0, 0, 0, 0), 1050.0);
        assert_eq!(vol.datum(0, 0, 0, 2), 1250.0);
    }

    #[test]
    fn shift_az_stays_canonical() {
        let mut vol = test_volume();
        for r in 0..4 {
            let hdr = vol.ray_hdr_mut(0, r).unwrap();
            hdr.az0 = 0.9 * PI;
            hdr.az1 = 0.9 * PI;
        }
        vol.shift_az(PI / 2.0).unwrap();
        for r in 0..4 {
            let hdr = vol.ray_hdr(0, r).unwrap();
            assert!((hdr.az0 - (0.9 * PI + PI / 2.0 - 2.0 * PI)).abs() < 1e-9);
            assert!(hdr.az0 <= PI && hdr.az0 >= -PI);
        }
        assert!(vol.modified);
    }

    #[test]
    fn incr_time_moves_every_clock() {
        let mut vol = test_volume();
        vol.ingest_hdr.ic.vol_start_time.year = 2010;
        vol.ingest_hdr.ic.vol_start_time.month = 6;
        vol.ingest_hdr.ic.vol_start_time.day = 15;
        vol.product_hdr.pc.gen_tm.year = 2010;
        vol.product_hdr.pc.gen_tm.month = 6;
        vol.product_hdr.pc.gen_tm.day = 15;
        vol.product_hdr.pc.ingest_sweep_tm = vol.product_hdr.pc.gen_tm.clone();
        vol.product_hdr.pc.ingest_file_tm = vol.product_hdr.pc.gen_tm.clone();
        vol.ingest_hdr.tc.tei.data_time = vol.product_hdr.pc.gen_tm.clone();
        let t0 = vol.sweep_hdr(0).unwrap().time;
        vol.incr_time(90.0).unwrap();
        assert_eq!(vol.ingest_hdr.ic.vol_start_time.sec, 90);
        assert!((vol.sweep_hdr(0).unwrap().time - t0 - 90.0 / 86400.0).abs() < 1e-9);
    }

    #[test]
    fn nyquist_folds_multi_prf_stages() {
        let mut vol = test_volume();
        vol.ingest_hdr.tc.tmi.wave_len = 1000; // 0.1 m in 1/100 cm
        vol.ingest_hdr.tc.tdi.prf = 1000;
        assert_eq!(vol.nyquist_velocity(), 25.0);
        vol.ingest_hdr.tc.tdi.multi_prf_mode = crate::enums::MultiPrfMode::TwoThree;
        assert_eq!(vol.nyquist_velocity(), 75.0);
        vol.ingest_hdr.tc.tdi.multi_prf_mode = crate::enums::MultiPrfMode::ThreeFour;
        assert_eq!(vol.nyquist_velocity(), 100.0);
        vol.ingest_hdr.tc.tdi.multi_prf_mode = crate::enums::MultiPrfMode::FourFive;
        assert_eq!(vol.nyquist_velocity(), 125.0);
    }

    #[test]
    fn near_sweep_picks_closest_angle() {
        let mut vol = Volume::with_dimensions(3, 2, 2).unwrap();
        vol.num_sweeps_actual = 3;
        vol.sweep_hdr_mut(0).unwrap().angle = 0.1;
        vol.sweep_hdr_mut(1).unwrap().angle = 0.5;
        vol.sweep_hdr_mut(2).unwrap().angle = 1.2;
        assert_eq!(vol.near_sweep(0.55), Some(1));
        assert_eq!(vol.near_sweep(-0.05), Some(0));
    }

    #[test]
    fn ppi_outline_points_north() {
        let mut vol = test_volume();
        vol.ingest_hdr.tc.tni.scan_mode = ScanMode::PpiSector;
        vol.ingest_hdr.tc.tri.rng_1st_bin = 1_000_000; // 10 km in cm
        vol.ingest_hdr.tc.tri.step_out = 10_000; // 100 m
        // Radar at (0, 0): binary angle zero is already there.
        for r in 0..4 {
            let hdr = vol.ray_hdr_mut(0, r).unwrap();
            hdr.az0 = 0.0;
            hdr.az1 = 0.01;
            hdr.tilt0 = 0.0;
            hdr.tilt1 = 0.0;
        }
        let proj = Projection::from_spec("CylEqDist 0.0 0.0").unwrap();
        let outline = vol
            .ppi_bin_outline(0, 0, 1, |lon, lat| proj.lonlat_to_xy(lon, lat))
            .unwrap();
        let r0 = 10_100.0;
        let r1 = 10_200.0;
        // First corner sits on the start azimuth at the bin start range.
        assert!(outline[0].0.abs() < 1.0);
        assert!(outline[0].1 > r0 * 0.999 && outline[0].1 < r0 * 1.001);
        assert!(outline[1].1 > outline[0].1);
        assert!(outline[1].1 > r1 * 0.999 && outline[1].1 < r1 * 1.001);
        // The far azimuth corners sit east of the start azimuth ones.
        assert!(outline[2].0 > outline[1].0);
    }

    #[test]
    fn rhi_outline_is_ground_and_height() {
        let mut vol = test_volume();
        vol.ingest_hdr.tc.tni.scan_mode = ScanMode::Rhi;
        vol.ingest_hdr.tc.tri.rng_1st_bin = 1_000_000;
        vol.ingest_hdr.tc.tri.step_out = 10_000;
        for r in 0..4 {
            let hdr = vol.ray_hdr_mut(0, r).unwrap();
            hdr.tilt0 = 0.1;
            hdr.tilt1 = 0.12;
        }
        let outline = vol.rhi_bin_outline(0, 0, 0).unwrap();
        // Height grows with range and with tilt.
        assert!(outline[1].1 > outline[0].1);
        assert!(outline[3].1 > outline[0].1);
        // Ground distance is a bit less than slant range.
        assert!(outline[0].0 < 10_000.0 && outline[0].0 > 9_000.0);
        assert!(vol.ppi_bin_outline(0, 0, 0, |_, _| Some((0.0, 0.0))).is_err());
    }

    #[test]
    fn bounds_cover_the_sweep() {
        let mut vol = test_volume();
        vol.ingest_hdr.tc.tni.scan_mode = ScanMode::PpiSector;
        vol.ingest_hdr.tc.tri.rng_1st_bin = 0;
        vol.ingest_hdr.tc.tri.step_out = 100_000; // 1 km bins
        let azs = [0.0, PI / 2.0, PI, -PI / 2.0];
        for r in 0..4 {
            let hdr = vol.ray_hdr_mut(0, r).unwrap();
            hdr.az0 = azs[r];
            hdr.az1 = azs[r];
        }
        let proj = Projection::from_spec("CylEqDist 0.0 0.0").unwrap();
        let (x_min, x_max, y_min, y_max) =
            vol.ppi_bounds(0, |lon, lat| proj.lonlat_to_xy(lon, lat)).unwrap();
        assert!(x_min < -3000.0 && x_max > 3000.0);
        assert!(y_min < -3000.0 && y_max > 3000.0);
    }

    #[test]
    fn bounds_skip_unusable_rays_without_error() {
        let mut vol = test_volume();
        vol.ingest_hdr.tc.tni.scan_mode = ScanMode::PpiSector;
        vol.ingest_hdr.tc.tri.step_out = 100_000;
        for r in 0..4 {
            vol.ray_hdr_mut(0, r).unwrap().ok = false;
        }
        let proj = Projection::from_spec("CylEqDist 0.0 0.0").unwrap();
        // Every ray is skipped; the box collapses onto the radar location.
        let (x_min, x_max, y_min, y_max) =
            vol.ppi_bounds(0, |lon, lat| proj.lonlat_to_xy(lon, lat)).unwrap();
        assert_eq!((x_min, x_max, y_min, y_max), (0.0, 0.0, 0.0, 0.0));
        // A sweep index past the usable prefix is an error.
        let err = vol.ppi_bounds(1, |lon, lat| proj.lonlat_to_xy(lon, lat)).unwrap_err();
        assert_eq!(err.status(), Status::RngErr);
    }

    #[test]
    fn ray_geometry_fill_averages_neighbours() {
        let mut vol = test_volume();
        vol.ingest_hdr.tc.tni.scan_mode = ScanMode::PpiSector;
        let azs = [0.00, 0.02, 0.04, 0.06];
        for r in 0..4 {
            let hdr = vol.ray_hdr_mut(0, r).unwrap();
            hdr.az0 = azs[r];
            hdr.az1 = azs[r] + 0.02;
        }
        let geom = vol.ray_geometry(0, true).unwrap();
        // Interior rays share their edges with their neighbours.
        assert!((geom.az1[0] - geom.az0[1]).abs() < 1e-9);
        assert!((geom.az1[1] - geom.az0[2]).abs() < 1e-9);
        // Unfilled geometry echoes the raw headers.
        let raw = vol.ray_geometry(0, false).unwrap();
        assert_eq!(raw.az0[2], 0.04);
    }
}

mod dorade {
    use crate::dorade::*;
    use crate::enums::DoradeScanMode;

    #[test]
    fn csfd_cell_ranges_walk_segments() {
        let csfd = Csfd {
            num_segments: 2,
            dist_to_first: 100.0,
            spacing: [50.0, 100.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            num_cells: [2, 3, 0, 0, 0, 0, 0, 0],
        };
        let geo = CellGeometry::Csfd(csfd);
        assert_eq!(geo.num_cells(), 5);
        assert_eq!(geo.cell_ranges(), vec![100.0, 150.0, 200.0, 300.0, 400.0]);
    }

    #[test]
    fn parameters_keep_insertion_order() {
        let mut swp = DoradeSweep::new();
        for name in ["DBZ", "VEL", "WIDTH"] {
            let mut parm = Parm::default();
            parm.name = name.to_string();
            swp.add_parm(parm).unwrap();
        }
        let names: Vec<&str> = swp.sensor.parms.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["DBZ", "VEL", "WIDTH"]);
        assert_eq!(swp.parm_index("VEL"), Some(1));
        let mut dup = Parm::default();
        dup.name = "VEL".to_string();
        assert!(swp.add_parm(dup).is_err());
    }

    #[test]
    fn copy_parm_duplicates_data() {
        let mut swp = DoradeSweep::new();
        let mut parm = Parm::default();
        parm.name = "DBZ".to_string();
        let p = swp.add_parm(parm).unwrap();
        swp.alloc_parm_data(p, 1, 3);
        swp.data_mut(p).unwrap()[1] = 5.0;
        swp.copy_parm("DBZ", "DBZC", "Copied").unwrap();
        assert_eq!(swp.parm_data("DBZC").unwrap()[1], 5.0);
        assert_eq!(swp.parm("DBZC").unwrap().description, "Copied");
    }

    #[test]
    fn shift_az_moves_fixed_angle_only_for_rhi() {
        let mut swp = DoradeSweep::new();
        swp.swib.start_angle = 10.0;
        swp.swib.stop_angle = 20.0;
        swp.swib.fixed_angle = 0.5;
        swp.ray_hdrs = vec![RayHdr::default(); 2];
        swp.ray_hdrs[0].ryib.azimuth = 179.0;
        swp.sensor.radd.scan_mode = DoradeScanMode::Ppi;
        swp.shift_az(2.0);
        assert_eq!(swp.swib.fixed_angle, 0.5);
        assert!((swp.ray_hdrs[0].ryib.azimuth - -179.0).abs() < 1e-4);
        swp.sensor.radd.scan_mode = DoradeScanMode::Rhi;
        swp.shift_az(1.0);
        assert!((swp.swib.fixed_angle - 1.5).abs() < 1e-4);
    }

    #[test]
    fn incr_time_keeps_ray_times_consistent() {
        let mut swp = DoradeSweep::new();
        swp.sswb.i_start_time = 1_000_000_000;
        swp.sswb.i_stop_time = 1_000_000_060;
        swp.sswb.volume_time_stamp = 1_000_000_000;
        swp.sswb.start_time = 1_000_000_000.0;
        swp.sswb.stop_time = 1_000_000_060.0;
        swp.vold.year = 2001;
        swp.vold.month = 9;
        swp.vold.day = 8;
        swp.vold.data_set_hour = 23;
        swp.vold.data_set_minute = 59;
        swp.vold.data_set_second = 30;
        swp.ray_hdrs = vec![RayHdr::default()];
        swp.ray_hdrs[0].ryib.julian_day = 251;
        swp.ray_hdrs[0].ryib.hour = 23;
        swp.ray_hdrs[0].ryib.minute = 59;
        swp.ray_hdrs[0].ryib.second = 30;
        swp.ray_hdrs[0].ryib.millisecond = 0;
        swp.incr_time(60.0).unwrap();
        assert_eq!(swp.sswb.i_start_time, 1_000_000_060);
        assert_eq!((swp.vold.day, swp.vold.data_set_hour, swp.vold.data_set_minute), (9, 0, 0));
        assert_eq!(swp.ray_hdrs[0].ryib.julian_day, 252);
        assert_eq!(swp.ray_hdrs[0].ryib.hour, 0);
        assert_eq!(swp.ray_hdrs[0].ryib.second, 30);
    }

    #[test]
    fn default_file_names() {
        let mut swp = DoradeSweep::new();
        swp.sswb.i_start_time = 1_000_000_000; // 2001-09-09 01:46:40 UTC
        swp.sensor.radd.radar_name = "KOUN".to_string();
        swp.sensor.radd.scan_mode = DoradeScanMode::Ppi;
        swp.swib.fixed_angle = 0.5;
        swp.ray_hdrs = vec![RayHdr::default()];
        swp.ray_hdrs[0].ryib.millisecond = 250;
        assert_eq!(swp.default_file_name(), "swp.20010909014640.KOUN.250.0.5_PPI_v1");
        swp.sensor.radd.scan_mode = DoradeScanMode::Coplane;
        assert!(swp.default_file_name().ends_with("_UNK_v1"));
    }
}
