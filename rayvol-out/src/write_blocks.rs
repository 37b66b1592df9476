//! This submodule exists for converting DORADE blocks to bytes.
//!
//! Every block is emitted at its fixed length (or its computed length for CELV),
//! little endian, with the four byte tag and the four byte total length in front.
//! Reserved regions are NUL padded so each emitter produces exactly the block
//! length the format document gives.
use num::ToPrimitive;

use rayvol_core::bytestream::ByteSink;
use rayvol_core::dorade::{
    Asib, Celv, CellGeometry, Cfac, Comm, Csfd, Parm, Radd, Ryib, Sswb, Swib, Vold, BAD_I4,
};
use rayvol_core::errors::Error;

pub const COMM_LEN: usize = 508;
pub const SSWB_LEN: usize = 196;
pub const VOLD_LEN: usize = 72;
pub const RADD_LEN: usize = 300;
pub const PARM_LEN: usize = 216;
pub const CSFD_LEN: usize = 64;
pub const CFAC_LEN: usize = 72;
pub const SWIB_LEN: usize = 40;
pub const RYIB_LEN: usize = 44;
pub const ASIB_LEN: usize = 80;
pub const NULL_LEN: usize = 8;

/// Byte offset of the SSWB `sizeof_file` member from the start of the file, used to
/// patch the size in after everything is written.
pub const SIZEOF_FILE_OFFSET: u64 = COMM_LEN as u64 + 20;

/// This trait converts one DORADE block to its on-disk bytes.
pub trait DoradeBlockToBytes {
    fn as_block_bytes(&self) -> Result<Vec<u8>, Error>;
}

fn block(tag: &[u8; 4], len: usize) -> ByteSink {
    let mut sink = ByteSink::with_capacity(len);
    sink.put_bytes(tag);
    sink.put_i32(len as i32);
    sink
}

fn finish(mut sink: ByteSink, len: usize) -> Vec<u8> {
    sink.pad_to(len);
    sink.into_inner()
}

impl DoradeBlockToBytes for Comm {
    fn as_block_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut sink = block(b"COMM", COMM_LEN);
        sink.put_str_fixed(&self.comment, 500);
        Ok(finish(sink, COMM_LEN))
    }
}

impl DoradeBlockToBytes for Sswb {
    fn as_block_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut sink = block(b"SSWB", SSWB_LEN);
        sink.put_i32(self.last_used);
        sink.put_i32(self.i_start_time);
        sink.put_i32(self.i_stop_time);
        // The real size goes in after the whole file is written.
        sink.put_i32(BAD_I4);
        sink.put_i32(self.compression_flag);
        sink.put_i32(self.volume_time_stamp);
        sink.put_i32(self.num_parms);
        sink.put_str_fixed(&self.radar_name, 8);
        sink.put_f64(self.start_time);
        sink.put_f64(self.stop_time);
        sink.put_i32(self.version_num);
        sink.put_i32(0); // Number of key tables.
        sink.put_i32(self.status);
        Ok(finish(sink, SSWB_LEN))
    }
}

impl DoradeBlockToBytes for Vold {
    fn as_block_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut sink = block(b"VOLD", VOLD_LEN);
        sink.put_i16(self.format_version);
        sink.put_i16(self.volume_num);
        sink.put_i32(self.maximum_bytes);
        sink.put_str_fixed(&self.proj_name, 20);
        sink.put_i16(self.year);
        sink.put_i16(self.month);
        sink.put_i16(self.day);
        sink.put_i16(self.data_set_hour);
        sink.put_i16(self.data_set_minute);
        sink.put_i16(self.data_set_second);
        sink.put_str_fixed(&self.flight_number, 8);
        sink.put_str_fixed(&self.gen_facility, 8);
        sink.put_i16(self.gen_year);
        sink.put_i16(self.gen_month);
        sink.put_i16(self.gen_day);
        sink.put_i16(self.num_sensors);
        Ok(finish(sink, VOLD_LEN))
    }
}

impl DoradeBlockToBytes for Radd {
    fn as_block_bytes(&self) -> Result<Vec<u8>, Error> {
        let scan_mode = self.scan_mode.to_i16().unwrap_or(BAD_I4 as i16);
        let mut sink = block(b"RADD", RADD_LEN);
        sink.put_str_fixed(&self.radar_name, 8);
        sink.put_f32(self.radar_const);
        sink.put_f32(self.peak_power);
        sink.put_f32(self.noise_power);
        sink.put_f32(self.receiver_gain);
        sink.put_f32(self.antenna_gain);
        sink.put_f32(self.system_gain);
        sink.put_f32(self.horz_beam_width);
        sink.put_f32(self.vert_beam_width);
        sink.put_i16(self.radar_type);
        sink.put_i16(scan_mode);
        sink.put_f32(self.req_rotat_vel);
        sink.put_f32(self.scan_mode_pram0);
        sink.put_f32(self.scan_mode_pram1);
        sink.put_i16(self.num_parms);
        sink.put_i16(self.total_num_des);
        sink.put_i16(self.data_compress);
        sink.put_i16(self.data_reduction);
        sink.put_f32(self.data_red_parm0);
        sink.put_f32(self.data_red_parm1);
        sink.put_f32(self.radar_longitude);
        sink.put_f32(self.radar_latitude);
        sink.put_f32(self.radar_altitude);
        sink.put_f32(self.eff_unamb_vel);
        sink.put_f32(self.eff_unamb_range);
        sink.put_i16(self.num_freq_trans);
        sink.put_i16(self.num_ipps_trans);
        sink.put_f32(self.freq1);
        sink.put_f32(self.freq2);
        sink.put_f32(self.freq3);
        sink.put_f32(self.freq4);
        sink.put_f32(self.freq5);
        sink.put_f32(self.interpulse_per1);
        sink.put_f32(self.interpulse_per2);
        sink.put_f32(self.interpulse_per3);
        sink.put_f32(self.interpulse_per4);
        sink.put_f32(self.interpulse_per5);
        sink.put_i32(self.extension_num);
        sink.put_str_fixed(&self.config_name, 8);
        sink.put_i32(self.config_num);
        sink.put_f32(self.aperture_size);
        sink.put_f32(self.field_of_view);
        sink.put_f32(self.aperture_eff);
        for f in &self.freq {
            sink.put_f32(*f);
        }
        for p in &self.interpulse_per {
            sink.put_f32(*p);
        }
        sink.put_f32(self.pulse_width);
        sink.put_f32(self.primary_cop_baseln);
        sink.put_f32(self.secondary_cop_baseln);
        sink.put_f32(self.pc_xmtr_bandwidth);
        sink.put_i32(self.pc_waveform_type);
        sink.put_str_fixed(&self.site_name, 20);
        Ok(finish(sink, RADD_LEN))
    }
}

impl DoradeBlockToBytes for Parm {
    fn as_block_bytes(&self) -> Result<Vec<u8>, Error> {
        let format = self.binary_format.to_i16().unwrap_or(2);
        let mut sink = block(b"PARM", PARM_LEN);
        sink.put_str_fixed(&self.name, 8);
        sink.put_str_fixed(&self.description, 40);
        sink.put_str_fixed(&self.units, 8);
        sink.put_i16(self.interpulse_time);
        sink.put_i16(self.xmitted_freq);
        sink.put_f32(self.recvr_bandwidth);
        sink.put_i16(self.pulse_width);
        sink.put_i16(self.polarization);
        sink.put_i16(self.num_samples);
        sink.put_i16(format);
        sink.put_str_fixed(&self.threshold_field, 8);
        sink.put_f32(self.threshold_value);
        sink.put_f32(self.parameter_scale);
        sink.put_f32(self.parameter_bias);
        sink.put_i32(self.bad_data);
        sink.put_i32(self.extension_num);
        sink.put_str_fixed(&self.config_name, 8);
        sink.put_i32(self.config_num);
        sink.put_i32(self.offset_to_data);
        sink.put_f32(self.mks_conversion);
        sink.put_i32(self.num_qnames);
        sink.put_str_fixed(&self.qdata_names, 32);
        sink.put_i32(self.num_criteria);
        sink.put_str_fixed(&self.criteria_names, 32);
        sink.put_i32(self.num_cells);
        sink.put_f32(self.meters_to_first_cell);
        sink.put_f32(self.meters_between_cells);
        sink.put_f32(self.eff_unamb_vel);
        Ok(finish(sink, PARM_LEN))
    }
}

impl DoradeBlockToBytes for Celv {
    fn as_block_bytes(&self) -> Result<Vec<u8>, Error> {
        let len = 12 + 4 * self.dist_cells.len();
        let mut sink = block(b"CELV", len);
        sink.put_i32(self.dist_cells.len() as i32);
        for d in &self.dist_cells {
            sink.put_f32(*d);
        }
        Ok(finish(sink, len))
    }
}

impl DoradeBlockToBytes for Csfd {
    fn as_block_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut sink = block(b"CSFD", CSFD_LEN);
        sink.put_i32(self.num_segments);
        sink.put_f32(self.dist_to_first);
        for sp in &self.spacing {
            sink.put_f32(*sp);
        }
        for n in &self.num_cells {
            sink.put_i16(*n);
        }
        Ok(finish(sink, CSFD_LEN))
    }
}

impl DoradeBlockToBytes for CellGeometry {
    fn as_block_bytes(&self) -> Result<Vec<u8>, Error> {
        match self {
            CellGeometry::Celv(celv) => celv.as_block_bytes(),
            CellGeometry::Csfd(csfd) => csfd.as_block_bytes(),
        }
    }
}

impl DoradeBlockToBytes for Cfac {
    fn as_block_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut sink = block(b"CFAC", CFAC_LEN);
        sink.put_f32(self.azimuth_corr);
        sink.put_f32(self.elevation_corr);
        sink.put_f32(self.range_delay_corr);
        sink.put_f32(self.longitude_corr);
        sink.put_f32(self.latitude_corr);
        sink.put_f32(self.pressure_alt_corr);
        sink.put_f32(self.radar_alt_corr);
        sink.put_f32(self.ew_gndspd_corr);
        sink.put_f32(self.ns_gndspd_corr);
        sink.put_f32(self.vert_vel_corr);
        sink.put_f32(self.heading_corr);
        sink.put_f32(self.roll_corr);
        sink.put_f32(self.pitch_corr);
        sink.put_f32(self.drift_corr);
        sink.put_f32(self.rot_angle_corr);
        sink.put_f32(self.tilt_corr);
        Ok(finish(sink, CFAC_LEN))
    }
}

impl DoradeBlockToBytes for Swib {
    fn as_block_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut sink = block(b"SWIB", SWIB_LEN);
        sink.put_str_fixed(&self.radar_name, 8);
        sink.put_i32(self.sweep_num);
        sink.put_i32(self.num_rays);
        sink.put_f32(self.start_angle);
        sink.put_f32(self.stop_angle);
        sink.put_f32(self.fixed_angle);
        sink.put_i32(self.filter_flag);
        Ok(finish(sink, SWIB_LEN))
    }
}

impl DoradeBlockToBytes for Ryib {
    fn as_block_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut sink = block(b"RYIB", RYIB_LEN);
        sink.put_i32(self.sweep_num);
        sink.put_i32(self.julian_day);
        sink.put_i16(self.hour);
        sink.put_i16(self.minute);
        sink.put_i16(self.second);
        sink.put_i16(self.millisecond);
        sink.put_f32(self.azimuth);
        sink.put_f32(self.elevation);
        sink.put_f32(self.peak_power);
        sink.put_f32(self.true_scan_rate);
        sink.put_i32(self.ray_status);
        Ok(finish(sink, RYIB_LEN))
    }
}

impl DoradeBlockToBytes for Asib {
    fn as_block_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut sink = block(b"ASIB", ASIB_LEN);
        sink.put_f32(self.longitude);
        sink.put_f32(self.latitude);
        sink.put_f32(self.altitude_msl);
        sink.put_f32(self.altitude_agl);
        sink.put_f32(self.ew_velocity);
        sink.put_f32(self.ns_velocity);
        sink.put_f32(self.vert_velocity);
        sink.put_f32(self.heading);
        sink.put_f32(self.roll);
        sink.put_f32(self.pitch);
        sink.put_f32(self.drift_angle);
        sink.put_f32(self.rotation_angle);
        sink.put_f32(self.tilt);
        sink.put_f32(self.ew_horiz_wind);
        sink.put_f32(self.ns_horiz_wind);
        sink.put_f32(self.vert_wind);
        sink.put_f32(self.heading_change);
        sink.put_f32(self.pitch_change);
        Ok(finish(sink, ASIB_LEN))
    }
}

/// The eight byte `NULL` block that closes a sweep file.
pub fn null_block() -> Vec<u8> {
    finish(block(b"NULL", NULL_LEN), NULL_LEN)
}
