//! The in-memory model of a DORADE sweep file.
//!
//! Block layout follows the NCAR/EOL "DORADE Doppler Radar Exchange Format" document
//! (revised July 2010). Offsets in the doc comments are `(offset, width)` of the member
//! within its on-disk block, including the eight byte tag and length header. A sweep
//! holds one COMM, SSWB, VOLD, one sensor (RADD, the PARM list, one cell geometry
//! block and CFAC), one SWIB, then a ray header (RYIB and ASIB) per ray and one data
//! array per parameter.
use chrono::{DateTime, Datelike, Timelike, Utc};
use fnv::FnvHashMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::enums::{BinaryFormat, DoradeScanMode};
use crate::errors::Error;
use crate::tm::{cal_to_jul, jul_to_cal};
use crate::DORADE_MAX_PARMS;

/// Not applicable, missing, bad, or deleted.
pub const BAD_I2: i16 = -999;
pub const BAD_I4: i32 = -999;
pub const BAD_F: f32 = -999.0;
pub const BAD_D: f64 = -999.0;

/// Comment block - COMM. Block length 508 bytes.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Comm {
    /// (8,1) Comment text, at most 500 bytes.
    pub comment: String,
}

/// Super sweep identification block - SSWB. Block length 196 bytes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sswb {
    /// (8,4) Unix time of last access; 0 means the sweep should not be aged off.
    pub last_used: i32,
    /// (12,4) Start time, Unix seconds.
    pub i_start_time: i32,
    /// (16,4) Stop time, Unix seconds.
    pub i_stop_time: i32,
    /// (20,4) Size of the sweep file in bytes; patched after writing.
    pub sizeof_file: i32,
    /// (24,4) Nonzero when 32-bit float ray data is run length compressed.
    pub compression_flag: i32,
    /// (28,4) Reference to the current volume.
    pub volume_time_stamp: i32,
    /// (32,4) Number of parameters.
    pub num_parms: i32,
    /// (36,1) Radar name, 8 bytes.
    pub radar_name: String,
    /// (44,8) Start time, seconds with fraction.
    pub start_time: f64,
    /// (52,8) Stop time, seconds with fraction.
    pub stop_time: f64,
    /// (60,4) Version number.
    pub version_num: i32,
    /// (68,4) Status.
    pub status: i32,
}

impl Default for Sswb {
    fn default() -> Self {
        Sswb {
            last_used: BAD_I4,
            i_start_time: BAD_I4,
            i_stop_time: BAD_I4,
            sizeof_file: 0,
            compression_flag: BAD_I4,
            volume_time_stamp: BAD_I4,
            num_parms: BAD_I4,
            radar_name: String::new(),
            start_time: BAD_D,
            stop_time: BAD_D,
            version_num: BAD_I4,
            status: BAD_I4,
        }
    }
}

/// Volume description block - VOLD. Block length 72 bytes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vold {
    /// (8,2) Field format revision number.
    pub format_version: i16,
    /// (10,2) Volume number in current operations.
    pub volume_num: i16,
    /// (12,4) Maximum bytes in any physical record of this volume.
    pub maximum_bytes: i32,
    /// (16,1) Project name, 20 bytes.
    pub proj_name: String,
    /// (36,2) Year the data was taken.
    pub year: i16,
    /// (38,2) Month.
    pub month: i16,
    /// (40,2) Day.
    pub day: i16,
    /// (42,2) Hour.
    pub data_set_hour: i16,
    /// (44,2) Minute.
    pub data_set_minute: i16,
    /// (46,2) Second.
    pub data_set_second: i16,
    /// (48,1) Flight number, 8 bytes.
    pub flight_number: String,
    /// (56,1) Facility that generated this recording, 8 bytes.
    pub gen_facility: String,
    /// (64,2) Year this recording was generated.
    pub gen_year: i16,
    /// (66,2) Month.
    pub gen_month: i16,
    /// (68,2) Day.
    pub gen_day: i16,
    /// (70,2) Number of sensor descriptors that follow.
    pub num_sensors: i16,
}

impl Default for Vold {
    fn default() -> Self {
        Vold {
            format_version: BAD_I2,
            volume_num: BAD_I2,
            maximum_bytes: BAD_I4,
            proj_name: String::new(),
            year: BAD_I2,
            month: BAD_I2,
            day: BAD_I2,
            data_set_hour: BAD_I2,
            data_set_minute: BAD_I2,
            data_set_second: BAD_I2,
            flight_number: String::new(),
            gen_facility: String::new(),
            gen_year: BAD_I2,
            gen_month: BAD_I2,
            gen_day: BAD_I2,
            num_sensors: BAD_I2,
        }
    }
}

/// Radar description block - RADD. Block length 300 bytes.
///
/// The block stores 4 byte floats; the model widens nothing, so the fields are `f32`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Radd {
    /// (8,1) Radar name, 8 bytes.
    pub radar_name: String,
    /// (16,4) Radar constant.
    pub radar_const: f32,
    /// (20,4) Typical peak power in kW.
    pub peak_power: f32,
    /// (24,4) Typical noise power in dBm.
    pub noise_power: f32,
    /// (28,4) Receiver gain in dB.
    pub receiver_gain: f32,
    /// (32,4) Antenna gain in dB.
    pub antenna_gain: f32,
    /// (36,4) System gain in dB.
    pub system_gain: f32,
    /// (40,4) Horizontal beam width in degrees.
    pub horz_beam_width: f32,
    /// (44,4) Vertical beam width in degrees.
    pub vert_beam_width: f32,
    /// (48,2) Radar type: 0 ground, 1..4 airborne, 5 shipborne.
    pub radar_type: i16,
    /// (50,2) Scan mode.
    pub scan_mode: DoradeScanMode,
    /// (52,4) Requested rotational velocity of the antenna in degrees/sec.
    pub req_rotat_vel: f32,
    /// (56,4) Scan mode specific parameter 0.
    pub scan_mode_pram0: f32,
    /// (60,4) Scan mode specific parameter 1.
    pub scan_mode_pram1: f32,
    /// (64,2) Number of parameter descriptors for this radar.
    pub num_parms: i16,
    /// (66,2) Total number of descriptors for this radar.
    pub total_num_des: i16,
    /// (68,2) Data compression: 0 none, 1 HRD scheme.
    pub data_compress: i16,
    /// (70,2) Data reduction algorithm.
    pub data_reduction: i16,
    /// (72,4) Data reduction parameter 0.
    pub data_red_parm0: f32,
    /// (76,4) Data reduction parameter 1.
    pub data_red_parm1: f32,
    /// (80,4) Longitude of the radar in degrees.
    pub radar_longitude: f32,
    /// (84,4) Latitude of the radar in degrees.
    pub radar_latitude: f32,
    /// (88,4) Altitude of the radar above msl in km.
    pub radar_altitude: f32,
    /// (92,4) Effective unambiguous velocity in m/s.
    pub eff_unamb_vel: f32,
    /// (96,4) Effective unambiguous range in km.
    pub eff_unamb_range: f32,
    /// (100,2) Number of frequencies transmitted.
    pub num_freq_trans: i16,
    /// (102,2) Number of different interpulse periods transmitted.
    pub num_ipps_trans: i16,
    /// (104,4) Frequency 1.
    pub freq1: f32,
    /// (108,4) Frequency 2.
    pub freq2: f32,
    /// (112,4) Frequency 3.
    pub freq3: f32,
    /// (116,4) Frequency 4.
    pub freq4: f32,
    /// (120,4) Frequency 5.
    pub freq5: f32,
    /// (124,4) Interpulse period 1.
    pub interpulse_per1: f32,
    /// (128,4) Interpulse period 2.
    pub interpulse_per2: f32,
    /// (132,4) Interpulse period 3.
    pub interpulse_per3: f32,
    /// (136,4) Interpulse period 4.
    pub interpulse_per4: f32,
    /// (140,4) Interpulse period 5.
    pub interpulse_per5: f32,
    /// (144,4) 1995 extension number.
    pub extension_num: i32,
    /// (148,1) Configuration name, 8 bytes.
    pub config_name: String,
    /// (156,4) Configuration number.
    pub config_num: i32,
    /// (160,4) Lidar aperture diameter in cm.
    pub aperture_size: f32,
    /// (164,4) Field of view of the receiver.
    pub field_of_view: f32,
    /// (168,4) Aperture efficiency in percent.
    pub aperture_eff: f32,
    /// (172,4 each) Space for 11 more frequencies.
    pub freq: [f32; 11],
    /// (216,4 each) Space for 11 more interpulse periods.
    pub interpulse_per: [f32; 11],
    /// (260,4) Typical pulse width in microseconds.
    pub pulse_width: f32,
    /// (264,4) Primary coplane baseline.
    pub primary_cop_baseln: f32,
    /// (268,4) Secondary coplane baseline.
    pub secondary_cop_baseln: f32,
    /// (272,4) Pulse compression transmitter bandwidth.
    pub pc_xmtr_bandwidth: f32,
    /// (276,4) Pulse compression waveform type.
    pub pc_waveform_type: i32,
    /// (280,1) Site name, 20 bytes.
    pub site_name: String,
}

impl Default for Radd {
    fn default() -> Self {
        Radd {
            radar_name: String::new(),
            radar_const: BAD_F,
            peak_power: BAD_F,
            noise_power: BAD_F,
            receiver_gain: BAD_F,
            antenna_gain: BAD_F,
            system_gain: BAD_F,
            horz_beam_width: BAD_F,
            vert_beam_width: BAD_F,
            radar_type: BAD_I2,
            scan_mode: DoradeScanMode::Invalid,
            req_rotat_vel: BAD_F,
            scan_mode_pram0: BAD_F,
            scan_mode_pram1: BAD_F,
            num_parms: BAD_I2,
            total_num_des: BAD_I2,
            data_compress: BAD_I2,
            data_reduction: BAD_I2,
            data_red_parm0: BAD_F,
            data_red_parm1: BAD_F,
            radar_longitude: BAD_F,
            radar_latitude: BAD_F,
            radar_altitude: BAD_F,
            eff_unamb_vel: BAD_F,
            eff_unamb_range: BAD_F,
            num_freq_trans: BAD_I2,
            num_ipps_trans: BAD_I2,
            freq1: BAD_F,
            freq2: BAD_F,
            freq3: BAD_F,
            freq4: BAD_F,
            freq5: BAD_F,
            interpulse_per1: BAD_F,
            interpulse_per2: BAD_F,
            interpulse_per3: BAD_F,
            interpulse_per4: BAD_F,
            interpulse_per5: BAD_F,
            extension_num: BAD_I4,
            config_name: String::new(),
            config_num: BAD_I4,
            aperture_size: BAD_F,
            field_of_view: BAD_F,
            aperture_eff: BAD_F,
            freq: [BAD_F; 11],
            interpulse_per: [BAD_F; 11],
            pulse_width: BAD_F,
            primary_cop_baseln: BAD_F,
            secondary_cop_baseln: BAD_F,
            pc_xmtr_bandwidth: BAD_F,
            pc_waveform_type: BAD_I4,
            site_name: String::new(),
        }
    }
}

/// Parameter (data field) description - PARM. Block length 216 bytes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Parm {
    /// (8,1) Name of the parameter being described, 8 bytes.
    pub name: String,
    /// (16,1) Detailed description, 40 bytes.
    pub description: String,
    /// (56,1) Units the parameter is written in, 8 bytes.
    pub units: String,
    /// (64,2) Interpulse periods used.
    pub interpulse_time: i16,
    /// (66,2) Frequencies used for this parameter.
    pub xmitted_freq: i16,
    /// (68,4) Effective receiver bandwidth in MHz.
    pub recvr_bandwidth: f32,
    /// (72,2) Effective pulse width in meters.
    pub pulse_width: i16,
    /// (74,2) Polarization: 0 horizontal, 1 vertical, 2 circular, 3 elliptical.
    pub polarization: i16,
    /// (76,2) Number of samples used in the estimate.
    pub num_samples: i16,
    /// (78,2) Binary format of the radar data.
    pub binary_format: BinaryFormat,
    /// (80,1) Name of the thresholding parameter, `NONE` if unthresholded, 8 bytes.
    pub threshold_field: String,
    /// (88,4) Threshold value.
    pub threshold_value: f32,
    /// (92,4) Scale factor.
    pub parameter_scale: f32,
    /// (96,4) Bias factor.
    pub parameter_bias: f32,
    /// (100,4) Bad data flag.
    pub bad_data: i32,
    /// (104,4) 1995 extension number.
    pub extension_num: i32,
    /// (108,1) Configuration name, 8 bytes.
    pub config_name: String,
    /// (116,4) Configuration number.
    pub config_num: i32,
    /// (120,4) Offset to the first datum within the data block.
    pub offset_to_data: i32,
    /// (124,4) MKS conversion factor.
    pub mks_conversion: f32,
    /// (128,4) Number of qnames.
    pub num_qnames: i32,
    /// (132,1) Four 8 byte qdata names, blank filled.
    pub qdata_names: String,
    /// (164,4) Number of criteria.
    pub num_criteria: i32,
    /// (168,1) Four 8 byte criteria names, blank filled.
    pub criteria_names: String,
    /// (200,4) Number of cells.
    pub num_cells: i32,
    /// (204,4) Distance to the center of the first cell in meters.
    pub meters_to_first_cell: f32,
    /// (208,4) Distance between cell centers in meters.
    pub meters_between_cells: f32,
    /// (212,4) Effective unambiguous velocity in m/s.
    pub eff_unamb_vel: f32,
}

impl Default for Parm {
    fn default() -> Self {
        Parm {
            name: String::new(),
            description: String::new(),
            units: String::new(),
            interpulse_time: BAD_I2,
            xmitted_freq: BAD_I2,
            recvr_bandwidth: BAD_F,
            pulse_width: BAD_I2,
            polarization: BAD_I2,
            num_samples: BAD_I2,
            binary_format: BinaryFormat::Int16,
            threshold_field: String::new(),
            threshold_value: BAD_F,
            parameter_scale: 1.0,
            parameter_bias: 0.0,
            bad_data: i16::MIN as i32,
            extension_num: BAD_I4,
            config_name: String::new(),
            config_num: BAD_I4,
            offset_to_data: 0,
            mks_conversion: BAD_F,
            num_qnames: 0,
            qdata_names: String::new(),
            num_criteria: 0,
            criteria_names: String::new(),
            num_cells: BAD_I4,
            meters_to_first_cell: BAD_F,
            meters_between_cells: BAD_F,
            eff_unamb_vel: BAD_F,
        }
    }
}

/// Cell range vector block - CELV. Block length `12 + 4 * num_cells` bytes.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Celv {
    /// (12,4 each) Distance from the radar to each cell in meters.
    pub dist_cells: Vec<f32>,
}

/// Cell spacing table block - CSFD. Block length 64 bytes.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Csfd {
    /// (8,4) Number of segments that contain cells of equal width.
    pub num_segments: i32,
    /// (12,4) Distance to the first gate in meters.
    pub dist_to_first: f32,
    /// (16,4 each) Width of the cells in each segment in meters.
    pub spacing: [f32; 8],
    /// (48,2 each) Number of cells in each segment.
    pub num_cells: [i16; 8],
}

/// A sweep carries its cell geometry either as a range vector or a spacing table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CellGeometry {
    Celv(Celv),
    Csfd(Csfd),
}

impl CellGeometry {
    /// Total number of cells.
    pub fn num_cells(&self) -> usize {
        match self {
            CellGeometry::Celv(celv) => celv.dist_cells.len(),
            CellGeometry::Csfd(csfd) => {
                let n = csfd.num_segments.clamp(0, 8) as usize;
                csfd.num_cells[..n].iter().map(|&c| c.max(0) as usize).sum()
            }
        }
    }

    /// Distance from the radar to every cell, in meters.
    pub fn cell_ranges(&self) -> Vec<f32> {
        match self {
            CellGeometry::Celv(celv) => celv.dist_cells.clone(),
            CellGeometry::Csfd(csfd) => {
                let nseg = csfd.num_segments.clamp(0, 8) as usize;
                let mut rng = Vec::with_capacity(self.num_cells());
                let mut d = csfd.dist_to_first;
                for s in 0..nseg {
                    for _ in 0..csfd.num_cells[s].max(0) {
                        rng.push(d);
                        d += csfd.spacing[s];
                    }
                }
                rng
            }
        }
    }
}

/// Correction factor block - CFAC. Block length 72 bytes.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cfac {
    /// (8,4) Correction added to azimuth, degrees.
    pub azimuth_corr: f32,
    /// (12,4) Correction added to elevation, degrees.
    pub elevation_corr: f32,
    /// (16,4) Correction used for range delay, meters.
    pub range_delay_corr: f32,
    /// (20,4) Correction added to radar longitude.
    pub longitude_corr: f32,
    /// (24,4) Correction added to radar latitude.
    pub latitude_corr: f32,
    /// (28,4) Correction added to pressure altitude, km.
    pub pressure_alt_corr: f32,
    /// (32,4) Correction added to radar altitude above ground, km.
    pub radar_alt_corr: f32,
    /// (36,4) Correction added to platform ground speed east-west, m/s.
    pub ew_gndspd_corr: f32,
    /// (40,4) Correction added to platform ground speed north-south, m/s.
    pub ns_gndspd_corr: f32,
    /// (44,4) Correction added to platform vertical velocity, m/s.
    pub vert_vel_corr: f32,
    /// (48,4) Correction added to platform heading, degrees.
    pub heading_corr: f32,
    /// (52,4) Correction added to platform roll, degrees.
    pub roll_corr: f32,
    /// (56,4) Correction added to platform pitch, degrees.
    pub pitch_corr: f32,
    /// (60,4) Correction added to platform drift, degrees.
    pub drift_corr: f32,
    /// (64,4) Correction added to rotation angle, degrees.
    pub rot_angle_corr: f32,
    /// (68,4) Correction added to tilt angle, degrees.
    pub tilt_corr: f32,
}

/// Sweep information block - SWIB. Block length 40 bytes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Swib {
    /// (8,1) Radar name, 8 bytes.
    pub radar_name: String,
    /// (16,4) Sweep number from the beginning of the volume.
    pub sweep_num: i32,
    /// (20,4) Number of rays recorded in this sweep.
    pub num_rays: i32,
    /// (24,4) True start angle, degrees.
    pub start_angle: f32,
    /// (28,4) True stop angle, degrees.
    pub stop_angle: f32,
    /// (32,4) Fixed angle, degrees.
    pub fixed_angle: f32,
    /// (36,4) Filter flag.
    pub filter_flag: i32,
}

impl Default for Swib {
    fn default() -> Self {
        Swib {
            radar_name: String::new(),
            sweep_num: BAD_I4,
            num_rays: BAD_I4,
            start_angle: BAD_F,
            stop_angle: BAD_F,
            fixed_angle: BAD_F,
            filter_flag: BAD_I4,
        }
    }
}

/// Platform georeference block - ASIB. Block length 80 bytes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Asib {
    /// (8,4) Antenna longitude, degrees, east positive.
    pub longitude: f32,
    /// (12,4) Antenna latitude, degrees, north positive.
    pub latitude: f32,
    /// (16,4) Antenna altitude above mean sea level, km.
    pub altitude_msl: f32,
    /// (20,4) Antenna altitude above ground level, km.
    pub altitude_agl: f32,
    /// (24,4) Antenna east-west ground speed, m/s.
    pub ew_velocity: f32,
    /// (28,4) Antenna north-south ground speed, m/s.
    pub ns_velocity: f32,
    /// (32,4) Antenna vertical velocity, m/s.
    pub vert_velocity: f32,
    /// (36,4) Antenna heading, degrees clockwise from true north.
    pub heading: f32,
    /// (40,4) Roll angle, degrees.
    pub roll: f32,
    /// (44,4) Pitch angle, degrees.
    pub pitch: f32,
    /// (48,4) Drift angle, degrees.
    pub drift_angle: f32,
    /// (52,4) Rotation angle of the beam with respect to the airframe, degrees.
    pub rotation_angle: f32,
    /// (56,4) Tilt of the beam relative to the fuselage normal, degrees.
    pub tilt: f32,
    /// (60,4) East-west wind at the platform, m/s.
    pub ew_horiz_wind: f32,
    /// (64,4) North-south wind at the platform, m/s.
    pub ns_horiz_wind: f32,
    /// (68,4) Vertical wind at the platform, m/s.
    pub vert_wind: f32,
    /// (72,4) Heading change rate, degrees/second.
    pub heading_change: f32,
    /// (76,4) Pitch change rate, degrees/second.
    pub pitch_change: f32,
}

impl Default for Asib {
    fn default() -> Self {
        Asib {
            longitude: BAD_F,
            latitude: BAD_F,
            altitude_msl: BAD_F,
            altitude_agl: BAD_F,
            ew_velocity: BAD_F,
            ns_velocity: BAD_F,
            vert_velocity: BAD_F,
            heading: BAD_F,
            roll: BAD_F,
            pitch: BAD_F,
            drift_angle: BAD_F,
            rotation_angle: BAD_F,
            tilt: BAD_F,
            ew_horiz_wind: BAD_F,
            ns_horiz_wind: BAD_F,
            vert_wind: BAD_F,
            heading_change: BAD_F,
            pitch_change: BAD_F,
        }
    }
}

/// Ray information block - RYIB. Block length 44 bytes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ryib {
    /// (8,4) Sweep number for this radar.
    pub sweep_num: i32,
    /// (12,4) Day of year of the ray, origin 1.
    pub julian_day: i32,
    /// (16,2) Hour.
    pub hour: i16,
    /// (18,2) Minute.
    pub minute: i16,
    /// (20,2) Second.
    pub second: i16,
    /// (22,2) Millisecond.
    pub millisecond: i16,
    /// (24,4) Azimuth, degrees.
    pub azimuth: f32,
    /// (28,4) Elevation, degrees.
    pub elevation: f32,
    /// (32,4) Last measured peak transmitted power, kW.
    pub peak_power: f32,
    /// (36,4) Actual scan rate, degrees/second.
    pub true_scan_rate: f32,
    /// (40,4) Ray status: 0 normal, 1 transition, 2 bad.
    pub ray_status: i32,
}

impl Default for Ryib {
    fn default() -> Self {
        Ryib {
            sweep_num: BAD_I4,
            julian_day: BAD_I4,
            hour: BAD_I2,
            minute: BAD_I2,
            second: BAD_I2,
            millisecond: BAD_I2,
            azimuth: BAD_F,
            elevation: BAD_F,
            peak_power: BAD_F,
            true_scan_rate: BAD_F,
            ray_status: 2,
        }
    }
}

/// Headers and platform info for one ray. Not the data.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RayHdr {
    pub ryib: Ryib,
    pub asib: Asib,
}

/// The sensor descriptor: RADD, the ordered parameter list, the cell geometry,
/// and CFAC.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sensor {
    pub radd: Radd,
    /// Parameters in the order their PARM blocks appeared.
    pub parms: Vec<Parm>,
    pub cell_geometry: Option<CellGeometry>,
    pub cfac: Cfac,
}

/// Contents of one DORADE sweep file.
///
/// Parameter order matters: data blocks on disk cycle through the parameters in the
/// order their PARM blocks appeared, so `parms` preserves insertion order and the
/// name index only accelerates lookup.
#[derive(Debug, Clone, Default)]
pub struct DoradeSweep {
    /// The file that provided the sweep, if it came from one.
    pub source_file: Option<String>,
    pub comm: Comm,
    pub sswb: Sswb,
    pub vold: Vold,
    /// The single sensor of the sweep.
    pub sensor: Sensor,
    pub swib: Swib,
    /// One header per ray, dimensioned `swib.num_rays`.
    pub ray_hdrs: Vec<RayHdr>,
    /// True when the sweep has been modified in memory since reading.
    pub modified: bool,
    data: Vec<Vec<f32>>,
    index: FnvHashMap<String, usize>,
}

impl DoradeSweep {
    pub fn new() -> Self {
        DoradeSweep::default()
    }

    /// Total number of cells per ray, from whichever cell geometry block the sweep
    /// carries.
    pub fn num_cells(&self) -> Option<usize> {
        self.sensor.cell_geometry.as_ref().map(|g| g.num_cells())
    }

    /// Distance from the radar to every cell, meters.
    pub fn cell_ranges(&self) -> Vec<f32> {
        self.sensor
            .cell_geometry
            .as_ref()
            .map(|g| g.cell_ranges())
            .unwrap_or_default()
    }

    pub fn num_parms(&self) -> usize {
        self.sensor.parms.len()
    }

    /// Index of a parameter by name.
    pub fn parm_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn parm(&self, name: &str) -> Option<&Parm> {
        self.parm_index(name).map(|p| &self.sensor.parms[p])
    }

    /// Append a parameter, keeping insertion order. The data array starts empty.
    pub fn add_parm(&mut self, parm: Parm) -> Result<usize, Error> {
        if self.sensor.parms.len() >= DORADE_MAX_PARMS {
            return Err(Error::TooManyParms { max: DORADE_MAX_PARMS });
        }
        if self.index.contains_key(&parm.name) {
            return Err(Error::FieldExists { abbrv: parm.name.clone() });
        }
        let p = self.sensor.parms.len();
        self.index.insert(parm.name.clone(), p);
        self.sensor.parms.push(parm);
        self.data.push(Vec::new());
        Ok(p)
    }

    /// Allocate the `[ray][cell]` data array of parameter `p`, filled with NaN.
    pub fn alloc_parm_data(&mut self, p: usize, num_rays: usize, num_cells: usize) {
        if let Some(dat) = self.data.get_mut(p) {
            dat.clear();
            dat.resize(num_rays * num_cells, f32::NAN);
        }
    }

    /// The flat `[ray][cell]` data of parameter `p`.
    pub fn data(&self, p: usize) -> Option<&[f32]> {
        self.data.get(p).map(|v| v.as_slice())
    }

    pub fn data_mut(&mut self, p: usize) -> Option<&mut Vec<f32>> {
        self.data.get_mut(p)
    }

    /// The data of the named parameter.
    pub fn parm_data(&self, name: &str) -> Option<&[f32]> {
        self.parm_index(name).and_then(|p| self.data(p))
    }

    /// Copy parameter `src` into a new parameter named `dst`.
    pub fn copy_parm(&mut self, src: &str, dst: &str, description: &str) -> Result<usize, Error> {
        let ps = self
            .parm_index(src)
            .ok_or_else(|| Error::FieldNotFound { abbrv: src.to_string() })?;
        let mut parm = self.sensor.parms[ps].clone();
        parm.name = dst.to_string();
        parm.description = description.to_string();
        let dat = self.data[ps].clone();
        let pd = self.add_parm(parm)?;
        self.data[pd] = dat;
        self.sswb.num_parms = self.sensor.parms.len() as i32;
        self.sensor.radd.num_parms = self.sensor.parms.len() as i16;
        self.modified = true;
        Ok(pd)
    }

    /// Add `d_az` degrees to every azimuth in the sweep. For RHI sweeps the fixed
    /// angle moves too.
    pub fn shift_az(&mut self, d_az: f32) {
        self.swib.start_angle = wrap_deg(self.swib.start_angle + d_az);
        self.swib.stop_angle = wrap_deg(self.swib.stop_angle + d_az);
        for hdr in &mut self.ray_hdrs {
            hdr.ryib.azimuth = wrap_deg(hdr.ryib.azimuth + d_az);
        }
        if self.sensor.radd.scan_mode == DoradeScanMode::Rhi {
            self.swib.fixed_angle = wrap_deg(self.swib.fixed_angle + d_az);
        }
        self.modified = true;
    }

    /// Add `d_el` degrees to every elevation in the sweep. For PPI sweeps the fixed
    /// angle moves too.
    pub fn shift_el(&mut self, d_el: f32) {
        self.swib.start_angle = wrap_deg(self.swib.start_angle + d_el);
        self.swib.stop_angle = wrap_deg(self.swib.stop_angle + d_el);
        for hdr in &mut self.ray_hdrs {
            hdr.ryib.elevation = wrap_deg(hdr.ryib.elevation + d_el);
        }
        if self.sensor.radd.scan_mode == DoradeScanMode::Ppi {
            self.swib.fixed_angle = wrap_deg(self.swib.fixed_angle + d_el);
        }
        self.modified = true;
    }

    /// Add `dt` seconds to every time member of the sweep.
    pub fn incr_time(&mut self, dt: f64) -> Result<(), Error> {
        let dt_i = dt.round() as i32;
        self.sswb.i_start_time += dt_i;
        self.sswb.i_stop_time += dt_i;
        self.sswb.volume_time_stamp += dt_i;
        self.sswb.start_time += dt;
        self.sswb.stop_time += dt;

        let jday = cal_to_jul(
            self.vold.year as i32,
            self.vold.month.max(1) as u32,
            self.vold.day.max(1) as u32,
            self.vold.data_set_hour.max(0) as u32,
            self.vold.data_set_minute.max(0) as u32,
            self.vold.data_set_second.max(0) as f64,
        )?;
        let j0 = cal_to_jul(self.vold.year as i32, 1, 1, 0, 0, 0.0)?;
        let (year, month, day, hour, minute, second) = jul_to_cal(jday + dt / 86400.0)?;
        self.vold.year = year as i16;
        self.vold.month = month as i16;
        self.vold.day = day as i16;
        self.vold.data_set_hour = hour as i16;
        self.vold.data_set_minute = minute as i16;
        self.vold.data_set_second = second as i16;

        for hdr in &mut self.ray_hdrs {
            let ryib = &mut hdr.ryib;
            let jday = j0
                + (ryib.julian_day - 1) as f64
                + ryib.hour as f64 / 24.0
                + ryib.minute as f64 / 1440.0
                + ryib.second as f64 / 86400.0
                + ryib.millisecond as f64 / 86_400_000.0
                + dt / 86400.0;
            let (ray_year, _, _, hour, minute, second) = jul_to_cal(jday)?;
            let ray_j0 = cal_to_jul(ray_year, 1, 1, 0, 0, 0.0)?;
            ryib.julian_day = (jday - ray_j0).floor() as i32 + 1;
            ryib.hour = hour as i16;
            ryib.minute = minute as i16;
            ryib.second = second.floor() as i16;
            ryib.millisecond = ((second - second.floor()) * 1000.0).round() as i16;
        }
        self.modified = true;
        Ok(())
    }

    /// The default sweep file name,
    /// `swp.YYYYMMDDhhmmss.RADAR.msec.FIXED-ANGLE_MODE_v1`.
    pub fn default_file_name(&self) -> String {
        let when: DateTime<Utc> = DateTime::from_timestamp(self.sswb.i_start_time as i64, 0)
            .unwrap_or_else(|| DateTime::from_timestamp(0, 0).unwrap());
        let msec = self
            .ray_hdrs
            .first()
            .map(|h| h.ryib.millisecond.max(0))
            .unwrap_or(0);
        let mode = match self.sensor.radd.scan_mode {
            DoradeScanMode::Ppi => "PPI",
            DoradeScanMode::Rhi => "RHI",
            _ => "UNK",
        };
        format!(
            "swp.{:04}{:02}{:02}{:02}{:02}{:02}.{:.8}.{}.{:.1}_{}_v1",
            when.year(),
            when.month(),
            when.day(),
            when.hour(),
            when.minute(),
            when.second(),
            if self.sensor.radd.radar_name.is_empty() {
                "UNKNOWN"
            } else {
                self.sensor.radd.radar_name.as_str()
            },
            msec,
            self.swib.fixed_angle,
            mode,
        )
    }

    /// Day of year for a julian day within `year`, origin 1.
    pub fn day_of_year(year: i32, julday: f64) -> Result<i32, Error> {
        let j0 = cal_to_jul(year, 1, 1, 0, 0, 0.0)?;
        Ok((julday - j0).floor() as i32 + 1)
    }
}

/// Wrap a degree angle into [-180, 180).
fn wrap_deg(deg: f32) -> f32 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(feature = "to_json")]
impl Sswb {
    /// Dump the block as JSON.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(&self).map_err(Error::SerdeError)
    }
}

#[cfg(feature = "to_json")]
impl Radd {
    /// Dump the block as JSON.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(&self).map_err(Error::SerdeError)
    }
}

#[cfg(feature = "to_json")]
impl Swib {
    /// Dump the block as JSON.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(&self).map_err(Error::SerdeError)
    }
}
