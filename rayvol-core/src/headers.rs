//! This file contains the definitions for the header structures of a Sigmet raw product
//! file. These can then be used for better interpreting the file in the parser.
//!
//! Field layout and units follow the IRIS Programmer's Manual. Offsets in the doc
//! comments are relative to the start of the containing substructure. Character fields
//! are stored trimmed of their fixed-width padding; angles from the file are kept as
//! unsigned integer binary angles, exactly as stored (nothing is converted on input).
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::enums::{MultiPrfMode, ScanMode};

/// Time as represented in various Sigmet raw headers.
#[derive(Debug, Clone, PartialEq, Default)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct YmdsTime {
    /// Seconds since midnight.
    pub sec: i32,
    /// Milliseconds, low 10 bits of the stored word.
    pub msec: u32,
    /// If true, time is UTC.
    pub utc: bool,
    pub year: i32,
    pub month: i32,
    pub day: i32,
}

/// The 12 byte structure header that opens every top level substructure.
#[derive(Debug, Clone, PartialEq, Default)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StructureHeader {
    /// Bytes 0..2. Structure identifier; 27 marks a product header record.
    pub id: i16,
    /// Bytes 2..4. Format version number.
    pub format: i16,
    /// Bytes 4..8. Number of bytes in the entire structure.
    pub sz: i32,
    /// Bytes 10..12. Flags; bit 0 means the structure is complete.
    pub flags: i16,
}

/// Product specific info for raw products. See IRIS Programmer's Manual 3.2.26.
#[derive(Debug, Clone, PartialEq, Default)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProductSpecificInfo {
    /// Bytes 0..4. Data type mask word 0.
    pub data_type_mask: u32,
    /// Bytes 4..8. Range of last bin in cm.
    pub rng_last_bin: i32,
    /// Bytes 8..12. Format conversion flag.
    pub format_conv_flag: u32,
    /// Bytes 12..16. Flag word.
    pub flag: u32,
    /// Bytes 16..20. Sweep number if product files are separated by sweep, origin 1.
    pub sweep_num: i32,
    /// Bytes 20..24. Extended header type.
    pub xhdr_type: u32,
    /// Bytes 24..28. Data type mask word 1.
    pub data_type_mask1: u32,
    /// Bytes 28..32. Data type mask word 2.
    pub data_type_mask2: u32,
    /// Bytes 32..36. Data type mask word 3.
    pub data_type_mask3: u32,
    /// Bytes 36..40. Data type mask word 4.
    pub data_type_mask4: u32,
    /// Bytes 40..44. Playback version, low 16 bits.
    pub playback_vsn: u32,
}

/// Color scale definition carried in the product configuration.
#[derive(Debug, Clone, PartialEq, Default)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColorScaleDef {
    /// Bytes 0..4. Flag word.
    pub flags: u32,
    /// Bytes 4..8. Starting level.
    pub istart: i32,
    /// Bytes 8..12. Level step.
    pub istep: i32,
    /// Bytes 12..14. Number of colors in scale.
    pub icolcnt: i16,
    /// Bytes 14..16. Color set number in low byte, color scale number in high byte.
    pub iset_and_scale: u16,
    /// Bytes 16..48. Variable level starting values.
    pub ilevel_seams: [u16; 16],
}

/// The product configuration substructure of record 1, 320 bytes.
#[derive(Debug, Clone, PartialEq, Default)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProductConfiguration {
    /// Bytes 0..12. Structure header, id 24.
    pub sh: StructureHeader,
    /// Bytes 12..14. Product type code; 15 is a raw product.
    pub type_code: u16,
    /// Bytes 14..16. Scheduling code.
    pub schedule: u16,
    /// Bytes 16..20. Seconds to skip between runs.
    pub skip: i32,
    /// Bytes 20..32. Time the product was generated (UTC).
    pub gen_tm: YmdsTime,
    /// Bytes 32..44. Time of the input ingest sweep.
    pub ingest_sweep_tm: YmdsTime,
    /// Bytes 44..56. Time of the input ingest file.
    pub ingest_file_tm: YmdsTime,
    /// Bytes 62..74. Name of the product configuration file.
    pub config_file: String,
    /// Bytes 74..86. Name of the task used to generate the data.
    pub task_name: String,
    /// Bytes 86..88. Flag word.
    pub flag: u16,
    /// Bytes 88..92. X scale in cm/pixel.
    pub x_scale: i32,
    /// Bytes 92..96. Y scale in cm/pixel.
    pub y_scale: i32,
    /// Bytes 96..100. Z scale in cm/pixel.
    pub z_scale: i32,
    /// Bytes 100..104. X direction size of the data array.
    pub x_size: i32,
    /// Bytes 104..108. Y direction size of the data array.
    pub y_size: i32,
    /// Bytes 108..112. Z direction size of the data array.
    pub z_size: i32,
    /// Bytes 112..116. X location of the radar in the data array, signed 1/1000 of pixels.
    pub x_loc: i32,
    /// Bytes 116..120. Y location of the radar in the data array.
    pub y_loc: i32,
    /// Bytes 120..124. Z location of the radar in the data array.
    pub z_loc: i32,
    /// Bytes 124..128. Maximum range in cm.
    pub max_rng: i32,
    /// Bytes 130..132. Data type generated.
    pub data_type: u16,
    /// Bytes 132..144. Name of the projection used.
    pub proj: String,
    /// Bytes 144..146. Data type used as input.
    pub inp_data_type: u16,
    /// Byte 146. Projection type: 0 = centered azimuthal, 1 = Mercator.
    pub proj_type: u8,
    /// Bytes 148..150. Radial smoother in 1/100 of km.
    pub rad_smoother: i16,
    /// Bytes 150..152. Number of times this product configuration has run.
    pub num_runs: i16,
    /// Bytes 152..156. Z/R relationship constant in 1/1000.
    pub zr_const: i32,
    /// Bytes 156..160. Z/R relationship exponent in 1/1000.
    pub zr_exp: i32,
    /// Bytes 160..162. X-direction smoother in 1/100 of km.
    pub x_smooth: i16,
    /// Bytes 162..164. Y-direction smoother in 1/100 of km.
    pub y_smooth: i16,
    /// Bytes 164..244. Product specific info.
    pub psi: ProductSpecificInfo,
    /// Bytes 244..260. List of minor task suffixes.
    pub suffixes: String,
    /// Bytes 272..320. Color scale definition.
    pub csd: ColorScaleDef,
}

/// The product end substructure of record 1, 308 bytes.
#[derive(Debug, Clone, PartialEq, Default)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProductEnd {
    /// Bytes 0..16. Site name where the product was made, space padded.
    pub site_name_prod: String,
    /// Bytes 16..24. IRIS version where the product was made.
    pub iris_prod_vsn: String,
    /// Bytes 24..32. IRIS version the ingest data came from.
    pub iris_ing_vsn: String,
    /// Bytes 72..74. Minutes local standard time is west of GMT.
    pub local_wgmt: i16,
    /// Bytes 74..90. Hardware name the ingest data came from.
    pub hw_name: String,
    /// Bytes 90..106. Site name the ingest data came from.
    pub site_name_ing: String,
    /// Bytes 106..108. Minutes recorded standard time is west of GMT.
    pub rec_wgmt: i16,
    /// Bytes 108..112. Latitude of center, binary angle.
    pub center_latitude: u32,
    /// Bytes 112..116. Longitude of center, binary angle.
    pub center_longitude: u32,
    /// Bytes 116..118. Signed ground height in meters relative to sea level.
    pub ground_elev: i16,
    /// Bytes 118..120. Height of the radar above the ground in meters.
    pub radar_ht: i16,
    /// Bytes 120..124. PRF in hertz.
    pub prf: i32,
    /// Bytes 124..128. Pulse width in 1/100 of microseconds.
    pub pulse_w: i32,
    /// Bytes 128..130. Type of signal processor used.
    pub proc_type: u16,
    /// Bytes 130..132. Trigger rate scheme.
    pub trigger_rate_scheme: u16,
    /// Bytes 132..134. Number of samples used.
    pub num_samples: i16,
    /// Bytes 134..146. Clutter filter file name.
    pub clutter_filter: String,
    /// Bytes 146..148. Number of linear based filter for the first bin.
    pub lin_filter: u16,
    /// Bytes 148..152. Wavelength in 1/100 of centimeters.
    pub wave_len: i32,
    /// Bytes 152..156. Truncation height in cm above the radar.
    pub trunc_ht: i32,
    /// Bytes 156..160. Range of the first bin in cm.
    pub rng_bin0: i32,
    /// Bytes 160..164. Range of the last bin in cm.
    pub rng_last_bin: i32,
    /// Bytes 164..168. Number of output bins.
    pub num_bins_out: i32,
    /// Bytes 168..170. Flag word.
    pub flag: u16,
    /// Bytes 172..174. Type of polarization used.
    pub polarization: u16,
    /// Bytes 174..176. I0 cal value, horizontal pol, in 1/100 dBm.
    pub hpol_io_cal: i16,
    /// Bytes 176..178. Noise at calibration, horizontal pol, in 1/100 dBm.
    pub hpol_cal_noise: i16,
    /// Bytes 178..180. Radar constant, horizontal pol, in 1/100 dB.
    pub hpol_radar_const: i16,
    /// Bytes 180..182. Receiver bandwidth in kHz.
    pub recv_bandw: u16,
    /// Bytes 182..184. Current noise level, horizontal pol, in 1/100 dBm.
    pub hpol_noise: i16,
    /// Bytes 184..186. Current noise level, vertical pol, in 1/100 dBm.
    pub vpol_noise: i16,
    /// Bytes 186..188. LDR offset in 1/100 dB.
    pub ldr_offset: i16,
    /// Bytes 188..190. ZDR offset in 1/100 dB.
    pub zdr_offset: i16,
    /// Bytes 190..192. TCF cal flags.
    pub tcf_cal_flags: u16,
    /// Bytes 192..194. TCF cal flags 2.
    pub tcf_cal_flags2: u16,
    /// Bytes 212..216. Standard parallel 1, binary angle.
    pub std_parallel1: u32,
    /// Bytes 216..220. Standard parallel 2, binary angle.
    pub std_parallel2: u32,
    /// Bytes 220..224. Equatorial radius of the earth in cm, zero for the 6371 km sphere.
    pub rearth: u32,
    /// Bytes 224..228. 1/flattening in 1/1000000, zero for a sphere.
    pub flatten: u32,
    /// Bytes 228..232. Fault status of the task.
    pub fault: u32,
    /// Bytes 232..236. Mask of input sites used in a composite.
    pub insites_mask: u32,
    /// Bytes 236..238. Number of log based filter for the first bin.
    pub logfilter_num: u16,
    /// Bytes 238..240. Nonzero if a cluttermap was applied to the ingest data.
    pub cluttermap_used: u16,
    /// Bytes 240..244. Latitude of the projection reference, binary angle.
    pub proj_lat: u32,
    /// Bytes 244..248. Longitude of the projection reference, binary angle.
    pub proj_lon: u32,
    /// Bytes 248..250. Product sequence number.
    pub i_prod: i16,
    /// Bytes 282..284. Melting level in meters, msb complemented, 0 for unknown.
    pub melt_level: i16,
    /// Bytes 284..286. Height of the radar above the reference height in meters.
    pub radar_ht_ref: i16,
    /// Bytes 286..288. Number of elements in the product results array.
    pub num_elem: i16,
    /// Byte 288. Mean wind speed.
    pub wind_spd: u8,
    /// Byte 289. Mean wind direction, unknown if speed and direction are 0.
    pub wind_dir: u8,
    /// Bytes 292..300. Time zone name of the recorded data.
    pub tz: String,
}

/// Record 1 of a raw volume: structure header, product configuration, product end.
#[derive(Debug, Clone, PartialEq, Default)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProductHdr {
    pub sh: StructureHeader,
    pub pc: ProductConfiguration,
    pub pe: ProductEnd,
}

/// The ingest configuration substructure of record 2, 480 bytes.
#[derive(Debug, Clone, PartialEq, Default)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IngestConfiguration {
    /// Bytes 0..80. Name of the file on disk.
    pub file_name: String,
    /// Bytes 80..82. Number of associated data files extant.
    pub num_assoc_files: i16,
    /// Bytes 82..84. Number of sweeps completed so far.
    pub num_sweeps: i16,
    /// Bytes 84..88. Total size of all files in bytes.
    pub size_files: i32,
    /// Bytes 88..100. Time that the volume scan was started.
    pub vol_start_time: YmdsTime,
    /// Bytes 112..114. Number of bytes in the ray headers.
    pub ray_headers_sz: i16,
    /// Bytes 114..116. Number of bytes in extended ray headers, including the normal header.
    pub extended_ray_headers_sz: i16,
    /// Bytes 116..118. Number of the task configuration table.
    pub task_config_table_num: i16,
    /// Bytes 118..120. Playback version number.
    pub playback_vsn: i16,
    /// Bytes 124..132. IRIS version.
    pub iris_vsn: String,
    /// Bytes 132..148. Hardware name of the site.
    pub hw_site_name: String,
    /// Bytes 148..150. Time zone of local standard time, minutes west of GMT.
    pub local_wgmt: i16,
    /// Bytes 150..166. Name of the site, from the setup utility.
    pub su_site_name: String,
    /// Bytes 166..168. Time zone of recorded standard time, minutes west of GMT.
    pub rec_wgmt: i16,
    /// Bytes 168..172. Latitude of the radar, binary angle.
    pub latitude: u32,
    /// Bytes 172..176. Longitude of the radar, binary angle.
    pub longitude: u32,
    /// Bytes 176..178. Height of the ground at the site, meters above sea level.
    pub ground_elev: i16,
    /// Bytes 178..180. Height of the radar above the ground, meters.
    pub radar_ht: i16,
    /// Bytes 180..182. Resolution as number of rays in a full circle sweep.
    pub resolution: u16,
    /// Bytes 182..184. Index of the first ray.
    pub index_first_ray: u16,
    /// Bytes 184..186. Number of rays in a sweep.
    pub num_rays: u16,
    /// Bytes 186..188. Number of bytes in each gparam.
    pub num_bytes_gparam: i16,
    /// Bytes 188..192. Altitude of the radar, cm above sea level.
    pub altitude: i32,
    /// Bytes 192..204. Velocity of the radar platform, cm/sec east, north, up.
    pub velocity: [i32; 3],
    /// Bytes 204..216. Antenna offset from the INU, cm starboard, bow, up.
    pub offset_inu: [i32; 3],
    /// Bytes 216..220. Fault status at task start.
    pub fault: u32,
    /// Bytes 220..222. Height of the melting layer, meters above sea level, msb complemented.
    pub melt_level: i16,
    /// Bytes 224..232. Local timezone string.
    pub tz: String,
    /// Bytes 232..236. Flags; bit 0 means the first ray was not centered on zero degrees.
    pub flags: u32,
    /// Bytes 236..252. Configuration name in the dpolapp.conf file.
    pub config_name: String,
}

/// Task scheduling information, 120 bytes.
#[derive(Debug, Clone, PartialEq, Default)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskSchedInfo {
    /// Bytes 0..4. Start time, seconds within a day.
    pub start_time: i32,
    /// Bytes 4..8. Stop time, seconds within a day.
    pub stop_time: i32,
    /// Bytes 8..12. Desired skip time in seconds.
    pub skip: i32,
    /// Bytes 12..16. Time last run, seconds within a day, 0 for passive ingest.
    pub time_last_run: i32,
    /// Bytes 16..20. Time used on the last run in seconds.
    pub time_used_last_run: i32,
    /// Bytes 20..24. Relative day of last run.
    pub rel_day_last_run: i32,
    /// Bytes 24..26. Flag word.
    pub flag: u16,
}

/// One DSP data mask: five mask words plus the extended header type.
#[derive(Debug, Clone, PartialEq, Default)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DspDataMask {
    /// Bytes 0..4. Mask word 0. The bits select the data types in the volume.
    pub mask_word_0: u32,
    /// Bytes 4..8. Extended header type.
    pub ext_hdr_type: u32,
    /// Bytes 8..12. Mask word 1.
    pub mask_word_1: u32,
    /// Bytes 12..16. Mask word 2.
    pub mask_word_2: u32,
    /// Bytes 16..20. Mask word 3.
    pub mask_word_3: u32,
    /// Bytes 20..24. Mask word 4.
    pub mask_word_4: u32,
}

/// Batch major mode parameters of the task DSP info.
#[derive(Debug, Clone, PartialEq, Default)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskDspModeBatch {
    /// Bytes 0..2. Low PRF in Hz.
    pub lo_prf: u16,
    /// Bytes 2..4. Low PRF fraction part, scaled by 2^-16.
    pub lo_prf_frac: u16,
    /// Bytes 4..6. Low PRF sample size.
    pub lo_prf_sampl: i16,
    /// Bytes 6..8. Low PRF range averaging in bins.
    pub lo_prf_avg: i16,
    /// Bytes 8..10. Threshold for reflectivity unfolding in 1/100 of dB.
    pub dz_unfold_thresh: i16,
    /// Bytes 10..12. Threshold for velocity unfolding in 1/100 of dB.
    pub vr_unfold_thresh: i16,
    /// Bytes 12..14. Threshold for width unfolding in 1/100 of dB.
    pub sw_unfold_thresh: i16,
}

/// Task DSP information, 320 bytes.
#[derive(Debug, Clone, PartialEq, Default)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskDspInfo {
    /// Bytes 0..2. Major mode.
    pub major_mode: u16,
    /// Bytes 2..4. DSP type.
    pub dsp_type: u16,
    /// Bytes 4..28. Current data type mask.
    pub curr_data_mask: DspDataMask,
    /// Bytes 28..52. Original data type mask.
    pub orig_data_mask: DspDataMask,
    /// Bytes 52..66. Batch mode parameters.
    pub mb: TaskDspModeBatch,
    /// Bytes 136..140. PRF in Hertz.
    pub prf: i32,
    /// Bytes 140..144. Pulse width in 1/100 of microseconds.
    pub pulse_w: i32,
    /// Bytes 144..146. Multi PRF mode flag.
    pub multi_prf_mode: MultiPrfMode,
    /// Bytes 146..148. Dual PRF delay.
    pub dual_prf: i16,
    /// Bytes 148..150. AGC feedback code.
    pub agc_feebk: u16,
    /// Bytes 150..152. Sample size.
    pub sampl_sz: i16,
    /// Bytes 152..154. Gain control flag: 0 fixed, 1 STC, 2 AGC.
    pub gain_flag: u16,
    /// Bytes 154..166. Name of the file used for the clutter filter.
    pub clutter_file: String,
    /// Byte 166. Linear based filter number for the first bin.
    pub lin_filter_num: u8,
    /// Byte 167. Log based filter number for the first bin.
    pub log_filter_num: u8,
    /// Bytes 168..170. Attenuation in 1/10 dB applied in fixed gain mode.
    pub attenuation: i16,
    /// Bytes 170..172. Gas attenuation, 1/100000 dB/km.
    pub gas_attenuation: u16,
    /// Bytes 172..174. Nonzero means a cluttermap was used.
    pub clutter_flag: u16,
    /// Bytes 174..176. Transmit phase sequence: 0 fixed, 1 random, 3 SZ8/64.
    pub xmt_phase: u16,
    /// Bytes 176..180. Mask used to configure the ray header.
    pub ray_hdr_mask: u32,
    /// Bytes 180..182. Time series playback flags.
    pub time_series_flag: u16,
    /// Bytes 184..200. Name of the custom ray header.
    pub custom_ray_hdr: String,
}

/// Task calibration information, 320 bytes.
#[derive(Debug, Clone, PartialEq, Default)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskCalibInfo {
    /// Bytes 0..2. Reflectivity slope, 4096*dB/(A/D count).
    pub dbz_slope: i16,
    /// Bytes 2..4. Reflectivity noise threshold, 1/16 dB above noise.
    pub dbz_noise_thresh: i16,
    /// Bytes 4..6. Clutter correction threshold, 1/16 dB.
    pub clutter_corr_thresh: i16,
    /// Bytes 6..8. SQI threshold, (0-1)*256.
    pub sqi_thresh: i16,
    /// Bytes 8..10. Power threshold, 1/16 dBZ.
    pub pwr_thresh: i16,
    /// Bytes 18..20. Calibration reflectivity, 1/16 dBZ at 1 km.
    pub cal_dbz: i16,
    /// Bytes 20..22. Threshold flags for uncorrected reflectivity.
    pub dbt_flags: u16,
    /// Bytes 22..24. Threshold flags for corrected reflectivity.
    pub dbz_flags: u16,
    /// Bytes 24..26. Threshold flags for velocity.
    pub vel_flags: u16,
    /// Bytes 26..28. Threshold flags for width.
    pub sw_flags: u16,
    /// Bytes 28..30. Threshold flags for ZDR.
    pub zdr_flags: u16,
    /// Bytes 36..38. Flag word.
    pub flags: u16,
    /// Bytes 40..42. LDR bias in 1/100 dB.
    pub ldr_bias: i16,
    /// Bytes 42..44. ZDR bias in 1/100 dB.
    pub zdr_bias: i16,
    /// Bytes 44..46. NX clutter threshold, 1/100 dB.
    pub nx_clutter_thresh: i16,
    /// Bytes 46..48. NX clutter skip.
    pub nx_clutter_skip: u16,
    /// Bytes 48..50. I0 cal value, horizontal pol, 1/100 dBm.
    pub hpol_io_cal: i16,
    /// Bytes 50..52. I0 cal value, vertical pol, 1/100 dBm.
    pub vpol_io_cal: i16,
    /// Bytes 52..54. Noise at calibration, horizontal pol, 1/100 dBm.
    pub hpol_noise: i16,
    /// Bytes 54..56. Noise at calibration, vertical pol, 1/100 dBm.
    pub vpol_noise: i16,
    /// Bytes 56..58. Radar constant, horizontal pol, 1/100 dB.
    pub hpol_radar_const: i16,
    /// Bytes 58..60. Radar constant, vertical pol, 1/100 dB.
    pub vpol_radar_const: i16,
    /// Bytes 60..62. Receiver bandwidth in kHz.
    pub bandwidth: u16,
    /// Bytes 62..64. Flags 2.
    pub flags2: u16,
}

/// Task range information, 160 bytes.
#[derive(Debug, Clone, PartialEq, Default)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskRangeInfo {
    /// Bytes 0..4. Range to the first bin in cm.
    pub rng_1st_bin: i32,
    /// Bytes 4..8. Range to the last bin in cm.
    pub rng_last_bin: i32,
    /// Bytes 8..10. Number of input bins.
    pub num_bins_in: i16,
    /// Bytes 10..12. Number of output bins.
    pub num_bins_out: i16,
    /// Bytes 12..16. Input bin step in cm.
    pub step_in: i32,
    /// Bytes 16..20. Output bin step in cm.
    pub step_out: i32,
    /// Bytes 20..22. Flag word; bit 0 means variable resolution.
    pub flag: u16,
    /// Bytes 22..24. Range bin averaging flag.
    pub rng_avg_flag: i16,
}

/// RHI scan geometry: one azimuth per sweep.
#[derive(Debug, Clone, PartialEq)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RhiScanInfo {
    /// Bytes 0..2. Lower elevation limit, binary angle.
    pub lo_elev: u16,
    /// Bytes 2..4. Upper elevation limit, binary angle.
    pub hi_elev: u16,
    /// Bytes 4..84. Azimuth of each sweep, binary angles, 40 entries.
    pub az: Vec<u16>,
    /// Byte 199. Start mode: 0 nearest, 1 lower, 2 upper.
    pub start: u8,
}

impl Default for RhiScanInfo {
    fn default() -> Self {
        RhiScanInfo { lo_elev: 0, hi_elev: 0, az: vec![0; 40], start: 0 }
    }
}

/// PPI scan geometry: one elevation per sweep.
#[derive(Debug, Clone, PartialEq)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PpiScanInfo {
    /// Bytes 0..2. Left azimuth limit, binary angle.
    pub left_az: u16,
    /// Bytes 2..4. Right azimuth limit, binary angle.
    pub right_az: u16,
    /// Bytes 4..84. Elevation of each sweep, binary angles, 40 entries.
    pub elevs: Vec<u16>,
    /// Byte 199. Start mode: 0 nearest, 1 left, 2 right.
    pub start: u8,
}

impl Default for PpiScanInfo {
    fn default() -> Self {
        PpiScanInfo { left_az: 0, right_az: 0, elevs: vec![0; 40], start: 0 }
    }
}

/// File scan geometry.
#[derive(Debug, Clone, PartialEq, Default)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FileScanInfo {
    /// Bytes 0..2. First azimuth, binary angle.
    pub az0: u16,
    /// Bytes 2..4. First elevation, binary angle.
    pub elev0: u16,
    /// Bytes 4..16. Antenna control file name.
    pub ant_ctrl: String,
}

/// Manual scan geometry.
#[derive(Debug, Clone, PartialEq, Default)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManualScanInfo {
    /// Bytes 0..2. Flags; bit 0 means continuous recording.
    pub flags: u16,
}

/// Scan-mode-specific geometry, a tagged view of the scan info union.
#[derive(Debug, Clone, PartialEq)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScanInfo {
    Rhi(RhiScanInfo),
    Ppi(PpiScanInfo),
    File(FileScanInfo),
    Manual(ManualScanInfo),
}

impl Default for ScanInfo {
    fn default() -> Self {
        ScanInfo::Ppi(PpiScanInfo::default())
    }
}

/// Task scan information, 320 bytes.
#[derive(Debug, Clone, PartialEq, Default)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskScanInfo {
    /// Bytes 0..2. Scan mode.
    pub scan_mode: ScanMode,
    /// Bytes 2..4. Angular resolution in 1/1000 of degrees.
    pub resoln: i16,
    /// Bytes 6..8. Number of sweeps to perform.
    pub num_sweeps: i16,
    /// Bytes 8..208. Scan-mode-specific geometry.
    pub scan_info: ScanInfo,
}

/// Task miscellaneous information, 320 bytes.
#[derive(Debug, Clone, PartialEq, Default)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskMiscInfo {
    /// Bytes 0..4. Wavelength in 1/100 of centimeters.
    pub wave_len: i32,
    /// Bytes 4..20. T/R tube serial number.
    pub tr_ser: String,
    /// Bytes 20..24. Transmit power in watts.
    pub power: i32,
    /// Bytes 24..26. Flag word.
    pub flags: u16,
    /// Bytes 26..28. Type of polarization.
    pub polarization: u16,
    /// Bytes 28..32. Truncation height in cm above the radar.
    pub trunc_ht: i32,
    /// Bytes 62..64. Number of bytes of comments entered.
    pub comment_sz: i16,
    /// Bytes 64..68. Horizontal beam width, binary angle.
    pub horiz_beam_width: u32,
    /// Bytes 68..72. Vertical beam width, binary angle.
    pub vert_beam_width: u32,
    /// Bytes 72..112. Customer defined storage.
    pub custom: [u32; 10],
}

/// Task end information, 320 bytes.
#[derive(Debug, Clone, PartialEq, Default)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskEndInfo {
    /// Bytes 0..2. Task major number.
    pub task_major: i16,
    /// Bytes 2..4. Task minor number.
    pub task_minor: i16,
    /// Bytes 4..16. Name of the task configuration file.
    pub task_config: String,
    /// Bytes 16..96. Task description.
    pub task_descr: String,
    /// Bytes 96..100. Number of tasks in this hybrid set.
    pub hybrid_ntasks: i32,
    /// Bytes 100..102. Task state: 0 no task, 1 being modified, 2 inactive, 3 scheduled, 4 running.
    pub task_state: u16,
    /// Bytes 104..116. Data time of the task.
    pub data_time: YmdsTime,
}

/// The task configuration substructure of record 2, 2612 bytes.
#[derive(Debug, Clone, PartialEq, Default)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskConfiguration {
    /// Bytes 0..12. Structure header, id 22.
    pub sh: StructureHeader,
    /// Bytes 12..132. Task schedule info.
    pub tsi: TaskSchedInfo,
    /// Bytes 132..452. Task DSP info.
    pub tdi: TaskDspInfo,
    /// Bytes 452..772. Task calibration info.
    pub tci: TaskCalibInfo,
    /// Bytes 772..932. Task range info.
    pub tri: TaskRangeInfo,
    /// Bytes 932..1252. Task scan info.
    pub tni: TaskScanInfo,
    /// Bytes 1252..1572. Task miscellaneous info.
    pub tmi: TaskMiscInfo,
    /// Bytes 1572..1892. Task end info.
    pub tei: TaskEndInfo,
}

/// Record 2 of a raw volume: structure header, ingest configuration, task configuration.
#[derive(Debug, Clone, PartialEq, Default)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IngestHeader {
    pub sh: StructureHeader,
    pub ic: IngestConfiguration,
    pub tc: TaskConfiguration,
}

/// The parts of an `ingest_data_header` the reader extracts: the sweep start time,
/// the sweep number, and the fixed sweep angle.
#[derive(Debug, Clone, PartialEq, Default)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IngestDataHeader {
    /// Bytes 0..12. Structure header, id 24.
    pub sh: StructureHeader,
    /// Bytes 12..24. Sweep start time.
    pub time: YmdsTime,
    /// Bytes 24..26. Sweep number, origin 1; 0 means no more sweeps.
    pub sweep_num: i16,
    /// Bytes 34..36. Fixed sweep angle, binary angle.
    pub fixed_angle: u16,
}

#[cfg(feature = "to_json")]
impl ProductHdr {
    /// Dump the parsed record 1 as JSON.
    pub fn to_json(&self) -> Result<String, crate::errors::Error> {
        serde_json::to_string(&self).map_err(crate::errors::Error::SerdeError)
    }
}

#[cfg(feature = "to_json")]
impl IngestHeader {
    /// Dump the parsed record 2 as JSON.
    pub fn to_json(&self) -> Result<String, crate::errors::Error> {
        serde_json::to_string(&self).map_err(crate::errors::Error::SerdeError)
    }
}
