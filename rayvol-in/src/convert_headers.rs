//! This file contains the conversions from raw record bytes to the header structures
//! of a Sigmet raw product file.
//!
//! Each implementation consumes its substructure from a swap-aware [`ByteStream`];
//! explicit skips cover reserved regions, so every parser reads exactly the
//! substructure length the IRIS Programmer's Manual gives. The record level parsers
//! position a sub-stream at the offset of each substructure within the 6144 byte
//! record.
use rayvol_core::bytestream::ByteStream;
use rayvol_core::errors::Error;
use rayvol_core::*;

/// This trait allows a header structure to be parsed out of a byte stream.
pub trait HeaderFromBytes: Sized {
    fn from_bytes(bs: &mut ByteStream) -> Result<Self, Error>;
}

impl HeaderFromBytes for YmdsTime {
    fn from_bytes(bs: &mut ByteStream) -> Result<Self, Error> {
        let sec = bs.get_i32()?;
        let raw_msec = bs.get_u16()?;
        Ok(YmdsTime {
            sec,
            msec: (raw_msec & 0x3FF) as u32,
            utc: raw_msec & 0x400 != 0,
            year: bs.get_i16()? as i32,
            month: bs.get_i16()? as i32,
            day: bs.get_i16()? as i32,
        })
    }
}

impl HeaderFromBytes for StructureHeader {
    fn from_bytes(bs: &mut ByteStream) -> Result<Self, Error> {
        let id = bs.get_i16()?;
        let format = bs.get_i16()?;
        let sz = bs.get_i32()?;
        bs.skip(2)?;
        let flags = bs.get_i16()?;
        Ok(StructureHeader { id, format, sz, flags })
    }
}

impl HeaderFromBytes for ProductSpecificInfo {
    fn from_bytes(bs: &mut ByteStream) -> Result<Self, Error> {
        let psi = ProductSpecificInfo {
            data_type_mask: bs.get_u32()?,
            rng_last_bin: bs.get_i32()?,
            format_conv_flag: bs.get_u32()?,
            flag: bs.get_u32()?,
            sweep_num: bs.get_i32()?,
            xhdr_type: bs.get_u32()?,
            data_type_mask1: bs.get_u32()?,
            data_type_mask2: bs.get_u32()?,
            data_type_mask3: bs.get_u32()?,
            data_type_mask4: bs.get_u32()?,
            playback_vsn: bs.get_u32()?,
        };
        bs.skip(36)?;
        Ok(psi)
    }
}

impl HeaderFromBytes for ColorScaleDef {
    fn from_bytes(bs: &mut ByteStream) -> Result<Self, Error> {
        let flags = bs.get_u32()?;
        let istart = bs.get_i32()?;
        let istep = bs.get_i32()?;
        let icolcnt = bs.get_i16()?;
        let iset_and_scale = bs.get_u16()?;
        let mut ilevel_seams = [0u16; 16];
        for seam in &mut ilevel_seams {
            *seam = bs.get_u16()?;
        }
        Ok(ColorScaleDef { flags, istart, istep, icolcnt, iset_and_scale, ilevel_seams })
    }
}

impl HeaderFromBytes for ProductConfiguration {
    fn from_bytes(bs: &mut ByteStream) -> Result<Self, Error> {
        let sh = StructureHeader::from_bytes(bs)?;
        let type_code = bs.get_u16()?;
        let schedule = bs.get_u16()?;
        let skip = bs.get_i32()?;
        let gen_tm = YmdsTime::from_bytes(bs)?;
        let ingest_sweep_tm = YmdsTime::from_bytes(bs)?;
        let ingest_file_tm = YmdsTime::from_bytes(bs)?;
        bs.skip(6)?;
        let config_file = bs.get_string(12)?;
        let task_name = bs.get_string(12)?;
        let flag = bs.get_u16()?;
        let x_scale = bs.get_i32()?;
        let y_scale = bs.get_i32()?;
        let z_scale = bs.get_i32()?;
        let x_size = bs.get_i32()?;
        let y_size = bs.get_i32()?;
        let z_size = bs.get_i32()?;
        let x_loc = bs.get_i32()?;
        let y_loc = bs.get_i32()?;
        let z_loc = bs.get_i32()?;
        let max_rng = bs.get_i32()?;
        bs.skip(2)?;
        let data_type = bs.get_u16()?;
        let proj = bs.get_string(12)?;
        let inp_data_type = bs.get_u16()?;
        let proj_type = bs.get_u8()?;
        bs.skip(1)?;
        let rad_smoother = bs.get_i16()?;
        let num_runs = bs.get_i16()?;
        let zr_const = bs.get_i32()?;
        let zr_exp = bs.get_i32()?;
        let x_smooth = bs.get_i16()?;
        let y_smooth = bs.get_i16()?;
        let psi = ProductSpecificInfo::from_bytes(bs)?;
        let suffixes = bs.get_string(16)?;
        bs.skip(12)?;
        let csd = ColorScaleDef::from_bytes(bs)?;
        Ok(ProductConfiguration {
            sh,
            type_code,
            schedule,
            skip,
            gen_tm,
            ingest_sweep_tm,
            ingest_file_tm,
            config_file,
            task_name,
            flag,
            x_scale,
            y_scale,
            z_scale,
            x_size,
            y_size,
            z_size,
            x_loc,
            y_loc,
            z_loc,
            max_rng,
            data_type,
            proj,
            inp_data_type,
            proj_type,
            rad_smoother,
            num_runs,
            zr_const,
            zr_exp,
            x_smooth,
            y_smooth,
            psi,
            suffixes,
            csd,
        })
    }
}

impl HeaderFromBytes for ProductEnd {
    fn from_bytes(bs: &mut ByteStream) -> Result<Self, Error> {
        let site_name_prod = bs.get_string(16)?;
        let iris_prod_vsn = bs.get_string(8)?;
        let iris_ing_vsn = bs.get_string(8)?;
        bs.skip(40)?;
        let local_wgmt = bs.get_i16()?;
        let hw_name = bs.get_string(16)?;
        let site_name_ing = bs.get_string(16)?;
        let rec_wgmt = bs.get_i16()?;
        let center_latitude = bs.get_u32()?;
        let center_longitude = bs.get_u32()?;
        let ground_elev = bs.get_i16()?;
        let radar_ht = bs.get_i16()?;
        let prf = bs.get_i32()?;
        let pulse_w = bs.get_i32()?;
        let proc_type = bs.get_u16()?;
        let trigger_rate_scheme = bs.get_u16()?;
        let num_samples = bs.get_i16()?;
        let clutter_filter = bs.get_string(12)?;
        let lin_filter = bs.get_u16()?;
        let wave_len = bs.get_i32()?;
        let trunc_ht = bs.get_i32()?;
        let rng_bin0 = bs.get_i32()?;
        let rng_last_bin = bs.get_i32()?;
        let num_bins_out = bs.get_i32()?;
        let flag = bs.get_u16()?;
        bs.skip(2)?;
        let polarization = bs.get_u16()?;
        let hpol_io_cal = bs.get_i16()?;
        let hpol_cal_noise = bs.get_i16()?;
        let hpol_radar_const = bs.get_i16()?;
        let recv_bandw = bs.get_u16()?;
        let hpol_noise = bs.get_i16()?;
        let vpol_noise = bs.get_i16()?;
        let ldr_offset = bs.get_i16()?;
        let zdr_offset = bs.get_i16()?;
        let tcf_cal_flags = bs.get_u16()?;
        let tcf_cal_flags2 = bs.get_u16()?;
        bs.skip(18)?;
        let std_parallel1 = bs.get_u32()?;
        let std_parallel2 = bs.get_u32()?;
        let rearth = bs.get_u32()?;
        let flatten = bs.get_u32()?;
        let fault = bs.get_u32()?;
        let insites_mask = bs.get_u32()?;
        let logfilter_num = bs.get_u16()?;
        let cluttermap_used = bs.get_u16()?;
        let proj_lat = bs.get_u32()?;
        let proj_lon = bs.get_u32()?;
        let i_prod = bs.get_i16()?;
        bs.skip(32)?;
        let melt_level = bs.get_i16()?;
        let radar_ht_ref = bs.get_i16()?;
        let num_elem = bs.get_i16()?;
        let wind_spd = bs.get_u8()?;
        let wind_dir = bs.get_u8()?;
        bs.skip(2)?;
        let tz = bs.get_string(8)?;
        Ok(ProductEnd {
            site_name_prod,
            iris_prod_vsn,
            iris_ing_vsn,
            local_wgmt,
            hw_name,
            site_name_ing,
            rec_wgmt,
            center_latitude,
            center_longitude,
            ground_elev,
            radar_ht,
            prf,
            pulse_w,
            proc_type,
            trigger_rate_scheme,
            num_samples,
            clutter_filter,
            lin_filter,
            wave_len,
            trunc_ht,
            rng_bin0,
            rng_last_bin,
            num_bins_out,
            flag,
            polarization,
            hpol_io_cal,
            hpol_cal_noise,
            hpol_radar_const,
            recv_bandw,
            hpol_noise,
            vpol_noise,
            ldr_offset,
            zdr_offset,
            tcf_cal_flags,
            tcf_cal_flags2,
            std_parallel1,
            std_parallel2,
            rearth,
            flatten,
            fault,
            insites_mask,
            logfilter_num,
            cluttermap_used,
            proj_lat,
            proj_lon,
            i_prod,
            melt_level,
            radar_ht_ref,
            num_elem,
            wind_spd,
            wind_dir,
            tz,
        })
    }
}

impl HeaderFromBytes for IngestConfiguration {
    fn from_bytes(bs: &mut ByteStream) -> Result<Self, Error> {
        let file_name = bs.get_string(80)?;
        let num_assoc_files = bs.get_i16()?;
        let num_sweeps = bs.get_i16()?;
        let size_files = bs.get_i32()?;
        let vol_start_time = YmdsTime::from_bytes(bs)?;
        bs.skip(12)?;
        let ray_headers_sz = bs.get_i16()?;
        let extended_ray_headers_sz = bs.get_i16()?;
        let task_config_table_num = bs.get_i16()?;
        let playback_vsn = bs.get_i16()?;
        bs.skip(4)?;
        let iris_vsn = bs.get_string(8)?;
        let hw_site_name = bs.get_string(16)?;
        let local_wgmt = bs.get_i16()?;
        let su_site_name = bs.get_string(16)?;
        let rec_wgmt = bs.get_i16()?;
        let latitude = bs.get_u32()?;
        let longitude = bs.get_u32()?;
        let ground_elev = bs.get_i16()?;
        let radar_ht = bs.get_i16()?;
        let resolution = bs.get_u16()?;
        let index_first_ray = bs.get_u16()?;
        let num_rays = bs.get_u16()?;
        let num_bytes_gparam = bs.get_i16()?;
        let altitude = bs.get_i32()?;
        let mut velocity = [0i32; 3];
        for v in &mut velocity {
            *v = bs.get_i32()?;
        }
        let mut offset_inu = [0i32; 3];
        for v in &mut offset_inu {
            *v = bs.get_i32()?;
        }
        let fault = bs.get_u32()?;
        let melt_level = bs.get_i16()?;
        bs.skip(2)?;
        let tz = bs.get_string(8)?;
        let flags = bs.get_u32()?;
        let config_name = bs.get_string(16)?;
        Ok(IngestConfiguration {
            file_name,
            num_assoc_files,
            num_sweeps,
            size_files,
            vol_start_time,
            ray_headers_sz,
            extended_ray_headers_sz,
            task_config_table_num,
            playback_vsn,
            iris_vsn,
            hw_site_name,
            local_wgmt,
            su_site_name,
            rec_wgmt,
            latitude,
            longitude,
            ground_elev,
            radar_ht,
            resolution,
            index_first_ray,
            num_rays,
            num_bytes_gparam,
            altitude,
            velocity,
            offset_inu,
            fault,
            melt_level,
            tz,
            flags,
            config_name,
        })
    }
}

impl HeaderFromBytes for TaskSchedInfo {
    fn from_bytes(bs: &mut ByteStream) -> Result<Self, Error> {
        Ok(TaskSchedInfo {
            start_time: bs.get_i32()?,
            stop_time: bs.get_i32()?,
            skip: bs.get_i32()?,
            time_last_run: bs.get_i32()?,
            time_used_last_run: bs.get_i32()?,
            rel_day_last_run: bs.get_i32()?,
            flag: bs.get_u16()?,
        })
    }
}

impl HeaderFromBytes for DspDataMask {
    fn from_bytes(bs: &mut ByteStream) -> Result<Self, Error> {
        Ok(DspDataMask {
            mask_word_0: bs.get_u32()?,
            ext_hdr_type: bs.get_u32()?,
            mask_word_1: bs.get_u32()?,
            mask_word_2: bs.get_u32()?,
            mask_word_3: bs.get_u32()?,
            mask_word_4: bs.get_u32()?,
        })
    }
}

impl HeaderFromBytes for TaskDspModeBatch {
    fn from_bytes(bs: &mut ByteStream) -> Result<Self, Error> {
        Ok(TaskDspModeBatch {
            lo_prf: bs.get_u16()?,
            lo_prf_frac: bs.get_u16()?,
            lo_prf_sampl: bs.get_i16()?,
            lo_prf_avg: bs.get_i16()?,
            dz_unfold_thresh: bs.get_i16()?,
            vr_unfold_thresh: bs.get_i16()?,
            sw_unfold_thresh: bs.get_i16()?,
        })
    }
}

impl HeaderFromBytes for TaskDspInfo {
    fn from_bytes(bs: &mut ByteStream) -> Result<Self, Error> {
        let major_mode = bs.get_u16()?;
        let dsp_type = bs.get_u16()?;
        let curr_data_mask = DspDataMask::from_bytes(bs)?;
        let orig_data_mask = DspDataMask::from_bytes(bs)?;
        let mb = TaskDspModeBatch::from_bytes(bs)?;
        bs.skip(70)?;
        let prf = bs.get_i32()?;
        let pulse_w = bs.get_i32()?;
        let multi_prf_mode = MultiPrfMode::new(bs.get_u16()?)?;
        let dual_prf = bs.get_i16()?;
        let agc_feebk = bs.get_u16()?;
        let sampl_sz = bs.get_i16()?;
        let gain_flag = bs.get_u16()?;
        let clutter_file = bs.get_string(12)?;
        let lin_filter_num = bs.get_u8()?;
        let log_filter_num = bs.get_u8()?;
        let attenuation = bs.get_i16()?;
        let gas_attenuation = bs.get_u16()?;
        let clutter_flag = bs.get_u16()?;
        let xmt_phase = bs.get_u16()?;
        let ray_hdr_mask = bs.get_u32()?;
        let time_series_flag = bs.get_u16()?;
        bs.skip(2)?;
        let custom_ray_hdr = bs.get_string(16)?;
        Ok(TaskDspInfo {
            major_mode,
            dsp_type,
            curr_data_mask,
            orig_data_mask,
            mb,
            prf,
            pulse_w,
            multi_prf_mode,
            dual_prf,
            agc_feebk,
            sampl_sz,
            gain_flag,
            clutter_file,
            lin_filter_num,
            log_filter_num,
            attenuation,
            gas_attenuation,
            clutter_flag,
            xmt_phase,
            ray_hdr_mask,
            time_series_flag,
            custom_ray_hdr,
        })
    }
}

impl HeaderFromBytes for TaskCalibInfo {
    fn from_bytes(bs: &mut ByteStream) -> Result<Self, Error> {
        let dbz_slope = bs.get_i16()?;
        let dbz_noise_thresh = bs.get_i16()?;
        let clutter_corr_thresh = bs.get_i16()?;
        let sqi_thresh = bs.get_i16()?;
        let pwr_thresh = bs.get_i16()?;
        bs.skip(8)?;
        let cal_dbz = bs.get_i16()?;
        let dbt_flags = bs.get_u16()?;
        let dbz_flags = bs.get_u16()?;
        let vel_flags = bs.get_u16()?;
        let sw_flags = bs.get_u16()?;
        let zdr_flags = bs.get_u16()?;
        bs.skip(6)?;
        let flags = bs.get_u16()?;
        bs.skip(2)?;
        let ldr_bias = bs.get_i16()?;
        let zdr_bias = bs.get_i16()?;
        let nx_clutter_thresh = bs.get_i16()?;
        let nx_clutter_skip = bs.get_u16()?;
        let hpol_io_cal = bs.get_i16()?;
        let vpol_io_cal = bs.get_i16()?;
        let hpol_noise = bs.get_i16()?;
        let vpol_noise = bs.get_i16()?;
        let hpol_radar_const = bs.get_i16()?;
        let vpol_radar_const = bs.get_i16()?;
        let bandwidth = bs.get_u16()?;
        let flags2 = bs.get_u16()?;
        Ok(TaskCalibInfo {
            dbz_slope,
            dbz_noise_thresh,
            clutter_corr_thresh,
            sqi_thresh,
            pwr_thresh,
            cal_dbz,
            dbt_flags,
            dbz_flags,
            vel_flags,
            sw_flags,
            zdr_flags,
            flags,
            ldr_bias,
            zdr_bias,
            nx_clutter_thresh,
            nx_clutter_skip,
            hpol_io_cal,
            vpol_io_cal,
            hpol_noise,
            vpol_noise,
            hpol_radar_const,
            vpol_radar_const,
            bandwidth,
            flags2,
        })
    }
}

impl HeaderFromBytes for TaskRangeInfo {
    fn from_bytes(bs: &mut ByteStream) -> Result<Self, Error> {
        Ok(TaskRangeInfo {
            rng_1st_bin: bs.get_i32()?,
            rng_last_bin: bs.get_i32()?,
            num_bins_in: bs.get_i16()?,
            num_bins_out: bs.get_i16()?,
            step_in: bs.get_i32()?,
            step_out: bs.get_i32()?,
            flag: bs.get_u16()?,
            rng_avg_flag: bs.get_i16()?,
        })
    }
}

impl HeaderFromBytes for TaskScanInfo {
    fn from_bytes(bs: &mut ByteStream) -> Result<Self, Error> {
        let scan_mode = ScanMode::new(bs.get_u16()?)?;
        let resoln = bs.get_i16()?;
        bs.skip(2)?;
        let num_sweeps = bs.get_i16()?;
        let scan_info = match scan_mode {
            ScanMode::Rhi => {
                let lo_elev = bs.get_u16()?;
                let hi_elev = bs.get_u16()?;
                let mut az = vec![0u16; 40];
                for a in &mut az {
                    *a = bs.get_u16()?;
                }
                bs.skip(115)?;
                let start = bs.get_u8()?;
                ScanInfo::Rhi(RhiScanInfo { lo_elev, hi_elev, az, start })
            }
            ScanMode::PpiSector | ScanMode::PpiContinuous => {
                let left_az = bs.get_u16()?;
                let right_az = bs.get_u16()?;
                let mut elevs = vec![0u16; 40];
                for e in &mut elevs {
                    *e = bs.get_u16()?;
                }
                bs.skip(115)?;
                let start = bs.get_u8()?;
                ScanInfo::Ppi(PpiScanInfo { left_az, right_az, elevs, start })
            }
            ScanMode::FileScan => {
                let az0 = bs.get_u16()?;
                let elev0 = bs.get_u16()?;
                let ant_ctrl = bs.get_string(12)?;
                bs.skip(184)?;
                ScanInfo::File(FileScanInfo { az0, elev0, ant_ctrl })
            }
            ScanMode::Manual => {
                let flags = bs.get_u16()?;
                bs.skip(198)?;
                ScanInfo::Manual(ManualScanInfo { flags })
            }
        };
        Ok(TaskScanInfo { scan_mode, resoln, num_sweeps, scan_info })
    }
}

impl HeaderFromBytes for TaskMiscInfo {
    fn from_bytes(bs: &mut ByteStream) -> Result<Self, Error> {
        let wave_len = bs.get_i32()?;
        let tr_ser = bs.get_string(16)?;
        let power = bs.get_i32()?;
        let flags = bs.get_u16()?;
        let polarization = bs.get_u16()?;
        let trunc_ht = bs.get_i32()?;
        bs.skip(30)?;
        let comment_sz = bs.get_i16()?;
        let horiz_beam_width = bs.get_u32()?;
        let vert_beam_width = bs.get_u32()?;
        let mut custom = [0u32; 10];
        for c in &mut custom {
            *c = bs.get_u32()?;
        }
        Ok(TaskMiscInfo {
            wave_len,
            tr_ser,
            power,
            flags,
            polarization,
            trunc_ht,
            comment_sz,
            horiz_beam_width,
            vert_beam_width,
            custom,
        })
    }
}

impl HeaderFromBytes for TaskEndInfo {
    fn from_bytes(bs: &mut ByteStream) -> Result<Self, Error> {
        let task_major = bs.get_i16()?;
        let task_minor = bs.get_i16()?;
        let task_config = bs.get_string(12)?;
        let task_descr = bs.get_string(80)?;
        let hybrid_ntasks = bs.get_i32()?;
        let task_state = bs.get_u16()?;
        bs.skip(2)?;
        let data_time = YmdsTime::from_bytes(bs)?;
        Ok(TaskEndInfo {
            task_major,
            task_minor,
            task_config,
            task_descr,
            hybrid_ntasks,
            task_state,
            data_time,
        })
    }
}

impl HeaderFromBytes for IngestDataHeader {
    fn from_bytes(bs: &mut ByteStream) -> Result<Self, Error> {
        let sh = StructureHeader::from_bytes(bs)?;
        let time = YmdsTime::from_bytes(bs)?;
        let sweep_num = bs.get_i16()?;
        bs.skip(8)?;
        let fixed_angle = bs.get_u16()?;
        Ok(IngestDataHeader { sh, time, sweep_num, fixed_angle })
    }
}

/// Substructure offsets within record 1.
const PC_OFFSET: usize = 12;
const PE_OFFSET: usize = PC_OFFSET + 320;
const PE_LEN: usize = 308;

/// Substructure offsets within record 2.
const IC_OFFSET: usize = 12;
const TC_OFFSET: usize = IC_OFFSET + 480;
const TC_LEN: usize = 2612;

/// Parse record 1 of a raw volume.
pub fn parse_product_hdr(rec: &[u8], swap: bool) -> Result<ProductHdr, Error> {
    if rec.len() < REC_LEN {
        return Err(Error::ShortRead { wanted: REC_LEN, got: rec.len() });
    }
    let mut bs = ByteStream::with_swap(&rec[..PC_OFFSET], swap);
    let sh = StructureHeader::from_bytes(&mut bs)?;
    let mut bs = ByteStream::with_swap(&rec[PC_OFFSET..PE_OFFSET], swap);
    let pc = ProductConfiguration::from_bytes(&mut bs)?;
    let mut bs = ByteStream::with_swap(&rec[PE_OFFSET..PE_OFFSET + PE_LEN], swap);
    let pe = ProductEnd::from_bytes(&mut bs)?;
    Ok(ProductHdr { sh, pc, pe })
}

/// Parse record 2 of a raw volume.
pub fn parse_ingest_header(rec: &[u8], swap: bool) -> Result<IngestHeader, Error> {
    if rec.len() < REC_LEN {
        return Err(Error::ShortRead { wanted: REC_LEN, got: rec.len() });
    }
    let mut bs = ByteStream::with_swap(&rec[..IC_OFFSET], swap);
    let sh = StructureHeader::from_bytes(&mut bs)?;
    let mut bs = ByteStream::with_swap(&rec[IC_OFFSET..TC_OFFSET], swap);
    let ic = IngestConfiguration::from_bytes(&mut bs)?;
    let mut bs = ByteStream::with_swap(&rec[TC_OFFSET..TC_OFFSET + TC_LEN], swap);
    let tc = parse_task_configuration(&mut bs)?;
    Ok(IngestHeader { sh, ic, tc })
}

/// Parse the task configuration: a structure header followed by the seven task
/// substructures at their fixed offsets.
fn parse_task_configuration(bs: &mut ByteStream) -> Result<TaskConfiguration, Error> {
    let sh = StructureHeader::from_bytes(bs)?;
    let tsi = TaskSchedInfo::from_bytes(bs)?;
    bs.skip(120 - 26)?;
    let tdi = TaskDspInfo::from_bytes(bs)?;
    bs.skip(320 - 200)?;
    let tci = TaskCalibInfo::from_bytes(bs)?;
    bs.skip(320 - 64)?;
    let tri = TaskRangeInfo::from_bytes(bs)?;
    bs.skip(160 - 24)?;
    let tni = TaskScanInfo::from_bytes(bs)?;
    bs.skip(320 - 208)?;
    let tmi = TaskMiscInfo::from_bytes(bs)?;
    bs.skip(320 - 112)?;
    let tei = TaskEndInfo::from_bytes(bs)?;
    Ok(TaskConfiguration { sh, tsi, tdi, tci, tri, tni, tmi, tei })
}
