use rayvol_core::bytestream::ByteSink;
use rayvol_core::enums::ScanMode;
use rayvol_core::errors::{Error, Status};
use rayvol_core::volume::FieldData;
use rayvol_core::{RAW_PROD_BHDR_LEN, REC_LEN};

use crate::{read_headers, read_sweep, read_volume};

fn put_i16(rec: &mut [u8], off: usize, v: i16, swap: bool) {
    let b = if swap { v.to_be_bytes() } else { v.to_le_bytes() };
    rec[off..off + 2].copy_from_slice(&b);
}

fn put_u16(rec: &mut [u8], off: usize, v: u16, swap: bool) {
    put_i16(rec, off, v as i16, swap);
}

fn put_i32(rec: &mut [u8], off: usize, v: i32, swap: bool) {
    let b = if swap { v.to_be_bytes() } else { v.to_le_bytes() };
    rec[off..off + 4].copy_from_slice(&b);
}

fn put_u32(rec: &mut [u8], off: usize, v: u32, swap: bool) {
    put_i32(rec, off, v as i32, swap);
}

/// Grid and task parameters of a synthetic raw volume.
#[derive(Clone, Copy)]
struct Layout {
    swap: bool,
    mask: u32,
    num_sweeps: i16,
    num_rays: u16,
    num_bins: i16,
}

/// Absolute offsets of the record 2 fields the tests set, derived from the IRIS
/// substructure layout (ingest configuration at 12, task configuration at 492).
const IC: usize = 12;
const TDI: usize = 492 + 132;
const TRI: usize = 492 + 772;
const TNI: usize = 492 + 932;
const TMI: usize = 492 + 1252;

fn header_records(layout: Layout) -> Vec<u8> {
    let swap = layout.swap;
    let mut rec1 = vec![0u8; REC_LEN];
    put_i16(&mut rec1, 0, 27, swap);

    let mut rec2 = vec![0u8; REC_LEN];
    put_i16(&mut rec2, IC + 82, layout.num_sweeps, swap);
    put_u16(&mut rec2, IC + 184, layout.num_rays, swap);
    put_u32(&mut rec2, TDI + 4, layout.mask, swap);
    put_i32(&mut rec2, TDI + 136, 1000, swap); // PRF, Hz
    put_u16(&mut rec2, TDI + 144, 0, swap); // 1:1 multi PRF
    put_i32(&mut rec2, TRI, 100_000, swap); // range to first bin, cm
    put_i16(&mut rec2, TRI + 10, layout.num_bins, swap);
    put_i32(&mut rec2, TRI + 16, 10_000, swap); // bin step, cm
    put_u16(&mut rec2, TNI, ScanMode::PpiSector as u16, swap);
    put_i16(&mut rec2, TNI + 6, layout.num_sweeps, swap);
    put_i32(&mut rec2, TMI, 1000, swap); // wavelength, 1/100 cm (0.1 m)

    let mut bytes = rec1;
    bytes.extend_from_slice(&rec2);
    bytes
}

/// Packs data records: a 12 byte `raw_prod_bhdr` per record, the ingest data
/// headers at the start of each sweep, then the 16-bit compression stream. Data
/// runs may straddle record boundaries, control words never do.
struct RecordPacker {
    out: Vec<u8>,
    cur: Vec<u8>,
    rec_idx: i16,
    sweep_num: i16,
    swap: bool,
}

impl RecordPacker {
    fn new(swap: bool) -> Self {
        RecordPacker { out: Vec::new(), cur: Vec::new(), rec_idx: 1, sweep_num: 0, swap }
    }

    fn open_record(&mut self) {
        self.rec_idx += 1;
        self.cur = vec![0u8; RAW_PROD_BHDR_LEN];
        put_i16(&mut self.cur, 0, self.rec_idx, self.swap);
        put_i16(&mut self.cur, 2, self.sweep_num, self.swap);
    }

    fn close_record(&mut self) {
        if !self.cur.is_empty() {
            self.cur.resize(REC_LEN, 0);
            self.out.append(&mut self.cur);
        }
    }

    /// Start a new sweep: a fresh record carrying one ingest data header per data
    /// type in the file.
    fn start_sweep(&mut self, num_types: usize, year: i16, sec: i32, angle: u16) {
        self.close_record();
        self.sweep_num += 1;
        self.open_record();
        for _ in 0..num_types {
            let base = self.cur.len();
            self.cur.resize(base + 76, 0);
            put_i32(&mut self.cur, base + 12, sec, self.swap);
            put_i16(&mut self.cur, base + 18, year, self.swap);
            put_i16(&mut self.cur, base + 20, 3, self.swap);
            put_i16(&mut self.cur, base + 22, 5, self.swap);
            put_i16(&mut self.cur, base + 24, self.sweep_num, self.swap);
            put_u16(&mut self.cur, base + 34, angle, self.swap);
        }
    }

    fn push_word(&mut self, w: u16) {
        if self.cur.len() + 2 > REC_LEN {
            self.close_record();
            self.open_record();
        }
        let base = self.cur.len();
        self.cur.resize(base + 2, 0);
        put_u16(&mut self.cur, base, w, self.swap);
    }

    /// A run of data words; the payload continues into the next record when the
    /// current one fills up.
    fn push_data_run(&mut self, bytes: &[u8]) {
        assert_eq!(bytes.len() % 2, 0);
        self.push_word(0x8000 | (bytes.len() / 2) as u16);
        for pair in bytes.chunks(2) {
            if self.cur.len() + 2 > REC_LEN {
                self.close_record();
                self.open_record();
            }
            self.cur.extend_from_slice(pair);
        }
    }

    /// A run of zero (missing) words.
    fn push_zero_run(&mut self, num_words: u16) {
        self.push_word(num_words);
    }

    fn end_ray(&mut self) {
        self.push_word(1);
    }

    fn finish(mut self) -> Vec<u8> {
        self.close_record();
        self.out
    }
}

/// The 12 byte ray header at the front of every decompressed ray payload.
fn ray_header(swap: bool, az0: u16, az1: u16, nbins: i16, time_sec: u16) -> Vec<u8> {
    let mut hdr = vec![0u8; 12];
    put_u16(&mut hdr, 0, az0, swap);
    put_u16(&mut hdr, 2, 0, swap);
    put_u16(&mut hdr, 4, az1, swap);
    put_u16(&mut hdr, 6, 0, swap);
    put_i16(&mut hdr, 8, nbins, swap);
    put_u16(&mut hdr, 10, time_sec, swap);
    hdr
}

mod sigmet {
    use super::*;

    #[test]
    fn data_mask_selects_fields() {
        // Bits 1 and 2: DB_DBT and DB_DBZ, both one byte wide, no extended headers.
        let layout =
            Layout { swap: false, mask: 0x6, num_sweeps: 1, num_rays: 2, num_bins: 4 };
        let vol = read_headers(&header_records(layout)[..]).unwrap();
        assert!(!vol.xhdr);
        assert_eq!(vol.num_fields(), 2);
        assert_eq!(vol.fields()[0].abbrv, "DB_DBT");
        assert_eq!(vol.fields()[1].abbrv, "DB_DBZ");
        assert_eq!(vol.fields()[0].data.storage().bytes_per_bin(), 1);
        assert_eq!(vol.fields()[1].data.storage().bytes_per_bin(), 1);
        assert_eq!(vol.num_bins(), 4);
        assert_eq!(vol.num_rays(), 2);
    }

    #[test]
    fn magic_detection_both_orders() {
        let native =
            Layout { swap: false, mask: 0x4, num_sweeps: 1, num_rays: 1, num_bins: 2 };
        assert!(read_headers(&header_records(native)[..]).is_ok());

        let swapped = Layout { swap: true, ..native };
        assert!(read_headers(&header_records(swapped)[..]).is_ok());

        let mut garbage = header_records(native);
        garbage[0] = 0x34;
        garbage[1] = 0x12;
        let err = read_headers(&garbage[..]).unwrap_err();
        assert_eq!(err.status(), Status::BadFile);
        assert!(matches!(err, Error::BadMagic { .. }));
    }

    fn one_sweep_file(swap: bool) -> Vec<u8> {
        // One sweep, two rays, four bins of DB_DBZ.
        let layout = Layout { swap, mask: 0x4, num_sweeps: 1, num_rays: 2, num_bins: 4 };
        let mut bytes = header_records(layout);
        let mut packer = RecordPacker::new(swap);
        packer.start_sweep(1, 2015, 3600, 0x2000);
        for (r, samples) in [[65u8, 66, 67, 68], [70, 71, 72, 73]].iter().enumerate() {
            let mut payload = ray_header(swap, 0x1000 + r as u16, 0x1100 + r as u16, 4, 10 + r as u16);
            payload.extend_from_slice(samples);
            packer.push_data_run(&payload);
            packer.end_ray();
        }
        bytes.extend_from_slice(&packer.finish());
        bytes
    }

    #[test]
    fn one_sweep_volume_reads_completely() {
        for &swap in &[false, true] {
            let vol = read_volume(&one_sweep_file(swap)[..]).unwrap();
            assert!(!vol.truncated);
            assert_eq!(vol.num_sweeps_actual, 1);
            assert!(vol.sweep_hdr(0).unwrap().ok);
            let hdr = vol.ray_hdr(0, 0).unwrap();
            assert!(hdr.ok);
            assert_eq!(hdr.num_bins, 4);
            // Raw 65 in DB_DBZ is 0.5 * (65 - 64) = 0.5 dBZ.
            assert_eq!(vol.datum(0, 0, 0, 0), 0.5);
            assert_eq!(vol.datum(0, 0, 1, 3), 0.5 * (73.0 - 64.0));
            // Ray time is the sweep time plus the offset recorded in the ray.
            let swp = vol.sweep_hdr(0).unwrap().time;
            assert!((hdr.time - swp - 10.0 / 86400.0).abs() < 1e-9);
        }
    }

    #[test]
    fn zero_runs_leave_missing_bins() {
        let layout = Layout { swap: false, mask: 0x4, num_sweeps: 1, num_rays: 1, num_bins: 6 };
        let mut bytes = header_records(layout);
        let mut packer = RecordPacker::new(false);
        packer.start_sweep(1, 2015, 0, 0);
        // Header and two samples, a skipped word, then two more samples.
        let mut payload = ray_header(false, 0, 0, 6, 0);
        payload.extend_from_slice(&[80, 81]);
        packer.push_data_run(&payload);
        packer.push_zero_run(1);
        packer.push_data_run(&[84, 85]);
        packer.end_ray();
        bytes.extend_from_slice(&packer.finish());

        let vol = read_volume(&bytes[..]).unwrap();
        match &vol.fields()[0].data {
            FieldData::U1(vals) => assert_eq!(&vals[..6], &[80, 81, 0, 0, 84, 85]),
            _ => panic!("expected one byte storage"),
        }
        // Raw zero decodes as missing.
        assert!(vol.datum(0, 0, 0, 2).is_nan());
        assert_eq!(vol.datum(0, 0, 0, 4), 0.5 * (84.0 - 64.0));
    }

    #[test]
    fn ray_payload_crosses_record_boundary() {
        // 8000 one byte bins: the single ray payload spans one record boundary.
        let layout =
            Layout { swap: false, mask: 0x4, num_sweeps: 1, num_rays: 1, num_bins: 8000 };
        let samples: Vec<u8> = (0..8000u32).map(|b| (b % 251) as u8 + 1).collect();
        let mut bytes = header_records(layout);
        let mut packer = RecordPacker::new(false);
        packer.start_sweep(1, 2015, 0, 0);
        let mut payload = ray_header(false, 0, 0, 8000, 0);
        payload.extend_from_slice(&samples);
        packer.push_data_run(&payload);
        packer.end_ray();
        let data = packer.finish();
        assert!(data.len() > REC_LEN, "payload must span records");
        bytes.extend_from_slice(&data);

        let vol = read_volume(&bytes[..]).unwrap();
        match &vol.fields()[0].data {
            FieldData::U1(vals) => assert_eq!(&vals[..8000], &samples[..]),
            _ => panic!("expected one byte storage"),
        }
        assert!(!vol.truncated);
    }

    #[test]
    fn two_byte_fields_honor_byte_order() {
        let layout = Layout { swap: true, mask: 0x200, num_sweeps: 1, num_rays: 1, num_bins: 2 };
        let mut bytes = header_records(layout);
        let mut packer = RecordPacker::new(true);
        packer.start_sweep(1, 2015, 0, 0);
        let mut payload = ray_header(true, 0, 0, 2, 0);
        // Two DB_DBZ2 samples, stored big endian like the rest of the file.
        let mut sink = ByteSink::with_swap(true);
        sink.put_u16(32768);
        sink.put_u16(32868);
        payload.extend_from_slice(sink.as_slice());
        packer.push_data_run(&payload);
        packer.end_ray();
        bytes.extend_from_slice(&packer.finish());

        let vol = read_volume(&bytes[..]).unwrap();
        assert_eq!(vol.fields()[0].abbrv, "DB_DBZ2");
        assert_eq!(vol.datum(0, 0, 0, 0), 0.0);
        assert!((vol.datum(0, 0, 0, 1) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn extended_headers_carry_ray_times() {
        // Bit 0 (DB_XHDR) plus bit 2 (DB_DBZ).
        let layout = Layout { swap: false, mask: 0x5, num_sweeps: 1, num_rays: 1, num_bins: 2 };
        let mut bytes = header_records(layout);
        let mut packer = RecordPacker::new(false);
        packer.start_sweep(2, 2015, 0, 0);
        // First payload of the ray is the extended header: 2500 ms from sweep start.
        let mut payload = ray_header(false, 0, 0, 2, 0);
        let mut sink = ByteSink::new();
        sink.put_i32(2500);
        payload.extend_from_slice(sink.as_slice());
        packer.push_data_run(&payload);
        packer.end_ray();
        // Second payload holds the reflectivity samples.
        let mut payload = ray_header(false, 0, 0, 2, 0);
        payload.extend_from_slice(&[64, 66]);
        packer.push_data_run(&payload);
        packer.end_ray();
        bytes.extend_from_slice(&packer.finish());

        let vol = read_volume(&bytes[..]).unwrap();
        assert!(vol.xhdr);
        assert_eq!(vol.num_fields(), 1);
        let swp = vol.sweep_hdr(0).unwrap().time;
        let hdr = vol.ray_hdr(0, 0).unwrap();
        assert!((hdr.time - swp - 2.5 / 86400.0).abs() < 1e-9);
        assert_eq!(vol.datum(0, 0, 0, 1), 1.0);
    }

    #[test]
    fn truncated_file_keeps_complete_sweeps() {
        let layout = Layout { swap: false, mask: 0x4, num_sweeps: 2, num_rays: 1, num_bins: 2 };
        let mut bytes = header_records(layout);
        let mut packer = RecordPacker::new(false);
        packer.start_sweep(1, 2015, 0, 0);
        let mut payload = ray_header(false, 0, 0, 2, 0);
        payload.extend_from_slice(&[65, 66]);
        packer.push_data_run(&payload);
        packer.end_ray();
        bytes.extend_from_slice(&packer.finish());
        // The second sweep never arrives.
        let vol = read_volume(&bytes[..]).unwrap();
        assert!(vol.truncated);
        assert_eq!(vol.num_sweeps_actual, 1);
        assert!(vol.sweep_hdr(0).unwrap().ok);
        assert!(!vol.sweep_hdr(1).unwrap().ok);
        assert_eq!(vol.datum(0, 0, 0, 0), 0.5);
    }

    #[test]
    fn out_of_sequence_records_fail() {
        let mut bytes = one_sweep_file(false);
        // Corrupt the record index of the first data record.
        let off = 2 * REC_LEN;
        put_i16(&mut bytes[off..off + 2], 0, 9, false);
        let err = read_volume(&bytes[..]).unwrap_err();
        assert_eq!(err.status(), Status::BadFile);
        assert!(matches!(err, Error::RecordOutOfSequence { .. }));
    }

    #[test]
    fn short_header_is_io_failure() {
        let layout = Layout { swap: false, mask: 0x4, num_sweeps: 1, num_rays: 1, num_bins: 2 };
        let bytes = header_records(layout);
        let err = read_volume(&bytes[..REC_LEN + 100]).unwrap_err();
        assert_eq!(err.status(), Status::IoFail);
    }
}

mod dorade {
    use super::*;
    use rayvol_core::dorade::BAD_I4;

    /// Encode an uncompressed 16-bit RDAT sample body.
    fn plain_body(swap: bool, samples: &[i16]) -> Vec<u8> {
        let mut out = ByteSink::with_swap(swap);
        for &s in samples {
            out.put_i16(s);
        }
        if samples.len() % 2 == 1 {
            out.put_i16(0);
        }
        out.into_inner()
    }

    /// Minimal well formed sweep stream: SSWB, RADD, PARM, CELV, SWIB, then one ray
    /// whose RDAT carries `rdat_body` verbatim.
    fn sweep_bytes(swap: bool, compressed: bool, rdat_body: &[u8]) -> Vec<u8> {
        let num_cells = 3usize;
        let mut out = ByteSink::with_swap(swap);

        // SSWB
        out.put_bytes(b"SSWB");
        out.put_i32(196);
        out.put_i32(0); // last_used
        out.put_i32(1_000_000_000);
        out.put_i32(1_000_000_060);
        out.put_i32(BAD_I4); // sizeof_file
        out.put_i32(0); // compression_flag
        out.put_i32(0);
        out.put_i32(1); // num_parms
        out.put_str_fixed("TEST", 8);
        out.pad_to(196);

        // RADD
        let radd_start = out.len();
        out.put_bytes(b"RADD");
        out.put_i32(300);
        out.put_str_fixed("TEST", 8);
        for _ in 0..8 {
            out.put_f32(0.0);
        }
        out.put_i16(0); // radar type
        out.put_i16(1); // scan mode: PPI
        out.put_f32(0.0);
        out.put_f32(0.0);
        out.put_f32(0.0);
        out.put_i16(1); // num_parms
        out.put_i16(1);
        out.put_i16(if compressed { 1 } else { 0 }); // data_compress
        out.pad_to(radd_start + 300);

        // PARM: scale 100, bias 0, 16-bit, bad -32768.
        let parm_start = out.len();
        out.put_bytes(b"PARM");
        out.put_i32(216);
        out.put_str_fixed("DBZ", 8);
        out.put_str_fixed("Reflectivity", 40);
        out.put_str_fixed("dB", 8);
        out.put_i16(1);
        out.put_i16(1);
        out.put_f32(0.0);
        out.put_i16(0);
        out.put_i16(0);
        out.put_i16(16);
        out.put_i16(2); // DD_16_BITS
        out.put_str_fixed("NONE", 8);
        out.put_f32(0.0);
        out.put_f32(100.0); // scale
        out.put_f32(0.0); // bias
        out.put_i32(-32768); // bad_data
        out.pad_to(parm_start + 200);
        out.put_i32(num_cells as i32);
        out.put_f32(100.0);
        out.put_f32(50.0);
        out.put_f32(0.0);

        // CELV
        out.put_bytes(b"CELV");
        out.put_i32(12 + 4 * num_cells as i32);
        out.put_i32(num_cells as i32);
        for c in 0..num_cells {
            out.put_f32(100.0 + 50.0 * c as f32);
        }

        // An unknown block the reader must skip.
        out.put_bytes(b"XYZW");
        out.put_i32(16);
        out.put_bytes(&[0xAB; 8]);

        // SWIB
        let swib_start = out.len();
        out.put_bytes(b"SWIB");
        out.put_i32(40);
        out.put_str_fixed("TEST", 8);
        out.put_i32(1);
        out.put_i32(1); // num_rays
        out.put_f32(10.0);
        out.put_f32(12.0);
        out.put_f32(0.5);
        out.put_i32(0);
        assert_eq!(out.len(), swib_start + 40);

        // RYIB
        let ryib_start = out.len();
        out.put_bytes(b"RYIB");
        out.put_i32(44);
        out.put_i32(1);
        out.put_i32(252);
        out.put_i16(1);
        out.put_i16(2);
        out.put_i16(3);
        out.put_i16(400);
        out.put_f32(11.0);
        out.put_f32(0.5);
        out.put_f32(250.0);
        out.put_f32(20.0);
        out.put_i32(0);
        assert_eq!(out.len(), ryib_start + 44);

        // ASIB
        let asib_start = out.len();
        out.put_bytes(b"ASIB");
        out.put_i32(80);
        for _ in 0..18 {
            out.put_f32(-999.0);
        }
        assert_eq!(out.len(), asib_start + 80);

        // RDAT
        out.put_bytes(b"RDAT");
        out.put_i32(16 + rdat_body.len() as i32);
        out.put_str_fixed("DBZ", 8);
        out.put_bytes(rdat_body);

        // NULL ends the sweep.
        out.put_bytes(b"NULL");
        out.put_i32(8);
        out.into_inner()
    }

    #[test]
    fn uncompressed_samples_decode_with_scale_and_bias() {
        for &swap in &[false, true] {
            let body = plain_body(swap, &[100, -32768, 200]);
            let bytes = sweep_bytes(swap, false, &body);
            let swp = read_sweep(&bytes[..]).unwrap();
            assert_eq!(swp.num_parms(), 1);
            assert_eq!(swp.num_cells(), Some(3));
            let dat = swp.parm_data("DBZ").unwrap();
            assert_eq!(dat[0], 1.0);
            assert!(dat[1].is_nan());
            assert_eq!(dat[2], 2.0);
            assert_eq!(swp.swib.num_rays, 1);
            assert_eq!(swp.ray_hdrs[0].ryib.millisecond, 400);
            assert_eq!(swp.sensor.radd.scan_mode, rayvol_core::enums::DoradeScanMode::Ppi);
        }
    }

    #[test]
    fn compressed_runs_decode() {
        // Good run of two, then a good run of one holding the bad flag, then the
        // end marker. (A bad run of one cannot be expressed: its code word would
        // collide with the end marker.)
        let mut body = ByteSink::new();
        body.put_u16(0x8000 | 2);
        body.put_i16(150);
        body.put_i16(-50);
        body.put_u16(0x8000 | 1);
        body.put_i16(-32768);
        body.put_u16(1);
        let bytes = sweep_bytes(false, true, &body.into_inner());
        let swp = read_sweep(&bytes[..]).unwrap();
        let dat = swp.parm_data("DBZ").unwrap();
        assert_eq!(dat[0], 1.5);
        assert_eq!(dat[1], -0.5);
        assert!(dat[2].is_nan());
    }

    #[test]
    fn compressed_run_overrun_fails() {
        // Good run of two plus a bad run of two overruns the three cell vector.
        let mut body = ByteSink::new();
        body.put_u16(0x8000 | 2);
        body.put_i16(150);
        body.put_i16(-50);
        body.put_u16(2);
        body.put_u16(1);
        let bytes = sweep_bytes(false, true, &body.into_inner());
        let err = read_sweep(&bytes[..]).unwrap_err();
        assert!(matches!(err, Error::DecompressOverrun { .. }));
    }

    #[test]
    fn short_compressed_ray_fails() {
        // A single good run of two leaves the third cell unwritten.
        let mut body = ByteSink::new();
        body.put_u16(0x8000 | 2);
        body.put_i16(150);
        body.put_i16(-50);
        body.put_u16(1);
        let bytes = sweep_bytes(false, true, &body.into_inner());
        let err = read_sweep(&bytes[..]).unwrap_err();
        assert!(matches!(err, Error::DecompressShort { .. }));
    }

    #[test]
    fn empty_input_fails() {
        let err = read_sweep(&[][..]).unwrap_err();
        assert!(matches!(err, Error::EmptySweepFile));
    }

    #[test]
    fn data_before_descriptors_fails() {
        let mut out = ByteSink::new();
        out.put_bytes(b"RYIB");
        out.put_i32(44);
        out.pad_to(44);
        let err = read_sweep(&out.into_inner()[..]).unwrap_err();
        assert_eq!(err.status(), Status::BadFile);
        assert!(matches!(err, Error::BlockBeforePrereq { .. }));
    }

    #[test]
    fn negative_length_fails_after_retry() {
        let mut out = ByteSink::new();
        out.put_bytes(b"COMM");
        out.put_i32(-20);
        let err = read_sweep(&out.into_inner()[..]).unwrap_err();
        assert!(matches!(err, Error::NegativeBlockLength { .. }));
    }
}
