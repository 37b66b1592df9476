//! The in-memory model of a Sigmet raw volume.
//!
//! A [`Volume`] owns the two header records, a sweep header per declared sweep, a ray
//! header per declared ray, and up to [`MAX_FIELDS`](crate::MAX_FIELDS) fields. Every
//! field spans the same `[sweep][ray][bin]` grid, stored as one flat buffer indexed
//! with `(s * num_rays + r) * num_bins + b`. Raw fields keep their on-disk 1 or 2 byte
//! storage and convert to physical values on access; fields created in memory store
//! 32-bit floats and may be edited through the field algebra.
use fnv::FnvHashMap;

use crate::data_types::{bin4_to_rad, identity, rad_to_bin2, ConvContext, StorToComp};
use crate::enums::{DataTypeCode, MultiPrfMode, ScanMode, StorageFormat};
use crate::errors::Error;
use crate::geog::{beam_height, lat_in_domain, lon_in_domain, step, FOUR_THIRD, R_EARTH};
use crate::headers::{IngestHeader, ProductHdr, ScanInfo};
use crate::{DESCR_LEN, MAX_FIELDS, NAME_LEN};

/// Header of one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SweepHeader {
    /// If true, the sweep's first ingest data header parsed cleanly.
    pub ok: bool,
    /// Sweep start time, fractional julian day.
    pub time: f64,
    /// Fixed sweep angle in radians.
    pub angle: f64,
}

/// Header of one ray.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RayHeader {
    /// A ray is usable iff its recorded bin count is positive.
    pub ok: bool,
    /// Ray time, fractional julian day.
    pub time: f64,
    /// Number of bins recorded for this ray; at most the volume bin count.
    pub num_bins: i32,
    /// Tilt at the start of the ray, radians in [-pi/2, pi/2].
    pub tilt0: f64,
    /// Tilt at the end of the ray.
    pub tilt1: f64,
    /// Azimuth at the start of the ray, radians in [-pi, pi].
    pub az0: f64,
    /// Azimuth at the end of the ray.
    pub az1: f64,
}

/// Per-bin storage of one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldData {
    /// 1 byte unsigned samples, as stored in the raw file.
    U1(Vec<u8>),
    /// 2 byte unsigned samples, as stored in the raw file.
    U2(Vec<u16>),
    /// 32-bit float samples. Editable; NaN marks missing data.
    F4(Vec<f32>),
}

impl Default for FieldData {
    fn default() -> Self {
        FieldData::F4(Vec::new())
    }
}

impl FieldData {
    pub fn storage(&self) -> StorageFormat {
        match self {
            FieldData::U1(_) => StorageFormat::U1,
            FieldData::U2(_) => StorageFormat::U2,
            FieldData::F4(_) => StorageFormat::F4,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FieldData::U1(v) => v.len(),
            FieldData::U2(v) => v.len(),
            FieldData::F4(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The raw storage value at `i`, widened to a double.
    pub fn raw(&self, i: usize) -> f64 {
        match self {
            FieldData::U1(v) => v[i] as f64,
            FieldData::U2(v) => v[i] as f64,
            FieldData::F4(v) => v[i] as f64,
        }
    }
}

/// One field of a volume: descriptor plus its data array.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name, e.g. `DB_DBZ` for a built in type.
    pub abbrv: String,
    pub descr: String,
    pub unit: String,
    /// The built in Sigmet data type this field holds, if any.
    pub sig_type: Option<DataTypeCode>,
    /// Conversion from the raw storage value to a physical measurement.
    pub stor_to_comp: StorToComp,
    pub data: FieldData,
}

impl Field {
    /// Physical value of the sample at flat index `i`.
    pub fn comp(&self, i: usize, ctx: &ConvContext) -> f64 {
        (self.stor_to_comp)(self.data.raw(i), ctx)
    }
}

/// Per-ray azimuth and tilt limits for rendering, see [`Volume::ray_geometry`].
#[derive(Debug, Clone, PartialEq)]
pub struct RayGeometry {
    /// Range to the start of the first bin, meters.
    pub r0: f64,
    /// Bin length, meters.
    pub dr: f64,
    pub az0: Vec<f64>,
    pub az1: Vec<f64>,
    pub tilt0: Vec<f64>,
    pub tilt1: Vec<f64>,
}

/// A Sigmet raw product volume.
#[derive(Debug, Clone, Default)]
pub struct Volume {
    /// Record 1 of the raw file.
    pub product_hdr: ProductHdr,
    /// Record 2 of the raw file.
    pub ingest_hdr: IngestHeader,
    /// True when extended ray headers are present in the file.
    pub xhdr: bool,
    /// The Sigmet data types in the raw file, in mask order, including `DB_XHDR`.
    pub types_in_file: Vec<DataTypeCode>,
    /// True when the file held fewer sweeps than its headers declared.
    pub truncated: bool,
    /// Number of complete sweeps actually present.
    pub num_sweeps_actual: usize,
    /// True when the volume in memory differs from the volume on disk.
    pub modified: bool,
    has_headers: bool,
    sweep_hdrs: Vec<SweepHeader>,
    ray_hdrs: Vec<RayHeader>,
    fields: Vec<Field>,
    index: FnvHashMap<String, usize>,
}

impl Volume {
    pub fn new() -> Self {
        Volume::default()
    }

    /// Make a volume with the given grid and no data fields. Every sweep and ray is
    /// marked usable with the full bin count, which makes the volume a blank canvas
    /// for the field algebra.
    /// ```
    /// # use rayvol_core::volume::Volume;
    /// let mut vol = Volume::with_dimensions(1, 4, 3).unwrap();
    /// vol.new_field("Z", "Test field", "dB").unwrap();
    /// vol.set_value("Z", 10.0).unwrap();
    /// vol.log10_field("Z").unwrap();
    /// assert_eq!(vol.datum(0, 0, 2, 1), 1.0);
    /// ```
    pub fn with_dimensions(
        num_sweeps: usize,
        num_rays: usize,
        num_bins: usize,
    ) -> Result<Self, Error> {
        let mut vol = Volume::new();
        vol.ingest_hdr.ic.num_sweeps = num_sweeps as i16;
        vol.ingest_hdr.ic.num_rays = num_rays as u16;
        vol.ingest_hdr.tc.tni.num_sweeps = num_sweeps as i16;
        vol.ingest_hdr.tc.tri.num_bins_out = num_bins as i16;
        vol.alloc_headers()?;
        for hdr in &mut vol.sweep_hdrs {
            hdr.ok = true;
        }
        for hdr in &mut vol.ray_hdrs {
            hdr.ok = true;
            hdr.num_bins = num_bins as i32;
        }
        vol.num_sweeps_actual = num_sweeps;
        Ok(vol)
    }

    /// Install the two header records, allocating sweep and ray header arrays sized
    /// from them. All sweeps and rays start out marked unusable; the reader flips
    /// them as data records arrive.
    pub fn set_headers(&mut self, ph: ProductHdr, ih: IngestHeader) -> Result<(), Error> {
        self.product_hdr = ph;
        self.ingest_hdr = ih;
        self.alloc_headers()
    }

    fn alloc_headers(&mut self) -> Result<(), Error> {
        let (sweeps, rays, bins) = self.dims();
        sweeps
            .checked_mul(rays)
            .and_then(|n| n.checked_mul(bins))
            .and_then(|n| n.checked_mul(4))
            .ok_or(Error::DimensionOverflow { sweeps, rays, bins })?;
        self.sweep_hdrs = vec![SweepHeader::default(); sweeps];
        self.ray_hdrs = vec![RayHeader::default(); sweeps * rays];
        self.has_headers = true;
        Ok(())
    }

    pub fn has_headers(&self) -> bool {
        self.has_headers
    }

    fn dims(&self) -> (usize, usize, usize) {
        (
            self.ingest_hdr.tc.tni.num_sweeps.max(0) as usize,
            self.ingest_hdr.ic.num_rays as usize,
            self.ingest_hdr.tc.tri.num_bins_out.max(0) as usize,
        )
    }

    /// Number of sweeps the headers declare.
    pub fn num_sweeps(&self) -> usize {
        self.dims().0
    }

    /// Number of rays per sweep.
    pub fn num_rays(&self) -> usize {
        self.dims().1
    }

    /// Number of output bins per ray.
    pub fn num_bins(&self) -> usize {
        self.dims().2
    }

    pub fn scan_mode(&self) -> ScanMode {
        self.ingest_hdr.tc.tni.scan_mode
    }

    pub fn is_ppi(&self) -> bool {
        self.scan_mode().is_ppi()
    }

    pub fn is_rhi(&self) -> bool {
        self.scan_mode().is_rhi()
    }

    /// Radar longitude in radians, in [-pi, pi].
    pub fn radar_lon(&self) -> f64 {
        lon_in_domain(bin4_to_rad(self.ingest_hdr.ic.longitude), 0.0)
    }

    /// Radar latitude in radians.
    pub fn radar_lat(&self) -> f64 {
        lat_in_domain(bin4_to_rad(self.ingest_hdr.ic.latitude))
    }

    /// Radar wavelength in meters.
    pub fn wave_len(&self) -> f64 {
        1.0e-4 * self.ingest_hdr.tc.tmi.wave_len as f64
    }

    /// The Nyquist velocity in m/s, folding the multi PRF stages into the
    /// single PRF value.
    pub fn nyquist_velocity(&self) -> f64 {
        let unamb = 0.25 * self.wave_len() * self.ingest_hdr.tc.tdi.prf as f64;
        match self.ingest_hdr.tc.tdi.multi_prf_mode {
            MultiPrfMode::OneOne => unamb,
            MultiPrfMode::TwoThree => 3.0 * unamb,
            MultiPrfMode::ThreeFour => 4.0 * unamb,
            MultiPrfMode::FourFive => 5.0 * unamb,
        }
    }

    /// The quantities storage-to-measurement conversions need from this volume.
    pub fn conv_context(&self) -> ConvContext {
        ConvContext {
            v_nyquist: self.nyquist_velocity(),
            wave_len: self.wave_len(),
            prf: self.ingest_hdr.tc.tdi.prf as f64,
        }
    }

    /// Distance in meters along the beam to the start of bin `b`.
    pub fn bin_start(&self, b: usize) -> f64 {
        0.01 * (self.ingest_hdr.tc.tri.rng_1st_bin as f64
            + b as f64 * self.ingest_hdr.tc.tri.step_out as f64)
    }

    /// Bin length in meters.
    pub fn bin_step(&self) -> f64 {
        0.01 * self.ingest_hdr.tc.tri.step_out as f64
    }

    pub fn sweep_hdrs(&self) -> &[SweepHeader] {
        &self.sweep_hdrs
    }

    pub fn sweep_hdr(&self, s: usize) -> Result<&SweepHeader, Error> {
        self.sweep_hdrs.get(s).ok_or(Error::SweepIndexOutOfBounds { s })
    }

    pub fn sweep_hdr_mut(&mut self, s: usize) -> Result<&mut SweepHeader, Error> {
        self.sweep_hdrs.get_mut(s).ok_or(Error::SweepIndexOutOfBounds { s })
    }

    pub fn ray_hdr(&self, s: usize, r: usize) -> Result<&RayHeader, Error> {
        let (sweeps, rays, _) = self.dims();
        if s >= sweeps {
            return Err(Error::SweepIndexOutOfBounds { s });
        }
        if r >= rays {
            return Err(Error::RayIndexOutOfBounds { r });
        }
        Ok(&self.ray_hdrs[s * rays + r])
    }

    pub fn ray_hdr_mut(&mut self, s: usize, r: usize) -> Result<&mut RayHeader, Error> {
        let (sweeps, rays, _) = self.dims();
        if s >= sweeps {
            return Err(Error::SweepIndexOutOfBounds { s });
        }
        if r >= rays {
            return Err(Error::RayIndexOutOfBounds { r });
        }
        Ok(&mut self.ray_hdrs[s * rays + r])
    }

    /// True unless both the sweep and the ray parsed as usable.
    pub fn bad_ray(&self, s: usize, r: usize) -> bool {
        match (self.sweep_hdr(s), self.ray_hdr(s, r)) {
            (Ok(sh), Ok(rh)) => !(sh.ok && rh.ok),
            _ => true,
        }
    }

    /// Index of the sweep whose fixed angle is closest to `angle`.
    pub fn near_sweep(&self, angle: f64) -> Option<usize> {
        self.sweep_hdrs[..self.num_sweeps_actual.min(self.sweep_hdrs.len())]
            .iter()
            .enumerate()
            .filter(|(_, hdr)| hdr.ok)
            .min_by(|(_, a), (_, b)| {
                let da = lon_in_domain(a.angle - angle, 0.0).abs();
                let db = lon_in_domain(b.angle - angle, 0.0).abs();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(s, _)| s)
    }

    /// Flat index of bin `(s, r, b)`.
    pub fn grid_index(&self, s: usize, r: usize, b: usize) -> usize {
        let (_, rays, bins) = self.dims();
        (s * rays + r) * bins + b
    }

    /// Flat index of the first bin of ray `(s, r)`.
    pub fn ray_offset(&self, s: usize, r: usize) -> usize {
        self.grid_index(s, r, 0)
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_index(&self, abbrv: &str) -> Option<usize> {
        self.index.get(abbrv).copied()
    }

    pub fn field(&self, abbrv: &str) -> Option<&Field> {
        self.field_index(abbrv).map(|y| &self.fields[y])
    }

    /// Mutable access to a field's data array. The reader uses this to install
    /// decoded samples; the descriptor itself stays fixed.
    pub fn field_data_mut(&mut self, y: usize) -> Option<&mut FieldData> {
        self.fields.get_mut(y).map(|f| &mut f.data)
    }

    /// Install a field for a built in data type, allocating its zeroed data array.
    /// Fails for pseudo types with no storage.
    pub fn install_builtin_field(&mut self, code: DataTypeCode) -> Result<usize, Error> {
        if !self.has_headers {
            return Err(Error::NoHeaders);
        }
        let info = code.info();
        if self.index.contains_key(info.abbrv) {
            return Err(Error::FieldExists { abbrv: info.abbrv.to_string() });
        }
        if self.fields.len() >= MAX_FIELDS {
            return Err(Error::FieldTableFull { max: MAX_FIELDS });
        }
        let (sweeps, rays, bins) = self.dims();
        let n = sweeps * rays * bins;
        let data = match info.storage {
            StorageFormat::U1 => FieldData::U1(vec![0; n]),
            StorageFormat::U2 => FieldData::U2(vec![0; n]),
            StorageFormat::F4 | StorageFormat::Empty => {
                return Err(Error::UnknownStorage { abbrv: info.abbrv.to_string() })
            }
        };
        let y = self.fields.len();
        self.fields.push(Field {
            abbrv: info.abbrv.to_string(),
            descr: info.descr.to_string(),
            unit: info.unit.to_string(),
            sig_type: Some(code),
            stor_to_comp: info.stor_to_comp,
            data,
        });
        self.index.insert(info.abbrv.to_string(), y);
        Ok(y)
    }

    /// Physical value of bin `(s, r, b)` of field `y`, or NaN when any index is out
    /// of the volume's range.
    pub fn datum(&self, y: usize, s: usize, r: usize, b: usize) -> f64 {
        let (sweeps, rays, _) = self.dims();
        if y >= self.fields.len() || s >= sweeps || r >= rays {
            return f64::NAN;
        }
        let hdr = &self.ray_hdrs[s * rays + r];
        if b as i32 >= hdr.num_bins {
            return f64::NAN;
        }
        let ctx = self.conv_context();
        self.fields[y].comp(self.grid_index(s, r, b), &ctx)
    }

    /// Physical values of all recorded bins of ray `(s, r)` of field `y`.
    pub fn ray_data(&self, y: usize, s: usize, r: usize) -> Result<Vec<f64>, Error> {
        let (sweeps, rays, _) = self.dims();
        if y >= self.fields.len() {
            return Err(Error::FieldNotFound { abbrv: format!("#{}", y) });
        }
        if s >= sweeps {
            return Err(Error::SweepIndexOutOfBounds { s });
        }
        if r >= rays {
            return Err(Error::RayIndexOutOfBounds { r });
        }
        let hdr = &self.ray_hdrs[s * rays + r];
        let nbins = hdr.num_bins.max(0) as usize;
        let ctx = self.conv_context();
        let start = self.ray_offset(s, r);
        Ok((0..nbins).map(|b| self.fields[y].comp(start + b, &ctx)).collect())
    }

    // ------------------------------------------------------------------
    // Field algebra
    // ------------------------------------------------------------------

    /// Add a new editable float field, initialised to NaN everywhere.
    pub fn new_field(&mut self, abbrv: &str, descr: &str, unit: &str) -> Result<(), Error> {
        if !self.has_headers {
            return Err(Error::NoHeaders);
        }
        if abbrv.is_empty() || abbrv.len() > NAME_LEN {
            return Err(Error::NameTooLong { name: abbrv.to_string(), max: NAME_LEN });
        }
        if DataTypeCode::from_abbrv(abbrv).is_some() {
            return Err(Error::BuiltinType { abbrv: abbrv.to_string() });
        }
        if self.index.contains_key(abbrv) {
            return Err(Error::FieldExists { abbrv: abbrv.to_string() });
        }
        if self.fields.len() >= MAX_FIELDS {
            return Err(Error::FieldTableFull { max: MAX_FIELDS });
        }
        let (sweeps, rays, bins) = self.dims();
        let y = self.fields.len();
        self.fields.push(Field {
            abbrv: abbrv.to_string(),
            descr: descr.chars().take(DESCR_LEN).collect(),
            unit: unit.chars().take(NAME_LEN).collect(),
            sig_type: None,
            stor_to_comp: identity,
            data: FieldData::F4(vec![f32::NAN; sweeps * rays * bins]),
        });
        self.index.insert(abbrv.to_string(), y);
        self.modified = true;
        Ok(())
    }

    /// Remove a field and its storage, keeping the remaining fields dense.
    pub fn del_field(&mut self, abbrv: &str) -> Result<(), Error> {
        let y = self
            .field_index(abbrv)
            .ok_or_else(|| Error::FieldNotFound { abbrv: abbrv.to_string() })?;
        self.fields.remove(y);
        self.index.clear();
        for (i, field) in self.fields.iter().enumerate() {
            self.index.insert(field.abbrv.clone(), i);
        }
        self.modified = true;
        Ok(())
    }

    /// Find the index of an editable field, rejecting built in type names outright.
    fn editable_field_index(&self, abbrv: &str) -> Result<usize, Error> {
        if DataTypeCode::from_abbrv(abbrv).is_some() {
            return Err(Error::BuiltinType { abbrv: abbrv.to_string() });
        }
        let y = self
            .field_index(abbrv)
            .ok_or_else(|| Error::FieldNotFound { abbrv: abbrv.to_string() })?;
        match self.fields[y].data {
            FieldData::F4(_) => Ok(y),
            _ => Err(Error::NotEditable { abbrv: abbrv.to_string() }),
        }
    }

    /// The flat extent `(start, len)` of every usable ray.
    fn ok_ray_extents(&self) -> Vec<(usize, usize)> {
        let (sweeps, rays, _) = self.dims();
        let mut extents = Vec::new();
        for s in 0..sweeps {
            if !self.sweep_hdrs[s].ok {
                continue;
            }
            for r in 0..rays {
                let hdr = &self.ray_hdrs[s * rays + r];
                if hdr.ok {
                    extents.push((self.ray_offset(s, r), hdr.num_bins.max(0) as usize));
                }
            }
        }
        extents
    }

    /// Apply `f` to every usable bin of an editable field.
    fn map_editable<F: Fn(f32) -> f32>(&mut self, abbrv: &str, f: F) -> Result<(), Error> {
        let y = self.editable_field_index(abbrv)?;
        let extents = self.ok_ray_extents();
        if let FieldData::F4(vals) = &mut self.fields[y].data {
            for (start, n) in extents {
                for v in &mut vals[start..start + n] {
                    *v = f(*v);
                }
            }
        }
        self.modified = true;
        Ok(())
    }

    /// The whole grid of a field converted to physical values.
    fn field_physical(&self, y: usize) -> Vec<f32> {
        let ctx = self.conv_context();
        let field = &self.fields[y];
        (0..field.data.len()).map(|i| field.comp(i, &ctx) as f32).collect()
    }

    /// Combine a source field into an editable destination field, bin by bin.
    /// A leading `-` on the source name negates the source operand.
    fn combine<F: Fn(f32, f32) -> f32>(
        &mut self,
        dst: &str,
        src: &str,
        f: F,
    ) -> Result<(), Error> {
        let (src_name, sgn) = match src.strip_prefix('-') {
            Some(stripped) => (stripped, -1.0f32),
            None => (src, 1.0f32),
        };
        let yd = self.editable_field_index(dst)?;
        let ys = self
            .field_index(src_name)
            .ok_or_else(|| Error::FieldNotFound { abbrv: src_name.to_string() })?;
        let src_vals = self.field_physical(ys);
        let extents = self.ok_ray_extents();
        if let FieldData::F4(vals) = &mut self.fields[yd].data {
            for (start, n) in extents {
                for i in start..start + n {
                    vals[i] = f(vals[i], sgn * src_vals[i]);
                }
            }
        }
        self.modified = true;
        Ok(())
    }

    /// Assign `v` to every usable bin of an editable field.
    pub fn set_value(&mut self, abbrv: &str, v: f32) -> Result<(), Error> {
        self.map_editable(abbrv, |_| v)
    }

    /// Assign each bin its distance along the beam in meters, measured to the bin
    /// center.
    pub fn set_beam_range(&mut self, abbrv: &str) -> Result<(), Error> {
        let y = self.editable_field_index(abbrv)?;
        let dr = self.bin_step();
        let bin0 = self.bin_start(0) + dr / 2.0;
        let bins = self.dims().2.max(1);
        let extents = self.ok_ray_extents();
        if let FieldData::F4(vals) = &mut self.fields[y].data {
            for (start, n) in extents {
                for i in start..start + n {
                    let b = i % bins;
                    vals[i] = (bin0 + b as f64 * dr) as f32;
                }
            }
        }
        self.modified = true;
        Ok(())
    }

    /// Fill `dst` with `src` converted to physical values; missing source bins
    /// become NaN.
    pub fn copy_field(&mut self, dst: &str, src: &str) -> Result<(), Error> {
        self.combine(dst, src, |_, b| b)
    }

    pub fn add_value(&mut self, abbrv: &str, v: f32) -> Result<(), Error> {
        self.map_editable(abbrv, |x| x + v)
    }

    pub fn sub_value(&mut self, abbrv: &str, v: f32) -> Result<(), Error> {
        self.map_editable(abbrv, |x| x - v)
    }

    pub fn mul_value(&mut self, abbrv: &str, v: f32) -> Result<(), Error> {
        self.map_editable(abbrv, |x| x * v)
    }

    /// Scalar division; dividing by zero is rejected.
    pub fn div_value(&mut self, abbrv: &str, v: f32) -> Result<(), Error> {
        if v == 0.0 {
            return Err(Error::DivideByZero);
        }
        self.map_editable(abbrv, |x| x / v)
    }

    pub fn add_field(&mut self, dst: &str, src: &str) -> Result<(), Error> {
        self.combine(dst, src, |a, b| a + b)
    }

    pub fn sub_field(&mut self, dst: &str, src: &str) -> Result<(), Error> {
        self.combine(dst, src, |a, b| a - b)
    }

    pub fn mul_field(&mut self, dst: &str, src: &str) -> Result<(), Error> {
        self.combine(dst, src, |a, b| a * b)
    }

    pub fn div_field(&mut self, dst: &str, src: &str) -> Result<(), Error> {
        self.combine(dst, src, |a, b| a / b)
    }

    /// Take the base 10 logarithm of every usable bin; values that are not positive
    /// become NaN.
    pub fn log10_field(&mut self, abbrv: &str) -> Result<(), Error> {
        self.map_editable(abbrv, |x| if x > 0.0 { x.log10() } else { f32::NAN })
    }

    /// Shift every embedded timestamp by `dt_secs` seconds, preserving calendar
    /// validity through a julian day round trip.
    pub fn incr_time(&mut self, dt_secs: f64) -> Result<(), Error> {
        let dt = dt_secs / 86400.0;
        self.product_hdr.pc.gen_tm.incr(dt)?;
        self.product_hdr.pc.ingest_sweep_tm.incr(dt)?;
        self.product_hdr.pc.ingest_file_tm.incr(dt)?;
        self.ingest_hdr.ic.vol_start_time.incr(dt)?;
        self.ingest_hdr.tc.tei.data_time.incr(dt)?;
        let dt_i = dt_secs.round() as i64;
        let tsi = &mut self.ingest_hdr.tc.tsi;
        if tsi.start_time >= 0 {
            tsi.start_time = ((tsi.start_time as i64 + dt_i).rem_euclid(86400)) as i32;
        }
        if tsi.stop_time >= 0 {
            tsi.stop_time = ((tsi.stop_time as i64 + dt_i).rem_euclid(86400)) as i32;
        }
        if tsi.time_last_run >= 0 {
            tsi.time_last_run = ((tsi.time_last_run as i64 + dt_i).rem_euclid(86400)) as i32;
        }
        if tsi.rel_day_last_run >= 0 {
            tsi.rel_day_last_run += (dt_i / 86400) as i32;
        }
        for hdr in &mut self.sweep_hdrs {
            hdr.time += dt;
        }
        for hdr in &mut self.ray_hdrs {
            hdr.time += dt;
        }
        self.modified = true;
        Ok(())
    }

    /// Rotate the volume in azimuth by `daz` radians. The scan geometry in the task
    /// headers and the per-ray azimuths all move; ray azimuths stay canonical in
    /// [-pi, pi].
    pub fn shift_az(&mut self, daz: f64) -> Result<(), Error> {
        if !self.has_headers {
            return Err(Error::NoHeaders);
        }
        let idaz = rad_to_bin2(lon_in_domain(daz, std::f64::consts::PI));
        match &mut self.ingest_hdr.tc.tni.scan_info {
            ScanInfo::Rhi(info) => {
                for az in &mut info.az {
                    *az = az.wrapping_add(idaz);
                }
            }
            ScanInfo::Ppi(info) => {
                info.left_az = info.left_az.wrapping_add(idaz);
                info.right_az = info.right_az.wrapping_add(idaz);
            }
            ScanInfo::File(info) => {
                info.az0 = info.az0.wrapping_add(idaz);
            }
            ScanInfo::Manual(_) => {}
        }
        for hdr in &mut self.ray_hdrs {
            hdr.az0 = lon_in_domain(hdr.az0 + daz, 0.0);
            hdr.az1 = lon_in_domain(hdr.az1 + daz, 0.0);
        }
        self.modified = true;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Bin geometry
    // ------------------------------------------------------------------

    fn check_bin(&self, s: usize, r: usize, b: usize) -> Result<(), Error> {
        if !self.has_headers {
            return Err(Error::NoHeaders);
        }
        let (sweeps, rays, _) = self.dims();
        if s >= sweeps {
            return Err(Error::SweepIndexOutOfBounds { s });
        }
        if r >= rays {
            return Err(Error::RayIndexOutOfBounds { r });
        }
        if b as i32 >= self.ray_hdrs[s * rays + r].num_bins {
            return Err(Error::BinIndexOutOfBounds { b });
        }
        Ok(())
    }

    /// Arc along the ground subtended by a beam of length `r_beam` at tilt `tilt`,
    /// in radians at radius `re`.
    fn ground_arc(r_beam: f64, tilt: f64, re: f64) -> f64 {
        (r_beam * tilt.cos()
            / (re * re + r_beam * r_beam + 2.0 * re * r_beam * tilt.sin()).sqrt())
        .clamp(-1.0, 1.0)
        .asin()
    }

    /// Map plane corners of one PPI bin, in order (az0, r0), (az0, r1), (az1, r1),
    /// (az1, r0).
    pub fn ppi_bin_outline<F>(
        &self,
        s: usize,
        r: usize,
        b: usize,
        lonlat_to_xy: F,
    ) -> Result<[(f64, f64); 4], Error>
    where
        F: Fn(f64, f64) -> Option<(f64, f64)>,
    {
        if !self.is_ppi() {
            return Err(Error::NotPpi);
        }
        self.check_bin(s, r, b)?;
        let hdr = self.ray_hdr(s, r)?;
        let tilt = (hdr.tilt0 + hdr.tilt1) / 2.0;
        let r0 = self.bin_start(b);
        let r1 = r0 + self.bin_step();
        let arc0 = Self::ground_arc(r0, tilt, R_EARTH);
        let arc1 = Self::ground_arc(r1, tilt, R_EARTH);
        let (rlon, rlat) = (self.radar_lon(), self.radar_lat());
        let mut corners = [(0.0, 0.0); 4];
        for (i, (az, arc)) in [
            (hdr.az0, arc0),
            (hdr.az0, arc1),
            (hdr.az1, arc1),
            (hdr.az1, arc0),
        ]
        .iter()
        .enumerate()
        {
            let (lon, lat) = step(rlon, rlat, *az, *arc);
            corners[i] = lonlat_to_xy(lon, lat).ok_or(Error::ProjectionFailed)?;
        }
        Ok(corners)
    }

    /// Cross section corners of one RHI bin as (distance along ground, height),
    /// both in meters, under 4/3 earth refraction.
    pub fn rhi_bin_outline(&self, s: usize, r: usize, b: usize) -> Result<[(f64, f64); 4], Error> {
        if !self.is_rhi() {
            return Err(Error::NotRhi);
        }
        self.check_bin(s, r, b)?;
        let hdr = self.ray_hdr(s, r)?;
        let (tilt0, tilt1) = if hdr.tilt1 < hdr.tilt0 {
            (hdr.tilt1, hdr.tilt0)
        } else {
            (hdr.tilt0, hdr.tilt1)
        };
        let r0 = self.bin_start(b);
        let r1 = r0 + self.bin_step();
        let re = FOUR_THIRD * R_EARTH;
        let corner = |r_beam: f64, tilt: f64| {
            let h = beam_height(r_beam, tilt, re);
            let ground = re * (r_beam * tilt.cos() / (re + h)).asin();
            (ground, h)
        };
        Ok([
            corner(r0, tilt0),
            corner(r1, tilt0),
            corner(r1, tilt1),
            corner(r0, tilt1),
        ])
    }

    /// Bounding box of a PPI sweep in map coordinates, as
    /// `(x_min, x_max, y_min, y_max)`. Walks the far end of every usable ray and
    /// includes the radar location itself.
    pub fn ppi_bounds<F>(&self, s: usize, lonlat_to_xy: F) -> Result<(f64, f64, f64, f64), Error>
    where
        F: Fn(f64, f64) -> Option<(f64, f64)>,
    {
        if !self.is_ppi() {
            return Err(Error::NotPpi);
        }
        if s >= self.num_sweeps_actual || !self.sweep_hdr(s)?.ok {
            return Err(Error::SweepIndexOutOfBounds { s });
        }
        let (_, rays, bins) = self.dims();
        let ray_len = self.bin_start(0) + (bins as f64 + 0.5) * self.bin_step();
        let (rlon, rlat) = (self.radar_lon(), self.radar_lat());
        let mut bounds = BoundsAcc::new();
        if let Some((x, y)) = lonlat_to_xy(rlon, rlat) {
            bounds.add(x, y);
        }
        for r in 0..rays {
            let hdr = &self.ray_hdrs[s * rays + r];
            if !hdr.ok {
                continue;
            }
            let az = (hdr.az0 + lon_in_domain(hdr.az1, hdr.az0)) / 2.0;
            let tilt = (hdr.tilt0 + hdr.tilt1) / 2.0;
            let arc = Self::ground_arc(ray_len, tilt, R_EARTH);
            let (lon, lat) = step(rlon, rlat, az, arc);
            if let Some((x, y)) = lonlat_to_xy(lon, lat) {
                bounds.add(x, y);
            }
        }
        bounds.finish()
    }

    /// Bounding box of an RHI sweep as `(ground_min, ground_max, height_min,
    /// height_max)` in meters, under 4/3 earth refraction. The radar location
    /// (0, 0) is included.
    pub fn rhi_bounds(&self, s: usize) -> Result<(f64, f64, f64, f64), Error> {
        if !self.is_rhi() {
            return Err(Error::NotRhi);
        }
        if s >= self.num_sweeps_actual || !self.sweep_hdr(s)?.ok {
            return Err(Error::SweepIndexOutOfBounds { s });
        }
        let (_, rays, bins) = self.dims();
        let ray_len = self.bin_start(0) + (bins as f64 + 0.5) * self.bin_step();
        let re = FOUR_THIRD * R_EARTH;
        let mut bounds = BoundsAcc::new();
        bounds.add(0.0, 0.0);
        for r in 0..rays {
            let hdr = &self.ray_hdrs[s * rays + r];
            if !hdr.ok {
                continue;
            }
            let tilt = (hdr.tilt0 + hdr.tilt1) / 2.0;
            let h = beam_height(ray_len, tilt, re);
            let ground = re * (ray_len * tilt.cos() / (re + h)).asin();
            bounds.add(ground, h);
        }
        bounds.finish()
    }

    /// Per-ray azimuth and tilt limits of a sweep. With `fill` set, the limits of
    /// each ray are averaged with its usable neighbours so adjacent rays share an
    /// edge; unusable rays come back as NaN either way.
    pub fn ray_geometry(&self, s: usize, fill: bool) -> Result<RayGeometry, Error> {
        if !self.has_headers {
            return Err(Error::NoHeaders);
        }
        let (_, rays, _) = self.dims();
        if s >= self.num_sweeps_actual || !self.sweep_hdr(s)?.ok {
            return Err(Error::SweepIndexOutOfBounds { s });
        }
        let mut geom = RayGeometry {
            r0: self.bin_start(0),
            dr: self.bin_step(),
            az0: vec![f64::NAN; rays],
            az1: vec![f64::NAN; rays],
            tilt0: vec![f64::NAN; rays],
            tilt1: vec![f64::NAN; rays],
        };
        let hdr = |r: usize| &self.ray_hdrs[s * rays + r];
        let good: Vec<usize> = (0..rays).filter(|&r| hdr(r).ok).collect();
        if !fill {
            for &r in &good {
                geom.az0[r] = hdr(r).az0;
                geom.az1[r] = hdr(r).az1;
                geom.tilt0[r] = hdr(r).tilt0;
                geom.tilt1[r] = hdr(r).tilt1;
            }
            return Ok(geom);
        }
        if good.len() < 2 {
            return Err(Error::NoGoodRays);
        }
        for (k, &r) in good.iter().enumerate() {
            let h = hdr(r);
            if self.is_rhi() {
                geom.az0[r] = h.az0;
                geom.az1[r] = h.az1;
                geom.tilt0[r] = match k {
                    0 => h.tilt0,
                    _ => (hdr(good[k - 1]).tilt1 + h.tilt0) / 2.0,
                };
                geom.tilt1[r] = if k + 1 < good.len() {
                    (h.tilt1 + hdr(good[k + 1]).tilt0) / 2.0
                } else {
                    h.tilt1
                };
            } else {
                geom.tilt0[r] = h.tilt0;
                geom.tilt1[r] = h.tilt1;
                geom.az0[r] = match k {
                    0 => h.az0,
                    _ => {
                        let prev = lon_in_domain(hdr(good[k - 1]).az1, h.az0);
                        (prev + h.az0) / 2.0
                    }
                };
                geom.az1[r] = if k + 1 < good.len() {
                    let next = lon_in_domain(hdr(good[k + 1]).az0, h.az1);
                    (h.az1 + next) / 2.0
                } else {
                    h.az1
                };
            }
        }
        Ok(geom)
    }
}

/// Running min/max accumulator for the sweep bounding boxes.
struct BoundsAcc {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    seen: bool,
}

impl BoundsAcc {
    fn new() -> Self {
        BoundsAcc {
            x_min: f64::MAX,
            x_max: f64::MIN,
            y_min: f64::MAX,
            y_max: f64::MIN,
            seen: false,
        }
    }

    fn add(&mut self, x: f64, y: f64) {
        self.x_min = self.x_min.min(x);
        self.x_max = self.x_max.max(x);
        self.y_min = self.y_min.min(y);
        self.y_max = self.y_max.max(y);
        self.seen = true;
    }

    fn finish(self) -> Result<(f64, f64, f64, f64), Error> {
        if !self.seen {
            return Err(Error::NoGoodRays);
        }
        Ok((self.x_min, self.x_max, self.y_min, self.y_max))
    }
}
