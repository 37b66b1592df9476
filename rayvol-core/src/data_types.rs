//! The catalogue of built in Sigmet data types.
//!
//! Each entry binds an abbreviation to its storage width and to the function that maps
//! the raw storage integer onto a physical measurement. Formulas follow the IRIS
//! Programmer's Manual section 3.3. Missing data is represented as IEEE NaN; the raw
//! value 0, and any raw value above the type's valid range, decode to NaN.
use fnv::FnvHashMap;

use crate::enums::{DataTypeCode, StorageFormat};
use crate::errors::Error;
use crate::{DESCR_LEN, NAME_LEN};

const TWO_16: f64 = 65536.0;
const TWO_32: f64 = 4294967296.0;

/// Convert a 4-byte binary angle to radians.
pub fn bin4_to_rad(a: u32) -> f64 {
    a as f64 / TWO_32 * 2.0 * std::f64::consts::PI
}

/// Convert a 2-byte binary angle to radians.
pub fn bin2_to_rad(a: u16) -> f64 {
    a as f64 / TWO_16 * 2.0 * std::f64::consts::PI
}

/// Convert radians to a 4-byte binary angle.
pub fn rad_to_bin4(a: f64) -> u32 {
    (a * TWO_32 / (2.0 * std::f64::consts::PI)).round() as i64 as u32
}

/// Convert radians to a 2-byte binary angle.
pub fn rad_to_bin2(a: f64) -> u16 {
    (a * TWO_16 / (2.0 * std::f64::consts::PI)).round() as i64 as u16
}

/// Volume quantities a storage-to-measurement conversion may need.
///
/// Velocity is folded by the Nyquist velocity, width and KDP depend on the radar
/// wavelength and PRF; the containing volume supplies all three.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConvContext {
    /// Nyquist velocity in m/s.
    pub v_nyquist: f64,
    /// Radar wavelength in meters.
    pub wave_len: f64,
    /// Pulse repetition frequency in Hertz.
    pub prf: f64,
}

/// Functions of this type convert storage values to measurement values.
pub type StorToComp = fn(f64, &ConvContext) -> f64;

/// The conversion for fields that already hold physical values.
pub fn identity(v: f64, _ctx: &ConvContext) -> f64 {
    v
}

/// One entry of the data type catalogue.
#[derive(Clone, Copy)]
pub struct DataTypeInfo {
    /// Short name, e.g. `DB_DBZ`.
    pub abbrv: &'static str,
    pub descr: &'static str,
    pub unit: &'static str,
    pub storage: StorageFormat,
    pub stor_to_comp: StorToComp,
}

impl DataTypeCode {
    pub fn info(self) -> &'static DataTypeInfo {
        &INFO[self as usize]
    }

    pub fn abbrv(self) -> &'static str {
        self.info().abbrv
    }

    pub fn descr(self) -> &'static str {
        self.info().descr
    }

    pub fn unit(self) -> &'static str {
        self.info().unit
    }

    pub fn storage(self) -> StorageFormat {
        self.info().storage
    }

    pub fn stor_to_comp(self) -> StorToComp {
        self.info().stor_to_comp
    }

    /// Look up a built in data type by its abbreviation.
    /// ```
    /// # use rayvol_core::enums::DataTypeCode;
    /// assert_eq!(DataTypeCode::from_abbrv("DB_DBZ"), Some(DataTypeCode::DbZ));
    /// assert_eq!(DataTypeCode::from_abbrv("DB_KDP2"), Some(DataTypeCode::Kdp2));
    /// assert_eq!(DataTypeCode::from_abbrv("MY_FIELD"), None);
    /// ```
    pub fn from_abbrv(a: &str) -> Option<DataTypeCode> {
        use DataTypeCode::*;
        let y = match a {
            "DB_XHDR" => Xhdr,
            "DB_DBT" => DbT,
            "DB_DBZ" => DbZ,
            "DB_VEL" => Vel,
            "DB_WIDTH" => Width,
            "DB_ZDR" => Zdr,
            "DB_DBZC" => DbZc,
            "DB_DBT2" => DbT2,
            "DB_DBZ2" => DbZ2,
            "DB_VEL2" => Vel2,
            "DB_WIDTH2" => Width2,
            "DB_ZDR2" => Zdr2,
            "DB_RAINRATE2" => RainRate2,
            "DB_KDP" => Kdp,
            "DB_KDP2" => Kdp2,
            "DB_PHIDP" => PhiDp,
            "DB_VELC" => VelC,
            "DB_SQI" => Sqi,
            "DB_RHOHV" => RhoHv,
            "DB_RHOHV2" => RhoHv2,
            "DB_DBZC2" => DbZc2,
            "DB_VELC2" => VelC2,
            "DB_SQI2" => Sqi2,
            "DB_PHIDP2" => PhiDp2,
            "DB_LDRH" => LdrH,
            "DB_LDRH2" => LdrH2,
            "DB_LDRV" => LdrV,
            "DB_LDRV2" => LdrV2,
            _ => return None,
        };
        Some(y)
    }
}

static INFO: [DataTypeInfo; 28] = [
    DataTypeInfo { abbrv: "DB_XHDR", descr: "Extended header", unit: "none", storage: StorageFormat::Empty, stor_to_comp: conv_none },
    DataTypeInfo { abbrv: "DB_DBT", descr: "Uncorrected reflectivity (1 byte)", unit: "dBZ", storage: StorageFormat::U1, stor_to_comp: conv_db1 },
    DataTypeInfo { abbrv: "DB_DBZ", descr: "Reflectivity (1 byte)", unit: "dBZ", storage: StorageFormat::U1, stor_to_comp: conv_db1 },
    DataTypeInfo { abbrv: "DB_VEL", descr: "Velocity (1 byte)", unit: "m/s", storage: StorageFormat::U1, stor_to_comp: conv_vel1 },
    DataTypeInfo { abbrv: "DB_WIDTH", descr: "Width (1 byte)", unit: "m/s", storage: StorageFormat::U1, stor_to_comp: conv_width1 },
    DataTypeInfo { abbrv: "DB_ZDR", descr: "Differential reflectivity (1 byte)", unit: "dBZ", storage: StorageFormat::U1, stor_to_comp: conv_zdr1 },
    DataTypeInfo { abbrv: "DB_DBZC", descr: "Corrected reflectivity (1 byte)", unit: "dBZ", storage: StorageFormat::U1, stor_to_comp: conv_db1 },
    DataTypeInfo { abbrv: "DB_DBT2", descr: "Uncorrected reflectivity (2 byte)", unit: "dBZ", storage: StorageFormat::U2, stor_to_comp: conv_cds2 },
    DataTypeInfo { abbrv: "DB_DBZ2", descr: "Reflectivity (2 byte)", unit: "dBZ", storage: StorageFormat::U2, stor_to_comp: conv_cds2 },
    DataTypeInfo { abbrv: "DB_VEL2", descr: "Velocity (2 byte)", unit: "m/s", storage: StorageFormat::U2, stor_to_comp: conv_cds2 },
    DataTypeInfo { abbrv: "DB_WIDTH2", descr: "Width (2 byte)", unit: "m/s", storage: StorageFormat::U2, stor_to_comp: conv_width2 },
    DataTypeInfo { abbrv: "DB_ZDR2", descr: "Differential reflectivity (2 byte)", unit: "dBZ", storage: StorageFormat::U2, stor_to_comp: conv_cds2 },
    DataTypeInfo { abbrv: "DB_RAINRATE2", descr: "Rainfall rate (2 byte)", unit: "mm/hr", storage: StorageFormat::U2, stor_to_comp: conv_rainrate2 },
    DataTypeInfo { abbrv: "DB_KDP", descr: "Specific differential phase (1 byte)", unit: "deg/km", storage: StorageFormat::U1, stor_to_comp: conv_kdp1 },
    DataTypeInfo { abbrv: "DB_KDP2", descr: "Specific differential phase (2 byte)", unit: "deg/km", storage: StorageFormat::U2, stor_to_comp: conv_cds2 },
    DataTypeInfo { abbrv: "DB_PHIDP", descr: "Differential phase (1 byte)", unit: "degrees", storage: StorageFormat::U1, stor_to_comp: conv_phidp1 },
    DataTypeInfo { abbrv: "DB_VELC", descr: "Unfolded velocity (1 byte)", unit: "m/s", storage: StorageFormat::U1, stor_to_comp: conv_velc1 },
    DataTypeInfo { abbrv: "DB_SQI", descr: "Signal quality index (1 byte)", unit: "none", storage: StorageFormat::U1, stor_to_comp: conv_sqi1 },
    DataTypeInfo { abbrv: "DB_RHOHV", descr: "RhoHV (1 byte)", unit: "none", storage: StorageFormat::U1, stor_to_comp: conv_sqi1 },
    DataTypeInfo { abbrv: "DB_RHOHV2", descr: "RhoHV (2 byte)", unit: "none", storage: StorageFormat::U2, stor_to_comp: conv_frac2 },
    DataTypeInfo { abbrv: "DB_DBZC2", descr: "Corrected reflectivity (2 byte)", unit: "dBZ", storage: StorageFormat::U2, stor_to_comp: conv_cds2 },
    DataTypeInfo { abbrv: "DB_VELC2", descr: "Unfolded velocity (2 byte)", unit: "m/s", storage: StorageFormat::U2, stor_to_comp: conv_cds2 },
    DataTypeInfo { abbrv: "DB_SQI2", descr: "Signal quality index (2 byte)", unit: "none", storage: StorageFormat::U2, stor_to_comp: conv_frac2 },
    DataTypeInfo { abbrv: "DB_PHIDP2", descr: "Differential phase (2 byte)", unit: "degrees", storage: StorageFormat::U2, stor_to_comp: conv_phidp2 },
    DataTypeInfo { abbrv: "DB_LDRH", descr: "Horizontal linear depolarization ratio (1 byte)", unit: "none", storage: StorageFormat::U1, stor_to_comp: conv_ldr1 },
    DataTypeInfo { abbrv: "DB_LDRH2", descr: "Horizontal linear depolarization ratio (2 byte)", unit: "none", storage: StorageFormat::U2, stor_to_comp: conv_cds2 },
    DataTypeInfo { abbrv: "DB_LDRV", descr: "Vertical linear depolarization ratio (1 byte)", unit: "none", storage: StorageFormat::U1, stor_to_comp: conv_ldr1 },
    DataTypeInfo { abbrv: "DB_LDRV2", descr: "Vertical linear depolarization ratio (2 byte)", unit: "none", storage: StorageFormat::U2, stor_to_comp: conv_cds2 },
];

fn conv_none(_v: f64, _ctx: &ConvContext) -> f64 {
    f64::NAN
}

/// 1 byte reflectivity family: 0.5 dB steps offset by 64, clipped at 95.5.
fn conv_db1(v: f64, _ctx: &ConvContext) -> f64 {
    if v == 0.0 {
        f64::NAN
    } else if v > 255.0 {
        95.5
    } else {
        0.5 * (v - 64.0)
    }
}

fn conv_vel1(v: f64, ctx: &ConvContext) -> f64 {
    if v == 0.0 || v > 255.0 {
        f64::NAN
    } else {
        ctx.v_nyquist * (v - 128.0) / 127.0
    }
}

fn conv_width1(v: f64, ctx: &ConvContext) -> f64 {
    if v == 0.0 || v > 255.0 {
        f64::NAN
    } else {
        0.25 * ctx.wave_len * ctx.prf * v / 256.0
    }
}

fn conv_zdr1(v: f64, _ctx: &ConvContext) -> f64 {
    if v == 0.0 || v > 255.0 {
        f64::NAN
    } else {
        (v - 128.0) / 16.0
    }
}

fn conv_kdp1(v: f64, ctx: &ConvContext) -> f64 {
    let wave_len_cm = 100.0 * ctx.wave_len;
    if v == 0.0 || v > 255.0 {
        f64::NAN
    } else if v > 128.0 {
        0.25 * 600f64.powf((v - 129.0) / 126.0) / wave_len_cm
    } else if v == 128.0 {
        0.0
    } else {
        -0.25 * 600f64.powf((127.0 - v) / 126.0) / wave_len_cm
    }
}

fn conv_phidp1(v: f64, _ctx: &ConvContext) -> f64 {
    if v == 0.0 || v > 255.0 {
        f64::NAN
    } else {
        180.0 / 254.0 * (v - 1.0)
    }
}

fn conv_velc1(v: f64, _ctx: &ConvContext) -> f64 {
    if v == 0.0 || v > 255.0 {
        f64::NAN
    } else {
        75.0 / 127.0 * (v - 128.0)
    }
}

fn conv_sqi1(v: f64, _ctx: &ConvContext) -> f64 {
    if v == 0.0 || v > 254.0 {
        f64::NAN
    } else {
        ((v - 1.0) / 253.0).sqrt()
    }
}

fn conv_ldr1(v: f64, _ctx: &ConvContext) -> f64 {
    if v == 0.0 || v > 255.0 {
        f64::NAN
    } else {
        0.2 * (v - 1.0) - 45.0
    }
}

/// 2 byte centered decibel or speed scale, 0.01 steps offset by 32768.
fn conv_cds2(v: f64, _ctx: &ConvContext) -> f64 {
    if v == 0.0 || v > 65535.0 {
        f64::NAN
    } else {
        0.01 * (v - 32768.0)
    }
}

fn conv_width2(v: f64, _ctx: &ConvContext) -> f64 {
    if v == 0.0 || v > 65535.0 {
        f64::NAN
    } else {
        0.01 * v
    }
}

fn conv_frac2(v: f64, _ctx: &ConvContext) -> f64 {
    if v == 0.0 || v > 65535.0 {
        f64::NAN
    } else {
        (v - 1.0) / 65535.0
    }
}

fn conv_phidp2(v: f64, _ctx: &ConvContext) -> f64 {
    if v == 0.0 || v > 65535.0 {
        f64::NAN
    } else {
        360.0 / 65534.0 * (v - 1.0)
    }
}

/// Rain rate packs a 4 bit exponent over a 12 bit mantissa.
fn conv_rainrate2(v: f64, _ctx: &ConvContext) -> f64 {
    if v == 0.0 || v > 65535.0 {
        return f64::NAN;
    }
    let w = v as u32;
    let e = (w & 0xF000) >> 12;
    let m = w & 0x0FFF;
    if e == 0 {
        0.0001 * (m as f64 - 1.0)
    } else {
        0.0001 * ((((0x1000 | m) as u64) << (e - 1)) as f64 - 1.0)
    }
}

/// A user defined data type registered alongside the built in catalogue.
#[derive(Debug, Clone, PartialEq)]
pub struct UserType {
    pub descr: String,
    pub unit: String,
}

/// The data type registry: the 28 built in types plus user defined float types.
///
/// User defined types always store their bins as floats and convert one to one.
/// ```
/// # use rayvol_core::data_types::Registry;
/// let mut reg = Registry::new();
/// reg.add_data_type("SNR", "Signal to noise ratio", "dB").unwrap();
/// assert!(reg.get("SNR").is_some());
/// // Built in abbreviations may not be redefined.
/// assert!(reg.add_data_type("DB_DBZ", "", "dBZ").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    user: FnvHashMap<String, UserType>,
}

impl Registry {
    pub fn new() -> Self {
        Registry { user: FnvHashMap::default() }
    }

    /// Declare a new float-storage field type.
    pub fn add_data_type(&mut self, name: &str, descr: &str, unit: &str) -> Result<(), Error> {
        if name.len() > NAME_LEN {
            return Err(Error::NameTooLong { name: name.to_string(), max: NAME_LEN });
        }
        if DataTypeCode::from_abbrv(name).is_some() {
            return Err(Error::BuiltinType { abbrv: name.to_string() });
        }
        if self.user.contains_key(name) {
            return Err(Error::FieldExists { abbrv: name.to_string() });
        }
        self.user.insert(
            name.to_string(),
            UserType {
                descr: descr.chars().take(DESCR_LEN).collect(),
                unit: unit.chars().take(NAME_LEN).collect(),
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&UserType> {
        self.user.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<UserType> {
        self.user.remove(name)
    }
}
