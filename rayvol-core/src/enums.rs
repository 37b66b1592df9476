//! This contains the enums that appear in the volume and sweep headers.
//!
//! Wire enums follow the IRIS Programmer's Manual (Sigmet) and the NCAR/EOL DORADE
//! format document. As a general rule, enums whose source field can only hold defined
//! values return an error when an invalid value is found; enums from looser header
//! fields fall back to an `Invalid` variant instead, so a strange file can still be
//! inspected.
use num::FromPrimitive;
#[cfg(any(feature = "to_json", feature = "serde"))]
use serde::{Deserialize, Serialize};

use crate::errors::*;

/// The 28 data types defined in the IRIS Programmer's Manual (section 3.3).
///
/// The discriminant order is the order of the bits in the volume data type mask
/// (with a gap after bit 5, see [`DataTypeCode::mask_bit`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[repr(C)]
#[cfg_attr(
    any(feature = "to_json", feature = "serde"),
    derive(Serialize, Deserialize)
)]
pub enum DataTypeCode {
    Xhdr = 0,
    DbT = 1,
    DbZ = 2,
    Vel = 3,
    Width = 4,
    Zdr = 5,
    DbZc = 6,
    DbT2 = 7,
    DbZ2 = 8,
    Vel2 = 9,
    Width2 = 10,
    Zdr2 = 11,
    RainRate2 = 12,
    Kdp = 13,
    Kdp2 = 14,
    PhiDp = 15,
    VelC = 16,
    Sqi = 17,
    RhoHv = 18,
    RhoHv2 = 19,
    DbZc2 = 20,
    VelC2 = 21,
    Sqi2 = 22,
    PhiDp2 = 23,
    LdrH = 24,
    LdrH2 = 25,
    LdrV = 26,
    LdrV2 = 27,
}

/// Number of built in Sigmet data types.
pub const NUM_DATA_TYPES: usize = 28;

impl std::fmt::Display for DataTypeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        write!(f, "{}", self.abbrv())
    }
}

impl DataTypeCode {
    /// NB: We give a result here to make life simpler for ourselves down the line.
    pub fn new(source: u32) -> Result<Self, Error> {
        DataTypeCode::from_u32(source).ok_or(Error::ParseEnum {
            f: "DataTypeCode".to_string(),
            code: source as i64,
        })
    }

    /// The bit testing this type's presence in `curr_data_mask.mask_word_0`.
    ///
    /// Types 0 through 5 occupy bits 0 through 5; bit 6 is unused, so type 6 maps
    /// to bit 7 and types 7 through 27 map to bits 8 through 28.
    /// ```
    /// # use rayvol_core::enums::DataTypeCode;
    /// assert_eq!(DataTypeCode::DbT.mask_bit(), 1 << 1);
    /// assert_eq!(DataTypeCode::DbZc.mask_bit(), 1 << 7);
    /// assert_eq!(DataTypeCode::DbT2.mask_bit(), 1 << 8);
    /// assert_eq!(DataTypeCode::LdrV2.mask_bit(), 1 << 28);
    /// ```
    pub fn mask_bit(self) -> u32 {
        let n = self as u32;
        if n < 6 {
            1 << n
        } else {
            1 << (n + 1)
        }
    }

    /// Iterate over all built in data types in mask bit order.
    pub fn iter() -> impl Iterator<Item = DataTypeCode> {
        (0..NUM_DATA_TYPES as u32).map(|n| DataTypeCode::from_u32(n).unwrap())
    }
}

/// Storage format of one bin of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(C)]
#[cfg_attr(
    any(feature = "to_json", feature = "serde"),
    derive(Serialize, Deserialize)
)]
pub enum StorageFormat {
    /// 1 byte unsigned integer.
    U1 = 0,
    /// 2 byte unsigned integer.
    U2 = 1,
    /// 32-bit float. Used for fields created in memory, never read from a raw file.
    F4 = 2,
    /// Empty, pseudo data type. Only `DB_XHDR` uses this.
    Empty = 3,
}

impl StorageFormat {
    /// The byte width of one stored bin, zero for the pseudo format.
    pub fn bytes_per_bin(self) -> usize {
        match self {
            Self::U1 => 1,
            Self::U2 => 2,
            Self::F4 => 4,
            Self::Empty => 0,
        }
    }
}

/// Multi PRF mode flags from the task DSP info structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(C)]
#[cfg_attr(
    any(feature = "to_json", feature = "serde"),
    derive(Serialize, Deserialize)
)]
pub enum MultiPrfMode {
    OneOne = 0,
    TwoThree = 1,
    ThreeFour = 2,
    FourFive = 3,
}

impl MultiPrfMode {
    pub fn new(source: u16) -> Result<Self, Error> {
        MultiPrfMode::from_u16(source).ok_or(Error::ParseEnum {
            f: "MultiPrfMode".to_string(),
            code: source as i64,
        })
    }
}

impl Default for MultiPrfMode {
    fn default() -> Self {
        MultiPrfMode::OneOne
    }
}

/// Volume scan modes. Refer to the task_scan_info struct in the IRIS Programmer's Manual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(C)]
#[cfg_attr(
    any(feature = "to_json", feature = "serde"),
    derive(Serialize, Deserialize)
)]
pub enum ScanMode {
    /// PPI sector scan.
    PpiSector = 1,
    Rhi = 2,
    Manual = 3,
    /// PPI continuous (full circle) scan.
    PpiContinuous = 4,
    FileScan = 5,
}

impl ScanMode {
    pub fn new(source: u16) -> Result<Self, Error> {
        ScanMode::from_u16(source).ok_or(Error::ParseEnum {
            f: "ScanMode".to_string(),
            code: source as i64,
        })
    }

    pub fn is_ppi(self) -> bool {
        matches!(self, ScanMode::PpiSector | ScanMode::PpiContinuous)
    }

    pub fn is_rhi(self) -> bool {
        self == ScanMode::Rhi
    }
}

impl Default for ScanMode {
    fn default() -> Self {
        ScanMode::PpiSector
    }
}

/// Binary formats a DORADE PARM block may declare for its sample stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(C)]
#[cfg_attr(
    any(feature = "to_json", feature = "serde"),
    derive(Serialize, Deserialize)
)]
pub enum BinaryFormat {
    Int8 = 1,
    Int16 = 2,
    Int24 = 3,
    Float32 = 4,
    Float16 = 5,
}

impl BinaryFormat {
    pub fn new(source: i16) -> Result<Self, Error> {
        BinaryFormat::from_i16(source).ok_or(Error::ParseEnum {
            f: "BinaryFormat".to_string(),
            code: source as i64,
        })
    }
}

impl Default for BinaryFormat {
    fn default() -> Self {
        BinaryFormat::Int16
    }
}

/// Scan mode codes from the DORADE RADD block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(C)]
#[cfg_attr(
    any(feature = "to_json", feature = "serde"),
    derive(Serialize, Deserialize)
)]
pub enum DoradeScanMode {
    Calibration = 0,
    Ppi = 1,
    Coplane = 2,
    Rhi = 3,
    Vertical = 4,
    Target = 5,
    Manual = 6,
    Idle = 7,
    Invalid,
}

impl DoradeScanMode {
    /// NB: Sweep files in the wild carry all sorts of junk here, so this never fails.
    pub fn new(source: i16) -> Self {
        Self::from_i16(source).unwrap_or(Self::Invalid)
    }
}

impl Default for DoradeScanMode {
    fn default() -> Self {
        DoradeScanMode::Invalid
    }
}
