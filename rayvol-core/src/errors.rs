//! Error types shared by the reader and writer crates.
//!
//! Every fallible operation in the suite returns [`Error`]. Callers that only care about
//! the coarse outcome can collapse an error to a [`Status`], which mirrors the nine-way
//! status taxonomy of the original tool suite.

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Short read or write, or I/O error from the underlying byte stream.
    IoFail,
    /// Data on disk does not conform to the format.
    BadFile,
    /// Model invariants violated by in-memory operations.
    BadVol,
    /// An allocation-sized request could not be satisfied.
    AllocFail,
    /// Caller-side misuse.
    BadArg,
    /// A sweep, ray, bin or parameter index is out of range.
    RngErr,
    /// Julian/calendar conversion failed for an input time.
    BadTime,
    /// An external collaborator returned failure.
    HelperFail,
}

/// Basic Error types.
#[derive(Debug)]
pub enum Error {
    /// IoError from the std library.
    StdIoError(std::io::Error),
    /// A record or block was shorter than the format requires.
    ShortRead { wanted: usize, got: usize },
    /// Record 1 does not start with the product header identifier, with either byte order.
    BadMagic { value: i16 },
    /// A data record index did not follow its predecessor.
    RecordOutOfSequence { expected: i16, found: i16 },
    /// The first sweep number in the file was unusable.
    SweepOutOfOrder { found: i16 },
    /// Data records declared more sweeps than the headers.
    ExcessSweeps { declared: usize },
    /// Data records declared more rays than the headers.
    ExcessRays { declared: usize },
    /// A ray header declared more bins than the volume allows.
    ExcessBins { num_bins: i32, max: i32 },
    /// A run of data or zeros would overrun the ray buffer.
    RayOverrun,
    /// A storage format that cannot appear in a raw volume was encountered.
    UnknownStorage { abbrv: String },
    /// The operation needs volume headers which have not been loaded.
    NoHeaders,
    /// The named field is a built in Sigmet data type and may not be edited.
    BuiltinType { abbrv: String },
    /// The named field exists but is not stored in an editable format.
    NotEditable { abbrv: String },
    /// No field with this name in the volume.
    FieldNotFound { abbrv: String },
    /// A field with this name already exists in the volume.
    FieldExists { abbrv: String },
    /// The volume field table is full.
    FieldTableFull { max: usize },
    /// A name exceeds the format's length limit.
    NameTooLong { name: String, max: usize },
    /// Scalar division by zero was requested.
    DivideByZero,
    /// Sweep index out of bounds.
    SweepIndexOutOfBounds { s: usize },
    /// Ray index out of bounds.
    RayIndexOutOfBounds { r: usize },
    /// Bin index out of bounds.
    BinIndexOutOfBounds { b: usize },
    /// The volume must be a PPI volume for this operation.
    NotPpi,
    /// The volume must be an RHI volume for this operation.
    NotRhi,
    /// The sweep holds no usable rays.
    NoGoodRays,
    /// The requested dimensions do not fit in memory.
    DimensionOverflow { sweeps: usize, rays: usize, bins: usize },
    /// Julian/calendar conversion failed.
    BadCalendarTime { msg: String },
    /// A DORADE block declared a negative length with either byte order.
    NegativeBlockLength { id: String, len: i32 },
    /// A DORADE block arrived before a block it depends on.
    BlockBeforePrereq { id: &'static str, needs: &'static str },
    /// A DORADE sweep declared more parameters than the format allows.
    TooManyParms { max: usize },
    /// A DORADE sweep held more rays than its ray count.
    TooManyRays { declared: usize },
    /// A PARM declared a binary format the suite cannot process.
    UnsupportedBinaryFormat { parm: String, format: i32 },
    /// Run-length decompression walked out of the cell vector.
    DecompressOverrun { parm: String },
    /// Run-length decompression ended before the cell vector was full.
    DecompressShort { parm: String },
    /// A DORADE file ended without a single block.
    EmptySweepFile,
    /// A projection specifier could not be parsed.
    BadProjection { spec: String },
    /// The projection could not map the given point.
    ProjectionFailed,
    /// An enum field held a source value outside its domain.
    ParseEnum { f: String, code: i64 },
    #[cfg(feature = "to_json")]
    /// Serialisation/Deserialisation error.
    SerdeError(serde_json::Error),
}

impl Error {
    /// Collapse the error to its coarse [`Status`].
    pub fn status(&self) -> Status {
        use self::Error::*;
        match self {
            StdIoError(_) | ShortRead { .. } => Status::IoFail,
            BadMagic { .. }
            | RecordOutOfSequence { .. }
            | SweepOutOfOrder { .. }
            | ExcessSweeps { .. }
            | ExcessRays { .. }
            | ExcessBins { .. }
            | RayOverrun
            | UnknownStorage { .. }
            | NegativeBlockLength { .. }
            | BlockBeforePrereq { .. }
            | TooManyParms { .. }
            | TooManyRays { .. }
            | UnsupportedBinaryFormat { .. }
            | DecompressOverrun { .. }
            | DecompressShort { .. }
            | EmptySweepFile
            | ParseEnum { .. } => Status::BadFile,
            NoHeaders | NotEditable { .. } | NoGoodRays => Status::BadVol,
            DimensionOverflow { .. } => Status::AllocFail,
            BuiltinType { .. }
            | FieldNotFound { .. }
            | FieldExists { .. }
            | FieldTableFull { .. }
            | NameTooLong { .. }
            | DivideByZero
            | NotPpi
            | NotRhi
            | BadProjection { .. } => Status::BadArg,
            SweepIndexOutOfBounds { .. }
            | RayIndexOutOfBounds { .. }
            | BinIndexOutOfBounds { .. } => Status::RngErr,
            BadCalendarTime { .. } => Status::BadTime,
            ProjectionFailed => Status::HelperFail,
            #[cfg(feature = "to_json")]
            SerdeError(_) => Status::BadArg,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::StdIoError(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use self::Error::*;
        match self {
            StdIoError(x) => write!(fmt, "{}", x),
            ShortRead { wanted, got } => write!(fmt, "Needed {} bytes but only {} were available", wanted, got),
            BadMagic { value } => write!(fmt, "Bad magic number {} (should be 27)", value),
            RecordOutOfSequence { expected, found } => write!(fmt, "Raw product file records out of sequence (expected {}, found {})", expected, found),
            SweepOutOfOrder { found } => write!(fmt, "Sweep number {} out of order in raw product file", found),
            ExcessSweeps { declared } => write!(fmt, "Volume has more sweeps than the {} reported in headers", declared),
            ExcessRays { declared } => write!(fmt, "Volume has more rays than the {} reported in headers", declared),
            ExcessBins { num_bins, max } => write!(fmt, "Ray declared {} bins, but the volume stores at most {}", num_bins, max),
            RayOverrun => write!(fmt, "Record provided more data than could fit in a ray"),
            UnknownStorage { abbrv } => write!(fmt, "Data type {} has no raw storage format", abbrv),
            NoHeaders => write!(fmt, "Volume headers have not been loaded"),
            BuiltinType { abbrv } => write!(fmt, "{} is a built in Sigmet data type. No modification allowed", abbrv),
            NotEditable { abbrv } => write!(fmt, "Field {} is not stored in an editable format", abbrv),
            FieldNotFound { abbrv } => write!(fmt, "No field of {} in volume", abbrv),
            FieldExists { abbrv } => write!(fmt, "Field {} already exists in volume", abbrv),
            FieldTableFull { max } => write!(fmt, "Adding the field would exceed the maximum field count of {}", max),
            NameTooLong { name, max } => write!(fmt, "Name '{}' is longer than {} characters", name, max),
            DivideByZero => write!(fmt, "Division by zero"),
            SweepIndexOutOfBounds { s } => write!(fmt, "Sweep index {} out of bounds", s),
            RayIndexOutOfBounds { r } => write!(fmt, "Ray index {} out of bounds", r),
            BinIndexOutOfBounds { b } => write!(fmt, "Bin index {} out of bounds", b),
            NotPpi => write!(fmt, "Volume must be PPI"),
            NotRhi => write!(fmt, "Volume must be RHI"),
            NoGoodRays => write!(fmt, "Sweep has no usable rays"),
            DimensionOverflow { sweeps, rays, bins } => write!(fmt, "Cannot allocate a {} x {} x {} data array", sweeps, rays, bins),
            BadCalendarTime { msg } => write!(fmt, "Calendar conversion failed: {}", msg),
            NegativeBlockLength { id, len } => write!(fmt, "Negative size ({}) for {} block", len, id),
            BlockBeforePrereq { id, needs } => write!(fmt, "{} block found before {}", id, needs),
            TooManyParms { max } => write!(fmt, "Sweep cannot have more than {} parameters", max),
            TooManyRays { declared } => write!(fmt, "Sweep file has more rays than the ray count of {}", declared),
            UnsupportedBinaryFormat { parm, format } => write!(fmt, "Parameter {} uses binary format {} which is not supported", parm, format),
            DecompressOverrun { parm } => write!(fmt, "Run went out of the data array while decompressing a ray of {}", parm),
            DecompressShort { parm } => write!(fmt, "Decompression of a ray of {} finished before end of ray", parm),
            EmptySweepFile => write!(fmt, "File has no blocks"),
            BadProjection { spec } => write!(fmt, "Could not parse projection specifier '{}'", spec),
            ProjectionFailed => write!(fmt, "Projection could not map the point"),
            ParseEnum { f, code } => write!(fmt, "Could not parse source ({}) to {}", code, f),
            #[cfg(feature = "to_json")]
            SerdeError(x) => write!(fmt, "{}", x),
        }
    }
}

impl From<Error> for String {
    fn from(e: Error) -> String {
        e.to_string()
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use self::Error::*;
        match self {
            StdIoError(x) => x.source(),
            #[cfg(feature = "to_json")]
            SerdeError(x) => x.source(),
            _ => None,
        }
    }
}
