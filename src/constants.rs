//! Keyword names, extension names and fixed values of the headerlet format

/// Destination observation root name (headerlet primary header)
pub const DESTIM: &str = "DESTIM";

/// Headerlet name
pub const HDRNAME: &str = "HDRNAME";

/// Creation timestamp
pub const DATE: &str = "DATE";

/// Observation root name (science primary header)
pub const ROOTNAME: &str = "ROOTNAME";

/// Version tag of the tool that produced the WCS
pub const VERSION_KEY: &str = "STWCSVER";

/// Velocity aberration plate scale factor
pub const VAFACTOR: &str = "VAFACTOR";

/// Distortion model name recorded on an archived headerlet
pub const SIPNAME: &str = "SIPNAME";

/// Compression flag of an archived headerlet
pub const COMPRESS: &str = "COMPRESS";

/// Distortion coefficients table
pub const IDCTAB: &str = "IDCTAB";

/// Lookup-table distortion reference file
pub const NPOLFILE: &str = "NPOLFILE";

/// Detector-to-image correction reference file
pub const D2IMFILE: &str = "D2IMFILE";

/// Reference-file keywords carried between primary headers
pub const REF_FILE_KEYS: [&str; 3] = [IDCTAB, NPOLFILE, D2IMFILE];

/// Science extension name
pub const SCI: &str = "SCI";

/// Headerlet extension holding one coordinate solution set
pub const SIPWCS: &str = "SIPWCS";

/// Lookup-table distortion array extension
pub const WCSDVARR: &str = "WCSDVARR";

/// Detector-to-image correction array extension
pub const D2IMARR: &str = "D2IMARR";

/// Type tag and extension name of an archived headerlet
pub const HDRLET: &str = "HDRLET";

/// File name suffix of a standalone headerlet
pub const HEADERLET_SUFFIX: &str = "_hdr.fits";

/// Suffix of the default rollback headerlet name
pub const ROLLBACK_SUFFIX: &str = "_orig";

/// Alternate WCS key that is never deleted or packaged
pub const ORIGINAL_WCS_KEY: char = 'O';

/// Timestamp format of `DATE`
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Keywords never copied from a `SIPWCS` header into a science header
pub const COPY_EXCLUDED: [&str; 11] = [
    "XTENSION", "BITPIX", "NAXIS", "PCOUNT", "GCOUNT", "EXTNAME", "EXTVER", "ORIGIN", "INHERIT",
    "DATE", "IRAF-TLM",
];

/// Per-axis linear WCS keyword stems (`CRVAL1`, `CTYPE2A`, ...)
pub const AXIS_KEYS: [&str; 5] = ["CRVAL", "CRPIX", "CTYPE", "CDELT", "CUNIT"];

/// Matrix linear WCS keyword stems (`CD1_2`, `PC2_1A`, ...)
pub const MATRIX_KEYS: [&str; 2] = ["CD", "PC"];

/// Polynomial distortion coefficient prefixes
pub const SIP_PREFIXES: [&str; 4] = ["A", "B", "AP", "BP"];

/// Linear distortion coefficients stored alongside a SIP model
pub const IDC_COEFFS: [&str; 5] = ["OCX10", "OCX11", "OCY10", "OCY11", "IDCSCALE"];

/// Detector-to-image correction keywords of a science header
pub const D2IM_KEYS: [&str; 4] = [D2IMFILE, "AXISCORR", "D2IMEXT", "D2IMERR"];

/// Relative tolerance for comparing linear WCS and SIP terms
pub const COMPARE_RTOL: f64 = 1e-7;

/// Absolute tolerance for comparing linear WCS and SIP terms
pub const COMPARE_ATOL: f64 = 1e-8;
