//! The headerlet: a dataset holding a portable coordinate solution set.

use std::path::{Path, PathBuf};

use hdrlet_fits::{Dataset, Extension, Header};
use serde::Serialize;

use crate::constants::{
    D2IMARR, D2IMFILE, DATE, DESTIM, HDRNAME, HEADERLET_SUFFIX, IDCTAB, NPOLFILE, SIPWCS,
    VAFACTOR, VERSION_KEY, WCSDVARR,
};
use crate::error::{HeaderletError, Result};
use crate::logging::OpLogger;

/// A verified headerlet.
///
/// Extension 0 carries `DESTIM`, `HDRNAME` and `STWCSVER`; it is followed by
/// `SIPWCS` extensions 1..N, then any `WCSDVARR` and `D2IMARR` arrays.
#[derive(Debug, Clone)]
pub struct Headerlet {
    dataset: Dataset,
    hdrname: String,
    destim: String,
    version: String,
}

/// Serializable one-line description of a headerlet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderletSummary {
    /// `HDRNAME`
    pub hdrname: String,
    /// `DESTIM`
    pub destim: String,
    /// `DATE`
    pub date: Option<String>,
    /// Distortion model name
    pub sipname: String,
    /// `IDCTAB`
    pub idctab: Option<String>,
    /// `NPOLFILE`
    pub npolfile: Option<String>,
    /// `D2IMFILE`
    pub d2imfile: Option<String>,
    /// Number of `SIPWCS` extensions
    pub sipwcs: usize,
    /// Number of `WCSDVARR` extensions
    pub wcsdvarr: usize,
    /// Number of `D2IMARR` extensions
    pub d2imarr: usize,
}

/// Check the required keywords of a headerlet primary header.
fn verify_primary(header: &Header) -> Result<()> {
    let mut missing = Vec::new();
    if header.get_nonblank(DESTIM).is_none() {
        missing.push(DESTIM);
    }
    if header.get_nonblank(HDRNAME).is_none() {
        missing.push(HDRNAME);
    }
    if !header.contains(VERSION_KEY) {
        missing.push(VERSION_KEY);
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(HeaderletError::StructuralVerification {
            missing: missing.join(", "),
        })
    }
}

/// Append the headerlet suffix to a path unless it already ends with it.
pub fn headerlet_path(path: &Path) -> PathBuf {
    let name = path.to_string_lossy();
    if name.ends_with(HEADERLET_SUFFIX) {
        path.to_path_buf()
    } else {
        PathBuf::from(format!("{}{}", name, HEADERLET_SUFFIX))
    }
}

impl Headerlet {
    /// Wrap a dataset, verifying its primary header.
    pub fn from_dataset(dataset: Dataset) -> Result<Self> {
        let header = dataset.primary_header();
        verify_primary(header)?;

        let hdrname = header.get_str(HDRNAME).unwrap_or_default().to_string();
        let destim = header.get_str(DESTIM).unwrap_or_default().to_string();
        let version = header
            .get(VERSION_KEY)
            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
            .unwrap_or_default();

        Ok(Self {
            dataset,
            hdrname,
            destim,
            version,
        })
    }

    /// Read and verify a headerlet file.
    pub fn open(path: impl AsRef<Path>, log: &OpLogger) -> Result<Self> {
        let path = path.as_ref();
        log.debug(format_args!("Opening headerlet {:?}", path));
        Self::from_dataset(Dataset::open(path)?)
    }

    /// Parse and verify a serialized headerlet.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_dataset(Dataset::from_bytes(bytes)?)
    }

    /// Serialize to FITS bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.dataset.to_bytes()?)
    }

    /// Write to `path`, appending `_hdr.fits` when the name lacks it.
    /// Returns the path written.
    pub fn write_to(
        &self,
        path: impl AsRef<Path>,
        overwrite: bool,
        log: &OpLogger,
    ) -> Result<PathBuf> {
        self.verify()?;
        let path = headerlet_path(path.as_ref());
        self.dataset.write_to(&path, overwrite)?;
        log.info(format_args!("Wrote headerlet '{}' to {:?}", self.hdrname, path));
        Ok(path)
    }

    /// Re-check the primary header requirements.
    pub fn verify(&self) -> Result<()> {
        verify_primary(self.dataset.primary_header())
    }

    /// `HDRNAME`
    pub fn hdrname(&self) -> &str {
        &self.hdrname
    }

    /// `DESTIM`
    pub fn destim(&self) -> &str {
        &self.destim
    }

    /// `STWCSVER`, blank when it was recorded without a value.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// `DATE`
    pub fn date(&self) -> Option<&str> {
        self.primary_header().get_str(DATE)
    }

    /// `IDCTAB`
    pub fn idctab(&self) -> Option<&str> {
        self.primary_header().get_str(IDCTAB)
    }

    /// `NPOLFILE`
    pub fn npolfile(&self) -> Option<&str> {
        self.primary_header().get_str(NPOLFILE)
    }

    /// `D2IMFILE`
    pub fn d2imfile(&self) -> Option<&str> {
        self.primary_header().get_str(D2IMFILE)
    }

    /// `VAFACTOR` of the first solution, 1.0 when absent.
    pub fn vafactor(&self) -> f64 {
        self.sipwcs(1)
            .and_then(|ext| ext.header().get_float(VAFACTOR))
            .unwrap_or(1.0)
    }

    /// Name of the distortion model: `WCSNAME` of the first solution, then
    /// `WCSNAMEA`, else blank.
    pub fn sipname(&self) -> &str {
        self.sipwcs(1)
            .and_then(|ext| {
                let header = ext.header();
                header
                    .get_nonblank("WCSNAME")
                    .or_else(|| header.get_nonblank("WCSNAMEA"))
            })
            .unwrap_or("")
    }

    /// Primary header.
    pub fn primary_header(&self) -> &Header {
        self.dataset.primary_header()
    }

    /// Number of `SIPWCS` extensions.
    pub fn sipwcs_count(&self) -> usize {
        self.dataset.count(SIPWCS)
    }

    /// `SIPWCS` extension `index` (1-based).
    pub fn sipwcs(&self, index: i64) -> Option<&Extension> {
        self.dataset.find(SIPWCS, index)
    }

    /// The underlying dataset.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Give up the headerlet wrapper.
    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }

    /// Summary of this headerlet.
    pub fn summary(&self) -> HeaderletSummary {
        HeaderletSummary {
            hdrname: self.hdrname.clone(),
            destim: self.destim.clone(),
            date: self.date().map(str::to_string),
            sipname: self.sipname().to_string(),
            idctab: self.idctab().map(str::to_string),
            npolfile: self.npolfile().map(str::to_string),
            d2imfile: self.d2imfile().map(str::to_string),
            sipwcs: self.sipwcs_count(),
            wcsdvarr: self.dataset.count(WCSDVARR),
            d2imarr: self.dataset.count(D2IMARR),
        }
    }
}

impl AsRef<Dataset> for Headerlet {
    fn as_ref(&self) -> &Dataset {
        &self.dataset
    }
}
