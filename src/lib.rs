//! hdrlet - portable coordinate-transform packages for FITS datasets
//!
//! A headerlet captures the complete WCS solution of every science extension
//! of a dataset (linear terms, SIP and lookup-table distortion,
//! detector-to-image correction, velocity aberration) in a small standalone
//! FITS file that can be compared against, applied to, or archived inside
//! another dataset.
//!
//! ```rust,ignore
//! use hdrlet::{ApplyOptions, BuildOptions, OpLogger, apply_headerlet, compare, create_headerlet};
//!
//! let log = OpLogger::new(log::LevelFilter::Info);
//! let hlet = create_headerlet(&source, "test1", &BuildOptions::new(), &log)?;
//! apply_headerlet(&hlet, &mut dest, &ApplyOptions::new(), &log)?;
//! assert!(compare(&hlet, &dest, &log)?);
//! ```

pub mod altwcs;
pub mod apply;
pub mod builder;
pub mod compare;
pub mod config;
pub mod constants;
pub mod error;
pub mod hdu;
pub mod headerlet;
pub mod ledger;
pub mod logging;
pub mod refs;
pub mod solution;
pub mod strip;

#[cfg(test)]
mod tests;

use std::path::Path;

pub use hdrlet_fits::{Card, Dataset, Extension, FitsError, Header, Value};

pub use apply::{ApplyOptions, ApplyReport, HeaderletApplier};
pub use builder::{BuildOptions, HeaderletBuilder};
pub use compare::SolutionComparator;
pub use config::{HeaderletConfig, LogLevel};
pub use error::{HeaderletError, Result};
pub use hdu::{ExtensionTypeRegistry, HeaderletHdu};
pub use headerlet::{Headerlet, HeaderletSummary};
pub use logging::OpLogger;

/// Whether two datasets (science files or headerlets) hold the same
/// coordinate solution.
pub fn compare<A, B>(a: &A, b: &B, log: &OpLogger) -> Result<bool>
where
    A: AsRef<Dataset> + ?Sized,
    B: AsRef<Dataset> + ?Sized,
{
    SolutionComparator::new(*log).compare(a, b)
}

/// [`compare`] on two files.
pub fn compare_files(a: impl AsRef<Path>, b: impl AsRef<Path>, log: &OpLogger) -> Result<bool> {
    let a = Dataset::open(a)?;
    let b = Dataset::open(b)?;
    compare(&a, &b, log)
}

/// Build a headerlet named `name` from a science dataset.
pub fn create_headerlet(
    dataset: &Dataset,
    name: &str,
    options: &BuildOptions,
    log: &OpLogger,
) -> Result<Headerlet> {
    HeaderletBuilder::new(*log).build(dataset, name, options)
}

/// Apply a headerlet to a dataset in memory, without a ledger.
pub fn apply_headerlet(
    headerlet: &Headerlet,
    dest: &mut Dataset,
    options: &ApplyOptions,
    log: &OpLogger,
) -> Result<ApplyReport> {
    HeaderletApplier::new(*log).apply(headerlet, dest, options)
}

/// Apply a headerlet file to a dataset file, rewriting the destination.
pub fn apply_file(
    headerlet_path: impl AsRef<Path>,
    dest_path: impl AsRef<Path>,
    options: &ApplyOptions,
    log: &OpLogger,
) -> Result<ApplyReport> {
    HeaderletApplier::new(*log).apply_file(headerlet_path, dest_path, options)
}
