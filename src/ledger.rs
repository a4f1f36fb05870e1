//! Correction-history ledger interface.
//!
//! The ledger is a persisted record of every coordinate-solution change made
//! to a dataset. Its storage layout belongs to the caller; applying a
//! headerlet only needs the three calls below.

use hdrlet_fits::Dataset;

use crate::error::Result;
use crate::headerlet::Headerlet;

/// Ledger of coordinate-solution changes kept inside a dataset.
pub trait CorrectionLedger {
    /// Whether the dataset already carries a ledger.
    fn is_present(&self, dataset: &Dataset) -> bool;

    /// Create an empty ledger in the dataset, seeded from its current WCS.
    fn initialize(&mut self, dataset: &mut Dataset) -> Result<()>;

    /// Record the solutions of `source` as newly installed in `dataset`.
    fn record(&mut self, dataset: &mut Dataset, source: &Headerlet) -> Result<()>;
}

/// Ledger that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLedger;

impl CorrectionLedger for NoLedger {
    fn is_present(&self, _dataset: &Dataset) -> bool {
        true
    }

    fn initialize(&mut self, _dataset: &mut Dataset) -> Result<()> {
        Ok(())
    }

    fn record(&mut self, _dataset: &mut Dataset, _source: &Headerlet) -> Result<()> {
        Ok(())
    }
}
