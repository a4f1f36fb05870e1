//! Installing a headerlet's coordinate solutions into a science dataset.
//!
//! Preconditions are all checked before the destination is touched. Once
//! installation starts there is no automatic undo: callers that need
//! atomicity apply to a copy and swap it in on success.

use std::path::Path;

use hdrlet_fits::{Dataset, Header};

use crate::altwcs::{AltWcsRegistry, KeywordAltWcs, is_axis_keyword};
use crate::builder::{BuildOptions, build_headerlet};
use crate::constants::{
    COPY_EXCLUDED, D2IMARR, HDRLET, ROLLBACK_SUFFIX, ROOTNAME, SCI, SIPWCS, WCSDVARR,
};
use crate::error::{HeaderletError, Result};
use crate::hdu::{ExtensionTypeRegistry, HeaderletHdu};
use crate::headerlet::Headerlet;
use crate::ledger::{CorrectionLedger, NoLedger};
use crate::logging::OpLogger;
use crate::refs::{ReferenceFiles, remove_ref_files, update_ref_files};
use crate::strip::strip_extension;

/// Options for applying a headerlet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Archive the destination's current solutions before replacing them.
    pub make_rollback: bool,

    /// `HDRNAME` of the rollback headerlet; defaults to `<root>_orig`.
    pub rollback_name: Option<String>,

    /// Attach the applied headerlet to the destination.
    pub attach: bool,

    /// Record the new solutions in the correction-history ledger.
    pub update_ledger: bool,

    /// Compress attached archives.
    pub compress: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            make_rollback: true,
            rollback_name: None,
            attach: true,
            update_ledger: true,
            compress: false,
        }
    }
}

impl ApplyOptions {
    /// Create apply options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether a rollback headerlet is attached.
    pub fn make_rollback(mut self, make_rollback: bool) -> Self {
        self.make_rollback = make_rollback;
        self
    }

    /// Set the rollback headerlet name.
    pub fn rollback_name(mut self, name: impl Into<String>) -> Self {
        self.rollback_name = Some(name.into());
        self
    }

    /// Set whether the applied headerlet is attached.
    pub fn attach(mut self, attach: bool) -> Self {
        self.attach = attach;
        self
    }

    /// Set whether the ledger is updated.
    pub fn update_ledger(mut self, update_ledger: bool) -> Self {
        self.update_ledger = update_ledger;
        self
    }

    /// Set whether attached archives are compressed.
    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

/// What an apply call changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    /// `HDRNAME` of the applied headerlet
    pub hdrname: String,
    /// Root identity of the destination
    pub destination: String,
    /// Science extensions rewritten
    pub extensions: usize,
    /// Cards removed while stripping
    pub stripped_cards: usize,
    /// Cards copied from `SIPWCS` headers
    pub copied_cards: usize,
    /// Reference files copied into the primary header
    pub ref_files: ReferenceFiles,
    /// Auxiliary array extensions appended
    pub aux_arrays: usize,
    /// Name and `EXTVER` of the attached rollback headerlet
    pub rollback: Option<(String, i64)>,
    /// `EXTVER` of the attached applied headerlet
    pub attached: Option<i64>,
    /// Whether the ledger was updated
    pub ledger_updated: bool,
}

/// Root identity of an apply destination: `ROOTNAME`, else the file name
/// with everything from `.fits` on removed.
pub fn destination_identity(dataset: &Dataset, log: &OpLogger) -> Option<String> {
    if let Some(root) = dataset.primary_header().get_nonblank(ROOTNAME) {
        return Some(root.trim().to_string());
    }
    log.debug(format_args!("Keyword 'ROOTNAME' not found in destination"));
    let name = dataset.path()?.file_name()?.to_string_lossy().into_owned();
    name.split(".fits").next().map(str::to_string)
}

/// Insert position for copied WCS cards: before `PA_APER`, else before the
/// first `HISTORY`, else at the end.
fn insertion_index(header: &Header) -> usize {
    header
        .index_of("PA_APER")
        .or_else(|| header.index_of("HISTORY"))
        .unwrap_or(header.len())
}

fn is_copy_excluded(keyword: &str) -> bool {
    COPY_EXCLUDED.contains(&keyword) || is_axis_keyword(keyword, "NAXIS")
}

/// Applies headerlets to science datasets.
pub struct HeaderletApplier {
    log: OpLogger,
    ledger: Box<dyn CorrectionLedger>,
    alt: Box<dyn AltWcsRegistry>,
    registry: ExtensionTypeRegistry,
}

impl HeaderletApplier {
    /// Create an applier with keyword-based alternate WCS handling and no ledger.
    pub fn new(log: OpLogger) -> Self {
        Self {
            log,
            ledger: Box::new(NoLedger),
            alt: Box::new(KeywordAltWcs),
            registry: ExtensionTypeRegistry::new(),
        }
    }

    /// Use a correction-history ledger.
    pub fn with_ledger(mut self, ledger: Box<dyn CorrectionLedger>) -> Self {
        self.ledger = ledger;
        self
    }

    /// Use a different alternate WCS registry.
    pub fn with_alt_registry(mut self, alt: Box<dyn AltWcsRegistry>) -> Self {
        self.alt = alt;
        self
    }

    /// Use a different extension type registry.
    pub fn with_type_registry(mut self, registry: ExtensionTypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Check that `headerlet` may be applied to `dest`. Nothing is modified.
    pub fn check(&self, headerlet: &Headerlet, dest: &Dataset) -> Result<String> {
        let log = &self.log;
        headerlet.verify()?;

        let found = destination_identity(dest, log).unwrap_or_default();
        if found != headerlet.destim() {
            let destination = dest
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| found.clone());
            log.error(format_args!(
                "Observation {} cannot be updated with headerlet {}",
                destination,
                headerlet.hdrname()
            ));
            return Err(HeaderletError::IdentityMismatch {
                destination,
                headerlet: headerlet.hdrname().to_string(),
                destim: headerlet.destim().to_string(),
                found,
            });
        }

        let numsip = headerlet.sipwcs_count();
        let numsci = dest.count(SCI);
        if numsip != numsci || (1..=numsip as i64).any(|i| dest.find(SCI, i).is_none()) {
            log.error(format_args!(
                "Headerlet {} has {} solutions; destination has {} science extensions",
                headerlet.hdrname(),
                numsip,
                numsci
            ));
            return Err(HeaderletError::ScienceCountMismatch {
                headerlet: numsip,
                destination: numsci,
            });
        }
        Ok(found)
    }

    /// Replace the coordinate solutions of `dest` with those of `headerlet`.
    pub fn apply(
        &mut self,
        headerlet: &Headerlet,
        dest: &mut Dataset,
        options: &ApplyOptions,
    ) -> Result<ApplyReport> {
        let root = self.check(headerlet, dest)?;
        let log = self.log;
        log.info(format_args!(
            "Applying headerlet '{}' to '{}'",
            headerlet.hdrname(),
            root
        ));

        let mut report = ApplyReport {
            hdrname: headerlet.hdrname().to_string(),
            destination: root.clone(),
            ..ApplyReport::default()
        };

        if options.update_ledger && !self.ledger.is_present(dest) {
            log.info(format_args!("Initializing correction-history ledger"));
            self.ledger.initialize(dest)?;
        }

        let mut numhlt = self.registry.count(dest, HDRLET) as i64;
        log.debug(format_args!("Destination holds {} attached headerlets", numhlt));

        let rollback = if options.make_rollback {
            let name = options
                .rollback_name
                .clone()
                .unwrap_or_else(|| format!("{}{}", root, ROLLBACK_SUFFIX));
            let build = BuildOptions::new().dest_identity(root.as_str());
            let previous = build_headerlet(dest, &name, &build, self.alt.as_ref(), &log)?;
            let mut hdu = HeaderletHdu::encode(&previous, options.compress, &log)?;
            numhlt += 1;
            hdu.set_extver(numhlt);
            report.rollback = Some((name, numhlt));
            Some(hdu)
        } else {
            None
        };

        remove_ref_files(dest.primary_mut().header_mut());
        report.ref_files = update_ref_files(
            headerlet.primary_header(),
            dest.primary_mut().header_mut(),
            &log,
        );

        for i in 1..=headerlet.sipwcs_count() as i64 {
            let siphdr = headerlet
                .sipwcs(i)
                .ok_or_else(|| HeaderletError::missing_extension(SIPWCS, i))?
                .header();
            let sci = dest
                .find_mut(SCI, i)
                .ok_or_else(|| HeaderletError::missing_extension(SCI, i))?
                .header_mut();

            report.stripped_cards += strip_extension(sci, self.alt.as_ref(), &log);

            let mut index = insertion_index(sci);
            log.debug(format_args!("Inserting WCS keywords of (SCI, {}) at index {}", i, index));
            for card in siphdr.cards() {
                if is_copy_excluded(card.keyword()) {
                    continue;
                }
                sci.insert(index, card.clone());
                index += 1;
                report.copied_cards += 1;
            }
            report.extensions += 1;
        }

        let removed = dest.remove_named(WCSDVARR) + dest.remove_named(D2IMARR);
        log.debug(format_args!("Removed {} previous auxiliary arrays", removed));
        for aux in [WCSDVARR, D2IMARR] {
            for ext in headerlet.dataset().named(aux) {
                dest.push(ext.clone());
                report.aux_arrays += 1;
            }
        }

        if options.update_ledger {
            self.ledger.record(dest, headerlet)?;
            report.ledger_updated = true;
        }

        if let Some(hdu) = rollback {
            dest.push(hdu);
        }

        if options.attach {
            let mut hdu = HeaderletHdu::encode(headerlet, options.compress, &log)?;
            numhlt += 1;
            hdu.set_extver(numhlt);
            dest.push(hdu);
            report.attached = Some(numhlt);
        }

        log.info(format_args!(
            "Applied headerlet '{}': {} extensions, {} cards copied",
            report.hdrname, report.extensions, report.copied_cards
        ));
        Ok(report)
    }

    /// Apply the headerlet file at `headerlet_path` to the dataset file at
    /// `dest_path`, rewriting the destination in place.
    pub fn apply_file(
        &mut self,
        headerlet_path: impl AsRef<Path>,
        dest_path: impl AsRef<Path>,
        options: &ApplyOptions,
    ) -> Result<ApplyReport> {
        let headerlet = Headerlet::open(headerlet_path, &self.log)?;
        let dest_path = dest_path.as_ref();
        let mut dest = Dataset::open(dest_path)?;
        let report = self.apply(&headerlet, &mut dest, options)?;
        dest.write_to(dest_path, true)?;
        Ok(report)
    }
}
