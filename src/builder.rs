//! Headerlet construction from a science dataset.

use std::path::PathBuf;

use chrono::Local;
use hdrlet_fits::{Card, Dataset, Extension, Header};

use crate::altwcs::{AltWcsRegistry, KeywordAltWcs, is_axis_keyword};
use crate::constants::{
    D2IMARR, DATE, DATE_FORMAT, DESTIM, HDRNAME, ORIGINAL_WCS_KEY, ROOTNAME, SCI, SIPWCS,
    VAFACTOR, VERSION_KEY, WCSDVARR,
};
use crate::error::{HeaderletError, Result};
use crate::headerlet::Headerlet;
use crate::logging::OpLogger;
use crate::refs::{ReferenceFiles, update_ref_files};
use crate::solution::{PRIMARY_KEY, solution_cards};

/// Options for building a headerlet.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Destination identity; defaults to `ROOTNAME`, then `DESTIM`, of the source.
    pub dest_identity: Option<String>,

    /// Also write the headerlet to this path (`_hdr.fits` appended if missing).
    pub output: Option<PathBuf>,

    /// Replace an existing output file.
    pub overwrite: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            dest_identity: None,
            output: None,
            overwrite: true,
        }
    }
}

impl BuildOptions {
    /// Create build options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the destination identity.
    pub fn dest_identity(mut self, identity: impl Into<String>) -> Self {
        self.dest_identity = Some(identity.into());
        self
    }

    /// Write the result to a file.
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Set whether an existing output file is replaced.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Extracts the coordinate solutions of a dataset into a headerlet.
pub struct HeaderletBuilder {
    log: OpLogger,
    alt: Box<dyn AltWcsRegistry>,
}

impl HeaderletBuilder {
    /// Create a builder using keyword-based alternate WCS detection.
    pub fn new(log: OpLogger) -> Self {
        Self {
            log,
            alt: Box::new(KeywordAltWcs),
        }
    }

    /// Use a different alternate WCS registry.
    pub fn with_alt_registry(mut self, alt: Box<dyn AltWcsRegistry>) -> Self {
        self.alt = alt;
        self
    }

    /// Build a headerlet named `name` from `dataset`.
    pub fn build(
        &self,
        dataset: &Dataset,
        name: &str,
        options: &BuildOptions,
    ) -> Result<Headerlet> {
        build_headerlet(dataset, name, options, self.alt.as_ref(), &self.log)
    }
}

/// Build a headerlet with an explicit alternate WCS registry and logger.
pub(crate) fn build_headerlet(
    dataset: &Dataset,
    name: &str,
    options: &BuildOptions,
    alt: &dyn AltWcsRegistry,
    log: &OpLogger,
) -> Result<Headerlet> {
    log.info(format_args!("Creating headerlet '{}'", name));

    let name = name.trim();
    if name.is_empty() {
        log.error(format_args!("Required keyword 'HDRNAME' not given"));
        return Err(HeaderletError::MissingName);
    }

    let source_primary = dataset.primary_header();
    let destim = match options.dest_identity.as_deref().map(str::trim) {
        Some(identity) if !identity.is_empty() => identity.to_string(),
        _ => source_primary
            .get_nonblank(ROOTNAME)
            .or_else(|| source_primary.get_nonblank(DESTIM))
            .map(|s| s.trim().to_string())
            .ok_or_else(|| {
                log.error(format_args!("Required keyword 'DESTIM' not found"));
                HeaderletError::MissingIdentity
            })?,
    };

    let first_sci = dataset
        .find(SCI, 1)
        .ok_or_else(|| HeaderletError::missing_extension(SCI, 1))?;

    let alt_keys: Vec<char> = alt
        .keys(first_sci.header())
        .into_iter()
        .filter(|k| *k != ORIGINAL_WCS_KEY)
        .collect();
    log.debug(format_args!("Alternate WCS keys to package: {:?}", alt_keys));

    let mut primary = Extension::new_primary();
    let refs = {
        let header = primary.header_mut();
        header.push(Card::new(DESTIM, destim.as_str(), "Destination observation root name"));
        header.push(Card::new(HDRNAME, name, "Headerlet name"));
        header.push(Card::new(
            DATE,
            Local::now().format(DATE_FORMAT).to_string(),
            "Date FITS file was generated",
        ));
        header.push(source_primary.card(VERSION_KEY).cloned().unwrap_or_else(|| {
            Card::new(VERSION_KEY, "", "Version of STWCS used to update the WCS")
        }));
        let refs = update_ref_files(source_primary, header, log);
        header.set(
            VAFACTOR,
            first_sci.header().get_float(VAFACTOR).unwrap_or(1.0),
            "",
        );
        refs
    };

    let mut extensions = vec![primary];
    let numsci = dataset.count(SCI);
    log.debug(format_args!("Number of 'SCI' extensions is {}", numsci));

    for e in 1..=numsci as i64 {
        let sci = dataset
            .find(SCI, e)
            .ok_or_else(|| HeaderletError::missing_extension(SCI, e))?;
        extensions.push(sipwcs_extension(sci.header(), e, &alt_keys, refs, log)?);
    }

    for aux in [WCSDVARR, D2IMARR] {
        for ext in dataset.named(aux) {
            extensions.push(ext.clone());
        }
    }

    let headerlet = Headerlet::from_dataset(Dataset::from_extensions(extensions)?)?;
    if let Some(output) = &options.output {
        headerlet.write_to(output, options.overwrite, log)?;
    }
    Ok(headerlet)
}

/// The `SIPWCS` extension packaging science extension `e`.
fn sipwcs_extension(
    sci: &Header,
    e: i64,
    alt_keys: &[char],
    refs: ReferenceFiles,
    log: &OpLogger,
) -> Result<Extension> {
    let mut ext = Extension::new_image(SIPWCS, e);
    let header = ext.header_mut();

    for card in solution_cards(sci, PRIMARY_KEY, true) {
        header.push(card);
    }
    for key in alt_keys {
        for card in solution_cards(sci, *key, false) {
            header.push(card);
        }
    }
    header.push(Card::new(
        VAFACTOR,
        sci.get_float(VAFACTOR).unwrap_or(1.0),
        "Velocity aberration plate scale factor",
    ));

    if refs.npolfile {
        for card in sci.cards() {
            let kw = card.keyword();
            if is_axis_keyword(kw, "CPDIS")
                || is_axis_keyword(kw, "DP")
                || is_axis_keyword(kw, "CPERR")
                || kw == "NPOLEXT"
            {
                header.push(card.clone());
            }
        }
    }

    if refs.d2imfile {
        if let Some(d2imext) = sci.card("D2IMEXT") {
            let axiscorr = sci.card("AXISCORR").ok_or_else(|| {
                log.error(format_args!(
                    "'D2IMFILE' exists but 'AXISCORR' was not found in (SCI, {})",
                    e
                ));
                HeaderletError::inconsistent_reference(
                    "D2IMEXT",
                    "AXISCORR",
                    format!("(SCI, {})", e),
                )
            })?;
            header.push(d2imext.clone());
            header.push(axiscorr.clone());
            header.push(
                sci.card("D2IMERR")
                    .cloned()
                    .unwrap_or_else(|| Card::new("D2IMERR", 0.0, "Maximum error of D2IMARR")),
            );
        }
    }

    Ok(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixtures;

    fn builder() -> HeaderletBuilder {
        HeaderletBuilder::new(OpLogger::disabled())
    }

    #[test]
    fn test_layout() {
        let ds = fixtures::science_dataset();
        let hlet = builder().build(&ds, "test1", &BuildOptions::new()).unwrap();

        assert_eq!(hlet.destim(), fixtures::ROOT);
        assert_eq!(hlet.hdrname(), "test1");
        assert_eq!(hlet.sipwcs_count(), 2);

        let names: Vec<(String, i64)> = hlet
            .dataset()
            .iter()
            .skip(1)
            .map(|e| (e.extname().unwrap_or_default().to_string(), e.extver()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("SIPWCS".to_string(), 1),
                ("SIPWCS".to_string(), 2),
                ("WCSDVARR".to_string(), 1),
                ("WCSDVARR".to_string(), 2),
                ("WCSDVARR".to_string(), 3),
                ("WCSDVARR".to_string(), 4),
                ("D2IMARR".to_string(), 1),
            ]
        );

        let primary = hlet.primary_header();
        assert_eq!(primary.get_str(VERSION_KEY), Some("0.6"));
        assert_eq!(primary.get_str("IDCTAB"), Some(fixtures::IDCTAB_VALUE));
        assert!(primary.get_str(DATE).is_some_and(|d| d.len() == 19));
    }

    #[test]
    fn test_sipwcs_contents() {
        let ds = fixtures::science_dataset();
        let hlet = builder().build(&ds, "test1", &BuildOptions::new()).unwrap();
        let h = hlet.sipwcs(2).unwrap().header();

        assert_eq!(h.get_float("CRPIX1"), Some(2048.0));
        assert!(h.contains("A_ORDER"));
        assert!(h.contains("OCX10"));
        assert!(h.contains("CRVAL1A"));
        assert!(!h.contains("CRVAL1O"));
        assert_eq!(h.cards_named("DP1").count(), 2);
        assert_eq!(h.get_int("AXISCORR"), Some(1));
        assert_eq!(h.get_float("D2IMERR"), Some(0.0));
        assert!(!h.contains("PA_APER"));
        assert!(!h.contains("HISTORY"));
    }

    #[test]
    fn test_explicit_identity_and_missing_identity() {
        let mut ds = fixtures::science_dataset();
        ds.primary_mut().header_mut().remove(ROOTNAME);

        let err = builder().build(&ds, "test1", &BuildOptions::new()).unwrap_err();
        assert!(matches!(err, HeaderletError::MissingIdentity));

        let hlet = builder()
            .build(&ds, "test1", &BuildOptions::new().dest_identity("other"))
            .unwrap();
        assert_eq!(hlet.destim(), "other");
    }

    #[test]
    fn test_missing_name() {
        let ds = fixtures::science_dataset();
        let err = builder().build(&ds, "  ", &BuildOptions::new()).unwrap_err();
        assert!(matches!(err, HeaderletError::MissingName));
    }

    #[test]
    fn test_missing_version_is_blank() {
        let mut ds = fixtures::science_dataset();
        ds.primary_mut().header_mut().remove(VERSION_KEY);
        let hlet = builder().build(&ds, "test1", &BuildOptions::new()).unwrap();
        assert_eq!(hlet.version(), "");
        assert!(hlet.primary_header().contains(VERSION_KEY));
    }

    #[test]
    fn test_d2im_requires_axiscorr() {
        let mut ds = fixtures::science_dataset();
        ds.find_mut(SCI, 1).unwrap().header_mut().remove("AXISCORR");
        let err = builder().build(&ds, "test1", &BuildOptions::new()).unwrap_err();
        assert!(matches!(err, HeaderletError::InconsistentReference { .. }));
    }

    #[test]
    fn test_output_written_with_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let ds = fixtures::science_dataset();
        let options = BuildOptions::new().output(dir.path().join("test1"));
        builder().build(&ds, "test1", &options).unwrap();
        assert!(dir.path().join("test1_hdr.fits").exists());
    }
}
