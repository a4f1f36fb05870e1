//! Applying headerlets to observations.

use std::cell::RefCell;
use std::rc::Rc;

use hdrlet_fits::Dataset;

use crate::apply::{ApplyOptions, HeaderletApplier};
use crate::builder::{BuildOptions, HeaderletBuilder};
use crate::compare::SolutionComparator;
use crate::config::HeaderletConfig;
use crate::constants::{HDRLET, ROOTNAME, SCI, WCSDVARR};
use crate::error::{HeaderletError, Result};
use crate::hdu::{ExtensionTypeRegistry, extract_headerlets};
use crate::headerlet::Headerlet;
use crate::ledger::CorrectionLedger;
use crate::tests::fixtures;

fn updated_headerlet(name: &str) -> Headerlet {
    HeaderletBuilder::new(fixtures::logger())
        .build(&fixtures::updated_dataset(), name, &BuildOptions::new())
        .unwrap()
}

/// Ledger that records the calls made to it.
#[derive(Clone, Default)]
struct RecordingLedger {
    events: Rc<RefCell<Vec<String>>>,
}

impl CorrectionLedger for RecordingLedger {
    fn is_present(&self, _dataset: &Dataset) -> bool {
        !self.events.borrow().is_empty()
    }

    fn initialize(&mut self, _dataset: &mut Dataset) -> Result<()> {
        self.events.borrow_mut().push("initialize".to_string());
        Ok(())
    }

    fn record(&mut self, _dataset: &mut Dataset, source: &Headerlet) -> Result<()> {
        self.events
            .borrow_mut()
            .push(format!("record {}", source.hdrname()));
        Ok(())
    }
}

#[test]
fn test_apply_then_compare() {
    let log = fixtures::logger();
    let hlet = updated_headerlet("tweak");
    let mut dest = fixtures::science_dataset();

    let report = HeaderletApplier::new(log)
        .apply(&hlet, &mut dest, &ApplyOptions::new())
        .unwrap();

    assert_eq!(report.extensions, 2);
    assert_eq!(report.aux_arrays, 5);
    assert!(report.ref_files.idctab && report.ref_files.npolfile && report.ref_files.d2imfile);
    assert!(SolutionComparator::new(log).compare(&hlet, &dest).unwrap());
    assert!(!SolutionComparator::new(log)
        .compare(&fixtures::science_dataset(), &dest)
        .unwrap());

    assert_eq!(dest.count(WCSDVARR), 4);
    assert_eq!(dest.count(SCI), 2);
}

#[test]
fn test_placement_and_preserved_cards() {
    let hlet = updated_headerlet("tweak");
    let mut dest = fixtures::science_dataset();
    HeaderletApplier::new(fixtures::logger())
        .apply(&hlet, &mut dest, &ApplyOptions::new())
        .unwrap();

    let h = dest.find(SCI, 1).unwrap().header();
    assert!(h.index_of("CRVAL1").unwrap() < h.index_of("PA_APER").unwrap());
    assert!(h.index_of("WCSAXES").unwrap() < h.index_of("CRPIX1").unwrap());
    assert_eq!(h.get_str("WCSNAME"), Some("TWEAK_1"));
    assert_eq!(h.get_str("WCSNAMEO"), Some("OPUS_ORIG"));
    assert_eq!(h.get_int("NAXIS1"), Some(4));
    assert_eq!(h.cards_named("EXTNAME").count(), 1);
    assert_eq!(h.cards_named("NAXIS").count(), 1);
    assert_eq!(h.cards_named("CRVAL1").count(), 1);
    assert_eq!(h.cards_named("HISTORY").count(), 1);
}

#[test]
fn test_rollback_restores_previous_solution() {
    let log = fixtures::logger();
    let hlet = updated_headerlet("tweak");
    let snapshot = fixtures::science_dataset();
    let mut dest = snapshot.clone();

    let report = HeaderletApplier::new(log)
        .apply(&hlet, &mut dest, &ApplyOptions::new())
        .unwrap();
    assert_eq!(report.rollback, Some((format!("{}_orig", fixtures::ROOT), 1)));
    assert_eq!(report.attached, Some(2));

    let attached = extract_headerlets(&dest, &log).unwrap();
    assert_eq!(attached.len(), 2);
    assert_eq!(attached[0].hdrname(), "j94f05bgq_orig");
    assert_eq!(attached[1].hdrname(), "tweak");

    let comparator = SolutionComparator::new(log);
    assert!(comparator.compare(&attached[0], &snapshot).unwrap());
    assert!(comparator.compare(&attached[1], &hlet).unwrap());

    // Reapplying the rollback gives back the original solution
    HeaderletApplier::new(log)
        .apply(&attached[0], &mut dest, &ApplyOptions::new().make_rollback(false))
        .unwrap();
    assert!(comparator.compare(&snapshot, &dest).unwrap());
}

#[test]
fn test_attached_versions_continue_numbering() {
    let log = fixtures::logger();
    let mut dest = fixtures::science_dataset();
    let mut applier = HeaderletApplier::new(log);

    applier
        .apply(&updated_headerlet("first"), &mut dest, &ApplyOptions::new())
        .unwrap();
    let report = applier
        .apply(
            &updated_headerlet("second"),
            &mut dest,
            &ApplyOptions::new().rollback_name("before_second").compress(true),
        )
        .unwrap();

    assert_eq!(report.rollback, Some(("before_second".to_string(), 3)));
    assert_eq!(report.attached, Some(4));
    assert_eq!(ExtensionTypeRegistry::new().count(&dest, HDRLET), 4);

    let versions: Vec<i64> = dest
        .named(HDRLET)
        .map(|ext| ext.extver())
        .collect();
    assert_eq!(versions, vec![1, 2, 3, 4]);
}

#[test]
fn test_identity_mismatch_leaves_destination_untouched() {
    let log = fixtures::logger();
    let hlet = updated_headerlet("tweak");
    let mut dest = fixtures::science_dataset();
    dest.primary_mut()
        .header_mut()
        .set(ROOTNAME, "j94f05bhq", "");
    let before = dest.clone();

    let ledger = RecordingLedger::default();
    let mut applier = HeaderletApplier::new(log).with_ledger(Box::new(ledger.clone()));
    let err = applier
        .apply(&hlet, &mut dest, &ApplyOptions::new())
        .unwrap_err();

    match err {
        HeaderletError::IdentityMismatch {
            headerlet, found, ..
        } => {
            assert_eq!(headerlet, "tweak");
            assert_eq!(found, "j94f05bhq");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(dest, before);
    assert!(ledger.events.borrow().is_empty());
}

#[test]
fn test_science_count_mismatch() {
    let hlet = updated_headerlet("tweak");
    let mut dest = fixtures::science_dataset_n(1);
    let before = dest.clone();

    let err = HeaderletApplier::new(fixtures::logger())
        .apply(&hlet, &mut dest, &ApplyOptions::new())
        .unwrap_err();
    assert!(matches!(
        err,
        HeaderletError::ScienceCountMismatch {
            headerlet: 2,
            destination: 1
        }
    ));
    assert_eq!(dest, before);
}

#[test]
fn test_fewer_solutions_than_chips_rejected() {
    let hlet = HeaderletBuilder::new(fixtures::logger())
        .build(&fixtures::science_dataset_n(1), "one_chip", &BuildOptions::new())
        .unwrap();
    let mut dest = fixtures::science_dataset();
    let before = dest.clone();

    let err = HeaderletApplier::new(fixtures::logger())
        .apply(&hlet, &mut dest, &ApplyOptions::new())
        .unwrap_err();
    assert!(matches!(
        err,
        HeaderletError::ScienceCountMismatch {
            headerlet: 1,
            destination: 2
        }
    ));
    assert_eq!(dest, before);
    assert!(SolutionComparator::new(fixtures::logger()).compare(&dest, &dest).unwrap());
}

#[test]
fn test_file_name_identity_fallback() {
    let hlet = updated_headerlet("tweak");
    let mut dest = fixtures::science_dataset();
    dest.primary_mut().header_mut().remove(ROOTNAME);
    dest.set_path(Some(format!("/data/{}.fits", fixtures::ROOT).into()));

    let report = HeaderletApplier::new(fixtures::logger())
        .apply(&hlet, &mut dest, &ApplyOptions::new())
        .unwrap();
    assert_eq!(report.destination, fixtures::ROOT);
}

#[test]
fn test_ledger_calls() {
    let hlet = updated_headerlet("tweak");
    let mut dest = fixtures::science_dataset();
    let ledger = RecordingLedger::default();

    let mut applier =
        HeaderletApplier::new(fixtures::logger()).with_ledger(Box::new(ledger.clone()));
    applier
        .apply(&hlet, &mut dest, &ApplyOptions::new())
        .unwrap();
    applier
        .apply(&hlet, &mut dest, &ApplyOptions::new().make_rollback(false))
        .unwrap();
    applier
        .apply(&hlet, &mut dest, &ApplyOptions::new().update_ledger(false))
        .unwrap();

    assert_eq!(
        *ledger.events.borrow(),
        vec!["initialize", "record tweak", "record tweak"]
    );
}

#[test]
fn test_options_from_config() {
    let hlet = updated_headerlet("tweak");
    let mut dest = fixtures::science_dataset();
    let config = HeaderletConfig::from_json(
        r#"{ "version": 1, "log_level": "debug", "make_rollback": false, "attach": false }"#,
    )
    .unwrap();

    let report = HeaderletApplier::new(config.logger())
        .apply(&hlet, &mut dest, &config.apply_options())
        .unwrap();
    assert!(report.rollback.is_none());
    assert!(report.attached.is_none());
    assert_eq!(dest.count(HDRLET), 0);
}

#[test]
fn test_apply_file_rewrites_destination() {
    let log = fixtures::logger();
    let dir = tempfile::tempdir().unwrap();
    let dest_path = dir.path().join(format!("{}_flt.fits", fixtures::ROOT));
    fixtures::science_dataset().write_to(&dest_path, false).unwrap();

    let hlet = updated_headerlet("tweak");
    let hlet_path = hlet.write_to(dir.path().join("tweak"), false, &fixtures::logger()).unwrap();

    let report = HeaderletApplier::new(log)
        .apply_file(&hlet_path, &dest_path, &ApplyOptions::new().compress(true))
        .unwrap();
    assert_eq!(report.attached, Some(2));

    let reread = Dataset::open(&dest_path).unwrap();
    assert!(SolutionComparator::new(log).compare(&hlet, &reread).unwrap());
    assert_eq!(extract_headerlets(&reread, &log).unwrap().len(), 2);
}
