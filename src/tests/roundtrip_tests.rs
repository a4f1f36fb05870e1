//! Build-then-compare and file round trips.

use crate::builder::{BuildOptions, HeaderletBuilder};
use crate::compare::SolutionComparator;
use crate::constants::{SCI, SIPWCS};
use crate::headerlet::Headerlet;
use crate::tests::fixtures;

#[test]
fn test_built_headerlet_matches_source() {
    let log = fixtures::logger();
    let ds = fixtures::science_dataset();
    let hlet = HeaderletBuilder::new(log)
        .build(&ds, "test1", &BuildOptions::new())
        .unwrap();

    let comparator = SolutionComparator::new(log);
    assert!(comparator.compare(&hlet, &ds).unwrap());
    assert!(comparator.compare(&ds, &hlet).unwrap());
}

#[test]
fn test_headerlet_differs_from_other_solution() {
    let log = fixtures::logger();
    let hlet = HeaderletBuilder::new(log)
        .build(&fixtures::updated_dataset(), "tweak", &BuildOptions::new())
        .unwrap();
    assert!(!SolutionComparator::new(log)
        .compare(&hlet, &fixtures::science_dataset())
        .unwrap());
}

#[test]
fn test_written_headerlet_still_matches() {
    let log = fixtures::logger();
    let dir = tempfile::tempdir().unwrap();
    let ds = fixtures::science_dataset();
    let options = BuildOptions::new().output(dir.path().join("test1"));
    HeaderletBuilder::new(log).build(&ds, "test1", &options).unwrap();

    let hlet = Headerlet::open(dir.path().join("test1_hdr.fits"), &fixtures::logger()).unwrap();
    assert_eq!(hlet.sipwcs_count(), 2);
    assert!(SolutionComparator::new(log).compare(&hlet, &ds).unwrap());
}

#[test]
fn test_count_mismatch_is_not_an_error() {
    let log = fixtures::logger();
    let one = fixtures::science_dataset_n(1);
    let two = fixtures::science_dataset();
    assert!(!SolutionComparator::new(log).compare(&one, &two).unwrap());
}

#[test]
fn test_summary_serializes() {
    let ds = fixtures::science_dataset();
    let hlet = HeaderletBuilder::new(fixtures::logger())
        .build(&ds, "test1", &BuildOptions::new())
        .unwrap();
    let summary = hlet.summary();
    assert_eq!(summary.sipwcs, ds.count(SCI));
    assert_eq!(summary.wcsdvarr, 4);
    assert_eq!(summary.d2imarr, 1);
    assert_eq!(summary.sipname, "IDC_qbu1641sj");

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["hdrname"], "test1");
    assert_eq!(json["destim"], fixtures::ROOT);
    assert_eq!(hlet.dataset().count(SIPWCS), 2);
}
