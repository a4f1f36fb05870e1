//! Equivalence of the coordinate solutions held by two datasets.
//!
//! Either side may be a science dataset or a headerlet. Solutions are read
//! from `SCI` extensions when present, else from `SIPWCS` extensions.

use hdrlet_fits::Dataset;
use ndarray::{ArrayBase, ArrayD, Data, Dimension};

use crate::constants::{COMPARE_ATOL, COMPARE_RTOL, DESTIM, ROOTNAME, SCI, SIPWCS};
use crate::error::Result;
use crate::logging::OpLogger;
use crate::solution::CoordinateSolution;

/// Element-wise `|a - b| <= atol + rtol * |b|` over arrays of equal shape.
pub fn allclose<S1, S2, D>(a: &ArrayBase<S1, D>, b: &ArrayBase<S2, D>, rtol: f64, atol: f64) -> bool
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    D: Dimension,
{
    a.shape() == b.shape()
        && a.iter()
            .zip(b.iter())
            .all(|(x, y)| (x - y).abs() <= atol + rtol * y.abs())
}

fn slices_close(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| (x - y).abs() <= COMPARE_ATOL + COMPARE_RTOL * y.abs())
}

fn tables_equal(a: &Option<ArrayD<f64>>, b: &Option<ArrayD<f64>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Root identity of a dataset: `ROOTNAME`, else `DESTIM`.
pub fn root_identity(dataset: &Dataset) -> Option<&str> {
    let header = dataset.primary_header();
    header
        .get_nonblank(ROOTNAME)
        .or_else(|| header.get_nonblank(DESTIM))
        .map(str::trim)
}

/// Number of solution-bearing extensions.
fn solution_count(dataset: &Dataset) -> usize {
    dataset.count(SCI).max(dataset.count(SIPWCS))
}

fn solution_extname(dataset: &Dataset) -> &'static str {
    if dataset.find(SCI, 1).is_some() {
        SCI
    } else {
        SIPWCS
    }
}

/// Compares coordinate solutions, logging every difference found.
#[derive(Debug, Clone, Default)]
pub struct SolutionComparator {
    log: OpLogger,
}

impl SolutionComparator {
    /// Create a comparator logging through `log`.
    pub fn new(log: OpLogger) -> Self {
        Self { log }
    }

    /// Whether `a` and `b` hold the same coordinate solution.
    ///
    /// All differences are logged before returning. Errors are reserved for
    /// keyword storage that cannot be read.
    pub fn compare<A, B>(&self, a: &A, b: &B) -> Result<bool>
    where
        A: AsRef<Dataset> + ?Sized,
        B: AsRef<Dataset> + ?Sized,
    {
        let (a, b) = (a.as_ref(), b.as_ref());
        let log = &self.log;
        log.info(format_args!("Comparing coordinate solutions"));

        let (n1, n2) = (solution_count(a), solution_count(b));
        let mut same = true;
        if n1 == 0 || n2 == 0 || n1 != n2 {
            log.info(format_args!(
                "Number of SCI and SIPWCS extensions do not match ({} vs {})",
                n1, n2
            ));
            same = false;
        }

        match (root_identity(a), root_identity(b)) {
            (Some(r1), Some(r2)) if r1 == r2 => {}
            (r1, r2) => {
                log.info(format_args!("Rootnames do not match ({:?} vs {:?})", r1, r2));
                same = false;
            }
        }

        let (name1, name2) = (solution_extname(a), solution_extname(b));
        for i in 1..=n1.min(n2) as i64 {
            let w1 = CoordinateSolution::primary(a, name1, i)?;
            let w2 = CoordinateSolution::primary(b, name2, i)?;
            if !self.same_solution(&w1, &w2, i) {
                same = false;
            }
        }

        log.debug(format_args!("Comparison result: {}", same));
        Ok(same)
    }

    fn same_solution(&self, w1: &CoordinateSolution, w2: &CoordinateSolution, ext: i64) -> bool {
        let log = &self.log;
        let mut same = true;

        let (l1, l2) = (&w1.linear, &w2.linear);
        if !slices_close(&l1.crval, &l2.crval)
            || !slices_close(&l1.crpix, &l2.crpix)
            || !allclose(&l1.cd, &l2.cd, COMPARE_RTOL, COMPARE_ATOL)
            || l1.ctype != l2.ctype
        {
            log.info(format_args!("Primary WCSs do not match in extension {}", ext));
            same = false;
        }

        let sip_same = match (&w1.sip, &w2.sip) {
            (None, None) => true,
            (Some(s1), Some(s2)) => {
                allclose(&s1.a, &s2.a, COMPARE_RTOL, COMPARE_ATOL)
                    && allclose(&s1.b, &s2.b, COMPARE_RTOL, COMPARE_ATOL)
            }
            _ => false,
        };
        if !sip_same {
            log.info(format_args!("SIP coefficients do not match in extension {}", ext));
            same = false;
        }

        for axis in 0..2 {
            if !tables_equal(&w1.lookup[axis], &w2.lookup[axis]) {
                log.info(format_args!(
                    "NPOL distortions do not match on axis {} of extension {}",
                    axis + 1,
                    ext
                ));
                same = false;
            }
        }
        for axis in 0..2 {
            if !tables_equal(&w1.det2im[axis], &w2.det2im[axis]) {
                log.info(format_args!(
                    "Det2Im corrections do not match on axis {} of extension {}",
                    axis + 1,
                    ext
                ));
                same = false;
            }
        }

        if w1.vafactor != w2.vafactor {
            log.info(format_args!("VA factors do not match in extension {}", ext));
            same = false;
        }
        same
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::constants::VAFACTOR;
    use crate::tests::fixtures;

    fn comparator() -> SolutionComparator {
        SolutionComparator::new(OpLogger::disabled())
    }

    #[test]
    fn test_allclose() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let b = array![[1.0 + 1e-9, 2.0], [3.0, 4.0]];
        assert!(allclose(&a, &b, COMPARE_RTOL, COMPARE_ATOL));
        let c = array![[1.001, 2.0], [3.0, 4.0]];
        assert!(!allclose(&a, &c, COMPARE_RTOL, COMPARE_ATOL));
        let d = array![[1.0, 2.0]];
        assert!(!allclose(&a, &d, COMPARE_RTOL, COMPARE_ATOL));
    }

    #[test]
    fn test_identical_datasets() {
        let ds = fixtures::science_dataset();
        assert!(comparator().compare(&ds, &ds.clone()).unwrap());
    }

    #[test]
    fn test_vafactor_difference() {
        let ds = fixtures::science_dataset();
        let mut other = ds.clone();
        other.find_mut(SCI, 2).unwrap().header_mut().set(VAFACTOR, 1.5, "");
        assert!(!comparator().compare(&ds, &other).unwrap());
    }

    #[test]
    fn test_rootname_mismatch() {
        let ds = fixtures::science_dataset();
        let mut other = ds.clone();
        other.primary_mut().header_mut().set(ROOTNAME, "j94f05bhq", "");
        assert!(!comparator().compare(&ds, &other).unwrap());
    }

    #[test]
    fn test_empty_dataset() {
        let ds = fixtures::science_dataset();
        assert!(!comparator().compare(&ds, &Dataset::new()).unwrap());
    }

    #[test]
    fn test_sip_presence_asymmetry() {
        let ds = fixtures::science_dataset();
        let mut other = ds.clone();
        crate::strip::remove_sip(other.find_mut(SCI, 1).unwrap().header_mut());
        assert!(!comparator().compare(&ds, &other).unwrap());
    }

    #[test]
    fn test_lookup_presence_asymmetry() {
        let ds = fixtures::science_dataset();
        let mut other = ds.clone();
        other.find_mut(SCI, 1).unwrap().header_mut().remove("CPDIS2");
        assert!(!comparator().compare(&ds, &other).unwrap());
    }

    #[test]
    fn test_det2im_presence_asymmetry() {
        let ds = fixtures::science_dataset();
        let mut other = ds.clone();
        {
            let h = other.find_mut(SCI, 2).unwrap().header_mut();
            h.remove("D2IMEXT");
            h.remove("AXISCORR");
        }
        assert!(!comparator().compare(&ds, &other).unwrap());
        assert!(!comparator().compare(&other, &ds).unwrap());
    }

    #[test]
    fn test_det2im_axis_from_axiscorr() {
        let ds = fixtures::science_dataset();
        let mut other = ds.clone();
        other.find_mut(SCI, 1).unwrap().header_mut().set("AXISCORR", 2i64, "");

        let first = CoordinateSolution::primary(&ds, SCI, 1).unwrap();
        assert!(first.det2im[0].is_some());
        assert!(first.det2im[1].is_none());

        let second = CoordinateSolution::primary(&other, SCI, 1).unwrap();
        assert!(second.det2im[0].is_none());
        assert_eq!(second.det2im[1], first.det2im[0]);

        assert!(!comparator().compare(&ds, &other).unwrap());
    }
}
