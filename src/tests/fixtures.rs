//! Synthetic observations shared by the tests.

use hdrlet_fits::{Card, DataArray, Dataset, Extension};
use log::LevelFilter;

use crate::constants::{D2IMARR, SCI, WCSDVARR};
use crate::logging::OpLogger;

/// `ROOTNAME` of the synthetic observation.
pub const ROOT: &str = "j94f05bgq";

/// `IDCTAB` of the synthetic observation.
pub const IDCTAB_VALUE: &str = "jref$qbu1641sj_idc.fits";

/// Route test logging through `env_logger` and return a verbose handle.
pub fn logger() -> OpLogger {
    let _ = env_logger::builder().is_test(true).try_init();
    OpLogger::new(LevelFilter::Debug)
}

/// Two science extensions with the full set of WCS components.
pub fn science_dataset() -> Dataset {
    science_dataset_n(2)
}

/// Observation with `numsci` science extensions. Extension `e` uses lookup
/// tables `2e - 1` and `2e`; all share one detector-to-image array.
pub fn science_dataset_n(numsci: i64) -> Dataset {
    let mut ds = Dataset::new();
    {
        let h = ds.primary_mut().header_mut();
        h.set("ROOTNAME", ROOT, "rootname of the observation set");
        h.set("INSTRUME", "ACS", "");
        h.set("STWCSVER", "0.6", "Version of STWCS used to update the WCS");
        h.set("IDCTAB", IDCTAB_VALUE, "");
        h.set("NPOLFILE", "jref$v971826aj_npl.fits", "");
        h.set("D2IMFILE", "jref$v971826mj_d2i.fits", "");
        h.push(Card::history("Flat-field corrected"));
    }

    for e in 1..=numsci {
        ds.push(science_extension(e));
    }

    for ver in 1..=2 * numsci {
        let mut arr = Extension::new_image(WCSDVARR, ver);
        let values: Vec<f32> = (0..9).map(|i| ver as f32 * 0.01 + i as f32 * 0.001).collect();
        arr.set_data(Some(DataArray::from_f32(vec![3, 3], &values).unwrap()));
        ds.push(arr);
    }

    let mut d2im = Extension::new_image(D2IMARR, 1);
    let values: Vec<f32> = (0..8).map(|i| i as f32 * 0.125).collect();
    d2im.set_data(Some(DataArray::from_f32(vec![8], &values).unwrap()));
    ds.push(d2im);

    ds
}

fn science_extension(e: i64) -> Extension {
    let mut ext = Extension::new_image(SCI, e);
    ext.set_data(Some(DataArray::from_i16(vec![4, 4], &[0; 16]).unwrap()));

    let h = ext.header_mut();
    h.set("BUNIT", "ELECTRONS", "");
    h.set("WCSAXES", 2i64, "number of World Coordinate System axes");
    h.set("CRPIX1", 2048.0, "");
    h.set("CRPIX2", 1024.0, "");
    h.set("CRVAL1", 5.63 + e as f64 * 0.01, "");
    h.set("CRVAL2", -72.05, "");
    h.set("CTYPE1", "RA---TAN-SIP", "");
    h.set("CTYPE2", "DEC--TAN-SIP", "");
    h.set("CD1_1", 1.29e-5, "");
    h.set("CD1_2", 4.7e-6, "");
    h.set("CD2_1", 5.4e-6, "");
    h.set("CD2_2", -1.28e-5, "");
    h.set("WCSNAME", "IDC_qbu1641sj", "");

    h.set("A_ORDER", 2i64, "");
    h.set("A_0_2", 2.16e-6, "");
    h.set("A_1_1", -5.2e-6, "");
    h.set("A_2_0", 8.6e-7, "");
    h.set("B_ORDER", 2i64, "");
    h.set("B_0_2", -7.1e-6, "");
    h.set("B_1_1", 6.2e-6, "");
    h.set("B_2_0", -1.7e-6, "");
    h.set("IDCTAB", IDCTAB_VALUE, "");

    h.set("OCX10", 0.00219, "");
    h.set("OCX11", 0.04985, "");
    h.set("OCY10", 0.04998, "");
    h.set("OCY11", 0.00146, "");
    h.set("IDCSCALE", 0.05, "");

    h.set("CPDIS1", "Lookup", "Prior distortion function type");
    h.push(Card::new("DP1", format!("EXTVER: {}", 2 * e - 1), ""));
    h.push(Card::new("DP1", "NAXES: 2", ""));
    h.set("CPDIS2", "Lookup", "Prior distortion function type");
    h.push(Card::new("DP2", format!("EXTVER: {}", 2 * e), ""));
    h.push(Card::new("DP2", "NAXES: 2", ""));
    h.set("CPERR1", 0.051, "");
    h.set("CPERR2", 0.043, "");
    h.set("NPOLEXT", "jref$v971826aj_npl.fits", "");

    h.set("D2IMEXT", "jref$v971826mj_d2i.fits", "");
    h.set("AXISCORR", 1i64, "");

    h.set("VAFACTOR", 1.0000362, "");

    h.set("WCSNAMEA", "OPUS", "");
    h.set("CRPIX1A", 2048.0, "");
    h.set("CRPIX2A", 1024.0, "");
    h.set("CRVAL1A", 5.6301, "");
    h.set("CRVAL2A", -72.0502, "");
    h.set("CTYPE1A", "RA---TAN", "");
    h.set("CTYPE2A", "DEC--TAN", "");
    h.set("CD1_1A", 1.29e-5, "");
    h.set("CD2_2A", -1.28e-5, "");

    h.set("WCSNAMEO", "OPUS_ORIG", "");
    h.set("CTYPE1O", "RA---TAN", "");
    h.set("CRVAL1O", 5.6302, "");

    h.set("PA_APER", 12.5, "");
    h.set("ORIENTAT", 12.4, "");
    h.push(Card::history("WCS keywords updated"));
    ext
}

/// The same observation with a different solution: shifted reference
/// point, new polynomial terms and new lookup tables.
pub fn updated_dataset() -> Dataset {
    let mut ds = science_dataset();
    for e in 1..=2 {
        let h = ds.find_mut(SCI, e).unwrap().header_mut();
        h.set("CRVAL1", 5.64 + e as f64 * 0.01, "");
        h.set("A_1_1", -5.3e-6, "");
        h.set("WCSNAME", "TWEAK_1", "");
        h.set("VAFACTOR", 1.0000371, "");
    }
    for ver in 1..=4 {
        let values: Vec<f32> = (0..9).map(|i| ver as f32 * 0.02 - i as f32 * 0.001).collect();
        ds.find_mut(WCSDVARR, ver)
            .unwrap()
            .set_data(Some(DataArray::from_f32(vec![3, 3], &values).unwrap()));
    }
    ds
}
