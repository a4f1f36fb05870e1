//! Removal of coordinate-transform keywords from a science header.
//!
//! Every step is best-effort: a keyword that is already absent is skipped.

use hdrlet_fits::Header;

use crate::altwcs::{AltWcsRegistry, is_axis_keyword, is_wcs_keyword};
use crate::constants::{D2IM_KEYS, IDCTAB, IDC_COEFFS, NPOLFILE, SIP_PREFIXES, VAFACTOR};
use crate::logging::OpLogger;

/// Strip all WCS-related keywords from one science header.
///
/// Order: detector-to-image correction, SIP distortion, lookup-table
/// distortion, primary axes, IDC coefficients, velocity aberration, then
/// alternate solutions (except `'O'`). Returns the number of cards removed.
pub fn strip_extension(header: &mut Header, alt: &dyn AltWcsRegistry, log: &OpLogger) -> usize {
    let mut removed = remove_d2im(header);
    removed += remove_sip(header);
    removed += remove_lut(header);
    removed += remove_primary_wcs(header);
    removed += remove_idc_coeffs(header);
    removed += header.remove_all(VAFACTOR);

    for key in alt.keys(header) {
        let count = alt.delete(header, key);
        log.debug(format_args!("Removed alternate WCS '{}' ({} cards)", key, count));
        removed += count;
    }

    log.debug(format_args!("Stripped {} WCS cards", removed));
    removed
}

/// Remove the detector-to-image correction keywords.
pub fn remove_d2im(header: &mut Header) -> usize {
    D2IM_KEYS.iter().map(|key| header.remove_all(key)).sum()
}

/// Remove SIP coefficients (`A`, `B`, `AP`, `BP`) and `IDCTAB`.
pub fn remove_sip(header: &mut Header) -> usize {
    let mut removed = 0;
    for prefix in SIP_PREFIXES {
        let order_key = format!("{}_ORDER", prefix);
        let Some(order) = header.get_int(&order_key) else {
            continue;
        };
        removed += header.remove_all(&order_key);
        for i in 0..=order.max(0) {
            for j in 0..=order.max(0) {
                removed += header.remove_all(&format!("{}_{}_{}", prefix, i, j));
            }
        }
    }
    removed + header.remove_all(IDCTAB)
}

/// Remove the lookup-table distortion: `CPDISj`, their `DPj` records,
/// `CPERRj`, `NPOLFILE` and `NPOLEXT`.
pub fn remove_lut(header: &mut Header) -> usize {
    let axes: Vec<String> = header
        .cards_with_prefix("CPDIS")
        .filter(|c| is_axis_keyword(c.keyword(), "CPDIS"))
        .map(|c| c.keyword()["CPDIS".len()..].to_string())
        .collect();

    let mut removed = 0;
    for axis in &axes {
        removed += header.remove_all(&format!("DP{}", axis));
        removed += header.remove_all(&format!("CPDIS{}", axis));
    }

    let before = header.len();
    header.retain(|c| !is_axis_keyword(c.keyword(), "CPERR"));
    removed += before - header.len();

    removed + header.remove_all(NPOLFILE) + header.remove_all("NPOLEXT")
}

/// Remove the primary linear WCS (axes, matrix terms, `WCSAXES`, `WCSNAME`).
pub fn remove_primary_wcs(header: &mut Header) -> usize {
    let before = header.len();
    header.retain(|c| !is_wcs_keyword(c.keyword()));
    before - header.len()
}

/// Remove the IDC linear coefficients.
pub fn remove_idc_coeffs(header: &mut Header) -> usize {
    IDC_COEFFS.iter().map(|key| header.remove_all(key)).sum()
}

#[cfg(test)]
mod tests {
    use hdrlet_fits::Card;

    use super::*;
    use crate::altwcs::KeywordAltWcs;

    fn science_header() -> Header {
        let mut h = Header::new();
        h.set("EXTNAME", "SCI", "");
        h.set("WCSAXES", 2i64, "");
        h.set("CRPIX1", 2048.0, "");
        h.set("CRVAL1", 5.6, "");
        h.set("CTYPE1", "RA---TAN-SIP", "");
        h.set("CD1_1", 1e-5, "");
        h.set("WCSNAME", "IDC_qbu1641sj", "");
        h.set("A_ORDER", 2i64, "");
        h.set("A_0_2", 2.1e-6, "");
        h.set("A_1_1", -1.4e-6, "");
        h.set("B_ORDER", 2i64, "");
        h.set("B_2_0", 3.0e-7, "");
        h.set("IDCTAB", "jref$qbu1641sj_idc.fits", "");
        h.set("CPDIS1", "Lookup", "");
        h.push(Card::new("DP1", "EXTVER: 1", ""));
        h.push(Card::new("DP1", "NAXES: 2", ""));
        h.set("CPERR1", 0.05, "");
        h.set("NPOLEXT", "jref$v971826aj_npl.fits", "");
        h.set("D2IMEXT", "jref$d2im.fits", "");
        h.set("AXISCORR", 1i64, "");
        h.set("OCX10", 0.002, "");
        h.set("VAFACTOR", 1.00001, "");
        h.set("CTYPE1A", "RA---TAN", "");
        h.set("CTYPE1O", "RA---TAN", "");
        h.set("PA_APER", 12.0, "");
        h
    }

    #[test]
    fn test_strip_leaves_only_non_wcs_cards() {
        let mut h = science_header();
        let removed = strip_extension(&mut h, &KeywordAltWcs, &OpLogger::disabled());
        let left: Vec<&str> = h.cards().iter().map(|c| c.keyword()).collect();
        assert_eq!(left, vec!["EXTNAME", "CTYPE1O", "PA_APER"]);
        assert_eq!(removed, 22);
    }

    #[test]
    fn test_each_step_tolerates_absence() {
        let mut h = Header::new();
        h.set("EXTNAME", "SCI", "");
        assert_eq!(remove_d2im(&mut h), 0);
        assert_eq!(remove_sip(&mut h), 0);
        assert_eq!(remove_lut(&mut h), 0);
        assert_eq!(remove_primary_wcs(&mut h), 0);
        assert_eq!(remove_idc_coeffs(&mut h), 0);
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn test_remove_lut() {
        let mut h = science_header();
        assert_eq!(remove_lut(&mut h), 5);
        assert!(!h.contains("DP1"));
        assert!(h.contains("CD1_1"));
    }
}
