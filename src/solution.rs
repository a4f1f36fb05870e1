//! Coordinate solutions read from keyword storage.
//!
//! A solution is identified by a one-character key: `' '` for the primary,
//! `'A'..='Z'` for alternates. Only the stored values are interpreted here;
//! evaluating the transform is left to WCS libraries.

use hdrlet_fits::{Card, Dataset, Header};
use ndarray::{Array2, ArrayD};

use crate::altwcs::{is_matrix_keyword, is_wcs_keyword};
use crate::constants::{D2IMARR, IDC_COEFFS, SIP_PREFIXES, VAFACTOR, WCSDVARR};
use crate::error::{HeaderletError, Result};

/// Key of the primary solution.
pub const PRIMARY_KEY: char = ' ';

/// Linear part: reference point, reference pixel, CD matrix, axis types.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearWcs {
    /// `CRVALi`
    pub crval: Vec<f64>,
    /// `CRPIXi`
    pub crpix: Vec<f64>,
    /// `CDi_j`, or `CDELTi * PCi_j` when no CD terms are stored
    pub cd: Array2<f64>,
    /// `CTYPEi`
    pub ctype: Vec<String>,
}

/// SIP polynomial distortion coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct SipDistortion {
    /// Forward coefficients of the first axis, indexed `[p, q]`
    pub a: Array2<f64>,
    /// Forward coefficients of the second axis
    pub b: Array2<f64>,
    /// Inverse coefficients of the first axis
    pub ap: Option<Array2<f64>>,
    /// Inverse coefficients of the second axis
    pub bp: Option<Array2<f64>>,
}

/// One coordinate solution of one extension.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSolution {
    /// Solution key
    pub key: char,
    /// `WCSNAME`, if stored
    pub name: Option<String>,
    /// Linear terms
    pub linear: LinearWcs,
    /// Polynomial distortion (primary only)
    pub sip: Option<SipDistortion>,
    /// Lookup-table distortion per axis (primary only)
    pub lookup: [Option<ArrayD<f64>>; 2],
    /// Detector-to-image correction per axis (primary only)
    pub det2im: [Option<ArrayD<f64>>; 2],
    /// Velocity aberration plate scale factor
    pub vafactor: f64,
}

fn suffix(key: char) -> String {
    if key == PRIMARY_KEY {
        String::new()
    } else {
        key.to_string()
    }
}

impl CoordinateSolution {
    /// Read the primary solution of extension (`extname`, `extver`),
    /// including its distortion components.
    pub fn primary(dataset: &Dataset, extname: &str, extver: i64) -> Result<Self> {
        let ext = dataset
            .find(extname, extver)
            .ok_or_else(|| HeaderletError::missing_extension(extname, extver))?;
        let header = ext.header();
        let context = format!("({}, {})", extname, extver);

        Ok(Self {
            key: PRIMARY_KEY,
            name: header.get_nonblank("WCSNAME").map(str::to_string),
            linear: read_linear(header, PRIMARY_KEY),
            sip: read_sip(header),
            lookup: read_lookup(dataset, header, &context)?,
            det2im: read_det2im(dataset, header, &context)?,
            vafactor: header.get_float(VAFACTOR).unwrap_or(1.0),
        })
    }

    /// Read alternate solution `key` of extension (`extname`, `extver`).
    /// Alternates share the primary's distortion model, so none is read.
    pub fn alternate(dataset: &Dataset, extname: &str, extver: i64, key: char) -> Result<Self> {
        let ext = dataset
            .find(extname, extver)
            .ok_or_else(|| HeaderletError::missing_extension(extname, extver))?;
        let header = ext.header();

        Ok(Self {
            key,
            name: header
                .get_nonblank(&format!("WCSNAME{}", suffix(key)))
                .map(str::to_string),
            linear: read_linear(header, key),
            sip: None,
            lookup: [None, None],
            det2im: [None, None],
            vafactor: header.get_float(VAFACTOR).unwrap_or(1.0),
        })
    }
}

fn naxis(header: &Header, sfx: &str) -> usize {
    header
        .get_int(&format!("WCSAXES{}", sfx))
        .or_else(|| header.get_int("NAXIS").filter(|n| *n > 0))
        .map(|n| n.max(1) as usize)
        .unwrap_or(2)
}

fn read_linear(header: &Header, key: char) -> LinearWcs {
    let sfx = suffix(key);
    let n = naxis(header, &sfx);
    let axis = |stem: &str, i: usize| format!("{}{}{}", stem, i, sfx);
    let term = |stem: &str, i: usize, j: usize| format!("{}{}_{}{}", stem, i, j, sfx);

    let crval = (1..=n)
        .map(|i| header.get_float(&axis("CRVAL", i)).unwrap_or(0.0))
        .collect();
    let crpix = (1..=n)
        .map(|i| header.get_float(&axis("CRPIX", i)).unwrap_or(0.0))
        .collect();
    let ctype = (1..=n)
        .map(|i| header.get_str(&axis("CTYPE", i)).unwrap_or_default().to_string())
        .collect();

    let has_cd = (1..=n).any(|i| (1..=n).any(|j| header.contains(&term("CD", i, j))));
    let cd = Array2::from_shape_fn((n, n), |(r, c)| {
        let (i, j) = (r + 1, c + 1);
        if has_cd {
            header.get_float(&term("CD", i, j)).unwrap_or(0.0)
        } else {
            let identity = if i == j { 1.0 } else { 0.0 };
            let pc = header.get_float(&term("PC", i, j)).unwrap_or(identity);
            let cdelt = header.get_float(&axis("CDELT", i)).unwrap_or(1.0);
            cdelt * pc
        }
    });

    LinearWcs {
        crval,
        crpix,
        cd,
        ctype,
    }
}

fn read_coefficients(header: &Header, prefix: &str) -> Option<Array2<f64>> {
    let order = header.get_int(&format!("{}_ORDER", prefix))?.max(0) as usize;
    Some(Array2::from_shape_fn((order + 1, order + 1), |(p, q)| {
        header
            .get_float(&format!("{}_{}_{}", prefix, p, q))
            .unwrap_or(0.0)
    }))
}

fn read_sip(header: &Header) -> Option<SipDistortion> {
    let a = read_coefficients(header, "A")?;
    let b = read_coefficients(header, "B").unwrap_or_else(|| Array2::zeros(a.raw_dim()));
    Some(SipDistortion {
        a,
        b,
        ap: read_coefficients(header, "AP"),
        bp: read_coefficients(header, "BP"),
    })
}

/// Numeric field of a record-valued keyword (`DP1 = 'EXTVER: 1'`).
pub fn record_value(header: &Header, keyword: &str, field: &str) -> Result<Option<f64>> {
    for card in header.cards_named(keyword) {
        let Some(text) = card.value().as_str() else {
            continue;
        };
        let Some((name, value)) = text.split_once(':') else {
            continue;
        };
        if name.trim().eq_ignore_ascii_case(field) {
            return value
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| HeaderletError::InvalidRecord {
                    keyword: keyword.to_string(),
                    value: text.to_string(),
                });
        }
    }
    Ok(None)
}

fn array_of(dataset: &Dataset, extname: &str, extver: i64) -> Result<ArrayD<f64>> {
    let data = dataset
        .find(extname, extver)
        .and_then(|ext| ext.data())
        .ok_or_else(|| HeaderletError::missing_extension(extname, extver))?;
    Ok(data.to_ndarray()?)
}

fn read_lookup(
    dataset: &Dataset,
    header: &Header,
    context: &str,
) -> Result<[Option<ArrayD<f64>>; 2]> {
    let mut tables = [None, None];
    for (idx, table) in tables.iter_mut().enumerate() {
        let axis = idx + 1;
        let cpdis = format!("CPDIS{}", axis);
        if !header.contains(&cpdis) {
            continue;
        }
        let dp = format!("DP{}", axis);
        let extver = record_value(header, &dp, "EXTVER")?.ok_or_else(|| {
            HeaderletError::inconsistent_reference(&cpdis, format!("{}.EXTVER", dp), context)
        })?;
        *table = Some(array_of(dataset, WCSDVARR, extver as i64)?);
    }
    Ok(tables)
}

fn read_det2im(
    dataset: &Dataset,
    header: &Header,
    context: &str,
) -> Result<[Option<ArrayD<f64>>; 2]> {
    let mut arrays = [None, None];
    if !header.contains("D2IMEXT") {
        return Ok(arrays);
    }
    let axis = header
        .get_int("AXISCORR")
        .ok_or_else(|| HeaderletError::inconsistent_reference("D2IMEXT", "AXISCORR", context))?;
    let first = match axis {
        1 => 0,
        2 => 1,
        _ => {
            return Err(HeaderletError::InvalidRecord {
                keyword: "AXISCORR".to_string(),
                value: axis.to_string(),
            });
        }
    };
    arrays[first] = Some(array_of(dataset, D2IMARR, 1)?);
    if dataset.find(D2IMARR, 2).is_some() {
        arrays[1 - first] = Some(array_of(dataset, D2IMARR, 2)?);
    }
    Ok(arrays)
}

/// Whether a keyword holds a SIP coefficient or order.
fn is_sip_keyword(keyword: &str) -> bool {
    SIP_PREFIXES.iter().any(|prefix| {
        keyword == format!("{}_ORDER", prefix)
            || is_matrix_keyword(keyword, &format!("{}_", prefix))
    })
}

/// Cards storing solution `key` of a header, for packaging.
///
/// Linear cards come first, in header order. With `with_distortion` the SIP
/// coefficients and IDC linear coefficients follow.
pub fn solution_cards(header: &Header, key: char, with_distortion: bool) -> Vec<Card> {
    let linear = header.cards().iter().filter(|card| {
        let kw = card.keyword();
        if key == PRIMARY_KEY {
            is_wcs_keyword(kw)
        } else {
            kw.strip_suffix(key).is_some_and(is_wcs_keyword)
        }
    });
    let mut cards: Vec<Card> = linear.cloned().collect();

    if with_distortion {
        cards.extend(
            header
                .cards()
                .iter()
                .filter(|c| is_sip_keyword(c.keyword()))
                .cloned(),
        );
        cards.extend(
            header
                .cards()
                .iter()
                .filter(|c| IDC_COEFFS.contains(&c.keyword()))
                .cloned(),
        );
    }
    cards
}
