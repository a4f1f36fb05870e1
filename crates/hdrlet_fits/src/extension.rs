//! A header plus optional data array (one HDU).

use crate::card::{Card, Value};
use crate::data::DataArray;
use crate::header::Header;

/// Type tag of standard image extensions.
pub const IMAGE_XTENSION: &str = "IMAGE";

/// One extension of a dataset.
///
/// Structural cards (`SIMPLE`/`XTENSION`, `BITPIX`, `NAXIS`, `NAXISn`,
/// `PCOUNT`, `GCOUNT`, `EXTEND`) live in the header and are kept in step with
/// the data by [`Extension::set_data`].
#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    header: Header,
    data: Option<DataArray>,
}

impl Extension {
    /// Create the primary extension of a new dataset, without data.
    pub fn new_primary() -> Self {
        let mut header = Header::new();
        header.push(Card::new("SIMPLE", true, "conforms to FITS standard"));
        header.push(Card::new("BITPIX", 8i64, "array data type"));
        header.push(Card::new("NAXIS", 0i64, "number of array dimensions"));
        header.push(Card::new("EXTEND", true, ""));
        Self { header, data: None }
    }

    /// Create an extension with the given `XTENSION` type tag, no data,
    /// and optional `EXTNAME`/`EXTVER`.
    pub fn new_typed(xtension: &str, extname: Option<&str>, extver: Option<i64>) -> Self {
        let mut header = Header::new();
        header.push(Card::new("XTENSION", xtension, "extension type"));
        header.push(Card::new("BITPIX", 8i64, "array data type"));
        header.push(Card::new("NAXIS", 0i64, "number of array dimensions"));
        header.push(Card::new("PCOUNT", 0i64, "number of parameters"));
        header.push(Card::new("GCOUNT", 1i64, "number of groups"));
        if let Some(name) = extname {
            header.push(Card::new("EXTNAME", name, "extension name"));
        }
        if let Some(ver) = extver {
            header.push(Card::new("EXTVER", ver, "extension version"));
        }
        Self { header, data: None }
    }

    /// Create an image extension with `EXTNAME`/`EXTVER`.
    pub fn new_image(extname: &str, extver: i64) -> Self {
        Self::new_typed(IMAGE_XTENSION, Some(extname), Some(extver))
    }

    /// Build an extension from a parsed header and its data, as read from a file.
    pub fn from_parts(header: Header, data: Option<DataArray>) -> Self {
        Self { header, data }
    }

    /// Header of this extension.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Mutable header of this extension.
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// Data array, if any.
    pub fn data(&self) -> Option<&DataArray> {
        self.data.as_ref()
    }

    /// Attach (or clear) data and rewrite `BITPIX`/`NAXIS`/`NAXISn` to match.
    pub fn set_data(&mut self, data: Option<DataArray>) {
        let naxis = self.header.get_int("NAXIS").unwrap_or(0);
        for i in 1..=naxis.max(0) {
            self.header.remove(&format!("NAXIS{}", i));
        }

        let (bitpix, axes): (i64, Vec<usize>) = match &data {
            Some(d) => (d.bitpix().value(), d.axes().to_vec()),
            None => (8, Vec::new()),
        };
        self.header.set("BITPIX", bitpix, "");
        self.header.set("NAXIS", axes.len(), "");

        let mut after = "NAXIS".to_string();
        for (i, len) in axes.iter().enumerate() {
            let key = format!("NAXIS{}", i + 1);
            self.header
                .insert_after(&after, Card::new(&key, *len, "length of data axis"));
            after = key;
        }

        self.data = data;
    }

    /// The `XTENSION` type tag, or `None` for a primary extension.
    pub fn xtension(&self) -> Option<&str> {
        match self.header.cards().first() {
            Some(card) if card.keyword() == "XTENSION" => card.value().as_str().map(str::trim),
            _ => None,
        }
    }

    /// Whether this is a primary extension (`SIMPLE` first).
    pub fn is_primary(&self) -> bool {
        matches!(self.header.cards().first(), Some(c) if c.keyword() == "SIMPLE")
    }

    /// Whether this is a standard image extension.
    pub fn is_image(&self) -> bool {
        self.xtension() == Some(IMAGE_XTENSION)
    }

    /// `EXTNAME`, if set.
    pub fn extname(&self) -> Option<&str> {
        self.header.get_str("EXTNAME").map(str::trim)
    }

    /// `EXTVER`, defaulting to 1.
    pub fn extver(&self) -> i64 {
        self.header.get_int("EXTVER").unwrap_or(1)
    }

    /// Set `EXTVER`, inserting it after `EXTNAME` when absent.
    pub fn set_extver(&mut self, extver: i64) {
        if self.header.contains("EXTVER") {
            self.header.set("EXTVER", extver, "");
        } else {
            self.header.insert_after(
                "EXTNAME",
                Card::new("EXTVER", Value::Integer(extver), "extension version"),
            );
        }
    }

    /// Whether this extension is identified by (`name`, `ver`).
    pub fn matches(&self, name: &str, ver: i64) -> bool {
        self.is_named(name) && self.extver() == ver
    }

    /// Whether `EXTNAME` equals `name` (case-insensitive).
    pub fn is_named(&self, name: &str) -> bool {
        self.extname()
            .is_some_and(|n| n.eq_ignore_ascii_case(name))
    }
}
