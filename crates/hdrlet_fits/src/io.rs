//! FITS block reader and writer.
//!
//! FITS format:
//! - 2880-byte blocks
//! - Header with 80-character keyword records, terminated by `END`
//! - Data in big-endian format, zero-padded to a block boundary

use std::io::Write;

use crate::card::{Card, CARD_LEN};
use crate::data::{Bitpix, DataArray};
use crate::error::FitsError;
use crate::extension::Extension;
use crate::header::Header;

/// Size of one FITS block.
pub const BLOCK_LEN: usize = 2880;

fn padded_len(len: usize) -> usize {
    len.div_ceil(BLOCK_LEN) * BLOCK_LEN
}

/// Parse every extension in a FITS byte stream.
pub fn read_extensions(bytes: &[u8]) -> Result<Vec<Extension>, FitsError> {
    let mut extensions = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let remaining = &bytes[pos..];
        if remaining.len() < BLOCK_LEN {
            log::warn!(
                "Ignoring {} trailing bytes after extension {}",
                remaining.len(),
                extensions.len()
            );
            break;
        }

        let first_keyword = &remaining[..8];
        let expected: &[u8] = if extensions.is_empty() {
            b"SIMPLE  "
        } else {
            b"XTENSION"
        };
        if first_keyword != expected {
            if extensions.is_empty() {
                return Err(FitsError::invalid_header("file does not start with SIMPLE"));
            }
            log::warn!(
                "Stopping at offset {}: block does not start a new extension",
                pos
            );
            break;
        }

        let (header, header_len) = read_header(remaining)?;
        pos += header_len;

        let data_len = data_size(&header)?;
        let data = if data_len > 0 {
            if bytes.len().saturating_sub(pos) < data_len {
                return Err(FitsError::eof(format!(
                    "data of extension {}",
                    extensions.len()
                )));
            }
            let bitpix = Bitpix::from_value(header.get_int("BITPIX").unwrap_or(8))?;
            let axes = axis_lengths(&header)?;
            let raw = bytes[pos..pos + data_len].to_vec();
            pos += padded_len(data_len).min(bytes.len() - pos);
            Some(DataArray::from_file_bytes(bitpix, axes, raw))
        } else {
            None
        };

        log::trace!(
            "Read extension {} ({} cards, {} data bytes)",
            extensions.len(),
            header.len(),
            data_len
        );
        extensions.push(Extension::from_parts(header, data));
    }

    Ok(extensions)
}

/// Read header records until `END`. Returns the header and the number of
/// bytes it occupies, including block padding.
fn read_header(bytes: &[u8]) -> Result<(Header, usize), FitsError> {
    let mut cards = Vec::new();
    let mut offset = 0;

    loop {
        let record = bytes
            .get(offset..offset + CARD_LEN)
            .ok_or_else(|| FitsError::eof("header (no END card)"))?;
        offset += CARD_LEN;
        match Card::from_record(record)? {
            Some(card) => cards.push(card),
            None => break,
        }
    }

    Ok((Header::from_cards(cards), padded_len(offset)))
}

fn axis_lengths(header: &Header) -> Result<Vec<usize>, FitsError> {
    let naxis = header.get_int("NAXIS").unwrap_or(0);
    (1..=naxis)
        .map(|i| {
            let key = format!("NAXIS{}", i);
            header
                .get_int(&key)
                .filter(|n| *n >= 0)
                .map(|n| n as usize)
                .ok_or_else(|| FitsError::invalid_header(format!("missing or negative {}", key)))
        })
        .collect()
}

/// Number of data bytes described by the structural keywords.
fn data_size(header: &Header) -> Result<usize, FitsError> {
    let axes = axis_lengths(header)?;
    if axes.is_empty() {
        return Ok(0);
    }
    let bitpix = Bitpix::from_value(header.get_int("BITPIX").unwrap_or(8))?;
    let pcount = header.get_int("PCOUNT").unwrap_or(0).max(0) as usize;
    let gcount = header.get_int("GCOUNT").unwrap_or(1).max(0) as usize;
    axes.iter()
        .try_fold(1usize, |acc, n| acc.checked_mul(*n))
        .and_then(|elements| elements.checked_add(pcount))
        .and_then(|n| n.checked_mul(gcount))
        .and_then(|n| n.checked_mul(bitpix.element_size()))
        .ok_or_else(|| {
            FitsError::invalid_header(format!("data size of axes {:?} overflows", axes))
        })
}

/// Write extensions as a FITS byte stream.
pub fn write_extensions<W: Write>(writer: &mut W, extensions: &[Extension]) -> Result<(), FitsError> {
    for (idx, ext) in extensions.iter().enumerate() {
        let valid_start = if idx == 0 {
            ext.is_primary()
        } else {
            ext.xtension().is_some()
        };
        if !valid_start {
            return Err(FitsError::invalid_header(format!(
                "extension {} does not start with {}",
                idx,
                if idx == 0 { "SIMPLE" } else { "XTENSION" }
            )));
        }

        let mut header_len = 0;
        for card in ext.header() {
            writer.write_all(&card.to_record()?)?;
            header_len += CARD_LEN;
        }
        let mut end = [b' '; CARD_LEN];
        end[..3].copy_from_slice(b"END");
        writer.write_all(&end)?;
        header_len += CARD_LEN;
        writer.write_all(&vec![b' '; padded_len(header_len) - header_len])?;

        if let Some(data) = ext.data() {
            let len = data.bytes().len();
            writer.write_all(data.bytes())?;
            writer.write_all(&vec![0u8; padded_len(len) - len])?;
        }
    }
    writer.flush()?;
    Ok(())
}
