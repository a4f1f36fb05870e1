//! Headerlets archived inside a dataset as `XTENSION = 'HDRLET'` extensions.
//!
//! The payload is a ZIP archive with the single member `<HDRNAME>_hdr.fits`,
//! stored or deflated according to the `COMPRESS` card.

use std::io::{Cursor, Read, Write};

use hdrlet_fits::{Card, DataArray, Dataset, Extension};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::{DecodedExtension, ExtensionType};
use crate::constants::{
    COMPRESS, D2IMFILE, DATE, HDRLET, HDRNAME, HEADERLET_SUFFIX, NPOLFILE, SIPNAME,
};
use crate::error::{HeaderletError, Result};
use crate::headerlet::Headerlet;
use crate::logging::OpLogger;

/// The headerlet archive extension type.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderletHdu;

impl HeaderletHdu {
    /// Pack a headerlet into an archive extension.
    ///
    /// `EXTVER` is left unset; the caller numbers attached archives.
    pub fn encode(headerlet: &Headerlet, compress: bool, log: &OpLogger) -> Result<Extension> {
        let member = format!("{}{}", headerlet.hdrname(), HEADERLET_SUFFIX);
        let method = if compress {
            CompressionMethod::Deflated
        } else {
            CompressionMethod::Stored
        };

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file(
            member.as_str(),
            SimpleFileOptions::default().compression_method(method),
        )?;
        writer.write_all(&headerlet.to_bytes()?)?;
        let payload = writer.finish()?.into_inner();

        log.debug(format_args!(
            "Archived headerlet '{}' as {} ({} bytes, compress={})",
            headerlet.hdrname(),
            member,
            payload.len(),
            compress
        ));

        let mut ext = Extension::new_typed(HDRLET, Some(HDRLET), None);
        ext.set_data(Some(DataArray::from_bytes(payload)));

        let primary = headerlet.primary_header();
        let header = ext.header_mut();
        for key in [HDRNAME, DATE] {
            header.push(copied_or_blank(primary.card(key), key));
        }
        header.push(Card::new(SIPNAME, headerlet.sipname(), "SIP distortion model name"));
        for key in [NPOLFILE, D2IMFILE] {
            header.push(copied_or_blank(primary.card(key), key));
        }
        header.push(Card::new(COMPRESS, compress, "Uses compression"));

        Ok(ext)
    }

    /// Unpack the headerlet held by an archive extension.
    pub fn decode(extension: &Extension, log: &OpLogger) -> Result<Headerlet> {
        if !HeaderletHdu.match_header(extension.header()) {
            return Err(HeaderletError::UnsupportedExtension {
                expected: HDRLET.to_string(),
                found: extension.xtension().unwrap_or_default().to_string(),
            });
        }

        let header = extension.header();
        let hdrname = header.get_str(HDRNAME).unwrap_or_default().trim().to_string();
        let payload = extension
            .data()
            .map(|d| d.bytes())
            .ok_or_else(|| HeaderletError::EmptyArchive {
                hdrname: hdrname.clone(),
            })?;

        let declared = header.get_int("NAXIS1").unwrap_or(0);
        if declared != payload.len() as i64 {
            return Err(HeaderletError::invalid_archive(format!(
                "NAXIS1 = {} but payload holds {} bytes",
                declared,
                payload.len()
            )));
        }

        let mut archive = ZipArchive::new(Cursor::new(payload))?;
        if archive.is_empty() {
            return Err(HeaderletError::EmptyArchive { hdrname });
        }
        if archive.len() > 1 {
            log.warn(format_args!(
                "Archive '{}' holds {} members; only the headerlet file should be present",
                hdrname,
                archive.len()
            ));
        }

        let member = format!("{}{}", hdrname, HEADERLET_SUFFIX);
        let index = match archive.index_for_name(&member) {
            Some(index) => index,
            None => {
                log.warn(format_args!(
                    "Member {} missing from archive; using the first member",
                    member
                ));
                0
            }
        };

        let mut file = archive.by_index(index)?;
        let compressed = file.compression() != CompressionMethod::Stored;
        let flagged = header.get_bool(COMPRESS).unwrap_or(false);
        if compressed != flagged {
            log.warn(format_args!(
                "Archive '{}' has COMPRESS = {} but member '{}' is {}",
                hdrname,
                if flagged { "T" } else { "F" },
                file.name(),
                if compressed { "compressed" } else { "stored" }
            ));
        }

        let mut bytes = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut bytes)?;
        log.debug(format_args!(
            "Extracted '{}' ({} bytes)",
            file.name(),
            bytes.len()
        ));
        Headerlet::from_bytes(&bytes)
    }
}

fn copied_or_blank(card: Option<&Card>, key: &str) -> Card {
    card.cloned().unwrap_or_else(|| Card::new(key, "", ""))
}

impl ExtensionType for HeaderletHdu {
    fn tag(&self) -> &'static str {
        HDRLET
    }

    fn display_name(&self) -> &'static str {
        "Headerlet archive"
    }

    fn decode_extension(&self, extension: &Extension, log: &OpLogger) -> Result<DecodedExtension> {
        Self::decode(extension, log).map(|h| DecodedExtension::Headerlet(Box::new(h)))
    }
}

/// Decode every headerlet archived in a dataset, in extension order.
pub fn extract_headerlets(dataset: &Dataset, log: &OpLogger) -> Result<Vec<Headerlet>> {
    dataset
        .iter()
        .filter(|ext| HeaderletHdu.match_header(ext.header()))
        .map(|ext| HeaderletHdu::decode(ext, log))
        .collect()
}
