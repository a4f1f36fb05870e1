//! Reference-file associations of a primary header.

use hdrlet_fits::Header;

use crate::constants::{D2IMFILE, IDCTAB, NPOLFILE, REF_FILE_KEYS};
use crate::logging::OpLogger;

/// Which reference-file keywords were present on the source header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReferenceFiles {
    /// `IDCTAB` present
    pub idctab: bool,
    /// `NPOLFILE` present
    pub npolfile: bool,
    /// `D2IMFILE` present
    pub d2imfile: bool,
}

impl ReferenceFiles {
    fn mark(&mut self, keyword: &str) {
        match keyword {
            IDCTAB => self.idctab = true,
            NPOLFILE => self.npolfile = true,
            D2IMFILE => self.d2imfile = true,
            _ => {}
        }
    }
}

/// Copy `IDCTAB`, `NPOLFILE` and `D2IMFILE` from `source` into `dest`.
///
/// Each copied card replaces any existing one in `dest` and is placed before
/// the first `HISTORY` card, or at the end. Keywords absent from `source` are
/// left untouched in `dest`.
pub fn update_ref_files(source: &Header, dest: &mut Header, log: &OpLogger) -> ReferenceFiles {
    log.info(format_args!("Updating reference files"));
    let mut present = ReferenceFiles::default();

    for key in REF_FILE_KEYS {
        let Some(card) = source.card(key) else {
            log.debug(format_args!("Reference file keyword {} not in source", key));
            continue;
        };
        dest.remove_all(key);
        let index = dest.index_of("HISTORY").unwrap_or(dest.len());
        dest.insert(index, card.clone());
        present.mark(key);
    }

    present
}

/// Delete the reference-file keywords from a primary header.
pub fn remove_ref_files(header: &mut Header) -> usize {
    REF_FILE_KEYS.iter().map(|key| header.remove_all(key)).sum()
}
