//! Minimal FITS dataset model for headerlet tooling.
//!
//! Provides an ordered [`Dataset`] of [`Extension`]s, each a [`Header`] of
//! [`Card`]s plus an optional [`DataArray`], and a block reader/writer for the
//! on-disk format. Only what coordinate-metadata tooling needs is covered:
//! no compression, no table column access, no long-string continuation.

mod card;
mod data;
mod dataset;
mod error;
mod extension;
mod header;
mod io;

pub use card::{Card, Value, CARD_LEN};
pub use data::{Bitpix, DataArray};
pub use dataset::Dataset;
pub use error::FitsError;
pub use extension::{Extension, IMAGE_XTENSION};
pub use header::Header;
pub use io::{read_extensions, write_extensions, BLOCK_LEN};
