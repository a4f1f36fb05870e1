//! Extension-type dispatch and the embedded headerlet archive.
//!
//! Extensions are classified by their `XTENSION` type tag. Each known type
//! implements [`ExtensionType`] and is registered with an
//! [`ExtensionTypeRegistry`]; unknown tags are left alone.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hdrlet::hdu::{ExtensionTypeRegistry, HeaderletHdu};
//!
//! let registry = ExtensionTypeRegistry::new();
//! let attached = registry.count(&dataset, HDRLET);
//! let ext = HeaderletHdu::encode(&headerlet, true, &log)?;
//! ```

mod archive;
mod registry;

pub use archive::{HeaderletHdu, extract_headerlets};
pub use registry::{ExtensionTypeRegistry, ImageType};

use hdrlet_fits::{Extension, Header};

use crate::error::Result;
use crate::headerlet::Headerlet;
use crate::logging::OpLogger;

/// Result of decoding a classified extension.
#[derive(Debug, Clone)]
pub enum DecodedExtension {
    /// An archived headerlet
    Headerlet(Box<Headerlet>),
    /// A standard image extension, returned as is
    Image(Extension),
}

/// A recognised extension type.
pub trait ExtensionType {
    /// `XTENSION` value identifying this type.
    fn tag(&self) -> &'static str;

    /// Human-readable name for log messages.
    fn display_name(&self) -> &'static str;

    /// Whether a header belongs to this type. Only the first card is
    /// inspected: it must be `XTENSION` with this type's tag.
    fn match_header(&self, header: &Header) -> bool {
        header.cards().first().is_some_and(|card| {
            card.keyword() == "XTENSION"
                && card
                    .value()
                    .as_str()
                    .is_some_and(|tag| tag.trim_end() == self.tag())
        })
    }

    /// Decode an extension of this type.
    fn decode_extension(&self, extension: &Extension, log: &OpLogger) -> Result<DecodedExtension>;
}
