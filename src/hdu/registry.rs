//! Registry of extension types keyed by `XTENSION` tag.

use std::collections::HashMap;

use hdrlet_fits::{Dataset, Extension, IMAGE_XTENSION};

use super::{DecodedExtension, ExtensionType, HeaderletHdu};
use crate::error::{HeaderletError, Result};
use crate::logging::OpLogger;

/// Standard image extensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageType;

impl ExtensionType for ImageType {
    fn tag(&self) -> &'static str {
        IMAGE_XTENSION
    }

    fn display_name(&self) -> &'static str {
        "Image extension"
    }

    fn decode_extension(&self, extension: &Extension, _log: &OpLogger) -> Result<DecodedExtension> {
        Ok(DecodedExtension::Image(extension.clone()))
    }
}

/// Registry of known extension types.
///
/// The headerlet archive type and standard images are registered on creation.
pub struct ExtensionTypeRegistry {
    types: HashMap<&'static str, Box<dyn ExtensionType>>,
}

impl ExtensionTypeRegistry {
    /// Create a registry with the built-in types.
    pub fn new() -> Self {
        let mut registry = Self {
            types: HashMap::new(),
        };

        registry.register(Box::new(HeaderletHdu));
        registry.register(Box::new(ImageType));

        registry
    }

    /// Register a type, replacing any with the same tag.
    pub fn register(&mut self, ty: Box<dyn ExtensionType>) {
        self.types.insert(ty.tag(), ty);
    }

    /// Get a type by its tag.
    pub fn get(&self, tag: &str) -> Option<&dyn ExtensionType> {
        self.types.get(tag).map(|t| t.as_ref())
    }

    /// All registered tags.
    pub fn tags(&self) -> Vec<&'static str> {
        self.types.keys().copied().collect()
    }

    /// The type an extension belongs to, if any.
    pub fn classify(&self, extension: &Extension) -> Option<&dyn ExtensionType> {
        self.types
            .values()
            .find(|t| t.match_header(extension.header()))
            .map(|t| t.as_ref())
    }

    /// Number of extensions of a dataset classified as `tag`.
    pub fn count(&self, dataset: &Dataset, tag: &str) -> usize {
        dataset
            .iter()
            .filter(|ext| self.classify(ext).is_some_and(|t| t.tag() == tag))
            .count()
    }

    /// Decode an extension with its registered type.
    pub fn decode(&self, extension: &Extension, log: &OpLogger) -> Result<DecodedExtension> {
        let ty = self
            .classify(extension)
            .ok_or_else(|| HeaderletError::UnsupportedExtension {
                expected: self.tags().join(" | "),
                found: extension.xtension().unwrap_or_default().to_string(),
            })?;
        log.debug(format_args!("Decoding {}", ty.display_name()));
        ty.decode_extension(extension, log)
    }
}

impl Default for ExtensionTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
