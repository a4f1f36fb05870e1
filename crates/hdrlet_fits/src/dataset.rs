//! Ordered list of extensions backed by an optional file path.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::FitsError;
use crate::extension::Extension;
use crate::header::Header;
use crate::io::{read_extensions, write_extensions};

/// A FITS dataset. Extension 0 is the primary extension.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    extensions: Vec<Extension>,
    path: Option<PathBuf>,
}

impl Dataset {
    /// Create a dataset holding only an empty primary extension.
    pub fn new() -> Self {
        Self {
            extensions: vec![Extension::new_primary()],
            path: None,
        }
    }

    /// Create a dataset from extensions. The first must be a primary extension.
    pub fn from_extensions(extensions: Vec<Extension>) -> Result<Self, FitsError> {
        match extensions.first() {
            Some(ext) if ext.is_primary() => Ok(Self {
                extensions,
                path: None,
            }),
            _ => Err(FitsError::invalid_header(
                "dataset must start with a primary extension",
            )),
        }
    }

    /// Parse a dataset from FITS bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FitsError> {
        Self::from_extensions(read_extensions(bytes)?)
    }

    /// Read a dataset from disk and remember its path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FitsError> {
        let path = path.as_ref();
        log::debug!("Opening FITS file {:?}", path);
        let bytes = fs::read(path)?;
        let mut dataset = Self::from_bytes(&bytes)?;
        dataset.path = Some(path.to_path_buf());
        Ok(dataset)
    }

    /// Serialize to FITS bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, FitsError> {
        let mut out = Vec::new();
        write_extensions(&mut out, &self.extensions)?;
        Ok(out)
    }

    /// Write to disk. Fails if the file exists and `overwrite` is false.
    pub fn write_to(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<(), FitsError> {
        let path = path.as_ref();
        if !overwrite && path.exists() {
            return Err(FitsError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} already exists", path.display()),
            )));
        }
        let bytes = self.to_bytes()?;
        fs::write(path, bytes)?;
        log::debug!("Wrote FITS file {:?}", path);
        Ok(())
    }

    /// Path this dataset was read from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Set or clear the associated path.
    pub fn set_path(&mut self, path: Option<PathBuf>) {
        self.path = path;
    }

    /// Number of extensions, including the primary.
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Always false: a dataset has at least its primary extension.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// The primary extension.
    pub fn primary(&self) -> &Extension {
        &self.extensions[0]
    }

    /// Mutable primary extension.
    pub fn primary_mut(&mut self) -> &mut Extension {
        &mut self.extensions[0]
    }

    /// Header of the primary extension.
    pub fn primary_header(&self) -> &Header {
        self.primary().header()
    }

    /// Extension by position.
    pub fn get(&self, index: usize) -> Option<&Extension> {
        self.extensions.get(index)
    }

    /// Mutable extension by position.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Extension> {
        self.extensions.get_mut(index)
    }

    /// All extensions in order.
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// Iterate over extensions.
    pub fn iter(&self) -> impl Iterator<Item = &Extension> {
        self.extensions.iter()
    }

    /// Position of the extension identified by (`name`, `ver`).
    pub fn index_of(&self, name: &str, ver: i64) -> Option<usize> {
        self.extensions.iter().position(|e| e.matches(name, ver))
    }

    /// Extension identified by (`name`, `ver`).
    pub fn find(&self, name: &str, ver: i64) -> Option<&Extension> {
        self.index_of(name, ver).map(|i| &self.extensions[i])
    }

    /// Mutable extension identified by (`name`, `ver`).
    pub fn find_mut(&mut self, name: &str, ver: i64) -> Option<&mut Extension> {
        self.index_of(name, ver)
            .map(move |i| &mut self.extensions[i])
    }

    /// Number of extensions with the given `EXTNAME`.
    pub fn count(&self, name: &str) -> usize {
        self.extensions.iter().filter(|e| e.is_named(name)).count()
    }

    /// Extensions with the given `EXTNAME`, in dataset order.
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Extension> + 'a {
        self.extensions.iter().filter(move |e| e.is_named(name))
    }

    /// Append an extension.
    pub fn push(&mut self, extension: Extension) {
        self.extensions.push(extension);
    }

    /// Remove every non-primary extension with the given `EXTNAME`.
    /// Returns the number removed.
    pub fn remove_named(&mut self, name: &str) -> usize {
        let before = self.extensions.len();
        let mut first = true;
        self.extensions.retain(|e| {
            let keep = first || !e.is_named(name);
            first = false;
            keep
        });
        before - self.extensions.len()
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Dataset> for Dataset {
    fn as_ref(&self) -> &Dataset {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataArray;

    fn sample() -> Dataset {
        let mut ds = Dataset::new();
        ds.primary_mut().header_mut().set("ROOTNAME", "j94f05bgq", "");
        for ver in 1..=2 {
            let mut sci = Extension::new_image("SCI", ver);
            sci.set_data(Some(DataArray::from_i16(vec![2, 2], &[0, 1, 2, 3]).unwrap()));
            ds.push(sci);
        }
        ds.push(Extension::new_image("WCSDVARR", 1));
        ds
    }

    #[test]
    fn test_lookup_by_name_and_version() {
        let ds = sample();
        assert_eq!(ds.count("SCI"), 2);
        assert_eq!(ds.index_of("SCI", 2), Some(2));
        assert!(ds.find("SCI", 3).is_none());
        assert_eq!(ds.named("wcsdvarr").count(), 1);
    }

    #[test]
    fn test_remove_named() {
        let mut ds = sample();
        assert_eq!(ds.remove_named("WCSDVARR"), 1);
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("j94f05bgq_flt.fits");
        let ds = sample();
        ds.write_to(&path, false).unwrap();
        assert!(ds.write_to(&path, false).is_err());

        let back = Dataset::open(&path).unwrap();
        assert_eq!(back.path(), Some(path.as_path()));
        assert_eq!(back.extensions(), ds.extensions());
    }

    #[test]
    fn test_requires_primary() {
        let err = Dataset::from_extensions(vec![Extension::new_image("SCI", 1)]);
        assert!(err.is_err());
    }
}
