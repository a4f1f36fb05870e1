//! Binary array payload of an extension.
//!
//! Data is kept as the raw big-endian bytes found in the file so that copies
//! between datasets are byte-exact. Numeric views go through `ndarray`.

use ndarray::{ArrayD, IxDyn};

use crate::error::FitsError;

/// Element type of an array, as encoded by `BITPIX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bitpix {
    /// Unsigned 8-bit integer
    U8,
    /// Signed 16-bit integer
    I16,
    /// Signed 32-bit integer
    I32,
    /// Signed 64-bit integer
    I64,
    /// IEEE single precision
    F32,
    /// IEEE double precision
    F64,
}

impl Bitpix {
    /// Parse a `BITPIX` header value.
    pub fn from_value(value: i64) -> Result<Self, FitsError> {
        match value {
            8 => Ok(Bitpix::U8),
            16 => Ok(Bitpix::I16),
            32 => Ok(Bitpix::I32),
            64 => Ok(Bitpix::I64),
            -32 => Ok(Bitpix::F32),
            -64 => Ok(Bitpix::F64),
            other => Err(FitsError::UnsupportedBitpix(other)),
        }
    }

    /// The `BITPIX` header value.
    pub fn value(self) -> i64 {
        match self {
            Bitpix::U8 => 8,
            Bitpix::I16 => 16,
            Bitpix::I32 => 32,
            Bitpix::I64 => 64,
            Bitpix::F32 => -32,
            Bitpix::F64 => -64,
        }
    }

    /// Size of one element in bytes.
    pub fn element_size(self) -> usize {
        (self.value().unsigned_abs() / 8) as usize
    }

    fn decode(self, bytes: &[u8]) -> f64 {
        match self {
            Bitpix::U8 => bytes[0] as f64,
            Bitpix::I16 => i16::from_be_bytes([bytes[0], bytes[1]]) as f64,
            Bitpix::I32 => i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
            Bitpix::I64 => {
                let mut b = [0u8; 8];
                b.copy_from_slice(&bytes[..8]);
                i64::from_be_bytes(b) as f64
            }
            Bitpix::F32 => f32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
            Bitpix::F64 => {
                let mut b = [0u8; 8];
                b.copy_from_slice(&bytes[..8]);
                f64::from_be_bytes(b)
            }
        }
    }
}

/// Raw array data with its element type and axis lengths.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    bitpix: Bitpix,
    /// Axis lengths, `NAXIS1` first.
    axes: Vec<usize>,
    /// Big-endian element bytes.
    bytes: Vec<u8>,
}

impl DataArray {
    /// Create an array, checking that the byte count matches the axes.
    pub fn new(bitpix: Bitpix, axes: Vec<usize>, bytes: Vec<u8>) -> Result<Self, FitsError> {
        let expected = axes
            .iter()
            .try_fold(bitpix.element_size(), |acc, n| acc.checked_mul(*n));
        if axes.is_empty() || expected != Some(bytes.len()) {
            return Err(FitsError::invalid_header(format!(
                "data of {} bytes does not match axes {:?} with BITPIX {}",
                bytes.len(),
                axes,
                bitpix.value()
            )));
        }
        Ok(Self {
            bitpix,
            axes,
            bytes,
        })
    }

    /// Wrap bytes read from a file. The size was derived from the header, which
    /// may include a heap area, so no product check is made here.
    pub(crate) fn from_file_bytes(bitpix: Bitpix, axes: Vec<usize>, bytes: Vec<u8>) -> Self {
        Self {
            bitpix,
            axes,
            bytes,
        }
    }

    /// One-dimensional byte payload (`BITPIX = 8`, `NAXIS = 1`).
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bitpix: Bitpix::U8,
            axes: vec![bytes.len()],
            bytes,
        }
    }

    /// Single-precision array. `axes` is given `NAXIS1` first.
    pub fn from_f32(axes: Vec<usize>, values: &[f32]) -> Result<Self, FitsError> {
        let bytes = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        Self::new(Bitpix::F32, axes, bytes)
    }

    /// Signed 16-bit array. `axes` is given `NAXIS1` first.
    pub fn from_i16(axes: Vec<usize>, values: &[i16]) -> Result<Self, FitsError> {
        let bytes = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        Self::new(Bitpix::I16, axes, bytes)
    }

    /// Element type.
    pub fn bitpix(&self) -> Bitpix {
        self.bitpix
    }

    /// Axis lengths, `NAXIS1` first.
    pub fn axes(&self) -> &[usize] {
        &self.axes
    }

    /// Raw big-endian bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the array and return its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Decode into a row-major `f64` array of shape (`NAXISn`, ..., `NAXIS1`).
    pub fn to_ndarray(&self) -> Result<ArrayD<f64>, FitsError> {
        let size = self.bitpix.element_size();
        let values: Vec<f64> = self
            .bytes
            .chunks_exact(size)
            .map(|chunk| self.bitpix.decode(chunk))
            .collect();
        let shape: Vec<usize> = self.axes.iter().rev().copied().collect();
        Ok(ArrayD::from_shape_vec(IxDyn(&shape), values)?)
    }
}
