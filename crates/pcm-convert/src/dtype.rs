//! Sample types and the dtype lookup table
//!
//! Every sample representation the converter understands is a [`Dtype`].
//! Names are resolved through a process-wide table that is built once on
//! first use and never mutated afterwards.

use crate::error::{ConvertError, Result};
use bytemuck::Pod;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Numeric representation of a single sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Dtype {
    /// Unsigned 8-bit
    Uint8,
    /// Unsigned 8-bit, stores round and clamp instead of wrapping
    Uint8Clamped,
    /// Unsigned 16-bit
    Uint16,
    /// Unsigned 32-bit
    Uint32,
    /// Signed 8-bit
    Int8,
    /// Signed 16-bit
    Int16,
    /// Signed 32-bit
    Int32,
    /// 32-bit IEEE float
    Float32,
    /// 64-bit IEEE float
    Float64,
    /// Generic numeric sequence with no byte representation
    Array,
    /// Raw bytes, stored as unsigned 8-bit
    #[cfg_attr(feature = "serde", serde(rename = "arraybuffer"))]
    ArrayBuffer,
}

/// Static facts about a dtype
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DtypeInfo {
    /// The dtype described
    pub dtype: Dtype,
    /// Canonical lower-case name
    pub name: &'static str,
    /// Element width in bytes, `None` for [`Dtype::Array`]
    pub bytes_per_element: Option<usize>,
    /// Lowest sample value
    pub min: f64,
    /// Highest sample value
    pub max: f64,
}

static DTYPE_TABLE: Lazy<HashMap<&'static str, DtypeInfo>> = Lazy::new(|| {
    let table: HashMap<_, _> = Dtype::ALL
        .iter()
        .map(|&dtype| (dtype.name(), dtype.info()))
        .collect();
    tracing::debug!("dtype table initialized with {} entries", table.len());
    table
});

impl Dtype {
    /// Every dtype, in table order
    pub const ALL: [Dtype; 11] = [
        Dtype::Uint8,
        Dtype::Uint8Clamped,
        Dtype::Uint16,
        Dtype::Uint32,
        Dtype::Int8,
        Dtype::Int16,
        Dtype::Int32,
        Dtype::Float32,
        Dtype::Float64,
        Dtype::Array,
        Dtype::ArrayBuffer,
    ];

    /// Canonical name, as accepted by the format grammar
    pub fn name(self) -> &'static str {
        match self {
            Self::Uint8 => "uint8",
            Self::Uint8Clamped => "uint8_clamped",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Array => "array",
            Self::ArrayBuffer => "arraybuffer",
        }
    }

    /// Look up a dtype by name (case-insensitive)
    pub fn from_name(name: &str) -> Result<Self> {
        let key = name.to_ascii_lowercase();
        DTYPE_TABLE
            .get(key.as_str())
            .map(|info| info.dtype)
            .ok_or_else(|| ConvertError::unsupported_dtype(name))
    }

    /// Numeric bounds `(min, max)` for this dtype.
    ///
    /// Float and generic array samples are normalized to [-1, 1]; integer
    /// types span their full representable range.
    pub fn range(self) -> (f64, f64) {
        match self {
            Self::Float32 | Self::Float64 | Self::Array => (-1.0, 1.0),
            Self::Uint8 | Self::Uint8Clamped | Self::ArrayBuffer => (0.0, 255.0),
            Self::Uint16 => (0.0, 65535.0),
            Self::Uint32 => (0.0, 4_294_967_295.0),
            Self::Int8 => (-128.0, 127.0),
            Self::Int16 => (-32768.0, 32767.0),
            Self::Int32 => (-2_147_483_648.0, 2_147_483_647.0),
        }
    }

    /// Element width in bytes; `None` for the generic array dtype
    pub fn bytes_per_element(self) -> Option<usize> {
        match self {
            Self::Uint8 | Self::Uint8Clamped | Self::Int8 | Self::ArrayBuffer => Some(1),
            Self::Uint16 | Self::Int16 => Some(2),
            Self::Uint32 | Self::Int32 | Self::Float32 => Some(4),
            Self::Float64 => Some(8),
            Self::Array => None,
        }
    }

    /// Whether samples of this dtype have a byte representation
    pub fn is_binary(self) -> bool {
        self.bytes_per_element().is_some()
    }

    /// Full table entry for this dtype
    pub fn info(self) -> DtypeInfo {
        let (min, max) = self.range();
        DtypeInfo {
            dtype: self,
            name: self.name(),
            bytes_per_element: self.bytes_per_element(),
            min,
            max,
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dtype {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// Byte order of multi-byte samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Endianness {
    /// Little-endian
    Le,
    /// Big-endian
    Be,
}

impl Endianness {
    /// Byte order of the host
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Be
        } else {
            Self::Le
        }
    }

    /// Whether this is the host byte order
    pub fn is_native(self) -> bool {
        self == Self::native()
    }

    /// The other byte order
    pub fn opposite(self) -> Self {
        match self {
            Self::Le => Self::Be,
            Self::Be => Self::Le,
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Le => write!(f, "le"),
            Self::Be => write!(f, "be"),
        }
    }
}

impl FromStr for Endianness {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "le" => Ok(Self::Le),
            "be" => Ok(Self::Be),
            _ => Err(ConvertError::unrecognized_token(s)),
        }
    }
}

/// A fixed-width sample element.
///
/// `from_f64` follows typed-array store semantics: integers truncate toward
/// zero and wrap modulo 2^bits, with NaN and infinities stored as 0.
pub trait Sample: Pod + Send + Sync + 'static {
    /// Widen to f64 (lossless for every supported element type)
    fn to_f64(self) -> f64;

    /// Store an f64 into this element type
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_int_sample {
    ($ty:ty, $unsigned:ty) => {
        impl Sample for $ty {
            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(value: f64) -> Self {
                if !value.is_finite() {
                    return 0;
                }
                let modulus = 2f64.powi(<$ty>::BITS as i32);
                let wrapped = value.trunc().rem_euclid(modulus);
                wrapped as $unsigned as $ty
            }
        }
    };
}

impl_int_sample!(u8, u8);
impl_int_sample!(u16, u16);
impl_int_sample!(u32, u32);
impl_int_sample!(i8, u8);
impl_int_sample!(i16, u16);
impl_int_sample!(i32, u32);

impl Sample for f32 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl Sample for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }
}

/// Store an f64 as a clamped unsigned byte (round half to even, clamp to 0..=255)
#[inline]
pub fn clamped_u8(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 255.0).round_ties_even() as u8
}

/// Force the dtype table; cheap after the first call
pub(crate) fn init_table() -> usize {
    DTYPE_TABLE.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_round_trips_every_dtype() {
        for dtype in Dtype::ALL {
            assert_eq!(Dtype::from_name(dtype.name()).unwrap(), dtype);
        }
    }

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(Dtype::from_name("Float32").unwrap(), Dtype::Float32);
        assert_eq!(Dtype::from_name("UINT8_CLAMPED").unwrap(), Dtype::Uint8Clamped);
    }

    #[test]
    fn test_from_name_miss() {
        let err = Dtype::from_name("int24").unwrap_err();
        assert_eq!(err, ConvertError::unsupported_dtype("int24"));
    }

    #[test]
    fn test_ranges() {
        assert_eq!(Dtype::Float32.range(), (-1.0, 1.0));
        assert_eq!(Dtype::Array.range(), (-1.0, 1.0));
        assert_eq!(Dtype::Uint8.range(), (0.0, 255.0));
        assert_eq!(Dtype::Int16.range(), (-32768.0, 32767.0));
        assert_eq!(Dtype::Uint32.range(), (0.0, u32::MAX as f64));
        assert_eq!(Dtype::Int32.range(), (i32::MIN as f64, i32::MAX as f64));
    }

    #[test]
    fn test_array_has_no_width() {
        assert_eq!(Dtype::Array.bytes_per_element(), None);
        assert!(!Dtype::Array.is_binary());
        assert_eq!(Dtype::Float64.bytes_per_element(), Some(8));
    }

    #[test]
    fn test_integer_store_truncates_and_wraps() {
        assert_eq!(i16::from_f64(-16384.25), -16384);
        assert_eq!(i16::from_f64(32767.9), 32767);
        assert_eq!(i16::from_f64(32768.0), -32768);
        assert_eq!(u8::from_f64(256.0), 0);
        assert_eq!(u8::from_f64(-1.0), 255);
        assert_eq!(i8::from_f64(f64::NAN), 0);
        assert_eq!(u32::from_f64(f64::INFINITY), 0);
        assert_eq!(u32::from_f64(4_294_967_295.0), u32::MAX);
    }

    #[test]
    fn test_clamped_store_rounds_half_to_even() {
        assert_eq!(clamped_u8(1.5), 2);
        assert_eq!(clamped_u8(2.5), 2);
        assert_eq!(clamped_u8(300.0), 255);
        assert_eq!(clamped_u8(-4.0), 0);
        assert_eq!(clamped_u8(f64::NAN), 0);
    }

    #[test]
    fn test_endianness() {
        assert_eq!(Endianness::Le.opposite(), Endianness::Be);
        assert!(Endianness::native().is_native());
        assert_eq!("BE".parse::<Endianness>().unwrap(), Endianness::Be);
        assert_eq!(Endianness::Le.to_string(), "le");
    }
}
