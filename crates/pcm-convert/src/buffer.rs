//! PCM buffers and the buffer adapter
//!
//! [`PcmData`] is the tagged buffer type that goes into and comes out of a
//! conversion. Fixed-width variants hold a `Cow` slice so callers can lend a
//! buffer without giving it up; an unchanged conversion hands the very same
//! value back.
//!
//! [`SampleView`] is the adapter stage: it turns any `PcmData` into a
//! dtype-tagged sequence of numeric samples, reinterpreting raw bytes as the
//! source dtype and copying only when it has to.

use crate::dtype::{Dtype, Sample};
use crate::error::{ConvertError, Result};
use crate::format::FormatDescriptor;
use std::borrow::Cow;

/// A PCM sample buffer
#[derive(Debug, Clone, PartialEq)]
pub enum PcmData<'a> {
    /// Raw byte region, reinterpreted as the source dtype on conversion
    Bytes(Cow<'a, [u8]>),
    /// Unsigned 8-bit samples
    Uint8(Cow<'a, [u8]>),
    /// Unsigned 8-bit samples with clamped stores
    Uint8Clamped(Cow<'a, [u8]>),
    /// Unsigned 16-bit samples
    Uint16(Cow<'a, [u16]>),
    /// Unsigned 32-bit samples
    Uint32(Cow<'a, [u32]>),
    /// Signed 8-bit samples
    Int8(Cow<'a, [i8]>),
    /// Signed 16-bit samples
    Int16(Cow<'a, [i16]>),
    /// Signed 32-bit samples
    Int32(Cow<'a, [i32]>),
    /// 32-bit float samples
    Float32(Cow<'a, [f32]>),
    /// 64-bit float samples
    Float64(Cow<'a, [f64]>),
    /// Generic numeric sequence
    Array(Vec<f64>),
}

/// Apply the same expression to the slice inside every fixed-width variant
macro_rules! with_typed_slice {
    ($data:expr, $slice:ident => $body:expr, array $arr:ident => $arr_body:expr) => {
        match $data {
            PcmData::Bytes($slice) => $body,
            PcmData::Uint8($slice) => $body,
            PcmData::Uint8Clamped($slice) => $body,
            PcmData::Uint16($slice) => $body,
            PcmData::Uint32($slice) => $body,
            PcmData::Int8($slice) => $body,
            PcmData::Int16($slice) => $body,
            PcmData::Int32($slice) => $body,
            PcmData::Float32($slice) => $body,
            PcmData::Float64($slice) => $body,
            PcmData::Array($arr) => $arr_body,
        }
    };
}

impl<'a> PcmData<'a> {
    /// Wrap a raw byte region
    pub fn bytes(bytes: impl Into<Cow<'a, [u8]>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Borrow `length` bytes starting at `offset` as a raw byte region.
    ///
    /// Only that sub-region is reinterpreted on conversion, never the whole
    /// backing buffer.
    pub fn byte_region(buffer: &'a [u8], offset: usize, length: usize) -> Result<Self> {
        let end = offset
            .checked_add(length)
            .filter(|&end| end <= buffer.len())
            .ok_or(ConvertError::RegionOutOfBounds {
                offset,
                length,
                capacity: buffer.len(),
            })?;
        Ok(Self::Bytes(Cow::Borrowed(&buffer[offset..end])))
    }

    /// Wrap a generic numeric sequence
    pub fn array(values: impl Into<Vec<f64>>) -> Self {
        Self::Array(values.into())
    }

    /// Number of elements (bytes for [`PcmData::Bytes`])
    pub fn len(&self) -> usize {
        with_typed_slice!(self, s => s.len(), array a => a.len())
    }

    /// Whether the buffer holds no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`, widened to f64.
    ///
    /// Raw byte regions are read one byte per element.
    pub fn get(&self, index: usize) -> Option<f64> {
        with_typed_slice!(self, s => s.get(index).map(|v| v.to_f64()), array a => a.get(index).copied())
    }

    /// All elements widened to f64
    pub fn to_f64_vec(&self) -> Vec<f64> {
        with_typed_slice!(self, s => s.iter().map(|v| v.to_f64()).collect(), array a => a.clone())
    }

    /// Underlying byte region; `None` for the generic array variant
    pub fn as_bytes(&self) -> Option<&[u8]> {
        with_typed_slice!(self, s => Some(bytemuck::cast_slice(&**s)), array _a => None)
    }

    /// Whether the data is borrowed from the caller
    pub fn is_borrowed(&self) -> bool {
        with_typed_slice!(self, s => matches!(s, Cow::Borrowed(_)), array _a => false)
    }

    /// Detach from any borrowed storage
    pub fn into_owned(self) -> PcmData<'static> {
        match self {
            Self::Bytes(s) => PcmData::Bytes(Cow::Owned(s.into_owned())),
            Self::Uint8(s) => PcmData::Uint8(Cow::Owned(s.into_owned())),
            Self::Uint8Clamped(s) => PcmData::Uint8Clamped(Cow::Owned(s.into_owned())),
            Self::Uint16(s) => PcmData::Uint16(Cow::Owned(s.into_owned())),
            Self::Uint32(s) => PcmData::Uint32(Cow::Owned(s.into_owned())),
            Self::Int8(s) => PcmData::Int8(Cow::Owned(s.into_owned())),
            Self::Int16(s) => PcmData::Int16(Cow::Owned(s.into_owned())),
            Self::Int32(s) => PcmData::Int32(Cow::Owned(s.into_owned())),
            Self::Float32(s) => PcmData::Float32(Cow::Owned(s.into_owned())),
            Self::Float64(s) => PcmData::Float64(Cow::Owned(s.into_owned())),
            Self::Array(a) => PcmData::Array(a),
        }
    }

    /// Infer the source dtype from the buffer variant.
    ///
    /// Raw bytes default to `uint8` and a generic array to `float32`; every
    /// fixed-width variant maps to its own dtype.
    pub fn detect_dtype(&self) -> Dtype {
        match self {
            Self::Bytes(_) | Self::Uint8(_) => Dtype::Uint8,
            Self::Uint8Clamped(_) => Dtype::Uint8Clamped,
            Self::Uint16(_) => Dtype::Uint16,
            Self::Uint32(_) => Dtype::Uint32,
            Self::Int8(_) => Dtype::Int8,
            Self::Int16(_) => Dtype::Int16,
            Self::Int32(_) => Dtype::Int32,
            Self::Float32(_) => Dtype::Float32,
            Self::Float64(_) => Dtype::Float64,
            Self::Array(_) => Dtype::Float32,
        }
    }
}

macro_rules! impl_from_samples {
    ($ty:ty, $variant:ident) => {
        impl<'a> From<&'a [$ty]> for PcmData<'a> {
            fn from(samples: &'a [$ty]) -> Self {
                Self::$variant(Cow::Borrowed(samples))
            }
        }

        impl<'a, const N: usize> From<&'a [$ty; N]> for PcmData<'a> {
            fn from(samples: &'a [$ty; N]) -> Self {
                Self::$variant(Cow::Borrowed(samples.as_slice()))
            }
        }

        impl From<Vec<$ty>> for PcmData<'static> {
            fn from(samples: Vec<$ty>) -> Self {
                Self::$variant(Cow::Owned(samples))
            }
        }
    };
}

impl_from_samples!(u8, Uint8);
impl_from_samples!(u16, Uint16);
impl_from_samples!(u32, Uint32);
impl_from_samples!(i8, Int8);
impl_from_samples!(i16, Int16);
impl_from_samples!(i32, Int32);
impl_from_samples!(f32, Float32);
impl_from_samples!(f64, Float64);

/// Samples of one element type
#[derive(Debug, Clone)]
pub(crate) enum ViewData<'a> {
    U8(Cow<'a, [u8]>),
    U16(Cow<'a, [u16]>),
    U32(Cow<'a, [u32]>),
    I8(Cow<'a, [i8]>),
    I16(Cow<'a, [i16]>),
    I32(Cow<'a, [i32]>),
    F32(Cow<'a, [f32]>),
    F64(Cow<'a, [f64]>),
}

/// A dtype-tagged numeric view over an input buffer
#[derive(Debug, Clone)]
pub(crate) struct SampleView<'a> {
    dtype: Dtype,
    data: ViewData<'a>,
}

impl<'a> SampleView<'a> {
    /// Build the view for `buffer` as described by the source descriptor.
    ///
    /// Typed buffers are used as-is. Raw bytes are reinterpreted as the
    /// source dtype over exactly their own extent. Elements are always read
    /// in host byte order; the declared source order only matters when the
    /// output is written.
    pub(crate) fn adapt(buffer: &'a PcmData<'_>, from: &FormatDescriptor) -> Self {
        let dtype = from.dtype();
        let data = match buffer {
            PcmData::Bytes(bytes) => reinterpret_bytes(bytes, dtype),
            PcmData::Uint8(s) | PcmData::Uint8Clamped(s) => ViewData::U8(Cow::Borrowed(&**s)),
            PcmData::Uint16(s) => ViewData::U16(Cow::Borrowed(&**s)),
            PcmData::Uint32(s) => ViewData::U32(Cow::Borrowed(&**s)),
            PcmData::Int8(s) => ViewData::I8(Cow::Borrowed(&**s)),
            PcmData::Int16(s) => ViewData::I16(Cow::Borrowed(&**s)),
            PcmData::Int32(s) => ViewData::I32(Cow::Borrowed(&**s)),
            PcmData::Float32(s) => ViewData::F32(Cow::Borrowed(&**s)),
            PcmData::Float64(s) => ViewData::F64(Cow::Borrowed(&**s)),
            PcmData::Array(a) => {
                return Self {
                    dtype,
                    data: ViewData::F64(Cow::Borrowed(a.as_slice())),
                };
            }
        };

        Self { dtype, data }
    }

    /// Dtype the view is tagged with
    pub(crate) fn dtype(&self) -> Dtype {
        self.dtype
    }

    /// Number of samples
    pub(crate) fn len(&self) -> usize {
        match &self.data {
            ViewData::U8(s) => s.len(),
            ViewData::U16(s) => s.len(),
            ViewData::U32(s) => s.len(),
            ViewData::I8(s) => s.len(),
            ViewData::I16(s) => s.len(),
            ViewData::I32(s) => s.len(),
            ViewData::F32(s) => s.len(),
            ViewData::F64(s) => s.len(),
        }
    }

    /// Map every sample (as f64) into a new target buffer
    pub(crate) fn map_into<T, F>(&self, mut store: F) -> Vec<T>
    where
        F: FnMut(f64) -> T,
    {
        fn collect<S: Sample, T>(samples: &[S], store: &mut impl FnMut(f64) -> T) -> Vec<T> {
            samples.iter().map(|s| store(s.to_f64())).collect()
        }

        match &self.data {
            ViewData::U8(s) => collect(s, &mut store),
            ViewData::U16(s) => collect(s, &mut store),
            ViewData::U32(s) => collect(s, &mut store),
            ViewData::I8(s) => collect(s, &mut store),
            ViewData::I16(s) => collect(s, &mut store),
            ViewData::I32(s) => collect(s, &mut store),
            ViewData::F32(s) => collect(s, &mut store),
            ViewData::F64(s) => collect(s, &mut store),
        }
    }
}

/// Reinterpret a byte region as elements of `dtype`.
///
/// Borrows when the region is suitably aligned, otherwise makes exactly one
/// copy. Trailing bytes that do not fill a whole element are ignored.
fn reinterpret_bytes<'a>(bytes: &'a [u8], dtype: Dtype) -> ViewData<'a> {
    match dtype {
        Dtype::Uint8 | Dtype::Uint8Clamped | Dtype::ArrayBuffer => ViewData::U8(Cow::Borrowed(bytes)),
        Dtype::Int8 => ViewData::I8(cast_bytes(bytes)),
        Dtype::Uint16 => ViewData::U16(cast_bytes(bytes)),
        Dtype::Uint32 => ViewData::U32(cast_bytes(bytes)),
        Dtype::Int16 => ViewData::I16(cast_bytes(bytes)),
        Dtype::Int32 => ViewData::I32(cast_bytes(bytes)),
        Dtype::Float32 => ViewData::F32(cast_bytes(bytes)),
        Dtype::Float64 | Dtype::Array => ViewData::F64(cast_bytes(bytes)),
    }
}

fn cast_bytes<T: Sample>(bytes: &[u8]) -> Cow<'_, [T]> {
    let width = std::mem::size_of::<T>();
    let whole = &bytes[..bytes.len() - bytes.len() % width];
    match bytemuck::try_cast_slice(whole) {
        Ok(samples) => Cow::Borrowed(samples),
        Err(_) => Cow::Owned(bytemuck::pod_collect_to_vec(whole)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::Endianness;
    use crate::format::FormatSpec;

    fn descriptor(spec: &str) -> FormatDescriptor {
        spec.parse::<FormatSpec>().unwrap().normalize().unwrap()
    }

    #[test]
    fn test_detect_dtype() {
        assert_eq!(PcmData::bytes(vec![0u8; 4]).detect_dtype(), Dtype::Uint8);
        assert_eq!(PcmData::from(vec![0.0f32]).detect_dtype(), Dtype::Float32);
        assert_eq!(PcmData::from(vec![0.0f64]).detect_dtype(), Dtype::Float64);
        assert_eq!(PcmData::from(vec![0i16]).detect_dtype(), Dtype::Int16);
        assert_eq!(PcmData::from(vec![0u32]).detect_dtype(), Dtype::Uint32);
        assert_eq!(PcmData::array(vec![0.0]).detect_dtype(), Dtype::Float32);
    }

    #[test]
    fn test_byte_region_bounds() {
        let backing = [1u8, 2, 3, 4, 5, 6];
        let region = PcmData::byte_region(&backing, 2, 3).unwrap();
        assert_eq!(region.as_bytes(), Some(&[3u8, 4, 5][..]));

        let err = PcmData::byte_region(&backing, 4, 3).unwrap_err();
        assert!(matches!(err, ConvertError::RegionOutOfBounds { capacity: 6, .. }));
    }

    #[test]
    fn test_as_bytes_uses_native_layout() {
        let data = PcmData::from(vec![0x0102u16]);
        let expected = 0x0102u16.to_ne_bytes();
        assert_eq!(data.as_bytes(), Some(&expected[..]));
        assert_eq!(PcmData::array(vec![1.0]).as_bytes(), None);
    }

    #[test]
    fn test_typed_input_is_viewed_without_copy() {
        let samples = [1i16, -2, 3];
        let data = PcmData::from(&samples);
        let view = SampleView::adapt(&data, &descriptor("int16"));
        assert!(matches!(view.data, ViewData::I16(Cow::Borrowed(_))));
        assert_eq!(view.map_into(|v| v), vec![1.0, -2.0, 3.0]);
    }

    #[test]
    fn test_bytes_reinterpreted_as_source_dtype() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&1000i16.to_ne_bytes());
        raw.extend_from_slice(&(-1000i16).to_ne_bytes());
        raw.push(0xAA); // incomplete trailing element
        let data = PcmData::bytes(raw);
        let view = SampleView::adapt(&data, &descriptor("int16"));
        assert_eq!(view.dtype(), Dtype::Int16);
        assert_eq!(view.len(), 2);
        assert_eq!(view.map_into(|v| v), vec![1000.0, -1000.0]);
    }

    #[test]
    fn test_sub_region_only_reinterprets_its_own_bytes() {
        let mut backing = vec![0xFFu8; 2];
        backing.extend_from_slice(&0.5f32.to_ne_bytes());
        backing.extend_from_slice(&[0xFF; 3]);
        let region = PcmData::byte_region(&backing, 2, 4).unwrap();
        let view = SampleView::adapt(&region, &descriptor("float32"));
        assert_eq!(view.map_into(|v| v), vec![0.5]);
    }

    #[test]
    fn test_declared_byte_order_does_not_affect_reading() {
        let foreign = Endianness::native().opposite();
        let raw = 258u16.to_ne_bytes().to_vec();
        let data = PcmData::bytes(raw);
        let from = FormatSpec::of(Dtype::Uint16)
            .with_endianness(foreign)
            .normalize()
            .unwrap();
        let view = SampleView::adapt(&data, &from);
        assert_eq!(view.dtype(), Dtype::Uint16);
        assert_eq!(view.map_into(|v| v), vec![258.0]);
    }
}
