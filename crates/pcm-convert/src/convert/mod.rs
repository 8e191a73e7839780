//! The conversion pipeline
//!
//! A conversion runs resolve, adapt, remap, relayout and re-endian in that
//! order. Each stage after resolution is skipped outright when its formats
//! already agree, and when dtype, layout and byte order all match the input
//! buffer is handed back untouched.

pub mod layout;
pub mod remap;

use crate::buffer::{PcmData, SampleView};
use crate::dtype::{Dtype, Sample, clamped_u8};
use crate::error::{ConvertError, Result};
use crate::format::{FormatArg, FormatDescriptor, resolve};
use std::borrow::Cow;
use tracing::{debug, trace};

/// Convert `buffer` from one sample format to another.
///
/// Formats are given as token strings (`"int16 interleaved le"`) or as
/// [`FormatSpec`](crate::FormatSpec) values; unset target fields inherit from
/// the source. The result is a fresh buffer whose variant matches the target
/// dtype, except when nothing needs converting, in which case `buffer` itself
/// comes back.
///
/// ```
/// use pcm_convert::{convert, PcmData};
///
/// let samples = [1.0f32, -1.0];
/// let out = convert(&samples, "float32", "int16")?;
/// assert_eq!(out, PcmData::from(vec![32767i16, -32768]));
/// # Ok::<(), pcm_convert::ConvertError>(())
/// ```
pub fn convert<'a, 'f, 't>(
    buffer: impl Into<PcmData<'a>>,
    from: impl Into<FormatArg<'f>>,
    to: impl Into<FormatArg<'t>>,
) -> Result<PcmData<'a>> {
    try_convert(Some(buffer.into()), Some(from.into()), Some(to.into()))
}

/// Convert `buffer` to planar `float32`, the default target
pub fn convert_default<'a, 'f>(
    buffer: impl Into<PcmData<'a>>,
    from: impl Into<FormatArg<'f>>,
) -> Result<PcmData<'a>> {
    try_convert(Some(buffer.into()), Some(from.into()), None)
}

/// Fully general form of [`convert`] where every argument may be absent.
///
/// A missing buffer or source format fails with
/// [`ConvertError::MissingArgument`] before anything is allocated.
pub fn try_convert<'a>(
    buffer: Option<PcmData<'a>>,
    from: Option<FormatArg<'_>>,
    to: Option<FormatArg<'_>>,
) -> Result<PcmData<'a>> {
    let buffer = buffer.ok_or_else(|| ConvertError::missing_argument("buffer"))?;
    let from = from.ok_or_else(|| ConvertError::missing_argument("from"))?;
    let (from, to) = resolve(&buffer, from, to)?;

    if from.is_same_layout(&to) {
        trace!("{} -> {}: formats match, returning input", from, to);
        return Ok(buffer);
    }
    debug!("converting {} samples: {} -> {}", buffer.len(), from, to);

    let view = SampleView::adapt(&buffer, &from);
    let output = match to.dtype() {
        Dtype::Uint8 => PcmData::Uint8(Cow::Owned(run(&view, &from, &to, u8::from_f64))),
        Dtype::Uint8Clamped => PcmData::Uint8Clamped(Cow::Owned(run(&view, &from, &to, clamped_u8))),
        Dtype::Uint16 => PcmData::Uint16(Cow::Owned(run(&view, &from, &to, u16::from_f64))),
        Dtype::Uint32 => PcmData::Uint32(Cow::Owned(run(&view, &from, &to, u32::from_f64))),
        Dtype::Int8 => PcmData::Int8(Cow::Owned(run(&view, &from, &to, i8::from_f64))),
        Dtype::Int16 => PcmData::Int16(Cow::Owned(run(&view, &from, &to, i16::from_f64))),
        Dtype::Int32 => PcmData::Int32(Cow::Owned(run(&view, &from, &to, i32::from_f64))),
        Dtype::Float32 => PcmData::Float32(Cow::Owned(run(&view, &from, &to, f32::from_f64))),
        Dtype::Float64 => PcmData::Float64(Cow::Owned(run(&view, &from, &to, f64::from_f64))),
        Dtype::ArrayBuffer => PcmData::Bytes(Cow::Owned(run(&view, &from, &to, u8::from_f64))),
        Dtype::Array => {
            let samples = remap::remap(&view, &from, &to, |value| value);
            PcmData::Array(relayout(samples, &from, &to))
        }
    };

    Ok(output)
}

/// Remap, relayout and re-endian into a fixed-width target buffer.
///
/// Elements are rewritten only when the two byte orders differ, and then
/// only if the target order is not already the host's.
fn run<T, F>(view: &SampleView<'_>, from: &FormatDescriptor, to: &FormatDescriptor, store: F) -> Vec<T>
where
    T: Sample,
    F: Fn(f64) -> T,
{
    let samples = remap::remap(view, from, to, store);
    let mut samples = relayout(samples, from, to);

    if from.endianness() != to.endianness() {
        if to.endianness().is_native() {
            trace!("target byte order {} is the host's, nothing to rewrite", to.endianness());
        } else {
            trace!("writing {} samples as {}", samples.len(), to.endianness());
            layout::swap_elements(&mut samples);
        }
    }

    samples
}

/// Reorder samples when the interleaving of the two formats differs.
///
/// The permutation uses the source channel count.
fn relayout<T: Copy>(samples: Vec<T>, from: &FormatDescriptor, to: &FormatDescriptor) -> Vec<T> {
    let channels = from.channels() as usize;
    match (from.interleaved(), to.interleaved()) {
        (true, false) => {
            trace!("deinterleaving {} channels", channels);
            layout::deinterleave(&samples, channels)
        }
        (false, true) => {
            trace!("interleaving {} channels", channels);
            layout::interleave(&samples, channels)
        }
        _ => samples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::Endianness;
    use crate::format::FormatSpec;

    #[test]
    fn test_same_format_returns_input() {
        let samples = [0.25f32, -0.25];
        let out = convert(&samples, "float32", "float32").unwrap();
        match out {
            PcmData::Float32(Cow::Borrowed(slice)) => {
                assert_eq!(slice.as_ptr(), samples.as_ptr());
            }
            other => panic!("expected borrowed input back, got {:?}", other),
        }
    }

    #[test]
    fn test_channel_count_alone_is_not_a_conversion() {
        let samples = [1u8, 2, 3];
        let out = convert(&samples, "uint8 mono", "uint8 quad").unwrap();
        assert!(out.is_borrowed());
    }

    #[test]
    fn test_missing_arguments() {
        assert_eq!(
            try_convert(None, Some("float32".into()), None).unwrap_err(),
            ConvertError::missing_argument("buffer")
        );
        assert_eq!(
            try_convert(Some(PcmData::from(vec![0u8])), None, None).unwrap_err(),
            ConvertError::missing_argument("from")
        );
    }

    #[test]
    fn test_parse_error_before_buffer_touched() {
        let err = convert(vec![0u8; 4], "uint8", "int16 surround").unwrap_err();
        assert_eq!(err, ConvertError::unrecognized_token("surround"));
    }

    #[test]
    fn test_clamped_target_rounds() {
        let out = convert(&[0.0f32, 1.0, -1.0], "float32", "uint8_clamped").unwrap();
        // 0.0 maps to 127.5, which rounds to even
        assert_eq!(out, PcmData::Uint8Clamped(Cow::Owned(vec![128, 255, 0])));
    }

    #[test]
    fn test_equal_ranges_cast_without_rescale() {
        let out = convert(&[0.5f64, -0.25], "float64", "float32").unwrap();
        assert_eq!(out, PcmData::from(vec![0.5f32, -0.25]));

        let out = convert(&[7u8, 200], "uint8", "uint8_clamped").unwrap();
        assert_eq!(out, PcmData::Uint8Clamped(Cow::Owned(vec![7, 200])));
    }

    #[test]
    fn test_array_target_ignores_byte_order() {
        let foreign = Endianness::native().opposite();
        let out = convert(
            &[0u8, 255],
            "uint8",
            FormatSpec::of(Dtype::Array).with_endianness(foreign),
        )
        .unwrap();
        assert_eq!(out, PcmData::array(vec![-1.0, 1.0]));
    }

    #[test]
    fn test_arraybuffer_target_is_bytes() {
        let out = convert(&[-1.0f32, 1.0], "float32", "arraybuffer").unwrap();
        assert_eq!(out, PcmData::bytes(vec![0u8, 255]));
    }

    #[test]
    fn test_matching_foreign_order_is_not_rewritten() {
        let foreign = Endianness::native().opposite();
        let out = convert(
            &[0.5f32, -0.25],
            FormatSpec::of(Dtype::Float32).with_endianness(foreign),
            FormatSpec::of(Dtype::Float64).with_endianness(foreign),
        )
        .unwrap();
        assert_eq!(out, PcmData::from(vec![0.5f64, -0.25]));
    }

    #[test]
    fn test_foreign_to_host_order_is_not_rewritten() {
        let foreign = Endianness::native().opposite();
        let out = convert(
            &[1000i16, -1000],
            FormatSpec::of(Dtype::Int16).with_endianness(foreign),
            FormatSpec::of(Dtype::Int16).with_endianness(Endianness::native()),
        )
        .unwrap();
        assert!(!out.is_borrowed());
        assert_eq!(out, PcmData::from(vec![1000i16, -1000]));
    }
}
