//! Format descriptors
//!
//! A [`FormatSpec`] is what the caller hands in: any subset of dtype, channel
//! count, layout and byte order, either built directly or parsed from a short
//! token string such as `"int16 interleaved stereo le"`. Normalizing a spec
//! fills in every default and yields a [`FormatDescriptor`], which is the
//! only form the conversion pipeline works with.

use crate::buffer::PcmData;
use crate::dtype::{Dtype, Endianness};
use crate::error::{ConvertError, Result};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Partial format description; unset fields take their defaults on normalization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct FormatSpec {
    /// Sample type
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub dtype: Option<Dtype>,
    /// Number of channels
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub channels: Option<u32>,
    /// Interleaved (frame-by-frame) rather than planar layout
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub interleaved: Option<bool>,
    /// Byte order of multi-byte samples
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub endianness: Option<Endianness>,
}

impl FormatSpec {
    /// Create an empty spec
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a spec with only the dtype set
    pub fn of(dtype: Dtype) -> Self {
        Self::new().with_dtype(dtype)
    }

    /// Set dtype
    pub fn with_dtype(mut self, dtype: Dtype) -> Self {
        self.dtype = Some(dtype);
        self
    }

    /// Set channel count
    pub fn with_channels(mut self, channels: u32) -> Self {
        self.channels = Some(channels);
        self
    }

    /// Set interleaving
    pub fn with_interleaved(mut self, interleaved: bool) -> Self {
        self.interleaved = Some(interleaved);
        self
    }

    /// Set byte order
    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = Some(endianness);
        self
    }

    /// Whether no field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fill every unset field with its default.
    ///
    /// Layout defaults to planar, channels to 2 when interleaved and 1
    /// otherwise, dtype to `float32` and byte order to the host's. The
    /// numeric range always comes from the dtype.
    pub fn normalize(&self) -> Result<FormatDescriptor> {
        let interleaved = self.interleaved.unwrap_or(false);
        let channels = self.channels.unwrap_or(if interleaved { 2 } else { 1 });
        if channels == 0 {
            return Err(ConvertError::InvalidChannelCount { channels });
        }
        let dtype = self.dtype.unwrap_or(Dtype::Float32);
        let (min, max) = dtype.range();

        Ok(FormatDescriptor {
            dtype,
            channels,
            interleaved,
            endianness: self.endianness.unwrap_or_else(Endianness::native),
            min,
            max,
        })
    }
}

/// Parse a format string.
///
/// Tokens are whitespace-separated and case-insensitive, applied left to
/// right with later tokens overriding earlier ones:
///
/// - `planar` / `interleaved` set the layout, and the channel count to 2 if
///   nothing set it yet
/// - `mono`, `stereo`, `quad`, `5.1` set 1, 2, 4 and 6 channels
/// - `le` / `be` set the byte order
/// - any dtype name sets the dtype (`arraybuffer` means raw bytes)
///
/// A string with no tokens at all is rejected like an unknown token.
///
/// ```
/// use pcm_convert::{parse, Dtype};
///
/// let spec = parse("Int16 interleaved")?;
/// assert_eq!(spec.dtype, Some(Dtype::Int16));
/// assert_eq!(spec.channels, Some(2));
/// # Ok::<(), pcm_convert::ConvertError>(())
/// ```
pub fn parse(format: &str) -> Result<FormatSpec> {
    let mut spec = FormatSpec::default();

    if format.trim().is_empty() {
        return Err(ConvertError::unrecognized_token(""));
    }

    for part in format.split_whitespace() {
        let token = part.to_lowercase();
        match token.as_str() {
            "planar" => {
                spec.interleaved = Some(false);
                spec.channels.get_or_insert(2);
            }
            "interleaved" => {
                spec.interleaved = Some(true);
                spec.channels.get_or_insert(2);
            }
            "mono" => spec.channels = Some(1),
            "stereo" => spec.channels = Some(2),
            "quad" => spec.channels = Some(4),
            "5.1" => spec.channels = Some(6),
            "le" => spec.endianness = Some(Endianness::Le),
            "be" => spec.endianness = Some(Endianness::Be),
            name => {
                let dtype =
                    Dtype::from_name(name).map_err(|_| ConvertError::unrecognized_token(part))?;
                spec.dtype = Some(dtype);
            }
        }
    }

    Ok(spec)
}

impl FromStr for FormatSpec {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

/// Fully populated format description
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FormatDescriptor {
    dtype: Dtype,
    channels: u32,
    interleaved: bool,
    endianness: Endianness,
    min: f64,
    max: f64,
}

impl FormatDescriptor {
    /// Sample type
    pub fn dtype(&self) -> Dtype {
        self.dtype
    }

    /// Number of channels
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Whether samples are interleaved
    pub fn interleaved(&self) -> bool {
        self.interleaved
    }

    /// Byte order
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Lowest sample value for the dtype
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Highest sample value for the dtype
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Re-derive the range from the dtype. Idempotent.
    pub fn normalize(self) -> Self {
        let (min, max) = self.dtype.range();
        Self { min, max, ..self }
    }

    /// Whether converting between `self` and `other` would change nothing:
    /// same dtype, layout and byte order
    pub fn is_same_layout(&self, other: &Self) -> bool {
        self.dtype == other.dtype
            && self.interleaved == other.interleaved
            && self.endianness == other.endianness
    }

    /// Whether both descriptors share exactly the same numeric range
    pub fn same_range(&self, other: &Self) -> bool {
        self.min == other.min && self.max == other.max
    }
}

impl From<FormatDescriptor> for FormatSpec {
    fn from(descriptor: FormatDescriptor) -> Self {
        Self {
            dtype: Some(descriptor.dtype),
            channels: Some(descriptor.channels),
            interleaved: Some(descriptor.interleaved),
            endianness: Some(descriptor.endianness),
        }
    }
}

impl fmt::Display for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = if self.interleaved { "interleaved" } else { "planar" };
        write!(f, "{} {} ", self.dtype, layout)?;
        match self.channels {
            1 => write!(f, "mono")?,
            2 => write!(f, "stereo")?,
            4 => write!(f, "quad")?,
            6 => write!(f, "5.1")?,
            n => write!(f, "{}ch", n)?,
        }
        write!(f, " {}", self.endianness)
    }
}

/// A format argument: either a format string or a structured spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatArg<'a> {
    /// Token string, parsed with [`parse`]
    Text(Cow<'a, str>),
    /// Structured spec
    Spec(FormatSpec),
}

impl FormatArg<'_> {
    /// Whether this is the empty string
    pub fn is_empty_text(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }

    /// Resolve into a spec, parsing text with [`parse`]
    pub fn into_spec(self) -> Result<FormatSpec> {
        match self {
            Self::Text(text) => parse(&text),
            Self::Spec(spec) => Ok(spec),
        }
    }
}

impl<'a> From<&'a str> for FormatArg<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(Cow::Borrowed(text))
    }
}

impl From<String> for FormatArg<'static> {
    fn from(text: String) -> Self {
        Self::Text(Cow::Owned(text))
    }
}

impl<'a> From<FormatSpec> for FormatArg<'a> {
    fn from(spec: FormatSpec) -> Self {
        Self::Spec(spec)
    }
}

impl<'a> From<FormatDescriptor> for FormatArg<'a> {
    fn from(descriptor: FormatDescriptor) -> Self {
        Self::Spec(descriptor.into())
    }
}

/// Resolve the source and target formats for converting `buffer`.
///
/// An absent target means planar `float32`. An empty source string counts
/// as a missing source; any other text, including an empty target string,
/// must parse. Missing pieces are filled in this order: the source dtype is inferred from the buffer, then the target
/// inherits the source channel count and dtype, then both are normalized.
pub fn resolve(
    buffer: &PcmData<'_>,
    from: FormatArg<'_>,
    to: Option<FormatArg<'_>>,
) -> Result<(FormatDescriptor, FormatDescriptor)> {
    if from.is_empty_text() {
        return Err(ConvertError::missing_argument("from"));
    }
    let mut from = from.into_spec()?;
    let mut to = match to {
        Some(arg) => arg.into_spec()?,
        None => FormatSpec::of(Dtype::Float32).with_interleaved(false),
    };

    if from.dtype.is_none() {
        let detected = buffer.detect_dtype();
        tracing::trace!("source dtype inferred from buffer: {}", detected);
        from.dtype = Some(detected);
    }
    if to.channels.is_none() {
        to.channels = from.channels;
    }
    if to.dtype.is_none() {
        to.dtype = from.dtype;
    }

    Ok((from.normalize()?, to.normalize()?))
}
