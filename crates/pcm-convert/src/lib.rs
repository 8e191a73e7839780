//! # pcm-convert: PCM sample format conversion
//!
//! Converts a buffer of uncompressed audio samples between sample types,
//! channel layouts and byte orders in a single synchronous pass.
//!
//! ## Features
//!
//! - **Sample types**: unsigned and signed 8/16/32-bit integers, clamped
//!   unsigned bytes, 32/64-bit floats, generic numeric arrays and raw bytes
//! - **Range mapping**: samples are rescaled linearly between the natural
//!   ranges of the two types (floats live in `[-1, 1]`) and clamped
//! - **Layouts**: interleaved (`L R L R`) and planar (`L L R R`)
//! - **Byte order**: little- and big-endian input and output
//!
//! ## Usage
//!
//! ```rust
//! use pcm_convert::{convert, PcmData};
//!
//! // Two stereo frames of 8-bit audio, interleaved
//! let samples = [0u8, 255, 255, 0];
//!
//! // To planar float32 (the default target) and to big-endian int16
//! let floats = pcm_convert::convert_default(&samples, "uint8 interleaved")?;
//! assert_eq!(floats, PcmData::from(vec![-1.0f32, 1.0, 1.0, -1.0]));
//!
//! let ints = convert(&samples, "uint8 interleaved", "int16 be")?;
//! assert_eq!(ints.len(), 4);
//! # Ok::<(), pcm_convert::ConvertError>(())
//! ```
//!
//! ## Format strings
//!
//! Whitespace-separated, case-insensitive tokens:
//! `planar | interleaved | mono | stereo | quad | 5.1 | le | be | <dtype>`,
//! where `<dtype>` is one of `uint8`, `uint8_clamped`, `uint16`, `uint32`,
//! `int8`, `int16`, `int32`, `float32`, `float64`, `array` or `arraybuffer`.
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for format types (enabled by default)

#![deny(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod buffer;
pub mod convert;
pub mod dtype;
pub mod error;
pub mod format;

// Re-export commonly used types and functions
pub use buffer::PcmData;
pub use convert::{convert, convert_default, try_convert};
pub use dtype::{Dtype, DtypeInfo, Endianness, Sample};
pub use error::{ConvertError, ErrorCategory, Result};
pub use format::{FormatArg, FormatDescriptor, FormatSpec, parse, resolve};

/// Version information for the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Names accepted for the dtype token
pub const SUPPORTED_DTYPES: &[&str] = &[
    "uint8",
    "uint8_clamped",
    "uint16",
    "uint32",
    "int8",
    "int16",
    "int32",
    "float32",
    "float64",
    "array",
    "arraybuffer",
];

/// Initialize the library
///
/// Installs a default `tracing` subscriber if none is set and builds the
/// dtype table up front. Safe to call multiple times; conversions work
/// without it.
pub fn init() -> Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let entries = dtype::init_table();

    tracing::info!("pcm-convert v{} initialized", VERSION);
    tracing::debug!("{} dtypes registered: {:?}", entries, SUPPORTED_DTYPES);

    Ok(())
}

/// Get library information
pub fn info() -> LibraryInfo {
    LibraryInfo {
        version: VERSION,
        supported_dtypes: SUPPORTED_DTYPES.to_vec(),
    }
}

/// Library information structure
#[derive(Debug, Clone)]
pub struct LibraryInfo {
    /// Library version
    pub version: &'static str,
    /// Accepted dtype names
    pub supported_dtypes: Vec<&'static str>,
}
