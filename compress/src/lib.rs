//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! # Frame Compression Codecs
//!
//! This crate provides the compression layer of the logpipe output pipeline. Every call to
//! [`Codec::compress`] turns one chunk of log output into one complete, independently
//! decodable frame. Frames can be written back-to-back to a file with no extra framing and
//! the whole file decodes to the concatenation of the chunks, because both supported
//! formats define multi-frame concatenation natively.
//!
//! ## Features
//!
//! - **Multiple Compression Algorithms**: Gzip, Zstd and an uncompressed pass-through mode
//! - **Self-contained Frames**: Each compress call emits headers and trailers for its own frame
//! - **Encoder Reuse**: Encoders are built lazily once per codec and reset between frames
//! - **Enum Dispatch**: [`AlgorithmCodec`] selects the codec at runtime without `dyn` calls
//! - **Suffix Detection**: [`Algorithm::from_path`] maps `.gz` and `.zst` file names
//!
//! ## Basic Usage
//!
//! ```rust
//! use logpipe_compress::{Algorithm, Codec};
//!
//! # fn example() -> logpipe_compress::CompressResult<()> {
//! let mut codec = Algorithm::Zstd.codec();
//!
//! let mut stream = Vec::new();
//! codec.compress(b"first line\n", &mut stream)?;
//! codec.compress(b"second line\n", &mut stream)?;
//!
//! let mut plain = Vec::new();
//! codec.decompress(&stream, &mut plain)?;
//! assert_eq!(plain, b"first line\nsecond line\n");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Algorithm Selection
//!
//! - **`Algorithm::None`**: No compression (pass-through mode)
//! - **`Algorithm::Gzip`**: One gzip member per frame (RFC 1952)
//! - **`Algorithm::Zstd`**: One Zstandard frame per frame (RFC 8878)
//!
//! ## Thread Safety
//!
//! Codecs take `&mut self` and own their encoder exclusively. They are `Send`, so they can be
//! moved into the writer that uses them, but a single instance is never shared.

mod gzip;
mod nop;
mod result;
mod zstandard;

pub use gzip::GzipCodec;
pub use nop::NopCodec;
pub use result::{CompressError, CompressResult};
pub use zstandard::ZstdCodec;

use std::fmt;
use std::path::Path;

/// Compression algorithm selection for log output.
///
/// | Algorithm | Extension | Format | Use Case |
/// |-----------|-----------|--------|----------|
/// | `None` | | Raw bytes | Terminals, plain text logs |
/// | `Gzip` | `.gz` | Concatenated gzip members | Maximum tool compatibility |
/// | `Zstd` | `.zst` | Concatenated Zstandard frames | Default for log files |
///
/// # Examples
///
/// ```rust
/// use logpipe_compress::Algorithm;
///
/// assert_eq!(Algorithm::from_path("app.log.zst"), Algorithm::Zstd);
/// assert_eq!(Algorithm::from_path("app.log.gz"), Algorithm::Gzip);
/// assert_eq!(Algorithm::from_path("app.log"), Algorithm::None);
/// assert_eq!(Algorithm::Zstd.to_string(), "zstd");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    #[default]
    None,
    Gzip,
    Zstd,
}

impl Algorithm {
    /// Select an algorithm from the suffix of a file name.
    ///
    /// Only the final extension counts, and it is matched case-sensitively:
    /// `.gz` selects [`Algorithm::Gzip`], `.zst` selects [`Algorithm::Zstd`] and anything
    /// else disables compression.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("gz") => Algorithm::Gzip,
            Some("zst") => Algorithm::Zstd,
            _ => Algorithm::None,
        }
    }

    /// File extension conventionally used for this algorithm, including the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Algorithm::None => "",
            Algorithm::Gzip => ".gz",
            Algorithm::Zstd => ".zst",
        }
    }

    /// Build a fresh codec for this algorithm using the library default level.
    ///
    /// The encoder inside the codec is not constructed until the first frame is compressed.
    pub fn codec(self) -> AlgorithmCodec {
        AlgorithmCodec::new(self)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Algorithm::None => "none",
            Algorithm::Gzip => "gzip",
            Algorithm::Zstd => "zstd",
        })
    }
}

/// A frame-oriented compression codec.
///
/// Implementations append to the output buffer and never read from it, so callers may
/// accumulate several frames in one buffer.
pub trait Codec: Send {
    /// Compress `input` into exactly one complete frame appended to `out`.
    ///
    /// The frame carries its own header and trailer and can be decoded without any other
    /// frame. An empty input still produces a (small) valid frame.
    fn compress(&mut self, input: &[u8], out: &mut Vec<u8>) -> CompressResult<()>;

    /// Decode a sequence of zero or more concatenated frames, appending the plain bytes
    /// to `out`.
    fn decompress(&mut self, input: &[u8], out: &mut Vec<u8>) -> CompressResult<()>;
}

impl<C> Codec for Box<C>
where
    C: Codec + ?Sized,
{
    fn compress(&mut self, input: &[u8], out: &mut Vec<u8>) -> CompressResult<()> {
        (**self).compress(input, out)
    }

    fn decompress(&mut self, input: &[u8], out: &mut Vec<u8>) -> CompressResult<()> {
        (**self).decompress(input, out)
    }
}

/// Codec selected at runtime from an [`Algorithm`].
///
/// The enum holds the concrete codec for the selected algorithm so that dispatch is a
/// `match` rather than a virtual call.
#[derive(Debug)]
pub enum AlgorithmCodec {
    None(NopCodec),
    Gzip(GzipCodec),
    Zstd(ZstdCodec),
}

impl AlgorithmCodec {
    /// Creates a codec for the given algorithm with default settings.
    pub fn new(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::None => AlgorithmCodec::None(NopCodec),
            Algorithm::Gzip => AlgorithmCodec::Gzip(GzipCodec::new()),
            Algorithm::Zstd => AlgorithmCodec::Zstd(ZstdCodec::new()),
        }
    }

    /// Returns the algorithm implemented by this codec.
    pub fn algorithm(&self) -> Algorithm {
        match self {
            AlgorithmCodec::None(_) => Algorithm::None,
            AlgorithmCodec::Gzip(_) => Algorithm::Gzip,
            AlgorithmCodec::Zstd(_) => Algorithm::Zstd,
        }
    }
}

impl From<GzipCodec> for AlgorithmCodec {
    fn from(codec: GzipCodec) -> Self {
        AlgorithmCodec::Gzip(codec)
    }
}

impl From<ZstdCodec> for AlgorithmCodec {
    fn from(codec: ZstdCodec) -> Self {
        AlgorithmCodec::Zstd(codec)
    }
}

impl Codec for AlgorithmCodec {
    fn compress(&mut self, input: &[u8], out: &mut Vec<u8>) -> CompressResult<()> {
        match self {
            AlgorithmCodec::None(codec) => codec.compress(input, out),
            AlgorithmCodec::Gzip(codec) => codec.compress(input, out),
            AlgorithmCodec::Zstd(codec) => codec.compress(input, out),
        }
    }

    fn decompress(&mut self, input: &[u8], out: &mut Vec<u8>) -> CompressResult<()> {
        match self {
            AlgorithmCodec::None(codec) => codec.decompress(input, out),
            AlgorithmCodec::Gzip(codec) => codec.decompress(input, out),
            AlgorithmCodec::Zstd(codec) => codec.decompress(input, out),
        }
    }
}
