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

//! Zstandard frames from a reusable single-threaded compression context

use crate::{Algorithm, Codec, CompressError, CompressResult};
use std::fmt;
use std::io::Read;
use zstd::bulk::Compressor;
use zstd::stream::read::Decoder;

/// Zstandard codec producing one Zstandard frame (RFC 8878) per call.
///
/// The compression context is created on first use. If creating it fails, the failure is
/// kept and returned by every later call; the codec never retries. Each frame resets the
/// context's session, so frames are independent while the context memory is reused.
pub struct ZstdCodec {
    level: i32,
    encoder: Option<Result<Compressor<'static>, CompressError>>,
}

impl ZstdCodec {
    /// Creates a codec using [`zstd::DEFAULT_COMPRESSION_LEVEL`].
    pub fn new() -> Self {
        Self::with_level(zstd::DEFAULT_COMPRESSION_LEVEL)
    }

    /// Creates a codec using the given compression level.
    pub fn with_level(level: i32) -> Self {
        Self {
            level,
            encoder: None,
        }
    }

    /// Configured compression level
    pub fn level(&self) -> i32 {
        self.level
    }

    fn encoder(&mut self) -> CompressResult<&mut Compressor<'static>> {
        let level = self.level;
        self.encoder
            .get_or_insert_with(|| {
                Compressor::new(level).map_err(|error| CompressError::init(Algorithm::Zstd, error))
            })
            .as_mut()
            .map_err(|error| error.clone())
    }
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ZstdCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoder = match &self.encoder {
            None => "uninitialized",
            Some(Ok(_)) => "ready",
            Some(Err(_)) => "failed",
        };
        f.debug_struct("ZstdCodec")
            .field("level", &self.level)
            .field("encoder", &encoder)
            .finish()
    }
}

impl Codec for ZstdCodec {
    fn compress(&mut self, input: &[u8], out: &mut Vec<u8>) -> CompressResult<()> {
        let encoder = self.encoder()?;
        let start = out.len();
        out.resize(start + zstd::zstd_safe::compress_bound(input.len()), 0);
        match encoder.compress_to_buffer(input, &mut out[start..]) {
            Ok(written) => {
                out.truncate(start + written);
                Ok(())
            }
            Err(error) => {
                out.truncate(start);
                Err(CompressError::encode(Algorithm::Zstd, error))
            }
        }
    }

    fn decompress(&mut self, input: &[u8], out: &mut Vec<u8>) -> CompressResult<()> {
        if input.is_empty() {
            return Ok(());
        }
        let mut decoder =
            Decoder::new(input).map_err(|error| CompressError::decode(Algorithm::Zstd, error))?;
        decoder
            .read_to_end(out)
            .map(|_| ())
            .map_err(|error| CompressError::decode(Algorithm::Zstd, error))
    }
}
