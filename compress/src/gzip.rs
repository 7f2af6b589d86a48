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

//! Gzip frames built from a reusable raw DEFLATE encoder

use crate::{Algorithm, Codec, CompressError, CompressResult};
use flate2::read::MultiGzDecoder;
use flate2::{Compress, Compression, Crc, FlushCompress, Status};
use std::fmt;
use std::io::{self, Read};

/// Member header: magic, CM=deflate, no flags, no mtime, no extra flags, unknown OS.
const GZIP_HEADER: [u8; 10] = [0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff];

/// Minimum spare output capacity kept available while deflating.
const MIN_SPARE: usize = 256;

/// Gzip codec producing one gzip member (RFC 1952) per frame.
///
/// The raw DEFLATE encoder is allocated on the first call and reset for every later frame,
/// so steady-state compression does not allocate encoder state. Decompression accepts any
/// number of concatenated members, which is exactly what a file of frames contains.
pub struct GzipCodec {
    level: Compression,
    deflate: Option<Compress>,
}

impl GzipCodec {
    /// Creates a codec using the default compression level.
    pub fn new() -> Self {
        Self::with_level(Compression::default())
    }

    /// Creates a codec using the given compression level.
    pub fn with_level(level: Compression) -> Self {
        Self {
            level,
            deflate: None,
        }
    }

    /// Configured compression level
    pub fn level(&self) -> Compression {
        self.level
    }

    fn encoder(&mut self) -> &mut Compress {
        let level = self.level;
        self.deflate
            .get_or_insert_with(|| Compress::new(level, false))
    }
}

impl Default for GzipCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GzipCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GzipCodec")
            .field("level", &self.level.level())
            .field("initialized", &self.deflate.is_some())
            .finish()
    }
}

impl Codec for GzipCodec {
    fn compress(&mut self, input: &[u8], out: &mut Vec<u8>) -> CompressResult<()> {
        let deflate = self.encoder();
        deflate.reset();

        out.extend_from_slice(&GZIP_HEADER);
        loop {
            if out.capacity() - out.len() < MIN_SPARE {
                out.reserve(input.len() / 2 + MIN_SPARE);
            }
            let consumed = deflate.total_in() as usize;
            let status = deflate
                .compress_vec(&input[consumed..], out, FlushCompress::Finish)
                .map_err(|error| CompressError::encode(Algorithm::Gzip, io::Error::from(error)))?;
            match status {
                Status::StreamEnd => break,
                Status::Ok | Status::BufError => continue,
            }
        }

        let mut crc = Crc::new();
        crc.update(input);
        out.extend_from_slice(&crc.sum().to_le_bytes());
        out.extend_from_slice(&crc.amount().to_le_bytes());
        Ok(())
    }

    fn decompress(&mut self, input: &[u8], out: &mut Vec<u8>) -> CompressResult<()> {
        if input.is_empty() {
            return Ok(());
        }
        let mut decoder = MultiGzDecoder::new(input);
        decoder
            .read_to_end(out)
            .map(|_| ())
            .map_err(|error| CompressError::decode(Algorithm::Gzip, error))
    }
}
