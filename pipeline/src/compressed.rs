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

//! Frame-per-write compression stage

use crate::{LogError, LogResult, WriteClose};
use logpipe_compress::{Algorithm, AlgorithmCodec, Codec};
use metrics::counter;

/// Compresses every write into one self-contained frame before passing it on.
///
/// Each call to [`WriteClose::write`] results in exactly one call to the inner writer
/// carrying exactly one complete frame, so frames are never split or merged. Placed
/// below a [`Buffer`](crate::Buffer), one frame is produced per flush.
///
/// # Examples
///
/// ```rust
/// use logpipe::{CompressedWriter, IoSink, WriteClose};
/// use logpipe_compress::{Algorithm, Codec};
///
/// # fn example() -> logpipe::LogResult<()> {
/// let mut writer = CompressedWriter::new(IoSink::new(Vec::new()), Algorithm::Gzip.codec());
/// assert_eq!(writer.write(b"hello\n")?, 6);
///
/// let stream = writer.get_ref().get_ref().unwrap().clone();
/// let mut plain = Vec::new();
/// Algorithm::Gzip.codec().decompress(&stream, &mut plain)?;
/// assert_eq!(plain, b"hello\n");
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug)]
pub struct CompressedWriter<W, C = AlgorithmCodec> {
    inner: W,
    codec: C,
    scratch: Vec<u8>,
}

impl<W, C> CompressedWriter<W, C>
where
    W: WriteClose,
    C: Codec,
{
    /// Wrap `inner`, compressing with `codec`.
    ///
    /// The codec is owned exclusively by this writer.
    pub fn new(inner: W, codec: C) -> Self {
        Self {
            inner,
            codec,
            scratch: Vec::new(),
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn write_frame(&mut self, buf: &[u8]) -> LogResult<()> {
        self.codec.compress(buf, &mut self.scratch)?;
        let expected = self.scratch.len();
        let written = self.inner.write(&self.scratch)?;
        if written < expected {
            return Err(LogError::ShortWrite { written, expected });
        }
        counter!("logpipe.compress.frames").increment(1);
        counter!("logpipe.compress.bytes_in").increment(buf.len() as u64);
        counter!("logpipe.compress.bytes_out").increment(expected as u64);
        Ok(())
    }
}

impl<W> CompressedWriter<W, AlgorithmCodec>
where
    W: WriteClose,
{
    /// Wrap `inner` with a default codec for `algorithm`.
    pub fn with_algorithm(inner: W, algorithm: Algorithm) -> Self {
        Self::new(inner, algorithm.codec())
    }

    /// The algorithm frames are compressed with
    pub fn algorithm(&self) -> Algorithm {
        self.codec.algorithm()
    }
}

impl<W, C> WriteClose for CompressedWriter<W, C>
where
    W: WriteClose,
    C: Codec,
{
    fn write(&mut self, buf: &[u8]) -> LogResult<usize> {
        let result = self.write_frame(buf);
        self.scratch.clear();
        result.map(|()| buf.len())
    }

    fn close(&mut self) -> LogResult<()> {
        self.inner.close()
    }
}
