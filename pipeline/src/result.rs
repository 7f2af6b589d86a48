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

//! Error types and result aliases for pipeline operations

use logpipe_compress::CompressError;
use std::io;
use std::sync::Arc;

/// Result type for pipeline operations
///
/// ```
/// use logpipe::LogResult;
///
/// fn example() -> LogResult<usize> {
///     Ok(0)
/// }
/// ```
pub type LogResult<T> = Result<T, LogError>;

/// Errors that can occur while writing to or closing a pipeline stage
///
/// `LogError` is `Clone` so a stage can latch the first failure and return the very same
/// value on every later call. Sink errors are shared through an [`Arc`] for that reason.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LogError {
    /// The writer has already been closed
    #[error("Writer closed")]
    Closed,

    /// The inner writer accepted fewer bytes than it was given
    #[error("Short write: {written} of {expected} bytes written")]
    ShortWrite {
        /// Bytes the inner writer reported as written
        written: usize,
        /// Bytes that were handed to the inner writer
        expected: usize,
    },

    /// Encoder construction or frame encoding failed
    #[error("Codec error: {0}")]
    Codec(#[from] CompressError),

    /// The underlying sink reported an error
    #[error("I/O error: {0}")]
    Io(Arc<io::Error>),
}

impl LogError {
    /// Check if the error reports an operation on a closed writer
    pub fn is_closed(&self) -> bool {
        matches!(self, LogError::Closed)
    }

    /// Check if the error reports a short write
    pub fn is_short_write(&self) -> bool {
        matches!(self, LogError::ShortWrite { .. })
    }

    /// Check if the error was raised by the compression codec
    pub fn is_codec_error(&self) -> bool {
        matches!(self, LogError::Codec(_))
    }

    /// Kind of the equivalent [`io::Error`]
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            LogError::Closed => io::ErrorKind::BrokenPipe,
            LogError::ShortWrite { .. } => io::ErrorKind::WriteZero,
            LogError::Codec(error) => error.kind(),
            LogError::Io(error) => error.kind(),
        }
    }
}

impl From<io::Error> for LogError {
    fn from(error: io::Error) -> Self {
        LogError::Io(Arc::new(error))
    }
}

impl From<LogError> for io::Error {
    fn from(error: LogError) -> Self {
        io::Error::new(error.kind(), error)
    }
}
