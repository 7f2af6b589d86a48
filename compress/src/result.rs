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

//! Error types and result aliases for codec operations

use crate::Algorithm;
use std::io;

/// Result type for codec operations
///
/// ```
/// use logpipe_compress::CompressResult;
///
/// fn example() -> CompressResult<()> {
///     Ok(())
/// }
/// ```
pub type CompressResult<T> = Result<T, CompressError>;

/// Errors raised while constructing or running a codec.
///
/// The error is cheap to clone so that callers can latch it and hand the same
/// value back on every later call. The originating [`io::Error`] is reduced to
/// its kind and message for that reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompressError {
    /// The encoder could not be constructed.
    ///
    /// Codecs cache this error: every later call on the same instance returns it
    /// again without retrying the construction.
    #[error("Failed to initialize {algorithm} encoder: {message}")]
    Init {
        /// Algorithm whose encoder failed
        algorithm: Algorithm,
        /// Kind of the underlying I/O error
        kind: io::ErrorKind,
        /// Description reported by the codec library
        message: String,
    },

    /// Encoding a frame failed.
    #[error("{algorithm} compression failed: {message}")]
    Encode {
        /// Algorithm that failed
        algorithm: Algorithm,
        /// Kind of the underlying I/O error
        kind: io::ErrorKind,
        /// Description reported by the codec library
        message: String,
    },

    /// Decoding a stream of frames failed.
    #[error("{algorithm} decompression failed: {message}")]
    Decode {
        /// Algorithm that failed
        algorithm: Algorithm,
        /// Kind of the underlying I/O error
        kind: io::ErrorKind,
        /// Description reported by the codec library
        message: String,
    },
}

impl CompressError {
    pub(crate) fn init(algorithm: Algorithm, error: io::Error) -> Self {
        CompressError::Init {
            algorithm,
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    pub(crate) fn encode(algorithm: Algorithm, error: io::Error) -> Self {
        CompressError::Encode {
            algorithm,
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    pub(crate) fn decode(algorithm: Algorithm, error: io::Error) -> Self {
        CompressError::Decode {
            algorithm,
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    /// The algorithm that raised this error
    pub fn algorithm(&self) -> Algorithm {
        match self {
            CompressError::Init { algorithm, .. }
            | CompressError::Encode { algorithm, .. }
            | CompressError::Decode { algorithm, .. } => *algorithm,
        }
    }

    /// Kind of the I/O error reported by the codec library
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            CompressError::Init { kind, .. }
            | CompressError::Encode { kind, .. }
            | CompressError::Decode { kind, .. } => *kind,
        }
    }

    /// Check if the error was raised while constructing the encoder
    pub fn is_init(&self) -> bool {
        matches!(self, CompressError::Init { .. })
    }
}

impl From<CompressError> for io::Error {
    fn from(error: CompressError) -> Self {
        io::Error::new(error.kind(), error)
    }
}
