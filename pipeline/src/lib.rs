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

//! # Log Output Pipeline
//!
//! A chain of composable write-closers that turns a stream of small log writes into a
//! compact, durable log file.
//!
//! ```text
//! TickWriter ──> Buffer ──> CompressedWriter ──> IoSink<File>
//!  (locking,      (batching,   (one frame per       (terminal
//!   ticker)        flushing)    flushed chunk)        sink)
//! ```
//!
//! Each stage implements [`WriteClose`] and wraps another implementor, so stages can be
//! combined freely. [`open`] assembles the usual chain for a file, directory, standard
//! error or discard target, and [`setup`] routes `tracing` output through it.
//!
//! ## Stages
//!
//! - [`TickWriter`]: Serializes access and issues an empty write every interval so idle
//!   data is flushed
//! - [`Buffer`]: Accumulates small writes and flushes when full, on stale data, or on close
//! - [`CompressedWriter`]: Compresses every write into one self-contained frame
//! - [`IoSink`], [`NopCloser`], [`Discard`]: Terminal sinks
//!
//! ## Basic Usage
//!
//! ```rust
//! use logpipe::{Buffer, CompressedWriter, IoSink, TickWriter, WriteClose};
//! use logpipe::Algorithm;
//! use std::time::Duration;
//!
//! # fn example() -> logpipe::LogResult<()> {
//! let sink = IoSink::new(Vec::new());
//! let compressed = CompressedWriter::with_algorithm(sink, Algorithm::Gzip);
//! let buffer = Buffer::new(compressed, 4096, Duration::from_secs(1));
//! let writer = TickWriter::new(buffer, Duration::from_secs(1))?;
//!
//! writer.write(b"service started\n")?;
//! writer.close()?;
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Error Handling
//!
//! Every stage reports failures as [`LogError`]. Errors from the wrapped writer are sticky
//! in [`Buffer`]: once a flush fails, every later write and close returns the same error.

mod buffer;
mod clock;
mod compressed;
mod config;
mod open;
mod result;
mod sink;
mod tick;

pub use buffer::Buffer;
pub use clock::{Clock, ManualClock, SystemClock};
pub use compressed::CompressedWriter;
pub use config::{
    DEFAULT_BUFFER_SIZE, DEFAULT_FLUSH_INTERVAL, DEFAULT_MODE, NULL_TARGET, OpenOptions,
    STDERR_TARGET,
};
pub use open::{LogGuard, LogWriter, open, setup};
pub use result::{LogError, LogResult};
pub use sink::{Discard, IoSink, NopCloser, WriteClose};
pub use tick::TickWriter;

pub use logpipe_compress::{Algorithm, AlgorithmCodec, Codec, CompressError};
