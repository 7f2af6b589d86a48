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

//! Pipeline assembly and logger redirection

use crate::{
    Buffer, CompressedWriter, Discard, IoSink, LogError, LogResult, NopCloser, OpenOptions,
    TickWriter, WriteClose,
};
use chrono::{DateTime, Local, SecondsFormat};
use logpipe_compress::Algorithm;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::subscriber::DefaultGuard;

/// A fully assembled pipeline as returned by [`open`].
pub type LogWriter = TickWriter<Box<dyn WriteClose>>;

/// Assemble a pipeline for the target described by `options`.
///
/// | Target | Pipeline |
/// |--------|----------|
/// | `""`, `/dev/null` | [`Discard`] |
/// | `-` | standard error, never closed |
/// | existing directory | file named `{prefix}.{timestamp}-{pid}.log{suffix}` inside it |
/// | anything else | file at that path |
///
/// Files whose name ends in `.zst` or `.gz` get a [`CompressedWriter`]. When both the
/// buffer size and the flush interval are positive, a [`Buffer`] is added and the returned
/// [`TickWriter`] ticks at the flush interval.
///
/// Note that output is buffered: data still pending when the process exits without
/// closing the writer is lost.
///
/// # Examples
///
/// ```
/// use logpipe::OpenOptions;
///
/// # fn example() -> logpipe::LogResult<()> {
/// let writer = logpipe::open(&OpenOptions::new(""))?;
/// assert_eq!(writer.write(b"dropped\n")?, 8);
/// writer.close()?;
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub fn open(options: &OpenOptions) -> LogResult<LogWriter> {
    if let Some(sink) = open_fast(options) {
        return Ok(TickWriter::untimed(sink));
    }
    let path = resolve_path(options)?;
    open_file(&path, options)
}

fn open_fast(options: &OpenOptions) -> Option<Box<dyn WriteClose>> {
    let sink: Box<dyn WriteClose> = if options.is_discard() {
        tracing::debug!("discarding log output");
        Box::new(Discard::new())
    } else if options.is_stderr() {
        tracing::debug!("sending log output to stderr");
        Box::new(NopCloser::stderr())
    } else {
        return None;
    };
    Some(sink)
}

fn resolve_path(options: &OpenOptions) -> LogResult<PathBuf> {
    match fs::metadata(&options.file_or_dir) {
        Ok(metadata) if metadata.is_dir() => {
            let name = log_file_name(
                &options.prefix,
                &options.suffix,
                Local::now(),
                std::process::id(),
            );
            Ok(options.file_or_dir.join(name))
        }
        Ok(_) => Ok(options.file_or_dir.clone()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(options.file_or_dir.clone()),
        Err(error) => Err(error.into()),
    }
}

/// Name of a log file created inside a directory target
pub(crate) fn log_file_name(prefix: &str, suffix: &str, now: DateTime<Local>, pid: u32) -> String {
    format!(
        "{prefix}.{}-{pid}.log{suffix}",
        now.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    )
}

fn open_file(path: &Path, options: &OpenOptions) -> LogResult<LogWriter> {
    let file = options.file_options().open(path)?;
    let algorithm = Algorithm::from_path(path);

    let mut sink: Box<dyn WriteClose> = Box::new(IoSink::new(file));
    if algorithm != Algorithm::None {
        sink = Box::new(CompressedWriter::with_algorithm(sink, algorithm));
    }

    tracing::debug!(
        path = %path.display(),
        %algorithm,
        buffer_size = options.buffer_size,
        flush_interval_ms = options.flush_interval.as_millis() as u64,
        "opened log file"
    );

    if options.buffering_enabled() {
        let buffer: Box<dyn WriteClose> = Box::new(Buffer::new(
            sink,
            options.buffer_size,
            options.flush_interval,
        ));
        TickWriter::new(buffer, options.flush_interval)
    } else {
        Ok(TickWriter::untimed(sink))
    }
}

/// Redirection of the thread's `tracing` output, returned by [`setup`].
///
/// Dropping the guard restores the previous dispatcher and closes the pipeline. Use
/// [`LogGuard::teardown`] to observe the close result.
pub struct LogGuard {
    writer: Arc<LogWriter>,
    default: Option<DefaultGuard>,
}

impl LogGuard {
    /// The pipeline receiving formatted events
    pub fn writer(&self) -> &Arc<LogWriter> {
        &self.writer
    }

    /// Restore the previous dispatcher and close the pipeline.
    pub fn teardown(mut self) -> LogResult<()> {
        self.default.take();
        self.writer.close()
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        self.default.take();
        match self.writer.close() {
            Ok(()) | Err(LogError::Closed) => {}
            Err(error) => tracing::warn!(%error, "failed to close log pipeline"),
        }
    }
}

impl std::fmt::Debug for LogGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogGuard")
            .field("writer", &self.writer)
            .field("active", &self.default.is_some())
            .finish()
    }
}

/// Open a pipeline and make it the current thread's `tracing` output.
///
/// Events are formatted by `tracing_subscriber`'s default formatter without ANSI colors.
/// The redirection lasts until the returned guard is torn down or dropped.
///
/// ```no_run
/// use logpipe::OpenOptions;
///
/// # fn example() -> logpipe::LogResult<()> {
/// let guard = logpipe::setup(&OpenOptions::new("/var/log/myapp").with_prefix("myapp"))?;
/// tracing::info!("written to /var/log/myapp/myapp.*.log.zst within a second");
/// guard.teardown()?;
/// # Ok(())
/// # }
/// ```
pub fn setup(options: &OpenOptions) -> LogResult<LogGuard> {
    let writer = Arc::new(open(options)?);
    let subscriber = tracing_subscriber::fmt()
        .with_writer(Arc::clone(&writer))
        .with_ansi(false)
        .finish();
    let default = tracing::subscriber::set_default(subscriber);
    Ok(LogGuard {
        writer,
        default: Some(default),
    })
}
