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

//! Pipeline assembly options
//!
//! # Examples
//!
//! ```
//! use logpipe::OpenOptions;
//! use std::time::Duration;
//!
//! let options = OpenOptions::new("/var/log/myapp")
//!     .with_prefix("myapp")
//!     .with_suffix(".gz")
//!     .with_buffer_size(64 * 1024)
//!     .with_flush_interval(Duration::from_secs(5));
//! assert!(options.buffering_enabled());
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Target that sends output to standard error
pub const STDERR_TARGET: &str = "-";

/// Target that discards all output, alongside the empty path
pub const NULL_TARGET: &str = "/dev/null";

/// Default buffer size in bytes
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Default flush interval
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(1);

/// Default file permission bits (before umask)
pub const DEFAULT_MODE: u32 = 0o666;

/// Options used by [`open`](crate::open) to assemble a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOptions {
    /// Path to a file or directory.
    ///
    /// An empty path or `/dev/null` discards all output and `-` sends it to standard
    /// error. An existing directory gets a generated file name; anything else is opened as
    /// a file.
    pub file_or_dir: PathBuf,

    /// Prefix of generated file names
    pub prefix: String,

    /// Extension appended to generated file names; `.zst` or `.gz` select compression
    pub suffix: String,

    /// Append to an existing file
    pub append: bool,

    /// Create the file if it does not exist
    pub create: bool,

    /// Truncate an existing file
    pub truncate: bool,

    /// Permission bits for newly created files (unix only)
    pub mode: u32,

    /// Buffer size in bytes; zero disables buffering
    pub buffer_size: usize,

    /// Flush interval; zero disables buffering and periodic flushing
    pub flush_interval: Duration,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            file_or_dir: PathBuf::from(STDERR_TARGET),
            prefix: default_prefix(),
            suffix: ".zst".to_string(),
            append: true,
            create: true,
            truncate: false,
            mode: DEFAULT_MODE,
            buffer_size: DEFAULT_BUFFER_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }
}

impl OpenOptions {
    /// Create options targeting `file_or_dir` with every other setting at its default
    pub fn new(file_or_dir: impl Into<PathBuf>) -> Self {
        Self {
            file_or_dir: file_or_dir.into(),
            ..Default::default()
        }
    }

    /// Set the target file or directory
    pub fn with_file_or_dir(mut self, file_or_dir: impl Into<PathBuf>) -> Self {
        self.file_or_dir = file_or_dir.into();
        self
    }

    /// Set the generated file name prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the generated file name suffix
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Enable or disable appending
    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    /// Enable or disable file creation
    pub fn with_create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    /// Enable or disable truncation
    pub fn with_truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    /// Set the permission bits for new files
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Set the buffer size
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Set the flush interval
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Check if a buffer and ticker will be installed
    pub fn buffering_enabled(&self) -> bool {
        self.buffer_size > 0 && !self.flush_interval.is_zero()
    }

    /// Check if the target discards all output
    pub fn is_discard(&self) -> bool {
        let target = self.file_or_dir.as_os_str();
        target.is_empty() || target == NULL_TARGET
    }

    /// Check if the target is standard error
    pub fn is_stderr(&self) -> bool {
        self.file_or_dir.as_os_str() == STDERR_TARGET
    }

    pub(crate) fn file_options(&self) -> fs::OpenOptions {
        let mut options = fs::OpenOptions::new();
        options
            .write(true)
            .append(self.append)
            .create(self.create)
            .truncate(self.truncate);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(self.mode);
        }
        options
    }
}

/// Base name of the running program, or `log` when unavailable
fn default_prefix() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .map(Path::new)
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "log".to_string())
}
