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

//! The write-closer capability shared by every pipeline stage, and the terminal sinks

use crate::{LogError, LogResult};
use std::io::{self, Write};

/// A byte sink that can be closed.
///
/// Every stage of the pipeline both implements this trait and wraps another implementor.
/// A successful `write` reports the full length of `buf`; partial progress is reported as
/// an error instead.
pub trait WriteClose: Send {
    /// Write `buf`, returning the number of bytes accepted.
    fn write(&mut self, buf: &[u8]) -> LogResult<usize>;

    /// Release the sink. Writes after a successful close fail with [`LogError::Closed`].
    fn close(&mut self) -> LogResult<()>;
}

impl<W> WriteClose for Box<W>
where
    W: WriteClose + ?Sized,
{
    fn write(&mut self, buf: &[u8]) -> LogResult<usize> {
        (**self).write(buf)
    }

    fn close(&mut self) -> LogResult<()> {
        (**self).close()
    }
}

/// A sink that drops every write.
///
/// Writes report the full input length. After [`WriteClose::close`] every write fails
/// with [`LogError::Closed`].
#[derive(Debug, Default)]
pub struct Discard {
    closed: bool,
}

impl Discard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WriteClose for Discard {
    fn write(&mut self, buf: &[u8]) -> LogResult<usize> {
        if self.closed {
            return Err(LogError::Closed);
        }
        Ok(buf.len())
    }

    fn close(&mut self) -> LogResult<()> {
        self.closed = true;
        Ok(())
    }
}

/// Adapts an [`io::Write`] into a [`WriteClose`] sink.
///
/// Writes use `write_all`, so a successful write always reports the full length. Closing
/// flushes and then drops the inner writer, which closes files and sockets.
#[derive(Debug)]
pub struct IoSink<W> {
    inner: Option<W>,
}

impl<W> IoSink<W>
where
    W: Write + Send,
{
    pub fn new(inner: W) -> Self {
        Self { inner: Some(inner) }
    }

    /// Gets a reference to the underlying writer, or `None` once closed.
    pub fn get_ref(&self) -> Option<&W> {
        self.inner.as_ref()
    }
}

impl<W> WriteClose for IoSink<W>
where
    W: Write + Send,
{
    fn write(&mut self, buf: &[u8]) -> LogResult<usize> {
        let inner = self.inner.as_mut().ok_or(LogError::Closed)?;
        inner.write_all(buf)?;
        Ok(buf.len())
    }

    fn close(&mut self) -> LogResult<()> {
        let mut inner = self.inner.take().ok_or(LogError::Closed)?;
        inner.flush()?;
        Ok(())
    }
}

/// Adapts an [`io::Write`] whose underlying resource must outlive the pipeline.
///
/// Closing only flushes; the writer stays usable. This is how standard error is attached,
/// so that tearing down a pipeline never closes the process's stderr.
#[derive(Debug)]
pub struct NopCloser<W> {
    inner: W,
}

impl<W> NopCloser<W>
where
    W: Write + Send,
{
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl NopCloser<io::Stderr> {
    /// Sink for the process's standard error.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W> WriteClose for NopCloser<W>
where
    W: Write + Send,
{
    fn write(&mut self, buf: &[u8]) -> LogResult<usize> {
        self.inner.write_all(buf)?;
        Ok(buf.len())
    }

    fn close(&mut self) -> LogResult<()> {
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discard_write() {
        let mut discard = Discard::new();
        assert_eq!(discard.write(&[]).unwrap(), 0);
        assert_eq!(discard.write(b"").unwrap(), 0);
        assert_eq!(discard.write(b"hello").unwrap(), 5);

        discard.close().unwrap();
        let err = discard.write(b"write to closed file").unwrap_err();
        assert!(err.is_closed());
    }

    #[test]
    fn test_io_sink_writes_and_closes() {
        let mut sink = IoSink::new(Vec::new());
        assert_eq!(sink.write(b"abc").unwrap(), 3);
        assert_eq!(sink.write(b"def").unwrap(), 3);
        assert_eq!(sink.get_ref().unwrap(), b"abcdef");

        sink.close().unwrap();
        assert!(sink.get_ref().is_none());
        assert!(sink.write(b"late").unwrap_err().is_closed());
        assert!(sink.close().unwrap_err().is_closed());
    }

    #[test]
    fn test_io_sink_surfaces_errors() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "device gone"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut sink = IoSink::new(Broken);
        let err = sink.write(b"data").unwrap_err();
        assert!(matches!(err, LogError::Io(_)));
        assert_eq!(err.kind(), io::ErrorKind::Other);
    }

    #[test]
    fn test_nop_closer_survives_close() {
        let mut sink = NopCloser::new(Vec::new());
        sink.write(b"before").unwrap();
        sink.close().unwrap();
        sink.write(b" after").unwrap();
        assert_eq!(sink.into_inner(), b"before after");
    }

    #[test]
    fn test_boxed_sink_delegates() {
        let mut sink: Box<dyn WriteClose> = Box::new(Discard::new());
        assert_eq!(sink.write(b"boxed").unwrap(), 5);
        sink.close().unwrap();
        assert!(sink.write(b"boxed").unwrap_err().is_closed());
    }
}
