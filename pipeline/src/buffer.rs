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

//! Size and time triggered write buffering
//!
//! [`Buffer`] is a write buffer specialised for log output. Small writes are accumulated and
//! handed to the inner writer as one call once either the accumulated size or the time since
//! the last flush crosses its threshold. Writes that are already at least as large as the
//! threshold bypass the accumulation region entirely.
//!
//! The buffer only evaluates its time threshold when it is written to. A zero-length write
//! is therefore a cheap way to ask it to flush stale data, which is exactly what
//! [`TickWriter`](crate::TickWriter) does on every tick.
//!
//! ## State Machine
//!
//! | State | Write | Close |
//! |-------|-------|-------|
//! | `Open` | buffered or forwarded | flush, close inner, become `Closed` |
//! | `Failed(e)` | returns `e` | returns `e` |
//! | `Closed` | [`LogError::Closed`] | [`LogError::Closed`] |
//!
//! Any failure of the inner writer, including a short write and a failed close, moves the
//! buffer to `Failed`. From then on the inner writer is never called again.

use crate::{Clock, DEFAULT_BUFFER_SIZE, LogError, LogResult, SystemClock, WriteClose};
use bytes::BytesMut;
use metrics::counter;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
enum BufferState {
    Open,
    Failed(LogError),
    Closed,
}

/// Buffered writer flushing on size or elapsed time.
///
/// # Examples
///
/// ```rust
/// use logpipe::{Buffer, IoSink, WriteClose};
/// use std::time::Duration;
///
/// # fn example() -> logpipe::LogResult<()> {
/// let mut buffer = Buffer::new(IoSink::new(Vec::new()), 20, Duration::from_secs(60));
/// buffer.write(b"write ")?;
/// buffer.write(b"small ")?;
/// assert_eq!(buffer.buffered(), 12);
/// assert!(buffer.get_ref().get_ref().unwrap().is_empty());
///
/// buffer.write(b"data multiple ")?;
/// assert_eq!(buffer.buffered(), 0);
/// assert_eq!(buffer.get_ref().get_ref().unwrap(), b"write small data multiple ");
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug)]
pub struct Buffer<W, C = SystemClock> {
    inner: W,
    buf: BytesMut,
    size: usize,
    interval: Duration,
    clock: C,
    last_flush: Instant,
    state: BufferState,
}

impl<W> Buffer<W, SystemClock>
where
    W: WriteClose,
{
    /// Creates a buffer of `size` bytes flushing at least every `interval`.
    pub fn new(inner: W, size: usize, interval: Duration) -> Self {
        Self::with_clock(inner, size, interval, SystemClock)
    }
}

impl<W, C> Buffer<W, C>
where
    W: WriteClose,
    C: Clock,
{
    /// Creates a buffer reading time from `clock`.
    pub fn with_clock(inner: W, size: usize, interval: Duration, clock: C) -> Self {
        let last_flush = clock.now();
        Self {
            inner,
            // Grows on demand; `size` is a threshold, not a reservation.
            buf: BytesMut::with_capacity(size.min(DEFAULT_BUFFER_SIZE)),
            size,
            interval,
            clock,
            last_flush,
            state: BufferState::Open,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Size threshold in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Time threshold
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of bytes accumulated and not yet flushed
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// The latched error, if the buffer has failed
    pub fn error(&self) -> Option<&LogError> {
        match &self.state {
            BufferState::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Check if the buffer has been closed successfully
    pub fn is_closed(&self) -> bool {
        matches!(self.state, BufferState::Closed)
    }

    fn check_open(&self) -> LogResult<()> {
        match &self.state {
            BufferState::Open => Ok(()),
            BufferState::Failed(error) => Err(error.clone()),
            BufferState::Closed => Err(LogError::Closed),
        }
    }

    fn fail(&mut self, error: LogError) -> LogError {
        counter!("logpipe.buffer.errors").increment(1);
        self.state = BufferState::Failed(error.clone());
        error
    }

    fn need_flush(&self) -> bool {
        let expired = self.clock.now().saturating_duration_since(self.last_flush) >= self.interval;
        let overflow = self.buf.len() >= self.size;
        expired || overflow
    }

    /// Hand every accumulated byte to the inner writer in a single call.
    ///
    /// The flush time is recorded even when nothing was pending.
    fn flush(&mut self) -> LogResult<()> {
        let expected = self.buf.len();
        let result = if expected > 0 {
            self.inner.write(&self.buf)
        } else {
            Ok(0)
        };
        self.last_flush = self.clock.now();
        self.buf.clear();

        match result {
            Err(error) => Err(self.fail(error)),
            Ok(written) if written < expected => {
                Err(self.fail(LogError::ShortWrite { written, expected }))
            }
            Ok(_) => {
                if expected > 0 {
                    counter!("logpipe.buffer.flushes").increment(1);
                }
                Ok(())
            }
        }
    }

    fn small_write(&mut self, buf: &[u8]) -> LogResult<usize> {
        // May grow to twice `size` before the flush below.
        self.buf.extend_from_slice(buf);
        if self.need_flush() {
            self.flush()?;
        }
        Ok(buf.len())
    }

    fn large_write(&mut self, buf: &[u8]) -> LogResult<usize> {
        self.flush()?;
        debug_assert!(self.buf.is_empty(), "flushed buffer still holds data");

        let result = self.inner.write(buf);
        self.last_flush = self.clock.now();
        let written = result.map_err(|error| self.fail(error))?;
        if written < buf.len() {
            return Err(self.fail(LogError::ShortWrite {
                written,
                expected: buf.len(),
            }));
        }
        counter!("logpipe.buffer.large_writes").increment(1);
        Ok(written)
    }
}

impl<W, C> WriteClose for Buffer<W, C>
where
    W: WriteClose,
    C: Clock,
{
    fn write(&mut self, buf: &[u8]) -> LogResult<usize> {
        self.check_open()?;
        if buf.len() >= self.size {
            self.large_write(buf)
        } else {
            self.small_write(buf)
        }
    }

    fn close(&mut self) -> LogResult<()> {
        self.check_open()?;
        self.flush()?;
        self.inner.close().map_err(|error| self.fail(error))?;
        self.state = BufferState::Closed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualClock;
    use std::io;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Action {
        Write(String),
        Close,
    }

    /// Records every call and optionally fails from the n-th write on
    #[derive(Debug, Default)]
    struct RecordingWriter {
        actions: Vec<Action>,
        fail_after: Option<usize>,
        short_by: usize,
        fail_close: bool,
    }

    impl WriteClose for RecordingWriter {
        fn write(&mut self, buf: &[u8]) -> LogResult<usize> {
            let writes = self
                .actions
                .iter()
                .filter(|action| matches!(action, Action::Write(_)))
                .count();
            self.actions
                .push(Action::Write(String::from_utf8_lossy(buf).into_owned()));
            if self.fail_after.is_some_and(|limit| writes >= limit) {
                return Err(io::Error::new(io::ErrorKind::Other, "sink failed").into());
            }
            Ok(buf.len().saturating_sub(self.short_by))
        }

        fn close(&mut self) -> LogResult<()> {
            self.actions.push(Action::Close);
            if self.fail_close {
                return Err(io::Error::new(io::ErrorKind::Other, "close failed").into());
            }
            Ok(())
        }
    }

    fn write(data: &str) -> Action {
        Action::Write(data.to_string())
    }

    enum Op {
        Write(&'static str),
        Close,
        Elapse(Duration),
    }

    fn run(size: usize, ops: &[Op]) -> Vec<Action> {
        let clock = ManualClock::new();
        let mut buffer = Buffer::with_clock(
            RecordingWriter::default(),
            size,
            Duration::from_secs(1),
            clock.clone(),
        );
        let mut elapsed = Duration::ZERO;
        for op in ops {
            match op {
                Op::Write(data) => {
                    assert_eq!(buffer.write(data.as_bytes()).unwrap(), data.len());
                }
                Op::Close => buffer.close().unwrap(),
                Op::Elapse(target) => {
                    clock.advance(*target - elapsed);
                    elapsed = *target;
                }
            }
        }
        buffer.inner.actions
    }

    #[test]
    fn test_huge_threshold_allocates_lazily() {
        let mut buffer = Buffer::new(
            RecordingWriter::default(),
            usize::MAX / 2,
            Duration::from_secs(60),
        );
        assert_eq!(buffer.write(b"hi").unwrap(), 2);
        assert_eq!(buffer.buffered(), 2);
        buffer.close().unwrap();
        assert_eq!(buffer.inner.actions, vec![write("hi"), Action::Close]);
    }

    #[test]
    fn test_closure_clock() {
        let start = Instant::now();
        let elapsed_ms = Arc::new(AtomicU64::new(0));
        let clock = {
            let elapsed_ms = Arc::clone(&elapsed_ms);
            move || start + Duration::from_millis(elapsed_ms.load(Ordering::SeqCst))
        };
        let mut buffer =
            Buffer::with_clock(RecordingWriter::default(), 100, Duration::from_secs(1), clock);

        buffer.write(b"stale").unwrap();
        assert!(buffer.inner.actions.is_empty());

        elapsed_ms.store(1500, Ordering::SeqCst);
        buffer.write(b"").unwrap();
        assert_eq!(buffer.inner.actions, vec![write("stale")]);
    }

    #[test]
    fn test_close_without_write() {
        assert_eq!(run(0, &[Op::Close]), vec![Action::Close]);
    }

    #[test]
    fn test_small_write_once_and_close() {
        let actions = run(100, &[Op::Write("small data"), Op::Close]);
        assert_eq!(actions, vec![write("small data"), Action::Close]);
    }

    #[test]
    fn test_large_write_once_and_close() {
        let actions = run(10, &[Op::Write("large data"), Op::Close]);
        assert_eq!(actions, vec![write("large data"), Action::Close]);
    }

    #[test]
    fn test_small_writes_flush_on_overflow() {
        let actions = run(
            20,
            &[
                Op::Write("write "),    // 6 bytes
                Op::Write("small "),    // 12 bytes
                Op::Write("data "),     // 17 bytes
                Op::Write("multiple "), // 26 bytes, flushed
                Op::Write("times.\n"),  // 7 bytes
                Op::Close,
            ],
        );
        assert_eq!(
            actions,
            vec![
                write("write small data multiple "),
                write("times.\n"),
                Action::Close
            ]
        );
    }

    #[test]
    fn test_flush_when_interval_passed() {
        let actions = run(
            10000,
            &[
                Op::Write("small data\n"),
                Op::Elapse(Duration::from_millis(1500)),
                Op::Write("should be flush after write this message."),
                Op::Elapse(Duration::from_millis(1600)),
                Op::Write("next message\n"),
                // Only 600ms since the last flush.
                Op::Elapse(Duration::from_millis(2100)),
                Op::Write("next message 2\n"),
                Op::Elapse(Duration::from_millis(2600)),
                Op::Write("should be flush after write this message."),
                Op::Write("next message 3\n"),
                Op::Close,
            ],
        );
        assert_eq!(
            actions,
            vec![
                write("small data\nshould be flush after write this message."),
                write("next message\nnext message 2\nshould be flush after write this message."),
                write("next message 3\n"),
                Action::Close,
            ]
        );
    }

    #[test]
    fn test_large_write_is_not_merged() {
        let actions = run(
            8,
            &[Op::Write("abc"), Op::Write("0123456789"), Op::Write("de"), Op::Close],
        );
        assert_eq!(
            actions,
            vec![
                write("abc"),
                write("0123456789"),
                write("de"),
                Action::Close
            ]
        );
    }

    #[test]
    fn test_nothing_written_before_trigger() {
        let clock = ManualClock::new();
        let mut buffer = Buffer::with_clock(
            RecordingWriter::default(),
            64,
            Duration::from_secs(5),
            clock.clone(),
        );
        buffer.write(b"one ").unwrap();
        clock.advance(Duration::from_secs(4));
        buffer.write(b"two ").unwrap();
        assert!(buffer.get_ref().actions.is_empty());
        assert_eq!(buffer.buffered(), 8);
    }

    #[test]
    fn test_empty_write_flushes_stale_data() {
        let clock = ManualClock::new();
        let mut buffer = Buffer::with_clock(
            RecordingWriter::default(),
            64,
            Duration::from_secs(1),
            clock.clone(),
        );
        buffer.write(b"stale").unwrap();
        clock.advance(Duration::from_secs(2));
        assert_eq!(buffer.write(&[]).unwrap(), 0);
        assert_eq!(buffer.get_ref().actions, vec![write("stale")]);
    }

    #[test]
    fn test_idle_flush_debounces_timer() {
        let clock = ManualClock::new();
        let mut buffer = Buffer::with_clock(
            RecordingWriter::default(),
            64,
            Duration::from_secs(1),
            clock.clone(),
        );
        // An idle tick resets the flush time even with nothing pending.
        clock.advance(Duration::from_millis(1200));
        buffer.write(&[]).unwrap();
        clock.advance(Duration::from_millis(500));
        buffer.write(b"burst").unwrap();
        assert!(buffer.get_ref().actions.is_empty());

        clock.advance(Duration::from_millis(500));
        buffer.write(b"!").unwrap();
        assert_eq!(buffer.get_ref().actions, vec![write("burst!")]);
    }

    #[test]
    fn test_error_is_sticky() {
        let inner = RecordingWriter {
            fail_after: Some(0),
            ..Default::default()
        };
        let mut buffer = Buffer::new(inner, 4, Duration::from_secs(60));

        let first = buffer.write(b"large write").unwrap_err();
        let calls = buffer.get_ref().actions.len();
        assert_eq!(calls, 1);

        let second = buffer.write(b"x").unwrap_err();
        let third = buffer.write(b"another large write").unwrap_err();
        let closed = buffer.close().unwrap_err();
        let closed_again = buffer.close().unwrap_err();

        for err in [&second, &third, &closed, &closed_again] {
            match (&first, err) {
                (LogError::Io(a), LogError::Io(b)) => assert!(Arc::ptr_eq(a, b)),
                other => panic!("unexpected errors {other:?}"),
            }
        }
        assert_eq!(buffer.get_ref().actions.len(), calls);
        assert!(buffer.error().is_some());
        assert!(!buffer.is_closed());
    }

    #[test]
    fn test_flush_error_on_overflow_is_sticky() {
        let inner = RecordingWriter {
            fail_after: Some(0),
            ..Default::default()
        };
        let mut buffer = Buffer::new(inner, 8, Duration::from_secs(60));
        buffer.write(b"1234").unwrap();
        assert!(buffer.write(b"5678").is_err());
        assert!(buffer.write(b"9").is_err());
        assert!(buffer.close().is_err());
        assert_eq!(buffer.get_ref().actions, vec![write("12345678")]);
    }

    #[test]
    fn test_short_write_is_sticky() {
        let inner = RecordingWriter {
            short_by: 1,
            ..Default::default()
        };
        let mut buffer = Buffer::new(inner, 4, Duration::from_secs(60));
        let err = buffer.write(b"abcdef").unwrap_err();
        assert!(matches!(
            err,
            LogError::ShortWrite {
                written: 5,
                expected: 6
            }
        ));
        assert!(buffer.write(b"a").unwrap_err().is_short_write());
        assert!(buffer.close().unwrap_err().is_short_write());
    }

    #[test]
    fn test_close_failure_is_sticky() {
        let inner = RecordingWriter {
            fail_close: true,
            ..Default::default()
        };
        let mut buffer = Buffer::new(inner, 64, Duration::from_secs(60));
        buffer.write(b"pending").unwrap();
        let err = buffer.close().unwrap_err();
        assert!(matches!(err, LogError::Io(_)));
        assert!(!buffer.close().unwrap_err().is_closed());
        assert_eq!(
            buffer.get_ref().actions,
            vec![write("pending"), Action::Close]
        );
    }

    #[test]
    fn test_write_after_close() {
        let mut buffer = Buffer::new(RecordingWriter::default(), 64, Duration::from_secs(60));
        buffer.close().unwrap();
        assert!(buffer.is_closed());
        assert!(buffer.write(b"late").unwrap_err().is_closed());
        assert!(buffer.close().unwrap_err().is_closed());
        assert_eq!(buffer.get_ref().actions, vec![Action::Close]);
    }

    #[test]
    fn test_zero_interval_flushes_every_write() {
        let mut buffer = Buffer::new(RecordingWriter::default(), 64, Duration::ZERO);
        buffer.write(b"a").unwrap();
        buffer.write(b"b").unwrap();
        assert_eq!(buffer.get_ref().actions, vec![write("a"), write("b")]);
    }
}
