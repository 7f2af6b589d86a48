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

//! Serialized access and periodic flush ticks
//!
//! [`TickWriter`] is the outermost stage of a pipeline. It makes the stages below it safe to
//! share between threads by funnelling every write and close through one mutex, and it runs
//! a background ticker that writes an empty slice every interval. The empty write has no
//! payload but makes a [`Buffer`](crate::Buffer) re-evaluate its time threshold, so buffered
//! output reaches the sink even when the application has gone quiet.
//!
//! The ticker lives on its own thread driving a current-thread tokio runtime. Closing the
//! writer cancels it and joins the thread, so no tick runs after `close` returns.

use crate::{LogError, LogResult, WriteClose};
use metrics::counter;
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

const TICKER_THREAD_NAME: &str = "logpipe-ticker";

struct TickState<W> {
    inner: W,
    closed: bool,
}

type SharedState<W> = Arc<Mutex<TickState<W>>>;

fn write_locked<W>(shared: &Mutex<TickState<W>>, buf: &[u8]) -> LogResult<usize>
where
    W: WriteClose,
{
    let mut state = shared.lock();
    if state.closed {
        return Err(LogError::Closed);
    }
    state.inner.write(buf)
}

/// Thread-safe writer that periodically nudges its inner writer to flush.
///
/// # Examples
///
/// ```rust
/// use logpipe::{Buffer, IoSink, TickWriter};
/// use std::time::Duration;
///
/// # fn example() -> logpipe::LogResult<()> {
/// let interval = Duration::from_millis(100);
/// let buffer = Buffer::new(IoSink::new(Vec::new()), 4096, interval);
/// let writer = TickWriter::new(buffer, interval)?;
///
/// writer.write(b"shared between threads\n")?;
/// writer.close()?;
/// assert!(writer.write(b"too late").unwrap_err().is_closed());
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct TickWriter<W>
where
    W: WriteClose + 'static,
{
    shared: SharedState<W>,
    interval: Duration,
    cancel: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<W> TickWriter<W>
where
    W: WriteClose + 'static,
{
    /// Wraps `inner`, ticking every `interval`.
    ///
    /// A zero interval starts no ticker; the writer then only serializes access. Fails if
    /// the ticker thread cannot be spawned.
    pub fn new(inner: W, interval: Duration) -> LogResult<Self> {
        let shared = Arc::new(Mutex::new(TickState {
            inner,
            closed: false,
        }));
        let cancel = CancellationToken::new();

        let worker = if interval.is_zero() {
            None
        } else {
            let ticker = Ticker {
                shared: Arc::clone(&shared),
                interval,
                cancel: cancel.clone(),
            };
            let handle = thread::Builder::new()
                .name(TICKER_THREAD_NAME.to_string())
                .spawn(move || ticker.run())?;
            tracing::debug!(interval_ms = interval.as_millis() as u64, "flush ticker started");
            Some(handle)
        };

        Ok(Self {
            shared,
            interval,
            cancel,
            worker: Mutex::new(worker),
        })
    }

    /// Wraps `inner` without a ticker.
    pub fn untimed(inner: W) -> Self {
        Self {
            shared: Arc::new(Mutex::new(TickState {
                inner,
                closed: false,
            })),
            interval: Duration::ZERO,
            cancel: CancellationToken::new(),
            worker: Mutex::new(None),
        }
    }

    /// Tick interval; zero when no ticker runs
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }

    /// Writes `buf` to the inner writer while holding the lock.
    pub fn write(&self, buf: &[u8]) -> LogResult<usize> {
        write_locked(&self.shared, buf)
    }

    /// Closes the inner writer and stops the ticker.
    ///
    /// Returns [`LogError::Closed`] if already closed. Once this returns, neither callers
    /// nor the ticker can reach the inner writer again.
    pub fn close(&self) -> LogResult<()> {
        self.shutdown()
    }

    fn shutdown(&self) -> LogResult<()> {
        let result = {
            let mut state = self.shared.lock();
            if state.closed {
                return Err(LogError::Closed);
            }
            state.closed = true;
            self.cancel.cancel();
            state.inner.close()
        };

        // Joined outside the lock: the ticker may be waiting on it.
        let worker = self.worker.lock().take();
        if let Some(handle) = worker {
            if handle.join().is_err() {
                tracing::warn!("flush ticker panicked");
            }
        }
        tracing::debug!(success = result.is_ok(), "tick writer closed");
        result
    }
}

impl<W> WriteClose for TickWriter<W>
where
    W: WriteClose + 'static,
{
    fn write(&mut self, buf: &[u8]) -> LogResult<usize> {
        write_locked(&self.shared, buf)
    }

    fn close(&mut self) -> LogResult<()> {
        self.shutdown()
    }
}

impl<W> io::Write for &TickWriter<W>
where
    W: WriteClose + 'static,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        write_locked(&self.shared, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W> io::Write for TickWriter<W>
where
    W: WriteClose + 'static,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        write_locked(&self.shared, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W> Drop for TickWriter<W>
where
    W: WriteClose + 'static,
{
    fn drop(&mut self) {
        match self.shutdown() {
            Ok(()) | Err(LogError::Closed) => {}
            Err(error) => tracing::warn!(%error, "failed to close log pipeline on drop"),
        }
    }
}

impl<W> std::fmt::Debug for TickWriter<W>
where
    W: WriteClose + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickWriter")
            .field("interval", &self.interval)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Background task issuing empty writes until cancelled
struct Ticker<W> {
    shared: SharedState<W>,
    interval: Duration,
    cancel: CancellationToken,
}

impl<W> Ticker<W>
where
    W: WriteClose,
{
    fn run(self) {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
        {
            Ok(runtime) => runtime,
            Err(error) => {
                tracing::warn!(%error, "failed to start flush ticker runtime");
                return;
            }
        };
        runtime.block_on(self.tick_loop());
        tracing::debug!("flush ticker stopped");
    }

    async fn tick_loop(&self) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {
                    counter!("logpipe.tick.ticks").increment(1);
                    if let Err(error) = write_locked(&self.shared, &[]) {
                        tracing::trace!(%error, "flush tick failed");
                    }
                }
            }
        }
    }
}
