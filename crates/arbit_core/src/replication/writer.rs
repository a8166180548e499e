//! The log writer thread.

use crate::error::{CoreError, CoreResult, ReplicationFailure};
use crate::queue::{Next, QueueConsumer};
use crate::replication::ReplicationState;
use arbit_codec::{encode_record, CommandRecord, RECORD_SIZE};
use arbit_storage::StorageBackend;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Name of the writer thread.
pub(crate) const WRITER_THREAD_NAME: &str = "arbit-replication";

/// Whether the event loop keeps running after a drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Sole consumer of the command queue and sole owner of the backend.
pub(crate) struct LogWriter {
    backend: Box<dyn StorageBackend>,
    consumer: QueueConsumer,
    state: Arc<ReplicationState>,
    flush_interval: Duration,
    sync_on_flush: bool,
    max_batch: usize,
    /// Records taken from the queue since the last completed flush.
    unflushed: u64,
    /// Records flushed to the OS but not yet synced.
    unsynced: u64,
    next_flush: Instant,
    /// Set once the stop signal or queue disconnection has been seen.
    stopping: bool,
}

impl LogWriter {
    pub(crate) fn new(
        backend: Box<dyn StorageBackend>,
        consumer: QueueConsumer,
        state: Arc<ReplicationState>,
        flush_interval: Duration,
        sync_on_flush: bool,
        max_batch: usize,
    ) -> Self {
        Self {
            backend,
            consumer,
            state,
            flush_interval,
            sync_on_flush,
            max_batch,
            unflushed: 0,
            unsynced: 0,
            next_flush: Instant::now() + flush_interval,
            stopping: false,
        }
    }

    /// Starts the writer on its own named thread.
    ///
    /// The thread returns once the queue is shut down and drained.
    pub(crate) fn spawn(self) -> io::Result<JoinHandle<CoreResult<()>>> {
        thread::Builder::new()
            .name(WRITER_THREAD_NAME.to_string())
            .spawn(move || self.run())
    }

    /// Runs the writer to completion on the current thread.
    pub(crate) fn run(mut self) -> CoreResult<()> {
        let Err(err) = self.event_loop().and_then(|()| self.shutdown()) else {
            return Ok(());
        };
        let failure = self.fail(&err);
        self.discard_until_stopped();
        Err(CoreError::Replication(self.state.failure().unwrap_or(failure)))
    }

    fn event_loop(&mut self) -> CoreResult<()> {
        loop {
            match self.consumer.take_until(self.next_flush) {
                Next::Record(record) => {
                    self.write(&record)?;
                    if self.drain_available()? == Flow::Stop {
                        return Ok(());
                    }
                }
                Next::Idle => {}
                Next::Shutdown | Next::Closed => {
                    self.stopping = true;
                    return Ok(());
                }
            }
            self.flush_if_due()?;
        }
    }

    /// Writes whatever is immediately available, up to `max_batch` records.
    fn drain_available(&mut self) -> CoreResult<Flow> {
        for _ in 0..self.max_batch {
            match self.consumer.try_take() {
                Next::Record(record) => {
                    self.write(&record)?;
                    self.flush_if_due()?;
                }
                Next::Idle => break,
                Next::Shutdown | Next::Closed => {
                    self.stopping = true;
                    return Ok(Flow::Stop);
                }
            }
        }
        Ok(Flow::Continue)
    }

    fn write(&mut self, record: &CommandRecord) -> CoreResult<()> {
        self.unflushed += 1;
        let bytes = encode_record(record)?;
        self.backend.append(&bytes)?;
        self.state.stats.record_write(RECORD_SIZE as u64);
        Ok(())
    }

    fn flush_if_due(&mut self) -> CoreResult<()> {
        let now = Instant::now();
        if now >= self.next_flush {
            self.flush(self.sync_on_flush)?;
            self.next_flush = now + self.flush_interval;
        }
        Ok(())
    }

    /// Flushes buffered records. With `sync`, also makes every record
    /// flushed so far durable, including ones an earlier unsynced flush
    /// only handed to the OS.
    fn flush(&mut self, sync: bool) -> CoreResult<()> {
        if self.unflushed == 0 && (!sync || self.unsynced == 0) {
            return Ok(());
        }
        if sync {
            self.backend.sync()?;
        } else {
            self.backend.flush()?;
        }
        self.state.stats.record_flush(self.unflushed);
        if sync {
            self.state.stats.record_sync(self.unflushed + self.unsynced);
            self.unsynced = 0;
        } else {
            self.unsynced += self.unflushed;
        }
        debug!(
            records = self.unflushed,
            log_size = self.backend.size(),
            synced = sync,
            "flushed replication log"
        );
        self.unflushed = 0;
        Ok(())
    }

    /// Writes records that arrived behind the stop signal, then makes
    /// everything durable and closes the backend.
    fn shutdown(&mut self) -> CoreResult<()> {
        loop {
            match self.consumer.try_take() {
                Next::Record(record) => self.write(&record)?,
                Next::Shutdown => {}
                Next::Idle | Next::Closed => break,
            }
        }
        self.flush(true)?;
        self.backend.close()?;
        Ok(())
    }

    /// Publishes the failure. Records taken but not flushed are lost.
    fn fail(&mut self, err: &CoreError) -> ReplicationFailure {
        let failure = ReplicationFailure {
            message: err.to_string(),
            lost_records: std::mem::take(&mut self.unflushed),
        };
        error!(error = %err, lost_records = failure.lost_records, "replication writer failed");
        self.state.fail(failure.clone());
        failure
    }

    /// Drops queued records until the stop signal, counting each one.
    fn discard_until_stopped(&mut self) {
        loop {
            let next = if self.stopping {
                self.consumer.try_take()
            } else {
                self.consumer.take()
            };
            match next {
                Next::Record(_) => self.state.discard(1),
                Next::Shutdown => self.stopping = true,
                Next::Idle | Next::Closed => break,
            }
        }
    }
}
