//! Replication configuration.

use crate::error::{CoreError, CoreResult};
use std::time::Duration;

/// Default queue capacity: about one second of commands at 1M ops/s.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1 << 20;

/// Default write buffer size (1 MiB).
pub const DEFAULT_BUFFER_SIZE: usize = arbit_storage::DEFAULT_BUFFER_SIZE;

/// Default periodic flush interval.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(1);

/// Default number of records drained per wake-up before the flush deadline
/// is checked again.
pub const DEFAULT_MAX_BATCH: usize = 4096;

/// Configuration for opening a replicated bit vector.
#[derive(Debug, Clone)]
pub struct Config {
    /// Capacity of the command queue. Producers block when it is full.
    pub queue_capacity: usize,

    /// Size of the log writer's buffer in bytes.
    pub buffer_size: usize,

    /// How often buffered records are forced to the log.
    pub flush_interval: Duration,

    /// Whether each forced flush also syncs the file to disk.
    pub sync_on_flush: bool,

    /// Records drained per wake-up before the flush deadline is rechecked.
    pub max_batch: usize,

    /// Whether to create missing parent directories of the log path.
    pub create_dirs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            buffer_size: DEFAULT_BUFFER_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            sync_on_flush: true,
            max_batch: DEFAULT_MAX_BATCH,
            create_dirs: false,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the command queue capacity.
    #[must_use]
    pub const fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Sets the write buffer size.
    #[must_use]
    pub const fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Sets the periodic flush interval.
    #[must_use]
    pub const fn flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Sets whether forced flushes sync to disk.
    #[must_use]
    pub const fn sync_on_flush(mut self, value: bool) -> Self {
        self.sync_on_flush = value;
        self
    }

    /// Sets the drain batch size.
    #[must_use]
    pub const fn max_batch(mut self, records: usize) -> Self {
        self.max_batch = records;
        self
    }

    /// Sets whether missing parent directories are created.
    #[must_use]
    pub const fn create_dirs(mut self, value: bool) -> Self {
        self.create_dirs = value;
        self
    }

    /// Checks that every setting is usable.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] for a zero queue capacity,
    /// buffer size, flush interval or batch size.
    pub fn validate(&self) -> CoreResult<()> {
        // A zero-capacity channel is a rendezvous: every call would wait on the writer.
        if self.queue_capacity == 0 {
            return Err(CoreError::invalid_config("queue_capacity must be at least 1"));
        }
        if self.buffer_size == 0 {
            return Err(CoreError::invalid_config("buffer_size must be at least 1"));
        }
        if self.flush_interval.is_zero() {
            return Err(CoreError::invalid_config("flush_interval must be non-zero"));
        }
        if self.max_batch == 0 {
            return Err(CoreError::invalid_config("max_batch must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.queue_capacity, 1 << 20);
        assert_eq!(config.buffer_size, 1 << 20);
        assert_eq!(config.flush_interval, Duration::from_secs(1));
        assert!(config.sync_on_flush);
        assert!(!config.create_dirs);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .queue_capacity(16)
            .buffer_size(4096)
            .flush_interval(Duration::from_millis(10))
            .sync_on_flush(false)
            .max_batch(8)
            .create_dirs(true);

        assert_eq!(config.queue_capacity, 16);
        assert_eq!(config.buffer_size, 4096);
        assert_eq!(config.flush_interval, Duration::from_millis(10));
        assert!(!config.sync_on_flush);
        assert_eq!(config.max_batch, 8);
        assert!(config.create_dirs);
    }

    #[test]
    fn validate_rejects_zeroes() {
        assert!(Config::new().queue_capacity(0).validate().is_err());
        assert!(Config::new().buffer_size(0).validate().is_err());
        assert!(Config::new().flush_interval(Duration::ZERO).validate().is_err());
        assert!(Config::new().max_batch(0).validate().is_err());
    }
}
