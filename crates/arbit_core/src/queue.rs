//! Bounded command queue between callers and the log writer.
//!
//! Any number of producers feed a single consumer through one FIFO. A full
//! queue blocks producers; that is the only backpressure in the system and
//! no record is ever dropped while the consumer is alive.
//!
//! The stop signal travels in-band, so it is ordered after every record
//! accepted before it.

use arbit_codec::CommandRecord;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError};
use std::time::Instant;
use thiserror::Error;

enum Message {
    Record(CommandRecord),
    Shutdown,
}

/// The consumer has gone away; the rejected record is handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("command queue closed; {0} not accepted")]
pub struct QueueClosed(pub CommandRecord);

/// What the consumer found in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// A record, in acceptance order.
    Record(CommandRecord),
    /// A producer requested shutdown.
    Shutdown,
    /// Nothing arrived (immediately, or before the deadline).
    Idle,
    /// Every producer is gone and the queue is empty.
    Closed,
}

/// Constructor for the producer/consumer pair.
pub struct CommandQueue;

impl CommandQueue {
    /// Creates a queue holding at most `capacity` pending messages.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; [`Config::validate`](crate::Config::validate)
    /// rejects that first.
    #[must_use]
    pub fn bounded(capacity: usize) -> (QueueProducer, QueueConsumer) {
        assert!(capacity > 0, "command queue capacity must be non-zero");
        let (tx, rx) = mpsc::sync_channel(capacity);
        (QueueProducer { tx }, QueueConsumer { rx })
    }
}

/// Producer side. Cheap to clone, safe to share across threads.
#[derive(Debug, Clone)]
pub struct QueueProducer {
    tx: SyncSender<Message>,
}

impl QueueProducer {
    /// Appends a record, blocking while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`QueueClosed`] with the record if the consumer is gone.
    pub fn enqueue(&self, record: CommandRecord) -> Result<(), QueueClosed> {
        self.tx
            .send(Message::Record(record))
            .map_err(|_| QueueClosed(record))
    }

    /// Asks the consumer to drain and stop, blocking while the queue is full.
    ///
    /// Returns `false` if the consumer was already gone.
    pub fn shutdown(&self) -> bool {
        self.tx.send(Message::Shutdown).is_ok()
    }
}

/// Consumer side, owned by the log writer.
#[derive(Debug)]
pub struct QueueConsumer {
    rx: Receiver<Message>,
}

impl QueueConsumer {
    /// Takes the oldest message without blocking.
    pub fn try_take(&self) -> Next {
        match self.rx.try_recv() {
            Ok(message) => message.into(),
            Err(TryRecvError::Empty) => Next::Idle,
            Err(TryRecvError::Disconnected) => Next::Closed,
        }
    }

    /// Waits for the oldest message with no deadline.
    pub fn take(&self) -> Next {
        self.rx.recv().map_or(Next::Closed, Next::from)
    }

    /// Waits for the oldest message until `deadline`.
    ///
    /// Returns [`Next::Idle`] once the deadline passes; a deadline in the
    /// past degrades to [`try_take`](Self::try_take).
    pub fn take_until(&self, deadline: Instant) -> Next {
        let timeout = deadline.saturating_duration_since(Instant::now());
        match self.rx.recv_timeout(timeout) {
            Ok(message) => message.into(),
            Err(RecvTimeoutError::Timeout) => Next::Idle,
            Err(RecvTimeoutError::Disconnected) => Next::Closed,
        }
    }
}

impl From<Message> for Next {
    fn from(message: Message) -> Self {
        match message {
            Message::Record(record) => Next::Record(record),
            Message::Shutdown => Next::Shutdown,
        }
    }
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Record(record) => f.debug_tuple("Record").field(record).finish(),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn fifo_order() {
        let (producer, consumer) = CommandQueue::bounded(8);
        producer.enqueue(CommandRecord::init(10)).unwrap();
        producer.enqueue(CommandRecord::set(1)).unwrap();
        producer.enqueue(CommandRecord::clear(1)).unwrap();

        assert_eq!(consumer.try_take(), Next::Record(CommandRecord::init(10)));
        assert_eq!(consumer.try_take(), Next::Record(CommandRecord::set(1)));
        assert_eq!(consumer.try_take(), Next::Record(CommandRecord::clear(1)));
        assert_eq!(consumer.try_take(), Next::Idle);
    }

    #[test]
    fn shutdown_is_ordered_after_records() {
        let (producer, consumer) = CommandQueue::bounded(8);
        producer.enqueue(CommandRecord::set(1)).unwrap();
        assert!(producer.shutdown());

        assert_eq!(consumer.try_take(), Next::Record(CommandRecord::set(1)));
        assert_eq!(consumer.try_take(), Next::Shutdown);
    }

    #[test]
    fn take_until_times_out() {
        let (_producer, consumer) = CommandQueue::bounded(1);
        let start = Instant::now();
        let next = consumer.take_until(start + Duration::from_millis(20));
        assert_eq!(next, Next::Idle);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn take_until_past_deadline_still_takes() {
        let (producer, consumer) = CommandQueue::bounded(1);
        producer.enqueue(CommandRecord::flip(3)).unwrap();
        let past = Instant::now() - Duration::from_millis(5);
        assert_eq!(consumer.take_until(past), Next::Record(CommandRecord::flip(3)));
    }

    #[test]
    fn closed_after_producers_drop() {
        let (producer, consumer) = CommandQueue::bounded(4);
        producer.enqueue(CommandRecord::set(2)).unwrap();
        drop(producer);

        assert_eq!(consumer.try_take(), Next::Record(CommandRecord::set(2)));
        assert_eq!(consumer.try_take(), Next::Closed);
        assert_eq!(
            consumer.take_until(Instant::now() + Duration::from_secs(5)),
            Next::Closed
        );
    }

    #[test]
    fn take_blocks_until_message() {
        let (producer, consumer) = CommandQueue::bounded(1);
        let sender = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            producer.enqueue(CommandRecord::set(4)).unwrap();
            producer
        });
        assert_eq!(consumer.take(), Next::Record(CommandRecord::set(4)));
        drop(sender.join().unwrap());
        assert_eq!(consumer.take(), Next::Closed);
    }

    #[test]
    fn enqueue_fails_after_consumer_drop() {
        let (producer, consumer) = CommandQueue::bounded(4);
        drop(consumer);
        assert_eq!(
            producer.enqueue(CommandRecord::set(7)),
            Err(QueueClosed(CommandRecord::set(7)))
        );
        assert!(!producer.shutdown());
    }

    #[test]
    fn full_queue_blocks_producer() {
        let (producer, consumer) = CommandQueue::bounded(2);
        producer.enqueue(CommandRecord::set(0)).unwrap();
        producer.enqueue(CommandRecord::set(1)).unwrap();

        let done = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&done);
        let blocked = thread::spawn(move || {
            producer.enqueue(CommandRecord::set(2)).unwrap();
            flag.store(true, Ordering::SeqCst);
        });

        thread::sleep(Duration::from_millis(50));
        assert!(!done.load(Ordering::SeqCst), "producer should be blocked");

        assert_eq!(consumer.try_take(), Next::Record(CommandRecord::set(0)));
        blocked.join().unwrap();
        assert!(done.load(Ordering::SeqCst));

        assert_eq!(consumer.try_take(), Next::Record(CommandRecord::set(1)));
        assert_eq!(consumer.try_take(), Next::Record(CommandRecord::set(2)));
    }

    #[test]
    fn blocked_producer_released_when_consumer_drops() {
        let (producer, consumer) = CommandQueue::bounded(1);
        producer.enqueue(CommandRecord::set(0)).unwrap();

        let blocked = thread::spawn(move || producer.enqueue(CommandRecord::set(1)));
        thread::sleep(Duration::from_millis(20));
        drop(consumer);

        assert_eq!(
            blocked.join().unwrap(),
            Err(QueueClosed(CommandRecord::set(1)))
        );
    }
}
