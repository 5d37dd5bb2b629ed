//! Single-producer / single-consumer receive queue.
//!
//! Bridges the UART receive interrupt (producer) and the poll loop
//! (consumer). The ring itself is `heapless::spsc`, whose halves publish
//! their indices with acquire/release ordering, so neither side ever takes
//! a lock.
//!
//! Overflow policy: drop newest. A byte pushed into a full queue is
//! discarded and counted; bytes already queued are never overwritten.

use heapless::spsc::{Consumer, Producer, Queue};
use portable_atomic::{AtomicU32, Ordering};

/// Usable capacity of the serial receive queue in bytes
pub const SERIAL_RX_CAPACITY: usize = 1024;

/// Receive queue sized for the serial transport
///
/// `heapless::spsc::Queue<_, N>` holds `N - 1` elements, hence the `+ 1`.
pub type SerialRxQueue = ReceiveQueue<{ SERIAL_RX_CAPACITY + 1 }>;

/// Errors reported by the producer side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueueError {
    /// Queue was full; the byte was dropped
    Overflow,
}

/// Fixed-capacity byte ring shared by one producer and one consumer
///
/// Holds up to `N - 1` bytes. Create it in a `static` (or `StaticCell`)
/// and [`split`](ReceiveQueue::split) it once at startup.
pub struct ReceiveQueue<const N: usize> {
    ring: Queue<u8, N>,
    dropped: AtomicU32,
}

impl<const N: usize> Default for ReceiveQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ReceiveQueue<N> {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self {
            ring: Queue::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Number of bytes the queue can hold
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Split into the producer (interrupt side) and consumer (poll side)
    pub fn split(&mut self) -> (RxProducer<'_, N>, RxConsumer<'_, N>) {
        let Self { ring, dropped } = self;
        let dropped: &AtomicU32 = dropped;
        let (producer, consumer) = ring.split();
        (
            RxProducer {
                inner: producer,
                dropped,
            },
            RxConsumer {
                inner: consumer,
                dropped,
            },
        )
    }
}

/// Producer half, owned by the receive interrupt
pub struct RxProducer<'a, const N: usize> {
    inner: Producer<'a, u8, N>,
    dropped: &'a AtomicU32,
}

impl<const N: usize> RxProducer<'_, N> {
    /// Append a received byte
    ///
    /// On a full queue the byte is dropped and counted.
    pub fn push(&mut self, byte: u8) -> Result<(), QueueError> {
        self.inner.enqueue(byte).map_err(|_| {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            QueueError::Overflow
        })
    }
}

/// Consumer half, owned by the poll loop
pub struct RxConsumer<'a, const N: usize> {
    inner: Consumer<'a, u8, N>,
    dropped: &'a AtomicU32,
}

impl<const N: usize> RxConsumer<'_, N> {
    /// Take the oldest queued byte
    pub fn pop(&mut self) -> Option<u8> {
        self.inner.dequeue()
    }

    /// Bytes currently queued
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        !self.inner.ready()
    }

    /// Total bytes dropped on overflow since startup
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Bytes dropped since the last call, resetting the counter
    pub fn take_dropped(&self) -> u32 {
        self.dropped.swap(0, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fifo_order() {
        let mut queue: ReceiveQueue<8> = ReceiveQueue::new();
        let (mut tx, mut rx) = queue.split();

        for byte in [1, 2, 3] {
            tx.push(byte).unwrap();
        }
        assert_eq!(rx.pop(), Some(1));
        tx.push(4).unwrap();
        assert_eq!(rx.pop(), Some(2));
        assert_eq!(rx.pop(), Some(3));
        assert_eq!(rx.pop(), Some(4));
        assert_eq!(rx.pop(), None);
        assert!(rx.is_empty());
    }

    #[test]
    fn test_overflow_drops_newest() {
        let mut queue: ReceiveQueue<4> = ReceiveQueue::new();
        assert_eq!(queue.capacity(), 3);
        let (mut tx, mut rx) = queue.split();

        tx.push(10).unwrap();
        tx.push(11).unwrap();
        tx.push(12).unwrap();
        assert_eq!(tx.push(13), Err(QueueError::Overflow));
        assert_eq!(tx.push(14), Err(QueueError::Overflow));

        assert_eq!(rx.len(), 3);
        assert_eq!(rx.dropped(), 2);
        assert_eq!(rx.pop(), Some(10));
        assert_eq!(rx.pop(), Some(11));
        assert_eq!(rx.pop(), Some(12));
        assert_eq!(rx.pop(), None);

        assert_eq!(rx.take_dropped(), 2);
        assert_eq!(rx.dropped(), 0);
    }

    #[test]
    fn test_wraps_around_ring() {
        let mut queue: ReceiveQueue<4> = ReceiveQueue::new();
        let (mut tx, mut rx) = queue.split();

        for round in 0..10u8 {
            tx.push(round).unwrap();
            tx.push(round.wrapping_add(100)).unwrap();
            assert_eq!(rx.pop(), Some(round));
            assert_eq!(rx.pop(), Some(round.wrapping_add(100)));
        }
        assert_eq!(rx.dropped(), 0);
    }

    #[test]
    fn test_serial_queue_capacity() {
        let queue = SerialRxQueue::new();
        assert_eq!(queue.capacity(), SERIAL_RX_CAPACITY);
    }

    #[test]
    fn test_producer_on_another_thread() {
        let mut queue: ReceiveQueue<64> = ReceiveQueue::new();
        let (mut tx, mut rx) = queue.split();

        let mut received = std::vec::Vec::new();
        std::thread::scope(|s| {
            s.spawn(move || {
                for byte in 0..200u8 {
                    while tx.push(byte).is_err() {
                        std::thread::yield_now();
                    }
                }
            });
            while received.len() < 200 {
                match rx.pop() {
                    Some(byte) => received.push(byte),
                    None => std::thread::yield_now(),
                }
            }
        });

        let expected: std::vec::Vec<u8> = (0..200u8).collect();
        assert_eq!(received, expected);
    }

    proptest! {
        #[test]
        fn prop_count_is_pushes_minus_pops(
            pushes in 0usize..=63,
            pops_seed in any::<proptest::sample::Index>(),
        ) {
            let mut queue: ReceiveQueue<64> = ReceiveQueue::new();
            let (mut tx, mut rx) = queue.split();

            for i in 0..pushes {
                prop_assert!(tx.push(i as u8).is_ok());
            }
            let pops = pops_seed.index(pushes + 1);
            for i in 0..pops {
                prop_assert_eq!(rx.pop(), Some(i as u8));
            }

            prop_assert_eq!(rx.len(), pushes - pops);
            prop_assert_eq!(rx.dropped(), 0);
        }
    }
}
