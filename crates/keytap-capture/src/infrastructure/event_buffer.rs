//! Bounded event buffer between the capture producer and the device reader.
//!
//! A fixed-capacity circular byte store with a lock-free single-producer
//! single-consumer discipline. The producer runs in a restricted context
//! (timer tick or probe entry handler) and must never block, sleep, or
//! allocate; its entire shared-state interaction is a handful of atomic
//! operations. The consumer copies bytes out in bounded amounts from an
//! ordinary scheduling context.
//!
//! Overflow policy: once the buffer is full, newly-arriving bytes are
//! dropped — the oldest buffered bytes are preserved and the producer is
//! never back-pressured or notified of the loss.
//!
//! The producer/consumer split mirrors a channel: [`bounded`] returns one
//! move-only handle per side, so the single-producer/single-consumer
//! invariant is enforced by ownership rather than by runtime checks.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

/// Default buffer capacity in bytes.
pub const DEFAULT_CAPACITY: usize = 4096;

/// Shared ring storage. One slot is kept unused to distinguish full from
/// empty, so `slots.len() == capacity + 1`.
struct Ring {
    slots: Box<[AtomicU8]>,
    /// Next slot to pop. Written only by the consumer.
    head: AtomicUsize,
    /// Next slot to push. Written only by the producer.
    tail: AtomicUsize,
}

impl Ring {
    fn capacity(&self) -> usize {
        self.slots.len() - 1
    }
}

/// Creates a bounded event buffer and splits it into its two endpoints.
///
/// # Panics
///
/// Panics if `capacity` is zero.
pub fn bounded(capacity: usize) -> (ScanProducer, ScanConsumer) {
    assert!(capacity > 0, "event buffer capacity must be non-zero");

    let slots: Box<[AtomicU8]> = (0..=capacity).map(|_| AtomicU8::new(0)).collect();
    let ring = Arc::new(Ring {
        slots,
        head: AtomicUsize::new(0),
        tail: AtomicUsize::new(0),
    });

    (
        ScanProducer {
            ring: Arc::clone(&ring),
        },
        ScanConsumer { ring },
    )
}

/// The producer endpoint. Safe to use from a restricted context: [`push`]
/// performs no allocation and never blocks.
///
/// [`push`]: ScanProducer::push
pub struct ScanProducer {
    ring: Arc<Ring>,
}

impl ScanProducer {
    /// Appends one byte.
    ///
    /// Returns `false` (and drops the byte) when the buffer is full. The
    /// bytes already buffered are left untouched.
    pub fn push(&self, byte: u8) -> bool {
        let slots = &self.ring.slots;
        let tail = self.ring.tail.load(Ordering::Relaxed);
        let next = (tail + 1) % slots.len();

        if next == self.ring.head.load(Ordering::Acquire) {
            return false;
        }

        slots[tail].store(byte, Ordering::Relaxed);
        // Publishes the slot write above to the consumer.
        self.ring.tail.store(next, Ordering::Release);
        true
    }

    /// The fixed byte capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }
}

/// The consumer endpoint.
pub struct ScanConsumer {
    ring: Arc<Ring>,
}

impl ScanConsumer {
    /// Copies out up to `out.len()` bytes in push order, returning how many
    /// were copied (0 when the buffer is empty).
    pub fn pop_into(&mut self, out: &mut [u8]) -> usize {
        let slots = &self.ring.slots;
        let mut head = self.ring.head.load(Ordering::Relaxed);
        // Acquire pairs with the producer's Release: every slot written
        // before that tail publish is visible below.
        let tail = self.ring.tail.load(Ordering::Acquire);

        let mut copied = 0;
        while head != tail && copied < out.len() {
            out[copied] = slots[head].load(Ordering::Relaxed);
            head = (head + 1) % slots.len();
            copied += 1;
        }

        if copied > 0 {
            self.ring.head.store(head, Ordering::Release);
        }
        copied
    }

    /// The number of bytes currently buffered, in `[0, capacity]`.
    pub fn occupied(&self) -> usize {
        let len = self.ring.slots.len();
        let head = self.ring.head.load(Ordering::Relaxed);
        let tail = self.ring.tail.load(Ordering::Acquire);
        (tail + len - head) % len
    }

    /// Whether the buffer currently holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.occupied() == 0
    }

    /// The fixed byte capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
