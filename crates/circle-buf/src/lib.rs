//! A fixed-capacity byte ring buffer over caller-supplied storage.
//!
//! [`RingBuf`] never allocates. It borrows a byte slice whose length is a power of two and
//! tracks the total number of bytes ever written and read. The queued length is the wrapping
//! difference of the two counters, so a full ring and an empty ring are never confused, and
//! physical positions are recovered with a bitmask.
//!
//! ```
//! use circle_buf::RingBuf;
//!
//! let mut storage = [0_u8; 8];
//! let mut ring = RingBuf::from_array(&mut storage);
//!
//! assert_eq!(ring.push(b"hello"), 5);
//! let mut out = [0_u8; 3];
//! assert_eq!(ring.pop(&mut out), 3);
//! assert_eq!(&out, b"hel");
//!
//! // only 6 bytes are free; the write wraps past the end of storage
//! assert_eq!(ring.push(b"world!!"), 6);
//! assert_eq!(ring.as_slices(), (&b"lowor"[..], &b"ld!"[..]));
//! ```
#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

use core::fmt;

use tracing::{debug, trace, warn};

pub use crate::error::{ClearError, InitError};

mod error;
#[cfg(feature = "std")]
mod io;

/// A single-producer single-consumer byte FIFO backed by borrowed storage.
///
/// Not synchronized: share it between threads only behind a lock.
pub struct RingBuf<'a> {
    storage: Option<&'a mut [u8]>,
    capacity: usize,
    mask: usize,
    // total bytes ever pushed
    written: usize,
    // total bytes ever popped or consumed
    read: usize,
}

impl Default for RingBuf<'_> {
    fn default() -> Self {
        Self::unbound()
    }
}

impl<'a> RingBuf<'a> {
    /// Creates a ring with no storage bound to it.
    ///
    /// It reports zero length, accepts no data, and can be bound later with [`RingBuf::bind`].
    #[must_use]
    pub const fn unbound() -> Self {
        Self {
            storage: None,
            capacity: 0,
            mask: 0,
            written: 0,
            read: 0,
        }
    }

    /// Creates an empty ring using all of `storage`.
    pub fn new(storage: &'a mut [u8]) -> Result<Self, InitError> {
        let capacity = storage.len();
        Self::with_capacity(storage, capacity)
    }

    /// Creates an empty ring using the first `capacity` bytes of `storage`.
    pub fn with_capacity(storage: &'a mut [u8], capacity: usize) -> Result<Self, InitError> {
        let mut ring = Self::unbound();
        ring.bind(storage, capacity)?;
        Ok(ring)
    }

    /// Creates an empty ring over an array whose length is checked at compile time.
    #[must_use]
    pub fn from_array<const N: usize>(storage: &'a mut [u8; N]) -> Self {
        const {
            assert!(
                N >= 2 && N.is_power_of_two(),
                "ring capacity must be a power of two and at least 2"
            );
        }

        debug!(capacity = N, "bound ring buffer");

        Self {
            storage: Some(storage),
            capacity: N,
            mask: N - 1,
            written: 0,
            read: 0,
        }
    }

    /// Binds the ring to the first `capacity` bytes of `storage` and empties it.
    ///
    /// Rebinding an already bound ring discards its queued data. On error nothing changes.
    pub fn bind(&mut self, storage: &'a mut [u8], capacity: usize) -> Result<(), InitError> {
        if let Err(e) = error::validate(storage.len(), capacity) {
            warn!("refusing to bind ring buffer: {e}");
            return Err(e);
        }

        let (storage, _) = storage.split_at_mut(capacity);

        *self = Self {
            storage: Some(storage),
            capacity,
            mask: capacity - 1,
            written: 0,
            read: 0,
        };

        debug!(capacity, "bound ring buffer");
        Ok(())
    }

    #[inline]
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.storage.is_some()
    }

    /// Total bytes the ring can hold; zero while unbound.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of bytes queued for reading.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.written.wrapping_sub(self.read)
    }

    /// Number of bytes that can be pushed before the ring is full.
    #[inline]
    #[must_use]
    pub const fn free(&self) -> usize {
        self.capacity - self.len()
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.is_bound() && self.len() == self.capacity
    }

    /// Returns the queued bytes as two slices in FIFO order.
    ///
    /// The second slice is empty unless the queued data wraps past the end of storage.
    #[must_use]
    pub fn as_slices(&self) -> (&[u8], &[u8]) {
        let Some(storage) = self.storage.as_deref() else {
            return (&[], &[]);
        };

        let len = self.len();
        let (front, back) = storage.split_at(self.read & self.mask);

        if len <= back.len() {
            (&back[..len], &[])
        } else {
            (back, &front[..len - back.len()])
        }
    }

    /// Returns the contiguous queued bytes starting at the read position without consuming them.
    ///
    /// The view stops at the physical end of storage even if more data is queued after the
    /// wrap; use [`RingBuf::consume`] and peek again to reach it, or [`RingBuf::as_slices`].
    #[inline]
    #[must_use]
    pub fn peek(&self) -> &[u8] {
        self.as_slices().0
    }

    #[inline]
    #[must_use]
    pub fn peek_byte(&self) -> Option<u8> {
        self.peek().first().copied()
    }

    /// Returns the free region as two slices in write order:
    /// - First slice: from the write position towards the end of storage
    /// - Second slice: from the start of storage up to the oldest queued byte
    ///
    /// Bytes written here become visible only after [`RingBuf::commit`].
    pub fn spare_slices_mut(&mut self) -> (&mut [u8], &mut [u8]) {
        let free = self.free();
        let write_idx = self.written & self.mask;

        let Some(storage) = self.storage.as_deref_mut() else {
            return (&mut [], &mut []);
        };

        let (front, back) = storage.split_at_mut(write_idx);

        if free <= back.len() {
            (&mut back[..free], &mut [])
        } else {
            let wrapped = free - back.len();
            (back, &mut front[..wrapped])
        }
    }

    /// Publishes up to `amount` bytes previously written through [`RingBuf::spare_slices_mut`].
    ///
    /// Returns the number of bytes committed, which never exceeds [`RingBuf::free`].
    pub fn commit(&mut self, amount: usize) -> usize {
        let committed = amount.min(self.free());
        self.written = self.written.wrapping_add(committed);
        committed
    }

    /// Discards up to `amount` queued bytes without copying them.
    pub fn consume(&mut self, amount: usize) -> usize {
        let consumed = amount.min(self.len());
        self.read = self.read.wrapping_add(consumed);
        consumed
    }

    /// Copies as much of `src` as fits into the ring, returns the number of bytes pushed.
    ///
    /// Queued data is never overwritten; a short count means the ring filled up.
    pub fn push(&mut self, src: &[u8]) -> usize {
        let (first, second) = self.spare_slices_mut();

        let to_write1 = src.len().min(first.len());
        first[..to_write1].copy_from_slice(&src[..to_write1]);

        let to_write2 = (src.len() - to_write1).min(second.len());
        second[..to_write2].copy_from_slice(&src[to_write1..to_write1 + to_write2]);

        let pushed = to_write1 + to_write2;
        if pushed < src.len() {
            trace!(requested = src.len(), pushed, "push truncated to free space");
        }
        if to_write2 > 0 {
            trace!(pushed, wrapped = to_write2, "push wrapped");
        }

        self.written = self.written.wrapping_add(pushed);
        pushed
    }

    /// Pushes a single byte, handing it back if the ring is full.
    pub fn push_byte(&mut self, byte: u8) -> Result<(), u8> {
        if self.push(&[byte]) == 1 {
            Ok(())
        } else {
            Err(byte)
        }
    }

    /// Moves up to `dst.len()` queued bytes into `dst`, returns the number of bytes popped.
    pub fn pop(&mut self, dst: &mut [u8]) -> usize {
        let (first, second) = self.as_slices();

        let to_read1 = dst.len().min(first.len());
        dst[..to_read1].copy_from_slice(&first[..to_read1]);

        let to_read2 = (dst.len() - to_read1).min(second.len());
        dst[to_read1..to_read1 + to_read2].copy_from_slice(&second[..to_read2]);

        let popped = to_read1 + to_read2;
        if popped < dst.len() {
            trace!(requested = dst.len(), popped, "pop truncated to queued data");
        }
        if to_read2 > 0 {
            trace!(popped, wrapped = to_read2, "pop wrapped");
        }

        self.read = self.read.wrapping_add(popped);
        popped
    }

    pub fn pop_byte(&mut self) -> Option<u8> {
        let mut byte = [0];
        (self.pop(&mut byte) == 1).then_some(byte[0])
    }

    /// Discards all queued data. Storage contents are left as they are.
    pub const fn clear(&mut self) -> Result<(), ClearError> {
        if !self.is_bound() {
            return Err(ClearError::Unbound);
        }

        self.written = 0;
        self.read = 0;
        Ok(())
    }
}

impl fmt::Debug for RingBuf<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuf")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("written", &self.written)
            .field("read", &self.read)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::format;

    use super::*;

    #[test]
    fn test_basic_operations() {
        let mut storage = [0; 16];
        let mut ring = RingBuf::from_array(&mut storage);

        assert_eq!(ring.push(&[1, 2, 3, 4]), 4);
        assert_eq!(ring.peek(), &[1, 2, 3, 4]);

        let mut out = [0; 2];
        assert_eq!(ring.pop(&mut out), 2);
        assert_eq!(out, [1, 2]);
        assert_eq!(ring.peek(), &[3, 4]);
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn test_wrap_around() {
        let mut storage = [0; 4];
        let mut ring = RingBuf::from_array(&mut storage);

        // Fill buffer
        assert_eq!(ring.push(&[1, 2, 3, 4]), 4);
        assert!(ring.is_full());

        // Read part
        assert_eq!(ring.consume(2), 2);

        // Write more to trigger wrap
        assert_eq!(ring.push(&[5, 6]), 2);

        assert_eq!(ring.peek(), &[3, 4]);
        assert_eq!(ring.as_slices(), (&[3, 4][..], &[5, 6][..]));

        let mut out = [0; 4];
        assert_eq!(ring.pop(&mut out), 4);
        assert_eq!(out, [3, 4, 5, 6]);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_rejects_bad_capacity() {
        let mut storage = [0; 64];

        for capacity in [0, 1] {
            assert_eq!(
                RingBuf::with_capacity(&mut storage, capacity).unwrap_err(),
                InitError::CapacityTooSmall { capacity }
            );
        }

        for capacity in [3, 5, 6, 7, 9, 12, 63] {
            assert_eq!(
                RingBuf::with_capacity(&mut storage, capacity).unwrap_err(),
                InitError::NotPowerOfTwo { capacity }
            );
        }

        assert_eq!(
            RingBuf::with_capacity(&mut storage, 128).unwrap_err(),
            InitError::StorageTooSmall {
                len: 64,
                capacity: 128
            }
        );
        assert_eq!(
            RingBuf::new(&mut []).unwrap_err(),
            InitError::CapacityTooSmall { capacity: 0 }
        );
    }

    #[test]
    fn test_with_capacity_uses_prefix() {
        let mut storage = [0xFF; 12];
        let mut ring = RingBuf::with_capacity(&mut storage, 8).unwrap();

        assert_eq!(ring.capacity(), 8);
        assert_eq!(ring.push(&[0; 12]), 8);

        assert_eq!(storage[8..], [0xFF; 4]);
    }

    #[test]
    fn test_failed_bind_keeps_state() {
        let mut storage = [0; 8];
        let mut other = [0; 6];
        let mut ring = RingBuf::from_array(&mut storage);
        ring.push(&[1, 2, 3]);

        assert!(ring.bind(&mut other, 6).is_err());
        assert_eq!(ring.capacity(), 8);
        assert_eq!(ring.peek(), &[1, 2, 3]);
    }

    #[test]
    fn test_rebind_resets() {
        let mut first = [0; 8];
        let mut second = [0; 4];
        let mut ring = RingBuf::from_array(&mut first);
        ring.push(&[1, 2, 3]);

        ring.bind(&mut second, 4).unwrap();
        assert_eq!(ring.capacity(), 4);
        assert!(ring.is_empty());
        assert_eq!(ring.push(&[9; 8]), 4);
    }

    #[test]
    fn test_unbound() {
        let mut ring = RingBuf::unbound();

        assert!(!ring.is_bound());
        assert_eq!(ring.len(), 0);
        assert_eq!(ring.free(), 0);
        assert!(!ring.is_full());
        assert!(ring.peek().is_empty());
        assert_eq!(ring.push(&[1, 2]), 0);
        assert_eq!(ring.pop(&mut [0; 2]), 0);
        assert_eq!(ring.clear(), Err(ClearError::Unbound));
    }

    #[test]
    fn test_clear_keeps_storage() {
        let mut storage = [0; 4];
        let mut ring = RingBuf::from_array(&mut storage);
        ring.push(&[7, 7, 7]);

        assert_eq!(ring.clear(), Ok(()));
        assert!(ring.is_empty());
        assert_eq!(ring.clear(), Ok(()));

        assert_eq!(storage, [7, 7, 7, 0]);
    }

    #[test]
    fn test_spare_slices_and_commit() {
        let mut storage = [0; 8];
        let mut ring = RingBuf::from_array(&mut storage);
        ring.push(&[0; 6]);
        ring.consume(4);

        let (first, second) = ring.spare_slices_mut();
        assert_eq!((first.len(), second.len()), (2, 4));
        first.copy_from_slice(&[1, 2]);
        second[..1].copy_from_slice(&[3]);

        // nothing visible before the commit
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.commit(3), 3);
        assert_eq!(ring.as_slices(), (&[0, 0, 1, 2][..], &[3][..]));

        assert_eq!(ring.commit(100), 3);
        assert!(ring.is_full());
    }

    #[test]
    fn test_single_bytes() {
        let mut storage = [0; 2];
        let mut ring = RingBuf::from_array(&mut storage);

        assert_eq!(ring.push_byte(b'a'), Ok(()));
        assert_eq!(ring.push_byte(b'b'), Ok(()));
        assert_eq!(ring.push_byte(b'c'), Err(b'c'));

        assert_eq!(ring.peek_byte(), Some(b'a'));
        assert_eq!(ring.pop_byte(), Some(b'a'));
        assert_eq!(ring.pop_byte(), Some(b'b'));
        assert_eq!(ring.pop_byte(), None);
        assert_eq!(ring.peek_byte(), None);
    }

    #[test]
    fn test_debug_hides_contents() {
        let mut storage = [0; 4];
        let mut ring = RingBuf::from_array(&mut storage);
        ring.push(&[0xAB; 3]);

        assert_eq!(
            format!("{ring:?}"),
            "RingBuf { capacity: 4, len: 3, written: 3, read: 0, .. }"
        );
    }

    #[test]
    fn test_counters_wrap() {
        let mut storage = [0; 8];
        let mut ring = RingBuf::from_array(&mut storage);
        ring.written = usize::MAX - 2;
        ring.read = usize::MAX - 2;

        assert_eq!(ring.push(&[1, 2, 3, 4, 5]), 5);
        assert_eq!(ring.len(), 5);

        let mut out = [0; 5];
        assert_eq!(ring.pop(&mut out), 5);
        assert_eq!(out, [1, 2, 3, 4, 5]);
        assert!(ring.is_empty());
    }
}
