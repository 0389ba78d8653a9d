// SPDX-FileCopyrightText: 2025 Contributors to the DMO resampler shim project.
// SPDX-License-Identifier: Apache-2.0

//! Capacity-bounded byte buffer used as the input and output channel of a
//! DMO transform.

use std::ops::Range;

use tracing::trace;

use crate::{Error, Result};

/// Fixed-capacity media buffer.
///
/// The storage is allocated once in [`MediaBuffer::new`] and released when the
/// value is dropped. The buffer has no read cursor: reads and writes address
/// the storage through explicit offsets, and every window is checked against
/// the capacity before any byte is copied.
///
/// A `MediaBuffer` has exactly one owner. Hand it to another component by
/// moving it; there is no shared ownership.
///
/// # Examples
///
/// ```
/// use dmo::MediaBuffer;
///
/// # fn main() -> Result<(), dmo::Error> {
/// let mut buffer = MediaBuffer::new(4)?;
/// buffer.write(&[0x01, 0x02, 0x03, 0x04], 0, 4)?;
/// assert_eq!(buffer.len(), 4);
///
/// let mut out = [0u8; 4];
/// buffer.read(&mut out, 0, 4, 0)?;
/// assert_eq!(out, [0x01, 0x02, 0x03, 0x04]);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct MediaBuffer {
    storage: Box<[u8]>,
    length: usize,
}

impl MediaBuffer {
    /// Allocates a buffer able to hold `max_length` bytes, with a length of zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Allocation`] if the storage cannot be obtained.
    pub fn new(max_length: usize) -> Result<Self> {
        let mut storage = Vec::new();
        storage
            .try_reserve_exact(max_length)
            .map_err(|_| Error::Allocation {
                requested: max_length,
            })?;
        storage.resize(max_length, 0);
        trace!(max_length, "Allocated media buffer");
        Ok(Self {
            storage: storage.into_boxed_slice(),
            length: 0,
        })
    }

    /// Releases the buffer. Equivalent to dropping it.
    pub fn destroy(self) {}

    /// Returns the capacity in bytes. Fixed for the lifetime of the buffer.
    pub fn max_length(&self) -> usize {
        self.storage.len()
    }

    /// Returns the number of valid bytes.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the buffer holds no valid bytes.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Sets the number of valid bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLength`] if `length` exceeds the capacity. The
    /// current length is left untouched in that case.
    pub fn set_len(&mut self, length: usize) -> Result<()> {
        if length > self.max_length() {
            return Err(Error::InvalidLength {
                length,
                max_length: self.max_length(),
            });
        }
        self.length = length;
        Ok(())
    }

    /// Copies `count` bytes starting at `src_offset` in the storage into
    /// `dst[dst_offset..dst_offset + count]`.
    ///
    /// The source window is bounded by the capacity, not the current length,
    /// so callers may read back bytes that a transform wrote before adjusting
    /// the length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if either window does not fit. Nothing is
    /// copied on failure.
    pub fn read(
        &self,
        dst: &mut [u8],
        dst_offset: usize,
        count: usize,
        src_offset: usize,
    ) -> Result<()> {
        let src = window(src_offset, count, self.max_length())?;
        let dst_range = window(dst_offset, count, dst.len())?;
        dst[dst_range].copy_from_slice(&self.storage[src]);
        Ok(())
    }

    /// Replaces the buffer contents with `src[src_offset..src_offset + count]`.
    ///
    /// The bytes always land at the start of the storage and the length
    /// becomes `count`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `count` exceeds the capacity or the
    /// source window exceeds `src`. The buffer is unchanged on failure.
    pub fn write(&mut self, src: &[u8], src_offset: usize, count: usize) -> Result<()> {
        let dst = window(0, count, self.max_length())?;
        let src = window(src_offset, count, src.len()).map(|range| &src[range])?;
        self.storage[dst].copy_from_slice(src);
        self.length = count;
        Ok(())
    }

    /// Marks the buffer empty. The storage is kept.
    pub(crate) fn clear(&mut self) {
        self.length = 0;
    }

    /// Returns the valid bytes, `storage[..len()]`.
    pub fn data(&self) -> &[u8] {
        &self.storage[..self.length]
    }

    /// Exposes the whole storage together with the current length, for
    /// zero-copy consumption by a transform.
    pub fn buffer_and_length(&mut self) -> (&mut [u8], usize) {
        (&mut self.storage, self.length)
    }

    /// Raw pointer to the start of the storage.
    ///
    /// The pointer stays valid until the buffer is dropped; the storage is
    /// never reallocated.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.storage.as_mut_ptr()
    }
}

impl std::fmt::Debug for MediaBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaBuffer")
            .field("max_length", &self.max_length())
            .field("length", &self.length)
            .finish()
    }
}

/// Single bounds check shared by every operation that addresses the storage.
fn window(offset: usize, count: usize, limit: usize) -> Result<Range<usize>> {
    match offset.checked_add(count) {
        Some(end) if end <= limit => Ok(offset..end),
        _ => Err(Error::OutOfRange {
            offset,
            count,
            limit,
        }),
    }
}
