// SPDX-FileCopyrightText: 2025 Contributors to the DMO resampler shim project.
// SPDX-License-Identifier: Apache-2.0

//! Output side of a DMO transform pass.
//!
//! [`OutputDataBuffer`] pairs a [`MediaBuffer`] with the status flags and
//! timing information a DMO reports for each `ProcessOutput` call.

use crate::{MediaBuffer, Result};

/// Status flags reported by a DMO for one output buffer.
///
/// The values match the `DMO_OUTPUT_DATA_BUFFERF_*` constants.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputBufferFlags(u32);

impl OutputBufferFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// The start of the buffer is a synchronization point.
    pub const SYNCPOINT: Self = Self(0x0000_0001);
    /// The timestamp is valid.
    pub const TIME: Self = Self(0x0000_0002);
    /// The time length is valid.
    pub const TIMELENGTH: Self = Self(0x0000_0004);
    /// The DMO has more output pending for this stream.
    pub const INCOMPLETE: Self = Self(0x0100_0000);

    /// Returns the raw flag bits.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl From<u32> for OutputBufferFlags {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl std::ops::BitOr for OutputBufferFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// An output buffer together with the per-pass information filled in by the DMO.
///
/// # Examples
///
/// ```
/// use dmo::{OutputBufferFlags, OutputDataBuffer};
///
/// # fn main() -> Result<(), dmo::Error> {
/// let mut output = OutputDataBuffer::new(1024)?;
/// // ... a transform pass fills the buffer ...
/// output.buffer_mut().write(&[1, 2, 3], 0, 3)?;
///
/// let mut samples = [0u8; 16];
/// let copied = output.read(&mut samples, 0, 16)?;
/// assert_eq!(copied, 3);
///
/// output.reset();
/// assert_eq!(output.len(), 0);
/// assert_eq!(output.status(), OutputBufferFlags::NONE);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OutputDataBuffer {
    buffer: MediaBuffer,
    status: OutputBufferFlags,
    timestamp: i64,
    time_length: i64,
}

impl OutputDataBuffer {
    /// Creates an output buffer backed by a new [`MediaBuffer`] of `buffer_size` bytes.
    pub fn new(buffer_size: usize) -> Result<Self> {
        Ok(Self::from_buffer(MediaBuffer::new(buffer_size)?))
    }

    /// Wraps an existing buffer, with cleared status and timing.
    pub fn from_buffer(buffer: MediaBuffer) -> Self {
        Self {
            buffer,
            status: OutputBufferFlags::NONE,
            timestamp: 0,
            time_length: 0,
        }
    }

    /// Number of valid bytes in the underlying buffer.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn buffer(&self) -> &MediaBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut MediaBuffer {
        &mut self.buffer
    }

    /// Releases the wrapper and returns the underlying buffer.
    pub fn into_buffer(self) -> MediaBuffer {
        self.buffer
    }

    /// Flags reported by the last transform pass.
    pub fn status(&self) -> OutputBufferFlags {
        self.status
    }

    /// Start time of the data, in 100 ns units. Valid if [`OutputBufferFlags::TIME`] is set.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Duration of the data, in 100 ns units. Valid if [`OutputBufferFlags::TIMELENGTH`] is set.
    pub fn time_length(&self) -> i64 {
        self.time_length
    }

    /// `true` while the DMO reports more pending output for this stream.
    pub fn has_more_data(&self) -> bool {
        self.status.contains(OutputBufferFlags::INCOMPLETE)
    }

    /// Records the information a transform pass reported for this buffer.
    pub fn set_pass_info(&mut self, status: OutputBufferFlags, timestamp: i64, time_length: i64) {
        self.status = status;
        self.timestamp = timestamp;
        self.time_length = time_length;
    }

    /// Copies up to `count` valid bytes into `dst[dst_offset..]`.
    ///
    /// `count` is clamped to the current length. Returns the number of bytes
    /// copied.
    pub fn read(&self, dst: &mut [u8], dst_offset: usize, count: usize) -> Result<usize> {
        self.read_from(dst, dst_offset, count, 0)
    }

    /// Copies up to `count` valid bytes starting at `source_offset`.
    ///
    /// `count` is clamped to `len() - source_offset` (zero once the offset is
    /// at or past the length). Returns the number of bytes copied.
    pub fn read_from(
        &self,
        dst: &mut [u8],
        dst_offset: usize,
        count: usize,
        source_offset: usize,
    ) -> Result<usize> {
        let count = count.min(self.len().saturating_sub(source_offset));
        if count == 0 {
            return Ok(0);
        }
        self.buffer.read(dst, dst_offset, count, source_offset)?;
        Ok(count)
    }

    /// Sets the buffer length to zero and clears the status flags.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.status = OutputBufferFlags::NONE;
    }
}
