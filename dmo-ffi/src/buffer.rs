// SPDX-FileCopyrightText: 2025 Contributors to the DMO resampler shim project.
// SPDX-License-Identifier: Apache-2.0

//! Exported media buffer functions.
//!
//! On Windows a buffer handle is an `IMediaBuffer*`, so callers can place it
//! directly into a `DMO_OUTPUT_DATA_BUFFER`. Elsewhere it is an opaque
//! pointer to a boxed [`MediaBuffer`].
//!
//! Destroying a buffer frees its storage and retires the handle. The cell
//! behind a retired handle stays allocated, so its address is never reused
//! (see `registry`).

use std::ffi::c_void;

use dmo::{Error, MediaBuffer};
use tracing::{debug, warn};

use crate::registry::HandleRegistry;
use crate::status::{DMO_ERR_INVALID_ARG, DMO_ERR_INVALID_HANDLE, DMO_STATUS_OK, Status, to_status};

static BUFFERS: HandleRegistry = HandleRegistry::new();

#[cfg(windows)]
mod raw {
    use std::ffi::c_void;

    use dmo::{ComMediaBuffer, MediaBuffer};
    use windows::Win32::Media::DxMediaObjects::IMediaBuffer;
    use windows::core::Interface;

    /// The handle owns one COM reference to the new object.
    pub(super) fn into_handle(buffer: MediaBuffer) -> *mut c_void {
        ComMediaBuffer::wrap(buffer).into_raw()
    }

    /// Frees the storage. The handle's COM reference is never released, so
    /// the object, now an empty zero-capacity buffer, outlives every caller.
    pub(super) unsafe fn retire(handle: *mut c_void) {
        if let Some(buffer) = unsafe { IMediaBuffer::from_raw_borrowed(&handle) } {
            drop(unsafe { ComMediaBuffer::take(buffer) });
        }
    }

    pub(super) unsafe fn with<R>(
        handle: *mut c_void,
        f: impl FnOnce(&mut MediaBuffer) -> R,
    ) -> Option<R> {
        let buffer = unsafe { IMediaBuffer::from_raw_borrowed(&handle) }?;
        Some(unsafe { ComMediaBuffer::with_buffer(buffer, f) })
    }
}

#[cfg(not(windows))]
mod raw {
    use std::ffi::c_void;

    use dmo::MediaBuffer;

    pub(super) fn into_handle(buffer: MediaBuffer) -> *mut c_void {
        Box::into_raw(Box::new(buffer)).cast()
    }

    /// Frees the storage and leaves an empty zero-capacity buffer in the cell.
    /// The box itself is never freed.
    pub(super) unsafe fn retire(handle: *mut c_void) {
        if let Some(cell) = unsafe { handle.cast::<MediaBuffer>().as_mut() } {
            drop(std::mem::take(cell));
        }
    }

    pub(super) unsafe fn with<R>(
        handle: *mut c_void,
        f: impl FnOnce(&mut MediaBuffer) -> R,
    ) -> Option<R> {
        let buffer = unsafe { handle.cast::<MediaBuffer>().as_mut() }?;
        Some(f(buffer))
    }
}

/// Runs `f` on the buffer behind a live handle.
fn with_buffer<R>(handle: *mut c_void, f: impl FnOnce(&mut MediaBuffer) -> R) -> Option<R> {
    match BUFFERS.access(handle, || unsafe { raw::with(handle, f) }) {
        Ok(result) => result,
        Err(reason) => {
            warn!(?handle, ?reason, "Invalid media buffer handle");
            None
        }
    }
}

/// Length of the caller's memory region needed for `offset + count` bytes.
fn span(offset: u32, count: u32) -> dmo::Result<usize> {
    (offset as usize)
        .checked_add(count as usize)
        .ok_or(Error::OutOfRange {
            offset: offset as usize,
            count: count as usize,
            limit: usize::MAX,
        })
}

/// Allocates a buffer of `max_length` bytes. Returns null on failure.
#[unsafe(no_mangle)]
pub extern "C" fn MediaBufferCreate(max_length: u32) -> *mut c_void {
    match MediaBuffer::new(max_length as usize) {
        Ok(buffer) => {
            let handle = raw::into_handle(buffer);
            BUFFERS.insert(handle);
            debug!(?handle, max_length, "Created media buffer");
            handle
        }
        Err(error) => {
            warn!(max_length, %error, "MediaBufferCreate failed");
            std::ptr::null_mut()
        }
    }
}

/// Frees a buffer's storage and retires its handle.
///
/// Any later call with the same handle, including a second destroy, is
/// rejected with `DMO_ERR_INVALID_HANDLE`.
///
/// # Safety
///
/// `handle` must be null or a value returned by [`MediaBufferCreate`]. No DMO
/// may still be holding the buffer's storage.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn MediaBufferDestroy(handle: *mut c_void) -> Status {
    match BUFFERS.retire(handle, |handle| unsafe { raw::retire(handle) }) {
        Ok(()) => {
            debug!(?handle, "Destroyed media buffer");
            DMO_STATUS_OK
        }
        Err(reason) => {
            warn!(?handle, ?reason, "MediaBufferDestroy on a handle that is not live");
            DMO_ERR_INVALID_HANDLE
        }
    }
}

/// Capacity of the buffer, or 0 for an invalid handle.
///
/// # Safety
///
/// `handle` must be null or a value returned by [`MediaBufferCreate`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn MediaBuffer_getMaxLength(handle: *mut c_void) -> u32 {
    // Buffers created through this boundary never exceed u32::MAX bytes.
    with_buffer(handle, |buffer| buffer.max_length() as u32).unwrap_or(0)
}

/// Current length of the buffer, or 0 for an invalid handle.
///
/// # Safety
///
/// `handle` must be null or a value returned by [`MediaBufferCreate`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn MediaBuffer_getLength(handle: *mut c_void) -> u32 {
    with_buffer(handle, |buffer| buffer.len() as u32).unwrap_or(0)
}

/// Sets the length. Fails with `DMO_ERR_OUT_OF_RANGE` beyond the capacity.
///
/// # Safety
///
/// `handle` must be null or a value returned by [`MediaBufferCreate`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn MediaBuffer_setLength(handle: *mut c_void, length: u32) -> Status {
    with_buffer(handle, |buffer| {
        to_status("MediaBuffer_setLength", buffer.set_len(length as usize))
    })
    .unwrap_or(DMO_ERR_INVALID_HANDLE)
}

/// Copies `count` bytes from the buffer at `source_offset` into
/// `destination + destination_offset`.
///
/// # Safety
///
/// `handle` must be null or a value returned by [`MediaBufferCreate`].
/// `destination` must be valid for writes of `destination_offset + count`
/// bytes, or null when `count` is zero. A null destination ignores
/// `destination_offset`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn MediaBufferRead(
    handle: *mut c_void,
    destination: *mut u8,
    destination_offset: u32,
    count: u32,
    source_offset: u32,
) -> Status {
    if destination.is_null() && count > 0 {
        return DMO_ERR_INVALID_ARG;
    }
    with_buffer(handle, |buffer| {
        // A null destination only comes with an empty read; its offset is moot.
        let result = if destination.is_null() {
            buffer.read(&mut [], 0, 0, source_offset as usize)
        } else {
            span(destination_offset, count).and_then(|len| {
                let destination = unsafe { std::slice::from_raw_parts_mut(destination, len) };
                buffer.read(
                    destination,
                    destination_offset as usize,
                    count as usize,
                    source_offset as usize,
                )
            })
        };
        to_status("MediaBufferRead", result)
    })
    .unwrap_or(DMO_ERR_INVALID_HANDLE)
}

/// Replaces the buffer contents with `count` bytes from
/// `source + source_offset`; the length becomes `count`.
///
/// # Safety
///
/// `handle` must be null or a value returned by [`MediaBufferCreate`].
/// `source` must be valid for reads of `source_offset + count` bytes, or
/// null when `count` is zero. A null source ignores `source_offset`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn MediaBufferWrite(
    handle: *mut c_void,
    source: *const u8,
    source_offset: u32,
    count: u32,
) -> Status {
    if source.is_null() && count > 0 {
        return DMO_ERR_INVALID_ARG;
    }
    with_buffer(handle, |buffer| {
        // A null source only comes with an empty write; its offset is moot.
        let result = if source.is_null() {
            buffer.write(&[], 0, 0)
        } else {
            span(source_offset, count).and_then(|len| {
                let source = unsafe { std::slice::from_raw_parts(source, len) };
                buffer.write(source, source_offset as usize, count as usize)
            })
        };
        to_status("MediaBufferWrite", result)
    })
    .unwrap_or(DMO_ERR_INVALID_HANDLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_adds_without_overflow_on_u32_inputs() {
        assert_eq!(span(2, 3).unwrap(), 5);
        assert_eq!(span(u32::MAX, u32::MAX).unwrap(), 2 * u32::MAX as usize);
    }
}
