// SPDX-FileCopyrightText: 2025 Contributors to the DMO resampler shim project.
// SPDX-License-Identifier: Apache-2.0

//! Entry points under the names declared by the existing managed wrapper
//! (`AudioSharp.DMO.MONO`), spelling included.
//!
//! Each one forwards to its current counterpart. Functions the wrapper
//! declares `void` still return a [`Status`]; a caller that ignores the
//! return value sees no difference.

use std::ffi::c_void;

use crate::buffer::{
    MediaBuffer_getLength, MediaBuffer_getMaxLength, MediaBuffer_setLength, MediaBufferCreate,
    MediaBufferDestroy, MediaBufferRead, MediaBufferWrite,
};
use crate::status::Status;

/// Same as [`MediaBufferCreate`].
#[unsafe(no_mangle)]
pub extern "C" fn DMOMediaBufferCreate(max_length: u32) -> *mut c_void {
    MediaBufferCreate(max_length)
}

/// Same as [`MediaBufferDestroy`].
///
/// # Safety
///
/// See [`MediaBufferDestroy`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn DMOMediaBufferDestroy(handle: *mut c_void) -> Status {
    unsafe { MediaBufferDestroy(handle) }
}

/// Same as [`MediaBuffer_getMaxLength`].
///
/// # Safety
///
/// See [`MediaBuffer_getMaxLength`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn DMOMediaBuffer_getMaxLength(handle: *mut c_void) -> u32 {
    unsafe { MediaBuffer_getMaxLength(handle) }
}

/// Same as [`MediaBuffer_getLength`].
///
/// # Safety
///
/// See [`MediaBuffer_getLength`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn DMOMediaBuffer_getLength(handle: *mut c_void) -> u32 {
    unsafe { MediaBuffer_getLength(handle) }
}

/// Same as [`MediaBuffer_setLength`].
///
/// # Safety
///
/// See [`MediaBuffer_setLength`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn DMOMediaBuffer_setLength(handle: *mut c_void, length: u32) -> Status {
    unsafe { MediaBuffer_setLength(handle, length) }
}

/// Same as [`MediaBufferRead`].
///
/// # Safety
///
/// See [`MediaBufferRead`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn DMOMediaBufferRead(
    handle: *mut c_void,
    destination: *mut u8,
    destination_offset: u32,
    count: u32,
    source_offset: u32,
) -> Status {
    unsafe { MediaBufferRead(handle, destination, destination_offset, count, source_offset) }
}

/// Same as [`MediaBufferWrite`].
///
/// # Safety
///
/// See [`MediaBufferWrite`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn DMOMediaBufferWrite(
    handle: *mut c_void,
    source: *const u8,
    source_offset: u32,
    count: u32,
) -> Status {
    unsafe { MediaBufferWrite(handle, source, source_offset, count) }
}

#[cfg(windows)]
pub use self::resampler::*;

#[cfg(windows)]
mod resampler {
    use std::ffi::c_void;

    use crate::resampler::{
        Resampler_mediaObject, Resampler_resamplerProps, ResamplerCreate, ResamplerDestroy,
    };
    use crate::status::Status;

    /// Same as [`ResamplerCreate`].
    #[unsafe(no_mangle)]
    pub extern "C" fn DMOWMResamplerCreate() -> *mut c_void {
        ResamplerCreate()
    }

    /// Same as [`ResamplerDestroy`].
    ///
    /// # Safety
    ///
    /// See [`ResamplerDestroy`].
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn DMOWMResamlerDestroy(handle: *mut c_void) -> Status {
        unsafe { ResamplerDestroy(handle) }
    }

    /// Same as [`Resampler_mediaObject`].
    ///
    /// # Safety
    ///
    /// See [`Resampler_mediaObject`].
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn DMOWMResamler_mediaObject(handle: *mut c_void) -> *mut c_void {
        unsafe { Resampler_mediaObject(handle) }
    }

    /// Same as [`Resampler_resamplerProps`].
    ///
    /// # Safety
    ///
    /// See [`Resampler_resamplerProps`].
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn DMOWMResamler_resamplerprops(handle: *mut c_void) -> *mut c_void {
        unsafe { Resampler_resamplerProps(handle) }
    }
}
