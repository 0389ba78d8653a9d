// SPDX-FileCopyrightText: 2025 Contributors to the DMO resampler shim project.
// SPDX-License-Identifier: Apache-2.0

//! `IMediaBuffer` COM object backed by a [`MediaBuffer`].

use std::cell::RefCell;

use windows::Win32::Foundation::{E_INVALIDARG, E_POINTER};
use windows::Win32::Media::DxMediaObjects::{IMediaBuffer, IMediaBuffer_Impl};
use windows::core::{AsImpl, implement};

use crate::{MediaBuffer, Result};

/// COM adapter presenting a [`MediaBuffer`] through `IMediaBuffer`.
///
/// Reference counting is real: the object lives until the last COM reference
/// is released, so a DMO that keeps an input buffer alive past
/// `ProcessInput` keeps its storage alive too. The wrapped buffer itself
/// still has a single owner, the COM object.
#[implement(IMediaBuffer)]
pub struct ComMediaBuffer {
    inner: RefCell<MediaBuffer>,
}

impl ComMediaBuffer {
    /// Moves `buffer` into a new COM object.
    pub fn wrap(buffer: MediaBuffer) -> IMediaBuffer {
        Self {
            inner: RefCell::new(buffer),
        }
        .into()
    }

    /// Allocates a new buffer of `max_length` bytes and wraps it.
    pub fn create(max_length: usize) -> Result<IMediaBuffer> {
        Ok(Self::wrap(MediaBuffer::new(max_length)?))
    }

    /// Runs `f` on the buffer wrapped by `buffer`.
    ///
    /// # Safety
    ///
    /// `buffer` must have been produced by [`ComMediaBuffer::wrap`] or
    /// [`ComMediaBuffer::create`].
    pub unsafe fn with_buffer<R>(buffer: &IMediaBuffer, f: impl FnOnce(&mut MediaBuffer) -> R) -> R {
        let this: &ComMediaBuffer = unsafe { buffer.as_impl() };
        f(&mut this.inner.borrow_mut())
    }

    /// Moves the wrapped buffer out, leaving an empty zero-capacity buffer behind.
    ///
    /// # Safety
    ///
    /// Same as [`ComMediaBuffer::with_buffer`]. No other party may still be
    /// using the storage pointer handed out by `GetBufferAndLength`.
    pub unsafe fn take(buffer: &IMediaBuffer) -> MediaBuffer {
        let this: &ComMediaBuffer = unsafe { buffer.as_impl() };
        this.inner.take()
    }
}

impl IMediaBuffer_Impl for ComMediaBuffer_Impl {
    fn SetLength(&self, cblength: u32) -> windows::core::Result<()> {
        self.inner
            .borrow_mut()
            .set_len(cblength as usize)
            .map_err(|_| E_INVALIDARG.into())
    }

    fn GetMaxLength(&self) -> windows::core::Result<u32> {
        u32::try_from(self.inner.borrow().max_length()).map_err(|_| E_INVALIDARG.into())
    }

    fn GetBufferAndLength(
        &self,
        ppbuffer: *mut *mut u8,
        pcblength: *mut u32,
    ) -> windows::core::Result<()> {
        if ppbuffer.is_null() && pcblength.is_null() {
            return Err(E_POINTER.into());
        }
        let mut inner = self.inner.borrow_mut();
        // The length never exceeds the capacity, which fits in a u32 for any
        // buffer created through the DMO paths.
        let length = u32::try_from(inner.len()).map_err(|_| windows::core::Error::from(E_INVALIDARG))?;
        unsafe {
            if !ppbuffer.is_null() {
                *ppbuffer = inner.as_mut_ptr();
            }
            if !pcblength.is_null() {
                *pcblength = length;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn com_view_tracks_rust_buffer() {
        let buffer = ComMediaBuffer::create(8).unwrap();
        unsafe {
            ComMediaBuffer::with_buffer(&buffer, |inner| inner.write(&[1, 2, 3], 0, 3)).unwrap();

            assert_eq!(buffer.GetMaxLength().unwrap(), 8);
            let mut pointer = std::ptr::null_mut();
            let mut length = 0u32;
            buffer.GetBufferAndLength(&mut pointer, &mut length).unwrap();
            assert_eq!(length, 3);
            assert_eq!(std::slice::from_raw_parts(pointer, 3), &[1, 2, 3]);

            assert!(buffer.SetLength(9).is_err());
            buffer.SetLength(8).unwrap();
            assert_eq!(ComMediaBuffer::take(&buffer).len(), 8);
        }
    }
}
