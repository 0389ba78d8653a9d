// SPDX-FileCopyrightText: 2025 Contributors to the DMO resampler shim project.
// SPDX-License-Identifier: Apache-2.0

//! Lifetime management of the operating system's audio resampler DMO.

use std::marker::PhantomData;
use std::mem::ManuallyDrop;

use tracing::{debug, trace};
use windows::Win32::Foundation::RPC_E_CHANGED_MODE;
use windows::Win32::Media::DxMediaObjects::{DMO_OUTPUT_DATA_BUFFER, IMediaObject};
use windows::Win32::Media::MediaFoundation::{CLSID_CResamplerMediaObject, IWMResamplerProps};
use windows::Win32::System::Com::{
    CLSCTX_INPROC_SERVER, COINIT_MULTITHREADED, CoCreateInstance, CoInitializeEx, CoUninitialize,
};
use windows::core::{IUnknown, Interface};

use super::{ComMediaBuffer, transform};
use crate::{
    Error, MediaBuffer, OutputDataBuffer, Result,
    config::{ChannelMatrix, HalfFilterLength, ResamplerConfig},
};

/// Keeps COM initialized on the thread that created it.
///
/// Every successful `CoInitializeEx` is balanced by one `CoUninitialize` when
/// the guard is dropped. A guard for a thread that was already initialized in
/// another apartment model owns nothing and uninitializes nothing.
#[must_use = "COM is uninitialized again when the guard is dropped"]
pub struct ComGuard {
    owns_init: bool,
    // COM initialization is per thread.
    _not_send: PhantomData<*const ()>,
}

impl ComGuard {
    /// Returns `true` if dropping this guard calls `CoUninitialize`.
    pub fn owns_init(&self) -> bool {
        self.owns_init
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        if self.owns_init {
            unsafe { CoUninitialize() };
            trace!("Released COM initialization");
        }
    }
}

/// Initializes COM on the calling thread, multithreaded apartment.
///
/// Nested calls are fine: each one adds to the thread's initialization count
/// and its guard takes it away again. A thread already initialized in another
/// apartment model is accepted as is.
pub fn ensure_com_initialized() -> Result<ComGuard> {
    let result = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };
    if result == RPC_E_CHANGED_MODE {
        debug!("COM already initialized in another apartment");
        return Ok(ComGuard {
            owns_init: false,
            _not_send: PhantomData,
        });
    }
    if result.is_err() {
        return Err(Error::Activation {
            stage: "CoInitializeEx",
            code: result.0,
        });
    }
    Ok(ComGuard {
        owns_init: true,
        _not_send: PhantomData,
    })
}

/// An activated `CResamplerMediaObject` with its two capability references.
///
/// All three references share the lifetime of the handle and are released
/// exactly once when it is dropped, media object first.
///
/// COM must be initialized on the calling thread (see
/// [`ensure_com_initialized`]). The handle is bound to that thread.
///
/// # Examples
///
/// ```no_run
/// use dmo::{OutputDataBuffer, Resampler, config::ResamplerConfig};
///
/// # fn main() -> Result<(), dmo::Error> {
/// let _com = dmo::ensure_com_initialized()?;
/// let resampler = Resampler::with_config(&ResamplerConfig::default())?;
/// // Media types are negotiated by the caller through `media_object()`.
/// let mut output = OutputDataBuffer::new(4096)?;
/// resampler.process_output(&mut output)?;
/// # Ok(())
/// # }
/// ```
pub struct Resampler {
    media_object: IMediaObject,
    /// The activated object itself, held for as long as its interfaces.
    _object: IUnknown,
    resampler_props: IWMResamplerProps,
}

impl Resampler {
    /// Activates the resampler and queries its capability interfaces.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Activation`] naming the failing step if the component
    /// is not registered or does not expose `IMediaObject` or
    /// `IWMResamplerProps`.
    pub fn new() -> Result<Self> {
        let object: IUnknown = unsafe {
            CoCreateInstance(&CLSID_CResamplerMediaObject, None, CLSCTX_INPROC_SERVER)
        }
        .map_err(Error::activation("CoCreateInstance"))?;
        let media_object: IMediaObject = object
            .cast()
            .map_err(Error::activation("QueryInterface(IMediaObject)"))?;
        let resampler_props: IWMResamplerProps = object
            .cast()
            .map_err(Error::activation("QueryInterface(IWMResamplerProps)"))?;
        debug!("Activated resampler DMO");
        Ok(Self {
            media_object,
            _object: object,
            resampler_props,
        })
    }

    /// Activates the resampler and applies `config`.
    pub fn with_config(config: &ResamplerConfig) -> Result<Self> {
        let resampler = Self::new()?;
        resampler.apply(config)?;
        Ok(resampler)
    }

    /// Applies every setting of `config`.
    pub fn apply(&self, config: &ResamplerConfig) -> Result<()> {
        self.set_half_filter_length(config.half_filter_length)?;
        if let Some(matrix) = &config.channel_matrix {
            self.set_user_channel_matrix(matrix)?;
        }
        Ok(())
    }

    /// The generic media-processing capability.
    pub fn media_object(&self) -> &IMediaObject {
        &self.media_object
    }

    /// The resampler-configuration capability.
    pub fn resampler_props(&self) -> &IWMResamplerProps {
        &self.resampler_props
    }

    pub fn set_half_filter_length(&self, quality: HalfFilterLength) -> Result<()> {
        unsafe { self.resampler_props.SetHalfFilterLength(quality.get()) }?;
        debug!(quality = quality.get(), "Set resampler half filter length");
        Ok(())
    }

    pub fn set_user_channel_matrix(&self, matrix: &ChannelMatrix) -> Result<()> {
        // The resampler copies the matrix; the buffer only has to live for the call.
        let mut coefficients = matrix.as_slice().to_vec();
        unsafe {
            self.resampler_props
                .SetUserChannelMtx(coefficients.as_mut_ptr())
        }?;
        debug!(
            inputs = matrix.inputs(),
            outputs = matrix.outputs(),
            "Set resampler channel matrix"
        );
        Ok(())
    }

    /// Hands `input` to input stream 0.
    ///
    /// Ownership moves to the DMO, which releases the buffer once it has
    /// consumed the data.
    pub fn process_input(&self, input: MediaBuffer) -> Result<()> {
        let length = input.len();
        let buffer = ComMediaBuffer::wrap(input);
        unsafe { self.media_object.ProcessInput(0, &buffer, 0, 0, 0) }
            .map_err(|error| Error::Transform(error.code().0))?;
        debug!(length, "ProcessInput done");
        Ok(())
    }

    /// Runs one output pass into `output` and returns the status word.
    ///
    /// On success the buffer length, status flags and timing of `output` are
    /// those reported by the DMO. On failure the buffer is returned to
    /// `output` untouched by this call and the flags are left as they were.
    pub fn process_output(&self, output: &mut OutputDataBuffer) -> Result<u32> {
        let buffer = ComMediaBuffer::wrap(std::mem::take(output.buffer_mut()));
        let mut descriptor = DMO_OUTPUT_DATA_BUFFER {
            pBuffer: ManuallyDrop::new(Some(buffer.clone())),
            dwStatus: 0,
            rtTimestamp: 0,
            rtTimelength: 0,
        };
        let result = transform::process_output(
            &self.media_object,
            std::slice::from_mut(&mut descriptor),
        );
        unsafe {
            ManuallyDrop::drop(&mut descriptor.pBuffer);
            *output.buffer_mut() = ComMediaBuffer::take(&buffer);
        }
        let status = result?;
        output.set_pass_info(
            descriptor.dwStatus.into(),
            descriptor.rtTimestamp,
            descriptor.rtTimelength,
        );
        Ok(status)
    }

    /// Releases all three references. Equivalent to dropping the handle.
    pub fn destroy(self) {
        debug!("Releasing resampler DMO");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_and_configuration() {
        let _com = ensure_com_initialized().unwrap();
        let resampler = Resampler::new().unwrap();
        resampler
            .set_half_filter_length(HalfFilterLength::new(60).unwrap())
            .unwrap();
        resampler
            .set_user_channel_matrix(&ChannelMatrix::identity(2).unwrap())
            .unwrap();
        resampler.destroy();
    }

    #[test]
    fn nested_guards_keep_com_usable() {
        let outer = ensure_com_initialized().unwrap();
        let inner = ensure_com_initialized().unwrap();
        assert_eq!(inner.owns_init(), outer.owns_init());
        drop(inner);

        // The outer guard still holds the thread's initialization.
        Resampler::new().unwrap().destroy();
        drop(outer);
    }
}
