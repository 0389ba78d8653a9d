// SPDX-FileCopyrightText: 2025 Contributors to the DMO resampler shim project.
// SPDX-License-Identifier: Apache-2.0

//! Exported resampler and transform functions (Windows only).

use std::ffi::c_void;

use dmo::{
    Resampler,
    com::transform,
    config::{ChannelMatrix, HalfFilterLength},
};
use tracing::{debug, warn};
use windows::Win32::Media::DxMediaObjects::{DMO_OUTPUT_DATA_BUFFER, IMediaObject};
use windows::core::Interface;

use crate::registry::HandleRegistry;
use crate::status::{
    DMO_ERR_INVALID_ARG, DMO_ERR_INVALID_HANDLE, DMO_STATUS_OK, Status, status_of, to_status,
};

static RESAMPLERS: HandleRegistry = HandleRegistry::new();

/// What a resampler handle points at. Destroy empties the cell but never
/// frees it, so the address stays unique (see `registry`).
type ResamplerCell = Option<Resampler>;

fn with_resampler<R>(handle: *mut c_void, f: impl FnOnce(&Resampler) -> R) -> Option<R> {
    let result = RESAMPLERS.access(handle, || {
        unsafe { &*handle.cast::<ResamplerCell>() }.as_ref().map(f)
    });
    match result {
        Ok(result) => result,
        Err(reason) => {
            warn!(?handle, ?reason, "Invalid resampler handle");
            None
        }
    }
}

/// Activates the OS resampler. Returns null if activation fails.
///
/// COM must already be initialized on the calling thread.
#[unsafe(no_mangle)]
pub extern "C" fn ResamplerCreate() -> *mut c_void {
    match Resampler::new() {
        Ok(resampler) => {
            let cell: Box<ResamplerCell> = Box::new(Some(resampler));
            let handle = Box::into_raw(cell).cast::<c_void>();
            RESAMPLERS.insert(handle);
            debug!(?handle, "Created resampler");
            handle
        }
        Err(error) => {
            warn!(%error, status = status_of(&error), "ResamplerCreate failed");
            std::ptr::null_mut()
        }
    }
}

/// Releases the resampler and both capability references, and retires the
/// handle. A second destroy of the same handle is rejected.
///
/// # Safety
///
/// `handle` must be null or a value returned by [`ResamplerCreate`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ResamplerDestroy(handle: *mut c_void) -> Status {
    let retired = RESAMPLERS.retire(handle, |handle| {
        if let Some(resampler) = unsafe { &mut *handle.cast::<ResamplerCell>() }.take() {
            resampler.destroy();
        }
    });
    match retired {
        Ok(()) => DMO_STATUS_OK,
        Err(reason) => {
            warn!(?handle, ?reason, "ResamplerDestroy on a handle that is not live");
            DMO_ERR_INVALID_HANDLE
        }
    }
}

/// Borrowed `IMediaObject*` of the resampler, or null for an invalid handle.
///
/// No reference is added; the pointer is valid until [`ResamplerDestroy`].
///
/// # Safety
///
/// `handle` must be null or a value returned by [`ResamplerCreate`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Resampler_mediaObject(handle: *mut c_void) -> *mut c_void {
    with_resampler(handle, |resampler| resampler.media_object().as_raw())
        .unwrap_or(std::ptr::null_mut())
}

/// Borrowed `IWMResamplerProps*` of the resampler, or null for an invalid handle.
///
/// # Safety
///
/// `handle` must be null or a value returned by [`ResamplerCreate`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Resampler_resamplerProps(handle: *mut c_void) -> *mut c_void {
    with_resampler(handle, |resampler| resampler.resampler_props().as_raw())
        .unwrap_or(std::ptr::null_mut())
}

/// Sets the filter quality, `1..=60`.
///
/// # Safety
///
/// `handle` must be null or a value returned by [`ResamplerCreate`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Resampler_setHalfFilterLength(handle: *mut c_void, quality: i32) -> Status {
    with_resampler(handle, |resampler| {
        let result = HalfFilterLength::new(quality)
            .and_then(|quality| resampler.set_half_filter_length(quality));
        to_status("Resampler_setHalfFilterLength", result)
    })
    .unwrap_or(DMO_ERR_INVALID_HANDLE)
}

/// Sets the channel conversion matrix, `inputs * outputs` output-major gains.
///
/// # Safety
///
/// `handle` must be null or a value returned by [`ResamplerCreate`].
/// `coefficients` must be valid for reads of `inputs * outputs` floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Resampler_setUserChannelMtx(
    handle: *mut c_void,
    coefficients: *const f32,
    inputs: u32,
    outputs: u32,
) -> Status {
    if coefficients.is_null() {
        return DMO_ERR_INVALID_ARG;
    }
    with_resampler(handle, |resampler| {
        // Validate the shape before touching the caller's memory.
        let (inputs, outputs) = (inputs as usize, outputs as usize);
        let result = ChannelMatrix::coefficient_count(inputs, outputs)
            .and_then(|len| {
                let coefficients = unsafe { std::slice::from_raw_parts(coefficients, len) };
                ChannelMatrix::from_coefficients(inputs, outputs, coefficients.to_vec())
            })
            .and_then(|matrix| resampler.set_user_channel_matrix(&matrix));
        to_status("Resampler_setUserChannelMtx", result)
    })
    .unwrap_or(DMO_ERR_INVALID_HANDLE)
}

/// Runs one `ProcessOutput` pass for a single output buffer.
///
/// The DMO fills in the descriptor's status flags and timing. A failed pass
/// is reported as `DMO_ERR_TRANSFORM` rather than silently ignored.
///
/// # Safety
///
/// `media_object` must be a live `IMediaObject*` and `output` must point to
/// one initialized `DMO_OUTPUT_DATA_BUFFER`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn MediaObjectProcessOutput(
    media_object: *mut c_void,
    output: *mut DMO_OUTPUT_DATA_BUFFER,
) -> Status {
    let Some(media_object) = (unsafe { IMediaObject::from_raw_borrowed(&media_object) }) else {
        return DMO_ERR_INVALID_ARG;
    };
    let Some(output) = (unsafe { output.as_mut() }) else {
        return DMO_ERR_INVALID_ARG;
    };
    let result = transform::process_output(media_object, std::slice::from_mut(output));
    to_status("MediaObjectProcessOutput", result.map(|_| ()))
}
