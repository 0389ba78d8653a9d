// SPDX-FileCopyrightText: 2025 Contributors to the DMO resampler shim project.
// SPDX-License-Identifier: Apache-2.0

//! Single `ProcessOutput` pass over raw DMO output descriptors.

use tracing::trace;
use windows::Win32::Media::DxMediaObjects::{DMO_OUTPUT_DATA_BUFFER, IMediaObject};

use crate::{Error, Result};

/// Runs one `ProcessOutput` pass with no flags.
///
/// The descriptors are updated in place by the DMO (buffer length, status
/// flags, timestamps). Returns the status word reported by the call.
///
/// # Errors
///
/// Returns [`Error::Transform`] with the HRESULT if the pass fails, so a
/// failed pass cannot be mistaken for one that produced stale output.
pub fn process_output(
    media_object: &IMediaObject,
    buffers: &mut [DMO_OUTPUT_DATA_BUFFER],
) -> Result<u32> {
    let mut status = 0u32;
    unsafe { media_object.ProcessOutput(0, buffers, &mut status) }
        .map_err(|error| Error::Transform(error.code().0))?;
    trace!(status, buffers = buffers.len(), "ProcessOutput done");
    Ok(status)
}
