// SPDX-FileCopyrightText: 2025 Contributors to the DMO resampler shim project.
// SPDX-License-Identifier: Apache-2.0

//! Status codes returned across the C boundary.

use dmo::Error;
use tracing::warn;

/// Result code of every fallible exported function. Zero is success.
pub type Status = i32;

pub const DMO_STATUS_OK: Status = 0;
pub const DMO_ERR_UNKNOWN: Status = 1;
/// Null, unknown or already destroyed handle.
pub const DMO_ERR_INVALID_HANDLE: Status = 2;
pub const DMO_ERR_INVALID_ARG: Status = 3;
/// Length, offset or count outside the buffer or the caller's memory.
pub const DMO_ERR_OUT_OF_RANGE: Status = 4;
pub const DMO_ERR_ALLOCATION: Status = 5;
pub const DMO_ERR_ACTIVATION: Status = 6;
/// `ProcessInput`/`ProcessOutput` failed.
pub const DMO_ERR_TRANSFORM: Status = 7;
pub const DMO_ERR_COM: Status = 8;
pub const DMO_ERR_CONFIG: Status = 9;

/// Maps a [`dmo::Error`] to its boundary status code.
pub fn status_of(error: &Error) -> Status {
    match error {
        Error::Activation { .. } => DMO_ERR_ACTIVATION,
        Error::Allocation { .. } => DMO_ERR_ALLOCATION,
        Error::InvalidLength { .. } | Error::OutOfRange { .. } => DMO_ERR_OUT_OF_RANGE,
        Error::Transform(_) => DMO_ERR_TRANSFORM,
        Error::Com(_) => DMO_ERR_COM,
        Error::InvalidArgument(_) => DMO_ERR_INVALID_ARG,
        Error::Config(_) => DMO_ERR_CONFIG,
    }
}

/// Collapses a result into a status code, logging the error.
pub(crate) fn to_status(operation: &'static str, result: dmo::Result<()>) -> Status {
    match result {
        Ok(()) => DMO_STATUS_OK,
        Err(error) => {
            warn!(operation, %error, "Call rejected");
            status_of(&error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_errors_share_a_code() {
        assert_eq!(
            status_of(&Error::InvalidLength {
                length: 5,
                max_length: 4
            }),
            DMO_ERR_OUT_OF_RANGE
        );
        assert_eq!(
            status_of(&Error::OutOfRange {
                offset: 0,
                count: 5,
                limit: 4
            }),
            DMO_ERR_OUT_OF_RANGE
        );
    }

    #[test]
    fn os_failures_stay_distinct() {
        assert_eq!(
            status_of(&Error::Activation {
                stage: "CoCreateInstance",
                code: -1
            }),
            DMO_ERR_ACTIVATION
        );
        assert_eq!(status_of(&Error::Transform(-1)), DMO_ERR_TRANSFORM);
        assert_eq!(status_of(&Error::Allocation { requested: 1 }), DMO_ERR_ALLOCATION);
        assert_eq!(to_status("test", Ok(())), DMO_STATUS_OK);
    }
}
