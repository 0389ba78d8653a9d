// SPDX-FileCopyrightText: 2025 Contributors to the DMO resampler shim project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for DMO operations.
//!
//! This module defines the error type returned by buffer, configuration and
//! resampler calls, mapping failed HRESULTs to idiomatic Rust error variants.

/// Convenience result type using [`Error`] as the error variant.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur when using the DMO wrapper.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The resampler component could not be instantiated, or one of the
    /// required interfaces is not supported by it.
    #[error("Activation failed at {stage}: HRESULT {code:#010x}")]
    Activation {
        /// Which activation step failed (e.g. `"CoCreateInstance"`).
        stage: &'static str,
        /// The raw HRESULT reported by the operating system.
        code: i32,
    },

    /// The backing storage of a buffer could not be allocated.
    #[error("Failed to allocate {requested} bytes")]
    Allocation {
        /// Number of bytes that were requested.
        requested: usize,
    },

    /// Attempted to set a buffer length greater than its capacity.
    #[error("Invalid length {length}, buffer holds at most {max_length} bytes")]
    InvalidLength { length: usize, max_length: usize },

    /// A read or write window does not fit inside the buffer or the caller's slice.
    #[error("Out of range: {count} bytes at offset {offset} exceed limit {limit}")]
    OutOfRange {
        offset: usize,
        count: usize,
        limit: usize,
    },

    /// A `ProcessInput`/`ProcessOutput` pass failed.
    #[error("Transform failed: HRESULT {0:#010x}")]
    Transform(i32),

    /// Any other failing COM call (e.g. resampler property setters).
    #[error("COM call failed: HRESULT {0:#010x}")]
    Com(i32),

    /// A parameter was rejected before reaching the operating system.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failed to parse a resampler configuration document.
    #[error("Configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// Converts a raw HRESULT into a [`Result`].
    ///
    /// Success codes (including `S_FALSE`) map to `Ok(())`, failure codes to
    /// [`Error::Com`].
    ///
    /// # Examples
    ///
    /// ```
    /// use dmo::Error;
    ///
    /// assert!(Error::from_hresult(0).is_ok());
    /// assert!(Error::from_hresult(1).is_ok());
    /// assert!(matches!(Error::from_hresult(0x8007_0057_u32 as i32), Err(Error::Com(_))));
    /// ```
    pub fn from_hresult(code: i32) -> Result<()> {
        if code < 0 {
            Err(Error::Com(code))
        } else {
            Ok(())
        }
    }

    /// Returns the HRESULT carried by this error, if it came from the operating system.
    pub fn hresult(&self) -> Option<i32> {
        match self {
            Error::Activation { code, .. } => Some(*code),
            Error::Transform(code) | Error::Com(code) => Some(*code),
            _ => None,
        }
    }

    #[cfg(windows)]
    pub(crate) fn activation(stage: &'static str) -> impl FnOnce(windows::core::Error) -> Error {
        move |error| Error::Activation {
            stage,
            code: error.code().0,
        }
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for Error {
    fn from(error: windows::core::Error) -> Self {
        Error::Com(error.code().0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_hresults_become_errors() {
        let e_fail = 0x8000_4005_u32 as i32;
        let error = Error::from_hresult(e_fail).unwrap_err();
        assert_eq!(error.hresult(), Some(e_fail));
        assert_eq!(error.to_string(), "COM call failed: HRESULT 0x80004005");
    }

    #[test]
    fn bounds_errors_carry_no_hresult() {
        let error = Error::OutOfRange {
            offset: 2,
            count: 4,
            limit: 4,
        };
        assert_eq!(error.hresult(), None);
        assert_eq!(
            error.to_string(),
            "Out of range: 4 bytes at offset 2 exceed limit 4"
        );
    }
}
