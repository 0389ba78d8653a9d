// SPDX-FileCopyrightText: 2025 Contributors to the DMO resampler shim project.
// SPDX-License-Identifier: Apache-2.0

//! Flat C ABI for the DMO resampler shim
//!
//! This crate builds `AudioSharpDMO.dll` (`libaudiosharpdmo.so` elsewhere),
//! the native library a managed runtime loads through P/Invoke to drive the
//! Windows audio resampler DMO.
//!
//! ## Exported Functions
//! - **Media buffers**: `MediaBufferCreate`, `MediaBufferDestroy`,
//!   `MediaBuffer_getMaxLength`, `MediaBuffer_getLength`,
//!   `MediaBuffer_setLength`, `MediaBufferRead`, `MediaBufferWrite`
//! - **Resampler** (Windows): `ResamplerCreate`, `ResamplerDestroy`,
//!   `Resampler_mediaObject`, `Resampler_resamplerProps`,
//!   `Resampler_setHalfFilterLength`, `Resampler_setUserChannelMtx`
//! - **Transform** (Windows): `MediaObjectProcessOutput`
//! - **Logging** (feature `logging`): `DmoInitLogging`
//! - **Legacy names**: the `DMOMediaBuffer*` and `DMOWMResam(p)ler*`
//!   spellings declared by the existing managed wrapper, forwarding to the
//!   functions above
//!
//! ## Boundary Contract
//! - Fallible functions return a [`Status`]; zero is success
//! - Constructors return null on failure
//! - Handles are tracked, so a destroyed or unknown handle yields
//!   `DMO_ERR_INVALID_HANDLE` instead of undefined behaviour
//! - A handle address is never reused, even after destroy
//! - No panic or raw HRESULT crosses the boundary

// Exported names follow the managed caller's P/Invoke declarations.
#![allow(non_snake_case)]

/// Media buffer create/destroy/accessors
mod buffer;

/// Entry points under the managed wrapper's original names
mod legacy;

/// Live handle tracking
mod registry;

/// Resampler lifetime, configuration and transform pass
#[cfg(windows)]
mod resampler;

/// Status codes and error mapping
pub mod status;

pub use buffer::*;
pub use legacy::*;
#[cfg(windows)]
pub use resampler::*;
pub use status::*;

/// Installs a `tracing` subscriber writing to stderr.
///
/// Verbosity follows `RUST_LOG` and defaults to INFO. Calling it more than
/// once is harmless.
#[cfg(feature = "logging")]
#[unsafe(no_mangle)]
pub extern "C" fn DmoInitLogging() {
    use tracing_subscriber::util::SubscriberInitExt;
    let _ = tracing_subscriber::fmt()
        .compact()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .finish()
        .try_init();
}
