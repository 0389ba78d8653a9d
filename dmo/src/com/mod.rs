// SPDX-FileCopyrightText: 2025 Contributors to the DMO resampler shim project.
// SPDX-License-Identifier: Apache-2.0

//! Windows COM side: the `IMediaBuffer` adapter, the resampler handle and the
//! transform invocation.

mod media_buffer;
mod resampler;
pub mod transform;

pub use media_buffer::ComMediaBuffer;
pub use resampler::{ComGuard, Resampler, ensure_com_initialized};
