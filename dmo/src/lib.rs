// SPDX-FileCopyrightText: 2025 Contributors to the DMO resampler shim project.
// SPDX-License-Identifier: Apache-2.0

//! # DMO - audio resampler interop
//!
//! Safe Rust wrapper around the Windows audio resampler DirectX Media Object
//! (`CResamplerMediaObject`) and the `IMediaBuffer` protocol it uses to move
//! sample bytes in and out.
//!
//! ## Overview
//!
//! The resampling itself belongs to the operating system. This crate owns the
//! parts around it:
//!
//! - **MediaBuffer**: a fixed-capacity byte buffer with bounds-checked
//!   reads and writes ([`MediaBuffer`]), portable to every platform
//! - **OutputDataBuffer**: a buffer plus the flags and timing a DMO reports
//!   for one output pass ([`OutputDataBuffer`])
//! - **ResamplerConfig**: validated filter quality and channel matrix,
//!   loadable from JSON ([`config`])
//! - **Resampler** (Windows): the activated DMO and its `IMediaObject` and
//!   `IWMResamplerProps` interfaces
//! - **ComMediaBuffer** (Windows): the `IMediaBuffer` COM object wrapping a
//!   [`MediaBuffer`]
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  write   ┌─────────────┐ process_input  ┌───────────┐
//! │ caller bytes │ ───────► │ MediaBuffer │ ─────────────► │           │
//! └──────────────┘          └─────────────┘                │ Resampler │
//! ┌──────────────┐  read    ┌──────────────────┐ process_  │   (DMO)   │
//! │ caller bytes │ ◄─────── │ OutputDataBuffer │ ◄──────── │           │
//! └──────────────┘          └──────────────────┘  output   └───────────┘
//! ```
//!
//! ## Ownership
//!
//! Every buffer and resampler handle has exactly one owner. Destroying one
//! consumes it, so use after destroy does not compile. When a buffer crosses
//! into COM it is moved into a [`ComMediaBuffer`] and lives as long as the
//! last COM reference.
//!
//! ## Thread Safety
//!
//! - [`MediaBuffer`] and [`OutputDataBuffer`] are `Send` but used by one
//!   thread at a time
//! - COM objects stay on the thread that created them

mod buffer;
mod error;
mod output;

pub mod config;

#[cfg(windows)]
pub mod com;

pub use buffer::MediaBuffer;
#[cfg(windows)]
pub use com::{ComGuard, ComMediaBuffer, Resampler, ensure_com_initialized};
pub use error::{Error, Result};
pub use output::{OutputBufferFlags, OutputDataBuffer};
