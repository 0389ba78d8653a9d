// SPDX-FileCopyrightText: 2025 Contributors to the DMO resampler shim project.
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the DMO buffer contract.
//!
//! These exercise the portable buffer types end to end the way a transform
//! caller uses them: fill an input buffer, move it along, read an output
//! buffer back. The resampler tests at the bottom need Windows and the OS
//! resampler component.

use dmo::{Error, MediaBuffer, OutputBufferFlags, OutputDataBuffer};
use tracing::info;

/// Ensures logging is initialized only once across all tests.
static LOG_ONCE: std::sync::Once = std::sync::Once::new();

fn setup_test() {
    // Respects the RUST_LOG environment variable.
    LOG_ONCE.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::builder()
                    .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .with_test_writer()
            .init();
    });
}

/// Capacity 4, write `[1, 2, 3, 4]`, read the same four bytes back.
#[test]
fn write_then_read_back() {
    setup_test();
    let mut buffer = MediaBuffer::new(4).unwrap();
    buffer.write(&[0x01, 0x02, 0x03, 0x04], 0, 4).unwrap();
    assert_eq!(buffer.len(), 4);

    let mut out = [0u8; 4];
    buffer.read(&mut out, 0, 4, 0).unwrap();
    assert_eq!(out, [0x01, 0x02, 0x03, 0x04]);
    buffer.destroy();
}

/// Capacity 4, `set_len(5)` fails and the length stays 0.
#[test]
fn set_length_beyond_capacity_is_rejected() {
    setup_test();
    let mut buffer = MediaBuffer::new(4).unwrap();
    let error = buffer.set_len(5).unwrap_err();
    info!("Rejected: {error}");
    assert!(matches!(error, Error::InvalidLength { .. }));
    assert_eq!(buffer.len(), 0);
}

/// The length invariant holds after every mutating operation, including failed ones.
#[test]
fn length_never_exceeds_capacity() {
    setup_test();
    let mut buffer = MediaBuffer::new(16).unwrap();
    let src: Vec<u8> = (0..32).collect();
    for step in 0..32usize {
        let _ = buffer.write(&src, step % 7, step);
        assert!(buffer.len() <= buffer.max_length());
        let _ = buffer.set_len(step * 3 % 20);
        assert!(buffer.len() <= buffer.max_length());
    }
}

/// Moving a buffer into an output wrapper and back keeps its contents.
#[test]
fn buffer_moves_through_output_wrapper() {
    setup_test();
    let mut input = MediaBuffer::new(8).unwrap();
    input.write(b"samples!", 0, 8).unwrap();

    let mut output = OutputDataBuffer::from_buffer(input);
    output.set_pass_info(OutputBufferFlags::SYNCPOINT, 0, 0);

    let mut first = [0u8; 4];
    let mut rest = [0u8; 4];
    assert_eq!(output.read(&mut first, 0, 4).unwrap(), 4);
    assert_eq!(output.read_from(&mut rest, 0, 10, 4).unwrap(), 4);
    assert_eq!(&first, b"samp");
    assert_eq!(&rest, b"les!");

    let buffer = output.into_buffer();
    assert_eq!(buffer.data(), b"samples!");
}

/// Drains a simulated transform that reports incomplete output twice.
#[test]
fn drain_loop_stops_when_output_is_complete() {
    setup_test();
    let chunks: [&[u8]; 3] = [b"abc", b"def", b"g"];
    let mut output = OutputDataBuffer::new(4).unwrap();
    let mut collected = Vec::new();

    for (index, chunk) in chunks.iter().enumerate() {
        output.reset();
        output.buffer_mut().write(chunk, 0, chunk.len()).unwrap();
        let flags = if index + 1 < chunks.len() {
            OutputBufferFlags::INCOMPLETE
        } else {
            OutputBufferFlags::NONE
        };
        output.set_pass_info(flags, 0, 0);

        let mut scratch = [0u8; 4];
        let scratch_len = scratch.len();
        let read = output.read(&mut scratch, 0, scratch_len).unwrap();
        collected.extend_from_slice(&scratch[..read]);
        if !output.has_more_data() {
            break;
        }
    }
    assert_eq!(collected, b"abcdefg");
}

#[cfg(windows)]
mod resampler {
    use dmo::{OutputDataBuffer, Resampler, config::ResamplerConfig};

    #[test]
    fn output_pass_without_media_types_reports_failure() {
        super::setup_test();
        let _com = dmo::ensure_com_initialized().unwrap();
        let resampler = Resampler::with_config(&ResamplerConfig::default()).unwrap();
        let mut output = OutputDataBuffer::new(64).unwrap();
        output.buffer_mut().write(&[1, 2, 3], 0, 3).unwrap();

        // No media types were negotiated, so the pass must fail and the
        // buffer must come back intact.
        let error = resampler.process_output(&mut output).unwrap_err();
        assert!(matches!(error, dmo::Error::Transform(_)));
        assert_eq!(output.buffer().max_length(), 64);
        assert_eq!(output.buffer().data(), &[1, 2, 3]);
    }
}
