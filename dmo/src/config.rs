// SPDX-FileCopyrightText: 2025 Contributors to the DMO resampler shim project.
// SPDX-License-Identifier: Apache-2.0

//! Resampler configuration.
//!
//! Settings applied to the resampler through `IWMResamplerProps`: the filter
//! quality and an optional user channel-conversion matrix. Values are
//! validated when constructed or deserialized, so an invalid setting never
//! reaches the operating system.
//!
//! A configuration can be loaded from JSON:
//!
//! ```
//! use dmo::config::ResamplerConfig;
//!
//! # fn main() -> Result<(), dmo::Error> {
//! let config = ResamplerConfig::from_json(
//!     r#"{
//!         "half_filter_length": 60,
//!         "channel_matrix": { "inputs": 1, "outputs": 2, "coefficients": [1.0, 1.0] }
//!     }"#,
//! )?;
//! assert_eq!(config.half_filter_length.get(), 60);
//! # Ok(())
//! # }
//! ```

use serde::Deserialize;

use crate::{Error, Result};

/// Resampler quality, the half length of the interpolation filter.
///
/// Valid values are `1..=60`. Higher values trade CPU for quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "i32")]
pub struct HalfFilterLength(i32);

impl HalfFilterLength {
    pub const MIN: i32 = 1;
    pub const MAX: i32 = 60;

    /// Validates `quality` against `1..=60`.
    pub fn new(quality: i32) -> Result<Self> {
        if !(Self::MIN..=Self::MAX).contains(&quality) {
            return Err(Error::InvalidArgument(format!(
                "half filter length {quality} outside {}..={}",
                Self::MIN,
                Self::MAX
            )));
        }
        Ok(Self(quality))
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl Default for HalfFilterLength {
    fn default() -> Self {
        Self(30)
    }
}

impl TryFrom<i32> for HalfFilterLength {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        Self::new(value)
    }
}

/// Channel-conversion matrix for `IWMResamplerProps::SetUserChannelMtx`.
///
/// Coefficients are stored output-major: the gains applied to every input
/// channel for output channel 0, then output channel 1, and so on.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawChannelMatrix")]
pub struct ChannelMatrix {
    inputs: usize,
    outputs: usize,
    coefficients: Vec<f32>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawChannelMatrix {
    inputs: usize,
    outputs: usize,
    coefficients: Vec<f32>,
}

impl TryFrom<RawChannelMatrix> for ChannelMatrix {
    type Error = Error;

    fn try_from(raw: RawChannelMatrix) -> Result<Self> {
        Self::from_coefficients(raw.inputs, raw.outputs, raw.coefficients)
    }
}

impl ChannelMatrix {
    /// Creates an all-zero matrix mapping `inputs` channels to `outputs` channels.
    pub fn new(inputs: usize, outputs: usize) -> Result<Self> {
        let len = matrix_len(inputs, outputs)?;
        Ok(Self {
            inputs,
            outputs,
            coefficients: vec![0.0; len],
        })
    }

    /// Creates a pass-through matrix for `channels` channels.
    pub fn identity(channels: usize) -> Result<Self> {
        let mut matrix = Self::new(channels, channels)?;
        for channel in 0..channels {
            matrix.set(channel, channel, 1.0)?;
        }
        Ok(matrix)
    }

    /// Builds a matrix from output-major coefficients.
    pub fn from_coefficients(inputs: usize, outputs: usize, coefficients: Vec<f32>) -> Result<Self> {
        let len = matrix_len(inputs, outputs)?;
        if coefficients.len() != len {
            return Err(Error::InvalidArgument(format!(
                "channel matrix {inputs}x{outputs} needs {len} coefficients, got {}",
                coefficients.len()
            )));
        }
        Ok(Self {
            inputs,
            outputs,
            coefficients,
        })
    }

    /// Number of coefficients an `inputs` x `outputs` matrix holds.
    ///
    /// Fails for zero channel counts or a product that overflows.
    pub fn coefficient_count(inputs: usize, outputs: usize) -> Result<usize> {
        matrix_len(inputs, outputs)
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    /// Sets the gain of `input` in `output`.
    pub fn set(&mut self, input: usize, output: usize, gain: f32) -> Result<()> {
        let index = self.index(input, output)?;
        self.coefficients[index] = gain;
        Ok(())
    }

    /// Returns the gain of `input` in `output`.
    pub fn get(&self, input: usize, output: usize) -> Result<f32> {
        Ok(self.coefficients[self.index(input, output)?])
    }

    /// The flat coefficient array in the layout the resampler expects.
    pub fn as_slice(&self) -> &[f32] {
        &self.coefficients
    }

    fn index(&self, input: usize, output: usize) -> Result<usize> {
        if input >= self.inputs || output >= self.outputs {
            return Err(Error::InvalidArgument(format!(
                "channel pair ({input}, {output}) outside {}x{} matrix",
                self.inputs, self.outputs
            )));
        }
        Ok(output * self.inputs + input)
    }
}

fn matrix_len(inputs: usize, outputs: usize) -> Result<usize> {
    if inputs == 0 || outputs == 0 {
        return Err(Error::InvalidArgument(
            "channel matrix needs at least one input and one output".to_string(),
        ));
    }
    inputs
        .checked_mul(outputs)
        .ok_or_else(|| Error::InvalidArgument("channel matrix too large".to_string()))
}

/// Settings applied to a freshly activated resampler.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResamplerConfig {
    /// Filter quality, see [`HalfFilterLength`].
    pub half_filter_length: HalfFilterLength,
    /// Optional channel-conversion matrix.
    pub channel_matrix: Option<ChannelMatrix>,
}

impl ResamplerConfig {
    /// Parses and validates a JSON configuration document.
    ///
    /// Missing fields take their defaults; unknown fields are rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_filter_length_range() {
        assert!(HalfFilterLength::new(0).is_err());
        assert!(HalfFilterLength::new(61).is_err());
        assert_eq!(HalfFilterLength::new(1).unwrap().get(), 1);
        assert_eq!(HalfFilterLength::new(60).unwrap().get(), 60);
        assert_eq!(HalfFilterLength::default().get(), 30);
    }

    #[test]
    fn identity_matrix_is_output_major() {
        let mut matrix = ChannelMatrix::identity(2).unwrap();
        assert_eq!(matrix.as_slice(), &[1.0, 0.0, 0.0, 1.0]);

        matrix.set(1, 0, 0.5).unwrap();
        assert_eq!(matrix.as_slice(), &[1.0, 0.5, 0.0, 1.0]);
        assert_eq!(matrix.get(1, 0).unwrap(), 0.5);
    }

    #[test]
    fn matrix_rejects_bad_shapes_and_indices() {
        assert!(ChannelMatrix::new(0, 2).is_err());
        assert!(ChannelMatrix::coefficient_count(usize::MAX, 2).is_err());
        assert_eq!(ChannelMatrix::coefficient_count(2, 6).unwrap(), 12);
        assert!(ChannelMatrix::from_coefficients(2, 2, vec![1.0; 3]).is_err());

        let mut matrix = ChannelMatrix::new(2, 1).unwrap();
        assert!(matrix.set(2, 0, 1.0).is_err());
        assert!(matrix.get(0, 1).is_err());
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = ResamplerConfig::from_json("{}").unwrap();
        assert_eq!(config, ResamplerConfig::default());
    }

    #[test]
    fn json_is_validated() {
        assert!(matches!(
            ResamplerConfig::from_json(r#"{ "half_filter_length": 90 }"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ResamplerConfig::from_json(
                r#"{ "channel_matrix": { "inputs": 2, "outputs": 2, "coefficients": [1.0] } }"#
            ),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ResamplerConfig::from_json(r#"{ "quality": 10 }"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn downmix_matrix_from_json() {
        let config = ResamplerConfig::from_json(
            r#"{ "channel_matrix": { "inputs": 2, "outputs": 1, "coefficients": [0.5, 0.5] } }"#,
        )
        .unwrap();
        let matrix = config.channel_matrix.unwrap();
        assert_eq!(matrix.inputs(), 2);
        assert_eq!(matrix.outputs(), 1);
        assert_eq!(matrix.get(1, 0).unwrap(), 0.5);
        assert_eq!(config.half_filter_length, HalfFilterLength::default());
    }
}
