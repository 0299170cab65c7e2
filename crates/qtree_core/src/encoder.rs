//! Pixel encoding for QTREE
//!
//! Gantree: L1_Circuit → ImageEncoder
//!
//! Each pixel `x_i ∈ [0, 1]` drives one `Y^(x_i)` gate on qubit `i`, taking
//! |0⟩ to cos(πx/2)|0⟩ + sin(πx/2)|1⟩. The encoder gates are declared first,
//! so pixel `i` always lives in slot `i`.

use crate::builder::CircuitBuilder;
use crate::constants::tree::PIXEL_SYMBOL_PREFIX;
use crate::error::{QtreeError, QtreeResult};
use crate::types::ParameterBinding;
use serde::{Deserialize, Serialize};

/// Maps pixel intensities to Y-power rotations
/// Gantree: ImageEncoder // 이미지 인코더
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEncoder {
    num_pixels: usize,
}

impl ImageEncoder {
    /// Encoder for images of `num_pixels` pixels
    pub fn new(num_pixels: usize) -> Self {
        Self { num_pixels }
    }

    /// Number of pixels (and encoder slots)
    pub fn num_pixels(&self) -> usize {
        self.num_pixels
    }

    /// Symbol name of pixel `index`
    pub fn pixel_symbol(index: usize) -> String {
        format!("{}_{}", PIXEL_SYMBOL_PREFIX, index)
    }

    /// Check length and range of a pixel vector
    /// Gantree: validate(&self, pixels) -> Result // 픽셀 검증
    pub fn validate(&self, pixels: &[f64]) -> QtreeResult<()> {
        if pixels.len() != self.num_pixels {
            return Err(QtreeError::PixelLengthMismatch {
                expected: self.num_pixels,
                actual: pixels.len(),
            });
        }
        match pixels
            .iter()
            .enumerate()
            .find(|(_, v)| !(0.0..=1.0).contains(*v))
        {
            Some((index, &value)) => Err(QtreeError::InvalidPixelValue { index, value }),
            None => Ok(()),
        }
    }

    /// Append one `Y^(pixel_i)` gate per qubit
    /// Gantree: encode(&self, builder) -> CircuitBuilder // 인코딩 게이트
    pub fn encode(&self, builder: CircuitBuilder) -> CircuitBuilder {
        (0..self.num_pixels).fold(builder, |b, i| b.ypow_sym(i, Self::pixel_symbol(i)))
    }

    /// Binding holding the pixel slots of one image
    /// Gantree: bind(&self, pixels) -> Result<ParameterBinding> // 픽셀 바인딩
    pub fn bind(&self, pixels: &[f64]) -> QtreeResult<ParameterBinding> {
        self.validate(pixels)?;
        Ok(ParameterBinding::new(pixels.to_vec()))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::Gate;
    use crate::types::Param;

    #[test]
    fn test_encode_slots() {
        let encoder = ImageEncoder::new(4);
        let circuit = encoder.encode(CircuitBuilder::new(4)).build().unwrap();

        assert_eq!(circuit.gate_count(), 4);
        for (i, gate) in circuit.gates().iter().enumerate() {
            assert_eq!(*gate, Gate::YPow(i, Param::Symbol(i)));
        }
        assert_eq!(circuit.slot_of("pixel_3"), Some(3));
    }

    #[test]
    fn test_validate() {
        let encoder = ImageEncoder::new(2);

        assert!(encoder.validate(&[0.0, 1.0]).is_ok());
        assert!(matches!(
            encoder.validate(&[0.0]),
            Err(QtreeError::PixelLengthMismatch { expected: 2, actual: 1 })
        ));
        assert!(matches!(
            encoder.validate(&[0.5, 1.5]),
            Err(QtreeError::InvalidPixelValue { index: 1, .. })
        ));
        assert!(encoder.validate(&[f64::NAN, 0.0]).is_err());
    }

    #[test]
    fn test_bind() {
        let binding = ImageEncoder::new(2).bind(&[0.25, 0.75]).unwrap();
        assert_eq!(binding.as_slice(), &[0.25, 0.75]);
    }
}
