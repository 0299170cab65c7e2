//! Labelled image data
//!
//! Gantree: L5_Train → Dataset
//!
//! Images arrive already resized and normalized to `[0, 1]`; a dataset only
//! checks that every sample fits the tree it will be fed to.

use qtree_core::constants::tree::NUM_CLASSES;
use qtree_core::{ImageEncoder, Label, QtreeError, QtreeResult, TreeTopology};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One labelled image
/// Gantree: Sample // (pixels, label)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Pixel intensities in [0, 1]
    pub pixels: Vec<f64>,

    /// Class label (0 or 1)
    pub label: Label,
}

impl Sample {
    /// Create a sample
    pub fn new(pixels: Vec<f64>, label: Label) -> Self {
        Self { pixels, label }
    }
}

/// Source of labelled images
/// Gantree: DataSource // 데이터 공급자
pub trait DataSource {
    /// Pixels per image
    fn num_pixels(&self) -> usize;

    /// All samples, in order
    fn samples(&self) -> &[Sample];

    /// Number of samples
    fn len(&self) -> usize {
        self.samples().len()
    }

    /// Check if there are no samples
    fn is_empty(&self) -> bool {
        self.samples().is_empty()
    }
}

/// Validated in-memory dataset
/// Gantree: Dataset // 메모리 데이터셋
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    num_pixels: usize,
    samples: Vec<Sample>,
}

impl Dataset {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Empty dataset of `num_pixels`-pixel images
    pub fn new(num_pixels: usize) -> QtreeResult<Self> {
        TreeTopology::new(num_pixels)?;
        Ok(Self {
            num_pixels,
            samples: Vec::new(),
        })
    }

    /// Dataset from samples, validating each one
    pub fn from_samples(num_pixels: usize, samples: Vec<Sample>) -> QtreeResult<Self> {
        let mut dataset = Self::new(num_pixels)?;
        for sample in samples {
            dataset.push(sample)?;
        }
        Ok(dataset)
    }

    /// Synthetic bars on a `side x side` grid: label 0 is a horizontal bar,
    /// label 1 a vertical bar, labels alternating
    /// Gantree: stripes(side, count, rng) -> Result<Dataset> // 합성 데이터
    pub fn stripes<R: Rng + ?Sized>(side: usize, count: usize, rng: &mut R) -> QtreeResult<Self> {
        let mut dataset = Self::new(side * side)?;
        for i in 0..count {
            let label = i % NUM_CLASSES;
            let line = rng.gen_range(0..side);
            let pixels = (0..side * side)
                .map(|p| {
                    let (row, col) = (p / side, p % side);
                    let on = if label == 0 { row == line } else { col == line };
                    if on {
                        rng.gen_range(0.8..=1.0)
                    } else {
                        rng.gen_range(0.0..0.2)
                    }
                })
                .collect();
            dataset.push(Sample::new(pixels, label))?;
        }
        Ok(dataset)
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Append a sample after checking pixels and label
    pub fn push(&mut self, sample: Sample) -> QtreeResult<()> {
        ImageEncoder::new(self.num_pixels).validate(&sample.pixels)?;
        if sample.label >= NUM_CLASSES {
            return Err(QtreeError::InvalidLabel(sample.label));
        }
        self.samples.push(sample);
        Ok(())
    }

    /// Shuffle sample order
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.samples.shuffle(rng);
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Consecutive batches of `size`; the last one may be shorter
    pub fn batches(&self, size: usize) -> std::slice::Chunks<'_, Sample> {
        self.samples.chunks(size.max(1))
    }

    /// Split into `[0, at)` and `[at, len)`
    pub fn split(&self, at: usize) -> (Dataset, Dataset) {
        let at = at.min(self.samples.len());
        let (head, tail) = self.samples.split_at(at);
        (
            Dataset {
                num_pixels: self.num_pixels,
                samples: head.to_vec(),
            },
            Dataset {
                num_pixels: self.num_pixels,
                samples: tail.to_vec(),
            },
        )
    }

    /// Labels in sample order
    pub fn labels(&self) -> Vec<Label> {
        self.samples.iter().map(|s| s.label).collect()
    }
}

impl DataSource for Dataset {
    fn num_pixels(&self) -> usize {
        self.num_pixels
    }

    fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

// ============================================================================
// Tests
// ============================================================================
