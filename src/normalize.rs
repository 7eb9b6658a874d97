//! Conversion of raw records into the floating-point form consumers expect.
//!
//! Nothing in here knows about containers; any byte sequences will do.

use ndarray::{Array1, Array2, ShapeError};

/// Largest possible pixel intensity.
pub const GREYSCALE_MAX: f32 = 255.0;

/// Rescale every pixel of every record from `[0, 255]` into `[0.0, 1.0]`, keeping record and
/// pixel order. Empty records come back empty.
pub fn normalize_samples<S: AsRef<[u8]>>(raw_samples: &[S]) -> Vec<Vec<f32>> {
    raw_samples
        .iter()
        .map(|sample| {
            sample
                .as_ref()
                .iter()
                .map(|&value| value as f32 / GREYSCALE_MAX)
                .collect()
        })
        .collect()
}

/// Cast each label byte to its numeric value. No rescaling and no one-hot encoding; that is up to
/// whoever consumes the labels.
pub fn normalize_labels(raw_labels: &[u8]) -> Vec<f32> {
    raw_labels.iter().map(|&label| label as f32).collect()
}

/// Stack equally sized samples into a matrix with one row per sample.
pub fn stack_samples(samples: &[Vec<f32>]) -> Result<Array2<f32>, ShapeError> {
    let width = samples.first().map_or(0, Vec::len);
    let flat: Vec<f32> = samples.iter().flatten().copied().collect();
    Array2::from_shape_vec((samples.len(), width), flat)
}

pub fn label_vector(labels: &[f32]) -> Array1<f32> {
    Array1::from(labels.to_vec())
}
