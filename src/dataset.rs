//! Paired image/label splits
//!
//! A split is one sample container plus one label container whose records pair up by position.

use itertools::Itertools;
use ndarray::{Array1, Array2, ShapeError};
use tracing::{info, warn};

use crate::config::DatasetPaths;
use crate::error::{DatasetError, Result};
use crate::mnist::{self, ReaderOptions};
use crate::normalize::{label_vector, normalize_labels, normalize_samples, stack_samples};

/// Raw records of one split. `images()[i]` is labelled by `labels()[i]`; the fields stay private
/// so the two lists always have the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledSet {
    images: Vec<Vec<u8>>,
    labels: Vec<u8>,
    rows: usize,
    cols: usize,
}

impl LabeledSet {
    /// Pair already-read records, refusing mismatched counts.
    pub fn new(images: Vec<Vec<u8>>, labels: Vec<u8>, rows: usize, cols: usize) -> Result<Self> {
        if images.len() != labels.len() {
            return Err(DatasetError::CountMismatch {
                samples: images.len(),
                labels: labels.len(),
            });
        }
        Ok(LabeledSet {
            images,
            labels,
            rows,
            cols,
        })
    }

    /// Read both containers of a split.
    pub fn load(paths: &DatasetPaths, options: &ReaderOptions) -> Result<Self> {
        let (header, images) = mnist::read_sample_records(&paths.images, options)?;
        let (rows, cols) = header.dims.unwrap_or((0, 0));
        let labels = mnist::read_label_container_with(&paths.labels, options)?;

        let set = LabeledSet::new(images, labels, rows as usize, cols as usize)?;
        info!(
            images = %paths.images.display(),
            labels = %paths.labels.display(),
            records = set.len(),
            rows,
            cols,
            "loaded split"
        );
        Ok(set)
    }

    pub fn images(&self) -> &[Vec<u8>] {
        &self.images
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Give up the records as `(images, labels)`.
    pub fn into_parts(self) -> (Vec<Vec<u8>>, Vec<u8>) {
        (self.images, self.labels)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Move records `at..` into a new set, leaving `..at` in place. An `at` past the end leaves
    /// everything here and returns an empty set.
    pub fn split_off(&mut self, at: usize) -> LabeledSet {
        let at = at.min(self.len());
        LabeledSet {
            images: self.images.split_off(at),
            labels: self.labels.split_off(at),
            rows: self.rows,
            cols: self.cols,
        }
    }

    pub fn normalize(&self) -> NormalizedSet {
        let set = NormalizedSet {
            samples: normalize_samples(&self.images),
            labels: normalize_labels(&self.labels),
            rows: self.rows,
            cols: self.cols,
        };
        if set.samples.is_empty() {
            warn!("normalized an empty split");
        }
        set
    }
}

/// Normalized counterpart of a [`LabeledSet`].
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSet {
    pub samples: Vec<Vec<f32>>,
    pub labels: Vec<f32>,
    pub rows: usize,
    pub cols: usize,
}

impl NormalizedSet {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// One row per sample, `rows * cols` columns.
    pub fn sample_matrix(&self) -> std::result::Result<Array2<f32>, ShapeError> {
        stack_samples(&self.samples)
    }

    pub fn label_vector(&self) -> Array1<f32> {
        label_vector(&self.labels)
    }

    /// Lowest and highest intensity across all samples, `None` when there are no pixels.
    pub fn intensity_range(&self) -> Option<(f32, f32)> {
        self.samples
            .iter()
            .flatten()
            .copied()
            .minmax_by(f32::total_cmp)
            .into_option()
    }
}

/// Render a normalized sample as text, one line per image row.
pub fn render_ascii(sample: &[f32], cols: usize) -> String {
    if cols == 0 {
        return String::new();
    }
    let rows = sample.iter().chunks(cols);
    let lines: Vec<String> = rows
        .into_iter()
        .map(|row| {
            row.map(|&intensity| match intensity {
                a if a < 0.2 => ' ',
                a if a < 0.4 => '░',
                a if a < 0.6 => '▒',
                a if a < 0.8 => '▓',
                _ => '█',
            })
            .collect()
        })
        .collect();
    lines.join("\n")
}
