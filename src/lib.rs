//! mnist-ingest library
//!
//! Reads the MNIST handwritten-digit containers and normalizes their records into floating-point
//! arrays, along with the activation and loss functions a downstream network would use.

pub mod activation;
pub mod config;
pub mod dataset;
pub mod error;
pub mod loss;
pub mod mnist;
pub mod normalize;

pub use dataset::{LabeledSet, NormalizedSet};
pub use error::{DatasetError, ErrorKind, LossError};
pub use mnist::{
    ContainerHeader, ContainerKind, LABEL_MAGIC, ReaderOptions, SAMPLE_MAGIC, read_label_container,
    read_sample_container,
};
pub use normalize::{normalize_labels, normalize_samples};
