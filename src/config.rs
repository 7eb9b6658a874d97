//! Dataset locations and command-line arguments

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use crate::mnist::ReaderOptions;

const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";
const TRAIN_LABELS: &str = "train-labels-idx1-ubyte";
const TEST_IMAGES: &str = "t10k-images-idx3-ubyte";
const TEST_LABELS: &str = "t10k-labels-idx1-ubyte";

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    fn file_names(&self) -> (&'static str, &'static str) {
        match self {
            Split::Train => (TRAIN_IMAGES, TRAIN_LABELS),
            Split::Test => (TEST_IMAGES, TEST_LABELS),
        }
    }
}

/// Image and label container locations for one split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub images: PathBuf,
    pub labels: PathBuf,
}

impl DatasetPaths {
    /// Locate a split's files under `dir` using the standard file names. The uncompressed file is
    /// used when present, otherwise its `.gz` sibling if that exists. When neither exists the
    /// uncompressed path is returned so the open error names the file people expect.
    pub fn resolve<P: AsRef<Path>>(dir: P, split: Split) -> Self {
        let dir = dir.as_ref();
        let (images, labels) = split.file_names();
        DatasetPaths {
            images: locate(dir, images),
            labels: locate(dir, labels),
        }
    }
}

fn locate(dir: &Path, name: &str) -> PathBuf {
    let plain = dir.join(name);
    if plain.exists() {
        return plain;
    }
    let compressed = dir.join(format!("{name}.gz"));
    if compressed.exists() { compressed } else { plain }
}

/// Load and normalize one MNIST split
#[derive(Parser, Debug, Clone)]
#[command(name = "mnist-ingest")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Directory holding the MNIST container files (plain or .gz)
    #[arg(short, long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Which split to load
    #[arg(short, long, value_enum, default_value_t = Split::Train)]
    pub split: Split,

    /// Hold out the last N samples of the split as a validation set
    #[arg(long)]
    pub validation_size: Option<usize>,

    /// Refuse containers declaring more record bytes than this
    #[arg(long)]
    pub max_payload_bytes: Option<u64>,

    /// Print the first N normalized samples as ASCII art
    #[arg(short, long, default_value_t = 0)]
    pub preview: usize,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    pub fn paths(&self) -> DatasetPaths {
        DatasetPaths::resolve(&self.data_dir, self.split)
    }

    pub fn reader_options(&self) -> ReaderOptions {
        ReaderOptions {
            max_payload_bytes: self.max_payload_bytes,
        }
    }
}
