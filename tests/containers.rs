use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use mnist_ingest::config::{DatasetPaths, Split};
use mnist_ingest::mnist::read_sample_container_with;
use mnist_ingest::{
    DatasetError, ErrorKind, LABEL_MAGIC, LabeledSet, ReaderOptions, SAMPLE_MAGIC,
    normalize_labels, normalize_samples, read_label_container, read_sample_container,
};
use tempfile::{TempDir, tempdir};

fn sample_bytes(magic: u32, count: u32, rows: u32, cols: u32, data: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for field in [magic, count, rows, cols] {
        bytes.extend_from_slice(&field.to_be_bytes());
    }
    bytes.extend_from_slice(data);
    bytes
}

fn label_bytes(magic: u32, count: u32, data: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&magic.to_be_bytes());
    bytes.extend_from_slice(&count.to_be_bytes());
    bytes.extend_from_slice(data);
    bytes
}

fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).unwrap();
    path
}

fn write_gz(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap();
    path
}

#[test]
fn sample_container_reads_and_normalizes() {
    let dir = tempdir().unwrap();
    let path = write(
        &dir,
        "images",
        &sample_bytes(SAMPLE_MAGIC, 2, 1, 2, &[0, 255, 10, 20]),
    );

    let raw = read_sample_container(&path).unwrap();
    assert_eq!(raw, vec![vec![0, 255], vec![10, 20]]);

    let normalized = normalize_samples(&raw);
    assert_eq!(
        normalized,
        vec![vec![0.0, 1.0], vec![10.0 / 255.0, 20.0 / 255.0]]
    );
}

#[test]
fn label_container_reads_and_normalizes() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "labels", &label_bytes(LABEL_MAGIC, 3, &[0, 1, 9]));

    let raw = read_label_container(&path).unwrap();
    assert_eq!(raw, vec![0, 1, 9]);
    assert_eq!(normalize_labels(&raw), vec![0.0, 1.0, 9.0]);
}

#[test]
fn wrong_container_kind_is_format_error() {
    let dir = tempdir().unwrap();
    let images = write(&dir, "images", &sample_bytes(SAMPLE_MAGIC, 1, 1, 1, &[5]));
    let labels = write(&dir, "labels", &label_bytes(LABEL_MAGIC, 1, &[5]));

    assert!(read_sample_container(&images).is_ok());
    assert!(read_label_container(&labels).is_ok());

    let err = read_label_container(&images).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    let err = read_sample_container(&labels).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn truncated_files_fail_without_partial_result() {
    let dir = tempdir().unwrap();
    let full = sample_bytes(SAMPLE_MAGIC, 3, 2, 2, &[9; 12]);
    for cut in 1..=12 {
        let path = write(&dir, "images", &full[..full.len() - cut]);
        let err = read_sample_container(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io, "cut {cut}");
        assert!(matches!(err, DatasetError::ShortRead { .. }));
    }

    let full = label_bytes(LABEL_MAGIC, 4, &[1, 2, 3, 4]);
    let path = write(&dir, "labels", &full[..full.len() - 1]);
    match read_label_container(&path).unwrap_err() {
        DatasetError::ShortRead {
            path: reported,
            expected,
            available,
            ..
        } => {
            assert_eq!(reported, path);
            assert_eq!(expected, 4);
            assert_eq!(available, 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn empty_containers_yield_empty_results() {
    let dir = tempdir().unwrap();
    let images = write(&dir, "images", &sample_bytes(SAMPLE_MAGIC, 0, 28, 28, &[]));
    let labels = write(&dir, "labels", &label_bytes(LABEL_MAGIC, 0, &[]));

    assert!(read_sample_container(&images).unwrap().is_empty());
    assert!(read_label_container(&labels).unwrap().is_empty());
}

#[test]
fn gzip_containers_are_decompressed() {
    let dir = tempdir().unwrap();
    let data: Vec<u8> = (0..2 * 3 * 3).map(|i| (i * 14) as u8).collect();
    let images = write_gz(
        &dir,
        "images.gz",
        &sample_bytes(SAMPLE_MAGIC, 2, 3, 3, &data),
    );
    let labels = write_gz(&dir, "labels.gz", &label_bytes(LABEL_MAGIC, 2, &[7, 2]));

    let raw = read_sample_container(&images).unwrap();
    assert_eq!(raw.len(), 2);
    assert_eq!(raw[1], data[9..].to_vec());
    assert_eq!(read_label_container(&labels).unwrap(), vec![7, 2]);
}

#[test]
fn gzip_with_short_payload_is_short_read() {
    let dir = tempdir().unwrap();
    let path = write_gz(&dir, "labels.gz", &label_bytes(LABEL_MAGIC, 4, &[1, 2, 3]));

    let err = read_label_container(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(matches!(
        err,
        DatasetError::ShortRead {
            expected: 4,
            available: 3,
            ..
        }
    ));
}

#[test]
fn gzip_cut_mid_stream_is_read_error() {
    let dir = tempdir().unwrap();
    // Enough varied pixels that the compressed body is well past the gzip header.
    let data: Vec<u8> = (0..64u32 * 28 * 28)
        .map(|i| (i.wrapping_mul(2_654_435_761) >> 13) as u8)
        .collect();
    let full = write_gz(
        &dir,
        "whole.gz",
        &sample_bytes(SAMPLE_MAGIC, 64, 28, 28, &data),
    );
    let compressed = fs::read(&full).unwrap();
    assert!(compressed.len() > 1024);
    let path = write(&dir, "images.gz", &compressed[..compressed.len() / 2]);

    let err = read_sample_container(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(matches!(err, DatasetError::Read { .. }), "{err:?}");
}

#[test]
fn corrupt_gzip_is_io_error() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "labels.gz", b"this is not gzip at all");
    let err = read_label_container(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn payload_ceiling_applies_to_files() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "images", &sample_bytes(SAMPLE_MAGIC, 2, 2, 2, &[0; 8]));

    let tight = ReaderOptions::default().with_max_payload_bytes(7);
    let err = read_sample_container_with(&path, &tight).unwrap_err();
    assert!(matches!(err, DatasetError::PayloadTooLarge { requested: 8, .. }));

    let roomy = ReaderOptions::default().with_max_payload_bytes(8);
    assert_eq!(read_sample_container_with(&path, &roomy).unwrap().len(), 2);
}

fn write_split(dir: &Path, images: &[u8], labels: &[u8]) {
    fs::write(dir.join("train-images-idx3-ubyte"), images).unwrap();
    fs::write(dir.join("train-labels-idx1-ubyte"), labels).unwrap();
}

#[test]
fn split_loads_and_pairs_records() {
    let dir = tempdir().unwrap();
    write_split(
        dir.path(),
        &sample_bytes(SAMPLE_MAGIC, 3, 1, 2, &[0, 255, 51, 102, 1, 2]),
        &label_bytes(LABEL_MAGIC, 3, &[5, 0, 4]),
    );

    let paths = DatasetPaths::resolve(dir.path(), Split::Train);
    let mut set = LabeledSet::load(&paths, &ReaderOptions::default()).unwrap();
    assert_eq!((set.rows(), set.cols()), (1, 2));
    assert_eq!(set.labels(), &[5, 0, 4]);
    assert_eq!(set.len(), 3);

    let validation = set.split_off(2);
    let normalized = set.normalize();
    assert_eq!(normalized.samples, vec![vec![0.0, 1.0], vec![0.2, 0.4]]);
    assert_eq!(normalized.labels, vec![5.0, 0.0]);
    assert_eq!(validation.normalize().labels, vec![4.0]);

    let matrix = normalized.sample_matrix().unwrap();
    assert_eq!(matrix.shape(), &[2, 2]);
}

#[test]
fn split_with_mismatched_counts_is_rejected() {
    let dir = tempdir().unwrap();
    write_split(
        dir.path(),
        &sample_bytes(SAMPLE_MAGIC, 2, 1, 1, &[0, 1]),
        &label_bytes(LABEL_MAGIC, 3, &[0, 1, 2]),
    );

    let paths = DatasetPaths::resolve(dir.path(), Split::Train);
    let err = LabeledSet::load(&paths, &ReaderOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        DatasetError::CountMismatch {
            samples: 2,
            labels: 3
        }
    ));
}

#[test]
fn missing_split_reports_the_expected_file() {
    let dir = tempdir().unwrap();
    let paths = DatasetPaths::resolve(dir.path(), Split::Test);
    match LabeledSet::load(&paths, &ReaderOptions::default()).unwrap_err() {
        DatasetError::Open { path, .. } => {
            assert_eq!(path, dir.path().join("t10k-images-idx3-ubyte"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
