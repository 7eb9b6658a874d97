//! MNIST container reader
//!
//! Both container kinds start with a big-endian header: the magic number and the record count,
//! followed (for sample containers only) by the row and column counts. Record bytes follow the
//! header back to back with no padding. Sample records are `rows * cols` pixel bytes in row-major
//! order, label records are a single byte each.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::debug;

use crate::error::{DatasetError, Result};

/// Magic number identifying a sample (image) container.
pub const SAMPLE_MAGIC: u32 = 2051;

/// Magic number identifying a label container.
pub const LABEL_MAGIC: u32 = 2049;

/// Upper bound on records reserved up front. The count comes from the file, so larger containers
/// grow their record list as data actually arrives.
const PREALLOC_RECORDS: usize = 4096;

const MAGIC_FIELD: &str = "magic number";
const SAMPLE_FIELDS: [&str; 3] = ["record count", "row count", "column count"];
const LABEL_FIELDS: [&str; 1] = ["record count"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Samples,
    Labels,
}

impl ContainerKind {
    pub fn magic(&self) -> u32 {
        match self {
            ContainerKind::Samples => SAMPLE_MAGIC,
            ContainerKind::Labels => LABEL_MAGIC,
        }
    }

    /// Names of the 32-bit header fields following the magic number, in on-disk order.
    pub fn header_fields(&self) -> &'static [&'static str] {
        match self {
            ContainerKind::Samples => &SAMPLE_FIELDS,
            ContainerKind::Labels => &LABEL_FIELDS,
        }
    }

    /// Header size in bytes
    pub fn header_len(&self) -> usize {
        (1 + self.header_fields().len()) * 4
    }
}

/// Decoded container header, already converted to host byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub kind: ContainerKind,
    pub record_count: u32,
    /// Row and column counts; `None` for label containers.
    pub dims: Option<(u32, u32)>,
}

impl ContainerHeader {
    /// Bytes per record. Computed in 64 bits so `rows * cols` cannot overflow.
    pub fn record_size(&self) -> u64 {
        match self.dims {
            Some((rows, cols)) => rows as u64 * cols as u64,
            None => 1,
        }
    }

    /// Total record payload declared by the header, `None` if it overflows a u64.
    pub fn payload_len(&self) -> Option<u64> {
        (self.record_count as u64).checked_mul(self.record_size())
    }

    /// Payload charged against a ceiling. Every record costs at least one byte, so a huge count of
    /// zero-sized records is not free.
    pub fn charged_len(&self) -> Option<u64> {
        (self.record_count as u64).checked_mul(self.record_size().max(1))
    }
}

/// Reader configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Refuse containers whose declared record payload exceeds this many bytes, counting at least
    /// one byte per record. No ceiling when unset, in which case an absurd header turns into an
    /// allocation failure.
    pub max_payload_bytes: Option<u64>,
}

impl ReaderOptions {
    pub fn with_max_payload_bytes(mut self, limit: u64) -> Self {
        self.max_payload_bytes = Some(limit);
        self
    }

    fn check_payload(&self, header: &ContainerHeader, origin: &Path) -> Result<()> {
        let Some(limit) = self.max_payload_bytes else {
            return Ok(());
        };
        let requested = header.charged_len().unwrap_or(u64::MAX);
        if requested > limit {
            return Err(DatasetError::PayloadTooLarge {
                path: origin.to_path_buf(),
                requested,
                limit,
            });
        }
        Ok(())
    }
}

/// Fill `buf` from `reader` until it is full or the stream ends, returning how many bytes were
/// actually transferred. Unlike `read_exact`, a premature end of stream is reported as a short
/// count rather than an error so callers can say how much was there.
pub fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn fill_exact<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
    origin: &Path,
    section: &'static str,
) -> Result<()> {
    let available = read_full(reader, buf).map_err(|source| DatasetError::Read {
        path: origin.to_path_buf(),
        source,
    })?;
    if available < buf.len() {
        return Err(DatasetError::ShortRead {
            path: origin.to_path_buf(),
            section,
            expected: buf.len(),
            available,
        });
    }
    Ok(())
}

/// Read one 32-bit header field. The on-disk order is always big-endian (most significant byte
/// first), whatever the host is.
pub fn read_be_u32<R: Read + ?Sized>(
    reader: &mut R,
    origin: &Path,
    section: &'static str,
) -> Result<u32> {
    let mut buf = [0u8; 4];
    fill_exact(reader, &mut buf, origin, section)?;
    Ok(u32::from_be_bytes(buf))
}

/// Decode the header of a container of the given kind. The magic number is checked as soon as it
/// is read; on a mismatch nothing else is consumed from `reader`.
pub fn read_header<R: Read + ?Sized>(
    reader: &mut R,
    kind: ContainerKind,
    origin: &Path,
) -> Result<ContainerHeader> {
    let magic = read_be_u32(reader, origin, MAGIC_FIELD)?;
    if magic != kind.magic() {
        return Err(DatasetError::InvalidMagic {
            path: origin.to_path_buf(),
            expected: kind.magic(),
            actual: magic,
        });
    }

    let mut values = [0u32; 3];
    for (value, field) in values.iter_mut().zip(kind.header_fields()) {
        *value = read_be_u32(reader, origin, *field)?;
    }
    let [record_count, rows, cols] = values;
    let dims = match kind {
        ContainerKind::Samples => Some((rows, cols)),
        ContainerKind::Labels => None,
    };

    let header = ContainerHeader {
        kind,
        record_count,
        dims,
    };
    debug!(
        path = %origin.display(),
        ?kind,
        record_count,
        ?dims,
        "decoded container header"
    );
    Ok(header)
}

fn record_size_usize(header: &ContainerHeader, origin: &Path) -> Result<usize> {
    usize::try_from(header.record_size()).map_err(|_| DatasetError::PayloadTooLarge {
        path: origin.to_path_buf(),
        requested: header.record_size(),
        limit: usize::MAX as u64,
    })
}

/// Parse a sample container from any byte stream. `origin` only feeds error messages.
pub fn parse_sample_container<R: Read + ?Sized>(
    reader: &mut R,
    origin: &Path,
    options: &ReaderOptions,
) -> Result<Vec<Vec<u8>>> {
    parse_sample_records(reader, origin, options).map(|(_, records)| records)
}

/// Like [`parse_sample_container`], also handing back the decoded header.
pub fn parse_sample_records<R: Read + ?Sized>(
    reader: &mut R,
    origin: &Path,
    options: &ReaderOptions,
) -> Result<(ContainerHeader, Vec<Vec<u8>>)> {
    let header = read_header(reader, ContainerKind::Samples, origin)?;
    options.check_payload(&header, origin)?;
    let record_size = record_size_usize(&header, origin)?;

    // Each record gets its own buffer. If any of them comes up short, everything read so far is
    // dropped along with the error.
    let mut records = Vec::with_capacity((header.record_count as usize).min(PREALLOC_RECORDS));
    for _ in 0..header.record_count {
        let mut record = vec![0u8; record_size];
        fill_exact(reader, &mut record, origin, "record data")?;
        records.push(record);
    }

    debug!(
        path = %origin.display(),
        records = records.len(),
        record_size,
        "read sample records"
    );
    Ok((header, records))
}

/// Parse a label container from any byte stream. `origin` only feeds error messages.
pub fn parse_label_container<R: Read + ?Sized>(
    reader: &mut R,
    origin: &Path,
    options: &ReaderOptions,
) -> Result<Vec<u8>> {
    let header = read_header(reader, ContainerKind::Labels, origin)?;
    options.check_payload(&header, origin)?;

    let mut labels = vec![0u8; header.record_count as usize];
    fill_exact(reader, &mut labels, origin, "record data")?;

    debug!(path = %origin.display(), records = labels.len(), "read label records");
    Ok(labels)
}

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Open a container file for reading, decompressing on the fly if its name ends in `.gz`.
pub fn open_container(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|source| DatasetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    if is_gzip(path) {
        Ok(Box::new(GzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

/// Read every sample record of the container at `path`, in file order.
pub fn read_sample_container<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<u8>>> {
    read_sample_container_with(path, &ReaderOptions::default())
}

pub fn read_sample_container_with<P: AsRef<Path>>(
    path: P,
    options: &ReaderOptions,
) -> Result<Vec<Vec<u8>>> {
    read_sample_records(path, options).map(|(_, records)| records)
}

/// Read a sample container, returning its header along with the records.
pub fn read_sample_records<P: AsRef<Path>>(
    path: P,
    options: &ReaderOptions,
) -> Result<(ContainerHeader, Vec<Vec<u8>>)> {
    let path = path.as_ref();
    let mut reader = open_container(path)?;
    parse_sample_records(&mut reader, path, options)
}

/// Read every label of the container at `path`, in file order.
pub fn read_label_container<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    read_label_container_with(path, &ReaderOptions::default())
}

pub fn read_label_container_with<P: AsRef<Path>>(
    path: P,
    options: &ReaderOptions,
) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let mut reader = open_container(path)?;
    parse_label_container(&mut reader, path, options)
}
