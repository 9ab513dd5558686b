//! Weight tables and their binary file format.
//!
//! Layout (little-endian):
//!
//! ```text
//! u32 table_count
//! repeated table_count times:
//!   u64 len
//!   f32 * len
//! ```
//!
//! Saving truncates any existing file.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

const WRITE_CHUNK: usize = 16 * 1024;

#[derive(thiserror::Error, Debug)]
pub enum WeightError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("weight file truncated in table {table}")]
    Truncated { table: usize },
    #[error("weight table of {0} entries does not fit in memory")]
    Oversized(u64),
    #[error("expected {expected_tables} tables of {expected_len} weights, found {found:?}")]
    Shape { expected_tables: usize, expected_len: usize, found: Vec<usize> },
}

/// One flat table of weights, addressed by feature index.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable(Vec<f32>);

impl WeightTable {
    /// A zero-filled table with `len` entries.
    pub fn zeroed(len: usize) -> Self { WeightTable(vec![0.0; len]) }

    #[inline]
    pub fn len(&self) -> usize { self.0.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    #[inline]
    pub fn get(&self, index: usize) -> f32 { self.0[index] }

    #[inline]
    pub fn accumulate(&mut self, index: usize, delta: f32) { self.0[index] += delta; }

    #[inline]
    pub fn set(&mut self, index: usize, value: f32) { self.0[index] = value; }

    pub fn as_slice(&self) -> &[f32] { &self.0 }
}

/// Ordered collection of weight tables.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Weights {
    tables: Vec<WeightTable>,
}

impl Weights {
    /// `count` zero-filled tables of `len` entries each.
    pub fn zeroed(count: usize, len: usize) -> Self {
        Weights { tables: (0..count).map(|_| WeightTable::zeroed(len)).collect() }
    }

    pub fn tables(&self) -> &[WeightTable] { &self.tables }

    pub fn tables_mut(&mut self) -> &mut [WeightTable] { &mut self.tables }

    /// Check that there are exactly `count` tables of `len` entries.
    pub fn ensure_shape(&self, count: usize, len: usize) -> Result<(), WeightError> {
        if self.tables.len() == count && self.tables.iter().all(|t| t.len() == len) {
            return Ok(());
        }
        Err(WeightError::Shape {
            expected_tables: count,
            expected_len: len,
            found: self.tables.iter().map(WeightTable::len).collect(),
        })
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, WeightError> {
        let mut word = [0u8; 4];
        reader.read_exact(&mut word)?;
        let count = u32::from_le_bytes(word) as usize;

        let mut tables = Vec::with_capacity(count.min(64));
        for table in 0..count {
            let mut len_bytes = [0u8; 8];
            read_or_truncated(reader, &mut len_bytes, table)?;
            let len = u64::from_le_bytes(len_bytes);
            let len = usize::try_from(len).map_err(|_| WeightError::Oversized(len))?;
            let byte_len = len.checked_mul(4).ok_or(WeightError::Oversized(len as u64))?;

            let mut raw = vec![0u8; byte_len];
            read_or_truncated(reader, &mut raw, table)?;
            let values = raw
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect();
            tables.push(WeightTable(values));
        }
        Ok(Weights { tables })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), WeightError> {
        writer.write_all(&(self.tables.len() as u32).to_le_bytes())?;
        for table in &self.tables {
            writer.write_all(&(table.len() as u64).to_le_bytes())?;
            let mut buf = Vec::with_capacity(WRITE_CHUNK * 4);
            for chunk in table.as_slice().chunks(WRITE_CHUNK) {
                buf.clear();
                buf.extend(chunk.iter().flat_map(|w| w.to_le_bytes()));
                writer.write_all(&buf)?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WeightError> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_from(&mut reader)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), WeightError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)
    }
}

fn read_or_truncated<R: Read>(reader: &mut R, buf: &mut [u8], table: usize) -> Result<(), WeightError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => WeightError::Truncated { table },
        _ => WeightError::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn round_trip_file() {
        let mut weights = Weights::zeroed(3, 5);
        weights.tables_mut()[0].set(4, 1.5);
        weights.tables_mut()[2].accumulate(0, -0.25);

        let tmp = NamedTempFile::new().unwrap();
        weights.save(tmp.path()).unwrap();
        let loaded = Weights::load(tmp.path()).unwrap();
        assert_eq!(loaded, weights);
        assert_eq!(std::fs::metadata(tmp.path()).unwrap().len(), 4 + 3 * (8 + 5 * 4));
    }

    #[test]
    fn save_truncates_existing_file() {
        let tmp = NamedTempFile::new().unwrap();
        Weights::zeroed(4, 100).save(tmp.path()).unwrap();
        Weights::zeroed(1, 1).save(tmp.path()).unwrap();
        assert_eq!(std::fs::metadata(tmp.path()).unwrap().len(), 4 + 8 + 4);
        assert_eq!(Weights::load(tmp.path()).unwrap(), Weights::zeroed(1, 1));
    }

    #[test]
    fn layout_is_count_then_length_prefixed_tables() {
        let mut weights = Weights::zeroed(1, 2);
        weights.tables_mut()[0].set(1, 1.0);
        let mut bytes: Vec<u8> = Vec::new();
        weights.write_to(&mut bytes).unwrap();
        let mut expected = vec![1, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0];
        expected.extend_from_slice(&0f32.to_le_bytes());
        expected.extend_from_slice(&1f32.to_le_bytes());
        assert_eq!(bytes, expected);
    }

    #[test]
    fn truncated_table_is_reported() {
        let mut bytes: Vec<u8> = Vec::new();
        Weights::zeroed(2, 3).write_to(&mut bytes).unwrap();
        bytes.truncate(bytes.len() - 1);
        let err = Weights::read_from(&mut bytes.as_slice()).unwrap_err();
        assert!(matches!(err, WeightError::Truncated { table: 1 }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Weights::load(dir.path().join("absent.bin")).unwrap_err();
        assert!(matches!(err, WeightError::Io(_)));
    }

    #[test]
    fn shape_check() {
        let weights = Weights::zeroed(2, 10);
        assert!(weights.ensure_shape(2, 10).is_ok());
        let err = weights.ensure_shape(4, 10).unwrap_err();
        assert!(matches!(err, WeightError::Shape { ref found, .. } if found == &vec![10, 10]));
    }
}
