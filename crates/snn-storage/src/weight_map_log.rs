//! Binary weight-map snapshot log writer/reader
//!
//! Each pattern-boundary snapshot, for each tracked neuron, writes one
//! variable-length record: `i16 byte_size, i16 neuron_id, [f64 weight]*`
//! where `byte_size` is the size in bytes of everything that follows the
//! `byte_size` field itself.

use crate::error::{Result, StorageError};
use std::io::{Read, Write};

/// One neuron's dendritic weight vector at a snapshot boundary
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMapRecord {
    /// Snapshotted neuron id
    pub neuron_id: u16,
    /// Weight of each dendrite, in dendritic-tree order
    pub weights: Vec<f64>,
}

/// Streaming writer for a weight-map log file
pub struct WeightMapLogWriter<W: Write> {
    out: W,
}

impl<W: Write> WeightMapLogWriter<W> {
    /// Create a new writer
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Append one neuron's snapshot record
    pub fn write_record(&mut self, record: &WeightMapRecord) -> Result<()> {
        let payload_len = 2 + record.weights.len() * 8;
        self.out.write_all(&(payload_len as i16).to_le_bytes())?;
        self.out.write_all(&record.neuron_id.to_le_bytes())?;
        for w in &record.weights {
            self.out.write_all(&w.to_le_bytes())?;
        }
        Ok(())
    }

    /// Flush the underlying writer
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Reads back a weight-map log written by [`WeightMapLogWriter`]
pub struct WeightMapLogReader<R: Read> {
    input: R,
}

impl<R: Read> WeightMapLogReader<R> {
    /// Open a reader
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Read the next record, or `None` at end of stream
    pub fn read_record(&mut self) -> Result<Option<WeightMapRecord>> {
        let mut size_buf = [0u8; 2];
        match self.input.read_exact(&mut size_buf) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(StorageError::from(e)),
        }
        let payload_len = i16::from_le_bytes(size_buf) as usize;
        if payload_len < 2 || (payload_len - 2) % 8 != 0 {
            return Err(StorageError::invalid_format(format!(
                "weight-map record payload size {} is not 2 + 8k bytes",
                payload_len
            )));
        }
        let mut id_buf = [0u8; 2];
        self.input.read_exact(&mut id_buf)?;
        let neuron_id = u16::from_le_bytes(id_buf);

        let n_weights = (payload_len - 2) / 8;
        let mut weights = Vec::with_capacity(n_weights);
        for _ in 0..n_weights {
            let mut w_buf = [0u8; 8];
            self.input.read_exact(&mut w_buf)?;
            weights.push(f64::from_le_bytes(w_buf));
        }
        Ok(Some(WeightMapRecord { neuron_id, weights }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_roundtrip_record() {
        let record = WeightMapRecord {
            neuron_id: 7,
            weights: vec![0.1, 0.2, -0.3],
        };
        let mut buf = Vec::new();
        WeightMapLogWriter::new(&mut buf).write_record(&record).unwrap();

        let mut reader = WeightMapLogReader::new(Cursor::new(buf));
        let read_back = reader.read_record().unwrap().unwrap();
        assert_eq!(read_back, record);
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_multiple_records_in_sequence() {
        let mut buf = Vec::new();
        {
            let mut writer = WeightMapLogWriter::new(&mut buf);
            writer
                .write_record(&WeightMapRecord { neuron_id: 1, weights: vec![1.0] })
                .unwrap();
            writer
                .write_record(&WeightMapRecord { neuron_id: 2, weights: vec![2.0, 3.0] })
                .unwrap();
        }
        let mut reader = WeightMapLogReader::new(Cursor::new(buf));
        assert_eq!(reader.read_record().unwrap().unwrap().neuron_id, 1);
        assert_eq!(reader.read_record().unwrap().unwrap().neuron_id, 2);
        assert!(reader.read_record().unwrap().is_none());
    }
}
