//! Binary spike log writer/reader
//!
//! Layout: an 8-byte `learning_off_time` (`f64`) header, followed by one
//! 19-byte record per logged spike:
//!
//! `f64 t, i16 delay*100, i8 weight*100, i16 potential*100, i16 neuron_id,
//! i8 layer_id, i8 rf_id, i8 x, i8 y`

use crate::error::{Result, StorageError};
use std::io::{Read, Write};

/// A single logged spike event, scaled to the fixed-point encoding used on disk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpikeRecord {
    /// Event timestamp
    pub t: f64,
    /// Synaptic delay of the spike's dendrite
    pub delay: f32,
    /// Synaptic weight of the spike's dendrite
    pub weight: f32,
    /// Membrane potential at the time of the event
    pub potential: f32,
    /// Target neuron id
    pub neuron_id: u16,
    /// Layer id of the target neuron
    pub layer_id: i8,
    /// Receptive-field index, or -1 if not applicable
    pub rf_id: i8,
    /// Receptive-field x coordinate, or -1 if not applicable
    pub x: i8,
    /// Receptive-field y coordinate, or -1 if not applicable
    pub y: i8,
}

const RECORD_LEN: usize = 19;

/// Streaming writer for a spike log file
pub struct SpikeLogWriter<W: Write> {
    out: W,
}

impl<W: Write> SpikeLogWriter<W> {
    /// Wrap a writer; call [`Self::write_header`] once before the first record
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Emit the 8-byte `learning_off_time` header
    ///
    /// Must be called exactly once, before any record, once the run's
    /// learning cutoff time is known.
    pub fn write_header(&mut self, learning_off_time: f64) -> Result<()> {
        self.out.write_all(&learning_off_time.to_le_bytes())?;
        Ok(())
    }

    /// Append one record
    pub fn write_record(&mut self, record: &SpikeRecord) -> Result<()> {
        let mut buf = [0u8; RECORD_LEN];
        buf[0..8].copy_from_slice(&record.t.to_le_bytes());
        buf[8..10].copy_from_slice(&((record.delay * 100.0) as i16).to_le_bytes());
        buf[10] = (record.weight * 100.0) as i8 as u8;
        buf[11..13].copy_from_slice(&((record.potential * 100.0) as i16).to_le_bytes());
        buf[13..15].copy_from_slice(&record.neuron_id.to_le_bytes());
        buf[15] = record.layer_id as u8;
        buf[16] = record.rf_id as u8;
        buf[17] = record.x as u8;
        buf[18] = record.y as u8;
        self.out.write_all(&buf)?;
        Ok(())
    }

    /// Flush the underlying writer
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Reads back a spike log written by [`SpikeLogWriter`]
pub struct SpikeLogReader<R: Read> {
    input: R,
    /// `learning_off_time` read from the header
    pub learning_off_time: f64,
}

impl<R: Read> SpikeLogReader<R> {
    /// Open a reader, consuming the 8-byte header
    pub fn new(mut input: R) -> Result<Self> {
        let mut header = [0u8; 8];
        input.read_exact(&mut header)?;
        Ok(Self {
            input,
            learning_off_time: f64::from_le_bytes(header),
        })
    }

    /// Read the next record, or `None` at end of stream
    pub fn read_record(&mut self) -> Result<Option<SpikeRecord>> {
        let mut buf = [0u8; RECORD_LEN];
        match self.input.read_exact(&mut buf) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(StorageError::from(e)),
        }
        let t = f64::from_le_bytes(buf[0..8].try_into().unwrap());
        let delay = i16::from_le_bytes(buf[8..10].try_into().unwrap()) as f32 / 100.0;
        let weight = buf[10] as i8 as f32 / 100.0;
        let potential = i16::from_le_bytes(buf[11..13].try_into().unwrap()) as f32 / 100.0;
        let neuron_id = u16::from_le_bytes(buf[13..15].try_into().unwrap());
        let layer_id = buf[15] as i8;
        let rf_id = buf[16] as i8;
        let x = buf[17] as i8;
        let y = buf[18] as i8;
        Ok(Some(SpikeRecord {
            t,
            delay,
            weight,
            potential,
            neuron_id,
            layer_id,
            rf_id,
            x,
            y,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    proptest! {
        /// Any record built from integer fixed-point inputs survives a
        /// write/read cycle: exact for the unscaled fields, within one
        /// encoding step's truncation error for the scaled `f32` fields.
        #[test]
        fn prop_record_roundtrips_within_fixed_point_tolerance(
            t in -1_000.0f64..1_000.0,
            delay_scaled in -300i32..300,
            weight_scaled in -127i32..127,
            potential_scaled in -9_000i32..9_000,
            neuron_id in 0u16..=u16::MAX,
            layer_id in -128i8..127,
            rf_id in -128i8..127,
            x in -128i8..127,
            y in -128i8..127,
        ) {
            let record = SpikeRecord {
                t,
                delay: delay_scaled as f32 / 100.0,
                weight: weight_scaled as f32 / 100.0,
                potential: potential_scaled as f32 / 100.0,
                neuron_id,
                layer_id,
                rf_id,
                x,
                y,
            };

            let mut buf = Vec::new();
            {
                let mut writer = SpikeLogWriter::new(&mut buf);
                writer.write_header(0.0).unwrap();
                writer.write_record(&record).unwrap();
            }
            let mut reader = SpikeLogReader::new(Cursor::new(buf)).unwrap();
            let decoded = reader.read_record().unwrap().unwrap();

            prop_assert_eq!(decoded.t, record.t);
            prop_assert_eq!(decoded.neuron_id, record.neuron_id);
            prop_assert_eq!(decoded.layer_id, record.layer_id);
            prop_assert_eq!(decoded.rf_id, record.rf_id);
            prop_assert_eq!(decoded.x, record.x);
            prop_assert_eq!(decoded.y, record.y);
            prop_assert!((decoded.delay - record.delay).abs() < 0.02);
            prop_assert!((decoded.weight - record.weight).abs() < 0.02);
            prop_assert!((decoded.potential - record.potential).abs() < 0.02);
        }
    }

    fn sample() -> SpikeRecord {
        SpikeRecord {
            t: 12.5,
            delay: 1.5,
            weight: 0.75,
            potential: -55.0,
            neuron_id: 42,
            layer_id: 2,
            rf_id: -1,
            x: -1,
            y: -1,
        }
    }

    #[test]
    fn test_roundtrip_single_record() {
        let mut buf = Vec::new();
        {
            let mut writer = SpikeLogWriter::new(&mut buf);
            writer.write_header(100.0).unwrap();
            writer.write_record(&sample()).unwrap();
        }
        let mut reader = SpikeLogReader::new(Cursor::new(buf)).unwrap();
        assert_eq!(reader.learning_off_time, 100.0);
        let record = reader.read_record().unwrap().unwrap();
        assert_eq!(record.neuron_id, 42);
        assert_eq!(record.layer_id, 2);
        assert!((record.delay - 1.5).abs() < 0.01);
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_record_is_19_bytes_on_wire() {
        let mut buf = Vec::new();
        {
            let mut writer = SpikeLogWriter::new(&mut buf);
            writer.write_header(0.0).unwrap();
            writer.write_record(&sample()).unwrap();
        }
        assert_eq!(buf.len(), 8 + RECORD_LEN);
    }
}
