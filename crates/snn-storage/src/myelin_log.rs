//! Binary myelin-plasticity event log writer/reader
//!
//! Each myelin-plasticity firing event writes one variable-length record:
//!
//! `i16 bit_size, i32 (timestamp - previous_timestamp)*100, i16 neuron_id`,
//! followed by one entry per modified synapse:
//! `i32 time_difference*100, i16 presynaptic_neuron_id, i16 delay*100, i8 weight*100`
//!
//! `bit_size` is the size in bytes of everything after the `bit_size` field.

use crate::error::{Result, StorageError};
use std::io::{Read, Write};

/// One dendrite whose delay/weight was modified by a myelin-plasticity event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModifiedSynapse {
    /// Time difference between presynaptic trace and postsynaptic input, scaled on disk by 100
    pub time_difference: f32,
    /// Presynaptic neuron id
    pub presynaptic_neuron_id: u16,
    /// Synaptic delay after the update
    pub delay: f32,
    /// Synaptic weight after the update
    pub weight: f32,
}

/// A single myelin-plasticity firing event, covering every synapse it touched
#[derive(Debug, Clone, PartialEq)]
pub struct MyelinEvent {
    /// Elapsed time since the previous logged event
    pub delta_timestamp: f64,
    /// Postsynaptic neuron id
    pub neuron_id: u16,
    /// Synapses whose delay/weight changed in this event
    pub modified_synapses: Vec<ModifiedSynapse>,
}

/// Streaming writer for a myelin-plasticity log file
pub struct MyelinLogWriter<W: Write> {
    out: W,
    previous_timestamp: f64,
}

impl<W: Write> MyelinLogWriter<W> {
    /// Create a new writer
    pub fn new(out: W) -> Self {
        Self {
            out,
            previous_timestamp: 0.0,
        }
    }

    /// Append one event, given its absolute timestamp
    pub fn write_event(&mut self, timestamp: f64, neuron_id: u16, modified_synapses: &[ModifiedSynapse]) -> Result<()> {
        let delta = timestamp - self.previous_timestamp;
        self.previous_timestamp = timestamp;

        let payload_len = 4 + 2 + modified_synapses.len() * (4 + 2 + 2 + 1);
        self.out.write_all(&(payload_len as i16).to_le_bytes())?;
        self.out.write_all(&((delta * 100.0) as i32).to_le_bytes())?;
        self.out.write_all(&neuron_id.to_le_bytes())?;
        for synapse in modified_synapses {
            self.out
                .write_all(&((synapse.time_difference * 100.0) as i32).to_le_bytes())?;
            self.out.write_all(&synapse.presynaptic_neuron_id.to_le_bytes())?;
            self.out.write_all(&((synapse.delay * 100.0) as i16).to_le_bytes())?;
            self.out.write_all(&[((synapse.weight * 100.0) as i8) as u8])?;
        }
        Ok(())
    }

    /// Flush the underlying writer
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Reads back a myelin-plasticity log written by [`MyelinLogWriter`]
pub struct MyelinLogReader<R: Read> {
    input: R,
    previous_timestamp: f64,
}

impl<R: Read> MyelinLogReader<R> {
    /// Open a reader
    pub fn new(input: R) -> Self {
        Self {
            input,
            previous_timestamp: 0.0,
        }
    }

    /// Read the next event, or `None` at end of stream
    pub fn read_event(&mut self) -> Result<Option<MyelinEvent>> {
        let mut size_buf = [0u8; 2];
        match self.input.read_exact(&mut size_buf) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(StorageError::from(e)),
        }
        let payload_len = i16::from_le_bytes(size_buf) as usize;
        if payload_len < 6 || (payload_len - 6) % 9 != 0 {
            return Err(StorageError::invalid_format(format!(
                "myelin-plasticity record payload size {} is not 6 + 9k bytes",
                payload_len
            )));
        }

        let mut delta_buf = [0u8; 4];
        self.input.read_exact(&mut delta_buf)?;
        let delta_timestamp = i32::from_le_bytes(delta_buf) as f64 / 100.0;
        self.previous_timestamp += delta_timestamp;

        let mut id_buf = [0u8; 2];
        self.input.read_exact(&mut id_buf)?;
        let neuron_id = u16::from_le_bytes(id_buf);

        let n_synapses = (payload_len - 6) / 9;
        let mut modified_synapses = Vec::with_capacity(n_synapses);
        for _ in 0..n_synapses {
            let mut td_buf = [0u8; 4];
            self.input.read_exact(&mut td_buf)?;
            let time_difference = i32::from_le_bytes(td_buf) as f32 / 100.0;

            let mut pre_buf = [0u8; 2];
            self.input.read_exact(&mut pre_buf)?;
            let presynaptic_neuron_id = u16::from_le_bytes(pre_buf);

            let mut delay_buf = [0u8; 2];
            self.input.read_exact(&mut delay_buf)?;
            let delay = i16::from_le_bytes(delay_buf) as f32 / 100.0;

            let mut weight_buf = [0u8; 1];
            self.input.read_exact(&mut weight_buf)?;
            let weight = weight_buf[0] as i8 as f32 / 100.0;

            modified_synapses.push(ModifiedSynapse {
                time_difference,
                presynaptic_neuron_id,
                delay,
                weight,
            });
        }

        Ok(Some(MyelinEvent {
            delta_timestamp,
            neuron_id,
            modified_synapses,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_roundtrip_event_with_one_synapse() {
        let synapse = ModifiedSynapse {
            time_difference: 1.25,
            presynaptic_neuron_id: 9,
            delay: 2.5,
            weight: 0.4,
        };
        let mut buf = Vec::new();
        {
            let mut writer = MyelinLogWriter::new(&mut buf);
            writer.write_event(10.0, 3, &[synapse]).unwrap();
        }
        let mut reader = MyelinLogReader::new(Cursor::new(buf));
        let event = reader.read_event().unwrap().unwrap();
        assert_eq!(event.neuron_id, 3);
        assert!((event.delta_timestamp - 10.0).abs() < 0.01);
        assert_eq!(event.modified_synapses.len(), 1);
        assert!((event.modified_synapses[0].delay - 2.5).abs() < 0.01);
        assert!(reader.read_event().unwrap().is_none());
    }

    #[test]
    fn test_delta_timestamp_is_relative_to_previous_event() {
        let mut buf = Vec::new();
        {
            let mut writer = MyelinLogWriter::new(&mut buf);
            writer.write_event(10.0, 1, &[]).unwrap();
            writer.write_event(15.0, 1, &[]).unwrap();
        }
        let mut reader = MyelinLogReader::new(Cursor::new(buf));
        assert!((reader.read_event().unwrap().unwrap().delta_timestamp - 10.0).abs() < 0.01);
        assert!((reader.read_event().unwrap().unwrap().delta_timestamp - 5.0).abs() < 0.01);
    }
}
