//! Structured binary I/O for segment files.
//!
//! [`StructWriter`] and [`StructReader`] provide the primitive encoding
//! used by every segment file: little-endian fixed-width integers,
//! variable-length integers, length-prefixed strings, and delta-compressed
//! u32 arrays for positions and document ids. Each file carries a trailing
//! CRC32 checksum over its whole payload, verified when the file is opened.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{LucernaError, Result};
use crate::storage::{StorageInput, StorageOutput};

/// A structured writer over a storage output.
pub struct StructWriter {
    output: Box<dyn StorageOutput>,
    hasher: crc32fast::Hasher,
}

impl StructWriter {
    /// Create a new structured writer.
    pub fn new(output: Box<dyn StorageOutput>) -> Self {
        StructWriter {
            output,
            hasher: crc32fast::Hasher::new(),
        }
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.output.write_all(bytes)?;
        self.hasher.update(bytes);
        Ok(())
    }

    /// Write a u8 value.
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_raw(&[value])
    }

    /// Write a u32 value (little-endian).
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_raw(&value.to_le_bytes())
    }

    /// Write a variable-length integer.
    ///
    /// Seven bits per byte with a continuation bit, as in protocol buffers.
    pub fn write_varint(&mut self, value: u64) -> Result<()> {
        let mut val = value;
        let mut buf = [0u8; 10];
        let mut len = 0;
        loop {
            let mut byte = (val & 0x7F) as u8;
            val >>= 7;
            if val != 0 {
                byte |= 0x80;
            }
            buf[len] = byte;
            len += 1;
            if val == 0 {
                break;
            }
        }
        self.write_raw(&buf[..len])
    }

    /// Write a string with a varint length prefix.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_bytes(value.as_bytes())
    }

    /// Write raw bytes with a varint length prefix.
    pub fn write_bytes(&mut self, value: &[u8]) -> Result<()> {
        self.write_varint(value.len() as u64)?;
        self.write_raw(value)
    }

    /// Write a u32 array using delta encoding.
    ///
    /// Values must be non-decreasing, which holds for sorted document ids
    /// and token positions.
    pub fn write_delta_u32s(&mut self, values: &[u32]) -> Result<()> {
        self.write_varint(values.len() as u64)?;
        let mut previous = 0u32;
        for &value in values {
            self.write_varint(u64::from(value.wrapping_sub(previous)))?;
            previous = value;
        }
        Ok(())
    }

    /// Write the trailing checksum and close the underlying output.
    pub fn close(mut self) -> Result<()> {
        let checksum = self.hasher.clone().finalize();
        self.output.write_u32::<LittleEndian>(checksum)?;
        self.output.flush()?;
        self.output.close()
    }
}

/// A structured reader over a storage input.
///
/// The whole file is read up front and its trailing checksum verified
/// before any field is decoded.
pub struct StructReader {
    data: Vec<u8>,
    position: usize,
}

impl StructReader {
    /// Read the input to the end, verify the trailing checksum, and return
    /// a reader over the payload.
    pub fn new(mut input: Box<dyn StorageInput>) -> Result<Self> {
        let mut data = Vec::new();
        input.read_to_end(&mut data)?;

        if data.len() < 4 {
            return Err(LucernaError::index("file too short for checksum"));
        }
        let payload_len = data.len() - 4;
        let stored = (&data[payload_len..]).read_u32::<LittleEndian>()?;
        let actual = crc32fast::hash(&data[..payload_len]);
        if stored != actual {
            return Err(LucernaError::index(format!(
                "checksum mismatch: stored {stored:#010x}, computed {actual:#010x}"
            )));
        }
        data.truncate(payload_len);

        Ok(StructReader { data, position: 0 })
    }

    fn take(&mut self, len: usize) -> Result<&[u8]> {
        if self.position + len > self.data.len() {
            return Err(LucernaError::index("unexpected end of file"));
        }
        let slice = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    /// Read a u8 value.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read a u32 value (little-endian).
    pub fn read_u32(&mut self) -> Result<u32> {
        let mut slice = self.take(4)?;
        Ok(slice.read_u32::<LittleEndian>()?)
    }

    /// Read a variable-length integer.
    pub fn read_varint(&mut self) -> Result<u64> {
        let mut result = 0u64;
        let mut shift = 0;
        loop {
            if shift >= 64 {
                return Err(LucernaError::index("varint overflow"));
            }
            let byte = self.read_u8()?;
            result |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
    }

    /// Read a length-prefixed string.
    pub fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_raw_bytes()?;
        String::from_utf8(bytes).map_err(|e| LucernaError::index(format!("invalid utf-8: {e}")))
    }

    /// Read length-prefixed raw bytes.
    pub fn read_raw_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.read_varint()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    /// Read a delta-encoded u32 array.
    pub fn read_delta_u32s(&mut self) -> Result<Vec<u32>> {
        let count = self.read_varint()? as usize;
        let mut values = Vec::with_capacity(count);
        let mut previous = 0u32;
        for _ in 0..count {
            let delta = self.read_varint()? as u32;
            previous = previous.wrapping_add(delta);
            values.push(previous);
        }
        Ok(values)
    }

    /// Check whether the payload is fully consumed.
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.data.len()
    }
}
