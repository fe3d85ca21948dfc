//! Big-endian primitive streams.

use std::io::{Read, Write};

use super::PersistError;

/// Writes big-endian primitives to any byte sink.
pub struct DataWriter<'a> {
    out: &'a mut dyn Write,
}

impl<'a> DataWriter<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        Self { out }
    }

    pub fn write_short(&mut self, value: i16) -> Result<(), PersistError> {
        Ok(self.out.write_all(&value.to_be_bytes())?)
    }

    pub fn write_int(&mut self, value: i32) -> Result<(), PersistError> {
        Ok(self.out.write_all(&value.to_be_bytes())?)
    }

    pub fn write_double(&mut self, value: f64) -> Result<(), PersistError> {
        Ok(self.out.write_all(&value.to_be_bytes())?)
    }

    pub fn write_float(&mut self, value: f32) -> Result<(), PersistError> {
        Ok(self.out.write_all(&value.to_be_bytes())?)
    }

    pub fn write_bool(&mut self, value: bool) -> Result<(), PersistError> {
        Ok(self.out.write_all(&[u8::from(value)])?)
    }

    /// Writes a `u16` byte length followed by the UTF-8 bytes.
    pub fn write_utf(&mut self, value: &str) -> Result<(), PersistError> {
        let len = u16::try_from(value.len())
            .map_err(|_| PersistError::corrupt("string", "longer than 65535 bytes"))?;
        self.out.write_all(&len.to_be_bytes())?;
        Ok(self.out.write_all(value.as_bytes())?)
    }

    /// Writes a collection length as an `int`.
    pub fn write_len(&mut self, len: usize) -> Result<(), PersistError> {
        let len = i32::try_from(len)
            .map_err(|_| PersistError::corrupt("length", format!("{len} does not fit in an int")))?;
        self.write_int(len)
    }
}

/// Reads big-endian primitives from any byte source.
pub struct DataReader<'a> {
    input: &'a mut dyn Read,
}

impl<'a> DataReader<'a> {
    pub fn new(input: &'a mut dyn Read) -> Self {
        Self { input }
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], PersistError> {
        let mut buf = [0u8; N];
        self.input.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_short(&mut self) -> Result<i16, PersistError> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    pub fn read_int(&mut self) -> Result<i32, PersistError> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    pub fn read_double(&mut self) -> Result<f64, PersistError> {
        Ok(f64::from_be_bytes(self.read_array()?))
    }

    pub fn read_float(&mut self) -> Result<f32, PersistError> {
        Ok(f32::from_be_bytes(self.read_array()?))
    }

    pub fn read_bool(&mut self) -> Result<bool, PersistError> {
        let [b] = self.read_array::<1>()?;
        Ok(b != 0)
    }

    pub fn read_utf(&mut self) -> Result<String, PersistError> {
        let len = u16::from_be_bytes(self.read_array()?) as usize;
        let mut buf = vec![0u8; len];
        self.input.read_exact(&mut buf)?;
        String::from_utf8(buf).map_err(|e| PersistError::corrupt("string", e.to_string()))
    }

    /// Reads a non-negative `int` length.
    pub fn read_len(&mut self, kind: &'static str) -> Result<usize, PersistError> {
        let len = self.read_int()?;
        usize::try_from(len).map_err(|_| PersistError::corrupt(kind, format!("negative length {len}")))
    }

    pub fn read_doubles(&mut self, count: usize) -> Result<Vec<f64>, PersistError> {
        (0..count).map(|_| self.read_double()).collect()
    }
}
