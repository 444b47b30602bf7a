use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use endec_core::{DecodeFn, Deserializer, EndecError, Result, SerializationContext};
use endec_core::{MapDeserializer, SequenceDeserializer, StructDecodeFn, StructDeserializer};

use crate::varint::{MAX_LEN_32, MAX_LEN_64};

fn truncated() -> EndecError {
    EndecError::Unexpected(Cow::Borrowed("unexpected end of input"))
}

fn varint_overflow() -> EndecError {
    EndecError::Unexpected(Cow::Borrowed("var-int does not fit its type"))
}

/// Decodes from a byte slice, keeping a cursor into it.
#[derive(Debug, Clone)]
pub struct BinaryDeserializer<'de> {
    input: &'de [u8],
    pos: usize,
}

impl<'de> BinaryDeserializer<'de> {
    pub fn new(input: &'de [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Number of bytes consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    /// Fails if any input is left unread.
    pub fn finish(&self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            left => Err(EndecError::Unexpected(Cow::Owned(alloc::format!(
                "{left} trailing bytes after the value"
            )))),
        }
    }

    fn take(&mut self, len: usize) -> Result<&'de [u8]> {
        let end = self.pos.checked_add(len).ok_or_else(truncated)?;
        let bytes = self.input.get(self.pos..end).ok_or_else(truncated)?;
        self.pos = end;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut array = [0; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }

    fn read_byte(&mut self) -> Result<u8> {
        let [byte] = self.take_array()?;
        Ok(byte)
    }

    fn read_varint(&mut self, max_len: usize) -> Result<u64> {
        let mut value = 0u64;
        for index in 0..max_len {
            let byte = self.read_byte()?;
            let group = u64::from(byte & 0x7F);
            let shift = 7 * index as u32;
            if (group << shift) >> shift != group {
                return Err(varint_overflow());
            }
            value |= group << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(EndecError::Unexpected(Cow::Borrowed("var-int is too long")))
    }

    fn read_len(&mut self) -> Result<usize> {
        let len = self.read_varint(MAX_LEN_64)?;
        usize::try_from(len).map_err(|_| truncated())
    }

    fn read_utf8(&mut self) -> Result<String> {
        let len = self.read_len()?;
        let bytes = self.take(len)?;
        core::str::from_utf8(bytes)
            .map(String::from)
            .map_err(|_| EndecError::Unexpected(Cow::Borrowed("string is not valid UTF-8")))
    }

    fn read_presence(&mut self, what: &'static str) -> Result<bool> {
        match self.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(EndecError::mismatch(
                what,
                alloc::format!("byte {other}"),
            )),
        }
    }
}

impl Deserializer for BinaryDeserializer<'_> {
    fn read_i8(&mut self, _: &SerializationContext) -> Result<i8> {
        Ok(self.read_byte()? as i8)
    }

    fn read_i16(&mut self, _: &SerializationContext) -> Result<i16> {
        self.take_array().map(i16::from_be_bytes)
    }

    fn read_i32(&mut self, _: &SerializationContext) -> Result<i32> {
        self.take_array().map(i32::from_be_bytes)
    }

    fn read_i64(&mut self, _: &SerializationContext) -> Result<i64> {
        self.take_array().map(i64::from_be_bytes)
    }

    fn read_f32(&mut self, _: &SerializationContext) -> Result<f32> {
        self.take_array().map(f32::from_be_bytes)
    }

    fn read_f64(&mut self, _: &SerializationContext) -> Result<f64> {
        self.take_array().map(f64::from_be_bytes)
    }

    fn read_var_i32(&mut self, _: &SerializationContext) -> Result<i32> {
        let value = self.read_varint(MAX_LEN_32)?;
        let bits = u32::try_from(value).map_err(|_| varint_overflow())?;
        Ok(bits as i32)
    }

    fn read_var_i64(&mut self, _: &SerializationContext) -> Result<i64> {
        Ok(self.read_varint(MAX_LEN_64)? as i64)
    }

    fn read_bool(&mut self, _: &SerializationContext) -> Result<bool> {
        self.read_presence("boolean")
    }

    fn read_string(&mut self, _: &SerializationContext) -> Result<String> {
        self.read_utf8()
    }

    fn read_bytes(&mut self, _: &SerializationContext) -> Result<Vec<u8>> {
        let len = self.read_len()?;
        self.take(len).map(<[u8]>::to_vec)
    }

    fn read_optional(&mut self, _: &SerializationContext, decode: DecodeFn<'_>) -> Result<bool> {
        if !self.read_presence("optional marker")? {
            return Ok(false);
        }
        decode(self)?;
        Ok(true)
    }

    fn sequence(
        &mut self,
        _: &SerializationContext,
    ) -> Result<Box<dyn SequenceDeserializer + '_>> {
        let remaining = self.read_len()?;
        Ok(Box::new(Counted {
            deserializer: self,
            remaining,
        }))
    }

    fn map(&mut self, _: &SerializationContext) -> Result<Box<dyn MapDeserializer + '_>> {
        let remaining = self.read_len()?;
        Ok(Box::new(Counted {
            deserializer: self,
            remaining,
        }))
    }

    fn structure(&mut self) -> Result<Box<dyn StructDeserializer + '_>> {
        Ok(Box::new(Positional { deserializer: self }))
    }

    fn try_read(&mut self, reader: DecodeFn<'_>) -> Result<()> {
        let start = self.pos;
        let result = reader(self);
        if let Err(err) = &result {
            log::trace!("rewinding from {} to {start} after failed read: {err}", self.pos);
            self.pos = start;
        }
        result
    }
}

// -----------------------------------------------------------------------------
// Compound states

struct Counted<'a, 'de> {
    deserializer: &'a mut BinaryDeserializer<'de>,
    remaining: usize,
}

impl Counted<'_, '_> {
    fn advance(&mut self) -> Result<()> {
        self.remaining = self
            .remaining
            .checked_sub(1)
            .ok_or(EndecError::Unexpected(Cow::Borrowed("read past the last element")))?;
        Ok(())
    }
}

impl SequenceDeserializer for Counted<'_, '_> {
    fn estimated_size(&self) -> usize {
        self.remaining
    }

    fn has_next(&self) -> bool {
        self.remaining > 0
    }

    fn next(&mut self, decode: DecodeFn<'_>) -> Result<()> {
        self.advance()?;
        decode(&mut *self.deserializer)
    }
}

impl MapDeserializer for Counted<'_, '_> {
    fn estimated_size(&self) -> usize {
        self.remaining
    }

    fn has_next(&self) -> bool {
        self.remaining > 0
    }

    fn next(&mut self, decode: DecodeFn<'_>) -> Result<String> {
        self.advance()?;
        let key = self.deserializer.read_utf8()?;
        decode(&mut *self.deserializer)?;
        Ok(key)
    }
}

/// Every field is present, in the order it is asked for.
struct Positional<'a, 'de> {
    deserializer: &'a mut BinaryDeserializer<'de>,
}

impl StructDeserializer for Positional<'_, '_> {
    fn field(&mut self, _: &str, decode: DecodeFn<'_>) -> Result<bool> {
        decode(&mut *self.deserializer)?;
        Ok(true)
    }

    fn try_read(&mut self, reader: StructDecodeFn<'_>) -> Result<()> {
        let start = self.deserializer.pos;
        let result = reader(self);
        if let Err(err) = &result {
            log::trace!("rewinding struct read to {start}: {err}");
            self.deserializer.pos = start;
        }
        result
    }
}
