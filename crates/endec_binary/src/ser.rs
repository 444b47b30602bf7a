use alloc::boxed::Box;
use alloc::vec::Vec;

use endec_core::{EncodeFn, EndecError, Result, ResultSerializer, SerializationContext};
use endec_core::{MapSerializer, SequenceSerializer, Serializer, StructSerializer};

use crate::varint;

/// Encodes into a byte buffer.
#[derive(Debug, Default, Clone)]
pub struct BinarySerializer {
    buf: Vec<u8>,
}

impl BinarySerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A serializer appending to `buf`.
    pub fn with_buffer(buf: Vec<u8>) -> Self {
        Self { buf }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn write_len(&mut self, len: usize) {
        varint::write_u64(&mut self.buf, len as u64);
    }
}

impl ResultSerializer for BinarySerializer {
    type Output = Vec<u8>;

    #[inline]
    fn result(self) -> Result<Vec<u8>> {
        Ok(self.buf)
    }
}

impl Serializer for BinarySerializer {
    fn write_i8(&mut self, _: &SerializationContext, value: i8) -> Result<()> {
        self.buf.push(value as u8);
        Ok(())
    }

    fn write_i16(&mut self, _: &SerializationContext, value: i16) -> Result<()> {
        self.buf.extend_from_slice(&value.to_be_bytes());
        Ok(())
    }

    fn write_i32(&mut self, _: &SerializationContext, value: i32) -> Result<()> {
        self.buf.extend_from_slice(&value.to_be_bytes());
        Ok(())
    }

    fn write_i64(&mut self, _: &SerializationContext, value: i64) -> Result<()> {
        self.buf.extend_from_slice(&value.to_be_bytes());
        Ok(())
    }

    fn write_f32(&mut self, _: &SerializationContext, value: f32) -> Result<()> {
        self.buf.extend_from_slice(&value.to_be_bytes());
        Ok(())
    }

    fn write_f64(&mut self, _: &SerializationContext, value: f64) -> Result<()> {
        self.buf.extend_from_slice(&value.to_be_bytes());
        Ok(())
    }

    fn write_var_i32(&mut self, _: &SerializationContext, value: i32) -> Result<()> {
        varint::write_u64(&mut self.buf, (value as u32).into());
        Ok(())
    }

    fn write_var_i64(&mut self, _: &SerializationContext, value: i64) -> Result<()> {
        varint::write_u64(&mut self.buf, value as u64);
        Ok(())
    }

    fn write_bool(&mut self, _: &SerializationContext, value: bool) -> Result<()> {
        self.buf.push(value.into());
        Ok(())
    }

    fn write_str(&mut self, ctx: &SerializationContext, value: &str) -> Result<()> {
        self.write_bytes(ctx, value.as_bytes())
    }

    fn write_bytes(&mut self, _: &SerializationContext, value: &[u8]) -> Result<()> {
        self.write_len(value.len());
        self.buf.extend_from_slice(value);
        Ok(())
    }

    fn write_optional(
        &mut self,
        ctx: &SerializationContext,
        value: Option<EncodeFn<'_>>,
    ) -> Result<()> {
        match value {
            Some(encode) => {
                self.write_bool(ctx, true)?;
                encode(self)
            }
            None => self.write_bool(ctx, false),
        }
    }

    fn sequence(
        &mut self,
        _: &SerializationContext,
        size: usize,
    ) -> Result<Box<dyn SequenceSerializer + '_>> {
        self.write_len(size);
        Ok(Box::new(Counted {
            serializer: self,
            declared: size,
            written: 0,
        }))
    }

    fn map(&mut self, _: &SerializationContext, size: usize) -> Result<Box<dyn MapSerializer + '_>> {
        self.write_len(size);
        Ok(Box::new(Counted {
            serializer: self,
            declared: size,
            written: 0,
        }))
    }

    fn structure(&mut self) -> Result<Box<dyn StructSerializer + '_>> {
        Ok(Box::new(Positional { serializer: self }))
    }
}

// -----------------------------------------------------------------------------
// Compound states

/// A sequence or map whose element count was written up front.
struct Counted<'a> {
    serializer: &'a mut BinarySerializer,
    declared: usize,
    written: usize,
}

impl Counted<'_> {
    fn check(&self) -> Result<()> {
        if self.written == self.declared {
            Ok(())
        } else {
            Err(EndecError::custom(alloc::format!(
                "declared {} elements but wrote {}",
                self.declared,
                self.written
            )))
        }
    }
}

impl SequenceSerializer for Counted<'_> {
    fn element(&mut self, encode: EncodeFn<'_>) -> Result<()> {
        self.written += 1;
        encode(&mut *self.serializer)
    }

    fn end(self: Box<Self>) -> Result<()> {
        self.check()
    }
}

impl MapSerializer for Counted<'_> {
    fn entry(&mut self, key: &str, encode: EncodeFn<'_>) -> Result<()> {
        self.written += 1;
        self.serializer.write_len(key.len());
        self.serializer.buf.extend_from_slice(key.as_bytes());
        encode(&mut *self.serializer)
    }

    fn end(self: Box<Self>) -> Result<()> {
        self.check()
    }
}

/// Struct fields in call order, without names.
struct Positional<'a> {
    serializer: &'a mut BinarySerializer,
}

impl StructSerializer for Positional<'_> {
    fn field(&mut self, _: &str, _: bool, encode: EncodeFn<'_>) -> Result<()> {
        encode(&mut *self.serializer)
    }

    fn end(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
