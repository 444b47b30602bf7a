use alloc::borrow::{Cow, ToOwned};
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::slice;

use endec_core::frames::{DecodeFrames, RecursiveDeserializer};
use endec_core::{DecodeFn, Deserializer, EndecError, Result, SelfDescribingDeserializer};
use endec_core::{HUMAN_READABLE, SerializationContext, Serializer, StructDecodeFn};
use endec_core::{MapDeserializer, SequenceDeserializer, StructDeserializer};
use serde_json::{Map, Value, map};

use crate::endec::replay;

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(expected: &'static str, found: &Value) -> EndecError {
    EndecError::mismatch(expected, kind(found))
}

fn exhausted() -> EndecError {
    EndecError::Unexpected(Cow::Borrowed("read past the last element"))
}

// -----------------------------------------------------------------------------
// JsonDeserializer

/// Decodes from a borrowed [`serde_json::Value`].
#[derive(Debug, Clone)]
pub struct JsonDeserializer<'de> {
    frames: DecodeFrames<&'de Value>,
}

impl<'de> JsonDeserializer<'de> {
    pub fn new(value: &'de Value) -> Self {
        Self {
            frames: DecodeFrames::new(value),
        }
    }

    fn integer<N: TryFrom<i64>>(&self, expected: &'static str) -> Result<N> {
        let value = self.value()?;
        let wide = value.as_i64().ok_or_else(|| mismatch(expected, value))?;
        N::try_from(wide).map_err(|_| EndecError::mismatch(expected, "out of range number"))
    }

    fn float(&self) -> Result<f64> {
        let value = self.value()?;
        value.as_f64().ok_or_else(|| mismatch("number", value))
    }
}

impl<'de> RecursiveDeserializer for JsonDeserializer<'de> {
    type Value = &'de Value;

    #[inline]
    fn frames(&mut self) -> &mut DecodeFrames<&'de Value> {
        &mut self.frames
    }

    #[inline]
    fn frames_ref(&self) -> &DecodeFrames<&'de Value> {
        &self.frames
    }
}

impl<'de> Deserializer for JsonDeserializer<'de> {
    fn setup_context(&self, ctx: SerializationContext) -> SerializationContext {
        ctx.with_attributes([HUMAN_READABLE.instance()])
    }

    fn read_i8(&mut self, _: &SerializationContext) -> Result<i8> {
        self.integer("byte")
    }

    fn read_i16(&mut self, _: &SerializationContext) -> Result<i16> {
        self.integer("short")
    }

    fn read_i32(&mut self, _: &SerializationContext) -> Result<i32> {
        self.integer("int")
    }

    fn read_i64(&mut self, _: &SerializationContext) -> Result<i64> {
        self.integer("long")
    }

    fn read_f32(&mut self, _: &SerializationContext) -> Result<f32> {
        Ok(self.float()? as f32)
    }

    fn read_f64(&mut self, _: &SerializationContext) -> Result<f64> {
        self.float()
    }

    fn read_var_i32(&mut self, _: &SerializationContext) -> Result<i32> {
        self.integer("int")
    }

    fn read_var_i64(&mut self, _: &SerializationContext) -> Result<i64> {
        self.integer("long")
    }

    fn read_bool(&mut self, _: &SerializationContext) -> Result<bool> {
        let value = self.value()?;
        value.as_bool().ok_or_else(|| mismatch("boolean", value))
    }

    fn read_string(&mut self, _: &SerializationContext) -> Result<String> {
        let value = self.value()?;
        value
            .as_str()
            .map(ToOwned::to_owned)
            .ok_or_else(|| mismatch("string", value))
    }

    fn read_bytes(&mut self, _: &SerializationContext) -> Result<Vec<u8>> {
        let value = self.value()?;
        let elements = value.as_array().ok_or_else(|| mismatch("array", value))?;
        elements
            .iter()
            .map(|element| {
                element
                    .as_u64()
                    .and_then(|byte| u8::try_from(byte).ok())
                    .ok_or_else(|| mismatch("byte", element))
            })
            .collect()
    }

    fn read_optional(&mut self, _: &SerializationContext, decode: DecodeFn<'_>) -> Result<bool> {
        if self.value()?.is_null() {
            return Ok(false);
        }
        decode(self)?;
        Ok(true)
    }

    fn sequence(
        &mut self,
        _: &SerializationContext,
    ) -> Result<Box<dyn SequenceDeserializer + '_>> {
        let value = self.value()?;
        let elements = value.as_array().ok_or_else(|| mismatch("array", value))?;
        Ok(Box::new(JsonSequence {
            deserializer: self,
            elements: elements.iter(),
        }))
    }

    fn map(&mut self, _: &SerializationContext) -> Result<Box<dyn MapDeserializer + '_>> {
        let value = self.value()?;
        let entries = value.as_object().ok_or_else(|| mismatch("object", value))?;
        Ok(Box::new(JsonMap {
            deserializer: self,
            entries: entries.iter(),
        }))
    }

    fn structure(&mut self) -> Result<Box<dyn StructDeserializer + '_>> {
        let value = self.value()?;
        let object = value.as_object().ok_or_else(|| mismatch("object", value))?;
        Ok(Box::new(JsonStruct {
            deserializer: self,
            object,
        }))
    }

    fn try_read(&mut self, reader: DecodeFn<'_>) -> Result<()> {
        self.try_read_frames(|deserializer| reader(deserializer))
    }

    fn as_self_describing(&mut self) -> Option<&mut dyn SelfDescribingDeserializer> {
        Some(self)
    }
}

impl SelfDescribingDeserializer for JsonDeserializer<'_> {
    fn read_any(&mut self, ctx: &SerializationContext, visitor: &mut dyn Serializer) -> Result<()> {
        replay(ctx, visitor, self.value()?)
    }
}

// -----------------------------------------------------------------------------
// Compound states

struct JsonSequence<'a, 'de> {
    deserializer: &'a mut JsonDeserializer<'de>,
    elements: slice::Iter<'de, Value>,
}

impl SequenceDeserializer for JsonSequence<'_, '_> {
    fn estimated_size(&self) -> usize {
        self.elements.len()
    }

    fn has_next(&self) -> bool {
        self.elements.len() > 0
    }

    fn next(&mut self, decode: DecodeFn<'_>) -> Result<()> {
        let element = self.elements.next().ok_or_else(exhausted)?;
        self.deserializer
            .frame(element, |deserializer| decode(deserializer))
    }
}

struct JsonMap<'a, 'de> {
    deserializer: &'a mut JsonDeserializer<'de>,
    entries: map::Iter<'de>,
}

impl MapDeserializer for JsonMap<'_, '_> {
    fn estimated_size(&self) -> usize {
        self.entries.len()
    }

    fn has_next(&self) -> bool {
        self.entries.len() > 0
    }

    fn next(&mut self, decode: DecodeFn<'_>) -> Result<String> {
        let (key, value) = self.entries.next().ok_or_else(exhausted)?;
        self.deserializer
            .frame(value, |deserializer| decode(deserializer))?;
        Ok(key.clone())
    }
}

struct JsonStruct<'a, 'de> {
    deserializer: &'a mut JsonDeserializer<'de>,
    object: &'de Map<String, Value>,
}

impl StructDeserializer for JsonStruct<'_, '_> {
    fn field(&mut self, name: &str, decode: DecodeFn<'_>) -> Result<bool> {
        match self.object.get(name) {
            None => Ok(false),
            Some(value) => {
                self.deserializer
                    .frame(value, |deserializer| decode(deserializer))?;
                Ok(true)
            }
        }
    }

    fn try_read(&mut self, reader: StructDecodeFn<'_>) -> Result<()> {
        let snapshot = self.deserializer.frames_ref().snapshot();
        let result = reader(self);
        if result.is_err() {
            self.deserializer.frames().restore(snapshot);
        }
        result
    }
}
