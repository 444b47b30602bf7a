use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use endec_core::frames::{EncodeFrames, RecursiveSerializer};
use endec_core::{EncodeFn, EndecError, HUMAN_READABLE, Result, ResultSerializer};
use endec_core::{MapSerializer, SequenceSerializer, StructSerializer};
use endec_core::{SelfDescribingSerializer, SerializationContext, Serializer};
use serde_json::{Map, Value};

/// JSON numbers have no NaN or infinities.
fn non_finite(value: f64) -> EndecError {
    EndecError::Unexpected(format!("{value} has no JSON representation").into())
}

// -----------------------------------------------------------------------------
// JsonSerializer

/// Encodes into a [`serde_json::Value`].
#[derive(Debug, Default)]
pub struct JsonSerializer {
    frames: EncodeFrames<Value>,
    prefix: Option<Value>,
}

impl JsonSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A serializer whose top-level array or object extends `prefix`.
    ///
    /// Ignored if the encoded value is not of the same kind.
    pub fn with_prefix(prefix: Value) -> Self {
        Self {
            frames: EncodeFrames::new(),
            prefix: Some(prefix),
        }
    }

    fn leaf(&mut self, value: Value) -> Result<()> {
        self.consume(value);
        Ok(())
    }

    fn take_prefix(&mut self) -> Option<Value> {
        if self.frames.depth() == 0 {
            self.prefix.take()
        } else {
            None
        }
    }
}

impl RecursiveSerializer for JsonSerializer {
    type Value = Value;

    #[inline]
    fn frames(&mut self) -> &mut EncodeFrames<Value> {
        &mut self.frames
    }
}

impl ResultSerializer for JsonSerializer {
    type Output = Value;

    fn result(mut self) -> Result<Value> {
        self.frames.take_result().ok_or(EndecError::NothingSerialized {
            name: "json value".into(),
        })
    }
}

impl SelfDescribingSerializer for JsonSerializer {}

impl Serializer for JsonSerializer {
    fn setup_context(&self, ctx: SerializationContext) -> SerializationContext {
        ctx.with_attributes([HUMAN_READABLE.instance()])
    }

    fn write_i8(&mut self, _: &SerializationContext, value: i8) -> Result<()> {
        self.leaf(value.into())
    }

    fn write_i16(&mut self, _: &SerializationContext, value: i16) -> Result<()> {
        self.leaf(value.into())
    }

    fn write_i32(&mut self, _: &SerializationContext, value: i32) -> Result<()> {
        self.leaf(value.into())
    }

    fn write_i64(&mut self, _: &SerializationContext, value: i64) -> Result<()> {
        self.leaf(value.into())
    }

    fn write_f32(&mut self, _: &SerializationContext, value: f32) -> Result<()> {
        if !value.is_finite() {
            return Err(non_finite(value.into()));
        }
        self.leaf(value.into())
    }

    fn write_f64(&mut self, _: &SerializationContext, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(non_finite(value.into()));
        }
        self.leaf(value.into())
    }

    fn write_var_i32(&mut self, _: &SerializationContext, value: i32) -> Result<()> {
        self.leaf(value.into())
    }

    fn write_var_i64(&mut self, _: &SerializationContext, value: i64) -> Result<()> {
        self.leaf(value.into())
    }

    fn write_bool(&mut self, _: &SerializationContext, value: bool) -> Result<()> {
        self.leaf(value.into())
    }

    fn write_str(&mut self, _: &SerializationContext, value: &str) -> Result<()> {
        self.leaf(value.into())
    }

    fn write_bytes(&mut self, _: &SerializationContext, value: &[u8]) -> Result<()> {
        self.leaf(Value::Array(value.iter().map(|&byte| byte.into()).collect()))
    }

    fn write_optional(
        &mut self,
        _: &SerializationContext,
        value: Option<EncodeFn<'_>>,
    ) -> Result<()> {
        match value {
            Some(encode) => encode(self),
            None => self.leaf(Value::Null),
        }
    }

    fn sequence(
        &mut self,
        _: &SerializationContext,
        size: usize,
    ) -> Result<Box<dyn SequenceSerializer + '_>> {
        let items = match self.take_prefix() {
            Some(Value::Array(items)) => items,
            _ => Vec::with_capacity(size),
        };
        Ok(Box::new(JsonSequence {
            serializer: self,
            items,
        }))
    }

    fn map(&mut self, _: &SerializationContext, _: usize) -> Result<Box<dyn MapSerializer + '_>> {
        Ok(Box::new(self.object()))
    }

    fn structure(&mut self) -> Result<Box<dyn StructSerializer + '_>> {
        Ok(Box::new(self.object()))
    }

    fn as_self_describing(&mut self) -> Option<&mut dyn SelfDescribingSerializer> {
        Some(self)
    }
}

impl JsonSerializer {
    fn object(&mut self) -> JsonObject<'_> {
        let entries = match self.take_prefix() {
            Some(Value::Object(entries)) => entries,
            _ => Map::new(),
        };
        JsonObject {
            serializer: self,
            entries,
        }
    }
}

// -----------------------------------------------------------------------------
// Compound states

struct JsonSequence<'a> {
    serializer: &'a mut JsonSerializer,
    items: Vec<Value>,
}

impl SequenceSerializer for JsonSequence<'_> {
    fn element(&mut self, encode: EncodeFn<'_>) -> Result<()> {
        let value = self
            .serializer
            .frame(|serializer| encode(serializer))?
            .require("sequence element")?;
        self.items.push(value);
        Ok(())
    }

    fn end(self: Box<Self>) -> Result<()> {
        let Self { serializer, items } = *self;
        serializer.leaf(Value::Array(items))
    }
}

/// Shared by maps and structs.
struct JsonObject<'a> {
    serializer: &'a mut JsonSerializer,
    entries: Map<String, Value>,
}

impl JsonObject<'_> {
    fn encode_entry(&mut self, encode: EncodeFn<'_>, what: &'static str) -> Result<Value> {
        self.serializer
            .frame(|serializer| encode(serializer))?
            .require(what)
    }

    fn finish(self) -> Result<()> {
        let Self {
            serializer,
            entries,
        } = self;
        serializer.leaf(Value::Object(entries))
    }
}

impl MapSerializer for JsonObject<'_> {
    fn entry(&mut self, key: &str, encode: EncodeFn<'_>) -> Result<()> {
        let value = self.encode_entry(encode, "map value")?;
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }

    fn end(self: Box<Self>) -> Result<()> {
        (*self).finish()
    }
}

impl StructSerializer for JsonObject<'_> {
    fn field(&mut self, name: &str, may_omit: bool, encode: EncodeFn<'_>) -> Result<()> {
        let value = self.encode_entry(encode, "struct field")?;
        if may_omit && value.is_null() {
            return Ok(());
        }
        self.entries.insert(name.to_owned(), value);
        Ok(())
    }

    fn end(self: Box<Self>) -> Result<()> {
        (*self).finish()
    }
}
