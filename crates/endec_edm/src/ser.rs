use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use endec_core::frames::{EncodeFrames, RecursiveSerializer};
use endec_core::{EncodeFn, EndecError, Result, ResultSerializer};
use endec_core::{MapSerializer, SequenceSerializer, StructSerializer};
use endec_core::{SelfDescribingSerializer, SerializationContext, Serializer};

use crate::EdmElement;

/// Encodes into an [`EdmElement`].
///
/// Var-ints are stored as plain `I32`/`I64`; structs and maps both become
/// map elements.
#[derive(Debug, Default)]
pub struct EdmSerializer {
    frames: EncodeFrames<EdmElement>,
}

impl EdmSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    fn leaf(&mut self, element: EdmElement) -> Result<()> {
        self.consume(element);
        Ok(())
    }
}

impl RecursiveSerializer for EdmSerializer {
    type Value = EdmElement;

    #[inline]
    fn frames(&mut self) -> &mut EncodeFrames<EdmElement> {
        &mut self.frames
    }
}

impl ResultSerializer for EdmSerializer {
    type Output = EdmElement;

    fn result(mut self) -> Result<EdmElement> {
        self.frames.take_result().ok_or(EndecError::NothingSerialized {
            name: "edm element".into(),
        })
    }
}

impl SelfDescribingSerializer for EdmSerializer {}

impl Serializer for EdmSerializer {
    fn write_i8(&mut self, _: &SerializationContext, value: i8) -> Result<()> {
        self.leaf(EdmElement::I8(value))
    }

    fn write_i16(&mut self, _: &SerializationContext, value: i16) -> Result<()> {
        self.leaf(EdmElement::I16(value))
    }

    fn write_i32(&mut self, _: &SerializationContext, value: i32) -> Result<()> {
        self.leaf(EdmElement::I32(value))
    }

    fn write_i64(&mut self, _: &SerializationContext, value: i64) -> Result<()> {
        self.leaf(EdmElement::I64(value))
    }

    fn write_f32(&mut self, _: &SerializationContext, value: f32) -> Result<()> {
        self.leaf(EdmElement::F32(value))
    }

    fn write_f64(&mut self, _: &SerializationContext, value: f64) -> Result<()> {
        self.leaf(EdmElement::F64(value))
    }

    fn write_var_i32(&mut self, _: &SerializationContext, value: i32) -> Result<()> {
        self.leaf(EdmElement::I32(value))
    }

    fn write_var_i64(&mut self, _: &SerializationContext, value: i64) -> Result<()> {
        self.leaf(EdmElement::I64(value))
    }

    fn write_bool(&mut self, _: &SerializationContext, value: bool) -> Result<()> {
        self.leaf(EdmElement::Bool(value))
    }

    fn write_str(&mut self, _: &SerializationContext, value: &str) -> Result<()> {
        self.leaf(EdmElement::String(value.to_owned()))
    }

    fn write_bytes(&mut self, _: &SerializationContext, value: &[u8]) -> Result<()> {
        self.leaf(EdmElement::Bytes(value.to_vec()))
    }

    fn write_optional(
        &mut self,
        _: &SerializationContext,
        value: Option<EncodeFn<'_>>,
    ) -> Result<()> {
        let inner = match value {
            Some(encode) => Some(Box::new(
                self.frame(|serializer| encode(serializer))?
                    .require("optional value")?,
            )),
            None => None,
        };
        self.leaf(EdmElement::Optional(inner))
    }

    fn sequence(
        &mut self,
        _: &SerializationContext,
        size: usize,
    ) -> Result<Box<dyn SequenceSerializer + '_>> {
        Ok(Box::new(EdmSequence {
            serializer: self,
            elements: Vec::with_capacity(size),
        }))
    }

    fn map(&mut self, _: &SerializationContext, _: usize) -> Result<Box<dyn MapSerializer + '_>> {
        Ok(Box::new(EdmEntries {
            serializer: self,
            entries: BTreeMap::new(),
        }))
    }

    fn structure(&mut self) -> Result<Box<dyn StructSerializer + '_>> {
        Ok(Box::new(EdmEntries {
            serializer: self,
            entries: BTreeMap::new(),
        }))
    }

    fn as_self_describing(&mut self) -> Option<&mut dyn SelfDescribingSerializer> {
        Some(self)
    }
}

// -----------------------------------------------------------------------------
// Compound states

struct EdmSequence<'a> {
    serializer: &'a mut EdmSerializer,
    elements: Vec<EdmElement>,
}

impl SequenceSerializer for EdmSequence<'_> {
    fn element(&mut self, encode: EncodeFn<'_>) -> Result<()> {
        let element = self
            .serializer
            .frame(|serializer| encode(serializer))?
            .require("sequence element")?;
        self.elements.push(element);
        Ok(())
    }

    fn end(self: Box<Self>) -> Result<()> {
        let Self {
            serializer,
            elements,
        } = *self;
        serializer.leaf(EdmElement::Sequence(elements))
    }
}

struct EdmEntries<'a> {
    serializer: &'a mut EdmSerializer,
    entries: BTreeMap<String, EdmElement>,
}

impl EdmEntries<'_> {
    fn insert(&mut self, key: &str, encode: EncodeFn<'_>, what: &'static str) -> Result<()> {
        let element = self
            .serializer
            .frame(|serializer| encode(serializer))?
            .require(what)?;
        self.entries.insert(key.to_owned(), element);
        Ok(())
    }

    fn finish(self) -> Result<()> {
        let Self {
            serializer,
            entries,
        } = self;
        serializer.leaf(EdmElement::Map(entries))
    }
}

impl MapSerializer for EdmEntries<'_> {
    fn entry(&mut self, key: &str, encode: EncodeFn<'_>) -> Result<()> {
        self.insert(key, encode, "map value")
    }

    fn end(self: Box<Self>) -> Result<()> {
        (*self).finish()
    }
}

impl StructSerializer for EdmEntries<'_> {
    fn field(&mut self, name: &str, _: bool, encode: EncodeFn<'_>) -> Result<()> {
        self.insert(name, encode, "struct field")
    }

    fn end(self: Box<Self>) -> Result<()> {
        (*self).finish()
    }
}
