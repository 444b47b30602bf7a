use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::collections::{BTreeMap, btree_map};
use alloc::string::String;
use alloc::vec::Vec;
use core::slice;

use endec_core::frames::{DecodeFrames, RecursiveDeserializer};
use endec_core::{DecodeFn, Deserializer, EndecError, Result, SelfDescribingDeserializer};
use endec_core::{MapDeserializer, SequenceDeserializer, StructDeserializer};
use endec_core::{SerializationContext, Serializer, StructDecodeFn};

use crate::endec::replay;
use crate::{EdmElement, EdmKind};

fn mismatch(expected: EdmKind, found: &EdmElement) -> EndecError {
    EndecError::mismatch(expected.name(), found.kind().name())
}

fn exhausted() -> EndecError {
    EndecError::Unexpected(Cow::Borrowed("read past the last element"))
}

/// Decodes from a borrowed [`EdmElement`].
///
/// Reads are strict: every primitive read must meet an element of exactly
/// the kind [`EdmSerializer`](crate::EdmSerializer) writes for it.
#[derive(Debug, Clone)]
pub struct EdmDeserializer<'de> {
    frames: DecodeFrames<&'de EdmElement>,
}

impl<'de> EdmDeserializer<'de> {
    pub fn new(element: &'de EdmElement) -> Self {
        Self {
            frames: DecodeFrames::new(element),
        }
    }

    fn read<T>(
        &self,
        expected: EdmKind,
        extract: impl FnOnce(&'de EdmElement) -> Option<T>,
    ) -> Result<T> {
        let element = self.value()?;
        extract(element).ok_or_else(|| mismatch(expected, element))
    }
}

impl<'de> RecursiveDeserializer for EdmDeserializer<'de> {
    type Value = &'de EdmElement;

    #[inline]
    fn frames(&mut self) -> &mut DecodeFrames<&'de EdmElement> {
        &mut self.frames
    }

    #[inline]
    fn frames_ref(&self) -> &DecodeFrames<&'de EdmElement> {
        &self.frames
    }
}

impl<'de> Deserializer for EdmDeserializer<'de> {
    fn read_i8(&mut self, _: &SerializationContext) -> Result<i8> {
        self.read(EdmKind::I8, EdmElement::as_i8)
    }

    fn read_i16(&mut self, _: &SerializationContext) -> Result<i16> {
        self.read(EdmKind::I16, EdmElement::as_i16)
    }

    fn read_i32(&mut self, _: &SerializationContext) -> Result<i32> {
        self.read(EdmKind::I32, EdmElement::as_i32)
    }

    fn read_i64(&mut self, _: &SerializationContext) -> Result<i64> {
        self.read(EdmKind::I64, EdmElement::as_i64)
    }

    fn read_f32(&mut self, _: &SerializationContext) -> Result<f32> {
        self.read(EdmKind::F32, EdmElement::as_f32)
    }

    fn read_f64(&mut self, _: &SerializationContext) -> Result<f64> {
        self.read(EdmKind::F64, EdmElement::as_f64)
    }

    fn read_var_i32(&mut self, _: &SerializationContext) -> Result<i32> {
        self.read(EdmKind::I32, EdmElement::as_i32)
    }

    fn read_var_i64(&mut self, _: &SerializationContext) -> Result<i64> {
        self.read(EdmKind::I64, EdmElement::as_i64)
    }

    fn read_bool(&mut self, _: &SerializationContext) -> Result<bool> {
        self.read(EdmKind::Bool, EdmElement::as_bool)
    }

    fn read_string(&mut self, _: &SerializationContext) -> Result<String> {
        self.read(EdmKind::String, |element| element.as_str().map(String::from))
    }

    fn read_bytes(&mut self, _: &SerializationContext) -> Result<Vec<u8>> {
        self.read(EdmKind::Bytes, |element| element.as_bytes().map(<[u8]>::to_vec))
    }

    fn read_optional(&mut self, _: &SerializationContext, decode: DecodeFn<'_>) -> Result<bool> {
        match self.read(EdmKind::Optional, EdmElement::as_optional)? {
            None => Ok(false),
            Some(inner) => {
                self.frame(inner, |deserializer| decode(deserializer))?;
                Ok(true)
            }
        }
    }

    fn sequence(
        &mut self,
        _: &SerializationContext,
    ) -> Result<Box<dyn SequenceDeserializer + '_>> {
        let elements = self.read(EdmKind::Sequence, EdmElement::as_sequence)?;
        Ok(Box::new(EdmSequence {
            deserializer: self,
            elements: elements.iter(),
        }))
    }

    fn map(&mut self, _: &SerializationContext) -> Result<Box<dyn MapDeserializer + '_>> {
        let entries = self.read(EdmKind::Map, EdmElement::as_map)?;
        Ok(Box::new(EdmMapEntries {
            deserializer: self,
            entries: entries.iter(),
        }))
    }

    fn structure(&mut self) -> Result<Box<dyn StructDeserializer + '_>> {
        let fields = self.read(EdmKind::Map, EdmElement::as_map)?;
        Ok(Box::new(EdmStruct {
            deserializer: self,
            fields,
        }))
    }

    fn try_read(&mut self, reader: DecodeFn<'_>) -> Result<()> {
        self.try_read_frames(|deserializer| reader(deserializer))
    }

    fn as_self_describing(&mut self) -> Option<&mut dyn SelfDescribingDeserializer> {
        Some(self)
    }
}

impl SelfDescribingDeserializer for EdmDeserializer<'_> {
    fn read_any(&mut self, ctx: &SerializationContext, visitor: &mut dyn Serializer) -> Result<()> {
        replay(ctx, visitor, self.value()?)
    }
}

// -----------------------------------------------------------------------------
// Compound states

struct EdmSequence<'a, 'de> {
    deserializer: &'a mut EdmDeserializer<'de>,
    elements: slice::Iter<'de, EdmElement>,
}

impl SequenceDeserializer for EdmSequence<'_, '_> {
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

struct EdmMapEntries<'a, 'de> {
    deserializer: &'a mut EdmDeserializer<'de>,
    entries: btree_map::Iter<'de, String, EdmElement>,
}

impl MapDeserializer for EdmMapEntries<'_, '_> {
    fn estimated_size(&self) -> usize {
        self.entries.len()
    }

    fn has_next(&self) -> bool {
        self.entries.len() > 0
    }

    fn next(&mut self, decode: DecodeFn<'_>) -> Result<String> {
        let (key, element) = self.entries.next().ok_or_else(exhausted)?;
        self.deserializer
            .frame(element, |deserializer| decode(deserializer))?;
        Ok(key.clone())
    }
}

struct EdmStruct<'a, 'de> {
    deserializer: &'a mut EdmDeserializer<'de>,
    fields: &'de BTreeMap<String, EdmElement>,
}

impl StructDeserializer for EdmStruct<'_, '_> {
    fn field(&mut self, name: &str, decode: DecodeFn<'_>) -> Result<bool> {
        let Some(element) = self.fields.get(name) else {
            return Ok(false);
        };
        self.deserializer
            .frame(element, |deserializer| decode(deserializer))?;
        Ok(true)
    }

    fn try_read(&mut self, reader: StructDecodeFn<'_>) -> Result<()> {
        let snapshot = self.deserializer.frames_ref().snapshot();
        let result = reader(self);
        if let Err(err) = &result {
            log::trace!("rolling back struct read: {err}");
            self.deserializer.frames().restore(snapshot);
        }
        result
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use endec_core::{EndecError, EndecExt, INT, LONG, STRING};

    use super::EdmDeserializer;
    use crate::{EdmElement, EdmSerializer};

    #[test]
    fn reads_are_strict() {
        let element = EdmElement::I64(5);
        let err = INT.decode_fully(EdmDeserializer::new, &element).unwrap_err();
        assert_eq!(err, EndecError::mismatch("i32", "i64"));
        assert_eq!(LONG.decode_fully(EdmDeserializer::new, &element).unwrap(), 5);
    }

    #[test]
    fn optionals_wrap_their_value() {
        let endec = STRING.optional_of();
        let some = endec
            .encode_fully(EdmSerializer::new, &Some("x".into()))
            .unwrap();
        assert_eq!(some, EdmElement::some(EdmElement::String("x".into())));
        assert_eq!(
            endec.encode_fully(EdmSerializer::new, &None).unwrap(),
            EdmElement::EMPTY
        );

        // A bare string is not an optional.
        let err = endec
            .decode_fully(EdmDeserializer::new, &EdmElement::String("x".into()))
            .unwrap_err();
        assert!(matches!(err, EndecError::TypeMismatch { .. }));
    }
}
