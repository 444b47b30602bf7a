use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;

use endec_core::{Deserializer, DynEndec, Endec, EndecError, Result, ResultSerializer};
use endec_core::{SerializationContext, Serializer};
use endec_core::{dispatched, for_enum};

use crate::{EdmElement, EdmKind, EdmSerializer};

/// Writes `element` into `visitor`.
///
/// Unsigned kinds widen into the next signed write: `U8` as `i16`, `U16` as
/// `i32`, `U32` as `i64`. `U64` values above `i64::MAX` fail.
pub(crate) fn replay(
    ctx: &SerializationContext,
    visitor: &mut dyn Serializer,
    element: &EdmElement,
) -> Result<()> {
    match element {
        EdmElement::I8(v) => visitor.write_i8(ctx, *v),
        EdmElement::U8(v) => visitor.write_i16(ctx, (*v).into()),
        EdmElement::I16(v) => visitor.write_i16(ctx, *v),
        EdmElement::U16(v) => visitor.write_i32(ctx, (*v).into()),
        EdmElement::I32(v) => visitor.write_i32(ctx, *v),
        EdmElement::U32(v) => visitor.write_i64(ctx, (*v).into()),
        EdmElement::I64(v) => visitor.write_i64(ctx, *v),
        EdmElement::U64(v) => {
            let v = i64::try_from(*v).map_err(|_| {
                EndecError::Unexpected(Cow::Borrowed("u64 element exceeds the signed 64-bit range"))
            })?;
            visitor.write_i64(ctx, v)
        }
        EdmElement::F32(v) => visitor.write_f32(ctx, *v),
        EdmElement::F64(v) => visitor.write_f64(ctx, *v),
        EdmElement::Bool(v) => visitor.write_bool(ctx, *v),
        EdmElement::String(v) => visitor.write_str(ctx, v),
        EdmElement::Bytes(v) => visitor.write_bytes(ctx, v),
        EdmElement::Optional(None) => visitor.write_optional(ctx, None),
        EdmElement::Optional(Some(inner)) => visitor.write_optional(
            ctx,
            Some(&mut |visitor: &mut dyn Serializer| replay(ctx, visitor, inner)),
        ),
        EdmElement::Sequence(elements) => {
            let mut sequence = visitor.sequence(ctx, elements.len())?;
            for element in elements {
                sequence.element(&mut |visitor: &mut dyn Serializer| replay(ctx, visitor, element))?;
            }
            sequence.end()
        }
        EdmElement::Map(entries) => {
            let mut map = visitor.map(ctx, entries.len())?;
            for (key, entry) in entries {
                map.entry(key, &mut |visitor: &mut dyn Serializer| replay(ctx, visitor, entry))?;
            }
            map.end()
        }
    }
}

// -----------------------------------------------------------------------------
// EdmEndec

/// Any [`EdmElement`] as a value of any format.
///
/// Self-describing formats receive the element's shape directly. Other
/// formats get a struct with the element kind in field `variant` and the
/// payload in field `instance`, which round-trips every element exactly.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdmEndec;

/// The [`EdmEndec`] instance.
pub const EDM: EdmEndec = EdmEndec;

/// The kind-tagged form used by formats that are not self-describing.
fn tagged() -> impl Endec<EdmElement> {
    dispatched(
        |kind: &EdmKind| Some(Arc::new(Payload(*kind)) as DynEndec<EdmElement>),
        EdmElement::kind,
        for_enum(EdmKind::ALL),
    )
}

impl Endec<EdmElement> for EdmEndec {
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &EdmElement,
    ) -> Result<()> {
        if let Some(visitor) = serializer.as_self_describing() {
            return replay(ctx, visitor, value);
        }
        tagged().encode(ctx, serializer, value)
    }

    fn decode(
        &self,
        ctx: &SerializationContext,
        deserializer: &mut dyn Deserializer,
    ) -> Result<EdmElement> {
        if let Some(source) = deserializer.as_self_describing() {
            let mut edm = EdmSerializer::new();
            source.read_any(ctx, &mut edm)?;
            return edm.result();
        }
        tagged().decode(ctx, deserializer)
    }
}

/// The payload of one element kind. Unsigned values keep their bits in the
/// signed write of the same width.
struct Payload(EdmKind);

impl Endec<EdmElement> for Payload {
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &EdmElement,
    ) -> Result<()> {
        match value {
            EdmElement::I8(v) => serializer.write_i8(ctx, *v),
            EdmElement::U8(v) => serializer.write_i8(ctx, *v as i8),
            EdmElement::I16(v) => serializer.write_i16(ctx, *v),
            EdmElement::U16(v) => serializer.write_i16(ctx, *v as i16),
            EdmElement::I32(v) => serializer.write_i32(ctx, *v),
            EdmElement::U32(v) => serializer.write_i32(ctx, *v as i32),
            EdmElement::I64(v) => serializer.write_i64(ctx, *v),
            EdmElement::U64(v) => serializer.write_i64(ctx, *v as i64),
            EdmElement::F32(v) => serializer.write_f32(ctx, *v),
            EdmElement::F64(v) => serializer.write_f64(ctx, *v),
            EdmElement::Bool(v) => serializer.write_bool(ctx, *v),
            EdmElement::String(v) => serializer.write_str(ctx, v),
            EdmElement::Bytes(v) => serializer.write_bytes(ctx, v),
            EdmElement::Optional(inner) => {
                serializer.write_optional_value(ctx, &EDM, inner.as_deref())
            }
            EdmElement::Sequence(elements) => {
                let mut sequence = serializer.sequence(ctx, elements.len())?;
                for element in elements {
                    sequence.element_value(ctx, &EDM, element)?;
                }
                sequence.end()
            }
            EdmElement::Map(entries) => {
                let mut map = serializer.map(ctx, entries.len())?;
                for (key, entry) in entries {
                    map.entry_value(ctx, key, &EDM, entry)?;
                }
                map.end()
            }
        }
    }

    fn decode(
        &self,
        ctx: &SerializationContext,
        deserializer: &mut dyn Deserializer,
    ) -> Result<EdmElement> {
        Ok(match self.0 {
            EdmKind::I8 => EdmElement::I8(deserializer.read_i8(ctx)?),
            EdmKind::U8 => EdmElement::U8(deserializer.read_i8(ctx)? as u8),
            EdmKind::I16 => EdmElement::I16(deserializer.read_i16(ctx)?),
            EdmKind::U16 => EdmElement::U16(deserializer.read_i16(ctx)? as u16),
            EdmKind::I32 => EdmElement::I32(deserializer.read_i32(ctx)?),
            EdmKind::U32 => EdmElement::U32(deserializer.read_i32(ctx)? as u32),
            EdmKind::I64 => EdmElement::I64(deserializer.read_i64(ctx)?),
            EdmKind::U64 => EdmElement::U64(deserializer.read_i64(ctx)? as u64),
            EdmKind::F32 => EdmElement::F32(deserializer.read_f32(ctx)?),
            EdmKind::F64 => EdmElement::F64(deserializer.read_f64(ctx)?),
            EdmKind::Bool => EdmElement::Bool(deserializer.read_bool(ctx)?),
            EdmKind::String => EdmElement::String(deserializer.read_string(ctx)?),
            EdmKind::Bytes => EdmElement::Bytes(deserializer.read_bytes(ctx)?),
            EdmKind::Optional => {
                EdmElement::Optional(deserializer.read_optional_value(ctx, &EDM)?.map(Box::new))
            }
            EdmKind::Sequence => {
                let mut sequence = deserializer.sequence(ctx)?;
                let mut elements = Vec::new();
                while sequence.has_next() {
                    elements.push(sequence.next_value(ctx, &EDM)?);
                }
                EdmElement::Sequence(elements)
            }
            EdmKind::Map => {
                let mut map = deserializer.map(ctx)?;
                let mut entries = BTreeMap::new();
                while map.has_next() {
                    let (key, entry) = map.next_entry(ctx, &EDM)?;
                    entries.insert(key, entry);
                }
                EdmElement::Map(entries)
            }
        })
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::ToString;
    use alloc::vec;

    use endec_binary::{BinaryDeserializer, BinarySerializer};
    use endec_core::EndecExt;

    use super::EDM;
    use crate::{EdmDeserializer, EdmElement, EdmSerializer};

    fn sample() -> EdmElement {
        let mut entries = BTreeMap::new();
        entries.insert("flag".to_string(), EdmElement::Bool(true));
        entries.insert("bytes".to_string(), EdmElement::Bytes(vec![0, 200]));
        entries.insert(
            "numbers".to_string(),
            EdmElement::Sequence(vec![
                EdmElement::U8(250),
                EdmElement::I16(-3),
                EdmElement::U32(u32::MAX),
                EdmElement::U64(u64::MAX),
                EdmElement::F32(1.5),
            ]),
        );
        entries.insert("maybe".to_string(), EdmElement::some(EdmElement::EMPTY));
        EdmElement::Map(entries)
    }

    #[test]
    fn tagged_form_is_exact() {
        let element = sample();
        let bytes = EDM.encode_fully(BinarySerializer::new, &element).unwrap();
        let back = EDM.decode_fully(BinaryDeserializer::new, bytes.as_slice()).unwrap();
        assert_eq!(back, element);
    }

    #[test]
    fn self_describing_copy() {
        let element = EdmElement::Sequence(vec![EdmElement::I32(1), EdmElement::String("x".into())]);
        let copy = EDM.encode_fully(EdmSerializer::new, &element).unwrap();
        assert_eq!(copy, element);

        let back = EDM.decode_fully(EdmDeserializer::new, &copy).unwrap();
        assert_eq!(back, element);
    }

    #[test]
    fn unsigned_values_widen_when_replayed() {
        let element = EdmElement::Sequence(vec![EdmElement::U8(200), EdmElement::U32(7)]);
        let copy = EDM.encode_fully(EdmSerializer::new, &element).unwrap();
        assert_eq!(
            copy,
            EdmElement::Sequence(vec![EdmElement::I16(200), EdmElement::I64(7)])
        );
        assert!(
            EDM.encode_fully(EdmSerializer::new, &EdmElement::U64(u64::MAX))
                .is_err()
        );
    }
}
