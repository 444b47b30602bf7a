#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod de;
mod ser;
mod varint;

// -----------------------------------------------------------------------------
// Exports

pub use de::BinaryDeserializer;
pub use ser::BinarySerializer;

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;

    use endec_core::{BOOL, BYTE, INT, LONG, SHORT, STRING, VAR_INT, VAR_LONG};
    use endec_core::{Endec, EndecError, EndecExt, SerializationContext, StructEndecBuilder};

    use crate::{BinaryDeserializer, BinarySerializer};

    fn encode<T>(endec: &impl Endec<T>, value: &T) -> Vec<u8> {
        endec.encode_fully(BinarySerializer::new, value).unwrap()
    }

    fn decode<T>(endec: &impl Endec<T>, bytes: &[u8]) -> Result<T, EndecError> {
        endec.decode_fully(BinaryDeserializer::new, bytes)
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Pair {
        a: i32,
        b: String,
    }

    #[test]
    fn layout() {
        assert_eq!(encode(&INT, &1), [0, 0, 0, 1]);
        assert_eq!(encode(&SHORT, &-2), [0xFF, 0xFE]);
        assert_eq!(encode(&VAR_INT, &300), [0xAC, 0x02]);
        assert_eq!(encode(&VAR_INT, &-1), [0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
        assert_eq!(encode(&STRING, &"hi".to_string()), [2, b'h', b'i']);
        assert_eq!(encode(&INT.optional_of(), &None), [0]);
        assert_eq!(encode(&BYTE.optional_of(), &Some(5)), [1, 5]);
        assert_eq!(encode(&BYTE.list_of(), &vec![7, 8]), [2, 7, 8]);
    }

    #[test]
    fn round_trips() {
        let values = vec![i64::MIN, -1, 0, 1, i64::MAX];
        let bytes = encode(&VAR_LONG.list_of(), &values);
        assert_eq!(decode(&VAR_LONG.list_of(), &bytes).unwrap(), values);

        // One entry: key "x", then the value.
        let bytes = [1, 1, b'x', 0, 0, 0, 0, 0, 0, 0, 4];
        let map = decode(&LONG.map_of(), &bytes).unwrap();
        assert_eq!(map.get("x"), Some(&4));
        assert_eq!(encode(&LONG.map_of(), &map), bytes);
    }

    #[test]
    fn struct_fields_are_positional() {
        let forward = StructEndecBuilder::of2(
            INT.field_of("a", |p: &Pair| &p.a),
            STRING.field_of("b", |p: &Pair| &p.b),
            |a, b| Pair { a, b },
        );
        let pair = Pair {
            a: 0x0000_0102,
            b: "xyz".to_string(),
        };
        let bytes = encode(&forward, &pair);
        assert_eq!(bytes, [0, 0, 1, 2, 3, b'x', b'y', b'z']);
        assert_eq!(decode(&forward, &bytes).unwrap(), pair);

        // Same fields, other order: the names do not help.
        let reordered = StructEndecBuilder::of2(
            STRING.field_of("b", |p: &Pair| &p.b),
            INT.field_of("a", |p: &Pair| &p.a),
            |b, a| Pair { a, b },
        );
        let result = decode(&reordered, &bytes);
        assert!(result.map_or(true, |decoded| decoded != pair));
    }

    #[test]
    fn failed_attempts_rewind() {
        let strict = StructEndecBuilder::of2(
            INT.field_of("a", |p: &(i32, bool)| &p.0),
            BOOL.field_of("b", |p: &(i32, bool)| &p.1),
            |a, b| (a, b),
        );
        let lenient = strict.catch_errors(|ctx, deserializer, _| {
            let a = deserializer.read_i32(ctx)?;
            let raw = deserializer.read_i8(ctx)?;
            Ok((a, raw != 0))
        });

        let bytes = [0, 0, 0, 5, 9];
        let mut deserializer = BinaryDeserializer::new(&bytes);
        let ctx = SerializationContext::empty();
        let value = lenient.decode(&ctx, &mut deserializer).unwrap();
        assert_eq!(value, (5, true));
        assert_eq!(deserializer.position(), 5);
        deserializer.finish().unwrap();
    }

    #[test]
    fn oversized_var_ints_are_rejected() {
        assert_eq!(decode(&VAR_INT, &[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]).unwrap(), -1);
        assert!(matches!(
            decode(&VAR_INT, &[0xFF, 0xFF, 0xFF, 0xFF, 0x1F]).unwrap_err(),
            EndecError::Unexpected(_)
        ));

        let mut min = [0x80; 10];
        min[9] = 0x01;
        assert_eq!(decode(&VAR_LONG, &min).unwrap(), i64::MIN);
        min[9] = 0x02;
        assert!(matches!(
            decode(&VAR_LONG, &min).unwrap_err(),
            EndecError::Unexpected(_)
        ));
    }

    #[test]
    fn malformed_input() {
        assert!(matches!(
            decode(&INT, &[0, 1]).unwrap_err(),
            EndecError::Unexpected(_)
        ));
        assert!(matches!(
            decode(&BOOL, &[2]).unwrap_err(),
            EndecError::TypeMismatch { .. }
        ));
        assert!(decode(&STRING, &[2, 0xC3, 0x28]).is_err());
        assert!(decode(&VAR_INT, &[0xFF; 6]).is_err());

        let mut deserializer = BinaryDeserializer::new(&[1, 0]);
        BOOL.decode(&SerializationContext::empty(), &mut deserializer)
            .unwrap();
        assert!(deserializer.finish().is_err());
    }

    #[test]
    fn size_mismatch_is_reported() {
        let mut serializer = BinarySerializer::new();
        let ctx = SerializationContext::empty();
        let sequence = endec_core::Serializer::sequence(&mut serializer, &ctx, 2).unwrap();
        assert!(sequence.end().is_err());
    }
}
