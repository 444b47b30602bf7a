use alloc::string::ToString;

use endec_core::{Deserializer, Endec, EndecError, Result, ResultSerializer};
use endec_core::{SerializationContext, Serializer};
use serde_json::Value;

use crate::JsonSerializer;

/// Writes `value` into `visitor`, keeping its shape.
///
/// `null` becomes an absent optional; integers that fit in `i64` become
/// `i64`, every other number `f64`.
pub(crate) fn replay(
    ctx: &SerializationContext,
    visitor: &mut dyn Serializer,
    value: &Value,
) -> Result<()> {
    match value {
        Value::Null => visitor.write_optional(ctx, None),
        Value::Bool(value) => visitor.write_bool(ctx, *value),
        Value::Number(number) => match number.as_i64() {
            Some(value) => visitor.write_i64(ctx, value),
            None => {
                let value = number.as_f64().ok_or_else(|| {
                    EndecError::custom(alloc::format!("unrepresentable json number {number}"))
                })?;
                visitor.write_f64(ctx, value)
            }
        },
        Value::String(value) => visitor.write_str(ctx, value),
        Value::Array(elements) => {
            let mut sequence = visitor.sequence(ctx, elements.len())?;
            for element in elements {
                sequence.element(&mut |visitor: &mut dyn Serializer| replay(ctx, visitor, element))?;
            }
            sequence.end()
        }
        Value::Object(entries) => {
            let mut map = visitor.map(ctx, entries.len())?;
            for (key, entry) in entries {
                map.entry(key, &mut |visitor: &mut dyn Serializer| replay(ctx, visitor, entry))?;
            }
            map.end()
        }
    }
}

// -----------------------------------------------------------------------------
// JsonEndec

/// Arbitrary JSON as a value of any format.
///
/// Self-describing formats receive the value with its shape preserved.
/// Other formats store it as a JSON string.
///
/// # Examples
///
/// ```
/// use endec_core::EndecExt;
/// use endec_json::{JSON, JsonSerializer};
/// use serde_json::json;
///
/// let value = json!({ "id": 7, "tags": ["a", "b"] });
/// let copy = JSON.encode_fully(JsonSerializer::new, &value).unwrap();
/// assert_eq!(copy, value);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEndec;

/// The [`JsonEndec`] instance.
pub const JSON: JsonEndec = JsonEndec;

impl Endec<Value> for JsonEndec {
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &Value,
    ) -> Result<()> {
        if let Some(visitor) = serializer.as_self_describing() {
            return replay(ctx, visitor, value);
        }
        serializer.write_str(ctx, &value.to_string())
    }

    fn decode(
        &self,
        ctx: &SerializationContext,
        deserializer: &mut dyn Deserializer,
    ) -> Result<Value> {
        if let Some(source) = deserializer.as_self_describing() {
            let mut json = JsonSerializer::new();
            source.read_any(ctx, &mut json)?;
            return json.result();
        }
        let text = deserializer.read_string(ctx)?;
        serde_json::from_str(&text).map_err(EndecError::custom)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;

    use endec_core::{EndecError, EndecExt, HUMAN_READABLE, INT, STRING, SerializationContext};
    use endec_core::{BYTES, StructEndecBuilder, StructEndecExt, dispatched_struct, for_enum};
    use endec_core::{DOUBLE, DynEndec, DynStructEndec, FLOAT, dispatched};
    use endec_core::{Endec, Serializer};
    use endec_binary::{BinaryDeserializer, BinarySerializer};
    use endec_edm::{EdmDeserializer, EdmSerializer};
    use serde_json::{Value, json};

    use super::JSON;
    use crate::{JsonDeserializer, JsonSerializer};

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        name: String,
        age: i32,
        nickname: Option<String>,
        tags: Vec<String>,
    }

    fn person_endec() -> impl Endec<Person> {
        StructEndecBuilder::of4(
            STRING.field_of("name", |p: &Person| &p.name),
            INT.optional_field_of("age", |p: &Person| &p.age, 0),
            STRING
                .optional_of()
                .optional_field_of("nickname", |p: &Person| &p.nickname, None),
            STRING.list_of().field_of("tags", |p: &Person| &p.tags),
            |name, age, nickname, tags| Person {
                name,
                age,
                nickname,
                tags,
            },
        )
    }

    fn to_json<T>(endec: &impl Endec<T>, value: &T) -> Value {
        endec.encode_fully(JsonSerializer::new, value).unwrap()
    }

    fn from_json<T>(endec: &impl Endec<T>, value: &Value) -> Result<T, EndecError> {
        endec.decode_fully(JsonDeserializer::new, value)
    }

    #[test]
    fn struct_shape() {
        let person = Person {
            name: "ada".to_string(),
            age: 36,
            nickname: None,
            tags: vec!["math".to_string()],
        };

        let json = to_json(&person_endec(), &person);
        assert_eq!(json, json!({ "name": "ada", "age": 36, "tags": ["math"] }));
        assert_eq!(from_json(&person_endec(), &json).unwrap(), person);
    }

    #[test]
    fn absent_and_null_fields_use_defaults() {
        let expected = Person {
            name: "bob".to_string(),
            age: 0,
            nickname: None,
            tags: Vec::new(),
        };

        let missing = json!({ "name": "bob", "tags": [] });
        let nulls = json!({ "name": "bob", "age": null, "nickname": null, "tags": [] });

        assert_eq!(from_json(&person_endec(), &missing).unwrap(), expected);
        assert_eq!(from_json(&person_endec(), &nulls).unwrap(), expected);
    }

    #[test]
    fn missing_mandatory_field() {
        let err = from_json(&person_endec(), &json!({ "age": 3, "tags": [] })).unwrap_err();
        assert_eq!(err, EndecError::missing_field("name"));
    }

    #[test]
    fn field_errors_carry_the_field_name() {
        let err = from_json(&person_endec(), &json!({ "name": 5, "tags": [] })).unwrap_err();

        assert_eq!(err.field_path(), "name");
        assert!(matches!(err.root_cause(), EndecError::TypeMismatch { .. }));
    }

    #[test]
    fn human_readable_in_json_sessions() {
        #[derive(Debug, Clone, Copy, PartialEq)]
        enum Mode {
            Fast,
            Safe,
        }
        const MODES: &[(&str, Mode)] = &[("fast", Mode::Fast), ("safe", Mode::Safe)];

        let endec = for_enum(MODES);
        assert_eq!(to_json(&endec, &Mode::Safe), json!("safe"));
        assert_eq!(from_json(&endec, &json!("fast")).unwrap(), Mode::Fast);

        // Suppressing the attribute switches to ordinals.
        let ctx = SerializationContext::suppressed([HUMAN_READABLE]);
        let json = endec
            .encode_fully_with(&ctx, JsonSerializer::new, &Mode::Safe)
            .unwrap();
        assert_eq!(json, json!(1));

        let err = from_json(&endec, &json!("slow")).unwrap_err();
        assert!(matches!(err, EndecError::UnknownEnumName { .. }));
    }

    #[test]
    fn bytes_as_number_array() {
        let json = to_json(&BYTES, &vec![1u8, 255]);
        assert_eq!(json, json!([1, 255]));
        assert_eq!(from_json(&BYTES, &json).unwrap(), vec![1u8, 255]);
        assert!(from_json(&BYTES, &json!([256])).is_err());
    }

    #[test]
    fn dispatched_fields_are_flat() {
        #[derive(Debug, PartialEq)]
        enum Shape {
            Circle { radius: i32 },
            Label { text: String },
        }

        let circle = StructEndecBuilder::of1(
            INT.field_of("radius", |s: &Shape| match s {
                Shape::Circle { radius } => radius,
                Shape::Label { .. } => &0,
            }),
            |radius| Shape::Circle { radius },
        )
        .boxed_struct();
        let label = StructEndecBuilder::of1(
            STRING.field_of("text", |s: &Shape| match s {
                Shape::Label { text } => text,
                Shape::Circle { .. } => unreachable!(),
            }),
            |text| Shape::Label { text },
        )
        .boxed_struct();

        let endec = dispatched_struct(
            move |kind: &String| match kind.as_str() {
                "circle" => Some(circle.clone()),
                "label" => Some(label.clone()),
                _ => None,
            },
            |shape: &Shape| match shape {
                Shape::Circle { .. } => "circle".to_string(),
                Shape::Label { .. } => "label".to_string(),
            },
            STRING,
            "type",
        );

        let json = to_json(&endec, &Shape::Circle { radius: 2 });
        assert_eq!(json, json!({ "type": "circle", "radius": 2 }));

        let decoded = from_json(&endec, &json!({ "type": "label", "text": "hi" })).unwrap();
        assert_eq!(
            decoded,
            Shape::Label {
                text: "hi".to_string()
            }
        );

        let err = from_json(&endec, &json!({ "type": "square" })).unwrap_err();
        assert!(matches!(err, EndecError::UnregisteredVariant { .. }));
    }

    #[test]
    fn catch_errors_rolls_back() {
        let lenient = INT.catch_errors(|ctx, deserializer, _| {
            let text = deserializer.read_string(ctx)?;
            Ok(text.len() as i32)
        });

        assert_eq!(from_json(&lenient, &json!(4)).unwrap(), 4);
        assert_eq!(from_json(&lenient, &json!("abc")).unwrap(), 3);
    }

    #[test]
    fn json_endec_replays_into_json() {
        let value = json!({ "a": [1, 2.5, "s", true, null], "b": {} });
        let copy = to_json(&JSON, &value);
        assert_eq!(copy, value);
        assert_eq!(from_json(&JSON, &value).unwrap(), value);
    }

    #[test]
    fn json_endec_through_other_formats() {
        let value = json!({ "id": 3, "ratio": 0.5, "name": null, "tags": ["x"] });

        let element = JSON.encode_fully(EdmSerializer::new, &value).unwrap();
        assert!(element.as_map().is_some());
        assert_eq!(JSON.decode_fully(EdmDeserializer::new, &element).unwrap(), value);

        let bytes = JSON.encode_fully(BinarySerializer::new, &value).unwrap();
        let text = STRING.decode_fully(BinaryDeserializer::new, bytes.as_slice()).unwrap();
        assert_eq!(text, value.to_string());
        assert_eq!(JSON.decode_fully(BinaryDeserializer::new, bytes.as_slice()).unwrap(), value);
    }

    #[test]
    fn mandatory_nullable_fields_keep_null() {
        let endec = StructEndecBuilder::of1(
            INT.nullable_of().field_of("value", |v: &Option<i32>| v),
            |value| value,
        );
        assert_eq!(to_json(&endec, &None), json!({ "value": null }));
        assert_eq!(from_json(&endec, &json!({ "value": null })).unwrap(), None);
        assert_eq!(
            from_json(&endec, &json!({})).unwrap_err(),
            EndecError::missing_field("value")
        );
    }

    #[test]
    fn decode_errors_name_their_field() {
        let shape = dispatched_struct(
            |_: &String| None::<DynStructEndec<i32>>,
            |_: &i32| String::new(),
            STRING,
            "type",
        );
        let err = from_json(&shape, &json!({ "type": 5 })).unwrap_err();
        assert_eq!(err.field_path(), "type");

        let boxed = dispatched(
            |kind: &String| match kind.as_str() {
                "i" => Some(Arc::new(INT) as DynEndec<i32>),
                _ => None,
            },
            |_: &i32| "i".to_string(),
            STRING,
        );
        assert_eq!(from_json(&boxed, &json!({ "variant": "i", "instance": 3 })).unwrap(), 3);
        let err = from_json(&boxed, &json!({ "variant": "i", "instance": "x" })).unwrap_err();
        assert_eq!(err.field_path(), "instance");
        assert!(matches!(err.root_cause(), EndecError::TypeMismatch { .. }));

        let wrapped = INT.struct_of("value");
        let err = from_json(&wrapped, &json!({ "value": "x" })).unwrap_err();
        assert_eq!(err.field_path(), "value");
    }

    #[test]
    fn keyed_fields_ignore_order() {
        #[derive(Debug, Clone, PartialEq)]
        struct Pair {
            a: i32,
            b: String,
        }

        let forward = StructEndecBuilder::of2(
            INT.field_of("a", |p: &Pair| &p.a),
            STRING.field_of("b", |p: &Pair| &p.b),
            |a, b| Pair { a, b },
        );
        let reordered = StructEndecBuilder::of2(
            STRING.field_of("b", |p: &Pair| &p.b),
            INT.field_of("a", |p: &Pair| &p.a),
            |b, a| Pair { a, b },
        );
        let pair = Pair {
            a: 0x0000_0102,
            b: "xyz".to_string(),
        };

        let json = to_json(&forward, &pair);
        assert_eq!(from_json(&reordered, &json).unwrap(), pair);

        let element = forward.encode_fully(EdmSerializer::new, &pair).unwrap();
        let decoded = reordered.decode_fully(EdmDeserializer::new, &element).unwrap();
        assert_eq!(decoded, pair);
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        let err = DOUBLE.encode_fully(JsonSerializer::new, &f64::NAN).unwrap_err();
        assert!(matches!(err, EndecError::Unexpected(_)));
        assert!(FLOAT.encode_fully(JsonSerializer::new, &f32::INFINITY).is_err());
        assert_eq!(to_json(&DOUBLE, &1.5), json!(1.5));
    }

    #[test]
    fn prefix_is_extended() {
        let mut serializer = JsonSerializer::with_prefix(json!([0]));
        let ctx = serializer.setup_context(SerializationContext::empty());
        INT.list_of()
            .encode(&ctx, &mut serializer, &vec![1, 2])
            .unwrap();
        assert_eq!(endec_core::ResultSerializer::result(serializer).unwrap(), json!([0, 1, 2]));
    }
}
