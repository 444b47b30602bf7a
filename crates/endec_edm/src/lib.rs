#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod de;
mod element;
mod endec;
mod map;
mod ser;

#[cfg(feature = "serde")]
mod serde;

// -----------------------------------------------------------------------------
// Exports

pub use de::EdmDeserializer;
pub use element::{EdmElement, EdmKind};
pub use endec::{EDM, EdmEndec};
pub use map::EdmMap;
pub use ser::EdmSerializer;

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;
    use core::fmt::Debug;

    use endec_core::{BOOL, BYTE, BYTES, DOUBLE, FLOAT, INT, LONG, SHORT, STRING};
    use endec_core::{Endec, EndecError, EndecExt, RangeError, Result, StructEndec, StructEndecExt};
    use endec_core::{HUMAN_READABLE, MarkerAttribute, SerializationContext, ValueAttribute};
    use endec_core::{Number, StructEndecBuilder, VAR_INT, VAR_LONG};
    use endec_core::{dispatched_struct, endec_of, for_enum, if_attr, map, recursive};
    use endec_core::{recursive_struct, string_map, struct_endec_of, unit};
    use endec_utils::hash::{HashMap, HashSet};

    use crate::{EdmDeserializer, EdmElement, EdmSerializer};

    fn encode<T>(endec: &impl Endec<T>, value: &T) -> EdmElement {
        endec.encode_fully(EdmSerializer::new, value).unwrap()
    }

    fn decode<T>(endec: &impl Endec<T>, element: &EdmElement) -> Result<T> {
        endec.decode_fully(EdmDeserializer::new, element)
    }

    fn round_trip<T: PartialEq + Debug>(endec: &impl Endec<T>, value: T) {
        let element = encode(endec, &value);
        assert_eq!(decode(endec, &element).unwrap(), value);
    }

    fn map_element(entries: &[(&str, EdmElement)]) -> EdmElement {
        EdmElement::Map(
            entries
                .iter()
                .map(|(key, value)| (key.to_string(), value.clone()))
                .collect(),
        )
    }

    // --- primitives and collections ---

    #[test]
    fn primitives() {
        round_trip(&BOOL, true);
        round_trip(&BYTE, -7i8);
        round_trip(&SHORT, 300i16);
        round_trip(&INT, -70_000);
        round_trip(&VAR_INT, i32::MIN);
        round_trip(&LONG, i64::MAX);
        round_trip(&VAR_LONG, -1i64);
        round_trip(&FLOAT, 0.25f32);
        round_trip(&DOUBLE, -1.5e300);
        round_trip(&STRING, "héllo".to_string());
        round_trip(&BYTES, vec![0u8, 1, 255]);
    }

    #[test]
    fn collections() {
        round_trip(&INT.list_of(), vec![3, 1, 2]);
        round_trip(&STRING.list_of().list_of(), vec![vec![], vec!["a".to_string()]]);
        round_trip(&INT.optional_of(), Some(4));
        round_trip(&INT.nullable_of(), None);

        let set: HashSet<i32> = [1, 5, 9].into_iter().collect();
        round_trip(&INT.set_of(), set);

        let mut scores: HashMap<String, i64> = HashMap::default();
        scores.insert("a".to_string(), 1);
        scores.insert("b".to_string(), -2);
        let element = encode(&LONG.map_of(), &scores);
        assert_eq!(
            element,
            map_element(&[("a", EdmElement::I64(1)), ("b", EdmElement::I64(-2))])
        );
        round_trip(&LONG.map_of(), scores);
    }

    #[test]
    fn maps_with_non_string_keys() {
        let mut by_id: HashMap<i32, String> = HashMap::default();
        by_id.insert(1, "one".to_string());
        by_id.insert(20, "twenty".to_string());

        let keyed = string_map(|k: &i32| k.to_string(), |s: &str| s.parse().unwrap_or(-1), STRING);
        let element = encode(&keyed, &by_id);
        assert_eq!(element.as_map().unwrap().len(), 2);
        assert_eq!(
            element.as_map().unwrap().get("20"),
            Some(&EdmElement::String("twenty".to_string()))
        );
        round_trip(&keyed, by_id.clone());

        let entries = map(INT, STRING);
        let element = encode(&entries, &by_id);
        let first = &element.as_sequence().unwrap()[0];
        assert!(first.as_map().unwrap().contains_key("k"));
        assert!(first.as_map().unwrap().contains_key("v"));
        round_trip(&entries, by_id);
    }

    // --- transforms ---

    #[test]
    fn xmap_and_validate() {
        #[derive(Debug, Clone, Copy, PartialEq)]
        struct Meters(f64);

        let meters = DOUBLE.xmap(Meters, |m: &Meters| m.0);
        assert_eq!(encode(&meters, &Meters(2.5)), EdmElement::F64(2.5));
        round_trip(&meters, Meters(2.5));

        let even = INT.validate(|v: &i32| {
            if v % 2 == 0 {
                Ok(())
            } else {
                Err(EndecError::custom("odd"))
            }
        });
        round_trip(&even, 4);
        assert!(even.encode_fully(EdmSerializer::new, &3).is_err());
        assert_eq!(
            decode(&even, &EdmElement::I32(5)).unwrap_err(),
            EndecError::custom("odd")
        );
    }

    #[test]
    fn ranges() {
        let clamped = INT.clamped(0, 10);
        let clamp = |v: i32| decode(&clamped, &EdmElement::I32(v)).unwrap();
        assert_eq!(clamp(-5), 0);
        assert_eq!(clamp(15), 10);
        assert_eq!(clamp(7), 7);

        let strict = INT.ranged_between(0, 10);
        let err = decode(&strict, &EdmElement::I32(-5)).unwrap_err();
        assert_eq!(
            err,
            EndecError::Range(RangeError {
                value: Number::Signed(-5),
                min: Some(Number::Signed(0)),
                max: Some(Number::Signed(10)),
            })
        );
        assert!(strict.encode_fully(EdmSerializer::new, &11).is_err());

        assert_eq!(decode(&INT.clamped_min(3), &EdmElement::I32(1)).unwrap(), 3);
        assert_eq!(decode(&INT.clamped_max(3), &EdmElement::I32(9)).unwrap(), 3);
        assert!(decode(&FLOAT.ranged_max(1.0), &EdmElement::F32(1.5)).is_err());
        assert!(decode(&FLOAT.ranged_min(1.0), &EdmElement::F32(1.5)).is_ok());
        assert_eq!(
            decode(&LONG.ranged(Some(0), None, false), &EdmElement::I64(-1)).unwrap(),
            0
        );
    }

    #[test]
    fn catch_errors_falls_back() {
        let lenient = INT.catch_errors(|_, _, _| Ok(-1));
        assert_eq!(decode(&lenient, &EdmElement::I32(8)).unwrap(), 8);
        assert_eq!(decode(&lenient, &EdmElement::Bool(true)).unwrap(), -1);

        let widened = INT.catch_errors(|ctx, deserializer, _| {
            let wide = deserializer.read_i64(ctx)?;
            i32::try_from(wide).map_err(EndecError::custom)
        });
        assert_eq!(decode(&widened, &EdmElement::I64(12)).unwrap(), 12);
        assert!(decode(&widened, &EdmElement::I64(i64::MAX)).is_err());
    }

    #[test]
    fn closures_as_endecs() {
        let hex = endec_of(
            |ctx, serializer, value: &u32| serializer.write_str(ctx, &alloc::format!("{value:x}")),
            |ctx, deserializer| {
                let text = deserializer.read_string(ctx)?;
                u32::from_str_radix(&text, 16).map_err(EndecError::custom)
            },
        );
        assert_eq!(encode(&hex, &255), EdmElement::String("ff".to_string()));
        round_trip(&hex, 0xBEEF);
    }

    // --- structs ---

    #[derive(Debug, Clone, PartialEq)]
    struct Settings {
        volume: i32,
        name: String,
        tags: Vec<String>,
    }

    fn settings_endec() -> impl StructEndec<Settings> {
        StructEndecBuilder::of3(
            INT.optional_field_of("volume", |s: &Settings| &s.volume, 42),
            STRING.field_of("name", |s: &Settings| &s.name),
            STRING
                .list_of()
                .optional_field_of_lazy("tags", |s: &Settings| &s.tags, Vec::new),
            |volume, name, tags| Settings { volume, name, tags },
        )
    }

    #[test]
    fn struct_round_trip() {
        let settings = Settings {
            volume: 3,
            name: "main".to_string(),
            tags: vec!["x".to_string()],
        };
        let element = encode(&settings_endec(), &settings);
        assert_eq!(
            element.as_map().unwrap().get("name"),
            Some(&EdmElement::String("main".to_string()))
        );
        assert_eq!(
            element.as_map().unwrap().get("volume"),
            Some(&EdmElement::some(EdmElement::I32(3)))
        );
        round_trip(&settings_endec(), settings);
    }

    #[test]
    fn defaults_and_missing_fields() {
        let element = map_element(&[("name", EdmElement::String("n".to_string()))]);
        let settings = decode(&settings_endec(), &element).unwrap();
        assert_eq!(settings.volume, 42);
        assert!(settings.tags.is_empty());

        let element = map_element(&[("volume", EdmElement::some(EdmElement::I32(1)))]);
        let err = decode(&settings_endec(), &element).unwrap_err();
        assert_eq!(err, EndecError::missing_field("name"));

        let element = map_element(&[
            ("name", EdmElement::String("n".to_string())),
            ("volume", EdmElement::String("loud".to_string())),
        ]);
        let err = decode(&settings_endec(), &element).unwrap_err();
        assert_eq!(err.field_path(), "volume");
    }

    #[test]
    fn struct_of_and_unit() {
        let wrapped = INT.struct_of("value");
        assert_eq!(
            encode(&wrapped, &5),
            map_element(&[("value", EdmElement::I32(5))])
        );
        round_trip(&wrapped, 5);

        #[derive(Debug, PartialEq)]
        struct Marker;
        let marker = unit(|| Marker);
        assert_eq!(encode(&marker, &Marker), map_element(&[]));
        round_trip(&marker, Marker);
    }

    #[test]
    fn flat_fields() {
        #[derive(Debug, Clone, PartialEq)]
        struct Base {
            id: i64,
        }

        #[derive(Debug, Clone, PartialEq)]
        struct Item {
            base: Base,
            count: i32,
        }

        impl AsRef<Base> for Item {
            fn as_ref(&self) -> &Base {
                &self.base
            }
        }

        let base = || StructEndecBuilder::of1(LONG.field_of("id", |b: &Base| &b.id), |id| Base { id });

        let item = StructEndecBuilder::of2(
            base().flat_inherited_field_of(),
            INT.field_of("count", |i: &Item| &i.count),
            |base, count| Item { base, count },
        );
        let value = Item {
            base: Base { id: 9 },
            count: 2,
        };
        assert_eq!(
            encode(&item, &value),
            map_element(&[("id", EdmElement::I64(9)), ("count", EdmElement::I32(2))])
        );
        round_trip(&item, value.clone());

        let by_getter = StructEndecBuilder::of2(
            base().flat_field_of(|i: &Item| &i.base),
            INT.field_of("count", |i: &Item| &i.count),
            |base, count| Item { base, count },
        );
        assert_eq!(encode(&by_getter, &value), encode(&item, &value));
    }

    #[test]
    fn structured_catch_errors_reads_same_struct() {
        let lenient = settings_endec().structured_catch_errors(|ctx, structure, _| {
            let name = structure.field_value(ctx, "name", &STRING, Some(&String::new))?;
            Ok(Settings {
                volume: 0,
                name,
                tags: Vec::new(),
            })
        });

        let element = map_element(&[
            ("name", EdmElement::String("kept".to_string())),
            ("volume", EdmElement::Bool(false)),
        ]);
        let settings = decode(&lenient, &element).unwrap();
        assert_eq!(settings.name, "kept");
        assert_eq!(settings.volume, 0);
    }

    #[test]
    fn closures_as_struct_endecs() {
        let pair = struct_endec_of(
            |ctx, structure, value: &(i32, i32)| {
                structure.field_value(ctx, "a", &INT, &value.0, false)?;
                structure.field_value(ctx, "b", &INT, &value.1, false)
            },
            |ctx, structure| {
                let a = structure.field_value(ctx, "a", &INT, None)?;
                let b = structure.field_value(ctx, "b", &INT, Some(&|| 0))?;
                Ok((a, b))
            },
        );
        round_trip(&pair, (1, 2));
        assert_eq!(
            decode(&pair, &map_element(&[("a", EdmElement::I32(4))])).unwrap(),
            (4, 0)
        );
    }

    // --- recursion ---

    #[derive(Debug, Clone, PartialEq)]
    struct Tree {
        value: i32,
        children: Vec<Tree>,
    }

    #[test]
    fn recursive_endecs() {
        let tree = recursive(|this| {
            StructEndecBuilder::of2(
                INT.field_of("value", |t: &Tree| &t.value),
                this.list_of()
                    .optional_field_of_lazy("children", |t: &Tree| &t.children, Vec::new),
                |value, children| Tree { value, children },
            )
        });
        let value = Tree {
            value: 1,
            children: vec![
                Tree {
                    value: 2,
                    children: vec![],
                },
                Tree {
                    value: 3,
                    children: vec![Tree {
                        value: 4,
                        children: vec![],
                    }],
                },
            ],
        };
        round_trip(&tree, value);
    }

    #[test]
    fn recursive_struct_endecs() {
        #[derive(Debug, Clone, PartialEq)]
        struct Chain {
            id: i32,
            next: Option<Box<Chain>>,
        }

        let chain = recursive_struct(|this| {
            StructEndecBuilder::of2(
                INT.field_of("id", |c: &Chain| &c.id),
                this.xmap(Box::new, |c: &Box<Chain>| (**c).clone())
                    .optional_of()
                    .optional_field_of("next", |c: &Chain| &c.next, None),
                |id, next| Chain { id, next },
            )
        });
        let value = Chain {
            id: 1,
            next: Some(Box::new(Chain { id: 2, next: None })),
        };
        round_trip(&chain, value);
    }

    // --- dispatch ---

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        A { x: i32 },
        B { label: String },
    }

    fn event_endec() -> impl Endec<Event> {
        let a = StructEndecBuilder::of1(
            INT.field_of("x", |e: &Event| match e {
                Event::A { x } => x,
                Event::B { .. } => &0,
            }),
            |x| Event::A { x },
        )
        .boxed_struct();
        let b = StructEndecBuilder::of1(
            STRING.field_of("label", |e: &Event| match e {
                Event::B { label } => label,
                Event::A { .. } => unreachable!(),
            }),
            |label| Event::B { label },
        )
        .boxed_struct();

        dispatched_struct(
            move |kind: &String| match kind.as_str() {
                "a" => Some(a.clone()),
                "b" => Some(b.clone()),
                _ => None,
            },
            |event: &Event| match event {
                Event::A { .. } => "a".to_string(),
                Event::B { .. } => "b".to_string(),
            },
            STRING,
            "type",
        )
    }

    #[test]
    fn dispatch() {
        let value = Event::B {
            label: "hi".to_string(),
        };
        assert_eq!(
            encode(&event_endec(), &value),
            map_element(&[
                ("type", EdmElement::String("b".to_string())),
                ("label", EdmElement::String("hi".to_string())),
            ])
        );
        round_trip(&event_endec(), value);
        round_trip(&event_endec(), Event::A { x: 3 });

        let unknown = map_element(&[("type", EdmElement::String("c".to_string()))]);
        let err = decode(&event_endec(), &unknown).unwrap_err();
        assert!(matches!(err, EndecError::UnregisteredVariant { .. }));
    }

    // --- attributes ---

    const COMPACT: MarkerAttribute = MarkerAttribute::new("compact");
    const SCALE: ValueAttribute<i32> = ValueAttribute::new("scale");

    #[test]
    fn attribute_branching() {
        let number = if_attr(COMPACT, VAR_INT)
            .or_else_if(HUMAN_READABLE, STRING.xmap(|s: String| s.len() as i32, |v: &i32| "#".repeat(*v as usize)))
            .unwrap()
            .or_else(INT);

        let plain = SerializationContext::empty();
        let readable = SerializationContext::attributes([HUMAN_READABLE.instance()]);
        let both = readable.with_attributes([COMPACT.instance()]);

        let encode_with = |ctx: &SerializationContext| {
            number.encode_fully_with(ctx, EdmSerializer::new, &3).unwrap()
        };
        assert_eq!(encode_with(&plain), EdmElement::I32(3));
        assert_eq!(encode_with(&readable), EdmElement::String("###".to_string()));
        // First matching branch wins.
        assert_eq!(encode_with(&both), EdmElement::I32(3));

        let suppressed = readable.with_suppressed([HUMAN_READABLE]);
        assert_eq!(encode_with(&suppressed), EdmElement::I32(3));
    }

    #[test]
    fn value_attributes_in_context() {
        let scaled = INT.xmap_with_context(
            |ctx, v| v * ctx.get_attribute_value(&SCALE).copied().unwrap_or(1),
            |ctx, v: &i32| v / ctx.get_attribute_value(&SCALE).copied().unwrap_or(1),
        );
        let ctx = SerializationContext::attributes([SCALE.instance(10)]);

        let element = scaled.encode_fully_with(&ctx, EdmSerializer::new, &50).unwrap();
        assert_eq!(element, EdmElement::I32(5));
        assert_eq!(
            scaled
                .decode_fully_with(&ctx, EdmDeserializer::new, &element)
                .unwrap(),
            50
        );
        assert_eq!(decode(&scaled, &element).unwrap(), 5);
    }

    #[test]
    fn enums_by_ordinal_without_human_readable() {
        #[derive(Debug, Clone, Copy, PartialEq)]
        enum Level {
            Low,
            High,
        }
        const LEVELS: &[(&str, Level)] = &[("low", Level::Low), ("high", Level::High)];

        let level = for_enum(LEVELS);
        assert_eq!(encode(&level, &Level::High), EdmElement::I32(1));
        round_trip(&level, Level::Low);
        assert_eq!(
            decode(&level, &EdmElement::I32(5)).unwrap_err(),
            EndecError::UnknownEnumOrdinal { ordinal: 5 }
        );
    }
}
