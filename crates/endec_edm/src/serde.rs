use serde_core::{Serialize, Serializer};

use crate::{EdmElement, EdmMap};

impl Serialize for EdmElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EdmElement::I8(v) => serializer.serialize_i8(*v),
            EdmElement::U8(v) => serializer.serialize_u8(*v),
            EdmElement::I16(v) => serializer.serialize_i16(*v),
            EdmElement::U16(v) => serializer.serialize_u16(*v),
            EdmElement::I32(v) => serializer.serialize_i32(*v),
            EdmElement::U32(v) => serializer.serialize_u32(*v),
            EdmElement::I64(v) => serializer.serialize_i64(*v),
            EdmElement::U64(v) => serializer.serialize_u64(*v),
            EdmElement::F32(v) => serializer.serialize_f32(*v),
            EdmElement::F64(v) => serializer.serialize_f64(*v),
            EdmElement::Bool(v) => serializer.serialize_bool(*v),
            EdmElement::String(v) => serializer.serialize_str(v),
            EdmElement::Bytes(v) => serializer.serialize_bytes(v),
            EdmElement::Optional(None) => serializer.serialize_none(),
            EdmElement::Optional(Some(inner)) => serializer.serialize_some(&**inner),
            EdmElement::Sequence(elements) => serializer.collect_seq(elements),
            EdmElement::Map(entries) => serializer.collect_map(entries),
        }
    }
}

impl Serialize for EdmMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries())
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::ToString;
    use alloc::vec;

    use crate::EdmElement;

    #[test]
    fn serialize_as_plain_data() {
        let mut entries = BTreeMap::new();
        entries.insert(
            "a".to_string(),
            EdmElement::Sequence(vec![EdmElement::I32(1), EdmElement::String("x".to_string())]),
        );
        let element = EdmElement::Map(entries);

        assert_eq!(ron::to_string(&element).unwrap(), r#"{"a":[1,"x"]}"#);
        assert_eq!(serde_json::to_string(&element).unwrap(), r#"{"a":[1,"x"]}"#);

        let optional = EdmElement::Sequence(vec![EdmElement::EMPTY, EdmElement::some(EdmElement::U8(2))]);
        assert_eq!(serde_json::to_string(&optional).unwrap(), "[null,2]");
    }
}
