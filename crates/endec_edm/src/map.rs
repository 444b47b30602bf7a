use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use core::fmt;

use endec_core::{EndecExt, KeyedEndec, MapCarrier, Result, SerializationContext};

use crate::element::write_map;
use crate::{EdmDeserializer, EdmElement, EdmSerializer};

/// A string-keyed map of elements, accessed through [`KeyedEndec`]s.
///
/// # Examples
///
/// ```
/// use endec_core::{EndecExt, INT, MapCarrier, SerializationContext};
/// use endec_edm::EdmMap;
///
/// let level = INT.keyed("level", || 1);
/// let ctx = SerializationContext::empty();
///
/// let mut map = EdmMap::new();
/// assert_eq!(map.get(&ctx, &level), 1);
///
/// map.put(&ctx, &level, &5).unwrap();
/// map.mutate(&ctx, &level, |level| level * 2).unwrap();
/// assert_eq!(map.get(&ctx, &level), 10);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdmMap {
    entries: BTreeMap<String, EdmElement>,
}

impl EdmMap {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The raw element stored under `key`.
    pub fn raw(&self, key: &str) -> Option<&EdmElement> {
        self.entries.get(key)
    }

    pub fn entries(&self) -> &BTreeMap<String, EdmElement> {
        &self.entries
    }

    pub fn into_inner(self) -> BTreeMap<String, EdmElement> {
        self.entries
    }
}

impl From<BTreeMap<String, EdmElement>> for EdmMap {
    fn from(entries: BTreeMap<String, EdmElement>) -> Self {
        Self { entries }
    }
}

impl fmt::Display for EdmMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_map(f, &self.entries, 0)
    }
}

impl MapCarrier for EdmMap {
    fn get_with_errors<T>(&self, ctx: &SerializationContext, key: &KeyedEndec<T>) -> Result<T> {
        match self.entries.get(key.key()) {
            Some(element) => key
                .endec()
                .decode_fully_with(ctx, EdmDeserializer::new, element),
            None => Ok(key.default_value()),
        }
    }

    fn put<T>(&mut self, ctx: &SerializationContext, key: &KeyedEndec<T>, value: &T) -> Result<()> {
        let element = key
            .endec()
            .encode_fully_with(ctx, EdmSerializer::new, value)?;
        self.entries.insert(key.key().to_string(), element);
        Ok(())
    }

    fn delete<T>(&mut self, key: &KeyedEndec<T>) {
        self.entries.remove(key.key());
    }

    fn has<T>(&self, key: &KeyedEndec<T>) -> bool {
        self.entries.contains_key(key.key())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};

    use endec_core::{EndecExt, INT, MapCarrier, STRING, SerializationContext};

    use super::EdmMap;
    use crate::EdmElement;

    #[test]
    fn defaults_and_failures() {
        let ctx = SerializationContext::empty();
        let count = INT.keyed("count", || 42);
        let name = STRING.keyed("count", String::new);

        let mut map = EdmMap::new();
        assert!(!map.has(&count));
        assert_eq!(map.get(&ctx, &count), 42);

        map.put(&ctx, &name, &"seven".to_string()).unwrap();
        assert!(map.has(&count));
        assert!(map.get_with_errors(&ctx, &count).is_err());
        assert_eq!(map.get(&ctx, &count), 42);

        map.delete(&count);
        assert!(map.is_empty());
    }

    #[test]
    fn copy_between_maps() {
        let ctx = SerializationContext::empty();
        let hp = INT.keyed("hp", || 10);
        let tag = STRING.keyed("tag", String::new);

        let mut source = EdmMap::new();
        source.put(&ctx, &hp, &3).unwrap();

        let mut target = EdmMap::new();
        source.copy_if_present(&ctx, &tag, &mut target).unwrap();
        assert!(!target.has(&tag));

        source.copy(&ctx, &tag, &mut target).unwrap();
        source.copy_if_present(&ctx, &hp, &mut target).unwrap();
        assert_eq!(target.raw("hp"), Some(&EdmElement::I32(3)));
        assert_eq!(target.raw("tag"), Some(&EdmElement::String(String::new())));

        source.put_if_not_null(&ctx, &tag, None).unwrap();
        assert!(!source.has(&tag));
        assert_eq!(source.len(), 1);
    }

    #[test]
    fn element_conversion() {
        let ctx = SerializationContext::empty();
        let hp = INT.keyed("hp", || 0);

        let mut map = EdmMap::new();
        map.put(&ctx, &hp, &9).unwrap();

        let element = EdmElement::from(map.clone());
        assert_eq!(element.into_edm_map().unwrap(), map);
        assert!(EdmElement::Bool(true).into_edm_map().is_err());
        assert_eq!(map.to_string(), "map({\"hp\": i32(9)})");
    }
}
