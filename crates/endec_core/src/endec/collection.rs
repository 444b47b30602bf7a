use alloc::string::String;
use alloc::vec::Vec;
use core::hash::Hash;
use core::marker::PhantomData;

use endec_utils::hash::{FixedHashState, HashMap, HashSet};

use super::Endec;
use crate::context::SerializationContext;
use crate::de::Deserializer;
use crate::error::{EndecError, Result};
use crate::ser::Serializer;

/// Upper bound for capacity reserved from a size hint.
///
/// Hints come from the input; collections grow past this on demand.
const MAX_PREALLOCATED: usize = 4096;

fn capacity_for(hint: usize) -> usize {
    if hint > MAX_PREALLOCATED {
        log::debug!("size hint {hint} exceeds {MAX_PREALLOCATED}, growing on demand");
        MAX_PREALLOCATED
    } else {
        hint
    }
}

// -----------------------------------------------------------------------------
// ListEndec

/// `Vec<T>` as a sequence, see [`EndecExt::list_of`](super::EndecExt::list_of).
#[derive(Debug, Clone, Copy)]
pub struct ListEndec<E> {
    inner: E,
}

impl<E> ListEndec<E> {
    #[inline]
    pub const fn new(inner: E) -> Self {
        Self { inner }
    }
}

impl<T, E: Endec<T>> Endec<Vec<T>> for ListEndec<E> {
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &Vec<T>,
    ) -> Result<()> {
        let mut sequence = serializer.sequence(ctx, value.len())?;
        for element in value {
            sequence.element_value(ctx, &self.inner, element)?;
        }
        sequence.end()
    }

    fn decode(
        &self,
        ctx: &SerializationContext,
        deserializer: &mut dyn Deserializer,
    ) -> Result<Vec<T>> {
        let mut sequence = deserializer.sequence(ctx)?;
        let mut list = Vec::with_capacity(capacity_for(sequence.estimated_size()));
        while sequence.has_next() {
            list.push(sequence.next_value(ctx, &self.inner)?);
        }
        Ok(list)
    }
}

// -----------------------------------------------------------------------------
// SetEndec

/// `HashSet<T>` as a sequence. Duplicate elements in the input collapse.
#[derive(Debug, Clone, Copy)]
pub struct SetEndec<E> {
    inner: E,
}

impl<E> SetEndec<E> {
    #[inline]
    pub const fn new(inner: E) -> Self {
        Self { inner }
    }
}

impl<T: Eq + Hash, E: Endec<T>> Endec<HashSet<T>> for SetEndec<E> {
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &HashSet<T>,
    ) -> Result<()> {
        let mut sequence = serializer.sequence(ctx, value.len())?;
        for element in value {
            sequence.element_value(ctx, &self.inner, element)?;
        }
        sequence.end()
    }

    fn decode(
        &self,
        ctx: &SerializationContext,
        deserializer: &mut dyn Deserializer,
    ) -> Result<HashSet<T>> {
        let mut sequence = deserializer.sequence(ctx)?;
        let capacity = capacity_for(sequence.estimated_size());
        let mut set = HashSet::with_capacity_and_hasher(capacity, FixedHashState);
        while sequence.has_next() {
            set.insert(sequence.next_value(ctx, &self.inner)?);
        }
        Ok(set)
    }
}

// -----------------------------------------------------------------------------
// MapOfEndec

/// `HashMap<String, T>` as a map, see [`EndecExt::map_of`](super::EndecExt::map_of).
#[derive(Debug, Clone, Copy)]
pub struct MapOfEndec<E> {
    inner: E,
}

impl<E> MapOfEndec<E> {
    #[inline]
    pub const fn new(inner: E) -> Self {
        Self { inner }
    }
}

impl<T, E: Endec<T>> Endec<HashMap<String, T>> for MapOfEndec<E> {
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &HashMap<String, T>,
    ) -> Result<()> {
        let mut map = serializer.map(ctx, value.len())?;
        for (key, entry) in value {
            map.entry_value(ctx, key, &self.inner, entry)?;
        }
        map.end()
    }

    fn decode(
        &self,
        ctx: &SerializationContext,
        deserializer: &mut dyn Deserializer,
    ) -> Result<HashMap<String, T>> {
        let mut map = deserializer.map(ctx)?;
        let capacity = capacity_for(map.estimated_size());
        let mut out = HashMap::with_capacity_and_hasher(capacity, FixedHashState);
        while map.has_next() {
            let (key, value) = map.next_entry(ctx, &self.inner)?;
            out.insert(key, value);
        }
        Ok(out)
    }
}

// -----------------------------------------------------------------------------
// StringMapEndec

/// `HashMap<K, V>` as a map, with keys converted to and from strings.
pub struct StringMapEndec<K, ToStr, FromStr, E> {
    key_to_string: ToStr,
    string_to_key: FromStr,
    value: E,
    _marker: PhantomData<fn() -> K>,
}

/// Builds a [`StringMapEndec`].
///
/// The two key conversions must be inverses of each other.
pub fn string_map<K, V, ToStr, FromStr, E>(
    key_to_string: ToStr,
    string_to_key: FromStr,
    value: E,
) -> StringMapEndec<K, ToStr, FromStr, E>
where
    K: Eq + Hash,
    ToStr: Fn(&K) -> String + Send + Sync,
    FromStr: Fn(&str) -> K + Send + Sync,
    E: Endec<V>,
{
    StringMapEndec {
        key_to_string,
        string_to_key,
        value,
        _marker: PhantomData,
    }
}

impl<K, V, ToStr, FromStr, E> Endec<HashMap<K, V>> for StringMapEndec<K, ToStr, FromStr, E>
where
    K: Eq + Hash,
    ToStr: Fn(&K) -> String + Send + Sync,
    FromStr: Fn(&str) -> K + Send + Sync,
    E: Endec<V>,
{
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &HashMap<K, V>,
    ) -> Result<()> {
        let mut map = serializer.map(ctx, value.len())?;
        for (key, entry) in value {
            map.entry_value(ctx, &(self.key_to_string)(key), &self.value, entry)?;
        }
        map.end()
    }

    fn decode(
        &self,
        ctx: &SerializationContext,
        deserializer: &mut dyn Deserializer,
    ) -> Result<HashMap<K, V>> {
        let mut map = deserializer.map(ctx)?;
        let capacity = capacity_for(map.estimated_size());
        let mut out = HashMap::with_capacity_and_hasher(capacity, FixedHashState);
        while map.has_next() {
            let (key, value) = map.next_entry(ctx, &self.value)?;
            out.insert((self.string_to_key)(&key), value);
        }
        Ok(out)
    }
}

// -----------------------------------------------------------------------------
// EntryMapEndec

/// `HashMap<K, V>` with arbitrary keys, written as a sequence of
/// `{ "k": key, "v": value }` structs.
#[derive(Debug, Clone, Copy)]
pub struct EntryMapEndec<KE, VE> {
    key: KE,
    value: VE,
}

/// Builds an [`EntryMapEndec`].
///
/// Use [`EndecExt::map_of`](super::EndecExt::map_of) or [`string_map`]
/// when keys are strings or convert to them.
pub fn map<KE, VE>(key: KE, value: VE) -> EntryMapEndec<KE, VE> {
    EntryMapEndec { key, value }
}

impl<K, V, KE, VE> Endec<HashMap<K, V>> for EntryMapEndec<KE, VE>
where
    K: Eq + Hash,
    KE: Endec<K>,
    VE: Endec<V>,
{
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &HashMap<K, V>,
    ) -> Result<()> {
        let mut sequence = serializer.sequence(ctx, value.len())?;
        for (key, entry) in value {
            sequence.element(&mut |serializer: &mut dyn Serializer| {
                let mut structure = serializer.structure()?;
                structure.field_value(ctx, "k", &self.key, key, false)?;
                structure.field_value(ctx, "v", &self.value, entry, false)?;
                structure.end()
            })?;
        }
        sequence.end()
    }

    fn decode(
        &self,
        ctx: &SerializationContext,
        deserializer: &mut dyn Deserializer,
    ) -> Result<HashMap<K, V>> {
        let mut sequence = deserializer.sequence(ctx)?;
        let capacity = capacity_for(sequence.estimated_size());
        let mut out = HashMap::with_capacity_and_hasher(capacity, FixedHashState);
        while sequence.has_next() {
            let mut slot = None;
            sequence.next(&mut |deserializer: &mut dyn Deserializer| {
                let mut structure = deserializer.structure()?;
                let key = structure.field_value(ctx, "k", &self.key, None)?;
                let value = structure.field_value(ctx, "v", &self.value, None)?;
                slot = Some((key, value));
                Ok(())
            })?;
            let (key, value) = slot.ok_or_else(EndecError::undelivered)?;
            out.insert(key, value);
        }
        Ok(out)
    }
}

// -----------------------------------------------------------------------------
// OptionalEndec

/// `Option<T>`, see [`EndecExt::optional_of`](super::EndecExt::optional_of).
#[derive(Debug, Clone, Copy)]
pub struct OptionalEndec<E> {
    inner: E,
}

impl<E> OptionalEndec<E> {
    #[inline]
    pub const fn new(inner: E) -> Self {
        Self { inner }
    }
}

impl<T, E: Endec<T>> Endec<Option<T>> for OptionalEndec<E> {
    #[inline]
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &Option<T>,
    ) -> Result<()> {
        serializer.write_optional_value(ctx, &self.inner, value.as_ref())
    }

    #[inline]
    fn decode(
        &self,
        ctx: &SerializationContext,
        deserializer: &mut dyn Deserializer,
    ) -> Result<Option<T>> {
        deserializer.read_optional_value(ctx, &self.inner)
    }
}
