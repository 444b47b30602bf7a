//! Polymorphic endecs: a variant key written first selects the endec for the rest.

use alloc::borrow::Cow;
use alloc::format;
use core::fmt::Debug;
use core::marker::PhantomData;

use crate::context::SerializationContext;
use crate::de::{Deserializer, StructDeserializer};
use crate::endec::{DynEndec, Endec};
use crate::error::{EndecError, Result};
use crate::ser::{Serializer, StructSerializer};
use crate::structs::{DynStructEndec, StructEndec, decode_as_struct, encode_as_struct};

fn unregistered(variant: &impl Debug) -> EndecError {
    EndecError::UnregisteredVariant {
        variant: format!("{variant:?}"),
    }
}

// -----------------------------------------------------------------------------
// DispatchedStruct

/// See [`dispatched_struct`].
pub struct DispatchedStruct<T, K, L, I, KE> {
    lookup: L,
    variant_of: I,
    variant_endec: KE,
    key: Cow<'static, str>,
    _marker: PhantomData<fn() -> (T, K)>,
}

/// A struct endec writing a variant key field next to the variant's own fields.
///
/// - `variant_to_endec` returns the struct endec of a variant, `None` if unknown.
/// - `instance_to_variant` returns the variant of a value.
/// - `variant_endec` encodes the key, stored in field `variant_key`.
///
/// The variant's fields are written flat into the same struct. Unknown
/// variants fail with [`EndecError::UnregisteredVariant`].
///
/// # Examples
///
/// ```
/// use endec_core::{EndecExt, INT, STRING, StructEndecBuilder, StructEndecExt};
/// use endec_core::{dispatched_struct, unit};
///
/// enum Shape {
///     Circle(i32),
///     Empty,
/// }
///
/// let circle = StructEndecBuilder::of1(
///     INT.field_of("radius", |s: &Shape| match s {
///         Shape::Circle(radius) => radius,
///         Shape::Empty => &0,
///     }),
///     Shape::Circle,
/// )
/// .boxed_struct();
/// let empty = unit(|| Shape::Empty).boxed_struct();
///
/// let shape = dispatched_struct(
///     move |kind: &String| match kind.as_str() {
///         "circle" => Some(circle.clone()),
///         "empty" => Some(empty.clone()),
///         _ => None,
///     },
///     |s: &Shape| match s {
///         Shape::Circle(_) => "circle".to_string(),
///         Shape::Empty => "empty".to_string(),
///     },
///     STRING,
///     "type",
/// );
/// # let _ = shape;
/// ```
pub fn dispatched_struct<T, K, L, I, KE>(
    variant_to_endec: L,
    instance_to_variant: I,
    variant_endec: KE,
    variant_key: impl Into<Cow<'static, str>>,
) -> DispatchedStruct<T, K, L, I, KE>
where
    K: Debug,
    L: Fn(&K) -> Option<DynStructEndec<T>> + Send + Sync,
    I: Fn(&T) -> K + Send + Sync,
    KE: Endec<K>,
{
    DispatchedStruct {
        lookup: variant_to_endec,
        variant_of: instance_to_variant,
        variant_endec,
        key: variant_key.into(),
        _marker: PhantomData,
    }
}

impl<T, K, L, I, KE> DispatchedStruct<T, K, L, I, KE>
where
    K: Debug,
    L: Fn(&K) -> Option<DynStructEndec<T>> + Send + Sync,
{
    fn resolve(&self, variant: &K) -> Result<DynStructEndec<T>> {
        let endec = (self.lookup)(variant).ok_or_else(|| unregistered(variant))?;
        log::trace!("dispatching struct variant {variant:?}");
        Ok(endec)
    }
}

impl<T, K, L, I, KE> StructEndec<T> for DispatchedStruct<T, K, L, I, KE>
where
    K: Debug,
    L: Fn(&K) -> Option<DynStructEndec<T>> + Send + Sync,
    I: Fn(&T) -> K + Send + Sync,
    KE: Endec<K>,
{
    fn encode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructSerializer,
        value: &T,
    ) -> Result<()> {
        let variant = (self.variant_of)(value);
        let endec = self.resolve(&variant)?;
        structure.field_value(ctx, &self.key, &self.variant_endec, &variant, false)?;
        endec.encode_struct(ctx, structure, value)
    }

    fn decode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructDeserializer,
    ) -> Result<T> {
        let variant = structure.field_value(ctx, &self.key, &self.variant_endec, None)?;
        self.resolve(&variant)?.decode_struct(ctx, structure)
    }
}

impl<T, K, L, I, KE> Endec<T> for DispatchedStruct<T, K, L, I, KE>
where
    K: Debug,
    L: Fn(&K) -> Option<DynStructEndec<T>> + Send + Sync,
    I: Fn(&T) -> K + Send + Sync,
    KE: Endec<K>,
{
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &T,
    ) -> Result<()> {
        encode_as_struct(self, ctx, serializer, value)
    }

    fn decode(&self, ctx: &SerializationContext, deserializer: &mut dyn Deserializer) -> Result<T> {
        decode_as_struct(self, ctx, deserializer)
    }
}

// -----------------------------------------------------------------------------
// Dispatched

/// See [`dispatched`].
pub struct Dispatched<T, K, L, I, KE> {
    lookup: L,
    variant_of: I,
    variant_endec: KE,
    _marker: PhantomData<fn() -> (T, K)>,
}

/// Like [`dispatched_struct`] for variants with any endec.
///
/// Values are written as a struct with the key in field `variant` and the
/// value, encoded by the variant's endec, in field `instance`.
pub fn dispatched<T, K, L, I, KE>(
    variant_to_endec: L,
    instance_to_variant: I,
    variant_endec: KE,
) -> Dispatched<T, K, L, I, KE>
where
    K: Debug,
    L: Fn(&K) -> Option<DynEndec<T>> + Send + Sync,
    I: Fn(&T) -> K + Send + Sync,
    KE: Endec<K>,
{
    Dispatched {
        lookup: variant_to_endec,
        variant_of: instance_to_variant,
        variant_endec,
        _marker: PhantomData,
    }
}

impl<T, K, L, I, KE> Dispatched<T, K, L, I, KE>
where
    K: Debug,
    L: Fn(&K) -> Option<DynEndec<T>> + Send + Sync,
{
    fn resolve(&self, variant: &K) -> Result<DynEndec<T>> {
        let endec = (self.lookup)(variant).ok_or_else(|| unregistered(variant))?;
        log::trace!("dispatching variant {variant:?}");
        Ok(endec)
    }
}

impl<T, K, L, I, KE> StructEndec<T> for Dispatched<T, K, L, I, KE>
where
    K: Debug,
    L: Fn(&K) -> Option<DynEndec<T>> + Send + Sync,
    I: Fn(&T) -> K + Send + Sync,
    KE: Endec<K>,
{
    fn encode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructSerializer,
        value: &T,
    ) -> Result<()> {
        let variant = (self.variant_of)(value);
        let endec = self.resolve(&variant)?;
        structure.field_value(ctx, "variant", &self.variant_endec, &variant, false)?;
        structure.field_value(ctx, "instance", &endec, value, false)
    }

    fn decode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructDeserializer,
    ) -> Result<T> {
        let variant = structure.field_value(ctx, "variant", &self.variant_endec, None)?;
        let endec = self.resolve(&variant)?;
        structure.field_value(ctx, "instance", &endec, None)
    }
}

impl<T, K, L, I, KE> Endec<T> for Dispatched<T, K, L, I, KE>
where
    K: Debug,
    L: Fn(&K) -> Option<DynEndec<T>> + Send + Sync,
    I: Fn(&T) -> K + Send + Sync,
    KE: Endec<K>,
{
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &T,
    ) -> Result<()> {
        encode_as_struct(self, ctx, serializer, value)
    }

    fn decode(&self, ctx: &SerializationContext, deserializer: &mut dyn Deserializer) -> Result<T> {
        decode_as_struct(self, ctx, deserializer)
    }
}
