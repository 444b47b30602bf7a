//! Struct-shaped endecs: [`StructEndec`], fields and builders.

// -----------------------------------------------------------------------------
// Modules

mod builder;
mod field;
mod recursive;

// -----------------------------------------------------------------------------
// Exports

pub use builder::{BuiltStructEndec, FieldsConstructor, StructEndecBuilder, StructFields};
pub use field::StructField;
pub use recursive::{RecursiveStructEndec, RecursiveStructHandle, recursive_struct};

// -----------------------------------------------------------------------------
// StructEndec

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::sync::Arc;
use core::marker::PhantomData;

use crate::context::SerializationContext;
use crate::de::{Deserializer, StructDeserializer};
use crate::endec::Endec;
use crate::error::{EndecError, Result};
use crate::ser::{Serializer, StructSerializer};

/// An [`Endec`] whose values are structs, encoded field by field.
///
/// Splitting the struct body from the struct frame lets several struct
/// endecs write into one struct: flattened fields, dispatched variants.
///
/// Implementors usually implement [`Endec`] through [`encode_as_struct`]
/// and [`decode_as_struct`].
pub trait StructEndec<T>: Endec<T> {
    fn encode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructSerializer,
        value: &T,
    ) -> Result<()>;

    fn decode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructDeserializer,
    ) -> Result<T>;
}

/// A shared, type-erased struct endec.
pub type DynStructEndec<T> = Arc<dyn StructEndec<T>>;

/// Opens a struct on `serializer`, writes `value` into it and closes it.
pub fn encode_as_struct<T, E>(
    endec: &E,
    ctx: &SerializationContext,
    serializer: &mut dyn Serializer,
    value: &T,
) -> Result<()>
where
    E: StructEndec<T> + ?Sized,
{
    let mut structure = serializer.structure()?;
    endec.encode_struct(ctx, &mut *structure, value)?;
    structure.end()
}

/// Opens a struct on `deserializer` and reads a value from it.
pub fn decode_as_struct<T, E>(
    endec: &E,
    ctx: &SerializationContext,
    deserializer: &mut dyn Deserializer,
) -> Result<T>
where
    E: StructEndec<T> + ?Sized,
{
    let mut structure = deserializer.structure()?;
    endec.decode_struct(ctx, &mut *structure)
}

macro_rules! forward_struct_endec {
    ($($ptr:ty),*) => {
        $(
            impl<T, E: StructEndec<T> + ?Sized> StructEndec<T> for $ptr {
                #[inline]
                fn encode_struct(
                    &self,
                    ctx: &SerializationContext,
                    structure: &mut dyn StructSerializer,
                    value: &T,
                ) -> Result<()> {
                    (**self).encode_struct(ctx, structure, value)
                }

                #[inline]
                fn decode_struct(
                    &self,
                    ctx: &SerializationContext,
                    structure: &mut dyn StructDeserializer,
                ) -> Result<T> {
                    (**self).decode_struct(ctx, structure)
                }
            }
        )*
    };
}

forward_struct_endec!(&E, Box<E>, Arc<E>);

// -----------------------------------------------------------------------------
// StructEndecExt

/// Combinators available on every [`StructEndec`].
pub trait StructEndecExt<T>: StructEndec<T> {
    /// A field that writes the fields of this endec inline into the outer struct.
    fn flat_field_of<S>(self, getter: impl Fn(&S) -> &T + Send + Sync + 'static) -> StructField<S, T>
    where
        Self: Sized + 'static,
        T: 'static,
        S: 'static,
    {
        StructField::flat(self, getter)
    }

    /// A flat field for an outer struct that exposes `T` through [`AsRef`].
    fn flat_inherited_field_of<S>(self) -> StructField<S, T>
    where
        Self: Sized + 'static,
        T: 'static,
        S: AsRef<T> + 'static,
    {
        StructField::flat(self, <S as AsRef<T>>::as_ref)
    }

    /// Struct-level [`catch_errors`](crate::EndecExt::catch_errors): the
    /// fallback works inside the same struct.
    fn structured_catch_errors<F>(self, fallback: F) -> StructuredCatchErrors<Self, F>
    where
        Self: Sized,
        F: Fn(&SerializationContext, &mut dyn StructDeserializer, EndecError) -> Result<T>
            + Send
            + Sync,
    {
        StructuredCatchErrors {
            inner: self,
            fallback,
        }
    }

    /// Erases the concrete endec type.
    fn boxed_struct(self) -> DynStructEndec<T>
    where
        Self: Sized + 'static,
    {
        Arc::new(self)
    }
}

impl<T, E: StructEndec<T> + ?Sized> StructEndecExt<T> for E {}

// -----------------------------------------------------------------------------
// FnStructEndec

/// A struct endec made from closures, see [`struct_endec_of`].
pub struct FnStructEndec<T, Enc, Dec> {
    encoder: Enc,
    decoder: Dec,
    _marker: PhantomData<fn() -> T>,
}

/// Builds a struct endec from an encode closure and a decode closure.
pub fn struct_endec_of<T, Enc, Dec>(encoder: Enc, decoder: Dec) -> FnStructEndec<T, Enc, Dec>
where
    Enc: Fn(&SerializationContext, &mut dyn StructSerializer, &T) -> Result<()> + Send + Sync,
    Dec: Fn(&SerializationContext, &mut dyn StructDeserializer) -> Result<T> + Send + Sync,
{
    FnStructEndec {
        encoder,
        decoder,
        _marker: PhantomData,
    }
}

impl<T, Enc, Dec> StructEndec<T> for FnStructEndec<T, Enc, Dec>
where
    Enc: Fn(&SerializationContext, &mut dyn StructSerializer, &T) -> Result<()> + Send + Sync,
    Dec: Fn(&SerializationContext, &mut dyn StructDeserializer) -> Result<T> + Send + Sync,
{
    #[inline]
    fn encode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructSerializer,
        value: &T,
    ) -> Result<()> {
        (self.encoder)(ctx, structure, value)
    }

    #[inline]
    fn decode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructDeserializer,
    ) -> Result<T> {
        (self.decoder)(ctx, structure)
    }
}

impl<T, Enc, Dec> Endec<T> for FnStructEndec<T, Enc, Dec>
where
    Enc: Fn(&SerializationContext, &mut dyn StructSerializer, &T) -> Result<()> + Send + Sync,
    Dec: Fn(&SerializationContext, &mut dyn StructDeserializer) -> Result<T> + Send + Sync,
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
// UnitEndec

/// A struct without fields, see [`unit`].
#[derive(Debug, Clone, Copy)]
pub struct UnitEndec<F> {
    factory: F,
}

/// A struct endec with no fields; decoding calls `factory`.
///
/// Useful as a dispatch target for variants that carry no data.
pub fn unit<T, F: Fn() -> T + Send + Sync>(factory: F) -> UnitEndec<F> {
    UnitEndec { factory }
}

impl<T, F: Fn() -> T + Send + Sync> StructEndec<T> for UnitEndec<F> {
    #[inline]
    fn encode_struct(&self, _: &SerializationContext, _: &mut dyn StructSerializer, _: &T) -> Result<()> {
        Ok(())
    }

    #[inline]
    fn decode_struct(&self, _: &SerializationContext, _: &mut dyn StructDeserializer) -> Result<T> {
        Ok((self.factory)())
    }
}

impl<T, F: Fn() -> T + Send + Sync> Endec<T> for UnitEndec<F> {
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
// StructOf

/// A struct holding one value under a fixed name, see
/// [`EndecExt::struct_of`](crate::EndecExt::struct_of).
#[derive(Debug, Clone)]
pub struct StructOf<E> {
    inner: E,
    name: Cow<'static, str>,
}

impl<E> StructOf<E> {
    pub fn new(inner: E, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            inner,
            name: name.into(),
        }
    }
}

impl<T, E: Endec<T>> StructEndec<T> for StructOf<E> {
    fn encode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructSerializer,
        value: &T,
    ) -> Result<()> {
        structure.field_value(ctx, &self.name, &self.inner, value, false)
    }

    fn decode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructDeserializer,
    ) -> Result<T> {
        structure.field_value(ctx, &self.name, &self.inner, None)
    }
}

impl<T, E: Endec<T>> Endec<T> for StructOf<E> {
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
// StructuredCatchErrors

/// See [`StructEndecExt::structured_catch_errors`].
pub struct StructuredCatchErrors<E, F> {
    inner: E,
    fallback: F,
}

impl<T, E, F> StructEndec<T> for StructuredCatchErrors<E, F>
where
    E: StructEndec<T>,
    F: Fn(&SerializationContext, &mut dyn StructDeserializer, EndecError) -> Result<T> + Send + Sync,
{
    #[inline]
    fn encode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructSerializer,
        value: &T,
    ) -> Result<()> {
        self.inner.encode_struct(ctx, structure, value)
    }

    fn decode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructDeserializer,
    ) -> Result<T> {
        match structure.try_read_value(|structure| self.inner.decode_struct(ctx, structure)) {
            Ok(value) => Ok(value),
            Err(err) => {
                log::debug!("struct decode failed, using fallback: {err}");
                (self.fallback)(ctx, structure, err)
            }
        }
    }
}

impl<T, E, F> Endec<T> for StructuredCatchErrors<E, F>
where
    E: StructEndec<T>,
    F: Fn(&SerializationContext, &mut dyn StructDeserializer, EndecError) -> Result<T> + Send + Sync,
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
