use core::marker::PhantomData;

use super::Endec;
use crate::context::SerializationContext;
use crate::de::{Deserializer, StructDeserializer};
use crate::error::{EndecError, RangeError, Result};
use crate::number::RangeNumber;
use crate::ser::{Serializer, StructSerializer};
use crate::structs::StructEndec;

// -----------------------------------------------------------------------------
// Xmap

/// Maps an endec of `T` into an endec of `R`, see
/// [`EndecExt::xmap`](super::EndecExt::xmap).
///
/// Struct endecs stay struct endecs through the mapping.
pub struct Xmap<E, To, From, T> {
    inner: E,
    to: To,
    from: From,
    _marker: PhantomData<fn() -> T>,
}

impl<E, To, From, T> Xmap<E, To, From, T> {
    #[inline]
    pub const fn new(inner: E, to: To, from: From) -> Self {
        Self {
            inner,
            to,
            from,
            _marker: PhantomData,
        }
    }
}

impl<E, To, From, T, R> Endec<R> for Xmap<E, To, From, T>
where
    E: Endec<T>,
    To: Fn(T) -> R + Send + Sync,
    From: Fn(&R) -> T + Send + Sync,
{
    #[inline]
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &R,
    ) -> Result<()> {
        self.inner.encode(ctx, serializer, &(self.from)(value))
    }

    #[inline]
    fn decode(&self, ctx: &SerializationContext, deserializer: &mut dyn Deserializer) -> Result<R> {
        self.inner.decode(ctx, deserializer).map(&self.to)
    }
}

impl<E, To, From, T, R> StructEndec<R> for Xmap<E, To, From, T>
where
    E: StructEndec<T>,
    To: Fn(T) -> R + Send + Sync,
    From: Fn(&R) -> T + Send + Sync,
{
    #[inline]
    fn encode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructSerializer,
        value: &R,
    ) -> Result<()> {
        self.inner.encode_struct(ctx, structure, &(self.from)(value))
    }

    #[inline]
    fn decode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructDeserializer,
    ) -> Result<R> {
        self.inner.decode_struct(ctx, structure).map(&self.to)
    }
}

// -----------------------------------------------------------------------------
// XmapWithContext

/// [`Xmap`] whose conversions also see the context.
pub struct XmapWithContext<E, To, From, T> {
    inner: E,
    to: To,
    from: From,
    _marker: PhantomData<fn() -> T>,
}

impl<E, To, From, T> XmapWithContext<E, To, From, T> {
    #[inline]
    pub const fn new(inner: E, to: To, from: From) -> Self {
        Self {
            inner,
            to,
            from,
            _marker: PhantomData,
        }
    }
}

impl<E, To, From, T, R> Endec<R> for XmapWithContext<E, To, From, T>
where
    E: Endec<T>,
    To: Fn(&SerializationContext, T) -> R + Send + Sync,
    From: Fn(&SerializationContext, &R) -> T + Send + Sync,
{
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &R,
    ) -> Result<()> {
        self.inner.encode(ctx, serializer, &(self.from)(ctx, value))
    }

    fn decode(&self, ctx: &SerializationContext, deserializer: &mut dyn Deserializer) -> Result<R> {
        let value = self.inner.decode(ctx, deserializer)?;
        Ok((self.to)(ctx, value))
    }
}

impl<E, To, From, T, R> StructEndec<R> for XmapWithContext<E, To, From, T>
where
    E: StructEndec<T>,
    To: Fn(&SerializationContext, T) -> R + Send + Sync,
    From: Fn(&SerializationContext, &R) -> T + Send + Sync,
{
    fn encode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructSerializer,
        value: &R,
    ) -> Result<()> {
        self.inner.encode_struct(ctx, structure, &(self.from)(ctx, value))
    }

    fn decode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructDeserializer,
    ) -> Result<R> {
        let value = self.inner.decode_struct(ctx, structure)?;
        Ok((self.to)(ctx, value))
    }
}

// -----------------------------------------------------------------------------
// Validate

/// Checks values before encoding and after decoding.
pub struct Validate<E, V> {
    inner: E,
    validator: V,
}

impl<E, V> Validate<E, V> {
    #[inline]
    pub const fn new(inner: E, validator: V) -> Self {
        Self { inner, validator }
    }
}

impl<T, E, V> Endec<T> for Validate<E, V>
where
    E: Endec<T>,
    V: Fn(&T) -> Result<()> + Send + Sync,
{
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &T,
    ) -> Result<()> {
        (self.validator)(value)?;
        self.inner.encode(ctx, serializer, value)
    }

    fn decode(&self, ctx: &SerializationContext, deserializer: &mut dyn Deserializer) -> Result<T> {
        let value = self.inner.decode(ctx, deserializer)?;
        (self.validator)(&value)?;
        Ok(value)
    }
}

impl<T, E, V> StructEndec<T> for Validate<E, V>
where
    E: StructEndec<T>,
    V: Fn(&T) -> Result<()> + Send + Sync,
{
    fn encode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructSerializer,
        value: &T,
    ) -> Result<()> {
        (self.validator)(value)?;
        self.inner.encode_struct(ctx, structure, value)
    }

    fn decode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructDeserializer,
    ) -> Result<T> {
        let value = self.inner.decode_struct(ctx, structure)?;
        (self.validator)(&value)?;
        Ok(value)
    }
}

// -----------------------------------------------------------------------------
// Ranged

/// Bounds numbers to an inclusive range.
///
/// Out-of-range values either fail with [`RangeError`] or are clamped to
/// the violated bound, on both encode and decode.
#[derive(Debug, Clone, Copy)]
pub struct Ranged<E, N> {
    inner: E,
    min: Option<N>,
    max: Option<N>,
    throw_error: bool,
}

impl<E, N: RangeNumber> Ranged<E, N> {
    #[inline]
    pub const fn new(inner: E, min: Option<N>, max: Option<N>, throw_error: bool) -> Self {
        Self {
            inner,
            min,
            max,
            throw_error,
        }
    }

    fn check(&self, value: N) -> Result<N> {
        let below = self.min.filter(|min| value < *min);
        let above = self.max.filter(|max| value > *max);
        let Some(bound) = below.or(above) else {
            return Ok(value);
        };

        if self.throw_error {
            Err(EndecError::Range(RangeError {
                value: value.into(),
                min: self.min.map(Into::into),
                max: self.max.map(Into::into),
            }))
        } else {
            Ok(bound)
        }
    }
}

impl<E: Endec<N>, N: RangeNumber> Endec<N> for Ranged<E, N> {
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &N,
    ) -> Result<()> {
        self.inner.encode(ctx, serializer, &self.check(*value)?)
    }

    fn decode(&self, ctx: &SerializationContext, deserializer: &mut dyn Deserializer) -> Result<N> {
        let value = self.inner.decode(ctx, deserializer)?;
        self.check(value)
    }
}

// -----------------------------------------------------------------------------
// CatchErrors

/// Recovers from decode failures, see
/// [`EndecExt::catch_errors`](super::EndecExt::catch_errors).
pub struct CatchErrors<E, F> {
    inner: E,
    fallback: F,
}

impl<E, F> CatchErrors<E, F> {
    #[inline]
    pub const fn new(inner: E, fallback: F) -> Self {
        Self { inner, fallback }
    }
}

impl<T, E, F> Endec<T> for CatchErrors<E, F>
where
    E: Endec<T>,
    F: Fn(&SerializationContext, &mut dyn Deserializer, EndecError) -> Result<T> + Send + Sync,
{
    #[inline]
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &T,
    ) -> Result<()> {
        self.inner.encode(ctx, serializer, value)
    }

    fn decode(&self, ctx: &SerializationContext, deserializer: &mut dyn Deserializer) -> Result<T> {
        match deserializer.try_read_value(|de| self.inner.decode(ctx, de)) {
            Ok(value) => Ok(value),
            Err(err) => {
                log::debug!("decode failed, using fallback: {err}");
                (self.fallback)(ctx, deserializer, err)
            }
        }
    }
}
