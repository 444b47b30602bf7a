//! The [`Endec`] trait and its combinators.

// -----------------------------------------------------------------------------
// Modules

mod attribute;
mod collection;
mod enums;
mod primitive;
mod recursive;
mod transform;

// -----------------------------------------------------------------------------
// Exports

pub use attribute::{AttributeEndec, AttributeEndecBuilder, if_attr};
pub use collection::{EntryMapEndec, ListEndec, MapOfEndec, OptionalEndec, SetEndec};
pub use collection::{StringMapEndec, map, string_map};
pub use enums::{EnumConstants, EnumNameEndec, EnumOrdinalEndec, for_enum};
pub use primitive::{BOOL, BYTE, BYTES, DOUBLE, FLOAT, INT, LONG, SHORT, STRING};
pub use primitive::{BoolEndec, ByteEndec, BytesEndec, DoubleEndec, FloatEndec, IntEndec};
pub use primitive::{LongEndec, ShortEndec, StringEndec, VarIntEndec, VarLongEndec, VoidEndec};
pub use primitive::{VAR_INT, VAR_LONG, VOID};
pub use recursive::{RecursiveEndec, RecursiveHandle, recursive};
pub use transform::{CatchErrors, Ranged, Validate, Xmap, XmapWithContext};

// -----------------------------------------------------------------------------
// Endec

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::sync::Arc;
use core::fmt;
use core::marker::PhantomData;

use crate::context::SerializationContext;
use crate::de::Deserializer;
use crate::error::{EndecError, Result};
use crate::keyed::KeyedEndec;
use crate::number::RangeNumber;
use crate::ser::Serializer;
use crate::structs::{StructField, StructOf};

/// Encodes and decodes values of type `T` against any format.
///
/// An endec must never assume a particular format. Formats that keep no
/// schema must decode what the same endec encoded, so encode and decode
/// have to issue the same calls in the same order.
///
/// Endecs are shared across threads and composed freely; combinators live
/// on [`EndecExt`].
///
/// # Examples
///
/// ```
/// use endec_core::{EndecExt, INT};
///
/// let positive = INT.validate(|v: &i32| {
///     if *v > 0 { Ok(()) } else { Err(endec_core::EndecError::custom("not positive")) }
/// });
/// let endecs = positive.list_of();
/// # let _ = endecs;
/// ```
pub trait Endec<T>: Send + Sync {
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &T,
    ) -> Result<()>;

    fn decode(&self, ctx: &SerializationContext, deserializer: &mut dyn Deserializer) -> Result<T>;
}

/// A shared, type-erased endec.
pub type DynEndec<T> = Arc<dyn Endec<T>>;

impl<T, E: Endec<T> + ?Sized> Endec<T> for &E {
    #[inline]
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &T,
    ) -> Result<()> {
        (**self).encode(ctx, serializer, value)
    }

    #[inline]
    fn decode(&self, ctx: &SerializationContext, deserializer: &mut dyn Deserializer) -> Result<T> {
        (**self).decode(ctx, deserializer)
    }
}

impl<T, E: Endec<T> + ?Sized> Endec<T> for Box<E> {
    #[inline]
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &T,
    ) -> Result<()> {
        (**self).encode(ctx, serializer, value)
    }

    #[inline]
    fn decode(&self, ctx: &SerializationContext, deserializer: &mut dyn Deserializer) -> Result<T> {
        (**self).decode(ctx, deserializer)
    }
}

impl<T, E: Endec<T> + ?Sized> Endec<T> for Arc<E> {
    #[inline]
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &T,
    ) -> Result<()> {
        (**self).encode(ctx, serializer, value)
    }

    #[inline]
    fn decode(&self, ctx: &SerializationContext, deserializer: &mut dyn Deserializer) -> Result<T> {
        (**self).decode(ctx, deserializer)
    }
}

// -----------------------------------------------------------------------------
// Whole-session helpers

/// A serializer that owns what it writes and hands it over at the end.
pub trait ResultSerializer: Serializer + Sized {
    type Output;

    /// Finishes the session, failing if nothing was written.
    fn result(self) -> Result<Self::Output>;
}

// -----------------------------------------------------------------------------
// EndecExt

/// Whole-session entry points and combinators, available on every [`Endec`].
pub trait EndecExt<T>: Endec<T> {
    /// Encodes `value` into a fresh serializer from `make` under an empty context.
    fn encode_fully<S: ResultSerializer>(
        &self,
        make: impl FnOnce() -> S,
        value: &T,
    ) -> Result<S::Output> {
        self.encode_fully_with(&SerializationContext::empty(), make, value)
    }

    /// Encodes `value` into a fresh serializer from `make`.
    ///
    /// The serializer may extend `ctx` through [`Serializer::setup_context`].
    fn encode_fully_with<S: ResultSerializer>(
        &self,
        ctx: &SerializationContext,
        make: impl FnOnce() -> S,
        value: &T,
    ) -> Result<S::Output> {
        let mut serializer = make();
        let ctx = serializer.setup_context(ctx.clone());
        self.encode(&ctx, &mut serializer, value)?;
        serializer.result()
    }

    /// Decodes `input` with a deserializer from `make` under an empty context.
    fn decode_fully<I, D: Deserializer>(&self, make: impl FnOnce(I) -> D, input: I) -> Result<T> {
        self.decode_fully_with(&SerializationContext::empty(), make, input)
    }

    /// Decodes `input` with a deserializer from `make`.
    fn decode_fully_with<I, D: Deserializer>(
        &self,
        ctx: &SerializationContext,
        make: impl FnOnce(I) -> D,
        input: I,
    ) -> Result<T> {
        let mut deserializer = make(input);
        let ctx = deserializer.setup_context(ctx.clone());
        self.decode(&ctx, &mut deserializer)
    }

    // --- collections ---

    /// A list of values; written as a sequence.
    fn list_of(self) -> ListEndec<Self>
    where
        Self: Sized,
    {
        ListEndec::new(self)
    }

    /// A string-keyed map of values.
    fn map_of(self) -> MapOfEndec<Self>
    where
        Self: Sized,
    {
        MapOfEndec::new(self)
    }

    /// A set of values; written as a sequence.
    fn set_of(self) -> SetEndec<Self>
    where
        Self: Sized,
    {
        SetEndec::new(self)
    }

    /// An `Option<T>`, written with [`Serializer::write_optional`].
    fn optional_of(self) -> OptionalEndec<Self>
    where
        Self: Sized,
    {
        OptionalEndec::new(self)
    }

    /// Same as [`optional_of`](Self::optional_of); `None` is Rust's null.
    fn nullable_of(self) -> OptionalEndec<Self>
    where
        Self: Sized,
    {
        OptionalEndec::new(self)
    }

    // --- transforms ---

    /// Converts between `T` and `R` on the way in and out.
    fn xmap<R, To, From>(self, to: To, from: From) -> Xmap<Self, To, From, T>
    where
        Self: Sized,
        To: Fn(T) -> R + Send + Sync,
        From: Fn(&R) -> T + Send + Sync,
    {
        Xmap::new(self, to, from)
    }

    /// Like [`xmap`](Self::xmap), with access to the context.
    fn xmap_with_context<R, To, From>(self, to: To, from: From) -> XmapWithContext<Self, To, From, T>
    where
        Self: Sized,
        To: Fn(&SerializationContext, T) -> R + Send + Sync,
        From: Fn(&SerializationContext, &R) -> T + Send + Sync,
    {
        XmapWithContext::new(self, to, from)
    }

    /// Runs `validator` before encoding and after decoding.
    fn validate<V>(self, validator: V) -> Validate<Self, V>
    where
        Self: Sized,
        V: Fn(&T) -> Result<()> + Send + Sync,
    {
        Validate::new(self, validator)
    }

    /// Bounds a number to `[min, max]`; out-of-range values fail when
    /// `throw_error` is set and are clamped otherwise.
    fn ranged(self, min: Option<T>, max: Option<T>, throw_error: bool) -> Ranged<Self, T>
    where
        Self: Sized,
        T: RangeNumber,
    {
        Ranged::new(self, min, max, throw_error)
    }

    /// Fails on numbers outside `[min, max]`.
    fn ranged_between(self, min: T, max: T) -> Ranged<Self, T>
    where
        Self: Sized,
        T: RangeNumber,
    {
        Ranged::new(self, Some(min), Some(max), true)
    }

    /// Fails on numbers below `min`.
    fn ranged_min(self, min: T) -> Ranged<Self, T>
    where
        Self: Sized,
        T: RangeNumber,
    {
        Ranged::new(self, Some(min), None, true)
    }

    /// Fails on numbers above `max`.
    fn ranged_max(self, max: T) -> Ranged<Self, T>
    where
        Self: Sized,
        T: RangeNumber,
    {
        Ranged::new(self, None, Some(max), true)
    }

    /// Clamps numbers into `[min, max]`.
    fn clamped(self, min: T, max: T) -> Ranged<Self, T>
    where
        Self: Sized,
        T: RangeNumber,
    {
        Ranged::new(self, Some(min), Some(max), false)
    }

    /// Clamps numbers to at least `min`.
    fn clamped_min(self, min: T) -> Ranged<Self, T>
    where
        Self: Sized,
        T: RangeNumber,
    {
        Ranged::new(self, Some(min), None, false)
    }

    /// Clamps numbers to at most `max`.
    fn clamped_max(self, max: T) -> Ranged<Self, T>
    where
        Self: Sized,
        T: RangeNumber,
    {
        Ranged::new(self, None, Some(max), false)
    }

    /// Decodes inside [`Deserializer::try_read`]; on failure `fallback` gets
    /// the rolled-back deserializer and the error.
    fn catch_errors<F>(self, fallback: F) -> CatchErrors<Self, F>
    where
        Self: Sized,
        F: Fn(&SerializationContext, &mut dyn Deserializer, EndecError) -> Result<T> + Send + Sync,
    {
        CatchErrors::new(self, fallback)
    }

    // --- structs ---

    /// Wraps values in a struct with a single field `name`.
    fn struct_of(self, name: impl Into<Cow<'static, str>>) -> StructOf<Self>
    where
        Self: Sized,
    {
        StructOf::new(self, name)
    }

    /// A mandatory struct field.
    fn field_of<S>(
        self,
        name: impl Into<Cow<'static, str>>,
        getter: impl Fn(&S) -> &T + Send + Sync + 'static,
    ) -> StructField<S, T>
    where
        Self: Sized + 'static,
        T: 'static,
        S: 'static,
    {
        StructField::new(name, self, getter)
    }

    /// A struct field decoding to `default` when absent.
    fn optional_field_of<S>(
        self,
        name: impl Into<Cow<'static, str>>,
        getter: impl Fn(&S) -> &T + Send + Sync + 'static,
        default: T,
    ) -> StructField<S, T>
    where
        Self: Sized + 'static,
        T: Clone + Send + Sync + 'static,
        S: 'static,
    {
        StructField::optional(name, self, getter, move || default.clone())
    }

    /// A struct field decoding to `default()` when absent.
    fn optional_field_of_lazy<S>(
        self,
        name: impl Into<Cow<'static, str>>,
        getter: impl Fn(&S) -> &T + Send + Sync + 'static,
        default: impl Fn() -> T + Send + Sync + 'static,
    ) -> StructField<S, T>
    where
        Self: Sized + 'static,
        T: 'static,
        S: 'static,
    {
        StructField::optional(name, self, getter, default)
    }

    // --- misc ---

    /// Binds this endec to a map key with a default, see [`MapCarrier`](crate::MapCarrier).
    fn keyed(
        self,
        key: impl Into<Cow<'static, str>>,
        default: impl Fn() -> T + Send + Sync + 'static,
    ) -> KeyedEndec<T>
    where
        Self: Sized + 'static,
        T: 'static,
    {
        KeyedEndec::new(key, self, default)
    }

    /// Erases the concrete endec type.
    fn boxed(self) -> DynEndec<T>
    where
        Self: Sized + 'static,
    {
        Arc::new(self)
    }
}

impl<T, E: Endec<T> + ?Sized> EndecExt<T> for E {}

// -----------------------------------------------------------------------------
// FnEndec

/// An endec made from a pair of closures, see [`endec_of`].
pub struct FnEndec<T, Enc, Dec> {
    encoder: Enc,
    decoder: Dec,
    _marker: PhantomData<fn() -> T>,
}

/// Builds an endec from an encode closure and a decode closure.
///
/// # Examples
///
/// ```
/// use endec_core::{Endec, endec_of};
///
/// // A bool stored as a single byte.
/// let flag = endec_of(
///     |ctx, ser, value: &bool| ser.write_i8(ctx, *value as i8),
///     |ctx, de| Ok(de.read_i8(ctx)? != 0),
/// );
/// # let _ = flag;
/// ```
pub fn endec_of<T, Enc, Dec>(encoder: Enc, decoder: Dec) -> FnEndec<T, Enc, Dec>
where
    Enc: Fn(&SerializationContext, &mut dyn Serializer, &T) -> Result<()> + Send + Sync,
    Dec: Fn(&SerializationContext, &mut dyn Deserializer) -> Result<T> + Send + Sync,
{
    FnEndec {
        encoder,
        decoder,
        _marker: PhantomData,
    }
}

impl<T, Enc, Dec> Endec<T> for FnEndec<T, Enc, Dec>
where
    Enc: Fn(&SerializationContext, &mut dyn Serializer, &T) -> Result<()> + Send + Sync,
    Dec: Fn(&SerializationContext, &mut dyn Deserializer) -> Result<T> + Send + Sync,
{
    #[inline]
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &T,
    ) -> Result<()> {
        (self.encoder)(ctx, serializer, value)
    }

    #[inline]
    fn decode(&self, ctx: &SerializationContext, deserializer: &mut dyn Deserializer) -> Result<T> {
        (self.decoder)(ctx, deserializer)
    }
}

impl<T, Enc, Dec> fmt::Debug for FnEndec<T, Enc, Dec> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnEndec")
    }
}
