//! The format side of encoding.
//!
//! A format implements [`Serializer`] plus the three compound states it hands
//! out. Nested values are written through callbacks ([`EncodeFn`]) so that a
//! compound state can decide when and where the nested value lands, and the
//! traits stay object safe.

use alloc::borrow::Cow;
use alloc::boxed::Box;

use crate::context::SerializationContext;
use crate::endec::Endec;
use crate::error::Result;

// -----------------------------------------------------------------------------
// Callbacks

/// Writes one nested value into the serializer it is given.
pub type EncodeFn<'a> = &'a mut dyn FnMut(&mut dyn Serializer) -> Result<()>;

// -----------------------------------------------------------------------------
// Serializer

/// The format side of encoding.
pub trait Serializer {
    /// Adjusts the caller's context before an encode session starts.
    ///
    /// Human readable formats add [`HUMAN_READABLE`](crate::HUMAN_READABLE) here.
    fn setup_context(&self, ctx: SerializationContext) -> SerializationContext {
        ctx
    }

    fn write_i8(&mut self, ctx: &SerializationContext, value: i8) -> Result<()>;
    fn write_i16(&mut self, ctx: &SerializationContext, value: i16) -> Result<()>;
    fn write_i32(&mut self, ctx: &SerializationContext, value: i32) -> Result<()>;
    fn write_i64(&mut self, ctx: &SerializationContext, value: i64) -> Result<()>;
    fn write_f32(&mut self, ctx: &SerializationContext, value: f32) -> Result<()>;
    fn write_f64(&mut self, ctx: &SerializationContext, value: f64) -> Result<()>;

    /// Writes an `i32` that formats may store in a variable-width encoding.
    fn write_var_i32(&mut self, ctx: &SerializationContext, value: i32) -> Result<()>;
    /// Writes an `i64` that formats may store in a variable-width encoding.
    fn write_var_i64(&mut self, ctx: &SerializationContext, value: i64) -> Result<()>;

    fn write_bool(&mut self, ctx: &SerializationContext, value: bool) -> Result<()>;
    fn write_str(&mut self, ctx: &SerializationContext, value: &str) -> Result<()>;
    fn write_bytes(&mut self, ctx: &SerializationContext, value: &[u8]) -> Result<()>;

    /// Writes a present value through `value`, or marks absence when `None`.
    fn write_optional(
        &mut self,
        ctx: &SerializationContext,
        value: Option<EncodeFn<'_>>,
    ) -> Result<()>;

    /// Starts a sequence of `size` elements.
    fn sequence(
        &mut self,
        ctx: &SerializationContext,
        size: usize,
    ) -> Result<Box<dyn SequenceSerializer + '_>>;

    /// Starts a string-keyed map of `size` entries.
    fn map(&mut self, ctx: &SerializationContext, size: usize)
    -> Result<Box<dyn MapSerializer + '_>>;

    /// Starts a struct.
    fn structure(&mut self) -> Result<Box<dyn StructSerializer + '_>>;

    /// Returns `self` if this format can represent arbitrary data without a schema.
    fn as_self_describing(&mut self) -> Option<&mut dyn SelfDescribingSerializer> {
        None
    }
}

/// Marker for serializers able to receive any value replayed by a
/// [`SelfDescribingDeserializer`](crate::SelfDescribingDeserializer).
pub trait SelfDescribingSerializer: Serializer {}

// -----------------------------------------------------------------------------
// Compound states

/// An open sequence; finished with [`end`](SequenceSerializer::end).
pub trait SequenceSerializer {
    fn element(&mut self, encode: EncodeFn<'_>) -> Result<()>;
    fn end(self: Box<Self>) -> Result<()>;
}

/// An open string-keyed map; finished with [`end`](MapSerializer::end).
pub trait MapSerializer {
    fn entry(&mut self, key: &str, encode: EncodeFn<'_>) -> Result<()>;
    fn end(self: Box<Self>) -> Result<()>;
}

/// An open struct; finished with [`end`](StructSerializer::end).
///
/// `may_omit` is `true` for fields that have a default. Formats may then
/// drop the field when its value encodes to an empty optional.
pub trait StructSerializer {
    fn field(&mut self, name: &str, may_omit: bool, encode: EncodeFn<'_>) -> Result<()>;
    fn end(self: Box<Self>) -> Result<()>;
}

// -----------------------------------------------------------------------------
// Typed helpers

impl dyn Serializer + '_ {
    /// Writes `value` through `endec` as an optional.
    pub fn write_optional_value<T, E>(
        &mut self,
        ctx: &SerializationContext,
        endec: &E,
        value: Option<&T>,
    ) -> Result<()>
    where
        E: Endec<T> + ?Sized,
    {
        match value {
            Some(value) => self.write_optional(
                ctx,
                Some(&mut |serializer: &mut dyn Serializer| endec.encode(ctx, serializer, value)),
            ),
            None => self.write_optional(ctx, None),
        }
    }
}

impl dyn SequenceSerializer + '_ {
    /// Writes one element through `endec`.
    pub fn element_value<T, E>(
        &mut self,
        ctx: &SerializationContext,
        endec: &E,
        value: &T,
    ) -> Result<()>
    where
        E: Endec<T> + ?Sized,
    {
        self.element(&mut |serializer: &mut dyn Serializer| endec.encode(ctx, serializer, value))
    }
}

impl dyn MapSerializer + '_ {
    /// Writes one entry through `endec`.
    pub fn entry_value<T, E>(
        &mut self,
        ctx: &SerializationContext,
        key: &str,
        endec: &E,
        value: &T,
    ) -> Result<()>
    where
        E: Endec<T> + ?Sized,
    {
        self.entry(key, &mut |serializer: &mut dyn Serializer| {
            endec.encode(ctx, serializer, value)
        })
    }
}

impl dyn StructSerializer + '_ {
    /// Writes one field through `endec`.
    ///
    /// Errors raised by `endec` are wrapped with the field name.
    pub fn field_value<T, E>(
        &mut self,
        ctx: &SerializationContext,
        name: &str,
        endec: &E,
        value: &T,
        may_omit: bool,
    ) -> Result<()>
    where
        E: Endec<T> + ?Sized,
    {
        self.field(name, may_omit, &mut |serializer: &mut dyn Serializer| {
            endec.encode(ctx, serializer, value)
        })
        .map_err(|err| err.in_field(Cow::Owned(name.into())))
    }
}
