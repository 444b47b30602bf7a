//! The format side of decoding.
//!
//! Mirrors [`ser`](crate::ser): nested values are read through [`DecodeFn`]
//! callbacks that store their result in the caller's stack frame. The typed
//! helpers on `dyn Deserializer` and friends hide that plumbing.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use crate::context::SerializationContext;
use crate::endec::Endec;
use crate::error::{EndecError, Result};
use crate::ser::Serializer;

// -----------------------------------------------------------------------------
// Callbacks

/// Reads one nested value from the deserializer it is given.
pub type DecodeFn<'a> = &'a mut dyn FnMut(&mut dyn Deserializer) -> Result<()>;

/// Reads from a struct state, see [`StructDeserializer::try_read`].
pub type StructDecodeFn<'a> = &'a mut dyn FnMut(&mut dyn StructDeserializer) -> Result<()>;

// -----------------------------------------------------------------------------
// Deserializer

/// The format side of decoding.
pub trait Deserializer {
    /// Adjusts the caller's context before a decode session starts.
    fn setup_context(&self, ctx: SerializationContext) -> SerializationContext {
        ctx
    }

    fn read_i8(&mut self, ctx: &SerializationContext) -> Result<i8>;
    fn read_i16(&mut self, ctx: &SerializationContext) -> Result<i16>;
    fn read_i32(&mut self, ctx: &SerializationContext) -> Result<i32>;
    fn read_i64(&mut self, ctx: &SerializationContext) -> Result<i64>;
    fn read_f32(&mut self, ctx: &SerializationContext) -> Result<f32>;
    fn read_f64(&mut self, ctx: &SerializationContext) -> Result<f64>;
    fn read_var_i32(&mut self, ctx: &SerializationContext) -> Result<i32>;
    fn read_var_i64(&mut self, ctx: &SerializationContext) -> Result<i64>;
    fn read_bool(&mut self, ctx: &SerializationContext) -> Result<bool>;
    fn read_string(&mut self, ctx: &SerializationContext) -> Result<String>;
    fn read_bytes(&mut self, ctx: &SerializationContext) -> Result<Vec<u8>>;

    /// Reads an optional. Runs `decode` and returns `true` when a value is present.
    fn read_optional(&mut self, ctx: &SerializationContext, decode: DecodeFn<'_>) -> Result<bool>;

    fn sequence(
        &mut self,
        ctx: &SerializationContext,
    ) -> Result<Box<dyn SequenceDeserializer + '_>>;

    fn map(&mut self, ctx: &SerializationContext) -> Result<Box<dyn MapDeserializer + '_>>;

    fn structure(&mut self) -> Result<Box<dyn StructDeserializer + '_>>;

    /// Runs `reader`; if it fails, restores the read position first.
    ///
    /// Afterwards the deserializer is exactly where it was before the call,
    /// so another attempt can read the same data.
    fn try_read(&mut self, reader: DecodeFn<'_>) -> Result<()>;

    /// Returns `self` if this format can replay its data without a schema.
    fn as_self_describing(&mut self) -> Option<&mut dyn SelfDescribingDeserializer> {
        None
    }
}

/// A deserializer that can walk its input without knowing the expected shape.
pub trait SelfDescribingDeserializer: Deserializer {
    /// Replays the current value into `visitor`, preserving its shape.
    fn read_any(&mut self, ctx: &SerializationContext, visitor: &mut dyn Serializer) -> Result<()>;
}

// -----------------------------------------------------------------------------
// Compound states

pub trait SequenceDeserializer {
    /// A size hint. Formats may not know, and inputs may lie.
    fn estimated_size(&self) -> usize;
    fn has_next(&self) -> bool;
    fn next(&mut self, decode: DecodeFn<'_>) -> Result<()>;
}

pub trait MapDeserializer {
    fn estimated_size(&self) -> usize;
    fn has_next(&self) -> bool;
    /// Reads the next entry value through `decode` and returns its key.
    fn next(&mut self, decode: DecodeFn<'_>) -> Result<String>;
}

pub trait StructDeserializer {
    /// Reads field `name` through `decode`.
    ///
    /// Returns `false` without running `decode` when the field is absent.
    /// Positional formats always report fields as present.
    fn field(&mut self, name: &str, decode: DecodeFn<'_>) -> Result<bool>;

    /// Same contract as [`Deserializer::try_read`], at struct level.
    fn try_read(&mut self, reader: StructDecodeFn<'_>) -> Result<()>;
}

// -----------------------------------------------------------------------------
// Typed helpers

#[inline]
fn delivered<T>(slot: Option<T>) -> Result<T> {
    slot.ok_or_else(EndecError::undelivered)
}

impl dyn Deserializer + '_ {
    /// Reads an optional through `endec`.
    pub fn read_optional_value<T, E>(
        &mut self,
        ctx: &SerializationContext,
        endec: &E,
    ) -> Result<Option<T>>
    where
        E: Endec<T> + ?Sized,
    {
        let mut slot = None;
        let present = self.read_optional(ctx, &mut |de: &mut dyn Deserializer| {
            slot = Some(endec.decode(ctx, de)?);
            Ok(())
        })?;
        if present { delivered(slot).map(Some) } else { Ok(None) }
    }

    /// Runs `reader` with rollback on failure, see [`Deserializer::try_read`].
    pub fn try_read_value<T>(
        &mut self,
        mut reader: impl FnMut(&mut dyn Deserializer) -> Result<T>,
    ) -> Result<T> {
        let mut slot = None;
        self.try_read(&mut |de: &mut dyn Deserializer| {
            slot = Some(reader(de)?);
            Ok(())
        })?;
        delivered(slot)
    }
}

impl dyn SequenceDeserializer + '_ {
    /// Reads the next element through `endec`.
    pub fn next_value<T, E>(&mut self, ctx: &SerializationContext, endec: &E) -> Result<T>
    where
        E: Endec<T> + ?Sized,
    {
        let mut slot = None;
        self.next(&mut |de: &mut dyn Deserializer| {
            slot = Some(endec.decode(ctx, de)?);
            Ok(())
        })?;
        delivered(slot)
    }
}

impl dyn MapDeserializer + '_ {
    /// Reads the next entry, decoding its value through `endec`.
    pub fn next_entry<T, E>(&mut self, ctx: &SerializationContext, endec: &E) -> Result<(String, T)>
    where
        E: Endec<T> + ?Sized,
    {
        let mut slot = None;
        let key = self.next(&mut |de: &mut dyn Deserializer| {
            slot = Some(endec.decode(ctx, de)?);
            Ok(())
        })?;
        Ok((key, delivered(slot)?))
    }
}

impl dyn StructDeserializer + '_ {
    /// Reads field `name` through `endec`.
    ///
    /// An absent field yields `default()` when given, otherwise
    /// [`EndecError::MissingField`]. Errors raised by `endec` are wrapped with
    /// the field name.
    pub fn field_value<T, E>(
        &mut self,
        ctx: &SerializationContext,
        name: &str,
        endec: &E,
        default: Option<&dyn Fn() -> T>,
    ) -> Result<T>
    where
        E: Endec<T> + ?Sized,
    {
        let mut slot = None;
        let present = self
            .field(name, &mut |de: &mut dyn Deserializer| {
                slot = Some(endec.decode(ctx, de)?);
                Ok(())
            })
            .map_err(|err| err.in_field(Cow::Owned(name.into())))?;
        match (present, default) {
            (true, _) => delivered(slot),
            (false, Some(default)) => Ok(default()),
            (false, None) => Err(EndecError::MissingField {
                name: Cow::Owned(name.into()),
            }),
        }
    }

    /// Runs `reader` with rollback on failure, see [`StructDeserializer::try_read`].
    pub fn try_read_value<T>(
        &mut self,
        mut reader: impl FnMut(&mut dyn StructDeserializer) -> Result<T>,
    ) -> Result<T> {
        let mut slot = None;
        self.try_read(&mut |structure: &mut dyn StructDeserializer| {
            slot = Some(reader(structure)?);
            Ok(())
        })?;
        delivered(slot)
    }
}
