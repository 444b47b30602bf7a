//! Typed access to string-keyed containers of encoded data.

use alloc::borrow::Cow;
use alloc::sync::Arc;
use core::fmt;

use crate::context::SerializationContext;
use crate::endec::{DynEndec, Endec};
use crate::error::Result;

// -----------------------------------------------------------------------------
// KeyedEndec

/// An endec bound to a key, with a default used when the key is absent.
///
/// Built with [`EndecExt::keyed`](crate::EndecExt::keyed).
pub struct KeyedEndec<T> {
    key: Cow<'static, str>,
    endec: DynEndec<T>,
    default: Arc<dyn Fn() -> T + Send + Sync>,
}

impl<T> KeyedEndec<T> {
    pub fn new(
        key: impl Into<Cow<'static, str>>,
        endec: impl Endec<T> + 'static,
        default: impl Fn() -> T + Send + Sync + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            endec: Arc::new(endec),
            default: Arc::new(default),
        }
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn endec(&self) -> &dyn Endec<T> {
        &*self.endec
    }

    #[inline]
    pub fn default_value(&self) -> T {
        (self.default)()
    }
}

impl<T> Clone for KeyedEndec<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            endec: self.endec.clone(),
            default: self.default.clone(),
        }
    }
}

impl<T> fmt::Debug for KeyedEndec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KeyedEndec").field(&self.key).finish()
    }
}

// -----------------------------------------------------------------------------
// MapCarrier

/// A string-keyed container whose values are read and written through
/// [`KeyedEndec`]s.
///
/// Implementors provide the four primitive operations; the rest is derived.
pub trait MapCarrier {
    /// Decodes the value under `key`, or returns its default if absent.
    fn get_with_errors<T>(&self, ctx: &SerializationContext, key: &KeyedEndec<T>) -> Result<T>;

    /// Encodes `value` under `key`, replacing any previous value.
    fn put<T>(&mut self, ctx: &SerializationContext, key: &KeyedEndec<T>, value: &T) -> Result<()>;

    fn delete<T>(&mut self, key: &KeyedEndec<T>);

    fn has<T>(&self, key: &KeyedEndec<T>) -> bool;

    /// Like [`get_with_errors`](Self::get_with_errors), but a decode failure
    /// also yields the default.
    fn get<T>(&self, ctx: &SerializationContext, key: &KeyedEndec<T>) -> T {
        self.get_with_errors(ctx, key).unwrap_or_else(|err| {
            log::debug!("failed to decode key `{}`, using default: {err}", key.key());
            key.default_value()
        })
    }

    /// Puts `value` if it is `Some`, otherwise leaves the container unchanged.
    fn put_if_not_null<T>(
        &mut self,
        ctx: &SerializationContext,
        key: &KeyedEndec<T>,
        value: Option<&T>,
    ) -> Result<()> {
        match value {
            Some(value) => self.put(ctx, key, value),
            None => Ok(()),
        }
    }

    /// Copies the value under `key` into `other`; absent keys copy the default.
    fn copy<T, M: MapCarrier + ?Sized>(
        &self,
        ctx: &SerializationContext,
        key: &KeyedEndec<T>,
        other: &mut M,
    ) -> Result<()> {
        other.put(ctx, key, &self.get(ctx, key))
    }

    /// Copies the value under `key` into `other` only if present here.
    fn copy_if_present<T, M: MapCarrier + ?Sized>(
        &self,
        ctx: &SerializationContext,
        key: &KeyedEndec<T>,
        other: &mut M,
    ) -> Result<()> {
        if self.has(key) {
            self.copy(ctx, key, other)
        } else {
            Ok(())
        }
    }

    /// Replaces the value under `key` with `mutator(current)`.
    fn mutate<T>(
        &mut self,
        ctx: &SerializationContext,
        key: &KeyedEndec<T>,
        mutator: impl FnOnce(T) -> T,
    ) -> Result<()> {
        let value = mutator(self.get(ctx, key));
        self.put(ctx, key, &value)
    }
}
