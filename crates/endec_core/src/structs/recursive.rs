use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::sync::{Arc, Weak};

use super::{StructEndec, decode_as_struct, encode_as_struct};
use crate::context::SerializationContext;
use crate::de::{Deserializer, StructDeserializer};
use crate::endec::Endec;
use crate::error::{EndecError, Result};
use crate::ser::{Serializer, StructSerializer};

struct Inner<T> {
    endec: Box<dyn StructEndec<T>>,
}

/// A struct endec that refers to itself, built by [`recursive_struct`].
pub struct RecursiveStructEndec<T> {
    inner: Arc<Inner<T>>,
}

/// Self reference handed to the builder of a [`recursive_struct`].
pub struct RecursiveStructHandle<T> {
    inner: Weak<Inner<T>>,
}

/// [`recursive`](crate::recursive) for struct endecs.
///
/// The handle is itself a [`StructEndec`], so it can be flattened into the
/// struct being defined.
pub fn recursive_struct<T, E>(
    builder: impl FnOnce(RecursiveStructHandle<T>) -> E,
) -> RecursiveStructEndec<T>
where
    T: 'static,
    E: StructEndec<T> + 'static,
{
    RecursiveStructEndec {
        inner: Arc::new_cyclic(|weak| Inner {
            endec: Box::new(builder(RecursiveStructHandle {
                inner: weak.clone(),
            })),
        }),
    }
}

impl<T> RecursiveStructHandle<T> {
    fn upgrade(&self) -> Result<Arc<Inner<T>>> {
        self.inner.upgrade().ok_or(EndecError::Unexpected(Cow::Borrowed(
            "recursive struct endec used after it was dropped",
        )))
    }
}

impl<T> Clone for RecursiveStructHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Clone for RecursiveStructEndec<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> StructEndec<T> for RecursiveStructEndec<T> {
    #[inline]
    fn encode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructSerializer,
        value: &T,
    ) -> Result<()> {
        self.inner.endec.encode_struct(ctx, structure, value)
    }

    #[inline]
    fn decode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructDeserializer,
    ) -> Result<T> {
        self.inner.endec.decode_struct(ctx, structure)
    }
}

impl<T> Endec<T> for RecursiveStructEndec<T> {
    #[inline]
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &T,
    ) -> Result<()> {
        encode_as_struct(self, ctx, serializer, value)
    }

    #[inline]
    fn decode(&self, ctx: &SerializationContext, deserializer: &mut dyn Deserializer) -> Result<T> {
        decode_as_struct(self, ctx, deserializer)
    }
}

impl<T> StructEndec<T> for RecursiveStructHandle<T> {
    fn encode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructSerializer,
        value: &T,
    ) -> Result<()> {
        self.upgrade()?.endec.encode_struct(ctx, structure, value)
    }

    fn decode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructDeserializer,
    ) -> Result<T> {
        self.upgrade()?.endec.decode_struct(ctx, structure)
    }
}

impl<T> Endec<T> for RecursiveStructHandle<T> {
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
