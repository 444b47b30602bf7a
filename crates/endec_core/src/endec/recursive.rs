use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::sync::{Arc, Weak};

use super::Endec;
use crate::context::SerializationContext;
use crate::de::Deserializer;
use crate::error::{EndecError, Result};
use crate::ser::Serializer;

struct RecursiveInner<T> {
    endec: Box<dyn Endec<T>>,
}

/// An endec that refers to itself, built by [`recursive`].
pub struct RecursiveEndec<T> {
    inner: Arc<RecursiveInner<T>>,
}

/// The self reference handed to the builder of a [`recursive`] endec.
///
/// Holds a weak link, so the cycle does not leak. Using the handle after
/// every [`RecursiveEndec`] built from it was dropped is an error.
pub struct RecursiveHandle<T> {
    inner: Weak<RecursiveInner<T>>,
}

/// Builds an endec for a self-referential type.
///
/// `builder` receives a handle standing for the endec under construction.
///
/// # Examples
///
/// ```
/// use endec_core::{EndecExt, INT, StructEndecBuilder, recursive};
///
/// struct Node {
///     value: i32,
///     children: Vec<Node>,
/// }
///
/// let node = recursive(|this| {
///     StructEndecBuilder::of2(
///         INT.field_of("value", |n: &Node| &n.value),
///         this.list_of()
///             .optional_field_of_lazy("children", |n: &Node| &n.children, Vec::new),
///         |value, children| Node { value, children },
///     )
/// });
/// # let _ = node;
/// ```
pub fn recursive<T, E>(builder: impl FnOnce(RecursiveHandle<T>) -> E) -> RecursiveEndec<T>
where
    T: 'static,
    E: Endec<T> + 'static,
{
    RecursiveEndec {
        inner: Arc::new_cyclic(|weak| RecursiveInner {
            endec: Box::new(builder(RecursiveHandle {
                inner: weak.clone(),
            })),
        }),
    }
}

impl<T> RecursiveHandle<T> {
    fn upgrade(&self) -> Result<Arc<RecursiveInner<T>>> {
        self.inner.upgrade().ok_or(EndecError::Unexpected(Cow::Borrowed(
            "recursive endec used after it was dropped",
        )))
    }
}

impl<T> Clone for RecursiveHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Clone for RecursiveEndec<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Endec<T> for RecursiveEndec<T> {
    #[inline]
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &T,
    ) -> Result<()> {
        self.inner.endec.encode(ctx, serializer, value)
    }

    #[inline]
    fn decode(&self, ctx: &SerializationContext, deserializer: &mut dyn Deserializer) -> Result<T> {
        self.inner.endec.decode(ctx, deserializer)
    }
}

impl<T> Endec<T> for RecursiveHandle<T> {
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &T,
    ) -> Result<()> {
        self.upgrade()?.endec.encode(ctx, serializer, value)
    }

    fn decode(&self, ctx: &SerializationContext, deserializer: &mut dyn Deserializer) -> Result<T> {
        self.upgrade()?.endec.decode(ctx, deserializer)
    }
}
