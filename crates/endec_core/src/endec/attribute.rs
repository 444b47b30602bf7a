use alloc::sync::Arc;
use alloc::vec::Vec;

use super::{DynEndec, Endec};
use crate::attribute::SerializationAttribute;
use crate::context::SerializationContext;
use crate::de::Deserializer;
use crate::error::{EndecError, Result};
use crate::ser::Serializer;

/// Picks an endec by the attributes present in the context.
///
/// Branches are checked in the order they were added; the first one whose
/// attribute is present wins, otherwise the fallback is used.
pub struct AttributeEndec<T> {
    branches: Vec<(SerializationAttribute, DynEndec<T>)>,
    fallback: DynEndec<T>,
}

impl<T> AttributeEndec<T> {
    fn select(&self, ctx: &SerializationContext) -> &dyn Endec<T> {
        self.branches
            .iter()
            .find(|(attribute, _)| ctx.has_attribute(*attribute))
            .map_or(&*self.fallback, |(_, endec)| &**endec)
    }
}

impl<T> Clone for AttributeEndec<T> {
    fn clone(&self) -> Self {
        Self {
            branches: self.branches.clone(),
            fallback: self.fallback.clone(),
        }
    }
}

impl<T> Endec<T> for AttributeEndec<T> {
    #[inline]
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &T,
    ) -> Result<()> {
        self.select(ctx).encode(ctx, serializer, value)
    }

    #[inline]
    fn decode(&self, ctx: &SerializationContext, deserializer: &mut dyn Deserializer) -> Result<T> {
        self.select(ctx).decode(ctx, deserializer)
    }
}

/// Builder of an [`AttributeEndec`], started by [`if_attr`].
pub struct AttributeEndecBuilder<T> {
    branches: Vec<(SerializationAttribute, DynEndec<T>)>,
}

/// Starts an [`AttributeEndec`] whose first branch uses `endec` when
/// `attribute` is present.
///
/// # Examples
///
/// ```
/// use endec_core::{EndecExt, HUMAN_READABLE, INT, STRING, if_attr};
///
/// let count = if_attr(
///     HUMAN_READABLE,
///     STRING.xmap(|s: String| s.parse::<i32>().unwrap_or(0), |v: &i32| v.to_string()),
/// )
/// .or_else(INT);
/// # let _ = count;
/// ```
pub fn if_attr<T>(
    attribute: impl Into<SerializationAttribute>,
    endec: impl Endec<T> + 'static,
) -> AttributeEndecBuilder<T> {
    let endec: DynEndec<T> = Arc::new(endec);
    AttributeEndecBuilder {
        branches: alloc::vec![(attribute.into(), endec)],
    }
}

impl<T> AttributeEndecBuilder<T> {
    /// Adds a branch; each attribute may only have one.
    pub fn or_else_if(
        mut self,
        attribute: impl Into<SerializationAttribute>,
        endec: impl Endec<T> + 'static,
    ) -> Result<Self> {
        let attribute = attribute.into();
        if self.branches.iter().any(|(existing, _)| *existing == attribute) {
            return Err(EndecError::DuplicateBranch {
                name: attribute.name(),
            });
        }
        self.branches.push((attribute, Arc::new(endec)));
        Ok(self)
    }

    /// Finishes the builder with the endec used when no branch matches.
    pub fn or_else(self, endec: impl Endec<T> + 'static) -> AttributeEndec<T> {
        AttributeEndec {
            branches: self.branches,
            fallback: Arc::new(endec),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::if_attr;
    use crate::attribute::{HUMAN_READABLE, MarkerAttribute};
    use crate::endec::{INT, VAR_INT};
    use crate::error::EndecError;

    const COMPACT: MarkerAttribute = MarkerAttribute::new("compact");

    #[test]
    fn duplicate_branch_rejected() {
        let err = if_attr(HUMAN_READABLE, INT)
            .or_else_if(COMPACT, VAR_INT)
            .and_then(|builder| builder.or_else_if(HUMAN_READABLE, VAR_INT))
            .err();

        assert_eq!(
            err,
            Some(EndecError::DuplicateBranch {
                name: "human_readable"
            })
        );
    }
}
