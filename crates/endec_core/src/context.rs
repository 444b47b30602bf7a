use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use endec_utils::hash::{HashMap, HashSet};

use crate::attribute::{AttributeInstance, SerializationAttribute, ValueAttribute};
use crate::error::{EndecError, Result};

// -----------------------------------------------------------------------------
// SerializationContext

type AttributeValue = Option<Arc<dyn Any + Send + Sync>>;

#[derive(Default, Clone)]
struct ContextInner {
    values: HashMap<SerializationAttribute, AttributeValue>,
    suppressed: HashSet<SerializationAttribute>,
}

/// Immutable set of attributes flowing through an encode or decode call.
///
/// Every `with_*`/`without_*` method returns a new context and leaves
/// `self` untouched. An attribute counts as present when it was added
/// and is not suppressed.
///
/// The empty context does not allocate, and cloning any context is
/// one reference count increment.
///
/// # Examples
///
/// ```
/// use endec_core::{HUMAN_READABLE, SerializationContext};
///
/// let ctx = SerializationContext::attributes([HUMAN_READABLE.instance()]);
/// assert!(ctx.has_attribute(HUMAN_READABLE));
///
/// let quiet = ctx.with_suppressed([HUMAN_READABLE]);
/// assert!(!quiet.has_attribute(HUMAN_READABLE));
/// assert!(ctx.has_attribute(HUMAN_READABLE));
/// ```
#[derive(Clone, Default)]
pub struct SerializationContext {
    inner: Option<Arc<ContextInner>>,
}

impl SerializationContext {
    /// The context with no attributes.
    #[inline]
    pub const fn empty() -> Self {
        Self { inner: None }
    }

    /// Creates a context holding `instances`.
    pub fn attributes(instances: impl IntoIterator<Item = AttributeInstance>) -> Self {
        Self::empty().with_attributes(instances)
    }

    /// Creates a context suppressing `attributes`.
    pub fn suppressed<A: Into<SerializationAttribute>>(
        attributes: impl IntoIterator<Item = A>,
    ) -> Self {
        Self::empty().with_suppressed(attributes)
    }

    /// Returns a copy with `instances` added, replacing values of attributes already present.
    pub fn with_attributes(&self, instances: impl IntoIterator<Item = AttributeInstance>) -> Self {
        let mut inner = self.cloned_inner();
        for instance in instances {
            inner.values.insert(instance.attribute, instance.value);
        }
        Self::from_inner(inner)
    }

    /// Returns a copy with `attributes` removed.
    pub fn without_attributes<A: Into<SerializationAttribute>>(
        &self,
        attributes: impl IntoIterator<Item = A>,
    ) -> Self {
        let mut inner = self.cloned_inner();
        for attribute in attributes {
            inner.values.remove(&attribute.into());
        }
        Self::from_inner(inner)
    }

    /// Returns a copy with `attributes` suppressed.
    pub fn with_suppressed<A: Into<SerializationAttribute>>(
        &self,
        attributes: impl IntoIterator<Item = A>,
    ) -> Self {
        let mut inner = self.cloned_inner();
        inner
            .suppressed
            .extend(attributes.into_iter().map(Into::into));
        Self::from_inner(inner)
    }

    /// Returns a copy where `attributes` are no longer suppressed.
    pub fn without_suppressed<A: Into<SerializationAttribute>>(
        &self,
        attributes: impl IntoIterator<Item = A>,
    ) -> Self {
        let mut inner = self.cloned_inner();
        for attribute in attributes {
            inner.suppressed.remove(&attribute.into());
        }
        Self::from_inner(inner)
    }

    /// Merges two contexts.
    ///
    /// Values from `other` win on conflict; suppressed sets are unioned.
    pub fn and(&self, other: &SerializationContext) -> Self {
        let Some(theirs) = other.inner.as_deref() else {
            return self.clone();
        };
        if self.inner.is_none() {
            return other.clone();
        }

        let mut inner = self.cloned_inner();
        for (attribute, value) in &theirs.values {
            inner.values.insert(*attribute, value.clone());
        }
        inner.suppressed.extend(theirs.suppressed.iter().copied());
        Self::from_inner(inner)
    }

    /// Returns `true` if `attribute` was added and is not suppressed.
    pub fn has_attribute(&self, attribute: impl Into<SerializationAttribute>) -> bool {
        let attribute = attribute.into();
        self.inner.as_deref().is_some_and(|inner| {
            inner.values.contains_key(&attribute) && !inner.suppressed.contains(&attribute)
        })
    }

    /// Returns the value of `attribute`, if present and of type `T`.
    pub fn get_attribute_value<T: 'static>(&self, attribute: &ValueAttribute<T>) -> Option<&T> {
        let inner = self.inner.as_deref()?;
        let key = attribute.attribute();
        if inner.suppressed.contains(&key) {
            return None;
        }
        inner.values.get(&key)?.as_deref()?.downcast_ref::<T>()
    }

    /// Like [`get_attribute_value`](Self::get_attribute_value), but absence is an error.
    pub fn require_attribute_value<T: 'static>(&self, attribute: &ValueAttribute<T>) -> Result<&T> {
        self.get_attribute_value(attribute)
            .ok_or(EndecError::MissingAttribute {
                name: attribute.name(),
            })
    }

    /// Returns `true` if no attribute was ever added or suppressed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    fn cloned_inner(&self) -> ContextInner {
        self.inner.as_deref().cloned().unwrap_or_default()
    }

    fn from_inner(inner: ContextInner) -> Self {
        if inner.values.is_empty() && inner.suppressed.is_empty() {
            Self::empty()
        } else {
            Self {
                inner: Some(Arc::new(inner)),
            }
        }
    }
}

impl fmt::Debug for SerializationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(inner) = self.inner.as_deref() else {
            return f.write_str("SerializationContext {}");
        };
        f.debug_struct("SerializationContext")
            .field(
                "attributes",
                &sorted_names(inner.values.keys().map(SerializationAttribute::name)),
            )
            .field(
                "suppressed",
                &sorted_names(inner.suppressed.iter().map(SerializationAttribute::name)),
            )
            .finish()
    }
}

fn sorted_names<'a>(names: impl Iterator<Item = &'a str>) -> impl fmt::Debug {
    let mut names: Vec<&str> = names.collect();
    names.sort_unstable();
    names
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::SerializationContext;
    use crate::attribute::{HUMAN_READABLE, MarkerAttribute, ValueAttribute};
    use crate::error::EndecError;

    const COMPACT: MarkerAttribute = MarkerAttribute::new("compact");
    const LEVEL: ValueAttribute<u8> = ValueAttribute::new("level");

    #[test]
    fn empty_context() {
        let ctx = SerializationContext::empty();
        assert!(ctx.is_empty());
        assert!(!ctx.has_attribute(HUMAN_READABLE));
        assert_eq!(ctx.get_attribute_value(&LEVEL), None);
    }

    #[test]
    fn suppression_hides_attribute() {
        let ctx = SerializationContext::attributes([HUMAN_READABLE.instance()]);
        let suppressed = ctx.with_suppressed([HUMAN_READABLE]);

        assert!(ctx.has_attribute(HUMAN_READABLE));
        assert!(!suppressed.has_attribute(HUMAN_READABLE));
        assert!(
            suppressed
                .without_suppressed([HUMAN_READABLE])
                .has_attribute(HUMAN_READABLE)
        );
    }

    #[test]
    fn values_override_and_merge() {
        let base = SerializationContext::attributes([LEVEL.instance(1), COMPACT.instance()]);
        let replaced = base.with_attributes([LEVEL.instance(2)]);

        assert_eq!(base.get_attribute_value(&LEVEL), Some(&1));
        assert_eq!(replaced.get_attribute_value(&LEVEL), Some(&2));

        let other = SerializationContext::attributes([LEVEL.instance(9)])
            .with_suppressed([COMPACT]);
        let merged = base.and(&other);

        assert_eq!(merged.get_attribute_value(&LEVEL), Some(&9));
        assert!(!merged.has_attribute(COMPACT));
    }

    #[test]
    fn require_missing_value() {
        let ctx = SerializationContext::attributes([COMPACT.instance()]);
        let err = ctx.require_attribute_value(&LEVEL).unwrap_err();
        assert_eq!(err, EndecError::MissingAttribute { name: "level" });

        let ctx = ctx.without_attributes([COMPACT]);
        assert!(ctx.is_empty());
    }
}
