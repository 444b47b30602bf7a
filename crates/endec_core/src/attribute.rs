use alloc::sync::Arc;
use core::any::Any;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

// -----------------------------------------------------------------------------
// SerializationAttribute

/// Whether an attribute is a plain flag or carries a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Marker,
    WithValue,
}

/// A named flag that can be placed into a [`SerializationContext`].
///
/// Attributes are identified by name alone: two attributes with the same
/// name are the same attribute, whatever their kind.
///
/// [`SerializationContext`]: crate::SerializationContext
#[derive(Debug, Clone, Copy)]
pub struct SerializationAttribute {
    name: &'static str,
    kind: AttributeKind,
}

impl SerializationAttribute {
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub const fn kind(&self) -> AttributeKind {
        self.kind
    }
}

impl PartialEq for SerializationAttribute {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for SerializationAttribute {}

impl Hash for SerializationAttribute {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

// -----------------------------------------------------------------------------
// MarkerAttribute

/// An attribute without a value.
///
/// # Examples
///
/// ```
/// use endec_core::{MarkerAttribute, SerializationContext};
///
/// const COMPACT: MarkerAttribute = MarkerAttribute::new("compact");
///
/// let ctx = SerializationContext::attributes([COMPACT.instance()]);
/// assert!(ctx.has_attribute(COMPACT));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerAttribute(SerializationAttribute);

impl MarkerAttribute {
    #[inline]
    pub const fn new(name: &'static str) -> Self {
        Self(SerializationAttribute {
            name,
            kind: AttributeKind::Marker,
        })
    }

    #[inline]
    pub const fn attribute(&self) -> SerializationAttribute {
        self.0
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.0.name
    }

    /// The instance placing this marker into a context.
    #[inline]
    pub fn instance(&self) -> AttributeInstance {
        AttributeInstance {
            attribute: self.0,
            value: None,
        }
    }
}

// -----------------------------------------------------------------------------
// ValueAttribute

/// An attribute carrying a value of type `T`.
///
/// # Examples
///
/// ```
/// use endec_core::{SerializationContext, ValueAttribute};
///
/// const VERSION: ValueAttribute<u32> = ValueAttribute::new("version");
///
/// let ctx = SerializationContext::attributes([VERSION.instance(3)]);
/// assert_eq!(ctx.get_attribute_value(&VERSION), Some(&3));
/// ```
pub struct ValueAttribute<T> {
    attribute: SerializationAttribute,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ValueAttribute<T> {
    #[inline]
    pub const fn new(name: &'static str) -> Self {
        Self {
            attribute: SerializationAttribute {
                name,
                kind: AttributeKind::WithValue,
            },
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn attribute(&self) -> SerializationAttribute {
        self.attribute
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.attribute.name
    }
}

impl<T: Send + Sync + 'static> ValueAttribute<T> {
    /// The instance placing this attribute with `value` into a context.
    pub fn instance(&self, value: T) -> AttributeInstance {
        AttributeInstance {
            attribute: self.attribute,
            value: Some(Arc::new(value)),
        }
    }
}

impl<T> Clone for ValueAttribute<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ValueAttribute<T> {}

impl<T> fmt::Debug for ValueAttribute<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ValueAttribute")
            .field(&self.attribute.name)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Conversions

impl From<MarkerAttribute> for SerializationAttribute {
    #[inline]
    fn from(value: MarkerAttribute) -> Self {
        value.0
    }
}

impl From<&MarkerAttribute> for SerializationAttribute {
    #[inline]
    fn from(value: &MarkerAttribute) -> Self {
        value.0
    }
}

impl<T> From<ValueAttribute<T>> for SerializationAttribute {
    #[inline]
    fn from(value: ValueAttribute<T>) -> Self {
        value.attribute
    }
}

impl<T> From<&ValueAttribute<T>> for SerializationAttribute {
    #[inline]
    fn from(value: &ValueAttribute<T>) -> Self {
        value.attribute
    }
}

// -----------------------------------------------------------------------------
// AttributeInstance

/// An attribute paired with its value, ready to be put into a context.
#[derive(Clone)]
pub struct AttributeInstance {
    pub(crate) attribute: SerializationAttribute,
    pub(crate) value: Option<Arc<dyn Any + Send + Sync>>,
}

impl AttributeInstance {
    #[inline]
    pub fn attribute(&self) -> SerializationAttribute {
        self.attribute
    }
}

impl From<MarkerAttribute> for AttributeInstance {
    #[inline]
    fn from(value: MarkerAttribute) -> Self {
        value.instance()
    }
}

impl fmt::Debug for AttributeInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeInstance")
            .field("attribute", &self.attribute.name)
            .field("has_value", &self.value.is_some())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Built-in attributes

/// Set by formats meant to be read by people, such as JSON.
///
/// Endecs may pick a friendlier representation when it is present,
/// for example enum constants by name instead of by ordinal.
pub const HUMAN_READABLE: MarkerAttribute = MarkerAttribute::new("human_readable");
