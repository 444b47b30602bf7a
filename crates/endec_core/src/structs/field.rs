use alloc::borrow::Cow;
use alloc::sync::Arc;
use core::fmt;

use super::{DynStructEndec, StructEndec};
use crate::context::SerializationContext;
use crate::de::{Deserializer, StructDeserializer};
use crate::endec::{DynEndec, Endec};
use crate::error::{EndecError, Result};
use crate::ser::{Serializer, StructSerializer};

type Getter<S, F> = Arc<dyn Fn(&S) -> &F + Send + Sync>;
type DefaultFn<F> = Arc<dyn Fn() -> F + Send + Sync>;

enum FieldKind<F> {
    Named {
        name: Cow<'static, str>,
        endec: DynEndec<F>,
        default: Option<DefaultFn<F>>,
    },
    Flat {
        endec: DynStructEndec<F>,
    },
}

/// One field of a struct `S` holding an `F`.
///
/// Named fields are written under their name. Fields with a default are
/// written as optionals; they decode to the default when absent or empty,
/// and formats may omit them. Flat fields write the fields of a nested
/// struct endec straight into the outer struct.
pub struct StructField<S, F> {
    kind: FieldKind<F>,
    getter: Getter<S, F>,
}

impl<S: 'static, F: 'static> StructField<S, F> {
    /// A mandatory named field.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        endec: impl Endec<F> + 'static,
        getter: impl Fn(&S) -> &F + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind: FieldKind::Named {
                name: name.into(),
                endec: Arc::new(endec),
                default: None,
            },
            getter: Arc::new(getter),
        }
    }

    /// A named field falling back to `default()`.
    pub fn optional(
        name: impl Into<Cow<'static, str>>,
        endec: impl Endec<F> + 'static,
        getter: impl Fn(&S) -> &F + Send + Sync + 'static,
        default: impl Fn() -> F + Send + Sync + 'static,
    ) -> Self {
        let default: DefaultFn<F> = Arc::new(default);
        Self {
            kind: FieldKind::Named {
                name: name.into(),
                endec: Arc::new(OrDefault {
                    inner: endec,
                    default: default.clone(),
                }),
                default: Some(default),
            },
            getter: Arc::new(getter),
        }
    }

    /// A field whose struct endec writes into the enclosing struct.
    pub fn flat(
        endec: impl StructEndec<F> + 'static,
        getter: impl Fn(&S) -> &F + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind: FieldKind::Flat {
                endec: Arc::new(endec),
            },
            getter: Arc::new(getter),
        }
    }
}

impl<S, F> StructField<S, F> {
    /// The field name; `None` for flat fields.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Named { name, .. } => Some(name),
            FieldKind::Flat { .. } => None,
        }
    }

    pub fn has_default(&self) -> bool {
        matches!(&self.kind, FieldKind::Named { default: Some(_), .. })
    }

    /// Writes this field of `instance` into `structure`.
    pub fn encode_field(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructSerializer,
        instance: &S,
    ) -> Result<()> {
        let value = (self.getter)(instance);
        match &self.kind {
            FieldKind::Named {
                name,
                endec,
                default,
            } => structure
                .field(name, default.is_some(), &mut |serializer: &mut dyn Serializer| {
                    endec.encode(ctx, serializer, value)
                })
                .map_err(|err| err.in_field(name.clone())),
            FieldKind::Flat { endec } => endec.encode_struct(ctx, structure, value),
        }
    }

    /// Reads this field from `structure`.
    pub fn decode_field(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructDeserializer,
    ) -> Result<F> {
        match &self.kind {
            FieldKind::Named {
                name,
                endec,
                default,
            } => {
                let mut slot = None;
                let present = structure
                    .field(name, &mut |deserializer: &mut dyn Deserializer| {
                        slot = Some(endec.decode(ctx, deserializer)?);
                        Ok(())
                    })
                    .map_err(|err| err.in_field(name.clone()))?;

                match (present, default) {
                    (true, _) => slot.ok_or_else(EndecError::undelivered),
                    (false, Some(default)) => Ok(default()),
                    (false, None) => Err(EndecError::MissingField { name: name.clone() }),
                }
            }
            FieldKind::Flat { endec } => endec.decode_struct(ctx, structure),
        }
    }
}

impl<S, F> Clone for StructField<S, F> {
    fn clone(&self) -> Self {
        let kind = match &self.kind {
            FieldKind::Named {
                name,
                endec,
                default,
            } => FieldKind::Named {
                name: name.clone(),
                endec: endec.clone(),
                default: default.clone(),
            },
            FieldKind::Flat { endec } => FieldKind::Flat {
                endec: endec.clone(),
            },
        };
        Self {
            kind,
            getter: self.getter.clone(),
        }
    }
}

impl<S, F> fmt::Debug for StructField<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FieldKind::Named { name, default, .. } => f
                .debug_struct("StructField")
                .field("name", name)
                .field("has_default", &default.is_some())
                .finish(),
            FieldKind::Flat { .. } => f.write_str("StructField(flat)"),
        }
    }
}

// -----------------------------------------------------------------------------
// OrDefault

/// Writes a field value as a present optional; an empty optional reads as the default.
struct OrDefault<E, F> {
    inner: E,
    default: DefaultFn<F>,
}

impl<E: Endec<F>, F> Endec<F> for OrDefault<E, F> {
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &F,
    ) -> Result<()> {
        serializer.write_optional_value(ctx, &self.inner, Some(value))
    }

    fn decode(&self, ctx: &SerializationContext, deserializer: &mut dyn Deserializer) -> Result<F> {
        Ok(deserializer
            .read_optional_value(ctx, &self.inner)?
            .unwrap_or_else(|| (self.default)()))
    }
}
