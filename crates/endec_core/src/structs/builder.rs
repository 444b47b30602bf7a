use core::marker::PhantomData;

use super::{StructEndec, StructField, decode_as_struct, encode_as_struct};
use crate::context::SerializationContext;
use crate::de::{Deserializer, StructDeserializer};
use crate::endec::Endec;
use crate::error::Result;
use crate::ser::{Serializer, StructSerializer};

// -----------------------------------------------------------------------------
// StructFields

/// A tuple of [`StructField`]s over the same struct `S`.
///
/// Fields are encoded and decoded strictly in tuple order.
pub trait StructFields<S>: Send + Sync {
    /// The tuple of decoded field values.
    type Values;

    fn encode_fields(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructSerializer,
        value: &S,
    ) -> Result<()>;

    fn decode_fields(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructDeserializer,
    ) -> Result<Self::Values>;
}

/// Rebuilds a struct `S` from decoded field values.
///
/// Implemented for closures taking the field values as separate arguments.
pub trait FieldsConstructor<Values, S>: Send + Sync {
    fn construct(&self, values: Values) -> S;
}

macro_rules! impl_struct_fields {
    ($($field:ident: $F:ident),+) => {
        impl<S: 'static, $($F: 'static),+> StructFields<S> for ($(StructField<S, $F>,)+) {
            type Values = ($($F,)+);

            fn encode_fields(
                &self,
                ctx: &SerializationContext,
                structure: &mut dyn StructSerializer,
                value: &S,
            ) -> Result<()> {
                let ($($field,)+) = self;
                $($field.encode_field(ctx, structure, value)?;)+
                Ok(())
            }

            fn decode_fields(
                &self,
                ctx: &SerializationContext,
                structure: &mut dyn StructDeserializer,
            ) -> Result<Self::Values> {
                let ($($field,)+) = self;
                Ok(($($field.decode_field(ctx, structure)?,)+))
            }
        }

        impl<Func, S, $($F),+> FieldsConstructor<($($F,)+), S> for Func
        where
            Func: Fn($($F),+) -> S + Send + Sync,
        {
            #[inline]
            fn construct(&self, ($($field,)+): ($($F,)+)) -> S {
                (self)($($field),+)
            }
        }
    };
}

impl_struct_fields!(f1: F1);
impl_struct_fields!(f1: F1, f2: F2);
impl_struct_fields!(f1: F1, f2: F2, f3: F3);
impl_struct_fields!(f1: F1, f2: F2, f3: F3, f4: F4);
impl_struct_fields!(f1: F1, f2: F2, f3: F3, f4: F4, f5: F5);
impl_struct_fields!(f1: F1, f2: F2, f3: F3, f4: F4, f5: F5, f6: F6);
impl_struct_fields!(f1: F1, f2: F2, f3: F3, f4: F4, f5: F5, f6: F6, f7: F7);
impl_struct_fields!(f1: F1, f2: F2, f3: F3, f4: F4, f5: F5, f6: F6, f7: F7, f8: F8);
impl_struct_fields!(f1: F1, f2: F2, f3: F3, f4: F4, f5: F5, f6: F6, f7: F7, f8: F8, f9: F9);
impl_struct_fields!(
    f1: F1, f2: F2, f3: F3, f4: F4, f5: F5, f6: F6, f7: F7, f8: F8, f9: F9, f10: F10
);
impl_struct_fields!(
    f1: F1, f2: F2, f3: F3, f4: F4, f5: F5, f6: F6, f7: F7, f8: F8, f9: F9, f10: F10, f11: F11
);
impl_struct_fields!(
    f1: F1, f2: F2, f3: F3, f4: F4, f5: F5, f6: F6, f7: F7, f8: F8, f9: F9, f10: F10, f11: F11,
    f12: F12
);
impl_struct_fields!(
    f1: F1, f2: F2, f3: F3, f4: F4, f5: F5, f6: F6, f7: F7, f8: F8, f9: F9, f10: F10, f11: F11,
    f12: F12, f13: F13, f14: F14, f15: F15, f16: F16, f17: F17
);

// -----------------------------------------------------------------------------
// BuiltStructEndec

/// A struct endec assembled from fields and a constructor.
pub struct BuiltStructEndec<S, Fields, C> {
    fields: Fields,
    constructor: C,
    _marker: PhantomData<fn() -> S>,
}

impl<S, Fields, C> StructEndec<S> for BuiltStructEndec<S, Fields, C>
where
    Fields: StructFields<S>,
    C: FieldsConstructor<Fields::Values, S>,
{
    #[inline]
    fn encode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructSerializer,
        value: &S,
    ) -> Result<()> {
        self.fields.encode_fields(ctx, structure, value)
    }

    #[inline]
    fn decode_struct(
        &self,
        ctx: &SerializationContext,
        structure: &mut dyn StructDeserializer,
    ) -> Result<S> {
        let values = self.fields.decode_fields(ctx, structure)?;
        Ok(self.constructor.construct(values))
    }
}

impl<S, Fields, C> Endec<S> for BuiltStructEndec<S, Fields, C>
where
    Fields: StructFields<S>,
    C: FieldsConstructor<Fields::Values, S>,
{
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &S,
    ) -> Result<()> {
        encode_as_struct(self, ctx, serializer, value)
    }

    fn decode(&self, ctx: &SerializationContext, deserializer: &mut dyn Deserializer) -> Result<S> {
        decode_as_struct(self, ctx, deserializer)
    }
}

// -----------------------------------------------------------------------------
// StructEndecBuilder

/// Assembles struct endecs from fields.
///
/// `ofN` takes `N` fields and a constructor receiving the decoded values in
/// the same order. [`of`](Self::of) accepts any supported tuple of fields.
///
/// # Examples
///
/// ```
/// use endec_core::{EndecExt, INT, STRING, StructEndecBuilder};
///
/// struct Point {
///     x: i32,
///     y: i32,
///     label: String,
/// }
///
/// let endec = StructEndecBuilder::of3(
///     INT.field_of("x", |p: &Point| &p.x),
///     INT.field_of("y", |p: &Point| &p.y),
///     STRING.optional_field_of("label", |p: &Point| &p.label, String::new()),
///     |x, y, label| Point { x, y, label },
/// );
/// # let _ = endec;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct StructEndecBuilder;

impl StructEndecBuilder {
    /// Builds a struct endec from a tuple of fields.
    pub fn of<S, Fields, C>(fields: Fields, constructor: C) -> BuiltStructEndec<S, Fields, C>
    where
        Fields: StructFields<S>,
        C: FieldsConstructor<Fields::Values, S>,
    {
        BuiltStructEndec {
            fields,
            constructor,
            _marker: PhantomData,
        }
    }
}

macro_rules! builder_arity {
    ($($name:ident => $($field:ident: $F:ident),+;)+) => {
        impl StructEndecBuilder {
            $(
                #[doc = concat!("Builds a struct endec from ", stringify!($($field),+), ".")]
                pub fn $name<S: 'static, $($F: 'static,)+ C>(
                    $($field: StructField<S, $F>,)+
                    constructor: C,
                ) -> BuiltStructEndec<S, ($(StructField<S, $F>,)+), C>
                where
                    C: Fn($($F),+) -> S + Send + Sync,
                {
                    Self::of(($($field,)+), constructor)
                }
            )+
        }
    };
}

builder_arity! {
    of1 => f1: F1;
    of2 => f1: F1, f2: F2;
    of3 => f1: F1, f2: F2, f3: F3;
    of4 => f1: F1, f2: F2, f3: F3, f4: F4;
    of5 => f1: F1, f2: F2, f3: F3, f4: F4, f5: F5;
    of6 => f1: F1, f2: F2, f3: F3, f4: F4, f5: F5, f6: F6;
    of7 => f1: F1, f2: F2, f3: F3, f4: F4, f5: F5, f6: F6, f7: F7;
    of8 => f1: F1, f2: F2, f3: F3, f4: F4, f5: F5, f6: F6, f7: F7, f8: F8;
    of9 => f1: F1, f2: F2, f3: F3, f4: F4, f5: F5, f6: F6, f7: F7, f8: F8, f9: F9;
    of10 => f1: F1, f2: F2, f3: F3, f4: F4, f5: F5, f6: F6, f7: F7, f8: F8, f9: F9, f10: F10;
    of11 => f1: F1, f2: F2, f3: F3, f4: F4, f5: F5, f6: F6, f7: F7, f8: F8, f9: F9, f10: F10,
        f11: F11;
    of12 => f1: F1, f2: F2, f3: F3, f4: F4, f5: F5, f6: F6, f7: F7, f8: F8, f9: F9, f10: F10,
        f11: F11, f12: F12;
    of17 => f1: F1, f2: F2, f3: F3, f4: F4, f5: F5, f6: F6, f7: F7, f8: F8, f9: F9, f10: F10,
        f11: F11, f12: F12, f13: F13, f14: F14, f15: F15, f16: F16, f17: F17;
}
