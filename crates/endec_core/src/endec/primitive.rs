use alloc::string::String;
use alloc::vec::Vec;

use super::Endec;
use crate::context::SerializationContext;
use crate::de::Deserializer;
use crate::error::Result;
use crate::ser::Serializer;

macro_rules! primitive_endec {
    ($(#[$meta:meta])* $name:ident, $constant:ident: $ty:ty => $write:ident / $read:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        #[doc = concat!("The [`", stringify!($name), "`] instance.")]
        pub const $constant: $name = $name;

        impl Endec<$ty> for $name {
            #[inline]
            fn encode(
                &self,
                ctx: &SerializationContext,
                serializer: &mut dyn Serializer,
                value: &$ty,
            ) -> Result<()> {
                serializer.$write(ctx, *value)
            }

            #[inline]
            fn decode(
                &self,
                ctx: &SerializationContext,
                deserializer: &mut dyn Deserializer,
            ) -> Result<$ty> {
                deserializer.$read(ctx)
            }
        }
    };
}

primitive_endec!(
    /// `bool`.
    BoolEndec, BOOL: bool => write_bool / read_bool
);
primitive_endec!(
    /// `i8`.
    ByteEndec, BYTE: i8 => write_i8 / read_i8
);
primitive_endec!(
    /// `i16`.
    ShortEndec, SHORT: i16 => write_i16 / read_i16
);
primitive_endec!(
    /// Fixed width `i32`.
    IntEndec, INT: i32 => write_i32 / read_i32
);
primitive_endec!(
    /// `i32` in the format's variable-width encoding, if it has one.
    VarIntEndec, VAR_INT: i32 => write_var_i32 / read_var_i32
);
primitive_endec!(
    /// Fixed width `i64`.
    LongEndec, LONG: i64 => write_i64 / read_i64
);
primitive_endec!(
    /// `i64` in the format's variable-width encoding, if it has one.
    VarLongEndec, VAR_LONG: i64 => write_var_i64 / read_var_i64
);
primitive_endec!(
    /// `f32`.
    FloatEndec, FLOAT: f32 => write_f32 / read_f32
);
primitive_endec!(
    /// `f64`.
    DoubleEndec, DOUBLE: f64 => write_f64 / read_f64
);

/// UTF-8 `String`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringEndec;

/// The [`StringEndec`] instance.
pub const STRING: StringEndec = StringEndec;

impl Endec<String> for StringEndec {
    #[inline]
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &String,
    ) -> Result<()> {
        serializer.write_str(ctx, value)
    }

    #[inline]
    fn decode(
        &self,
        ctx: &SerializationContext,
        deserializer: &mut dyn Deserializer,
    ) -> Result<String> {
        deserializer.read_string(ctx)
    }
}

/// Raw bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesEndec;

/// The [`BytesEndec`] instance.
pub const BYTES: BytesEndec = BytesEndec;

impl Endec<Vec<u8>> for BytesEndec {
    #[inline]
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &Vec<u8>,
    ) -> Result<()> {
        serializer.write_bytes(ctx, value)
    }

    #[inline]
    fn decode(
        &self,
        ctx: &SerializationContext,
        deserializer: &mut dyn Deserializer,
    ) -> Result<Vec<u8>> {
        deserializer.read_bytes(ctx)
    }
}

/// `()`: writes nothing and reads nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoidEndec;

/// The [`VoidEndec`] instance.
pub const VOID: VoidEndec = VoidEndec;

impl Endec<()> for VoidEndec {
    #[inline]
    fn encode(&self, _: &SerializationContext, _: &mut dyn Serializer, _: &()) -> Result<()> {
        Ok(())
    }

    #[inline]
    fn decode(&self, _: &SerializationContext, _: &mut dyn Deserializer) -> Result<()> {
        Ok(())
    }
}
