use alloc::borrow::Cow;

use super::{AttributeEndec, Endec, if_attr};
use crate::attribute::HUMAN_READABLE;
use crate::context::SerializationContext;
use crate::de::Deserializer;
use crate::error::{EndecError, Result};
use crate::ser::Serializer;

/// Constant table of an enum: each constant with its stable name.
///
/// The position in the table is the constant's ordinal.
pub type EnumConstants<E> = &'static [(&'static str, E)];

fn not_in_table() -> EndecError {
    EndecError::Unexpected(Cow::Borrowed("enum value is missing from its constant table"))
}

/// Enum constants written by name.
pub struct EnumNameEndec<E: 'static> {
    constants: EnumConstants<E>,
}

impl<E: 'static> EnumNameEndec<E> {
    #[inline]
    pub const fn new(constants: EnumConstants<E>) -> Self {
        Self { constants }
    }
}

impl<E> Endec<E> for EnumNameEndec<E>
where
    E: PartialEq + Clone + Send + Sync + 'static,
{
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &E,
    ) -> Result<()> {
        let (name, _) = self
            .constants
            .iter()
            .find(|(_, constant)| constant == value)
            .ok_or_else(not_in_table)?;
        serializer.write_str(ctx, name)
    }

    fn decode(&self, ctx: &SerializationContext, deserializer: &mut dyn Deserializer) -> Result<E> {
        let name = deserializer.read_string(ctx)?;
        self.constants
            .iter()
            .find(|(constant, _)| *constant == name)
            .map(|(_, constant)| constant.clone())
            .ok_or(EndecError::UnknownEnumName { name })
    }
}

/// Enum constants written by ordinal, as a var-int.
pub struct EnumOrdinalEndec<E: 'static> {
    constants: EnumConstants<E>,
}

impl<E: 'static> EnumOrdinalEndec<E> {
    #[inline]
    pub const fn new(constants: EnumConstants<E>) -> Self {
        Self { constants }
    }
}

impl<E> Endec<E> for EnumOrdinalEndec<E>
where
    E: PartialEq + Clone + Send + Sync + 'static,
{
    fn encode(
        &self,
        ctx: &SerializationContext,
        serializer: &mut dyn Serializer,
        value: &E,
    ) -> Result<()> {
        let ordinal = self
            .constants
            .iter()
            .position(|(_, constant)| constant == value)
            .and_then(|index| i32::try_from(index).ok())
            .ok_or_else(not_in_table)?;
        serializer.write_var_i32(ctx, ordinal)
    }

    fn decode(&self, ctx: &SerializationContext, deserializer: &mut dyn Deserializer) -> Result<E> {
        let ordinal = deserializer.read_var_i32(ctx)?;
        usize::try_from(ordinal)
            .ok()
            .and_then(|index| self.constants.get(index))
            .map(|(_, constant)| constant.clone())
            .ok_or(EndecError::UnknownEnumOrdinal { ordinal })
    }
}

/// Endec for a closed set of constants.
///
/// Written by name when the context is [`HUMAN_READABLE`], by ordinal otherwise.
///
/// # Examples
///
/// ```
/// use endec_core::for_enum;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Mode { Fast, Safe }
///
/// let mode = for_enum(&[("fast", Mode::Fast), ("safe", Mode::Safe)]);
/// # let _ = mode;
/// ```
pub fn for_enum<E>(constants: EnumConstants<E>) -> AttributeEndec<E>
where
    E: PartialEq + Clone + Send + Sync + 'static,
{
    if_attr(HUMAN_READABLE, EnumNameEndec::new(constants)).or_else(EnumOrdinalEndec::new(constants))
}
