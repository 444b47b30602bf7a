use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::{String, ToString};
use core::fmt;

use thiserror::Error;

use crate::number::Number;

// -----------------------------------------------------------------------------
// Result

/// Result type of every endec, serializer and deserializer operation.
pub type Result<T, E = EndecError> = core::result::Result<T, E>;

// -----------------------------------------------------------------------------
// EndecError

/// Errors raised while encoding or decoding.
///
/// Errors raised inside a struct field are wrapped in [`EndecError::Field`];
/// use [`EndecError::root_cause`] to look through those wrappers.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum EndecError {
    #[error("Field `{name}` was missing from serialized data, but no default value was provided")]
    MissingField { name: Cow<'static, str> },

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: Cow<'static, str>,
        found: Cow<'static, str>,
    },

    #[error("No endec registered for variant {variant}")]
    UnregisteredVariant { variant: String },

    #[error(transparent)]
    Range(#[from] RangeError),

    #[error("Context does not provide a value for attribute `{name}`")]
    MissingAttribute { name: &'static str },

    #[error("Endec for {name} serialized nothing")]
    NothingSerialized { name: Cow<'static, str> },

    #[error("Cannot have more than one branch for attribute `{name}`")]
    DuplicateBranch { name: &'static str },

    #[error("Error in field `{name}`: {source}")]
    Field {
        name: Cow<'static, str>,
        source: Box<EndecError>,
    },

    #[error("`{name}` is not a known enum constant")]
    UnknownEnumName { name: String },

    #[error("{ordinal} is not a valid enum ordinal")]
    UnknownEnumOrdinal { ordinal: i32 },

    #[error("{0}")]
    Unexpected(Cow<'static, str>),

    #[error("{0}")]
    Custom(String),
}

impl EndecError {
    /// Creates a [`EndecError::Custom`] from any displayable message.
    pub fn custom(msg: impl fmt::Display) -> Self {
        Self::Custom(msg.to_string())
    }

    /// Creates a [`EndecError::TypeMismatch`].
    pub fn mismatch(
        expected: impl Into<Cow<'static, str>>,
        found: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates a [`EndecError::MissingField`].
    pub fn missing_field(name: impl Into<Cow<'static, str>>) -> Self {
        Self::MissingField { name: name.into() }
    }

    /// Wraps `self` as the cause of a failure inside field `name`.
    pub fn in_field(self, name: impl Into<Cow<'static, str>>) -> Self {
        Self::Field {
            name: name.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping [`EndecError::Field`] wrappers.
    ///
    /// # Examples
    ///
    /// ```
    /// use endec_core::EndecError;
    ///
    /// let err = EndecError::missing_field("b").in_field("a");
    /// assert_eq!(err.root_cause(), &EndecError::missing_field("b"));
    /// ```
    pub fn root_cause(&self) -> &EndecError {
        match self {
            Self::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Returns the dotted path of field names leading to the root cause.
    pub fn field_path(&self) -> String {
        let mut path = String::new();
        let mut current = self;
        while let Self::Field { name, source } = current {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(name);
            current = source;
        }
        path
    }

    #[inline]
    pub(crate) fn undelivered() -> Self {
        Self::Unexpected(Cow::Borrowed(
            "deserializer reported a value but never ran the decode callback",
        ))
    }
}

// -----------------------------------------------------------------------------
// RangeError

/// A number was found outside the inclusive bounds of a ranged endec.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeError {
    pub value: Number,
    pub min: Option<Number>,
    pub max: Option<Number>,
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Number value found to be outside allowed bound! [Value: {}", self.value)?;
        if let Some(min) = self.min {
            write!(f, ", InclusiveMin: {min}")?;
        }
        if let Some(max) = self.max {
            write!(f, ", InclusiveMax: {max}")?;
        }
        f.write_str("]")
    }
}

impl core::error::Error for RangeError {}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{EndecError, RangeError};
    use crate::number::Number;
    use alloc::string::ToString;

    #[test]
    fn field_path_and_root() {
        let err = EndecError::mismatch("int", "string")
            .in_field("inner")
            .in_field("outer");

        assert_eq!(err.field_path(), "outer.inner");
        assert!(matches!(err.root_cause(), EndecError::TypeMismatch { .. }));
        assert!(err.to_string().starts_with("Error in field `outer`"));
    }

    #[test]
    fn range_message() {
        let err = RangeError {
            value: Number::Signed(12),
            min: Some(Number::Signed(0)),
            max: None,
        };
        assert_eq!(
            err.to_string(),
            "Number value found to be outside allowed bound! [Value: 12, InclusiveMin: 0]",
        );
    }
}
