use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use endec_core::endec::EnumConstants;
use endec_core::{EndecError, Result};

use crate::EdmMap;

// -----------------------------------------------------------------------------
// EdmKind

/// The kind tag of an [`EdmElement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdmKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Bool,
    String,
    Bytes,
    Optional,
    Sequence,
    Map,
}

impl EdmKind {
    /// Every kind with its lowercase name, in declaration order.
    pub const ALL: EnumConstants<EdmKind> = &[
        ("i8", EdmKind::I8),
        ("u8", EdmKind::U8),
        ("i16", EdmKind::I16),
        ("u16", EdmKind::U16),
        ("i32", EdmKind::I32),
        ("u32", EdmKind::U32),
        ("i64", EdmKind::I64),
        ("u64", EdmKind::U64),
        ("f32", EdmKind::F32),
        ("f64", EdmKind::F64),
        ("boolean", EdmKind::Bool),
        ("string", EdmKind::String),
        ("bytes", EdmKind::Bytes),
        ("optional", EdmKind::Optional),
        ("sequence", EdmKind::Sequence),
        ("map", EdmKind::Map),
    ];

    pub fn name(self) -> &'static str {
        Self::ALL[self as usize].0
    }
}

impl fmt::Display for EdmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// -----------------------------------------------------------------------------
// EdmElement

/// A node of the endec data model.
///
/// Unlike JSON, every number keeps the width and signedness it was
/// written with, and bytes and optionals have kinds of their own.
#[derive(Debug, Clone, PartialEq)]
pub enum EdmElement {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    Optional(Option<Box<EdmElement>>),
    Sequence(Vec<EdmElement>),
    Map(BTreeMap<String, EdmElement>),
}

macro_rules! copy_accessors {
    ($($name:ident => $variant:ident($ty:ty);)*) => {
        $(
            #[inline]
            pub fn $name(&self) -> Option<$ty> {
                match self {
                    Self::$variant(value) => Some(*value),
                    _ => None,
                }
            }
        )*
    };
}

impl EdmElement {
    /// An empty optional.
    pub const EMPTY: EdmElement = EdmElement::Optional(None);

    pub fn kind(&self) -> EdmKind {
        match self {
            Self::I8(_) => EdmKind::I8,
            Self::U8(_) => EdmKind::U8,
            Self::I16(_) => EdmKind::I16,
            Self::U16(_) => EdmKind::U16,
            Self::I32(_) => EdmKind::I32,
            Self::U32(_) => EdmKind::U32,
            Self::I64(_) => EdmKind::I64,
            Self::U64(_) => EdmKind::U64,
            Self::F32(_) => EdmKind::F32,
            Self::F64(_) => EdmKind::F64,
            Self::Bool(_) => EdmKind::Bool,
            Self::String(_) => EdmKind::String,
            Self::Bytes(_) => EdmKind::Bytes,
            Self::Optional(_) => EdmKind::Optional,
            Self::Sequence(_) => EdmKind::Sequence,
            Self::Map(_) => EdmKind::Map,
        }
    }

    /// A present optional holding `value`.
    pub fn some(value: EdmElement) -> Self {
        Self::Optional(Some(Box::new(value)))
    }

    copy_accessors! {
        as_i8 => I8(i8);
        as_u8 => U8(u8);
        as_i16 => I16(i16);
        as_u16 => U16(u16);
        as_i32 => I32(i32);
        as_u32 => U32(u32);
        as_i64 => I64(i64);
        as_u64 => U64(u64);
        as_f32 => F32(f32);
        as_f64 => F64(f64);
        as_bool => Bool(bool);
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(value) => Some(value),
            _ => None,
        }
    }

    /// The inner element of an optional; `Some(None)` for an empty one.
    pub fn as_optional(&self) -> Option<Option<&EdmElement>> {
        match self {
            Self::Optional(value) => Some(value.as_deref()),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[EdmElement]> {
        match self {
            Self::Sequence(elements) => Some(elements),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, EdmElement>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Converts a map element into an [`EdmMap`].
    pub fn into_edm_map(self) -> Result<EdmMap> {
        match self {
            Self::Map(entries) => Ok(EdmMap::from(entries)),
            other => Err(EndecError::mismatch("map", other.kind().name())),
        }
    }

    /// Strips the element down to what JSON-like formats can tell apart.
    ///
    /// Integers widen to `I64` (or `U64` past its range), floats to `F64`,
    /// bytes become sequences of `I64` and optionals collapse into their
    /// contents or an empty optional.
    pub fn unwrap_shape(self) -> EdmElement {
        match self {
            Self::I8(v) => Self::I64(v.into()),
            Self::U8(v) => Self::I64(v.into()),
            Self::I16(v) => Self::I64(v.into()),
            Self::U16(v) => Self::I64(v.into()),
            Self::I32(v) => Self::I64(v.into()),
            Self::U32(v) => Self::I64(v.into()),
            Self::U64(v) => i64::try_from(v).map_or(Self::U64(v), Self::I64),
            Self::F32(v) => Self::F64(v.into()),
            Self::Bytes(bytes) => Self::Sequence(bytes.into_iter().map(|b| Self::I64(b.into())).collect()),
            Self::Optional(Some(inner)) => inner.unwrap_shape(),
            Self::Sequence(elements) => {
                Self::Sequence(elements.into_iter().map(Self::unwrap_shape).collect())
            }
            Self::Map(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.unwrap_shape()))
                    .collect(),
            ),
            other => other,
        }
    }
}

impl From<EdmMap> for EdmElement {
    fn from(map: EdmMap) -> Self {
        Self::Map(map.into_inner())
    }
}

// -----------------------------------------------------------------------------
// Display

impl fmt::Display for EdmElement {
    /// Writes `kind(value)`; the alternate form indents nested sequences and maps.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_element(f, self, 0)
    }
}

fn indent(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    if f.alternate() {
        f.write_str("\n")?;
        for _ in 0..depth {
            f.write_str("  ")?;
        }
    }
    Ok(())
}

fn write_element(f: &mut fmt::Formatter<'_>, element: &EdmElement, depth: usize) -> fmt::Result {
    let kind = element.kind();
    match element {
        EdmElement::I8(v) => write!(f, "{kind}({v})"),
        EdmElement::U8(v) => write!(f, "{kind}({v})"),
        EdmElement::I16(v) => write!(f, "{kind}({v})"),
        EdmElement::U16(v) => write!(f, "{kind}({v})"),
        EdmElement::I32(v) => write!(f, "{kind}({v})"),
        EdmElement::U32(v) => write!(f, "{kind}({v})"),
        EdmElement::I64(v) => write!(f, "{kind}({v})"),
        EdmElement::U64(v) => write!(f, "{kind}({v})"),
        EdmElement::F32(v) => write!(f, "{kind}({v})"),
        EdmElement::F64(v) => write!(f, "{kind}({v})"),
        EdmElement::Bool(v) => write!(f, "{kind}({v})"),
        EdmElement::String(v) => write!(f, "{kind}({v:?})"),
        EdmElement::Bytes(v) => write!(f, "{kind}({v:?})"),
        EdmElement::Optional(None) => write!(f, "{kind}()"),
        EdmElement::Optional(Some(inner)) => {
            write!(f, "{kind}(")?;
            write_element(f, inner, depth)?;
            f.write_str(")")
        }
        EdmElement::Sequence(elements) => {
            write!(f, "{kind}([")?;
            for (index, element) in elements.iter().enumerate() {
                if index > 0 {
                    f.write_str(",")?;
                    if !f.alternate() {
                        f.write_str(" ")?;
                    }
                }
                indent(f, depth + 1)?;
                write_element(f, element, depth + 1)?;
            }
            if !elements.is_empty() {
                indent(f, depth)?;
            }
            f.write_str("])")
        }
        EdmElement::Map(entries) => write_map(f, entries, depth),
    }
}

pub(crate) fn write_map(
    f: &mut fmt::Formatter<'_>,
    entries: &BTreeMap<String, EdmElement>,
    depth: usize,
) -> fmt::Result {
    f.write_str("map({")?;
    for (index, (key, value)) in entries.iter().enumerate() {
        if index > 0 {
            f.write_str(",")?;
            if !f.alternate() {
                f.write_str(" ")?;
            }
        }
        indent(f, depth + 1)?;
        write!(f, "{key:?}: ")?;
        write_element(f, value, depth + 1)?;
    }
    if !entries.is_empty() {
        indent(f, depth)?;
    }
    f.write_str("})")
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::ToString;
    use alloc::vec;

    use super::{EdmElement, EdmKind};

    #[test]
    fn kind_names() {
        assert_eq!(EdmKind::Bool.name(), "boolean");
        assert_eq!(EdmKind::Map.name(), "map");
        assert_eq!(EdmElement::U16(3).kind(), EdmKind::U16);
        for (index, (_, kind)) in EdmKind::ALL.iter().enumerate() {
            assert_eq!(*kind as usize, index);
        }
    }

    #[test]
    fn display() {
        let mut entries = BTreeMap::new();
        entries.insert("a".to_string(), EdmElement::Sequence(vec![EdmElement::I32(1), EdmElement::EMPTY]));
        entries.insert("b".to_string(), EdmElement::some(EdmElement::String("x".to_string())));
        let element = EdmElement::Map(entries);

        assert_eq!(
            element.to_string(),
            r#"map({"a": sequence([i32(1), optional()]), "b": optional(string("x"))})"#
        );
        assert_eq!(
            alloc::format!("{element:#}"),
            "map({\n  \"a\": sequence([\n    i32(1),\n    optional()\n  ]),\n  \"b\": optional(string(\"x\"))\n})"
        );
    }

    #[test]
    fn unwrap_shape_widens() {
        let element = EdmElement::Sequence(vec![
            EdmElement::U8(7),
            EdmElement::F32(0.5),
            EdmElement::some(EdmElement::I16(-2)),
            EdmElement::U64(u64::MAX),
        ]);
        assert_eq!(
            element.unwrap_shape(),
            EdmElement::Sequence(vec![
                EdmElement::I64(7),
                EdmElement::F64(0.5),
                EdmElement::I64(-2),
                EdmElement::U64(u64::MAX),
            ])
        );
    }
}
