use core::fmt;

/// A numeric value of any primitive width, used in range error reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signed(v) => fmt::Display::fmt(v, f),
            Self::Unsigned(v) => fmt::Display::fmt(v, f),
            Self::Float(v) => fmt::Display::fmt(v, f),
        }
    }
}

macro_rules! impl_from_number {
    ($variant:ident as $wide:ty: $($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(<$wide>::from(value))
                }
            }
        )*
    };
}

impl_from_number!(Signed as i64: i8, i16, i32, i64);
impl_from_number!(Unsigned as u64: u8, u16, u32, u64);
impl_from_number!(Float as f64: f32, f64);

/// Numbers that ranged endecs can bound-check.
///
/// Implemented for every type satisfying the bounds, which covers all
/// primitive integers up to 64 bits and both float types.
pub trait RangeNumber: Copy + PartialOrd + Into<Number> + Send + Sync + 'static {}

impl<N> RangeNumber for N where N: Copy + PartialOrd + Into<Number> + Send + Sync + 'static {}
