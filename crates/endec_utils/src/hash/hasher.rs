//! Provide `FixedHasher`.
//!
//! Hash results depend only on the input, never on process state.

use core::hash::BuildHasher;

use foldhash::fast::{FixedState, FoldHasher};

/// Seed shared by every [`FixedHashState`].
const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x6A09E667F3BCC908);

/// A hasher whose results only depend on the input.
///
/// A type alias for [`foldhash::fast::FoldHasher`].
pub type FixedHasher = FoldHasher<'static>;

/// Fixed hash state, based on `foldhash` with a constant seed.
///
/// # Examples
///
/// ```
/// use core::hash::{BuildHasher, Hash, Hasher};
/// use endec_utils::hash::FixedHashState;
///
/// let mut a = FixedHashState.build_hasher();
/// let mut b = FixedHashState.build_hasher();
/// "field".hash(&mut a);
/// "field".hash(&mut b);
///
/// assert_eq!(a.finish(), b.finish());
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}

#[cfg(test)]
mod tests {
    use super::FixedHashState;
    use core::hash::BuildHasher;

    #[test]
    fn same_input_same_hash() {
        let a = FixedHashState.hash_one("human_readable");
        let b = FixedHashState.hash_one("human_readable");
        assert_eq!(a, b);
        assert_ne!(a, FixedHashState.hash_one("other"));
    }
}
