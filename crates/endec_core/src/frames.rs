//! Frame stacks for tree-shaped formats.
//!
//! A tree format builds or walks one node per nested value. The serializer
//! side pushes an empty frame per nested value and collects whatever the
//! nested encode produced ([`RecursiveSerializer`]). The deserializer side
//! pushes the child node being read ([`RecursiveDeserializer`]) and can
//! snapshot the stack to roll back failed reads.
//!
//! Both stacks always pop the frames they push, also when the nested call fails.

use alloc::borrow::Cow;
use alloc::vec;
use alloc::vec::Vec;

use crate::de::Deserializer;
use crate::error::{EndecError, Result};
use crate::ser::Serializer;

// -----------------------------------------------------------------------------
// EncodeFrames

/// Stack of output slots; the bottom slot holds the final result.
#[derive(Debug, Clone)]
pub struct EncodeFrames<V> {
    frames: Vec<Option<V>>,
}

impl<V> EncodeFrames<V> {
    pub fn new() -> Self {
        Self {
            frames: vec![None],
        }
    }

    /// Stores `value` in the innermost frame, replacing what was there.
    pub fn consume(&mut self, value: V) {
        if let Some(slot) = self.frames.last_mut() {
            *slot = Some(value);
        }
    }

    pub fn push(&mut self) {
        self.frames.push(None);
    }

    /// Pops the innermost frame. The bottom frame is never popped.
    pub fn pop(&mut self) -> EncodedValue<V> {
        let value = if self.frames.len() > 1 {
            self.frames.pop().flatten()
        } else {
            None
        };
        EncodedValue { value }
    }

    /// Number of nested frames above the result frame.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// Takes the final result out of the bottom frame.
    pub fn take_result(&mut self) -> Option<V> {
        self.frames.first_mut().and_then(Option::take)
    }
}

impl<V> Default for EncodeFrames<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// What a nested encode produced inside a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedValue<V> {
    value: Option<V>,
}

impl<V> EncodedValue<V> {
    pub fn was_encoded(&self) -> bool {
        self.value.is_some()
    }

    pub fn value(self) -> Option<V> {
        self.value
    }

    /// Returns the value, or [`EndecError::NothingSerialized`] naming `what`.
    pub fn require(self, what: &'static str) -> Result<V> {
        self.value.ok_or(EndecError::NothingSerialized {
            name: Cow::Borrowed(what),
        })
    }
}

/// Serializer support for tree-shaped formats.
///
/// Leaf writes call [`consume`](Self::consume); compound states run nested
/// encodes through [`frame`](Self::frame) and attach the produced node to
/// the node they are building.
pub trait RecursiveSerializer: Serializer + Sized {
    type Value;

    fn frames(&mut self) -> &mut EncodeFrames<Self::Value>;

    #[inline]
    fn consume(&mut self, value: Self::Value) {
        self.frames().consume(value);
    }

    /// Runs `action` in a fresh frame and returns what it produced.
    fn frame(
        &mut self,
        action: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<EncodedValue<Self::Value>> {
        self.frames().push();
        let result = action(self);
        let encoded = self.frames().pop();
        result.map(|()| encoded)
    }
}

// -----------------------------------------------------------------------------
// DecodeFrames

/// Stack of input nodes; the top is the node currently being read.
#[derive(Debug, Clone)]
pub struct DecodeFrames<V> {
    frames: Vec<V>,
}

/// A saved [`DecodeFrames`] state.
#[derive(Debug, Clone)]
pub struct FrameSnapshot<V> {
    frames: Vec<V>,
}

impl<V: Clone> DecodeFrames<V> {
    pub fn new(root: V) -> Self {
        Self { frames: vec![root] }
    }

    /// The node currently being read.
    pub fn current(&self) -> Option<&V> {
        self.frames.last()
    }

    pub fn push(&mut self, value: V) {
        self.frames.push(value);
    }

    pub fn pop(&mut self) -> Option<V> {
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn snapshot(&self) -> FrameSnapshot<V> {
        FrameSnapshot {
            frames: self.frames.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: FrameSnapshot<V>) {
        self.frames = snapshot.frames;
    }
}

/// Deserializer support for tree-shaped formats.
pub trait RecursiveDeserializer: Deserializer + Sized {
    type Value: Clone;

    fn frames(&mut self) -> &mut DecodeFrames<Self::Value>;

    fn frames_ref(&self) -> &DecodeFrames<Self::Value>;

    /// The node currently being read.
    fn value(&self) -> Result<Self::Value> {
        self.frames_ref()
            .current()
            .cloned()
            .ok_or(EndecError::Unexpected(Cow::Borrowed("frame stack is empty")))
    }

    /// Runs `action` with `next` as the current node.
    fn frame<R>(
        &mut self,
        next: Self::Value,
        action: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        self.frames().push(next);
        let result = action(self);
        self.frames().pop();
        result
    }

    /// Runs `reader`, restoring the frame stack if it fails.
    fn try_read_frames<R>(&mut self, reader: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        let snapshot = self.frames_ref().snapshot();
        let result = reader(self);
        if let Err(err) = &result {
            log::trace!("rolling back frame stack after failed read: {err}");
            self.frames().restore(snapshot);
        }
        result
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{DecodeFrames, EncodeFrames};
    use crate::error::EndecError;

    #[test]
    fn encode_frames_nest() {
        let mut frames = EncodeFrames::new();
        frames.push();
        frames.consume(1);
        frames.push();
        assert_eq!(frames.depth(), 2);

        assert!(!frames.pop().was_encoded());
        assert_eq!(frames.pop().value(), Some(1));

        frames.consume(7);
        assert_eq!(frames.pop().value(), None);
        assert_eq!(frames.take_result(), Some(7));
        assert_eq!(frames.take_result(), None);
    }

    #[test]
    fn require_reports_nothing_serialized() {
        let mut frames = EncodeFrames::<i32>::new();
        frames.push();
        let err = frames.pop().require("struct field").unwrap_err();
        assert!(matches!(err, EndecError::NothingSerialized { .. }));
    }

    #[test]
    fn snapshot_restores_stack() {
        let mut frames = DecodeFrames::new("root");
        let snapshot = frames.snapshot();

        frames.push("a");
        frames.push("b");
        assert_eq!(frames.current(), Some(&"b"));

        frames.restore(snapshot);
        assert_eq!(frames.depth(), 1);
        assert_eq!(frames.current(), Some(&"root"));
    }
}
