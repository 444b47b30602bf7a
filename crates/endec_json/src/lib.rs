#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod de;
mod endec;
mod ser;

// -----------------------------------------------------------------------------
// Exports

pub use de::JsonDeserializer;
pub use endec::{JSON, JsonEndec};
pub use ser::JsonSerializer;

pub use serde_json;
