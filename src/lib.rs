#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use endec_core as codec;
pub use endec_utils as utils;

#[cfg(feature = "binary")]
pub use endec_binary as binary;
#[cfg(feature = "edm")]
pub use endec_edm as edm;
#[cfg(feature = "json")]
pub use endec_json as json;

pub use endec_core::{Endec, EndecError, EndecExt, SerializationContext, StructEndec};
pub use endec_core::{StructEndecBuilder, StructEndecExt};
