#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod attribute;
mod context;
mod dispatch;
mod error;
mod keyed;
mod number;

pub mod de;
pub mod endec;
pub mod frames;
pub mod ser;
pub mod structs;

// -----------------------------------------------------------------------------
// Top-level exports

pub use attribute::{AttributeInstance, AttributeKind, HUMAN_READABLE};
pub use attribute::{MarkerAttribute, SerializationAttribute, ValueAttribute};
pub use context::SerializationContext;
pub use error::{EndecError, RangeError, Result};
pub use number::{Number, RangeNumber};

pub use de::{DecodeFn, Deserializer, SelfDescribingDeserializer};
pub use de::{MapDeserializer, SequenceDeserializer, StructDecodeFn, StructDeserializer};
pub use ser::{EncodeFn, SelfDescribingSerializer, Serializer};
pub use ser::{MapSerializer, SequenceSerializer, StructSerializer};

pub use endec::{BOOL, BYTE, BYTES, DOUBLE, FLOAT, INT, LONG, SHORT, STRING};
pub use endec::{DynEndec, Endec, EndecExt, FnEndec, ResultSerializer, endec_of};
pub use endec::{VAR_INT, VAR_LONG, VOID};
pub use endec::{for_enum, if_attr, map, recursive, string_map};

pub use structs::{DynStructEndec, StructEndec, StructEndecExt, StructField};
pub use structs::{StructEndecBuilder, recursive_struct, struct_endec_of, unit};
pub use structs::{decode_as_struct, encode_as_struct};

pub use dispatch::{Dispatched, DispatchedStruct, dispatched, dispatched_struct};
pub use keyed::{KeyedEndec, MapCarrier};
