//! EB3-series e-bike controller protocol.
//!
//! This crate is intentionally I/O-free. It provides the parameter schema for
//! the EB3 controller family, the per-model unit transforms, a typed value
//! bag, and the codec that turns a set of parameter values into the binary
//! frame the controller expects on its programming port.
//!
//! # Key Features
//! - Closed parameter schema with load order and raw (wire) order tables
//! - Per-model affine transforms between display units and raw bytes
//! - Fixed-length frame construction with XOR checksum
//! - Typed errors for values that cannot be represented on the wire

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(static_mut_refs)]

pub mod error;
pub mod frame;
pub mod models;
pub mod schema;
pub mod values;

pub use error::{EncodeError, UnknownModel};
pub use frame::{FRAME_LEN, build_frame, xor_checksum};
pub use models::{Affine, Catalog, ControllerModel, catalog};
pub use schema::{
    ParamClass, ParamDescriptor, ParamId, ParamKind, RawSlot, RawTransform, Schema, eb3,
};
pub use values::{ParamValues, Value};
