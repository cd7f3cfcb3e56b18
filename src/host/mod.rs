//! Host runtime value model
//!
//! The host runtime passes every argument as an opaque boxed vector. This
//! module defines that boxed representation ([`HostValue`]) and the two
//! conversion traits the binding shims are built on: [`FromHost`] for
//! type-checked unboxing and [`IntoHost`] for boxing results.

mod convert;
mod value;

pub use convert::{FromHost, IntoHost, NA_INTEGER, NA_STRING};
pub use value::{HostList, HostType, HostValue};
