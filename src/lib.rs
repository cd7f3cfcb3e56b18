//! splicewiz-native: native routines and their host-runtime bindings
//!
//! # Overview
//!
//! The host statistical runtime calls into this library through a fixed set
//! of exported entry points. Each entry point is a thin shim: it unboxes the
//! host's opaque argument values into native types, forwards them to one
//! native routine, and boxes the result back.
//!
//! ```
//! use splicewiz_native::{HostValue, NativeModule, BuiltinNatives};
//!
//! # fn main() -> splicewiz_native::Result<()> {
//! // Module load: register the call table and disable dynamic lookup
//! let module = NativeModule::init(BuiltinNatives::default())?;
//!
//! let threads = module.call("_SpliceWiz_Has_OpenMP", &[])?;
//! assert_eq!(threads.extent(), 1);
//!
//! // Wrong argument types fail before any native code runs
//! let err = module.call("_SpliceWiz_c_Check_Cov", &[HostValue::integer(1)]);
//! assert!(err.is_err());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`host`]: boxed host values and the unboxing/boxing traits
//! - [`bindings`]: generated shims and the static call table
//! - [`registry`]: module load, registration, and dispatch by name
//! - [`natives`]: the native routine trait and the built-in backend
//! - [`io`]: compressed input with parallel BGZF decompression
//! - [`types`]: structured records returned by natives

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod bindings;
pub mod config;
pub mod error;
pub mod host;
pub mod io;
pub mod natives;
pub mod registry;
pub mod types;

// Re-export commonly used types
pub use bindings::{CallMethodDef, CALL_ENTRIES};
pub use config::NativeConfig;
pub use error::{Result, SpliceWizError};
pub use host::{FromHost, HostList, HostType, HostValue, IntoHost, NA_INTEGER};
pub use natives::{BuiltinNatives, Natives};
pub use registry::{ModuleState, NativeModule};
pub use types::{DataFrame, Rle, RleList, TableSet, STATUS_FAILED, STATUS_OK};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
