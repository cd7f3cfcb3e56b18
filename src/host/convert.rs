//! Unboxing and boxing between host values and native parameter types
//!
//! [`FromHost`] is the type-checked unboxing step every shim runs before it
//! delegates; [`IntoHost`] boxes whatever the native returned. Scalar
//! parameters require extent 1. Numeric scalars coerce across logical,
//! integer and double the way the host's own scalar accessors do, and
//! missing values pass through in the host's native encoding.

use super::value::{HostList, HostValue};
use crate::error::{Result, SpliceWizError};

/// Text the host prints for a missing string
pub const NA_STRING: &str = "NA";

/// Host encoding of a missing integer
pub const NA_INTEGER: i32 = i32::MIN;

/// Native types that can be unboxed from a host value
pub trait FromHost: Sized {
    /// Native type name used in error messages
    const TARGET: &'static str;

    /// Unbox `value`, failing with a marshalling error on mismatch
    fn from_host(value: &HostValue) -> Result<Self>;
}

/// Native types that can be boxed into a host value
pub trait IntoHost {
    /// Box `self` for the host runtime
    fn into_host(self) -> HostValue;
}

fn type_mismatch(expected: &'static str, value: &HostValue) -> SpliceWizError {
    SpliceWizError::TypeMismatch {
        expected,
        found: value.host_type().name(),
    }
}

fn require_single(expected: &'static str, value: &HostValue) -> Result<()> {
    match value.extent() {
        1 => Ok(()),
        extent => Err(SpliceWizError::ExtentMismatch { expected, extent }),
    }
}

impl FromHost for String {
    const TARGET: &'static str = "string";

    fn from_host(value: &HostValue) -> Result<Self> {
        match value {
            HostValue::Character(v) => {
                require_single(Self::TARGET, value)?;
                Ok(v[0].clone().unwrap_or_else(|| NA_STRING.to_string()))
            }
            _ => Err(type_mismatch(Self::TARGET, value)),
        }
    }
}

impl FromHost for i32 {
    const TARGET: &'static str = "integer";

    fn from_host(value: &HostValue) -> Result<Self> {
        match value {
            HostValue::Integer(v) => {
                require_single(Self::TARGET, value)?;
                Ok(v[0].unwrap_or(NA_INTEGER))
            }
            HostValue::Logical(v) => {
                require_single(Self::TARGET, value)?;
                Ok(v[0].map_or(NA_INTEGER, i32::from))
            }
            HostValue::Double(v) => {
                require_single(Self::TARGET, value)?;
                match v[0] {
                    None => Ok(NA_INTEGER),
                    Some(d) if d.is_nan() => Ok(NA_INTEGER),
                    Some(d) => {
                        let truncated = d.trunc();
                        if truncated < i32::MIN as f64 || truncated > i32::MAX as f64 {
                            return Err(type_mismatch(Self::TARGET, value));
                        }
                        Ok(truncated as i32)
                    }
                }
            }
            _ => Err(type_mismatch(Self::TARGET, value)),
        }
    }
}

/// Missing logicals unbox as `true`: the host stores NA as a non-zero word
impl FromHost for bool {
    const TARGET: &'static str = "logical";

    fn from_host(value: &HostValue) -> Result<Self> {
        match value {
            HostValue::Logical(v) => {
                require_single(Self::TARGET, value)?;
                Ok(v[0].unwrap_or(true))
            }
            HostValue::Integer(v) => {
                require_single(Self::TARGET, value)?;
                Ok(v[0].map_or(true, |i| i != 0))
            }
            HostValue::Double(v) => {
                require_single(Self::TARGET, value)?;
                Ok(v[0].map_or(true, |d| d.is_nan() || d != 0.0))
            }
            _ => Err(type_mismatch(Self::TARGET, value)),
        }
    }
}

fn na_or(element: Option<String>) -> String {
    element.unwrap_or_else(|| NA_STRING.to_string())
}

/// String sequence parameter: any extent, `NULL` is empty, atomic vectors
/// are coerced element-wise the way the host prints them
impl FromHost for Vec<String> {
    const TARGET: &'static str = "character";

    fn from_host(value: &HostValue) -> Result<Self> {
        match value {
            HostValue::Null => Ok(Vec::new()),
            HostValue::Character(v) => Ok(v.iter().cloned().map(na_or).collect()),
            HostValue::Logical(v) => Ok(v
                .iter()
                .map(|l| na_or(l.map(|l| (if l { "TRUE" } else { "FALSE" }).to_string())))
                .collect()),
            HostValue::Integer(v) => Ok(v
                .iter()
                .map(|i| na_or(i.map(|i| i.to_string())))
                .collect()),
            HostValue::Double(v) => Ok(v
                .iter()
                .map(|d| na_or(d.filter(|d| !d.is_nan()).map(|d| d.to_string())))
                .collect()),
            HostValue::List(_) => Err(type_mismatch(Self::TARGET, value)),
        }
    }
}

impl IntoHost for i32 {
    fn into_host(self) -> HostValue {
        HostValue::integer(self)
    }
}

impl IntoHost for bool {
    fn into_host(self) -> HostValue {
        HostValue::logical(self)
    }
}

impl IntoHost for String {
    fn into_host(self) -> HostValue {
        HostValue::string(self)
    }
}

impl IntoHost for Vec<String> {
    fn into_host(self) -> HostValue {
        HostValue::strings(self)
    }
}

impl IntoHost for Vec<i32> {
    fn into_host(self) -> HostValue {
        HostValue::integers(self)
    }
}

impl IntoHost for () {
    fn into_host(self) -> HostValue {
        HostValue::Null
    }
}

impl IntoHost for HostValue {
    fn into_host(self) -> HostValue {
        self
    }
}

impl IntoHost for HostList {
    fn into_host(self) -> HostValue {
        HostValue::List(self)
    }
}
