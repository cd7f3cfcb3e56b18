//! Boxed host values
//!
//! The host runtime hands every argument over as a vector: scalars are
//! vectors of extent 1, and any element may be missing. `HostValue` mirrors
//! that model so shims can type-check before unboxing.

use std::fmt;

/// Host-side type tag of a boxed value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostType {
    /// The null object
    Null,
    /// Logical vector
    Logical,
    /// Integer vector
    Integer,
    /// Double-precision vector
    Double,
    /// Character vector
    Character,
    /// Generic vector (list)
    List,
}

impl HostType {
    /// Type name as the host runtime prints it
    pub fn name(self) -> &'static str {
        match self {
            HostType::Null => "NULL",
            HostType::Logical => "logical",
            HostType::Integer => "integer",
            HostType::Double => "double",
            HostType::Character => "character",
            HostType::List => "list",
        }
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Generic vector with optional names and class attribute
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HostList {
    /// Elements in order
    pub values: Vec<HostValue>,
    /// Element names, same length as `values` when present
    pub names: Option<Vec<String>>,
    /// Class attribute (e.g. `data.frame`)
    pub class: Option<String>,
}

impl HostList {
    /// Build an unnamed list
    pub fn unnamed(values: Vec<HostValue>) -> Self {
        Self {
            values,
            names: None,
            class: None,
        }
    }

    /// Build a named list from `(name, value)` pairs
    pub fn named<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, HostValue)>,
        S: Into<String>,
    {
        let (names, values): (Vec<String>, Vec<HostValue>) = entries
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .unzip();
        Self {
            values,
            names: Some(names),
            class: None,
        }
    }

    /// Attach a class attribute
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the list has no elements
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up an element by name
    pub fn get(&self, name: &str) -> Option<&HostValue> {
        let names = self.names.as_ref()?;
        names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.values.get(i))
    }
}

/// Opaque boxed value from the host runtime
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    /// The null object
    Null,
    /// Logical vector; `None` is a missing value
    Logical(Vec<Option<bool>>),
    /// Integer vector; `None` is a missing value
    Integer(Vec<Option<i32>>),
    /// Double vector; `None` is a missing value
    Double(Vec<Option<f64>>),
    /// Character vector; `None` is a missing value
    Character(Vec<Option<String>>),
    /// Generic vector
    List(HostList),
}

impl HostValue {
    /// Logical scalar
    pub fn logical(value: bool) -> Self {
        HostValue::Logical(vec![Some(value)])
    }

    /// Integer scalar
    pub fn integer(value: i32) -> Self {
        HostValue::Integer(vec![Some(value)])
    }

    /// Double scalar
    pub fn double(value: f64) -> Self {
        HostValue::Double(vec![Some(value)])
    }

    /// Character scalar
    pub fn string(value: impl Into<String>) -> Self {
        HostValue::Character(vec![Some(value.into())])
    }

    /// Character vector without missing values
    pub fn strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        HostValue::Character(values.into_iter().map(|s| Some(s.into())).collect())
    }

    /// Integer vector without missing values
    pub fn integers(values: impl IntoIterator<Item = i32>) -> Self {
        HostValue::Integer(values.into_iter().map(Some).collect())
    }

    /// Host type tag
    pub fn host_type(&self) -> HostType {
        match self {
            HostValue::Null => HostType::Null,
            HostValue::Logical(_) => HostType::Logical,
            HostValue::Integer(_) => HostType::Integer,
            HostValue::Double(_) => HostType::Double,
            HostValue::Character(_) => HostType::Character,
            HostValue::List(_) => HostType::List,
        }
    }

    /// Vector length (0 for `NULL`)
    pub fn extent(&self) -> usize {
        match self {
            HostValue::Null => 0,
            HostValue::Logical(v) => v.len(),
            HostValue::Integer(v) => v.len(),
            HostValue::Double(v) => v.len(),
            HostValue::Character(v) => v.len(),
            HostValue::List(l) => l.len(),
        }
    }

    /// Borrow the list payload, if this is a list
    pub fn as_list(&self) -> Option<&HostList> {
        match self {
            HostValue::List(list) => Some(list),
            _ => None,
        }
    }

    /// True for `NULL`
    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }
}

impl From<HostList> for HostValue {
    fn from(list: HostList) -> Self {
        HostValue::List(list)
    }
}
