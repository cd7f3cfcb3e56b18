//! Module loading and routine registration
//!
//! A [`NativeModule`] models one loaded instance of the library inside the
//! host runtime. Loading leaves it `Unregistered` with dynamic symbol lookup
//! enabled, so any exported shim can be resolved by name. [`NativeModule::init`]
//! performs the one-time registration: it records the call table and turns
//! dynamic lookup off, after which only registered routines are callable.

use crate::bindings::{CallMethodDef, CALL_ENTRIES, PACKAGE};
use crate::error::{Result, SpliceWizError};
use crate::host::HostValue;
use crate::natives::Natives;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Registration lifecycle of a loaded module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    /// Loaded, call table not yet registered
    Unregistered,
    /// Call table registered
    Registered,
    /// Unloaded; no further calls
    Unloaded,
}

impl ModuleState {
    fn name(self) -> &'static str {
        match self {
            ModuleState::Unregistered => "Unregistered",
            ModuleState::Registered => "Registered",
            ModuleState::Unloaded => "Unloaded",
        }
    }
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check a call table for empty and duplicate names
pub fn validate_table(table: &[CallMethodDef]) -> Result<()> {
    let mut seen = HashSet::with_capacity(table.len());
    for entry in table {
        if entry.name.is_empty() {
            return Err(SpliceWizError::InvalidTable(
                "entry with an empty name".to_string(),
            ));
        }
        if !seen.insert(entry.name) {
            return Err(SpliceWizError::DuplicateEntry(entry.name.to_string()));
        }
    }
    Ok(())
}

/// A loaded native module bound to a backend
pub struct NativeModule<N: Natives> {
    name: String,
    natives: N,
    exports: &'static [CallMethodDef],
    routines: HashMap<&'static str, CallMethodDef>,
    dynamic_symbols: bool,
    state: ModuleState,
}

impl<N: Natives> NativeModule<N> {
    /// Load a module exporting [`CALL_ENTRIES`]
    pub fn load(name: impl Into<String>, natives: N) -> Self {
        Self::load_with_exports(name, natives, CALL_ENTRIES)
    }

    /// Load a module exporting an arbitrary table
    pub fn load_with_exports(
        name: impl Into<String>,
        natives: N,
        exports: &'static [CallMethodDef],
    ) -> Self {
        let name = name.into();
        log::debug!("loaded module {} ({} exported symbols)", name, exports.len());
        Self {
            name,
            natives,
            exports,
            routines: HashMap::new(),
            dynamic_symbols: true,
            state: ModuleState::Unregistered,
        }
    }

    /// Load, register [`CALL_ENTRIES`], and disable dynamic lookup
    pub fn init(natives: N) -> Result<Self> {
        let mut module = Self::load(PACKAGE, natives);
        module.register_routines(CALL_ENTRIES)?;
        module.use_dynamic_symbols(false);
        Ok(module)
    }

    /// Record `table` as this module's callable routines
    ///
    /// Allowed once, from `Unregistered`. Nothing is recorded if the table is
    /// invalid.
    pub fn register_routines(&mut self, table: &[CallMethodDef]) -> Result<()> {
        if self.state != ModuleState::Unregistered {
            return Err(SpliceWizError::InvalidState {
                operation: "register routines on",
                state: self.state.name(),
            });
        }
        validate_table(table)?;

        self.routines = table.iter().map(|entry| (entry.name, *entry)).collect();
        self.state = ModuleState::Registered;
        log::debug!("registered {} routines for {}", table.len(), self.name);
        Ok(())
    }

    /// Enable or disable resolving unregistered exports by name
    pub fn use_dynamic_symbols(&mut self, enabled: bool) {
        self.dynamic_symbols = enabled;
    }

    /// Resolve an exported routine by name
    pub fn resolve(&self, name: &str) -> Result<CallMethodDef> {
        if self.state == ModuleState::Unloaded {
            return Err(SpliceWizError::InvalidState {
                operation: "resolve symbols in",
                state: self.state.name(),
            });
        }
        if let Some(entry) = self.routines.get(name) {
            return Ok(*entry);
        }
        if self.dynamic_symbols {
            if let Some(entry) = self.exports.iter().find(|e| e.name == name) {
                return Ok(*entry);
            }
        }
        Err(SpliceWizError::SymbolNotFound(name.to_string()))
    }

    /// Call a routine by exported name with boxed arguments
    pub fn call(&self, name: &str, args: &[HostValue]) -> Result<HostValue> {
        let entry = self.resolve(name)?;
        if args.len() != entry.arity {
            return Err(SpliceWizError::ArityMismatch {
                name: entry.name.to_string(),
                expected: entry.arity,
                got: args.len(),
            });
        }
        log::trace!("{}: calling {}", self.name, entry.name);
        entry.invoke(&self.natives, args)
    }

    /// Mark the module unloaded
    pub fn unload(&mut self) {
        log::debug!("unloading module {}", self.name);
        self.routines.clear();
        self.state = ModuleState::Unloaded;
    }

    /// Module name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle state
    pub fn state(&self) -> ModuleState {
        self.state
    }

    /// Whether unregistered exports can still be resolved
    pub fn dynamic_symbols(&self) -> bool {
        self.dynamic_symbols
    }

    /// Registered routine names, sorted
    pub fn registered_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.routines.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Backend the shims delegate to
    pub fn natives(&self) -> &N {
        &self.natives
    }
}

impl<N: Natives> fmt::Debug for NativeModule<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeModule")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("routines", &self.routines.len())
            .field("dynamic_symbols", &self.dynamic_symbols)
            .finish()
    }
}
