// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module registry for require()

use crate::error::InvariantViolation;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tether_engine::{Object, ScriptRuntime, Value};

/// Property of a module record holding its public surface
pub const EXPORTS: &str = "exports";

/// Module name → module record. Entries are never evicted.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, Object>,
}

impl ModuleRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the `exports` object of a registered module.
    ///
    /// Returns `Ok(None)` for a module that has not been registered yet.
    pub fn find<R: ScriptRuntime>(
        &self,
        runtime: &mut R,
        name: &str,
    ) -> Result<Option<Object>, InvariantViolation> {
        let Some(record) = self.modules.get(name) else {
            return Ok(None);
        };

        match runtime.get_named(record, EXPORTS) {
            Value::Object(exports) => Ok(Some(exports)),
            other => Err(InvariantViolation::NonObjectExports {
                module: name.to_string(),
                found: other.type_of(),
            }),
        }
    }

    /// Register a module record under a name that is not yet taken.
    ///
    /// Returns the stored record so the caller can keep configuring it.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        record: Object,
    ) -> Result<&Object, InvariantViolation> {
        match self.modules.entry(name.into()) {
            Entry::Occupied(entry) => Err(InvariantViolation::DuplicateModule(entry.key().clone())),
            Entry::Vacant(entry) => {
                tracing::debug!(module = %entry.key(), "registered module");
                Ok(entry.insert(record))
            }
        }
    }

    /// The stored module record, without touching `exports`
    pub fn record(&self, name: &str) -> Option<&Object> {
        self.modules.get(name)
    }

    /// Check if a module is registered
    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Get all registered module names
    pub fn names(&self) -> Vec<&str> {
        self.modules.keys().map(String::as_str).collect()
    }

    /// Get the number of registered modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
