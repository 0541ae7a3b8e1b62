// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Native binding initializers and lazy `internalBinding(name)`

use crate::error::{NodeError, Result};
use crate::runtime::{LoopHandle, RuntimeState};
use std::collections::HashMap;
use std::fmt;
use tether_engine::{HeapRuntime, Object, ScriptRuntime, Value};

/// Builds the capability object for one binding
pub type BindingInitializer<R> = Box<dyn Fn(&mut R, &LoopHandle) -> Object>;

struct BindingEntry<R> {
    init: BindingInitializer<R>,
    eager: bool,
}

/// Binding name → initializer.
///
/// The registry only knows how to build capabilities. Built capabilities
/// live in the `internalBinding` namespace of a particular runtime state.
pub struct BindingRegistry<R: ScriptRuntime = HeapRuntime> {
    entries: HashMap<String, BindingEntry<R>>,
}

impl<R: ScriptRuntime> BindingRegistry<R> {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register a binding built on first use
    pub fn register<F>(&mut self, name: impl Into<String>, init: F) -> &mut Self
    where
        F: Fn(&mut R, &LoopHandle) -> Object + 'static,
    {
        self.insert(name.into(), Box::new(init), false)
    }

    /// Register a binding built during bootstrap
    pub fn register_eager<F>(&mut self, name: impl Into<String>, init: F) -> &mut Self
    where
        F: Fn(&mut R, &LoopHandle) -> Object + 'static,
    {
        self.insert(name.into(), Box::new(init), true)
    }

    fn insert(&mut self, name: String, init: BindingInitializer<R>, eager: bool) -> &mut Self {
        if self.entries.insert(name.clone(), BindingEntry { init, eager }).is_some() {
            tracing::warn!(binding = %name, "replaced binding initializer");
        }
        self
    }

    /// Check if an initializer is registered for `name`
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Get all binding names
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Names of the bindings installed during bootstrap
    pub fn eager_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.eager)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Get the number of registered bindings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn build(&self, name: &str, runtime: &mut R, loop_handle: &LoopHandle) -> Result<Object> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| NodeError::no_such_binding(name))?;
        Ok((entry.init)(runtime, loop_handle))
    }
}

impl<R: ScriptRuntime> Default for BindingRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ScriptRuntime> fmt::Debug for BindingRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.names();
        names.sort_unstable();
        f.debug_struct("BindingRegistry").field("bindings", &names).finish()
    }
}

/// `internalBinding(name)`: the installed capability, building and
/// installing it first if this state has not seen `name` yet.
pub fn internal_binding<R: ScriptRuntime>(
    state: &mut RuntimeState<R>,
    registry: &BindingRegistry<R>,
    name: &str,
) -> Result<Value> {
    if state.try_internal_binding_prop_exists(name)? {
        return Ok(state.try_get_internal_binding_prop(name)?);
    }

    let loop_handle = state.loop_handle().clone();
    let capability = registry.build(name, state.runtime_mut(), &loop_handle)?;
    state.try_set_internal_binding_prop(name, capability.clone())?;
    tracing::debug!(binding = name, "installed internal binding");

    Ok(Value::Object(capability))
}
