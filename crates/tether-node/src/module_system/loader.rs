// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! CommonJS require() driver
//!
//! Locating and compiling module source is the host's business. The loader
//! only sequences a load against the runtime state: look the id up, and on a
//! miss build a `{ exports, id, loaded }` record, register it before the body
//! runs, hand the body to a [`ModuleFactory`], then read `exports` back.

use crate::error::{NodeError, Result};
use crate::module_system::registry::EXPORTS;
use crate::module_system::specifier;
use crate::runtime::RuntimeState;
use std::collections::HashMap;
use tether_engine::{Object, ScriptRuntime, Value};

/// Produces the body of a module the first time it is required.
pub trait ModuleFactory<R: ScriptRuntime> {
    /// Populate `scope.exports()` (or replace `module.exports`) for
    /// `scope.id()`
    fn instantiate(&self, scope: &mut ModuleScope<'_, R>) -> Result<()>;
}

impl<R, F> ModuleFactory<R> for F
where
    R: ScriptRuntime,
    F: Fn(&mut ModuleScope<'_, R>) -> Result<()>,
{
    fn instantiate(&self, scope: &mut ModuleScope<'_, R>) -> Result<()> {
        self(scope)
    }
}

type ModuleBody<R> = Box<dyn Fn(&mut ModuleScope<'_, R>) -> Result<()>>;

/// A fixed table of module bodies keyed by module id
pub struct ModuleTable<R: ScriptRuntime> {
    bodies: HashMap<String, ModuleBody<R>>,
}

impl<R: ScriptRuntime> ModuleTable<R> {
    /// Create a new empty table
    pub fn new() -> Self {
        Self {
            bodies: HashMap::new(),
        }
    }

    /// Add the body for module `id`, replacing any previous one
    pub fn define<F>(&mut self, id: impl Into<String>, body: F) -> &mut Self
    where
        F: Fn(&mut ModuleScope<'_, R>) -> Result<()> + 'static,
    {
        self.bodies.insert(id.into(), Box::new(body));
        self
    }

    /// Check if a body is defined for `id`
    pub fn contains(&self, id: &str) -> bool {
        self.bodies.contains_key(id)
    }
}

impl<R: ScriptRuntime> Default for ModuleTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ScriptRuntime> ModuleFactory<R> for ModuleTable<R> {
    fn instantiate(&self, scope: &mut ModuleScope<'_, R>) -> Result<()> {
        let body = self
            .bodies
            .get(scope.id())
            .ok_or_else(|| NodeError::module_not_found(scope.id()))?;
        body(scope)
    }
}

/// What a module body sees while it runs
pub struct ModuleScope<'a, R: ScriptRuntime> {
    id: &'a str,
    module: Object,
    exports: Object,
    loader: &'a mut ModuleLoader,
    state: &'a mut RuntimeState<R>,
    factory: &'a dyn ModuleFactory<R>,
}

impl<R: ScriptRuntime> ModuleScope<'_, R> {
    /// The module id being loaded
    pub fn id(&self) -> &str {
        self.id
    }

    /// The module record (`module`)
    pub fn module(&self) -> &Object {
        &self.module
    }

    /// The initial `module.exports` object (`exports`)
    pub fn exports(&self) -> &Object {
        &self.exports
    }

    /// Directory of the running script
    pub fn dirname(&self) -> &str {
        self.state.dirname()
    }

    /// The engine, for populating exports
    pub fn runtime(&mut self) -> &mut R {
        self.state.runtime_mut()
    }

    /// The runtime state, for bindings and the loop handle
    pub fn state(&mut self) -> &mut RuntimeState<R> {
        self.state
    }

    /// Nested `require()` from inside this module's body
    pub fn require(&mut self, specifier: &str) -> Result<Object> {
        self.loader.require(self.state, specifier, self.factory)
    }
}

/// Sequences `require()` calls against a runtime state
#[derive(Debug, Default)]
pub struct ModuleLoader {
    /// Stack of currently loading modules (for circular dependency detection)
    loading_stack: Vec<String>,

    /// Failed module id -> the `(module, reason)` it failed with
    failures: HashMap<String, (String, String)>,
}

impl ModuleLoader {
    /// Create a new module loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a module, returning its `exports`.
    ///
    /// A module already in the registry is returned as is, without running
    /// its body again. A module that is still loading (a circular require)
    /// yields its partially populated exports. A module whose body failed
    /// stays registered with `loaded = false` and every later require of it
    /// fails again with the original reason.
    pub fn require<R: ScriptRuntime>(
        &mut self,
        state: &mut RuntimeState<R>,
        specifier: &str,
        factory: &dyn ModuleFactory<R>,
    ) -> Result<Object> {
        let id = specifier::normalize(specifier, state.dirname())?;

        if let Some(exports) = state.try_find_required_module(&id)? {
            if self.is_loading(&id) {
                tracing::debug!(module = %id, "circular require, returning partial exports");
                return Ok(exports);
            }
            if Self::failed_to_load(state, &id) {
                return Err(match self.failures.get(&id) {
                    Some((module, reason)) => NodeError::module_evaluation(module, reason),
                    None => NodeError::module_evaluation(&id, "module failed to load"),
                });
            }
            return Ok(exports);
        }

        let (module, exports) = Self::create_record(state.runtime_mut(), &id);
        let module = state.try_add_required_module(id.clone(), module)?.clone();

        self.loading_stack.push(id.clone());
        let outcome = {
            let mut scope = ModuleScope {
                id: &id,
                module: module.clone(),
                exports,
                loader: &mut *self,
                state: &mut *state,
                factory,
            };
            factory.instantiate(&mut scope)
        };
        self.loading_stack.pop();

        match outcome {
            Ok(()) => {}
            Err(NodeError::ModuleEvaluation { module, reason }) => {
                self.failures.insert(id, (module.clone(), reason.clone()));
                return Err(NodeError::ModuleEvaluation { module, reason });
            }
            Err(err) => {
                tracing::warn!(module = %id, error = %err, "module body failed");
                let reason = err.to_string();
                self.failures.insert(id.clone(), (id.clone(), reason.clone()));
                return Err(NodeError::module_evaluation(id, reason));
            }
        }

        state.runtime_mut().set_named(&module, "loaded", Value::Boolean(true));
        state
            .try_find_required_module(&id)?
            .ok_or_else(|| NodeError::module_not_found(&id))
    }

    /// Check if `id` is in the middle of loading
    pub fn is_loading(&self, id: &str) -> bool {
        self.loading_stack.iter().any(|loading| loading == id)
    }

    /// Depth of the current require chain
    pub fn depth(&self) -> usize {
        self.loading_stack.len()
    }

    // Records registered by the host directly carry no `loaded` flag and
    // count as loaded.
    fn failed_to_load<R: ScriptRuntime>(state: &mut RuntimeState<R>, id: &str) -> bool {
        let Some(record) = state.required_module_record(id).cloned() else {
            return false;
        };
        state.runtime_mut().get_named(&record, "loaded") == Value::Boolean(false)
    }

    fn create_record<R: ScriptRuntime>(runtime: &mut R, id: &str) -> (Object, Object) {
        let module = runtime.create_object();
        let exports = runtime.create_object();
        let id_string = runtime.create_string(id);

        runtime.set_named(&module, EXPORTS, Value::Object(exports.clone()));
        runtime.set_named(&module, "id", Value::String(id_string));
        runtime.set_named(&module, "loaded", Value::Boolean(false));
        (module, exports)
    }
}

/// require.resolve() - get the module id without loading
pub fn require_resolve<R: ScriptRuntime>(state: &RuntimeState<R>, specifier: &str) -> Result<String> {
    specifier::normalize(specifier, state.dirname())
}
