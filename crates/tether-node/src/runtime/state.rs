// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Runtime state shared by `require()` and `internalBinding()`

use crate::bindings::InternalBindingNamespace;
use crate::config::RuntimeConfig;
use crate::error::InvariantViolation;
use crate::module_system::ModuleRegistry;
use crate::runtime::LoopHandle;
use std::fmt;
use tether_engine::{HeapRuntime, Object, PropName, ScriptRuntime, Value};

/// Owns one script engine and the caches built on top of it.
///
/// One state per engine instance. The state is move-only: it cannot be
/// cloned, and dropping it drops the module registry and then the engine.
///
/// Operations whose preconditions are the embedder's responsibility come in
/// two flavours. The plain form panics on a broken contract; the `try_*`
/// form returns the [`InvariantViolation`] instead.
pub struct RuntimeState<R: ScriptRuntime = HeapRuntime> {
    /// Modules already handed out by `require()`
    modules: ModuleRegistry,
    /// Cached identifier for `global.internalBinding`
    internal_binding: InternalBindingNamespace,
    /// Directory of the script being run
    dirname: String,
    /// Host event loop; held, never driven
    loop_handle: LoopHandle,
    /// Declared last so every handle above is dropped before the engine
    runtime: R,
}

impl<R: ScriptRuntime + Default> RuntimeState<R> {
    /// Create a state with a fresh engine instance
    pub fn new(dirname: impl Into<String>, loop_handle: LoopHandle) -> Self {
        Self::with_runtime(R::default(), dirname, loop_handle)
    }

    /// Create a state from configuration
    pub fn from_config(config: &RuntimeConfig, loop_handle: LoopHandle) -> Self {
        Self::new(config.resolve_dirname(), loop_handle)
    }
}

impl<R: ScriptRuntime> RuntimeState<R> {
    /// Create a state around an already constructed engine instance
    pub fn with_runtime(mut runtime: R, dirname: impl Into<String>, loop_handle: LoopHandle) -> Self {
        let internal_binding = InternalBindingNamespace::new(&mut runtime);
        let dirname = dirname.into();
        tracing::debug!(dirname = %dirname, runtime = %runtime.runtime_id(), "created runtime state");

        Self {
            modules: ModuleRegistry::new(),
            internal_binding,
            dirname,
            loop_handle,
            runtime,
        }
    }

    // ==================== require() modules ====================

    /// `exports` of an already registered module, or `None` if it has not
    /// been loaded yet.
    ///
    /// # Panics
    ///
    /// Panics if the stored module record has no object-typed `exports`.
    pub fn find_required_module(&mut self, name: &str) -> Option<Object> {
        self.try_find_required_module(name)
            .unwrap_or_else(|violation| panic!("{violation}"))
    }

    /// Like [`find_required_module`](Self::find_required_module), returning
    /// the contract violation instead of panicking
    pub fn try_find_required_module(&mut self, name: &str) -> Result<Option<Object>, InvariantViolation> {
        self.modules.find(&mut self.runtime, name)
    }

    /// Register the module record for `name` and return the stored record.
    ///
    /// Modules are registered before their body runs so circular requires
    /// see the partially built exports.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already registered.
    pub fn add_required_module(&mut self, name: impl Into<String>, module: Object) -> &Object {
        self.try_add_required_module(name, module)
            .unwrap_or_else(|violation| panic!("{violation}"))
    }

    /// Like [`add_required_module`](Self::add_required_module), returning the
    /// contract violation instead of panicking. The registry is left
    /// untouched on error.
    pub fn try_add_required_module(
        &mut self,
        name: impl Into<String>,
        module: Object,
    ) -> Result<&Object, InvariantViolation> {
        self.modules.register(name, module)
    }

    /// The module record stored for `name`, without reading `exports`
    pub fn required_module_record(&self, name: &str) -> Option<&Object> {
        self.modules.record(name)
    }

    /// Check if a module is registered
    pub fn is_module_registered(&self, name: &str) -> bool {
        self.modules.contains(name)
    }

    /// Get the number of registered modules
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Get all registered module names, in no particular order
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.names()
    }

    // ==================== internalBinding() ====================

    /// Check whether a binding is already installed.
    ///
    /// # Panics
    ///
    /// Panics if the `internalBinding` namespace has not been bootstrapped.
    pub fn internal_binding_prop_exists(&mut self, name: &str) -> bool {
        self.try_internal_binding_prop_exists(name)
            .unwrap_or_else(|violation| panic!("{violation}"))
    }

    /// Fallible form of
    /// [`internal_binding_prop_exists`](Self::internal_binding_prop_exists)
    pub fn try_internal_binding_prop_exists(&mut self, name: &str) -> Result<bool, InvariantViolation> {
        self.internal_binding.exists(&mut self.runtime, name)
    }

    /// Install a binding, silently replacing an existing one.
    ///
    /// # Panics
    ///
    /// Panics if the `internalBinding` namespace has not been bootstrapped.
    pub fn set_internal_binding_prop(&mut self, name: &str, capability: Object) {
        self.try_set_internal_binding_prop(name, capability)
            .unwrap_or_else(|violation| panic!("{violation}"))
    }

    /// Fallible form of
    /// [`set_internal_binding_prop`](Self::set_internal_binding_prop)
    pub fn try_set_internal_binding_prop(&mut self, name: &str, capability: Object) -> Result<(), InvariantViolation> {
        self.internal_binding.set(&mut self.runtime, name, capability)
    }

    /// Current value of a binding, `undefined` if it was never installed.
    ///
    /// # Panics
    ///
    /// Panics if the `internalBinding` namespace has not been bootstrapped.
    pub fn get_internal_binding_prop(&mut self, name: &str) -> Value {
        self.try_get_internal_binding_prop(name)
            .unwrap_or_else(|violation| panic!("{violation}"))
    }

    /// Fallible form of
    /// [`get_internal_binding_prop`](Self::get_internal_binding_prop)
    pub fn try_get_internal_binding_prop(&mut self, name: &str) -> Result<Value, InvariantViolation> {
        self.internal_binding.get(&mut self.runtime, name)
    }

    /// The identifier interned for `internalBinding` at construction
    pub fn internal_binding_key(&self) -> &PropName {
        self.internal_binding.key()
    }

    // ==================== handles ====================

    /// The engine instance
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// The engine instance, for all script interaction
    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }

    /// Directory used to resolve relative specifiers
    pub fn dirname(&self) -> &str {
        &self.dirname
    }

    /// The host event loop
    pub fn loop_handle(&self) -> &LoopHandle {
        &self.loop_handle
    }

    /// The host event loop, for collaborators that schedule I/O
    pub fn loop_handle_mut(&mut self) -> &mut LoopHandle {
        &mut self.loop_handle
    }
}

impl<R: ScriptRuntime> fmt::Debug for RuntimeState<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeState")
            .field("runtime", &self.runtime.runtime_id())
            .field("dirname", &self.dirname)
            .field("modules", &self.modules.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::install_internal_binding_namespace;

    fn state() -> (tokio::runtime::Runtime, RuntimeState) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let state = RuntimeState::new("/app", LoopHandle::new(rt.handle().clone()));
        (rt, state)
    }

    fn module_with_exports(state: &mut RuntimeState) -> (Object, Object) {
        let rt = state.runtime_mut();
        let module = rt.create_object();
        let exports = rt.create_object();
        rt.set_named(&module, "exports", Value::Object(exports.clone()));
        (module, exports)
    }

    #[test]
    fn test_construction_interns_binding_key_once() {
        let (_rt, state) = state();
        assert_eq!(state.dirname(), "/app");
        assert_eq!(state.runtime().atom_count(), 1);
        assert_eq!(state.runtime().prop_name_to_string(state.internal_binding_key()), "internalBinding");
        assert_eq!(state.module_count(), 0);
    }

    #[test]
    fn test_with_runtime_keeps_the_given_engine() {
        let (rt, _) = state();
        let engine = HeapRuntime::new();
        let id = engine.runtime_id();
        let state = RuntimeState::with_runtime(engine, "/srv", LoopHandle::new(rt.handle().clone()));
        assert_eq!(state.runtime().runtime_id(), id);
    }

    #[test]
    fn test_two_states_own_distinct_engines() {
        let (_rt, a) = state();
        let (_rt2, b) = state();
        assert_ne!(a.runtime().runtime_id(), b.runtime().runtime_id());
    }

    #[test]
    fn test_modules_are_independent() {
        let (_rt, mut state) = state();
        let (fs, fs_exports) = module_with_exports(&mut state);
        let (path, path_exports) = module_with_exports(&mut state);

        state.add_required_module("fs", fs);
        state.add_required_module("path", path);

        assert_eq!(state.find_required_module("fs"), Some(fs_exports));
        assert_eq!(state.find_required_module("path"), Some(path_exports));
        assert_eq!(state.module_count(), 2);
    }

    #[test]
    fn test_try_add_duplicate_is_rejected() {
        let (_rt, mut state) = state();
        let (first, _) = module_with_exports(&mut state);
        let (second, _) = module_with_exports(&mut state);

        state.add_required_module("fs", first);
        let err = state.try_add_required_module("fs", second).unwrap_err();
        assert_eq!(err, InvariantViolation::DuplicateModule("fs".into()));
        assert_eq!(state.module_count(), 1);
    }

    #[test]
    #[should_panic(expected = "module 'fs' is already registered")]
    fn test_add_duplicate_panics() {
        let (_rt, mut state) = state();
        let (first, _) = module_with_exports(&mut state);
        let (second, _) = module_with_exports(&mut state);

        state.add_required_module("fs", first);
        state.add_required_module("fs", second);
    }

    #[test]
    #[should_panic(expected = "non-object `exports`")]
    fn test_find_with_malformed_record_panics() {
        let (_rt, mut state) = state();
        let module = state.runtime_mut().create_object();
        let text = state.runtime_mut().create_string("not an object");
        state.runtime_mut().set_named(&module, "exports", Value::String(text));
        state.add_required_module("bad", module);
        state.find_required_module("bad");
    }

    #[test]
    fn test_registered_record_is_live() {
        let (_rt, mut state) = state();
        let (module, _) = module_with_exports(&mut state);
        let record = state.add_required_module("events", module).clone();

        // Replacing module.exports after registration is what find() sees
        let replacement = state.runtime_mut().create_object();
        state
            .runtime_mut()
            .set_named(&record, "exports", Value::Object(replacement.clone()));

        assert_eq!(state.find_required_module("events"), Some(replacement));
    }

    #[test]
    #[should_panic(expected = "bootstrap must run first")]
    fn test_binding_ops_require_bootstrap() {
        let (_rt, mut state) = state();
        state.internal_binding_prop_exists("fs");
    }

    #[test]
    fn test_try_binding_ops_report_missing_namespace() {
        let (_rt, mut state) = state();
        assert_eq!(
            state.try_get_internal_binding_prop("fs"),
            Err(InvariantViolation::MissingBindingNamespace)
        );
    }

    #[test]
    fn test_binding_set_get_exists() {
        let (_rt, mut state) = state();
        install_internal_binding_namespace(&mut state).unwrap();
        let capability = state.runtime_mut().create_object();

        assert!(!state.internal_binding_prop_exists("x"));
        state.set_internal_binding_prop("x", capability.clone());
        state.set_internal_binding_prop("x", capability.clone());
        assert!(state.internal_binding_prop_exists("x"));
        assert_eq!(state.get_internal_binding_prop("x"), Value::Object(capability));
    }

    #[test]
    fn test_loop_handle_is_passed_through() {
        let (rt, mut state) = state();
        let task = state.loop_handle_mut().spawn(async { 7 });
        assert_eq!(rt.block_on(task).unwrap(), 7);
    }

    #[test]
    fn test_debug_output() {
        let (_rt, state) = state();
        let debug = format!("{:?}", state);
        assert!(debug.contains("RuntimeState"));
        assert!(debug.contains("/app"));
    }
}
