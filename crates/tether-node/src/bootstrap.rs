// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Bootstrap of the global object
//!
//! [`RuntimeState`] never creates the `internalBinding` namespace; every
//! binding operation requires it to exist already. This module is the step
//! that puts it there, and it must run before the first binding lookup.

use crate::bindings::{internal_binding, BindingRegistry};
use crate::config::RuntimeConfig;
use crate::error::{NodeError, Result};
use crate::runtime::{LoopHandle, RuntimeState};
use tether_engine::{Object, ScriptRuntime, Value};

/// Create `global.internalBinding` if it does not exist yet.
///
/// Returns the namespace object. An existing namespace object is kept as
/// is, so calling this twice is harmless.
pub fn install_internal_binding_namespace<R: ScriptRuntime>(state: &mut RuntimeState<R>) -> Result<Object> {
    let key = state.internal_binding_key().clone();
    let runtime = state.runtime_mut();
    let global = runtime.global();

    match runtime.get_property(&global, &key) {
        Value::Object(namespace) => Ok(namespace),
        Value::Undefined => {
            let namespace = runtime.create_object();
            runtime.set_property(&global, &key, Value::Object(namespace.clone()));
            tracing::debug!("installed internalBinding namespace");
            Ok(namespace)
        }
        Value::Null => Err(NodeError::Bootstrap(
            "global `internalBinding` is null, expected an object".to_string(),
        )),
        other => Err(NodeError::Bootstrap(format!(
            "global `internalBinding` is a {}, expected an object",
            other.type_of()
        ))),
    }
}

/// Prepare a fresh state for bootstrap scripts.
///
/// Installs the namespace, then every eager binding, then each name in
/// `preload`.
pub fn bootstrap<R: ScriptRuntime>(
    state: &mut RuntimeState<R>,
    registry: &BindingRegistry<R>,
    preload: &[String],
) -> Result<()> {
    install_internal_binding_namespace(state)?;

    let mut eager = registry.eager_names();
    eager.sort_unstable();
    for name in eager {
        internal_binding(state, registry, name)?;
    }

    for name in preload {
        internal_binding(state, registry, name)?;
    }

    tracing::debug!(dirname = state.dirname(), preload = preload.len(), "bootstrap complete");
    Ok(())
}

/// Build a state from `config` and bootstrap it.
///
/// The state's dirname comes from [`RuntimeConfig::resolve_dirname`] and
/// [`RuntimeConfig::preload_bindings`] is installed after the eager
/// bindings.
pub fn bootstrap_from_config<R: ScriptRuntime + Default>(
    config: &RuntimeConfig,
    registry: &BindingRegistry<R>,
    loop_handle: LoopHandle,
) -> Result<RuntimeState<R>> {
    let mut state = RuntimeState::from_config(config, loop_handle);
    bootstrap(&mut state, registry, &config.preload_bindings)?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> (tokio::runtime::Runtime, RuntimeState) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let state = RuntimeState::new("/app", LoopHandle::new(rt.handle().clone()));
        (rt, state)
    }

    #[test]
    fn test_install_is_idempotent() {
        let (_rt, mut state) = state();
        let first = install_internal_binding_namespace(&mut state).unwrap();
        let second = install_internal_binding_namespace(&mut state).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_install_keeps_existing_entries() {
        let (_rt, mut state) = state();
        install_internal_binding_namespace(&mut state).unwrap();
        let capability = state.runtime_mut().create_object();
        state.set_internal_binding_prop("fs", capability.clone());

        install_internal_binding_namespace(&mut state).unwrap();
        assert_eq!(state.get_internal_binding_prop("fs"), Value::Object(capability));
    }

    #[test]
    fn test_install_rejects_non_object() {
        let (_rt, mut state) = state();
        let key = state.internal_binding_key().clone();
        let rt = state.runtime_mut();
        let global = rt.global();
        rt.set_property(&global, &key, Value::Number(1.0));

        let err = install_internal_binding_namespace(&mut state).unwrap_err();
        assert!(matches!(err, NodeError::Bootstrap(_)));
    }

    #[test]
    fn test_install_rejects_null() {
        let (_rt, mut state) = state();
        let key = state.internal_binding_key().clone();
        let rt = state.runtime_mut();
        let global = rt.global();
        rt.set_property(&global, &key, Value::Null);

        let err = install_internal_binding_namespace(&mut state).unwrap_err();
        assert!(err.to_string().contains("is null"));
    }

    #[test]
    fn test_bootstrap_installs_eager_and_preloaded() {
        let (_rt, mut state) = state();
        let mut registry: BindingRegistry = BindingRegistry::new();
        registry
            .register_eager("constants", |rt, _| rt.create_object())
            .register("fs", |rt, _| rt.create_object())
            .register("os", |rt, _| rt.create_object());

        bootstrap(&mut state, &registry, &["fs".to_string()]).unwrap();

        assert!(state.internal_binding_prop_exists("constants"));
        assert!(state.internal_binding_prop_exists("fs"));
        assert!(!state.internal_binding_prop_exists("os"));
    }

    #[test]
    fn test_bootstrap_from_config_preloads() {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let mut registry: BindingRegistry = BindingRegistry::new();
        registry
            .register("crypto", |rt, _| rt.create_object())
            .register("zlib", |rt, _| rt.create_object());

        let config =
            RuntimeConfig::from_json_str(r#"{ "entry": "/srv/main.js", "preload_bindings": ["crypto"] }"#).unwrap();
        let mut state = bootstrap_from_config(&config, &registry, LoopHandle::new(rt.handle().clone())).unwrap();

        assert_eq!(state.dirname(), "/srv");
        assert!(state.internal_binding_prop_exists("crypto"));
        assert!(!state.internal_binding_prop_exists("zlib"));
    }

    #[test]
    fn test_bootstrap_unknown_preload() {
        let (_rt, mut state) = state();
        let registry: BindingRegistry = BindingRegistry::new();

        let err = bootstrap(&mut state, &registry, &["zlib".to_string()]).unwrap_err();
        assert!(matches!(err, NodeError::NoSuchBinding(_)));
    }
}
