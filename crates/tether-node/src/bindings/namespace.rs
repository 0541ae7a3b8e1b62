// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The `internalBinding` namespace on the global object

use crate::error::InvariantViolation;
use tether_engine::{Object, PropName, ScriptRuntime, Value};

/// Name of the global property holding the namespace
pub const INTERNAL_BINDING: &str = "internalBinding";

/// Accessor for `global.internalBinding`.
///
/// Holds the property identifier interned once at construction. The
/// namespace object itself lives in the engine and is created by the
/// bootstrap step, never by this type.
#[derive(Debug, Clone)]
pub struct InternalBindingNamespace {
    key: PropName,
}

impl InternalBindingNamespace {
    /// Intern the `internalBinding` identifier in `runtime`
    pub fn new<R: ScriptRuntime>(runtime: &mut R) -> Self {
        Self {
            key: runtime.prop_name_for_ascii(INTERNAL_BINDING),
        }
    }

    /// The cached identifier for `internalBinding`
    pub fn key(&self) -> &PropName {
        &self.key
    }

    /// Resolve the namespace object off the global object
    pub fn namespace<R: ScriptRuntime>(&self, runtime: &mut R) -> Result<Object, InvariantViolation> {
        let global = runtime.global();
        match runtime.get_property(&global, &self.key) {
            Value::Object(namespace) => Ok(namespace),
            Value::Undefined => Err(InvariantViolation::MissingBindingNamespace),
            Value::Null => Err(InvariantViolation::MalformedBindingNamespace("null")),
            other => Err(InvariantViolation::MalformedBindingNamespace(other.type_of())),
        }
    }

    /// Check whether `name` is already an own property of the namespace
    pub fn exists<R: ScriptRuntime>(&self, runtime: &mut R, name: &str) -> Result<bool, InvariantViolation> {
        let namespace = self.namespace(runtime)?;
        Ok(runtime.has_named(&namespace, name))
    }

    /// Install `capability` under `name`, overwriting any previous entry
    pub fn set<R: ScriptRuntime>(
        &self,
        runtime: &mut R,
        name: &str,
        capability: Object,
    ) -> Result<(), InvariantViolation> {
        let namespace = self.namespace(runtime)?;
        runtime.set_named(&namespace, name, Value::Object(capability));
        tracing::trace!(binding = name, "set internal binding");
        Ok(())
    }

    /// Read the entry under `name`; `undefined` if it was never set
    pub fn get<R: ScriptRuntime>(&self, runtime: &mut R, name: &str) -> Result<Value, InvariantViolation> {
        let namespace = self.namespace(runtime)?;
        Ok(runtime.get_named(&namespace, name))
    }
}
