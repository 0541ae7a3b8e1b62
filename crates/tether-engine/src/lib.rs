// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # tether-engine
//!
//! The capability surface a host uses to talk to an embedded script engine.
//!
//! ## Overview
//!
//! The host never evaluates script code through this crate. It only needs to:
//! - reach the global object
//! - create objects and strings
//! - intern property identifiers
//! - get, set and test named properties
//!
//! [`ScriptRuntime`] captures exactly that surface. [`HeapRuntime`] is a small
//! object-heap implementation of it, used as the default engine and in tests.
//!
//! ## Quick Start
//!
//! ```rust
//! use tether_engine::{HeapRuntime, ScriptRuntime, Value};
//!
//! let mut rt = HeapRuntime::new();
//! let global = rt.global();
//! let answer = rt.prop_name_for_ascii("answer");
//! rt.set_property(&global, &answer, Value::Number(42.0));
//! assert_eq!(rt.get_property(&global, &answer), Value::Number(42.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod heap;
mod object;
mod value;

pub use heap::HeapRuntime;
pub use value::{JsString, Object, ObjectRef, PropName, RuntimeId, Value};

/// The capability interface of an embedded script engine.
///
/// Every handle passed in must have been produced by the same instance;
/// implementations treat a foreign handle as a contract violation and panic.
pub trait ScriptRuntime {
    /// Identity of this engine instance. Every handle it creates carries it.
    fn runtime_id(&self) -> RuntimeId;

    /// Returns the global object.
    fn global(&mut self) -> Object;

    /// Creates a new, empty ordinary object.
    fn create_object(&mut self) -> Object;

    /// Creates an engine string from UTF-8 text.
    fn create_string(&mut self, text: &str) -> JsString;

    /// Interns a property identifier from UTF-8 text.
    ///
    /// Interning the same text twice yields equal identifiers.
    fn prop_name_for_utf8(&mut self, name: &str) -> PropName;

    /// Interns a property identifier from an engine string.
    fn prop_name_from_string(&mut self, name: &JsString) -> PropName;

    /// Returns the text of an interned property identifier.
    fn prop_name_to_string(&self, name: &PropName) -> String;

    /// Reads a property. Missing properties read as [`Value::Undefined`].
    fn get_property(&mut self, object: &Object, name: &PropName) -> Value;

    /// Writes a property, creating or overwriting it.
    fn set_property(&mut self, object: &Object, name: &PropName, value: Value);

    /// Checks whether `object` has `name` as an own property.
    fn has_property(&mut self, object: &Object, name: &PropName) -> bool;

    /// Lists the own property identifiers of `object`. Order is unspecified.
    fn property_names(&mut self, object: &Object) -> Vec<PropName>;

    /// Interns a property identifier from an ASCII literal.
    fn prop_name_for_ascii(&mut self, name: &str) -> PropName {
        debug_assert!(name.is_ascii(), "property name {name:?} is not ASCII");
        self.prop_name_for_utf8(name)
    }

    /// Reads a property by name, interning the name on the way.
    fn get_named(&mut self, object: &Object, name: &str) -> Value {
        let key = self.prop_name_for_utf8(name);
        self.get_property(object, &key)
    }

    /// Writes a property by name, interning the name on the way.
    fn set_named(&mut self, object: &Object, name: &str, value: Value) {
        let key = self.prop_name_for_utf8(name);
        self.set_property(object, &key, value);
    }

    /// Checks an own property by name, interning the name on the way.
    fn has_named(&mut self, object: &Object, name: &str) -> bool {
        let key = self.prop_name_for_utf8(name);
        self.has_property(object, &key)
    }
}

/// Errors raised when a script value does not have the expected shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A value had the wrong type for the requested cast
    TypeError(String),
    /// A handle did not belong to the engine it was used with
    ForeignHandle {
        /// Engine the handle was created by
        owner: RuntimeId,
        /// Engine the handle was used with
        used_with: RuntimeId,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::TypeError(msg) => write!(f, "TypeError: {}", msg),
            Error::ForeignHandle { owner, used_with } => write!(
                f,
                "InternalError: handle from runtime {} used with runtime {}",
                owner, used_with
            ),
        }
    }
}

impl std::error::Error for Error {}
