// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # tether-node
//!
//! The state container behind `require()` and `internalBinding()` for a
//! script engine embedded in a host process.
//!
//! A [`RuntimeState`] owns exactly one engine instance and keeps:
//!
//! - the **module registry**: module name → module record, so every module
//!   is instantiated exactly once
//! - the cached identifier for the **`internalBinding` namespace**, the
//!   global object through which trusted bootstrap code reaches native
//!   capabilities
//! - the directory of the running script and a handle to the host event loop
//!
//! Around it sit the collaborators a host needs to drive it:
//! [`bootstrap`] prepares the global object, [`BindingRegistry`] builds
//! native capabilities on demand, and [`ModuleLoader`] sequences `require()`.
//!
//! ## Quick Start
//!
//! ```rust
//! use tether_engine::ScriptRuntime;
//! use tether_node::{bootstrap, BindingRegistry, LoopHandle, RuntimeState};
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build()?;
//! let mut state: RuntimeState = RuntimeState::new("/app", LoopHandle::new(rt.handle().clone()));
//!
//! let mut bindings: BindingRegistry = BindingRegistry::new();
//! bindings.register("crypto", |rt, _loop| rt.create_object());
//! bootstrap::bootstrap(&mut state, &bindings, &[])?;
//!
//! assert!(state.find_required_module("fs").is_none());
//! let crypto = tether_node::internal_binding(&mut state, &bindings, "crypto")?;
//! assert!(crypto.is_object());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bindings;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod logging;
pub mod module_system;
pub mod runtime;

// Re-exports
pub use bindings::{internal_binding, BindingRegistry, InternalBindingNamespace};
pub use config::RuntimeConfig;
pub use error::{InvariantViolation, NodeError, Result};
pub use module_system::{ModuleFactory, ModuleLoader, ModuleRegistry, ModuleScope, ModuleTable};
pub use runtime::{LoopHandle, RuntimeState};

/// Version of the tether-node runtime
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
