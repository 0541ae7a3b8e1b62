// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! CommonJS module system
//!
//! - [`ModuleRegistry`]: module name → module record, owned by the runtime state
//! - [`ModuleLoader`]: the `require()` driver that fills the registry
//! - specifier normalization against the state's directory

mod loader;
mod registry;
mod specifier;

pub use loader::{require_resolve, ModuleFactory, ModuleLoader, ModuleScope, ModuleTable};
pub use registry::{ModuleRegistry, EXPORTS};
pub use specifier::{is_relative, normalize};
