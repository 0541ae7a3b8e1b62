// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! `internalBinding()` support
//!
//! Native capabilities are exposed to trusted bootstrap code through a single
//! namespace object on the global object. Entries are created lazily from a
//! table of initializers and cached in the namespace itself.

mod namespace;
mod registry;

pub use namespace::{InternalBindingNamespace, INTERNAL_BINDING};
pub use registry::{internal_binding, BindingInitializer, BindingRegistry};
