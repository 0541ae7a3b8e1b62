// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Handle to the host's event loop (libuv equivalent)
//!
//! The runtime state holds this handle but never drives the loop. Whoever
//! needs to schedule I/O (bindings, loaders) goes through it.

use crate::error::{NodeError, Result};
use std::future::Future;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Non-owning reference to a host-provided tokio runtime.
///
/// Holding a `LoopHandle` does not keep the runtime alive; once the host
/// shuts its runtime down, spawned futures are dropped unpolled.
#[derive(Debug, Clone)]
pub struct LoopHandle {
    handle: Handle,
}

impl LoopHandle {
    /// Wrap an existing tokio handle
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Handle to the runtime the caller is running on.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime, like
    /// [`Handle::current`].
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Handle to the runtime the caller is running on, if any
    pub fn try_current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| NodeError::NoEventLoop(e.to_string()))
    }

    /// The underlying tokio handle
    pub fn tokio_handle(&self) -> &Handle {
        &self.handle
    }

    /// Schedule a future on the host loop
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.handle.spawn(future)
    }
}

impl From<Handle> for LoopHandle {
    fn from(handle: Handle) -> Self {
        Self::new(handle)
    }
}
