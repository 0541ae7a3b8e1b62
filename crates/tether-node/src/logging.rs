// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Logging setup

use crate::config::RuntimeConfig;
use tracing_subscriber::EnvFilter;

/// Filter used when nothing else is configured
pub const DEFAULT_FILTER: &str = "tether_node=warn";

/// Filter used for verbose runs
pub const VERBOSE_FILTER: &str = "tether_node=debug";

/// Install a global fmt subscriber filtered by `filter`.
///
/// A directive that does not parse falls back to [`DEFAULT_FILTER`].
/// Returns `false` if a global subscriber was already installed.
pub fn init(filter: &str) -> bool {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok()
}

/// Install a global fmt subscriber at the default or verbose level.
///
/// `TETHER_LOG` still wins over either level.
pub fn init_with_verbosity(verbose: bool) -> bool {
    let mut config = RuntimeConfig::default();
    if verbose {
        config.log_filter = VERBOSE_FILTER.to_string();
    }
    config.load_from_env();
    config.init_logging()
}
