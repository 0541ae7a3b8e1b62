// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Specifier → module id normalization
//!
//! Purely lexical: nothing here touches the file system. Bare specifiers
//! (`fs`, `lodash/fp`) are already ids; relative ones are joined onto the
//! directory of the running script; absolute ones only get their `.` and
//! `..` segments folded.

use crate::error::{NodeError, Result};

/// Check if a specifier is relative to the current directory
pub fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Turn `specifier` into the module id used as the registry key
pub fn normalize(specifier: &str, dirname: &str) -> Result<String> {
    if specifier.is_empty() || specifier.contains('\0') {
        return Err(NodeError::InvalidSpecifier(specifier.to_string()));
    }

    if specifier.starts_with('/') {
        return Ok(fold(specifier));
    }

    if is_relative(specifier) {
        let base = if dirname.is_empty() { "." } else { dirname };
        return Ok(fold(&format!("{}/{}", base, specifier)));
    }

    Ok(specifier.to_string())
}

/// Collapse empty, `.` and `..` segments
fn fold(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                // `..` past the root of an absolute path stays at the root
                _ if absolute => {}
                _ => segments.push(".."),
            },
            _ => segments.push(segment),
        }
    }

    let joined = segments.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
