//! Heap object representation.

use rustc_hash::FxHashMap;

use crate::value::Value;

/// An object stored in a [`HeapRuntime`](crate::HeapRuntime).
///
/// Properties are keyed by atom number; the runtime owns the atom table.
#[derive(Debug, Clone, Default)]
pub(crate) struct HeapObject {
    properties: FxHashMap<u32, Value>,
}

impl HeapObject {
    /// Creates a new empty object.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Gets a property value.
    pub(crate) fn get(&self, atom: u32) -> Option<&Value> {
        self.properties.get(&atom)
    }

    /// Sets a property value, replacing any previous one.
    pub(crate) fn set(&mut self, atom: u32, value: Value) {
        self.properties.insert(atom, value);
    }

    /// Checks if a property exists.
    pub(crate) fn has(&self, atom: u32) -> bool {
        self.properties.contains_key(&atom)
    }

    /// Own property atoms, ascending.
    pub(crate) fn atoms(&self) -> Vec<u32> {
        let mut atoms: Vec<u32> = self.properties.keys().copied().collect();
        atoms.sort_unstable();
        atoms
    }
}
