//! Object-heap implementation of [`ScriptRuntime`].
//!
//! Objects live in a growable arena and are never collected; every handle
//! stays valid for the lifetime of the runtime that produced it.

use rustc_hash::FxHashMap;

use crate::object::HeapObject;
use crate::value::{JsString, Object, ObjectRef, PropName, RuntimeId, Value};
use crate::{Error, ScriptRuntime};

/// A self-contained script heap: object arena, atom table and global object.
#[derive(Debug)]
pub struct HeapRuntime {
    id: RuntimeId,
    objects: Vec<HeapObject>,
    atoms: FxHashMap<Box<str>, u32>,
    atom_names: Vec<Box<str>>,
    global: ObjectRef,
}

impl HeapRuntime {
    /// Creates a new runtime with an empty global object.
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Creates a new runtime, reserving room for `objects` objects.
    pub fn with_capacity(objects: usize) -> Self {
        let mut heap = Vec::with_capacity(objects.max(1));
        heap.push(HeapObject::new());

        Self {
            id: RuntimeId::next(),
            objects: heap,
            atoms: FxHashMap::default(),
            atom_names: Vec::new(),
            global: ObjectRef::new(0),
        }
    }

    /// Returns the number of objects allocated so far, the global included.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Returns the number of distinct property identifiers interned so far.
    pub fn atom_count(&self) -> usize {
        self.atom_names.len()
    }

    fn check_owner(&self, owner: RuntimeId) {
        if owner != self.id {
            let err = Error::ForeignHandle {
                owner,
                used_with: self.id,
            };
            panic!("{}", err);
        }
    }

    fn object(&self, object: &Object) -> &HeapObject {
        self.check_owner(object.runtime_id());
        &self.objects[object.slot().index()]
    }

    fn object_mut(&mut self, object: &Object) -> &mut HeapObject {
        self.check_owner(object.runtime_id());
        &mut self.objects[object.slot().index()]
    }

    fn check_value(&self, value: &Value) {
        match value {
            Value::Object(obj) => self.check_owner(obj.runtime_id()),
            Value::String(s) => self.check_owner(s.runtime_id()),
            _ => {}
        }
    }

    fn atom(&self, name: &PropName) -> u32 {
        self.check_owner(name.runtime_id());
        name.atom()
    }

    fn intern(&mut self, name: &str) -> PropName {
        if let Some(&atom) = self.atoms.get(name) {
            return PropName::new(self.id, atom);
        }

        let atom = self.atom_names.len() as u32;
        self.atom_names.push(name.into());
        self.atoms.insert(name.into(), atom);
        PropName::new(self.id, atom)
    }
}

impl Default for HeapRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptRuntime for HeapRuntime {
    fn runtime_id(&self) -> RuntimeId {
        self.id
    }

    fn global(&mut self) -> Object {
        Object::new(self.id, self.global)
    }

    fn create_object(&mut self) -> Object {
        let slot = ObjectRef::new(self.objects.len());
        self.objects.push(HeapObject::new());
        Object::new(self.id, slot)
    }

    fn create_string(&mut self, text: &str) -> JsString {
        JsString::new(self.id, text)
    }

    fn prop_name_for_utf8(&mut self, name: &str) -> PropName {
        self.intern(name)
    }

    fn prop_name_from_string(&mut self, name: &JsString) -> PropName {
        self.check_owner(name.runtime_id());
        self.intern(name.as_str())
    }

    fn prop_name_to_string(&self, name: &PropName) -> String {
        let atom = self.atom(name);
        self.atom_names[atom as usize].to_string()
    }

    fn get_property(&mut self, object: &Object, name: &PropName) -> Value {
        let atom = self.atom(name);
        self.object(object).get(atom).cloned().unwrap_or_default()
    }

    fn set_property(&mut self, object: &Object, name: &PropName, value: Value) {
        let atom = self.atom(name);
        self.check_value(&value);
        self.object_mut(object).set(atom, value);
    }

    fn has_property(&mut self, object: &Object, name: &PropName) -> bool {
        let atom = self.atom(name);
        self.object(object).has(atom)
    }

    fn property_names(&mut self, object: &Object) -> Vec<PropName> {
        let id = self.id;
        self.object(object)
            .atoms()
            .into_iter()
            .map(|atom| PropName::new(id, atom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_is_stable() {
        let mut rt = HeapRuntime::new();
        let a = rt.global();
        let b = rt.global();
        assert_eq!(a, b);
        assert_eq!(rt.object_count(), 1);
    }

    #[test]
    fn test_interning_reuses_atoms() {
        let mut rt = HeapRuntime::new();
        let a = rt.prop_name_for_ascii("internalBinding");
        let b = rt.prop_name_for_ascii("internalBinding");
        let c = rt.prop_name_for_ascii("exports");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(rt.atom_count(), 2);
        assert_eq!(rt.prop_name_to_string(&a), "internalBinding");
    }

    #[test]
    fn test_prop_name_from_string_matches_literal() {
        let mut rt = HeapRuntime::new();
        let s = rt.create_string("crypto");
        let from_string = rt.prop_name_from_string(&s);
        let from_literal = rt.prop_name_for_ascii("crypto");
        assert_eq!(from_string, from_literal);
    }

    #[test]
    fn test_missing_property_reads_undefined() {
        let mut rt = HeapRuntime::new();
        let obj = rt.create_object();
        let key = rt.prop_name_for_ascii("nope");
        assert!(rt.get_property(&obj, &key).is_undefined());
        assert!(!rt.has_property(&obj, &key));
    }

    #[test]
    fn test_objects_are_distinct() {
        let mut rt = HeapRuntime::new();
        let a = rt.create_object();
        let b = rt.create_object();
        let key = rt.prop_name_for_ascii("tag");

        rt.set_property(&a, &key, Value::Number(1.0));
        assert!(rt.get_property(&b, &key).is_undefined());
        assert_ne!(a, b);
    }

    #[test]
    fn test_property_names() {
        let mut rt = HeapRuntime::new();
        let obj = rt.create_object();
        rt.set_named(&obj, "b", Value::Null);
        rt.set_named(&obj, "a", Value::Null);

        let names: Vec<String> = rt
            .property_names(&obj)
            .iter()
            .map(|n| rt.prop_name_to_string(n))
            .collect();
        assert_eq!(names, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    #[should_panic(expected = "used with runtime")]
    fn test_foreign_object_handle_panics() {
        let mut first = HeapRuntime::new();
        let mut second = HeapRuntime::new();
        let obj = first.create_object();
        let key = second.prop_name_for_ascii("x");
        second.get_property(&obj, &key);
    }

    #[test]
    #[should_panic(expected = "used with runtime")]
    fn test_storing_foreign_value_panics() {
        let mut first = HeapRuntime::new();
        let mut second = HeapRuntime::new();
        let foreign = first.create_object();
        let global = second.global();
        second.set_named(&global, "leak", Value::Object(foreign));
    }

    #[test]
    #[should_panic(expected = "used with runtime")]
    fn test_foreign_prop_name_panics() {
        let mut first = HeapRuntime::new();
        let mut second = HeapRuntime::new();
        let key = first.prop_name_for_ascii("x");
        let global = second.global();
        second.has_property(&global, &key);
    }
}
