//! Host objects backing registry classes.

use exprscope_api::{HostError, HostObject, HostResult, Value};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::any::Any;

/// A generic object whose fields live in named slots.
///
/// Classes registered with [`ClassBuilder::property`](crate::ClassBuilder::property)
/// read and write these slots.
#[derive(Debug)]
pub struct Instance {
    class: String,
    slots: RwLock<IndexMap<String, Value>>,
}

impl Instance {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            slots: RwLock::new(IndexMap::new()),
        }
    }

    pub fn with(self, slot: &str, value: impl Into<Value>) -> Self {
        self.slots.write().insert(slot.to_string(), value.into());
        self
    }

    pub fn get(&self, slot: &str) -> HostResult<Value> {
        self.slots.read().get(slot).cloned().ok_or_else(|| {
            HostError::IllegalArgument(format!("{} has no field {slot}", self.class))
        })
    }

    pub fn set(&self, slot: &str, value: Value) {
        self.slots.write().insert(slot.to_string(), value);
    }
}

impl HostObject for Instance {
    fn class_name(&self) -> &str {
        &self.class
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) fn instance_of(receiver: &Value) -> HostResult<&Instance> {
    match receiver {
        Value::Object(object) => object.downcast_ref::<Instance>().ok_or_else(|| {
            HostError::IllegalArgument(format!("{} has no field slots", object.0.class_name()))
        }),
        Value::Null => Err(HostError::NullPointer("field access on null".to_string())),
        other => Err(HostError::IllegalArgument(format!("{other} has no field slots"))),
    }
}

/// Mutable character buffer behind `java.lang.StringBuilder`.
#[derive(Debug, Default)]
pub struct StringBuffer {
    contents: RwLock<String>,
}

impl StringBuffer {
    pub fn new(initial: &str) -> Self {
        Self {
            contents: RwLock::new(initial.to_string()),
        }
    }

    pub fn append(&self, text: &str) {
        self.contents.write().push_str(text);
    }

    pub fn contents(&self) -> String {
        self.contents.read().clone()
    }

    pub fn replace(&self, text: String) {
        *self.contents.write() = text;
    }
}

impl HostObject for StringBuffer {
    fn class_name(&self) -> &str {
        crate::stdlib::STRING_BUILDER
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn display_string(&self) -> String {
        self.contents()
    }
}

/// Growable element list behind `java.util.ArrayList`.
#[derive(Debug, Default)]
pub struct ElementList {
    elements: RwLock<Vec<Value>>,
}

impl ElementList {
    pub fn new(elements: Vec<Value>) -> Self {
        Self {
            elements: RwLock::new(elements),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push(&self, value: Value) {
        self.elements.write().push(value);
    }

    pub fn get(&self, index: i32) -> HostResult<Value> {
        let elements = self.elements.read();
        usize::try_from(index)
            .ok()
            .and_then(|i| elements.get(i).cloned())
            .ok_or_else(|| out_of_bounds(index, elements.len()))
    }

    /// Replace the element at `index`, returning the previous one.
    pub fn set(&self, index: i32, value: Value) -> HostResult<Value> {
        let mut elements = self.elements.write();
        let len = elements.len();
        let slot = usize::try_from(index)
            .ok()
            .and_then(|i| elements.get_mut(i))
            .ok_or_else(|| out_of_bounds(index, len))?;
        Ok(std::mem::replace(slot, value))
    }

    pub fn remove(&self, index: i32) -> HostResult<Value> {
        let mut elements = self.elements.write();
        let len = elements.len();
        match usize::try_from(index).ok().filter(|i| *i < len) {
            Some(i) => Ok(elements.remove(i)),
            None => Err(out_of_bounds(index, len)),
        }
    }

    pub fn snapshot(&self) -> Vec<Value> {
        self.elements.read().clone()
    }

    pub fn retain(&self, mut keep: impl FnMut(&Value) -> HostResult<bool>) -> HostResult<bool> {
        let snapshot = self.snapshot();
        let mut kept = Vec::with_capacity(snapshot.len());
        for element in snapshot {
            if keep(&element)? {
                kept.push(element);
            }
        }
        let mut elements = self.elements.write();
        let removed = kept.len() != elements.len();
        *elements = kept;
        Ok(removed)
    }
}

fn out_of_bounds(index: i32, len: usize) -> HostError {
    HostError::exception(
        "java.lang.IndexOutOfBoundsException",
        format!("Index {index} out of bounds for length {len}"),
    )
}

impl HostObject for ElementList {
    fn class_name(&self) -> &str {
        crate::stdlib::ARRAY_LIST
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn display_string(&self) -> String {
        let items: Vec<String> = self
            .snapshot()
            .iter()
            .map(Value::to_java_string)
            .collect();
        format!("[{}]", items.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_slots() {
        let instance = Instance::new("a.Point").with("x", Value::Int(1));
        assert!(matches!(instance.get("x"), Ok(Value::Int(1))));
        instance.set("x", Value::Int(5));
        assert!(matches!(instance.get("x"), Ok(Value::Int(5))));
        assert!(instance.get("y").is_err());
    }

    #[test]
    fn test_list_bounds_and_display() {
        let list = ElementList::new(vec![Value::Int(1), Value::string("a")]);
        assert_eq!(list.display_string(), "[1, a]");
        assert!(list.get(2).is_err());
        assert!(list.get(-1).is_err());
        assert!(matches!(list.set(0, Value::Int(7)), Ok(Value::Int(1))));
        assert!(matches!(list.remove(0), Ok(Value::Int(7))));
        assert_eq!(list.len(), 1);
    }
}
