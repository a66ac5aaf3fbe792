//! Layered variable scopes.
//!
//! Caller-defined variables form the root scope; every lambda invocation adds
//! a child scope holding the call arguments. Slots are shared, so lambdas see
//! later updates of captured variables.

use crate::object_info::{ObjectInfo, ValueSetter};
use crate::types;
use exprscope_api::{TypeRef, Value};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub declared_type: TypeRef,
    pub is_final: bool,
    slot: Arc<RwLock<Value>>,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: Value, declared_type: TypeRef, is_final: bool) -> Self {
        Self {
            name: name.into(),
            declared_type,
            is_final,
            slot: Arc::new(RwLock::new(value)),
        }
    }

    pub fn get(&self) -> Value {
        self.slot.read().clone()
    }

    pub fn set(&self, value: Value) {
        *self.slot.write() = value;
    }

    /// Location for this variable; `read` controls whether the value is materialized.
    pub fn to_object_info(&self, read: bool) -> ObjectInfo {
        let info = if read {
            ObjectInfo::new(self.get(), self.declared_type.clone())
        } else {
            ObjectInfo::indeterminate(self.declared_type.clone())
        };
        if self.is_final {
            return info;
        }
        let slot = self.slot.clone();
        let declared = self.declared_type.clone();
        let setter: ValueSetter = Arc::new(move |value: Value| {
            *slot.write() = types::convert_for_assignment(&value, &declared);
            Ok(())
        });
        info.with_setter(setter)
    }
}

#[derive(Debug, Default)]
pub struct VariableScope {
    parent: Option<Arc<VariableScope>>,
    variables: Vec<Variable>,
}

impl VariableScope {
    pub fn root(variables: Vec<Variable>) -> Arc<Self> {
        Arc::new(Self {
            parent: None,
            variables,
        })
    }

    pub fn child(parent: &Arc<VariableScope>, variables: Vec<Variable>) -> Arc<Self> {
        Arc::new(Self {
            parent: Some(parent.clone()),
            variables,
        })
    }

    /// Innermost variable named `name`.
    pub fn lookup(&self, name: &str) -> Option<&Variable> {
        self.variables
            .iter()
            .find(|v| v.name == name)
            .or_else(|| self.parent.as_deref().and_then(|p| p.lookup(name)))
    }

    /// Every visible variable; inner declarations shadow outer ones.
    pub fn visible(&self) -> Vec<&Variable> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        let mut scope = Some(self);
        while let Some(current) = scope {
            for variable in &current.variables {
                if seen.insert(variable.name.as_str()) {
                    result.push(variable);
                }
            }
            scope = current.parent.as_deref();
        }
        result
    }

    pub fn depth(&self) -> usize {
        self.parent.as_ref().map_or(0, |p| p.depth() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_scope_shadows_outer() {
        let root = VariableScope::root(vec![
            Variable::new("x", Value::Int(1), TypeRef::INT, false),
            Variable::new("y", Value::Int(2), TypeRef::INT, false),
        ]);
        let child = VariableScope::child(&root, vec![Variable::new("x", Value::Int(10), TypeRef::INT, true)]);
        assert!(matches!(child.lookup("x").map(Variable::get), Some(Value::Int(10))));
        assert!(matches!(child.lookup("y").map(Variable::get), Some(Value::Int(2))));
        assert_eq!(child.visible().len(), 2);
        assert_eq!(child.depth(), 1);
    }

    #[test]
    fn test_setter_converts_to_declared_type() {
        let variable = Variable::new("d", Value::Double(0.0), TypeRef::DOUBLE, false);
        let info = variable.to_object_info(true);
        let setter = info.setter().cloned().unwrap();
        setter(Value::Int(3)).unwrap();
        assert!(matches!(variable.get(), Value::Double(v) if v == 3.0));
    }

    #[test]
    fn test_final_variable_has_no_setter() {
        let variable = Variable::new("c", Value::Int(1), TypeRef::INT, true);
        assert!(!variable.to_object_info(true).is_assignable());
        assert!(variable.to_object_info(false).is_indeterminate());
    }
}
