use exprscope_api::{HostResult, TypeRef, Value};
use std::fmt;
use std::sync::Arc;

/// Writes a new value into an assignable location (field, array slot, variable).
pub type ValueSetter = Arc<dyn Fn(Value) -> HostResult<()> + Send + Sync>;

/// The result of evaluating something so far.
///
/// `value` is `None` when the value was not computed under the current
/// evaluation mode (indeterminate); the declared type is always known.
#[derive(Clone)]
pub struct ObjectInfo {
    value: Option<Value>,
    declared_type: TypeRef,
    setter: Option<ValueSetter>,
}

impl ObjectInfo {
    pub fn new(value: Value, declared_type: TypeRef) -> Self {
        Self {
            value: Some(value),
            declared_type,
            setter: None,
        }
    }

    pub fn indeterminate(declared_type: TypeRef) -> Self {
        Self {
            value: None,
            declared_type,
            setter: None,
        }
    }

    pub fn from_option(value: Option<Value>, declared_type: TypeRef) -> Self {
        Self {
            value,
            declared_type,
            setter: None,
        }
    }

    pub fn null() -> Self {
        Self::new(Value::Null, TypeRef::Null)
    }

    pub fn with_setter(mut self, setter: ValueSetter) -> Self {
        self.setter = Some(setter);
        self
    }

    /// Drop the setter, turning a location into a plain value.
    pub fn into_rvalue(mut self) -> Self {
        self.setter = None;
        self
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<Value> {
        self.value
    }

    pub fn is_indeterminate(&self) -> bool {
        self.value.is_none()
    }

    pub fn is_known_null(&self) -> bool {
        matches!(self.value, Some(Value::Null))
    }

    pub fn declared_type(&self) -> &TypeRef {
        &self.declared_type
    }

    pub fn setter(&self) -> Option<&ValueSetter> {
        self.setter.as_ref()
    }

    pub fn is_assignable(&self) -> bool {
        self.setter.is_some()
    }

    /// Type used for member lookup: the runtime type of a known, non-null
    /// reference, otherwise the declared type.
    pub fn effective_type(&self) -> TypeRef {
        crate::types::effective_type(&self.declared_type, self.value.as_ref(), true)
    }
}

impl fmt::Debug for ObjectInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectInfo")
            .field("value", &self.value)
            .field("declared_type", &self.declared_type)
            .field("assignable", &self.setter.is_some())
            .finish()
    }
}

impl fmt::Display for ObjectInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{value} ({})", self.declared_type),
            None => write!(f, "<indeterminate> ({})", self.declared_type),
        }
    }
}
