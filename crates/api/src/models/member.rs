use super::types::TypeRef;
use super::value::Value;
use crate::error::HostError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Visibility of a class or member, ordered from least to most visible.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum AccessModifier {
    Private,
    PackagePrivate,
    Protected,
    #[default]
    Public,
}

impl AccessModifier {
    pub fn name(self) -> &'static str {
        match self {
            AccessModifier::Private => "private",
            AccessModifier::PackagePrivate => "package private",
            AccessModifier::Protected => "protected",
            AccessModifier::Public => "public",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub access: AccessModifier,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
}

impl Modifiers {
    pub fn public() -> Self {
        Self::default()
    }

    pub fn with_access(mut self, access: AccessModifier) -> Self {
        self.access = access;
        self
    }

    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn with_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
}

/// Structural information about a class known to the type system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    /// Fully qualified name; inner classes are separated by `$`
    pub fqn: String,
    pub kind: ClassKind,
    pub modifiers: Modifiers,
    /// Direct superclass, `None` for `java.lang.Object` and interfaces
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    /// Enclosing class for inner classes
    pub declaring_class: Option<String>,
}

impl ClassInfo {
    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }
}

pub type FieldGetter = Arc<dyn Fn(&Value) -> Result<Value, HostError> + Send + Sync>;
pub type FieldSetter = Arc<dyn Fn(&Value, Value) -> Result<(), HostError> + Send + Sync>;
pub type Invoker = Arc<dyn Fn(&Value, &[Value]) -> Result<Value, HostError> + Send + Sync>;

/// A field together with its read (and optional write) capability.
///
/// Static fields ignore the receiver passed to the capabilities.
#[derive(Clone)]
pub struct FieldInfo {
    pub name: String,
    pub declaring_type: String,
    pub type_ref: TypeRef,
    pub modifiers: Modifiers,
    pub getter: FieldGetter,
    /// Absent for final fields
    pub setter: Option<FieldSetter>,
}

impl FieldInfo {
    pub fn get(&self, receiver: &Value) -> Result<Value, HostError> {
        (self.getter)(receiver)
    }

    pub fn set(&self, receiver: &Value, value: Value) -> Result<(), HostError> {
        match &self.setter {
            Some(setter) => setter(receiver, value),
            None => Err(HostError::Unsupported(format!(
                "field {} is final",
                self.name
            ))),
        }
    }
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("declaring_type", &self.declaring_type)
            .field("type_ref", &self.type_ref)
            .field("modifiers", &self.modifiers)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutableKind {
    Method,
    Constructor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    pub name: String,
    pub type_ref: TypeRef,
}

impl ParameterInfo {
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
        }
    }
}

/// A method or constructor with its invocation capability.
///
/// For variadic executables the last parameter is declared with an array type.
/// Constructors ignore the receiver and return the new instance.
#[derive(Clone)]
pub struct ExecutableInfo {
    pub name: String,
    pub kind: ExecutableKind,
    pub declaring_type: String,
    pub parameters: Vec<ParameterInfo>,
    pub return_type: TypeRef,
    pub modifiers: Modifiers,
    pub is_varargs: bool,
    pub invoker: Invoker,
}

impl ExecutableInfo {
    pub fn invoke(&self, receiver: &Value, args: &[Value]) -> Result<Value, HostError> {
        (self.invoker)(receiver, args)
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.is_static
    }

    pub fn parameter_types(&self) -> impl Iterator<Item = &TypeRef> {
        self.parameters.iter().map(|p| &p.type_ref)
    }

    /// Same name and parameter types, used to detect overridden methods.
    pub fn has_same_signature(&self, other: &ExecutableInfo) -> bool {
        self.name == other.name && self.parameter_types().eq(other.parameter_types())
    }

    /// Human readable signature, e.g. `substring(int, int)`.
    pub fn signature(&self) -> String {
        let params = self
            .parameters
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if self.is_varargs && i + 1 == self.parameters.len() {
                    let element = p.type_ref.element_type().unwrap_or(&p.type_ref);
                    format!("{}...", element.simple_name())
                } else {
                    p.type_ref.simple_name()
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        let name = match self.kind {
            ExecutableKind::Method => self.name.as_str(),
            ExecutableKind::Constructor => super::types::simple_class_name(&self.declaring_type),
        };
        format!("{name}({params})")
    }
}

impl fmt::Debug for ExecutableInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutableInfo")
            .field("declaring_type", &self.declaring_type)
            .field("signature", &self.signature())
            .field("return_type", &self.return_type)
            .field("modifiers", &self.modifiers)
            .finish()
    }
}

impl fmt::Display for ExecutableInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_type.replace('$', "."), self.signature())
    }
}
