use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub const OBJECT_CLASS: &str = "java.lang.Object";
pub const STRING_CLASS: &str = "java.lang.String";
pub const IMPLICIT_PACKAGE: &str = "java.lang";

/// Primitive types of the host language, including `void` for method returns.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 9] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Char,
        PrimitiveKind::Byte,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::Void,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Void => "void",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// The wrapper class used when a value of this kind is boxed.
    pub fn boxed_class(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "java.lang.Boolean",
            PrimitiveKind::Char => "java.lang.Character",
            PrimitiveKind::Byte => "java.lang.Byte",
            PrimitiveKind::Short => "java.lang.Short",
            PrimitiveKind::Int => "java.lang.Integer",
            PrimitiveKind::Long => "java.lang.Long",
            PrimitiveKind::Float => "java.lang.Float",
            PrimitiveKind::Double => "java.lang.Double",
            PrimitiveKind::Void => "java.lang.Void",
        }
    }

    pub fn from_boxed_class(fqn: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .filter(|kind| *kind != PrimitiveKind::Void)
            .find(|kind| kind.boxed_class() == fqn)
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveKind::Boolean | PrimitiveKind::Void)
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Char
                | PrimitiveKind::Byte
                | PrimitiveKind::Short
                | PrimitiveKind::Int
                | PrimitiveKind::Long
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, PrimitiveKind::Float | PrimitiveKind::Double)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A declared type as seen by the engine.
///
/// Generic arguments are erased: class types are identified by their fully
/// qualified name only.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "data")]
pub enum TypeRef {
    Primitive(PrimitiveKind),

    /// Class, interface or enum by fully qualified name (inner classes use `$`)
    Class(Arc<str>),

    Array(Box<TypeRef>),

    /// The type of the `null` literal
    Null,
}

impl TypeRef {
    pub fn class(fqn: impl AsRef<str>) -> Self {
        TypeRef::Class(Arc::from(fqn.as_ref()))
    }

    pub fn array_of(element: TypeRef) -> Self {
        TypeRef::Array(Box::new(element))
    }

    pub fn object() -> Self {
        Self::class(OBJECT_CLASS)
    }

    pub fn string() -> Self {
        Self::class(STRING_CLASS)
    }

    pub const BOOLEAN: TypeRef = TypeRef::Primitive(PrimitiveKind::Boolean);
    pub const CHAR: TypeRef = TypeRef::Primitive(PrimitiveKind::Char);
    pub const BYTE: TypeRef = TypeRef::Primitive(PrimitiveKind::Byte);
    pub const SHORT: TypeRef = TypeRef::Primitive(PrimitiveKind::Short);
    pub const INT: TypeRef = TypeRef::Primitive(PrimitiveKind::Int);
    pub const LONG: TypeRef = TypeRef::Primitive(PrimitiveKind::Long);
    pub const FLOAT: TypeRef = TypeRef::Primitive(PrimitiveKind::Float);
    pub const DOUBLE: TypeRef = TypeRef::Primitive(PrimitiveKind::Double);
    pub const VOID: TypeRef = TypeRef::Primitive(PrimitiveKind::Void);

    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self {
            TypeRef::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&str> {
        match self {
            TypeRef::Class(fqn) => Some(fqn),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeRef::Primitive(_))
    }

    pub fn is_reference(&self) -> bool {
        !self.is_primitive()
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Primitive(PrimitiveKind::Void))
    }

    pub fn is_string(&self) -> bool {
        self.as_class() == Some(STRING_CLASS)
    }

    pub fn element_type(&self) -> Option<&TypeRef> {
        match self {
            TypeRef::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Primitive kind after unboxing, if this type is a primitive or a wrapper class.
    pub fn unboxed(&self) -> Option<PrimitiveKind> {
        match self {
            TypeRef::Primitive(kind) => Some(*kind),
            TypeRef::Class(fqn) => PrimitiveKind::from_boxed_class(fqn),
            _ => None,
        }
    }

    /// Wrapper class for primitives; reference types map to themselves.
    pub fn boxed(&self) -> TypeRef {
        match self {
            TypeRef::Primitive(kind) => TypeRef::class(kind.boxed_class()),
            other => other.clone(),
        }
    }

    /// Name without the package prefix, e.g. `String[]` or `Map$Entry` -> `Entry`.
    pub fn simple_name(&self) -> String {
        match self {
            TypeRef::Primitive(kind) => kind.name().to_string(),
            TypeRef::Class(fqn) => simple_class_name(fqn).to_string(),
            TypeRef::Array(element) => format!("{}[]", element.simple_name()),
            TypeRef::Null => "null".to_string(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(kind) => write!(f, "{kind}"),
            TypeRef::Class(fqn) => f.write_str(&fqn.replace('$', ".")),
            TypeRef::Array(element) => write!(f, "{element}[]"),
            TypeRef::Null => f.write_str("null"),
        }
    }
}

impl From<PrimitiveKind> for TypeRef {
    fn from(kind: PrimitiveKind) -> Self {
        TypeRef::Primitive(kind)
    }
}

/// Last segment of a class name, treating both `.` and `$` as separators.
pub fn simple_class_name(fqn: &str) -> &str {
    fqn.rsplit(['.', '$']).next().unwrap_or(fqn)
}

/// Package part of a top-level or inner class name (`""` for the default package).
pub fn package_of(fqn: &str) -> &str {
    let top_level = fqn.split('$').next().unwrap_or(fqn);
    match top_level.rfind('.') {
        Some(idx) => &top_level[..idx],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boxing_round_trip_names() {
        assert_eq!(PrimitiveKind::Int.boxed_class(), "java.lang.Integer");
        assert_eq!(
            PrimitiveKind::from_boxed_class("java.lang.Character"),
            Some(PrimitiveKind::Char)
        );
        assert_eq!(PrimitiveKind::from_boxed_class("java.lang.Void"), None);
    }

    #[test]
    fn test_simple_names() {
        assert_eq!(TypeRef::class("a.b.Outer$Inner").simple_name(), "Inner");
        assert_eq!(TypeRef::array_of(TypeRef::INT).simple_name(), "int[]");
        assert_eq!(TypeRef::class("a.b.Outer$Inner").to_string(), "a.b.Outer.Inner");
        assert_eq!(package_of("a.b.Outer$Inner"), "a.b");
        assert_eq!(package_of("Top"), "");
    }
}
