use super::types::{PrimitiveKind, TypeRef};
use crate::error::HostError;
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Trait implemented by every host object reachable from an expression.
///
/// The engine never looks inside a host object; it only asks for its class and,
/// when a string conversion is required, for its textual form.
pub trait HostObject: Send + Sync + fmt::Debug {
    /// Fully qualified name of the runtime class.
    fn class_name(&self) -> &str;

    /// Cast to Any for downcasting to concrete types.
    fn as_any(&self) -> &dyn Any;

    /// Equivalent of `toString()` used by string concatenation.
    fn display_string(&self) -> String {
        format!("{}@{:x}", self.class_name(), self as *const Self as *const () as usize)
    }
}

/// A compiled lambda (or any host callable) stored as a value.
pub trait Callable: Send + Sync + fmt::Debug {
    /// Fully qualified name of the functional interface this callable implements.
    fn interface(&self) -> &str;

    fn arity(&self) -> usize;

    fn call(&self, args: &[Value]) -> Result<Value, HostError>;
}

#[derive(Clone)]
pub struct ObjectRef(pub Arc<dyn HostObject>);

impl ObjectRef {
    pub fn new(object: impl HostObject + 'static) -> Self {
        Self(Arc::new(object))
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Host array with a fixed element type and length.
#[derive(Debug)]
pub struct JavaArray {
    element_type: TypeRef,
    elements: RwLock<Vec<Value>>,
}

pub type ArrayRef = Arc<JavaArray>;

impl JavaArray {
    pub fn new(element_type: TypeRef, elements: Vec<Value>) -> ArrayRef {
        Arc::new(Self {
            element_type,
            elements: RwLock::new(elements),
        })
    }

    /// Array filled with the default value of `element_type`.
    pub fn with_length(element_type: TypeRef, length: usize) -> Result<ArrayRef, HostError> {
        let mut elements = Self::allocate(length)?;
        elements.resize(length, Value::default_for(&element_type));
        Ok(Self::new(element_type, elements))
    }

    /// Empty storage for `length` elements, or `OutOfMemoryError` when it
    /// cannot be had.
    pub fn allocate(length: usize) -> Result<Vec<Value>, HostError> {
        let mut elements = Vec::new();
        elements.try_reserve_exact(length).map_err(|_| {
            HostError::exception(
                "java.lang.OutOfMemoryError",
                format!("Requested array size of {length} cannot be allocated"),
            )
        })?;
        Ok(elements)
    }

    pub fn element_type(&self) -> &TypeRef {
        &self.element_type
    }

    pub fn array_type(&self) -> TypeRef {
        TypeRef::array_of(self.element_type.clone())
    }

    pub fn len(&self) -> usize {
        self.elements.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.elements.read().get(index).cloned()
    }

    pub fn set(&self, index: usize, value: Value) -> Result<(), HostError> {
        let mut elements = self.elements.write();
        let len = elements.len();
        match elements.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(HostError::exception(
                "java.lang.ArrayIndexOutOfBoundsException",
                format!("Index {index} out of bounds for length {len}"),
            )),
        }
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.elements.read().clone()
    }
}

/// A runtime value.
///
/// Primitive payloads double as boxed values: whether `Int(5)` is an `int` or an
/// `Integer` is decided by the declared type it travels with.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Char(u16),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(Arc<str>),
    Array(ArrayRef),
    Object(ObjectRef),
    Lambda(Arc<dyn Callable>),
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::Str(Arc::from(s.as_ref()))
    }

    pub fn object(object: impl HostObject + 'static) -> Self {
        Value::Object(ObjectRef::new(object))
    }

    /// Default (zero) value for fields and array slots of the given type.
    pub fn default_for(ty: &TypeRef) -> Value {
        match ty {
            TypeRef::Primitive(kind) => match kind {
                PrimitiveKind::Boolean => Value::Boolean(false),
                PrimitiveKind::Char => Value::Char(0),
                PrimitiveKind::Byte => Value::Byte(0),
                PrimitiveKind::Short => Value::Short(0),
                PrimitiveKind::Int => Value::Int(0),
                PrimitiveKind::Long => Value::Long(0),
                PrimitiveKind::Float => Value::Float(0.0),
                PrimitiveKind::Double => Value::Double(0.0),
                PrimitiveKind::Void => Value::Null,
            },
            _ => Value::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        Some(match self {
            Value::Boolean(_) => PrimitiveKind::Boolean,
            Value::Char(_) => PrimitiveKind::Char,
            Value::Byte(_) => PrimitiveKind::Byte,
            Value::Short(_) => PrimitiveKind::Short,
            Value::Int(_) => PrimitiveKind::Int,
            Value::Long(_) => PrimitiveKind::Long,
            Value::Float(_) => PrimitiveKind::Float,
            Value::Double(_) => PrimitiveKind::Double,
            _ => return None,
        })
    }

    /// Type of the object a reference to this value points at.
    ///
    /// Primitive payloads report their wrapper class; `null` reports [`TypeRef::Null`].
    pub fn runtime_type(&self) -> TypeRef {
        match self {
            Value::Null => TypeRef::Null,
            Value::Str(_) => TypeRef::string(),
            Value::Array(array) => array.array_type(),
            Value::Object(object) => TypeRef::class(object.0.class_name()),
            Value::Lambda(callable) => TypeRef::class(callable.interface()),
            primitive => match primitive.primitive_kind() {
                Some(kind) => TypeRef::class(kind.boxed_class()),
                None => TypeRef::object(),
            },
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integral payload widened to i64 (chars included).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Char(c) => Some(i64::from(*c)),
            Value::Byte(v) => Some(i64::from(*v)),
            Value::Short(v) => Some(i64::from(*v)),
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Any numeric payload converted to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    /// Reference identity for objects, arrays, strings and lambdas; value equality
    /// for primitive payloads.
    pub fn same_reference(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Str(a), Value::Str(b)) => Arc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(&a.0, &b.0),
            (Value::Lambda(a), Value::Lambda(b)) => Arc::ptr_eq(a, b),
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (a, b) if a.primitive_kind() == b.primitive_kind() && a.primitive_kind().is_some() => {
                match (a.as_i64(), b.as_i64()) {
                    (Some(x), Some(y)) => x == y,
                    _ => a.as_f64() == b.as_f64(),
                }
            }
            _ => false,
        }
    }

    /// String conversion as performed by string concatenation and `String.valueOf`.
    pub fn to_java_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Char(c) => char::from_u32(u32::from(*c))
                .unwrap_or(char::REPLACEMENT_CHARACTER)
                .to_string(),
            Value::Byte(v) => v.to_string(),
            Value::Short(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Long(v) => v.to_string(),
            Value::Float(v) => format_floating(f64::from(*v), Some(*v)),
            Value::Double(v) => format_floating(*v, None),
            Value::Str(s) => s.to_string(),
            Value::Array(array) => format!(
                "[{}@{:x}",
                array.element_type().simple_name(),
                Arc::as_ptr(array) as usize
            ),
            Value::Object(object) => object.0.display_string(),
            Value::Lambda(callable) => format!("{}$$Lambda", callable.interface()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "\"{s}\""),
            Value::Char(_) => write!(f, "'{}'", self.to_java_string()),
            other => f.write_str(&other.to_java_string()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::string(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::string(v)
    }
}

/// Floating point rendering following the host's `Double.toString` rules:
/// plain notation in `[1e-3, 1e7)`, computerized scientific notation otherwise.
fn format_floating(value: f64, as_float: Option<f32>) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }
    let magnitude = value.abs();
    if (1e-3..1e7).contains(&magnitude) {
        let plain = match as_float {
            Some(f) => f.to_string(),
            None => value.to_string(),
        };
        if plain.contains('.') {
            plain
        } else {
            format!("{plain}.0")
        }
    } else {
        let scientific = match as_float {
            Some(f) => format!("{f:e}"),
            None => format!("{value:e}"),
        };
        let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
        if mantissa.contains('.') {
            format!("{mantissa}E{exponent}")
        } else {
            format!("{mantissa}.0E{exponent}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floating_formatting() {
        assert_eq!(Value::Double(1.0).to_java_string(), "1.0");
        assert_eq!(Value::Double(15.5).to_java_string(), "15.5");
        assert_eq!(Value::Double(1e10).to_java_string(), "1.0E10");
        assert_eq!(Value::Double(1.5e-5).to_java_string(), "1.5E-5");
        assert_eq!(Value::Float(2.5).to_java_string(), "2.5");
        assert_eq!(Value::Double(f64::NAN).to_java_string(), "NaN");
    }

    #[test]
    fn test_runtime_type_of_primitive_payload_is_boxed() {
        assert_eq!(Value::Int(3).runtime_type(), TypeRef::class("java.lang.Integer"));
        assert_eq!(Value::string("x").runtime_type(), TypeRef::string());
        assert_eq!(Value::Null.runtime_type(), TypeRef::Null);
    }

    #[test]
    fn test_array_bounds() {
        let array = JavaArray::with_length(TypeRef::INT, 2).unwrap();
        assert!(array.set(1, Value::Int(4)).is_ok());
        assert!(array.set(2, Value::Int(4)).is_err());
        assert!(matches!(array.get(1), Some(Value::Int(4))));
    }

    #[test]
    fn test_oversized_array_is_out_of_memory() {
        let error = JavaArray::with_length(TypeRef::INT, usize::MAX).unwrap_err();
        assert!(error.to_string().contains("OutOfMemoryError"), "{error}");
    }

    #[test]
    fn test_same_reference() {
        let s = Value::string("a");
        assert!(s.same_reference(&s.clone()));
        assert!(!s.same_reference(&Value::string("a")));
        assert!(Value::Int(3).same_reference(&Value::Int(3)));
    }
}
