//! Type rules of the host language.
//!
//! Supports:
//! - Identity
//! - Primitive widening and narrowing
//! - Boxing / unboxing
//! - Classes (extends) and interfaces (implements)
//! - Arrays (covariant for reference elements)

use crate::rating::TypeMatch;
use exprscope_api::{
    HostTypeSystem, OBJECT_CLASS, PrimitiveKind, STRING_CLASS, TypeRef, Value,
};

/// Widening primitive conversion (identity excluded).
pub fn is_primitive_widening(from: PrimitiveKind, to: PrimitiveKind) -> bool {
    use PrimitiveKind::*;
    match from {
        Byte => matches!(to, Short | Int | Long | Float | Double),
        Short => matches!(to, Int | Long | Float | Double),
        Char => matches!(to, Int | Long | Float | Double),
        Int => matches!(to, Long | Float | Double),
        Long => matches!(to, Float | Double),
        Float => matches!(to, Double),
        _ => false,
    }
}

fn is_class_subtype(sub: &str, sup: &str, ts: &dyn HostTypeSystem) -> bool {
    sup == OBJECT_CLASS || ts.inherits_from(sub, sup)
}

/// Check whether a reference of type `sub` may be stored where `sup` is declared.
pub fn is_reference_assignable(sub: &TypeRef, sup: &TypeRef, ts: &dyn HostTypeSystem) -> bool {
    if sub == sup {
        return sub.is_reference();
    }
    match (sub, sup) {
        (TypeRef::Null, sup) => sup.is_reference() && *sup != TypeRef::Null,
        (TypeRef::Class(sub), TypeRef::Class(sup)) => is_class_subtype(sub, sup, ts),
        (TypeRef::Array(_), TypeRef::Class(sup)) => {
            sup.as_ref() == OBJECT_CLASS
                || sup.as_ref() == "java.lang.Cloneable"
                || sup.as_ref() == "java.io.Serializable"
        }
        (TypeRef::Array(sub), TypeRef::Array(sup)) => {
            sub.is_reference() && is_reference_assignable(sub, sup, ts)
        }
        _ => false,
    }
}

/// Rate how `actual` converts to `expected` in an invocation or assignment context.
pub fn rate_conversion(actual: &TypeRef, expected: &TypeRef, ts: &dyn HostTypeSystem) -> TypeMatch {
    if actual == expected {
        return if actual.is_void() {
            TypeMatch::None
        } else {
            TypeMatch::Full
        };
    }
    match (actual, expected) {
        (TypeRef::Primitive(from), TypeRef::Primitive(to)) => {
            if is_primitive_widening(*from, *to) {
                TypeMatch::PrimitiveConversion
            } else {
                TypeMatch::None
            }
        }
        (TypeRef::Primitive(from), reference) => {
            if *from == PrimitiveKind::Void {
                return TypeMatch::None;
            }
            let boxed = actual.boxed();
            if &boxed == reference {
                TypeMatch::Boxing
            } else if is_reference_assignable(&boxed, reference, ts) {
                TypeMatch::BoxingAndConversion
            } else {
                TypeMatch::None
            }
        }
        (reference, TypeRef::Primitive(to)) => match reference.unboxed() {
            Some(from) if from == *to => TypeMatch::Boxing,
            Some(from) if is_primitive_widening(from, *to) => TypeMatch::BoxingAndConversion,
            _ => TypeMatch::None,
        },
        _ => {
            if is_reference_assignable(actual, expected, ts) {
                TypeMatch::Inheritance
            } else {
                TypeMatch::None
            }
        }
    }
}

pub fn is_convertible(actual: &TypeRef, expected: &TypeRef, ts: &dyn HostTypeSystem) -> bool {
    rate_conversion(actual, expected, ts) != TypeMatch::None
}

/// Unary numeric promotion: byte, short and char become int.
pub fn unary_numeric_promotion(kind: PrimitiveKind) -> Option<PrimitiveKind> {
    use PrimitiveKind::*;
    match kind {
        Byte | Short | Char | Int => Some(Int),
        Long | Float | Double => Some(kind),
        _ => None,
    }
}

/// Binary numeric promotion to the common operand kind (at least int).
pub fn binary_numeric_promotion(a: PrimitiveKind, b: PrimitiveKind) -> Option<PrimitiveKind> {
    use PrimitiveKind::*;
    let a = unary_numeric_promotion(a)?;
    let b = unary_numeric_promotion(b)?;
    Some(if a == Double || b == Double {
        Double
    } else if a == Float || b == Float {
        Float
    } else if a == Long || b == Long {
        Long
    } else {
        Int
    })
}

/// Static check whether a cast from `from` to `to` can ever succeed.
pub fn is_castable(from: &TypeRef, to: &TypeRef, ts: &dyn HostTypeSystem) -> bool {
    if from == to {
        return true;
    }
    match (from, to) {
        (TypeRef::Primitive(f), TypeRef::Primitive(t)) => {
            (f.is_numeric() && t.is_numeric())
                || (*f == PrimitiveKind::Boolean && *t == PrimitiveKind::Boolean)
        }
        (TypeRef::Primitive(_), reference) => {
            is_reference_assignable(&from.boxed(), reference, ts)
        }
        (reference, TypeRef::Primitive(t)) => match reference.unboxed() {
            Some(f) => f == *t || is_primitive_widening(f, *t),
            None => is_reference_assignable(&to.boxed(), reference, ts),
        },
        (TypeRef::Null, _) => true,
        (TypeRef::Array(f), TypeRef::Array(t)) => {
            if f.is_primitive() || t.is_primitive() {
                f == t
            } else {
                is_castable(f, t, ts)
            }
        }
        _ => {
            if is_reference_assignable(from, to, ts) || is_reference_assignable(to, from, ts) {
                return true;
            }
            // Casting between an interface and a non-final class may succeed at runtime
            let is_interface = |ty: &TypeRef| {
                ty.as_class()
                    .and_then(|fqn| ts.class_info(fqn))
                    .is_some_and(|info| info.is_interface())
            };
            let is_final = |ty: &TypeRef| {
                ty.as_class()
                    .and_then(|fqn| ts.class_info(fqn))
                    .is_some_and(|info| info.modifiers.is_final)
                    || ty.is_string()
            };
            (is_interface(from) && !is_final(to)) || (is_interface(to) && !is_final(from))
        }
    }
}

/// Convert a primitive payload to another primitive kind with the host's
/// widening/narrowing semantics. Non-numeric payloads are returned unchanged.
pub fn convert_primitive(value: &Value, to: PrimitiveKind) -> Value {
    if value.primitive_kind() == Some(to) {
        return value.clone();
    }
    if let Some(b) = value.as_bool() {
        return Value::Boolean(b);
    }
    let floating = matches!(value, Value::Float(_) | Value::Double(_));
    match (value.as_i64(), value.as_f64()) {
        (Some(i), _) => match to {
            PrimitiveKind::Char => Value::Char(i as u16),
            PrimitiveKind::Byte => Value::Byte(i as i8),
            PrimitiveKind::Short => Value::Short(i as i16),
            PrimitiveKind::Int => Value::Int(i as i32),
            PrimitiveKind::Long => Value::Long(i),
            PrimitiveKind::Float => Value::Float(i as f32),
            PrimitiveKind::Double => Value::Double(i as f64),
            _ => value.clone(),
        },
        (None, Some(f)) if floating => match to {
            // floating -> int/long saturates; smaller kinds narrow through int
            PrimitiveKind::Char => Value::Char(f as i32 as u16),
            PrimitiveKind::Byte => Value::Byte(f as i32 as i8),
            PrimitiveKind::Short => Value::Short(f as i32 as i16),
            PrimitiveKind::Int => Value::Int(f as i32),
            PrimitiveKind::Long => Value::Long(f as i64),
            PrimitiveKind::Float => Value::Float(f as f32),
            PrimitiveKind::Double => Value::Double(f),
            _ => value.clone(),
        },
        _ => value.clone(),
    }
}

/// Adapt a value produced with type `from` to a slot declared as `to`.
///
/// Primitive targets get a converted payload; reference targets keep the value
/// (boxing is implicit in the value model).
pub fn convert_for_assignment(value: &Value, to: &TypeRef) -> Value {
    match (to, value) {
        (TypeRef::Primitive(kind), v) if v.primitive_kind().is_some() => convert_primitive(v, *kind),
        _ => value.clone(),
    }
}

/// Whether a value fits a declared type at runtime (used by casts and `instanceof`).
pub fn is_instance_of(value: &Value, ty: &TypeRef, ts: &dyn HostTypeSystem) -> bool {
    match value {
        Value::Null => false,
        _ => {
            let runtime = value.runtime_type();
            is_reference_assignable(&runtime, ty, ts)
        }
    }
}

/// Type used for member lookup and operator selection: the runtime type when a
/// non-null value is known and dynamic typing applies, the declared type otherwise.
pub fn effective_type(declared: &TypeRef, value: Option<&Value>, use_runtime: bool) -> TypeRef {
    if !use_runtime || declared.is_primitive() {
        return declared.clone();
    }
    match value {
        Some(v) if !v.is_null() => v.runtime_type(),
        _ => declared.clone(),
    }
}

pub fn is_string_type(ty: &TypeRef) -> bool {
    ty.as_class() == Some(STRING_CLASS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use exprscope_api::{
        ClassInfo, ExecutableInfo, FieldInfo, InheritanceProvider, MemberProvider,
        PackageProvider, TypeProvider,
    };
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Default)]
    struct MiniTypeSystem {
        parents: HashMap<String, Vec<String>>,
    }

    impl MiniTypeSystem {
        fn with_parent(mut self, ty: &str, parent: &str) -> Self {
            self.parents
                .entry(ty.to_string())
                .or_default()
                .push(parent.to_string());
            self
        }
    }

    impl TypeProvider for MiniTypeSystem {
        fn class_info(&self, _fqn: &str) -> Option<ClassInfo> {
            None
        }
        fn inner_classes(&self, _fqn: &str) -> Vec<String> {
            vec![]
        }
    }

    impl PackageProvider for MiniTypeSystem {
        fn package_exists(&self, _package: &str) -> bool {
            false
        }
        fn subpackages(&self, _package: &str) -> Vec<String> {
            vec![]
        }
        fn classes_in_package(&self, _package: &str) -> Vec<String> {
            vec![]
        }
        fn all_top_level_classes(&self) -> Vec<String> {
            vec![]
        }
    }

    impl InheritanceProvider for MiniTypeSystem {
        fn superclass(&self, fqn: &str) -> Option<String> {
            self.parents.get(fqn).and_then(|p| p.first()).cloned()
        }
        fn interfaces(&self, fqn: &str) -> Vec<String> {
            self.parents
                .get(fqn)
                .map(|p| p.iter().skip(1).cloned().collect())
                .unwrap_or_default()
        }
    }

    impl MemberProvider for MiniTypeSystem {
        fn fields(&self, _fqn: &str) -> Vec<Arc<FieldInfo>> {
            vec![]
        }
        fn methods(&self, _fqn: &str) -> Vec<Arc<ExecutableInfo>> {
            vec![]
        }
        fn constructors(&self, _fqn: &str) -> Vec<Arc<ExecutableInfo>> {
            vec![]
        }
    }

    fn ts() -> MiniTypeSystem {
        MiniTypeSystem::default()
            .with_parent("java.lang.Integer", "java.lang.Number")
            .with_parent("java.lang.Number", OBJECT_CLASS)
            .with_parent("a.Dog", "a.Animal")
    }

    #[test]
    fn test_conversion_grades() {
        let ts = ts();
        let integer = TypeRef::class("java.lang.Integer");
        assert_eq!(rate_conversion(&TypeRef::INT, &TypeRef::INT, &ts), TypeMatch::Full);
        assert_eq!(
            rate_conversion(&TypeRef::class("a.Dog"), &TypeRef::class("a.Animal"), &ts),
            TypeMatch::Inheritance
        );
        assert_eq!(
            rate_conversion(&TypeRef::INT, &TypeRef::DOUBLE, &ts),
            TypeMatch::PrimitiveConversion
        );
        assert_eq!(rate_conversion(&TypeRef::INT, &integer, &ts), TypeMatch::Boxing);
        assert_eq!(rate_conversion(&integer, &TypeRef::INT, &ts), TypeMatch::Boxing);
        assert_eq!(
            rate_conversion(&TypeRef::INT, &TypeRef::class("java.lang.Number"), &ts),
            TypeMatch::BoxingAndConversion
        );
        assert_eq!(
            rate_conversion(&integer, &TypeRef::LONG, &ts),
            TypeMatch::BoxingAndConversion
        );
        assert_eq!(rate_conversion(&TypeRef::DOUBLE, &TypeRef::INT, &ts), TypeMatch::None);
        assert_eq!(rate_conversion(&TypeRef::Null, &TypeRef::INT, &ts), TypeMatch::None);
        assert_eq!(
            rate_conversion(&TypeRef::Null, &TypeRef::string(), &ts),
            TypeMatch::Inheritance
        );
    }

    #[test]
    fn test_arrays_are_covariant_for_references_only() {
        let ts = ts();
        let dogs = TypeRef::array_of(TypeRef::class("a.Dog"));
        let animals = TypeRef::array_of(TypeRef::class("a.Animal"));
        assert!(is_reference_assignable(&dogs, &animals, &ts));
        assert!(!is_reference_assignable(&animals, &dogs, &ts));
        let ints = TypeRef::array_of(TypeRef::INT);
        let longs = TypeRef::array_of(TypeRef::LONG);
        assert!(!is_reference_assignable(&ints, &longs, &ts));
        assert!(is_reference_assignable(&ints, &TypeRef::object(), &ts));
    }

    #[test]
    fn test_promotions() {
        use PrimitiveKind::*;
        assert_eq!(binary_numeric_promotion(Byte, Char), Some(Int));
        assert_eq!(binary_numeric_promotion(Int, Long), Some(Long));
        assert_eq!(binary_numeric_promotion(Long, Float), Some(Float));
        assert_eq!(binary_numeric_promotion(Float, Double), Some(Double));
        assert_eq!(binary_numeric_promotion(Boolean, Int), None);
    }

    #[test]
    fn test_narrowing_follows_host_semantics() {
        assert!(matches!(
            convert_primitive(&Value::Double(3.9), PrimitiveKind::Int),
            Value::Int(3)
        ));
        assert!(matches!(
            convert_primitive(&Value::Int(300), PrimitiveKind::Byte),
            Value::Byte(44)
        ));
        assert!(matches!(
            convert_primitive(&Value::Double(f64::NAN), PrimitiveKind::Long),
            Value::Long(0)
        ));
        assert!(matches!(
            convert_primitive(&Value::Double(1e20), PrimitiveKind::Int),
            Value::Int(i32::MAX)
        ));
    }

    #[test]
    fn test_castability() {
        let ts = ts();
        assert!(is_castable(&TypeRef::object(), &TypeRef::string(), &ts));
        assert!(is_castable(&TypeRef::DOUBLE, &TypeRef::INT, &ts));
        assert!(!is_castable(&TypeRef::BOOLEAN, &TypeRef::INT, &ts));
        assert!(is_castable(&TypeRef::Null, &TypeRef::string(), &ts));
        assert!(is_castable(&TypeRef::object(), &TypeRef::INT, &ts));
        assert!(!is_castable(&TypeRef::class("a.Dog"), &TypeRef::string(), &ts));
    }
}
