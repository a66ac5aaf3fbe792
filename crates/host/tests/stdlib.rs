use exprscope_api::{
    Callable, HostError, HostResult, HostTypeSystem, JavaArray, MemberProvider, PackageProvider,
    TypeRef, Value,
};
use exprscope_host::{ClassRegistry, ElementList};
use std::sync::Arc;

fn invoke(registry: &ClassRegistry, class: &str, signature: &str, receiver: &Value, args: &[Value]) -> HostResult<Value> {
    let method = registry
        .methods(class)
        .into_iter()
        .find(|m| m.signature() == signature)
        .unwrap_or_else(|| panic!("{class} has no method {signature}"));
    method.invoke(receiver, args)
}

#[test]
fn test_standard_library_shape() {
    let registry = ClassRegistry::standard();
    for class in [
        "java.lang.Object",
        "java.lang.String",
        "java.lang.Integer",
        "java.lang.Math",
        "java.lang.StringBuilder",
        "java.util.ArrayList",
        "java.util.function.Function",
    ] {
        assert!(registry.class_exists(class), "missing {class}");
    }
    assert!(registry.inherits_from("java.lang.Integer", "java.lang.Number"));
    assert!(registry.inherits_from("java.util.ArrayList", "java.lang.Iterable"));
    assert!(registry.package_exists("java.util.function"));
    assert!(registry.subpackages("java").contains(&"java.util".to_string()));
    assert_eq!(registry.abstract_methods("java.util.function.UnaryOperator").len(), 1);
}

#[test]
fn test_string_methods() {
    let registry = ClassRegistry::standard();
    let hello = Value::string("hello");
    let result = invoke(&registry, "java.lang.String", "substring(int, int)", &hello, &[Value::Int(1), Value::Int(3)]).unwrap();
    assert_eq!(result.as_str(), Some("el"));

    let error = invoke(&registry, "java.lang.String", "charAt(int)", &hello, &[Value::Int(9)]).unwrap_err();
    assert!(matches!(error, HostError::Exception { ref class, .. } if class == "java.lang.StringIndexOutOfBoundsException"));

    let parts = JavaArray::new(
        TypeRef::class("java.lang.CharSequence"),
        vec![Value::string("a"), Value::string("b")],
    );
    let joined = invoke(
        &registry,
        "java.lang.String",
        "join(CharSequence, CharSequence...)",
        &Value::Null,
        &[Value::string("-"), Value::Array(parts)],
    )
    .unwrap();
    assert_eq!(joined.as_str(), Some("a-b"));
}

#[test]
fn test_parse_int_failure_is_number_format_exception() {
    let registry = ClassRegistry::standard();
    let error = invoke(&registry, "java.lang.Integer", "parseInt(String)", &Value::Null, &[Value::string("12x")]).unwrap_err();
    assert_eq!(error.to_string(), "java.lang.NumberFormatException: For input string: \"12x\"");
}

#[test]
fn test_string_builder_appends_in_place() {
    let registry = ClassRegistry::standard();
    let constructor = registry
        .constructors("java.lang.StringBuilder")
        .into_iter()
        .find(|c| c.parameters.is_empty())
        .unwrap();
    let builder = constructor.invoke(&Value::Null, &[]).unwrap();
    invoke(&registry, "java.lang.StringBuilder", "append(int)", &builder, &[Value::Int(4)]).unwrap();
    invoke(&registry, "java.lang.StringBuilder", "append(char)", &builder, &[Value::Char(u16::from(b'x'))]).unwrap();
    assert_eq!(builder.to_java_string(), "4x");
}

#[derive(Debug)]
struct IsEven;

impl Callable for IsEven {
    fn interface(&self) -> &str {
        "java.util.function.Predicate"
    }

    fn arity(&self) -> usize {
        1
    }

    fn call(&self, args: &[Value]) -> HostResult<Value> {
        Ok(Value::Boolean(args[0].as_i64().is_some_and(|v| v % 2 == 0)))
    }
}

#[test]
fn test_collections_call_functional_values() {
    let registry = ClassRegistry::standard();
    let list = Value::object(ElementList::new((1..=4).map(Value::Int).collect()));
    let removed = invoke(
        &registry,
        "java.util.Collection",
        "removeIf(Predicate)",
        &list,
        &[Value::Lambda(Arc::new(IsEven))],
    )
    .unwrap();
    assert!(matches!(removed, Value::Boolean(true)));
    assert_eq!(list.to_java_string(), "[1, 3]");

    let predicate = registry.methods("java.util.function.Predicate").remove(0);
    let tested = predicate.invoke(&Value::Lambda(Arc::new(IsEven)), &[Value::Int(2)]).unwrap();
    assert!(matches!(tested, Value::Boolean(true)));
}

#[test]
fn test_excluding_standard_classes() {
    let registry = ClassRegistry::builder()
        .standard_library()
        .exclude("java.lang.StringBuilder")
        .build();
    assert!(!registry.class_exists("java.lang.StringBuilder"));
    assert!(registry.class_exists("java.lang.String"));
}
