use exprscope_api::{StaticHierarchyNode, TypeRef, Value};
use exprscope_core::{ErrorKind, EvaluationMode, ExpressionEngine, Settings};
use exprscope_host::ClassRegistry;
use std::sync::Arc;

fn engine() -> ExpressionEngine {
    engine_in(EvaluationMode::DynamicTyping)
}

fn engine_in(mode: EvaluationMode) -> ExpressionEngine {
    let server = StaticHierarchyNode::new("server", None)
        .with_child(StaticHierarchyNode::new("port", Some(Value::Int(8080))))
        .with_child(StaticHierarchyNode::new("host", Some(Value::string("localhost"))));
    let root = StaticHierarchyNode::new("root", None).with_child(server);
    let settings = Settings::builder()
        .custom_hierarchy_root(Arc::new(root))
        .evaluation_mode(mode)
        .build();
    ExpressionEngine::new(Arc::new(ClassRegistry::standard()), settings)
}

#[test]
fn test_node_values_take_part_in_expressions() {
    let engine = engine();
    let info = engine.evaluate("{server#port} + 1", &Value::Null).unwrap();
    assert!(matches!(info.value(), Some(Value::Int(8081))));
    let info = engine.evaluate("{server#host}.length()", &Value::Null).unwrap();
    assert!(matches!(info.value(), Some(Value::Int(9))));
}

#[test]
fn test_unknown_node_is_semantic_fault() {
    let error = engine().evaluate("{server#nope}", &Value::Null).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Semantic);
}

#[test]
fn test_child_names_are_completed() {
    let texts: Vec<String> = engine()
        .complete("{server#p", 9, &Value::Null)
        .unwrap()
        .into_iter()
        .map(|c| c.text)
        .collect();
    assert_eq!(texts, vec!["port"]);
}

#[test]
fn test_static_typing_reports_node_type_only() {
    let engine = engine_in(EvaluationMode::StaticTyping);
    let info = engine.evaluate("{server#port}", &Value::Null).unwrap();
    assert!(info.is_indeterminate());
    assert_eq!(info.declared_type(), &TypeRef::class("java.lang.Integer"));

    let info = engine.evaluate("{server#port} + 1", &Value::Null).unwrap();
    assert!(info.is_indeterminate());
    assert_eq!(info.declared_type(), &TypeRef::INT);
}
