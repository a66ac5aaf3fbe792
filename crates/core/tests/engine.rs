mod common;

use common::{Fixture, SAMPLE};
use exprscope_api::{TypeRef, Value};
use exprscope_core::{EngineError, ErrorKind, EvaluationMode};

#[test]
fn test_concatenation_is_left_to_right() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    let value = fixture.evaluate("5 + 4 + \"Test\"").unwrap();
    assert_eq!(value.as_str(), Some("9Test"));
    let value = fixture.evaluate("\"Test\" + 5 + 4").unwrap();
    assert_eq!(value.as_str(), Some("Test54"));
}

#[test]
fn test_exact_name_ranks_before_longer_prefix() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    let texts = fixture.complete("xy");
    let field = texts.iter().position(|t| t == "xy").unwrap();
    let variable = texts.iter().position(|t| t == "xyz").unwrap();
    assert!(field < variable, "{texts:?}");

    let texts = fixture.complete("x");
    assert_eq!(texts.first().map(String::as_str), Some("x"));
    assert!(texts.contains(&"xy".to_string()) && texts.contains(&"xyz".to_string()));
}

#[test]
fn test_negative_array_size_is_evaluation_fault() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    let error = fixture.evaluate("new int[-1]").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Evaluation);
    assert!(error.to_string().contains("NegativeArraySizeException"), "{error}");
}

#[test]
fn test_crossed_overloads_are_ambiguous() {
    let fixture = Fixture::new(EvaluationMode::StaticTyping);
    let error = fixture.engine.evaluate("Sample.pick(1, 2)", &fixture.root).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Semantic);
    let message = error.to_string();
    assert!(message.contains("pick(int, double)"), "{message}");
    assert!(message.contains("pick(double, int)"), "{message}");
}

#[test]
fn test_exact_overload_wins() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    let value = fixture.evaluate("Sample.pick(1, 2.0)").unwrap();
    assert_eq!(value.as_str(), Some("int, double"));
}

#[test]
fn test_short_circuit_skips_assignment() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    let value = fixture.evaluate("false && (x = 5) > 0").unwrap();
    assert!(matches!(value, Value::Boolean(false)));
    assert!(matches!(fixture.engine.variable("x"), Some(Value::Int(7))));

    fixture.evaluate("true && (x = 5) > 0").unwrap();
    assert!(matches!(fixture.engine.variable("x"), Some(Value::Int(5))));
}

#[test]
fn test_cast_of_null_keeps_target_type() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    let info = fixture.engine.evaluate("(String) null", &Value::Null).unwrap();
    assert!(matches!(info.value(), Some(Value::Null)));
    assert_eq!(info.declared_type(), &TypeRef::string());
}

#[test]
fn test_root_object_fields() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    let value = fixture.evaluate("xy + 1").unwrap();
    assert!(matches!(value, Value::Int(14)));
    fixture.evaluate("xy = xy * 2").unwrap();
    assert!(matches!(fixture.evaluate("xy").unwrap(), Value::Int(26)));
}

#[test]
fn test_syntax_error_has_no_side_effects() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    let error = fixture.evaluate("touch() + ").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Syntax);
    assert_eq!(fixture.calls(), 0);

    assert!(matches!(fixture.evaluate("touch()").unwrap(), Value::Int(1)));
    assert_eq!(fixture.calls(), 1);
}

#[test]
fn test_completion_never_calls_host_code() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    let texts = fixture.complete("touch() + x");
    assert!(texts.contains(&"xyz".to_string()));
    assert_eq!(fixture.calls(), 0);
}

#[test]
fn test_completion_replaces_token_prefix() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    let completions = fixture
        .engine
        .complete("\"abc\".toUp", 10, &Value::Null)
        .unwrap();
    let first = completions.first().unwrap();
    assert_eq!(first.text, "toUpperCase()");
    assert_eq!((first.insertion_start, first.insertion_end), (6, 10));
    assert_eq!(first.apply("\"abc\".toUp").0, "\"abc\".toUpperCase()");
}

#[test]
fn test_error_before_caret_is_returned() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    let error = fixture
        .engine
        .complete("nosuchthing.x", 13, &fixture.root)
        .unwrap_err();
    assert!(error.position().is_some_and(|p| p < 13), "{error}");
}

#[test]
fn test_final_variables_reject_assignment() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    let error = fixture.evaluate("limit = 3").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Semantic);
    assert!(matches!(fixture.engine.variable("limit"), Some(Value::Int(10))));
}

#[test]
fn test_static_typing_infers_without_calls() {
    let fixture = Fixture::new(EvaluationMode::StaticTyping);
    let info = fixture.engine.evaluate("touch() + 1L", &fixture.root).unwrap();
    assert_eq!(info.declared_type(), &TypeRef::LONG);
    assert!(info.value().is_none());
    assert_eq!(fixture.calls(), 0);
}

#[test]
fn test_mixed_mode_reads_but_does_not_call() {
    let fixture = Fixture::new(EvaluationMode::Mixed);
    assert!(matches!(fixture.evaluate("xy").unwrap(), Value::Int(13)));
    let info = fixture.engine.evaluate("touch()", &fixture.root).unwrap();
    assert!(info.value().is_none());
    assert_eq!(fixture.calls(), 0);
}

#[test]
fn test_compiled_expression_runs_repeatedly() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    let compiled = fixture
        .engine
        .compile("touch() * 10", TypeRef::class(SAMPLE))
        .unwrap();
    assert_eq!(compiled.result_type(), &TypeRef::INT);
    assert_eq!(fixture.calls(), 0);

    assert!(matches!(compiled.evaluate(&fixture.root).unwrap().value(), Some(Value::Int(10))));
    assert!(matches!(compiled.evaluate(&fixture.root).unwrap().value(), Some(Value::Int(20))));
    assert_eq!(fixture.calls(), 2);
}

#[test]
fn test_compile_reports_semantic_faults() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    let error = fixture
        .engine
        .compile("missing + 1", TypeRef::class(SAMPLE))
        .unwrap_err();
    assert!(matches!(error, EngineError::Semantic { .. } | EngineError::Syntax { .. }));
}

#[test]
fn test_lambda_passed_to_host_method() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    let removed = fixture.evaluate("list.removeIf(n -> n > 2)").unwrap();
    assert!(matches!(removed, Value::Boolean(true)));
    let list = fixture.engine.variable("list").unwrap();
    assert_eq!(list.to_java_string(), "[1, 2]");
}

#[test]
fn test_lambda_assigned_to_variable_captures_scope() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    fixture.evaluate("inc = n -> n + x").unwrap();
    assert!(matches!(fixture.evaluate("inc.apply(1)").unwrap(), Value::Int(8)));
    fixture.evaluate("x = 100").unwrap();
    assert!(matches!(fixture.evaluate("inc.apply(1)").unwrap(), Value::Int(101)));
}

#[test]
fn test_lambda_body_syntax_is_checked() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    let error = fixture.evaluate("list.removeIf(n -> n >)").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Syntax);
    assert_eq!(fixture.engine.variable("list").unwrap().to_java_string(), "[1, 2, 3, 4]");
}

#[test]
fn test_host_exception_is_evaluation_fault() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    let error = fixture.evaluate("Integer.parseInt(\"12x\")").unwrap_err();
    match error {
        EngineError::Evaluation { source, .. } => assert!(source.is_some()),
        other => panic!("expected an evaluation fault, got {other}"),
    }
}

#[test]
fn test_compound_assignment_and_increment() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    assert!(matches!(fixture.evaluate("x += 3").unwrap(), Value::Int(10)));
    assert!(matches!(fixture.evaluate("++x").unwrap(), Value::Int(11)));
    assert!(matches!(fixture.engine.variable("x"), Some(Value::Int(11))));
    // Compound assignment narrows back to int
    assert!(matches!(fixture.evaluate("x *= 1.5").unwrap(), Value::Int(16)));
}

#[test]
fn test_qualified_names_and_arrays() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    let value = fixture.evaluate("java.lang.Math.PI > 3").unwrap();
    assert!(matches!(value, Value::Boolean(true)));
    let value = fixture.evaluate("new int[] {1, 2, 3}[1] + (new int[2][3])[1][2]").unwrap();
    assert!(matches!(value, Value::Int(2)));
}

#[test]
fn test_array_creation_is_deferred_outside_dynamic_typing() {
    let fixture = Fixture::new(EvaluationMode::Mixed);
    let info = fixture.engine.evaluate("new int[2000000000]", &fixture.root).unwrap();
    assert!(info.is_indeterminate());
    assert_eq!(info.declared_type(), &TypeRef::array_of(TypeRef::INT));
}

#[test]
fn test_completion_after_huge_array_creation() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    let result = fixture.engine.complete("new int[2000000000].le", 22, &fixture.root);
    assert!(result.is_ok(), "{result:?}");
}

#[test]
fn test_instanceof() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    assert!(matches!(fixture.evaluate("\"a\" instanceof String").unwrap(), Value::Boolean(true)));
    assert!(matches!(fixture.evaluate("null instanceof String").unwrap(), Value::Boolean(false)));
    assert!(matches!(fixture.evaluate("list instanceof List").unwrap(), Value::Boolean(true)));

    let error = fixture.evaluate("x instanceof Integer").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Semantic);
    assert!(error.to_string().contains("primitive type int"), "{error}");

    let error = fixture.evaluate("\"a\" instanceof Integer").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Semantic);
    assert!(error.to_string().contains("Incompatible"), "{error}");
}

#[test]
fn test_repeated_evaluation_is_stable() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    let expression = "java.lang.Math.max(xy, 3) + \"a\".length()";
    let first = fixture.engine.evaluate(expression, &fixture.root).unwrap();
    let second = fixture.engine.evaluate(expression, &fixture.root).unwrap();
    assert!(matches!(first.value(), Some(Value::Int(14))));
    assert_eq!(
        first.value().and_then(Value::as_i64),
        second.value().and_then(Value::as_i64)
    );
    assert_eq!(first.declared_type(), second.declared_type());
}

#[test]
fn test_boxed_values_compare_by_value() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    let value = fixture.evaluate("Integer.valueOf(1000) == Integer.valueOf(1000)").unwrap();
    assert!(matches!(value, Value::Boolean(true)));
}

#[test]
fn test_semantic_fault_keeps_earlier_argument_side_effects() {
    let fixture = Fixture::new(EvaluationMode::DynamicTyping);
    let error = fixture.evaluate("Sample.pick(touch(), \"s\")").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Semantic);
    assert_eq!(fixture.calls(), 1);
}
