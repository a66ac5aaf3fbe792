use exprscope_api::{TypeRef, Value};
use exprscope_core::{EvaluationMode, ExpressionEngine, Settings};
use exprscope_host::{ClassBuilder, ClassRegistry, ElementList, Instance};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const SAMPLE: &str = "test.Sample";

/// An engine over the standard library plus `test.Sample`, with a root object
/// and a counter of host calls made through `Sample.touch()`.
pub struct Fixture {
    pub engine: ExpressionEngine,
    pub root: Value,
    pub calls: Arc<AtomicUsize>,
}

impl Fixture {
    pub fn new(mode: EvaluationMode) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = ClassRegistry::builder()
            .standard_library()
            .class(sample_class(calls.clone()))
            .build();
        let list = ElementList::new((1..=4).map(Value::Int).collect());
        let settings = Settings::builder()
            .import_package("java.util")
            .import_package("java.util.function")
            .import_class(SAMPLE)
            .variable("xyz", Value::Double(15.0), TypeRef::DOUBLE, false)
            .variable("x", Value::Int(7), TypeRef::INT, false)
            .variable("limit", Value::Int(10), TypeRef::INT, true)
            .variable("list", Value::object(list), TypeRef::class("java.util.ArrayList"), false)
            .variable("inc", Value::Null, TypeRef::class("java.util.function.Function"), false)
            .evaluation_mode(mode)
            .build();
        let root = Value::object(Instance::new(SAMPLE).with("xy", Value::Int(13)));
        Self {
            engine: ExpressionEngine::new(Arc::new(registry), settings),
            root,
            calls,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn evaluate(&self, expression: &str) -> exprscope_core::Result<Value> {
        let info = self.engine.evaluate(expression, &self.root)?;
        Ok(info.into_value().unwrap_or_default())
    }

    /// Completion texts at the end of `expression`, best first.
    pub fn complete(&self, expression: &str) -> Vec<String> {
        self.engine
            .complete(expression, expression.len(), &self.root)
            .unwrap()
            .into_iter()
            .map(|c| c.text)
            .collect()
    }
}

fn sample_class(calls: Arc<AtomicUsize>) -> ClassBuilder {
    ClassBuilder::class(SAMPLE)
        .property("xy", TypeRef::INT)
        .method("touch", &[], TypeRef::INT, move |_, _| {
            let count = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Value::Int(count as i32))
        })
        .static_method("pick", &[TypeRef::INT, TypeRef::DOUBLE], TypeRef::string(), |_| {
            Ok(Value::string("int, double"))
        })
        .static_method("pick", &[TypeRef::DOUBLE, TypeRef::INT], TypeRef::string(), |_| {
            Ok(Value::string("double, int"))
        })
}
