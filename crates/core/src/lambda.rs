use crate::engine::{ParseSession, SessionOutcome};
use crate::error::EngineError;
use crate::evaluation::EvaluationMode;
use crate::parser::ParseContext;
use crate::types;
use crate::variables::{Variable, VariableScope};
use exprscope_api::{Callable, ExecutableInfo, HostError, HostResult, Value};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// A lambda expression bound to the scope it was written in.
///
/// Calling it evaluates the body text again with the arguments in a child
/// scope, so captured variables are read at call time.
pub struct CompiledLambda {
    interface: String,
    method: Arc<ExecutableInfo>,
    parameters: Vec<String>,
    body: Arc<str>,
    context: ParseContext,
}

impl CompiledLambda {
    pub fn new(
        interface: String,
        method: Arc<ExecutableInfo>,
        parameters: Vec<String>,
        body: &str,
        context: ParseContext,
    ) -> Self {
        Self {
            interface,
            method,
            parameters,
            body: Arc::from(body),
            context,
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

impl Callable for CompiledLambda {
    fn interface(&self) -> &str {
        &self.interface
    }

    fn arity(&self) -> usize {
        self.parameters.len()
    }

    fn call(&self, args: &[Value]) -> HostResult<Value> {
        if args.len() != self.parameters.len() {
            return Err(HostError::IllegalArgument(format!(
                "lambda for {} expects {} argument(s), got {}",
                self.interface,
                self.parameters.len(),
                args.len()
            )));
        }
        let arguments = self
            .parameters
            .iter()
            .zip(self.method.parameter_types())
            .zip(args)
            .map(|((name, ty), arg)| {
                Variable::new(
                    name.clone(),
                    types::convert_for_assignment(arg, ty),
                    ty.clone(),
                    false,
                )
            })
            .collect();
        let ctx = self
            .context
            .with_mode(EvaluationMode::DynamicTyping)
            .with_scope(VariableScope::child(&self.context.scope, arguments));
        trace!("calling lambda {} -> {}", self.parameters.join(", "), self.body);

        let outcome = ParseSession::new(ctx, self.body.clone(), None).run();
        match outcome {
            Ok(SessionOutcome::Value(result)) => {
                let return_type = &self.method.return_type;
                if return_type.is_void() {
                    return Ok(Value::Null);
                }
                match result.into_value() {
                    Some(value) => Ok(types::convert_for_assignment(&value, return_type)),
                    None => Err(HostError::Unsupported(
                        "lambda body produced no value".to_string(),
                    )),
                }
            }
            Ok(SessionOutcome::Completions(_)) => Err(HostError::Unsupported(
                "completion requested inside a lambda call".to_string(),
            )),
            Err(EngineError::Evaluation {
                source: Some(source),
                ..
            }) => Err(source),
            Err(error) => Err(HostError::exception(
                "java.lang.IllegalStateException",
                error.to_string(),
            )),
        }
    }
}

impl fmt::Debug for CompiledLambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledLambda")
            .field("interface", &self.interface)
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish()
    }
}
