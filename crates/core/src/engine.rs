//! Caller-facing entry points: evaluate, complete and compile.
//!
//! All three run the same grammar walk through a single-use [`ParseSession`];
//! they differ in the evaluation mode and in whether a caret is set.

use crate::completion::{CodeCompletion, CompletionSuggestions};
use crate::error::{EngineError, Result};
use crate::evaluation::EvaluationMode;
use crate::expectation::ParseExpectation;
use crate::object_info::ObjectInfo;
use crate::parser::{ParseContext, ParseSignal, parse_expression};
use crate::settings::Settings;
use crate::tokenizer::TokenStream;
use crate::variables::{Variable, VariableScope};
use exprscope_api::{HostTypeSystem, TypeRef, TypeSystemPtr, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// What one parse session produced.
#[derive(Debug)]
pub enum SessionOutcome {
    Value(ObjectInfo),
    Completions(CompletionSuggestions),
}

/// One top-level parse of one expression.
///
/// Confidence state is only meaningful for a single attempt, so a session
/// refuses to run twice.
pub struct ParseSession {
    ctx: ParseContext,
    text: Arc<str>,
    caret: Option<usize>,
    spent: bool,
}

impl ParseSession {
    pub fn new(ctx: ParseContext, text: impl Into<Arc<str>>, caret: Option<usize>) -> Self {
        Self {
            ctx,
            text: text.into(),
            caret,
            spent: false,
        }
    }

    pub fn run(&mut self) -> Result<SessionOutcome> {
        if self.spent {
            return Err(EngineError::Internal(
                "a parse session cannot be run twice".to_string(),
            ));
        }
        self.spent = true;
        let mut tokens = TokenStream::new(self.text.clone(), self.caret);
        let expectation = ParseExpectation::value().consuming(true);
        match parse_expression(&mut tokens, &self.ctx, &expectation) {
            Ok(info) => Ok(SessionOutcome::Value(info)),
            Err(ParseSignal::Completions(found)) => Ok(SessionOutcome::Completions(found)),
            Err(ParseSignal::Failed(error)) => Err(error.into_engine_error()),
        }
    }
}

/// Evaluates and completes expressions against caller-supplied objects.
#[derive(Clone)]
pub struct ExpressionEngine {
    ts: TypeSystemPtr,
    settings: Arc<Settings>,
    /// Caller variables; slots persist across calls
    scope: Arc<VariableScope>,
}

impl ExpressionEngine {
    pub fn new(ts: TypeSystemPtr, settings: Settings) -> Self {
        let variables = settings.variables.iter().map(|v| v.to_variable()).collect();
        Self {
            ts,
            settings: Arc::new(settings),
            scope: VariableScope::root(variables),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn type_system(&self) -> &dyn HostTypeSystem {
        self.ts.as_ref()
    }

    /// Caller variables; the returned handles share their slots with the engine.
    pub fn variables(&self) -> Vec<Variable> {
        self.scope.visible().into_iter().cloned().collect()
    }

    /// Current value of the caller variable `name`.
    pub fn variable(&self, name: &str) -> Option<Value> {
        self.scope.lookup(name).map(|variable| variable.get())
    }

    fn context(&self, mode: EvaluationMode, this: ObjectInfo) -> ParseContext {
        ParseContext::new(
            self.ts.clone(),
            self.settings.clone(),
            mode,
            this,
            self.scope.clone(),
        )
    }

    fn run(&self, mode: EvaluationMode, this: ObjectInfo, expression: &str, caret: Option<usize>) -> Result<SessionOutcome> {
        ParseSession::new(self.context(mode, this), expression, caret).run()
    }

    /// Evaluate `expression` with `this` as the root object.
    ///
    /// In dynamic typing a side-effect-free pass runs first; a syntax fault
    /// found there is reported before any host code has been invoked.
    pub fn evaluate(&self, expression: &str, this: &Value) -> Result<ObjectInfo> {
        let mode = self.settings.evaluation_mode;
        debug!("evaluating {:?} in {:?}", expression, mode);
        let root = root_object(this);
        if mode == EvaluationMode::DynamicTyping {
            let validation = self.run(mode.without_side_effects(), root.clone(), expression, None);
            if let Err(error @ EngineError::Syntax { .. }) = validation {
                debug!("validation pass rejected {:?}: {}", expression, error);
                return Err(error);
            }
        }
        match self.run(mode, root, expression, None)? {
            SessionOutcome::Value(info) => Ok(info.into_rvalue()),
            SessionOutcome::Completions(_) => Err(EngineError::Internal(
                "completions produced without a caret".to_string(),
            )),
        }
    }

    /// Ranked completions for the token at `caret`.
    ///
    /// A fault before the caret is returned; a fault at or after the caret
    /// means nothing can be suggested there, which yields an empty list.
    pub fn complete(&self, expression: &str, caret: usize, this: &Value) -> Result<Vec<CodeCompletion>> {
        if caret > expression.len() || !expression.is_char_boundary(caret) {
            return Err(EngineError::Internal(format!(
                "caret {caret} is outside of the expression"
            )));
        }
        let mode = self.settings.evaluation_mode.without_side_effects();
        debug!("completing {:?} at {} in {:?}", expression, caret, mode);
        match self.run(mode, root_object(this), expression, Some(caret)) {
            Ok(SessionOutcome::Completions(found)) => Ok(found.into_ranked()),
            Ok(SessionOutcome::Value(_)) => Ok(Vec::new()),
            Err(error) if error.position().is_some_and(|p| p >= caret) => {
                debug!("no completions at {}: {}", caret, error);
                Ok(Vec::new())
            }
            Err(error) => Err(error),
        }
    }

    /// Check `expression` once against the declared root type `this_type`.
    pub fn compile(&self, expression: &str, this_type: TypeRef) -> Result<CompiledExpression> {
        let root = ObjectInfo::indeterminate(this_type.clone());
        let result_type = match self.run(EvaluationMode::StaticTyping, root, expression, None)? {
            SessionOutcome::Value(info) => info.declared_type().clone(),
            SessionOutcome::Completions(_) => {
                return Err(EngineError::Internal(
                    "completions produced without a caret".to_string(),
                ));
            }
        };
        debug!("compiled {:?} to {}", expression, result_type);
        Ok(CompiledExpression {
            engine: self.clone(),
            expression: Arc::from(expression),
            this_type,
            result_type,
        })
    }
}

impl fmt::Debug for ExpressionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionEngine")
            .field("settings", &self.settings)
            .field("variables", &self.scope.visible().len())
            .finish()
    }
}

fn root_object(this: &Value) -> ObjectInfo {
    let ty = match this {
        Value::Null => TypeRef::object(),
        value => value.runtime_type(),
    };
    ObjectInfo::new(this.clone(), ty)
}

/// An expression that passed static checking and can be evaluated repeatedly.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    engine: ExpressionEngine,
    expression: Arc<str>,
    this_type: TypeRef,
    result_type: TypeRef,
}

impl CompiledExpression {
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Declared type of the result, as inferred without evaluation.
    pub fn result_type(&self) -> &TypeRef {
        &self.result_type
    }

    pub fn this_type(&self) -> &TypeRef {
        &self.this_type
    }

    pub fn evaluate(&self, this: &Value) -> Result<ObjectInfo> {
        let root = ObjectInfo::new(this.clone(), self.this_type.clone());
        match self
            .engine
            .run(EvaluationMode::DynamicTyping, root, &self.expression, None)?
        {
            SessionOutcome::Value(info) => Ok(info.into_rvalue()),
            SessionOutcome::Completions(_) => Err(EngineError::Internal(
                "completions produced without a caret".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use exprscope_host::ClassRegistry;

    fn context(mode: EvaluationMode) -> ParseContext {
        ParseContext::new(
            Arc::new(ClassRegistry::standard()),
            Arc::new(Settings::default()),
            mode,
            ObjectInfo::null(),
            VariableScope::root(Vec::new()),
        )
    }

    #[test]
    fn test_session_is_single_use() {
        let mut session = ParseSession::new(context(EvaluationMode::StaticTyping), "1 + 2", None);
        match session.run().unwrap() {
            SessionOutcome::Value(info) => assert!(matches!(info.value(), Some(Value::Int(3)))),
            SessionOutcome::Completions(_) => panic!("no caret was set"),
        }
        assert!(matches!(session.run(), Err(EngineError::Internal(_))));
    }

    #[test]
    fn test_caret_outside_expression_is_internal() {
        let engine = ExpressionEngine::new(Arc::new(ClassRegistry::standard()), Settings::default());
        let error = engine.complete("ab", 3, &Value::Null).unwrap_err();
        assert!(matches!(error, EngineError::Internal(_)));
        let error = engine.complete("\u{e9}", 1, &Value::Null).unwrap_err();
        assert!(matches!(error, EngineError::Internal(_)));
    }

    #[test]
    fn test_session_reports_completions() {
        let mut session = ParseSession::new(context(EvaluationMode::StaticTyping), "tr", Some(2));
        match session.run().unwrap() {
            SessionOutcome::Completions(found) => {
                let texts: Vec<_> = found.into_ranked().into_iter().map(|c| c.text).collect();
                assert!(texts.contains(&"true".to_string()));
            }
            SessionOutcome::Value(_) => panic!("caret should yield completions"),
        }
    }
}
