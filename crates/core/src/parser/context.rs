//! State shared by every parser of one session.
//!
//! The context is immutable; derived contexts (another evaluation mode, a
//! lambda scope) are new values.

use crate::completion::CompletionFactory;
use crate::evaluation::EvaluationMode;
use crate::expectation::ParseExpectation;
use crate::introspection::Introspection;
use crate::object_info::ObjectInfo;
use crate::settings::Settings;
use crate::tokenizer::CompletionInfo;
use crate::variables::VariableScope;
use exprscope_api::{HostTypeSystem, TypeSystemPtr};
use std::sync::Arc;

#[derive(Clone)]
pub struct ParseContext {
    pub ts: TypeSystemPtr,
    pub settings: Arc<Settings>,
    pub mode: EvaluationMode,
    /// The root object `this` refers to
    pub this: ObjectInfo,
    pub scope: Arc<VariableScope>,
}

impl ParseContext {
    pub fn new(
        ts: TypeSystemPtr,
        settings: Arc<Settings>,
        mode: EvaluationMode,
        this: ObjectInfo,
        scope: Arc<VariableScope>,
    ) -> Self {
        Self {
            ts,
            settings,
            mode,
            this,
            scope,
        }
    }

    pub fn with_mode(&self, mode: EvaluationMode) -> Self {
        Self {
            mode,
            ..self.clone()
        }
    }

    pub fn with_scope(&self, scope: Arc<VariableScope>) -> Self {
        Self {
            scope,
            ..self.clone()
        }
    }

    pub fn type_system(&self) -> &dyn HostTypeSystem {
        self.ts.as_ref()
    }

    pub fn introspection(&self) -> Introspection<'_> {
        Introspection::new(self.ts.as_ref(), &self.settings)
    }

    pub fn completions<'a>(
        &'a self,
        info: &'a CompletionInfo,
        expectation: &'a ParseExpectation,
    ) -> CompletionFactory<'a> {
        CompletionFactory::new(
            info,
            self.settings.completion_mode,
            expectation.expected_types(),
            self.ts.as_ref(),
        )
    }
}

impl std::fmt::Debug for ParseContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseContext")
            .field("mode", &self.mode)
            .field("this", &self.this)
            .field("scope_depth", &self.scope.depth())
            .finish()
    }
}
