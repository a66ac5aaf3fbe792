use exprscope_api::Value;
use exprscope_core::ExpressionEngine;
use reedline::{Completer, Span, Suggestion};
use std::sync::{Arc, PoisonError, RwLock};

pub struct ExpressionCompleter {
    pub commands: Vec<String>,
    pub engine: Arc<RwLock<ExpressionEngine>>,
}

impl ExpressionCompleter {
    pub fn new(commands: Vec<String>, engine: Arc<RwLock<ExpressionEngine>>) -> Self {
        Self { commands, engine }
    }

    fn suggestion(value: String, description: Option<String>, start: usize, end: usize) -> Suggestion {
        Suggestion {
            value,
            description,
            style: None,
            extra: None,
            span: Span { start, end },
            append_whitespace: false,
            match_indices: None,
        }
    }
}

impl Completer for ExpressionCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        // 1. Shell command names
        if line.starts_with(':') && !line[..pos].contains(' ') {
            return self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(&line[..pos]))
                .map(|cmd| Self::suggestion(cmd.clone(), None, 0, pos))
                .collect();
        }
        if line.starts_with(':') {
            return vec![];
        }

        // 2. Expression completion through the engine, never evaluating anything
        let engine = self.engine.read().unwrap_or_else(PoisonError::into_inner);
        match engine.complete(line, pos, &Value::Null) {
            Ok(completions) => completions
                .into_iter()
                .map(|c| {
                    let description = Some(format!("{} {}", c.kind.label(), c.display_text));
                    Self::suggestion(c.text, description, c.insertion_start, c.insertion_end)
                })
                .collect(),
            Err(e) => {
                tracing::debug!("completion failed: {}", e);
                vec![]
            }
        }
    }
}
