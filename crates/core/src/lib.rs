pub mod error;
pub mod logging;

pub mod completion;
pub mod engine;
pub mod evaluation;
pub mod expectation;
pub mod introspection;
pub mod lambda;
pub mod object_info;
pub mod operators;
pub mod parser;
pub mod rating;
pub mod resolver;
pub mod settings;
pub mod tokenizer;
pub mod types;
pub mod variables;

pub use completion::{CodeCompletion, CompletionKind};
pub use engine::{CompiledExpression, ExpressionEngine};
pub use error::{ConfigError, EngineError, ErrorKind, Result};
pub use evaluation::EvaluationMode;
pub use object_info::ObjectInfo;
pub use settings::{CompletionMode, EngineConfig, Settings, SettingsBuilder};
