//! Outcomes shared by every parser: results, failures and confidence.

use crate::completion::CompletionSuggestions;
use crate::error::{EngineError, ErrorKind};
use crate::object_info::ObjectInfo;
use exprscope_api::{HostError, TypeRef};

/// How sure a parser is that it is the intended grammar alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParserConfidence {
    WrongParser,
    PotentiallyRightParser,
    RightParser,
}

#[derive(Debug, Clone)]
pub struct ParseError {
    pub position: usize,
    pub kind: ErrorKind,
    pub message: String,
    pub confidence: ParserConfidence,
    pub source: Option<HostError>,
}

impl ParseError {
    fn new(position: usize, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            position,
            kind,
            message: message.into(),
            confidence: ParserConfidence::WrongParser,
            source: None,
        }
    }

    pub fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::new(position, ErrorKind::Syntax, message)
    }

    pub fn semantic(position: usize, message: impl Into<String>) -> Self {
        Self::new(position, ErrorKind::Semantic, message)
    }

    /// Evaluation faults abort the whole parse, so they always commit.
    pub fn evaluation(position: usize, message: impl Into<String>, source: Option<HostError>) -> Self {
        Self {
            source,
            confidence: ParserConfidence::RightParser,
            ..Self::new(position, ErrorKind::Evaluation, message)
        }
    }

    /// Fault raised by host code while computing the value at `position`.
    pub fn host(position: usize, error: HostError) -> Self {
        Self::evaluation(position, error.to_string(), Some(error))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            confidence: ParserConfidence::RightParser,
            ..Self::new(0, ErrorKind::Internal, message)
        }
    }

    pub fn with_confidence(mut self, confidence: ParserConfidence) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn shifted(mut self, offset: usize) -> Self {
        self.position += offset;
        self
    }

    pub fn into_engine_error(self) -> EngineError {
        let ParseError {
            position,
            kind,
            message,
            source,
            ..
        } = self;
        match kind {
            ErrorKind::Syntax => EngineError::Syntax { position, message },
            ErrorKind::Semantic => EngineError::Semantic { position, message },
            ErrorKind::Evaluation => EngineError::Evaluation {
                position,
                message,
                source,
            },
            ErrorKind::Internal => EngineError::Internal(message),
        }
    }
}

/// Early exit of a parse chain: a failure, or completions found at the caret.
#[derive(Debug, Clone)]
pub enum ParseSignal {
    Failed(ParseError),
    Completions(CompletionSuggestions),
}

impl From<ParseError> for ParseSignal {
    fn from(error: ParseError) -> Self {
        ParseSignal::Failed(error)
    }
}

pub type ParseOutcome<T> = std::result::Result<T, ParseSignal>;

/// Confidence tracker for one parser attempt; only ever increases.
#[derive(Debug)]
pub struct Trial {
    confidence: ParserConfidence,
}

impl Default for Trial {
    fn default() -> Self {
        Self::new()
    }
}

impl Trial {
    pub fn new() -> Self {
        Self {
            confidence: ParserConfidence::WrongParser,
        }
    }

    pub fn confidence(&self) -> ParserConfidence {
        self.confidence
    }

    pub fn raise(&mut self, confidence: ParserConfidence) -> ParseOutcome<()> {
        if confidence < self.confidence {
            return Err(ParseError::internal(format!(
                "Parser confidence must not decrease from {:?} to {:?}",
                self.confidence, confidence
            ))
            .into());
        }
        self.confidence = confidence;
        Ok(())
    }

    /// Raise to `confidence` unless the attempt is already more confident.
    pub fn at_least(&mut self, confidence: ParserConfidence) {
        self.confidence = self.confidence.max(confidence);
    }

    /// Attach this attempt's confidence to a failure that escaped it.
    pub fn annotate(&self, signal: ParseSignal) -> ParseSignal {
        match signal {
            ParseSignal::Failed(error) => {
                let confidence = error.confidence.max(self.confidence);
                ParseSignal::Failed(error.with_confidence(confidence))
            }
            completions => completions,
        }
    }
}

/// What a parser produced: a value, a type or a package.
#[derive(Debug, Clone)]
pub enum ParseResult {
    Object(ObjectInfo),
    Class(TypeRef),
    Package(String),
}

impl ParseResult {
    pub fn category(&self) -> ResultCategory {
        match self {
            ParseResult::Object(_) => ResultCategory::Value,
            ParseResult::Class(_) => ResultCategory::TypeReference,
            ParseResult::Package(_) => ResultCategory::PackageReference,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCategory {
    Value,
    TypeReference,
    PackageReference,
}

impl ResultCategory {
    pub fn describe(self) -> &'static str {
        match self {
            ResultCategory::Value => "a value",
            ResultCategory::TypeReference => "a type",
            ResultCategory::PackageReference => "a package",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_monotonic() {
        let mut trial = Trial::new();
        assert!(trial.raise(ParserConfidence::PotentiallyRightParser).is_ok());
        assert!(trial.raise(ParserConfidence::RightParser).is_ok());
        let err = trial.raise(ParserConfidence::WrongParser).unwrap_err();
        match err {
            ParseSignal::Failed(e) => assert_eq!(e.kind, ErrorKind::Internal),
            ParseSignal::Completions(_) => panic!("expected internal fault"),
        }
    }

    #[test]
    fn test_annotate_takes_higher_confidence() {
        let mut trial = Trial::new();
        trial.raise(ParserConfidence::PotentiallyRightParser).unwrap();
        let signal = trial.annotate(ParseError::syntax(3, "boom").into());
        match signal {
            ParseSignal::Failed(e) => {
                assert_eq!(e.confidence, ParserConfidence::PotentiallyRightParser)
            }
            ParseSignal::Completions(_) => panic!("expected failure"),
        }

        let inner = ParseError::syntax(3, "inner").with_confidence(ParserConfidence::RightParser);
        match Trial::new().annotate(inner.into()) {
            ParseSignal::Failed(e) => assert_eq!(e.confidence, ParserConfidence::RightParser),
            ParseSignal::Completions(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn test_conversion_to_engine_error() {
        let err = ParseError::semantic(4, "no such field").into_engine_error();
        assert_eq!(err.kind(), ErrorKind::Semantic);
        assert_eq!(err.position(), Some(4));
    }
}
