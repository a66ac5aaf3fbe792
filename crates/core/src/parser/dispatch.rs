//! Grammar productions and the confidence-voting dispatcher.
//!
//! A grammar point is an ordered list of [`Production`]s. Every production runs
//! on its own copy of the token stream; the order decides which of several
//! successful productions wins (a variable shadows a field, a field shadows a
//! class, a class shadows a package).

use super::context::ParseContext;
use super::result::{
    ParseError, ParseOutcome, ParseResult, ParseSignal, ParserConfidence, ResultCategory, Trial,
};
use super::{bracket, class, constructor, hierarchy, lambda, literal, member, tail, unary, variable};
use crate::completion::CompletionSuggestions;
use crate::error::ErrorKind;
use crate::expectation::ParseExpectation;
use crate::object_info::ObjectInfo;
use crate::tokenizer::TokenStream;
use exprscope_api::TypeRef;
use std::fmt;
use tracing::trace;

/// What the production at hand continues from.
#[derive(Debug, Clone)]
pub enum Subject {
    /// Start of an expression; members are looked up on `this`
    Root,
    Object(ObjectInfo),
    Class(TypeRef),
    Package(String),
}

impl From<ParseResult> for Subject {
    fn from(result: ParseResult) -> Self {
        match result {
            ParseResult::Object(info) => Subject::Object(info),
            ParseResult::Class(ty) => Subject::Class(ty),
            ParseResult::Package(package) => Subject::Package(package),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Production {
    Variable,
    Field,
    Method,
    Class,
    Package,
    Literal,
    This,
    Lambda,
    CustomHierarchy,
    Cast,
    Parenthesized,
    Constructor,
    UnaryPrefix,
}

pub const VALUE_PRODUCTIONS: &[Production] = &[
    Production::Variable,
    Production::Field,
    Production::Method,
    Production::Class,
    Production::Package,
    Production::Literal,
    Production::This,
    Production::Lambda,
    Production::CustomHierarchy,
    Production::Cast,
    Production::Parenthesized,
    Production::Constructor,
    Production::UnaryPrefix,
];

pub const TYPE_PRODUCTIONS: &[Production] = &[Production::Class, Production::Package];

const OBJECT_MEMBERS: &[Production] = &[Production::Field, Production::Method];
const STATIC_MEMBERS: &[Production] = &[Production::Field, Production::Method, Production::Class];
const INNER_CLASSES: &[Production] = &[Production::Class];
const PACKAGE_MEMBERS: &[Production] = &[Production::Class, Production::Package];

/// Productions that may follow `subject` when `category` is wanted.
pub fn productions_for(subject: &Subject, category: ResultCategory) -> &'static [Production] {
    match (subject, category) {
        (Subject::Root, ResultCategory::Value) => VALUE_PRODUCTIONS,
        (Subject::Root, _) => TYPE_PRODUCTIONS,
        (Subject::Object(_), _) => OBJECT_MEMBERS,
        (Subject::Class(_), ResultCategory::Value) => STATIC_MEMBERS,
        (Subject::Class(_), _) => INNER_CLASSES,
        (Subject::Package(_), _) => PACKAGE_MEMBERS,
    }
}

impl Production {
    /// Unary operators, casts and lambdas end with an operand that already
    /// consumed its own member chain.
    fn continues_with_tail(self) -> bool {
        !matches!(
            self,
            Production::Lambda | Production::Cast | Production::UnaryPrefix
        )
    }

    fn run(
        self,
        tokens: &mut TokenStream,
        ctx: &ParseContext,
        subject: &Subject,
        expectation: &ParseExpectation,
        trial: &mut Trial,
    ) -> ParseOutcome<ParseResult> {
        match self {
            Production::Variable => variable::parse_variable(tokens, ctx, expectation, trial),
            Production::Field => member::parse_field(tokens, ctx, subject, expectation, trial),
            Production::Method => member::parse_method(tokens, ctx, subject, expectation, trial),
            Production::Class => class::parse_class(tokens, ctx, subject, expectation, trial),
            Production::Package => class::parse_package(tokens, ctx, subject, expectation, trial),
            Production::Literal => literal::parse_literal(tokens, ctx, expectation, trial),
            Production::This => variable::parse_this(tokens, ctx, expectation, trial),
            Production::Lambda => lambda::parse_lambda(tokens, ctx, expectation, trial),
            Production::CustomHierarchy => {
                hierarchy::parse_hierarchy(tokens, ctx, expectation, trial)
            }
            Production::Cast => bracket::parse_cast(tokens, ctx, expectation, trial),
            Production::Parenthesized => {
                bracket::parse_parenthesized(tokens, ctx, expectation, trial)
            }
            Production::Constructor => {
                constructor::parse_constructor(tokens, ctx, expectation, trial)
            }
            Production::UnaryPrefix => unary::parse_unary(tokens, ctx, expectation, trial),
        }
    }

    fn attempt(
        self,
        tokens: &mut TokenStream,
        ctx: &ParseContext,
        subject: &Subject,
        expectation: &ParseExpectation,
        trial: &mut Trial,
    ) -> ParseOutcome<ParseResult> {
        let start = tokens.next_token_start();
        let primary = self.run(tokens, ctx, subject, expectation, trial)?;
        let result = if self.continues_with_tail() {
            tail::parse_tail(tokens, ctx, primary, expectation)?
        } else {
            primary
        };
        if result.category() != expectation.category {
            trial.at_least(ParserConfidence::PotentiallyRightParser);
            return Err(ParseError::syntax(
                start,
                format!(
                    "Expected {}, found {}",
                    expectation.category.describe(),
                    result.category().describe()
                ),
            )
            .into());
        }
        Ok(result)
    }

    pub fn parse(
        self,
        tokens: &mut TokenStream,
        ctx: &ParseContext,
        subject: &Subject,
        expectation: &ParseExpectation,
    ) -> ParseOutcome<ParseResult> {
        let mut trial = Trial::new();
        self.attempt(tokens, ctx, subject, expectation, &mut trial)
            .map_err(|signal| trial.annotate(signal))
    }
}

/// Try `productions` in order and vote on the outcome.
///
/// Completions of all alternatives are merged and win over successes. In
/// evaluation (no caret) the first success is taken immediately, so no later
/// alternative can run host code. A failure at right-parser confidence commits.
/// When everything fails, the most confident error is reported; ties go to the
/// earlier production.
pub fn dispatch(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    subject: &Subject,
    expectation: &ParseExpectation,
    productions: &[Production],
) -> ParseOutcome<ParseResult> {
    vote(tokens, productions, |production, branch| {
        production.parse(branch, ctx, subject, expectation)
    })
}

/// The voting behind [`dispatch`]; `attempt` runs one alternative on its own
/// copy of the stream.
fn vote<P: Copy + fmt::Debug>(
    tokens: &mut TokenStream,
    alternatives: &[P],
    mut attempt: impl FnMut(P, &mut TokenStream) -> ParseOutcome<ParseResult>,
) -> ParseOutcome<ParseResult> {
    let mut completions: Option<CompletionSuggestions> = None;
    let mut success: Option<(TokenStream, ParseResult)> = None;
    let mut best_error: Option<ParseError> = None;

    for &alternative in alternatives {
        let mut branch = tokens.clone();
        match attempt(alternative, &mut branch) {
            Ok(result) => {
                if tokens.caret().is_none() {
                    *tokens = branch;
                    return Ok(result);
                }
                if success.is_none() {
                    success = Some((branch, result));
                }
            }
            Err(ParseSignal::Completions(found)) => {
                completions = Some(match completions {
                    Some(collected) => collected.merge(found),
                    None => found,
                });
            }
            Err(ParseSignal::Failed(error)) => {
                trace!(
                    "{:?} failed at {} ({:?}): {}",
                    alternative, error.position, error.confidence, error.message
                );
                if error.kind == ErrorKind::Internal {
                    return Err(error.into());
                }
                if error.confidence == ParserConfidence::RightParser
                    && completions.is_none()
                    && success.is_none()
                {
                    return Err(error.into());
                }
                if best_error
                    .as_ref()
                    .is_none_or(|best| error.confidence > best.confidence)
                {
                    best_error = Some(error);
                }
            }
        }
    }

    if let Some(completions) = completions {
        return Err(ParseSignal::Completions(completions));
    }
    if let Some((branch, result)) = success {
        *tokens = branch;
        return Ok(result);
    }
    Err(best_error
        .unwrap_or_else(|| ParseError::syntax(tokens.next_token_start(), "Unexpected input"))
        .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_productions_follow_subject() {
        let object = Subject::Object(ObjectInfo::null());
        assert_eq!(
            productions_for(&object, ResultCategory::Value),
            &[Production::Field, Production::Method]
        );
        let class = Subject::Class(TypeRef::string());
        assert_eq!(
            productions_for(&class, ResultCategory::TypeReference),
            &[Production::Class]
        );
        assert!(productions_for(&class, ResultCategory::Value).contains(&Production::Method));
        assert_eq!(
            productions_for(&Subject::Root, ResultCategory::TypeReference),
            TYPE_PRODUCTIONS
        );
    }

    #[test]
    fn test_variables_shadow_fields_and_classes() {
        let position = |p| VALUE_PRODUCTIONS.iter().position(|q| *q == p);
        assert!(position(Production::Variable) < position(Production::Field));
        assert!(position(Production::Field) < position(Production::Class));
        assert!(position(Production::Class) < position(Production::Package));
        assert!(position(Production::Cast) < position(Production::Parenthesized));
        assert!(position(Production::Literal) < position(Production::UnaryPrefix));
    }

    fn fail(message: &str, confidence: ParserConfidence) -> ParseOutcome<ParseResult> {
        Err(ParseError::syntax(0, message).with_confidence(confidence).into())
    }

    fn failure(outcome: ParseOutcome<ParseResult>) -> ParseError {
        match outcome {
            Err(ParseSignal::Failed(error)) => error,
            other => panic!("expected a failure, got {other:?}"),
        }
    }

    #[test]
    fn test_most_confident_error_is_reported() {
        let mut tokens = TokenStream::new("x", None);
        let outcome = vote(&mut tokens, &["a", "b", "c"], |name, _| match name {
            "b" => fail("from b", ParserConfidence::PotentiallyRightParser),
            other => fail(other, ParserConfidence::WrongParser),
        });
        assert_eq!(failure(outcome).message, "from b");
    }

    #[test]
    fn test_confidence_ties_go_to_earlier_alternative() {
        let mut tokens = TokenStream::new("x", None);
        let outcome = vote(&mut tokens, &["a", "b"], |name, _| {
            fail(name, ParserConfidence::PotentiallyRightParser)
        });
        assert_eq!(failure(outcome).message, "a");
    }

    #[test]
    fn test_right_parser_failure_commits() {
        let mut tokens = TokenStream::new("x", None);
        let mut tried = Vec::new();
        let outcome = vote(&mut tokens, &["a", "b", "c"], |name, _| {
            tried.push(name);
            match name {
                "b" => fail("from b", ParserConfidence::RightParser),
                "c" => Ok(ParseResult::Object(ObjectInfo::null())),
                other => fail(other, ParserConfidence::WrongParser),
            }
        });
        assert_eq!(failure(outcome).message, "from b");
        assert_eq!(tried, vec!["a", "b"]);
    }
}
