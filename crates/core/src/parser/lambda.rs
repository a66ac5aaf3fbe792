//! Lambda expressions: `x -> body`, `(a, b) -> body`, `() -> body`.
//!
//! The body is kept as source text and compiled into a
//! [`CompiledLambda`](crate::lambda::CompiledLambda) that re-evaluates it on
//! every call. At the definition site the body is only checked for syntax:
//! parameter types come from erased generic signatures, so a static type check
//! of the body would reject valid code.

use super::context::ParseContext;
use super::expression::parse_expression;
use super::result::{ParseError, ParseOutcome, ParseResult, ParseSignal, ParserConfidence, Trial};
use crate::error::ErrorKind;
use crate::evaluation::EvaluationMode;
use crate::expectation::ParseExpectation;
use crate::lambda::CompiledLambda;
use crate::object_info::ObjectInfo;
use crate::tokenizer::{TokenStream, is_keyword};
use crate::variables::{Variable, VariableScope};
use exprscope_api::{ExecutableInfo, TypeRef, Value};
use std::sync::Arc;
use tracing::debug;

pub(super) fn parse_lambda(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    expectation: &ParseExpectation,
    trial: &mut Trial,
) -> ParseOutcome<ParseResult> {
    let start = tokens.next_token_start();
    let Some((parameters, after_arrow)) = scan_parameters(tokens) else {
        return Err(tokens.syntax_error("Expected a lambda expression"));
    };
    trial.raise(ParserConfidence::RightParser)?;

    let body_start = after_arrow.next_token_start();
    let body_end = scan_body_end(tokens.text(), body_start);
    let body = tokens.text()[body_start..body_end].to_string();

    let Some((interface, method)) = functional_target(ctx, expectation, parameters.len()) else {
        return Err(ParseError::semantic(
            start,
            format!(
                "No functional interface with {} parameter(s) is expected here",
                parameters.len()
            ),
        )
        .into());
    };
    validate_body(ctx, &method, &parameters, &body, body_start, tokens.caret())?;
    *tokens = tokens.at(body_end);

    let info = if ctx.mode.reads_values() {
        let interface_name = interface.as_class().unwrap_or_default().to_string();
        let lambda = CompiledLambda::new(interface_name, method, parameters, &body, ctx.clone());
        ObjectInfo::new(Value::Lambda(Arc::new(lambda)), interface)
    } else {
        ObjectInfo::indeterminate(interface)
    };
    Ok(ParseResult::Object(info))
}

/// Read the parameter list and the arrow without consuming `tokens`.
fn scan_parameters(tokens: &TokenStream) -> Option<(Vec<String>, TokenStream)> {
    let mut lookahead = tokens.clone();
    let mut names = Vec::new();
    if lookahead.peek_char() == Some('(') {
        lookahead.read_char('(').ok()?;
        if lookahead.peek_char() != Some(')') {
            loop {
                names.push(take_parameter_name(&mut lookahead)?);
                if lookahead.peek_char() != Some(',') {
                    break;
                }
                lookahead.read_char(',').ok()?;
            }
        }
        lookahead.read_char(')').ok()?;
    } else {
        names.push(take_parameter_name(&mut lookahead)?);
    }
    lookahead.read_operator(&["->"])?;
    Some((names, lookahead))
}

fn take_parameter_name(lookahead: &mut TokenStream) -> Option<String> {
    let name = lookahead.peek_identifier().filter(|name| !is_keyword(name))?;
    *lookahead = lookahead.at(lookahead.next_token_start() + name.len());
    Some(name)
}

/// End of a lambda body starting at `start`: the first unmatched closing
/// bracket or top-level comma, or the end of input. Trailing blanks excluded.
fn scan_body_end(text: &str, start: usize) -> usize {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut end = text.len();
    for (offset, c) in text[start..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' | ',' if depth == 0 => {
                end = start + offset;
                break;
            }
            ')' | ']' | '}' => depth -= 1,
            _ => {}
        }
    }
    start + text[start..end].trim_end().len()
}

fn functional_target(
    ctx: &ParseContext,
    expectation: &ParseExpectation,
    arity: usize,
) -> Option<(TypeRef, Arc<ExecutableInfo>)> {
    let introspection = ctx.introspection();
    expectation.expected_types()?.iter().find_map(|ty| {
        let method = introspection.functional_method(ty.as_class()?)?;
        (method.parameters.len() == arity).then(|| (ty.clone(), method))
    })
}

fn validate_body(
    ctx: &ParseContext,
    method: &ExecutableInfo,
    parameters: &[String],
    body: &str,
    body_start: usize,
    caret: Option<usize>,
) -> ParseOutcome<()> {
    let variables = parameters
        .iter()
        .zip(method.parameter_types())
        .map(|(name, ty)| Variable::new(name.clone(), Value::default_for(ty), ty.clone(), false))
        .collect();
    let body_ctx = ctx
        .with_mode(EvaluationMode::StaticTyping)
        .with_scope(VariableScope::child(&ctx.scope, variables));
    let body_caret = caret
        .filter(|c| (body_start..=body_start + body.len()).contains(c))
        .map(|c| c - body_start);
    let mut body_tokens = TokenStream::new(body, body_caret);
    let mut expectation = ParseExpectation::value().consuming(true);
    if !method.return_type.is_void() {
        expectation = expectation.with_hint(vec![method.return_type.clone()]);
    }
    match parse_expression(&mut body_tokens, &body_ctx, &expectation) {
        Ok(_) => Ok(()),
        Err(ParseSignal::Completions(found)) => {
            Err(ParseSignal::Completions(found.shifted(body_start)))
        }
        Err(ParseSignal::Failed(error)) => match error.kind {
            ErrorKind::Syntax => Err(error
                .shifted(body_start)
                .with_confidence(ParserConfidence::RightParser)
                .into()),
            ErrorKind::Internal => Err(error.into()),
            ErrorKind::Semantic | ErrorKind::Evaluation => {
                debug!("lambda body not checked statically: {}", error.message);
                Ok(())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_parameters() {
        let tokens = TokenStream::new("(a, b) -> a + b", None);
        let (names, rest) = scan_parameters(&tokens).unwrap();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(rest.next_token_start(), 10);

        let tokens = TokenStream::new("x->x", None);
        let (names, _) = scan_parameters(&tokens).unwrap();
        assert_eq!(names, vec!["x"]);

        assert!(scan_parameters(&TokenStream::new("() -> 1", None)).is_some());
        assert!(scan_parameters(&TokenStream::new("(a + b)", None)).is_none());
        assert!(scan_parameters(&TokenStream::new("x - 1", None)).is_none());
    }

    #[test]
    fn test_body_ends_at_unmatched_bracket_or_comma() {
        let text = "f(x -> g(x, 1), 2)";
        assert_eq!(&text[7..scan_body_end(text, 7)], "g(x, 1)");
        let text = "x -> \"a,)\" + x  ";
        assert_eq!(&text[5..scan_body_end(text, 5)], "\"a,)\" + x");
    }
}
