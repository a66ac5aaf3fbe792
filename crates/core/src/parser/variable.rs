use super::context::ParseContext;
use super::result::{ParseError, ParseOutcome, ParseResult, ParserConfidence, Trial};
use crate::expectation::ParseExpectation;
use crate::tokenizer::{TokenKind, TokenStream};

pub(super) fn parse_variable(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    expectation: &ParseExpectation,
    trial: &mut Trial,
) -> ParseOutcome<ParseResult> {
    let token = tokens.read_identifier(
        |info| {
            let factory = ctx.completions(info, expectation);
            let variables = ctx
                .scope
                .visible()
                .into_iter()
                .filter_map(|v| factory.variable(&v.name, &v.declared_type))
                .collect();
            factory.suggestions(variables)
        },
        "identifier",
    )?;
    if token.kind == TokenKind::Keyword {
        return Err(ParseError::syntax(token.start, format!("'{}' is a keyword", token.text)).into());
    }
    reject_lambda_parameter(tokens)?;
    let variable = ctx.scope.lookup(&token.text).ok_or_else(|| {
        ParseError::semantic(token.start, format!("Unknown identifier '{}'", token.text))
    })?;
    trial.raise(ParserConfidence::PotentiallyRightParser)?;
    Ok(ParseResult::Object(
        variable.to_object_info(ctx.mode.reads_values()),
    ))
}

/// An identifier directly followed by `->` is a lambda parameter.
pub(super) fn reject_lambda_parameter(tokens: &TokenStream) -> ParseOutcome<()> {
    if tokens.peek_str("->") {
        return Err(tokens.syntax_error("Identifier starts a lambda expression"));
    }
    Ok(())
}

pub(super) fn parse_this(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    expectation: &ParseExpectation,
    trial: &mut Trial,
) -> ParseOutcome<ParseResult> {
    let this_type = ctx.this.declared_type().clone();
    tokens.read_keyword("this", |info| {
        let factory = ctx.completions(info, expectation);
        factory.suggestions(factory.keywords([("this", Some(this_type))]))
    })?;
    trial.raise(ParserConfidence::PotentiallyRightParser)?;
    Ok(ParseResult::Object(ctx.this.clone().into_rvalue()))
}
