//! Constructs opening with `(`: casts and parenthesized expressions.

use super::class::parse_type;
use super::context::ParseContext;
use super::expression::{parse_expression, parse_operand};
use super::result::{ParseError, ParseOutcome, ParseResult, ParserConfidence, Trial};
use crate::expectation::ParseExpectation;
use crate::object_info::ObjectInfo;
use crate::tokenizer::TokenStream;
use crate::types;
use exprscope_api::{HostError, TypeRef, Value};

pub(super) fn parse_parenthesized(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    expectation: &ParseExpectation,
    trial: &mut Trial,
) -> ParseOutcome<ParseResult> {
    tokens.read_char('(')?;
    let inner = parse_expression(tokens, ctx, &expectation.operand())?;
    trial.raise(ParserConfidence::PotentiallyRightParser)?;
    tokens.read_char(')')?;
    Ok(ParseResult::Object(inner.into_rvalue()))
}

pub(super) fn parse_cast(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    _expectation: &ParseExpectation,
    trial: &mut Trial,
) -> ParseOutcome<ParseResult> {
    let open = tokens.read_char('(')?;
    let target = parse_type(tokens, ctx, true)?;
    tokens.read_char(')')?;
    // `(Integer) -1` is a subtraction in the host language
    if target.is_reference() && matches!(tokens.peek_char(), Some('+' | '-')) {
        return Err(tokens.syntax_error("A reference type cast cannot apply to a signed operand"));
    }
    trial.raise(ParserConfidence::PotentiallyRightParser)?;

    let operand = parse_operand(tokens, ctx, &ParseExpectation::value())?;
    let source = operand.declared_type().clone();
    if !types::is_castable(&source, &target, ctx.type_system()) {
        return Err(ParseError::semantic(open.start, format!("Cannot cast from {source} to {target}"))
            .with_confidence(ParserConfidence::RightParser)
            .into());
    }
    let value = match operand.into_value() {
        Some(value) => Some(cast_value(ctx, open.start, value, &target)?),
        None => None,
    };
    Ok(ParseResult::Object(ObjectInfo::from_option(value, target)))
}

fn cast_value(
    ctx: &ParseContext,
    position: usize,
    value: Value,
    target: &TypeRef,
) -> Result<Value, ParseError> {
    match target {
        TypeRef::Primitive(kind) => {
            if value.is_null() {
                return Err(ParseError::host(
                    position,
                    HostError::NullPointer(format!("Cannot cast null to {}", kind.name())),
                ));
            }
            Ok(types::convert_primitive(&value, *kind))
        }
        _ if value.is_null() => Ok(value),
        _ if types::is_instance_of(&value, target, ctx.type_system()) => Ok(value),
        _ => Err(ParseError::host(
            position,
            HostError::exception(
                "java.lang.ClassCastException",
                format!(
                    "class {} cannot be cast to class {target}",
                    value.runtime_type()
                ),
            ),
        )),
    }
}
