//! Prefix operators: `++x`, `--x`, `+x`, `-x`, `~x`, `!x`.

use super::context::ParseContext;
use super::expression::{compute, parse_operand};
use super::result::{ParseError, ParseOutcome, ParseResult, ParserConfidence, Trial};
use crate::expectation::ParseExpectation;
use crate::object_info::ObjectInfo;
use crate::operators::{self, BinaryOperator, UnaryOperator};
use crate::tokenizer::TokenStream;
use crate::types;
use exprscope_api::{TypeRef, Value};

const PREFIX_OPERATORS: &[&str] = &["++", "--", "+", "-", "~", "!"];

pub(super) fn parse_unary(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    expectation: &ParseExpectation,
    trial: &mut Trial,
) -> ParseOutcome<ParseResult> {
    let Some(op) = tokens.read_operator(PREFIX_OPERATORS) else {
        return Err(tokens.syntax_error("Expected an expression"));
    };
    trial.raise(ParserConfidence::PotentiallyRightParser)?;
    let operand = parse_operand(tokens, ctx, &expectation.operand())?;
    let info = match op.text.as_str() {
        "++" => increment(ctx, op.start, operand, BinaryOperator::Add)?,
        "--" => increment(ctx, op.start, operand, BinaryOperator::Subtract)?,
        symbol => {
            let Some(operator) = UnaryOperator::from_symbol(symbol) else {
                return Err(ParseError::internal(format!("unknown prefix operator '{symbol}'")).into());
            };
            apply(ctx, op.start, operator, operand)?
        }
    };
    Ok(ParseResult::Object(info))
}

fn apply(
    ctx: &ParseContext,
    position: usize,
    op: UnaryOperator,
    operand: ObjectInfo,
) -> ParseOutcome<ObjectInfo> {
    let result_type = operators::unary_result_type(op, &operand.effective_type()).map_err(|message| {
        ParseError::semantic(position, message).with_confidence(ParserConfidence::RightParser)
    })?;
    let value = match operand.value() {
        Some(value) => compute(ctx, position, operators::apply_unary(op, value, &result_type))?,
        None => None,
    };
    Ok(ObjectInfo::from_option(value, result_type))
}

/// Pre-increment and pre-decrement; the result keeps the operand's type.
fn increment(
    ctx: &ParseContext,
    position: usize,
    operand: ObjectInfo,
    op: BinaryOperator,
) -> ParseOutcome<ObjectInfo> {
    let symbol = if op == BinaryOperator::Add { "++" } else { "--" };
    let Some(setter) = operand.setter().cloned() else {
        return Err(ParseError::semantic(
            position,
            format!("Invalid argument to operation {symbol}: the operand must be a variable"),
        )
        .with_confidence(ParserConfidence::RightParser)
        .into());
    };
    let ty = operand.declared_type().clone();
    let Some(kind) = ty.unboxed().filter(|kind| kind.is_numeric()) else {
        return Err(ParseError::semantic(
            position,
            format!("Operator '{symbol}' cannot be applied to '{ty}'"),
        )
        .with_confidence(ParserConfidence::RightParser)
        .into());
    };
    let promoted = operators::binary_result_type(op, &ty, &TypeRef::INT, ctx.type_system())
        .map_err(|message| {
            ParseError::semantic(position, message).with_confidence(ParserConfidence::RightParser)
        })?;
    let value = match operand.value() {
        Some(current) => {
            let outcome =
                operators::apply_binary(op, current, &ty, &Value::Int(1), &TypeRef::INT, &promoted)
                    .map(|result| types::convert_primitive(&result, kind));
            compute(ctx, position, outcome)?
        }
        None => None,
    };
    if ctx.mode.performs_assignments()
        && let Some(value) = &value
    {
        setter(value.clone()).map_err(|error| ParseError::host(position, error))?;
    }
    Ok(ObjectInfo::from_option(value, ty))
}
