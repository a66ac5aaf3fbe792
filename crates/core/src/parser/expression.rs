//! Operator expressions.
//!
//! Operands come from the production dispatcher; binary operators are combined
//! by precedence climbing. Assignments are right-associative and only start
//! directly after the first operand. The right-hand side of `&&`/`||` is parsed
//! in static typing mode when the left-hand side already decides the result,
//! so it is checked but never evaluated.

use super::class::parse_type;
use super::context::ParseContext;
use super::dispatch::{Subject, VALUE_PRODUCTIONS, dispatch};
use super::result::{ParseError, ParseOutcome, ParseResult, ParseSignal, ParserConfidence, ResultCategory};
use crate::completion::CompletionSuggestions;
use crate::evaluation::EvaluationMode;
use crate::expectation::ParseExpectation;
use crate::object_info::ObjectInfo;
use crate::operators::{self, ASSIGNMENT_OPERATORS, BinaryOperator, RELATIONAL_PRECEDENCE};
use crate::tokenizer::TokenStream;
use crate::types;
use exprscope_api::{HostResult, HostTypeSystem, PrimitiveKind, TypeRef, Value};
use once_cell::sync::Lazy;
use tracing::trace;

/// Every operator that may follow an operand. Peeking the longest match keeps
/// `<` from being read out of `<<=` and `-` out of `->`.
static FOLLOWING_OPERATORS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    BinaryOperator::ALL
        .iter()
        .map(|op| op.symbol())
        .chain(ASSIGNMENT_OPERATORS.iter().copied())
        .chain(["->", "++", "--"])
        .collect()
});

fn peek_following(tokens: &TokenStream) -> Option<&'static str> {
    tokens.peek_operator(&FOLLOWING_OPERATORS)
}

fn peek_binary(tokens: &TokenStream) -> Option<BinaryOperator> {
    peek_following(tokens).and_then(BinaryOperator::from_symbol)
}

fn peek_assignment(tokens: &TokenStream) -> Option<&'static str> {
    peek_following(tokens).filter(|op| ASSIGNMENT_OPERATORS.contains(op))
}

fn peek_instanceof(tokens: &TokenStream) -> bool {
    tokens.peek_identifier().as_deref() == Some("instanceof")
}

/// Parse a complete expression (operands, operators, assignments).
pub fn parse_expression(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    expectation: &ParseExpectation,
) -> ParseOutcome<ObjectInfo> {
    let start = tokens.next_token_start();
    let first = parse_operand(tokens, ctx, &expectation.operand())?;
    let result = match peek_assignment(tokens) {
        Some(symbol) => parse_assignment(tokens, ctx, first, symbol)?,
        None => parse_binary(tokens, ctx, first, 0)?,
    };
    let result_type = result.effective_type();
    if !expectation.accepts_type(&result_type, ctx.type_system()) {
        let expected = expectation
            .expected_types()
            .unwrap_or_default()
            .iter()
            .map(TypeRef::to_string)
            .collect::<Vec<_>>()
            .join(" or ");
        return Err(ParseError::semantic(
            start,
            format!("Type mismatch: expected {expected}, found {result_type}"),
        )
        .with_confidence(ParserConfidence::RightParser)
        .into());
    }
    if expectation.must_consume && !tokens.is_at_end() {
        let found = tokens.peek_char().map(String::from).unwrap_or_default();
        return Err(ParseError::syntax(tokens.next_token_start(), format!("Unexpected '{found}'"))
            .with_confidence(ParserConfidence::RightParser)
            .into());
    }
    Ok(result)
}

/// A single operand: any value production with its member chain.
pub(super) fn parse_operand(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    expectation: &ParseExpectation,
) -> ParseOutcome<ObjectInfo> {
    let expectation = expectation.with_category(ResultCategory::Value);
    match dispatch(tokens, ctx, &Subject::Root, &expectation, VALUE_PRODUCTIONS)? {
        ParseResult::Object(info) => Ok(info),
        other => Err(ParseError::internal(format!(
            "value production returned {}",
            other.category().describe()
        ))
        .into()),
    }
}

fn parse_binary(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    mut lhs: ObjectInfo,
    min_precedence: u8,
) -> ParseOutcome<ObjectInfo> {
    loop {
        if peek_instanceof(tokens) {
            if RELATIONAL_PRECEDENCE < min_precedence {
                return Ok(lhs);
            }
            lhs = parse_instanceof(tokens, ctx, lhs)?;
            continue;
        }
        let Some(op) = peek_binary(tokens).filter(|op| op.precedence() >= min_precedence) else {
            offer_operator_keywords(tokens, ctx)?;
            return Ok(lhs);
        };
        let Some(op_token) = tokens.read_operator(&[op.symbol()]) else {
            return Err(ParseError::internal(format!("operator '{}' vanished", op.symbol())).into());
        };
        let rhs_ctx = if short_circuit_result(op, &lhs).is_some() {
            ctx.with_mode(EvaluationMode::StaticTyping)
        } else {
            ctx.clone()
        };
        let rhs_expectation = ParseExpectation::value().with_hint(vec![lhs.declared_type().clone()]);
        let mut rhs = parse_operand(tokens, &rhs_ctx, &rhs_expectation)?;
        while binds_tighter(tokens, op) {
            rhs = parse_binary(tokens, &rhs_ctx, rhs, op.precedence() + 1)?;
        }
        lhs = combine(ctx, op_token.start, op, lhs, rhs)?;
    }
}

fn binds_tighter(tokens: &TokenStream, op: BinaryOperator) -> bool {
    if peek_instanceof(tokens) {
        return RELATIONAL_PRECEDENCE > op.precedence();
    }
    peek_binary(tokens).is_some_and(|next| next.precedence() > op.precedence())
}

/// With the caret inside a word after an operand, the word can only be an
/// operator keyword.
fn offer_operator_keywords(tokens: &TokenStream, ctx: &ParseContext) -> ParseOutcome<()> {
    if tokens.peek_identifier().is_none() {
        return Ok(());
    }
    let expectation = ParseExpectation::value();
    let mut lookahead = tokens.clone();
    let read = lookahead.read_identifier(
        |info| {
            let factory = ctx.completions(info, &expectation);
            factory.suggestions(factory.keywords([("instanceof", Some(TypeRef::BOOLEAN))]))
        },
        "operator",
    );
    match read {
        Err(ParseSignal::Completions(found)) => Err(ParseSignal::Completions(found)),
        _ => Ok(()),
    }
}

/// The value of `lhs op ...` when `lhs` alone decides it.
fn short_circuit_result(op: BinaryOperator, lhs: &ObjectInfo) -> Option<bool> {
    let known = lhs.value()?.as_bool()?;
    match op {
        BinaryOperator::LogicalAnd if !known => Some(false),
        BinaryOperator::LogicalOr if known => Some(true),
        _ => None,
    }
}

fn combine(
    ctx: &ParseContext,
    position: usize,
    op: BinaryOperator,
    lhs: ObjectInfo,
    rhs: ObjectInfo,
) -> ParseOutcome<ObjectInfo> {
    let left_type = lhs.effective_type();
    let right_type = rhs.effective_type();
    let result_type = operators::binary_result_type(op, &left_type, &right_type, ctx.type_system())
        .map_err(|message| {
            ParseError::semantic(position, message).with_confidence(ParserConfidence::RightParser)
        })?;
    if let Some(decided) = short_circuit_result(op, &lhs) {
        return Ok(ObjectInfo::new(Value::Boolean(decided), result_type));
    }
    let value = match (lhs.value(), rhs.value()) {
        (Some(left), Some(right)) => compute(
            ctx,
            position,
            operators::apply_binary(op, left, &left_type, right, &right_type, &result_type),
        )?,
        _ => None,
    };
    Ok(ObjectInfo::from_option(value, result_type))
}

/// Turn an operator outcome into a value. Faults are dropped in static typing
/// mode (the value stays unknown) and abort the parse otherwise.
pub(super) fn compute(
    ctx: &ParseContext,
    position: usize,
    outcome: HostResult<Value>,
) -> ParseOutcome<Option<Value>> {
    match outcome {
        Ok(value) => Ok(Some(value)),
        Err(error) if ctx.mode == EvaluationMode::StaticTyping => {
            trace!("ignoring operator fault in static typing: {}", error);
            Ok(None)
        }
        Err(error) => Err(ParseError::host(position, error).into()),
    }
}

fn parse_instanceof(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    lhs: ObjectInfo,
) -> ParseOutcome<ObjectInfo> {
    let keyword = tokens.read_keyword("instanceof", |info| {
        CompletionSuggestions::empty(info.token_start)
    })?;
    let source = lhs.declared_type().clone();
    let semantic = |message: String| -> ParseSignal {
        ParseError::semantic(keyword.start, message)
            .with_confidence(ParserConfidence::RightParser)
            .into()
    };
    if source.is_primitive() {
        return Err(semantic(format!("instanceof cannot be applied to primitive type {source}")));
    }
    let target = parse_type(tokens, ctx, true)?;
    if target.is_primitive() {
        return Err(semantic(format!("instanceof requires a reference type, found {target}")));
    }
    if !types::is_castable(&source, &target, ctx.type_system()) {
        return Err(semantic(format!(
            "Incompatible conditional operand types {source} and {target}"
        )));
    }
    let value = lhs
        .value()
        .map(|value| Value::Boolean(types::is_instance_of(value, &target, ctx.type_system())));
    Ok(ObjectInfo::from_option(value, TypeRef::BOOLEAN))
}

fn parse_assignment(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    target: ObjectInfo,
    symbol: &str,
) -> ParseOutcome<ObjectInfo> {
    let Some(op_token) = tokens.read_operator(&[symbol]) else {
        return Err(ParseError::internal(format!("operator '{symbol}' vanished")).into());
    };
    let mismatch = |from: &TypeRef, to: &TypeRef| -> ParseSignal {
        ParseError::semantic(
            op_token.start,
            format!("Type mismatch: cannot convert from {from} to {to}"),
        )
        .with_confidence(ParserConfidence::RightParser)
        .into()
    };
    let Some(setter) = target.setter().cloned() else {
        return Err(ParseError::semantic(
            op_token.start,
            "The left-hand side of an assignment must be a variable",
        )
        .with_confidence(ParserConfidence::RightParser)
        .into());
    };
    let declared = target.declared_type().clone();
    let rhs_expectation = ParseExpectation::value().with_hint(vec![declared.clone()]);
    let rhs = parse_expression(tokens, ctx, &rhs_expectation)?;

    let value = match operators::compound_operator(symbol) {
        None => {
            if !is_assignable_to(&rhs, &declared, ctx.type_system()) {
                return Err(mismatch(rhs.declared_type(), &declared));
            }
            rhs.value().map(|value| types::convert_for_assignment(value, &declared))
        }
        Some(op) => {
            let combined = combine(ctx, op_token.start, op, target.into_rvalue(), rhs)?;
            // Compound assignments narrow implicitly
            if !types::is_castable(combined.declared_type(), &declared, ctx.type_system()) {
                return Err(mismatch(combined.declared_type(), &declared));
            }
            combined
                .into_value()
                .map(|value| types::convert_for_assignment(&value, &declared))
        }
    };
    if ctx.mode.performs_assignments()
        && let Some(value) = &value
    {
        trace!("assigning {} at {}", value, op_token.start);
        setter(value.clone()).map_err(|error| ParseError::host(op_token.start, error))?;
    }
    Ok(ObjectInfo::from_option(value, declared))
}

/// Assignment compatibility, including the narrowing of `int` constants to
/// `byte`, `short` and `char` when the value fits.
pub(super) fn is_assignable_to(value: &ObjectInfo, target: &TypeRef, ts: &dyn HostTypeSystem) -> bool {
    if types::is_convertible(&value.effective_type(), target, ts) {
        return true;
    }
    let narrowable = matches!(
        value.declared_type().as_primitive(),
        Some(PrimitiveKind::Byte | PrimitiveKind::Short | PrimitiveKind::Char | PrimitiveKind::Int)
    );
    match (target.unboxed(), value.value()) {
        (Some(kind @ (PrimitiveKind::Byte | PrimitiveKind::Short | PrimitiveKind::Char)), Some(constant))
            if narrowable =>
        {
            operators::constant_fits(constant, kind)
        }
        _ => false,
    }
}
